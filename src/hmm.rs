//!
//! Discrete HMM calculation
//!
//! # Overview of calculation
//!
//! x = x[0],...,x[n-1] : Emissions of length n
//!
//! The emission of `x[i]` belongs to the state departed at step `i`,
//! i.e. the transition `k -> l` at step `i` has weight
//! `e_k(x[i]) t_kl`.
//!
//! Forward
//! F[i][k]
//!  = P(emits x[0:i]=x[0],...,x[i-1] and now in state k) for 0<=i<=n
//!  F[0][k] = init[k]
//!
//! Backward
//! B[i][k]
//!  = P(emits x[i:n] | starts from state k) for 0<=i<=n
//!  B[n][k] = 1
//!
//! P(x) = \sum_k F[n][k] = \sum_k init[k] B[0][k]
//!
//! Soft counts
//! C[k][l][x[i]]
//!  += P(transition k -> l at step i | x)
//!   = F[i][k] t_kl e_k(x[i]) B[i+1][l] / P(x)
//!
//! F[i] = F.init_table  (i=0; no emission)
//!        F.tables[i-1] (0<i<=n)
//!
//! B[i] = B.init_table  (i=n; no emission)
//!        B.tables[i]   (0<=i<n)
//!
pub mod backward;
pub mod forward;
pub mod mocks;
pub mod params;
pub mod partial;
pub mod softcount;
pub mod trace;
pub mod trellis;

pub use params::ModelParams;
pub use softcount::{SequenceCounts, SoftCountTable};
pub use trellis::{CachedTrellis, Trellis, TrellisLookup};
