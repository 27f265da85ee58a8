//!
//! Trellis definitions
//!
//! * `Trellis`: all tables of a forward or backward run
//! * `CachedTrellis`: a pair of forward/backward runs of one sequence
//! * `TrellisLookup`: random access to `F[t][k]` and `B[t][k]`
//!
use crate::prob::Prob;

/// Struct that stores Forward/Backward algorithm result
/// for the given emissions
///
/// the length of `tables` will be equal to the length of emissions.
/// `init_table` is the boundary row (`F[0]` or `B[n]`).
#[derive(Debug, Clone)]
pub struct Trellis {
    pub init_table: Vec<Prob>,
    pub tables: Vec<Vec<Prob>>,
    /// full probability `P(x)` computed by this run
    pub probability: Prob,
    pub is_forward: bool,
}

impl Trellis {
    /// The number of emissions that this result stores.
    pub fn n_emissions(&self) -> usize {
        self.tables.len()
    }
    ///
    /// Row of time `i` (`0 <= i <= n`)
    ///
    /// * forward: `F[0]` is `init_table`, `F[i]` is `tables[i-1]`
    /// * backward: `B[n]` is `init_table`, `B[i]` is `tables[i]`
    ///
    pub fn table(&self, i: usize) -> &[Prob] {
        let n = self.n_emissions();
        assert!(i <= n, "time {} is out of the trellis (n={})", i, n);
        if self.is_forward {
            if i == 0 {
                &self.init_table
            } else {
                &self.tables[i - 1]
            }
        } else if i == n {
            &self.init_table
        } else {
            &self.tables[i]
        }
    }
    /// Value of state `k` at time `i`
    pub fn value(&self, i: usize, k: usize) -> Prob {
        self.table(i)[k]
    }
}

///
/// Random access to forward/backward values of one sequence.
///
/// `alpha(t, k) = F[t][k]` and `beta(t, k) = B[t][k]` for `0 <= t <= n`.
///
pub trait TrellisLookup {
    fn alpha(&self, t: usize, k: usize) -> Prob;
    fn beta(&self, t: usize, k: usize) -> Prob;
}

/// Struct for storing forward and backward `Trellis` of a sequence.
///
#[derive(Debug, Clone)]
pub struct CachedTrellis {
    pub forward: Trellis,
    pub backward: Trellis,
}

impl CachedTrellis {
    pub fn new(forward: Trellis, backward: Trellis) -> Self {
        // check forward/backward is created by params.forward/backward()
        assert!(forward.is_forward);
        assert!(!backward.is_forward);
        assert_eq!(forward.n_emissions(), backward.n_emissions());
        CachedTrellis { forward, backward }
    }
    /// full probability from the forward run
    pub fn to_full_prob_forward(&self) -> Prob {
        self.forward.probability
    }
    /// full probability from the backward run
    pub fn to_full_prob_backward(&self) -> Prob {
        self.backward.probability
    }
}

impl TrellisLookup for CachedTrellis {
    fn alpha(&self, t: usize, k: usize) -> Prob {
        self.forward.value(t, k)
    }
    fn beta(&self, t: usize, k: usize) -> Prob {
        self.backward.value(t, k)
    }
}
