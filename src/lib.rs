//!
//! E-step engine of discrete-alphabet hidden Markov models.
//!
//! * `hmm`: forward/backward recursions, partial trellis and soft counts
//! * `corpus`: `Model` accumulating soft counts over a corpus
//! * `config`: JSON configuration of a model
//!
pub mod common;
pub mod config;
pub mod corpus;
pub mod error;
pub mod hmm;
pub mod init;
pub mod prelude;
pub mod prob;

#[macro_use]
extern crate approx;
