//!
//! Mock models for testing
//!
use super::params::ModelParams;
use crate::init::RandomSimplex;

///
/// Two states `{0, 1}` over the alphabet `{a, b, #}`
///
/// ```text
/// init  = [0.5, 0.5]
/// trans = [[0.6, 0.4],
///          [0.3, 0.7]]
/// emit  =    a    b    #
///     0  [0.5, 0.3, 0.2]
///     1  [0.2, 0.3, 0.5]
/// ```
///
pub fn mock_two_state() -> ModelParams<u32, char> {
    ModelParams::new(
        vec![0, 1],
        vec!['a', 'b', '#'],
        vec![0.5, 0.5],
        vec![vec![0.6, 0.4], vec![0.3, 0.7]],
        vec![vec![0.5, 0.3, 0.2], vec![0.2, 0.3, 0.5]],
    )
    .unwrap()
}

///
/// Two states where the chain starts in state `0` and never leaves it.
/// State `0` never emits `b`, so any sequence containing `b` has
/// probability zero.
///
pub fn mock_sparse() -> ModelParams<u32, char> {
    ModelParams::new(
        vec![0, 1],
        vec!['a', 'b', '#'],
        vec![1.0, 0.0],
        vec![vec![1.0, 0.0], vec![0.0, 1.0]],
        vec![vec![0.5, 0.0, 0.5], vec![0.5, 0.5, 0.0]],
    )
    .unwrap()
}

///
/// Random model with `n_states` states over the lowercase letters
/// `a..` of size `n_symbols`.
///
pub fn mock_random(n_states: u32, n_symbols: u8, seed: u64) -> ModelParams<u32, char> {
    let states = (0..n_states).collect();
    let alphabet = (0..n_symbols).map(|i| (b'a' + i) as char).collect();
    ModelParams::random(states, alphabet, &mut RandomSimplex::from_seed(seed)).unwrap()
}

///
/// Random sequence over the first `n_symbols` lowercase letters.
///
pub fn mock_sequence(length: usize, n_symbols: u8, seed: u64) -> Vec<char> {
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256PlusPlus;
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    (0..length)
        .map(|_| (b'a' + rng.gen_range(0..n_symbols)) as char)
        .collect()
}
