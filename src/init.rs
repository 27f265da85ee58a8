//!
//! Random initial parameters
//!
//! Omitted tables of a model are filled row by row with probability vectors
//! drawn by an `Initializer`, so the randomness source is always explicit.
//!
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

///
/// Source of normalized probability vectors.
///
pub trait Initializer {
    ///
    /// Draw a vector of `n` non-negative values summing to 1.
    fn simplex(&mut self, n: usize) -> Vec<f64>;
}

///
/// Draws `n` uniform values from `[0, 1)` and normalizes them by their sum.
///
#[derive(Debug, Clone)]
pub struct RandomSimplex<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomSimplex<R> {
    pub fn new(rng: R) -> Self {
        RandomSimplex { rng }
    }
}

impl RandomSimplex<Xoshiro256PlusPlus> {
    ///
    /// Seeded initializer, reproducible across runs.
    pub fn from_seed(seed: u64) -> Self {
        RandomSimplex::new(Xoshiro256PlusPlus::seed_from_u64(seed))
    }
}

impl<R: Rng> Initializer for RandomSimplex<R> {
    fn simplex(&mut self, n: usize) -> Vec<f64> {
        let values: Vec<f64> = (0..n).map(|_| self.rng.gen::<f64>()).collect();
        let total: f64 = values.iter().sum();
        if total > 0.0 {
            values.into_iter().map(|v| v / total).collect()
        } else {
            vec![1.0 / n as f64; n]
        }
    }
}

///
/// Every row is the uniform distribution `1/n`.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl Initializer for Uniform {
    fn simplex(&mut self, n: usize) -> Vec<f64> {
        vec![1.0 / n as f64; n]
    }
}
