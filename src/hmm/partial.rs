//!
//! Single forward/backward values without keeping the trellis
//!
//! `PartialTrellis` reruns the recursion from the boundary every time a
//! value is requested. Using it as a `TrellisLookup` makes a soft count
//! pass quadratic in the sequence length; `CachedTrellis` gives the same
//! numbers in linear time.
//!
use super::params::ModelParams;
use super::trace::NoTrace;
use super::trellis::TrellisLookup;
use crate::common::Label;
use crate::error::Result;
use crate::prob::Prob;

#[derive(Debug, Clone)]
pub struct PartialTrellis<'a, S: Label, A: Label> {
    params: &'a ModelParams<S, A>,
    emissions: Vec<usize>,
}

impl<'a, S: Label, A: Label> PartialTrellis<'a, S, A> {
    pub fn new(params: &'a ModelParams<S, A>, sequence: &[A]) -> Result<Self> {
        let emissions = params.encode(sequence)?;
        Ok(PartialTrellis::from_encoded(params, emissions))
    }
    pub(crate) fn from_encoded(params: &'a ModelParams<S, A>, emissions: Vec<usize>) -> Self {
        PartialTrellis { params, emissions }
    }
    pub fn n_emissions(&self) -> usize {
        self.emissions.len()
    }
    ///
    /// `F[t][k]`, by running `t` forward steps from `F[0]`.
    ///
    /// panics if `t > n`.
    ///
    pub fn alpha_at(&self, t: usize, k: usize) -> Prob {
        assert!(t <= self.n_emissions());
        let mut table = self.params.f_init();
        for i in 0..t {
            table = self
                .params
                .f_step(i, self.emissions[i], &table, &mut NoTrace);
        }
        table[k]
    }
    ///
    /// `B[t][k]`, by running `n - t` backward steps from `B[n]`.
    ///
    /// panics if `t > n`.
    ///
    pub fn beta_at(&self, t: usize, k: usize) -> Prob {
        assert!(t <= self.n_emissions());
        let mut table = self.params.b_init();
        for i in (t..self.n_emissions()).rev() {
            table = self
                .params
                .b_step(i, self.emissions[i], &table, &mut NoTrace);
        }
        table[k]
    }
    /// `F[t][state]` by state label
    pub fn alpha_of(&self, t: usize, state: &S) -> Result<Prob> {
        let k = self.params.state_index(state)?;
        Ok(self.alpha_at(t, k))
    }
    /// `B[t][state]` by state label
    pub fn beta_of(&self, t: usize, state: &S) -> Result<Prob> {
        let k = self.params.state_index(state)?;
        Ok(self.beta_at(t, k))
    }
}

impl<'a, S: Label, A: Label> TrellisLookup for PartialTrellis<'a, S, A> {
    fn alpha(&self, t: usize, k: usize) -> Prob {
        self.alpha_at(t, k)
    }
    fn beta(&self, t: usize, k: usize) -> Prob {
        self.beta_at(t, k)
    }
}

impl<S: Label, A: Label> ModelParams<S, A> {
    ///
    /// Create a `PartialTrellis` of the sequence.
    ///
    pub fn partial<'a>(&'a self, sequence: &[A]) -> Result<PartialTrellis<'a, S, A>> {
        PartialTrellis::new(self, sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HmmError;
    use crate::hmm::mocks::{mock_random, mock_sequence, mock_two_state};

    #[test]
    fn partial_matches_full_trellis() {
        let params = mock_random(3, 4, 7);
        let seq = mock_sequence(12, 4, 8);
        let f = params.forward(&seq).unwrap();
        let b = params.backward(&seq).unwrap();
        let partial = params.partial(&seq).unwrap();
        for t in 0..=seq.len() {
            for k in 0..params.n_states() {
                assert_eq!(partial.alpha_at(t, k), f.value(t, k));
                assert_eq!(partial.beta_at(t, k), b.value(t, k));
            }
        }
    }
    #[test]
    fn partial_by_label() {
        let params = mock_two_state();
        let partial = params.partial(&['a', '#']).unwrap();
        assert_abs_diff_eq!(partial.alpha_of(1, &1).unwrap().to_value(), 0.17, epsilon = 1e-12);
        assert_abs_diff_eq!(partial.beta_of(0, &0).unwrap().to_value(), 0.16, epsilon = 1e-12);
        assert!(matches!(
            partial.alpha_of(1, &5),
            Err(HmmError::UnknownState { .. })
        ));
        assert!(matches!(
            params.partial(&['a', '?']),
            Err(HmmError::UnknownSymbol { .. })
        ));
    }
    #[test]
    #[should_panic]
    fn partial_out_of_range() {
        let params = mock_two_state();
        let partial = params.partial(&['a']).unwrap();
        partial.alpha_at(2, 0);
    }
}
