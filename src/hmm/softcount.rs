//!
//! Soft counts (E-step of Baum-Welch) from the result of Forward/Backward.
//!
//! - **Contribution** (for each step `i` and each transition `k -> l`)
//!     The posterior probability that the chain moves `k -> l` at step `i`
//!     while `k` emits `x[i]`. Contributions of a single step sum to 1.
//!
//! - **Soft count** (for each transition and each symbol)
//!     The sum of the contributions over the steps emitting the symbol,
//!     i.e. the expected number of `k -> l` transitions emitting `x`.
//!
//! - **Initial soft count**
//!     The contributions of the first step only.
//!
use super::params::ModelParams;
use super::partial::PartialTrellis;
use super::trace::{NoTrace, Pass, TraceEvent, TraceSink};
use super::trellis::{CachedTrellis, TrellisLookup};
use crate::common::{Freq, Label};
use crate::error::{HmmError, Result};
use crate::prob::Prob;
use itertools::Itertools;
use serde::Serialize;

///
/// Expected counts `C[k][l][x]` over `origin x destination x symbol`.
///
/// The shape is fixed when the table is created, and all tables of
/// a model share it.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftCountTable {
    n_states: usize,
    n_symbols: usize,
    /// `[(k * n_states + l) * n_symbols + x]`
    counts: Vec<Freq>,
}

impl SoftCountTable {
    /// all-zero table
    pub fn new(n_states: usize, n_symbols: usize) -> Self {
        SoftCountTable {
            n_states,
            n_symbols,
            counts: vec![0.0; n_states * n_states * n_symbols],
        }
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }
    #[inline]
    fn index(&self, k: usize, l: usize, x: usize) -> usize {
        assert!(k < self.n_states && l < self.n_states && x < self.n_symbols);
        (k * self.n_states + l) * self.n_symbols + x
    }
    /// count of the transition `k -> l` emitting `x`
    pub fn get(&self, k: usize, l: usize, x: usize) -> Freq {
        self.counts[self.index(k, l, x)]
    }
    pub fn get_mut(&mut self, k: usize, l: usize, x: usize) -> &mut Freq {
        let i = self.index(k, l, x);
        &mut self.counts[i]
    }
    pub fn has_same_shape(&self, other: &SoftCountTable) -> bool {
        self.n_states == other.n_states && self.n_symbols == other.n_symbols
    }
    ///
    /// Elementwise addition of `other` into `self`.
    ///
    /// panics if the shapes differ.
    ///
    pub fn merge(&mut self, other: &SoftCountTable) {
        assert!(
            self.has_same_shape(other),
            "merging soft count tables of different shapes"
        );
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += *b;
        }
    }
    ///
    /// iterator of `(k, l, x, count)` for all cells
    ///
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize, Freq)> + '_ {
        let n = self.n_states;
        let m = self.n_symbols;
        self.counts.iter().enumerate().map(move |(i, &c)| {
            let x = i % m;
            let kl = i / m;
            (kl / n, kl % n, x, c)
        })
    }
    /// sum of all counts
    pub fn total(&self) -> Freq {
        self.counts.iter().sum()
    }
    /// `\sum_x C[k][l][x]`, expected number of the transition `k -> l`
    pub fn transition_total(&self, k: usize, l: usize) -> Freq {
        (0..self.n_symbols).map(|x| self.get(k, l, x)).sum()
    }
    /// `\sum_{k,l} C[k][l][x]`, expected number of emissions of `x`
    pub fn symbol_total(&self, x: usize) -> Freq {
        self.iter()
            .filter(|&(_, _, y, _)| y == x)
            .map(|(_, _, _, c)| c)
            .sum()
    }
    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0.0)
    }
    ///
    /// max `|C_a - C_b|` over all cells
    ///
    pub fn diff(&self, other: &SoftCountTable) -> f64 {
        assert!(self.has_same_shape(other));
        self.counts
            .iter()
            .zip(other.counts.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }
}

impl<'a> std::ops::AddAssign<&'a SoftCountTable> for SoftCountTable {
    fn add_assign(&mut self, other: &'a SoftCountTable) {
        self.merge(other);
    }
}

///
/// Soft counts of a single sequence.
///
#[derive(Debug, Clone)]
pub struct SequenceCounts {
    /// contributions of all steps
    pub general: SoftCountTable,
    /// contributions of the first step
    pub initial: SoftCountTable,
    /// full probability `P(x)` used as the denominator
    pub probability: Prob,
}

///
/// Soft count estimation
///
impl<S: Label, A: Label> ModelParams<S, A> {
    /// all-zero table over the states and alphabet of this model
    pub fn empty_soft_counts(&self) -> SoftCountTable {
        SoftCountTable::new(self.n_states(), self.n_symbols())
    }
    ///
    /// Soft counts of the sequence, from cached forward/backward trellis.
    ///
    /// Fails with `DegenerateSequence` if `P(x)` is zero or below `epsilon`.
    ///
    pub fn soft_counts(&self, sequence: &[A], epsilon: f64) -> Result<SequenceCounts> {
        self.soft_counts_traced(sequence, epsilon, &mut NoTrace)
    }
    ///
    /// `soft_counts` reporting the forward, backward and soft count
    /// passes to `sink`.
    ///
    pub fn soft_counts_traced<T>(
        &self,
        sequence: &[A],
        epsilon: f64,
        sink: &mut T,
    ) -> Result<SequenceCounts>
    where
        T: TraceSink<S, A> + ?Sized,
    {
        let emissions = self.encode(sequence)?;
        let forward = self.forward_encoded(&emissions, sink);
        let backward = self.backward_encoded(&emissions, sink);
        let o = CachedTrellis::new(forward, backward);
        self.estimate_encoded(&emissions, &o, o.to_full_prob_forward(), epsilon, sink)
    }
    ///
    /// Soft counts of the sequence, recomputing every forward/backward
    /// value from scratch with `PartialTrellis`.
    ///
    /// Same result as `soft_counts` in quadratic time.
    ///
    pub fn soft_counts_recomputed(&self, sequence: &[A], epsilon: f64) -> Result<SequenceCounts> {
        let emissions = self.encode(sequence)?;
        let probability = self.forward_encoded(&emissions, &mut NoTrace).probability;
        let partial = PartialTrellis::from_encoded(self, emissions.clone());
        self.estimate_encoded(&emissions, &partial, probability, epsilon, &mut NoTrace)
    }
    ///
    /// Soft counts of the sequence with an arbitrary source of forward and
    /// backward values, and the full probability `probability` of the
    /// sequence.
    ///
    pub fn estimate_soft_counts<L, T>(
        &self,
        sequence: &[A],
        lookup: &L,
        probability: Prob,
        epsilon: f64,
        sink: &mut T,
    ) -> Result<SequenceCounts>
    where
        L: TrellisLookup,
        T: TraceSink<S, A> + ?Sized,
    {
        let emissions = self.encode(sequence)?;
        self.estimate_encoded(&emissions, lookup, probability, epsilon, sink)
    }
    ///
    /// ```text
    /// C[k][l][x[i]] += F[i][k] t_kl e_k(x[i]) B[i+1][l] / P(x)
    /// ```
    ///
    fn estimate_encoded<L, T>(
        &self,
        emissions: &[usize],
        lookup: &L,
        probability: Prob,
        epsilon: f64,
        sink: &mut T,
    ) -> Result<SequenceCounts>
    where
        L: TrellisLookup,
        T: TraceSink<S, A> + ?Sized,
    {
        if probability.is_zero() || probability.to_value() < epsilon {
            return Err(HmmError::DegenerateSequence {
                probability: probability.to_value(),
                epsilon,
            });
        }
        self.trace_start(Pass::SoftCounts, emissions, sink);

        let n = self.n_states();
        let mut general = self.empty_soft_counts();
        let mut initial = self.empty_soft_counts();
        for (i, &x) in emissions.iter().enumerate() {
            for k in 0..n {
                let f = lookup.alpha(i, k);
                let p_emit = self.p_emit(k, x);
                for l in 0..n {
                    let c = f * self.p_trans(k, l) * p_emit * lookup.beta(i + 1, l) / probability;
                    let value = c.to_value();
                    *general.get_mut(k, l, x) += value;
                    if i == 0 {
                        *initial.get_mut(k, l, x) += value;
                    }
                    if sink.is_enabled() {
                        sink.record(TraceEvent::SoftCount {
                            t: i,
                            symbol: self.alphabet().get(x).clone(),
                            origin: self.states().get(k).clone(),
                            dest: self.states().get(l).clone(),
                            value,
                        });
                    }
                }
            }
        }
        Ok(SequenceCounts {
            general,
            initial,
            probability,
        })
    }
}

///
/// Label-based access to soft count tables
///
impl<S: Label, A: Label> ModelParams<S, A> {
    ///
    /// count of the transition `origin -> dest` emitting `symbol`
    ///
    pub fn soft_count(
        &self,
        table: &SoftCountTable,
        origin: &S,
        dest: &S,
        symbol: &A,
    ) -> Result<Freq> {
        let k = self.state_index(origin)?;
        let l = self.state_index(dest)?;
        let x = self.symbol_index(symbol)?;
        Ok(table.get(k, l, x))
    }
    ///
    /// Render the table as rows of `symbol origin dest count`, symbols
    /// sorted by their printed form.
    ///
    pub fn show_soft_counts<'a>(&'a self, table: &'a SoftCountTable) -> SoftCountsDisplay<'a, S, A> {
        assert!(table.has_same_shape(&self.empty_soft_counts()));
        SoftCountsDisplay {
            params: self,
            table,
        }
    }
}

pub struct SoftCountsDisplay<'a, S: Label, A: Label> {
    params: &'a ModelParams<S, A>,
    table: &'a SoftCountTable,
}

impl<'a, S: Label, A: Label> std::fmt::Display for SoftCountsDisplay<'a, S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let n = self.params.n_states();
        let alphabet = self.params.alphabet();
        let order = (0..alphabet.len()).sorted_by_key(|&x| alphabet.get(x).to_string());
        for x in order {
            let symbol = alphabet.get(x);
            for k in 0..n {
                for l in 0..n {
                    writeln!(
                        f,
                        "\t{}\t{}\t{}\t{:.3}",
                        symbol,
                        self.params.states().get(k),
                        self.params.states().get(l),
                        self.table.get(k, l, x)
                    )?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::{mock_random, mock_sequence, mock_sparse, mock_two_state};
    use crate::hmm::trace::VecSink;
    use test_case::test_case;

    #[test]
    fn soft_counts_two_state() {
        let params = mock_two_state();
        let r = params.soft_counts(&['a', '#'], 0.0).unwrap();
        assert_abs_diff_eq!(r.probability.to_value(), 0.121, epsilon = 1e-12);
        // step 0: F[0][k] t_kl e_k(a) B[1][l]
        let c = |o: u32, d: u32, x: char| params.soft_count(&r.general, &o, &d, &x).unwrap();
        assert_abs_diff_eq!(c(0, 0, 'a'), 0.03 / 0.121, epsilon = 1e-12);
        assert_abs_diff_eq!(c(0, 1, 'a'), 0.05 / 0.121, epsilon = 1e-12);
        assert_abs_diff_eq!(c(1, 0, 'a'), 0.006 / 0.121, epsilon = 1e-12);
        assert_abs_diff_eq!(c(1, 1, 'a'), 0.035 / 0.121, epsilon = 1e-12);
        // step 1: F[1][k] t_kl e_k(#) B[2][l]
        assert_abs_diff_eq!(c(0, 0, '#'), 0.0216 / 0.121, epsilon = 1e-12);
        assert_abs_diff_eq!(c(1, 1, '#'), 0.0595 / 0.121, epsilon = 1e-12);
        assert_eq!(c(0, 0, 'b'), 0.0);
        // each step is a posterior distribution over transitions
        assert_abs_diff_eq!(r.general.symbol_total(0), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.general.symbol_total(2), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.general.total(), 2.0, epsilon = 1e-12);
        // initial counts hold only the first step
        assert_abs_diff_eq!(r.initial.total(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            params.soft_count(&r.initial, &0, &1, &'a').unwrap(),
            0.05 / 0.121,
            epsilon = 1e-12
        );
        assert_eq!(params.soft_count(&r.initial, &0, &0, &'#').unwrap(), 0.0);
    }
    #[test_case(2, 3, 0, 5)]
    #[test_case(3, 3, 1, 20)]
    #[test_case(4, 6, 2, 100)]
    fn soft_counts_posterior_per_step(n_states: u32, n_symbols: u8, seed: u64, length: usize) {
        let params = mock_random(n_states, n_symbols, seed);
        let seq = mock_sequence(length, n_symbols, seed + 1);
        let mut sink = VecSink::new();
        let r = params.soft_counts_traced(&seq, 0.0, &mut sink).unwrap();
        let mut per_step = vec![0.0; length];
        for e in sink.events.iter() {
            if let TraceEvent::SoftCount { t, value, .. } = e {
                per_step[*t] += value;
            }
        }
        for s in per_step {
            assert_abs_diff_eq!(s, 1.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(r.general.total(), length as f64, epsilon = 1e-8);
        assert_abs_diff_eq!(r.initial.total(), 1.0, epsilon = 1e-9);
    }
    #[test]
    fn soft_counts_cached_equals_recomputed() {
        let params = mock_random(3, 4, 5);
        let seq = mock_sequence(15, 4, 6);
        let a = params.soft_counts(&seq, 0.0).unwrap();
        let b = params.soft_counts_recomputed(&seq, 0.0).unwrap();
        assert_eq!(a.general, b.general);
        assert_eq!(a.initial, b.initial);
        assert_eq!(a.probability, b.probability);
    }
    #[test]
    fn soft_counts_with_explicit_lookup() {
        let params = mock_two_state();
        let seq = ['b', 'a', 'b'];
        let partial = params.partial(&seq).unwrap();
        let p = params.full_prob(&seq).unwrap();
        let r = params
            .estimate_soft_counts(&seq, &partial, p, 0.0, &mut NoTrace)
            .unwrap();
        let expected = params.soft_counts(&seq, 0.0).unwrap();
        assert_eq!(r.general, expected.general);
    }
    #[test]
    fn soft_counts_empty_sequence() {
        let params = mock_two_state();
        let r = params.soft_counts(&[], 0.0).unwrap();
        assert!(r.general.is_zero());
        assert!(r.initial.is_zero());
        assert_abs_diff_eq!(r.probability.to_value(), 1.0, epsilon = 1e-12);
    }
    #[test]
    fn soft_counts_degenerate_sequence() {
        let params = mock_sparse();
        // fine
        let r = params.soft_counts(&['a', '#'], 0.0).unwrap();
        assert_abs_diff_eq!(r.probability.to_value(), 0.25, epsilon = 1e-12);
        // `b` is impossible
        assert!(matches!(
            params.soft_counts(&['a', 'b'], 0.0),
            Err(HmmError::DegenerateSequence { .. })
        ));
        // below epsilon
        match params.soft_counts(&['a', '#'], 0.3) {
            Err(HmmError::DegenerateSequence {
                probability,
                epsilon,
            }) => {
                assert_abs_diff_eq!(probability, 0.25, epsilon = 1e-12);
                assert_eq!(epsilon, 0.3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
    #[test]
    fn soft_counts_epsilon_boundary() {
        let params = mock_sparse();
        let seq = ['a', '#'];
        let p = params.full_prob(&seq).unwrap().to_value();
        // a sequence exactly at epsilon is kept
        let r = params.soft_counts(&seq, p).unwrap();
        assert_abs_diff_eq!(r.general.total(), 2.0, epsilon = 1e-12);
        // just above it is degenerate
        let e = params.soft_counts(&seq, p * (1.0 + 1e-9)).unwrap_err();
        assert!(matches!(e, HmmError::DegenerateSequence { .. }));
        assert!(e.to_string().contains("is zero or below epsilon"));
    }
    #[test]
    fn soft_counts_unknown_symbol() {
        let params = mock_two_state();
        assert!(matches!(
            params.soft_counts(&['a', '!'], 0.0),
            Err(HmmError::UnknownSymbol { .. })
        ));
    }
    #[test]
    fn soft_count_table_merge() {
        let params = mock_two_state();
        let r = params.soft_counts(&['a', 'b', '#'], 0.0).unwrap();
        // merging with itself doubles every cell
        let mut doubled = r.general.clone();
        doubled.merge(&r.general);
        for (k, l, x, c) in doubled.iter() {
            assert_eq!(c, 2.0 * r.general.get(k, l, x));
        }
        // merging with zero is identity
        let mut same = r.general.clone();
        same += &params.empty_soft_counts();
        assert_eq!(same, r.general);
        assert_eq!(same.diff(&r.general), 0.0);
    }
    #[test]
    #[should_panic]
    fn soft_count_table_merge_shape_mismatch() {
        let mut a = SoftCountTable::new(2, 3);
        let b = SoftCountTable::new(3, 3);
        a.merge(&b);
    }
    #[test]
    fn soft_count_table_iter_order() {
        let mut t = SoftCountTable::new(2, 3);
        *t.get_mut(1, 0, 2) = 5.0;
        let cells: Vec<(usize, usize, usize, Freq)> = t.iter().filter(|c| c.3 != 0.0).collect();
        assert_eq!(cells, vec![(1, 0, 2, 5.0)]);
        assert_eq!(t.iter().count(), 12);
        assert_eq!(t.transition_total(1, 0), 5.0);
        assert_eq!(t.symbol_total(2), 5.0);
    }
    #[test]
    fn soft_counts_display() {
        let params = mock_two_state();
        let r = params.soft_counts(&['a'], 0.0).unwrap();
        let s = params.show_soft_counts(&r.general).to_string();
        println!("{}", s);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 3 * 4);
        // symbols in sorted order: '#', 'a', 'b'
        assert_eq!(lines[0], "\t#\t0\t0\t0.000");
        // 0.5 * 0.6 * 0.5 / (0.18 + 0.17)
        assert_eq!(lines[4], "\ta\t0\t0\t0.429");
        assert_eq!(lines[8], "\tb\t0\t0\t0.000");
    }
}
