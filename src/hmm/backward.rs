//!
//! Backward algorithm definitions
//!
use super::params::ModelParams;
use super::trace::{NoTrace, Pass, TraceEvent, TraceSink};
use super::trellis::Trellis;
use crate::common::Label;
use crate::error::Result;
use crate::prob::Prob;

///
/// Backward Algorithm
///
impl<S: Label, A: Label> ModelParams<S, A> {
    ///
    /// Run Backward algorithm to the emissions
    ///
    /// `B[i][k]` = P(emits `x[i:] = x[i], ..., x[n-1]` | starts from state `k`)
    ///
    pub fn backward(&self, sequence: &[A]) -> Result<Trellis> {
        self.backward_traced(sequence, &mut NoTrace)
    }
    ///
    /// Backward algorithm that reports every value and every term to `sink`.
    ///
    pub fn backward_traced<T>(&self, sequence: &[A], sink: &mut T) -> Result<Trellis>
    where
        T: TraceSink<S, A> + ?Sized,
    {
        let emissions = self.encode(sequence)?;
        Ok(self.backward_encoded(&emissions, sink))
    }
    ///
    /// Backward algorithm on alphabet indices.
    ///
    pub(crate) fn backward_encoded<T>(&self, emissions: &[usize], sink: &mut T) -> Trellis
    where
        T: TraceSink<S, A> + ?Sized,
    {
        self.trace_start(Pass::Backward, emissions, sink);
        let n_emissions = emissions.len();
        let init_table = self.b_init();
        self.trace_table(Pass::Backward, n_emissions, &init_table, sink);

        // feed the emissions backward
        let mut tables: Vec<Vec<Prob>> = Vec::with_capacity(n_emissions);
        for (i, &emission) in emissions.iter().enumerate().rev() {
            let prev = tables.last().unwrap_or(&init_table);
            let table = self.b_step(i, emission, prev, sink);
            self.trace_table(Pass::Backward, i, &table, sink);
            tables.push(table);
        }
        // reverse the vector, to order the tables along with emissions
        // i.e. tables[i] corresponds to the emissions[i]
        tables.reverse();

        let first = tables.first().unwrap_or(&init_table);
        let probability: Prob = (0..self.n_states())
            .map(|k| self.p_init(k) * first[k])
            .sum();
        if sink.is_enabled() {
            sink.record(TraceEvent::Probability {
                pass: Pass::Backward,
                value: probability.to_value(),
            });
        }
        Trellis {
            init_table,
            tables,
            probability,
            is_forward: false,
        }
    }
    ///
    /// `B[n][k] = 1`
    ///
    pub(crate) fn b_init(&self) -> Vec<Prob> {
        vec![Prob::one(); self.n_states()]
    }
    ///
    /// Calculate `B[i]` from `B[i+1]` and `x[i]`
    ///
    /// ```text
    /// B[i][k] = \sum_l B[i+1][l] e_k(x[i]) t_kl
    /// ```
    ///
    pub(crate) fn b_step<T>(
        &self,
        i: usize,
        emission: usize,
        prev_table: &[Prob],
        sink: &mut T,
    ) -> Vec<Prob>
    where
        T: TraceSink<S, A> + ?Sized,
    {
        let n = self.n_states();
        (0..n)
            .map(|k| {
                let p_emit = self.p_emit(k, emission);
                (0..n)
                    .map(|l| {
                        let term = prev_table[l] * p_emit * self.p_trans(k, l);
                        if sink.is_enabled() {
                            sink.record(TraceEvent::Step {
                                pass: Pass::Backward,
                                t: i,
                                symbol: self.alphabet().get(emission).clone(),
                                origin: self.states().get(k).clone(),
                                dest: self.states().get(l).clone(),
                                value: term.to_value(),
                            });
                        }
                        term
                    })
                    .sum::<Prob>()
            })
            .collect()
    }
}

//
// Tests
//
