//!
//! Forward algorithm definitions
//!
use super::params::ModelParams;
use super::trace::{NoTrace, Pass, TraceEvent, TraceSink};
use super::trellis::Trellis;
use crate::common::Label;
use crate::error::Result;
use crate::prob::Prob;

// wrappers and exposed functions
impl<S: Label, A: Label> ModelParams<S, A> {
    ///
    /// Run Forward algorithm to the emissions
    ///
    /// `F[i][k]` = P(emits `x[:i] = x[0],...,x[i-1]` and now in state `k`)
    ///
    pub fn forward(&self, sequence: &[A]) -> Result<Trellis> {
        self.forward_traced(sequence, &mut NoTrace)
    }
    ///
    /// Forward algorithm that reports every value and every term to `sink`.
    ///
    pub fn forward_traced<T>(&self, sequence: &[A], sink: &mut T) -> Result<Trellis>
    where
        T: TraceSink<S, A> + ?Sized,
    {
        let emissions = self.encode(sequence)?;
        Ok(self.forward_encoded(&emissions, sink))
    }
    ///
    /// Full probability `P(x) = \sum_k F[n][k]` of the sequence.
    ///
    pub fn full_prob(&self, sequence: &[A]) -> Result<Prob> {
        Ok(self.forward(sequence)?.probability)
    }
    ///
    /// Forward algorithm on alphabet indices.
    ///
    pub(crate) fn forward_encoded<T>(&self, emissions: &[usize], sink: &mut T) -> Trellis
    where
        T: TraceSink<S, A> + ?Sized,
    {
        self.trace_start(Pass::Forward, emissions, sink);
        let init_table = self.f_init();
        self.trace_table(Pass::Forward, 0, &init_table, sink);

        let mut tables: Vec<Vec<Prob>> = Vec::with_capacity(emissions.len());
        for (i, &emission) in emissions.iter().enumerate() {
            let prev = tables.last().unwrap_or(&init_table);
            let table = self.f_step(i, emission, prev, sink);
            self.trace_table(Pass::Forward, i + 1, &table, sink);
            tables.push(table);
        }

        let probability: Prob = tables.last().unwrap_or(&init_table).iter().sum();
        if sink.is_enabled() {
            sink.record(TraceEvent::Probability {
                pass: Pass::Forward,
                value: probability.to_value(),
            });
        }
        Trellis {
            init_table,
            tables,
            probability,
            is_forward: true,
        }
    }
    ///
    /// `F[0][k] = init[k]`
    ///
    pub(crate) fn f_init(&self) -> Vec<Prob> {
        (0..self.n_states()).map(|k| self.p_init(k)).collect()
    }
    ///
    /// Calculate `F[i+1]` from `F[i]` and `x[i]`
    ///
    /// ```text
    /// F[i+1][l] = \sum_k F[i][k] e_k(x[i]) t_kl
    /// ```
    ///
    pub(crate) fn f_step<T>(
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
            .map(|l| {
                (0..n)
                    .map(|k| {
                        let term = prev_table[k] * self.p_emit(k, emission) * self.p_trans(k, l);
                        if sink.is_enabled() {
                            sink.record(TraceEvent::Step {
                                pass: Pass::Forward,
                                t: i + 1,
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
