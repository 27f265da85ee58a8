//!
//! Model with corpus-level soft count accumulation
//!
//! `Model` owns the parameters, a corpus, and two persistent soft count
//! tables (general and initial). A corpus pass runs the E-step on every
//! sequence in corpus order and folds the per-sequence tables into the
//! persistent ones.
//!
use crate::common::Label;
use crate::config::ModelConfig;
use crate::error::{HmmError, Result};
use crate::hmm::params::ModelParams;
use crate::hmm::softcount::{SequenceCounts, SoftCountTable};
use crate::hmm::trace::{LogSink, NoTrace, TraceEvent, TraceSink};
use crate::init::Initializer;
use crate::prob::Prob;
use log::{info, warn};
use rayon::prelude::*;

///
/// What a corpus pass does with a sequence that fails.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// stop the pass and return the error; the persistent tables are left
    /// as they were before the pass
    Abort,
    /// log the error and continue with the next sequence
    Skip,
}

impl Default for OnError {
    fn default() -> Self {
        OnError::Abort
    }
}

pub struct Model<S: Label, A: Label, T: TraceSink<S, A> = LogSink> {
    params: ModelParams<S, A>,
    corpus: Vec<Vec<A>>,
    /// general soft counts accumulated over corpus passes
    soft_counts: SoftCountTable,
    /// soft counts of the first position accumulated over corpus passes
    initial_soft_counts: SoftCountTable,
    epsilon: f64,
    verbose: bool,
    sink: T,
}

impl<S: Label, A: Label> Model<S, A> {
    ///
    /// Model with fixed parameters, not verbose, `epsilon = 0`.
    ///
    pub fn new(params: ModelParams<S, A>, corpus: Vec<Vec<A>>) -> Self {
        let soft_counts = params.empty_soft_counts();
        let initial_soft_counts = params.empty_soft_counts();
        info!(
            "model of {} states and {} symbols, {} sequences",
            params.n_states(),
            params.n_symbols(),
            corpus.len()
        );
        Model {
            params,
            corpus,
            soft_counts,
            initial_soft_counts,
            epsilon: 0.0,
            verbose: false,
            sink: LogSink,
        }
    }
    ///
    /// Build a model from the configuration, drawing omitted tables
    /// from `init`.
    ///
    pub fn from_config<I: Initializer>(config: ModelConfig<S, A>, init: &mut I) -> Result<Self> {
        let params = config.to_params(init)?;
        let mut model = Model::new(params, config.corpus).with_verbose(config.verbose);
        model.epsilon = config.epsilon;
        Ok(model)
    }
}

impl<S: Label, A: Label, T: TraceSink<S, A>> Model<S, A, T> {
    ///
    /// Replace the trace sink. Trace records are emitted only when the model
    /// is verbose.
    ///
    pub fn with_sink<U: TraceSink<S, A>>(self, sink: U) -> Model<S, A, U> {
        Model {
            params: self.params,
            corpus: self.corpus,
            soft_counts: self.soft_counts,
            initial_soft_counts: self.initial_soft_counts,
            epsilon: self.epsilon,
            verbose: self.verbose,
            sink,
        }
    }
    ///
    /// Turning verbose on dumps the parameters to the current sink.
    ///
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        if verbose && self.sink.is_enabled() {
            let text = self.params.to_string();
            self.sink.record(TraceEvent::Report {
                title: "Initial parameters".to_string(),
                text,
            });
        }
        self
    }
    pub fn with_epsilon(mut self, epsilon: f64) -> Result<Self> {
        if !(epsilon >= 0.0) {
            return Err(HmmError::invalid_configuration(format!(
                "epsilon {} is not a non-negative number",
                epsilon
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }
    pub fn params(&self) -> &ModelParams<S, A> {
        &self.params
    }
    pub fn corpus(&self) -> &[Vec<A>] {
        &self.corpus
    }
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
    pub fn sink(&self) -> &T {
        &self.sink
    }
    pub fn sink_mut(&mut self) -> &mut T {
        &mut self.sink
    }
    /// general soft counts accumulated so far
    pub fn general_soft_counts(&self) -> &SoftCountTable {
        &self.soft_counts
    }
    /// initial soft counts accumulated so far
    pub fn initial_soft_counts(&self) -> &SoftCountTable {
        &self.initial_soft_counts
    }
    ///
    /// Clear both persistent tables to start a new accumulation.
    ///
    pub fn reset_soft_counts(&mut self) {
        self.soft_counts = self.params.empty_soft_counts();
        self.initial_soft_counts = self.params.empty_soft_counts();
    }
}

//
// per-sequence queries
//
impl<S: Label, A: Label, T: TraceSink<S, A>> Model<S, A, T> {
    ///
    /// `P(x)` as a plain probability.
    ///
    pub fn sequence_probability(&mut self, sequence: &[A]) -> Result<f64> {
        Ok(self.sequence_prob(sequence)?.to_value())
    }
    ///
    /// `P(x)` in log space.
    ///
    pub fn sequence_prob(&mut self, sequence: &[A]) -> Result<Prob> {
        let trellis = if self.verbose {
            self.params.forward_traced(sequence, &mut self.sink)?
        } else {
            self.params.forward(sequence)?
        };
        Ok(trellis.probability)
    }
    ///
    /// General soft counts of a single sequence. The persistent tables are
    /// not touched.
    ///
    pub fn soft_counts(&mut self, sequence: &[A]) -> Result<SoftCountTable> {
        Ok(self.sequence_counts(sequence)?.general)
    }
    ///
    /// General and initial soft counts of a single sequence, with `P(x)`.
    /// The persistent tables are not touched.
    ///
    pub fn sequence_counts(&mut self, sequence: &[A]) -> Result<SequenceCounts> {
        estimate(
            &self.params,
            sequence,
            self.epsilon,
            self.verbose,
            &mut self.sink,
        )
    }
}

//
// corpus passes
//
impl<S: Label, A: Label, T: TraceSink<S, A>> Model<S, A, T> {
    ///
    /// E-step over the whole corpus, aborting on the first failing sequence.
    ///
    /// Returns the persistent `(general, initial)` tables after the pass.
    ///
    pub fn run_corpus_e_step(&mut self) -> Result<(SoftCountTable, SoftCountTable)> {
        self.run_corpus_e_step_with(OnError::Abort)
    }
    ///
    /// E-step over the whole corpus, in corpus order.
    ///
    pub fn run_corpus_e_step_with(
        &mut self,
        on_error: OnError,
    ) -> Result<(SoftCountTable, SoftCountTable)> {
        let mut acc = Accumulator::new(&self.soft_counts, &self.initial_soft_counts, on_error);
        for (index, sequence) in self.corpus.iter().enumerate() {
            let result = estimate(
                &self.params,
                sequence,
                self.epsilon,
                self.verbose,
                &mut self.sink,
            );
            acc.fold::<S, A, T>(index, result, self.verbose, &mut self.sink)?;
        }
        Ok(self.commit(acc))
    }
    ///
    /// E-step over the whole corpus with the per-sequence counts computed in
    /// parallel by rayon.
    ///
    /// The counts are folded in corpus order afterwards, so the totals are
    /// identical to `run_corpus_e_step_with`. Per-sequence trace records
    /// are not emitted; `SequenceDone`/`SequenceSkipped` are.
    ///
    pub fn run_corpus_e_step_parallel(
        &mut self,
        on_error: OnError,
    ) -> Result<(SoftCountTable, SoftCountTable)>
    where
        S: Send + Sync,
        A: Send + Sync,
    {
        let params = &self.params;
        let epsilon = self.epsilon;
        let results: Vec<Result<SequenceCounts>> = self
            .corpus
            .par_iter()
            .map(|sequence| params.soft_counts(sequence, epsilon))
            .collect();

        let mut acc = Accumulator::new(&self.soft_counts, &self.initial_soft_counts, on_error);
        for (index, result) in results.into_iter().enumerate() {
            acc.fold::<S, A, T>(index, result, self.verbose, &mut self.sink)?;
        }
        Ok(self.commit(acc))
    }
    fn commit(&mut self, acc: Accumulator) -> (SoftCountTable, SoftCountTable) {
        if self.verbose && self.sink.is_enabled() {
            let general = self.params.show_soft_counts(&acc.general).to_string();
            let initial = self.params.show_soft_counts(&acc.initial).to_string();
            self.sink.record(TraceEvent::Report {
                title: "Soft counts".to_string(),
                text: general,
            });
            self.sink.record(TraceEvent::Report {
                title: "Initial counts".to_string(),
                text: initial,
            });
        }
        info!(
            "corpus pass: {} sequences folded, {} skipped, general total {}, initial total {}",
            acc.n_done,
            acc.n_skipped,
            acc.general.total(),
            acc.initial.total()
        );
        self.soft_counts = acc.general;
        self.initial_soft_counts = acc.initial;
        (self.soft_counts.clone(), self.initial_soft_counts.clone())
    }
}

fn estimate<S, A, T>(
    params: &ModelParams<S, A>,
    sequence: &[A],
    epsilon: f64,
    verbose: bool,
    sink: &mut T,
) -> Result<SequenceCounts>
where
    S: Label,
    A: Label,
    T: TraceSink<S, A> + ?Sized,
{
    if verbose {
        let counts = params.soft_counts_traced(sequence, epsilon, sink)?;
        if sink.is_enabled() {
            sink.record(TraceEvent::Report {
                title: "Expected counts table".to_string(),
                text: params.show_soft_counts(&counts.general).to_string(),
            });
        }
        Ok(counts)
    } else {
        params.soft_counts_traced(sequence, epsilon, &mut NoTrace)
    }
}

///
/// Working copy of the persistent tables during a corpus pass.
///
struct Accumulator {
    general: SoftCountTable,
    initial: SoftCountTable,
    on_error: OnError,
    n_done: usize,
    n_skipped: usize,
}

impl Accumulator {
    fn new(general: &SoftCountTable, initial: &SoftCountTable, on_error: OnError) -> Self {
        Accumulator {
            general: general.clone(),
            initial: initial.clone(),
            on_error,
            n_done: 0,
            n_skipped: 0,
        }
    }
    fn fold<S, A, T>(
        &mut self,
        index: usize,
        result: Result<SequenceCounts>,
        verbose: bool,
        sink: &mut T,
    ) -> Result<()>
    where
        S: Label,
        A: Label,
        T: TraceSink<S, A> + ?Sized,
    {
        match result {
            Ok(counts) => {
                self.general += &counts.general;
                self.initial += &counts.initial;
                self.n_done += 1;
                if verbose && sink.is_enabled() {
                    sink.record(TraceEvent::SequenceDone {
                        index,
                        probability: counts.probability.to_value(),
                    });
                }
                Ok(())
            }
            Err(e) => match self.on_error {
                OnError::Abort => Err(e),
                OnError::Skip => {
                    warn!("sequence #{} skipped: {}", index, e);
                    self.n_skipped += 1;
                    if verbose && sink.is_enabled() {
                        sink.record(TraceEvent::SequenceSkipped {
                            index,
                            reason: e.to_string(),
                        });
                    }
                    Ok(())
                }
            },
        }
    }
}
