//!
//! Structured trace of the recursions
//!
//! The forward/backward passes and the soft count estimator report every
//! intermediate value to a `TraceSink`. Events are built only when the
//! sink is enabled, so `NoTrace` costs nothing.
//!
use super::params::ModelParams;
use crate::common::Label;
use crate::prob::Prob;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Backward,
    SoftCounts,
}

impl std::fmt::Display for Pass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Pass::Forward => write!(f, "forward"),
            Pass::Backward => write!(f, "backward"),
            Pass::SoftCounts => write!(f, "soft count"),
        }
    }
}

///
/// A single trace record.
///
/// * `Value`: `F[t][state]` or `B[t][state]`, boundary rows included.
/// * `Step`: one term `origin -> dest` of the sum that produced the value
///   at `t`. The symbol is `x[t-1]` for forward and `x[t]` for backward.
/// * `SoftCount`: contribution of the transition `origin -> dest` at step
///   `t`, emitting `x[t]`.
/// * `Report`: a titled multi-line dump (parameters, soft count tables).
///
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent<S, A> {
    SequenceStart {
        pass: Pass,
        sequence: Vec<A>,
    },
    Value {
        pass: Pass,
        t: usize,
        state: S,
        value: f64,
    },
    Step {
        pass: Pass,
        t: usize,
        symbol: A,
        origin: S,
        dest: S,
        value: f64,
    },
    Probability {
        pass: Pass,
        value: f64,
    },
    SoftCount {
        t: usize,
        symbol: A,
        origin: S,
        dest: S,
        value: f64,
    },
    SequenceDone {
        index: usize,
        probability: f64,
    },
    SequenceSkipped {
        index: usize,
        reason: String,
    },
    Report {
        title: String,
        text: String,
    },
}

impl<S: Label, A: Label> std::fmt::Display for TraceEvent<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TraceEvent::SequenceStart { pass, sequence } => {
                write!(f, "{} pass for '", pass)?;
                for symbol in sequence {
                    write!(f, "{}", symbol)?;
                }
                write!(f, "'")
            }
            TraceEvent::Value {
                pass,
                t,
                state,
                value,
            } => write!(
                f,
                "{} value of state {} at time {} is {}",
                pass, state, t, value
            ),
            TraceEvent::Step {
                pass,
                t,
                symbol,
                origin,
                dest,
                value,
            } => write!(
                f,
                "{} term at time {} ('{}') from state {} to state {}: {}",
                pass, t, symbol, origin, dest, value
            ),
            TraceEvent::Probability { pass, value } => {
                write!(f, "{} probability is {}", pass, value)
            }
            TraceEvent::SoftCount {
                t,
                symbol,
                origin,
                dest,
                value,
            } => write!(
                f,
                "soft count at time {} ('{}') from state {} to state {}: {:.3}",
                t, symbol, origin, dest, value
            ),
            TraceEvent::SequenceDone { index, probability } => {
                write!(f, "sequence #{} folded (probability {})", index, probability)
            }
            TraceEvent::SequenceSkipped { index, reason } => {
                write!(f, "sequence #{} skipped: {}", index, reason)
            }
            TraceEvent::Report { title, text } => write!(f, "{}\n{}", title, text.trim_end()),
        }
    }
}

///
/// Receiver of trace records.
///
pub trait TraceSink<S, A> {
    ///
    /// If false, callers do not build events at all.
    fn is_enabled(&self) -> bool {
        true
    }
    fn record(&mut self, event: TraceEvent<S, A>);
}

///
/// Sink that discards everything.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTrace;

impl<S, A> TraceSink<S, A> for NoTrace {
    fn is_enabled(&self) -> bool {
        false
    }
    fn record(&mut self, _event: TraceEvent<S, A>) {}
}

///
/// Sink that formats each record and emits it with `log::debug!`.
///
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl<S: Label, A: Label> TraceSink<S, A> for LogSink {
    fn is_enabled(&self) -> bool {
        log::log_enabled!(log::Level::Debug)
    }
    fn record(&mut self, event: TraceEvent<S, A>) {
        debug!("{}", event);
    }
}

///
/// Sink that keeps the records in order, for auditing.
///
#[derive(Debug, Clone)]
pub struct VecSink<S, A> {
    pub events: Vec<TraceEvent<S, A>>,
}

impl<S, A> VecSink<S, A> {
    pub fn new() -> Self {
        VecSink { events: Vec::new() }
    }
}

impl<S, A> Default for VecSink<S, A> {
    fn default() -> Self {
        VecSink::new()
    }
}

impl<S, A> TraceSink<S, A> for VecSink<S, A> {
    fn record(&mut self, event: TraceEvent<S, A>) {
        self.events.push(event);
    }
}

impl<S: Label, A: Label> ModelParams<S, A> {
    ///
    /// Record the `SequenceStart` event of a pass over `emissions`.
    ///
    pub(crate) fn trace_start<T>(&self, pass: Pass, emissions: &[usize], sink: &mut T)
    where
        T: TraceSink<S, A> + ?Sized,
    {
        if sink.is_enabled() {
            sink.record(TraceEvent::SequenceStart {
                pass,
                sequence: emissions
                    .iter()
                    .map(|&x| self.alphabet().get(x).clone())
                    .collect(),
            });
        }
    }
    ///
    /// Record `Value` events for every state of the row at time `t`.
    ///
    pub(crate) fn trace_table<T>(&self, pass: Pass, t: usize, table: &[Prob], sink: &mut T)
    where
        T: TraceSink<S, A> + ?Sized,
    {
        if !sink.is_enabled() {
            return;
        }
        for (k, value) in table.iter().enumerate() {
            sink.record(TraceEvent::Value {
                pass,
                t,
                state: self.states().get(k).clone(),
                value: value.to_value(),
            });
        }
    }
}
