//!
//! globally-available parts
//!
pub use crate::common::{Freq, Label};
pub use crate::config::ModelConfig;
pub use crate::corpus::{Model, OnError};
pub use crate::error::{HmmError, Result};
pub use crate::hmm::trace::{LogSink, NoTrace, TraceEvent, TraceSink, VecSink};
pub use crate::hmm::{ModelParams, SequenceCounts, SoftCountTable};
pub use crate::init::{Initializer, RandomSimplex, Uniform};
pub use crate::prob::Prob;
