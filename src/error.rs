//!
//! Errors raised while building a model or running the E-step.
//!
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HmmError {
    /// A sequence (or a label lookup) uses a symbol outside the alphabet.
    /// `position` is the index in the sequence, when there is one.
    #[error(
        "unknown symbol {symbol}{}",
        .position.map(|i| format!(" at position {}", i)).unwrap_or_default()
    )]
    UnknownSymbol {
        symbol: String,
        position: Option<usize>,
    },

    /// A lookup references a state outside the configured state set.
    #[error("unknown state {state}")]
    UnknownState { state: String },

    /// The sequence has probability zero, or strictly below epsilon, under
    /// the current parameters, so its soft counts are undefined.
    #[error("degenerate sequence: probability {probability} is zero or below epsilon {epsilon}")]
    DegenerateSequence { probability: f64, epsilon: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl HmmError {
    pub(crate) fn invalid_configuration<S: Into<String>>(msg: S) -> Self {
        HmmError::InvalidConfiguration(msg.into())
    }
}

pub type Result<T, E = HmmError> = std::result::Result<T, E>;
