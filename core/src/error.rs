//! Error types for the attitude crate
//!
//! Every failure the integration core can produce is a contract violation rather than a
//! transient condition, so nothing here is retried. Errors propagate to the caller of
//! [`Algorithm::execute`](crate::algorithm::Algorithm::execute) or
//! [`Modelling::run`](crate::modelling::Modelling::run) and the run yields no trajectory.

use std::fmt::{self, Display};

use thiserror::Error;

/// Result type used throughout the crate
pub type AttitudeResult<T> = Result<T, AttitudeError>;

/// The kind of angular-rate data an input source may (or may not) provide
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateKind {
    /// Angular rate at a single instant
    Instantaneous,
    /// Angular rate integrated over a time interval
    Integrated,
}
impl Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKind::Instantaneous => write!(f, "instantaneous"),
            RateKind::Integrated => write!(f, "integrated"),
        }
    }
}

/// Main error type for the attitude crate
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AttitudeError {
    /// A mandatory setting (step, last time, input source, artificial input) is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The input source does not provide the requested kind of angular-rate data
    #[error("Not implemented: {0} input data is not provided by this source")]
    Unsupported(RateKind),

    /// Out of range component or element access
    #[error("Invalid index {index} for a container of length {len}")]
    InvalidIndex { index: usize, len: usize },
}

impl AttitudeError {
    /// Shorthand for building a [`AttitudeError::Configuration`] from anything printable
    pub fn configuration(message: impl Into<String>) -> Self {
        AttitudeError::Configuration(message.into())
    }
}
