//! Error types for memsweep-core

use crate::stats::RunReport;
use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid run configuration (bad percentile rank set, zero repeats, ...)
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote unit rejected a resource configuration update
    #[error("failed to set resource configuration to {value} MB: {reason}")]
    ConfigurationUpdate {
        /// Memory size that was being applied
        value: u64,
        /// Adapter-reported rejection reason
        reason: String,
    },

    /// A single invocation failed at the transport or remote level
    ///
    /// Fatal to the run. Not to be confused with an invocation that succeeded
    /// but carried no parsable timing metadata, which is tolerated.
    #[error("invocation failed: {0}")]
    Invocation(String),

    /// A cycle completed but every invocation returned unmeasured timing
    #[error("cycle produced no measurable invocations")]
    NoMeasurableInvocations,

    /// The reducer was handed an empty sample set
    ///
    /// Indicates a caller contract violation; the cycle executor filters
    /// unmeasured invocations and fails with `NoMeasurableInvocations` itself.
    #[error("cannot reduce an empty sample set")]
    EmptySampleSet,

    /// The run failed and the subsequent restore of the original
    /// configuration failed as well
    #[error("run failed: {source}; restoring original configuration also failed: {restore}")]
    RestoreFailed {
        /// The fatal error that aborted the run
        source: Box<Error>,
        /// The error raised by the best-effort restore attempt
        restore: Box<Error>,
    },
}

impl Error {
    /// Shorthand for a missing builder field
    pub(crate) fn missing_config(field: &str) -> Self {
        Error::Config(format!("missing required field: {field}"))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// A sweep failure carrying the partial report built before the fatal error
///
/// Step reports produced for steps that completed before the failure are not
/// discarded; callers can render or persist them alongside the error.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct SweepError {
    /// The fatal error that terminated the run
    #[source]
    pub error: Error,
    /// Step reports completed before the failure (possibly empty)
    pub partial: RunReport,
}
