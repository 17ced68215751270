//! Adapter trait for the remote compute unit
//!
//! The trait is defined in core so the engine stays transport-agnostic;
//! concrete implementations live in their own crate (adapters/).

use crate::error::Result;
use async_trait::async_trait;

/// Remote invocation capability consumed by the sweep engine
///
/// Implementations own the transport, credentials, and any per-invocation
/// timeout policy. The core never retries: a hard failure from any of these
/// methods aborts the run.
#[async_trait]
pub trait FunctionAdapter: Send + Sync {
    /// Fetch the current resource configuration (memory size in MB)
    ///
    /// # Errors
    /// `Error::ConfigurationUpdate` if the configuration cannot be read.
    async fn get_configuration(&self, function: &str) -> Result<u64>;

    /// Apply a resource configuration (memory size in MB)
    ///
    /// # Errors
    /// `Error::ConfigurationUpdate` if the remote unit rejects the value.
    async fn set_configuration(&self, function: &str, memory_mb: u64) -> Result<()>;

    /// Perform one remote invocation
    ///
    /// Returns the observed duration in milliseconds, or `None` when the
    /// response carries no parsable timing metadata. "No timing data" is an
    /// `Ok` outcome; only a transport or remote fault is an error.
    ///
    /// # Errors
    /// `Error::Invocation` on transport or remote fault.
    async fn invoke(&self, function: &str, payload: &serde_json::Value) -> Result<Option<u64>>;
}
