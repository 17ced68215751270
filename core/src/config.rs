//! Run configuration types

use crate::error::{Error, Result};
use crate::stats::{self, DEFAULT_PERCENTILE_RANKS};
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Payload handed to the remote unit on each invocation
///
/// Either a fixed JSON value reused for every call, or a generator resolved
/// once per invocation from the invocation index (0 = warm-up, 1..=repeats
/// for the timed cycle).
#[derive(Clone, Default)]
pub enum Payload {
    /// The same value for every invocation
    Fixed(serde_json::Value),
    /// A value derived from the invocation index at dispatch time
    Generator(Arc<dyn Fn(usize) -> serde_json::Value + Send + Sync>),
    /// No payload (JSON null)
    #[default]
    Empty,
}

impl Payload {
    /// Resolve the payload for one invocation
    pub fn resolve(&self, index: usize) -> serde_json::Value {
        match self {
            Payload::Fixed(value) => value.clone(),
            Payload::Generator(f) => f(index),
            Payload::Empty => serde_json::Value::Null,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
            Payload::Generator(_) => f.write_str("Generator(..)"),
            Payload::Empty => f.write_str("Empty"),
        }
    }
}

// Config files carry fixed payloads only; a generator serializes as null and
// any JSON value deserializes as a fixed payload.
impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Payload::Fixed(value) => value.serialize(serializer),
            Payload::Generator(_) | Payload::Empty => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match value {
            serde_json::Value::Null => Payload::Empty,
            other => Payload::Fixed(other),
        })
    }
}

/// Configuration for one sweep run
///
/// Immutable for the duration of a run; the sweep controller holds it behind
/// an `Arc` and never mutates `resource_steps`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Identifier of the remote function under test
    pub function: String,

    /// Resource steps (memory sizes in MB) to sweep, in order
    ///
    /// Order is significant; duplicates are allowed and re-run.
    pub resource_steps: Vec<u64>,

    /// Timed invocations per step
    pub repeats: usize,

    /// Maximum invocations in flight within a step
    pub concurrency: usize,

    /// Run one untimed warm-up invocation before each serialized cycle
    ///
    /// Ignored when `concurrency > 1`: pacing a single warm call is
    /// meaningless under parallel dispatch.
    #[serde(default)]
    pub warmup: bool,

    /// Idle wait in milliseconds before each invocation when `concurrency == 1`
    #[serde(default)]
    pub delay_ms: u64,

    /// Invocation payload
    #[serde(default)]
    pub payload: Payload,

    /// Percentile ranks to compute per step
    #[serde(default = "default_ranks")]
    pub percentile_ranks: Vec<u8>,
}

fn default_ranks() -> Vec<u8> {
    DEFAULT_PERCENTILE_RANKS.to_vec()
}

impl RunConfig {
    /// Create a config for `function` sweeping `resource_steps`, with
    /// defaults for everything else (1 repeat, serial, no warm-up)
    pub fn new(function: impl Into<String>, resource_steps: Vec<u64>) -> Self {
        Self {
            function: function.into(),
            resource_steps,
            repeats: 1,
            concurrency: 1,
            warmup: false,
            delay_ms: 0,
            payload: Payload::Empty,
            percentile_ranks: default_ranks(),
        }
    }

    /// Set the number of timed invocations per step
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    /// Set the concurrency bound
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enable or disable the warm-up invocation
    pub fn with_warmup(mut self, warmup: bool) -> Self {
        self.warmup = warmup;
        self
    }

    /// Set the inter-invocation delay for serialized cycles
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the invocation payload
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Override the percentile rank set
    pub fn with_percentile_ranks(mut self, ranks: Vec<u8>) -> Self {
        self.percentile_ranks = ranks;
        self
    }

    /// Validate the configuration
    ///
    /// Checked once before any adapter call is made.
    pub fn validate(&self) -> Result<()> {
        if self.function.is_empty() {
            return Err(Error::Config("function identifier must not be empty".into()));
        }
        if self.repeats == 0 {
            return Err(Error::Config("repeats must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".into()));
        }
        stats::validate_ranks(&self.percentile_ranks)
    }
}
