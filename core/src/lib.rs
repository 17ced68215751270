//! memsweep-core: sweep engine for resource-configuration load testing
//!
//! This crate provides the engine shared by all memsweep components:
//!
//! - Run configuration and payload providers
//! - The adapter trait for the remote compute unit
//! - Cycle execution (bounded concurrency, pacing, warm-up)
//! - Sweep orchestration with guaranteed configuration restore
//! - Statistical reduction (min/max/avg/percentiles) and reports
//! - The typed progress event stream

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod config;
mod cycle;
pub mod error;
pub mod events;
pub mod stats;
pub mod sweep;

pub use adapter::FunctionAdapter;
pub use config::{Payload, RunConfig};
pub use error::{Error, Result, SweepError};
pub use events::{ChannelConfig, EventSender, RunEvent};
pub use stats::{
    reduce, RunReport, StepEntry, StepReport, DEFAULT_PERCENTILE_RANKS,
};
pub use sweep::{SweepRunner, SweepRunnerBuilder};
