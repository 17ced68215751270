//! Sweep orchestration across resource steps
//!
//! The sweep runner owns the full run lifecycle:
//!
//! 1. **Init** — fetch the function's current resource configuration; that
//!    value is the one piece of externally mutable state the run touches and
//!    it must be restored exactly once, however the run ends.
//! 2. **Per step** — apply the step's configuration, run one cycle, reduce
//!    the samples into a [`crate::stats::StepReport`], append to the report.
//! 3. **Finalize** — restore the original configuration (best effort on the
//!    failure path; a failed restore after a failed run surfaces both), then
//!    emit `Finish`.
//!
//! Steps execute strictly sequentially; concurrency exists only inside a
//! step's cycle.
//!
//! # Example
//!
//! ```ignore
//! use memsweep_core::{RunConfig, SweepRunnerBuilder};
//!
//! let config = RunConfig::new("resizer", vec![128, 256, 512])
//!     .with_repeats(50)
//!     .with_concurrency(10);
//!
//! let (runner, mut events) = SweepRunnerBuilder::new()
//!     .config(config)
//!     .adapter(adapter)
//!     .build()?;
//!
//! let report = runner.run().await?;
//! ```

mod builder;
mod executor;

pub use builder::SweepRunnerBuilder;
pub use executor::SweepRunner;

#[cfg(test)]
mod tests;
