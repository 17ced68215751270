//! Cycle execution for a single resource step
//!
//! A cycle is the set of invocations run while the remote unit holds one
//! resource step's configuration. The executor owns the concurrency and
//! pacing policy:
//!
//! - `concurrency == 1`: strictly serialized, with an optional untimed
//!   warm-up invocation first and an idle wait before every call.
//! - `concurrency > 1`: one task per invocation index, gated by a shared
//!   semaphore so at most `concurrency` calls are in flight. No warm-up and
//!   no pacing delay; the concurrency bound itself throttles.
//!
//! Unmeasured invocations (no parsable timing) are dropped from the sample
//! without aborting the cycle. A hard invocation failure aborts the run.

mod executor;

pub(crate) use executor::CycleExecutor;
