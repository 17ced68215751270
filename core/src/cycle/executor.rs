//! Cycle execution loop

use crate::adapter::FunctionAdapter;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::events::{EventSender, RunEvent};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

/// Result of one dispatched invocation task
enum Outcome {
    /// Completed with a parsed duration
    Measured(u64),
    /// Completed without timing metadata; dropped from the sample
    Unmeasured,
    /// Never dispatched because an earlier invocation failed hard
    Skipped,
}

/// Runs one configuration step's worth of invocations and collects the
/// measurable durations
pub(crate) struct CycleExecutor {
    adapter: Arc<dyn FunctionAdapter>,
    config: Arc<RunConfig>,
    events: EventSender,
}

impl CycleExecutor {
    pub(crate) fn new(
        adapter: Arc<dyn FunctionAdapter>,
        config: Arc<RunConfig>,
        events: EventSender,
    ) -> Self {
        Self {
            adapter,
            config,
            events,
        }
    }

    /// Run the cycle and return the measurable durations
    ///
    /// # Errors
    /// Propagates the first hard invocation failure; fails with
    /// `Error::NoMeasurableInvocations` when every invocation completed
    /// without timing metadata.
    pub(crate) async fn run_cycle(&self) -> Result<Vec<u64>> {
        let samples = if self.config.concurrency == 1 {
            self.run_serial().await?
        } else {
            self.run_concurrent().await?
        };

        if samples.is_empty() {
            return Err(Error::NoMeasurableInvocations);
        }
        Ok(samples)
    }

    /// Serialized cycle: optional warm-up, then paced invocations in index order
    async fn run_serial(&self) -> Result<Vec<u64>> {
        if self.config.warmup {
            self.pace().await;
            // Index 0, timing discarded
            let _ = self.invoke_one(0).await?;
            self.events.emit(RunEvent::Warmup).await;
            tracing::debug!(function = %self.config.function, "warm-up invocation complete");
        }

        let mut samples = Vec::with_capacity(self.config.repeats);
        for index in 1..=self.config.repeats {
            self.pace().await;
            let duration_ms = self.invoke_one(index).await?;
            self.events.emit(RunEvent::Invoke { duration_ms }).await;
            if let Some(ms) = duration_ms {
                samples.push(ms);
            }
        }
        Ok(samples)
    }

    /// Bounded-concurrency cycle: one task per index, at most `concurrency`
    /// in flight
    ///
    /// Dispatch follows index order; completion order is unconstrained and
    /// `Invoke` events are emitted from inside the tasks as calls complete.
    /// After the first hard failure, indices that have not started yet are
    /// skipped, in-flight calls settle, and the first error is returned.
    async fn run_concurrent(&self) -> Result<Vec<u64>> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let aborted = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(self.config.repeats);

        for index in 1..=self.config.repeats {
            let adapter = Arc::clone(&self.adapter);
            let function = self.config.function.clone();
            let payload = self.config.payload.resolve(index);
            let semaphore = Arc::clone(&semaphore);
            let aborted = Arc::clone(&aborted);
            let events = self.events.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| Error::Invocation("concurrency gate closed".into()))?;

                if aborted.load(Ordering::SeqCst) {
                    return Ok(Outcome::Skipped);
                }

                match adapter.invoke(&function, &payload).await {
                    Ok(duration_ms) => {
                        events.emit(RunEvent::Invoke { duration_ms }).await;
                        Ok(match duration_ms {
                            Some(ms) => Outcome::Measured(ms),
                            None => Outcome::Unmeasured,
                        })
                    }
                    Err(e) => {
                        aborted.store(true, Ordering::SeqCst);
                        Err(e)
                    }
                }
            }));
        }

        let mut samples = Vec::with_capacity(self.config.repeats);
        let mut first_error = None;
        for (i, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(Outcome::Measured(ms))) => samples.push(ms),
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    tracing::warn!(index = i + 1, error = %e, "invocation failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
                Err(e) => {
                    tracing::error!(index = i + 1, error = %e, "invocation task panicked");
                    if first_error.is_none() {
                        first_error =
                            Some(Error::Invocation(format!("invocation task {} panicked", i + 1)));
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(samples),
        }
    }

    /// Idle wait before each serialized invocation
    async fn pace(&self) {
        if self.config.delay_ms > 0 {
            sleep(Duration::from_millis(self.config.delay_ms)).await;
        }
    }

    async fn invoke_one(&self, index: usize) -> Result<Option<u64>> {
        let payload = self.config.payload.resolve(index);
        self.adapter.invoke(&self.config.function, &payload).await
    }
}
