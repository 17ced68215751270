//! Sweep execution logic

use crate::adapter::FunctionAdapter;
use crate::config::RunConfig;
use crate::cycle::CycleExecutor;
use crate::error::{Error, Result, SweepError};
use crate::events::{EventSender, RunEvent};
use crate::stats::{self, RunReport};

use std::sync::Arc;

/// Drives the configured sweep and produces the final [`RunReport`]
///
/// Construct via [`super::SweepRunnerBuilder`].
pub struct SweepRunner {
    config: Arc<RunConfig>,
    adapter: Arc<dyn FunctionAdapter>,
    events: EventSender,
}

impl SweepRunner {
    pub(crate) fn new(
        config: Arc<RunConfig>,
        adapter: Arc<dyn FunctionAdapter>,
        events: EventSender,
    ) -> Self {
        Self {
            config,
            adapter,
            events,
        }
    }

    /// The run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run the full sweep
    ///
    /// The original resource configuration is captured before the first step
    /// and restored exactly once on every exit path. On failure the error
    /// carries the step reports completed before the fatal step.
    pub async fn run(&self) -> std::result::Result<RunReport, SweepError> {
        let function = &self.config.function;

        let original = match self.adapter.get_configuration(function).await {
            Ok(value) => value,
            Err(error) => {
                // Nothing acquired yet, so nothing to restore
                return Err(SweepError {
                    error,
                    partial: RunReport::default(),
                });
            }
        };

        self.events
            .emit(RunEvent::Start {
                original_memory_mb: original,
            })
            .await;
        tracing::info!(
            function = %function,
            original_memory_mb = original,
            steps = self.config.resource_steps.len(),
            repeats = self.config.repeats,
            concurrency = self.config.concurrency,
            "sweep started"
        );

        let mut report = RunReport::default();
        let run_result = self.run_steps(&mut report).await;

        // Guaranteed release: restore runs on success and failure alike
        let restore_result = self.adapter.set_configuration(function, original).await;
        self.events.emit(RunEvent::Finish).await;

        match (run_result, restore_result) {
            (Ok(()), Ok(())) => {
                tracing::info!(function = %function, steps = report.len(), "sweep finished");
                Ok(report)
            }
            (Ok(()), Err(restore)) => {
                tracing::error!(function = %function, error = %restore, "restore failed");
                Err(SweepError {
                    error: restore,
                    partial: report,
                })
            }
            (Err(error), Ok(())) => {
                tracing::warn!(function = %function, error = %error, "sweep aborted");
                Err(SweepError {
                    error,
                    partial: report,
                })
            }
            (Err(error), Err(restore)) => {
                tracing::error!(
                    function = %function,
                    error = %error,
                    restore_error = %restore,
                    "sweep aborted and restore failed"
                );
                Err(SweepError {
                    error: Error::RestoreFailed {
                        source: Box::new(error),
                        restore: Box::new(restore),
                    },
                    partial: report,
                })
            }
        }
    }

    /// Execute each resource step in sweep order
    async fn run_steps(&self, report: &mut RunReport) -> Result<()> {
        for &memory_mb in &self.config.resource_steps {
            self.adapter
                .set_configuration(&self.config.function, memory_mb)
                .await?;
            self.events.emit(RunEvent::Step { memory_mb }).await;
            tracing::debug!(memory_mb, "resource step applied");

            let cycle = CycleExecutor::new(
                Arc::clone(&self.adapter),
                Arc::clone(&self.config),
                self.events.clone(),
            );
            let samples = cycle.run_cycle().await?;

            let step = stats::reduce(&samples, &self.config.percentile_ranks)?;
            tracing::debug!(
                memory_mb,
                samples = samples.len(),
                avg_ms = step.avg,
                "step reduced"
            );
            self.events
                .emit(RunEvent::StepResult {
                    memory_mb,
                    report: step.clone(),
                })
                .await;
            report.push(memory_mb, step);
        }
        Ok(())
    }
}

impl std::fmt::Debug for SweepRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepRunner")
            .field("config", &self.config)
            .finish()
    }
}
