//! Tests for the sweep runner

use super::builder::SweepRunnerBuilder;
use crate::adapter::FunctionAdapter;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::events::RunEvent;

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

type RespondFn = dyn Fn(u64, usize) -> Result<Option<u64>> + Send + Sync;

/// Adapter double tracking configuration changes and the memory size each
/// invocation ran under
struct MockAdapter {
    original: u64,
    get_fails: bool,
    set_fail_on: Option<u64>,
    sets: Mutex<Vec<u64>>,
    current: Mutex<u64>,
    invocations: AtomicUsize,
    respond: Box<RespondFn>,
}

impl MockAdapter {
    fn new(original: u64) -> Self {
        Self {
            original,
            get_fails: false,
            set_fail_on: None,
            sets: Mutex::new(Vec::new()),
            current: Mutex::new(original),
            invocations: AtomicUsize::new(0),
            respond: Box::new(|_, _| Ok(Some(100))),
        }
    }

    fn with_get_failure(mut self) -> Self {
        self.get_fails = true;
        self
    }

    fn with_set_failure_on(mut self, value: u64) -> Self {
        self.set_fail_on = Some(value);
        self
    }

    /// Respond as a function of (current memory size, zero-based call count)
    fn with_respond(
        mut self,
        respond: impl Fn(u64, usize) -> Result<Option<u64>> + Send + Sync + 'static,
    ) -> Self {
        self.respond = Box::new(respond);
        self
    }

    fn sets(&self) -> Vec<u64> {
        self.sets.lock().unwrap().clone()
    }

    fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FunctionAdapter for MockAdapter {
    async fn get_configuration(&self, _function: &str) -> Result<u64> {
        if self.get_fails {
            return Err(Error::ConfigurationUpdate {
                value: 0,
                reason: "function not found".into(),
            });
        }
        Ok(self.original)
    }

    async fn set_configuration(&self, _function: &str, memory_mb: u64) -> Result<()> {
        if self.set_fail_on == Some(memory_mb) {
            return Err(Error::ConfigurationUpdate {
                value: memory_mb,
                reason: "rejected by remote".into(),
            });
        }
        self.sets.lock().unwrap().push(memory_mb);
        *self.current.lock().unwrap() = memory_mb;
        Ok(())
    }

    async fn invoke(&self, _function: &str, _payload: &serde_json::Value) -> Result<Option<u64>> {
        let n = self.invocations.fetch_add(1, Ordering::SeqCst);
        let current = *self.current.lock().unwrap();
        (self.respond)(current, n)
    }
}

fn build(
    adapter: Arc<MockAdapter>,
    config: RunConfig,
) -> (super::SweepRunner, mpsc::Receiver<RunEvent>) {
    SweepRunnerBuilder::new()
        .config(config)
        .adapter(adapter)
        .build()
        .expect("failed to build runner")
}

fn drain(rx: &mut mpsc::Receiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ============================================================================
// Builder
// ============================================================================

#[test]
fn test_builder_missing_config() {
    let adapter = Arc::new(MockAdapter::new(512));
    let result = SweepRunnerBuilder::new().adapter(adapter).build();
    assert!(matches!(result.unwrap_err(), Error::Config(_)));
}

#[test]
fn test_builder_missing_adapter() {
    let result = SweepRunnerBuilder::new()
        .config(RunConfig::new("f", vec![128]))
        .build();
    assert!(matches!(result.unwrap_err(), Error::Config(_)));
}

#[test]
fn test_builder_rejects_invalid_ranks_ahead_of_time() {
    let adapter = Arc::new(MockAdapter::new(512));
    let result = SweepRunnerBuilder::new()
        .config(RunConfig::new("f", vec![128]).with_percentile_ranks(vec![50, 50]))
        .adapter(adapter.clone())
        .build();

    assert!(matches!(result.unwrap_err(), Error::Config(_)));
    // Rejected before any adapter call
    assert_eq!(adapter.invocations(), 0);
    assert!(adapter.sets().is_empty());
}

// ============================================================================
// Full runs
// ============================================================================

#[tokio::test]
async fn test_run_two_step_sweep() {
    // Reference scenario: sweep [128, 256], one serial invocation each,
    // durations 100 ms then 50 ms
    let adapter = Arc::new(
        MockAdapter::new(512).with_respond(|memory_mb, _| match memory_mb {
            128 => Ok(Some(100)),
            256 => Ok(Some(50)),
            other => panic!("unexpected memory size {other}"),
        }),
    );
    let config = RunConfig::new("resizer", vec![128, 256]);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let report = runner.run().await.unwrap();

    assert_eq!(report.len(), 2);
    let first = report.get(128).unwrap();
    assert_eq!((first.min, first.max, first.avg), (100, 100, 100));
    assert!(first.percentiles.values().all(|&v| v == 100));
    let second = report.get(256).unwrap();
    assert_eq!((second.min, second.max, second.avg), (50, 50, 50));
    assert!(second.percentiles.values().all(|&v| v == 50));

    // One configuration set per step, then the original restored last
    assert_eq!(adapter.sets(), vec![128, 256, 512]);
    assert_eq!(report.fastest().unwrap().memory_mb, 256);
}

#[tokio::test]
async fn test_run_event_sequence() {
    let adapter = Arc::new(MockAdapter::new(512));
    let config = RunConfig::new("resizer", vec![128, 256]);
    let (runner, mut rx) = build(adapter, config);

    runner.run().await.unwrap();

    let events = drain(&mut rx);
    assert!(matches!(
        events[0],
        RunEvent::Start {
            original_memory_mb: 512
        }
    ));
    assert!(matches!(events[1], RunEvent::Step { memory_mb: 128 }));
    assert!(matches!(
        events[2],
        RunEvent::Invoke {
            duration_ms: Some(100)
        }
    ));
    assert!(matches!(events[3], RunEvent::StepResult { memory_mb: 128, .. }));
    assert!(matches!(events[4], RunEvent::Step { memory_mb: 256 }));
    assert!(matches!(events[5], RunEvent::Invoke { .. }));
    assert!(matches!(events[6], RunEvent::StepResult { memory_mb: 256, .. }));
    assert!(matches!(events[7], RunEvent::Finish));
    assert_eq!(events.len(), 8);
}

#[tokio::test]
async fn test_run_concurrent_cycles() {
    let adapter = Arc::new(MockAdapter::new(512));
    let config = RunConfig::new("resizer", vec![128, 256])
        .with_repeats(10)
        .with_concurrency(4);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let report = runner.run().await.unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(adapter.invocations(), 20);
    assert_eq!(adapter.sets(), vec![128, 256, 512]);
}

#[tokio::test]
async fn test_duplicate_steps_rerun() {
    let adapter = Arc::new(MockAdapter::new(512));
    let config = RunConfig::new("resizer", vec![128, 128]);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let report = runner.run().await.unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(adapter.sets(), vec![128, 128, 512]);
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn test_init_failure_restores_nothing() {
    let adapter = Arc::new(MockAdapter::new(512).with_get_failure());
    let config = RunConfig::new("resizer", vec![128]);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let err = runner.run().await.unwrap_err();

    assert!(matches!(err.error, Error::ConfigurationUpdate { .. }));
    assert!(err.partial.is_empty());
    // The original was never read, so nothing may be written back
    assert!(adapter.sets().is_empty());
}

#[tokio::test]
async fn test_all_unmeasured_fails_and_restores() {
    let adapter = Arc::new(MockAdapter::new(512).with_respond(|_, _| Ok(None)));
    let config = RunConfig::new("resizer", vec![128]).with_repeats(3);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let err = runner.run().await.unwrap_err();

    assert!(matches!(err.error, Error::NoMeasurableInvocations));
    assert_eq!(adapter.sets(), vec![128, 512]);
}

#[tokio::test]
async fn test_invocation_failure_skips_remaining_steps() {
    // Step 2 of 3 fails; step 3 never executes, the original configuration
    // (captured before step 1) is restored exactly once
    let adapter = Arc::new(MockAdapter::new(512).with_respond(|memory_mb, _| {
        if memory_mb == 256 {
            Err(Error::Invocation("remote fault".into()))
        } else {
            Ok(Some(75))
        }
    }));
    let config = RunConfig::new("resizer", vec![128, 256, 1024]);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let err = runner.run().await.unwrap_err();

    assert!(matches!(err.error, Error::Invocation(_)));
    assert_eq!(adapter.sets(), vec![128, 256, 512]);

    // The completed first step is not discarded
    assert_eq!(err.partial.len(), 1);
    assert_eq!(err.partial.get(128).unwrap().avg, 75);
}

#[tokio::test]
async fn test_set_failure_aborts_and_restores() {
    let adapter = Arc::new(MockAdapter::new(512).with_set_failure_on(256));
    let config = RunConfig::new("resizer", vec![128, 256, 1024]);
    let (runner, _rx) = build(Arc::clone(&adapter), config);

    let err = runner.run().await.unwrap_err();

    assert!(matches!(
        err.error,
        Error::ConfigurationUpdate { value: 256, .. }
    ));
    assert_eq!(err.partial.len(), 1);
    // Step 2's set was rejected, step 3 never attempted, restore still ran
    assert_eq!(adapter.sets(), vec![128, 512]);
}

#[tokio::test]
async fn test_failed_restore_after_failed_run_surfaces_both() {
    let adapter = Arc::new(
        MockAdapter::new(512)
            .with_set_failure_on(512)
            .with_respond(|_, _| Err(Error::Invocation("remote fault".into()))),
    );
    let config = RunConfig::new("resizer", vec![128]);
    let (runner, _rx) = build(adapter, config);

    let err = runner.run().await.unwrap_err();

    match err.error {
        Error::RestoreFailed { source, restore } => {
            assert!(matches!(*source, Error::Invocation(_)));
            assert!(matches!(*restore, Error::ConfigurationUpdate { .. }));
        }
        other => panic!("expected RestoreFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_restore_after_successful_run() {
    let adapter = Arc::new(MockAdapter::new(512).with_set_failure_on(512));
    let config = RunConfig::new("resizer", vec![128]);
    let (runner, _rx) = build(adapter, config);

    let err = runner.run().await.unwrap_err();

    assert!(matches!(err.error, Error::ConfigurationUpdate { value: 512, .. }));
    // The completed report still travels with the error
    assert_eq!(err.partial.len(), 1);
}
