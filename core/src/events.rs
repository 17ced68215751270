//! Typed progress events and channel plumbing
//!
//! Observers see a live stream while the run is in flight: events are pushed
//! onto a bounded tokio mpsc channel as they happen, not batched at the end.
//! Per-invocation events are emitted in completion order; everything else
//! follows the strictly sequential sweep order.

use crate::stats::StepReport;
use tokio::sync::mpsc;

/// One progress event from a sweep run
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Run started; carries the resource configuration captured at init,
    /// which will be restored when the run ends
    Start {
        /// Memory size (MB) the function held before the sweep
        original_memory_mb: u64,
    },
    /// A resource step was applied and its cycle is about to run
    Step {
        /// Memory size (MB) now in effect
        memory_mb: u64,
    },
    /// The untimed warm-up invocation completed
    Warmup,
    /// A timed invocation completed
    Invoke {
        /// Observed duration, or `None` when the response carried no
        /// parsable timing metadata
        duration_ms: Option<u64>,
    },
    /// A step's cycle was reduced into a report
    StepResult {
        /// Memory size (MB) the cycle ran under
        memory_mb: u64,
        /// Reduced statistics
        report: StepReport,
    },
    /// The run ended and the original configuration was restored
    /// (or the restore was attempted)
    Finish,
}

/// Channel buffer configuration for run events
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Event channel buffer size (engine -> observer)
    pub event_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { event_buffer: 1024 }
    }
}

impl ChannelConfig {
    /// Override the event buffer size
    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size;
        self
    }
}

/// Sending half of the event stream
///
/// Cloned into every invocation task. A dropped receiver never fails the
/// run: events are simply discarded once nobody is listening.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::Sender<RunEvent>,
}

impl EventSender {
    /// Create the event channel with the given buffer configuration
    pub fn channel(config: &ChannelConfig) -> (Self, mpsc::Receiver<RunEvent>) {
        let (tx, rx) = mpsc::channel(config.event_buffer);
        (Self { tx }, rx)
    }

    /// Emit one event, waiting for buffer space if the observer is slow
    pub async fn emit(&self, event: RunEvent) {
        let _ = self.tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_config_default() {
        let config = ChannelConfig::default();
        assert_eq!(config.event_buffer, 1024);
    }

    #[test]
    fn test_channel_config_builder() {
        let config = ChannelConfig::default().with_event_buffer(16);
        assert_eq!(config.event_buffer, 16);
    }

    #[tokio::test]
    async fn test_emit_and_receive() {
        let (events, mut rx) = EventSender::channel(&ChannelConfig::default());
        events.emit(RunEvent::Warmup).await;
        assert!(matches!(rx.recv().await, Some(RunEvent::Warmup)));
    }

    #[tokio::test]
    async fn test_emit_with_dropped_receiver() {
        let (events, rx) = EventSender::channel(&ChannelConfig::default());
        drop(rx);
        // Must not panic or block
        events.emit(RunEvent::Finish).await;
    }
}
