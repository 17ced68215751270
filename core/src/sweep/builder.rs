//! Builder pattern for sweep runner construction

use crate::adapter::FunctionAdapter;
use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::events::{ChannelConfig, EventSender, RunEvent};

use super::executor::SweepRunner;

use std::sync::Arc;
use tokio::sync::mpsc;

/// Builder for creating a [`SweepRunner`] along with its event receiver
pub struct SweepRunnerBuilder {
    config: Option<RunConfig>,
    adapter: Option<Arc<dyn FunctionAdapter>>,
    channel_config: ChannelConfig,
}

impl SweepRunnerBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: None,
            adapter: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the run configuration
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the invocation adapter
    pub fn adapter(mut self, adapter: Arc<dyn FunctionAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Set the event channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the runner and return it with the event receiver
    ///
    /// # Errors
    /// Returns an error if config or adapter are not set, or if the
    /// configuration (percentile rank set included) fails validation.
    pub fn build(self) -> Result<(SweepRunner, mpsc::Receiver<RunEvent>)> {
        let config = self.config.ok_or_else(|| Error::missing_config("config"))?;
        let adapter = self
            .adapter
            .ok_or_else(|| Error::missing_config("adapter"))?;

        config.validate()?;

        let (events, events_rx) = EventSender::channel(&self.channel_config);
        let runner = SweepRunner::new(Arc::new(config), adapter, events);

        Ok((runner, events_rx))
    }
}

impl Default for SweepRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
