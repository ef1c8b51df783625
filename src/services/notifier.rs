//! Outbound notification port and the adapters that need no transport.

use crate::error::{MonitorError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Delivery channel for alerts and periodic summaries. Fire-and-forget:
/// callers log failures and never retry.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, message: &str) -> Result<()>;
}

/// Writes messages to the log only. Useful for dry runs.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        info!(channel = "log", "Notification: {}", message);
        Ok(())
    }
}

/// Sends every message to each inner channel in turn.
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    channels: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    fn name(&self) -> &str {
        "fanout"
    }

    /// Delivers to every channel even when an earlier one fails; the error
    /// lists each failed channel.
    async fn notify(&self, message: &str) -> Result<()> {
        let mut failures = Vec::new();
        for channel in &self.channels {
            if let Err(e) = channel.notify(message).await {
                warn!(channel = channel.name(), error = %e, "Notification channel failed");
                failures.push(format!("{}: {}", channel.name(), e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(MonitorError::Notification(failures.join("; ")))
        }
    }
}
