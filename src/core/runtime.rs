//! Wires configuration, collaborators and the scan loop together

use crate::config::MonitorConfig;
use crate::core::http::{start_server, AppState};
use crate::core::scan_cycle::{ScanConfig, ScanCycle};
use crate::error::Result;
use crate::metrics::Metrics;
use crate::services::bybit::BybitMarketDataProvider;
use crate::services::market_data::MarketDataProvider;
use crate::services::notifier::Notifier;
use crate::services::telegram::TelegramNotifier;
use crate::store::StateFile;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// The monitor process: one scan loop plus the optional HTTP surface.
pub struct MonitorRuntime {
    cycle: ScanCycle,
    state: AppState,
    metrics_port: Option<u16>,
}

impl MonitorRuntime {
    /// Build the Bybit provider and Telegram notifier from `config` and
    /// restore the persisted store.
    pub async fn from_config(config: &MonitorConfig) -> Result<Self> {
        let provider = BybitMarketDataProvider::new(config.bybit_base_url.clone(), config.request_timeout)?
            .with_quote_asset(config.quote_asset.clone())
            .with_top_n(config.top_symbols);
        let notifier = TelegramNotifier::new(
            config.telegram.api_url.clone(),
            config.telegram.bot_token.clone(),
            config.telegram.chat_id.clone(),
            config.request_timeout,
        )?;

        let mut runtime = Self::with_components(
            ScanConfig::from(config),
            Arc::new(provider),
            Arc::new(notifier),
            StateFile::new(config.state_file.clone()),
            Arc::new(Metrics::new()?),
        );
        runtime.metrics_port = config.metrics_port;
        runtime.cycle.restore_state().await;
        Ok(runtime)
    }

    pub fn with_components(
        scan_config: ScanConfig,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Arc<dyn Notifier>,
        state_file: StateFile,
        metrics: Arc<Metrics>,
    ) -> Self {
        let state = AppState::new(metrics.clone());
        let cycle = ScanCycle::new(scan_config, provider, notifier, state_file)
            .with_metrics(metrics)
            .with_health(state.health.clone());
        Self {
            cycle,
            state,
            metrics_port: None,
        }
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.state.metrics.clone()
    }

    /// State served by the HTTP surface; its health follows the scan loop.
    pub fn app_state(&self) -> AppState {
        self.state.clone()
    }

    pub fn cycle(&self) -> &ScanCycle {
        &self.cycle
    }

    /// Run until `shutdown` flips to true. The store is persisted on the way out.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let server = self.metrics_port.map(|port| {
            let state = self.state.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = start_server(port, state, shutdown).await {
                    error!(error = %e, "HTTP server error");
                }
            })
        });

        let result = self.cycle.run(shutdown).await;

        if let Some(handle) = server {
            if let Err(e) = handle.await {
                error!(error = %e, "HTTP server task failed");
            }
        }
        info!("MonitorRuntime: stopped");
        result
    }
}
