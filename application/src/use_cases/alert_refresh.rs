//! Periodic refresh of tracked locations' alert state.
//!
//! Every tracked location gets a fresh weather lookup per cycle. Results go
//! through the same [`AlertEscalator::observe`] path as a turn's lookups,
//! so an older report never overwrites a newer one and failed lookups
//! leave the stored state alone.

use crate::use_cases::alert_escalator::AlertEscalator;
use crate::use_cases::tool_invoker::ToolInvoker;
use haven_domain::AlertTransition;
use haven_domain::tool::catalog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshParams {
    /// Disabled when false; turn lookups still update the store.
    pub enabled: bool,
    #[serde(with = "secs")]
    pub interval: Duration,
}

impl Default for RefreshParams {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(300),
        }
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Counts from one refresh cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub checked: usize,
    pub changed: usize,
    pub failed: usize,
}

pub struct AlertRefresher {
    escalator: AlertEscalator,
    invoker: Arc<ToolInvoker>,
}

impl AlertRefresher {
    pub fn new(escalator: AlertEscalator, invoker: Arc<ToolInvoker>) -> Self {
        Self { escalator, invoker }
    }

    /// One lookup per tracked location, run concurrently.
    pub async fn refresh_once(&self) -> RefreshSummary {
        let tracked = self.escalator.tracked();
        let calls: Vec<_> = tracked
            .iter()
            .enumerate()
            .map(|(i, t)| catalog::weather_call(format!("refresh-{}", i + 1), t.at))
            .collect();
        let records = self.invoker.invoke_all(&calls).await;

        let mut summary = RefreshSummary {
            checked: records.len(),
            ..Default::default()
        };
        for record in &records {
            if !record.is_success() {
                summary.failed += 1;
                if let Some(e) = record.error() {
                    warn!(tool = %record.tool_name, "Alert refresh lookup failed: {}", e);
                }
                continue;
            }
            match self.escalator.observe(record) {
                Some((_, AlertTransition::Changed { .. })) => summary.changed += 1,
                Some(_) => {}
                None => summary.failed += 1,
            }
        }
        debug!(
            checked = summary.checked,
            changed = summary.changed,
            failed = summary.failed,
            "Alert refresh cycle done"
        );
        summary
    }

    /// Refresh every `interval` until `cancel` fires.
    pub fn spawn(self, params: &RefreshParams, cancel: CancellationToken) -> JoinHandle<()> {
        let period = params.interval;
        tokio::spawn(async move {
            info!("Alert refresher started (every {}s)", period.as_secs());
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.refresh_once().await;
                    }
                }
            }
            info!("Alert refresher stopped");
        })
    }
}
