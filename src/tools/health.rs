//! Health aggregation across modules.
//!
//! Every module is probed concurrently under its own timeout. A probe that
//! errors, panics or runs out of time marks only that module unhealthy.

use crate::tools::dispatch::panic_message;
use crate::tools::module::{HealthState, HealthStatus, ToolModule};
use crate::tools::registry::ModuleRegistry;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

/// Default per-module probe budget.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Composite status: healthy only when every module is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
}

/// Counts by health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub healthy: usize,
    pub unhealthy: usize,
}

/// System-wide health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: OverallHealth,
    pub timestamp: DateTime<Utc>,
    pub modules: BTreeMap<String, HealthStatus>,
    pub summary: HealthSummary,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.overall == OverallHealth::Healthy
    }
}

/// Probe every registered module and fold the results.
pub async fn aggregate(registry: &ModuleRegistry, probe_timeout: Duration) -> HealthReport {
    let probes = registry.entries().map(|(id, module)| async move {
        let status = probe_module(module, probe_timeout).await;
        if !status.is_healthy() {
            tracing::warn!(module = %id, detail = %status.detail, "Module unhealthy");
        }
        (id.to_string(), status)
    });

    let modules: BTreeMap<String, HealthStatus> = join_all(probes).await.into_iter().collect();

    let healthy = modules.values().filter(|s| s.is_healthy()).count();
    let summary = HealthSummary {
        healthy,
        unhealthy: modules.len() - healthy,
    };
    let overall = if summary.unhealthy == 0 {
        OverallHealth::Healthy
    } else {
        OverallHealth::Degraded
    };

    HealthReport {
        overall,
        timestamp: Utc::now(),
        modules,
        summary,
    }
}

async fn probe_module(module: &dyn ToolModule, probe_timeout: Duration) -> HealthStatus {
    let probe = AssertUnwindSafe(module.probe_health()).catch_unwind();
    match tokio::time::timeout(probe_timeout, probe).await {
        Err(_elapsed) => HealthStatus::unhealthy(format!(
            "health probe timed out after {}ms",
            probe_timeout.as_millis()
        )),
        Ok(Err(panic)) => HealthStatus::unhealthy(format!(
            "health probe panicked: {}",
            panic_message(panic.as_ref())
        )),
        Ok(Ok(Err(e))) => HealthStatus {
            state: HealthState::Unhealthy,
            detail: e.to_string(),
        },
        Ok(Ok(Ok(status))) => status,
    }
}

// =============================================================================
// Tests
// =============================================================================
