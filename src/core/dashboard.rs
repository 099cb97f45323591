use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::cache::{Clock, DEFAULT_TTL, TtlCache};
use super::cron::{CronJobList, parse_cron_output};
use super::invoker::CliInvoker;
use super::status::{StatusRecord, normalize_version, parse_status_report};

pub const STATUS_ARGS: &str = "status";
pub const VERSION_ARGS: &str = "--version";
pub const CRON_ARGS: &str = "cron list --json";

/// Cached, parsed view of the external CLI's state.
///
/// One instance is shared by every request handler; each resource has its
/// own cache slot.
pub struct DashboardService {
    cli: Arc<dyn CliInvoker>,
    status: TtlCache<StatusRecord>,
    cron: TtlCache<CronJobList>,
}

impl DashboardService {
    pub fn new(cli: Arc<dyn CliInvoker>, clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(cli, clock, DEFAULT_TTL)
    }

    pub fn with_ttl(cli: Arc<dyn CliInvoker>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            cli,
            status: TtlCache::new(ttl, clock.clone()),
            cron: TtlCache::new(ttl, clock),
        }
    }

    /// `None` when the `status` invocation itself failed.
    pub async fn status(&self) -> Option<StatusRecord> {
        self.status
            .get_or_refresh(|| async {
                debug!("refreshing status");
                let Some(report) = self.cli.run(STATUS_ARGS).await else {
                    warn!("status unavailable, cache left untouched");
                    return None;
                };
                let version = normalize_version(self.cli.run(VERSION_ARGS).await.as_deref());
                Some(parse_status_report(&report, version))
            })
            .await
    }

    pub async fn cron_jobs(&self) -> CronJobList {
        self.cron
            .get_or_refresh(|| async {
                debug!("refreshing cron jobs");
                let raw = self.cli.run(CRON_ARGS).await;
                Some(parse_cron_output(raw.as_deref()))
            })
            .await
            .unwrap_or_default()
    }

    /// Session count from the status report, zero when it is unavailable.
    pub async fn session_count(&self) -> u64 {
        self.status().await.map(|s| s.sessions).unwrap_or(0)
    }
}
