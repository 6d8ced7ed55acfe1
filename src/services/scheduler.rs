use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use super::otp::OtpService;
use crate::config::MaintenanceConfig;
use crate::db::Store;

/// Background maintenance: removes one-time codes past their expiry.
pub struct Scheduler {
    store: Store,
    config: MaintenanceConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(store: Store, config: MaintenanceConfig) -> Self {
        Self {
            store,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Runs until [`Scheduler::stop`] is called.
    pub async fn start(&self) -> Result<()> {
        if !self.config.purge_expired_codes {
            info!("Expired code purge is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;

        let mut sched = JobScheduler::new().await?;

        let store = self.store.clone();
        let running = Arc::clone(&self.running);
        let job = Job::new_async(self.config.purge_cron.as_str(), move |_uuid, _lock| {
            let store = store.clone();
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = "purge_codes", "Purging expired codes");

                match OtpService::purge_expired(&store.conn).await {
                    Ok(removed) => info!(
                        event = "job_finished",
                        job_name = "purge_codes",
                        removed,
                        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Expired code purge finished"
                    ),
                    Err(e) => error!(
                        event = "job_failed",
                        job_name = "purge_codes",
                        error = %e,
                        "Expired code purge failed"
                    ),
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler running with cron: {}", self.config.purge_cron);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// One purge pass, outside the cron schedule.
    pub async fn run_once(&self) -> Result<u64> {
        Ok(OtpService::purge_expired(&self.store.conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_scheduler_returns_immediately() {
        let path = std::env::temp_dir().join(format!("marketplace-sched-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", path.display())).await.unwrap();

        let scheduler = Scheduler::new(
            store,
            MaintenanceConfig {
                purge_expired_codes: false,
                ..MaintenanceConfig::default()
            },
        );

        scheduler.start().await.unwrap();
        assert!(!scheduler.is_running().await);
        assert_eq!(scheduler.run_once().await.unwrap(), 0);

        let _ = std::fs::remove_file(path);
    }
}
