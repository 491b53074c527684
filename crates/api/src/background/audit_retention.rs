//! Periodic purge of old history entries.

use std::time::Duration;

use chrono::Utc;
use reelhouse_db::repositories::AuditRepo;
use reelhouse_db::DbPool;
use tokio_util::sync::CancellationToken;

const PURGE_INTERVAL: Duration = Duration::from_secs(3600);

/// Delete history entries older than `retention_days`, once per hour,
/// until `cancel` fires.
pub async fn run(pool: DbPool, retention_days: i64, cancel: CancellationToken) {
    tracing::info!(
        retention_days,
        interval_secs = PURGE_INTERVAL.as_secs(),
        "History retention job started"
    );

    let mut interval = tokio::time::interval(PURGE_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("History retention job stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match AuditRepo::purge_older_than(&pool, cutoff).await {
                    Ok(0) => tracing::debug!("History retention: nothing to purge"),
                    Ok(deleted) => tracing::info!(deleted, "History retention: purged old entries"),
                    Err(e) => tracing::error!(error = %e, "History retention: purge failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../db/migrations")]
    async fn stops_when_cancelled(pool: DbPool) {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(pool, 30, cancel.clone()));

        cancel.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(joined.is_ok(), "retention job should exit after cancel");
    }
}
