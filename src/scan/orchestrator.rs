//! Concurrent execution of the diagnostic scanner set
//!
//! All scanners for one page run against a bounded worker pool. A
//! scanner that fails or panics contributes zero notifications and never
//! blocks or voids its siblings; each scanner's own notification order is
//! preserved even though scanners complete in any order.

use crate::report::Notification;
use crate::scan::{PageContext, ScannerKind};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Runs every diagnostic scanner against the page snapshot and merges the
/// results
///
/// # Arguments
///
/// * `ctx` - The page snapshot shared by all scanners
/// * `max_workers` - Worker pool bound, clamped to the number of scanners
pub async fn run_scanners(ctx: Arc<PageContext>, max_workers: usize) -> Vec<Notification> {
    let limit = max_workers.clamp(1, ScannerKind::ALL.len());
    let semaphore = Arc::new(Semaphore::new(limit));
    let mut tasks = JoinSet::new();

    for kind in ScannerKind::ALL {
        let ctx = Arc::clone(&ctx);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return (kind, Vec::new()),
            };
            let notifications = kind.run(ctx).await;
            (kind, notifications)
        });
    }

    let mut merged = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((kind, notifications)) => {
                if !notifications.is_empty() {
                    tracing::debug!(
                        "Scanner {} produced {} notification(s)",
                        kind.name(),
                        notifications.len()
                    );
                }
                merged.extend(notifications);
            }
            Err(error) => tracing::warn!("Scanner task failed: {}", error),
        }
    }
    merged
}
