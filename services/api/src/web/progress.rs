//! services/api/src/web/progress.rs
//!
//! A cancellable progress watcher over the generation registry. Polling is
//! the only notification mechanism for generation progress, so this wraps the
//! fixed-interval read loop into a task that publishes status snapshots and
//! stops itself on the first terminal status.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wondering_core::domain::GenerationStatus;

use crate::web::registry::GenerationRegistry;

const POLL_INTERVAL: Duration = Duration::from_millis(400);

/// A handle to a running watch: status snapshots arrive on `updates`; cancel
/// via `cancel` to stop observing early (the generation itself runs on).
pub struct ProgressWatch {
    pub updates: mpsc::Receiver<GenerationStatus>,
    pub cancel: CancellationToken,
}

/// Starts polling the registry for `course_id` every 400ms.
///
/// The watch task exits when it reports a terminal status, when it is
/// cancelled, or when the receiver is dropped — whichever comes first.
pub fn watch_generation(registry: Arc<GenerationRegistry>, course_id: String) -> ProgressWatch {
    let cancel = CancellationToken::new();
    let (tx, updates) = mpsc::channel(16);
    let token = cancel.clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {
                    let status = registry.status(&course_id);
                    let terminal = status.is_terminal();
                    if tx.send(status).await.is_err() || terminal {
                        break;
                    }
                }
            }
        }
    });

    ProgressWatch { updates, cancel }
}
