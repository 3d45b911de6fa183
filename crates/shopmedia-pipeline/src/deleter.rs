//! Batch deleter - best-effort bulk deletion of stored images.
//!
//! Deletions are independent and I/O-bound, so they fan out concurrently
//! and the join waits for every call to settle. An individual failure is
//! recorded in the report, never propagated: purging images must not block
//! the caller's larger workflow.

use futures::{stream, StreamExt};
use shopmedia_core::models::{BatchDeletionReport, DeletionOutcome};
use shopmedia_storage::MediaStorage;
use std::sync::Arc;

const DELETE_CONCURRENCY: usize = 8;

pub struct BatchDeleter {
    storage: Arc<dyn MediaStorage>,
}

impl BatchDeleter {
    pub fn new(storage: Arc<dyn MediaStorage>) -> Self {
        Self { storage }
    }

    /// Delete every recognized backend URL in `urls`, collecting per-item
    /// outcomes. URLs that do not belong to our storage backend are
    /// silently excluded before anything is attempted. Always returns a
    /// report; an empty filtered list is a success with zero attempts and
    /// zero network calls.
    ///
    /// Invariant: `deleted_count + errors.len() == attempted`.
    pub async fn delete_many(&self, urls: &[String]) -> BatchDeletionReport {
        let owned: Vec<String> = urls
            .iter()
            .filter(|url| self.storage.owns_url(url))
            .cloned()
            .collect();
        let attempted = owned.len();
        if attempted == 0 {
            return BatchDeletionReport::default();
        }

        let outcomes: Vec<(DeletionOutcome, Option<String>)> = stream::iter(owned)
            .map(|url| {
                let storage = Arc::clone(&self.storage);
                async move { delete_one(storage, url).await }
            })
            .buffer_unordered(DELETE_CONCURRENCY)
            .collect()
            .await;

        let mut report = BatchDeletionReport {
            attempted,
            ..Default::default()
        };
        for (outcome, error) in outcomes {
            if outcome.deleted {
                report.deleted_count += 1;
            }
            if let Some(error) = error {
                report.errors.push(error);
            }
        }

        tracing::info!(
            attempted = report.attempted,
            deleted = report.deleted_count,
            failed = report.errors.len(),
            "Batch image deletion finished"
        );
        report
    }
}

async fn delete_one(
    storage: Arc<dyn MediaStorage>,
    url: String,
) -> (DeletionOutcome, Option<String>) {
    let public_id = match storage.public_id_for_url(&url) {
        Some(id) => id,
        None => {
            tracing::warn!(url = %url, "Could not resolve storage identifier from URL");
            return (
                DeletionOutcome {
                    deleted: false,
                    source_url: url.clone(),
                },
                Some(format!("Could not resolve storage identifier for {}", url)),
            );
        }
    };

    match storage.delete(&public_id).await {
        Ok(()) => (
            DeletionOutcome {
                deleted: true,
                source_url: url,
            },
            None,
        ),
        Err(e) => {
            tracing::warn!(url = %url, public_id = %public_id, error = %e, "Failed to delete image");
            (
                DeletionOutcome {
                    deleted: false,
                    source_url: url.clone(),
                },
                Some(format!("Failed to delete {}: {}", url, e)),
            )
        }
    }
}
