//! Batch publishing.
//!
//! [`publish`] hands one cycle's batch to a [`StoreClient`] in a single write
//! and logs the outcome. Failures are reported, never retried or buffered.

use chrono::Utc;

use crate::storage::error::StoreError;
use crate::storage::types::DataPoint;

/// A time-series store that accepts batches of points.
#[async_trait::async_trait]
pub trait StoreClient: Send + Sync {
    /// Write all points in one request.
    ///
    /// Returns the number of points actually sent, which is lower than
    /// `points.len()` when some cannot be encoded. Zero means no request
    /// was made.
    async fn write_batch(&self, points: &[DataPoint]) -> Result<usize, StoreError>;
}

/// What a publish attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Batch handed to the store; carries the number of points sent.
    Written(usize),
    /// Nothing to send (empty batch or no point with fields), no write was made.
    Skipped,
}

/// Result of one publish attempt.
pub type PublishResult = Result<PublishOutcome, StoreError>;

/// Publish one batch.
///
/// The result is logged here; callers may ignore it.
pub async fn publish(batch: &[DataPoint], store: &dyn StoreClient) -> PublishResult {
    let attempted_at = Utc::now();

    if batch.is_empty() {
        tracing::info!(at = %attempted_at.to_rfc3339(), "Empty batch, skipping write");
        return Ok(PublishOutcome::Skipped);
    }

    match store.write_batch(batch).await {
        Ok(0) => {
            tracing::info!(
                at = %attempted_at.to_rfc3339(),
                points = batch.len(),
                "No point carries fields, nothing written"
            );
            Ok(PublishOutcome::Skipped)
        }
        Ok(written) => {
            tracing::info!(
                at = %attempted_at.to_rfc3339(),
                points = written,
                dropped = batch.len().saturating_sub(written),
                "Batch written"
            );
            Ok(PublishOutcome::Written(written))
        }
        Err(e) => {
            tracing::error!(
                at = %attempted_at.to_rfc3339(),
                points = batch.len(),
                error = %e,
                "Batch write failed, points dropped"
            );
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<usize>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl StoreClient for RecordingStore {
        async fn write_batch(&self, points: &[DataPoint]) -> Result<usize, StoreError> {
            self.writes.lock().unwrap().push(points.len());
            if self.fail {
                Err(StoreError::Status {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                // Mirrors a line-protocol store: field-less points are not sent
                Ok(points.iter().filter(|p| !p.fields.is_empty()).count())
            }
        }
    }

    #[tokio::test]
    async fn test_publish_writes_whole_batch_once() {
        let store = RecordingStore::default();
        let batch = vec![
            DataPoint::new("a", "x").with_field("f", 1_i64),
            DataPoint::new("b", "y").with_field("g", 2_i64),
        ];

        let outcome = publish(&batch, &store).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Written(2));
        assert_eq!(*store.writes.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_publish_empty_batch_skips_write() {
        let store = RecordingStore::default();

        let outcome = publish(&[], &store).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Skipped);
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_publish_batch_without_fields_is_skipped() {
        let store = RecordingStore::default();
        let batch = vec![
            DataPoint::new("WLANConfiguration2", "GetStatistics"),
            DataPoint::new("WLANConfiguration3", "GetStatistics"),
        ];

        let outcome = publish(&batch, &store).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Skipped);
        assert_eq!(*store.writes.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_publish_counts_only_points_sent() {
        let store = RecordingStore::default();
        let batch = vec![
            DataPoint::new("WANIPConn1", "GetStatusInfo").with_field("NewUptime", 600_i64),
            DataPoint::new("WLANConfiguration3", "GetStatistics"),
        ];

        let outcome = publish(&batch, &store).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Written(1));
    }

    #[tokio::test]
    async fn test_publish_surfaces_store_error() {
        let store = RecordingStore {
            fail: true,
            ..RecordingStore::default()
        };
        let batch = vec![DataPoint::new("a", "x").with_field("f", 1_i64)];

        let result = publish(&batch, &store).await;

        assert!(matches!(result, Err(StoreError::Status { status: 500, .. })));
        assert_eq!(store.writes.lock().unwrap().len(), 1);
    }
}
