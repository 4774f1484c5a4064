//! Consistency audit between the registry and the blob store.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

use docstore_core::result::AppResult;
use docstore_core::traits::storage::BlobEntry;
use docstore_core::types::DocumentId;

use super::service::DocumentService;

/// A record whose blob is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingBlob {
    /// Document identifier.
    pub id: DocumentId,
    /// Name the record points at.
    pub stored_name: String,
}

/// A record whose blob length differs from the recorded size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SizeMismatch {
    /// Document identifier.
    pub id: DocumentId,
    /// Name of the blob.
    pub stored_name: String,
    /// Size stored in the registry.
    pub recorded_bytes: u64,
    /// Size found on storage.
    pub actual_bytes: u64,
}

/// Findings of [`DocumentService::verify`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsistencyReport {
    /// Records examined.
    pub records_checked: usize,
    /// Blobs examined, unfinished writes included.
    pub blobs_checked: usize,
    /// Records pointing at nothing.
    pub missing_blobs: Vec<MissingBlob>,
    /// Records whose size disagrees with their blob.
    pub size_mismatches: Vec<SizeMismatch>,
    /// Finished blobs no record refers to.
    pub orphan_blobs: Vec<String>,
    /// Unfinished writes left behind.
    pub partial_blobs: Vec<String>,
    /// Blobs removed because `prune` was requested.
    pub pruned: Vec<String>,
}

impl ConsistencyReport {
    /// No drift of any kind was found.
    pub fn is_consistent(&self) -> bool {
        self.missing_blobs.is_empty()
            && self.size_mismatches.is_empty()
            && self.orphan_blobs.is_empty()
            && self.partial_blobs.is_empty()
    }
}

impl DocumentService {
    /// Compare every record against the blob store.
    ///
    /// With `prune`, orphan and unfinished blobs older than the configured
    /// grace period are deleted. Records are never modified.
    pub async fn verify(&self, prune: bool) -> AppResult<ConsistencyReport> {
        // Blobs are listed before records: an upload finishing in between
        // then shows up as an orphan (protected by the grace period) rather
        // than as a missing blob.
        let blobs = self.blobs.list().await?;
        let records = self.registry.list_records().await?;

        let mut report = ConsistencyReport {
            records_checked: records.len(),
            blobs_checked: blobs.len(),
            ..ConsistencyReport::default()
        };

        let finished: HashMap<&str, &BlobEntry> = blobs
            .iter()
            .filter(|b| !b.partial)
            .map(|b| (b.name.as_str(), b))
            .collect();
        let referenced: HashSet<&str> = records.iter().map(|r| r.stored_name.as_str()).collect();

        for record in &records {
            match finished.get(record.stored_name.as_str()) {
                None => report.missing_blobs.push(MissingBlob {
                    id: record.id,
                    stored_name: record.stored_name.clone(),
                }),
                Some(blob) if blob.size_bytes != record.size() => {
                    report.size_mismatches.push(SizeMismatch {
                        id: record.id,
                        stored_name: record.stored_name.clone(),
                        recorded_bytes: record.size(),
                        actual_bytes: blob.size_bytes,
                    })
                }
                Some(_) => {}
            }
        }

        let grace = i64::try_from(self.config.orphan_grace_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        let cutoff = Utc::now().checked_sub_signed(grace);
        let mut prunable = Vec::new();
        for blob in &blobs {
            if blob.partial {
                report.partial_blobs.push(blob.name.clone());
            } else if !referenced.contains(blob.name.as_str()) {
                report.orphan_blobs.push(blob.name.clone());
            } else {
                continue;
            }
            if blob.modified_at.zip(cutoff).is_some_and(|(m, c)| m < c) {
                prunable.push(blob.name.clone());
            }
        }

        for entry in &report.missing_blobs {
            warn!(document_id = %entry.id, stored_name = %entry.stored_name, "Record has no blob");
        }
        for entry in &report.size_mismatches {
            warn!(
                document_id = %entry.id,
                recorded_bytes = entry.recorded_bytes,
                actual_bytes = entry.actual_bytes,
                "Blob size differs from record"
            );
        }

        if prune {
            for name in prunable {
                match self.blobs.delete(&name).await {
                    Ok(()) => report.pruned.push(name),
                    Err(e) => warn!(stored_name = %name, error = %e, "Failed to prune blob"),
                }
            }
        }

        info!(
            records = report.records_checked,
            blobs = report.blobs_checked,
            missing = report.missing_blobs.len(),
            mismatched = report.size_mismatches.len(),
            orphans = report.orphan_blobs.len(),
            partials = report.partial_blobs.len(),
            pruned = report.pruned.len(),
            "Consistency check finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use docstore_core::config::StorageConfig;

    use super::*;
    use crate::testing::{Fixture, pdf_bytes};

    #[tokio::test]
    async fn test_clean_store_is_consistent() {
        let fx = Fixture::new().await;
        fx.upload("a.pdf", pdf_bytes(10)).await.unwrap();
        fx.upload("b.pdf", pdf_bytes(20)).await.unwrap();

        let report = fx.service.verify(false).await.unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.records_checked, 2);
        assert_eq!(report.blobs_checked, 2);
    }

    #[tokio::test]
    async fn test_detects_every_kind_of_drift() {
        let fx = Fixture::new().await;
        let gone = fx.upload("gone.pdf", pdf_bytes(10)).await.unwrap();
        let grown = fx.upload("grown.pdf", pdf_bytes(10)).await.unwrap();
        let root = fx.dir.path();

        tokio::fs::remove_file(root.join(&gone.stored_name)).await.unwrap();
        tokio::fs::write(root.join(&grown.stored_name), b"longer than ten bytes")
            .await
            .unwrap();
        tokio::fs::write(root.join("1_aaaaaaaaaaaa_stray.pdf"), b"x").await.unwrap();
        tokio::fs::write(root.join("2_bbbbbbbbbbbb_half.pdf.partial"), b"x")
            .await
            .unwrap();

        let report = fx.service.verify(false).await.unwrap();
        assert!(!report.is_consistent());
        assert_eq!(report.missing_blobs[0].id, gone.id);
        assert_eq!(report.size_mismatches[0].id, grown.id);
        assert_eq!(report.size_mismatches[0].actual_bytes, 21);
        assert_eq!(report.orphan_blobs, vec!["1_aaaaaaaaaaaa_stray.pdf"]);
        assert_eq!(report.partial_blobs, vec!["2_bbbbbbbbbbbb_half.pdf.partial"]);
        assert!(report.pruned.is_empty());
    }

    #[tokio::test]
    async fn test_prune_respects_grace_period() {
        let fx = Fixture::new().await;
        tokio::fs::write(fx.dir.path().join("1_aaaaaaaaaaaa_stray.pdf"), b"x")
            .await
            .unwrap();

        let report = fx.service.verify(true).await.unwrap();
        assert_eq!(report.orphan_blobs.len(), 1);
        assert!(report.pruned.is_empty());
        assert_eq!(fx.blob_names().await.len(), 1);
    }

    #[tokio::test]
    async fn test_prune_removes_only_unreferenced() {
        let fx = Fixture::with_config(StorageConfig {
            orphan_grace_seconds: 0,
            ..StorageConfig::default()
        })
        .await;
        let kept = fx.upload("kept.pdf", pdf_bytes(10)).await.unwrap();
        tokio::fs::write(fx.dir.path().join("1_aaaaaaaaaaaa_stray.pdf"), b"x")
            .await
            .unwrap();
        tokio::fs::write(fx.dir.path().join("2_bbbbbbbbbbbb_half.pdf.partial"), b"x")
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let report = fx.service.verify(true).await.unwrap();
        assert_eq!(report.pruned.len(), 2);
        assert_eq!(fx.blob_names().await, vec![kept.stored_name.clone()]);
        assert!(fx.service.verify(false).await.unwrap().is_consistent());
    }
}
