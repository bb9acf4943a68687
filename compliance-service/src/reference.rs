//! Reference data source and TTL cache

use crate::error::{ComplianceError, Result};
use crate::types::{CacheStatus, ReferenceDataset};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Bulk provider of reference entities
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Short name used in logs and dataset metadata
    fn name(&self) -> &str;

    /// Download and parse the full dataset
    async fn fetch(&self) -> Result<ReferenceDataset>;
}

/// Dataset plus how it was obtained
#[derive(Debug, Clone)]
pub struct CacheLookup {
    pub dataset: Option<Arc<ReferenceDataset>>,
    pub status: CacheStatus,
    pub refresh_error: Option<ComplianceError>,
}

/// Reference data cache owned by one screening engine
///
/// Check-then-refresh without coordination: two concurrent callers that both
/// see a stale snapshot may both fetch. The lock is never held across a fetch.
pub struct ReferenceCache {
    source: Arc<dyn ReferenceSource>,
    ttl: Duration,
    snapshot: RwLock<Option<Arc<ReferenceDataset>>>,
}

impl fmt::Debug for ReferenceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCache")
            .field("source", &self.source.name())
            .field("ttl", &self.ttl)
            .field("loaded", &self.snapshot.read().is_some())
            .finish()
    }
}

impl ReferenceCache {
    pub fn new(source: Arc<dyn ReferenceSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// Seed the cache with an existing dataset
    pub fn with_snapshot(self, dataset: ReferenceDataset) -> Self {
        *self.snapshot.write() = Some(Arc::new(dataset));
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn snapshot(&self) -> Option<Arc<ReferenceDataset>> {
        self.snapshot.read().clone()
    }

    /// Fetch unconditionally and replace the snapshot on success
    pub async fn refresh(&self) -> Result<Arc<ReferenceDataset>> {
        let dataset = Arc::new(self.source.fetch().await?);
        info!(
            source = self.source.name(),
            entities = dataset.len(),
            alternates = dataset.alternate_count(),
            "Reference data refreshed"
        );
        *self.snapshot.write() = Some(dataset.clone());
        Ok(dataset)
    }

    /// Current dataset, refreshing first when absent or past its TTL
    pub async fn lookup(&self) -> CacheLookup {
        let current = self.snapshot();
        if let Some(dataset) = &current {
            if !dataset.is_stale(self.ttl, Utc::now()) {
                return CacheLookup {
                    dataset: current,
                    status: CacheStatus::Fresh,
                    refresh_error: None,
                };
            }
        }

        match self.refresh().await {
            Ok(dataset) => CacheLookup {
                dataset: Some(dataset),
                status: CacheStatus::Refreshed,
                refresh_error: None,
            },
            Err(err) => match current {
                Some(stale) => {
                    warn!(
                        source = self.source.name(),
                        fetched_at = %stale.fetched_at,
                        error = %err,
                        "Reference refresh failed, screening against stale data"
                    );
                    CacheLookup {
                        dataset: Some(stale),
                        status: CacheStatus::StaleDegraded,
                        refresh_error: Some(err),
                    }
                }
                None => {
                    warn!(
                        source = self.source.name(),
                        error = %err,
                        "Reference refresh failed and nothing is cached"
                    );
                    CacheLookup {
                        dataset: None,
                        status: CacheStatus::Unavailable,
                        refresh_error: Some(err),
                    }
                }
            },
        }
    }
}
