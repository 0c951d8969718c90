use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::attendance::error::AttendanceError;
use crate::model::status::{StatusId, StatusName};
use crate::store::{StatusSource, StoreError};

/// Read-through cache of status name -> id. Entries are immutable once
/// loaded; `refresh` drops everything and reloads from the source.
#[derive(Clone)]
pub struct StatusCatalog {
    cache: Cache<String, StatusId>,
    source: Arc<dyn StatusSource>,
}

impl StatusCatalog {
    pub fn new(source: Arc<dyn StatusSource>, ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(ttl)
                .build(),
            source,
        }
    }

    /// Resolve a status id by name, loading it from the source on a miss.
    pub async fn id_of(&self, name: StatusName) -> Result<StatusId, AttendanceError> {
        let key = name.as_ref().to_string();
        if let Some(id) = self.cache.get(&key).await {
            return Ok(id);
        }

        let found = self.source.find_status_id(&key).await?;
        match found {
            Some(id) => {
                self.cache.insert(key, id).await;
                Ok(id)
            }
            None => Err(AttendanceError::UnknownStatus(key)),
        }
    }

    /// Invalidate every cached entry and warm up from the source.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        self.cache.invalidate_all();

        let statuses = self.source.load_statuses().await?;
        let total = statuses.len();
        let futures: Vec<_> = statuses
            .into_iter()
            .map(|(name, id)| self.cache.insert(name, id))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;

        tracing::info!(total, "Status catalog warmup complete");
        Ok(total)
    }
}
