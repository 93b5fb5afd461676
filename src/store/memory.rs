//! In-process record store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::store::{Record, RecordInput, RecordStore, StoreError};

/// Records held in a concurrent map. Lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<Uuid, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Record>, StoreError> {
        let mut records: Vec<Record> = self.inner.iter().map(|r| r.value().clone()).collect();
        records.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    async fn insert(&self, input: RecordInput) -> Result<Record, StoreError> {
        let record = input.into_record(Uuid::new_v4());
        self.inner.insert(record.id, record.clone());
        tracing::debug!(id = %record.id, "Record inserted");
        Ok(record)
    }

    async fn update(&self, id: Uuid, input: RecordInput) -> Result<Option<Record>, StoreError> {
        match self.inner.get_mut(&id) {
            Some(mut entry) => {
                *entry = input.into_record(id);
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.inner.remove(&id).is_some())
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        let count = self.inner.len();
        self.inner.clear();
        Ok(count)
    }
}
