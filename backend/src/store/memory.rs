use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Assignments, Item, StoreError, TaskStore};

/// Process-local store, used by tests and the `memory` backend.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    records: Arc<RwLock<HashMap<String, Item>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn put(&self, key: &str, item: Item) -> Result<(), StoreError> {
        self.records.write().await.insert(key.to_string(), item);
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn conditional_update(
        &self,
        key: &str,
        assignments: &Assignments,
    ) -> Result<Item, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        for (name, value) in assignments.iter() {
            record.insert(name.to_string(), value.clone());
        }

        Ok(record.clone())
    }
}
