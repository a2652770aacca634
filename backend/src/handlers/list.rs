use std::sync::Arc;

use serde_json::Value;
use todo_shared::{ListTasksQuery, ANONYMOUS_OWNER};

use crate::error::ApiError;
use crate::normalize::normalize_items;
use crate::store::{Item, TaskStore};

pub struct ListHandler {
    store: Arc<dyn TaskStore>,
}

impl ListHandler {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Returns every stored task, narrowed to one owner when the query names
    /// an owner other than the anonymous one.
    #[tracing::instrument(skip_all, fields(owner = query.owner_id.as_deref()))]
    pub async fn handle(&self, query: &ListTasksQuery) -> Result<Value, ApiError> {
        let mut items = self.store.scan().await?;
        if let Some(owner) = query.owner_filter() {
            items.retain(|item| owner_of(item) == owner);
        }
        tracing::debug!(count = items.len(), "tasks listed");

        Ok(normalize_items(&items))
    }
}

fn owner_of(item: &Item) -> &str {
    item.get("ownerId")
        .and_then(|value| value.as_str())
        .unwrap_or(ANONYMOUS_OWNER)
}
