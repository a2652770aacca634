use std::sync::Arc;

use serde_json::Value;
use todo_shared::{CreateTaskRequest, Task};

use crate::clock::Clock;
use crate::error::ApiError;
use crate::normalize::normalize_item;
use crate::store::{to_item, TaskStore};

pub struct CreateHandler {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
}

impl CreateHandler {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Builds a task from `body`, stores it and returns the stored record.
    #[tracing::instrument(skip_all)]
    pub async fn handle(&self, body: &[u8]) -> Result<Value, ApiError> {
        let request: CreateTaskRequest = serde_json::from_slice(body)?;
        let task = Task::new(request, self.clock.now());
        let item = to_item(&task)?;

        self.store.put(&task.id.to_string(), item.clone()).await?;
        tracing::info!(id = %task.id, owner = %task.owner_id, "task created");

        Ok(normalize_item(&item))
    }
}
