use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use todo_shared::UpdateTaskRequest;

use crate::clock::Clock;
use crate::error::ApiError;
use crate::normalize::normalize_item;
use crate::store::{AttributeValue, Assignments, StoreError, TaskStore};

pub struct UpdateHandler {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
}

/// Builds the assignment set for a partial update.
///
/// `updatedAt` is always assigned; `title`, `description` and `completed`
/// are each assigned only when present in `request`. An explicit `null`
/// deserializes to `None` and counts as absent.
pub fn update_assignments(
    request: UpdateTaskRequest,
    now: DateTime<Utc>,
) -> Result<Assignments, StoreError> {
    let mut assignments = Assignments::new();
    assignments.set("updatedAt", AttributeValue::from_serialize(&now)?);

    if let Some(title) = request.title {
        assignments.set("title", title);
    }
    if let Some(description) = request.description {
        assignments.set("description", description);
    }
    if let Some(completed) = request.completed {
        assignments.set("completed", completed);
    }

    Ok(assignments)
}

impl UpdateHandler {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn handle(&self, id: &str, body: &[u8]) -> Result<Value, ApiError> {
        let request: UpdateTaskRequest = serde_json::from_slice(body)?;
        let assignments = update_assignments(request, self.clock.now())?;
        tracing::debug!(expression = %assignments.expression(), "applying update");

        let item = self.store.conditional_update(id, &assignments).await?;
        Ok(normalize_item(&item))
    }
}
