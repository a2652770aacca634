use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Owner recorded on tasks created without an explicit owner.
pub const ANONYMOUS_OWNER: &str = "anonymous";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
}

/// Partial update body. Absent fields leave the stored value untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    #[serde(default, alias = "userId")]
    pub owner_id: Option<String>,
}

impl ListTasksQuery {
    /// Owner to filter by, or `None` when every task should be returned.
    ///
    /// The anonymous owner is treated like an absent parameter so older
    /// clients that never sent an owner keep seeing the whole list.
    pub fn owner_filter(&self) -> Option<&str> {
        self.owner_id
            .as_deref()
            .filter(|owner| *owner != ANONYMOUS_OWNER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl Task {
    pub fn new(request: CreateTaskRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description.unwrap_or_default(),
            completed: false,
            owner_id: request
                .owner_id
                .unwrap_or_else(|| ANONYMOUS_OWNER.to_string()),
            created_at: now,
            updated_at: now,
        }
    }
}
