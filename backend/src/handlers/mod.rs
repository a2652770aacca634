//! Request handlers for the task routes.
//!
//! Each handler owns its collaborators and turns one request into one JSON
//! body. The axum adapters in this module are the error boundary: any
//! [`ApiError`] becomes a 500 with `{"error": ...}`, and every response
//! carries the same content type and CORS headers.

mod create;
mod list;
mod update;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use todo_shared::ListTasksQuery;

use crate::clock::Clock;
use crate::error::ApiError;
use crate::store::TaskStore;

pub use self::create::CreateHandler;
pub use self::list::ListHandler;
pub use self::update::{update_assignments, UpdateHandler};

const CREATE_METHODS: &str = "POST, OPTIONS";
const LIST_METHODS: &str = "GET, OPTIONS";
const UPDATE_METHODS: &str = "PUT, OPTIONS";

#[derive(Clone)]
pub struct AppState {
    pub create: Arc<CreateHandler>,
    pub list: Arc<ListHandler>,
    pub update: Arc<UpdateHandler>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            create: Arc::new(CreateHandler::new(Arc::clone(&store), Arc::clone(&clock))),
            list: Arc::new(ListHandler::new(Arc::clone(&store))),
            update: Arc::new(UpdateHandler::new(store, clock)),
        }
    }
}

fn json_response(status: StatusCode, methods: &'static str, body: &Value) -> Response {
    let mut response = (status, body.to_string()).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(methods));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn respond(
    success: StatusCode,
    methods: &'static str,
    result: Result<Value, ApiError>,
) -> Response {
    match result {
        Ok(body) => json_response(success, methods, &body),
        Err(error) => {
            tracing::error!(%error, "request failed");
            let body = json!({ "error": error.to_string() });
            json_response(error.status(), methods, &body)
        }
    }
}

pub async fn create_task(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match body {
        Ok(body) => state.create.handle(&body).await,
        Err(rejection) => Err(ApiError::UnreadableBody(rejection.body_text())),
    };
    respond(StatusCode::CREATED, CREATE_METHODS, result)
}

pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Response {
    let result = match query {
        Ok(Query(query)) => state.list.handle(&query).await,
        Err(rejection) => Err(ApiError::InvalidQuery(rejection.body_text())),
    };
    respond(StatusCode::OK, LIST_METHODS, result)
}

pub async fn update_task(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match (id, body) {
        (Err(rejection), _) => Err(ApiError::InvalidPath(rejection.body_text())),
        (_, Err(rejection)) => Err(ApiError::UnreadableBody(rejection.body_text())),
        (Ok(Path(id)), Ok(body)) => state.update.handle(&id, &body).await,
    };
    respond(StatusCode::OK, UPDATE_METHODS, result)
}

pub async fn preflight_tasks() -> Response {
    json_response(StatusCode::OK, "GET, POST, OPTIONS", &json!({}))
}

pub async fn preflight_task() -> Response {
    json_response(StatusCode::OK, UPDATE_METHODS, &json!({}))
}
