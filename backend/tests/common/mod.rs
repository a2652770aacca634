//! Shared fixtures for the endpoint tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use todo_backend::store::{Assignments, InMemoryTaskStore, Item, StoreError, TaskStore};
use todo_backend::{app, Clock};

/// Clock that advances one second on every reading.
#[derive(Debug, Default)]
pub struct SteppingClock {
    ticks: AtomicI64,
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(tick)
    }
}

/// Store whose every operation fails.
pub struct UnavailableStore;

#[async_trait]
impl TaskStore for UnavailableStore {
    async fn put(&self, _key: &str, _item: Item) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn scan(&self) -> Result<Vec<Item>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn conditional_update(
        &self,
        _key: &str,
        _assignments: &Assignments,
    ) -> Result<Item, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryTaskStore,
}

impl TestApp {
    pub fn new() -> Self {
        let store = InMemoryTaskStore::new();
        let router = app(Arc::new(store.clone()), Arc::new(SteppingClock::default()));
        Self { router, store }
    }

    pub async fn send(&self, method: Method, uri: &str, body: &str) -> TestResponse {
        send(&self.router, method, uri, body).await
    }

    /// Creates a task and returns its response body.
    pub async fn create(&self, body: &str) -> Value {
        let response = self.send(Method::POST, "/todos", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, method: Method, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}
