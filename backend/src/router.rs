use std::sync::Arc;

use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::clock::Clock;
use crate::handlers::{
    create_task, list_tasks, preflight_task, preflight_tasks, update_task, AppState,
};
use crate::store::TaskStore;

/// Routes the task handlers: `POST /todos`, `GET /todos`, `PUT /todos/:id`.
pub fn app(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_tasks).post(create_task).options(preflight_tasks),
        )
        .route("/todos/:id", put(update_task).options(preflight_task))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(store, clock))
}
