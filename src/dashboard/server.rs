//! HTTP server for the dashboard API.
//!
//! Serves the session's view as JSON. Filter criteria travel as query-string
//! form fields (`?search=auth&status=pending&assignedTo=unassigned`); a request
//! without any query uses the criteria stored in the session.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::session::{DashboardSession, DashboardView};
use crate::engine::{Facets, FilterCriteria, TaskStats, UserStats};
use crate::error::{ErrorCode, TaskboardError};
use crate::types::{Task, User, UserId};
use crate::validate::{NewTask, NewUser, TaskUpdate};

/// Dashboard server state shared across handlers.
#[derive(Clone)]
pub struct DashboardServer {
    session: Arc<DashboardSession>,
}

impl DashboardServer {
    pub fn new(session: Arc<DashboardSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &DashboardSession {
        &self.session
    }

    /// Criteria from the query string, or the stored criteria when there is none.
    fn criteria_for(
        &self,
        query: HashMap<String, String>,
    ) -> Result<FilterCriteria, TaskboardError> {
        if query.is_empty() {
            return Ok(self.session.criteria());
        }
        let value = serde_json::to_value(query).map_err(anyhow::Error::from)?;
        serde_json::from_value(value)
            .map_err(|e| TaskboardError::invalid_value("query", e.to_string()))
    }
}

impl IntoResponse for TaskboardError {
    fn into_response(self) -> Response {
        let status = match self.code() {
            ErrorCode::TaskNotFound | ErrorCode::UserNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationFailed | ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
            ErrorCode::SnapshotLoad | ErrorCode::ConfigError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            warn!(error = %self, "Dashboard request failed");
        }
        (status, Json(self.to_body())).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Filtered task list response.
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub count: usize,
    pub tasks: Vec<Task>,
}

/// Result of pushing a task into the session.
#[derive(Debug, Serialize)]
pub struct UpsertResponse {
    pub id: i64,
    pub replaced: bool,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn api_view(
    State(state): State<DashboardServer>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<DashboardView>, TaskboardError> {
    let criteria = state.criteria_for(query)?;
    Ok(Json(state.session().view_with(&criteria)))
}

pub async fn api_tasks_list(
    State(state): State<DashboardServer>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<TaskListResponse>, TaskboardError> {
    let criteria = state.criteria_for(query)?;
    let tasks = state.session().view_with(&criteria).tasks;
    Ok(Json(TaskListResponse {
        count: tasks.len(),
        tasks,
    }))
}

pub async fn api_task_get(
    State(state): State<DashboardServer>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, TaskboardError> {
    state
        .session()
        .task(task_id)
        .map(Json)
        .ok_or(TaskboardError::TaskNotFound(task_id))
}

/// A created or updated task coming back from the backend.
pub async fn api_task_upsert(
    State(state): State<DashboardServer>,
    Json(task): Json<Task>,
) -> (StatusCode, Json<UpsertResponse>) {
    let id = task.id;
    let replaced = state.session().task_updated(task);
    let status = if replaced {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(UpsertResponse { id, replaced }))
}

pub async fn api_task_delete(
    State(state): State<DashboardServer>,
    Path(task_id): Path<i64>,
) -> Result<StatusCode, TaskboardError> {
    if state.session().task_deleted(task_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(TaskboardError::TaskNotFound(task_id))
    }
}

/// A task form submission: validated, then added under the next id.
pub async fn api_task_create(
    State(state): State<DashboardServer>,
    Json(draft): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), TaskboardError> {
    let task = state.session().create_task(&draft, Utc::now())?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// A partial edit of one task.
pub async fn api_task_patch(
    State(state): State<DashboardServer>,
    Path(task_id): Path<i64>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, TaskboardError> {
    let task = state.session().update_task(task_id, &update, Utc::now())?;
    Ok(Json(task))
}

pub async fn api_stats(State(state): State<DashboardServer>) -> Json<TaskStats> {
    Json(state.session().stats())
}

pub async fn api_facets(State(state): State<DashboardServer>) -> Json<Facets> {
    Json(state.session().facets())
}

pub async fn api_users(State(state): State<DashboardServer>) -> Json<Vec<User>> {
    Json(Vec::clone(&state.session().users()))
}

pub async fn api_user_get(
    State(state): State<DashboardServer>,
    Path(user_id): Path<UserId>,
) -> Result<Json<User>, TaskboardError> {
    state
        .session()
        .user(user_id)
        .map(Json)
        .ok_or(TaskboardError::UserNotFound(user_id))
}

/// An account form submission.
pub async fn api_user_create(
    State(state): State<DashboardServer>,
    Json(draft): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), TaskboardError> {
    let user = state.session().create_user(&draft)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn api_user_stats(State(state): State<DashboardServer>) -> Json<UserStats> {
    Json(state.session().user_stats())
}

pub async fn api_criteria_get(State(state): State<DashboardServer>) -> Json<FilterCriteria> {
    Json(state.session().criteria())
}

pub async fn api_criteria_set(
    State(state): State<DashboardServer>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<DashboardView> {
    state.session().set_criteria(criteria);
    Json(state.session().view())
}

pub async fn api_criteria_clear(State(state): State<DashboardServer>) -> Json<DashboardView> {
    state.session().clear_criteria();
    Json(state.session().view())
}

/// Build the router with all routes.
pub fn build_router(state: DashboardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/view", get(api_view))
        .route("/api/tasks", get(api_tasks_list).post(api_task_upsert))
        .route("/api/tasks/new", post(api_task_create))
        .route(
            "/api/tasks/{task_id}",
            get(api_task_get)
                .patch(api_task_patch)
                .delete(api_task_delete),
        )
        .route("/api/stats", get(api_stats))
        .route("/api/facets", get(api_facets))
        .route("/api/users", get(api_users).post(api_user_create))
        .route("/api/users/stats", get(api_user_stats))
        .route("/api/users/{user_id}", get(api_user_get))
        .route(
            "/api/criteria",
            get(api_criteria_get)
                .put(api_criteria_set)
                .delete(api_criteria_clear),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A dashboard API bound to a socket and serving in the background.
pub struct RunningServer {
    /// Address actually bound; differs from the requested one for port 0.
    pub addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningServer {
    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "Dashboard API task ended abnormally");
        }
    }
}

/// Bind `addr` and serve the session's API until [`RunningServer::stop`].
pub async fn start_server(
    session: Arc<DashboardSession>,
    addr: SocketAddr,
) -> anyhow::Result<RunningServer> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let app = build_router(DashboardServer::new(session));
    let (stop, stopped) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stopped.await;
            })
            .await;
        match result {
            Ok(()) => info!("Dashboard API stopped"),
            Err(e) => tracing::error!(error = %e, "Dashboard API failed"),
        }
    });

    info!(%addr, "Dashboard API listening");
    Ok(RunningServer { addr, stop, task })
}
