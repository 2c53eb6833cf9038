//! Dashboard session state and its HTTP API.

mod server;
mod session;

pub use server::{
    DashboardServer, HealthResponse, RunningServer, TaskListResponse, UpsertResponse,
    api_criteria_clear, api_criteria_get, api_criteria_set, api_facets, api_stats,
    api_task_create, api_task_delete, api_task_get, api_task_patch, api_task_upsert,
    api_tasks_list, api_user_create, api_user_get, api_user_stats, api_users, api_view,
    build_router, health, start_server,
};
pub use session::{DashboardSession, DashboardView};
