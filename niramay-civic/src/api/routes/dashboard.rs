use axum::{Json, extract::State};
use niramay::http::CurrentUser;

use crate::{
    api::state::AppState,
    service::{AdminDashboard, CitizenDashboard, WorkerDashboard},
};

pub async fn admin(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<AdminDashboard>> {
    Ok(Json(state.dashboards.admin_dashboard(user.id()).await?))
}

pub async fn citizen(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<CitizenDashboard>> {
    Ok(Json(state.dashboards.citizen_dashboard(user.id()).await?))
}

pub async fn worker(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<WorkerDashboard>> {
    Ok(Json(state.dashboards.worker_dashboard(user.id()).await?))
}
