use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use niramay::http::CurrentUser;
use uuid::Uuid;

use crate::{
    api::{
        dto::{
            AssignComplaintRequest, RejectComplaintRequest,
            SubmitComplaintRequest,
        },
        state::AppState,
    },
    entity::{Complaint, Task},
    usecase::{
        AssignComplaintCommand, RejectComplaintCommand, SubmitComplaintCommand,
    },
};

pub async fn submit(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SubmitComplaintRequest>,
) -> niramay::Result<(StatusCode, Json<Complaint>)> {
    let complaint = state
        .submit_complaint
        .execute(SubmitComplaintCommand {
            user_id: user.id(),
            title: req.title,
            description: req.description,
            photo_url: req.photo_url,
            latitude: req.latitude,
            longitude: req.longitude,
            address: req.address,
            priority: req.priority,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn mine(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<Vec<Complaint>>> {
    let dashboard = state.dashboards.citizen_dashboard(user.id()).await?;
    Ok(Json(dashboard.complaints))
}

pub async fn assign(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(complaint_id): Path<Uuid>,
    Json(req): Json<AssignComplaintRequest>,
) -> niramay::Result<(StatusCode, Json<Task>)> {
    let task = state
        .assign_complaint
        .execute(AssignComplaintCommand {
            admin_id: user.id(),
            complaint_id,
            worker_id: req.worker_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn reject(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(complaint_id): Path<Uuid>,
    Json(req): Json<RejectComplaintRequest>,
) -> niramay::Result<Json<Complaint>> {
    let complaint = state
        .reject_complaint
        .execute(RejectComplaintCommand {
            admin_id: user.id(),
            complaint_id,
            reason: req.reason,
        })
        .await?;
    Ok(Json(complaint))
}
