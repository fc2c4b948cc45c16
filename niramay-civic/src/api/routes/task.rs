use axum::{
    Json,
    extract::{Path, State},
};
use niramay::http::CurrentUser;
use uuid::Uuid;

use crate::{
    api::{
        dto::{AvailabilityRequest, CompleteTaskRequest},
        state::AppState,
    },
    entity::{Task, WorkerStatus},
    usecase::{CompleteTaskCommand, SetAvailabilityCommand, StartTaskCommand},
};

pub async fn start(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> niramay::Result<Json<Task>> {
    let task = state
        .start_task
        .execute(StartTaskCommand {
            worker_id: user.id(),
            task_id,
        })
        .await?;
    Ok(Json(task))
}

pub async fn complete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CompleteTaskRequest>,
) -> niramay::Result<Json<Task>> {
    let task = state
        .complete_task
        .execute(CompleteTaskCommand {
            worker_id: user.id(),
            task_id,
            notes: req.notes,
        })
        .await?;
    Ok(Json(task))
}

pub async fn set_availability(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<AvailabilityRequest>,
) -> niramay::Result<Json<WorkerStatus>> {
    let status = state
        .set_availability
        .execute(SetAvailabilityCommand {
            worker_id: user.id(),
            availability: req.status,
        })
        .await?;
    Ok(Json(status))
}
