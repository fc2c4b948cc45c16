use axum::{Json, extract::State, http::StatusCode};
use niramay::http::CurrentUser;

use crate::{
    api::{
        dto::{RegisterCitizenRequest, SetupRoleRequest},
        state::AppState,
    },
    entity::UserRole,
    service::Profile,
    usecase::{RegisterCitizenCommand, RegisteredCitizen, SetupRoleCommand},
};

/// Registers the caller as a citizen.
pub async fn register_citizen(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<RegisterCitizenRequest>,
) -> niramay::Result<(StatusCode, Json<RegisteredCitizen>)> {
    let registered = state
        .register_citizen
        .execute(RegisterCitizenCommand {
            user_id: user.id(),
            full_name: req.full_name,
            email: req.email,
            national_id: req.national_id,
            address: req.address,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<Profile>> {
    Ok(Json(state.dashboards.profile(user.id()).await?))
}

pub async fn setup_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<SetupRoleRequest>,
) -> niramay::Result<(StatusCode, Json<UserRole>)> {
    let role = state
        .setup_role
        .execute(SetupRoleCommand {
            user_id: user.id(),
            role: req.role,
            city: req.city,
            locality: req.locality,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// The caller's role, `404` until role setup has happened.
pub async fn my_role(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<UserRole>> {
    state
        .dashboards
        .profile(user.id())
        .await?
        .role
        .map(Json)
        .ok_or_else(|| niramay::Error::NotFound("role".to_string()))
}
