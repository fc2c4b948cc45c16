use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use niramay::http::CurrentUser;
use uuid::Uuid;

use crate::{
    api::{dto::RedeemRequest, state::AppState},
    entity::{EcoStoreItem, PointTransaction, Redemption, RedemptionWithItem},
    usecase::{RedeemItemCommand, StoreItemDraft},
};

/// Active catalog, cheapest first.
pub async fn list_items(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> niramay::Result<Json<Vec<EcoStoreItem>>> {
    Ok(Json(state.dashboards.store_items().await?))
}

pub async fn create_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(draft): Json<StoreItemDraft>,
) -> niramay::Result<(StatusCode, Json<EcoStoreItem>)> {
    let item = state.catalog.create_item(user.id(), draft).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(draft): Json<StoreItemDraft>,
) -> niramay::Result<Json<EcoStoreItem>> {
    Ok(Json(state.catalog.update_item(user.id(), item_id, draft).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> niramay::Result<StatusCode> {
    state.catalog.delete_item(user.id(), item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn redeem(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(req): Json<RedeemRequest>,
) -> niramay::Result<(StatusCode, Json<Redemption>)> {
    let redemption = state
        .redeem_item
        .execute(RedeemItemCommand {
            user_id: user.id(),
            item_id,
            delivery_address: req.delivery_address,
            notes: req.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(redemption)))
}

pub async fn redemptions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<Vec<RedemptionWithItem>>> {
    Ok(Json(state.dashboards.redemptions(user.id()).await?))
}

pub async fn transactions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<Vec<PointTransaction>>> {
    Ok(Json(state.dashboards.transactions(user.id()).await?))
}

/// Full catalog including inactive entries, for admins.
pub async fn catalog(
    State(state): State<AppState>,
    user: CurrentUser,
) -> niramay::Result<Json<Vec<EcoStoreItem>>> {
    Ok(Json(state.catalog.list_items(user.id()).await?))
}
