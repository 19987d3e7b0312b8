//! Balance endpoints

use api_types::balance::{BalancesResponse, FriendBalanceView, Overview};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{balance_view, overview_view, today},
};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<BalancesResponse>, ServerError> {
    let balances = state.engine.friend_balances(&user.username).await?;

    Ok(Json(BalancesResponse {
        balances: balances.into_iter().map(balance_view).collect(),
    }))
}

pub async fn friend_balance(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(friend_id): Path<Uuid>,
) -> Result<Json<FriendBalanceView>, ServerError> {
    let balance = state
        .engine
        .friend_balance(friend_id, &user.username)
        .await?;

    Ok(Json(balance_view(balance)))
}

/// Totals over all loans; overdue is judged against today's UTC date.
pub async fn overview(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Overview>, ServerError> {
    let summary = state
        .engine
        .loans_overview(&user.username, today())
        .await?;

    Ok(Json(overview_view(summary)))
}
