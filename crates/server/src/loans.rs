//! Loan endpoints

use api_types::loan::{LoanList, LoanNew, LoanUpdate, LoanView, LoansReconciled, LoansResponse};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::FriendRef;
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{loan_view, parse_direction, today},
};

fn friend_ref(
    friend_id: Option<Uuid>,
    friend_name: Option<String>,
    contact_number: Option<String>,
) -> Option<FriendRef> {
    match (friend_id, friend_name) {
        (Some(id), _) => Some(FriendRef::Id(id)),
        (None, Some(name)) => Some(FriendRef::Name {
            name,
            contact_number,
        }),
        (None, None) => None,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<LoanList>,
) -> Result<Json<LoansResponse>, ServerError> {
    let loans = state
        .engine
        .list_loans(&user.username, query.friend_id)
        .await?;
    let today = today();

    Ok(Json(LoansResponse {
        loans: loans.into_iter().map(|d| loan_view(d, today)).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LoanNew>,
) -> Result<(StatusCode, Json<LoanView>), ServerError> {
    let friend = friend_ref(
        payload.friend_id,
        payload.friend_name,
        payload.contact_number,
    )
    .ok_or_else(|| ServerError::Generic("friend_id or friend_name required".to_string()))?;

    let mut cmd = engine::LoanNew::new(
        user.username.clone(),
        friend,
        payload.amount_minor,
        parse_direction(payload.direction),
        payload.loan_date,
    );
    cmd.due_date = payload.due_date;
    cmd.reason = payload.reason;
    cmd.notes = payload.notes;

    let detail = state.engine.create_loan(cmd).await?;
    tracing::debug!(loan_id = %detail.loan.id, "loan created");

    Ok((StatusCode::CREATED, Json(loan_view(detail, today()))))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LoanView>, ServerError> {
    let detail = state.engine.loan(id, &user.username).await?;

    Ok(Json(loan_view(detail, today())))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LoanUpdate>,
) -> Result<Json<LoanView>, ServerError> {
    let detail = state
        .engine
        .update_loan(engine::LoanUpdate {
            loan_id: id,
            user_id: user.username.clone(),
            friend: friend_ref(
                payload.friend_id,
                payload.friend_name,
                payload.contact_number,
            ),
            amount_minor: payload.amount_minor,
            direction: payload.direction.map(parse_direction),
            loan_date: payload.loan_date,
            due_date: payload.due_date,
            reason: payload.reason,
            notes: payload.notes,
        })
        .await?;

    Ok(Json(loan_view(detail, today())))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_loan(id, &user.username).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Recompute the stored status of every loan of the caller.
pub async fn reconcile(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<LoansReconciled>, ServerError> {
    let changed = state.engine.recompute_statuses(&user.username).await?;

    Ok(Json(LoansReconciled { changed }))
}
