//! Repayment endpoints

use api_types::{
    loan::LoanView,
    repayment::{RepaymentCreated, RepaymentNew, RepaymentsResponse},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    user,
    views::{loan_view, repayment_view, today},
};

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(loan_id): Path<Uuid>,
) -> Result<Json<RepaymentsResponse>, ServerError> {
    let repayments = state
        .engine
        .list_repayments(loan_id, &user.username)
        .await?;

    Ok(Json(RepaymentsResponse {
        repayments: repayments.into_iter().map(repayment_view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(loan_id): Path<Uuid>,
    Json(payload): Json<RepaymentNew>,
) -> Result<(StatusCode, Json<RepaymentCreated>), ServerError> {
    let mut cmd = engine::RepaymentNew::new(
        user.username.clone(),
        loan_id,
        payload.amount_minor,
        payload.repayment_date,
    );
    cmd.notes = payload.notes;

    let recorded = state.engine.add_repayment(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(RepaymentCreated {
            repayment: repayment_view(recorded.repayment),
            loan: loan_view(recorded.loan, today()),
        }),
    ))
}

/// Delete a repayment and return the reconciled loan.
pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path((loan_id, repayment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LoanView>, ServerError> {
    let detail = state
        .engine
        .delete_repayment(repayment_id, loan_id, &user.username)
        .await?;

    Ok(Json(loan_view(detail, today())))
}
