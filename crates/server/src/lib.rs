use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod balances;
mod friends;
mod loans;
mod repayments;
mod server;
mod user;
mod views;

pub mod types {
    pub mod friend {
        pub use api_types::friend::{FriendNew, FriendResolved, FriendView, FriendsResponse};
    }

    pub mod loan {
        pub use api_types::loan::{
            LoanDirection, LoanList, LoanNew, LoanStatus, LoanUpdate, LoanView, LoansReconciled,
            LoansResponse,
        };
    }

    pub mod repayment {
        pub use api_types::repayment::{
            RepaymentCreated, RepaymentNew, RepaymentView, RepaymentsResponse,
        };
    }

    pub mod balance {
        pub use api_types::balance::{BalancesResponse, FriendBalanceView, Overview};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidLoan(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
