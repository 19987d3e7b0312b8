//! Friendly-loan ledger engine.
//!
//! Tracks loans between a user and named friends, the repayments recorded
//! against them, and derives loan status and per-friend net balances. The
//! [`Engine`] owns the database connection; the math lives in [`ledger`] and
//! works on plain snapshots.

pub use commands::{FriendRef, LoanNew, LoanUpdate, RepaymentNew};
pub use error::EngineError;
pub use friends::{Friend, FriendResolution};
pub use ledger::{FriendBalance, LoanDetail, LoansOverview};
pub use loans::{Loan, LoanDirection, LoanStatus};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder, RepaymentRecorded};
pub use repayments::Repayment;

mod commands;
mod error;
mod friends;
pub mod ledger;
mod loans;
mod money;
mod ops;
mod repayments;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
