//! Command structs for engine operations.
//!
//! These types group parameters for write operations (loan create/update,
//! repayment add), keeping call sites readable and avoiding long argument
//! lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::LoanDirection;

/// How a loan names its counterparty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FriendRef {
    /// An existing friend of the same owner.
    Id(Uuid),
    /// Looked up by exact name, created when missing.
    Name {
        name: String,
        contact_number: Option<String>,
    },
}

impl FriendRef {
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name {
            name: name.into(),
            contact_number: None,
        }
    }
}

impl From<Uuid> for FriendRef {
    fn from(value: Uuid) -> Self {
        Self::Id(value)
    }
}

/// Create a loan.
#[derive(Clone, Debug)]
pub struct LoanNew {
    pub user_id: String,
    pub friend: FriendRef,
    pub amount_minor: i64,
    pub direction: LoanDirection,
    pub loan_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl LoanNew {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        friend: impl Into<FriendRef>,
        amount_minor: i64,
        direction: LoanDirection,
        loan_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            friend: friend.into(),
            amount_minor,
            direction,
            loan_date,
            due_date: None,
            reason: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Partial update of a loan.
///
/// `None` leaves a field untouched. For the nullable fields, `Some(None)`
/// clears the value.
#[derive(Clone, Debug, Default)]
pub struct LoanUpdate {
    pub loan_id: Uuid,
    pub user_id: String,
    pub friend: Option<FriendRef>,
    pub amount_minor: Option<i64>,
    pub direction: Option<LoanDirection>,
    pub loan_date: Option<NaiveDate>,
    pub due_date: Option<Option<NaiveDate>>,
    pub reason: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl LoanUpdate {
    #[must_use]
    pub fn new(loan_id: Uuid, user_id: impl Into<String>) -> Self {
        Self {
            loan_id,
            user_id: user_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn friend(mut self, friend: impl Into<FriendRef>) -> Self {
        self.friend = Some(friend.into());
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn direction(mut self, direction: LoanDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    #[must_use]
    pub fn loan_date(mut self, loan_date: NaiveDate) -> Self {
        self.loan_date = Some(loan_date);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: Option<String>) -> Self {
        self.reason = Some(reason);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.friend.is_none()
            && self.amount_minor.is_none()
            && self.direction.is_none()
            && self.loan_date.is_none()
            && self.due_date.is_none()
            && self.reason.is_none()
            && self.notes.is_none()
    }
}

/// Record a repayment against a loan.
#[derive(Clone, Debug)]
pub struct RepaymentNew {
    pub user_id: String,
    pub loan_id: Uuid,
    pub amount_minor: i64,
    pub repayment_date: NaiveDate,
    pub notes: Option<String>,
}

impl RepaymentNew {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        loan_id: Uuid,
        amount_minor: i64,
        repayment_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            loan_id,
            amount_minor,
            repayment_date,
            notes: None,
        }
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
