use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Distinguishes a missing field (`None`) from an explicit `null`
/// (`Some(None)`) in patch bodies.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod friend {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendNew {
        pub name: String,
        pub contact_number: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendView {
        pub id: Uuid,
        pub name: String,
        pub contact_number: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendsResponse {
        pub friends: Vec<FriendView>,
    }

    /// Result of `POST /friends/resolve`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendResolved {
        pub friend: FriendView,
        /// `false` when the name was already on file.
        pub created: bool,
    }
}

pub mod loan {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LoanDirection {
        /// Money went to the friend.
        Given,
        /// Money came from the friend.
        Taken,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LoanStatus {
        Pending,
        PartiallyPaid,
        Paid,
    }

    /// Either `friend_id` or `friend_name` must be set. A name that is not on
    /// file creates a new friend.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoanNew {
        pub friend_id: Option<Uuid>,
        pub friend_name: Option<String>,
        pub contact_number: Option<String>,
        /// Must be > 0.
        pub amount_minor: i64,
        pub direction: LoanDirection,
        pub loan_date: NaiveDate,
        pub due_date: Option<NaiveDate>,
        pub reason: Option<String>,
        pub notes: Option<String>,
    }

    /// Patch body. Omitted fields are left untouched; `null` clears the
    /// nullable ones.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LoanUpdate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub friend_id: Option<Uuid>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub friend_name: Option<String>,
        /// Stored only when `friend_name` creates a new friend.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub contact_number: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount_minor: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub direction: Option<LoanDirection>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub loan_date: Option<NaiveDate>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub due_date: Option<Option<NaiveDate>>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub reason: Option<Option<String>>,
        #[serde(
            default,
            deserialize_with = "nullable",
            skip_serializing_if = "Option::is_none"
        )]
        pub notes: Option<Option<String>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoanList {
        pub friend_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoanView {
        pub id: Uuid,
        pub friend_id: Uuid,
        pub amount_minor: i64,
        pub direction: LoanDirection,
        pub status: LoanStatus,
        pub loan_date: NaiveDate,
        pub due_date: Option<NaiveDate>,
        pub reason: Option<String>,
        pub notes: Option<String>,
        /// Sum of all repayments.
        pub repaid_minor: i64,
        /// `amount - repaid`; negative when over-paid.
        pub remaining_minor: i64,
        pub overdue: bool,
        pub repayments: Vec<super::repayment::RepaymentView>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoansResponse {
        pub loans: Vec<LoanView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoansReconciled {
        /// Loans whose stored status was out of date.
        pub changed: usize,
    }
}

pub mod repayment {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentNew {
        /// Must be > 0.
        pub amount_minor: i64,
        pub repayment_date: NaiveDate,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub repayment_date: NaiveDate,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentsResponse {
        pub repayments: Vec<RepaymentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepaymentCreated {
        pub repayment: RepaymentView,
        /// The loan after reconciliation.
        pub loan: super::loan::LoanView,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FriendBalanceView {
        pub friend_id: Uuid,
        pub friend_name: String,
        pub total_given_minor: i64,
        pub total_taken_minor: i64,
        /// Positive: the friend owes the user.
        pub net_balance_minor: i64,
        pub active_loan_count: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<FriendBalanceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Overview {
        pub total_lent_minor: i64,
        pub total_borrowed_minor: i64,
        pub net_balance_minor: i64,
        pub active_loan_count: usize,
        pub overdue_loan_count: usize,
        pub friend_count: usize,
    }
}
