//! Loan primitives.
//!
//! A `Loan` is a directional debt between the user and a friend. Its status
//! is derived from the repayments recorded against it (see [`crate::ledger`]);
//! the persisted `status` column is only a cache of that derivation.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Who lent the money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanDirection {
    /// The user lent money to the friend.
    Given,
    /// The user borrowed money from the friend.
    Taken,
}

impl LoanDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Given => "given",
            Self::Taken => "taken",
        }
    }
}

impl TryFrom<&str> for LoanDirection {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "given" => Ok(Self::Given),
            "taken" => Ok(Self::Taken),
            other => Err(EngineError::InvalidLoan(format!(
                "invalid loan direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Pending,
    PartiallyPaid,
    Paid,
}

impl LoanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }

    /// `pending` and `partially_paid` loans are still open.
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Paid)
    }
}

impl TryFrom<&str> for LoanStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "partially_paid" => Ok(Self::PartiallyPaid),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidLoan(format!(
                "invalid loan status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Uuid,
    pub owner_user_id: String,
    pub friend_id: Uuid,
    pub amount: MoneyCents,
    pub direction: LoanDirection,
    pub loan_date: NaiveDate,
    /// Not validated against `loan_date`.
    pub due_date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    /// Last persisted status. Use [`crate::LoanDetail::status`] for the
    /// authoritative value.
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    pub fn new(
        owner_user_id: String,
        friend_id: Uuid,
        amount: MoneyCents,
        direction: LoanDirection,
        loan_date: NaiveDate,
        due_date: Option<NaiveDate>,
        reason: Option<String>,
        notes: Option<String>,
    ) -> ResultEngine<Self> {
        ensure_positive(amount, "loan")?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_user_id,
            friend_id,
            amount,
            direction,
            loan_date,
            due_date,
            reason,
            notes,
            status: LoanStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }
}

pub(crate) fn ensure_positive(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} amount must be > 0"
        )));
    }
    if amount > MoneyCents::MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "{label} amount must be <= {}",
            MoneyCents::MAX_AMOUNT
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "loans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_user_id: String,
    pub friend_id: Uuid,
    pub amount_minor: i64,
    pub direction: String,
    pub loan_date: Date,
    pub due_date: Option<Date>,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::friends::Entity",
        from = "Column::FriendId",
        to = "super::friends::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Friends,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerUserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::repayments::Entity")]
    Repayments,
}

impl Related<super::friends::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Friends.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::repayments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Repayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Loan> for ActiveModel {
    fn from(value: &Loan) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            owner_user_id: ActiveValue::Set(value.owner_user_id.clone()),
            friend_id: ActiveValue::Set(value.friend_id),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            direction: ActiveValue::Set(value.direction.as_str().to_string()),
            loan_date: ActiveValue::Set(value.loan_date),
            due_date: ActiveValue::Set(value.due_date),
            reason: ActiveValue::Set(value.reason.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Loan {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            owner_user_id: model.owner_user_id,
            friend_id: model.friend_id,
            amount: MoneyCents::new(model.amount_minor),
            direction: LoanDirection::try_from(model.direction.as_str())?,
            loan_date: model.loan_date,
            due_date: model.due_date,
            reason: model.reason,
            notes: model.notes,
            status: LoanStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_loan_starts_pending() {
        let loan = Loan::new(
            "alice".to_string(),
            Uuid::new_v4(),
            MoneyCents::new(100_00),
            LoanDirection::Given,
            date(2026, 1, 10),
            None,
            Some("rent".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(loan.status, LoanStatus::Pending);
        assert_eq!(loan.amount.cents(), 100_00);
        assert_eq!(loan.created_at, loan.updated_at);
    }

    #[test]
    fn new_loan_rejects_non_positive_amount() {
        let err = Loan::new(
            "alice".to_string(),
            Uuid::new_v4(),
            MoneyCents::ZERO,
            LoanDirection::Taken,
            date(2026, 1, 10),
            None,
            None,
            None,
        )
        .unwrap_err();

        assert_eq!(
            err,
            EngineError::InvalidAmount("loan amount must be > 0".to_string())
        );
    }

    #[test]
    fn amounts_are_capped() {
        assert!(ensure_positive(MoneyCents::MAX_AMOUNT, "loan").is_ok());
        assert_eq!(
            ensure_positive(MoneyCents::new(MoneyCents::MAX_AMOUNT.cents() + 1), "loan"),
            Err(EngineError::InvalidAmount(
                "loan amount must be <= 1000000000.00".to_string()
            ))
        );
        assert!(ensure_positive(MoneyCents::new(i64::MAX), "repayment").is_err());
    }

    #[test]
    fn due_date_before_loan_date_is_accepted() {
        let loan = Loan::new(
            "alice".to_string(),
            Uuid::new_v4(),
            MoneyCents::new(1),
            LoanDirection::Taken,
            date(2026, 3, 1),
            Some(date(2026, 2, 1)),
            None,
            None,
        );
        assert!(loan.is_ok());
    }

    #[test]
    fn direction_and_status_parse_their_own_strings() {
        for direction in [LoanDirection::Given, LoanDirection::Taken] {
            assert_eq!(LoanDirection::try_from(direction.as_str()).unwrap(), direction);
        }
        for status in [LoanStatus::Pending, LoanStatus::PartiallyPaid, LoanStatus::Paid] {
            assert_eq!(LoanStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(LoanDirection::try_from("lent").is_err());
        assert!(LoanStatus::try_from("overdue").is_err());
    }
}
