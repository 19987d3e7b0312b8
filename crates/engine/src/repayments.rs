//! Repayments: append-only partial payments against a loan.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{MoneyCents, ResultEngine, loans::ensure_positive};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repayment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount: MoneyCents,
    pub repayment_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Repayment {
    pub fn new(
        loan_id: Uuid,
        amount: MoneyCents,
        repayment_date: NaiveDate,
        notes: Option<String>,
    ) -> ResultEngine<Self> {
        ensure_positive(amount, "repayment")?;
        Ok(Self {
            id: Uuid::new_v4(),
            loan_id,
            amount,
            repayment_date,
            notes,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "repayments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount_minor: i64,
    pub repayment_date: Date,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::loans::Entity",
        from = "Column::LoanId",
        to = "super::loans::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Loans,
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Repayment> for ActiveModel {
    fn from(value: &Repayment) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            loan_id: ActiveValue::Set(value.loan_id),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            repayment_date: ActiveValue::Set(value.repayment_date),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<Model> for Repayment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            loan_id: model.loan_id,
            amount: MoneyCents::new(model.amount_minor),
            repayment_date: model.repayment_date,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}
