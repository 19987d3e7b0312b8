use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, JoinType, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, Loan, LoanDetail, LoanNew, LoanUpdate, MoneyCents, Repayment, ResultEngine,
    loans::{self, ensure_positive},
    repayments,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Create a loan with status `pending`.
    ///
    /// A friend referenced by name is resolved (or created) inside the same
    /// DB transaction, so a rejected loan never leaves a dangling friend.
    pub async fn create_loan(&self, cmd: LoanNew) -> ResultEngine<LoanDetail> {
        let amount = MoneyCents::new(cmd.amount_minor);
        ensure_positive(amount, "loan")?;
        let reason = normalize_optional_text(cmd.reason.as_deref());
        let notes = normalize_optional_text(cmd.notes.as_deref());

        with_tx!(self, |db_tx| {
            let friend_id = self
                .resolve_friend_ref(&db_tx, &cmd.user_id, &cmd.friend)
                .await?;
            let loan = Loan::new(
                cmd.user_id.clone(),
                friend_id,
                amount,
                cmd.direction,
                cmd.loan_date,
                cmd.due_date,
                reason,
                notes,
            )?;
            loans::ActiveModel::from(&loan).insert(&db_tx).await?;
            tracing::debug!(loan_id = %loan.id, direction = loan.direction.as_str(), "created loan");
            Ok(LoanDetail::new(loan, Vec::new()))
        })
    }

    /// Partially update a loan.
    ///
    /// Direction and friend are editable too (to fix data-entry mistakes);
    /// balances are always aggregated from the current values. The status is
    /// reconciled again since the amount may have changed.
    pub async fn update_loan(&self, cmd: LoanUpdate) -> ResultEngine<LoanDetail> {
        if cmd.is_empty() {
            return Err(EngineError::InvalidLoan(
                "provide at least one field to update".to_string(),
            ));
        }
        if let Some(amount_minor) = cmd.amount_minor {
            ensure_positive(MoneyCents::new(amount_minor), "loan")?;
        }

        let _guard = self.loan_locks.lock(cmd.loan_id).await;

        with_tx!(self, |db_tx| {
            let model = self
                .require_loan(&db_tx, cmd.loan_id, &cmd.user_id)
                .await?;
            let mut active: loans::ActiveModel = model.into();

            if let Some(friend) = &cmd.friend {
                let friend_id = self
                    .resolve_friend_ref(&db_tx, &cmd.user_id, friend)
                    .await?;
                active.friend_id = ActiveValue::Set(friend_id);
            }
            if let Some(amount_minor) = cmd.amount_minor {
                active.amount_minor = ActiveValue::Set(amount_minor);
            }
            if let Some(direction) = cmd.direction {
                active.direction = ActiveValue::Set(direction.as_str().to_string());
            }
            if let Some(loan_date) = cmd.loan_date {
                active.loan_date = ActiveValue::Set(loan_date);
            }
            if let Some(due_date) = cmd.due_date {
                active.due_date = ActiveValue::Set(due_date);
            }
            if let Some(reason) = &cmd.reason {
                active.reason = ActiveValue::Set(normalize_optional_text(reason.as_deref()));
            }
            if let Some(notes) = &cmd.notes {
                active.notes = ActiveValue::Set(normalize_optional_text(notes.as_deref()));
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            let detail = self.reconcile_in_tx(&db_tx, model).await?;
            Ok(detail)
        })
    }

    /// Delete a loan together with its repayments.
    pub async fn delete_loan(&self, loan_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let _guard = self.loan_locks.lock(loan_id).await;

        with_tx!(self, |db_tx| {
            let model = self.require_loan(&db_tx, loan_id, user_id).await?;
            repayments::Entity::delete_many()
                .filter(repayments::Column::LoanId.eq(model.id))
                .exec(&db_tx)
                .await?;
            loans::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Return a loan with its repayments, ordered by repayment date.
    pub async fn loan(&self, loan_id: Uuid, user_id: &str) -> ResultEngine<LoanDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_loan(&db_tx, loan_id, user_id).await?;
            let detail = self.loan_detail(&db_tx, model).await?;
            Ok(detail)
        })
    }

    /// Return the loans of `user_id`, newest first, optionally only those
    /// with `friend_id`.
    pub async fn list_loans(
        &self,
        user_id: &str,
        friend_id: Option<Uuid>,
    ) -> ResultEngine<Vec<LoanDetail>> {
        with_tx!(self, |db_tx| {
            if let Some(friend_id) = friend_id {
                self.require_friend(&db_tx, friend_id, user_id).await?;
            }
            let loans = self.loan_snapshot(&db_tx, user_id, friend_id).await?;
            Ok(loans)
        })
    }

    pub(super) async fn require_loan(
        &self,
        db_tx: &DatabaseTransaction,
        loan_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<loans::Model> {
        loans::Entity::find_by_id(loan_id)
            .filter(loans::Column::OwnerUserId.eq(user_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("loan not exists".to_string()))
    }

    pub(super) async fn loan_detail(
        &self,
        db_tx: &DatabaseTransaction,
        model: loans::Model,
    ) -> ResultEngine<LoanDetail> {
        let repayments = repayments::Entity::find()
            .filter(repayments::Column::LoanId.eq(model.id))
            .order_by_asc(repayments::Column::RepaymentDate)
            .order_by_asc(repayments::Column::CreatedAt)
            .all(db_tx)
            .await?
            .into_iter()
            .map(Repayment::from)
            .collect();
        Ok(LoanDetail::new(Loan::try_from(model)?, repayments))
    }

    /// Load loans and their repayments in two queries and stitch them
    /// together.
    pub(super) async fn loan_snapshot(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        friend_id: Option<Uuid>,
    ) -> ResultEngine<Vec<LoanDetail>> {
        let mut loan_query = loans::Entity::find().filter(loans::Column::OwnerUserId.eq(user_id));
        let mut repayment_query = repayments::Entity::find()
            .join(JoinType::InnerJoin, repayments::Relation::Loans.def())
            .filter(loans::Column::OwnerUserId.eq(user_id));
        if let Some(friend_id) = friend_id {
            loan_query = loan_query.filter(loans::Column::FriendId.eq(friend_id));
            repayment_query = repayment_query.filter(loans::Column::FriendId.eq(friend_id));
        }

        let loan_models = loan_query
            .order_by_desc(loans::Column::LoanDate)
            .order_by_desc(loans::Column::CreatedAt)
            .all(db_tx)
            .await?;
        let repayment_models = repayment_query
            .order_by_asc(repayments::Column::RepaymentDate)
            .order_by_asc(repayments::Column::CreatedAt)
            .all(db_tx)
            .await?;

        let mut by_loan: HashMap<Uuid, Vec<Repayment>> = HashMap::new();
        for model in repayment_models {
            by_loan
                .entry(model.loan_id)
                .or_default()
                .push(Repayment::from(model));
        }

        loan_models
            .into_iter()
            .map(|model| -> ResultEngine<LoanDetail> {
                let repayments = by_loan.remove(&model.id).unwrap_or_default();
                Ok(LoanDetail::new(Loan::try_from(model)?, repayments))
            })
            .collect()
    }
}
