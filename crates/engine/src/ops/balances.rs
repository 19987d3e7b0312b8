use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    FriendBalance, LoanDetail, LoanStatus, LoansOverview, ResultEngine, ledger, loans,
};

use super::{Engine, with_tx};

impl Engine {
    /// Recomputes the cached status of a loan from its repayments and
    /// persists it together with a fresh `updated_at`.
    ///
    /// Callers must hold the loan's lock.
    pub(super) async fn reconcile_in_tx(
        &self,
        db_tx: &DatabaseTransaction,
        model: loans::Model,
    ) -> ResultEngine<LoanDetail> {
        let mut detail = self.loan_detail(db_tx, model).await?;
        let status = detail.status();
        let updated_at = Utc::now();

        let loan_model = loans::ActiveModel {
            id: ActiveValue::Set(detail.loan.id),
            status: ActiveValue::Set(status.as_str().to_string()),
            updated_at: ActiveValue::Set(updated_at),
            ..Default::default()
        };
        loan_model.update(db_tx).await?;

        if detail.loan.status != status {
            tracing::debug!(
                loan_id = %detail.loan.id,
                from = detail.loan.status.as_str(),
                to = status.as_str(),
                "loan status changed"
            );
        }
        detail.loan.status = status;
        detail.loan.updated_at = updated_at;
        Ok(detail)
    }

    /// Re-run the reconciliation for a single loan.
    pub async fn reconcile_loan(&self, loan_id: Uuid, user_id: &str) -> ResultEngine<LoanDetail> {
        let (_, detail) = self.reconcile_tracking_previous(loan_id, user_id).await?;
        Ok(detail)
    }

    /// Reconciles every loan of `user_id` and returns how many persisted
    /// statuses were wrong.
    ///
    /// Each loan is reconciled in its own DB transaction under its own lock.
    pub async fn recompute_statuses(&self, user_id: &str) -> ResultEngine<usize> {
        let loan_ids: Vec<Uuid> = with_tx!(self, |db_tx| {
            let models = loans::Entity::find()
                .filter(loans::Column::OwnerUserId.eq(user_id))
                .all(&db_tx)
                .await?;
            Ok::<_, crate::EngineError>(models.into_iter().map(|m| m.id).collect())
        })?;

        let mut changed = 0;
        for loan_id in loan_ids {
            let (previous, detail) = self.reconcile_tracking_previous(loan_id, user_id).await?;
            if previous != detail.loan.status {
                changed += 1;
            }
        }
        tracing::info!(user_id, changed, "recomputed loan statuses");
        Ok(changed)
    }

    async fn reconcile_tracking_previous(
        &self,
        loan_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(LoanStatus, LoanDetail)> {
        let _guard = self.loan_locks.lock(loan_id).await;

        with_tx!(self, |db_tx| {
            let model = self.require_loan(&db_tx, loan_id, user_id).await?;
            let previous = LoanStatus::try_from(model.status.as_str())?;
            let detail = self.reconcile_in_tx(&db_tx, model).await?;
            Ok((previous, detail))
        })
    }

    /// Net balance with every friend of `user_id`, ordered by friend name.
    ///
    /// Friends without loans are included with zero totals.
    pub async fn friend_balances(&self, user_id: &str) -> ResultEngine<Vec<FriendBalance>> {
        with_tx!(self, |db_tx| {
            let friends = self.friends_of(&db_tx, user_id).await?;
            let loans = self.loan_snapshot(&db_tx, user_id, None).await?;
            ledger::friend_balances(&friends, &loans)
        })
    }

    /// Net balance with a single friend.
    pub async fn friend_balance(
        &self,
        friend_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<FriendBalance> {
        with_tx!(self, |db_tx| {
            let friend = self.require_friend(&db_tx, friend_id, user_id).await?;
            let loans = self
                .loan_snapshot(&db_tx, user_id, Some(friend_id))
                .await?;
            ledger::friend_balance(friend.into(), &loans)
        })
    }

    /// Totals across all loans of `user_id`; `today` decides what is overdue.
    pub async fn loans_overview(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> ResultEngine<LoansOverview> {
        with_tx!(self, |db_tx| {
            let loans = self.loan_snapshot(&db_tx, user_id, None).await?;
            ledger::overview(&loans, today)
        })
    }
}
