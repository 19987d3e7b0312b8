use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, LoanDetail, MoneyCents, Repayment, RepaymentNew, ResultEngine, repayments,
};

use super::{Engine, normalize_optional_text, with_tx};

/// A stored repayment and the loan as reconciled right after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepaymentRecorded {
    pub repayment: Repayment,
    pub loan: LoanDetail,
}

impl Engine {
    /// Record a repayment and reconcile the loan status before returning.
    ///
    /// Over-payment is accepted; the loan simply becomes `paid`.
    pub async fn add_repayment(&self, cmd: RepaymentNew) -> ResultEngine<RepaymentRecorded> {
        let repayment = Repayment::new(
            cmd.loan_id,
            MoneyCents::new(cmd.amount_minor),
            cmd.repayment_date,
            normalize_optional_text(cmd.notes.as_deref()),
        )?;

        let _guard = self.loan_locks.lock(cmd.loan_id).await;

        with_tx!(self, |db_tx| {
            let loan_model = self
                .require_loan(&db_tx, cmd.loan_id, &cmd.user_id)
                .await?;
            repayments::ActiveModel::from(&repayment)
                .insert(&db_tx)
                .await?;
            let loan = self
                .reconcile_in_tx(&db_tx, loan_model)
                .await
                .inspect_err(|err| {
                    tracing::error!(loan_id = %cmd.loan_id, "loan reconciliation failed: {err}");
                })?;
            Ok(RepaymentRecorded { repayment, loan })
        })
    }

    /// Remove a repayment of `loan_id` and reconcile the loan status.
    ///
    /// The status can move backwards (e.g. `paid` to `pending`).
    pub async fn delete_repayment(
        &self,
        repayment_id: Uuid,
        loan_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<LoanDetail> {
        let _guard = self.loan_locks.lock(loan_id).await;

        with_tx!(self, |db_tx| {
            let loan_model = self.require_loan(&db_tx, loan_id, user_id).await?;
            let repayment = repayments::Entity::find_by_id(repayment_id)
                .filter(repayments::Column::LoanId.eq(loan_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("repayment not exists".to_string()))?;
            repayments::Entity::delete_by_id(repayment.id)
                .exec(&db_tx)
                .await?;
            let loan = self
                .reconcile_in_tx(&db_tx, loan_model)
                .await
                .inspect_err(|err| {
                    tracing::error!(%loan_id, "loan reconciliation failed: {err}");
                })?;
            Ok(loan)
        })
    }

    /// Return the repayments of a loan, oldest first.
    pub async fn list_repayments(
        &self,
        loan_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<Repayment>> {
        with_tx!(self, |db_tx| {
            self.require_loan(&db_tx, loan_id, user_id).await?;
            let repayments = repayments::Entity::find()
                .filter(repayments::Column::LoanId.eq(loan_id))
                .order_by_asc(repayments::Column::RepaymentDate)
                .order_by_asc(repayments::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Repayment::from)
                .collect::<Vec<_>>();
            Ok(repayments)
        })
    }
}
