use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

mod balances;
mod friends;
mod loans;
mod repayments;

pub use repayments::RepaymentRecorded;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    loan_locks: LoanLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// One async mutex per loan.
///
/// Every repayment mutation (and the reconciliation that follows it) holds the
/// loan's mutex, so concurrent writers on the same loan never compute the
/// status from a stale set of repayments. An entry lives only while somebody
/// holds or waits for it.
#[derive(Debug, Default)]
struct LoanLocks {
    inner: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl LoanLocks {
    fn handle(&self, loan_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(loan_id).or_default())
    }

    /// Wait for exclusive access to `loan_id`.
    async fn lock(&self, loan_id: Uuid) -> LoanLockGuard<'_> {
        let mut held = LoanLockGuard {
            locks: self,
            loan_id,
            handle: self.handle(loan_id),
            guard: None,
        };
        held.guard = Some(Arc::clone(&held.handle).lock_owned().await);
        held
    }

    /// Drop the entry of `loan_id` when `handle` is the last one outside the map.
    fn release(&self, loan_id: Uuid, handle: &Arc<AsyncMutex<()>>) {
        let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let unused = locks
            .get(&loan_id)
            .is_some_and(|entry| Arc::ptr_eq(entry, handle) && Arc::strong_count(entry) == 2);
        if unused {
            locks.remove(&loan_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Holds a loan's mutex; removes the map entry on drop when nobody else
/// waits for it.
struct LoanLockGuard<'a> {
    locks: &'a LoanLocks,
    loan_id: Uuid,
    handle: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LoanLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(self.loan_id, &self.handle);
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            loan_locks: LoanLocks::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Database, Statement, TransactionTrait};

    use super::*;
    use crate::{Friend, FriendRef, LoanDirection, LoanNew, LoanStatus, RepaymentNew};

    async fn engine_with_loan() -> (Arc<Engine>, Uuid) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec!["alice".into(), "password".into()],
        ))
        .await
        .unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        let loan = engine
            .create_loan(LoanNew::new(
                "alice",
                FriendRef::name("Bob"),
                100_00,
                LoanDirection::Given,
                date(),
            ))
            .await
            .unwrap();
        (Arc::new(engine), loan.loan.id)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    #[tokio::test]
    async fn loan_locks_are_exclusive_and_dropped_after_use() {
        let locks = LoanLocks::default();
        let loan_id = Uuid::new_v4();

        let guard = locks.lock(loan_id).await;
        assert_eq!(locks.len(), 1);
        assert!(locks.handle(loan_id).try_lock().is_err());
        drop(guard);
        assert_eq!(locks.len(), 0);
        assert!(locks.lock(loan_id).await.guard.is_some());
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn loan_lock_entry_survives_while_someone_waits() {
        let locks = LoanLocks::default();
        let loan_id = Uuid::new_v4();

        let waiting = locks.handle(loan_id);
        drop(locks.lock(loan_id).await);
        assert_eq!(locks.len(), 1);
        assert!(Arc::ptr_eq(&waiting, &locks.handle(loan_id)));
    }

    #[tokio::test]
    async fn failed_mutations_leave_no_lock_behind() {
        let (engine, loan_id) = engine_with_loan().await;

        for _ in 0..100 {
            let unknown = Uuid::new_v4();
            let err = engine
                .add_repayment(RepaymentNew::new("alice", unknown, 1_00, date()))
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::KeyNotFound(_)));
            assert!(engine.delete_loan(unknown, "alice").await.is_err());
            assert!(engine.reconcile_loan(unknown, "alice").await.is_err());
        }
        assert!(engine
            .add_repayment(RepaymentNew::new("mallory", loan_id, 1_00, date()))
            .await
            .is_err());
        assert_eq!(engine.loan_locks.len(), 0);

        engine
            .add_repayment(RepaymentNew::new("alice", loan_id, 1_00, date()))
            .await
            .unwrap();
        engine.delete_loan(loan_id, "alice").await.unwrap();
        assert_eq!(engine.loan_locks.len(), 0);
    }

    #[tokio::test]
    async fn repayment_waits_for_the_loan_lock() {
        let (engine, loan_id) = engine_with_loan().await;

        let held = engine.loan_locks.lock(loan_id).await;
        let task = tokio::spawn({
            let engine = Arc::clone(&engine);
            async move {
                engine
                    .add_repayment(RepaymentNew::new("alice", loan_id, 40_00, date()))
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!task.is_finished());
        assert!(engine.loan(loan_id, "alice").await.unwrap().repayments.is_empty());

        drop(held);
        let recorded = task.await.unwrap().unwrap();
        assert_eq!(recorded.loan.loan.status, LoanStatus::PartiallyPaid);
        assert_eq!(engine.loan_locks.len(), 0);
    }

    #[tokio::test]
    async fn racing_friend_insert_is_an_existing_key() {
        let (engine, _) = engine_with_loan().await;

        let db_tx = engine.database.begin().await.unwrap();
        let twin = Friend::new("alice".to_string(), "Bob".to_string(), None);
        assert_eq!(
            engine.insert_friend(&db_tx, &twin).await,
            Err(EngineError::ExistingKey("Bob".to_string()))
        );
    }

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(normalize_required_name("  Bob ", "friend").unwrap(), "Bob");
        assert_eq!(
            normalize_required_name("   ", "friend"),
            Err(EngineError::InvalidName(
                "friend name must not be empty".to_string()
            ))
        );
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(Some(" rent ")), Some("rent".to_string()));
    }
}
