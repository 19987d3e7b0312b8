use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{EngineError, Friend, FriendRef, FriendResolution, ResultEngine, friends};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Return every friend of `user_id`, ordered by name.
    pub async fn list_friends(&self, user_id: &str) -> ResultEngine<Vec<Friend>> {
        with_tx!(self, |db_tx| {
            let friends = self.friends_of(&db_tx, user_id).await?;
            Ok(friends)
        })
    }

    /// Return a friend of `user_id`.
    ///
    /// A friend owned by somebody else is reported as not found.
    pub async fn friend(&self, friend_id: Uuid, user_id: &str) -> ResultEngine<Friend> {
        with_tx!(self, |db_tx| {
            let model = self.require_friend(&db_tx, friend_id, user_id).await?;
            Ok(Friend::from(model))
        })
    }

    /// Add a friend explicitly. Fails if the name is already on file.
    pub async fn create_friend(
        &self,
        user_id: &str,
        name: &str,
        contact_number: Option<&str>,
    ) -> ResultEngine<Friend> {
        let name = normalize_required_name(name, "friend")?;
        let contact_number = normalize_optional_text(contact_number);
        with_tx!(self, |db_tx| {
            if self
                .find_friend_by_name(&db_tx, user_id, &name)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(name));
            }
            let friend = Friend::new(user_id.to_string(), name, contact_number);
            self.insert_friend(&db_tx, &friend).await?;
            Ok(friend)
        })
    }

    /// Look a friend up by exact name, creating it when absent.
    ///
    /// Resolving the same name twice returns the same friend.
    pub async fn resolve_or_create_friend(
        &self,
        user_id: &str,
        name: &str,
        contact_number: Option<&str>,
    ) -> ResultEngine<FriendResolution> {
        let name = normalize_required_name(name, "friend")?;
        with_tx!(self, |db_tx| {
            let resolution = self
                .resolve_friend(&db_tx, user_id, &name, contact_number)
                .await?;
            Ok(resolution)
        })
    }

    pub(super) async fn resolve_friend(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        name: &str,
        contact_number: Option<&str>,
    ) -> ResultEngine<FriendResolution> {
        let name = normalize_required_name(name, "friend")?;
        if let Some(model) = self.find_friend_by_name(db_tx, user_id, &name).await? {
            return Ok(FriendResolution {
                friend: Friend::from(model),
                created: false,
            });
        }

        let friend = Friend::new(
            user_id.to_string(),
            name,
            normalize_optional_text(contact_number),
        );
        self.insert_friend(db_tx, &friend).await?;
        tracing::debug!(friend_id = %friend.id, "created friend on demand");

        Ok(FriendResolution {
            friend,
            created: true,
        })
    }

    /// Turn a [`FriendRef`] into the id of a friend owned by `user_id`.
    pub(super) async fn resolve_friend_ref(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        friend: &FriendRef,
    ) -> ResultEngine<Uuid> {
        match friend {
            FriendRef::Id(friend_id) => {
                let model = self.require_friend(db_tx, *friend_id, user_id).await?;
                Ok(model.id)
            }
            FriendRef::Name {
                name,
                contact_number,
            } => {
                let resolution = self
                    .resolve_friend(db_tx, user_id, name, contact_number.as_deref())
                    .await?;
                Ok(resolution.friend.id)
            }
        }
    }

    pub(super) async fn require_friend(
        &self,
        db_tx: &DatabaseTransaction,
        friend_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<friends::Model> {
        friends::Entity::find_by_id(friend_id)
            .filter(friends::Column::OwnerUserId.eq(user_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("friend not exists".to_string()))
    }

    pub(super) async fn friends_of(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<Friend>> {
        let models = friends::Entity::find()
            .filter(friends::Column::OwnerUserId.eq(user_id))
            .order_by_asc(friends::Column::Name)
            .all(db_tx)
            .await?;
        Ok(models.into_iter().map(Friend::from).collect())
    }

    /// Insert `friend`; losing a race on the `(owner, name)` index is an
    /// [`EngineError::ExistingKey`].
    pub(super) async fn insert_friend(
        &self,
        db_tx: &DatabaseTransaction,
        friend: &Friend,
    ) -> ResultEngine<()> {
        friends::ActiveModel::from(friend)
            .insert(db_tx)
            .await
            .map_err(|err| duplicate_name_to_existing_key(err, &friend.name))?;
        Ok(())
    }

    async fn find_friend_by_name(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        name: &str,
    ) -> ResultEngine<Option<friends::Model>> {
        friends::Entity::find()
            .filter(friends::Column::OwnerUserId.eq(user_id))
            .filter(friends::Column::Name.eq(name))
            .one(db_tx)
            .await
            .map_err(Into::into)
    }
}

fn duplicate_name_to_existing_key(err: DbErr, name: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::ExistingKey(name.to_string()),
        _ => EngineError::Database(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_database_errors_pass_through() {
        let err = duplicate_name_to_existing_key(DbErr::Custom("disk full".to_string()), "Bob");
        assert_eq!(err, EngineError::Database(DbErr::Custom("disk full".to_string())));
    }
}
