//! The module contains `Friend` struct: a named counterparty for loans,
//! scoped to the user who created it.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A friend.
///
/// Friends are never deleted automatically: loans reference them by id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: Uuid,
    pub owner_user_id: String,
    /// Unique per owner (exact match).
    pub name: String,
    pub contact_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Friend {
    pub fn new(owner_user_id: String, name: String, contact_number: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_user_id,
            name,
            contact_number,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a lookup-or-create by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FriendResolution {
    pub friend: Friend,
    /// `false` when an existing friend with the same name was reused.
    pub created: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "friends")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_user_id: String,
    pub name: String,
    pub contact_number: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loans::Entity")]
    Loans,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerUserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Friend> for ActiveModel {
    fn from(value: &Friend) -> Self {
        Self {
            id: ActiveValue::Set(value.id),
            owner_user_id: ActiveValue::Set(value.owner_user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            contact_number: ActiveValue::Set(value.contact_number.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<Model> for Friend {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            owner_user_id: model.owner_user_id,
            name: model.name,
            contact_number: model.contact_number,
            created_at: model.created_at,
        }
    }
}
