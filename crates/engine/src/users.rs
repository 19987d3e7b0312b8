//! Users table (minimal entity).
//!
//! Friends and loans are owned by `owner_user_id`, which is the username.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::friends::Entity")]
    Friends,
    #[sea_orm(has_many = "super::loans::Entity")]
    Loans,
}

impl Related<super::friends::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Friends.def()
    }
}

impl Related<super::loans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
