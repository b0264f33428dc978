//! Per-user financial attributes and display names.

use sea_orm::entity::prelude::*;

use crate::MoneyCents;

/// Spending limit and balance a new profile starts with (100.00).
pub const DEFAULT_LIMIT: MoneyCents = MoneyCents::new(100_00);

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,
    pub first_name: String,
    pub surname: String,
    pub nickname: String,
    /// Lookup key enforcing nickname uniqueness, see `util::normalize_key`.
    #[sea_orm(unique)]
    pub nickname_norm: String,
    pub max_spend: i64,
    pub balance: i64,
}

impl Model {
    pub fn max_spend(&self) -> MoneyCents {
        MoneyCents::new(self.max_spend)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
