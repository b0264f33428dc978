//! Shared costs scheduled inside a group.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EventStatus, MoneyCents, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub name: String,
    pub date: Date,
    pub total_spend: i64,
    /// `EventStatus::as_str` value.
    pub status: String,
}

impl Model {
    pub fn total_spend(&self) -> MoneyCents {
        MoneyCents::new(self.total_spend)
    }

    pub fn status(&self) -> ResultEngine<EventStatus> {
        EventStatus::try_from(self.status.as_str())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::groups::Entity",
        from = "Column::GroupId",
        to = "super::groups::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Group,
    #[sea_orm(has_many = "super::event_members::Entity")]
    Members,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<super::event_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
