use std::collections::HashMap;

use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, events, group_members, groups, profiles, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<groups::Model> {
        groups::Entity::find_by_id(group_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("group not exists".to_string()))
    }

    /// Loads the group and checks `user_id` administers it.
    ///
    /// `action` completes the sentence "Only the group administrator can ...".
    pub(super) async fn require_group_admin(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
        action: &str,
    ) -> ResultEngine<groups::Model> {
        let group = self.require_group(db, group_id).await?;
        if !group.is_admin(user_id) {
            return Err(EngineError::Forbidden(format!(
                "Only the group administrator can {action}."
            )));
        }
        Ok(group)
    }

    pub(super) async fn is_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bool> {
        Ok(
            group_members::Entity::find_by_id((group_id, user_id.to_string()))
                .one(db)
                .await?
                .is_some(),
        )
    }

    pub(super) async fn require_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        if !self.is_group_member(db, group_id, user_id).await? {
            return Err(EngineError::NotMember(
                "You are not a member of this group.".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) async fn require_event_in_group(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        event_id: Uuid,
    ) -> ResultEngine<events::Model> {
        events::Entity::find_by_id(event_id)
            .filter(events::Column::GroupId.eq(group_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))
    }

    pub(super) async fn user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<bool> {
        Ok(users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some())
    }

    pub(super) async fn require_profile(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<profiles::Model> {
        profiles::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("profile not exists".to_string()))
    }

    /// Usernames of the current group members, sorted.
    pub(super) async fn group_member_ids(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<String>> {
        Ok(group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id))
            .order_by_asc(group_members::Column::UserId)
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect())
    }

    /// Profiles of the given users keyed by username.
    pub(super) async fn profiles_of(
        &self,
        db: &DatabaseTransaction,
        usernames: &[String],
    ) -> ResultEngine<HashMap<String, profiles::Model>> {
        if usernames.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(profiles::Entity::find()
            .filter(profiles::Column::UserId.is_in(usernames.iter().cloned()))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.user_id.clone(), p))
            .collect())
    }

    /// `max_spend` of every current group member, one entry per member.
    ///
    /// A member without a profile counts with a limit of zero.
    pub(super) async fn member_max_spends(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<Vec<MoneyCents>> {
        let members = self.group_member_ids(db, group_id).await?;
        let profiles = self.profiles_of(db, &members).await?;
        Ok(members
            .iter()
            .map(|username| {
                profiles
                    .get(username)
                    .map_or(MoneyCents::ZERO, profiles::Model::max_spend)
            })
            .collect())
    }
}
