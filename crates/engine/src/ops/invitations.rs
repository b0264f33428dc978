use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, InviteReport, ResultEngine, group_members, groups, invitations,
    join_request_votes, join_requests,
};

use super::{Engine, with_tx};

impl Engine {
    /// Invites a batch of users into the group (admin only).
    ///
    /// Unknown usernames, members and already invited users do not abort the
    /// batch; the report tells them apart.
    pub async fn invite_users(
        &self,
        group_id: Uuid,
        usernames: &[String],
        user_id: &str,
    ) -> ResultEngine<InviteReport> {
        with_tx!(self, |db_tx| {
            self.require_group_admin(&db_tx, group_id, user_id, "invite users")
                .await?;

            let mut report = InviteReport::default();
            for username in usernames.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
                let already_listed = report.invited.iter().any(|u| u == username)
                    || report.skipped.iter().any(|u| u == username)
                    || report.unknown.iter().any(|u| u == username);
                if already_listed {
                    continue;
                }
                if !self.user_exists(&db_tx, username).await? {
                    report.unknown.push(username.to_string());
                    continue;
                }
                let invited = invitations::Entity::find_by_id((group_id, username.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if invited || self.is_group_member(&db_tx, group_id, username).await? {
                    report.skipped.push(username.to_string());
                    continue;
                }

                invitations::ActiveModel {
                    group_id: ActiveValue::Set(group_id),
                    user_id: ActiveValue::Set(username.to_string()),
                    invited_by: ActiveValue::Set(user_id.to_string()),
                    created_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
                report.invited.push(username.to_string());
            }

            Ok(report)
        })
    }

    /// Accepts a pending invitation: `user_id` becomes a group member.
    pub async fn accept_invitation(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            let invitation = invitations::Entity::find_by_id((group_id, user_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("invitation not exists".to_string()))?;
            invitations::Entity::delete_by_id((invitation.group_id, invitation.user_id))
                .exec(&db_tx)
                .await?;

            if !self.is_group_member(&db_tx, group_id, user_id).await? {
                self.add_group_member(&db_tx, group_id, user_id).await?;
            }
            Ok(group)
        })
    }

    /// Inserts the membership row, clears whatever was pending for this user
    /// and re-derives the group's event statuses.
    pub(super) async fn add_group_member(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        group_members::ActiveModel {
            group_id: ActiveValue::Set(group_id),
            user_id: ActiveValue::Set(user_id.to_string()),
        }
        .insert(db)
        .await?;

        invitations::Entity::delete_many()
            .filter(invitations::Column::GroupId.eq(group_id))
            .filter(invitations::Column::UserId.eq(user_id.to_string()))
            .exec(db)
            .await?;

        let request_ids: Vec<Uuid> = join_requests::Entity::find()
            .filter(join_requests::Column::GroupId.eq(group_id))
            .filter(join_requests::Column::UserId.eq(user_id.to_string()))
            .all(db)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        join_request_votes::Entity::delete_many()
            .filter(join_request_votes::Column::RequestId.is_in(request_ids.clone()))
            .exec(db)
            .await?;
        join_requests::Entity::delete_many()
            .filter(join_requests::Column::Id.is_in(request_ids))
            .exec(db)
            .await?;

        self.refresh_group_statuses(db, group_id).await
    }
}
