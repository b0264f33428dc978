use std::collections::{HashMap, HashSet};

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Dashboard, EngineError, EventOverview, GroupDetail, GroupMember, JoinRequestOverview,
    ResultEngine, Share, Vote, comments, event_members, events, group_members,
    groups, invitations, join_request_votes, join_requests, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a group administered by `user_id`, who becomes its first member.
    pub async fn new_group(&self, name: &str, user_id: &str) -> ResultEngine<groups::Model> {
        let name = normalize_required_name(name, "group name")?;
        with_tx!(self, |db_tx| {
            if !self.user_exists(&db_tx, user_id).await? {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }

            let group = groups::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                name: ActiveValue::Set(name),
                admin_id: ActiveValue::Set(user_id.to_string()),
            }
            .insert(&db_tx)
            .await?;

            group_members::ActiveModel {
                group_id: ActiveValue::Set(group.id),
                user_id: ActiveValue::Set(user_id.to_string()),
            }
            .insert(&db_tx)
            .await?;

            Ok(group)
        })
    }

    /// Everything the group page shows, seen by `viewer`.
    pub async fn group_detail(&self, group_id: Uuid, viewer: &str) -> ResultEngine<GroupDetail> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;

            let member_ids = self.group_member_ids(&db_tx, group_id).await?;
            let profiles = self.profiles_of(&db_tx, &member_ids).await?;
            let members: Vec<GroupMember> = member_ids
                .iter()
                .map(|username| {
                    let profile = profiles.get(username);
                    GroupMember {
                        username: username.clone(),
                        nickname: profile
                            .map(|p| p.nickname.clone())
                            .unwrap_or_else(|| username.clone()),
                        max_spend: profile.map(|p| p.max_spend()).unwrap_or_default(),
                        is_admin: group.is_admin(username),
                    }
                })
                .collect();

            let viewer_max_spend = self.require_profile(&db_tx, viewer).await?.max_spend();

            let group_comments = comments::Entity::find()
                .filter(comments::Column::GroupId.eq(group_id))
                .order_by_desc(comments::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            let group_events = events::Entity::find()
                .filter(events::Column::GroupId.eq(group_id))
                .order_by_asc(events::Column::Date)
                .order_by_asc(events::Column::Name)
                .all(&db_tx)
                .await?;
            let mut overviews = Vec::with_capacity(group_events.len());
            for event in group_events {
                let participants = self.event_member_ids(&db_tx, event.id).await?;
                let share = Share::of(event.total_spend(), members.len());
                overviews.push(EventOverview {
                    status: event.status()?,
                    eligible: share.is_covered_by(viewer_max_spend),
                    joined: participants.iter().any(|p| p == viewer),
                    share,
                    participants,
                    event,
                });
            }

            let requests = join_requests::Entity::find()
                .filter(join_requests::Column::GroupId.eq(group_id))
                .order_by_asc(join_requests::Column::CreatedAt)
                .find_with_related(join_request_votes::Entity)
                .all(&db_tx)
                .await?;
            let join_requests = requests
                .into_iter()
                .map(|(request, votes)| {
                    let accepts = votes
                        .iter()
                        .filter(|v| v.vote == Vote::Accept.as_str())
                        .count();
                    JoinRequestOverview { request, accepts }
                })
                .collect();

            Ok(GroupDetail {
                group,
                members,
                comments: group_comments,
                events: overviews,
                join_requests,
            })
        })
    }

    /// Deletes a group and everything that hangs off it (admin only).
    pub async fn delete_group(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        with_tx!(self, |db_tx| {
            let group = self
                .require_group_admin(&db_tx, group_id, user_id, "delete the group")
                .await?;

            let event_ids: Vec<Uuid> = events::Entity::find()
                .filter(events::Column::GroupId.eq(group_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect();
            event_members::Entity::delete_many()
                .filter(event_members::Column::EventId.is_in(event_ids))
                .exec(&db_tx)
                .await?;
            events::Entity::delete_many()
                .filter(events::Column::GroupId.eq(group_id))
                .exec(&db_tx)
                .await?;

            let request_ids: Vec<Uuid> = join_requests::Entity::find()
                .filter(join_requests::Column::GroupId.eq(group_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|r| r.id)
                .collect();
            join_request_votes::Entity::delete_many()
                .filter(join_request_votes::Column::RequestId.is_in(request_ids))
                .exec(&db_tx)
                .await?;
            join_requests::Entity::delete_many()
                .filter(join_requests::Column::GroupId.eq(group_id))
                .exec(&db_tx)
                .await?;

            comments::Entity::delete_many()
                .filter(comments::Column::GroupId.eq(group_id))
                .exec(&db_tx)
                .await?;
            invitations::Entity::delete_many()
                .filter(invitations::Column::GroupId.eq(group_id))
                .exec(&db_tx)
                .await?;
            group_members::Entity::delete_many()
                .filter(group_members::Column::GroupId.eq(group_id))
                .exec(&db_tx)
                .await?;
            groups::Entity::delete_by_id(group_id).exec(&db_tx).await?;

            Ok(group)
        })
    }

    /// Removes `user_id` from the group and from all of its events.
    ///
    /// The share of every event grows, so all statuses are derived again.
    /// Pending join requests are tallied against the smaller membership. The
    /// admin cannot leave; they delete the group instead.
    pub async fn leave_group(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<groups::Model> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            self.require_group_member(&db_tx, group_id, user_id).await?;
            if group.is_admin(user_id) {
                return Err(EngineError::Forbidden(
                    "The group administrator cannot leave the group.".to_string(),
                ));
            }

            let event_ids: Vec<Uuid> = events::Entity::find()
                .filter(events::Column::GroupId.eq(group_id))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|e| e.id)
                .collect();
            event_members::Entity::delete_many()
                .filter(event_members::Column::EventId.is_in(event_ids))
                .filter(event_members::Column::UserId.eq(user_id.to_string()))
                .exec(&db_tx)
                .await?;
            group_members::Entity::delete_by_id((group_id, user_id.to_string()))
                .exec(&db_tx)
                .await?;

            // The leaver may have been the last missing accept vote.
            let pending = join_requests::Entity::find()
                .filter(join_requests::Column::GroupId.eq(group_id))
                .order_by_asc(join_requests::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            for request in &pending {
                self.tally_join_request(&db_tx, group_id, request).await?;
            }

            self.refresh_group_statuses(&db_tx, group_id).await?;
            Ok(group)
        })
    }

    /// Memberships, invitations, own join requests and groups open to join.
    pub async fn dashboard(&self, user_id: &str) -> ResultEngine<Dashboard> {
        with_tx!(self, |db_tx| {
            let all_groups: HashMap<Uuid, groups::Model> = groups::Entity::find()
                .order_by_asc(groups::Column::Name)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect();

            let member_of: HashSet<Uuid> = group_members::Entity::find()
                .filter(group_members::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|m| m.group_id)
                .collect();

            let pending_invitations: Vec<_> = invitations::Entity::find()
                .filter(invitations::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(invitations::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .filter_map(|inv| all_groups.get(&inv.group_id).cloned().map(|g| (inv, g)))
                .collect();

            let requests: Vec<_> = join_requests::Entity::find()
                .filter(join_requests::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(join_requests::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .filter_map(|req| all_groups.get(&req.group_id).cloned().map(|g| (req, g)))
                .collect();
            let requested: HashSet<Uuid> = requests.iter().map(|(r, _)| r.group_id).collect();

            let mut memberships: Vec<groups::Model> = Vec::new();
            let mut available_groups: Vec<groups::Model> = Vec::new();
            for group in all_groups.into_values() {
                if member_of.contains(&group.id) {
                    memberships.push(group);
                } else if !requested.contains(&group.id) {
                    available_groups.push(group);
                }
            }
            let by_name = |a: &groups::Model, b: &groups::Model| a.name.cmp(&b.name);
            memberships.sort_by(by_name);
            available_groups.sort_by(by_name);

            Ok(Dashboard {
                groups: memberships,
                pending_invitations,
                join_requests: requests,
                available_groups,
            })
        })
    }
}
