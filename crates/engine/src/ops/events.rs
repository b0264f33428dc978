use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, EventState, EventStatus, NewEvent, ResultEngine, Share, derive_status,
    event_members, events, groups, util::normalize_required_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates an event in a group (admin only).
    ///
    /// The row starts as `Pending` and its status is derived right away.
    pub async fn new_event(
        &self,
        group_id: Uuid,
        event: NewEvent,
        user_id: &str,
    ) -> ResultEngine<EventState> {
        with_tx!(self, |db_tx| {
            self.require_group_admin(&db_tx, group_id, user_id, "create events")
                .await?;
            let name = normalize_required_name(&event.name, "event name")?;
            let total_spend = event.total_spend.non_negative("total spend")?;

            let model = events::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group_id),
                name: ActiveValue::Set(name),
                date: ActiveValue::Set(event.date),
                total_spend: ActiveValue::Set(total_spend.cents()),
                status: ActiveValue::Set(EventStatus::Pending.as_str().to_string()),
            }
            .insert(&db_tx)
            .await?;

            self.refresh_event_status(&db_tx, model).await
        })
    }

    /// Group and member count shown on the event creation page (admin only).
    pub async fn event_form(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<(groups::Model, usize)> {
        with_tx!(self, |db_tx| {
            let group = self
                .require_group_admin(&db_tx, group_id, user_id, "create events")
                .await?;
            let members = self.group_member_ids(&db_tx, group_id).await?;
            Ok((group, members.len()))
        })
    }

    /// Current share of an event: its total split among the group members.
    pub async fn event_share(&self, group_id: Uuid, event_id: Uuid) -> ResultEngine<Share> {
        with_tx!(self, |db_tx| {
            let event = self.require_event_in_group(&db_tx, group_id, event_id).await?;
            let members = self.group_member_ids(&db_tx, group_id).await?;
            Ok(Share::of(event.total_spend(), members.len()))
        })
    }

    /// Derives and persists the event status; `true` when it is `Active`.
    pub async fn check_event_status(&self, group_id: Uuid, event_id: Uuid) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            let event = self.require_event_in_group(&db_tx, group_id, event_id).await?;
            let state = self.refresh_event_status(&db_tx, event).await?;
            Ok(state.status.is_active())
        })
    }

    /// Adds `user_id` to the event if their `max_spend` covers the share.
    pub async fn join_event(
        &self,
        group_id: Uuid,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<EventState> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let event = self.require_event_in_group(&db_tx, group_id, event_id).await?;
            self.require_group_member(&db_tx, group_id, user_id).await?;

            let profile = self.require_profile(&db_tx, user_id).await?;
            let members = self.group_member_ids(&db_tx, group_id).await?;
            let share = Share::of(event.total_spend(), members.len());
            if !share.is_covered_by(profile.max_spend()) {
                return Err(EngineError::MaxSpendTooLow {
                    max_spend: profile.max_spend(),
                    share: share.amount(),
                });
            }

            if self.is_event_member(&db_tx, event_id, user_id).await? {
                return Err(EngineError::AlreadyJoined(event.name));
            }

            event_members::ActiveModel {
                event_id: ActiveValue::Set(event_id),
                user_id: ActiveValue::Set(user_id.to_string()),
            }
            .insert(&db_tx)
            .await?;

            self.refresh_event_status(&db_tx, event).await
        })
    }

    /// Removes `user_id` from the event.
    pub async fn leave_event(
        &self,
        group_id: Uuid,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<EventState> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let event = self.require_event_in_group(&db_tx, group_id, event_id).await?;
            if !self.is_event_member(&db_tx, event_id, user_id).await? {
                return Err(EngineError::NotMember(
                    "You are not a member of this event.".to_string(),
                ));
            }

            event_members::Entity::delete_by_id((event_id, user_id.to_string()))
                .exec(&db_tx)
                .await?;

            self.refresh_event_status(&db_tx, event).await
        })
    }

    /// Admin-triggered status recomputation.
    pub async fn update_event_status(
        &self,
        group_id: Uuid,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<EventState> {
        with_tx!(self, |db_tx| {
            self.require_group_admin(&db_tx, group_id, user_id, "update the event status")
                .await?;
            let event = self.require_event_in_group(&db_tx, group_id, event_id).await?;
            self.refresh_event_status(&db_tx, event).await
        })
    }

    /// Deletes an event and its participation rows (admin only).
    pub async fn delete_event(
        &self,
        group_id: Uuid,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<events::Model> {
        with_tx!(self, |db_tx| {
            self.require_group_admin(&db_tx, group_id, user_id, "delete events")
                .await?;
            let event = self.require_event_in_group(&db_tx, group_id, event_id).await?;

            event_members::Entity::delete_many()
                .filter(event_members::Column::EventId.eq(event_id))
                .exec(&db_tx)
                .await?;
            events::Entity::delete_by_id(event_id).exec(&db_tx).await?;

            Ok(event)
        })
    }

    /// Usernames that joined the event, sorted.
    pub async fn event_participants(
        &self,
        group_id: Uuid,
        event_id: Uuid,
    ) -> ResultEngine<Vec<String>> {
        with_tx!(self, |db_tx| {
            self.require_event_in_group(&db_tx, group_id, event_id).await?;
            self.event_member_ids(&db_tx, event_id).await
        })
    }

    pub(super) async fn is_event_member(
        &self,
        db: &DatabaseTransaction,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bool> {
        Ok(
            event_members::Entity::find_by_id((event_id, user_id.to_string()))
                .one(db)
                .await?
                .is_some(),
        )
    }

    pub(super) async fn event_member_ids(
        &self,
        db: &DatabaseTransaction,
        event_id: Uuid,
    ) -> ResultEngine<Vec<String>> {
        let mut ids: Vec<String> = event_members::Entity::find()
            .filter(event_members::Column::EventId.eq(event_id))
            .all(db)
            .await?
            .into_iter()
            .map(|m| m.user_id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Applies [`derive_status`] to one event and stores the result.
    pub(super) async fn refresh_event_status(
        &self,
        db: &DatabaseTransaction,
        event: events::Model,
    ) -> ResultEngine<EventState> {
        let max_spends = self.member_max_spends(db, event.group_id).await?;
        let share = Share::of(event.total_spend(), max_spends.len());
        let status = derive_status(event.total_spend(), &max_spends);

        let event = if event.status == status.as_str() {
            event
        } else {
            let mut active: events::ActiveModel = event.into();
            active.status = ActiveValue::Set(status.as_str().to_string());
            active.update(db).await?
        };

        Ok(EventState {
            event,
            status,
            share,
        })
    }

    /// Re-derives every event of a group after its membership changed.
    pub(super) async fn refresh_group_statuses(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
    ) -> ResultEngine<()> {
        let group_events = events::Entity::find()
            .filter(events::Column::GroupId.eq(group_id))
            .all(db)
            .await?;
        for event in group_events {
            self.refresh_event_status(db, event).await?;
        }
        Ok(())
    }
}
