use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, JoinRequestOutcome, ResultEngine, Vote, join_request_votes, join_requests,
};

use super::{Engine, with_tx};

impl Engine {
    /// Asks to enter a group. One pending request per user and group.
    pub async fn request_to_join(
        &self,
        group_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<join_requests::Model> {
        with_tx!(self, |db_tx| {
            let group = self.require_group(&db_tx, group_id).await?;
            if self.is_group_member(&db_tx, group_id, user_id).await? {
                return Err(EngineError::ExistingKey(format!(
                    "Your membership of '{}'",
                    group.name
                )));
            }
            let pending = join_requests::Entity::find()
                .filter(join_requests::Column::GroupId.eq(group_id))
                .filter(join_requests::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?;
            if pending.is_some() {
                return Err(EngineError::ExistingKey(format!(
                    "A join request for '{}'",
                    group.name
                )));
            }

            let request = join_requests::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group_id),
                user_id: ActiveValue::Set(user_id.to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(request)
        })
    }

    /// Withdraws a join request. Only the requester may do it.
    pub async fn delete_join_request(
        &self,
        request_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<join_requests::Model> {
        with_tx!(self, |db_tx| {
            let request = join_requests::Entity::find_by_id(request_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("join request not exists".to_string()))?;
            if request.user_id != user_id {
                return Err(EngineError::Forbidden(
                    "You can only delete your own join requests.".to_string(),
                ));
            }

            join_request_votes::Entity::delete_many()
                .filter(join_request_votes::Column::RequestId.eq(request_id))
                .exec(&db_tx)
                .await?;
            join_requests::Entity::delete_by_id(request_id)
                .exec(&db_tx)
                .await?;
            Ok(request)
        })
    }

    /// Records a member's vote on a join request and resolves it.
    ///
    /// A single rejection drops the request. Once every current member voted
    /// to accept, the requester joins the group.
    pub async fn vote_on_join_request(
        &self,
        group_id: Uuid,
        request_id: Uuid,
        vote: Vote,
        user_id: &str,
    ) -> ResultEngine<(join_requests::Model, JoinRequestOutcome)> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let request = join_requests::Entity::find_by_id(request_id)
                .filter(join_requests::Column::GroupId.eq(group_id))
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("join request not exists".to_string()))?;
            self.require_group_member(&db_tx, group_id, user_id).await?;

            let ballot = join_request_votes::ActiveModel {
                request_id: ActiveValue::Set(request_id),
                voter_id: ActiveValue::Set(user_id.to_string()),
                vote: ActiveValue::Set(vote.as_str().to_string()),
            };
            match join_request_votes::Entity::find_by_id((request_id, user_id.to_string()))
                .one(&db_tx)
                .await?
            {
                Some(_) => {
                    ballot.update(&db_tx).await?;
                }
                None => {
                    ballot.insert(&db_tx).await?;
                }
            }

            // No early return below: the transaction commits after the block.
            let outcome = if vote == Vote::Reject {
                join_request_votes::Entity::delete_many()
                    .filter(join_request_votes::Column::RequestId.eq(request_id))
                    .exec(&db_tx)
                    .await?;
                join_requests::Entity::delete_by_id(request_id)
                    .exec(&db_tx)
                    .await?;
                JoinRequestOutcome::Rejected
            } else {
                self.tally_join_request(&db_tx, group_id, &request).await?
            };

            Ok((request, outcome))
        })
    }

    /// Counts accept votes from current members. When every member accepted,
    /// the requester joins the group and the request is removed.
    pub(super) async fn tally_join_request(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        request: &join_requests::Model,
    ) -> ResultEngine<JoinRequestOutcome> {
        let members = self.group_member_ids(db, group_id).await?;
        let accepted_by: Vec<String> = join_request_votes::Entity::find()
            .filter(join_request_votes::Column::RequestId.eq(request.id))
            .filter(join_request_votes::Column::Vote.eq(Vote::Accept.as_str()))
            .all(db)
            .await?
            .into_iter()
            .map(|v| v.voter_id)
            .collect();
        let accepts = members
            .iter()
            .filter(|m| accepted_by.contains(m))
            .count();

        if accepts < members.len() {
            return Ok(JoinRequestOutcome::Pending {
                accepts,
                members: members.len(),
            });
        }
        self.add_group_member(db, group_id, &request.user_id).await?;
        Ok(JoinRequestOutcome::Accepted)
    }
}
