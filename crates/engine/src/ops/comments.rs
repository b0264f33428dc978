use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, comments};

use super::{Engine, with_tx};

fn comment_text(text: &str) -> ResultEngine<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(
            "comment must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    /// Posts a comment on the group page.
    pub async fn post_comment(
        &self,
        group_id: Uuid,
        text: &str,
        user_id: &str,
    ) -> ResultEngine<comments::Model> {
        with_tx!(self, |db_tx| {
            self.require_group(&db_tx, group_id).await?;
            let text = comment_text(text)?;
            let now = Utc::now();

            let comment = comments::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                group_id: ActiveValue::Set(group_id),
                user_id: ActiveValue::Set(user_id.to_string()),
                text: ActiveValue::Set(text),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(comment)
        })
    }

    /// Returns a comment its author wants to edit.
    pub async fn comment_for_edit(
        &self,
        group_id: Uuid,
        comment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<comments::Model> {
        with_tx!(self, |db_tx| {
            self.require_own_comment(&db_tx, group_id, comment_id, user_id)
                .await
        })
    }

    /// Replaces the text of a comment. Only its author may do it.
    pub async fn edit_comment(
        &self,
        group_id: Uuid,
        comment_id: Uuid,
        text: &str,
        user_id: &str,
    ) -> ResultEngine<comments::Model> {
        with_tx!(self, |db_tx| {
            let comment = self
                .require_own_comment(&db_tx, group_id, comment_id, user_id)
                .await?;
            let text = comment_text(text)?;

            let mut active: comments::ActiveModel = comment.into();
            active.text = ActiveValue::Set(text);
            active.updated_at = ActiveValue::Set(Utc::now());
            Ok(active.update(&db_tx).await?)
        })
    }

    async fn require_own_comment(
        &self,
        db: &DatabaseTransaction,
        group_id: Uuid,
        comment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<comments::Model> {
        self.require_group(db, group_id).await?;
        let comment = comments::Entity::find_by_id(comment_id)
            .filter(comments::Column::GroupId.eq(group_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("comment not exists".to_string()))?;
        if comment.user_id != user_id {
            return Err(EngineError::Forbidden(
                "Only the author can edit this comment.".to_string(),
            ));
        }
        Ok(comment)
    }
}
