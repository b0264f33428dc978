use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewUser, ProfileUpdate, ResultEngine, group_members, profiles, users,
    util::{normalize_key, normalize_optional_text, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a user and its profile in one transaction.
    ///
    /// This is the only place accounts are provisioned: there is no profile
    /// without a user and no user without a profile.
    pub async fn create_user_with_profile(
        &self,
        new_user: NewUser,
    ) -> ResultEngine<profiles::Model> {
        let username = normalize_required_name(&new_user.username, "username")?;
        if new_user.password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }
        let nickname = normalize_required_name(
            new_user.nickname.as_deref().unwrap_or(&username),
            "nickname",
        )?;
        let max_spend = new_user
            .max_spend
            .unwrap_or(profiles::DEFAULT_LIMIT)
            .non_negative("max spend")?;
        let balance = new_user.balance.unwrap_or(profiles::DEFAULT_LIMIT);

        with_tx!(self, |db_tx| {
            if self.user_exists(&db_tx, &username).await? {
                return Err(EngineError::ExistingKey(format!("User '{username}'")));
            }
            let nickname_norm = self
                .ensure_nickname_available(&db_tx, &nickname, None)
                .await?;

            users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(new_user.password.clone()),
            }
            .insert(&db_tx)
            .await?;

            let profile = profiles::ActiveModel {
                user_id: ActiveValue::Set(username.clone()),
                first_name: ActiveValue::Set(normalize_optional_text(&new_user.first_name)),
                surname: ActiveValue::Set(normalize_optional_text(&new_user.surname)),
                nickname: ActiveValue::Set(nickname.clone()),
                nickname_norm: ActiveValue::Set(nickname_norm),
                max_spend: ActiveValue::Set(max_spend.cents()),
                balance: ActiveValue::Set(balance.cents()),
            }
            .insert(&db_tx)
            .await?;

            Ok(profile)
        })
    }

    /// Return the profile of `username`.
    pub async fn profile(&self, username: &str) -> ResultEngine<profiles::Model> {
        with_tx!(self, |db_tx| self.require_profile(&db_tx, username).await)
    }

    /// Applies a partial profile update.
    ///
    /// A new `max_spend` changes who can afford which event, so the status of
    /// every event in the user's groups is derived again.
    pub async fn update_profile(
        &self,
        username: &str,
        update: ProfileUpdate,
    ) -> ResultEngine<profiles::Model> {
        let nickname = update
            .nickname
            .as_deref()
            .map(|n| normalize_required_name(n, "nickname"))
            .transpose()?;
        let max_spend = update
            .max_spend
            .map(|m| m.non_negative("max spend"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let current = self.require_profile(&db_tx, username).await?;
            let mut active: profiles::ActiveModel = current.clone().into();

            if let Some(first_name) = update.first_name.as_deref() {
                active.first_name = ActiveValue::Set(normalize_optional_text(first_name));
            }
            if let Some(surname) = update.surname.as_deref() {
                active.surname = ActiveValue::Set(normalize_optional_text(surname));
            }
            if let Some(nickname) = nickname.as_ref() {
                let nickname_norm = self
                    .ensure_nickname_available(&db_tx, nickname, Some(username))
                    .await?;
                active.nickname = ActiveValue::Set(nickname.clone());
                active.nickname_norm = ActiveValue::Set(nickname_norm);
            }
            if let Some(max_spend) = max_spend {
                active.max_spend = ActiveValue::Set(max_spend.cents());
            }

            let profile = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                current.clone()
            };

            if profile.max_spend != current.max_spend {
                let group_ids: Vec<_> = group_members::Entity::find()
                    .filter(group_members::Column::UserId.eq(username.to_string()))
                    .all(&db_tx)
                    .await?
                    .into_iter()
                    .map(|m| m.group_id)
                    .collect();
                for group_id in group_ids {
                    self.refresh_group_statuses(&db_tx, group_id).await?;
                }
            }

            Ok(profile)
        })
    }

    /// Validates nickname uniqueness against every other profile and returns
    /// the normalized key to store.
    async fn ensure_nickname_available(
        &self,
        db: &DatabaseTransaction,
        nickname: &str,
        owner: Option<&str>,
    ) -> ResultEngine<String> {
        let key = normalize_key(nickname)?;
        let mut query =
            profiles::Entity::find().filter(profiles::Column::NicknameNorm.eq(key.clone()));
        if let Some(owner) = owner {
            query = query.filter(profiles::Column::UserId.ne(owner.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(format!("Nickname '{nickname}'")));
        }
        Ok(key)
    }
}
