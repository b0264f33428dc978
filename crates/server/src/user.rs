//! The signed-in user's profile.

use api_types::profile::{ProfileUpdate, ProfileView};
use axum::{Extension, Json, extract::State};
use engine::{MoneyCents, profiles, users};

use crate::{ServerError, server::ServerState};

fn profile_view(profile: profiles::Model) -> ProfileView {
    ProfileView {
        max_spend_minor: profile.max_spend,
        balance_minor: profile.balance,
        username: profile.user_id,
        first_name: profile.first_name,
        surname: profile.surname,
        nickname: profile.nickname,
    }
}

pub async fn profile(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state.engine.profile(&user.username).await?;
    Ok(Json(profile_view(profile)))
}

/// Partial update. A nickname clash answers `409 Conflict`.
pub async fn update_profile(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, ServerError> {
    let max_spend = payload
        .max_spend
        .as_deref()
        .map(str::parse::<MoneyCents>)
        .transpose()?;

    let profile = state
        .engine
        .update_profile(
            &user.username,
            engine::ProfileUpdate {
                first_name: payload.first_name,
                surname: payload.surname,
                nickname: payload.nickname,
                max_spend,
            },
        )
        .await?;
    tracing::debug!(user = %user.username, "profile updated");

    Ok(Json(profile_view(profile)))
}
