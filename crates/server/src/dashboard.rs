//! Home page: the user's groups and pending business.

use api_types::group::{Dashboard, InvitationView, OwnJoinRequest};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use engine::users;

use crate::{ServerError, flash, groups::summary, server::ServerState};

pub async fn home(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Dashboard>), ServerError> {
    let dashboard = state.engine.dashboard(&user.username).await?;
    let (jar, messages) = flash::take(jar);

    Ok((
        jar,
        Json(Dashboard {
            username: user.username,
            groups: dashboard.groups.iter().map(summary).collect(),
            invitations: dashboard
                .pending_invitations
                .into_iter()
                .map(|(invitation, group)| InvitationView {
                    group: summary(&group),
                    invited_by: invitation.invited_by,
                    created_at: invitation.created_at,
                })
                .collect(),
            join_requests: dashboard
                .join_requests
                .into_iter()
                .map(|(request, group)| OwnJoinRequest {
                    id: request.id,
                    group: summary(&group),
                    created_at: request.created_at,
                })
                .collect(),
            available_groups: dashboard.available_groups.iter().map(summary).collect(),
            messages,
        }),
    ))
}
