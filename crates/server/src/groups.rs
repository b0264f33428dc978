//! Group pages: detail view, membership, invitations and join requests.

use api_types::{
    flash::Message,
    group::{GroupDetail, GroupNew, GroupSummary, InviteForm, JoinRequestView, MemberView},
};
use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use engine::{JoinRequestOutcome, JoinRequestOverview, Vote, groups, parse_uuid, users};
use uuid::Uuid;

use crate::{
    ServerError, comments,
    events::event_view,
    flash::{self, FormResponse},
    server::ServerState,
};

pub(crate) fn group_url(group_id: Uuid) -> String {
    format!("/groups/{group_id}/")
}

pub(crate) fn summary(group: &groups::Model) -> GroupSummary {
    GroupSummary {
        id: group.id,
        name: group.name.clone(),
        admin: group.admin_id.clone(),
    }
}

fn join_request_view(overview: JoinRequestOverview) -> JoinRequestView {
    JoinRequestView {
        id: overview.request.id,
        username: overview.request.user_id,
        created_at: overview.request.created_at,
        accepts: overview.accepts,
    }
}

/// Splits the invite box on commas and whitespace.
fn parse_usernames(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Form(payload): Form<GroupNew>,
) -> FormResponse {
    match state.engine.new_group(&payload.name, &user.username).await {
        Ok(group) => {
            tracing::info!(group = %group.id, admin = %user.username, "group created");
            Ok(flash::redirect(
                jar,
                &group_url(group.id),
                Message::success(format!("Group '{}' created successfully!", group.name)),
            ))
        }
        Err(err) => flash::redirect_error(jar, "/", err),
    }
}

/// The group page. Returns the pending flash messages and clears them.
pub async fn detail(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
) -> Result<(CookieJar, Json<GroupDetail>), ServerError> {
    let group_id = parse_uuid(&group_id, "group")?;
    let detail = state.engine.group_detail(group_id, &user.username).await?;
    let (jar, messages) = flash::take(jar);

    let view = GroupDetail {
        is_admin: detail.group.is_admin(&user.username),
        group: summary(&detail.group),
        members: detail
            .members
            .into_iter()
            .map(|member| MemberView {
                username: member.username,
                nickname: member.nickname,
                max_spend_minor: member.max_spend.cents(),
                is_admin: member.is_admin,
            })
            .collect(),
        comments: detail.comments.into_iter().map(comments::comment_view).collect(),
        events: detail.events.into_iter().map(event_view).collect(),
        join_requests: detail
            .join_requests
            .into_iter()
            .map(join_request_view)
            .collect(),
        messages,
    };
    Ok((jar, Json(view)))
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    match state.engine.delete_group(group_id, &user.username).await {
        Ok(group) => Ok(flash::redirect(
            jar,
            "/",
            Message::success(format!("The group '{}' has been deleted.", group.name)),
        )),
        Err(err) => flash::redirect_error(jar, &group_url(group_id), err),
    }
}

pub async fn leave(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    match state.engine.leave_group(group_id, &user.username).await {
        Ok(group) => Ok(flash::redirect(
            jar,
            "/",
            Message::success(format!("You have left the group '{}'.", group.name)),
        )),
        Err(err) => flash::redirect_error(jar, &group_url(group_id), err),
    }
}

/// Invites every listed username. Sending the invitation email is left to
/// whoever reads the log.
pub async fn invite(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
    Form(payload): Form<InviteForm>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    let to = group_url(group_id);
    let usernames = parse_usernames(&payload.usernames);
    if usernames.is_empty() {
        return Ok(flash::redirect(
            jar,
            &to,
            Message::warning("Enter at least one username to invite."),
        ));
    }

    let report = match state
        .engine
        .invite_users(group_id, &usernames, &user.username)
        .await
    {
        Ok(report) => report,
        Err(err) => return flash::redirect_error(jar, &to, err),
    };

    let mut jar = jar;
    if !report.invited.is_empty() {
        tracing::info!(group = %group_id, invited = ?report.invited, "invitations created");
        jar = flash::push(
            jar,
            Message::success(format!("Invitation sent to {}.", report.invited.join(", "))),
        );
    }
    if !report.skipped.is_empty() {
        jar = flash::push(
            jar,
            Message::info(format!(
                "Already a member or invited: {}.",
                report.skipped.join(", ")
            )),
        );
    }
    if !report.unknown.is_empty() {
        jar = flash::push(
            jar,
            Message::warning(format!("Unknown users: {}.", report.unknown.join(", "))),
        );
    }
    Ok((jar, Redirect::to(&to)))
}

pub async fn accept_invitation(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    match state.engine.accept_invitation(group_id, &user.username).await {
        Ok(group) => Ok(flash::redirect(
            jar,
            &group_url(group.id),
            Message::success(format!("You have joined the group '{}'.", group.name)),
        )),
        Err(err) => flash::redirect_error(jar, "/", err),
    }
}

pub async fn request_to_join(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    match state.engine.request_to_join(group_id, &user.username).await {
        Ok(_) => Ok(flash::redirect(
            jar,
            "/",
            Message::success("Your request to join the group has been sent."),
        )),
        Err(err) => flash::redirect_error(jar, "/", err),
    }
}

pub async fn delete_join_request(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(request_id): Path<String>,
) -> FormResponse {
    let request_id = parse_uuid(&request_id, "join request")?;
    match state
        .engine
        .delete_join_request(request_id, &user.username)
        .await
    {
        Ok(_) => Ok(flash::redirect(
            jar,
            "/",
            Message::success("Your join request has been withdrawn."),
        )),
        Err(err) => flash::redirect_error(jar, "/", err),
    }
}

pub async fn vote(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, request_id, vote)): Path<(String, String, Vote)>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    let request_id = parse_uuid(&request_id, "join request")?;
    let to = group_url(group_id);

    let (request, outcome) = match state
        .engine
        .vote_on_join_request(group_id, request_id, vote, &user.username)
        .await
    {
        Ok(resolved) => resolved,
        Err(err) => return flash::redirect_error(jar, &to, err),
    };

    let message = match outcome {
        JoinRequestOutcome::Accepted => Message::success(format!(
            "{} has been added to the group.",
            request.user_id
        )),
        JoinRequestOutcome::Rejected => Message::info(format!(
            "The join request from {} has been rejected.",
            request.user_id
        )),
        JoinRequestOutcome::Pending { accepts, members } => Message::info(format!(
            "Your vote has been recorded ({accepts} of {members} members accepted)."
        )),
    };
    Ok(flash::redirect(jar, &to, message))
}
