//! Event endpoints. Every mutation lands back on the group page.

use api_types::{
    event::{EventForm, EventNew, EventView},
    flash::Message,
};
use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use engine::{EventOverview, MoneyCents, NewEvent, parse_event_date, parse_uuid, users};
use uuid::Uuid;

use crate::{
    ServerError,
    flash::{self, FormResponse},
    groups::group_url,
    server::ServerState,
};

pub(crate) fn event_view(overview: EventOverview) -> EventView {
    EventView {
        id: overview.event.id,
        total_spend_minor: overview.event.total_spend,
        name: overview.event.name,
        date: overview.event.date,
        status: overview.status.to_string(),
        share_minor: overview.share.amount().cents(),
        eligible: overview.eligible,
        joined: overview.joined,
        participants: overview.participants,
    }
}

fn ids(group_id: &str, event_id: &str) -> Result<(Uuid, Uuid), ServerError> {
    Ok((parse_uuid(group_id, "group")?, parse_uuid(event_id, "event")?))
}

/// Data for the event creation page (admin only).
pub async fn form(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
) -> Result<Response, ServerError> {
    let group_id = parse_uuid(&group_id, "group")?;
    match state.engine.event_form(group_id, &user.username).await {
        Ok((group, members)) => Ok(Json(EventForm {
            group_id: group.id,
            group_name: group.name,
            members,
        })
        .into_response()),
        Err(err) => Ok(flash::redirect_error(jar, &group_url(group_id), err)?.into_response()),
    }
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
    Form(payload): Form<EventNew>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    let to = group_url(group_id);

    let parsed = parse_event_date(&payload.date).and_then(|date| {
        Ok(NewEvent {
            name: payload.name,
            date,
            total_spend: payload.total_spend.parse::<MoneyCents>()?,
        })
    });
    let new_event = match parsed {
        Ok(new_event) => new_event,
        Err(err) => return flash::redirect_error(jar, &to, err),
    };

    match state
        .engine
        .new_event(group_id, new_event, &user.username)
        .await
    {
        Ok(created) => {
            tracing::info!(
                group = %group_id,
                event = %created.event.id,
                status = %created.status,
                "event created"
            );
            Ok(flash::redirect(
                jar,
                &to,
                Message::success(format!(
                    "Event \"{}\" created successfully!",
                    created.event.name
                )),
            ))
        }
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}

pub async fn join(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, event_id)): Path<(String, String)>,
) -> FormResponse {
    let (group_id, event_id) = ids(&group_id, &event_id)?;
    let to = group_url(group_id);
    match state
        .engine
        .join_event(group_id, event_id, &user.username)
        .await
    {
        Ok(joined) => Ok(flash::redirect(
            jar,
            &to,
            Message::success(format!(
                "You have successfully joined the event '{}'.",
                joined.event.name
            )),
        )),
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}

pub async fn leave(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, event_id)): Path<(String, String)>,
) -> FormResponse {
    let (group_id, event_id) = ids(&group_id, &event_id)?;
    let to = group_url(group_id);
    match state
        .engine
        .leave_event(group_id, event_id, &user.username)
        .await
    {
        Ok(left) => Ok(flash::redirect(
            jar,
            &to,
            Message::success(format!(
                "You have successfully left the event '{}'.",
                left.event.name
            )),
        )),
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}

pub async fn update_status(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, event_id)): Path<(String, String)>,
) -> FormResponse {
    let (group_id, event_id) = ids(&group_id, &event_id)?;
    let to = group_url(group_id);
    match state
        .engine
        .update_event_status(group_id, event_id, &user.username)
        .await
    {
        Ok(updated) if updated.status.is_active() => Ok(flash::redirect(
            jar,
            &to,
            Message::success(format!(
                "The event '{}' is now Active. All members can cover the cost.",
                updated.event.name
            )),
        )),
        Ok(updated) => Ok(flash::redirect(
            jar,
            &to,
            Message::warning(format!(
                "The event '{}' remains Pending. Some members cannot cover the cost.",
                updated.event.name
            )),
        )),
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}

pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, event_id)): Path<(String, String)>,
) -> FormResponse {
    let (group_id, event_id) = ids(&group_id, &event_id)?;
    let to = group_url(group_id);
    match state
        .engine
        .delete_event(group_id, event_id, &user.username)
        .await
    {
        Ok(event) => Ok(flash::redirect(
            jar,
            &to,
            Message::success(format!("The event '{}' has been deleted.", event.name)),
        )),
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}
