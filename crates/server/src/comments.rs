//! Posting and editing comments on the group page.

use api_types::comment::{CommentEdit, CommentForm, CommentView};
use axum::{
    Extension, Form, Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use engine::{EngineError, comments, parse_uuid, users};

use crate::{
    ServerError,
    flash::{self, FormResponse},
    groups::group_url,
    server::ServerState,
};

pub(crate) fn comment_view(comment: comments::Model) -> CommentView {
    CommentView {
        id: comment.id,
        author: comment.user_id,
        text: comment.text,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

/// New comment posted from the group page. Success is silent.
pub async fn post(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path(group_id): Path<String>,
    Form(payload): Form<CommentForm>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    let to = group_url(group_id);
    match state
        .engine
        .post_comment(group_id, &payload.text, &user.username)
        .await
    {
        Ok(_) => Ok((jar, Redirect::to(&to))),
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}

/// The comment edit page. Somebody else's comment sends the viewer back to
/// the group page without a message.
pub async fn edit_form(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, comment_id)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    let group_id = parse_uuid(&group_id, "group")?;
    let comment_id = parse_uuid(&comment_id, "comment")?;
    match state
        .engine
        .comment_for_edit(group_id, comment_id, &user.username)
        .await
    {
        Ok(comment) => {
            let (jar, messages) = flash::take(jar);
            let view = CommentEdit {
                group_id,
                comment: comment_view(comment),
                messages,
            };
            Ok((jar, Json(view)).into_response())
        }
        Err(EngineError::Forbidden(_)) => Ok(Redirect::to(&group_url(group_id)).into_response()),
        Err(err) => Err(err.into()),
    }
}

pub async fn edit(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    jar: CookieJar,
    Path((group_id, comment_id)): Path<(String, String)>,
    Form(payload): Form<CommentForm>,
) -> FormResponse {
    let group_id = parse_uuid(&group_id, "group")?;
    let comment_id = parse_uuid(&comment_id, "comment")?;
    let to = group_url(group_id);
    match state
        .engine
        .edit_comment(group_id, comment_id, &payload.text, &user.username)
        .await
    {
        Ok(_) | Err(EngineError::Forbidden(_)) => Ok((jar, Redirect::to(&to))),
        Err(err) => flash::redirect_error(jar, &to, err),
    }
}
