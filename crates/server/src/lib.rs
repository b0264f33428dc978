use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use api_types::flash::Message;
use serde::Serialize;
pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod comments;
mod dashboard;
mod events;
mod flash;
mod groups;
mod server;
mod user;

pub mod types {
    pub mod flash {
        pub use api_types::flash::{Level, Message};
    }

    pub mod group {
        pub use api_types::group::{
            Dashboard, GroupDetail, GroupNew, GroupSummary, InvitationView, InviteForm,
            JoinRequestView, MemberView, OwnJoinRequest,
        };
    }

    pub mod event {
        pub use api_types::event::{EventForm, EventNew, EventView};
    }

    pub mod comment {
        pub use api_types::comment::{CommentEdit, CommentForm, CommentView};
    }

    pub mod profile {
        pub use api_types::profile::{ProfileUpdate, ProfileView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
    code: &'static str,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) | EngineError::InvalidId(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::AlreadyJoined(_)
        | EngineError::NotMember(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::MaxSpendTooLow { .. }
        | EngineError::InvalidName(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidDate(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl ServerError {
    /// Turns a failed form submission into the message shown after the
    /// redirect.
    ///
    /// Missing resources and database failures cannot be reported on the
    /// target page: they stay errors and become a JSON response.
    fn into_flash(self) -> Result<Message, ServerError> {
        let err = match self {
            ServerError::Engine(err) => err,
            ServerError::Generic(message) => return Ok(Message::error(message)),
        };
        match err {
            EngineError::Forbidden(message) | EngineError::NotMember(message) => {
                Ok(Message::error(message))
            }
            EngineError::AlreadyJoined(_) => {
                Ok(Message::info("You have already joined this event."))
            }
            EngineError::MaxSpendTooLow { max_spend, .. } => Ok(Message::error(format!(
                "Your max spend of {max_spend} is too low to join this event."
            ))),
            EngineError::ExistingKey(what) => Ok(Message::info(format!("{what} already exists."))),
            err @ (EngineError::InvalidName(_)
            | EngineError::InvalidAmount(_)
            | EngineError::InvalidDate(_)) => Ok(Message::error(err.to_string())),
            err @ (EngineError::KeyNotFound(_)
            | EngineError::InvalidId(_)
            | EngineError::Database(_)) => Err(ServerError::Engine(err)),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, code) = match self {
            ServerError::Engine(err) => {
                let code = err.code();
                (status_for_engine_error(&err), message_for_engine_error(err), code)
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err, "bad_request"),
        };

        (status, Json(Error { error, code })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::flash::Level;
    use engine::MoneyCents;

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("forbidden".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = ServerError::from(EngineError::InvalidId("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn max_spend_too_low_flashes_the_limit() {
        let flash = ServerError::from(EngineError::MaxSpendTooLow {
            max_spend: MoneyCents::new(20_00),
            share: MoneyCents::new(50_00),
        })
        .into_flash()
        .ok()
        .unwrap();
        assert_eq!(flash.level, Level::Error);
        assert_eq!(
            flash.message,
            "Your max spend of $20.00 is too low to join this event."
        );
    }

    #[test]
    fn conflicts_flash_as_info() {
        let flash = ServerError::from(EngineError::AlreadyJoined("Dinner".to_string()))
            .into_flash()
            .ok()
            .unwrap();
        assert_eq!(flash, Message::info("You have already joined this event."));

        let flash = ServerError::from(EngineError::ExistingKey("Nickname 'zoe'".to_string()))
            .into_flash()
            .ok()
            .unwrap();
        assert_eq!(flash, Message::info("Nickname 'zoe' already exists."));
    }

    #[test]
    fn missing_resources_do_not_flash() {
        assert!(
            ServerError::from(EngineError::KeyNotFound("group not exists".to_string()))
                .into_flash()
                .is_err()
        );
    }
}
