//! One-shot messages carried across a redirect.
//!
//! Form handlers answer `303 See Other` and leave their outcome in the
//! `chipin_flash` cookie; the next page view returns the messages and clears
//! the cookie. The value is URL-safe base64 of a JSON list of
//! [`Message`]s.

use api_types::flash::Message;
use axum::response::Redirect;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::ServerError;

pub(crate) const COOKIE_NAME: &str = "chipin_flash";

/// What every form handler returns.
pub(crate) type FormResponse = Result<(CookieJar, Redirect), ServerError>;

fn decode(value: &str) -> Vec<Message> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn pending(jar: &CookieJar) -> Vec<Message> {
    jar.get(COOKIE_NAME)
        .map(|cookie| decode(cookie.value()))
        .unwrap_or_default()
}

/// Appends `message` to the messages waiting in `jar`.
pub(crate) fn push(jar: CookieJar, message: Message) -> CookieJar {
    let mut messages = pending(&jar);
    messages.push(message);
    match serde_json::to_vec(&messages) {
        Ok(bytes) => jar.add(
            Cookie::build((COOKIE_NAME, URL_SAFE_NO_PAD.encode(bytes)))
                .path("/")
                .http_only(true),
        ),
        Err(err) => {
            tracing::error!("failed to encode flash messages: {err}");
            jar
        }
    }
}

/// Returns the waiting messages and clears the cookie.
pub(crate) fn take(jar: CookieJar) -> (CookieJar, Vec<Message>) {
    if jar.get(COOKIE_NAME).is_none() {
        return (jar, Vec::new());
    }
    let messages = pending(&jar);
    (jar.remove(Cookie::build(COOKIE_NAME).path("/")), messages)
}

pub(crate) fn redirect(jar: CookieJar, to: &str, message: Message) -> (CookieJar, Redirect) {
    (push(jar, message), Redirect::to(to))
}

/// Redirects to `to` with the flash describing `err`, unless the error cannot
/// be shown there (see [`ServerError::into_flash`]).
pub(crate) fn redirect_error(jar: CookieJar, to: &str, err: impl Into<ServerError>) -> FormResponse {
    let message = err.into().into_flash()?;
    Ok(redirect(jar, to, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_accumulate_until_taken() {
        let jar = push(CookieJar::new(), Message::success("Group created."));
        let jar = push(jar, Message::warning("Still pending."));

        let (jar, messages) = take(jar);
        assert_eq!(
            messages,
            vec![
                Message::success("Group created."),
                Message::warning("Still pending.")
            ]
        );
        assert!(
            jar.get(COOKIE_NAME)
                .is_none_or(|cookie| cookie.value().is_empty())
        );
    }

    #[test]
    fn garbage_cookie_yields_no_messages() {
        let jar = CookieJar::new().add(Cookie::new(COOKIE_NAME, "%%not-base64%%"));
        let (_, messages) = take(jar);
        assert!(messages.is_empty());
    }
}
