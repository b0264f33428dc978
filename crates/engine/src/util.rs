//! Internal helpers for input validation and normalization.

use chrono::NaiveDate;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Trim a required name, rejecting blank input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key for nicknames: diacritics stripped, lowercase, single spaces.
///
/// "Zoë", "zoe" and " ZOE " share the key `zoe`.
pub(crate) fn normalize_key(value: &str) -> ResultEngine<String> {
    let mut out = String::new();
    let mut pending_space = false;
    for ch in value.trim().nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.extend(ch.to_lowercase());
    }
    if out.is_empty() {
        return Err(EngineError::InvalidName(
            "nickname must not be empty".to_string(),
        ));
    }
    Ok(out)
}

/// Parse an id received from the outside world.
pub fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse an event date in `YYYY-MM-DD` form.
pub fn parse_event_date(value: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::InvalidDate(format!("expected YYYY-MM-DD, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_key_ignores_case_and_accents() {
        assert_eq!(normalize_key("Zoë").unwrap(), "zoe");
        assert_eq!(normalize_key("  ZOE ").unwrap(), "zoe");
        assert_eq!(normalize_key("Big   Spender").unwrap(), "big spender");
    }

    #[test]
    fn blank_nickname_is_rejected() {
        assert!(normalize_key("   ").is_err());
        assert!(normalize_required_name("\t", "group name").is_err());
    }

    #[test]
    fn event_dates_are_iso() {
        assert_eq!(
            parse_event_date("2026-12-24").unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 24).unwrap()
        );
        assert!(parse_event_date("24/12/2026").is_err());
    }
}
