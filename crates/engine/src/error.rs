//! The module contains the errors the engine can return.
//!
//! Each variant is a reason code the outer layers translate for the user:
//!
//! - [`Forbidden`] the caller lacks the role the operation requires.
//! - [`AlreadyJoined`], [`NotMember`] and [`ExistingKey`] the operation
//!   conflicts with the current state.
//! - [`MaxSpendTooLow`] the caller cannot afford an event share.
//!
//!  [`Forbidden`]: EngineError::Forbidden
//!  [`AlreadyJoined`]: EngineError::AlreadyJoined
//!  [`NotMember`]: EngineError::NotMember
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`MaxSpendTooLow`]: EngineError::MaxSpendTooLow
use sea_orm::DbErr;
use thiserror::Error;

use crate::MoneyCents;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("{0} already exists")]
    ExistingKey(String),
    #[error("Already joined: {0}")]
    AlreadyJoined(String),
    #[error("Not a member: {0}")]
    NotMember(String),
    #[error("Max spend of {max_spend} is below the share of {share}")]
    MaxSpendTooLow {
        max_spend: MoneyCents,
        share: MoneyCents,
    },
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// Stable, machine readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "forbidden",
            Self::KeyNotFound(_) => "not_found",
            Self::ExistingKey(_) => "already_exists",
            Self::AlreadyJoined(_) => "already_joined",
            Self::NotMember(_) => "not_member",
            Self::MaxSpendTooLow { .. } => "max_spend_too_low",
            Self::InvalidName(_) => "invalid_name",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidId(_) => "invalid_id",
            Self::Database(_) => "internal",
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::AlreadyJoined(a), Self::AlreadyJoined(b)) => a == b,
            (Self::NotMember(a), Self::NotMember(b)) => a == b,
            (
                Self::MaxSpendTooLow {
                    max_spend: a,
                    share: b,
                },
                Self::MaxSpendTooLow {
                    max_spend: c,
                    share: d,
                },
            ) => a == c && b == d,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
