//! Command structs for engine operations.
//!
//! These types group parameters for write operations (user provisioning,
//! profile and event changes), keeping call sites readable and avoiding long
//! argument lists.

use chrono::NaiveDate;

use crate::MoneyCents;

/// Provision a user together with its profile.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub surname: String,
    /// Defaults to the username.
    pub nickname: Option<String>,
    /// Defaults to `profiles::DEFAULT_LIMIT`.
    pub max_spend: Option<MoneyCents>,
    /// Defaults to `profiles::DEFAULT_LIMIT`.
    pub balance: Option<MoneyCents>,
}

impl NewUser {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            first_name: String::new(),
            surname: String::new(),
            nickname: None,
            max_spend: None,
            balance: None,
        }
    }

    #[must_use]
    pub fn names(mut self, first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.surname = surname.into();
        self
    }

    #[must_use]
    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    #[must_use]
    pub fn max_spend(mut self, max_spend: MoneyCents) -> Self {
        self.max_spend = Some(max_spend);
        self
    }
}

/// Partial profile update; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub nickname: Option<String>,
    pub max_spend: Option<MoneyCents>,
}

/// Create an event inside a group.
#[derive(Clone, Debug)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
    pub total_spend: MoneyCents,
}
