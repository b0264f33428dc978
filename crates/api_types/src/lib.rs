use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod flash {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Level {
        Success,
        Info,
        Warning,
        Error,
    }

    /// One-shot message shown on the next page view.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Message {
        pub level: Level,
        pub message: String,
    }

    impl Message {
        pub fn new(level: Level, message: impl Into<String>) -> Self {
            Self {
                level,
                message: message.into(),
            }
        }

        pub fn success(message: impl Into<String>) -> Self {
            Self::new(Level::Success, message)
        }

        pub fn info(message: impl Into<String>) -> Self {
            Self::new(Level::Info, message)
        }

        pub fn warning(message: impl Into<String>) -> Self {
            Self::new(Level::Warning, message)
        }

        pub fn error(message: impl Into<String>) -> Self {
            Self::new(Level::Error, message)
        }
    }
}

pub mod profile {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub username: String,
        pub first_name: String,
        pub surname: String,
        pub nickname: String,
        pub max_spend_minor: i64,
        pub balance_minor: i64,
    }

    /// Partial update; absent fields keep their value.
    ///
    /// `max_spend` is a decimal string such as `"150.00"`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProfileUpdate {
        pub first_name: Option<String>,
        pub surname: Option<String>,
        pub nickname: Option<String>,
        pub max_spend: Option<String>,
    }
}

pub mod group {
    use super::*;
    use crate::{event::EventView, flash};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupNew {
        pub name: String,
    }

    /// Comma or whitespace separated usernames.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct InviteForm {
        pub usernames: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupSummary {
        pub id: Uuid,
        pub name: String,
        pub admin: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub username: String,
        pub nickname: String,
        pub max_spend_minor: i64,
        pub is_admin: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JoinRequestView {
        pub id: Uuid,
        pub username: String,
        pub created_at: DateTime<Utc>,
        pub accepts: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupDetail {
        pub group: GroupSummary,
        pub is_admin: bool,
        pub members: Vec<MemberView>,
        /// Newest first.
        pub comments: Vec<crate::comment::CommentView>,
        pub events: Vec<EventView>,
        pub join_requests: Vec<JoinRequestView>,
        pub messages: Vec<flash::Message>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InvitationView {
        pub group: GroupSummary,
        pub invited_by: String,
        pub created_at: DateTime<Utc>,
    }

    /// A join request as seen by the user who sent it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct OwnJoinRequest {
        pub id: Uuid,
        pub group: GroupSummary,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Dashboard {
        pub username: String,
        pub groups: Vec<GroupSummary>,
        pub invitations: Vec<InvitationView>,
        pub join_requests: Vec<OwnJoinRequest>,
        pub available_groups: Vec<GroupSummary>,
        pub messages: Vec<flash::Message>,
    }
}

pub mod event {
    use super::*;

    /// Event creation form. Values arrive as typed by the user.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventNew {
        pub name: String,
        /// `YYYY-MM-DD`.
        pub date: String,
        /// Decimal string, e.g. `"100.00"`.
        pub total_spend: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventView {
        pub id: Uuid,
        pub name: String,
        pub date: NaiveDate,
        pub total_spend_minor: i64,
        /// `Pending` or `Active`.
        pub status: String,
        /// Current share of each group member, rounded to the cent.
        pub share_minor: i64,
        /// The viewer's `max_spend` covers the share.
        pub eligible: bool,
        pub joined: bool,
        pub participants: Vec<String>,
    }

    /// What the event creation page needs.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct EventForm {
        pub group_id: Uuid,
        pub group_name: String,
        pub members: usize,
    }
}

pub mod comment {
    use super::*;
    use crate::flash;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommentForm {
        pub text: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommentView {
        pub id: Uuid,
        pub author: String,
        pub text: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Comment edit page: the comment to pre-fill plus the group it lives in.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CommentEdit {
        pub group_id: Uuid,
        pub comment: CommentView,
        pub messages: Vec<flash::Message>,
    }
}
