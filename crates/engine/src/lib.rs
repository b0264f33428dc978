//! Business core of the group expense sharing service.
//!
//! The [`Engine`] owns every rule: who may manage a group, how an event cost is
//! split ([`Share`]) and when an event becomes [`EventStatus::Active`]. Each
//! operation runs in its own database transaction.

pub use commands::{NewEvent, NewUser, ProfileUpdate};
pub use error::EngineError;
pub use join_request_votes::Vote;
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use overview::{
    Dashboard, EventOverview, EventState, GroupDetail, GroupMember, InviteReport,
    JoinRequestOutcome, JoinRequestOverview,
};
pub use share::{EventStatus, Share, derive_status};
pub use util::{parse_event_date, parse_uuid};

pub mod comments;
pub mod event_members;
pub mod events;
pub mod group_members;
pub mod groups;
pub mod invitations;
pub mod join_request_votes;
pub mod join_requests;
pub mod profiles;
pub mod users;

mod commands;
mod error;
mod money;
mod ops;
mod overview;
mod share;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
