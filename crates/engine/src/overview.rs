//! Read models returned by the group and dashboard views.

use crate::{
    EventStatus, MoneyCents, Share, comments, events, groups, invitations, join_requests,
};

/// A group member as shown on the group page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupMember {
    pub username: String,
    pub nickname: String,
    pub max_spend: MoneyCents,
    pub is_admin: bool,
}

/// An event together with the current share and the viewer's position.
#[derive(Clone, Debug)]
pub struct EventOverview {
    pub event: events::Model,
    pub status: EventStatus,
    pub share: Share,
    /// The viewer's `max_spend` covers the share.
    pub eligible: bool,
    /// The viewer already joined.
    pub joined: bool,
    pub participants: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct JoinRequestOverview {
    pub request: join_requests::Model,
    /// Accept votes so far. Any reject removes the request.
    pub accepts: usize,
}

#[derive(Clone, Debug)]
pub struct GroupDetail {
    pub group: groups::Model,
    pub members: Vec<GroupMember>,
    /// Newest first.
    pub comments: Vec<comments::Model>,
    pub events: Vec<EventOverview>,
    pub join_requests: Vec<JoinRequestOverview>,
}

#[derive(Clone, Debug, Default)]
pub struct Dashboard {
    pub groups: Vec<groups::Model>,
    pub pending_invitations: Vec<(invitations::Model, groups::Model)>,
    pub join_requests: Vec<(join_requests::Model, groups::Model)>,
    /// Groups the user neither belongs to nor asked to join.
    pub available_groups: Vec<groups::Model>,
}

/// Event after a mutation, with the freshly derived status.
#[derive(Clone, Debug)]
pub struct EventState {
    pub event: events::Model,
    pub status: EventStatus,
    pub share: Share,
}

/// Result of inviting a batch of users.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InviteReport {
    pub invited: Vec<String>,
    /// Already members or already invited.
    pub skipped: Vec<String>,
    pub unknown: Vec<String>,
}

/// Where a join request stands after a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinRequestOutcome {
    Pending { accepts: usize, members: usize },
    Accepted,
    Rejected,
}
