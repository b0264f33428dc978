mod common;

use common::{add_member, engine_with_db, event, user};
use engine::{EngineError, JoinRequestOutcome, Vote};

#[tokio::test]
async fn new_group_makes_the_creator_admin_and_member() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;

    let group = engine.new_group("  Flatmates ", "alice").await.unwrap();
    assert_eq!(group.name, "Flatmates");
    assert!(group.is_admin("alice"));

    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    assert_eq!(detail.members.len(), 1);
    assert!(detail.members[0].is_admin);

    let dashboard = engine.dashboard("alice").await.unwrap();
    assert_eq!(dashboard.groups.len(), 1);
    assert!(dashboard.available_groups.is_empty());

    let err = engine.new_group("   ", "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn invitations_report_each_username() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    user(&engine, "carol", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();

    let usernames = ["bob", "alice", "ghost", "bob", ""].map(String::from);
    let report = engine
        .invite_users(group.id, &usernames, "alice")
        .await
        .unwrap();
    assert_eq!(report.invited, vec!["bob".to_string()]);
    assert_eq!(report.skipped, vec!["alice".to_string()]);
    assert_eq!(report.unknown, vec!["ghost".to_string()]);

    let err = engine
        .invite_users(group.id, &["carol".to_string()], "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let dashboard = engine.dashboard("bob").await.unwrap();
    assert_eq!(dashboard.pending_invitations.len(), 1);
    assert_eq!(dashboard.pending_invitations[0].1.name, "Flatmates");

    engine.accept_invitation(group.id, "bob").await.unwrap();
    let dashboard = engine.dashboard("bob").await.unwrap();
    assert!(dashboard.pending_invitations.is_empty());
    assert_eq!(dashboard.groups.len(), 1);

    let err = engine.accept_invitation(group.id, "carol").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn unanimous_accepts_admit_the_requester() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    user(&engine, "dave", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();
    add_member(&engine, group.id, "alice", "bob").await;

    let request = engine.request_to_join(group.id, "dave").await.unwrap();
    let err = engine.request_to_join(group.id, "dave").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
    assert!(
        engine
            .dashboard("dave")
            .await
            .unwrap()
            .available_groups
            .is_empty()
    );

    let err = engine
        .vote_on_join_request(group.id, request.id, Vote::Accept, "dave")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotMember(_)));

    let (_, outcome) = engine
        .vote_on_join_request(group.id, request.id, Vote::Accept, "alice")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        JoinRequestOutcome::Pending {
            accepts: 1,
            members: 2
        }
    );
    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    assert_eq!(detail.join_requests.len(), 1);
    assert_eq!(detail.join_requests[0].accepts, 1);

    let (_, outcome) = engine
        .vote_on_join_request(group.id, request.id, Vote::Accept, "bob")
        .await
        .unwrap();
    assert_eq!(outcome, JoinRequestOutcome::Accepted);

    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    assert!(detail.join_requests.is_empty());
    assert!(detail.members.iter().any(|m| m.username == "dave"));
}

#[tokio::test]
async fn leaving_members_stop_blocking_accepted_requests() {
    let (engine, _db) = engine_with_db().await;
    for name in ["alice", "bob", "carol", "dave"] {
        user(&engine, name, 100_00).await;
    }
    let group = engine.new_group("Flatmates", "alice").await.unwrap();
    add_member(&engine, group.id, "alice", "bob").await;
    add_member(&engine, group.id, "alice", "carol").await;

    let request = engine.request_to_join(group.id, "dave").await.unwrap();
    let (_, outcome) = engine
        .vote_on_join_request(group.id, request.id, Vote::Accept, "alice")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        JoinRequestOutcome::Pending {
            accepts: 1,
            members: 3
        }
    );

    // bob has not voted yet, so the request survives carol leaving.
    engine.leave_group(group.id, "carol").await.unwrap();
    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    assert_eq!(detail.join_requests.len(), 1);
    assert_eq!(detail.join_requests[0].accepts, 1);

    engine.leave_group(group.id, "bob").await.unwrap();
    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    assert!(detail.join_requests.is_empty());
    let members: Vec<_> = detail.members.iter().map(|m| m.username.as_str()).collect();
    assert_eq!(members.len(), 2);
    assert!(members.contains(&"dave"));
    assert_eq!(engine.dashboard("dave").await.unwrap().groups.len(), 1);
}

#[tokio::test]
async fn a_single_reject_drops_the_request() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    user(&engine, "dave", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();
    add_member(&engine, group.id, "alice", "bob").await;

    let request = engine.request_to_join(group.id, "dave").await.unwrap();
    engine
        .vote_on_join_request(group.id, request.id, Vote::Accept, "alice")
        .await
        .unwrap();
    let (_, outcome) = engine
        .vote_on_join_request(group.id, request.id, Vote::Reject, "bob")
        .await
        .unwrap();
    assert_eq!(outcome, JoinRequestOutcome::Rejected);

    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    assert!(detail.join_requests.is_empty());
    assert!(!detail.members.iter().any(|m| m.username == "dave"));

    // Rejected users may ask again.
    engine.request_to_join(group.id, "dave").await.unwrap();
}

#[tokio::test]
async fn only_the_requester_deletes_a_join_request() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "dave", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();

    let err = engine.request_to_join(group.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let request = engine.request_to_join(group.id, "dave").await.unwrap();
    let err = engine
        .delete_join_request(request.id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_join_request(request.id, "dave").await.unwrap();
    let dashboard = engine.dashboard("dave").await.unwrap();
    assert!(dashboard.join_requests.is_empty());
    assert_eq!(dashboard.available_groups.len(), 1);
}

#[tokio::test]
async fn the_admin_cannot_leave() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();

    let err = engine.leave_group(group.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine.leave_group(group.id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::NotMember(_)));
}

#[tokio::test]
async fn leaving_a_group_drops_event_participation() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();
    add_member(&engine, group.id, "alice", "bob").await;
    let dinner = engine
        .new_event(group.id, event("Dinner", 20_00), "alice")
        .await
        .unwrap();
    engine.join_event(group.id, dinner.event.id, "bob").await.unwrap();

    engine.leave_group(group.id, "bob").await.unwrap();
    assert!(
        engine
            .event_participants(group.id, dinner.event.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn delete_group_removes_everything() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    user(&engine, "dave", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();
    add_member(&engine, group.id, "alice", "bob").await;
    let dinner = engine
        .new_event(group.id, event("Dinner", 20_00), "alice")
        .await
        .unwrap();
    engine.join_event(group.id, dinner.event.id, "bob").await.unwrap();
    engine.post_comment(group.id, "hello", "bob").await.unwrap();
    let request = engine.request_to_join(group.id, "dave").await.unwrap();
    engine
        .vote_on_join_request(group.id, request.id, Vote::Accept, "bob")
        .await
        .unwrap();

    let err = engine.delete_group(group.id, "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    engine.delete_group(group.id, "alice").await.unwrap();
    let err = engine.group_detail(group.id, "alice").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert!(engine.dashboard("bob").await.unwrap().groups.is_empty());
    assert!(engine.dashboard("dave").await.unwrap().join_requests.is_empty());
}

#[tokio::test]
async fn comments_are_listed_newest_first_and_edited_by_their_author() {
    let (engine, _db) = engine_with_db().await;
    user(&engine, "alice", 100_00).await;
    user(&engine, "bob", 100_00).await;
    let group = engine.new_group("Flatmates", "alice").await.unwrap();

    let first = engine.post_comment(group.id, "first", "alice").await.unwrap();
    let second = engine.post_comment(group.id, "second", "bob").await.unwrap();
    let err = engine.post_comment(group.id, "  ", "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let detail = engine.group_detail(group.id, "alice").await.unwrap();
    let texts: Vec<_> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["second", "first"]);

    let err = engine
        .edit_comment(group.id, first.id, "hijacked", "bob")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
    let err = engine
        .comment_for_edit(group.id, second.id, "alice")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let edited = engine
        .edit_comment(group.id, first.id, " first, edited ", "alice")
        .await
        .unwrap();
    assert_eq!(edited.text, "first, edited");
    assert_eq!(edited.id, first.id);
}
