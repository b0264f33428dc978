use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{
        Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
};
use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::Database;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use engine::{Engine, MoneyCents, NewEvent, NewUser, parse_event_date};
use server::{
    ServerState, router,
    types::flash::{Level, Message},
};

async fn app() -> (Router, Arc<Engine>) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    for (username, max_spend) in [("alice", 100_00), ("bob", 20_00), ("carol", 100_00)] {
        engine
            .create_user_with_profile(
                NewUser::new(username, "password").max_spend(MoneyCents::new(max_spend)),
            )
            .await
            .unwrap();
    }

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };
    let engine = state.engine.clone();
    (router(state), engine)
}

/// Group administered by alice with bob as a second member.
async fn group_with_bob(engine: &Engine) -> Uuid {
    let group = engine.new_group("Flatmates", "alice").await.unwrap();
    engine
        .invite_users(group.id, &["bob".to_string()], "alice")
        .await
        .unwrap();
    engine.accept_invitation(group.id, "bob").await.unwrap();
    group.id
}

fn basic(username: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:password")))
}

fn get(uri: &str, username: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, basic(username))
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, username: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(AUTHORIZATION, basic(username))
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Value of the flash cookie set by `res`, if any.
fn flash_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| value.strip_prefix("chipin_flash="))
        .map(|value| value.split(';').next().unwrap_or_default().to_string())
        .filter(|value| !value.is_empty())
}

fn flashes(res: &Response) -> Vec<Message> {
    let Some(value) = flash_cookie(res) else {
        return Vec::new();
    };
    let bytes = URL_SAFE_NO_PAD.decode(value).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn json(res: Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_valid_credentials_are_rejected() {
    let (app, _engine) = app().await;

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .uri("/")
        .header(
            AUTHORIZATION,
            format!("Basic {}", STANDARD.encode("alice:wrong")),
        )
        .body(Body::empty())
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_group_flash_is_shown_once() {
    let (app, _engine) = app().await;

    let res = app
        .clone()
        .oneshot(post_form("/groups/create", "alice", "name=Flatmates"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()[LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with("/groups/"));
    let cookie = flash_cookie(&res).unwrap();

    let mut req = get(&location, "alice");
    req.headers_mut()
        .insert(COOKIE, format!("chipin_flash={cookie}").parse().unwrap());
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(flash_cookie(&res).is_none());

    let body = json(res).await;
    assert_eq!(body["group"]["name"], "Flatmates");
    assert_eq!(body["is_admin"], true);
    assert_eq!(body["messages"][0]["level"], "success");
    assert_eq!(
        body["messages"][0]["message"],
        "Group 'Flatmates' created successfully!"
    );
}

#[tokio::test]
async fn non_admin_cannot_create_events() {
    let (app, engine) = app().await;
    let group_id = group_with_bob(&engine).await;

    let res = app
        .oneshot(post_form(
            &format!("/groups/{group_id}/events/create"),
            "bob",
            "name=Dinner&date=2026-11-14&total_spend=10.00",
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], format!("/groups/{group_id}/"));
    assert_eq!(
        flashes(&res),
        vec![Message::error(
            "Only the group administrator can create events."
        )]
    );

    let detail = engine.group_detail(group_id, "alice").await.unwrap();
    assert!(detail.events.is_empty());
}

#[tokio::test]
async fn admin_creates_event_from_form_values() {
    let (app, engine) = app().await;
    let group_id = group_with_bob(&engine).await;

    let res = app
        .clone()
        .oneshot(post_form(
            &format!("/groups/{group_id}/events/create"),
            "alice",
            "name=Dinner&date=2026-11-14&total_spend=30.00",
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(flashes(&res)[0].level, Level::Success);

    let res = app
        .clone()
        .oneshot(post_form(
            &format!("/groups/{group_id}/events/create"),
            "alice",
            "name=Trip&date=next+week&total_spend=30.00",
        ))
        .await
        .unwrap();
    assert_eq!(flashes(&res)[0].level, Level::Error);

    let res = app
        .oneshot(get(&format!("/groups/{group_id}/"), "bob"))
        .await
        .unwrap();
    let body = json(res).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["name"], "Dinner");
    assert_eq!(events[0]["share_minor"], 15_00);
    assert_eq!(events[0]["status"], "Active");
    assert_eq!(events[0]["eligible"], true);
    assert_eq!(events[0]["joined"], false);
}

#[tokio::test]
async fn joining_above_max_spend_flashes_an_error() {
    let (app, engine) = app().await;
    let group_id = group_with_bob(&engine).await;
    let event = engine
        .new_event(
            group_id,
            NewEvent {
                name: "Concert".to_string(),
                date: parse_event_date("2026-11-14").unwrap(),
                total_spend: MoneyCents::new(100_00),
            },
            "alice",
        )
        .await
        .unwrap();

    let uri = format!("/groups/{group_id}/events/{}/join", event.event.id);
    let res = app.clone().oneshot(post_form(&uri, "bob", "")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        flashes(&res),
        vec![Message::error(
            "Your max spend of $20.00 is too low to join this event."
        )]
    );

    let res = app.clone().oneshot(post_form(&uri, "alice", "")).await.unwrap();
    assert_eq!(flashes(&res)[0].level, Level::Success);
    let res = app.oneshot(post_form(&uri, "alice", "")).await.unwrap();
    assert_eq!(
        flashes(&res),
        vec![Message::info("You have already joined this event.")]
    );

    let participants = engine
        .event_participants(group_id, event.event.id)
        .await
        .unwrap();
    assert_eq!(participants, vec!["alice".to_string()]);
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_404() {
    let (app, _engine) = app().await;

    let res = app
        .clone()
        .oneshot(get(&format!("/groups/{}/", Uuid::new_v4()), "alice"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .oneshot(post_form("/groups/not-a-uuid/leave", "alice", ""))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn editing_someone_elses_comment_redirects_silently() {
    let (app, engine) = app().await;
    let group_id = group_with_bob(&engine).await;
    let comment = engine
        .post_comment(group_id, "mine", "alice")
        .await
        .unwrap();
    let uri = format!("/groups/{group_id}/edit/{}/", comment.id);

    let res = app.clone().oneshot(get(&uri, "bob")).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], format!("/groups/{group_id}/"));

    let res = app
        .clone()
        .oneshot(post_form(&uri, "bob", "text=stolen"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(flashes(&res).is_empty());

    let res = app.oneshot(get(&uri, "alice")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res).await;
    assert_eq!(body["comment"]["text"], "mine");
}

#[tokio::test]
async fn join_request_votes_through_the_router() {
    let (app, engine) = app().await;
    let group_id = group_with_bob(&engine).await;

    let res = app
        .clone()
        .oneshot(post_form(
            &format!("/groups/{group_id}/request-to-join"),
            "carol",
            "",
        ))
        .await
        .unwrap();
    assert_eq!(res.headers()[LOCATION], "/");

    let detail = engine.group_detail(group_id, "alice").await.unwrap();
    let request_id = detail.join_requests[0].request.id;
    let vote = |voter: &'static str| {
        post_form(
            &format!("/groups/{group_id}/requests/{request_id}/vote/accept"),
            voter,
            "",
        )
    };

    let res = app.clone().oneshot(vote("alice")).await.unwrap();
    assert_eq!(
        flashes(&res),
        vec![Message::info(
            "Your vote has been recorded (1 of 2 members accepted)."
        )]
    );
    let res = app
        .clone()
        .oneshot(get(&format!("/groups/{group_id}/"), "alice"))
        .await
        .unwrap();
    let body = json(res).await;
    let pending = &body["join_requests"][0];
    assert_eq!(pending["username"], "carol");
    assert_eq!(pending["accepts"], 1);
    assert!(pending.get("rejects").is_none());

    let res = app.clone().oneshot(vote("bob")).await.unwrap();
    assert_eq!(
        flashes(&res),
        vec![Message::success("carol has been added to the group.")]
    );

    let res = app.oneshot(get("/", "carol")).await.unwrap();
    let body = json(res).await;
    assert_eq!(body["groups"][0]["name"], "Flatmates");
    assert!(body["join_requests"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn profile_update_reports_nickname_clash() {
    let (app, _engine) = app().await;

    let patch = |body: &'static str| {
        Request::builder()
            .method("PATCH")
            .uri("/profile")
            .header(AUTHORIZATION, basic("bob"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let res = app
        .clone()
        .oneshot(patch(r#"{"nickname":"ALICE"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app
        .clone()
        .oneshot(patch(r#"{"nickname":"Bobby","max_spend":"45.50"}"#))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res).await;
    assert_eq!(body["nickname"], "Bobby");
    assert_eq!(body["max_spend_minor"], 45_50);

    let res = app.oneshot(get("/profile", "bob")).await.unwrap();
    let body = json(res).await;
    assert_eq!(body["nickname"], "Bobby");
}
