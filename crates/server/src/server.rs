use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::{net::SocketAddr, sync::Arc};

use crate::{comments, dashboard, events, groups, user};
use engine::{Engine, users};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

/// Resolves the Basic credentials to a `users` row and hands it to the
/// handlers as an extension.
async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<users::Model> = users::Entity::find()
        .filter(users::Column::Username.eq(auth_header.username()))
        .filter(users::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|err| {
            tracing::error!("failed to look up user: {err}");
            StatusCode::UNAUTHORIZED
        })?;

    let Some(user) = user else {
        tracing::debug!("rejected credentials for {}", auth_header.username());
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(dashboard::home))
        .route("/profile", get(user::profile).patch(user::update_profile))
        .route("/groups/create", post(groups::create))
        .route(
            "/groups/{group_id}/",
            get(groups::detail).post(comments::post),
        )
        .route(
            "/groups/{group_id}/edit/{comment_id}/",
            get(comments::edit_form).post(comments::edit),
        )
        .route("/groups/{group_id}/delete", post(groups::delete))
        .route("/groups/{group_id}/leave", post(groups::leave))
        .route("/groups/{group_id}/invite", post(groups::invite))
        .route("/groups/{group_id}/accept", post(groups::accept_invitation))
        .route(
            "/groups/{group_id}/request-to-join",
            post(groups::request_to_join),
        )
        .route(
            "/groups/{group_id}/requests/{request_id}/vote/{vote}",
            post(groups::vote),
        )
        .route(
            "/join-requests/{request_id}/delete",
            post(groups::delete_join_request),
        )
        .route(
            "/groups/{group_id}/events/create",
            get(events::form).post(events::create),
        )
        .route("/groups/{group_id}/events/{event_id}/join", post(events::join))
        .route(
            "/groups/{group_id}/events/{event_id}/leave",
            post(events::leave),
        )
        .route(
            "/groups/{group_id}/events/{event_id}/status",
            post(events::update_status),
        )
        .route(
            "/groups/{group_id}/events/{event_id}/delete",
            post(events::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
