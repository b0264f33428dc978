#![allow(dead_code)]

use chrono::NaiveDate;
use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, MoneyCents, NewEvent, NewUser};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

/// Provisions `username` with password "password" and the given limit.
pub async fn user(engine: &Engine, username: &str, max_spend: i64) {
    engine
        .create_user_with_profile(
            NewUser::new(username, "password").max_spend(MoneyCents::new(max_spend)),
        )
        .await
        .unwrap();
}

/// Adds `username` to the group through an invitation from `admin`.
pub async fn add_member(engine: &Engine, group_id: uuid::Uuid, admin: &str, username: &str) {
    engine
        .invite_users(group_id, &[username.to_string()], admin)
        .await
        .unwrap();
    engine.accept_invitation(group_id, username).await.unwrap();
}

pub fn event(name: &str, total_spend: i64) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 11, 14).unwrap(),
        total_spend: MoneyCents::new(total_spend),
    }
}
