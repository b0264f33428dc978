//! Initial schema: creates every table chipin needs.
//!
//! - `users`: login identity
//! - `profiles`: display names, spending limit and balance (one per user)
//! - `groups` / `group_members`: who shares costs with whom
//! - `events` / `event_members`: shared costs and their participants
//! - `comments`: group page messages
//! - `group_join_requests` / `join_request_votes`: asking to enter a group
//! - `group_invitations`: admin invitations waiting for an answer

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Profiles {
    Table,
    UserId,
    FirstName,
    Surname,
    Nickname,
    NicknameNorm,
    MaxSpend,
    Balance,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    Name,
    AdminId,
}

#[derive(Iden)]
enum GroupMembers {
    Table,
    GroupId,
    UserId,
}

#[derive(Iden)]
enum Events {
    Table,
    Id,
    GroupId,
    Name,
    Date,
    TotalSpend,
    Status,
}

#[derive(Iden)]
enum EventMembers {
    Table,
    EventId,
    UserId,
}

#[derive(Iden)]
enum Comments {
    Table,
    Id,
    GroupId,
    UserId,
    Text,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GroupJoinRequests {
    Table,
    Id,
    GroupId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum JoinRequestVotes {
    Table,
    RequestId,
    VoterId,
    Vote,
}

#[derive(Iden)]
enum GroupInvitations {
    Table,
    GroupId,
    UserId,
    InvitedBy,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users and profiles
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::UserId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::FirstName).string().not_null())
                    .col(ColumnDef::new(Profiles::Surname).string().not_null())
                    .col(ColumnDef::new(Profiles::Nickname).string().not_null())
                    .col(ColumnDef::new(Profiles::NicknameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Profiles::MaxSpend)
                            .big_integer()
                            .not_null()
                            .default(100_00),
                    )
                    .col(
                        ColumnDef::new(Profiles::Balance)
                            .big_integer()
                            .not_null()
                            .default(100_00),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-profiles-user_id")
                            .from(Profiles::Table, Profiles::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-profiles-nickname_norm-unique")
                    .table(Profiles::Table)
                    .col(Profiles::NicknameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::AdminId).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-groups-admin_id")
                            .from(Groups::Table, Groups::AdminId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupMembers::GroupId).blob().not_null())
                    .col(ColumnDef::new(GroupMembers::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(GroupMembers::GroupId)
                            .col(GroupMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_members-user_id")
                            .from(GroupMembers::Table, GroupMembers::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_members-user_id")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Events
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Events::GroupId).blob().not_null())
                    .col(ColumnDef::new(Events::Name).string().not_null())
                    .col(ColumnDef::new(Events::Date).date().not_null())
                    .col(ColumnDef::new(Events::TotalSpend).big_integer().not_null())
                    .col(
                        ColumnDef::new(Events::Status)
                            .string()
                            .not_null()
                            .default("Pending"),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-events-group_id")
                            .from(Events::Table, Events::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-events-group_id-date")
                    .table(Events::Table)
                    .col(Events::GroupId)
                    .col(Events::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EventMembers::EventId).blob().not_null())
                    .col(ColumnDef::new(EventMembers::UserId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(EventMembers::EventId)
                            .col(EventMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_members-event_id")
                            .from(EventMembers::Table, EventMembers::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_members-user_id")
                            .from(EventMembers::Table, EventMembers::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Comments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Comments::GroupId).blob().not_null())
                    .col(ColumnDef::new(Comments::UserId).string().not_null())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .col(
                        ColumnDef::new(Comments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Comments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comments-group_id")
                            .from(Comments::Table, Comments::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-comments-user_id")
                            .from(Comments::Table, Comments::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Join requests and votes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupJoinRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupJoinRequests::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupJoinRequests::GroupId).blob().not_null())
                    .col(ColumnDef::new(GroupJoinRequests::UserId).string().not_null())
                    .col(
                        ColumnDef::new(GroupJoinRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_join_requests-group_id")
                            .from(GroupJoinRequests::Table, GroupJoinRequests::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_join_requests-user_id")
                            .from(GroupJoinRequests::Table, GroupJoinRequests::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-group_join_requests-group_id-user_id-unique")
                    .table(GroupJoinRequests::Table)
                    .col(GroupJoinRequests::GroupId)
                    .col(GroupJoinRequests::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JoinRequestVotes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JoinRequestVotes::RequestId).blob().not_null())
                    .col(ColumnDef::new(JoinRequestVotes::VoterId).string().not_null())
                    .col(ColumnDef::new(JoinRequestVotes::Vote).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(JoinRequestVotes::RequestId)
                            .col(JoinRequestVotes::VoterId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-join_request_votes-request_id")
                            .from(JoinRequestVotes::Table, JoinRequestVotes::RequestId)
                            .to(GroupJoinRequests::Table, GroupJoinRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-join_request_votes-voter_id")
                            .from(JoinRequestVotes::Table, JoinRequestVotes::VoterId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Invitations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(GroupInvitations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupInvitations::GroupId).blob().not_null())
                    .col(ColumnDef::new(GroupInvitations::UserId).string().not_null())
                    .col(ColumnDef::new(GroupInvitations::InvitedBy).string().not_null())
                    .col(
                        ColumnDef::new(GroupInvitations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(GroupInvitations::GroupId)
                            .col(GroupInvitations::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_invitations-group_id")
                            .from(GroupInvitations::Table, GroupInvitations::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_invitations-user_id")
                            .from(GroupInvitations::Table, GroupInvitations::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-group_invitations-invited_by")
                            .from(GroupInvitations::Table, GroupInvitations::InvitedBy)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse creation order, children first.
        manager
            .drop_table(Table::drop().table(GroupInvitations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JoinRequestVotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupJoinRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
