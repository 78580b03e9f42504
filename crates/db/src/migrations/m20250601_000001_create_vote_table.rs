//! Create vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::TokenId).string_len(64).not_null())
                    .col(ColumnDef::new(Vote::VoterId).string_len(64).null())
                    .col(ColumnDef::new(Vote::Direction).string_len(8).not_null())
                    .col(ColumnDef::new(Vote::PriceAtVote).double().null())
                    .col(ColumnDef::new(Vote::IsCorrect).boolean().null())
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Vote::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Vote::CheckedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .check(Expr::col(Vote::Direction).is_in(["pump", "dump"]))
                    .to_owned(),
            )
            .await?;

        // Unique index: (token_id, voter_id) - one vote per voter per token.
        // NULL voter ids never collide, so anonymous votes stay independent.
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_token_voter")
                    .table(Vote::Table)
                    .col(Vote::TokenId)
                    .col(Vote::VoterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: token_id (for per-token counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_token_id")
                    .table(Vote::Table)
                    .col(Vote::TokenId)
                    .to_owned(),
            )
            .await?;

        // Index: voter_id (for accuracy)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_voter_id")
                    .table(Vote::Table)
                    .col(Vote::VoterId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (for the trending window)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_created_at")
                    .table(Vote::Table)
                    .col(Vote::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    TokenId,
    VoterId,
    Direction,
    PriceAtVote,
    IsCorrect,
    CreatedAt,
    UpdatedAt,
    CheckedAt,
}
