//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: authentication, owners of everything else
//! - `friends`: loan counterparties, unique by name per owner
//! - `loans`: directional debts with a cached status
//! - `repayments`: partial payments, deleted together with their loan

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
enum Friends {
    Table,
    Id,
    OwnerUserId,
    Name,
    ContactNumber,
    CreatedAt,
}

#[derive(Iden)]
enum Loans {
    Table,
    Id,
    OwnerUserId,
    FriendId,
    AmountMinor,
    Direction,
    LoanDate,
    DueDate,
    Reason,
    Notes,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Repayments {
    Table,
    Id,
    LoanId,
    AmountMinor,
    RepaymentDate,
    Notes,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
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

        // ───────────────────────────────────────────────────────────────────
        // 2. Friends
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Friends::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Friends::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Friends::OwnerUserId).string().not_null())
                    .col(ColumnDef::new(Friends::Name).string().not_null())
                    .col(ColumnDef::new(Friends::ContactNumber).string())
                    .col(ColumnDef::new(Friends::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-friends-owner_user_id")
                            .from(Friends::Table, Friends::OwnerUserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-friends-owner_user_id-name-unique")
                    .table(Friends::Table)
                    .col(Friends::OwnerUserId)
                    .col(Friends::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Loans
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Loans::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Loans::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Loans::OwnerUserId).string().not_null())
                    .col(ColumnDef::new(Loans::FriendId).blob().not_null())
                    .col(ColumnDef::new(Loans::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Loans::Direction).string().not_null())
                    .col(ColumnDef::new(Loans::LoanDate).date().not_null())
                    .col(ColumnDef::new(Loans::DueDate).date())
                    .col(ColumnDef::new(Loans::Reason).string())
                    .col(ColumnDef::new(Loans::Notes).string())
                    .col(
                        ColumnDef::new(Loans::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Loans::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Loans::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-loans-owner_user_id")
                            .from(Loans::Table, Loans::OwnerUserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-loans-friend_id")
                            .from(Loans::Table, Loans::FriendId)
                            .to(Friends::Table, Friends::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-loans-owner_user_id-friend_id")
                    .table(Loans::Table)
                    .col(Loans::OwnerUserId)
                    .col(Loans::FriendId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Repayments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Repayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Repayments::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Repayments::LoanId).blob().not_null())
                    .col(
                        ColumnDef::new(Repayments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Repayments::RepaymentDate).date().not_null())
                    .col(ColumnDef::new(Repayments::Notes).string())
                    .col(
                        ColumnDef::new(Repayments::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-repayments-loan_id")
                            .from(Repayments::Table, Repayments::LoanId)
                            .to(Loans::Table, Loans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-repayments-loan_id")
                    .table(Repayments::Table)
                    .col(Repayments::LoanId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Repayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Loans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Friends::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
