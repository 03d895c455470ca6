//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for Valigia:
//!
//! - `users`: chat-platform identities, inserted on first contact
//! - `trips`: one currency pair + exchange rate + two running balances
//! - `expenses`: append-only spending records, one trip each

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    UserId,
    Username,
    CreatedAt,
}

#[derive(Iden)]
enum Trips {
    Table,
    TripId,
    UserId,
    TripName,
    CountryFrom,
    CountryTo,
    CurrencyFrom,
    CurrencyTo,
    ExchangeRate,
    InitialAmountFrom,
    BalanceFrom,
    BalanceTo,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    ExpenseId,
    TripId,
    AmountTo,
    AmountFrom,
    Description,
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
                        ColumnDef::new(Users::UserId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Trips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Trips::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Trips::TripId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Trips::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Trips::TripName).string().not_null())
                    .col(ColumnDef::new(Trips::CountryFrom).string().not_null())
                    .col(ColumnDef::new(Trips::CountryTo).string().not_null())
                    .col(ColumnDef::new(Trips::CurrencyFrom).string().not_null())
                    .col(ColumnDef::new(Trips::CurrencyTo).string().not_null())
                    .col(ColumnDef::new(Trips::ExchangeRate).double().not_null())
                    .col(
                        ColumnDef::new(Trips::InitialAmountFrom)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Trips::BalanceFrom).double().not_null())
                    .col(ColumnDef::new(Trips::BalanceTo).double().not_null())
                    .col(
                        ColumnDef::new(Trips::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Trips::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-trips-user_id")
                            .from(Trips::Table, Trips::UserId)
                            .to(Users::Table, Users::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-trips-user_id-is_active")
                    .table(Trips::Table)
                    .col(Trips::UserId)
                    .col(Trips::IsActive)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::ExpenseId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::TripId).integer().not_null())
                    .col(ColumnDef::new(Expenses::AmountTo).double().not_null())
                    .col(ColumnDef::new(Expenses::AmountFrom).double().not_null())
                    .col(ColumnDef::new(Expenses::Description).string())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-trip_id")
                            .from(Expenses::Table, Expenses::TripId)
                            .to(Trips::Table, Trips::TripId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-trip_id")
                    .table(Expenses::Table)
                    .col(Expenses::TripId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Trips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
