//! Travel-budget ledger over a SQL store.
//!
//! The [`Ledger`] owns the durable state: users, trips and expenses. It
//! enforces the two invariants the rest of the system leans on:
//!
//! - at most one trip per user is active at any time, flipped only through
//!   the atomic deactivate-all-then-activate-one writes of
//!   [`Ledger::create_trip`] and [`Ledger::switch_active_trip`];
//! - an expense row and its balance decrement commit together or not at
//!   all ([`Ledger::add_expense`]).
//!
//! Balances may go negative: spending beyond the tracked budget is a valid
//! real-world event and is never rejected.

use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
    prelude::*, sea_query::OnConflict,
};

pub use convert::{Direction, Quote, QuoteSource};
pub use error::LedgerError;
pub use expenses::Expense;
pub use trips::{NewTrip, Trip};

pub mod convert;
mod error;
mod expenses;
mod trips;
mod users;

type ResultLedger<T> = Result<T, LedgerError>;

/// Aggregate view over all expenses of one trip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TripStats {
    pub count: i64,
    pub total_spent_from: f64,
    pub total_spent_to: f64,
}

#[derive(Clone, Debug)]
pub struct Ledger {
    database: DatabaseConnection,
}

impl Ledger {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Registers a user on first contact. Idempotent: calling it again
    /// with the same id leaves the existing row untouched.
    pub async fn add_user(&self, user_id: i64, username: Option<&str>) -> ResultLedger<()> {
        let model = users::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            username: ActiveValue::Set(username.map(str::to_string)),
            created_at: ActiveValue::Set(Utc::now()),
        };

        users::Entity::insert(model)
            .on_conflict(
                OnConflict::column(users::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.database)
            .await?;
        Ok(())
    }

    /// Creates a trip and makes it the user's active one.
    ///
    /// Deactivating the previous trips and inserting the new row happen in
    /// one database transaction, so a crash can never leave the user with
    /// two active trips or none when one was intended.
    pub async fn create_trip(&self, new_trip: NewTrip) -> ResultLedger<i32> {
        if new_trip.exchange_rate <= 0.0 {
            return Err(LedgerError::InvalidAmount(
                "exchange_rate must be > 0".to_string(),
            ));
        }
        if new_trip.initial_amount_from <= 0.0 {
            return Err(LedgerError::InvalidAmount(
                "initial_amount_from must be > 0".to_string(),
            ));
        }

        let user_id = new_trip.user_id;
        let db_tx = self.database.begin().await?;

        trips::Entity::update_many()
            .col_expr(trips::Column::IsActive, Expr::value(false))
            .filter(trips::Column::UserId.eq(user_id))
            .exec(&db_tx)
            .await?;

        let inserted = trips::Entity::insert(new_trip.into_active_model(Utc::now()))
            .exec(&db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(inserted.last_insert_id)
    }

    /// Returns the user's active trip, if any.
    pub async fn active_trip(&self, user_id: i64) -> ResultLedger<Option<Trip>> {
        let model = trips::Entity::find()
            .filter(trips::Column::UserId.eq(user_id))
            .filter(trips::Column::IsActive.eq(true))
            .one(&self.database)
            .await?;
        Ok(model.map(Trip::from))
    }

    /// All trips of a user, newest-created first.
    pub async fn trips(&self, user_id: i64) -> ResultLedger<Vec<Trip>> {
        let models = trips::Entity::find()
            .filter(trips::Column::UserId.eq(user_id))
            .order_by_desc(trips::Column::TripId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Trip::from).collect())
    }

    /// Makes `trip_id` the user's active trip.
    ///
    /// Returns `false` without touching anything when the trip does not
    /// exist or belongs to another user. Same atomicity contract as
    /// [`Ledger::create_trip`].
    pub async fn switch_active_trip(&self, user_id: i64, trip_id: i32) -> ResultLedger<bool> {
        let owned = trips::Entity::find_by_id(trip_id)
            .filter(trips::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        if owned.is_none() {
            return Ok(false);
        }

        let db_tx = self.database.begin().await?;

        trips::Entity::update_many()
            .col_expr(trips::Column::IsActive, Expr::value(false))
            .filter(trips::Column::UserId.eq(user_id))
            .exec(&db_tx)
            .await?;
        trips::Entity::update_many()
            .col_expr(trips::Column::IsActive, Expr::value(true))
            .filter(trips::Column::TripId.eq(trip_id))
            .exec(&db_tx)
            .await?;

        db_tx.commit().await?;
        Ok(true)
    }

    /// Records an expense and decrements both trip balances in the same
    /// transaction. Amounts must be positive; the resulting balances may
    /// be negative. Returns the trip with its updated balances.
    pub async fn add_expense(
        &self,
        trip_id: i32,
        amount_to: f64,
        amount_from: f64,
        description: Option<&str>,
    ) -> ResultLedger<Trip> {
        if amount_to <= 0.0 || amount_from <= 0.0 {
            return Err(LedgerError::InvalidAmount(
                "expense amounts must be > 0".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        let trip = trips::Entity::find_by_id(trip_id)
            .one(&db_tx)
            .await?
            .ok_or(LedgerError::TripNotFound(trip_id))?;

        let expense = expenses::ActiveModel {
            expense_id: ActiveValue::NotSet,
            trip_id: ActiveValue::Set(trip_id),
            amount_to: ActiveValue::Set(amount_to),
            amount_from: ActiveValue::Set(amount_from),
            description: ActiveValue::Set(description.map(str::to_string)),
            created_at: ActiveValue::Set(Utc::now()),
        };
        expense.insert(&db_tx).await?;

        let balance_from = trip.balance_from - amount_from;
        let balance_to = trip.balance_to - amount_to;
        let update = trips::ActiveModel {
            trip_id: ActiveValue::Set(trip_id),
            balance_from: ActiveValue::Set(balance_from),
            balance_to: ActiveValue::Set(balance_to),
            ..Default::default()
        };
        let updated = update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(Trip::from(updated))
    }

    /// Expenses of a trip, newest first, capped at `limit`.
    pub async fn expenses(&self, trip_id: i32, limit: u64) -> ResultLedger<Vec<Expense>> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::TripId.eq(trip_id))
            .order_by_desc(expenses::Column::ExpenseId)
            .limit(limit)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Expense::from).collect())
    }

    /// Sets a new exchange rate and resynchronizes the destination
    /// balance: `balance_to = balance_from * new_rate`, with
    /// `balance_from` as ground truth. This is the only resynchronization
    /// point; everywhere else the balances move independently.
    ///
    /// Returns `None` when the trip does not exist.
    pub async fn update_exchange_rate(
        &self,
        trip_id: i32,
        new_rate: f64,
    ) -> ResultLedger<Option<Trip>> {
        if new_rate <= 0.0 {
            return Err(LedgerError::InvalidAmount(
                "exchange_rate must be > 0".to_string(),
            ));
        }

        let db_tx = self.database.begin().await?;

        let Some(trip) = trips::Entity::find_by_id(trip_id).one(&db_tx).await? else {
            return Ok(None);
        };

        let update = trips::ActiveModel {
            trip_id: ActiveValue::Set(trip_id),
            exchange_rate: ActiveValue::Set(new_rate),
            balance_to: ActiveValue::Set(trip.balance_from * new_rate),
            ..Default::default()
        };
        let updated = update.update(&db_tx).await?;

        db_tx.commit().await?;
        Ok(Some(Trip::from(updated)))
    }

    /// Expense count and totals for a trip; all zero when it has none.
    pub async fn statistics(&self, trip_id: i32) -> ResultLedger<TripStats> {
        let backend = self.database.get_database_backend();
        let row = self
            .database
            .query_one(Statement::from_sql_and_values(
                backend,
                "SELECT COUNT(*) AS count, \
                        COALESCE(SUM(amount_from), 0.0) AS total_spent_from, \
                        COALESCE(SUM(amount_to), 0.0) AS total_spent_to \
                 FROM expenses WHERE trip_id = ?",
                vec![trip_id.into()],
            ))
            .await?;

        let Some(row) = row else {
            return Ok(TripStats::default());
        };
        Ok(TripStats {
            count: row.try_get("", "count")?,
            total_spent_from: row.try_get("", "total_spent_from")?,
            total_spent_to: row.try_get("", "total_spent_to")?,
        })
    }
}
