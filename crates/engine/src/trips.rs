//! Trip primitives.
//!
//! A `Trip` pairs a home currency with a destination currency and tracks a
//! running balance in both. At most one trip per user is active at a time;
//! the active trip is the one receiving expense entries.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// A persisted trip with its two-currency balance.
///
/// `balance_from` and `balance_to` are decremented independently on every
/// expense using amounts fixed at capture time, so they are allowed to
/// drift apart from `balance_from * exchange_rate` between rate edits.
/// A rate edit resynchronizes them (`balance_to = balance_from * rate`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: i32,
    pub user_id: i64,
    pub trip_name: String,
    pub country_from: String,
    pub country_to: String,
    pub currency_from: String,
    pub currency_to: String,
    /// Amount of `currency_to` per 1 `currency_from`. Always positive.
    pub exchange_rate: f64,
    pub initial_amount_from: f64,
    pub balance_from: f64,
    pub balance_to: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for trip creation. `balance_from` starts at `initial_amount_from`;
/// `balance_to` is the destination-currency conversion computed by the
/// caller (live quote or stored-rate fallback).
#[derive(Clone, Debug, PartialEq)]
pub struct NewTrip {
    pub user_id: i64,
    pub trip_name: String,
    pub country_from: String,
    pub country_to: String,
    pub currency_from: String,
    pub currency_to: String,
    pub exchange_rate: f64,
    pub initial_amount_from: f64,
    pub balance_to: f64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trips")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub trip_id: i32,
    pub user_id: i64,
    pub trip_name: String,
    pub country_from: String,
    pub country_to: String,
    pub currency_from: String,
    pub currency_to: String,
    pub exchange_rate: f64,
    pub initial_amount_from: f64,
    pub balance_from: f64,
    pub balance_to: f64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::UserId"
    )]
    Users,
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Trip {
    fn from(model: Model) -> Self {
        Self {
            trip_id: model.trip_id,
            user_id: model.user_id,
            trip_name: model.trip_name,
            country_from: model.country_from,
            country_to: model.country_to,
            currency_from: model.currency_from,
            currency_to: model.currency_to,
            exchange_rate: model.exchange_rate,
            initial_amount_from: model.initial_amount_from,
            balance_from: model.balance_from,
            balance_to: model.balance_to,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

impl NewTrip {
    pub(crate) fn into_active_model(self, created_at: DateTime<Utc>) -> ActiveModel {
        ActiveModel {
            trip_id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(self.user_id),
            trip_name: ActiveValue::Set(self.trip_name),
            country_from: ActiveValue::Set(self.country_from),
            country_to: ActiveValue::Set(self.country_to),
            currency_from: ActiveValue::Set(self.currency_from),
            currency_to: ActiveValue::Set(self.currency_to),
            exchange_rate: ActiveValue::Set(self.exchange_rate),
            initial_amount_from: ActiveValue::Set(self.initial_amount_from),
            balance_from: ActiveValue::Set(self.initial_amount_from),
            balance_to: ActiveValue::Set(self.balance_to),
            is_active: ActiveValue::Set(true),
            created_at: ActiveValue::Set(created_at),
        }
    }
}
