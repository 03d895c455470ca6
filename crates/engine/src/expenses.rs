//! Expense rows.
//!
//! An expense is immutable once created: the ledger is append-only and
//! deletion/undo is not supported. Both amounts are fixed at capture time.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub expense_id: i32,
    pub trip_id: i32,
    /// Amount spent, in the trip's destination currency.
    pub amount_to: f64,
    /// Equivalent in the trip's home currency, converted at capture time.
    pub amount_from: f64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub expense_id: i32,
    pub trip_id: i32,
    pub amount_to: f64,
    pub amount_from: f64,
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trips::Entity",
        from = "Column::TripId",
        to = "super::trips::Column::TripId"
    )]
    Trips,
}

impl Related<super::trips::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trips.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Expense {
    fn from(model: Model) -> Self {
        Self {
            expense_id: model.expense_id,
            trip_id: model.trip_id,
            amount_to: model.amount_to,
            amount_from: model.amount_from,
            description: model.description,
            created_at: model.created_at,
        }
    }
}
