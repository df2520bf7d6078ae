//! Deposit entity - One credited deposit against an account.
//!
//! Rows are created by the deposit rule engine and never mutated. The
//! only path that removes them is the explicit duplicate-cleanup and
//! fixed-account reset operations.

use crate::amount::Amount;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deposit database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposit")]
pub struct Model {
    /// Unique identifier for the deposit
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account the deposit was credited to
    pub account_id: i64,
    /// Credited amount
    pub amount: Amount,
    /// Operation reference handed to the member (`DEPyyyymmdd-NNNNN`)
    #[sea_orm(unique)]
    pub reference: String,
    /// When the deposit was taken
    pub recorded_at: DateTimeUtc,
    /// Name of the agent who took the deposit
    pub operator: String,
    /// How the money arrived ("cash", "mobile", ...)
    pub payment_method: String,
}

/// Defines relationships between Deposit and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each deposit belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
