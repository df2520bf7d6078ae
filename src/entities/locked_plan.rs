//! Locked plan entity - The savings-goal configuration of a locked
//! account. Withdrawals are refused until the balance reaches the target
//! amount, and are then capped by the withdrawal percentage.

use crate::amount::Amount;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Locked plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locked_plan")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account, one plan per account
    #[sea_orm(unique)]
    pub account_id: i64,
    /// Balance the member is saving toward; withdrawals open at this point
    pub target_amount: Amount,
    /// Cap on a single withdrawal, as a percentage of the balance (1-100)
    pub withdrawal_percent: u32,
    /// Declared cadence ("monthly", "quarterly", ...). Recorded but not
    /// enforced against elapsed time.
    pub withdrawal_frequency: String,
}

/// Defines relationships between `LockedPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each locked plan belongs to one account
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
