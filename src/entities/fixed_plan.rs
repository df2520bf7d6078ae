//! Fixed plan entity - The per-account configuration of a fixed (booklet)
//! account: the unit amount each case is worth and the plan period.

use crate::amount::Amount;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed plan database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "fixed_plan")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning account, one plan per account
    #[sea_orm(unique)]
    pub account_id: i64,
    /// Value of one booklet case; every deposit must be a multiple of it
    pub unit_amount: Amount,
    /// First day of the plan period
    pub start_date: Date,
    /// Last day of the plan period (one year after start)
    pub end_date: Date,
}

/// Defines relationships between `FixedPlan` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each fixed plan belongs to one account
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
