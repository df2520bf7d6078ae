//! Account entity - A member account of the cooperative.
//!
//! Each account carries the member's identity data, its kind (fixed,
//! mixed or locked), the current balance and the lifecycle status. The
//! kind is set at enrollment and never changes; the balance only moves
//! inside a committed transaction that also records the operation.

use crate::amount::Amount;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The business rules an account is subject to. Fixed at enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AccountKind {
    /// Booklet account: deposits in multiples of a fixed unit amount.
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Flexible account with interest charged on withdrawals.
    #[sea_orm(string_value = "mixed")]
    Mixed,
    /// Savings-goal account with capped withdrawals.
    #[sea_orm(string_value = "locked")]
    Locked,
}

/// Lifecycle status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum AccountStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    /// No deposits or withdrawals are accepted while blocked.
    #[sea_orm(string_value = "blocked")]
    Blocked,
}

/// Account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Four-digit member number, unique across the cooperative
    #[sea_orm(unique)]
    pub client_number: String,
    /// Ten-digit savings-card number, unique across the cooperative
    #[sea_orm(unique)]
    pub card_number: String,
    /// Family name
    pub surname: String,
    /// Middle name, where the member has one
    pub middle_name: Option<String>,
    /// Given name
    pub given_name: Option<String>,
    /// "M" or "F", as recorded on the enrollment form
    pub gender: Option<String>,
    /// Contact phone number
    pub phone: String,
    /// Postal or street address
    pub address: Option<String>,
    /// Stand-in contact person for the member
    pub deputy_name: Option<String>,
    /// Phone number of the stand-in contact
    pub deputy_contact: Option<String>,
    /// Which rule set applies to this account
    pub kind: AccountKind,
    /// Current balance in minor units; never negative after a commit
    pub balance: Amount,
    /// Lifecycle status
    pub status: AccountStatus,
    /// When the member was enrolled
    pub enrolled_at: DateTimeUtc,
    /// Timestamp of the most recent deposit or withdrawal
    pub last_operation_at: Option<DateTimeUtc>,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has at most one fixed plan
    #[sea_orm(has_one = "super::fixed_plan::Entity")]
    FixedPlan,
    /// One account has at most one locked plan
    #[sea_orm(has_one = "super::locked_plan::Entity")]
    LockedPlan,
    /// One fixed account has many booklet pages
    #[sea_orm(has_many = "super::booklet_page::Entity")]
    BookletPages,
    /// One account has many deposit records
    #[sea_orm(has_many = "super::deposit::Entity")]
    Deposits,
    /// One account has many withdrawal records
    #[sea_orm(has_many = "super::withdrawal::Entity")]
    Withdrawals,
}

impl Related<super::fixed_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FixedPlan.def()
    }
}

impl Related<super::locked_plan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LockedPlan.def()
    }
}

impl Related<super::booklet_page::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookletPages.def()
    }
}

impl Related<super::deposit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposits.def()
    }
}

impl Related<super::withdrawal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
