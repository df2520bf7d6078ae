//! Withdrawal entity - One debited withdrawal against an account,
//! capturing the gross debit, the commission retained and the net amount
//! delivered to the member.

use crate::amount::Amount;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Settlement status of a withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum WithdrawalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Withdrawal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal")]
pub struct Model {
    /// Unique identifier for the withdrawal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Account the withdrawal was debited from
    pub account_id: i64,
    /// Total amount debited from the balance
    pub gross_amount: Amount,
    /// Portion retained by the cooperative (fixed-payout commission or
    /// mixed-account interest)
    pub commission: Amount,
    /// Amount handed to the member (`gross_amount - commission`)
    pub net_amount: Amount,
    /// Operation reference handed to the member (`R` + six digits)
    #[sea_orm(unique)]
    pub reference: String,
    /// When the withdrawal was made
    pub recorded_at: DateTimeUtc,
    /// Name of the agent who paid out
    pub operator: String,
    /// Settlement status
    pub status: WithdrawalStatus,
}

/// Defines relationships between Withdrawal and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each withdrawal belongs to one account
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
