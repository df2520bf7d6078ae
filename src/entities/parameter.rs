//! Parameter entity - Operational settings stored as key-value pairs:
//! interest rate, minimum deposit, minimum withdrawal. Seeded with
//! defaults at schema creation and read by the rule engines inside their
//! transactions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameter database model - stores key-value settings
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parameter")]
pub struct Model {
    /// Setting key (e.g. `"interest_rate_percent"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Setting value stored as string
    pub value: String,
    /// Operator-facing description of the setting
    pub description: Option<String>,
    /// Whether the setting may be changed through the admin surface
    pub mutable: bool,
}

/// Parameters have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
