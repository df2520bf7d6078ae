//! Journal entity - Append-only audit trail. One row per state-changing
//! operation, written in the same transaction as the mutation it
//! describes. Rows are never updated or deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Journal database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "journal")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What happened ("deposit", "withdrawal", "enrollment", ...)
    pub action: String,
    /// Agent who performed the action
    pub actor: String,
    /// Client number or other identifier the action was aimed at
    pub target: Option<String>,
    /// Free-text detail (amounts, references)
    pub detail: Option<String>,
    /// When the action happened
    pub recorded_at: DateTimeUtc,
}

/// The journal has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
