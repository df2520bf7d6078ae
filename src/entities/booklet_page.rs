//! Booklet page entity - One page of a fixed account's deposit booklet.
//!
//! A booklet holds up to 8 pages of 31 cases each. Pages are created
//! lazily by the allocator in ascending order and deleted only by the
//! administrative account reset.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Booklet page database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booklet_page")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning fixed account
    pub account_id: i64,
    /// Position in the booklet, 1 through 8. Unique per account together
    /// with `account_id` (index created at schema setup).
    pub page_number: i32,
    /// Cases stamped on this page, 0 through 31
    pub filled_cases: i32,
}

/// Defines relationships between `BookletPage` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each page belongs to one account
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
