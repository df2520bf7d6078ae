//! Schema creation for the ledger store.
//!
//! Tables are generated from the entity definitions with SeaORM's
//! `Schema::create_table_from_entity`, so the database always matches the
//! Rust models. The composite uniqueness of booklet pages (one row per
//! account and page number) needs an explicit index, and the operational
//! parameters are seeded with their reference defaults on first run.

use crate::entities::{
    Account, BookletPage, Deposit, FixedPlan, Journal, LockedPlan, Parameter, Withdrawal,
    booklet_page, parameter,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Schema, Set};
use tracing::{debug, info};

/// Seeded settings: key, value, description, whether the admin surface may
/// change it.
const DEFAULT_PARAMETERS: [(&str, &str, &str, bool); 4] = [
    (
        "interest_rate_percent",
        "5.0",
        "Annual interest rate (%)",
        true,
    ),
    ("min_deposit", "500", "Minimum deposit amount (FC)", true),
    (
        "min_withdrawal",
        "1000",
        "Minimum withdrawal amount (FC)",
        true,
    ),
    (
        "busy_timeout_secs",
        "30",
        "Store lock-wait timeout (seconds)",
        false,
    ),
];

/// Creates all ledger tables and indexes if they do not exist yet.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Account first: every other table references it.
    for mut table in [
        schema.create_table_from_entity(Account),
        schema.create_table_from_entity(FixedPlan),
        schema.create_table_from_entity(LockedPlan),
        schema.create_table_from_entity(BookletPage),
        schema.create_table_from_entity(Deposit),
        schema.create_table_from_entity(Withdrawal),
        schema.create_table_from_entity(Journal),
        schema.create_table_from_entity(Parameter),
    ] {
        table.if_not_exists();
        db.execute(builder.build(&table)).await?;
    }

    // One page row per (account, page number).
    let page_index = Index::create()
        .if_not_exists()
        .name("uq_booklet_page_account_page")
        .table(BookletPage)
        .col(booklet_page::Column::AccountId)
        .col(booklet_page::Column::PageNumber)
        .unique()
        .to_owned();
    db.execute(builder.build(&page_index)).await?;

    debug!("Ledger tables ensured");
    Ok(())
}

/// Seeds the operational parameters that the rule engines read, skipping
/// any key already present so operator overrides survive restarts.
pub async fn seed_default_parameters<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut seeded = 0;
    for (key, value, description, mutable) in DEFAULT_PARAMETERS {
        let existing = Parameter::find_by_id(key).one(db).await?;
        if existing.is_some() {
            continue;
        }
        let row = parameter::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            description: Set(Some(description.to_string())),
            mutable: Set(mutable),
        };
        row.insert(db).await?;
        seeded += 1;
    }
    if seeded > 0 {
        info!("Seeded {} default parameter(s)", seeded);
    }
    Ok(())
}
