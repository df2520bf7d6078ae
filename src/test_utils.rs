//! Shared test utilities for the ledger.
//!
//! This module provides common helper functions for setting up test
//! stores and enrolling test accounts with sensible defaults.

use crate::amount::Amount;
use crate::core::deposit::{DepositRequest, deposit};
use crate::core::enroll::{EnrollmentForm, KindRequest, enroll};
use crate::entities::{AccountStatus, DepositModel, account};
use crate::errors::Result;
use crate::repo::account::AccountProfile;
use crate::store::{Store, schema};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

/// Creates an in-memory `SQLite` store with all tables initialized and
/// the default parameters seeded. This is the standard setup for all
/// integration tests.
pub async fn setup_test_store() -> Result<Store> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    schema::create_tables(&db).await?;
    schema::seed_default_parameters(&db).await?;
    Ok(Store::from_connection(db))
}

/// An enrollment form with sensible defaults for the given kind.
pub fn test_enrollment_form(kind: KindRequest) -> EnrollmentForm {
    EnrollmentForm {
        surname: "Doe".to_string(),
        middle_name: None,
        given_name: Some("John".to_string()),
        gender: Some("M".to_string()),
        phone: "0123456789".to_string(),
        address: Some("123 Test Street".to_string()),
        deputy_name: Some("Jane Doe".to_string()),
        deputy_contact: Some("0987654321".to_string()),
        kind,
        operator: "tester".to_string(),
    }
}

/// Enrolls a fixed account with the given unit amount in whole FC.
pub async fn enroll_test_fixed(store: &Store, unit_major: i64) -> Result<AccountProfile> {
    enroll(
        store,
        test_enrollment_form(KindRequest::Fixed {
            unit_amount: Amount::from_major(unit_major),
        }),
    )
    .await
}

/// Enrolls a mixed account.
pub async fn enroll_test_mixed(store: &Store) -> Result<AccountProfile> {
    enroll(store, test_enrollment_form(KindRequest::Mixed)).await
}

/// Enrolls a locked account with the given target (whole FC) and
/// withdrawal percentage.
pub async fn enroll_test_locked(
    store: &Store,
    target_major: i64,
    withdrawal_percent: u32,
) -> Result<AccountProfile> {
    enroll(
        store,
        test_enrollment_form(KindRequest::Locked {
            target_amount: Amount::from_major(target_major),
            withdrawal_percent,
            withdrawal_frequency: "monthly".to_string(),
        }),
    )
    .await
}

/// Deposits a whole-FC amount through the rule engine.
pub async fn deposit_amount(store: &Store, account_id: i64, major: i64) -> Result<DepositModel> {
    deposit(
        store,
        &DepositRequest {
            account_id,
            amount: Amount::from_major(major),
            operator: "tester".to_string(),
            payment_method: "cash".to_string(),
        },
    )
    .await
}

/// Re-reads an account profile by id.
pub async fn get_profile(store: &Store, account_id: i64) -> Result<AccountProfile> {
    crate::repo::account::find_profile_by_id(store.connection(), account_id).await
}

/// Marks an account as blocked, simulating an administrative freeze.
pub async fn block_account(store: &Store, account_id: i64) -> Result<()> {
    let account = crate::entities::Account::find_by_id(account_id)
        .one(store.connection())
        .await?
        .expect("test account exists");
    let mut model: account::ActiveModel = account.into();
    model.status = Set(AccountStatus::Blocked);
    model.update(store.connection()).await?;
    Ok(())
}
