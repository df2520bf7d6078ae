//! Account operations - The read side consumed by the form and export
//! layers, plus the destructive fixed-account reset.

use crate::amount::Amount;
use crate::booklet::{CASES_PER_PAGE, MAX_CASES};
use crate::entities::{AccountKind, BookletPageModel, account};
use crate::errors::{Error, Result};
use crate::repo::account::{AccountLookup, AccountProfile};
use crate::repo::{account as account_repo, booklet as booklet_repo, records};
use crate::store::Store;
use crate::core::audit;
use sea_orm::{ActiveModelTrait, Set};
use tracing::{info, instrument};

/// Loads an account with its plan by client or card number.
pub async fn get_account(store: &Store, lookup: AccountLookup<'_>) -> Result<AccountProfile> {
    account_repo::find_profile(store.connection(), lookup).await
}

/// Loads an account with its plan by primary key.
pub async fn get_account_by_id(store: &Store, account_id: i64) -> Result<AccountProfile> {
    account_repo::find_profile_by_id(store.connection(), account_id).await
}

/// The booklet pages of a fixed account, in page order.
pub async fn get_booklet(store: &Store, account_id: i64) -> Result<Vec<BookletPageModel>> {
    booklet_repo::load_pages(store.connection(), account_id).await
}

/// Progress of a fixed account toward its full booklet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookletSummary {
    pub filled_cases: u32,
    pub complete_pages: u32,
}

impl BookletSummary {
    /// Share of the 248-case capacity already stamped, for display.
    pub fn percent_complete(&self) -> f64 {
        f64::from(self.filled_cases) * 100.0 / f64::from(MAX_CASES)
    }
}

/// Summarizes a fixed account's booklet progress.
pub async fn booklet_summary(store: &Store, account_id: i64) -> Result<BookletSummary> {
    let pages = booklet_repo::load_pages(store.connection(), account_id).await?;
    let filled_cases = pages.iter().map(|p| p.filled_cases as u32).sum();
    let complete_pages = pages
        .iter()
        .filter(|p| p.filled_cases as u32 == CASES_PER_PAGE)
        .count() as u32;
    Ok(BookletSummary {
        filled_cases,
        complete_pages,
    })
}

/// The most recent deposits and withdrawals of an account, newest first.
pub async fn list_recent_operations(
    store: &Store,
    account_id: i64,
    limit: u64,
) -> Result<Vec<records::Operation>> {
    records::recent_operations(store.connection(), account_id, limit).await
}

/// Administrative reset of a fixed account: deletes the booklet pages and
/// the whole deposit/withdrawal history and zeroes the balance, in one
/// transaction. Irreversible.
#[instrument(skip(store))]
pub async fn reset_fixed_account(store: &Store, account_id: i64, operator: &str) -> Result<()> {
    let txn = store.begin().await?;

    let profile = account_repo::find_profile_by_id(&txn, account_id).await?;
    if profile.account.kind != AccountKind::Fixed {
        return Err(Error::Validation {
            message: format!(
                "account {} is not a fixed account",
                profile.account.client_number
            ),
        });
    }

    let pages = booklet_repo::delete_pages(&txn, account_id).await?;
    let deposits = records::delete_deposits_for_account(&txn, account_id).await?;
    let withdrawals = records::delete_withdrawals_for_account(&txn, account_id).await?;

    let mut model: account::ActiveModel = profile.account.clone().into();
    model.balance = Set(Amount::ZERO);
    model.update(&txn).await?;

    audit::append(
        &txn,
        "fixed_account_reset",
        operator,
        Some(profile.account.client_number.as_str()),
        Some(format!(
            "pages: {pages}, deposits: {deposits}, withdrawals: {withdrawals}"
        )),
    )
    .await?;

    txn.commit().await?;
    info!(
        "Reset fixed account {}: {} page(s), {} deposit(s), {} withdrawal(s) purged",
        profile.account.client_number, pages, deposits, withdrawals
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn booklet_summary_tracks_progress() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_fixed(&store, 1_000).await?;

        // 35 cases: page 1 complete, 4 on page 2.
        deposit_amount(&store, enrolled.account.id, 35_000).await?;
        let summary = booklet_summary(&store, enrolled.account.id).await?;
        assert_eq!(summary.filled_cases, 35);
        assert_eq!(summary.complete_pages, 1);
        assert!((summary.percent_complete() - 35.0 * 100.0 / 248.0).abs() < 1e-9);
        Ok(())
    }

    #[tokio::test]
    async fn filled_cases_match_deposited_units() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_fixed(&store, 5_000).await?;

        deposit_amount(&store, enrolled.account.id, 15_000).await?;
        deposit_amount(&store, enrolled.account.id, 10_000).await?;

        let profile = get_account_by_id(&store, enrolled.account.id).await?;
        let summary = booklet_summary(&store, enrolled.account.id).await?;
        let unit = profile.unit_amount().unwrap();
        assert_eq!(
            i64::from(summary.filled_cases),
            profile.account.balance.units_of(unit)
        );
        Ok(())
    }

    #[tokio::test]
    async fn reset_purges_history_and_zeroes_balance() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_fixed(&store, 5_000).await?;
        deposit_amount(&store, enrolled.account.id, 25_000).await?;

        reset_fixed_account(&store, enrolled.account.id, "admin").await?;

        let profile = get_account_by_id(&store, enrolled.account.id).await?;
        assert_eq!(profile.account.balance, Amount::ZERO);
        assert!(get_booklet(&store, enrolled.account.id).await?.is_empty());
        assert!(
            list_recent_operations(&store, enrolled.account.id, 10)
                .await?
                .is_empty()
        );

        let entries = crate::core::audit::recent(store.connection(), 5).await?;
        assert!(entries.iter().any(|e| e.action == "fixed_account_reset"));
        Ok(())
    }

    #[tokio::test]
    async fn reset_refuses_non_fixed_accounts() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_mixed(&store).await?;

        let result = reset_fixed_account(&store, enrolled.account.id, "admin").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn lookup_by_card_and_client_agree() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_mixed(&store).await?;

        let by_client = get_account(
            &store,
            AccountLookup::ClientNumber(&enrolled.account.client_number),
        )
        .await?;
        let by_card = get_account(
            &store,
            AccountLookup::CardNumber(&enrolled.account.card_number),
        )
        .await?;
        assert_eq!(by_client.account.id, by_card.account.id);
        Ok(())
    }
}
