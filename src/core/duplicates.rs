//! Duplicate-deposit cleanup - An explicit administrative operation, not
//! an automatic safeguard.
//!
//! Deposits recorded twice (same account, amount and timestamp, usually
//! after an operator retry against a locking store) are surfaced as
//! groups. Removing rows also debits the account by the aggregate
//! duplicate amount, in the same transaction, so the balance matches the
//! surviving records.

use crate::amount::Amount;
use crate::entities::{Deposit, account, deposit};
use crate::errors::Result;
use crate::repo::account as account_repo;
use crate::store::Store;
use crate::core::audit;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, prelude::DateTimeUtc,
};
use tracing::{info, instrument, warn};

/// A set of deposit rows sharing account, amount and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub account_id: i64,
    pub amount: Amount,
    pub recorded_at: DateTimeUtc,
    pub occurrences: i64,
}

/// Scans the deposit table for duplicate groups, newest first.
pub async fn find_duplicates(store: &Store) -> Result<Vec<DuplicateGroup>> {
    let rows: Vec<(i64, Amount, DateTimeUtc, i64)> = Deposit::find()
        .select_only()
        .column(deposit::Column::AccountId)
        .column(deposit::Column::Amount)
        .column(deposit::Column::RecordedAt)
        .column_as(Expr::col(deposit::Column::Id).count(), "occurrences")
        .group_by(deposit::Column::AccountId)
        .group_by(deposit::Column::Amount)
        .group_by(deposit::Column::RecordedAt)
        .having(Expr::col(deposit::Column::Id).count().gt(1))
        .order_by_desc(deposit::Column::RecordedAt)
        .into_tuple()
        .all(store.connection())
        .await?;

    Ok(rows
        .into_iter()
        .map(|(account_id, amount, recorded_at, occurrences)| DuplicateGroup {
            account_id,
            amount,
            recorded_at,
            occurrences,
        })
        .collect())
}

/// Deletes all but the oldest row of a group and debits the balance by
/// the removed total. Returns how many rows were removed.
#[instrument(skip(store, group), fields(account_id = group.account_id))]
pub async fn remove_keeping_first(
    store: &Store,
    group: &DuplicateGroup,
    operator: &str,
) -> Result<u64> {
    let txn = store.begin().await?;
    let ids = group_row_ids(&txn, group).await?;
    if ids.len() <= 1 {
        return Ok(0);
    }
    // The first id is the oldest row; it survives.
    let removed = purge(&txn, group, &ids[1..], operator).await?;
    txn.commit().await?;
    Ok(removed)
}

/// Deletes every row of a group and debits the balance by the full total.
/// Returns how many rows were removed.
#[instrument(skip(store, group), fields(account_id = group.account_id))]
pub async fn remove_all(store: &Store, group: &DuplicateGroup, operator: &str) -> Result<u64> {
    let txn = store.begin().await?;
    let ids = group_row_ids(&txn, group).await?;
    if ids.is_empty() {
        return Ok(0);
    }
    let removed = purge(&txn, group, &ids, operator).await?;
    txn.commit().await?;
    Ok(removed)
}

async fn group_row_ids(txn: &DatabaseTransaction, group: &DuplicateGroup) -> Result<Vec<i64>> {
    let rows = Deposit::find()
        .filter(deposit::Column::AccountId.eq(group.account_id))
        .filter(deposit::Column::Amount.eq(group.amount))
        .filter(deposit::Column::RecordedAt.eq(group.recorded_at))
        .order_by_asc(deposit::Column::Id)
        .all(txn)
        .await?;
    Ok(rows.into_iter().map(|row| row.id).collect())
}

async fn purge(
    txn: &DatabaseTransaction,
    group: &DuplicateGroup,
    ids: &[i64],
    operator: &str,
) -> Result<u64> {
    let result = Deposit::delete_many()
        .filter(deposit::Column::Id.is_in(ids.to_vec()))
        .exec(txn)
        .await?;

    let account = account_repo::find_profile_by_id(txn, group.account_id)
        .await?
        .account;
    let total = Amount::from_minor(group.amount.minor() * ids.len() as i64);
    if total > account.balance {
        warn!(
            "Duplicate cleanup on {} debits {} against a balance of {}; flooring at zero",
            account.client_number, total, account.balance
        );
    }
    let new_balance = account.balance.saturating_sub(total);
    let client_number = account.client_number.clone();
    let mut model: account::ActiveModel = account.into();
    model.balance = Set(new_balance);
    model.update(txn).await?;

    audit::append(
        txn,
        "duplicate_cleanup",
        operator,
        Some(client_number.as_str()),
        Some(format!(
            "removed: {}, debited: {}",
            result.rows_affected, total
        )),
    )
    .await?;

    info!(
        "Removed {} duplicate deposit row(s) from {}, debited {}",
        result.rows_affected, client_number, total
    );
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::records::insert_deposit;
    use crate::test_utils::*;
    use chrono::Utc;

    /// Plants `count` identical deposit rows and credits the balance for
    /// each, simulating an operator retry that slipped past the store.
    async fn plant_duplicates(
        store: &Store,
        account_id: i64,
        major: i64,
        count: usize,
    ) -> Result<DateTimeUtc> {
        let stamp = Utc::now();
        for i in 0..count {
            insert_deposit(
                store.connection(),
                account_id,
                Amount::from_major(major),
                format!("DUP-{account_id}-{i}"),
                "tester".to_string(),
                "cash".to_string(),
                stamp,
            )
            .await?;
            account_repo::apply_balance_delta(
                store.connection(),
                account_id,
                Amount::from_major(major),
                stamp,
            )
            .await?;
        }
        Ok(stamp)
    }

    #[tokio::test]
    async fn scan_finds_only_duplicated_groups() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_mixed(&store).await?;
        deposit_amount(&store, enrolled.account.id, 700).await?;
        plant_duplicates(&store, enrolled.account.id, 2_000, 3).await?;

        let groups = find_duplicates(&store).await?;
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].account_id, enrolled.account.id);
        assert_eq!(groups[0].amount, Amount::from_major(2_000));
        assert_eq!(groups[0].occurrences, 3);
        Ok(())
    }

    #[tokio::test]
    async fn keep_first_removes_extras_and_debits() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_mixed(&store).await?;
        plant_duplicates(&store, enrolled.account.id, 2_000, 3).await?;

        let group = find_duplicates(&store).await?.remove(0);
        let removed = remove_keeping_first(&store, &group, "admin").await?;
        assert_eq!(removed, 2);

        // One row survives and the balance matches it.
        let profile = get_profile(&store, enrolled.account.id).await?;
        assert_eq!(profile.account.balance, Amount::from_major(2_000));
        assert!(find_duplicates(&store).await?.is_empty());
        assert_eq!(
            crate::repo::records::recent_operations(
                store.connection(),
                enrolled.account.id,
                10
            )
            .await?
            .len(),
            1
        );
        Ok(())
    }

    #[tokio::test]
    async fn remove_all_purges_the_group_entirely() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_mixed(&store).await?;
        plant_duplicates(&store, enrolled.account.id, 1_500, 2).await?;

        let group = find_duplicates(&store).await?.remove(0);
        let removed = remove_all(&store, &group, "admin").await?;
        assert_eq!(removed, 2);

        let profile = get_profile(&store, enrolled.account.id).await?;
        assert_eq!(profile.account.balance, Amount::ZERO);
        assert!(
            crate::repo::records::recent_operations(
                store.connection(),
                enrolled.account.id,
                10
            )
            .await?
            .is_empty()
        );
        Ok(())
    }

    #[tokio::test]
    async fn cleanup_writes_a_journal_entry() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_mixed(&store).await?;
        plant_duplicates(&store, enrolled.account.id, 1_000, 2).await?;

        let group = find_duplicates(&store).await?.remove(0);
        remove_keeping_first(&store, &group, "admin").await?;

        let entries = crate::core::audit::recent(store.connection(), 5).await?;
        assert!(entries.iter().any(|e| e.action == "duplicate_cleanup"));
        Ok(())
    }
}
