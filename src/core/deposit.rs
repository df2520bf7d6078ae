//! Deposit rule engine - Validates and applies a deposit against an
//! account's kind-specific constraints.
//!
//! A deposit is one transaction: rule checks, booklet allocation (fixed
//! accounts), the balance credit, the deposit row and the journal entry
//! all commit together or not at all.

use crate::amount::Amount;
use crate::booklet;
use crate::entities::{AccountKind, AccountStatus, DepositModel};
use crate::errors::{Error, Result};
use crate::repo::{account as account_repo, booklet as booklet_repo, params, records};
use crate::store::Store;
use crate::core::audit;
use chrono::Utc;
use tracing::{info, instrument, warn};

/// Inputs to a deposit operation.
#[derive(Debug, Clone)]
pub struct DepositRequest {
    pub account_id: i64,
    pub amount: Amount,
    pub operator: String,
    /// How the money arrived ("cash", "mobile", ...)
    pub payment_method: String,
}

/// Validates and applies a deposit, returning the created record.
#[instrument(skip(store, request), fields(account_id = request.account_id, amount = %request.amount))]
pub async fn deposit(store: &Store, request: &DepositRequest) -> Result<DepositModel> {
    if !request.amount.is_positive() {
        return Err(Error::Validation {
            message: format!("deposit amount must be positive, got {}", request.amount),
        });
    }

    let txn = store.begin().await?;

    let profile = account_repo::find_profile_by_id(&txn, request.account_id).await?;
    if profile.account.status == AccountStatus::Blocked {
        return Err(Error::AccountBlocked {
            client_number: profile.account.client_number,
        });
    }

    match profile.account.kind {
        AccountKind::Mixed => {
            let minimum = params::min_deposit(&txn).await?;
            if request.amount < minimum {
                return Err(Error::BelowMinimumDeposit {
                    amount: request.amount,
                    minimum,
                });
            }
        }
        // Locked accounts only restrict withdrawals.
        AccountKind::Locked => {}
        AccountKind::Fixed => {
            let Some(unit) = profile.unit_amount() else {
                return Err(Error::Validation {
                    message: format!(
                        "fixed account {} has no unit amount configured",
                        profile.account.client_number
                    ),
                });
            };
            if !request.amount.is_multiple_of(unit) {
                warn!(
                    "Rejected fixed deposit of {}: not a multiple of {}",
                    request.amount, unit
                );
                return Err(Error::NotMultipleOfUnit {
                    amount: request.amount,
                    unit,
                });
            }
            let cases_to_add = request.amount.units_of(unit) as u32;

            let pages = booklet_repo::load_pages(&txn, request.account_id).await?;
            let allocation =
                booklet::allocate(&booklet_repo::page_fills(&pages), cases_to_add);
            if allocation.leftover > 0 {
                warn!(
                    "Rejected fixed deposit of {}: booklet full, {} case(s) over capacity",
                    request.amount, allocation.leftover
                );
                return Err(Error::BookletFull {
                    leftover_cases: allocation.leftover,
                });
            }
            booklet_repo::apply_allocation(&txn, request.account_id, &pages, &allocation)
                .await?;
        }
    }

    let now = Utc::now();
    let reference = records::generate_deposit_reference(&txn).await?;
    let record = records::insert_deposit(
        &txn,
        request.account_id,
        request.amount,
        reference,
        request.operator.clone(),
        request.payment_method.clone(),
        now,
    )
    .await?;

    account_repo::apply_balance_delta(&txn, request.account_id, request.amount, now).await?;

    audit::append(
        &txn,
        "deposit",
        &request.operator,
        Some(profile.account.client_number.as_str()),
        Some(format!(
            "amount: {}, ref: {}",
            request.amount, record.reference
        )),
    )
    .await?;

    txn.commit().await?;
    info!(
        "Deposit of {} credited to {} (ref {})",
        request.amount, profile.account.client_number, record.reference
    );
    Ok(record)
}
