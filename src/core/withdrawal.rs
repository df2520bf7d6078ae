//! Withdrawal rule engine - Validates and applies a withdrawal, computing
//! commissions, interest and shortfall ceilings per account kind.
//!
//! Two modes exist. A partial withdrawal debits an arbitrary sub-amount;
//! a global withdrawal liquidates the balance under a kind-specific
//! payout formula. Whenever a request fails on a computable boundary the
//! error carries the corrected ceiling (maximum withdrawable amount)
//! instead of silently truncating.

use crate::amount::Amount;
use crate::entities::{AccountKind, AccountStatus, WithdrawalModel};
use crate::errors::{Error, Result};
use crate::repo::account::AccountProfile;
use crate::repo::{account as account_repo, params, records};
use crate::store::Store;
use crate::core::audit;
use chrono::Utc;
use sea_orm::DatabaseTransaction;
use tracing::{info, instrument, warn};

/// Kind-specific payout formula for a global withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalPayout {
    /// Whole balance paid out, one unit amount retained as commission.
    Fixed,
    /// The member requests a net amount; interest is added on top of it.
    Mixed { net_amount: Amount },
    /// Reserved by the payout selector but never defined by the
    /// cooperative; always rejected.
    Locked,
}

/// What the member asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalMode {
    Partial { amount: Amount },
    Global(GlobalPayout),
}

/// Inputs to a withdrawal operation.
#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    pub account_id: i64,
    pub mode: WithdrawalMode,
    pub operator: String,
}

/// The amounts a settled withdrawal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settlement {
    gross: Amount,
    commission: Amount,
    net: Amount,
}

/// Validates and applies a withdrawal, returning the created record.
#[instrument(skip(store, request), fields(account_id = request.account_id))]
pub async fn withdraw(store: &Store, request: &WithdrawalRequest) -> Result<WithdrawalModel> {
    let txn = store.begin().await?;

    let profile = account_repo::find_profile_by_id(&txn, request.account_id).await?;
    if profile.account.status == AccountStatus::Blocked {
        return Err(Error::AccountBlocked {
            client_number: profile.account.client_number,
        });
    }

    let settlement = settle(&txn, &profile, request.mode).await?;

    // Universal backstop: a settlement never debits more than the balance.
    if settlement.gross > profile.account.balance {
        return Err(Error::InsufficientFunds {
            balance: profile.account.balance,
            requested: settlement.gross,
        });
    }

    let now = Utc::now();
    let reference = records::generate_withdrawal_reference(&txn).await?;
    let record = records::insert_withdrawal(
        &txn,
        request.account_id,
        settlement.gross,
        settlement.commission,
        settlement.net,
        reference,
        request.operator.clone(),
        now,
    )
    .await?;

    account_repo::apply_balance_delta(&txn, request.account_id, -settlement.gross, now).await?;

    audit::append(
        &txn,
        "withdrawal",
        &request.operator,
        Some(profile.account.client_number.as_str()),
        Some(format!(
            "gross: {}, commission: {}, net: {}, ref: {}",
            settlement.gross, settlement.commission, settlement.net, record.reference
        )),
    )
    .await?;

    txn.commit().await?;
    info!(
        "Withdrawal of {} (net {}) debited from {} (ref {})",
        settlement.gross, settlement.net, profile.account.client_number, record.reference
    );
    Ok(record)
}

/// Applies the kind- and mode-specific rules and computes the amounts to
/// move. Pure with respect to ledger state except for parameter reads.
async fn settle(
    txn: &DatabaseTransaction,
    profile: &AccountProfile,
    mode: WithdrawalMode,
) -> Result<Settlement> {
    let balance = profile.account.balance;

    match mode {
        WithdrawalMode::Partial { amount } => {
            if !amount.is_positive() {
                return Err(Error::Validation {
                    message: format!("withdrawal amount must be positive, got {amount}"),
                });
            }
            let minimum = params::min_withdrawal(txn).await?;
            if amount < minimum {
                return Err(Error::BelowMinimumWithdrawal { amount, minimum });
            }

            match profile.account.kind {
                AccountKind::Fixed => {
                    let Some(unit) = profile.unit_amount() else {
                        return Err(Error::Validation {
                            message: format!(
                                "fixed account {} has no unit amount configured",
                                profile.account.client_number
                            ),
                        });
                    };
                    // The account must retain at least one unit.
                    if balance - amount < unit {
                        let max = balance.saturating_sub(unit);
                        warn!(
                            "Rejected fixed partial withdrawal of {}: at most {} available",
                            amount, max
                        );
                        return Err(Error::MaxWithdrawalExceeded {
                            requested: amount,
                            max,
                        });
                    }
                }
                AccountKind::Mixed => {}
                AccountKind::Locked => {
                    let Some(plan) = profile.locked_plan() else {
                        return Err(Error::Validation {
                            message: format!(
                                "locked account {} has no locked plan configured",
                                profile.account.client_number
                            ),
                        });
                    };
                    if balance < plan.target_amount {
                        return Err(Error::TargetNotReached {
                            balance,
                            target: plan.target_amount,
                        });
                    }
                    let cap = balance.percent(plan.withdrawal_percent);
                    if amount > cap {
                        return Err(Error::MaxWithdrawalExceeded {
                            requested: amount,
                            max: cap,
                        });
                    }
                }
            }

            Ok(Settlement {
                gross: amount,
                commission: Amount::ZERO,
                net: amount,
            })
        }

        WithdrawalMode::Global(payout) => match payout {
            GlobalPayout::Fixed => {
                if profile.account.kind != AccountKind::Fixed {
                    return Err(Error::Validation {
                        message: "the fixed global payout applies to fixed accounts only"
                            .to_string(),
                    });
                }
                let Some(unit) = profile.unit_amount() else {
                    return Err(Error::Validation {
                        message: format!(
                            "fixed account {} has no unit amount configured",
                            profile.account.client_number
                        ),
                    });
                };
                if balance < unit {
                    return Err(Error::InsufficientFunds {
                        balance,
                        requested: unit,
                    });
                }
                Ok(Settlement {
                    gross: balance,
                    commission: unit,
                    net: balance - unit,
                })
            }

            GlobalPayout::Mixed { net_amount } => {
                if profile.account.kind != AccountKind::Mixed {
                    return Err(Error::Validation {
                        message: "the mixed global payout applies to mixed accounts only"
                            .to_string(),
                    });
                }
                if !net_amount.is_positive() {
                    return Err(Error::Validation {
                        message: format!(
                            "withdrawal amount must be positive, got {net_amount}"
                        ),
                    });
                }
                let minimum = params::min_withdrawal(txn).await?;
                if net_amount < minimum {
                    return Err(Error::BelowMinimumWithdrawal {
                        amount: net_amount,
                        minimum,
                    });
                }

                let rate_bp = params::interest_rate_bp(txn).await?;
                let commission = net_amount.interest_at(rate_bp);
                let gross = net_amount + commission;
                if gross > balance {
                    let max = balance.max_request_at(rate_bp);
                    warn!(
                        "Rejected mixed global withdrawal of {}: at most {} can be requested",
                        net_amount, max
                    );
                    return Err(Error::MaxWithdrawalExceeded {
                        requested: net_amount,
                        max,
                    });
                }
                Ok(Settlement {
                    gross,
                    commission,
                    net: net_amount,
                })
            }

            GlobalPayout::Locked => Err(Error::Validation {
                message: "the locked global payout is not defined; contact the administrator"
                    .to_string(),
            }),
        },
    }
}
