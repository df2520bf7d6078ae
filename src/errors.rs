//! Unified error types and result handling.
//!
//! Rule violations carry the corrected boundary value whenever one can be
//! computed (maximum withdrawable amount, unplaceable case count) so the
//! caller can present it without re-deriving ledger state.

use crate::amount::Amount;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Account not found: {identifier}")]
    NotFound { identifier: String },

    #[error("Account {client_number} is blocked")]
    AccountBlocked { client_number: String },

    #[error("Deposit of {amount} is below the minimum deposit of {minimum}")]
    BelowMinimumDeposit { amount: Amount, minimum: Amount },

    #[error("Withdrawal of {amount} is below the minimum withdrawal of {minimum}")]
    BelowMinimumWithdrawal { amount: Amount, minimum: Amount },

    #[error("Amount {amount} is not a multiple of the unit amount {unit}")]
    NotMultipleOfUnit { amount: Amount, unit: Amount },

    #[error("Booklet is full: {leftover_cases} case(s) could not be placed")]
    BookletFull { leftover_cases: u32 },

    #[error("Insufficient funds: balance is {balance}, {requested} required")]
    InsufficientFunds { balance: Amount, requested: Amount },

    #[error("Requested {requested} exceeds the maximum withdrawable amount of {max}")]
    MaxWithdrawalExceeded { requested: Amount, max: Amount },

    #[error("Balance {balance} has not reached the target amount {target}")]
    TargetNotReached { balance: Amount, target: Amount },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Store unavailable after {attempts} attempt(s)\n{diagnostic}")]
    StoreUnavailable { attempts: u32, diagnostic: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
