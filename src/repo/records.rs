//! Operation records repository - Deposit and withdrawal rows plus
//! reference-code generation.

use crate::amount::Amount;
use crate::entities::{
    Deposit, DepositModel, Withdrawal, WithdrawalModel, WithdrawalStatus, deposit, withdrawal,
};
use crate::errors::{Error, Result};
use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, prelude::DateTimeUtc,
};

/// How many reference candidates are tried before giving up. Collisions
/// are rare (5-6 random digits per day-scoped namespace); hitting this
/// bound means the namespace is effectively exhausted.
const REFERENCE_ATTEMPTS: u32 = 100;

/// A deposit or withdrawal, merged for history listings.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Deposit(DepositModel),
    Withdrawal(WithdrawalModel),
}

impl Operation {
    pub fn recorded_at(&self) -> DateTimeUtc {
        match self {
            Self::Deposit(d) => d.recorded_at,
            Self::Withdrawal(w) => w.recorded_at,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::Deposit(d) => &d.reference,
            Self::Withdrawal(w) => &w.reference,
        }
    }
}

/// Inserts a deposit row.
pub async fn insert_deposit<C>(
    db: &C,
    account_id: i64,
    amount: Amount,
    reference: String,
    operator: String,
    payment_method: String,
    recorded_at: DateTimeUtc,
) -> Result<DepositModel>
where
    C: ConnectionTrait,
{
    let model = deposit::ActiveModel {
        account_id: Set(account_id),
        amount: Set(amount),
        reference: Set(reference),
        recorded_at: Set(recorded_at),
        operator: Set(operator),
        payment_method: Set(payment_method),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Inserts a withdrawal row capturing gross, commission and net.
#[allow(clippy::too_many_arguments)]
pub async fn insert_withdrawal<C>(
    db: &C,
    account_id: i64,
    gross_amount: Amount,
    commission: Amount,
    net_amount: Amount,
    reference: String,
    operator: String,
    recorded_at: DateTimeUtc,
) -> Result<WithdrawalModel>
where
    C: ConnectionTrait,
{
    let model = withdrawal::ActiveModel {
        account_id: Set(account_id),
        gross_amount: Set(gross_amount),
        commission: Set(commission),
        net_amount: Set(net_amount),
        reference: Set(reference),
        recorded_at: Set(recorded_at),
        operator: Set(operator),
        status: Set(WithdrawalStatus::Completed),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Generates an unused deposit reference of the form `DEPyyyymmdd-NNNNN`.
pub async fn generate_deposit_reference<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..REFERENCE_ATTEMPTS {
        let candidate = deposit_reference_candidate();
        let taken = Deposit::find()
            .filter(deposit::Column::Reference.eq(&candidate))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
    }
    Err(Error::Validation {
        message: "could not generate an unused deposit reference".to_string(),
    })
}

/// Generates an unused withdrawal reference of the form `RNNNNNN`.
pub async fn generate_withdrawal_reference<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..REFERENCE_ATTEMPTS {
        let candidate = withdrawal_reference_candidate();
        let taken = Withdrawal::find()
            .filter(withdrawal::Column::Reference.eq(&candidate))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
    }
    Err(Error::Validation {
        message: "could not generate an unused withdrawal reference".to_string(),
    })
}

fn deposit_reference_candidate() -> String {
    let serial = rand::thread_rng().gen_range(10_000..=99_999);
    format!("DEP{}-{}", Utc::now().format("%Y%m%d"), serial)
}

fn withdrawal_reference_candidate() -> String {
    format!("R{}", rand::thread_rng().gen_range(100_000..=999_999))
}

/// The most recent deposits and withdrawals of an account, newest first,
/// truncated to `limit`.
pub async fn recent_operations<C>(
    db: &C,
    account_id: i64,
    limit: u64,
) -> Result<Vec<Operation>>
where
    C: ConnectionTrait,
{
    let deposits = Deposit::find()
        .filter(deposit::Column::AccountId.eq(account_id))
        .order_by_desc(deposit::Column::RecordedAt)
        .limit(limit)
        .all(db)
        .await?;
    let withdrawals = Withdrawal::find()
        .filter(withdrawal::Column::AccountId.eq(account_id))
        .order_by_desc(withdrawal::Column::RecordedAt)
        .limit(limit)
        .all(db)
        .await?;

    let mut operations: Vec<Operation> = deposits
        .into_iter()
        .map(Operation::Deposit)
        .chain(withdrawals.into_iter().map(Operation::Withdrawal))
        .collect();
    operations.sort_by_key(|op| std::cmp::Reverse(op.recorded_at()));
    operations.truncate(limit as usize);
    Ok(operations)
}

/// Removes every deposit row of an account (administrative reset).
pub async fn delete_deposits_for_account<C>(db: &C, account_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Deposit::delete_many()
        .filter(deposit::Column::AccountId.eq(account_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Removes every withdrawal row of an account (administrative reset).
pub async fn delete_withdrawals_for_account<C>(db: &C, account_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Withdrawal::delete_many()
        .filter(withdrawal::Column::AccountId.eq(account_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
