//! Account repository - Loads and mutates account rows together with
//! their kind-specific plan rows.

use crate::amount::Amount;
use crate::entities::{
    Account, AccountKind, FixedPlan, FixedPlanModel, LockedPlan, LockedPlanModel, account,
    fixed_plan, locked_plan,
};
use crate::errors::{Error, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, prelude::DateTimeUtc};
use tracing::debug;

/// How a collaborator identifies an account.
#[derive(Debug, Clone, Copy)]
pub enum AccountLookup<'a> {
    ClientNumber(&'a str),
    CardNumber(&'a str),
}

impl AccountLookup<'_> {
    fn identifier(&self) -> &str {
        match self {
            Self::ClientNumber(n) | Self::CardNumber(n) => n,
        }
    }
}

/// The kind-specific extension of an account.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountPlan {
    Fixed(FixedPlanModel),
    Mixed,
    Locked(LockedPlanModel),
}

/// An account joined with its plan, built once at the repository boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountProfile {
    pub account: account::Model,
    pub plan: AccountPlan,
}

impl AccountProfile {
    /// The booklet unit amount, for fixed accounts.
    pub fn unit_amount(&self) -> Option<Amount> {
        match &self.plan {
            AccountPlan::Fixed(plan) => Some(plan.unit_amount),
            _ => None,
        }
    }

    /// The locked plan, for locked accounts.
    pub fn locked_plan(&self) -> Option<&LockedPlanModel> {
        match &self.plan {
            AccountPlan::Locked(plan) => Some(plan),
            _ => None,
        }
    }
}

/// Finds an account row by client or card number.
pub async fn find_account<C>(
    db: &C,
    lookup: AccountLookup<'_>,
) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    let query = match lookup {
        AccountLookup::ClientNumber(n) => {
            Account::find().filter(account::Column::ClientNumber.eq(n))
        }
        AccountLookup::CardNumber(n) => Account::find().filter(account::Column::CardNumber.eq(n)),
    };
    query.one(db).await.map_err(Into::into)
}

/// Loads the full profile for an account identified by client or card
/// number. Fails with `NotFound` for unknown identifiers.
pub async fn find_profile<C>(db: &C, lookup: AccountLookup<'_>) -> Result<AccountProfile>
where
    C: ConnectionTrait,
{
    let account = find_account(db, lookup)
        .await?
        .ok_or_else(|| Error::NotFound {
            identifier: lookup.identifier().to_string(),
        })?;
    load_plan(db, account).await
}

/// Loads the full profile for an account identified by primary key.
pub async fn find_profile_by_id<C>(db: &C, account_id: i64) -> Result<AccountProfile>
where
    C: ConnectionTrait,
{
    let account = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            identifier: account_id.to_string(),
        })?;
    load_plan(db, account).await
}

/// Joins the kind-specific plan row onto an account row. A fixed or
/// locked account without its plan row is a corrupt enrollment and is
/// reported as a validation error rather than a panic.
async fn load_plan<C>(db: &C, account: account::Model) -> Result<AccountProfile>
where
    C: ConnectionTrait,
{
    let plan = match account.kind {
        AccountKind::Mixed => AccountPlan::Mixed,
        AccountKind::Fixed => {
            let plan = FixedPlan::find()
                .filter(fixed_plan::Column::AccountId.eq(account.id))
                .one(db)
                .await?
                .ok_or_else(|| Error::Validation {
                    message: format!(
                        "fixed account {} has no fixed plan configured",
                        account.client_number
                    ),
                })?;
            AccountPlan::Fixed(plan)
        }
        AccountKind::Locked => {
            let plan = LockedPlan::find()
                .filter(locked_plan::Column::AccountId.eq(account.id))
                .one(db)
                .await?
                .ok_or_else(|| Error::Validation {
                    message: format!(
                        "locked account {} has no locked plan configured",
                        account.client_number
                    ),
                })?;
            AccountPlan::Locked(plan)
        }
    };
    Ok(AccountProfile { account, plan })
}

/// Whether a client number is already assigned.
pub async fn client_number_taken<C>(db: &C, client_number: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_account(db, AccountLookup::ClientNumber(client_number))
        .await?
        .is_some())
}

/// Whether a card number is already assigned.
pub async fn card_number_taken<C>(db: &C, card_number: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_account(db, AccountLookup::CardNumber(card_number))
        .await?
        .is_some())
}

/// Applies a balance delta at the database level and stamps the
/// last-operation timestamp.
///
/// A single `UPDATE account SET balance = balance + delta` avoids the
/// read-modify-write window that loses updates under concurrent writers.
/// Returns the account as it stands after the update.
pub async fn apply_balance_delta<C>(
    db: &C,
    account_id: i64,
    delta: Amount,
    operated_at: DateTimeUtc,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).add(delta),
        )
        .col_expr(
            account::Column::LastOperationAt,
            Expr::value(Some(operated_at)),
        )
        .filter(account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    let updated = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::NotFound {
            identifier: account_id.to_string(),
        })?;
    debug!(
        "Balance of account {} moved by {} to {}",
        updated.client_number, delta, updated.balance
    );
    Ok(updated)
}
