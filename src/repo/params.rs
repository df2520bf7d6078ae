//! Parameter repository - Typed access to the operational settings the
//! rule engines read: interest rate, minimum deposit, minimum withdrawal.
//!
//! Values live in the `parameter` table so they travel with the data
//! store; each rule engine reads them inside its own transaction. Missing
//! keys fall back to the reference defaults.

use crate::amount::Amount;
use crate::entities::{Parameter, parameter};
use crate::errors::{Error, Result};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::info;

pub const INTEREST_RATE_KEY: &str = "interest_rate_percent";
pub const MIN_DEPOSIT_KEY: &str = "min_deposit";
pub const MIN_WITHDRAWAL_KEY: &str = "min_withdrawal";

const DEFAULT_INTEREST_RATE_BP: u32 = 500;
const DEFAULT_MIN_DEPOSIT: Amount = Amount::from_major(500);
const DEFAULT_MIN_WITHDRAWAL: Amount = Amount::from_major(1_000);

/// Reads a raw parameter value.
pub async fn get_parameter<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    Ok(Parameter::find_by_id(key)
        .one(db)
        .await?
        .map(|row| row.value))
}

/// Writes a parameter value, inserting the key if it does not exist.
/// Keys flagged immutable are refused.
pub async fn set_parameter<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    match Parameter::find_by_id(key).one(db).await? {
        Some(row) if !row.mutable => Err(Error::Validation {
            message: format!("parameter {key} is not modifiable"),
        }),
        Some(row) => {
            let mut model: parameter::ActiveModel = row.into();
            model.value = Set(value.to_string());
            model.update(db).await?;
            info!("Parameter {} set to {}", key, value);
            Ok(())
        }
        None => {
            let model = parameter::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                description: Set(None),
                mutable: Set(true),
            };
            model.insert(db).await?;
            info!("Parameter {} created with value {}", key, value);
            Ok(())
        }
    }
}

/// The minimum accepted deposit for mixed accounts.
pub async fn min_deposit<C>(db: &C) -> Result<Amount>
where
    C: ConnectionTrait,
{
    amount_parameter(db, MIN_DEPOSIT_KEY, DEFAULT_MIN_DEPOSIT).await
}

/// The minimum accepted withdrawal for partial and mixed-global requests.
pub async fn min_withdrawal<C>(db: &C) -> Result<Amount>
where
    C: ConnectionTrait,
{
    amount_parameter(db, MIN_WITHDRAWAL_KEY, DEFAULT_MIN_WITHDRAWAL).await
}

/// The interest rate applied to mixed-account withdrawals, in basis
/// points. Stored as a percentage string ("5.0").
pub async fn interest_rate_bp<C>(db: &C) -> Result<u32>
where
    C: ConnectionTrait,
{
    let Some(raw) = get_parameter(db, INTEREST_RATE_KEY).await? else {
        return Ok(DEFAULT_INTEREST_RATE_BP);
    };
    let percent: f64 = raw.parse().map_err(|_| Error::Config {
        message: format!("parameter {INTEREST_RATE_KEY} is not a number: {raw}"),
    })?;
    if !(0.0..=100.0).contains(&percent) {
        return Err(Error::Config {
            message: format!("parameter {INTEREST_RATE_KEY} out of range: {raw}"),
        });
    }
    Ok((percent * 100.0).round() as u32)
}

async fn amount_parameter<C>(db: &C, key: &str, default: Amount) -> Result<Amount>
where
    C: ConnectionTrait,
{
    let Some(raw) = get_parameter(db, key).await? else {
        return Ok(default);
    };
    let major: i64 = raw.parse().map_err(|_| Error::Config {
        message: format!("parameter {key} is not a whole amount: {raw}"),
    })?;
    Ok(Amount::from_major(major))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn seeded_defaults_parse_to_typed_values() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();

        assert_eq!(min_deposit(db).await?, Amount::from_major(500));
        assert_eq!(min_withdrawal(db).await?, Amount::from_major(1_000));
        assert_eq!(interest_rate_bp(db).await?, 500);
        Ok(())
    }

    #[tokio::test]
    async fn set_parameter_updates_mutable_keys() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();

        set_parameter(db, MIN_DEPOSIT_KEY, "750").await?;
        assert_eq!(min_deposit(db).await?, Amount::from_major(750));

        set_parameter(db, INTEREST_RATE_KEY, "7.5").await?;
        assert_eq!(interest_rate_bp(db).await?, 750);
        Ok(())
    }

    #[tokio::test]
    async fn set_parameter_refuses_immutable_keys() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();

        let result = set_parameter(db, "busy_timeout_secs", "60").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_rate_is_a_config_error() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();

        set_parameter(db, INTEREST_RATE_KEY, "five percent").await?;
        let result = interest_rate_bp(db).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }
}
