//! Enrollment - Creates a member account together with its kind-specific
//! plan, all in one transaction.
//!
//! Client numbers (4 digits) and card numbers (10 digits) are drawn at
//! random and probed against the store until an unused pair is found,
//! the way the cooperative's paper forms were numbered.

use crate::amount::Amount;
use crate::entities::{AccountKind, AccountStatus, account, fixed_plan, locked_plan};
use crate::errors::{Error, Result};
use crate::repo::account::{AccountPlan, AccountProfile, card_number_taken, client_number_taken};
use crate::store::Store;
use crate::core::audit;
use chrono::{Months, Utc};
use rand::Rng;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use tracing::{info, instrument};

const NUMBER_ATTEMPTS: u32 = 1_000;

/// Kind-specific enrollment inputs.
#[derive(Debug, Clone)]
pub enum KindRequest {
    /// Booklet account with its per-case unit amount.
    Fixed { unit_amount: Amount },
    Mixed,
    /// Savings-goal account.
    Locked {
        target_amount: Amount,
        withdrawal_percent: u32,
        withdrawal_frequency: String,
    },
}

/// Everything the enrollment form collects.
#[derive(Debug, Clone)]
pub struct EnrollmentForm {
    pub surname: String,
    pub middle_name: Option<String>,
    pub given_name: Option<String>,
    pub gender: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub deputy_name: Option<String>,
    pub deputy_contact: Option<String>,
    pub kind: KindRequest,
    pub operator: String,
}

/// Enrolls a new member and returns the created account with its plan.
#[instrument(skip(store, form), fields(operator = %form.operator))]
pub async fn enroll(store: &Store, form: EnrollmentForm) -> Result<AccountProfile> {
    validate(&form)?;

    let txn = store.begin().await?;

    let client_number = unused_client_number(&txn).await?;
    let card_number = unused_card_number(&txn).await?;

    let kind = match form.kind {
        KindRequest::Fixed { .. } => AccountKind::Fixed,
        KindRequest::Mixed => AccountKind::Mixed,
        KindRequest::Locked { .. } => AccountKind::Locked,
    };

    let account = account::ActiveModel {
        client_number: Set(client_number.clone()),
        card_number: Set(card_number),
        surname: Set(form.surname.trim().to_string()),
        middle_name: Set(form.middle_name),
        given_name: Set(form.given_name),
        gender: Set(form.gender),
        phone: Set(form.phone.trim().to_string()),
        address: Set(form.address),
        deputy_name: Set(form.deputy_name),
        deputy_contact: Set(form.deputy_contact),
        kind: Set(kind),
        balance: Set(Amount::ZERO),
        status: Set(AccountStatus::Active),
        enrolled_at: Set(Utc::now()),
        last_operation_at: Set(None),
        ..Default::default()
    };
    let account = account.insert(&txn).await?;

    let plan = match form.kind {
        KindRequest::Fixed { unit_amount } => {
            let start_date = Utc::now().date_naive();
            let end_date = start_date
                .checked_add_months(Months::new(12))
                .unwrap_or(start_date);
            let plan = fixed_plan::ActiveModel {
                account_id: Set(account.id),
                unit_amount: Set(unit_amount),
                start_date: Set(start_date),
                end_date: Set(end_date),
                ..Default::default()
            };
            AccountPlan::Fixed(plan.insert(&txn).await?)
        }
        KindRequest::Mixed => AccountPlan::Mixed,
        KindRequest::Locked {
            target_amount,
            withdrawal_percent,
            withdrawal_frequency,
        } => {
            let plan = locked_plan::ActiveModel {
                account_id: Set(account.id),
                target_amount: Set(target_amount),
                withdrawal_percent: Set(withdrawal_percent),
                withdrawal_frequency: Set(withdrawal_frequency),
                ..Default::default()
            };
            AccountPlan::Locked(plan.insert(&txn).await?)
        }
    };

    audit::append(
        &txn,
        "enrollment",
        &form.operator,
        Some(client_number.as_str()),
        Some(format!("kind: {kind:?}")),
    )
    .await?;

    txn.commit().await?;
    info!(
        "Enrolled member {} ({:?} account)",
        account.client_number, account.kind
    );
    Ok(AccountProfile { account, plan })
}

fn validate(form: &EnrollmentForm) -> Result<()> {
    if form.surname.trim().is_empty() {
        return Err(Error::Validation {
            message: "surname cannot be empty".to_string(),
        });
    }
    if form.phone.trim().is_empty() {
        return Err(Error::Validation {
            message: "phone number cannot be empty".to_string(),
        });
    }
    match &form.kind {
        KindRequest::Fixed { unit_amount } => {
            if !unit_amount.is_positive() {
                return Err(Error::Validation {
                    message: "unit amount must be positive".to_string(),
                });
            }
        }
        KindRequest::Mixed => {}
        KindRequest::Locked {
            target_amount,
            withdrawal_percent,
            ..
        } => {
            if !target_amount.is_positive() {
                return Err(Error::Validation {
                    message: "target amount must be positive".to_string(),
                });
            }
            if !(1..=100).contains(withdrawal_percent) {
                return Err(Error::Validation {
                    message: format!(
                        "withdrawal percent must be between 1 and 100, got {withdrawal_percent}"
                    ),
                });
            }
        }
    }
    Ok(())
}

async fn unused_client_number<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..NUMBER_ATTEMPTS {
        let candidate = { rand::thread_rng().gen_range(1_000..=9_999) }.to_string();
        if !client_number_taken(db, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(Error::Validation {
        message: "no unused client number available".to_string(),
    })
}

async fn unused_card_number<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for _ in 0..NUMBER_ATTEMPTS {
        let candidate = { rand::thread_rng().gen_range(1_000_000_000_u64..=9_999_999_999) }.to_string();
        if !card_number_taken(db, &candidate).await? {
            return Ok(candidate);
        }
    }
    Err(Error::Validation {
        message: "no unused card number available".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn enroll_fixed_creates_account_and_plan() -> Result<()> {
        let store = setup_test_store().await?;
        let profile = enroll_test_fixed(&store, 5_000).await?;

        assert_eq!(profile.account.kind, AccountKind::Fixed);
        assert_eq!(profile.account.balance, Amount::ZERO);
        assert_eq!(profile.account.status, AccountStatus::Active);
        assert_eq!(profile.account.client_number.len(), 4);
        assert_eq!(profile.account.card_number.len(), 10);
        assert_eq!(profile.unit_amount(), Some(Amount::from_major(5_000)));

        match &profile.plan {
            AccountPlan::Fixed(plan) => {
                assert!(plan.end_date > plan.start_date);
            }
            other => panic!("expected fixed plan, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn enroll_locked_stores_goal_settings() -> Result<()> {
        let store = setup_test_store().await?;
        let profile = enroll_test_locked(&store, 100_000, 30).await?;

        let plan = profile.locked_plan().expect("locked plan");
        assert_eq!(plan.target_amount, Amount::from_major(100_000));
        assert_eq!(plan.withdrawal_percent, 30);
        assert_eq!(plan.withdrawal_frequency, "monthly");
        Ok(())
    }

    #[tokio::test]
    async fn enrollment_writes_a_journal_entry() -> Result<()> {
        let store = setup_test_store().await?;
        let profile = enroll_test_mixed(&store).await?;

        let entries = crate::core::audit::recent(store.connection(), 5).await?;
        assert!(entries.iter().any(|e| {
            e.action == "enrollment"
                && e.target.as_deref() == Some(profile.account.client_number.as_str())
        }));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_blank_surname() -> Result<()> {
        let store = setup_test_store().await?;
        let mut form = test_enrollment_form(KindRequest::Mixed);
        form.surname = "   ".to_string();
        let result = enroll(&store, form).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_non_positive_unit_amount() -> Result<()> {
        let store = setup_test_store().await?;
        let form = test_enrollment_form(KindRequest::Fixed {
            unit_amount: Amount::ZERO,
        });
        let result = enroll(&store, form).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_out_of_range_withdrawal_percent() -> Result<()> {
        let store = setup_test_store().await?;
        let form = test_enrollment_form(KindRequest::Locked {
            target_amount: Amount::from_major(50_000),
            withdrawal_percent: 150,
            withdrawal_frequency: "monthly".to_string(),
        });
        let result = enroll(&store, form).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn generated_numbers_are_distinct_across_enrollments() -> Result<()> {
        let store = setup_test_store().await?;
        let first = enroll_test_mixed(&store).await?;
        let second = enroll_test_mixed(&store).await?;
        assert_ne!(first.account.client_number, second.account.client_number);
        assert_ne!(first.account.card_number, second.account.card_number);
        Ok(())
    }
}
