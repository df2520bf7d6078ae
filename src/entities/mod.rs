//! Entity module - Contains all SeaORM entity definitions for the ledger
//! tables. Each entity has a Model struct for data and an Entity struct
//! for operations.

pub mod account;
pub mod booklet_page;
pub mod deposit;
pub mod fixed_plan;
pub mod journal;
pub mod locked_plan;
pub mod parameter;
pub mod withdrawal;

// Re-export specific types to avoid conflicts
pub use account::{
    AccountKind, AccountStatus, Column as AccountColumn, Entity as Account, Model as AccountModel,
};
pub use booklet_page::{
    Column as BookletPageColumn, Entity as BookletPage, Model as BookletPageModel,
};
pub use deposit::{Column as DepositColumn, Entity as Deposit, Model as DepositModel};
pub use fixed_plan::{Column as FixedPlanColumn, Entity as FixedPlan, Model as FixedPlanModel};
pub use journal::{Column as JournalColumn, Entity as Journal, Model as JournalModel};
pub use locked_plan::{Column as LockedPlanColumn, Entity as LockedPlan, Model as LockedPlanModel};
pub use parameter::{Column as ParameterColumn, Entity as Parameter, Model as ParameterModel};
pub use withdrawal::{
    Column as WithdrawalColumn, Entity as Withdrawal, Model as WithdrawalModel, WithdrawalStatus,
};
