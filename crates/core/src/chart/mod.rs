//! Chart of accounts.
//!
//! - Dot-hierarchical account codes with numeric-aware ordering
//! - Classification and balance-nature metadata
//! - An arena of accounts enforcing hierarchy rules on every edit

pub mod code;
pub mod error;
pub mod tree;
pub mod types;

pub use code::AccountCode;
pub use error::ChartError;
pub use tree::ChartOfAccounts;
pub use types::{Account, AccountChanges, BalanceNature, Classification, NewAccount, SpecialRole};
