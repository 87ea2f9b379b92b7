//! `SeaORM` entity definitions for the ledger tables.

pub mod accounts;
pub mod convert;
pub mod fiscal_periods;
pub mod sea_orm_active_enums;
pub mod voucher_counters;
pub mod voucher_lines;
pub mod vouchers;

/// Commonly used entity types.
pub mod prelude {
    pub use super::accounts::Entity as Accounts;
    pub use super::fiscal_periods::Entity as FiscalPeriods;
    pub use super::voucher_counters::Entity as VoucherCounters;
    pub use super::voucher_lines::Entity as VoucherLines;
    pub use super::vouchers::Entity as Vouchers;
}
