//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Every operation runs inside a tenant-scoped transaction.

pub mod account;
pub mod balance;
pub mod counter;
pub mod error;
pub mod fiscal;
pub mod report;
pub mod voucher;

pub use account::AccountRepository;
pub use balance::BalanceRepository;
pub use error::RepositoryError;
pub use fiscal::FiscalRepository;
pub use report::ReportRepository;
pub use voucher::{VoucherFilter, VoucherRepository, VoucherWithLines};
