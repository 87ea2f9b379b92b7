//! Core business logic for Defter.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `chart` - Hierarchical chart of accounts
//! - `ledger` - Double-entry vouchers, numbering, and balance aggregation
//! - `fiscal` - Fiscal periods, date locking, and finalization sequencing
//! - `reports` - Journal book, trial balance, and export readiness

pub mod chart;
pub mod fiscal;
pub mod ledger;
pub mod reports;
