//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod accounts;
pub mod balances;
pub mod fiscal;
pub mod health;
pub mod reports;
pub mod vouchers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(accounts::routes())
        .merge(vouchers::routes())
        .merge(fiscal::routes())
        .merge(reports::routes())
        .merge(balances::routes())
}
