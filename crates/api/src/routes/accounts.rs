//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use defter_core::chart::{Account, AccountChanges, NewAccount};
use defter_db::AccountRepository;
use defter_shared::types::AccountId;

use crate::{AppState, error::ApiError, middleware::TenantContext};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{account_id}",
            get(get_account).patch(update_account).delete(delete_account),
        )
}

/// Query parameters for listing accounts.
#[derive(Debug, Default, Deserialize)]
pub struct ListAccountsQuery {
    /// Only the account with exactly this code.
    pub code: Option<String>,
    /// Only this account and the accounts beneath it.
    pub prefix: Option<String>,
}

/// How an account listing is narrowed.
#[derive(Debug, PartialEq, Eq)]
enum AccountLookup<'a> {
    All,
    Code(&'a str),
    Prefix(&'a str),
}

impl ListAccountsQuery {
    fn lookup(&self) -> Result<AccountLookup<'_>, ApiError> {
        match (self.code.as_deref(), self.prefix.as_deref()) {
            (None, None) => Ok(AccountLookup::All),
            (Some(code), None) => Ok(AccountLookup::Code(code)),
            (None, Some(prefix)) => Ok(AccountLookup::Prefix(prefix)),
            (Some(_), Some(_)) => Err(ApiError::validation("use either code or prefix, not both")),
        }
    }
}

/// Response for an account listing.
#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    /// Accounts in code order.
    pub accounts: Vec<Account>,
}

/// GET `/accounts` - List the tenant's chart in code order.
///
/// `?code=` resolves one account by its code (404 when unknown) and
/// `?prefix=` lists a subtree of the hierarchy.
async fn list_accounts(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<ListAccountsQuery>,
) -> Result<Json<AccountListResponse>, ApiError> {
    let repo = AccountRepository::new(state.conn());
    let accounts = match query.lookup()? {
        AccountLookup::All => repo.list(tenant_id).await?,
        AccountLookup::Code(code) => vec![repo.find_by_code(tenant_id, code).await?],
        AccountLookup::Prefix(prefix) => repo.find_by_prefix(tenant_id, prefix).await?,
    };
    Ok(Json(AccountListResponse { accounts }))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<NewAccount>,
) -> Result<impl IntoResponse, ApiError> {
    let account = AccountRepository::new(state.conn()).create(tenant_id, payload).await?;
    info!(tenant_id = %tenant_id, account_id = %account.id, code = %account.code, "Account created via API");
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{account_id}` - Get one account with its cached totals.
async fn get_account(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(account_id): Path<AccountId>,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(state.conn()).get(tenant_id, account_id).await?;
    Ok(Json(account))
}

/// PATCH `/accounts/{account_id}` - Change code, name, parent, classification, nature, role, or active flag.
async fn update_account(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(account_id): Path<AccountId>,
    Json(payload): Json<AccountChanges>,
) -> Result<Json<Account>, ApiError> {
    let account = AccountRepository::new(state.conn())
        .update(tenant_id, account_id, payload)
        .await?;
    Ok(Json(account))
}

/// DELETE `/accounts/{account_id}` - Delete an account without children or postings.
async fn delete_account(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(account_id): Path<AccountId>,
) -> Result<StatusCode, ApiError> {
    AccountRepository::new(state.conn()).delete(tenant_id, account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(value: serde_json::Value) -> ListAccountsQuery {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lookup_from_query() {
        assert_eq!(query(serde_json::json!({})).lookup().unwrap(), AccountLookup::All);
        assert_eq!(
            query(serde_json::json!({ "code": "120.01" })).lookup().unwrap(),
            AccountLookup::Code("120.01")
        );
        assert_eq!(
            query(serde_json::json!({ "prefix": "120" })).lookup().unwrap(),
            AccountLookup::Prefix("120")
        );
    }

    #[test]
    fn test_code_and_prefix_together_rejected() {
        let err = query(serde_json::json!({ "code": "120.01", "prefix": "120" }))
            .lookup()
            .unwrap_err();
        assert_eq!(err.0.error_code(), "VALIDATION_ERROR");
    }
}
