//! JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{error, warn};

use defter_db::RepositoryError;
use defter_shared::AppError;

/// Error returned by every handler.
///
/// Renders as `{ "error": CODE, "message": text }` with the status the
/// domain error reports. Server-side failures are logged and their detail
/// is withheld from the body.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// A 400 for malformed request input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }

    /// Stable error code of the response.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.0.error_code()
    }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self.0, code = self.code(), "Request failed");
            "An error occurred".to_string()
        } else {
            warn!(error = %self.0, code = self.code(), "Request rejected");
            self.0.to_string()
        };

        (status, Json(json!({ "error": self.code(), "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defter_core::ledger::LedgerError;
    use defter_shared::types::VoucherId;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_domain_error_keeps_code_and_status() {
        let err: ApiError = RepositoryError::from(LedgerError::VoucherNotFound(VoucherId::new())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "VOUCHER_NOT_FOUND");
        assert!(body["message"].as_str().unwrap().contains("Voucher not found"));
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let err: ApiError = RepositoryError::Database(sea_orm::DbErr::Custom("relation missing".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An error occurred");
    }

    #[test]
    fn test_validation_is_bad_request() {
        let err = ApiError::validation("bad date");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
