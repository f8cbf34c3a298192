//! Gateway request/response types
//!
//! - `ApiResponse<T>` / `ApiError`: error envelope and status mapping
//! - `ValidatedJson<T>`: JSON body extractor with `validator` checks
//! - Request and response DTOs for customers, accounts and transfers

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::account::{Account, Customer};
use crate::core_types::{AccountId, CustomerId, MinorUnits};
use crate::error::LedgerError;
use crate::transfer::{TransferOutcome, TransferRequest};

// ============================================================================
// Unified Error Format
// ============================================================================

/// API response envelope
///
/// Errors are returned as `{code, msg}`; `data` is only present on success.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_FUNDS: i32 = 1002;
    pub const INVALID_OPERATION: i32 = 1003;
    pub const INVALID_AMOUNT: i32 = 1004;

    // Resource errors (4xxx)
    pub const NOT_FOUND: i32 = 4004;
    pub const CONFLICT: i32 = 4009;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
}

/// Handler error: HTTP status plus envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match &e {
            LedgerError::NotFound(_) => error_codes::NOT_FOUND,
            LedgerError::Conflict(_) => error_codes::CONFLICT,
            LedgerError::InvalidOperation(_) => error_codes::INVALID_OPERATION,
            LedgerError::InvalidAmount(_) => error_codes::INVALID_AMOUNT,
            LedgerError::InsufficientFunds => error_codes::INSUFFICIENT_FUNDS,
            LedgerError::StorageFailure(_) => error_codes::INTERNAL_ERROR,
        };

        // Storage detail stays in the log
        let msg = if status.is_server_error() {
            tracing::error!(error = %e, "Request failed");
            "Something went wrong".to_string()
        } else {
            tracing::debug!(code = e.code(), error = %e, "Request rejected");
            e.to_string()
        };

        Self::new(status, code, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.code, self.msg));
        (self.status, body).into_response()
    }
}

// ============================================================================
// ValidatedJson: JSON body + validator rules
// ============================================================================

/// JSON body extractor that also runs `Validate`
///
/// Malformed bodies keep the status axum's `Json` rejection chose; rule
/// violations are 422.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            ApiError::new(e.status(), error_codes::INVALID_PARAMETER, e.body_text())
        })?;

        value.validate().map_err(|e| {
            ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                error_codes::INVALID_PARAMETER,
                validation_message(&e),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten field errors into one readable line, fields in name order
fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let parts: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("Invalid {}", field),
            })
        })
        .collect();

    if parts.is_empty() {
        "Invalid request body".to_string()
    } else {
        parts.join("; ")
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Customer registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "dave@example.com")]
    pub email: String,
    #[schema(example = "thisisatest")]
    pub password: String,
}

/// Account opening request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountRequest {
    /// Initial balance in minor units
    #[schema(example = 100)]
    pub balance: MinorUnits,
}

/// Transfer request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferApiRequest {
    #[schema(example = 1)]
    pub source_account_id: AccountId,
    #[schema(example = 2)]
    pub destination_account_id: AccountId,
    #[schema(example = 10)]
    pub amount: MinorUnits,
}

impl From<TransferApiRequest> for TransferRequest {
    fn from(req: TransferApiRequest) -> Self {
        TransferRequest::new(
            req.source_account_id,
            req.destination_account_id,
            req.amount,
        )
    }
}

/// `?skip=&limit=` for list endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Number of records to skip
    pub skip: Option<i64>,
    /// Maximum number of records to return
    pub limit: Option<i64>,
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Account as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct AccountResponse {
    pub id: AccountId,
    pub balance: MinorUnits,
    pub customer_id: CustomerId,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            balance: a.balance,
            customer_id: a.customer_id,
        }
    }
}

/// Customer as returned by the API (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct CustomerResponse {
    pub id: CustomerId,
    pub email: String,
    pub is_active: bool,
    pub accounts: Vec<AccountResponse>,
}

impl CustomerResponse {
    pub fn new(customer: Customer, accounts: Vec<Account>) -> Self {
        Self {
            id: customer.id,
            email: customer.email,
            is_active: customer.is_active,
            accounts: accounts.into_iter().map(AccountResponse::from).collect(),
        }
    }
}

/// One leg of a transfer response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct BalanceView {
    pub balance: MinorUnits,
}

/// Transfer response body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct TransferApiResponse {
    pub source_account: BalanceView,
    pub destination_account: BalanceView,
}

impl From<TransferOutcome> for TransferApiResponse {
    fn from(outcome: TransferOutcome) -> Self {
        Self {
            source_account: BalanceView {
                balance: outcome.source_balance,
            },
            destination_account: BalanceView {
                balance: outcome.destination_balance,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_error_status_mapping() {
        let cases = [
            (LedgerError::invalid_operation("same"), 400, error_codes::INVALID_OPERATION),
            (LedgerError::invalid_amount("neg"), 400, error_codes::INVALID_AMOUNT),
            (LedgerError::not_found("gone"), 404, error_codes::NOT_FOUND),
            (LedgerError::conflict("dup"), 409, error_codes::CONFLICT),
            (LedgerError::InsufficientFunds, 422, error_codes::INSUFFICIENT_FUNDS),
            (LedgerError::StorageFailure("x".into()), 500, error_codes::INTERNAL_ERROR),
        ];
        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status.as_u16(), status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_storage_detail_not_leaked() {
        let api: ApiError = LedgerError::StorageFailure("password=secret".into()).into();
        assert_eq!(api.msg, "Something went wrong");
    }

    #[test]
    fn test_customer_response_omits_hash() {
        let customer = Customer {
            id: 1,
            email: "dave@example.com".to_string(),
            hashed_password: "$argon2id$...".to_string(),
            is_active: true,
        };
        let json = serde_json::to_value(CustomerResponse::new(customer, vec![])).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["accounts"], serde_json::json!([]));
    }

    #[test]
    fn test_transfer_response_shape() {
        let resp = TransferApiResponse::from(TransferOutcome {
            source_balance: 90,
            destination_balance: 60,
        });
        let json = serde_json::to_value(resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "source_account": {"balance": 90},
                "destination_account": {"balance": 60}
            })
        );
    }

    #[test]
    fn test_create_customer_request_validates_email() {
        let bad = CreateCustomerRequest {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(validation_message(&errors), "Invalid email address");

        let good = CreateCustomerRequest {
            email: "dave@example.com".to_string(),
            password: "pw".to_string(),
        };
        assert!(good.validate().is_ok());
    }
}
