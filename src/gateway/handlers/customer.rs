//! Customer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{
    AccountResponse, ApiResult, CreateAccountRequest, CreateCustomerRequest, CustomerResponse,
    ListParams, ValidatedJson,
};
use crate::core_types::CustomerId;

/// Register a customer
///
/// The password is hashed before it is stored and is never returned.
#[utoipa::path(
    post,
    path = "/api/v1/customers/",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email")
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateCustomerRequest>,
) -> ApiResult<(StatusCode, Json<CustomerResponse>)> {
    let customer = state
        .accounts
        .create_customer(&req.email, &req.password)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse::new(customer, Vec::new())),
    ))
}

/// Get a customer with its accounts
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}",
    params(("customer_id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer found", body = CustomerResponse),
        (status = 404, description = "Customer cannot be found")
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> ApiResult<Json<CustomerResponse>> {
    let customer = state.accounts.get_customer(customer_id).await?;
    let accounts = state.accounts.list_accounts_by_customer(customer.id).await?;
    Ok(Json(CustomerResponse::new(customer, accounts)))
}

/// List customers ordered by id
#[utoipa::path(
    get,
    path = "/api/v1/customers/",
    params(ListParams),
    responses(
        (status = 200, description = "Customers", body = Vec<CustomerResponse>)
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<CustomerResponse>>> {
    let responses: Vec<CustomerResponse> = state
        .accounts
        .list_customers_with_accounts(state.page(&params))
        .await?
        .into_iter()
        .map(|(customer, accounts)| CustomerResponse::new(customer, accounts))
        .collect();

    Ok(Json(responses))
}

/// Open an account for a customer
#[utoipa::path(
    post,
    path = "/api/v1/customers/{customer_id}/accounts/",
    params(("customer_id" = i64, Path, description = "Customer ID")),
    request_body = CreateAccountRequest,
    responses(
        (status = 200, description = "Account created", body = AccountResponse),
        (status = 400, description = "Negative initial balance"),
        (status = 404, description = "Customer cannot be found")
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
    ValidatedJson(req): ValidatedJson<CreateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state
        .accounts
        .create_account(customer_id, req.balance)
        .await?;
    Ok(Json(account.into()))
}

/// List a customer's accounts
#[utoipa::path(
    get,
    path = "/api/v1/customers/{customer_id}/accounts/",
    params(("customer_id" = i64, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Accounts", body = Vec<AccountResponse>),
        (status = 404, description = "Customer cannot be found")
    ),
    tag = "Accounts"
)]
pub async fn list_customer_accounts(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<CustomerId>,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = state.accounts.list_accounts_by_customer(customer_id).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}
