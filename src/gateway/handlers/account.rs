//! Account query handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};

use super::super::state::AppState;
use super::super::types::{AccountResponse, ApiResult, ListParams};
use crate::core_types::AccountId;

/// Get an account
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_id}",
    params(("account_id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account found", body = AccountResponse),
        (status = 404, description = "Account cannot be found")
    ),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_id): Path<AccountId>,
) -> ApiResult<Json<AccountResponse>> {
    let account = state.accounts.get_account(account_id).await?;
    Ok(Json(account.into()))
}

/// List accounts ordered by id
#[utoipa::path(
    get,
    path = "/api/v1/accounts/",
    params(ListParams),
    responses(
        (status = 200, description = "Accounts", body = Vec<AccountResponse>)
    ),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<AccountResponse>>> {
    let accounts = state.accounts.list_accounts(state.page(&params)).await?;
    Ok(Json(accounts.into_iter().map(Into::into).collect()))
}
