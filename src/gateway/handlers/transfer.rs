//! Transfer handler

use std::sync::Arc;

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResult, TransferApiRequest, TransferApiResponse, ValidatedJson};

/// Move funds between two accounts
///
/// Both balances change together or not at all.
#[utoipa::path(
    post,
    path = "/api/v1/accounts/transfer",
    request_body = TransferApiRequest,
    responses(
        (status = 200, description = "Transfer committed", body = TransferApiResponse),
        (status = 400, description = "Same account or negative amount"),
        (status = 404, description = "One or both accounts do not exist"),
        (status = 422, description = "Insufficient funds")
    ),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<TransferApiRequest>,
) -> ApiResult<Json<TransferApiResponse>> {
    let outcome = state.transfers.transfer(req.into()).await?;
    Ok(Json(outcome.into()))
}
