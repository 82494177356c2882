//! Payment stub endpoint.
//!
//! No gateway integration exists; the endpoint only returns the request
//! context after verifying ownership. A request owned by a different user
//! yields a 403, not a redirect.

use api_types::payment::PaymentContext;
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, requests::request_view, server::ServerState, sessions::SessionIdentity};

/// Handle `GET /payment/{service_id}`.
pub async fn context(
    Extension(identity): Extension<SessionIdentity>,
    State(state): State<ServerState>,
    Path(service_id): Path<i64>,
) -> Result<Json<PaymentContext>, ServerError> {
    let request = state
        .engine
        .payment_context(service_id, identity.account_id)
        .await?;

    Ok(Json(PaymentContext {
        request: request_view(request)?,
    }))
}
