//! Request lifecycle endpoints: submit, browse, accept, history.

use api_types::request::{
    AvailableResponse, AvailableView, HistoryResponse, HistoryView, RequestNew, RequestStatus,
    RequestView,
};
use api_types::transaction::{PaymentStatus, TransactionView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState, sessions::SessionIdentity};

pub(crate) fn request_view(model: engine::requests::Model) -> Result<RequestView, ServerError> {
    let status = match model.status()? {
        engine::RequestStatus::Pending => RequestStatus::Pending,
        engine::RequestStatus::Assigned => RequestStatus::Assigned,
    };

    Ok(RequestView {
        id: model.id,
        user_id: model.user_id,
        provider_id: model.provider_id,
        service_type: model.service_type,
        details: model.details,
        status,
        cost_minor: model.cost_minor,
        created_at: model.created_at,
    })
}

fn transaction_view(model: engine::transactions::Model) -> Result<TransactionView, ServerError> {
    let status = match engine::PaymentStatus::try_from(model.status.as_str())? {
        engine::PaymentStatus::Pending => PaymentStatus::Pending,
        engine::PaymentStatus::Paid => PaymentStatus::Paid,
        engine::PaymentStatus::Failed => PaymentStatus::Failed,
    };

    Ok(TransactionView {
        id: model.id,
        request_id: model.request_id,
        provider_id: model.provider_id,
        amount_minor: model.amount_minor,
        status,
        external_ref: model.external_ref,
        created_at: model.created_at,
    })
}

/// Handle `POST /submit_request` for the authenticated user.
pub async fn submit(
    Extension(identity): Extension<SessionIdentity>,
    State(state): State<ServerState>,
    Json(payload): Json<RequestNew>,
) -> Result<(StatusCode, Json<RequestView>), ServerError> {
    let request = state
        .engine
        .submit_request(identity.account_id, &payload.service_type, &payload.details)
        .await?;

    Ok((StatusCode::CREATED, Json(request_view(request)?)))
}

/// Handle `GET /profile/provider`: pending requests matching the
/// provider's work label.
pub async fn available(
    Extension(identity): Extension<SessionIdentity>,
    State(state): State<ServerState>,
) -> Result<Json<AvailableResponse>, ServerError> {
    let available = state.engine.available_requests(identity.account_id).await?;

    let mut requests = Vec::with_capacity(available.len());
    for entry in available {
        requests.push(AvailableView {
            request: request_view(entry.request)?,
            user_name: entry.user_name,
        });
    }

    Ok(Json(AvailableResponse { requests }))
}

/// Handle `POST /accept_job/{job_id}` for the authenticated provider.
pub async fn accept(
    Extension(identity): Extension<SessionIdentity>,
    State(state): State<ServerState>,
    Path(job_id): Path<i64>,
) -> Result<Json<TransactionView>, ServerError> {
    let payment = state
        .engine
        .accept_request(job_id, identity.account_id)
        .await?;

    Ok(Json(transaction_view(payment)?))
}

/// Handle `GET /profile/user`: the user's own requests, newest first.
pub async fn history(
    Extension(identity): Extension<SessionIdentity>,
    State(state): State<ServerState>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let history = state.engine.history(identity.account_id).await?;

    let mut requests = Vec::with_capacity(history.len());
    for entry in history {
        requests.push(HistoryView {
            request: request_view(entry.request)?,
            provider_name: entry.provider_name,
        });
    }

    Ok(Json(HistoryResponse { requests }))
}
