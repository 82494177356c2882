//! The request lifecycle: submit, match, accept, history, payment stub.

use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    EngineError, PaymentStatus, RequestStatus, ResultEngine, providers, requests, transactions,
    users,
};

use super::{Engine, require_field, with_tx};

/// Placeholder cost set at acceptance, in minor units (500.00).
///
/// Not derived from the service type or any negotiation.
pub const DEFAULT_JOB_COST_MINOR: i64 = 50_000;

/// A pending request visible to a provider, with the requesting user's
/// name resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvailableRequest {
    pub request: requests::Model,
    pub user_name: Option<String>,
}

/// A request owned by a user, with the assigned provider's name resolved
/// when present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub request: requests::Model,
    pub provider_name: Option<String>,
}

impl Engine {
    /// Create a new service request for `user_id`.
    ///
    /// The request starts `pending` with no provider and a zero cost. A
    /// stale `user_id` is rejected by the foreign key and surfaces as
    /// [`EngineError::Database`]; nothing is written in that case.
    pub async fn submit_request(
        &self,
        user_id: i64,
        service_type: &str,
        details: &str,
    ) -> ResultEngine<requests::Model> {
        require_field(service_type, "service_type")?;
        require_field(details, "details")?;

        with_tx!(self, |db_tx| {
            let inserted = requests::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                provider_id: ActiveValue::Set(None),
                service_type: ActiveValue::Set(service_type.to_string()),
                details: ActiveValue::Set(details.to_string()),
                status: ActiveValue::Set(RequestStatus::Pending.as_str().to_string()),
                cost_minor: ActiveValue::Set(0),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(inserted)
        })
    }

    /// List the pending requests matching a provider's `work` label.
    ///
    /// Matching is exact-string equality only; no fuzzy or geographic
    /// matching despite both sides carrying an address. Results are
    /// ordered oldest-first by id so the listing is deterministic.
    pub async fn available_requests(&self, provider_id: i64) -> ResultEngine<Vec<AvailableRequest>> {
        let provider = providers::Entity::find_by_id(provider_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("provider not exists".to_string()))?;

        let rows: Vec<(requests::Model, Option<users::Model>)> = requests::Entity::find()
            .filter(requests::Column::ServiceType.eq(provider.work.as_str()))
            .filter(requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .order_by_asc(requests::Column::Id)
            .find_also_related(users::Entity)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(request, user)| AvailableRequest {
                request,
                user_name: user.map(|u| u.name),
            })
            .collect())
    }

    /// Accept a pending request on behalf of `provider_id`.
    ///
    /// The transition is a single conditional update guarded on
    /// `status = 'pending'`, so with concurrent accepts exactly one caller
    /// wins; losers get [`EngineError::AlreadyAssigned`] and change
    /// nothing. The payment row is inserted in the same database
    /// transaction with `amount_minor` equal to the newly set cost.
    pub async fn accept_request(
        &self,
        request_id: i64,
        provider_id: i64,
    ) -> ResultEngine<transactions::Model> {
        with_tx!(self, |db_tx| {
            let updated = requests::Entity::update_many()
                .col_expr(
                    requests::Column::Status,
                    Expr::value(RequestStatus::Assigned.as_str()),
                )
                .col_expr(requests::Column::ProviderId, Expr::value(provider_id))
                .col_expr(
                    requests::Column::CostMinor,
                    Expr::value(DEFAULT_JOB_COST_MINOR),
                )
                .filter(requests::Column::Id.eq(request_id))
                .filter(requests::Column::Status.eq(RequestStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;

            if updated.rows_affected == 0 {
                match requests::Entity::find_by_id(request_id).one(&db_tx).await? {
                    None => {
                        return Err(EngineError::KeyNotFound("request not exists".to_string()));
                    }
                    Some(_) => return Err(EngineError::AlreadyAssigned(request_id.to_string())),
                }
            }

            let transaction = transactions::ActiveModel {
                id: ActiveValue::NotSet,
                request_id: ActiveValue::Set(request_id),
                provider_id: ActiveValue::Set(provider_id),
                amount_minor: ActiveValue::Set(DEFAULT_JOB_COST_MINOR),
                status: ActiveValue::Set(PaymentStatus::Pending.as_str().to_string()),
                external_ref: ActiveValue::Set(None),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            Ok(transaction)
        })
    }

    /// List the requests owned by `user_id`, newest first.
    pub async fn history(&self, user_id: i64) -> ResultEngine<Vec<HistoryEntry>> {
        let rows: Vec<(requests::Model, Option<providers::Model>)> = requests::Entity::find()
            .filter(requests::Column::UserId.eq(user_id))
            .order_by_desc(requests::Column::Id)
            .find_also_related(providers::Entity)
            .all(&self.database)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(request, provider)| HistoryEntry {
                request,
                provider_name: provider.map(|p| p.name),
            })
            .collect())
    }

    /// Fetch a request for the payment page, verifying ownership.
    ///
    /// Returns [`EngineError::Forbidden`] when the request belongs to a
    /// different user, without disclosing any request detail.
    pub async fn payment_context(
        &self,
        request_id: i64,
        user_id: i64,
    ) -> ResultEngine<requests::Model> {
        let request = requests::Entity::find_by_id(request_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("request not exists".to_string()))?;

        if request.user_id != user_id {
            return Err(EngineError::Forbidden(
                "request belongs to another user".to_string(),
            ));
        }
        Ok(request)
    }
}
