use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{app, run_with_listener};

mod accounts;
mod payments;
mod requests;
mod server;
mod sessions;

pub mod types {
    pub mod account {
        pub use api_types::account::{
            AccountCreated, Credentials, ProviderSignup, SessionInfo, UserSignup,
        };
    }

    pub mod request {
        pub use api_types::request::{
            AvailableResponse, AvailableView, HistoryResponse, HistoryView, RequestNew,
            RequestStatus, RequestView,
        };
    }

    pub mod transaction {
        pub use api_types::transaction::{PaymentStatus, TransactionView};
    }

    pub mod payment {
        pub use api_types::payment::PaymentContext;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::AlreadyAssigned(_) => StatusCode::CONFLICT,
        EngineError::MissingField(_) | EngineError::InvalidStatus(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        EngineError::PasswordHash(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(hash_err) => {
            tracing::error!("password hash error: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
