use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod account {
    use super::*;

    /// Request body for `POST /signup/user`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserSignup {
        pub name: String,
        pub email: String,
        pub phone: String,
        pub address: String,
        pub password: String,
    }

    /// Request body for `POST /signup/provider`.
    ///
    /// `work` is the single service-type label the provider fulfils;
    /// request matching is exact-string equality against it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProviderSignup {
        pub name: String,
        pub email: String,
        pub phone: String,
        pub address: String,
        pub work: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Credentials {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreated {
        pub id: i64,
    }

    /// Response body for a successful login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionInfo {
        pub account_id: i64,
        pub name: String,
    }
}

pub mod request {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RequestStatus {
        Pending,
        Assigned,
    }

    /// Request body for `POST /submit_request`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestNew {
        pub service_type: String,
        pub details: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RequestView {
        pub id: i64,
        pub user_id: i64,
        pub provider_id: Option<i64>,
        pub service_type: String,
        pub details: String,
        pub status: RequestStatus,
        pub cost_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    /// A pending request as shown on the provider profile, with the
    /// requesting user's name resolved.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailableView {
        #[serde(flatten)]
        pub request: RequestView,
        pub user_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailableResponse {
        pub requests: Vec<AvailableView>,
    }

    /// A request as shown on the user profile, newest first, with the
    /// assigned provider's name resolved when present.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryView {
        #[serde(flatten)]
        pub request: RequestView,
        pub provider_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub requests: Vec<HistoryView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentStatus {
        Pending,
        Paid,
        Failed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: i64,
        pub request_id: i64,
        pub provider_id: i64,
        pub amount_minor: i64,
        pub status: PaymentStatus,
        pub external_ref: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod payment {
    use super::*;

    /// Response body for `GET /payment/{service_id}` (payment stub).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentContext {
        pub request: super::request::RequestView,
    }
}
