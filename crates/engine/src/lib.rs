pub use error::EngineError;
pub use ops::{
    AvailableRequest, DEFAULT_JOB_COST_MINOR, Engine, HistoryEntry, NewProvider, NewUser,
};
pub use requests::RequestStatus;
pub use transactions::PaymentStatus;

mod error;
mod ops;
mod password;
pub mod providers;
pub mod requests;
pub mod transactions;
pub mod users;

type ResultEngine<T> = Result<T, EngineError>;
