pub mod auth;
pub mod transactions;

pub use auth::{login, AuthResponse, LoginRequest};
pub use transactions::{
    get_transactions,
    update_transaction,
    TransactionsResponse,
    UpdateTransactionResponse,
};

use axum::{http::StatusCode, Json};

pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}
