use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use standbook_client_core::{BankId, FieldEdit, StatementId, StatementRef, Transaction, TransactionId};

use super::{api_error, ApiError};
use crate::middleware::AuthUser;
use crate::store::StoreError;
use crate::AppState;

#[derive(Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionResponse {
    pub updated_transaction: Transaction,
    pub message: String,
}

fn statement_ref(bank_id: &str, statement_id: &str) -> Result<StatementRef, ApiError> {
    let bank_id = BankId::parse(bank_id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let statement_id = StatementId::parse(statement_id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    Ok(StatementRef::new(bank_id, statement_id))
}

fn store_error(e: StoreError) -> ApiError {
    api_error(StatusCode::NOT_FOUND, e.to_string())
}

pub async fn get_transactions(
    State(state): State<AppState>,
    Path((bank_id, statement_id)): Path<(String, String)>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let statement = statement_ref(&bank_id, &statement_id)?;
    let transactions = state.store.list(&statement).await.map_err(store_error)?;
    Ok(Json(TransactionsResponse { transactions }))
}

/// PUT with a single-key body; answers with the authoritative record.
pub async fn update_transaction(
    State(state): State<AppState>,
    Path((bank_id, statement_id, transaction_id)): Path<(String, String, String)>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<UpdateTransactionResponse>, ApiError> {
    let statement = statement_ref(&bank_id, &statement_id)?;
    let id = TransactionId::parse(&transaction_id).map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;
    let patch = body
        .as_object()
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Body must be a JSON object"))?;
    let edit = FieldEdit::from_patch(patch).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let updated = state
        .store
        .apply_edit(&statement, &id, &edit)
        .await
        .map_err(store_error)?;

    tracing::info!(
        "Transaction {} ({}/{}) {} updated by {} -> {:?}",
        id,
        statement.bank_id,
        statement.statement_id,
        edit.field_name(),
        user.username,
        updated.status
    );
    Ok(Json(UpdateTransactionResponse {
        updated_transaction: updated,
        message: "Transaction updated successfully".to_string(),
    }))
}
