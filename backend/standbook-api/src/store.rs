//! In-memory statement store. The server's copy of each line is authoritative.

use chrono::Utc;
use standbook_client_core::rules;
use standbook_client_core::{FieldEdit, StatementRef, Transaction, TransactionId};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("statement {0} not found")]
    StatementNotFound(String),
    #[error("transaction {0} not found")]
    TransactionNotFound(String),
}

#[derive(Default)]
pub struct StatementStore {
    statements: RwLock<HashMap<StatementRef, Vec<Transaction>>>,
}

impl StatementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a statement with its lines (import side, used by seeding and tests).
    pub async fn put_statement(&self, statement: StatementRef, transactions: Vec<Transaction>) {
        self.statements.write().await.insert(statement, transactions);
    }

    pub async fn list(&self, statement: &StatementRef) -> Result<Vec<Transaction>, StoreError> {
        self.statements
            .read()
            .await
            .get(statement)
            .cloned()
            .ok_or_else(|| StoreError::StatementNotFound(statement.statement_id.to_string()))
    }

    pub async fn get(&self, statement: &StatementRef, id: &TransactionId) -> Result<Transaction, StoreError> {
        self.list(statement)
            .await?
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::TransactionNotFound(id.to_string()))
    }

    /// Apply one field edit with the shared rules, normalize, stamp `updatedAt`.
    pub async fn apply_edit(
        &self,
        statement: &StatementRef,
        id: &TransactionId,
        edit: &FieldEdit,
    ) -> Result<Transaction, StoreError> {
        let mut statements = self.statements.write().await;
        let lines = statements
            .get_mut(statement)
            .ok_or_else(|| StoreError::StatementNotFound(statement.statement_id.to_string()))?;
        let line = lines
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| StoreError::TransactionNotFound(id.to_string()))?;

        let mut updated = rules::apply_edit(line, edit);
        normalize(&mut updated);
        updated
            .extra
            .insert("updatedAt".to_string(), serde_json::json!(Utc::now().to_rfc3339()));
        *line = updated.clone();
        Ok(updated)
    }
}

/// Currency pairs are stored as trimmed upper-case codes ("usd/try " -> "USD/TRY").
fn normalize(t: &mut Transaction) {
    t.currency_pair = t
        .currency_pair
        .take()
        .map(|p| p.trim().to_uppercase())
        .filter(|p| !p.is_empty());
    t.status = rules::calculate_status(t);
}
