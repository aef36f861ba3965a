//! Backend seam used by the reconciler. `HttpRemote` in `api` is the production implementation.

use crate::edit::FieldEdit;
use crate::error::RemoteError;
use crate::ids::TransactionId;
use crate::models::{StatementRef, Transaction, UpdateResponse};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRemote: Send + Sync {
    /// Persist one field of one statement line. The body carries only `edit.to_patch()`.
    async fn update_transaction(
        &self,
        statement: &StatementRef,
        id: &TransactionId,
        edit: &FieldEdit,
    ) -> Result<UpdateResponse, RemoteError>;

    async fn list_transactions(&self, statement: &StatementRef) -> Result<Vec<Transaction>, RemoteError>;
}
