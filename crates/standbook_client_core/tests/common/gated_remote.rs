//! Fake backend whose PUT requests stay pending until the test answers them.

use async_trait::async_trait;
use standbook_client_core::{
    FieldEdit, RemoteError, StatementRef, Transaction, TransactionId, TransactionRemote, UpdateResponse, Value,
};
use std::sync::Mutex;
use tokio::sync::{mpsc, oneshot};

/// One request as the fake server received it.
pub struct PendingCall {
    pub transaction_id: TransactionId,
    pub patch: Value,
    reply: oneshot::Sender<Result<UpdateResponse, RemoteError>>,
}

impl PendingCall {
    pub fn respond(self, result: Result<UpdateResponse, RemoteError>) {
        let _ = self.reply.send(result);
    }

    pub fn respond_with(self, record: Transaction) {
        self.respond(Ok(UpdateResponse { updated_transaction: Some(record) }));
    }
}

pub struct GatedRemote {
    calls: mpsc::UnboundedSender<PendingCall>,
    listing: Mutex<Vec<Transaction>>,
}

impl GatedRemote {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingCall>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                calls: tx,
                listing: Mutex::new(Vec::new()),
            },
            rx,
        )
    }
}

#[async_trait]
impl TransactionRemote for GatedRemote {
    async fn update_transaction(
        &self,
        _statement: &StatementRef,
        id: &TransactionId,
        edit: &FieldEdit,
    ) -> Result<UpdateResponse, RemoteError> {
        let (reply, answer) = oneshot::channel();
        let call = PendingCall {
            transaction_id: id.clone(),
            patch: Value::Object(edit.to_patch()),
            reply,
        };
        self.calls
            .send(call)
            .map_err(|_| RemoteError::Network("fake server gone".to_string()))?;
        answer
            .await
            .unwrap_or_else(|_| Err(RemoteError::Network("connection reset".to_string())))
    }

    async fn list_transactions(&self, _statement: &StatementRef) -> Result<Vec<Transaction>, RemoteError> {
        Ok(self.listing.lock().unwrap().clone())
    }
}
