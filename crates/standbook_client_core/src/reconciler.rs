//! Optimistic editing of statement lines with background persistence.
//!
//! `update_field` applies the edit (and the dependent-field rules) to the local list
//! synchronously, then persists the single changed field and merges the server's record back.
//! Saves of the same line are sent one at a time in edit order; a response is merged only if no
//! newer edit of that line was made in the meantime.

use crate::config::ClientConfig;
use crate::edit::FieldEdit;
use crate::error::{ReconcileError, RemoteError};
use crate::ids::TransactionId;
use crate::models::{SaveStatus, StatementRef, Transaction, UpdateResponse};
use crate::remote::TransactionRemote;
use crate::rules;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

/// Result of a successful `update_field`.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveOutcome {
    /// No statement loaded; the edit exists only in memory.
    LocalOnly,
    /// Persisted. Carries the server's record when the response had one.
    Saved(Option<Transaction>),
}

#[derive(Default)]
struct EditingState {
    statement: Option<StatementRef>,
    transactions: Vec<Transaction>,
}

/// Per-line save queue plus the number of edits issued for that line.
#[derive(Default)]
struct EditSlot {
    queue: tokio::sync::Mutex<()>,
    issued: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a line as saving for as long as it lives. A save dropped before it settles
/// (aborted task, unmounted caller) leaves the global status at `Unsaved`.
struct InFlightGuard<'a> {
    saving: &'a Mutex<HashMap<TransactionId, usize>>,
    status: &'a watch::Sender<SaveStatus>,
    id: TransactionId,
    settled: bool,
}

impl<'a> InFlightGuard<'a> {
    fn enter(
        saving: &'a Mutex<HashMap<TransactionId, usize>>,
        status: &'a watch::Sender<SaveStatus>,
        id: &TransactionId,
    ) -> Self {
        *lock(saving).entry(id.clone()).or_insert(0) += 1;
        Self {
            saving,
            status,
            id: id.clone(),
            settled: false,
        }
    }

    fn settle(&mut self, status: SaveStatus) {
        self.settled = true;
        self.status.send_replace(status);
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut saving = lock(self.saving);
        if let Some(count) = saving.get_mut(&self.id) {
            *count -= 1;
            if *count == 0 {
                saving.remove(&self.id);
            }
        }
        if !self.settled {
            warn!("[standbook] save of transaction {} dropped before it settled", self.id);
            self.status.send_replace(SaveStatus::Unsaved);
        }
    }
}

pub struct Reconciler<R> {
    remote: Arc<R>,
    state: Mutex<EditingState>,
    slots: Mutex<HashMap<TransactionId, Arc<EditSlot>>>,
    saving: Mutex<HashMap<TransactionId, usize>>,
    save_status: watch::Sender<SaveStatus>,
    closed: watch::Sender<bool>,
    save_timeout: Duration,
}

impl<R: TransactionRemote> Reconciler<R> {
    pub fn new(remote: Arc<R>, save_timeout: Duration) -> Self {
        Self {
            remote,
            state: Mutex::new(EditingState::default()),
            slots: Mutex::new(HashMap::new()),
            saving: Mutex::new(HashMap::new()),
            save_status: watch::channel(SaveStatus::Unsaved).0,
            closed: watch::channel(false).0,
            save_timeout,
        }
    }

    pub fn from_config(remote: Arc<R>, config: &ClientConfig) -> Self {
        Self::new(remote, config.save_timeout)
    }

    /// Replace the editing session. `None` statement means edits stay local.
    pub fn load(&self, statement: Option<StatementRef>, transactions: Vec<Transaction>) {
        let mut state = lock(&self.state);
        info!(
            "[standbook] load statement={:?} transactions={}",
            statement.as_ref().map(|s| s.statement_id.as_str()),
            transactions.len()
        );
        state.statement = statement;
        state.transactions = transactions;
        // Slots of lines that left the session go, unless a save still holds them.
        lock(&self.slots).retain(|id, slot| {
            Arc::strong_count(slot) > 1 || state.transactions.iter().any(|t| &t.id == id)
        });
        self.save_status.send_replace(SaveStatus::Unsaved);
    }

    /// Fetch the statement's lines from the backend and load them. Returns the line count.
    pub async fn open_statement(&self, statement: StatementRef) -> Result<usize, ReconcileError> {
        let transactions = self.remote.list_transactions(&statement).await?;
        let count = transactions.len();
        self.load(Some(statement), transactions);
        Ok(count)
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        lock(&self.state).transactions.clone()
    }

    pub fn transaction(&self, id: &TransactionId) -> Option<Transaction> {
        lock(&self.state).transactions.iter().find(|t| &t.id == id).cloned()
    }

    pub fn statement(&self) -> Option<StatementRef> {
        lock(&self.state).statement.clone()
    }

    pub fn save_status(&self) -> SaveStatus {
        *self.save_status.borrow()
    }

    /// Receiver for binding a save indicator; sees every status change.
    pub fn subscribe_save_status(&self) -> watch::Receiver<SaveStatus> {
        self.save_status.subscribe()
    }

    /// Row-level spinner: true while any save of this line is queued or in flight.
    pub fn is_saving(&self, id: &TransactionId) -> bool {
        lock(&self.saving).contains_key(id)
    }

    pub fn saving_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = lock(&self.saving).keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Cancel queued and in-flight saves; later saves fail with `Cancelled` too.
    /// Local edits keep working.
    pub fn close(&self) {
        self.closed.send_replace(true);
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Apply `edit` to line `id` locally, then persist it.
    ///
    /// Unknown `id` fails with `TransactionNotFound` and changes nothing. A failed save keeps the
    /// local edit and leaves the save status at `Unsaved`.
    pub async fn update_field(&self, id: &TransactionId, edit: FieldEdit) -> Result<SaveOutcome, ReconcileError> {
        let (statement, slot, seq) = {
            let mut state = lock(&self.state);
            let Some(pos) = state.transactions.iter().position(|t| &t.id == id) else {
                warn!("[standbook] update_field: transaction {} not loaded", id);
                return Err(ReconcileError::TransactionNotFound(id.clone()));
            };
            let updated = rules::apply_edit(&state.transactions[pos], &edit);
            debug!(
                "[standbook] update_field id={} field={} status={:?}",
                id,
                edit.field_name(),
                updated.status
            );
            state.transactions[pos] = updated;
            self.save_status.send_replace(SaveStatus::Saving);
            // Issued under the state lock so a merge can never land between this edit and its count.
            let slot = self.slot(id);
            let seq = slot.issued.fetch_add(1, Ordering::SeqCst) + 1;
            (state.statement.clone(), slot, seq)
        };

        let Some(statement) = statement else {
            self.save_status.send_replace(SaveStatus::Unsaved);
            return Ok(SaveOutcome::LocalOnly);
        };

        let mut in_flight = InFlightGuard::enter(&self.saving, &self.save_status, id);
        match self.persist(&statement, id, &edit, &slot).await {
            Ok(resp) => {
                if let Some(server) = &resp.updated_transaction {
                    self.merge(&statement, id, server, &slot, seq);
                }
                in_flight.settle(SaveStatus::Saved);
                Ok(SaveOutcome::Saved(resp.updated_transaction))
            }
            Err(e) => {
                error!(
                    "[standbook] saving {} of transaction {} failed: {}",
                    edit.field_name(),
                    id,
                    e
                );
                in_flight.settle(SaveStatus::Unsaved);
                Err(e.into())
            }
        }
    }

    fn slot(&self, id: &TransactionId) -> Arc<EditSlot> {
        lock(&self.slots).entry(id.clone()).or_default().clone()
    }

    async fn persist(
        &self,
        statement: &StatementRef,
        id: &TransactionId,
        edit: &FieldEdit,
        slot: &EditSlot,
    ) -> Result<UpdateResponse, RemoteError> {
        let mut closed = self.closed.subscribe();
        let cancelled = async move {
            let _ = closed.wait_for(|c| *c).await;
        };
        let save = async {
            let _turn = slot.queue.lock().await;
            self.remote.update_transaction(statement, id, edit).await
        };
        tokio::select! {
            biased;
            _ = cancelled => Err(RemoteError::Cancelled),
            res = tokio::time::timeout(self.save_timeout, save) => {
                res.unwrap_or(Err(RemoteError::TimedOut(self.save_timeout)))
            }
        }
    }

    fn merge(&self, statement: &StatementRef, id: &TransactionId, server: &Transaction, slot: &EditSlot, seq: u64) {
        if &server.id != id {
            warn!(
                "[standbook] server returned transaction {} for edit of {}, not merging",
                server.id, id
            );
            return;
        }
        let mut state = lock(&self.state);
        if slot.issued.load(Ordering::SeqCst) != seq {
            debug!("[standbook] newer edit of {} pending, skipping merge", id);
            return;
        }
        if state.statement.as_ref() != Some(statement) {
            debug!("[standbook] statement changed while saving {}, skipping merge", id);
            return;
        }
        if let Some(t) = state.transactions.iter_mut().find(|t| &t.id == id) {
            *t = server.clone();
        }
    }
}
