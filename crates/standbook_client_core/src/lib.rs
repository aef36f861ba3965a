//! Client core for reconciling imported bank statement lines.
//!
//! A UI layer loads a statement into a [`Reconciler`], binds a save indicator to
//! [`Reconciler::subscribe_save_status`] and routes every field change through
//! [`Reconciler::update_field`]. Edits show up locally at once; persistence and the server's
//! corrections follow asynchronously.

pub mod api;
pub mod auth;
pub mod config;
pub mod edit;
pub mod error;
pub mod ids;
pub mod models;
pub mod reconciler;
pub mod remote;
pub mod rules;

pub use api::{HttpAuthService, HttpRemote, AUTH_DECLINED_CODE};
pub use auth::{AuthService, Credentials, Session, SessionStore};
pub use config::ClientConfig;
pub use edit::{FieldEdit, PassthroughField};
pub use error::{AuthError, ReconcileError, RemoteError};
pub use ids::{BankId, CategoryId, CustomerId, StatementId, TransactionId};
pub use models::{
    SaveStatus, StatementRef, Transaction, TransactionKind, TransactionList, TransactionStatus, UpdateResponse,
};
pub use reconciler::{Reconciler, SaveOutcome};
pub use remote::TransactionRemote;
pub use rules::calculate_status;

pub use serde_json::Value;
