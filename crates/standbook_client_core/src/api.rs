//! HTTP client for the backend API (login, statement lines).
use crate::auth::{AuthService, Credentials, Session, SessionStore};
use crate::config::ClientConfig;
use crate::edit::FieldEdit;
use crate::error::{AuthError, RemoteError};
use crate::ids::TransactionId;
use crate::models::{StatementRef, Transaction, TransactionList, UpdateResponse};
use crate::remote::TransactionRemote;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

/// Code the server puts in 401 bodies when the token is missing, expired or revoked.
pub const AUTH_DECLINED_CODE: &str = "STANDBOOK_AUTH_DECLINED";

fn build_client(config: &ClientConfig) -> Result<reqwest::Client, RemoteError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| RemoteError::Network(e.to_string()))
}

fn transport_error(e: reqwest::Error) -> RemoteError {
    RemoteError::Network(e.to_string())
}

/// Map a finished response to its body text or the matching error.
fn check_status(status: StatusCode, body: String, session: &SessionStore) -> Result<String, RemoteError> {
    if status.is_success() {
        return Ok(body);
    }
    match status.as_u16() {
        401 => {
            // Only drop the session when the server explicitly declined it, not on proxies or gateways.
            if body.contains(AUTH_DECLINED_CODE) {
                warn!("[standbook] server declined session, clearing it");
                session.clear();
            }
            Err(RemoteError::Unauthorized(body))
        }
        404 => Err(RemoteError::NotFound(body)),
        409 => Err(RemoteError::Conflict(body)),
        code => Err(RemoteError::Http { status: code, body }),
    }
}

#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl HttpRemote {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.api_base_url.clone(),
            session,
        })
    }

    pub(crate) fn statement_url(&self, statement: &StatementRef) -> String {
        format!(
            "{}/api/banks/{}/statements/{}/transactions",
            self.base_url,
            urlencoding::encode(statement.bank_id.as_str()),
            urlencoding::encode(statement.statement_id.as_str()),
        )
    }

    pub(crate) fn transaction_url(&self, statement: &StatementRef, id: &TransactionId) -> String {
        format!("{}/{}", self.statement_url(statement), urlencoding::encode(id.as_str()))
    }

    fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.session.bearer_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| RemoteError::Unauthorized(format!("unusable session token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl TransactionRemote for HttpRemote {
    /// PUT /api/banks/:bank/statements/:statement/transactions/:id -> { updatedTransaction? }
    async fn update_transaction(
        &self,
        statement: &StatementRef,
        id: &TransactionId,
        edit: &FieldEdit,
    ) -> Result<UpdateResponse, RemoteError> {
        let url = self.transaction_url(statement, id);
        let resp = self
            .client
            .put(&url)
            .headers(self.headers()?)
            .json(&edit.to_patch())
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;
        let text = check_status(status, text, &self.session)?;
        if text.trim().is_empty() {
            return Ok(UpdateResponse::default());
        }
        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// GET /api/banks/:bank/statements/:statement/transactions -> { transactions }
    async fn list_transactions(&self, statement: &StatementRef) -> Result<Vec<Transaction>, RemoteError> {
        let url = self.statement_url(statement);
        let resp = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;
        let text = check_status(status, text, &self.session)?;
        let list: TransactionList =
            serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(list.transactions)
    }
}

/// Login against POST /api/auth/login; keeps the session in a shared `SessionStore`.
#[derive(Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl HttpAuthService {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self, RemoteError> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.api_base_url.clone(),
            session,
        })
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    /// POST /api/auth/login -> { token, user_id, username }
    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let url = format!("{}/api/auth/login", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(RemoteError::Http { status: status.as_u16(), body: text }.into());
        }
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))?;
        let field = |name: &str| -> Result<String, AuthError> {
            json.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| RemoteError::Decode(format!("No {} in login response", name)).into())
        };
        let session = Session {
            token: field("token")?,
            user_id: field("user_id")?,
            username: field("username")?,
            issued_at: chrono::Utc::now(),
        };
        info!("[standbook] logged in as {}", session.username);
        self.session.set(session.clone());
        Ok(session)
    }

    fn logout(&self) {
        info!("[standbook] logout");
        self.session.clear();
    }

    fn current_session(&self) -> Option<Session> {
        self.session.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BankId, StatementId};

    fn remote() -> HttpRemote {
        HttpRemote::new(&ClientConfig::new("http://api.local/"), SessionStore::new()).expect("client")
    }

    #[test]
    fn transaction_url_encodes_path_segments() {
        let statement = StatementRef::new(
            BankId::parse("garanti tl").unwrap(),
            StatementId::parse("2024/03").unwrap(),
        );
        let id = TransactionId::parse("line#7").unwrap();
        assert_eq!(
            remote().transaction_url(&statement, &id),
            "http://api.local/api/banks/garanti%20tl/statements/2024%2F03/transactions/line%237"
        );
    }

    #[test]
    fn declined_401_clears_session_but_plain_401_does_not() {
        let session = SessionStore::new();
        session.set(Session {
            token: "tok".into(),
            user_id: "u".into(),
            username: "n".into(),
            issued_at: chrono::Utc::now(),
        });

        let err = check_status(StatusCode::UNAUTHORIZED, "gateway says no".into(), &session).unwrap_err();
        assert!(matches!(err, RemoteError::Unauthorized(_)));
        assert!(session.current().is_some());

        let body = format!("{{\"code\":\"{}\"}}", AUTH_DECLINED_CODE);
        check_status(StatusCode::UNAUTHORIZED, body, &session).unwrap_err();
        assert!(session.current().is_none());
    }

    #[test]
    fn status_codes_map_to_error_kinds() {
        let s = SessionStore::new();
        assert_eq!(check_status(StatusCode::OK, "{}".into(), &s), Ok("{}".to_string()));
        assert!(matches!(check_status(StatusCode::NOT_FOUND, String::new(), &s), Err(RemoteError::NotFound(_))));
        assert!(matches!(check_status(StatusCode::CONFLICT, String::new(), &s), Err(RemoteError::Conflict(_))));
        assert_eq!(
            check_status(StatusCode::BAD_GATEWAY, "down".into(), &s),
            Err(RemoteError::Http { status: 502, body: "down".into() })
        );
    }
}
