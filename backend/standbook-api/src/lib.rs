// Library root - exports for the binary and tests

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod seed_data;
pub mod store;
pub mod users;

pub use config::Config;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use store::StatementStore;
use users::UserDirectory;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StatementStore>,
    pub users: Arc<UserDirectory>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Fresh state with the configured login user; statements come from the seed file if set.
    pub async fn init(config: Config) -> anyhow::Result<Self> {
        let state = Self {
            store: Arc::new(StatementStore::new()),
            users: Arc::new(UserDirectory::new()),
            config: Arc::new(config),
        };
        seed_data::seed_admin(&state.users, &state.config).await?;
        if let Some(path) = &state.config.seed_file {
            let count = seed_data::load_seed_file(&state.store, path).await?;
            tracing::info!("Seeded {} statements from {}", count, path.display());
        }
        Ok(state)
    }
}

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/banks/:bank_id/statements/:statement_id/transactions",
            get(handlers::get_transactions),
        )
        .route(
            "/api/banks/:bank_id/statements/:statement_id/transactions/:transaction_id",
            put(handlers::update_transaction),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(handlers::login))
        .merge(protected)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
