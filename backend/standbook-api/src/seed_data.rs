use serde::Deserialize;
use standbook_client_core::{BankId, StatementId, StatementRef, Transaction};
use std::path::Path;

use crate::config::Config;
use crate::store::StatementStore;
use crate::users::UserDirectory;

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    statements: Vec<SeedStatement>,
}

#[derive(Deserialize)]
struct SeedStatement {
    bank_id: BankId,
    statement_id: StatementId,
    #[serde(default)]
    transactions: Vec<Transaction>,
}

pub async fn seed_admin(users: &UserDirectory, config: &Config) -> anyhow::Result<()> {
    tracing::info!("Creating login user '{}'...", config.admin_username);
    users
        .upsert(&config.admin_username, &config.admin_password, config.bcrypt_cost)
        .await?;
    Ok(())
}

/// Load statements from a JSON seed file. Returns the number of statements loaded.
pub async fn load_seed_file(store: &StatementStore, path: &Path) -> anyhow::Result<usize> {
    let text = tokio::fs::read_to_string(path).await?;
    seed_from_json(store, &text).await
}

pub async fn seed_from_json(store: &StatementStore, json: &str) -> anyhow::Result<usize> {
    let seed: SeedFile = serde_json::from_str(json)?;
    let count = seed.statements.len();
    for s in seed.statements {
        tracing::info!(
            "Seeding statement {}/{} with {} transactions",
            s.bank_id,
            s.statement_id,
            s.transactions.len()
        );
        store
            .put_statement(StatementRef::new(s.bank_id, s.statement_id), s.transactions)
            .await;
    }
    Ok(count)
}
