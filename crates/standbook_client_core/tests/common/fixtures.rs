use standbook_client_core::{BankId, StatementId, StatementRef, Transaction, TransactionId};
use std::time::Duration;

pub fn tid(s: &str) -> TransactionId {
    TransactionId::parse(s).expect("transaction id")
}

pub fn statement() -> StatementRef {
    StatementRef::new(
        BankId::parse("bank_garanti").expect("bank id"),
        StatementId::parse("2024-03").expect("statement id"),
    )
}

pub fn blank_lines(ids: &[&str]) -> Vec<Transaction> {
    ids.iter().map(|id| Transaction::new(tid(id))).collect()
}

/// Poll `cond` until it holds or one second passes.
pub async fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
