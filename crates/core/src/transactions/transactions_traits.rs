use crate::errors::Result;
use crate::transactions::transactions_model::{
    CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionKind,
};
use async_trait::async_trait;

/// Trait for transaction repository operations
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Newest first.
    fn load_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: String) -> Result<usize>;
}

/// Trait for transaction service operations
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;
    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: String) -> Result<usize>;
    fn get_category_totals(
        &self,
        kind: TransactionKind,
        user_id: Option<&str>,
    ) -> Result<Vec<CategoryTotal>>;
}
