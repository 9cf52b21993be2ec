use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use super::transactions_model::{
    CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionKind,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::errors::Result;

pub struct TransactionService {
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(transaction_repo: Arc<dyn TransactionRepositoryTrait>) -> Self {
        TransactionService { transaction_repo }
    }

    fn totals_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
        let mut by_category: HashMap<&str, CategoryTotal> = HashMap::new();
        for transaction in transactions {
            let entry = by_category
                .entry(transaction.category.as_str())
                .or_insert_with(|| CategoryTotal {
                    category: transaction.category.clone(),
                    total: 0.0,
                    transaction_count: 0,
                });
            entry.total += transaction.amount;
            entry.transaction_count += 1;
        }

        let mut totals: Vec<CategoryTotal> = by_category.into_values().collect();
        totals.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| a.category.cmp(&b.category))
        });
        totals
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    fn get_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        self.transaction_repo.load_transactions(filter)
    }

    async fn record_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let new_transaction = new_transaction
            .validate()
            .inspect_err(|e| warn!("Rejected transaction: {}", e))?;
        let transaction = self
            .transaction_repo
            .insert_transaction(new_transaction)
            .await?;
        info!(
            "Recorded {} transaction {} in '{}'",
            transaction.kind.as_str(),
            transaction.id,
            transaction.category
        );
        Ok(transaction)
    }

    async fn delete_transaction(&self, transaction_id: String) -> Result<usize> {
        let deleted = self
            .transaction_repo
            .delete_transaction(transaction_id.clone())
            .await?;
        info!("Deleted transaction {}", transaction_id);
        Ok(deleted)
    }

    fn get_category_totals(
        &self,
        kind: TransactionKind,
        user_id: Option<&str>,
    ) -> Result<Vec<CategoryTotal>> {
        let filter = TransactionFilter {
            kind: Some(kind),
            user_id: user_id.map(str::to_string),
        };
        let transactions = self.transaction_repo.load_transactions(&filter)?;
        Ok(Self::totals_by_category(&transactions))
    }
}
