use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use super::model::TransactionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::transactions;
use fintrack_core::errors::{Error, Result};
use fintrack_core::transactions::{
    NewTransaction, Transaction, TransactionFilter, TransactionRepositoryTrait,
};

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TransactionRepository { pool, writer }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn load_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query: transactions::BoxedQuery<'_, Sqlite> = transactions::table
            .order((transactions::timestamp.desc(), transactions::created_at.desc()))
            .into_boxed();
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::kind.eq(kind.as_str()));
        }
        if let Some(user) = filter.user_id.as_deref() {
            query = query.filter(transactions::user_id.eq(user));
        }

        query
            .load::<TransactionDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let now = Utc::now().naive_utc();
                let row = TransactionDB {
                    id: Uuid::new_v4().to_string(),
                    kind: new_transaction.kind.as_str().to_string(),
                    category: new_transaction.category,
                    amount: new_transaction.amount,
                    user_id: new_transaction.user_id,
                    timestamp: new_transaction.timestamp.unwrap_or(now),
                    created_at: now,
                };
                let inserted = diesel::insert_into(transactions::table)
                    .values(&row)
                    .returning(TransactionDB::as_returning())
                    .get_result(conn)
                    .into_core()?;
                Transaction::try_from(inserted)
            })
            .await
    }

    async fn delete_transaction(&self, transaction_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let deleted = diesel::delete(transactions::table.find(&transaction_id))
                    .execute(conn)
                    .into_core()?;
                if deleted == 0 {
                    return Err(Error::not_found("Transaction", &transaction_id));
                }
                Ok(deleted)
            })
            .await
    }
}
