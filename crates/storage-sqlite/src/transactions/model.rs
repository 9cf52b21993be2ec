//! Database model for transactions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use fintrack_core::errors::{DatabaseError, Error};
use fintrack_core::transactions::{Transaction, TransactionKind};

/// Database model for transactions
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub kind: String,
    pub category: String,
    pub amount: f64,
    pub user_id: Option<String>,
    pub timestamp: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = Error;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        let kind = db.kind.parse::<TransactionKind>().map_err(|_| {
            Error::Database(DatabaseError::Internal(format!(
                "Transaction {} has unknown kind '{}'",
                db.id, db.kind
            )))
        })?;
        Ok(Self {
            id: db.id,
            kind,
            category: db.category,
            amount: db.amount,
            user_id: db.user_id,
            timestamp: db.timestamp,
            created_at: db.created_at,
        })
    }
}
