//! SQLite storage implementation for income and expense transactions.

mod model;
mod repository;

pub use model::TransactionDB;
pub use repository::TransactionRepository;
