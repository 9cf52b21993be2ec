//! Transactions module - income and expense records per category.

mod transactions_model;
mod transactions_service;
mod transactions_traits;

pub use transactions_model::{
    CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionKind,
};
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
