use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use fintrack_core::transactions::{
    CategoryTotal, NewTransaction, Transaction, TransactionFilter, TransactionKind,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsQuery {
    kind: Option<String>,
    user_id: Option<String>,
}

impl TransactionsQuery {
    fn kind(&self) -> ApiResult<Option<TransactionKind>> {
        Ok(self
            .kind
            .as_deref()
            .map(str::parse::<TransactionKind>)
            .transpose()?)
    }
}

async fn get_transactions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionsQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let filter = TransactionFilter {
        kind: query.kind()?,
        user_id: query.user_id,
    };
    Ok(Json(state.transaction_service.get_transactions(&filter)?))
}

async fn record_transaction(
    State(state): State<Arc<AppState>>,
    Json(transaction): Json<NewTransaction>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let t = state
        .transaction_service
        .record_transaction(transaction)
        .await?;
    Ok((StatusCode::CREATED, Json(t)))
}

async fn delete_transaction(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let _ = state.transaction_service.delete_transaction(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_category_totals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TransactionsQuery>,
) -> ApiResult<Json<Vec<CategoryTotal>>> {
    let kind = query
        .kind()?
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'kind' is required".into()))?;
    let totals = state
        .transaction_service
        .get_category_totals(kind, query.user_id.as_deref())?;
    Ok(Json(totals))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/transactions",
            get(get_transactions).post(record_transaction),
        )
        .route("/transactions/totals", get(get_category_totals))
        .route("/transactions/{id}", delete(delete_transaction))
}
