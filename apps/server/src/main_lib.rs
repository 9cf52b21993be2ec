use std::sync::Arc;

use crate::config::Config;
use fintrack_core::{
    goals::{GoalService, GoalServiceTrait},
    settings::{SettingsService, SettingsServiceTrait},
    transactions::{TransactionService, TransactionServiceTrait},
};
use fintrack_storage_sqlite::{
    db, goals::GoalRepository, settings::SettingsRepository,
    transactions::TransactionRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait + Send + Sync>,
    pub transaction_service: Arc<dyn TransactionServiceTrait + Send + Sync>,
    pub settings_service: Arc<dyn SettingsServiceTrait + Send + Sync>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let goal_repo = Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let goal_service = Arc::new(GoalService::new(goal_repo));

    let transaction_repo = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let transaction_service = Arc::new(TransactionService::new(transaction_repo));

    let settings_repo = Arc::new(SettingsRepository::new(pool.clone(), writer));
    let settings_service = Arc::new(SettingsService::new(settings_repo));

    Ok(Arc::new(AppState {
        goal_service,
        transaction_service,
        settings_service,
    }))
}
