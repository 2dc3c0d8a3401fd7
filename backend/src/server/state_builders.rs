//! Builders wiring repository adapters into the HTTP state.

use std::sync::Arc;

use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::mail::TracingMailSender;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselEmployeeRepository, DieselExpenseCategoryRepository, DieselExpenseRepository,
    DieselInvoiceRepository, DieselPasswordResetRepository, DieselProjectRepository,
    DieselUserRepository,
};

use super::ServerConfig;

/// Diesel-backed state sharing one connection pool across repositories.
fn diesel_state(pool: &DbPool, client_url: &str) -> HttpState {
    HttpState {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        employees: Arc::new(DieselEmployeeRepository::new(pool.clone())),
        projects: Arc::new(DieselProjectRepository::new(pool.clone())),
        expense_categories: Arc::new(DieselExpenseCategoryRepository::new(pool.clone())),
        expenses: Arc::new(DieselExpenseRepository::new(pool.clone())),
        invoices: Arc::new(DieselInvoiceRepository::new(pool.clone())),
        password_resets: Arc::new(DieselPasswordResetRepository::new(pool.clone())),
        mail: Arc::new(TracingMailSender),
        health: Arc::new(HealthState::new()),
        client_url: client_url.to_owned(),
    }
}

/// Build the HTTP state from the server configuration.
///
/// Uses PostgreSQL when a pool is configured; falls back to the
/// in-process store otherwise, which keeps local development free of a
/// database requirement.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => diesel_state(pool, &config.client_url),
        None => {
            tracing::warn!("no database configured, using in-memory store");
            HttpState::in_memory(MemoryStore::new(), config.client_url.clone())
        }
    }
}
