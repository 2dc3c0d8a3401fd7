//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend
//! only on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::inbound::http::health::HealthState;

use crate::domain::ports::{
    EmployeeRepository, ExpenseCategoryRepository, ExpenseRepository, InvoiceRepository,
    MailSender, PasswordResetRepository, ProjectRepository, UserRepository,
};
use crate::outbound::mail::TracingMailSender;
use crate::outbound::memory::MemoryStore;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub employees: Arc<dyn EmployeeRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub expense_categories: Arc<dyn ExpenseCategoryRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub password_resets: Arc<dyn PasswordResetRepository>,
    pub mail: Arc<dyn MailSender>,
    /// Liveness and readiness flags served by the health probes.
    pub health: Arc<HealthState>,
    /// Base URL of the web client, used to build reset password links.
    pub client_url: String,
}

impl HttpState {
    /// State backed entirely by one shared in-memory store.
    pub fn in_memory(store: MemoryStore, client_url: impl Into<String>) -> Self {
        Self {
            users: Arc::new(store.clone()),
            employees: Arc::new(store.clone()),
            projects: Arc::new(store.clone()),
            expense_categories: Arc::new(store.clone()),
            expenses: Arc::new(store.clone()),
            invoices: Arc::new(store.clone()),
            password_resets: Arc::new(store),
            mail: Arc::new(TracingMailSender),
            health: Arc::new(HealthState::new()),
            client_url: client_url.into(),
        }
    }
}
