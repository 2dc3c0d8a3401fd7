//! Port abstraction for invoice persistence adapters.

use async_trait::async_trait;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::invoice::{Invoice, InvoiceStatus};

use super::{define_port_error, OrderDirection};

define_port_error! {
    /// Persistence errors raised by invoice repository adapters.
    pub enum InvoicePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "invoice repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "invoice repository query failed: {message}",
    }
}

/// Sortable invoice list columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum InvoiceOrderField {
    #[serde(rename = "client")]
    Client,
    #[serde(rename = "industry")]
    Industry,
    #[serde(rename = "totalHoursBilled")]
    TotalHoursBilled,
    #[serde(rename = "amountBilledBAM")]
    AmountBilled,
    #[serde(rename = "invoiceStatus")]
    InvoiceStatus,
}

/// Optional narrowing criteria for the invoice list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceFilter {
    /// Case-insensitive substring match on the client name.
    pub client: Option<String>,
    pub invoice_status: Option<InvoiceStatus>,
}

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Invoices matching `filter`, ordered when requested. Pagination is
    /// applied by the caller.
    async fn list(
        &self,
        filter: &InvoiceFilter,
        order: Option<(InvoiceOrderField, OrderDirection)>,
    ) -> Result<Vec<Invoice>, InvoicePersistenceError>;

    /// Fetch an invoice by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoicePersistenceError>;

    /// Insert a new invoice.
    async fn create(&self, invoice: &Invoice) -> Result<(), InvoicePersistenceError>;

    /// Replace an existing invoice.
    async fn update(&self, invoice: &Invoice) -> Result<(), InvoicePersistenceError>;

    /// Remove an invoice. Returns whether a record was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, InvoicePersistenceError>;
}
