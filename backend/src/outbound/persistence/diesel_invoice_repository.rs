//! PostgreSQL-backed `InvoiceRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::invoice::Invoice;
use crate::domain::ports::{
    InvoiceFilter, InvoiceOrderField, InvoicePersistenceError, InvoiceRepository, OrderDirection,
};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{invoice_status_from_db, invoice_status_to_db, InvoiceRow};
use super::pool::DbPool;
use super::schema::invoices;

/// Diesel-backed implementation of the `InvoiceRepository` port.
#[derive(Clone)]
pub struct DieselInvoiceRepository {
    pool: DbPool,
}

impl DieselInvoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_invoice(row: InvoiceRow) -> Result<Invoice, InvoicePersistenceError> {
    let invalid = |error: &dyn std::fmt::Display| {
        InvoicePersistenceError::query(format!("stored invoice {} is invalid: {error}", row.id))
    };
    let total_hours_billed = u32::try_from(row.total_hours_billed)
        .map_err(|_| invalid(&format!("negative hours: {}", row.total_hours_billed)))?;
    Ok(Invoice {
        id: row.id,
        client: row.client,
        industry: row.industry,
        total_hours_billed,
        amount_billed_bam: row.amount_billed_bam,
        invoice_status: invoice_status_from_db(&row.invoice_status).map_err(|e| invalid(&e))?,
    })
}

fn invoice_to_row(invoice: &Invoice) -> InvoiceRow {
    InvoiceRow {
        id: invoice.id,
        client: invoice.client.clone(),
        industry: invoice.industry.clone(),
        // Billed hours stay well inside i32 range.
        total_hours_billed: invoice.total_hours_billed as i32,
        amount_billed_bam: invoice.amount_billed_bam,
        invoice_status: invoice_status_to_db(invoice.invoice_status).to_owned(),
    }
}

type BoxedInvoiceQuery<'a> = invoices::BoxedQuery<'a, diesel::pg::Pg>;

fn apply_filter<'a>(
    mut query: BoxedInvoiceQuery<'a>,
    filter: &'a InvoiceFilter,
) -> BoxedInvoiceQuery<'a> {
    if let Some(client) = &filter.client {
        let escaped = client
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        query = query.filter(invoices::client.ilike(format!("%{escaped}%")));
    }
    if let Some(status) = filter.invoice_status {
        query = query.filter(invoices::invoice_status.eq(invoice_status_to_db(status)));
    }
    query
}

fn apply_order(
    query: BoxedInvoiceQuery<'_>,
    field: InvoiceOrderField,
    direction: OrderDirection,
) -> BoxedInvoiceQuery<'_> {
    macro_rules! order_by {
        ($column:expr) => {
            match direction {
                OrderDirection::Asc => query.order($column.asc()),
                OrderDirection::Desc => query.order($column.desc()),
            }
        };
    }
    match field {
        InvoiceOrderField::Client => order_by!(invoices::client),
        InvoiceOrderField::Industry => order_by!(invoices::industry),
        InvoiceOrderField::TotalHoursBilled => order_by!(invoices::total_hours_billed),
        InvoiceOrderField::AmountBilled => order_by!(invoices::amount_billed_bam),
        InvoiceOrderField::InvoiceStatus => order_by!(invoices::invoice_status),
    }
}

#[async_trait]
impl InvoiceRepository for DieselInvoiceRepository {
    async fn list(
        &self,
        filter: &InvoiceFilter,
        order: Option<(InvoiceOrderField, OrderDirection)>,
    ) -> Result<Vec<Invoice>, InvoicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = apply_filter(invoices::table.into_boxed(), filter);
        if let Some((field, direction)) = order {
            query = apply_order(query, field, direction);
        }

        let rows: Vec<InvoiceRow> = query
            .select(InvoiceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_invoice).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<InvoiceRow> = invoices::table
            .find(id)
            .select(InvoiceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_invoice).transpose()
    }

    async fn create(&self, invoice: &Invoice) -> Result<(), InvoicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(invoices::table)
            .values(invoice_to_row(invoice))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), InvoicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(invoices::table.find(invoice.id))
            .set(invoice_to_row(invoice))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(InvoicePersistenceError::query(
                "invoice vanished during update",
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, InvoicePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(invoices::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invoice::InvoiceStatus;
    use rstest::rstest;

    fn row() -> InvoiceRow {
        InvoiceRow {
            id: Uuid::new_v4(),
            client: "Globex".to_owned(),
            industry: "Logistics".to_owned(),
            total_hours_billed: 160,
            amount_billed_bam: 14_400.0,
            invoice_status: "Sent".to_owned(),
        }
    }

    #[rstest]
    fn valid_row_converts() {
        let invoice = row_to_invoice(row()).unwrap();
        assert_eq!(invoice.client, "Globex");
        assert_eq!(invoice.invoice_status, InvoiceStatus::Sent);
    }

    #[rstest]
    fn negative_hours_surface_as_query_error() {
        let mut corrupt = row();
        corrupt.total_hours_billed = -8;
        let error = row_to_invoice(corrupt).unwrap_err();
        assert!(matches!(error, InvoicePersistenceError::Query { .. }));
    }

    #[rstest]
    fn domain_invoice_round_trips_through_the_row() {
        let invoice = row_to_invoice(row()).unwrap();
        let back = row_to_invoice(invoice_to_row(&invoice)).unwrap();
        assert_eq!(back, invoice);
    }
}
