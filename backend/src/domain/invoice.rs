//! Invoices billed to clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Validation errors raised by invoice constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceValidationError {
    #[error("Client can't be empty.")]
    EmptyClient,
    #[error("Industry can't be empty.")]
    EmptyIndustry,
    #[error("Total hours billed must be a positive number.")]
    NonPositiveHours,
    #[error("Amount billed must be a positive number.")]
    NonPositiveAmount,
}

/// Payment state of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum InvoiceStatus {
    Paid,
    Sent,
    NotSent,
}

impl InvoiceStatus {
    pub const ALL: [Self; 3] = [Self::Paid, Self::Sent, Self::NotSent];
}

/// Invoice raised against a client.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub client: String,
    pub industry: String,
    pub total_hours_billed: u32,
    #[serde(rename = "amountBilledBAM")]
    pub amount_billed_bam: f64,
    pub invoice_status: InvoiceStatus,
}

impl Invoice {
    pub fn validate(&self) -> Result<(), InvoiceValidationError> {
        if self.client.trim().is_empty() {
            return Err(InvoiceValidationError::EmptyClient);
        }
        if self.industry.trim().is_empty() {
            return Err(InvoiceValidationError::EmptyIndustry);
        }
        if self.total_hours_billed == 0 {
            return Err(InvoiceValidationError::NonPositiveHours);
        }
        if self.amount_billed_bam <= 0.0 {
            return Err(InvoiceValidationError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Case-insensitive substring match on the client name.
    pub fn matches_client(&self, term: &str) -> bool {
        self.client.to_lowercase().contains(&term.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn invoice() -> Invoice {
        Invoice {
            id: Uuid::new_v4(),
            client: "Globex".to_owned(),
            industry: "Logistics".to_owned(),
            total_hours_billed: 160,
            amount_billed_bam: 14_400.0,
            invoice_status: InvoiceStatus::Sent,
        }
    }

    #[test]
    fn accepts_a_well_formed_invoice() {
        assert_eq!(invoice().validate(), Ok(()));
    }

    #[rstest]
    #[case("", InvoiceValidationError::EmptyClient)]
    #[case("   ", InvoiceValidationError::EmptyClient)]
    fn rejects_blank_client(#[case] client: &str, #[case] expected: InvoiceValidationError) {
        let mut i = invoice();
        i.client = client.to_owned();
        assert_eq!(i.validate(), Err(expected));
    }

    #[test]
    fn rejects_zero_hours() {
        let mut i = invoice();
        i.total_hours_billed = 0;
        assert_eq!(i.validate(), Err(InvoiceValidationError::NonPositiveHours));
    }

    #[test]
    fn rejects_non_positive_amount() {
        let mut i = invoice();
        i.amount_billed_bam = 0.0;
        assert_eq!(i.validate(), Err(InvoiceValidationError::NonPositiveAmount));
    }

    #[test]
    fn client_match_ignores_case() {
        let i = invoice();
        assert!(i.matches_client("glo"));
        assert!(i.matches_client("BEX"));
        assert!(!i.matches_client("acme"));
    }

    #[test]
    fn amount_field_serializes_with_bam_suffix() {
        let value = serde_json::to_value(invoice()).expect("serialize invoice");
        assert!(value.get("amountBilledBAM").is_some());
        assert!(value.get("amountBilledBam").is_none());
    }
}
