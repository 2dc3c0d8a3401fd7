//! Domain ports for the hexagonal boundary.
//!
//! Inbound adapters (HTTP handlers) depend on these traits; outbound
//! adapters (diesel, in-memory, mail) implement them.

mod macros;
pub(crate) use macros::define_port_error;

mod employee_repository;
mod expense_repository;
mod invoice_repository;
mod mail_sender;
mod password_reset_repository;
mod project_repository;
mod user_repository;

pub use employee_repository::{
    EmployeeFilter, EmployeeOrderField, EmployeePersistenceError, EmployeeRepository,
};
pub use expense_repository::{
    ExpenseCategoryRepository, ExpensePersistenceError, ExpenseRepository,
};
pub use invoice_repository::{
    InvoiceFilter, InvoiceOrderField, InvoicePersistenceError, InvoiceRepository,
};
pub use mail_sender::{MailDeliveryError, MailSender, ResetPasswordMail};
pub use password_reset_repository::{
    PasswordResetPersistenceError, PasswordResetRepository, PasswordResetToken,
};
pub use project_repository::{
    ProjectFilter, ProjectOrderField, ProjectPersistenceError, ProjectRepository,
};
pub use user_repository::{UserPersistenceError, UserRepository};

use serde::Deserialize;
use utoipa::ToSchema;

/// Sort direction shared by every ordered list port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum OrderDirection {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

impl OrderDirection {
    /// Apply the direction to an already ascending ordering.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn descending_reverses_the_ordering() {
        assert_eq!(OrderDirection::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(OrderDirection::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(OrderDirection::Desc.apply(Ordering::Equal), Ordering::Equal);
    }
}
