//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod employees;
pub mod error;
pub mod expense_categories;
pub mod expenses;
pub mod health;
pub mod invoices;
pub mod projects;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;
use state::HttpState;

/// Map an adapter failure onto the redacted internal error, keeping the
/// cause in the log.
pub(crate) fn storage_error(error: impl std::fmt::Display) -> Error {
    tracing::error!(error = %error, "storage operation failed");
    Error::internal("Internal server error")
}

/// Register every route against the given state.
///
/// Fixed-path routes such as `/employees/info` are registered ahead of
/// their `/{id}` siblings so path matching picks them first.
pub fn configure(state: HttpState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(state))
            .service(health::live)
            .service(health::ready)
            .service(
                web::scope("/api")
                    .service(auth::register)
                    .service(auth::login)
                    .service(auth::logout)
                    .service(auth::me)
                    .service(auth::send_reset_password)
                    .service(auth::reset_password)
                    .service(users::list_users)
                    .service(users::get_user)
                    .service(users::update_user)
                    .service(users::delete_user)
                    .service(employees::list_employees)
                    .service(employees::employees_info)
                    .service(employees::get_employee)
                    .service(employees::create_employee)
                    .service(employees::update_employee)
                    .service(employees::delete_employee)
                    .service(projects::list_projects)
                    .service(projects::projects_info)
                    .service(projects::get_project)
                    .service(projects::create_project)
                    .service(projects::update_project)
                    .service(projects::delete_project)
                    .service(expense_categories::list_expense_categories)
                    .service(expense_categories::get_expense_category)
                    .service(expense_categories::create_expense_category)
                    .service(expense_categories::update_expense_category)
                    .service(expense_categories::delete_expense_category)
                    .service(expenses::list_expenses)
                    .service(expenses::expenses_info)
                    .service(expenses::get_expense)
                    .service(expenses::create_expense)
                    .service(expenses::update_expense)
                    .service(expenses::delete_expense)
                    .service(invoices::list_invoices)
                    .service(invoices::get_invoice)
                    .service(invoices::create_invoice)
                    .service(invoices::update_invoice)
                    .service(invoices::delete_invoice),
            );
    }
}
