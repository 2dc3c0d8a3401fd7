//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API:
//! every endpoint of the inbound layer, the domain schemas they
//! reference, and the session cookie security scheme. Swagger UI serves
//! the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Opsbook API",
        description = "Business operations backend: accounts, employees, \
                       projects, expenses, invoices, and derived reports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::auth::send_reset_password,
        crate::inbound::http::auth::reset_password,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
        crate::inbound::http::employees::list_employees,
        crate::inbound::http::employees::employees_info,
        crate::inbound::http::employees::get_employee,
        crate::inbound::http::employees::create_employee,
        crate::inbound::http::employees::update_employee,
        crate::inbound::http::employees::delete_employee,
        crate::inbound::http::projects::list_projects,
        crate::inbound::http::projects::projects_info,
        crate::inbound::http::projects::get_project,
        crate::inbound::http::projects::create_project,
        crate::inbound::http::projects::update_project,
        crate::inbound::http::projects::delete_project,
        crate::inbound::http::expense_categories::list_expense_categories,
        crate::inbound::http::expense_categories::get_expense_category,
        crate::inbound::http::expense_categories::create_expense_category,
        crate::inbound::http::expense_categories::update_expense_category,
        crate::inbound::http::expense_categories::delete_expense_category,
        crate::inbound::http::expenses::list_expenses,
        crate::inbound::http::expenses::expenses_info,
        crate::inbound::http::expenses::get_expense,
        crate::inbound::http::expenses::create_expense,
        crate::inbound::http::expenses::update_expense,
        crate::inbound::http::expenses::delete_expense,
        crate::inbound::http::invoices::list_invoices,
        crate::inbound::http::invoices::get_invoice,
        crate::inbound::http::invoices::create_invoice,
        crate::inbound::http::invoices::update_invoice,
        crate::inbound::http::invoices::delete_invoice,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ready,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::user::User,
        crate::domain::user::Role,
        crate::domain::employee::Employee,
        crate::domain::employee::Department,
        crate::domain::employee::Currency,
        crate::domain::employee::TechStack,
        crate::domain::project::Project,
        crate::domain::project::ProjectType,
        crate::domain::project::SalesChannel,
        crate::domain::project::ProjectStatus,
        crate::domain::project::Assignment,
        crate::domain::expense::ExpenseCategory,
        crate::domain::expense::Expense,
        crate::domain::expense::Month,
        crate::domain::invoice::Invoice,
        crate::domain::invoice::InvoiceStatus,
        crate::domain::reporting::MonthlyUtilization,
        crate::domain::reporting::PortfolioSummary,
        crate::domain::reporting::ProjectSnapshot,
        crate::domain::reporting::ExpenseReport,
        crate::domain::reporting::CategoryTotals,
        crate::domain::reporting::MonthlyExpenseTotal,
        pagination::PageInfo,
    )),
    tags(
        (name = "auth", description = "Registration, sessions, and password recovery"),
        (name = "users", description = "Account administration"),
        (name = "employees", description = "Employee records and utilization reporting"),
        (name = "projects", description = "Project records and portfolio reporting"),
        (name = "expense-categories", description = "Expense bookkeeping categories"),
        (name = "expenses", description = "Monthly expenses and variance reporting"),
        (name = "invoices", description = "Invoices billed to clients"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
