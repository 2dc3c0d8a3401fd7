//! Internal Diesel row structs and enum text codecs.
//!
//! Row types are implementation details of the persistence layer and
//! never cross the port boundary. Domain enums are stored as text using
//! their wire spelling; `*_from_db` returns an error message for values
//! the schema should have prevented.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::employee::{Currency, Department, TechStack};
use crate::domain::expense::Month;
use crate::domain::invoice::InvoiceStatus;
use crate::domain::project::{ProjectStatus, ProjectType, SalesChannel};

use super::schema::{
    employees, expense_categories, expenses, invoices, password_reset_tokens, project_assignments,
    projects, users,
};

/// Row for the users table, used for reads, inserts, and updates alike.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub image: Option<String>,
    pub password_hash: String,
}

/// Row for the employees table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EmployeeRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
    pub salary: f64,
    pub currency: String,
    pub tech_stack: String,
    pub is_employed: bool,
    pub hiring_date: NaiveDate,
    pub termination_date: Option<NaiveDate>,
    pub image: Option<String>,
}

/// Row for the projects table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub actual_end_date: Option<NaiveDate>,
    pub project_type: String,
    pub hourly_rate: f64,
    pub project_value_bam: f64,
    pub project_velocity: f64,
    pub sales_channel: String,
    pub project_status: String,
}

/// Row for the project_assignments join table.
#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = project_assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub project_id: Uuid,
    pub employee_id: Uuid,
    pub part_time: bool,
}

/// Row for the expense_categories table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = expense_categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseCategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Row for the expenses table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = expenses)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseRow {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub planned_expense: f64,
    pub actual_expense: Option<f64>,
    pub expense_category_id: Uuid,
}

/// Row for the invoices table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = invoices)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InvoiceRow {
    pub id: Uuid,
    pub client: String,
    pub industry: String,
    pub total_hours_billed: i32,
    pub amount_billed_bam: f64,
    pub invoice_status: String,
}

/// Row for the password_reset_tokens table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = password_reset_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PasswordResetTokenRow {
    pub user_id: Uuid,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
}

fn unrecognised(column: &str, value: &str) -> String {
    format!("unrecognised {column} value: {value}")
}

pub(crate) fn department_to_db(department: Department) -> &'static str {
    match department {
        Department::Administration => "Administration",
        Department::Management => "Management",
        Department::Development => "Development",
        Department::Design => "Design",
    }
}

pub(crate) fn department_from_db(value: &str) -> Result<Department, String> {
    match value {
        "Administration" => Ok(Department::Administration),
        "Management" => Ok(Department::Management),
        "Development" => Ok(Department::Development),
        "Design" => Ok(Department::Design),
        other => Err(unrecognised("department", other)),
    }
}

pub(crate) fn currency_to_db(currency: Currency) -> &'static str {
    match currency {
        Currency::Usd => "USD",
        Currency::Eur => "EUR",
        Currency::Bam => "BAM",
    }
}

pub(crate) fn currency_from_db(value: &str) -> Result<Currency, String> {
    match value {
        "USD" => Ok(Currency::Usd),
        "EUR" => Ok(Currency::Eur),
        "BAM" => Ok(Currency::Bam),
        other => Err(unrecognised("currency", other)),
    }
}

pub(crate) fn tech_stack_to_db(tech_stack: TechStack) -> &'static str {
    match tech_stack {
        TechStack::AdminNA => "AdminNA",
        TechStack::MgmtNA => "MgmtNA",
        TechStack::FullStack => "FullStack",
        TechStack::Backend => "Backend",
        TechStack::Frontend => "Frontend",
        TechStack::UxUi => "UXUI",
    }
}

pub(crate) fn tech_stack_from_db(value: &str) -> Result<TechStack, String> {
    match value {
        "AdminNA" => Ok(TechStack::AdminNA),
        "MgmtNA" => Ok(TechStack::MgmtNA),
        "FullStack" => Ok(TechStack::FullStack),
        "Backend" => Ok(TechStack::Backend),
        "Frontend" => Ok(TechStack::Frontend),
        "UXUI" => Ok(TechStack::UxUi),
        other => Err(unrecognised("tech_stack", other)),
    }
}

pub(crate) fn project_type_to_db(project_type: ProjectType) -> &'static str {
    match project_type {
        ProjectType::Fixed => "Fixed",
        ProjectType::OnGoing => "OnGoing",
    }
}

pub(crate) fn project_type_from_db(value: &str) -> Result<ProjectType, String> {
    match value {
        "Fixed" => Ok(ProjectType::Fixed),
        "OnGoing" => Ok(ProjectType::OnGoing),
        other => Err(unrecognised("project_type", other)),
    }
}

pub(crate) fn sales_channel_to_db(channel: SalesChannel) -> &'static str {
    match channel {
        SalesChannel::Online => "Online",
        SalesChannel::InPerson => "InPerson",
        SalesChannel::Referral => "Referral",
        SalesChannel::Other => "Other",
    }
}

pub(crate) fn sales_channel_from_db(value: &str) -> Result<SalesChannel, String> {
    match value {
        "Online" => Ok(SalesChannel::Online),
        "InPerson" => Ok(SalesChannel::InPerson),
        "Referral" => Ok(SalesChannel::Referral),
        "Other" => Ok(SalesChannel::Other),
        other => Err(unrecognised("sales_channel", other)),
    }
}

pub(crate) fn project_status_to_db(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Active => "Active",
        ProjectStatus::OnHold => "OnHold",
        ProjectStatus::Inactive => "Inactive",
        ProjectStatus::Completed => "Completed",
    }
}

pub(crate) fn project_status_from_db(value: &str) -> Result<ProjectStatus, String> {
    match value {
        "Active" => Ok(ProjectStatus::Active),
        "OnHold" => Ok(ProjectStatus::OnHold),
        "Inactive" => Ok(ProjectStatus::Inactive),
        "Completed" => Ok(ProjectStatus::Completed),
        other => Err(unrecognised("project_status", other)),
    }
}

pub(crate) fn invoice_status_to_db(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Paid => "Paid",
        InvoiceStatus::Sent => "Sent",
        InvoiceStatus::NotSent => "NotSent",
    }
}

pub(crate) fn invoice_status_from_db(value: &str) -> Result<InvoiceStatus, String> {
    match value {
        "Paid" => Ok(InvoiceStatus::Paid),
        "Sent" => Ok(InvoiceStatus::Sent),
        "NotSent" => Ok(InvoiceStatus::NotSent),
        other => Err(unrecognised("invoice_status", other)),
    }
}

pub(crate) fn month_to_db(month: Month) -> i32 {
    month.number() as i32
}

pub(crate) fn month_from_db(value: i32) -> Result<Month, String> {
    u32::try_from(value)
        .ok()
        .and_then(Month::from_number)
        .ok_or_else(|| unrecognised("month", &value.to_string()))
}
