//! Port abstraction for employee persistence adapters.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::employee::{Currency, Department, Employee, TechStack};
use crate::domain::reporting::StaffingRecord;

use super::{define_port_error, OrderDirection};

define_port_error! {
    /// Persistence errors raised by employee repository adapters.
    pub enum EmployeePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "employee repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "employee repository query failed: {message}",
    }
}

/// Sortable employee list columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum EmployeeOrderField {
    #[serde(rename = "firstName")]
    FirstName,
    #[serde(rename = "lastName")]
    LastName,
    #[serde(rename = "department")]
    Department,
    #[serde(rename = "salary")]
    Salary,
    #[serde(rename = "techStack")]
    TechStack,
}

/// Optional narrowing criteria for the employee list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeFilter {
    /// Case-insensitive match on first name, last name, or "first last".
    pub search_term: Option<String>,
    pub currency: Option<Currency>,
    pub department: Option<Department>,
    pub tech_stack: Option<TechStack>,
    pub is_employed: Option<bool>,
    /// Keep employees hired on or after this day.
    pub hired_since: Option<NaiveDate>,
    /// Keep employees terminated on or before this day.
    pub terminated_until: Option<NaiveDate>,
}

#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// Employees matching `filter`, ordered when requested. Pagination is
    /// applied by the caller.
    async fn list(
        &self,
        filter: &EmployeeFilter,
        order: Option<(EmployeeOrderField, OrderDirection)>,
    ) -> Result<Vec<Employee>, EmployeePersistenceError>;

    /// Fetch an employee by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, EmployeePersistenceError>;

    /// Every employee joined with the schedules of their assignments,
    /// as consumed by the utilization report.
    async fn staffing(&self) -> Result<Vec<StaffingRecord>, EmployeePersistenceError>;

    /// Insert a new employee record.
    async fn create(&self, employee: &Employee) -> Result<(), EmployeePersistenceError>;

    /// Replace an existing employee record.
    async fn update(&self, employee: &Employee) -> Result<(), EmployeePersistenceError>;

    /// Remove an employee record. Returns whether a record was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, EmployeePersistenceError>;
}
