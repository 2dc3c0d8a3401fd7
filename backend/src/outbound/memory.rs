//! In-process adapter implementing every repository port.
//!
//! Backs the server when no `DATABASE_URL` is configured and gives the
//! handler test suites a deterministic store without a database.

use std::cmp::Ordering;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::employee::Employee;
use crate::domain::expense::{Expense, ExpenseCategory, Month};
use crate::domain::invoice::Invoice;
use crate::domain::ports::{
    EmployeeFilter, EmployeeOrderField, EmployeePersistenceError, EmployeeRepository,
    ExpenseCategoryRepository, ExpensePersistenceError, ExpenseRepository, InvoiceFilter,
    InvoiceOrderField, InvoicePersistenceError, InvoiceRepository, OrderDirection,
    PasswordResetPersistenceError, PasswordResetRepository, PasswordResetToken, ProjectFilter,
    ProjectOrderField, ProjectPersistenceError, ProjectRepository, UserPersistenceError,
    UserRepository,
};
use crate::domain::project::Project;
use crate::domain::reporting::{AssignmentSpan, ProjectStaffing, StaffedAssignment, StaffingRecord};
use crate::domain::user::{Email, User};

#[derive(Debug, Default)]
struct Inner {
    users: Vec<User>,
    employees: Vec<Employee>,
    projects: Vec<Project>,
    categories: Vec<ExpenseCategory>,
    expenses: Vec<Expense>,
    invoices: Vec<Invoice>,
    reset_tokens: Vec<PasswordResetToken>,
}

/// Shared in-memory store. Clones observe the same data.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look a registered user up by email, bypassing the repository port.
    #[cfg(test)]
    pub fn user_id_by_email(&self, email: &str) -> Option<Uuid> {
        self.read()
            .users
            .iter()
            .find(|u| u.email.as_ref() == email)
            .map(|u| u.id)
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.read().users.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read().users.iter().find(|u| u.email == *email).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.write().users.push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut inner = self.write();
        match inner.users.iter_mut().find(|u| u.id == user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(UserPersistenceError::query("user vanished during update")),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserPersistenceError> {
        let mut inner = self.write();
        let before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        Ok(inner.users.len() < before)
    }
}

fn employee_matches(employee: &Employee, filter: &EmployeeFilter) -> bool {
    if let Some(term) = &filter.search_term {
        if !employee.matches_search(term) {
            return false;
        }
    }
    if filter.currency.is_some_and(|c| employee.currency != c) {
        return false;
    }
    if filter.department.is_some_and(|d| employee.department != d) {
        return false;
    }
    if filter.tech_stack.is_some_and(|t| employee.tech_stack != t) {
        return false;
    }
    if filter.is_employed.is_some_and(|e| employee.is_employed != e) {
        return false;
    }
    if filter
        .hired_since
        .is_some_and(|since| employee.hiring_date < since)
    {
        return false;
    }
    if filter.terminated_until.is_some_and(|until| {
        !employee
            .termination_date
            .is_some_and(|terminated| terminated <= until)
    }) {
        return false;
    }
    true
}

fn compare_employees(a: &Employee, b: &Employee, field: EmployeeOrderField) -> Ordering {
    match field {
        EmployeeOrderField::FirstName => a.first_name.cmp(&b.first_name),
        EmployeeOrderField::LastName => a.last_name.cmp(&b.last_name),
        EmployeeOrderField::Department => (a.department as u8).cmp(&(b.department as u8)),
        EmployeeOrderField::Salary => cmp_f64(a.salary, b.salary),
        EmployeeOrderField::TechStack => (a.tech_stack as u8).cmp(&(b.tech_stack as u8)),
    }
}

#[async_trait]
impl EmployeeRepository for MemoryStore {
    async fn list(
        &self,
        filter: &EmployeeFilter,
        order: Option<(EmployeeOrderField, OrderDirection)>,
    ) -> Result<Vec<Employee>, EmployeePersistenceError> {
        let mut employees: Vec<Employee> = self
            .read()
            .employees
            .iter()
            .filter(|e| employee_matches(e, filter))
            .cloned()
            .collect();
        if let Some((field, direction)) = order {
            employees.sort_by(|a, b| direction.apply(compare_employees(a, b, field)));
        }
        Ok(employees)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, EmployeePersistenceError> {
        Ok(self.read().employees.iter().find(|e| e.id == id).cloned())
    }

    async fn staffing(&self) -> Result<Vec<StaffingRecord>, EmployeePersistenceError> {
        let inner = self.read();
        Ok(inner
            .employees
            .iter()
            .map(|employee| StaffingRecord {
                employee: employee.clone(),
                assignments: inner
                    .projects
                    .iter()
                    .flat_map(|project| {
                        project
                            .assignments
                            .iter()
                            .filter(|a| a.employee_id == employee.id)
                            .map(|a| AssignmentSpan {
                                start_date: project.start_date,
                                end_date: project.end_date,
                                part_time: a.part_time,
                            })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn create(&self, employee: &Employee) -> Result<(), EmployeePersistenceError> {
        self.write().employees.push(employee.clone());
        Ok(())
    }

    async fn update(&self, employee: &Employee) -> Result<(), EmployeePersistenceError> {
        let mut inner = self.write();
        match inner.employees.iter_mut().find(|e| e.id == employee.id) {
            Some(stored) => {
                *stored = employee.clone();
                Ok(())
            }
            None => Err(EmployeePersistenceError::query(
                "employee vanished during update",
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EmployeePersistenceError> {
        let mut inner = self.write();
        let before = inner.employees.len();
        inner.employees.retain(|e| e.id != id);
        // Assignments referencing the employee go with it.
        for project in &mut inner.projects {
            project.assignments.retain(|a| a.employee_id != id);
        }
        Ok(inner.employees.len() < before)
    }
}

fn project_matches(project: &Project, filter: &ProjectFilter) -> bool {
    if let Some(name) = &filter.name {
        if !project.name.to_lowercase().contains(&name.to_lowercase()) {
            return false;
        }
    }
    if filter
        .started_since
        .is_some_and(|since| project.start_date < since)
    {
        return false;
    }
    if filter
        .ended_until
        .is_some_and(|until| project.end_date > until)
    {
        return false;
    }
    if filter
        .project_type
        .is_some_and(|t| project.project_type != t)
    {
        return false;
    }
    if filter
        .sales_channel
        .is_some_and(|c| project.sales_channel != c)
    {
        return false;
    }
    if filter
        .project_status
        .is_some_and(|s| project.project_status != s)
    {
        return false;
    }
    true
}

fn compare_projects(a: &Project, b: &Project, field: ProjectOrderField) -> Ordering {
    match field {
        ProjectOrderField::Name => a.name.cmp(&b.name),
        ProjectOrderField::Description => a.description.cmp(&b.description),
        ProjectOrderField::StartDate => a.start_date.cmp(&b.start_date),
        ProjectOrderField::EndDate => a.end_date.cmp(&b.end_date),
        ProjectOrderField::ProjectType => (a.project_type as u8).cmp(&(b.project_type as u8)),
        ProjectOrderField::HourlyRate => cmp_f64(a.hourly_rate, b.hourly_rate),
        ProjectOrderField::ProjectValue => cmp_f64(a.project_value_bam, b.project_value_bam),
        ProjectOrderField::ProjectVelocity => cmp_f64(a.project_velocity, b.project_velocity),
        ProjectOrderField::SalesChannel => (a.sales_channel as u8).cmp(&(b.sales_channel as u8)),
        ProjectOrderField::ProjectStatus => {
            (a.project_status as u8).cmp(&(b.project_status as u8))
        }
        ProjectOrderField::EmployeesCount => a.assignments.len().cmp(&b.assignments.len()),
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn list(
        &self,
        filter: &ProjectFilter,
        order: Option<(ProjectOrderField, OrderDirection)>,
    ) -> Result<Vec<Project>, ProjectPersistenceError> {
        let mut projects: Vec<Project> = self
            .read()
            .projects
            .iter()
            .filter(|p| project_matches(p, filter))
            .cloned()
            .collect();
        if let Some((field, direction)) = order {
            projects.sort_by(|a, b| direction.apply(compare_projects(a, b, field)));
        }
        Ok(projects)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self.read().projects.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, ProjectPersistenceError> {
        Ok(self
            .read()
            .projects
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn staffing(&self) -> Result<Vec<ProjectStaffing>, ProjectPersistenceError> {
        let inner = self.read();
        Ok(inner
            .projects
            .iter()
            .map(|project| ProjectStaffing {
                project: project.clone(),
                staff: project
                    .assignments
                    .iter()
                    .filter_map(|assignment| {
                        inner
                            .employees
                            .iter()
                            .find(|e| e.id == assignment.employee_id)
                            .map(|employee| StaffedAssignment {
                                part_time: assignment.part_time,
                                salary: employee.salary,
                                currency: employee.currency,
                            })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn create(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        self.write().projects.push(project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut inner = self.write();
        match inner.projects.iter_mut().find(|p| p.id == project.id) {
            Some(stored) => {
                *stored = project.clone();
                Ok(())
            }
            None => Err(ProjectPersistenceError::query(
                "project vanished during update",
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProjectPersistenceError> {
        let mut inner = self.write();
        let before = inner.projects.len();
        inner.projects.retain(|p| p.id != id);
        Ok(inner.projects.len() < before)
    }
}

#[async_trait]
impl ExpenseCategoryRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<ExpenseCategory>, ExpensePersistenceError> {
        Ok(self.read().categories.clone())
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<ExpenseCategory>, ExpensePersistenceError> {
        Ok(self.read().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<ExpenseCategory>, ExpensePersistenceError> {
        Ok(self
            .read()
            .categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }

    async fn create(&self, category: &ExpenseCategory) -> Result<(), ExpensePersistenceError> {
        self.write().categories.push(category.clone());
        Ok(())
    }

    async fn update(&self, category: &ExpenseCategory) -> Result<(), ExpensePersistenceError> {
        let mut inner = self.write();
        match inner.categories.iter_mut().find(|c| c.id == category.id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(())
            }
            None => Err(ExpensePersistenceError::query(
                "expense category vanished during update",
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExpensePersistenceError> {
        let mut inner = self.write();
        let before = inner.categories.len();
        inner.categories.retain(|c| c.id != id);
        Ok(inner.categories.len() < before)
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Expense>, ExpensePersistenceError> {
        Ok(self.read().expenses.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Expense>, ExpensePersistenceError> {
        Ok(self.read().expenses.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_period(
        &self,
        year: i32,
        month: Month,
        category_id: Uuid,
    ) -> Result<Option<Expense>, ExpensePersistenceError> {
        Ok(self
            .read()
            .expenses
            .iter()
            .find(|e| e.year == year && e.month == month && e.expense_category_id == category_id)
            .cloned())
    }

    async fn create(&self, expense: &Expense) -> Result<(), ExpensePersistenceError> {
        self.write().expenses.push(expense.clone());
        Ok(())
    }

    async fn update(&self, expense: &Expense) -> Result<(), ExpensePersistenceError> {
        let mut inner = self.write();
        match inner.expenses.iter_mut().find(|e| e.id == expense.id) {
            Some(stored) => {
                *stored = expense.clone();
                Ok(())
            }
            None => Err(ExpensePersistenceError::query(
                "expense vanished during update",
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ExpensePersistenceError> {
        let mut inner = self.write();
        let before = inner.expenses.len();
        inner.expenses.retain(|e| e.id != id);
        Ok(inner.expenses.len() < before)
    }
}

fn invoice_matches(invoice: &Invoice, filter: &InvoiceFilter) -> bool {
    if let Some(client) = &filter.client {
        if !invoice.matches_client(client) {
            return false;
        }
    }
    if filter
        .invoice_status
        .is_some_and(|s| invoice.invoice_status != s)
    {
        return false;
    }
    true
}

fn compare_invoices(a: &Invoice, b: &Invoice, field: InvoiceOrderField) -> Ordering {
    match field {
        InvoiceOrderField::Client => a.client.cmp(&b.client),
        InvoiceOrderField::Industry => a.industry.cmp(&b.industry),
        InvoiceOrderField::TotalHoursBilled => a.total_hours_billed.cmp(&b.total_hours_billed),
        InvoiceOrderField::AmountBilled => cmp_f64(a.amount_billed_bam, b.amount_billed_bam),
        InvoiceOrderField::InvoiceStatus => {
            (a.invoice_status as u8).cmp(&(b.invoice_status as u8))
        }
    }
}

#[async_trait]
impl InvoiceRepository for MemoryStore {
    async fn list(
        &self,
        filter: &InvoiceFilter,
        order: Option<(InvoiceOrderField, OrderDirection)>,
    ) -> Result<Vec<Invoice>, InvoicePersistenceError> {
        let mut invoices: Vec<Invoice> = self
            .read()
            .invoices
            .iter()
            .filter(|i| invoice_matches(i, filter))
            .cloned()
            .collect();
        if let Some((field, direction)) = order {
            invoices.sort_by(|a, b| direction.apply(compare_invoices(a, b, field)));
        }
        Ok(invoices)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, InvoicePersistenceError> {
        Ok(self.read().invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, invoice: &Invoice) -> Result<(), InvoicePersistenceError> {
        self.write().invoices.push(invoice.clone());
        Ok(())
    }

    async fn update(&self, invoice: &Invoice) -> Result<(), InvoicePersistenceError> {
        let mut inner = self.write();
        match inner.invoices.iter_mut().find(|i| i.id == invoice.id) {
            Some(stored) => {
                *stored = invoice.clone();
                Ok(())
            }
            None => Err(InvoicePersistenceError::query(
                "invoice vanished during update",
            )),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, InvoicePersistenceError> {
        let mut inner = self.write();
        let before = inner.invoices.len();
        inner.invoices.retain(|i| i.id != id);
        Ok(inner.invoices.len() < before)
    }
}

#[async_trait]
impl PasswordResetRepository for MemoryStore {
    async fn store(
        &self,
        token: &PasswordResetToken,
    ) -> Result<(), PasswordResetPersistenceError> {
        self.write().reset_tokens.push(token.clone());
        Ok(())
    }

    async fn find(
        &self,
        user_id: Uuid,
        token_digest: &str,
    ) -> Result<Option<PasswordResetToken>, PasswordResetPersistenceError> {
        Ok(self
            .read()
            .reset_tokens
            .iter()
            .find(|t| t.user_id == user_id && t.token_digest == token_digest)
            .cloned())
    }

    async fn revoke_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<(), PasswordResetPersistenceError> {
        self.write().reset_tokens.retain(|t| t.user_id != user_id);
        Ok(())
    }
}
