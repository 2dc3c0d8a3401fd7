//! PostgreSQL-backed `EmployeeRepository` adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::employee::Employee;
use crate::domain::ports::{
    EmployeeFilter, EmployeeOrderField, EmployeePersistenceError, EmployeeRepository,
    OrderDirection,
};
use crate::domain::reporting::{AssignmentSpan, StaffingRecord};
use crate::domain::user::PersonName;

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{
    currency_from_db, currency_to_db, department_from_db, department_to_db, tech_stack_from_db,
    tech_stack_to_db, EmployeeRow,
};
use super::pool::DbPool;
use super::schema::{employees, project_assignments, projects};

/// Diesel-backed implementation of the `EmployeeRepository` port.
#[derive(Clone)]
pub struct DieselEmployeeRepository {
    pool: DbPool,
}

impl DieselEmployeeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_employee(row: EmployeeRow) -> Result<Employee, EmployeePersistenceError> {
    let invalid = |error: &dyn std::fmt::Display| {
        EmployeePersistenceError::query(format!("stored employee {} is invalid: {error}", row.id))
    };
    Ok(Employee {
        id: row.id,
        first_name: PersonName::new("firstName", row.first_name.clone())
            .map_err(|e| invalid(&e))?,
        last_name: PersonName::new("lastName", row.last_name.clone()).map_err(|e| invalid(&e))?,
        department: department_from_db(&row.department).map_err(|e| invalid(&e))?,
        salary: row.salary,
        currency: currency_from_db(&row.currency).map_err(|e| invalid(&e))?,
        tech_stack: tech_stack_from_db(&row.tech_stack).map_err(|e| invalid(&e))?,
        is_employed: row.is_employed,
        hiring_date: row.hiring_date,
        termination_date: row.termination_date,
        image: row.image,
    })
}

fn employee_to_row(employee: &Employee) -> EmployeeRow {
    EmployeeRow {
        id: employee.id,
        first_name: employee.first_name.as_ref().to_owned(),
        last_name: employee.last_name.as_ref().to_owned(),
        department: department_to_db(employee.department).to_owned(),
        salary: employee.salary,
        currency: currency_to_db(employee.currency).to_owned(),
        tech_stack: tech_stack_to_db(employee.tech_stack).to_owned(),
        is_employed: employee.is_employed,
        hiring_date: employee.hiring_date,
        termination_date: employee.termination_date,
        image: employee.image.clone(),
    }
}

/// Escape LIKE metacharacters in a user-supplied search term.
fn like_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

type BoxedEmployeeQuery<'a> = employees::BoxedQuery<'a, diesel::pg::Pg>;

fn apply_filter<'a>(
    mut query: BoxedEmployeeQuery<'a>,
    filter: &'a EmployeeFilter,
) -> BoxedEmployeeQuery<'a> {
    if let Some(term) = &filter.search_term {
        // "first last" matching keeps single-name searches covered too,
        // since each name is a substring of the concatenation.
        query = query.filter(
            employees::first_name
                .concat(" ")
                .concat(employees::last_name)
                .ilike(like_pattern(term.trim())),
        );
    }
    if let Some(currency) = filter.currency {
        query = query.filter(employees::currency.eq(currency_to_db(currency)));
    }
    if let Some(department) = filter.department {
        query = query.filter(employees::department.eq(department_to_db(department)));
    }
    if let Some(tech_stack) = filter.tech_stack {
        query = query.filter(employees::tech_stack.eq(tech_stack_to_db(tech_stack)));
    }
    if let Some(is_employed) = filter.is_employed {
        query = query.filter(employees::is_employed.eq(is_employed));
    }
    if let Some(hired_since) = filter.hired_since {
        query = query.filter(employees::hiring_date.ge(hired_since));
    }
    if let Some(terminated_until) = filter.terminated_until {
        query = query.filter(employees::termination_date.le(terminated_until));
    }
    query
}

fn apply_order(
    query: BoxedEmployeeQuery<'_>,
    field: EmployeeOrderField,
    direction: OrderDirection,
) -> BoxedEmployeeQuery<'_> {
    match (field, direction) {
        (EmployeeOrderField::FirstName, OrderDirection::Asc) => {
            query.order(employees::first_name.asc())
        }
        (EmployeeOrderField::FirstName, OrderDirection::Desc) => {
            query.order(employees::first_name.desc())
        }
        (EmployeeOrderField::LastName, OrderDirection::Asc) => {
            query.order(employees::last_name.asc())
        }
        (EmployeeOrderField::LastName, OrderDirection::Desc) => {
            query.order(employees::last_name.desc())
        }
        (EmployeeOrderField::Department, OrderDirection::Asc) => {
            query.order(employees::department.asc())
        }
        (EmployeeOrderField::Department, OrderDirection::Desc) => {
            query.order(employees::department.desc())
        }
        (EmployeeOrderField::Salary, OrderDirection::Asc) => query.order(employees::salary.asc()),
        (EmployeeOrderField::Salary, OrderDirection::Desc) => query.order(employees::salary.desc()),
        (EmployeeOrderField::TechStack, OrderDirection::Asc) => {
            query.order(employees::tech_stack.asc())
        }
        (EmployeeOrderField::TechStack, OrderDirection::Desc) => {
            query.order(employees::tech_stack.desc())
        }
    }
}

#[async_trait]
impl EmployeeRepository for DieselEmployeeRepository {
    async fn list(
        &self,
        filter: &EmployeeFilter,
        order: Option<(EmployeeOrderField, OrderDirection)>,
    ) -> Result<Vec<Employee>, EmployeePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = apply_filter(employees::table.into_boxed(), filter);
        if let Some((field, direction)) = order {
            query = apply_order(query, field, direction);
        }

        let rows: Vec<EmployeeRow> = query
            .select(EmployeeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_employee).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, EmployeePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<EmployeeRow> = employees::table
            .find(id)
            .select(EmployeeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_employee).transpose()
    }

    async fn staffing(&self) -> Result<Vec<StaffingRecord>, EmployeePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Both reads in one transaction so the join observes a consistent
        // snapshot.
        let (employee_rows, span_rows) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let employee_rows: Vec<EmployeeRow> = employees::table
                        .select(EmployeeRow::as_select())
                        .load(conn)
                        .await?;
                    let span_rows: Vec<(Uuid, bool, chrono::NaiveDate, chrono::NaiveDate)> =
                        project_assignments::table
                            .inner_join(projects::table)
                            .select((
                                project_assignments::employee_id,
                                project_assignments::part_time,
                                projects::start_date,
                                projects::end_date,
                            ))
                            .load(conn)
                            .await?;
                    Ok((employee_rows, span_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let mut spans: HashMap<Uuid, Vec<AssignmentSpan>> = HashMap::new();
        for (employee_id, part_time, start_date, end_date) in span_rows {
            spans.entry(employee_id).or_default().push(AssignmentSpan {
                start_date,
                end_date,
                part_time,
            });
        }

        employee_rows
            .into_iter()
            .map(|row| {
                let assignments = spans.remove(&row.id).unwrap_or_default();
                Ok(StaffingRecord {
                    employee: row_to_employee(row)?,
                    assignments,
                })
            })
            .collect()
    }

    async fn create(&self, employee: &Employee) -> Result<(), EmployeePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(employees::table)
            .values(employee_to_row(employee))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, employee: &Employee) -> Result<(), EmployeePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(employees::table.find(employee.id))
            .set(employee_to_row(employee))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(EmployeePersistenceError::query(
                "employee vanished during update",
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, EmployeePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Assignments go with the employee.
        let deleted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(
                        project_assignments::table
                            .filter(project_assignments::employee_id.eq(id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(employees::table.find(id)).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn row() -> EmployeeRow {
        EmployeeRow {
            id: Uuid::new_v4(),
            first_name: "Ana".to_owned(),
            last_name: "Kovac".to_owned(),
            department: "Development".to_owned(),
            salary: 4200.0,
            currency: "EUR".to_owned(),
            tech_stack: "Backend".to_owned(),
            is_employed: true,
            hiring_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            termination_date: None,
            image: None,
        }
    }

    #[rstest]
    fn valid_row_converts() {
        let employee = row_to_employee(row()).unwrap();
        assert_eq!(employee.first_name.as_ref(), "Ana");
        assert_eq!(employee.salary, 4200.0);
    }

    #[rstest]
    fn corrupt_department_surfaces_as_query_error() {
        let mut corrupt = row();
        corrupt.department = "Operations".to_owned();
        let error = row_to_employee(corrupt).unwrap_err();
        assert!(matches!(error, EmployeePersistenceError::Query { .. }));
        assert!(error.to_string().contains("department"));
    }

    #[rstest]
    fn domain_employee_round_trips_through_the_row() {
        let employee = row_to_employee(row()).unwrap();
        let back = row_to_employee(employee_to_row(&employee)).unwrap();
        assert_eq!(back, employee);
    }

    #[rstest]
    #[case("ana", "%ana%")]
    #[case("50% off", "%50\\% off%")]
    #[case("a_b\\c", "%a\\_b\\\\c%")]
    fn like_patterns_escape_metacharacters(#[case] term: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(term), expected);
    }
}
