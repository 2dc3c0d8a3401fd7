//! PostgreSQL-backed `ProjectRepository` adapter.
//!
//! Assignments live in a join table and are replaced wholesale on every
//! project update, mirroring the HTTP contract.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    OrderDirection, ProjectFilter, ProjectOrderField, ProjectPersistenceError, ProjectRepository,
};
use crate::domain::project::{Assignment, Project};
use crate::domain::reporting::{ProjectStaffing, StaffedAssignment};

use super::diesel_helpers::{lower, map_diesel_error, map_pool_error};
use super::models::{
    currency_from_db, project_status_from_db, project_status_to_db, project_type_from_db,
    project_type_to_db, sales_channel_from_db, sales_channel_to_db, AssignmentRow, ProjectRow,
};
use super::pool::DbPool;
use super::schema::{employees, project_assignments, projects};

/// Diesel-backed implementation of the `ProjectRepository` port.
#[derive(Clone)]
pub struct DieselProjectRepository {
    pool: DbPool,
}

impl DieselProjectRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_project(
    row: ProjectRow,
    assignments: Vec<Assignment>,
) -> Result<Project, ProjectPersistenceError> {
    let invalid = |error: &dyn std::fmt::Display| {
        ProjectPersistenceError::query(format!("stored project {} is invalid: {error}", row.id))
    };
    Ok(Project {
        id: row.id,
        name: row.name,
        description: row.description,
        start_date: row.start_date,
        end_date: row.end_date,
        actual_end_date: row.actual_end_date,
        project_type: project_type_from_db(&row.project_type).map_err(|e| invalid(&e))?,
        hourly_rate: row.hourly_rate,
        project_value_bam: row.project_value_bam,
        project_velocity: row.project_velocity,
        sales_channel: sales_channel_from_db(&row.sales_channel).map_err(|e| invalid(&e))?,
        project_status: project_status_from_db(&row.project_status).map_err(|e| invalid(&e))?,
        assignments,
    })
}

fn project_to_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id,
        name: project.name.clone(),
        description: project.description.clone(),
        start_date: project.start_date,
        end_date: project.end_date,
        actual_end_date: project.actual_end_date,
        project_type: project_type_to_db(project.project_type).to_owned(),
        hourly_rate: project.hourly_rate,
        project_value_bam: project.project_value_bam,
        project_velocity: project.project_velocity,
        sales_channel: sales_channel_to_db(project.sales_channel).to_owned(),
        project_status: project_status_to_db(project.project_status).to_owned(),
    }
}

fn assignment_rows(project: &Project) -> Vec<AssignmentRow> {
    project
        .assignments
        .iter()
        .map(|assignment| AssignmentRow {
            project_id: project.id,
            employee_id: assignment.employee_id,
            part_time: assignment.part_time,
        })
        .collect()
}

/// Group assignment rows by project id.
fn group_assignments(rows: Vec<AssignmentRow>) -> HashMap<Uuid, Vec<Assignment>> {
    let mut grouped: HashMap<Uuid, Vec<Assignment>> = HashMap::new();
    for row in rows {
        grouped.entry(row.project_id).or_default().push(Assignment {
            employee_id: row.employee_id,
            part_time: row.part_time,
        });
    }
    grouped
}

type BoxedProjectQuery<'a> = projects::BoxedQuery<'a, diesel::pg::Pg>;

fn apply_filter<'a>(
    mut query: BoxedProjectQuery<'a>,
    filter: &'a ProjectFilter,
) -> BoxedProjectQuery<'a> {
    if let Some(name) = &filter.name {
        let escaped = name
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        query = query.filter(projects::name.ilike(format!("%{escaped}%")));
    }
    if let Some(started_since) = filter.started_since {
        query = query.filter(projects::start_date.ge(started_since));
    }
    if let Some(ended_until) = filter.ended_until {
        query = query.filter(projects::end_date.le(ended_until));
    }
    if let Some(project_type) = filter.project_type {
        query = query.filter(projects::project_type.eq(project_type_to_db(project_type)));
    }
    if let Some(sales_channel) = filter.sales_channel {
        query = query.filter(projects::sales_channel.eq(sales_channel_to_db(sales_channel)));
    }
    if let Some(project_status) = filter.project_status {
        query = query.filter(projects::project_status.eq(project_status_to_db(project_status)));
    }
    query
}

fn apply_order(
    query: BoxedProjectQuery<'_>,
    field: ProjectOrderField,
    direction: OrderDirection,
) -> BoxedProjectQuery<'_> {
    macro_rules! order_by {
        ($column:expr) => {
            match direction {
                OrderDirection::Asc => query.order($column.asc()),
                OrderDirection::Desc => query.order($column.desc()),
            }
        };
    }
    match field {
        ProjectOrderField::Name => order_by!(projects::name),
        ProjectOrderField::Description => order_by!(projects::description),
        ProjectOrderField::StartDate => order_by!(projects::start_date),
        ProjectOrderField::EndDate => order_by!(projects::end_date),
        ProjectOrderField::ProjectType => order_by!(projects::project_type),
        ProjectOrderField::HourlyRate => order_by!(projects::hourly_rate),
        ProjectOrderField::ProjectValue => order_by!(projects::project_value_bam),
        ProjectOrderField::ProjectVelocity => order_by!(projects::project_velocity),
        ProjectOrderField::SalesChannel => order_by!(projects::sales_channel),
        ProjectOrderField::ProjectStatus => order_by!(projects::project_status),
        // Assignment counts are not a column; the caller sorts after the
        // assignments are joined in.
        ProjectOrderField::EmployeesCount => query,
    }
}

/// Replace a project's assignment rows inside an open transaction.
async fn replace_assignments(
    conn: &mut AsyncPgConnection,
    project_id: Uuid,
    rows: &[AssignmentRow],
) -> Result<(), diesel::result::Error> {
    diesel::delete(project_assignments::table.filter(project_assignments::project_id.eq(project_id)))
        .execute(conn)
        .await?;
    diesel::insert_into(project_assignments::table)
        .values(rows)
        .execute(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl ProjectRepository for DieselProjectRepository {
    async fn list(
        &self,
        filter: &ProjectFilter,
        order: Option<(ProjectOrderField, OrderDirection)>,
    ) -> Result<Vec<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = apply_filter(projects::table.into_boxed(), filter);
        if let Some((field, direction)) = order {
            query = apply_order(query, field, direction);
        }

        let (project_rows, assignment_rows) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let project_rows: Vec<ProjectRow> =
                        query.select(ProjectRow::as_select()).load(conn).await?;
                    let assignment_rows: Vec<AssignmentRow> = project_assignments::table
                        .select(AssignmentRow::as_select())
                        .load(conn)
                        .await?;
                    Ok((project_rows, assignment_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let mut grouped = group_assignments(assignment_rows);
        let mut listed = project_rows
            .into_iter()
            .map(|row| {
                let assignments = grouped.remove(&row.id).unwrap_or_default();
                row_to_project(row, assignments)
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Some((ProjectOrderField::EmployeesCount, direction)) = order {
            listed.sort_by(|a, b| {
                direction.apply(a.assignments.len().cmp(&b.assignments.len()))
            });
        }
        Ok(listed)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProjectRow> = projects::table
            .find(id)
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let assignment_rows: Vec<AssignmentRow> = project_assignments::table
            .filter(project_assignments::project_id.eq(id))
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let assignments = group_assignments(assignment_rows)
            .remove(&id)
            .unwrap_or_default();
        row_to_project(row, assignments).map(Some)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ProjectRow> = projects::table
            .filter(lower(projects::name).eq(name.to_lowercase()))
            .select(ProjectRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id = row.id;
        let assignment_rows: Vec<AssignmentRow> = project_assignments::table
            .filter(project_assignments::project_id.eq(id))
            .select(AssignmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let assignments = group_assignments(assignment_rows)
            .remove(&id)
            .unwrap_or_default();
        row_to_project(row, assignments).map(Some)
    }

    async fn staffing(&self) -> Result<Vec<ProjectStaffing>, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (project_rows, staff_rows) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let project_rows: Vec<ProjectRow> = projects::table
                        .select(ProjectRow::as_select())
                        .load(conn)
                        .await?;
                    let staff_rows: Vec<(Uuid, bool, f64, String)> = project_assignments::table
                        .inner_join(employees::table)
                        .select((
                            project_assignments::project_id,
                            project_assignments::part_time,
                            employees::salary,
                            employees::currency,
                        ))
                        .load(conn)
                        .await?;
                    Ok((project_rows, staff_rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        let mut staff: HashMap<Uuid, Vec<StaffedAssignment>> = HashMap::new();
        for (project_id, part_time, salary, currency) in staff_rows {
            let currency =
                currency_from_db(&currency).map_err(ProjectPersistenceError::query)?;
            staff.entry(project_id).or_default().push(StaffedAssignment {
                part_time,
                salary,
                currency,
            });
        }

        project_rows
            .into_iter()
            .map(|row| {
                let members = staff.remove(&row.id).unwrap_or_default();
                // Staffing consumers never look at the assignment list.
                Ok(ProjectStaffing {
                    project: row_to_project(row, Vec::new())?,
                    staff: members,
                })
            })
            .collect()
    }

    async fn create(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = project_to_row(project);
        let assignments = assignment_rows(project);
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::insert_into(projects::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(project_assignments::table)
                    .values(&assignments)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = project_to_row(project);
        let assignments = assignment_rows(project);
        let project_id = project.id;
        let updated = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let updated = diesel::update(projects::table.find(project_id))
                        .set(&row)
                        .execute(conn)
                        .await?;
                    if updated > 0 {
                        replace_assignments(conn, project_id, &assignments).await?;
                    }
                    Ok(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        if updated == 0 {
            return Err(ProjectPersistenceError::query(
                "project vanished during update",
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProjectPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(
                        project_assignments::table
                            .filter(project_assignments::project_id.eq(id)),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(projects::table.find(id)).execute(conn).await
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

    fn row() -> ProjectRow {
        ProjectRow {
            id: Uuid::new_v4(),
            name: "Atlas".to_owned(),
            description: "Inventory rebuild".to_owned(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
            actual_end_date: None,
            project_type: "Fixed".to_owned(),
            hourly_rate: 90.0,
            project_value_bam: 120_000.0,
            project_velocity: 2.5,
            sales_channel: "Online".to_owned(),
            project_status: "Active".to_owned(),
        }
    }

    #[rstest]
    fn valid_row_converts_with_assignments() {
        let assignment = Assignment {
            employee_id: Uuid::new_v4(),
            part_time: true,
        };
        let project = row_to_project(row(), vec![assignment]).unwrap();
        assert_eq!(project.name, "Atlas");
        assert_eq!(project.assignments, vec![assignment]);
    }

    #[rstest]
    fn corrupt_status_surfaces_as_query_error() {
        let mut corrupt = row();
        corrupt.project_status = "Archived".to_owned();
        let error = row_to_project(corrupt, Vec::new()).unwrap_err();
        assert!(matches!(error, ProjectPersistenceError::Query { .. }));
        assert!(error.to_string().contains("project_status"));
    }

    #[rstest]
    fn assignment_rows_carry_the_project_id() {
        let mut project = row_to_project(row(), Vec::new()).unwrap();
        project.assignments = vec![
            Assignment {
                employee_id: Uuid::new_v4(),
                part_time: false,
            },
            Assignment {
                employee_id: Uuid::new_v4(),
                part_time: true,
            },
        ];

        let rows = assignment_rows(&project);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.project_id == project.id));
        assert!(rows[1].part_time);
    }

    #[rstest]
    fn grouping_splits_rows_per_project() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let rows = vec![
            AssignmentRow {
                project_id: first,
                employee_id: Uuid::new_v4(),
                part_time: false,
            },
            AssignmentRow {
                project_id: second,
                employee_id: Uuid::new_v4(),
                part_time: true,
            },
            AssignmentRow {
                project_id: first,
                employee_id: Uuid::new_v4(),
                part_time: true,
            },
        ];

        let grouped = group_assignments(rows);
        assert_eq!(grouped[&first].len(), 2);
        assert_eq!(grouped[&second].len(), 1);
    }
}
