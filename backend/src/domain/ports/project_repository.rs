//! Port abstraction for project persistence adapters.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::project::{Project, ProjectStatus, ProjectType, SalesChannel};
use crate::domain::reporting::ProjectStaffing;

use super::{define_port_error, OrderDirection};

define_port_error! {
    /// Persistence errors raised by project repository adapters.
    pub enum ProjectPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "project repository query failed: {message}",
    }
}

/// Sortable project list columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
pub enum ProjectOrderField {
    #[serde(rename = "name")]
    Name,
    #[serde(rename = "description")]
    Description,
    #[serde(rename = "startDate")]
    StartDate,
    #[serde(rename = "endDate")]
    EndDate,
    #[serde(rename = "projectType")]
    ProjectType,
    #[serde(rename = "hourlyRate")]
    HourlyRate,
    #[serde(rename = "projectValueBAM")]
    ProjectValue,
    #[serde(rename = "projectVelocity")]
    ProjectVelocity,
    #[serde(rename = "salesChannel")]
    SalesChannel,
    #[serde(rename = "projectStatus")]
    ProjectStatus,
    #[serde(rename = "employeesCount")]
    EmployeesCount,
}

/// Optional narrowing criteria for the project list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    /// Case-insensitive substring match on the project name.
    pub name: Option<String>,
    /// Keep projects starting on or after this day.
    pub started_since: Option<NaiveDate>,
    /// Keep projects ending on or before this day.
    pub ended_until: Option<NaiveDate>,
    pub project_type: Option<ProjectType>,
    pub sales_channel: Option<SalesChannel>,
    pub project_status: Option<ProjectStatus>,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Projects matching `filter`, ordered when requested. Pagination is
    /// applied by the caller.
    async fn list(
        &self,
        filter: &ProjectFilter,
        order: Option<(ProjectOrderField, OrderDirection)>,
    ) -> Result<Vec<Project>, ProjectPersistenceError>;

    /// Fetch a project by identifier, assignments included.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Project>, ProjectPersistenceError>;

    /// Fetch a project by name, matched case-insensitively. Names are
    /// unique per deployment.
    async fn find_by_name(&self, name: &str) -> Result<Option<Project>, ProjectPersistenceError>;

    /// Every project joined with the compensation of its assigned
    /// employees, as consumed by the portfolio summary and the derived
    /// `Direct` expense amount.
    async fn staffing(&self) -> Result<Vec<ProjectStaffing>, ProjectPersistenceError>;

    /// Insert a new project with its assignments.
    async fn create(&self, project: &Project) -> Result<(), ProjectPersistenceError>;

    /// Replace an existing project; assignments are replaced wholesale.
    async fn update(&self, project: &Project) -> Result<(), ProjectPersistenceError>;

    /// Remove a project and its assignments. Returns whether a record
    /// was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ProjectPersistenceError>;
}
