//! Project handlers: filtered listing, portfolio report, and admin CRUD.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::ports::{OrderDirection, ProjectFilter, ProjectOrderField};
use crate::domain::project::{
    Assignment, Project, ProjectStatus, ProjectType, ProjectValidationError, SalesChannel,
};
use crate::domain::reporting::{portfolio_summary, PortfolioSummary};
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::employees::ReportYearQuery;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, pagination_params, report_year};
use crate::inbound::http::{storage_error, ApiResult};
use pagination::{Page, PageInfo};

fn validation_error(error: ProjectValidationError) -> Error {
    use ProjectValidationError as E;
    let field = match &error {
        E::NameTooShort | E::NameTooLong => "name",
        E::EmptyDescription => "description",
        E::DateOutOfRange { field } => match *field {
            "Start date" => "startDate",
            "End date" => "endDate",
            _ => "actualEndDate",
        },
        E::EndBeforeStart => "endDate",
        E::ActualEndBeforeStart => "actualEndDate",
        E::NonPositiveHourlyRate => "hourlyRate",
        E::NonPositiveValue => "projectValueBAM",
        E::DuplicateAssignment => "employees",
    };
    field_error(field, error)
}

async fn load_project(state: &HttpState, id: Uuid) -> Result<Project, Error> {
    state
        .projects
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Project not found."))
}

/// Reject a name already used by a different project.
async fn check_name_free(state: &HttpState, name: &str, own_id: Option<Uuid>) -> Result<(), Error> {
    let existing = state
        .projects
        .find_by_name(name)
        .await
        .map_err(storage_error)?;
    if existing.is_some_and(|other| Some(other.id) != own_id) {
        return Err(Error::conflict("Project already exists."));
    }
    Ok(())
}

/// Query parameters accepted by the project list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    /// Case-insensitive substring match on the name.
    pub name: Option<String>,
    /// Keep projects starting on or after this day.
    pub start_date: Option<NaiveDate>,
    /// Keep projects ending on or before this day.
    pub end_date: Option<NaiveDate>,
    pub project_type: Option<ProjectType>,
    pub sales_channel: Option<SalesChannel>,
    pub project_status: Option<ProjectStatus>,
    pub order_by_field: Option<ProjectOrderField>,
    pub order_direction: Option<OrderDirection>,
    pub page: Option<u32>,
    pub take: Option<u32>,
}

/// One page of projects plus pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsPage {
    pub page_info: PageInfo,
    pub projects: Vec<Project>,
}

#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectListQuery),
    responses(
        (status = 200, description = "Matching projects", body = ProjectsPage),
        (status = 400, description = "Invalid query", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["projects"],
    operation_id = "listProjects"
)]
#[get("/projects")]
pub async fn list_projects(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ProjectListQuery>,
) -> ApiResult<web::Json<ProjectsPage>> {
    current_user(&state, &session).await?;
    let query = query.into_inner();
    let params = pagination_params(query.page, query.take)?;
    let filter = ProjectFilter {
        name: query.name,
        started_since: query.start_date,
        ended_until: query.end_date,
        project_type: query.project_type,
        sales_channel: query.sales_channel,
        project_status: query.project_status,
    };
    let order = query.order_by_field.zip(query.order_direction);

    let projects = state
        .projects
        .list(&filter, order)
        .await
        .map_err(storage_error)?;
    let page = Page::slice(projects, params);
    Ok(web::Json(ProjectsPage {
        page_info: page.page_info,
        projects: page.items,
    }))
}

#[utoipa::path(
    get,
    path = "/api/projects/info",
    params(ReportYearQuery),
    responses(
        (status = 200, description = "Portfolio summary for the year", body = PortfolioSummary),
        (status = 400, description = "Year out of range", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["projects"],
    operation_id = "projectsInfo"
)]
#[get("/projects/info")]
pub async fn projects_info(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReportYearQuery>,
) -> ApiResult<web::Json<PortfolioSummary>> {
    current_user(&state, &session).await?;
    let year = report_year(query.into_inner().year)?;
    let staffing = state.projects.staffing().await.map_err(storage_error)?;
    Ok(web::Json(portfolio_summary(year, &staffing)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project to fetch")),
    responses(
        (status = 200, description = "The project", body = Project),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown project", body = Error),
    ),
    tags = ["projects"],
    operation_id = "getProject"
)]
#[get("/projects/{project_id}")]
pub async fn get_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Project>> {
    current_user(&state, &session).await?;
    let project = load_project(&state, path.into_inner()).await?;
    Ok(web::Json(project))
}

/// New-project body.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub project_type: ProjectType,
    pub hourly_rate: f64,
    #[serde(rename = "projectValueBAM")]
    pub project_value_bam: f64,
    pub project_velocity: f64,
    pub sales_channel: SalesChannel,
    pub project_status: ProjectStatus,
    /// Employee assignments; defaults to none.
    #[serde(default)]
    pub employees: Vec<Assignment>,
}

#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 409, description = "Name already taken", body = Error),
    ),
    tags = ["projects"],
    operation_id = "createProject"
)]
#[post("/projects")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProjectRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "create projects").await?;
    let payload = payload.into_inner();
    check_name_free(&state, &payload.name, None).await?;

    // Marking a project completed on creation closes it at its planned end.
    let actual_end_date = (payload.project_status == ProjectStatus::Completed)
        .then_some(payload.end_date);
    let project = Project {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
        start_date: payload.start_date,
        end_date: payload.end_date,
        actual_end_date,
        project_type: payload.project_type,
        hourly_rate: payload.hourly_rate,
        project_value_bam: payload.project_value_bam,
        project_velocity: payload.project_velocity,
        sales_channel: payload.sales_channel,
        project_status: payload.project_status,
        assignments: payload.employees,
    };
    project.validate().map_err(validation_error)?;

    state
        .projects
        .create(&project)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::Created().json(project))
}

/// Distinguish an absent `actualEndDate` (keep) from an explicit null
/// (clear): the outer `Option` stays `None` only when the key is missing.
fn some_nullable_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

/// Partial update body. Absent fields keep their stored values; an
/// explicit `null` for `actualEndDate` clears it.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "some_nullable_date")]
    #[schema(value_type = Option<String>, format = Date)]
    pub actual_end_date: Option<Option<NaiveDate>>,
    pub project_type: Option<ProjectType>,
    pub hourly_rate: Option<f64>,
    #[serde(rename = "projectValueBAM")]
    pub project_value_bam: Option<f64>,
    pub project_velocity: Option<f64>,
    pub sales_channel: Option<SalesChannel>,
    pub project_status: Option<ProjectStatus>,
    /// When present, replaces the assignments wholesale.
    pub employees: Option<Vec<Assignment>>,
}

#[utoipa::path(
    patch,
    path = "/api/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project to update")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown project", body = Error),
        (status = 409, description = "Name already taken", body = Error),
    ),
    tags = ["projects"],
    operation_id = "updateProject"
)]
#[patch("/projects/{project_id}")]
pub async fn update_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateProjectRequest>,
) -> ApiResult<web::Json<Project>> {
    require_admin(&state, &session, "update projects").await?;
    let mut project = load_project(&state, path.into_inner()).await?;
    let payload = payload.into_inner();

    if let Some(name) = payload.name {
        check_name_free(&state, &name, Some(project.id)).await?;
        project.name = name;
    }
    if let Some(description) = payload.description {
        project.description = description;
    }
    if let Some(start_date) = payload.start_date {
        project.start_date = start_date;
    }
    if let Some(end_date) = payload.end_date {
        project.end_date = end_date;
    }
    if let Some(actual_end_date) = payload.actual_end_date {
        project.actual_end_date = actual_end_date;
    }
    if let Some(project_type) = payload.project_type {
        project.project_type = project_type;
    }
    if let Some(hourly_rate) = payload.hourly_rate {
        project.hourly_rate = hourly_rate;
    }
    if let Some(project_value_bam) = payload.project_value_bam {
        project.project_value_bam = project_value_bam;
    }
    if let Some(project_velocity) = payload.project_velocity {
        project.project_velocity = project_velocity;
    }
    if let Some(sales_channel) = payload.sales_channel {
        project.sales_channel = sales_channel;
    }
    if let Some(project_status) = payload.project_status {
        project.project_status = project_status;
    }
    if let Some(employees) = payload.employees {
        project.assignments = employees;
    }
    project.validate().map_err(validation_error)?;

    state
        .projects
        .update(&project)
        .await
        .map_err(storage_error)?;
    Ok(web::Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project to delete")),
    responses(
        (status = 204, description = "Project removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown project", body = Error),
    ),
    tags = ["projects"],
    operation_id = "deleteProject"
)]
#[delete("/projects/{project_id}")]
pub async fn delete_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "delete projects").await?;
    let project = load_project(&state, path.into_inner()).await?;
    state
        .projects
        .delete(project.id)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::NoContent().finish())
}
