//! Employee handlers: filtered listing, utilization report, and admin CRUD.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::employee::{Currency, Department, Employee, EmployeeValidationError, TechStack};
use crate::domain::ports::{EmployeeFilter, EmployeeOrderField, OrderDirection};
use crate::domain::reporting::{utilization_by_month, MonthlyUtilization};
use crate::domain::user::PersonName;
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, pagination_params, report_year};
use crate::inbound::http::{storage_error, ApiResult};
use pagination::{Page, PageInfo};

fn validation_error(error: EmployeeValidationError) -> Error {
    let field = match error {
        EmployeeValidationError::NonPositiveSalary => "salary",
        EmployeeValidationError::DepartmentTechStackMismatch => "techStack",
        EmployeeValidationError::TerminationBeforeHiring => "terminationDate",
    };
    field_error(field, error)
}

async fn load_employee(state: &HttpState, id: Uuid) -> Result<Employee, Error> {
    state
        .employees
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Employee not found."))
}

/// Query parameters accepted by the employee list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListQuery {
    pub search_term: Option<String>,
    pub currency: Option<Currency>,
    pub department: Option<Department>,
    pub tech_stack: Option<TechStack>,
    pub is_employed: Option<bool>,
    /// Keep employees hired on or after this day.
    pub hiring_date: Option<NaiveDate>,
    /// Keep employees terminated on or before this day.
    pub termination_date: Option<NaiveDate>,
    pub order_by_field: Option<EmployeeOrderField>,
    pub order_direction: Option<OrderDirection>,
    pub page: Option<u32>,
    pub take: Option<u32>,
}

/// One page of employees plus pagination metadata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeesPage {
    pub page_info: PageInfo,
    pub employees: Vec<Employee>,
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeListQuery),
    responses(
        (status = 200, description = "Matching employees", body = EmployeesPage),
        (status = 400, description = "Invalid query", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["employees"],
    operation_id = "listEmployees"
)]
#[get("/employees")]
pub async fn list_employees(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<EmployeeListQuery>,
) -> ApiResult<web::Json<EmployeesPage>> {
    current_user(&state, &session).await?;
    let query = query.into_inner();
    let params = pagination_params(query.page, query.take)?;
    let filter = EmployeeFilter {
        search_term: query.search_term,
        currency: query.currency,
        department: query.department,
        tech_stack: query.tech_stack,
        is_employed: query.is_employed,
        hired_since: query.hiring_date,
        terminated_until: query.termination_date,
    };
    let order = query.order_by_field.zip(query.order_direction);

    let employees = state
        .employees
        .list(&filter, order)
        .await
        .map_err(storage_error)?;
    let page = Page::slice(employees, params);
    Ok(web::Json(EmployeesPage {
        page_info: page.page_info,
        employees: page.items,
    }))
}

/// Year selector for the utilization report.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportYearQuery {
    pub year: i32,
}

#[utoipa::path(
    get,
    path = "/api/employees/info",
    params(ReportYearQuery),
    responses(
        (status = 200, description = "Monthly utilization for the year", body = [MonthlyUtilization]),
        (status = 400, description = "Year out of range", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["employees"],
    operation_id = "employeesInfo"
)]
#[get("/employees/info")]
pub async fn employees_info(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReportYearQuery>,
) -> ApiResult<web::Json<Vec<MonthlyUtilization>>> {
    current_user(&state, &session).await?;
    let year = report_year(query.into_inner().year)?;
    let staffing = state.employees.staffing().await.map_err(storage_error)?;
    Ok(web::Json(utilization_by_month(year, &staffing)))
}

#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee to fetch")),
    responses(
        (status = 200, description = "The employee", body = Employee),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown employee", body = Error),
    ),
    tags = ["employees"],
    operation_id = "getEmployee"
)]
#[get("/employees/{employee_id}")]
pub async fn get_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<Employee>> {
    current_user(&state, &session).await?;
    let employee = load_employee(&state, path.into_inner()).await?;
    Ok(web::Json(employee))
}

/// New-employee body. The hiring date is set to today on the server.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub department: Department,
    pub salary: f64,
    pub currency: Currency,
    pub tech_stack: TechStack,
    pub image: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
    ),
    tags = ["employees"],
    operation_id = "createEmployee"
)]
#[post("/employees")]
pub async fn create_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateEmployeeRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "create employees").await?;
    let payload = payload.into_inner();

    let employee = Employee {
        id: Uuid::new_v4(),
        first_name: PersonName::new("First name", payload.first_name)
            .map_err(|e| field_error("firstName", e))?,
        last_name: PersonName::new("Last name", payload.last_name)
            .map_err(|e| field_error("lastName", e))?,
        department: payload.department,
        salary: payload.salary,
        currency: payload.currency,
        tech_stack: payload.tech_stack,
        is_employed: true,
        hiring_date: Utc::now().date_naive(),
        termination_date: None,
        image: payload.image,
    };
    employee.validate().map_err(validation_error)?;

    state
        .employees
        .create(&employee)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::Created().json(employee))
}

/// Partial update body. Absent fields keep their stored values.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub department: Option<Department>,
    pub salary: Option<f64>,
    pub currency: Option<Currency>,
    pub tech_stack: Option<TechStack>,
    pub is_employed: Option<bool>,
    pub image: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee to update")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Updated employee", body = Employee),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown employee", body = Error),
    ),
    tags = ["employees"],
    operation_id = "updateEmployee"
)]
#[patch("/employees/{employee_id}")]
pub async fn update_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateEmployeeRequest>,
) -> ApiResult<web::Json<Employee>> {
    require_admin(&state, &session, "update employees").await?;
    let mut employee = load_employee(&state, path.into_inner()).await?;
    let payload = payload.into_inner();

    if let Some(first_name) = payload.first_name {
        employee.first_name =
            PersonName::new("First name", first_name).map_err(|e| field_error("firstName", e))?;
    }
    if let Some(last_name) = payload.last_name {
        employee.last_name =
            PersonName::new("Last name", last_name).map_err(|e| field_error("lastName", e))?;
    }
    if let Some(department) = payload.department {
        employee.department = department;
    }
    if let Some(salary) = payload.salary {
        employee.salary = salary;
    }
    if let Some(currency) = payload.currency {
        employee.currency = currency;
    }
    if let Some(tech_stack) = payload.tech_stack {
        employee.tech_stack = tech_stack;
    }
    match payload.is_employed {
        Some(false) if employee.is_employed => {
            employee.is_employed = false;
            employee.termination_date = Some(Utc::now().date_naive());
        }
        Some(true) if !employee.is_employed => {
            return Err(Error::invalid_request(
                "We have no interest in rehiring former employees.",
            ));
        }
        _ => {}
    }
    if let Some(image) = payload.image {
        employee.image = Some(image);
    }
    employee.validate().map_err(validation_error)?;

    state
        .employees
        .update(&employee)
        .await
        .map_err(storage_error)?;
    Ok(web::Json(employee))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee to delete")),
    responses(
        (status = 204, description = "Employee removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown employee", body = Error),
    ),
    tags = ["employees"],
    operation_id = "deleteEmployee"
)]
#[delete("/employees/{employee_id}")]
pub async fn delete_employee(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "delete employees").await?;
    let employee = load_employee(&state, path.into_inner()).await?;
    state
        .employees
        .delete(employee.id)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{admin_session, guest_session, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    async fn create(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        first: &str,
        salary: f64,
    ) -> Value {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/employees")
                .cookie(cookie.clone())
                .set_json(json!({
                    "firstName": first,
                    "lastName": "Kovac",
                    "department": "Development",
                    "salary": salary,
                    "currency": "BAM",
                    "techStack": "Backend",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        test::read_body_json(res).await
    }

    #[actix_web::test]
    async fn guests_cannot_create_employees() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = guest_session(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/employees")
                .cookie(cookie)
                .set_json(json!({
                    "firstName": "Mira",
                    "lastName": "Kovac",
                    "department": "Development",
                    "salary": 3000.0,
                    "currency": "BAM",
                    "techStack": "Backend",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "This user is not allowed to create employees."
        );
    }

    #[actix_web::test]
    async fn creation_sets_the_hiring_date_to_today() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let body = create(&app, &cookie, "Mira", 3000.0).await;
        assert_eq!(body["isEmployed"], true);
        assert_eq!(
            body["hiringDate"],
            Utc::now().date_naive().format("%Y-%m-%d").to_string()
        );
    }

    #[actix_web::test]
    async fn mismatched_tech_stack_is_rejected() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/employees")
                .cookie(cookie)
                .set_json(json!({
                    "firstName": "Mira",
                    "lastName": "Kovac",
                    "department": "Design",
                    "salary": 3000.0,
                    "currency": "BAM",
                    "techStack": "Backend",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["details"]["field"], "techStack");
    }

    #[actix_web::test]
    async fn list_filters_orders_and_paginates() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        create(&app, &cookie, "Ana", 2000.0).await;
        create(&app, &cookie, "Bojan", 4000.0).await;
        create(&app, &cookie, "Ciro", 3000.0).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/employees?orderByField=salary&orderDirection=desc&page=1&take=2")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["pageInfo"]["total"], 3);
        assert_eq!(body["pageInfo"]["lastPage"], 2);
        let employees = body["employees"].as_array().expect("employees array");
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0]["firstName"], "Bojan");
        assert_eq!(employees[1]["firstName"], "Ciro");
    }

    #[actix_web::test]
    async fn search_matches_first_and_last_names() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        create(&app, &cookie, "Ana", 2000.0).await;
        create(&app, &cookie, "Bojan", 4000.0).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/employees?searchTerm=ana%20kovac")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(res).await;
        let employees = body["employees"].as_array().expect("employees array");
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0]["firstName"], "Ana");
    }

    #[actix_web::test]
    async fn terminating_an_employee_stamps_the_date() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let created = create(&app, &cookie, "Mira", 3000.0).await;
        let id = created["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/employees/{id}"))
                .cookie(cookie.clone())
                .set_json(json!({ "isEmployed": false }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["isEmployed"], false);
        assert_eq!(
            body["terminationDate"],
            Utc::now().date_naive().format("%Y-%m-%d").to_string()
        );

        // Once terminated, the record stays terminated.
        let rehire = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/employees/{id}"))
                .cookie(cookie)
                .set_json(json!({ "isEmployed": true }))
                .to_request(),
        )
        .await;
        assert_eq!(rehire.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(rehire).await;
        assert_eq!(
            body["message"],
            "We have no interest in rehiring former employees."
        );
    }

    #[actix_web::test]
    async fn unknown_employee_is_not_found() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/employees/{}", Uuid::new_v4()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Employee not found.");
    }

    #[actix_web::test]
    async fn info_requires_a_supported_year() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/employees/info?year=1999")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn info_reports_twelve_months() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        create(&app, &cookie, "Mira", 3000.0).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/employees/info?year=2024")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        let months = body.as_array().expect("months array");
        assert_eq!(months.len(), 12);
        assert_eq!(months[0]["month"], "January");
    }

    #[actix_web::test]
    async fn delete_removes_the_record() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let created = create(&app, &cookie, "Mira", 3000.0).await;
        let id = created["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/employees/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/employees/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
