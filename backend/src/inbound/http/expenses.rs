//! Expense handlers, including the derived `Direct` planned amount.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::expense::{Expense, ExpenseCategory, ExpenseValidationError, Month};
use crate::domain::reporting::{
    expense_report, CategorizedExpense, ExpenseReport,
};
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{field_error, report_year};
use crate::inbound::http::{storage_error, ApiResult};

fn validation_error(error: ExpenseValidationError) -> Error {
    use ExpenseValidationError as E;
    let field = match error {
        E::YearOutOfRange => "year",
        E::NonPositivePlannedExpense => "plannedExpense",
        E::NegativeActualExpense => "actualExpense",
        E::EmptyCategoryName => "name",
        E::EmptyCategoryDescription => "description",
    };
    field_error(field, error)
}

async fn load_expense(state: &HttpState, id: Uuid) -> Result<Expense, Error> {
    state
        .expenses
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Expense not found."))
}

async fn category_by_name(state: &HttpState, name: &str) -> Result<ExpenseCategory, Error> {
    state
        .expense_categories
        .find_by_name(name)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Expense category not found."))
}

/// Enforce the one-expense-per-period rule, ignoring the record itself
/// on update.
async fn check_period_free(
    state: &HttpState,
    year: i32,
    month: Month,
    category_id: Uuid,
    own_id: Option<Uuid>,
) -> Result<(), Error> {
    let existing = state
        .expenses
        .find_by_period(year, month, category_id)
        .await
        .map_err(storage_error)?;
    if existing.is_some_and(|other| Some(other.id) != own_id) {
        return Err(Error::conflict("Expense already exists."));
    }
    Ok(())
}

/// Derived planned amount for the `Direct` category: the summed monthly
/// team cost of every project whose schedule overlaps the month.
async fn direct_planned_expense(
    state: &HttpState,
    year: i32,
    month: Month,
) -> Result<f64, Error> {
    let from = crate::domain::reporting::month_start(year, month.number())
        .ok_or_else(|| field_error("year", "Year can't be outside the years 2000 to 2050."))?;
    let to = crate::domain::reporting::month_end_exclusive(year, month.number())
        .ok_or_else(|| field_error("year", "Year can't be outside the years 2000 to 2050."))?;

    let staffing = state.projects.staffing().await.map_err(storage_error)?;
    Ok(staffing
        .iter()
        .filter(|record| {
            record.project.start_date < to && from <= record.project.end_date
        })
        .map(|record| record.monthly_cost())
        .sum())
}

/// An expense with its category embedded, as served to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: Uuid,
    pub year: i32,
    pub month: Month,
    pub planned_expense: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_expense: Option<f64>,
    pub expense_category: ExpenseCategory,
}

impl ExpenseResponse {
    fn new(expense: Expense, category: ExpenseCategory) -> Self {
        Self {
            id: expense.id,
            year: expense.year,
            month: expense.month,
            planned_expense: expense.planned_expense,
            actual_expense: expense.actual_expense,
            expense_category: category,
        }
    }
}

async fn with_category(state: &HttpState, expense: Expense) -> Result<ExpenseResponse, Error> {
    let category = state
        .expense_categories
        .find_by_id(expense.expense_category_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Expense category not found."))?;
    Ok(ExpenseResponse::new(expense, category))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    responses(
        (status = 200, description = "All expenses with their categories", body = [ExpenseResponse]),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["expenses"],
    operation_id = "listExpenses"
)]
#[get("/expenses")]
pub async fn list_expenses(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ExpenseResponse>>> {
    current_user(&state, &session).await?;
    let expenses = state.expenses.list().await.map_err(storage_error)?;
    let mut responses = Vec::with_capacity(expenses.len());
    for expense in expenses {
        responses.push(with_category(&state, expense).await?);
    }
    Ok(web::Json(responses))
}

/// Year selector for the expense report.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpenseReportQuery {
    pub year: i32,
}

#[utoipa::path(
    get,
    path = "/api/expenses/info",
    params(ExpenseReportQuery),
    responses(
        (status = 200, description = "Planned versus actual expenses for the year", body = ExpenseReport),
        (status = 400, description = "Year out of range", body = Error),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["expenses"],
    operation_id = "expensesInfo"
)]
#[get("/expenses/info")]
pub async fn expenses_info(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ExpenseReportQuery>,
) -> ApiResult<web::Json<ExpenseReport>> {
    current_user(&state, &session).await?;
    let year = report_year(query.into_inner().year)?;

    let expenses = state.expenses.list().await.map_err(storage_error)?;
    let categories = state
        .expense_categories
        .list()
        .await
        .map_err(storage_error)?;
    let categorized = expenses
        .into_iter()
        .filter_map(|expense| {
            categories
                .iter()
                .find(|category| category.id == expense.expense_category_id)
                .map(|category| CategorizedExpense {
                    category_name: category.name.clone(),
                    expense,
                })
        })
        .collect::<Vec<_>>();
    Ok(web::Json(expense_report(year, &categorized)))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = Uuid, Path, description = "Expense to fetch")),
    responses(
        (status = 200, description = "The expense", body = ExpenseResponse),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown expense", body = Error),
    ),
    tags = ["expenses"],
    operation_id = "getExpense"
)]
#[get("/expenses/{expense_id}")]
pub async fn get_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ExpenseResponse>> {
    current_user(&state, &session).await?;
    let expense = load_expense(&state, path.into_inner()).await?;
    Ok(web::Json(with_category(&state, expense).await?))
}

/// New-expense body. The category is referenced by name; for `Direct`
/// the planned amount is derived and any submitted value ignored.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub year: i32,
    pub month: Month,
    pub planned_expense: Option<f64>,
    pub actual_expense: Option<f64>,
    pub expense_category: String,
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense created", body = ExpenseResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown category", body = Error),
        (status = 409, description = "Period already recorded", body = Error),
    ),
    tags = ["expenses"],
    operation_id = "createExpense"
)]
#[post("/expenses")]
pub async fn create_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateExpenseRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "create expenses").await?;
    let payload = payload.into_inner();

    let category = category_by_name(&state, &payload.expense_category).await?;
    check_period_free(&state, payload.year, payload.month, category.id, None).await?;

    let planned = if category.is_direct() {
        Some(direct_planned_expense(&state, payload.year, payload.month).await?)
    } else {
        payload.planned_expense
    };
    // Either amount stands in for a missing counterpart.
    let planned_expense = planned.or(payload.actual_expense).ok_or_else(|| {
        field_error("plannedExpense", "Planned expense must be a positive number.")
    })?;
    let actual_expense = payload.actual_expense.or(planned);

    let expense = Expense {
        id: Uuid::new_v4(),
        year: payload.year,
        month: payload.month,
        planned_expense,
        actual_expense,
        expense_category_id: category.id,
    };
    expense.validate().map_err(validation_error)?;

    state
        .expenses
        .create(&expense)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::Created().json(ExpenseResponse::new(expense, category)))
}

/// Partial update body. Absent fields keep their stored values; the
/// `Direct` planned amount is re-derived for the resulting period.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseRequest {
    pub year: Option<i32>,
    pub month: Option<Month>,
    pub planned_expense: Option<f64>,
    pub actual_expense: Option<f64>,
    pub expense_category: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = Uuid, Path, description = "Expense to update")),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Updated expense", body = ExpenseResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown expense or category", body = Error),
        (status = 409, description = "Period already recorded", body = Error),
    ),
    tags = ["expenses"],
    operation_id = "updateExpense"
)]
#[patch("/expenses/{expense_id}")]
pub async fn update_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateExpenseRequest>,
) -> ApiResult<web::Json<ExpenseResponse>> {
    require_admin(&state, &session, "update expenses").await?;
    let mut expense = load_expense(&state, path.into_inner()).await?;
    let payload = payload.into_inner();

    let category = match payload.expense_category {
        Some(name) => category_by_name(&state, &name).await?,
        None => state
            .expense_categories
            .find_by_id(expense.expense_category_id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| Error::not_found("Expense category not found."))?,
    };
    let year = payload.year.unwrap_or(expense.year);
    let month = payload.month.unwrap_or(expense.month);
    check_period_free(&state, year, month, category.id, Some(expense.id)).await?;

    expense.year = year;
    expense.month = month;
    expense.expense_category_id = category.id;
    expense.planned_expense = if category.is_direct() {
        direct_planned_expense(&state, year, month).await?
    } else {
        payload.planned_expense.unwrap_or(expense.planned_expense)
    };
    if let Some(actual) = payload.actual_expense {
        expense.actual_expense = Some(actual);
    }
    expense.validate().map_err(validation_error)?;

    state
        .expenses
        .update(&expense)
        .await
        .map_err(storage_error)?;
    Ok(web::Json(ExpenseResponse::new(expense, category)))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = Uuid, Path, description = "Expense to delete")),
    responses(
        (status = 204, description = "Expense removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown expense", body = Error),
    ),
    tags = ["expenses"],
    operation_id = "deleteExpense"
)]
#[delete("/expenses/{expense_id}")]
pub async fn delete_expense(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "delete expenses").await?;
    let expense = load_expense(&state, path.into_inner()).await?;
    state
        .expenses
        .delete(expense.id)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{admin_session, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    type TestApp = actix_web::dev::ServiceResponse;

    async fn post_json(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = TestApp,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        uri: &str,
        body: Value,
    ) -> TestApp {
        test::call_service(
            app,
            test::TestRequest::post()
                .uri(uri)
                .cookie(cookie.clone())
                .set_json(body)
                .to_request(),
        )
        .await
    }

    async fn seed_category(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = TestApp,
            Error = actix_web::Error,
        >,
        cookie: &actix_web::cookie::Cookie<'static>,
        name: &str,
    ) {
        let res = post_json(
            app,
            cookie,
            "/api/expense-categories",
            json!({ "name": name, "description": "Seeded for tests" }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn creation_defaults_missing_amounts_both_ways() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        seed_category(&app, &cookie, "Marketing").await;

        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "January",
                "actualExpense": 750.0,
                "expenseCategory": "Marketing",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["plannedExpense"], 750.0);
        assert_eq!(body["actualExpense"], 750.0);
        assert_eq!(body["expenseCategory"]["name"], "Marketing");
        assert!(body.get("expenseCategoryId").is_none());

        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "February",
                "plannedExpense": 500.0,
                "expenseCategory": "Marketing",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["plannedExpense"], 500.0);
        assert_eq!(body["actualExpense"], 500.0);
    }

    #[actix_web::test]
    async fn one_expense_per_period_and_category() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        seed_category(&app, &cookie, "Marketing").await;

        let body = json!({
            "year": 2024,
            "month": "January",
            "plannedExpense": 500.0,
            "expenseCategory": "Marketing",
        });
        let res = post_json(&app, &cookie, "/api/expenses", body.clone()).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = post_json(&app, &cookie, "/api/expenses", body).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let json_body: Value = test::read_body_json(res).await;
        assert_eq!(json_body["message"], "Expense already exists.");
    }

    #[actix_web::test]
    async fn unknown_category_is_not_found() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "January",
                "plannedExpense": 500.0,
                "expenseCategory": "Nonexistent",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Expense category not found.");
    }

    #[actix_web::test]
    async fn direct_planned_amount_comes_from_project_cost() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        seed_category(&app, &cookie, "Direct").await;

        let res = post_json(
            &app,
            &cookie,
            "/api/employees",
            json!({
                "firstName": "Mira",
                "lastName": "Kovac",
                "department": "Development",
                "salary": 1000.0,
                "currency": "USD",
                "techStack": "Backend",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let employee: Value = test::read_body_json(res).await;

        let res = post_json(
            &app,
            &cookie,
            "/api/projects",
            json!({
                "name": "Webshop",
                "description": "Storefront rebuild",
                "startDate": "2024-01-01",
                "endDate": "2024-06-30",
                "projectType": "Fixed",
                "hourlyRate": 50.0,
                "projectValueBAM": 60000.0,
                "projectVelocity": 2.5,
                "salesChannel": "Online",
                "projectStatus": "Active",
                "employees": [{ "employeeId": employee["id"], "partTime": true }],
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        // Half of 1000 USD converted at 1.78; the submitted amount is ignored.
        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "March",
                "plannedExpense": 1.0,
                "expenseCategory": "Direct",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["plannedExpense"], 890.0);

        // A month outside the project schedule derives zero, which fails
        // the positive-amount rule.
        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "December",
                "expenseCategory": "Direct",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn info_separates_planned_and_actual_totals() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        seed_category(&app, &cookie, "Marketing").await;
        seed_category(&app, &cookie, "HR costs").await;

        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "January",
                "plannedExpense": 500.0,
                "actualExpense": 450.0,
                "expenseCategory": "Marketing",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "January",
                "plannedExpense": 300.0,
                "actualExpense": 320.0,
                "expenseCategory": "HR costs",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/expenses/info?year=2024")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["totalPlannedExpenses"], 800.0);
        assert_eq!(body["totalActualExpenses"], 770.0);
        let january = &body["byMonth"][0];
        assert_eq!(january["month"], "January");
        assert_eq!(january["totalPlannedExpense"], 800.0);
    }

    #[actix_web::test]
    async fn moving_an_expense_onto_a_taken_period_conflicts() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        seed_category(&app, &cookie, "Marketing").await;

        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "January",
                "plannedExpense": 500.0,
                "expenseCategory": "Marketing",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "February",
                "plannedExpense": 600.0,
                "expenseCategory": "Marketing",
            }),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let second: Value = test::read_body_json(res).await;
        let id = second["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/expenses/{id}"))
                .cookie(cookie.clone())
                .set_json(json!({ "month": "January" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        // Updating in place is fine.
        let res = test::call_service(
            &app,
            test::TestRequest::patch()
                .uri(&format!("/api/expenses/{id}"))
                .cookie(cookie)
                .set_json(json!({ "actualExpense": 610.0 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["actualExpense"], 610.0);
        assert_eq!(body["month"], "February");
    }

    #[actix_web::test]
    async fn delete_removes_the_expense() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let cookie = admin_session(&app).await;
        seed_category(&app, &cookie, "Marketing").await;
        let res = post_json(
            &app,
            &cookie,
            "/api/expenses",
            json!({
                "year": 2024,
                "month": "January",
                "plannedExpense": 500.0,
                "expenseCategory": "Marketing",
            }),
        )
        .await;
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_str().expect("id");

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/expenses/{id}"))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/expenses/{id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Expense not found.");
    }
}
