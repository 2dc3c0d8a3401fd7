//! Expense category handlers.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::expense::{ExpenseCategory, ExpenseValidationError};
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, require_admin};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::{storage_error, ApiResult};

fn validation_error(error: ExpenseValidationError) -> Error {
    let field = match error {
        ExpenseValidationError::EmptyCategoryDescription => "description",
        _ => "name",
    };
    field_error(field, error)
}

async fn load_category(state: &HttpState, id: Uuid) -> Result<ExpenseCategory, Error> {
    state
        .expense_categories
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("Expense category not found."))
}

/// Reject a name already used by a different category.
async fn check_name_free(state: &HttpState, name: &str, own_id: Option<Uuid>) -> Result<(), Error> {
    let existing = state
        .expense_categories
        .find_by_name(name)
        .await
        .map_err(storage_error)?;
    if existing.is_some_and(|other| Some(other.id) != own_id) {
        return Err(Error::conflict("Expense category already exists."));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/expense-categories",
    responses(
        (status = 200, description = "All expense categories", body = [ExpenseCategory]),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["expense-categories"],
    operation_id = "listExpenseCategories"
)]
#[get("/expense-categories")]
pub async fn list_expense_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ExpenseCategory>>> {
    current_user(&state, &session).await?;
    let categories = state
        .expense_categories
        .list()
        .await
        .map_err(storage_error)?;
    Ok(web::Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/expense-categories/{category_id}",
    params(("category_id" = Uuid, Path, description = "Category to fetch")),
    responses(
        (status = 200, description = "The category", body = ExpenseCategory),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown category", body = Error),
    ),
    tags = ["expense-categories"],
    operation_id = "getExpenseCategory"
)]
#[get("/expense-categories/{category_id}")]
pub async fn get_expense_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ExpenseCategory>> {
    current_user(&state, &session).await?;
    let category = load_category(&state, path.into_inner()).await?;
    Ok(web::Json(category))
}

/// New-category body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExpenseCategoryRequest {
    pub name: String,
    pub description: String,
}

#[utoipa::path(
    post,
    path = "/api/expense-categories",
    request_body = CreateExpenseCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ExpenseCategory),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 409, description = "Name already taken", body = Error),
    ),
    tags = ["expense-categories"],
    operation_id = "createExpenseCategory"
)]
#[post("/expense-categories")]
pub async fn create_expense_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateExpenseCategoryRequest>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "create expense categories").await?;
    let payload = payload.into_inner();
    check_name_free(&state, &payload.name, None).await?;

    let category = ExpenseCategory {
        id: Uuid::new_v4(),
        name: payload.name,
        description: payload.description,
    };
    category.validate().map_err(validation_error)?;

    state
        .expense_categories
        .create(&category)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::Created().json(category))
}

/// Partial update body. Absent fields keep their stored values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateExpenseCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/expense-categories/{category_id}",
    params(("category_id" = Uuid, Path, description = "Category to update")),
    request_body = UpdateExpenseCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = ExpenseCategory),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown category", body = Error),
        (status = 409, description = "Name already taken", body = Error),
    ),
    tags = ["expense-categories"],
    operation_id = "updateExpenseCategory"
)]
#[patch("/expense-categories/{category_id}")]
pub async fn update_expense_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateExpenseCategoryRequest>,
) -> ApiResult<web::Json<ExpenseCategory>> {
    require_admin(&state, &session, "update expense categories").await?;
    let mut category = load_category(&state, path.into_inner()).await?;
    let payload = payload.into_inner();

    if let Some(name) = payload.name {
        check_name_free(&state, &name, Some(category.id)).await?;
        category.name = name;
    }
    if let Some(description) = payload.description {
        category.description = description;
    }
    category.validate().map_err(validation_error)?;

    state
        .expense_categories
        .update(&category)
        .await
        .map_err(storage_error)?;
    Ok(web::Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/expense-categories/{category_id}",
    params(("category_id" = Uuid, Path, description = "Category to delete")),
    responses(
        (status = 204, description = "Category removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Admin only", body = Error),
        (status = 404, description = "Unknown category", body = Error),
    ),
    tags = ["expense-categories"],
    operation_id = "deleteExpenseCategory"
)]
#[delete("/expense-categories/{category_id}")]
pub async fn delete_expense_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_admin(&state, &session, "delete expense categories").await?;
    let category = load_category(&state, path.into_inner()).await?;
    state
        .expense_categories
        .delete(category.id)
        .await
        .map_err(storage_error)?;
    Ok(HttpResponse::NoContent().finish())
}
