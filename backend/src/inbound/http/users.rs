//! User administration handlers.
//!
//! Every route requires a logged-in session. Updates and deletions are
//! restricted to the account owner or an admin, and admin accounts may
//! only be changed by themselves.

use actix_web::{delete, get, patch, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::user::{validate_password, Email, PersonName, Role, User};
use crate::domain::Error;
use crate::inbound::http::auth::{current_user, hash_password};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::{storage_error, ApiResult};

async fn load_user(state: &HttpState, id: Uuid) -> Result<User, Error> {
    state
        .users
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("User not found."))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All registered users", body = [User]),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    current_user(&state, &session).await?;
    let users = state.users.list().await.map_err(storage_error)?;
    Ok(web::Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User to fetch")),
    responses(
        (status = 200, description = "The user", body = User),
        (status = 401, description = "Not logged in", body = Error),
        (status = 404, description = "Unknown user", body = Error),
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{user_id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<User>> {
    current_user(&state, &session).await?;
    let user = load_user(&state, path.into_inner()).await?;
    Ok(web::Json(user))
}

/// Partial update body. Absent fields keep their stored values.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub image: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User to update")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not allowed", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 409, description = "Email already registered", body = Error),
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[patch("/users/{user_id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<User>> {
    let caller = current_user(&state, &session).await?;
    let user_id = path.into_inner();
    if !caller.is_admin() && caller.id != user_id {
        return Err(Error::forbidden(
            "This user is not allowed to update other users.",
        ));
    }

    let mut user = load_user(&state, user_id).await?;
    if user.is_admin() && user.id != caller.id {
        return Err(Error::forbidden("Cannot update an admin user."));
    }

    let payload = payload.into_inner();
    if let Some(email) = payload.email {
        let email = Email::new(email).map_err(|e| field_error("email", e))?;
        let existing = state
            .users
            .find_by_email(&email)
            .await
            .map_err(storage_error)?;
        if existing.is_some_and(|other| other.id != user_id) {
            return Err(Error::conflict("User already exists."));
        }
        user.email = email;
    }
    if let Some(first_name) = payload.first_name {
        user.first_name =
            PersonName::new("First name", first_name).map_err(|e| field_error("firstName", e))?;
    }
    if let Some(last_name) = payload.last_name {
        user.last_name =
            PersonName::new("Last name", last_name).map_err(|e| field_error("lastName", e))?;
    }
    if let Some(password) = payload.password {
        validate_password(&password).map_err(|e| field_error("password", e))?;
        user.password_hash = hash_password(&password)?;
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(image) = payload.image {
        user.image = Some(image);
    }

    state.users.update(&user).await.map_err(storage_error)?;
    Ok(web::Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User to delete")),
    responses(
        (status = 204, description = "User removed"),
        (status = 401, description = "Not logged in", body = Error),
        (status = 403, description = "Not allowed", body = Error),
        (status = 404, description = "Unknown user", body = Error),
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{user_id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let caller = current_user(&state, &session).await?;
    let user_id = path.into_inner();
    if !caller.is_admin() && caller.id != user_id {
        return Err(Error::forbidden(
            "This user is not allowed to delete other users.",
        ));
    }

    let user = load_user(&state, user_id).await?;
    if user.is_admin() && user.id != caller.id {
        return Err(Error::forbidden("Cannot delete an admin user."));
    }

    state.users.delete(user_id).await.map_err(storage_error)?;
    if user.id == caller.id {
        session.clear();
    }
    Ok(HttpResponse::NoContent().finish())
}
