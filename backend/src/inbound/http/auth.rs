//! Authentication and account recovery handlers.

use actix_web::{get, post, web, HttpResponse};
use argon2::password_hash::rand_core::{OsRng, RngCore};
use argon2::password_hash::{PasswordHash as PhcHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::ports::{PasswordResetToken, ResetPasswordMail};
use crate::domain::user::{validate_password, Email, PasswordHash, PersonName, Role, User};
use crate::domain::Error;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::field_error;
use crate::inbound::http::{storage_error, ApiResult};

/// Reset links stay valid for fifteen minutes.
const RESET_TOKEN_TTL_MINUTES: i64 = 15;

/// Hash a clear-text password with Argon2id and a fresh salt.
pub(crate) fn hash_password(password: &str) -> Result<PasswordHash, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash::new(hash.to_string()))
        .map_err(|error| Error::internal(format!("password hashing failed: {error}")))
}

/// Verify a candidate password against a stored hash. Undecodable hashes
/// count as a mismatch.
pub(crate) fn verify_password(stored: &PasswordHash, candidate: &str) -> bool {
    PhcHash::new(stored.as_str())
        .map(|parsed| {
            Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Hex-encoded SHA-256 digest of a reset token.
pub(crate) fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Load the session's user or fail with `401`.
pub(crate) async fn current_user(
    state: &HttpState,
    session: &SessionContext,
) -> Result<User, Error> {
    let id = session.require_user_id()?;
    state
        .users
        .find_by_id(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::unauthorized("Login required."))
}

/// Require the session user to be an admin; `action` completes the
/// refusal message.
pub(crate) async fn require_admin(
    state: &HttpState,
    session: &SessionContext,
    action: &str,
) -> Result<User, Error> {
    let user = current_user(state, session).await?;
    if user.is_admin() {
        Ok(user)
    } else {
        Err(Error::forbidden(format!(
            "This user is not allowed to {action}."
        )))
    }
}

/// Registration request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    /// Defaults to `Guest` when omitted.
    pub role: Option<Role>,
    pub image: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = Email::new(payload.email).map_err(|e| field_error("email", e))?;
    let first_name =
        PersonName::new("First name", payload.first_name).map_err(|e| field_error("firstName", e))?;
    let last_name =
        PersonName::new("Last name", payload.last_name).map_err(|e| field_error("lastName", e))?;
    validate_password(&payload.password).map_err(|e| field_error("password", e))?;

    if state
        .users
        .find_by_email(&email)
        .await
        .map_err(storage_error)?
        .is_some()
    {
        return Err(Error::conflict("User already exists."));
    }

    let user = User {
        id: Uuid::new_v4(),
        email,
        first_name,
        last_name,
        role: payload.role.unwrap_or(Role::Guest),
        image: payload.image,
        password_hash: hash_password(&payload.password)?,
    };
    state.users.create(&user).await.map_err(storage_error)?;
    session.persist_user(user.id)?;

    Ok(HttpResponse::Created().json(user))
}

/// Login request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = User,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let email = Email::new(payload.email)
        .map_err(|_| Error::unauthorized("Invalid email or password."))?;
    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::unauthorized("Invalid email or password."))?;
    if !verify_password(&user.password_hash, &payload.password) {
        return Err(Error::unauthorized("Invalid email or password."));
    }

    session.persist_user(user.id)?;
    Ok(HttpResponse::Ok().json(user))
}

/// Plain confirmation message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session cleared", body = MessageResponse),
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::Ok().json(MessageResponse::new("User logged out successfully.")))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current session user", body = User),
        (status = 401, description = "Not logged in", body = Error),
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(user))
}

/// Reset request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SendResetRequest {
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = SendResetRequest,
    responses(
        (status = 200, description = "Reset mail dispatched", body = MessageResponse),
        (status = 404, description = "Unknown email", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "sendResetPassword",
    security([])
)]
#[post("/auth/reset-password")]
pub async fn send_reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<SendResetRequest>,
) -> ApiResult<HttpResponse> {
    let email = Email::new(payload.into_inner().email).map_err(|e| field_error("email", e))?;
    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| Error::not_found("User not found."))?;

    let token = generate_reset_token();
    state
        .password_resets
        .store(&PasswordResetToken {
            user_id: user.id,
            token_digest: token_digest(&token),
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        })
        .await
        .map_err(storage_error)?;

    let mail = ResetPasswordMail {
        recipient: user.email.as_ref().to_owned(),
        reset_link: format!(
            "{}/{}/reset-password/{}/",
            state.client_url.trim_end_matches('/'),
            user.id,
            token
        ),
    };
    state
        .mail
        .send_reset_password(&mail)
        .await
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "An email has been sent to reset your password.",
    )))
}

/// New password body for the reset link.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/{user_id}/reset-password/{token}",
    params(
        ("user_id" = Uuid, Path, description = "Account being recovered"),
        ("token" = String, Path, description = "Token from the reset link"),
    ),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password replaced", body = MessageResponse),
        (status = 400, description = "Invalid or expired link", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/auth/{user_id}/reset-password/{token}")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    path: web::Path<(Uuid, String)>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let (user_id, token) = path.into_inner();
    let invalid_link = || Error::invalid_request("Link is invalid or has expired.");

    let mut user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(storage_error)?
        .ok_or_else(invalid_link)?;
    let stored = state
        .password_resets
        .find(user_id, &token_digest(&token))
        .await
        .map_err(storage_error)?
        .ok_or_else(invalid_link)?;
    if stored.expires_at < Utc::now() {
        return Err(invalid_link());
    }

    let password = payload.into_inner().password;
    validate_password(&password).map_err(|e| field_error("password", e))?;
    user.password_hash = hash_password(&password)?;
    state.users.update(&user).await.map_err(storage_error)?;
    state
        .password_resets
        .revoke_for_user(user_id)
        .await
        .map_err(storage_error)?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Your password has been reset successfully.",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{register_admin, test_app, TestContext};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{json, Value};

    #[actix_web::test]
    async fn password_hashing_round_trips() {
        let hash = hash_password("Sup3r$ecret").expect("hash");
        assert!(verify_password(&hash, "Sup3r$ecret"));
        assert!(!verify_password(&hash, "Sup3r$ecret!"));
        assert!(!verify_password(&PasswordHash::new("not-a-phc-string"), "x"));
    }

    #[actix_web::test]
    async fn register_rejects_weak_passwords() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "email": "ana@example.com",
                    "firstName": "Ana",
                    "lastName": "Maric",
                    "password": "short",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn duplicate_email_registration_conflicts() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        register_admin(&app, "ana@example.com").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "email": "ana@example.com",
                    "firstName": "Ana",
                    "lastName": "Maric",
                    "password": "Passw0rd!",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "User already exists.");
    }

    #[actix_web::test]
    async fn login_session_reaches_me() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        register_admin(&app, "ana@example.com").await;

        let login_res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "ana@example.com", "password": "Passw0rd!" }))
                .to_request(),
        )
        .await;
        assert_eq!(login_res.status(), StatusCode::OK);
        let cookie = login_res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();

        let me_res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/auth/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(me_res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(me_res).await;
        assert_eq!(body["email"], "ana@example.com");
        assert!(body.get("passwordHash").is_none());
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        register_admin(&app, "ana@example.com").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "ana@example.com", "password": "Wrong1!" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Invalid email or password.");
    }

    #[actix_web::test]
    async fn reset_flow_replaces_the_password() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        register_admin(&app, "ana@example.com").await;

        let send = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/reset-password")
                .set_json(json!({ "email": "ana@example.com" }))
                .to_request(),
        )
        .await;
        assert_eq!(send.status(), StatusCode::OK);

        let sent = ctx.mail.sent();
        assert_eq!(sent.len(), 1);
        // The link ends with `/{user_id}/reset-password/{token}/`.
        let mut segments: Vec<&str> = sent[0]
            .reset_link
            .trim_end_matches('/')
            .rsplit('/')
            .collect();
        let token = segments.remove(0);
        let user_id = segments[1];

        let reset = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/auth/{user_id}/reset-password/{token}"))
                .set_json(json!({ "password": "N3wPass!" }))
                .to_request(),
        )
        .await;
        assert_eq!(reset.status(), StatusCode::OK);

        // Old password rejected, new one accepted.
        let old = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "ana@example.com", "password": "Passw0rd!" }))
                .to_request(),
        )
        .await;
        assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
        let new = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(json!({ "email": "ana@example.com", "password": "N3wPass!" }))
                .to_request(),
        )
        .await;
        assert_eq!(new.status(), StatusCode::OK);

        // Tokens are single use.
        let reuse = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/auth/{user_id}/reset-password/{token}"))
                .set_json(json!({ "password": "An0ther!" }))
                .to_request(),
        )
        .await;
        assert_eq!(reuse.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn bogus_reset_token_is_rejected() {
        let ctx = TestContext::new();
        let app = test::init_service(test_app(&ctx)).await;
        register_admin(&app, "ana@example.com").await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!(
                    "/api/auth/{}/reset-password/deadbeef",
                    Uuid::new_v4()
                ))
                .set_json(json!({ "password": "N3wPass!" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Link is invalid or has expired.");
    }
}
