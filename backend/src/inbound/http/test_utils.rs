//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_http::Request;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, App};
use serde_json::json;

use crate::inbound::http::state::HttpState;
use crate::outbound::mail::RecordingMailSender;
use crate::outbound::memory::MemoryStore;

/// Password every test account is registered with.
pub const TEST_PASSWORD: &str = "Passw0rd!";

/// Session middleware configured for tests: fresh key, `session` cookie,
/// no `Secure` flag so plain HTTP test requests carry it.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Shared fixtures for handler tests.
pub struct TestContext {
    pub store: MemoryStore,
    pub mail: Arc<RecordingMailSender>,
    pub state: HttpState,
}

impl TestContext {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let mail = Arc::new(RecordingMailSender::default());
        let mut state = HttpState::in_memory(store.clone(), "https://app.example.com");
        state.mail = mail.clone();
        Self { store, mail, state }
    }
}

/// Full application wired to the context's in-memory state.
pub fn test_app(
    ctx: &TestContext,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(test_session_middleware())
        .configure(crate::inbound::http::configure(ctx.state.clone()))
}

/// Register an account with the given role. Fails the test on error.
pub async fn register_with_role<S, B>(app: &S, email: &str, role: &str)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "email": email,
                "firstName": "Ana",
                "lastName": "Maric",
                "password": TEST_PASSWORD,
                "role": role,
            }))
            .to_request(),
    )
    .await;
    assert!(
        res.status().is_success(),
        "registration failed with {}",
        res.status()
    );
}

/// Register an admin account.
pub async fn register_admin<S, B>(app: &S, email: &str)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register_with_role(app, email, "Admin").await;
}

/// Register a guest account.
pub async fn register_guest<S, B>(app: &S, email: &str)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register_with_role(app, email, "Guest").await;
}

/// Log the account in and return its session cookie.
pub async fn login<S, B>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed with {}", res.status());
    res.response()
        .cookies()
        .find(|c| c.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Register an admin, log in, and return the session cookie.
pub async fn admin_session<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register_admin(app, "admin@example.com").await;
    login(app, "admin@example.com").await
}

/// Register a guest, log in, and return the session cookie.
pub async fn guest_session<S, B>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    register_guest(app, "guest@example.com").await;
    login(app, "guest@example.com").await
}
