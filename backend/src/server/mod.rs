//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer};

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::state::HttpState;
use crate::inbound::http;
use crate::middleware::request_id::RequestTracking;
use state_builders::build_http_state;

/// Cookie session middleware shared by every worker.
fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build()
}

fn build_app(
    state: HttpState,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .wrap(session_middleware(key, cookie_secure, same_site))
        .wrap(RequestTracking)
        .configure(http::configure(state));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server from the given configuration.
///
/// Readiness flips on once the listener is bound; the returned
/// [`Server`] must be awaited to drive it.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let state = build_http_state(&config);
    let health = state.health.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        client_url: _,
        db_pool: _,
    } = config;

    let server = HttpServer::new(move || {
        build_app(state.clone(), key.clone(), cookie_secure, same_site)
    })
    .bind(bind_addr)?;

    health.mark_ready();
    Ok(server.run())
}
