//! Backend entry-point: wires configuration, persistence, and the HTTP server.

use std::env;
use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{create_server, ServerConfig};

/// Load the session signing key, generating an ephemeral one only in
/// development.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = load_session_key()?;

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let client_url =
        env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".into());

    let mut config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr, client_url);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
        config = config.with_db_pool(pool);
    }

    create_server(config)?.await
}
