//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. The session
//! cookie is signed with a key derived from the configured session secret,
//! so a tampered cookie is rejected before the store is consulted.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sundry_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (for the signing key and cookie security)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore, SignedCookie> {
    // Note: The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());

    // Key derivation requires at least 32 bytes of input; config loading
    // enforces that floor on SUNDRY_SESSION_SECRET before we get here.
    let key = Key::derive_from(config.session_secret.expose_secret().as_bytes());

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    SessionManagerLayer::new(store)
        .with_signed(key)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[tokio::test]
    async fn test_session_layer_derives_signing_key_from_secret() {
        let pool = PgPool::connect_lazy("postgres://localhost/sundry_test").unwrap();
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/sundry_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            sentry_dsn: None,
        };

        // A minimum-length secret must yield a usable signing key.
        let _layer = create_session_layer(&pool, &config);
    }
}
