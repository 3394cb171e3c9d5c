//! Authentication route handlers.
//!
//! Handles login, registration, and logout with email + password.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::Nav;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub nav: Nav,
    pub error: Option<String>,
}

/// Map an error code from the redirect query to a user-facing message.
fn error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password.".to_string(),
        "email_taken" => "An account with this email already exists.".to_string(),
        "password_mismatch" => "Passwords do not match.".to_string(),
        "password_too_short" => "Password must be at least 8 characters.".to_string(),
        "invalid_email" => "Please enter a valid email address.".to_string(),
        "session" => "Your session could not be saved. Please try again.".to_string(),
        _ => "Something went wrong. Please try again.".to_string(),
    }
}

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        nav: Nav::anonymous(),
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    match service
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email,
            };

            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&current.id, Some(current.email.as_str()));

            Redirect::to("/").into_response()
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Redirect::to("/auth/login?error=credentials").into_response()
        }
    }
}

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        nav: Nav::anonymous(),
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle registration form submission.
///
/// A successful registration logs the user straight in.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    if form.password != form.password_confirm {
        return Redirect::to("/auth/register?error=password_mismatch").into_response();
    }

    let service = AuthService::new(state.pool());

    match service
        .register_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email,
            };

            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to set session after registration: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&current.id, Some(current.email.as_str()));

            Redirect::to("/").into_response()
        }
        Err(AuthError::UserAlreadyExists) => {
            Redirect::to("/auth/register?error=email_taken").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/register?error=password_too_short").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/register?error=invalid_email").into_response()
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            Redirect::to("/auth/register?error=failed").into_response()
        }
    }
}

/// Handle logout.
///
/// Clears the session user and destroys the session.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }

    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }

    clear_sentry_user();

    Redirect::to("/").into_response()
}
