//! Authentication route handlers.
//!
//! Sign-in exchanges the form's username and password for a bearer token
//! from the backend and keeps it in the session. Registration creates the
//! account and sends the shopper on to sign in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::Username;

use crate::api::Credentials;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{self, Flash};
use crate::layout::{Layout, Page};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Inline error for any failed sign-in.
pub const LOGIN_FAILED: &str = "Invalid username or password";

// =============================================================================
// Form Types
// =============================================================================

/// Login and registration form data.
#[derive(Deserialize)]
pub struct CredentialsForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl CredentialsForm {
    /// Validate the form into backend credentials.
    fn credentials(&self) -> Result<Credentials, String> {
        let username = Username::parse(&self.username).map_err(|e| e.to_string())?;
        if self.password.is_empty() {
            return Err("password cannot be empty".to_string());
        }
        Ok(Credentials::new(username, self.password.clone()))
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub error: Option<String>,
    pub username: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display login page.
#[instrument(skip(state, page))]
pub async fn login_page(State(state): State<AppState>, page: Page) -> LoginTemplate {
    LoginTemplate {
        layout: page.layout(state.api()).await,
        error: None,
        username: String::new(),
    }
}

/// Handle login form submission.
///
/// Any failure re-renders the form with the same inline message.
#[instrument(skip(state, page, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    page: Page,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let failed = |layout: Layout, username: String| {
        LoginTemplate {
            layout,
            error: Some(LOGIN_FAILED.to_string()),
            username,
        }
        .into_response()
    };

    let credentials = match form.credentials() {
        Ok(credentials) => credentials,
        Err(reason) => {
            tracing::debug!("Rejected login form: {reason}");
            return failed(page.layout(state.api()).await, form.username);
        }
    };

    let token = match state.api().login(&credentials).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            return failed(page.layout(state.api()).await, form.username);
        }
    };

    let user = CurrentUser::new(credentials.username, token.access_token);
    if let Err(e) = set_current_user(page.session(), &user).await {
        tracing::error!("Failed to set session: {e}");
        return failed(page.layout(state.api()).await, form.username);
    }

    set_sentry_user(user.username.as_str());
    tracing::info!(username = %user.username, "Signed in");
    flash::push(page.session(), Flash::success("Signed in!")).await;
    Redirect::to("/").into_response()
}

/// Display registration page.
#[instrument(skip(state, page))]
pub async fn register_page(State(state): State<AppState>, page: Page) -> RegisterTemplate {
    RegisterTemplate {
        layout: page.layout(state.api()).await,
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Redirect {
    let result = match form.credentials() {
        Ok(credentials) => state
            .api()
            .register(&credentials)
            .await
            .map_err(|e| e.detail()),
        Err(reason) => Err(reason),
    };

    match result {
        Ok(_) => {
            flash::push(
                &session,
                Flash::success("Registration successful! Now sign in."),
            )
            .await;
            Redirect::to("/auth/login")
        }
        Err(detail) => {
            tracing::warn!("Registration failed: {detail}");
            flash::push(
                &session,
                Flash::error(format!("Registration failed: {detail}")),
            )
            .await;
            Redirect::to("/auth/register")
        }
    }
}

/// Handle logout.
///
/// The token is only dropped locally; the backend has no revocation.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {e}");
    }
    clear_sentry_user();
    Redirect::to("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password: &str) -> CredentialsForm {
        CredentialsForm {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_credentials_validation() {
        assert!(form("alice", "pw").credentials().is_ok());
        assert!(form("  alice ", "pw").credentials().is_ok());
        assert!(form("", "pw").credentials().is_err());
        assert!(form("two words", "pw").credentials().is_err());
        assert!(form("alice", "").credentials().is_err());
    }

    #[test]
    fn test_form_debug_redacts_password() {
        let debug = format!("{:?}", form("alice", "s3cret-pw"));
        assert!(!debug.contains("s3cret-pw"));
    }
}
