//! Authentication route handlers for admin.
//!
//! Email and password go to the backend once; the token it returns is the
//! only credential kept, inside the server-side session.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::Notice;
use segunda_mana_core::session::AdminSession;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Flash, OptionalAdmin};
use crate::models::session;
use crate::state::AppState;

use super::render;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub flash: Option<Notice>,
    pub email: String,
}

/// Login form.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Render the login page, or skip it when already logged in.
///
/// GET /login
#[instrument(skip_all)]
async fn login_page(OptionalAdmin(admin): OptionalAdmin, Flash(flash): Flash) -> Response {
    if admin.is_some_and(|a| a.is_authenticated()) {
        return Redirect::to("/dashboard").into_response();
    }
    render(&LoginTemplate {
        flash,
        email: String::new(),
    })
    .into_response()
}

/// POST /login
#[instrument(skip_all)]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = form.email.trim().to_string();
    let password = SecretString::from(form.password);

    let failed = |message: String| {
        render(&LoginTemplate {
            flash: Some(Notice::error(message)),
            email: email.clone(),
        })
        .into_response()
    };

    if email.is_empty() {
        return Ok(failed("Please enter your email and password.".to_string()));
    }

    match state.client().login(&email, &password).await {
        Ok(response) => {
            let admin = AdminSession::from_login(response);
            if !admin.is_authenticated() {
                tracing::warn!("Backend accepted login but returned an empty token");
                return Ok(failed("Login failed. Please try again.".to_string()));
            }
            session::init(&session, &admin).await?;
            set_sentry_user(&admin.user.email, admin.role.as_str());
            tracing::info!(role = %admin.role, "Admin logged in");
            Ok(Redirect::to("/dashboard").into_response())
        }
        Err(e) => {
            tracing::info!("Login rejected: {e}");
            Ok(failed(e.user_message()))
        }
    }
}

/// Log out and clear the session.
///
/// POST /logout
#[instrument(skip_all)]
async fn logout(session: Session) -> Result<Redirect> {
    session::clear(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}
