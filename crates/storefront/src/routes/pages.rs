//! Static pages and the contact form.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::Notice;

use crate::backend::{BackendError, ContactMessage};
use crate::error::Result;
use crate::filters;
use crate::middleware::Flash;
use crate::models::session;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub flash: Option<Notice>,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/contact.html")]
pub struct ContactTemplate {
    pub flash: Option<Notice>,
    pub form: ContactMessage,
}

/// Display the about page.
pub async fn about(Flash(flash): Flash) -> AboutTemplate {
    AboutTemplate { flash }
}

/// Display an empty contact form.
pub async fn contact_page(Flash(flash): Flash) -> ContactTemplate {
    ContactTemplate {
        flash,
        form: ContactMessage::default(),
    }
}

/// Send the contact form. Success redirects to a cleared form; failure
/// re-renders with the visitor's input.
#[instrument(skip(state, session, form))]
pub async fn send_contact(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ContactMessage>,
) -> Result<Response> {
    match state.backend().send_contact(&form).await {
        Ok(message) => {
            session::flash(&session, Notice::success(message)).await?;
            Ok(Redirect::to("/contact").into_response())
        }
        Err(e) => {
            tracing::warn!("Failed to send contact message: {e}");
            let message = match e {
                BackendError::Api { .. } | BackendError::Unauthorized(_) => e.user_message(),
                _ => "An error occurred while sending your message.".to_string(),
            };
            Ok(ContactTemplate {
                flash: Some(Notice::error(message)),
                form,
            }
            .into_response())
        }
    }
}
