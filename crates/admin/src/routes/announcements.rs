//! Announcement route handlers: list, publish, show/hide and delete.
//!
//! Publishing is a multipart form so a cover image or video can ride along
//! with the text fields.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::short_date;
use segunda_mana_core::listing::{Page, paginate, search};
use segunda_mana_core::session::AdminSession;
use segunda_mana_core::{Announcement, AnnouncementDraft, AnnouncementId, Notice};

use crate::client::AnnouncementUpload;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{ListQuery, failure_notice, flash_redirect, loaded, outcome, render};

const LIST_PATH: &str = "/announcement";

#[derive(Debug, Clone)]
pub struct AnnouncementRow {
    pub id: String,
    pub title: String,
    pub label: String,
    pub body: String,
    pub cover: Option<String>,
    pub active: bool,
    pub date: String,
}

impl From<&Announcement> for AnnouncementRow {
    fn from(a: &Announcement) -> Self {
        Self {
            id: a.id.to_string(),
            title: a.title.clone(),
            label: a.label.clone(),
            body: a.body.clone(),
            cover: a.cover().map(String::from),
            active: a.active,
            date: a.created_at.map(short_date).unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "announcements/index.html")]
pub struct AnnouncementsTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub page: Page<AnnouncementRow>,
    pub query: ListQuery,
    pub filter_query: String,
    pub draft: AnnouncementDraft,
}

/// Show/hide form: the state the announcement should end up in.
#[derive(Debug, Deserialize)]
pub struct ActiveForm {
    pub active: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/announcement", get(index).post(publish))
        .route("/announcement/{id}/status", post(set_active))
        .route("/announcement/{id}/delete", post(delete))
}

async fn list_template(
    state: &AppState,
    admin: &AdminSession,
    mut flash: Option<Notice>,
    query: ListQuery,
    draft: AnnouncementDraft,
) -> Result<AnnouncementsTemplate> {
    let announcements = loaded(
        state.client().authed(&admin.token).announcements().await,
        &mut flash,
    )?;
    let page = paginate(search(announcements, &query.q), query.page())
        .map(|a| AnnouncementRow::from(&a));
    Ok(AnnouncementsTemplate {
        admin_user: AdminUserView::from(admin),
        current_path: LIST_PATH,
        flash,
        page,
        filter_query: query.without_page(),
        query,
        draft,
    })
}

#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let template =
        list_template(&state, &admin, flash, query, AnnouncementDraft::default()).await?;
    Ok(render(&template))
}

/// Split the multipart body into the text draft and the optional media file.
/// An empty file input arrives as a nameless, zero-byte part and is dropped.
async fn read_publish_form(
    mut multipart: Multipart,
) -> Result<(AnnouncementDraft, Option<AnnouncementUpload>)> {
    let mut draft = AnnouncementDraft::default();
    let mut media = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "media" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    media = Some(AnnouncementUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" | "label" | "body" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read {name}: {e}")))?;
                match name.as_str() {
                    "title" => draft.title = text,
                    "label" => draft.label = text,
                    _ => draft.body = text,
                }
            }
            _ => {}
        }
    }

    Ok((draft, media))
}

#[instrument(skip_all)]
pub async fn publish(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let (draft, media) = read_publish_form(multipart).await?;

    let notice = match draft.clone().validate() {
        Ok(valid) => {
            let title = valid.title.clone();
            match state
                .client()
                .authed(&admin.token)
                .add_announcement(valid, media)
                .await
            {
                Ok(_) => {
                    tracing::info!(%title, "Announcement published");
                    let notice = Notice::success("Announcement published successfully!");
                    return Ok(flash_redirect(&session, notice, LIST_PATH)
                        .await?
                        .into_response());
                }
                Err(e) => failure_notice(e)?,
            }
        }
        Err(e) => Notice::error(e.to_string()),
    };

    let template =
        list_template(&state, &admin, Some(notice), ListQuery::default(), draft).await?;
    Ok(render(&template).into_response())
}

#[instrument(skip(admin, state, session))]
pub async fn set_active(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ActiveForm>,
) -> Result<Redirect> {
    let id = AnnouncementId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_announcement_active(&id, form.active)
        .await;
    let success = if form.active {
        "Announcement enabled successfully!"
    } else {
        "Announcement disabled successfully!"
    };
    let notice = outcome(result.map(|_| None), success)?;
    flash_redirect(&session, notice, LIST_PATH).await
}

#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = AnnouncementId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .delete_announcement(&id)
        .await;
    let notice = outcome(result.map(|_| None), "Announcement deleted successfully!")?;
    flash_redirect(&session, notice, LIST_PATH).await
}
