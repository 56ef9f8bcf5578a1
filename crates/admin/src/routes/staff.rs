//! Staff account management. Superadmins only.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::{capitalize, short_date};
use segunda_mana_core::listing::{Page, paginate, search};
use segunda_mana_core::session::AdminSession;
use segunda_mana_core::{Notice, Staff, StaffForm, StaffId, StaffStatus};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, RequireSuperAdmin};
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{ListQuery, SelectOption, failure_notice, flash_redirect, loaded, outcome, render};

const LIST_PATH: &str = "/staff-management";

#[derive(Debug, Clone)]
pub struct StaffRow {
    pub id: String,
    pub no: usize,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub is_active: bool,
    pub created: String,
}

impl StaffRow {
    fn new(staff: &Staff, no: usize) -> Self {
        Self {
            id: staff.id.to_string(),
            no,
            full_name: staff.full_name.clone(),
            username: staff.username.clone(),
            email: staff.email.clone(),
            role: staff
                .role
                .as_ref()
                .map(|r| capitalize(r.as_str()))
                .unwrap_or_default(),
            status: capitalize(staff.status.as_str()),
            is_active: staff.status == StaffStatus::Active,
            created: staff.created_at.map(short_date).unwrap_or_default(),
        }
    }
}

#[must_use]
pub fn list_page(staff: Vec<Staff>, query: &ListQuery) -> Page<StaffRow> {
    let page = paginate(search(staff, &query.q), query.page());
    let mut no = page.first_row;
    page.map(|s| {
        let row = StaffRow::new(&s, no);
        no += 1;
        row
    })
}

fn status_options(current: &str) -> Vec<SelectOption> {
    let current = if current.trim().is_empty() {
        StaffStatus::default().as_str()
    } else {
        current.trim()
    };
    [StaffStatus::Active, StaffStatus::Inactive]
        .iter()
        .map(|s| SelectOption {
            value: s.as_str().to_string(),
            label: capitalize(s.as_str()),
            selected: s.as_str() == current,
        })
        .collect()
}

/// Staff list with the new-account form underneath.
#[derive(Template)]
#[template(path = "staff/index.html")]
pub struct StaffTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub page: Page<StaffRow>,
    pub query: ListQuery,
    pub filter_query: String,
    pub form: StaffForm,
    pub statuses: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "staff/edit.html")]
pub struct StaffEditTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub id: String,
    pub form: StaffForm,
    pub statuses: Vec<SelectOption>,
}

impl StaffEditTemplate {
    fn new(admin: &AdminSession, flash: Option<Notice>, id: &StaffId, form: StaffForm) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: LIST_PATH,
            flash,
            id: id.to_string(),
            statuses: status_options(&form.status),
            form,
        }
    }
}

/// Toggle form: the status the row currently shows.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/staff-management", get(index).post(create))
        .route("/staff-management/{id}/edit", get(edit_page).post(update))
        .route("/staff-management/{id}/status", post(toggle_status))
        .route("/staff-management/{id}/delete", post(delete))
}

async fn list_template(
    state: &AppState,
    admin: &AdminSession,
    mut flash: Option<Notice>,
    query: ListQuery,
    form: StaffForm,
) -> Result<StaffTemplate> {
    let staff = loaded(state.client().authed(&admin.token).staff().await, &mut flash)?;
    Ok(StaffTemplate {
        admin_user: AdminUserView::from(admin),
        current_path: LIST_PATH,
        flash,
        page: list_page(staff, &query),
        filter_query: query.without_page(),
        query,
        statuses: status_options(&form.status),
        form,
    })
}

#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Flash(flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let template = list_template(&state, &admin, flash, query, StaffForm::default()).await?;
    Ok(render(&template))
}

#[instrument(skip(admin, state, session, form))]
pub async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<StaffForm>,
) -> Result<Response> {
    let notice = match form.clone().into_input(true) {
        Ok(input) => match state.client().authed(&admin.token).create_staff(&input).await {
            Ok(_) => {
                tracing::info!(username = %input.username, "Staff account created");
                let notice = Notice::success("Staff account created successfully!");
                return Ok(flash_redirect(&session, notice, LIST_PATH)
                    .await?
                    .into_response());
            }
            Err(e) => failure_notice(e)?,
        },
        Err(e) => Notice::error(e.to_string()),
    };

    let form = StaffForm {
        password: String::new(),
        ..form
    };
    let template = list_template(&state, &admin, Some(notice), ListQuery::default(), form).await?;
    Ok(render(&template).into_response())
}

#[instrument(skip(admin, state, flash))]
pub async fn edit_page(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Flash(flash): Flash,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = StaffId::new(id);
    let staff = state
        .client()
        .authed(&admin.token)
        .staff()
        .await?
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| AppError::NotFound(format!("staff {id}")))?;

    Ok(render(&StaffEditTemplate::new(
        &admin,
        flash,
        &id,
        StaffForm::from(&staff),
    )))
}

/// Save an edited account. A blank password keeps the old one.
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StaffForm>,
) -> Result<Response> {
    let id = StaffId::new(id);
    let notice = match form.clone().into_input(false) {
        Ok(input) => match state
            .client()
            .authed(&admin.token)
            .update_staff(&id, &input)
            .await
        {
            Ok(_) => {
                tracing::info!(staff_id = %id, "Staff account updated");
                let notice = Notice::success("Staff account updated successfully!");
                return Ok(flash_redirect(&session, notice, LIST_PATH)
                    .await?
                    .into_response());
            }
            Err(e) => failure_notice(e)?,
        },
        Err(e) => Notice::error(e.to_string()),
    };

    let form = StaffForm {
        password: String::new(),
        ..form
    };
    Ok(render(&StaffEditTemplate::new(&admin, Some(notice), &id, form)).into_response())
}

#[instrument(skip(admin, state, session))]
pub async fn toggle_status(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let next = form
        .status
        .parse::<StaffStatus>()
        .unwrap_or_default()
        .toggled();
    let id = StaffId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_staff_status(&id, next)
        .await;
    let success = match next {
        StaffStatus::Active => "Staff activated successfully!",
        StaffStatus::Inactive => "Staff deactivated successfully!",
    };
    let notice = outcome(result.map(|_| None), success)?;
    flash_redirect(&session, notice, LIST_PATH).await
}

#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Redirect> {
    let id = StaffId::new(id);
    let result = state.client().authed(&admin.token).delete_staff(&id).await;
    if result.is_ok() {
        tracing::info!(staff_id = %id, "Staff account deleted");
    }
    let notice = outcome(result.map(|_| None), "Staff account deleted successfully!")?;
    flash_redirect(&session, notice, LIST_PATH).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn staff(id: &str, name: &str, status: &str) -> Staff {
        serde_json::from_value(json!({
            "_id": id, "username": name.to_lowercase(), "fullName": name,
            "email": format!("{}@segundamana.ph", name.to_lowercase()),
            "role": "staff", "status": status,
        }))
        .unwrap()
    }

    #[test]
    fn test_row_and_form_from_staff() {
        let mila = staff("s1", "Mila", "inactive");
        let row = StaffRow::new(&mila, 1);
        assert_eq!(row.role, "Staff");
        assert_eq!(row.status, "Inactive");
        assert!(!row.is_active);

        let form = StaffForm::from(&mila);
        assert_eq!(form.email, "mila@segundamana.ph");
        assert!(form.password.is_empty());
        assert_eq!(form.status, "inactive");
    }

    #[test]
    fn test_status_options_default_to_active() {
        let options = status_options("");
        assert!(options[0].selected);
        assert_eq!(options[0].value, "active");
        assert!(status_options("inactive")[1].selected);
    }

    #[test]
    fn test_list_searches_email() {
        let page = list_page(
            vec![staff("s1", "Mila", "active"), staff("s2", "Jun", "active")],
            &ListQuery {
                q: "jun@".to_string(),
                ..ListQuery::default()
            },
        );
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].full_name, "Jun");
    }
}
