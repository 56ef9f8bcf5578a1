//! Beneficiary route handlers.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::{capitalize, local_date};
use segunda_mana_core::listing::{Page, paginate, search};
use segunda_mana_core::session::AdminSession;
use segunda_mana_core::{
    Beneficiary, BeneficiaryForm, BeneficiaryId, BeneficiaryStatus, Notice, csv,
};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{
    ListQuery, SelectOption, csv_response, failure_notice, flash_redirect, loaded, outcome, render,
};

const LIST_PATH: &str = "/beneficiary";
const ADD_PATH: &str = "/add-beneficiary";

#[derive(Debug, Clone)]
pub struct BeneficiaryRow {
    pub id: String,
    pub no: usize,
    pub name: String,
    pub age: String,
    pub gender: String,
    pub contact_number: String,
    pub status: String,
    pub status_value: String,
    pub is_active: bool,
    pub registered_on: String,
}

impl BeneficiaryRow {
    fn new(b: &Beneficiary, no: usize) -> Self {
        Self {
            id: b.id.to_string(),
            no,
            name: b.full_name(),
            age: b.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: b.gender.clone(),
            contact_number: b.contact_number.clone(),
            status: capitalize(b.status.as_str()),
            status_value: b.status.as_str().to_string(),
            is_active: b.status == BeneficiaryStatus::Active,
            registered_on: b.registered_on(),
        }
    }
}

#[must_use]
pub fn list_page(items: Vec<Beneficiary>, query: &ListQuery) -> Page<BeneficiaryRow> {
    let page = paginate(search(items, &query.q), query.page());
    let mut no = page.first_row;
    page.map(|b| {
        let row = BeneficiaryRow::new(&b, no);
        no += 1;
        row
    })
}

#[derive(Template)]
#[template(path = "beneficiaries/index.html")]
pub struct BeneficiariesTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub page: Page<BeneficiaryRow>,
    pub query: ListQuery,
    pub filter_query: String,
}

#[derive(Template)]
#[template(path = "beneficiaries/form.html")]
pub struct BeneficiaryFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub heading: String,
    pub action: String,
    pub form: BeneficiaryForm,
    pub statuses: Vec<SelectOption>,
    pub genders: Vec<SelectOption>,
}

impl BeneficiaryFormTemplate {
    fn new(
        admin: &AdminSession,
        current_path: &'static str,
        flash: Option<Notice>,
        heading: String,
        action: String,
        form: BeneficiaryForm,
    ) -> Self {
        let status = if form.status.trim().is_empty() {
            BeneficiaryStatus::Active.as_str()
        } else {
            form.status.trim()
        };
        let statuses = BeneficiaryStatus::ALL
            .iter()
            .map(|s| SelectOption {
                value: s.as_str().to_string(),
                label: capitalize(s.as_str()),
                selected: s.as_str() == status,
            })
            .collect();
        Self {
            admin_user: AdminUserView::from(admin),
            current_path,
            flash,
            heading,
            action,
            genders: SelectOption::plain(["Male", "Female", "Other"], &form.gender),
            statuses,
            form,
        }
    }
}

/// Status toggle form: the status the row currently shows.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/beneficiary", get(index))
        .route("/beneficiary/export", get(export))
        .route("/beneficiary/{id}/edit", get(edit_page).post(update))
        .route("/beneficiary/{id}/status", post(toggle_status))
        .route("/add-beneficiary", get(add_page).post(create))
}

#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(mut flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let beneficiaries = loaded(
        state.client().authed(&admin.token).beneficiaries().await,
        &mut flash,
    )?;

    Ok(render(&BeneficiariesTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH,
        flash,
        page: list_page(beneficiaries, &query),
        filter_query: query.without_page(),
        query,
    }))
}

#[instrument(skip(admin, state, session))]
pub async fn export(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let beneficiaries = state.client().authed(&admin.token).beneficiaries().await?;
    let beneficiaries = search(beneficiaries, &query.q);
    csv_response(
        &session,
        csv::beneficiaries(&beneficiaries),
        "beneficiaries.csv",
        LIST_PATH,
    )
    .await
}

/// The backend has no single-record endpoint; find it in the list.
async fn find(state: &AppState, admin: &AdminSession, id: &BeneficiaryId) -> Result<Beneficiary> {
    state
        .client()
        .authed(&admin.token)
        .beneficiaries()
        .await?
        .into_iter()
        .find(|b| &b.id == id)
        .ok_or_else(|| AppError::NotFound(format!("beneficiary {id}")))
}

#[instrument(skip(admin, state, flash))]
pub async fn edit_page(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = BeneficiaryId::new(id);
    let beneficiary = find(&state, &admin, &id).await?;

    Ok(render(&BeneficiaryFormTemplate::new(
        &admin,
        LIST_PATH,
        flash,
        format!("Edit {}", beneficiary.full_name()),
        format!("/beneficiary/{id}/edit"),
        BeneficiaryForm::from(&beneficiary),
    )))
}

#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<BeneficiaryForm>,
) -> Result<Response> {
    let id = BeneficiaryId::new(id);
    let retry = |notice: Notice, form: BeneficiaryForm| {
        render(&BeneficiaryFormTemplate::new(
            &admin,
            LIST_PATH,
            Some(notice),
            "Edit Beneficiary".to_string(),
            format!("/beneficiary/{id}/edit"),
            form,
        ))
        .into_response()
    };

    let input = match form.clone().into_input(local_date(Utc::now())) {
        Ok(input) => input,
        Err(e) => return Ok(retry(Notice::error(e.to_string()), form)),
    };

    match state
        .client()
        .authed(&admin.token)
        .update_beneficiary(&id, &input)
        .await
    {
        Ok(_) => {
            tracing::info!(beneficiary_id = %id, "Beneficiary updated");
            let notice = Notice::success("Beneficiary updated successfully!");
            Ok(flash_redirect(&session, notice, LIST_PATH)
                .await?
                .into_response())
        }
        Err(e) => Ok(retry(failure_notice(e)?, form)),
    }
}

/// Flip between active and on hold.
#[instrument(skip(admin, state, session))]
pub async fn toggle_status(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let current: BeneficiaryStatus = form.status.parse().unwrap_or_default();
    let id = BeneficiaryId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_beneficiary_status(&id, current.toggled())
        .await;
    let notice = outcome(result.map(|_| None), "Status updated successfully!")?;
    flash_redirect(&session, notice, LIST_PATH).await
}

#[instrument(skip(admin, flash))]
pub async fn add_page(RequireStaff(admin): RequireStaff, Flash(flash): Flash) -> Html<String> {
    render(&BeneficiaryFormTemplate::new(
        &admin,
        ADD_PATH,
        flash,
        "Add Beneficiary".to_string(),
        ADD_PATH.to_string(),
        BeneficiaryForm::default(),
    ))
}

#[instrument(skip(admin, state, session, form))]
pub async fn create(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<BeneficiaryForm>,
) -> Result<Response> {
    let retry = |notice: Notice, form: BeneficiaryForm| {
        render(&BeneficiaryFormTemplate::new(
            &admin,
            ADD_PATH,
            Some(notice),
            "Add Beneficiary".to_string(),
            ADD_PATH.to_string(),
            form,
        ))
        .into_response()
    };

    let input = match form.clone().into_input(local_date(Utc::now())) {
        Ok(input) => input,
        Err(e) => return Ok(retry(Notice::error(e.to_string()), form)),
    };

    match state
        .client()
        .authed(&admin.token)
        .add_beneficiary(&input)
        .await
    {
        Ok(_) => {
            tracing::info!("Beneficiary added");
            let notice = Notice::success("Beneficiary added successfully!");
            Ok(flash_redirect(&session, notice, LIST_PATH)
                .await?
                .into_response())
        }
        Err(e) => Ok(retry(failure_notice(e)?, form)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn beneficiary(id: &str, first: &str, status: &str) -> Beneficiary {
        serde_json::from_value(json!({
            "_id": id, "firstName": first, "lastName": "Cruz",
            "age": 41, "status": status, "registrationDate": "2024-01-15",
        }))
        .unwrap()
    }

    #[test]
    fn test_row_formats_status() {
        let row = BeneficiaryRow::new(&beneficiary("b1", "Rosa", "on hold"), 3);
        assert_eq!(row.name, "Rosa Cruz");
        assert_eq!(row.status, "On hold");
        assert_eq!(row.status_value, "on hold");
        assert!(!row.is_active);
        assert_eq!(row.age, "41");
        assert_eq!(row.registered_on, "2024-01-15");
    }

    #[test]
    fn test_list_searches_by_name() {
        let items = vec![
            beneficiary("b1", "Rosa", "active"),
            beneficiary("b2", "Lito", "active"),
        ];
        let query = ListQuery {
            q: "lito".to_string(),
            ..ListQuery::default()
        };
        let page = list_page(items, &query);
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, "b2");
        assert_eq!(page.items[0].no, 1);
    }
}
