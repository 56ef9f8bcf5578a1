//! Inventory route handlers: list, export, edit, archive and add.
//!
//! The backend has no single-item inventory read, so the edit page finds its
//! item in the full list.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::listing::{ArchiveFilter, search};
use segunda_mana_core::{CatalogForm, InventoryId, Notice, csv};

use crate::error::{AppError, Result};
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::catalog::{
    CatalogFormTemplate, CatalogListTemplate, CatalogPage, archive_options, list_page,
};
use super::dashboard::AdminUserView;
use super::products::ArchiveForm;
use super::{ListQuery, csv_response, failure_notice, flash_redirect, loaded, outcome, render};

const PAGE: CatalogPage = CatalogPage {
    noun: "Inventory item",
    heading: "Inventory",
    list_path: "/inventory",
    add_path: "/add-inventory",
};


/// Build the inventory router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(index))
        .route("/inventory/export", get(export))
        .route("/inventory/{id}/edit", get(edit_page).post(update))
        .route("/inventory/{id}/archive", post(archive))
        .route("/add-inventory", get(add_page).post(create))
}

/// Inventory list page handler.
#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(mut flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let items = loaded(
        state.client().authed(&admin.token).inventory().await,
        &mut flash,
    )?;

    Ok(render(&CatalogListTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: PAGE.list_path,
        flash,
        catalog: PAGE,
        page: list_page(items, &query),
        filter_query: query.without_page(),
        archive_options: archive_options(&query),
        query,
    }))
}

/// Download the filtered inventory list as CSV.
#[instrument(skip(admin, state, session))]
pub async fn export(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let items = state.client().authed(&admin.token).inventory().await?;
    let filter: ArchiveFilter = query.archive.parse().unwrap_or_default();
    let items = filter.apply(search(items, &query.q));
    csv_response(
        &session,
        csv::inventory(&items),
        "inventory.csv",
        PAGE.list_path,
    )
    .await
}

/// Edit form prefilled from the inventory list.
#[instrument(skip(admin, state, flash))]
pub async fn edit_page(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = InventoryId::new(id);
    let items = state.client().authed(&admin.token).inventory().await?;
    let item = items
        .iter()
        .find(|item| item.id == id)
        .ok_or_else(|| AppError::NotFound(format!("inventory item {id}")))?;

    Ok(render(&CatalogFormTemplate::new(
        AdminUserView::from(&admin),
        PAGE.list_path,
        flash,
        format!("Edit {}", item.display_name()),
        format!("/inventory/{id}/edit"),
        PAGE.list_path,
        CatalogForm::from(item),
    )))
}

/// Save an edited inventory item.
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CatalogForm>,
) -> Result<Response> {
    let id = InventoryId::new(id);
    let retry = |notice: Notice, form: CatalogForm| {
        render(&CatalogFormTemplate::new(
            AdminUserView::from(&admin),
            PAGE.list_path,
            Some(notice),
            "Edit Inventory".to_string(),
            format!("/inventory/{id}/edit"),
            PAGE.list_path,
            form,
        ))
        .into_response()
    };

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(e) => return Ok(retry(Notice::error(e.to_string()), form)),
    };

    match state
        .client()
        .authed(&admin.token)
        .update_inventory(&id, &input)
        .await
    {
        Ok(message) => {
            tracing::info!(inventory_id = %id, "Inventory item updated");
            let message = message.unwrap_or_else(|| "Inventory updated successfully!".into());
            let notice = Notice::success(message);
            Ok(flash_redirect(&session, notice, PAGE.list_path)
                .await?
                .into_response())
        }
        Err(e) => Ok(retry(failure_notice(e)?, form)),
    }
}

/// Archive or restore an inventory item.
#[instrument(skip(admin, state, session))]
pub async fn archive(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ArchiveForm>,
) -> Result<Redirect> {
    let id = InventoryId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_inventory_archived(&id, form.archived)
        .await;
    let success = if form.archived {
        "Inventory archived!"
    } else {
        "Inventory restored!"
    };
    let notice = outcome(result, success)?;
    flash_redirect(&session, notice, PAGE.list_path).await
}

/// Blank add form.
#[instrument(skip(admin, flash))]
pub async fn add_page(RequireStaff(admin): RequireStaff, Flash(flash): Flash) -> Html<String> {
    render(&CatalogFormTemplate::new(
        AdminUserView::from(&admin),
        PAGE.add_path,
        flash,
        "Add Inventory".to_string(),
        PAGE.add_path.to_string(),
        PAGE.list_path,
        CatalogForm::default(),
    ))
}

/// Create an inventory item.
#[instrument(skip(admin, state, session, form))]
pub async fn create(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CatalogForm>,
) -> Result<Response> {
    let retry = |notice: Notice, form: CatalogForm| {
        render(&CatalogFormTemplate::new(
            AdminUserView::from(&admin),
            PAGE.add_path,
            Some(notice),
            "Add Inventory".to_string(),
            PAGE.add_path.to_string(),
            PAGE.list_path,
            form,
        ))
        .into_response()
    };

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(e) => return Ok(retry(Notice::error(e.to_string()), form)),
    };

    match state.client().authed(&admin.token).create_inventory(&input).await {
        Ok(message) => {
            tracing::info!(item = %input.item_name, "Inventory item created");
            let notice =
                Notice::success(message.unwrap_or_else(|| "Inventory added successfully!".into()));
            Ok(flash_redirect(&session, notice, PAGE.list_path)
                .await?
                .into_response())
        }
        Err(e) => Ok(retry(failure_notice(e)?, form)),
    }
}
