//! Product route handlers: list, export, edit, archive and add.

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::listing::{ArchiveFilter, search};
use segunda_mana_core::{CatalogForm, Notice, ProductId, csv};

use crate::error::Result;
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::catalog::{
    CatalogFormTemplate, CatalogListTemplate, CatalogPage, archive_options, list_page,
};
use super::dashboard::AdminUserView;
use super::{ListQuery, csv_response, failure_notice, flash_redirect, loaded, outcome, render};

const PAGE: CatalogPage = CatalogPage {
    noun: "Product",
    heading: "Products",
    list_path: "/admin-product",
    add_path: "/add-product",
};

/// Archive toggle form: the state the item should end up in.
#[derive(Debug, Deserialize)]
pub struct ArchiveForm {
    pub archived: bool,
}

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin-product", get(index))
        .route("/admin-product/export", get(export))
        .route("/admin-product/{id}/edit", get(edit_page).post(update))
        .route("/admin-product/{id}/archive", post(archive))
        .route("/add-product", get(add_page).post(create))
}

/// Product list page handler.
#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(mut flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let products = loaded(
        state.client().authed(&admin.token).products().await,
        &mut flash,
    )?;

    Ok(render(&CatalogListTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: PAGE.list_path,
        flash,
        catalog: PAGE,
        page: list_page(products, &query),
        filter_query: query.without_page(),
        archive_options: archive_options(&query),
        query,
    }))
}

/// Download the filtered product list as CSV.
#[instrument(skip(admin, state, session))]
pub async fn export(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let products = state.client().authed(&admin.token).products().await?;
    let filter: ArchiveFilter = query.archive.parse().unwrap_or_default();
    let products = filter.apply(search(products, &query.q));
    csv_response(
        &session,
        csv::products(&products),
        "products.csv",
        PAGE.list_path,
    )
    .await
}

/// Edit form prefilled from the backend.
#[instrument(skip(admin, state, flash))]
pub async fn edit_page(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
    Path(id): Path<String>,
) -> Result<Html<String>> {
    let id = ProductId::new(id);
    let product = state.client().authed(&admin.token).product(&id).await?;

    Ok(render(&CatalogFormTemplate::new(
        AdminUserView::from(&admin),
        PAGE.list_path,
        flash,
        format!("Edit {}", product.display_name()),
        format!("/admin-product/{id}/edit"),
        PAGE.list_path,
        CatalogForm::from(&product),
    )))
}

/// Save an edited product.
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<CatalogForm>,
) -> Result<Response> {
    let id = ProductId::new(id);
    let retry = |notice: Notice, form: CatalogForm| {
        render(&CatalogFormTemplate::new(
            AdminUserView::from(&admin),
            PAGE.list_path,
            Some(notice),
            "Edit Product".to_string(),
            format!("/admin-product/{id}/edit"),
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
        .update_product(&id, &input)
        .await
    {
        Ok(message) => {
            tracing::info!(product_id = %id, "Product updated");
            let notice =
                Notice::success(message.unwrap_or_else(|| "Product updated successfully!".into()));
            Ok(flash_redirect(&session, notice, PAGE.list_path)
                .await?
                .into_response())
        }
        Err(e) => Ok(retry(failure_notice(e)?, form)),
    }
}

/// Archive or restore a product.
#[instrument(skip(admin, state, session))]
pub async fn archive(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ArchiveForm>,
) -> Result<Redirect> {
    let id = ProductId::new(id);
    let result = state
        .client()
        .authed(&admin.token)
        .set_product_archived(&id, form.archived)
        .await;
    let success = if form.archived {
        "Product archived successfully!"
    } else {
        "Product restored successfully!"
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
        "Add Product".to_string(),
        PAGE.add_path.to_string(),
        PAGE.list_path,
        CatalogForm::default(),
    ))
}

/// Create a product.
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
            "Add Product".to_string(),
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

    match state.client().authed(&admin.token).create_product(&input).await {
        Ok(message) => {
            tracing::info!(item = %input.item_name, "Product created");
            let notice =
                Notice::success(message.unwrap_or_else(|| "Product added successfully!".into()));
            Ok(flash_redirect(&session, notice, PAGE.list_path)
                .await?
                .into_response())
        }
        Err(e) => Ok(retry(failure_notice(e)?, form)),
    }
}
