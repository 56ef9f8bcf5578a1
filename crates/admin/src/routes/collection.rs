//! Daily collection sheet: record a branch's takings and export past sheets.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::local_date;
use segunda_mana_core::session::AdminSession;
use segunda_mana_core::types::collection::{DEFAULT_ROWS, MAX_ROWS};
use segunda_mana_core::{CollectionError, CollectionRow, DailyCollection, Notice, csv};

use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{csv_response, failure_notice, flash_redirect, loaded, render};

const SHEET_PATH: &str = "/dailycollection";

/// One editable sheet row; numbers stay as typed so blanks stay blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetRow {
    pub index: usize,
    pub ar_ref: String,
    pub item: String,
    pub qty: String,
    pub amount: String,
    pub total: String,
    pub cash: String,
    pub gcash: String,
    pub discount: String,
    pub reason: String,
    pub approver: String,
}

fn amount(value: Decimal) -> String {
    if value.is_zero() {
        String::new()
    } else {
        value.normalize().to_string()
    }
}

impl SheetRow {
    fn blank(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    fn from_row(index: usize, row: &CollectionRow) -> Self {
        Self {
            index,
            ar_ref: row.ar_ref.clone(),
            item: row.item.clone(),
            qty: amount(row.qty),
            amount: amount(row.amount),
            total: amount(row.total),
            cash: amount(row.cash),
            gcash: amount(row.gcash),
            discount: amount(row.discount),
            reason: row.reason.clone(),
            approver: row.approver.clone(),
        }
    }
}

/// Rows to show for a sheet: what was entered, or the blank starting rows.
#[must_use]
pub fn sheet_rows(sheet: &DailyCollection) -> Vec<SheetRow> {
    if sheet.rows.is_empty() {
        return (0..DEFAULT_ROWS).map(SheetRow::blank).collect();
    }
    sheet
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| SheetRow::from_row(i, row))
        .collect()
}

#[derive(Template)]
#[template(path = "collection/index.html")]
pub struct CollectionTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub branches: Vec<String>,
    pub sheet: DailyCollection,
    pub rows: Vec<SheetRow>,
    pub grand_total: Decimal,
}

/// A blank row appended by the "Add row" button.
#[derive(Template)]
#[template(path = "collection/row.html")]
pub struct RowTemplate {
    pub row: SheetRow,
}

#[derive(Debug, Deserialize)]
pub struct RowQuery {
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub date: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dailycollection", get(index).post(save))
        .route("/dailycollection/row", get(row))
        .route("/dailycollection/export", get(export))
}

async fn sheet_template(
    state: &AppState,
    admin: &AdminSession,
    mut flash: Option<Notice>,
    sheet: DailyCollection,
) -> Result<CollectionTemplate> {
    let branches = loaded(
        state.client().authed(&admin.token).collection_branches().await,
        &mut flash,
    )?;
    let rows = sheet_rows(&sheet);
    Ok(CollectionTemplate {
        admin_user: AdminUserView::from(admin),
        current_path: SHEET_PATH,
        flash,
        branches,
        grand_total: sheet.grand_total,
        rows,
        sheet,
    })
}

#[instrument(skip_all)]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(flash): Flash,
) -> Result<Html<String>> {
    let sheet = DailyCollection {
        date: local_date(Utc::now()).format("%Y-%m-%d").to_string(),
        ..DailyCollection::default()
    };
    let template = sheet_template(&state, &admin, flash, sheet).await?;
    Ok(render(&template))
}

/// HTMX fragment for one more blank row.
#[instrument(skip_all)]
pub async fn row(RequireStaff(_): RequireStaff, Query(query): Query<RowQuery>) -> Html<String> {
    render(&RowTemplate {
        row: SheetRow::blank(query.index.min(MAX_ROWS - 1)),
    })
}

#[instrument(skip_all)]
pub async fn save(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let sheet = match DailyCollection::from_form_pairs(&pairs) {
        Ok(sheet) => sheet,
        Err(e) => {
            return Ok(flash_redirect(&session, Notice::error(e.to_string()), SHEET_PATH)
                .await?
                .into_response());
        }
    };

    let notice = match sheet.validate() {
        Ok(()) => match state
            .client()
            .authed(&admin.token)
            .save_collection(&sheet)
            .await
        {
            Ok(_) => {
                tracing::info!(branch = %sheet.branch, date = %sheet.date, "Collection saved");
                let notice = Notice::success("Saved successfully!");
                return Ok(flash_redirect(&session, notice, SHEET_PATH)
                    .await?
                    .into_response());
            }
            Err(e) => {
                let notice = failure_notice(e)?;
                Notice::error(format!("Error saving: {}", notice.message))
            }
        },
        Err(e) => Notice::error(e.to_string()),
    };

    let template = sheet_template(&state, &admin, Some(notice), sheet).await?;
    Ok(render(&template).into_response())
}

/// Keep a filename fragment to characters that are safe in a header.
fn file_part(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// Download the sheets saved for one branch and date.
#[instrument(skip(admin, state, session))]
pub async fn export(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let branch = query.branch.trim();
    let date = query.date.trim();
    if branch.is_empty() || date.is_empty() {
        let notice = Notice::info(CollectionError::MissingBranchOrDate.to_string());
        return Ok(flash_redirect(&session, notice, SHEET_PATH)
            .await?
            .into_response());
    }

    let sheets = match state
        .client()
        .authed(&admin.token)
        .collections_for(branch, date)
        .await
    {
        Ok(sheets) => sheets,
        Err(e) => {
            failure_notice(e)?;
            let notice = Notice::error("Failed to download past collection");
            return Ok(flash_redirect(&session, notice, SHEET_PATH)
                .await?
                .into_response());
        }
    };

    let filename = format!("collection-{}-{}.csv", file_part(branch), file_part(date));
    csv_response(&session, csv::daily_collections(&sheets), &filename, SHEET_PATH).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sheet_starts_with_blank_rows() {
        let rows = sheet_rows(&DailyCollection::default());
        assert_eq!(rows.len(), DEFAULT_ROWS);
        assert_eq!(rows[0], SheetRow::blank(0));
    }

    #[test]
    fn test_entered_rows_are_kept_for_rerender() {
        let pairs: Vec<(String, String)> = [
            ("branch", "Cubao"),
            ("item_0", "Shirt"),
            ("qty_0", "2"),
            ("amount_0", "75.50"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        let sheet = DailyCollection::from_form_pairs(&pairs).unwrap();
        let rows = sheet_rows(&sheet);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item, "Shirt");
        assert_eq!(rows[0].total, "151");
        assert_eq!(rows[0].cash, "");
        assert_eq!(sheet.validate(), Err(CollectionError::MissingBranchOrDate));
    }

    #[test]
    fn test_file_part_strips_header_characters() {
        assert_eq!(file_part("Cubao \"Main\""), "Cubao__Main_");
        assert_eq!(file_part("2024-07-01"), "2024-07-01");
    }
}
