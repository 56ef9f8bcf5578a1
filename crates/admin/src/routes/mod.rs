//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /login                         - Login page (redirects when logged in)
//! POST /login                         - Log in with email and password
//! POST /logout                        - Log out
//!
//! # Dashboard
//! GET  /dashboard                     - Counters and recent activity
//! GET  /dashboard/live                - HTMX fragment polled every 30s
//!
//! # Catalog
//! GET  /admin-product                 - Product list (q, archive, page)
//! GET  /admin-product/export          - Product CSV
//! GET  /admin-product/{id}/edit       - Edit form
//! POST /admin-product/{id}/edit       - Save product
//! POST /admin-product/{id}/archive    - Archive or restore
//! GET  /add-product, POST             - New product
//! GET  /inventory                     - Inventory list (q, archive, page)
//! GET  /inventory/export              - Inventory CSV
//! GET  /inventory/{id}/edit, POST     - Edit inventory item
//! POST /inventory/{id}/archive        - Archive or restore
//! GET  /add-inventory, POST           - New inventory item
//!
//! # Orders
//! GET  /orders                        - Order list (q, status, page)
//! GET  /orders/export                 - Order CSV
//! POST /orders/{id}/status            - Change fulfilment status
//! POST /orders/{id}/payment           - Change payment status
//! POST /orders/{id}/delete            - Delete order
//! GET  /add-order, POST               - Manual order
//!
//! # People
//! GET  /beneficiary                   - Beneficiary list
//! GET  /beneficiary/export            - Beneficiary CSV
//! GET  /beneficiary/{id}/edit, POST   - Edit beneficiary
//! POST /beneficiary/{id}/status       - Toggle active / on hold
//! GET  /add-beneficiary, POST         - New beneficiary
//! GET  /staff-management, POST        - Staff list and create (superadmin)
//! GET  /staff-management/{id}/edit, POST - Edit staff
//! POST /staff-management/{id}/status  - Toggle active / inactive
//! POST /staff-management/{id}/delete  - Delete staff
//!
//! # Content
//! GET  /announcement, POST            - List and publish (multipart)
//! POST /announcement/{id}/status      - Show or hide
//! POST /announcement/{id}/delete      - Delete
//! GET  /activity                      - Activity log (superadmin)
//! GET  /activity/export               - Activity CSV
//! GET  /dailycollection, POST         - Collection sheet
//! GET  /dailycollection/row           - HTMX fragment: one blank row
//! GET  /dailycollection/export        - Past sheet CSV (branch, date)
//! GET  /account-settings, POST        - Own profile and password
//! ```

pub mod account;
pub mod activity;
pub mod announcements;
pub mod auth;
pub mod beneficiaries;
pub mod catalog;
pub mod collection;
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod staff;

use askama::Template;
use axum::{
    Router,
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;

use segunda_mana_core::Notice;
use segunda_mana_core::csv::ExportError;

use crate::client::BackendError;
use crate::error::Result;
use crate::models::session;
use crate::state::AppState;

/// Create all routes for the admin panel.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(inventory::router())
        .merge(orders::router())
        .merge(beneficiaries::router())
        .merge(staff::router())
        .merge(announcements::router())
        .merge(activity::router())
        .merge(collection::router())
        .merge(account::router())
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Query string shared by the list pages. Blank means "no filter".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub page: String,
    /// `all`, `active` or `archived` on catalog lists.
    #[serde(default)]
    pub archive: String,
    /// Order status slug on the order list.
    #[serde(default)]
    pub status: String,
}

impl ListQuery {
    /// Requested page; anything unparseable is page 1.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page.trim().parse().unwrap_or(1)
    }

    /// The query string minus `page`, for pagination links.
    #[must_use]
    pub fn without_page(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("q", &self.q),
            ("archive", &self.archive),
            ("status", &self.status),
        ] {
            if !value.trim().is_empty() {
                serializer.append_pair(key, value.trim());
            }
        }
        serializer.finish()
    }
}

/// Render a template, logging failures instead of propagating them.
pub fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Queue a notice and send the browser elsewhere.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn flash_redirect(session: &Session, notice: Notice, to: &str) -> Result<Redirect> {
    session::flash(session, notice).await?;
    Ok(Redirect::to(to))
}

/// Turn a failed backend call into an error notice.
///
/// A rejected token is not a notice: it propagates so the login ends.
///
/// # Errors
///
/// Returns the error itself when the backend answered 401.
pub fn failure_notice(err: BackendError) -> Result<Notice> {
    if err.is_unauthorized() {
        return Err(err.into());
    }
    tracing::warn!("Backend call failed: {err}");
    Ok(Notice::error(err.user_message()))
}

/// The notice for a finished mutation: the backend's own message when it
/// sent one, otherwise `success`.
///
/// # Errors
///
/// Returns the error itself when the backend answered 401.
pub fn outcome(
    result: std::result::Result<Option<String>, BackendError>,
    success: &str,
) -> Result<Notice> {
    match result {
        Ok(message) => Ok(Notice::success(
            message.unwrap_or_else(|| success.to_string()),
        )),
        Err(e) => failure_notice(e),
    }
}

/// Unwrap a fetched list for display. Failures other than an expired login
/// render as an empty list with an error banner.
///
/// # Errors
///
/// Returns the error itself when the backend answered 401.
pub fn loaded<T>(
    result: std::result::Result<Vec<T>, BackendError>,
    flash: &mut Option<Notice>,
) -> Result<Vec<T>> {
    match result {
        Ok(items) => Ok(items),
        Err(e) => {
            let notice = failure_notice(e)?;
            flash.get_or_insert(notice);
            Ok(Vec::new())
        }
    }
}

/// A CSV attachment, or a notice and a redirect back when there is nothing
/// to export.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn csv_response(
    session: &Session,
    document: std::result::Result<String, ExportError>,
    filename: &str,
    back: &str,
) -> Result<Response> {
    match document {
        Ok(body) => Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            body,
        )
            .into_response()),
        Err(e) => Ok(flash_redirect(session, Notice::info(e.to_string()), back)
            .await?
            .into_response()),
    }
}

/// One `<option>` in a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    /// Options whose value and label are the same string.
    pub fn plain<'a>(values: impl IntoIterator<Item = &'a str>, current: &str) -> Vec<Self> {
        values
            .into_iter()
            .map(|v| Self {
                value: v.to_string(),
                label: v.to_string(),
                selected: v == current.trim(),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_to_one() {
        let query = ListQuery::default();
        assert_eq!(query.page(), 1);

        let query = ListQuery {
            page: "abc".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(query.page(), 1);

        let query = ListQuery {
            page: " 3 ".to_string(),
            ..ListQuery::default()
        };
        assert_eq!(query.page(), 3);
    }

    #[test]
    fn test_without_page_keeps_filters() {
        let query = ListQuery {
            q: "rain boots".to_string(),
            page: "2".to_string(),
            archive: "archived".to_string(),
            status: String::new(),
        };
        assert_eq!(query.without_page(), "q=rain+boots&archive=archived");
    }

    #[test]
    fn test_failure_notice_keeps_backend_message() {
        let notice = failure_notice(BackendError::Api {
            status: 400,
            message: "Quantity exceeds stock".to_string(),
        })
        .unwrap();
        assert_eq!(notice.message, "Quantity exceeds stock");

        let err = failure_notice(BackendError::Unauthorized("expired".to_string())).unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_outcome_prefers_backend_message() {
        let notice = outcome(Ok(Some("Order updated".to_string())), "Saved").unwrap();
        assert_eq!(notice.message, "Order updated");
        let notice = outcome(Ok(None), "Saved").unwrap();
        assert_eq!(notice.message, "Saved");
    }

    #[test]
    fn test_loaded_turns_failures_into_a_banner() {
        let mut flash = None;
        let items: Vec<u8> = loaded(
            Err(BackendError::Api {
                status: 500,
                message: "down".to_string(),
            }),
            &mut flash,
        )
        .unwrap();
        assert!(items.is_empty());
        assert_eq!(flash.unwrap().message, "down");
    }

    #[test]
    fn test_select_option_marks_current() {
        let options = SelectOption::plain(["S", "M"], "M");
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[tokio::test]
    async fn test_csv_response_headers() {
        let session = Session::new(
            None,
            std::sync::Arc::new(tower_sessions::MemoryStore::default()),
            None,
        );
        let response = csv_response(&session, Ok("\"a\"".to_string()), "orders.csv", "/orders")
            .await
            .unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"orders.csv\""
        );

        let response = csv_response(&session, Err(ExportError::Empty("order")), "o.csv", "/orders")
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::SEE_OTHER);
        assert_eq!(
            session::take_flash(&session).await.unwrap().message,
            "No order data to export."
        );
    }
}
