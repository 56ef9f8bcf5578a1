//! Activity log. Superadmins only.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::{Html, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::display::{short_date, short_time};
use segunda_mana_core::listing::{Page, paginate, search};
use segunda_mana_core::{ActivityLog, Notice, csv};

use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireSuperAdmin};
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{ListQuery, csv_response, loaded, render};

const LIST_PATH: &str = "/activity";

#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub date: String,
    pub time: String,
    pub user: String,
    pub action: String,
    pub details: Vec<(String, String)>,
}

impl From<&ActivityLog> for ActivityRow {
    fn from(log: &ActivityLog) -> Self {
        let or_created = |formatted: &str, format: fn(DateTime<Utc>) -> String| {
            if formatted.is_empty() {
                log.created_at.map(format).unwrap_or_default()
            } else {
                formatted.to_string()
            }
        };
        Self {
            date: or_created(&log.formatted_date, short_date),
            time: or_created(&log.formatted_time, short_time),
            user: log.admin_name.clone(),
            action: log.action.clone(),
            details: log.detail_pairs(),
        }
    }
}

#[derive(Template)]
#[template(path = "activity/index.html")]
pub struct ActivityTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub page: Page<ActivityRow>,
    pub query: ListQuery,
    pub filter_query: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/activity", get(index))
        .route("/activity/export", get(export))
}

#[instrument(skip(admin, state, flash))]
pub async fn index(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Flash(mut flash): Flash,
    Query(query): Query<ListQuery>,
) -> Result<Html<String>> {
    let logs = loaded(
        state.client().authed(&admin.token).activity().await,
        &mut flash,
    )?;
    let page =
        paginate(search(logs, &query.q), query.page()).map(|log| ActivityRow::from(&log));

    Ok(render(&ActivityTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH,
        flash,
        page,
        filter_query: query.without_page(),
        query,
    }))
}

#[instrument(skip(admin, state, session))]
pub async fn export(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListQuery>,
) -> Result<Response> {
    let logs = state.client().authed(&admin.token).activity().await?;
    let logs = search(logs, &query.q);
    csv_response(&session, csv::activity(&logs), "activity-logs.csv", LIST_PATH).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_falls_back_to_created_at() {
        let log: ActivityLog = serde_json::from_str(
            r#"{"adminName":"Mila","action":"DELETE_ORDER",
                "createdAt":"2024-06-01T02:30:00Z",
                "details":{"params":{"id":"o1"}}}"#,
        )
        .unwrap();
        let row = ActivityRow::from(&log);
        assert_eq!(row.date, "06/01/2024");
        assert_eq!(row.time, "10:30 AM");
        assert_eq!(row.details, [("id".to_string(), "o1".to_string())]);
    }

    #[test]
    fn test_row_prefers_backend_formatting() {
        let log: ActivityLog = serde_json::from_str(
            r#"{"adminName":"Mila","action":"LOGIN",
                "formattedDate":"June 1, 2024","formattedTime":"9:00 AM"}"#,
        )
        .unwrap();
        let row = ActivityRow::from(&log);
        assert_eq!(row.date, "June 1, 2024");
        assert_eq!(row.time, "9:00 AM");
    }
}
