//! The signed-in admin's own profile and password.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use segunda_mana_core::session::AdminSession;
use segunda_mana_core::{AccountForm, LANGUAGES, NOTIFICATION_LEVELS, Notice, TIMEZONES};

use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireStaff};
use crate::models::session;
use crate::state::AppState;

use super::dashboard::AdminUserView;
use super::{SelectOption, failure_notice, flash_redirect, render};

const ACCOUNT_PATH: &str = "/account-settings";

#[derive(Template)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub admin_user: AdminUserView,
    pub current_path: &'static str,
    pub flash: Option<Notice>,
    pub form: AccountForm,
    pub languages: Vec<SelectOption>,
    pub timezones: Vec<SelectOption>,
    pub notification_levels: Vec<SelectOption>,
}

impl AccountTemplate {
    fn new(admin: &AdminSession, flash: Option<Notice>, form: AccountForm) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: ACCOUNT_PATH,
            flash,
            languages: SelectOption::plain(LANGUAGES, &form.language),
            timezones: SelectOption::plain(TIMEZONES, &form.timezone),
            notification_levels: SelectOption::plain(NOTIFICATION_LEVELS, &form.notifications),
            form,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/account-settings", get(index).post(update))
}

/// Profile form, fresh from the backend.
#[instrument(skip_all)]
pub async fn index(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    Flash(mut flash): Flash,
) -> Result<Html<String>> {
    let form = match state.client().authed(&admin.token).me().await {
        Ok(profile) => AccountForm::from(&profile),
        Err(e) => {
            flash.get_or_insert(failure_notice(e)?);
            AccountForm::from(&admin.user)
        }
    };
    Ok(render(&AccountTemplate::new(&admin, flash, form)))
}

/// Save the profile, then refresh the copy kept in the session so the
/// sidebar shows the new name.
#[instrument(skip_all)]
pub async fn update(
    RequireStaff(admin): RequireStaff,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AccountForm>,
) -> Result<Response> {
    let retry = |notice: Notice, form: AccountForm| {
        let form = AccountForm {
            current_password: String::new(),
            new_password: String::new(),
            confirm_password: String::new(),
            ..form
        };
        render(&AccountTemplate::new(&admin, Some(notice), form)).into_response()
    };

    let update = match form.clone().into_update() {
        Ok(update) => update,
        Err(e) => return Ok(retry(Notice::error(e.to_string()), form)),
    };

    let api = state.client().authed(&admin.token);
    if let Err(e) = api.update_account(&update).await {
        let notice = failure_notice(e)?;
        return Ok(retry(notice, form));
    }
    tracing::info!(password_changed = update.password.is_some(), "Account updated");

    let mut refreshed = admin.clone();
    match api.me().await {
        Ok(profile) => refreshed.user = profile,
        Err(e) => {
            failure_notice(e)?;
            refreshed.user.full_name = update.full_name;
            refreshed.user.email = update.email;
        }
    }
    session::store(&session, &refreshed).await?;

    let notice = Notice::success("Account updated successfully!");
    Ok(flash_redirect(&session, notice, ACCOUNT_PATH)
        .await?
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use segunda_mana_core::session::AuthToken;
    use segunda_mana_core::{AdminProfile, Role};

    use super::*;

    #[test]
    fn test_template_selects_saved_preferences() {
        let admin = AdminSession {
            token: AuthToken::new("t"),
            role: Role::SuperAdmin,
            user: AdminProfile {
                full_name: "Ana Reyes".to_string(),
                timezone: "UTC+0 (GMT)".to_string(),
                ..AdminProfile::default()
            },
        };
        let template = AccountTemplate::new(&admin, None, AccountForm::from(&admin.user));
        assert_eq!(template.form.full_name, "Ana Reyes");
        assert!(template.timezones[2].selected);
        assert!(template.languages.iter().all(|o| !o.selected));
        assert!(template.admin_user.is_super_admin);
    }
}
