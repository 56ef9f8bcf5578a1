//! Announcements, the activity log and daily collection sheets.

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tracing::instrument;

use segunda_mana_core::api::extract_list;
use segunda_mana_core::{
    ActivityLog, Announcement, AnnouncementDraft, AnnouncementId, DailyCollection,
};

use super::{Authed, BackendError, decode, success_message};

const ANNOUNCEMENTS: &str = "api/admin/announcements";
const COLLECTION: &str = "api/admin/daily-collection";

/// The optional media file attached to a new announcement.
#[derive(Debug, Clone)]
pub struct AnnouncementUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Authed<'_> {
    /// Every announcement, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn announcements(&self) -> Result<Vec<Announcement>, BackendError> {
        self.get_list(ANNOUNCEMENTS, "announcements").await
    }

    /// Publish an announcement as multipart: title, label, HTML body and at
    /// most one media file.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the upload.
    #[instrument(skip(self, draft, media), fields(title = %draft.title))]
    pub async fn add_announcement(
        &self,
        draft: AnnouncementDraft,
        media: Option<AnnouncementUpload>,
    ) -> Result<Option<String>, BackendError> {
        let mut form = Form::new()
            .text("title", draft.title)
            .text("label", draft.label)
            .text("body", draft.body);
        if let Some(media) = media {
            let part = Part::bytes(media.bytes)
                .file_name(media.file_name)
                .mime_str(&media.content_type)?;
            form = form.part("media", part);
        }

        let request = self
            .request(Method::POST, &format!("{ANNOUNCEMENTS}/add"))?
            .multipart(form);
        let response = Self::send(request).await?;
        Ok(success_message(response).await)
    }

    /// The backend deletes announcements with a bare POST to the item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_announcement(
        &self,
        id: &AnnouncementId,
    ) -> Result<Option<String>, BackendError> {
        self.send_empty(Method::POST, &format!("{ANNOUNCEMENTS}/{id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn set_announcement_active(
        &self,
        id: &AnnouncementId,
        active: bool,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(
            Method::POST,
            &format!("{ANNOUNCEMENTS}/{id}/status"),
            &json!({ "active": active }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn activity(&self) -> Result<Vec<ActivityLog>, BackendError> {
        self.get_list("api/admin/activity", "logs").await
    }

    /// Branch names that have saved sheets.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn collection_branches(&self) -> Result<Vec<String>, BackendError> {
        self.get_list(COLLECTION, "branches").await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the sheet.
    #[instrument(skip(self, sheet), fields(branch = %sheet.branch, date = %sheet.date))]
    pub async fn save_collection(
        &self,
        sheet: &DailyCollection,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::POST, COLLECTION, sheet).await
    }

    /// Sheets saved for one branch on one date.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn collections_for(
        &self,
        branch: &str,
        date: &str,
    ) -> Result<Vec<DailyCollection>, BackendError> {
        let mut url = self.client.url(COLLECTION)?;
        url.query_pairs_mut()
            .append_pair("branch", branch)
            .append_pair("date", date);
        let response = Self::send(self.request_url(Method::GET, url)).await?;
        let body: Value = decode(response).await?;
        Ok(extract_list(body, "records")?)
    }
}
