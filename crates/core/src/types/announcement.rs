//! Announcements shown on the storefront landing page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::AnnouncementId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(rename = "_id")]
    pub id: AnnouncementId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub label: String,
    /// Rich-text HTML authored in admin.
    #[serde(default)]
    pub body: String,
    /// Uploaded media URLs; only the first is shown.
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Announcement {
    #[must_use]
    pub fn cover(&self) -> Option<&str> {
        self.media.first().map(String::as_str)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Please fill in all required fields")]
pub struct MissingAnnouncementFields;

/// Text fields of the publish form; the optional media file travels separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementDraft {
    pub title: String,
    pub label: String,
    pub body: String,
}

impl AnnouncementDraft {
    /// Trim title and label and require all three fields.
    ///
    /// # Errors
    ///
    /// Returns [`MissingAnnouncementFields`] if any field is blank.
    pub fn validate(self) -> Result<Self, MissingAnnouncementFields> {
        let draft = Self {
            title: self.title.trim().to_owned(),
            label: self.label.trim().to_owned(),
            body: self.body,
        };
        if draft.title.is_empty() || draft.label.is_empty() || draft.body.trim().is_empty() {
            return Err(MissingAnnouncementFields);
        }
        Ok(draft)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let a: Announcement = serde_json::from_str(
            r#"{"_id":"a1","title":"Sale","label":"Promo","body":"<p>Hi</p>",
                "media":["/uploads/a.jpg"],"active":true}"#,
        )
        .unwrap();
        assert_eq!(a.cover(), Some("/uploads/a.jpg"));
        assert!(a.active);
    }

    #[test]
    fn test_draft_requires_all_fields() {
        let draft = AnnouncementDraft {
            title: " Sale ".to_owned(),
            label: "Promo".to_owned(),
            body: "   ".to_owned(),
        };
        assert_eq!(draft.validate(), Err(MissingAnnouncementFields));
    }
}
