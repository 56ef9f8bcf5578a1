//! Admin accounts, staff and beneficiaries.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::{BeneficiaryId, StaffId};
use super::role::Role;
use super::status::{BeneficiaryStatus, StaffStatus, null_as_default};

/// The logged-in admin's own profile (`/auth/me`, and `user` in the login response).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StaffId>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub notifications: String,
}

impl AdminProfile {
    /// Name for greetings: full name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        [&self.full_name, &self.username, &self.email]
            .into_iter()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("Admin")
    }
}

pub const LANGUAGES: [&str; 3] = ["English", "Spanish", "French"];
pub const TIMEZONES: [&str; 3] = [
    "UTC-5 (Eastern Time)",
    "UTC-8 (Pacific Time)",
    "UTC+0 (GMT)",
];
pub const NOTIFICATION_LEVELS: [&str; 3] = ["All notifications", "Important only", "None"];

/// Body of `PUT /api/admin/auth/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub bio: String,
    pub language: String,
    pub timezone: String,
    pub notifications: String,
    #[serde(flatten)]
    pub password: Option<PasswordChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountFormError {
    #[error("Please enter your current password.")]
    MissingCurrentPassword,
    #[error("New password and confirmation do not match.")]
    PasswordMismatch,
}

/// Raw `/account-settings` form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub notifications: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl AccountForm {
    /// Build the update payload. Password fields are dropped when all three
    /// are empty.
    ///
    /// # Errors
    ///
    /// Returns [`AccountFormError`] when a password change is incomplete.
    pub fn into_update(self) -> Result<AccountUpdate, AccountFormError> {
        let wants_change = [
            &self.current_password,
            &self.new_password,
            &self.confirm_password,
        ]
        .iter()
        .any(|s| !s.is_empty());

        let password = if wants_change {
            if self.current_password.is_empty() {
                return Err(AccountFormError::MissingCurrentPassword);
            }
            if self.new_password != self.confirm_password {
                return Err(AccountFormError::PasswordMismatch);
            }
            Some(PasswordChange {
                current_password: self.current_password,
                new_password: self.new_password,
                confirm_password: self.confirm_password,
            })
        } else {
            None
        };

        Ok(AccountUpdate {
            full_name: self.full_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            bio: self.bio,
            language: self.language,
            timezone: self.timezone,
            notifications: self.notifications,
            password,
        })
    }
}

/// Prefill for `/account-settings`. Password fields start blank.
impl From<&AdminProfile> for AccountForm {
    fn from(profile: &AdminProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            language: profile.language.clone(),
            timezone: profile.timezone.clone(),
            notifications: profile.notifications.clone(),
            ..Self::default()
        }
    }
}

/// A staff account as listed on `/staff-management`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    #[serde(rename = "_id")]
    pub id: StaffId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StaffStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create/update payload for a staff account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffInput {
    pub username: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub full_name: String,
    pub status: StaffStatus,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StaffFormError {
    #[error("Please fill out the full name, username and email.")]
    MissingRequired,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("A password is required for new staff accounts.")]
    MissingPassword,
    #[error("Unknown staff status.")]
    InvalidStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StaffForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub status: String,
}

impl StaffForm {
    /// Validate the form. New accounts need a password; updates keep the old
    /// one when the field is blank.
    ///
    /// # Errors
    ///
    /// Returns [`StaffFormError`] for blank required fields, a malformed
    /// email, or an unknown status.
    pub fn into_input(self, creating: bool) -> Result<StaffInput, StaffFormError> {
        let username = self.username.trim().to_owned();
        let full_name = self.full_name.trim().to_owned();
        if username.is_empty() || full_name.is_empty() || self.email.trim().is_empty() {
            return Err(StaffFormError::MissingRequired);
        }
        let email = Email::parse(&self.email).map_err(|_| StaffFormError::InvalidEmail)?;

        let password = Some(self.password).filter(|p| !p.is_empty());
        if creating && password.is_none() {
            return Err(StaffFormError::MissingPassword);
        }

        let status = match self.status.trim() {
            "" => StaffStatus::default(),
            raw => raw.parse().map_err(|_| StaffFormError::InvalidStatus)?,
        };

        Ok(StaffInput {
            username,
            email,
            password,
            full_name,
            status,
        })
    }
}

/// Prefill for the edit form. The password stays blank.
impl From<&Staff> for StaffForm {
    fn from(staff: &Staff) -> Self {
        Self {
            username: staff.username.clone(),
            email: staff.email.clone(),
            password: String::new(),
            full_name: staff.full_name.clone(),
            status: staff.status.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    #[serde(rename = "_id")]
    pub id: BeneficiaryId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub emergency_name: String,
    #[serde(default)]
    pub emergency_number: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: BeneficiaryStatus,
    #[serde(default)]
    pub registration_date: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Beneficiary {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_owned()
    }

    /// `registrationDate` as sent, else the creation date.
    #[must_use]
    pub fn registered_on(&self) -> String {
        match (&self.registration_date, self.created_at) {
            (Some(date), _) if !date.is_empty() => date.clone(),
            (_, Some(created)) => created.format("%Y-%m-%d").to_string(),
            _ => String::new(),
        }
    }
}

/// Whole years between `dob` and `today`.
#[must_use]
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Create/update payload for a beneficiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryInput {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub age: u32,
    pub gender: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub emergency_name: String,
    pub emergency_number: String,
    pub relationship: String,
    pub status: BeneficiaryStatus,
    pub registration_date: String,
    pub notes: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BeneficiaryFormError {
    #[error("Please enter the beneficiary's first and last name.")]
    MissingName,
    #[error("Age must be a whole number.")]
    InvalidAge,
    #[error("Unknown beneficiary status.")]
    InvalidStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BeneficiaryForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub emergency_name: String,
    #[serde(default)]
    pub emergency_number: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub registration_date: String,
    #[serde(default)]
    pub notes: String,
}

impl BeneficiaryForm {
    /// Validate the form. A blank age is derived from `dob`; a blank status
    /// becomes `active`; a blank registration date becomes `today`.
    ///
    /// # Errors
    ///
    /// Returns [`BeneficiaryFormError`] for a missing name, a non-numeric age
    /// or an unknown status.
    pub fn into_input(self, today: NaiveDate) -> Result<BeneficiaryInput, BeneficiaryFormError> {
        let first_name = self.first_name.trim().to_owned();
        let last_name = self.last_name.trim().to_owned();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(BeneficiaryFormError::MissingName);
        }

        let dob = self.dob.trim().to_owned();
        let age = match self.age.trim() {
            "" => NaiveDate::parse_from_str(&dob, "%Y-%m-%d")
                .map(|born| age_on(born, today))
                .unwrap_or(0),
            raw => raw
                .parse::<u32>()
                .map_err(|_| BeneficiaryFormError::InvalidAge)?,
        };

        let status = match self.status.trim() {
            "" => BeneficiaryStatus::Active,
            raw => raw
                .parse()
                .map_err(|_| BeneficiaryFormError::InvalidStatus)?,
        };

        let registration_date = match self.registration_date.trim() {
            "" => today.format("%Y-%m-%d").to_string(),
            date => date.to_owned(),
        };

        Ok(BeneficiaryInput {
            first_name,
            last_name,
            dob,
            age,
            gender: self.gender.trim().to_owned(),
            contact_number: self.contact_number.trim().to_owned(),
            email: self.email.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            province: self.province.trim().to_owned(),
            postal_code: self.postal_code.trim().to_owned(),
            emergency_name: self.emergency_name.trim().to_owned(),
            emergency_number: self.emergency_number.trim().to_owned(),
            relationship: self.relationship.trim().to_owned(),
            status,
            registration_date,
            notes: self.notes.trim().to_owned(),
        })
    }
}

impl From<&Beneficiary> for BeneficiaryForm {
    fn from(b: &Beneficiary) -> Self {
        Self {
            first_name: b.first_name.clone(),
            last_name: b.last_name.clone(),
            dob: b.dob.clone().unwrap_or_default(),
            age: b.age.map(|a| a.to_string()).unwrap_or_default(),
            gender: b.gender.clone(),
            contact_number: b.contact_number.clone(),
            email: b.email.clone(),
            address: b.address.clone(),
            city: b.city.clone(),
            province: b.province.clone(),
            postal_code: b.postal_code.clone(),
            emergency_name: b.emergency_name.clone(),
            emergency_number: b.emergency_number.clone(),
            relationship: b.relationship.clone(),
            status: b.status.as_str().to_owned(),
            registration_date: b.registration_date.clone().unwrap_or_default(),
            notes: b.notes.clone(),
        }
    }
}
