//! Beneficiaries and staff accounts.

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use segunda_mana_core::{
    Beneficiary, BeneficiaryId, BeneficiaryInput, BeneficiaryStatus, Staff, StaffId, StaffInput,
    StaffStatus,
};

use super::{Authed, BackendError};

const BENEFICIARIES: &str = "api/admin/beneficiaries";
const STAFF: &str = "api/admin/staff";

impl Authed<'_> {
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn beneficiaries(&self) -> Result<Vec<Beneficiary>, BackendError> {
        self.get_list(BENEFICIARIES, "beneficiaries").await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the record.
    #[instrument(skip(self, input))]
    pub async fn add_beneficiary(
        &self,
        input: &BeneficiaryInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::POST, &format!("{BENEFICIARIES}/add"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input))]
    pub async fn update_beneficiary(
        &self,
        id: &BeneficiaryId,
        input: &BeneficiaryInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::PUT, &format!("{BENEFICIARIES}/{id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn set_beneficiary_status(
        &self,
        id: &BeneficiaryId,
        status: BeneficiaryStatus,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(
            Method::POST,
            &format!("{BENEFICIARIES}/{id}/status"),
            &json!({ "status": status.as_str() }),
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body is malformed.
    #[instrument(skip(self))]
    pub async fn staff(&self) -> Result<Vec<Staff>, BackendError> {
        self.get_list(STAFF, "staff").await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the account.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_staff(&self, input: &StaffInput) -> Result<Option<String>, BackendError> {
        self.send_json(Method::POST, STAFF, input).await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input))]
    pub async fn update_staff(
        &self,
        id: &StaffId,
        input: &StaffInput,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(Method::PUT, &format!("{STAFF}/{id}"), input)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn delete_staff(&self, id: &StaffId) -> Result<Option<String>, BackendError> {
        self.send_empty(Method::DELETE, &format!("{STAFF}/{id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn set_staff_status(
        &self,
        id: &StaffId,
        status: StaffStatus,
    ) -> Result<Option<String>, BackendError> {
        self.send_json(
            Method::PUT,
            &format!("{STAFF}/{id}/status"),
            &json!({ "status": status.as_str() }),
        )
        .await
    }
}
