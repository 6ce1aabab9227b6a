//! Application submission, listings, and the admin review action.

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ApiClient, ApiError};
use crate::admission::domain::ApplicationStatus;
use crate::admission::draft::{ApplicationPayload, ExtraDocument};
use crate::session::SessionStorage;

/// Filters for the candidate's own listing. Unset fields stay off the query
/// string entirely.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl Default for ApplicationListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            status: None,
            date_from: None,
            date_to: None,
        }
    }
}

/// Admin listing adds reference-data filters on top of the candidate ones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminApplicationQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_group: Option<String>,
}

impl Default for AdminApplicationQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            status: None,
            date_from: None,
            date_to: None,
            school_code: None,
            major_code: None,
            subject_group: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: u64,
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListItem {
    pub application_code: String,
    pub fullname: String,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub major_name: Option<String>,
    pub status: String,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedApplications {
    pub pagination: Pagination,
    pub applications: Vec<ApplicationListItem>,
}

/// Status as the detail endpoints expose it: stable code plus display name.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetail {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    pub application_code: String,
    pub status: StatusDetail,
    pub fullname: String,
    pub gender: String,
    pub dob: String,
    pub id_number: String,
    pub province: String,
    pub district: String,
    pub ward: String,
    pub address_detail: String,
    pub math_score: f64,
    pub literature_score: f64,
    pub english_score: f64,
    #[serde(default)]
    pub physics_score: Option<f64>,
    #[serde(default)]
    pub chemistry_score: Option<f64>,
    #[serde(default)]
    pub biology_score: Option<f64>,
    #[serde(default)]
    pub history_score: Option<f64>,
    #[serde(default)]
    pub geography_score: Option<f64>,
    #[serde(default)]
    pub civic_education_score: Option<f64>,
    pub school: String,
    pub major: String,
    pub subject_group: String,
    pub total_score: f64,
    pub cccd_front: String,
    pub cccd_back: String,
    #[serde(default)]
    pub transcript: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub priority_proof: Option<String>,
    #[serde(default)]
    pub extra_documents: Vec<ExtraDocument>,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub major_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub application_code: Option<String>,
}

/// Admin review outcome. The status endpoint only accepts the two terminal
/// states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub const fn status(self) -> ApplicationStatus {
        match self {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        }
    }
}

impl<S: SessionStorage> ApiClient<S> {
    /// Submit a validated application. The form state is preserved by the
    /// caller on failure so the candidate can retry.
    pub async fn submit_application(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<SubmitResponse, ApiError> {
        let builder = self
            .request(Method::POST, "api/v1/application/applications")
            .json(payload);
        self.execute(builder).await
    }

    pub async fn my_applications(
        &self,
        query: &ApplicationListQuery,
    ) -> Result<PaginatedApplications, ApiError> {
        let builder = self
            .request(Method::GET, "api/v1/application/applications")
            .query(query);
        self.execute(builder).await
    }

    pub async fn my_application_detail(&self, code: &str) -> Result<ApplicationDetail, ApiError> {
        let builder = self.request(
            Method::GET,
            &format!("api/v1/application/applications/{code}"),
        );
        self.execute(builder).await
    }

    pub async fn admin_applications(
        &self,
        query: &AdminApplicationQuery,
    ) -> Result<PaginatedApplications, ApiError> {
        let builder = self.request(Method::GET, "api/v2/application").query(query);
        self.execute(builder).await
    }

    pub async fn admin_application_detail(
        &self,
        code: &str,
    ) -> Result<ApplicationDetail, ApiError> {
        let builder = self.request(Method::GET, &format!("api/v2/application/{code}"));
        self.execute(builder).await
    }

    /// Approve or reject an application; the backend expects the Vietnamese
    /// display string.
    pub async fn update_application_status(
        &self,
        code: &str,
        decision: ReviewDecision,
    ) -> Result<serde_json::Value, ApiError> {
        let builder = self
            .request(Method::PATCH, &format!("api/v2/application/{code}/status"))
            .json(&json!({ "status": decision.status().display_name() }));
        self.execute(builder).await
    }
}
