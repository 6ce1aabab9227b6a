//! Reference-data endpoints: schools, majors, and subject combinations.
//! The candidate form reads through the v1 endpoints; the admin screens
//! manage the same hierarchy through v2.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::admission::domain::{Major, School, SchoolSummary, SubjectCombination};
use crate::admission::selection::{FetchError, ReferenceDataProvider};
use crate::session::SessionStorage;

/// Admin payload for creating or replacing a school. The v2 endpoints speak
/// camelCase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolPayload {
    pub code: String,
    pub name: String,
    pub majors: Vec<MajorPayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MajorPayload {
    pub code: String,
    pub name: String,
    pub subject_group_ids: Vec<String>,
}

/// Code/name pair from the full combination listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectCombinationSummary {
    pub code: String,
    pub name: String,
}

impl<S: SessionStorage> ApiClient<S> {
    pub async fn list_schools(&self) -> Result<Vec<SchoolSummary>, ApiError> {
        let builder = self.request(Method::GET, "api/v1/schools");
        self.execute(builder).await
    }

    pub async fn majors_for_school(&self, school_code: &str) -> Result<Vec<Major>, ApiError> {
        let builder = self.request(
            Method::GET,
            &format!("api/v1/schools/{school_code}/majors"),
        );
        self.execute(builder).await
    }

    pub async fn subject_combination(&self, code: &str) -> Result<SubjectCombination, ApiError> {
        let builder = self.request(Method::GET, &format!("api/v1/subject-combinations/{code}"));
        self.execute(builder).await
    }

    /// Admin listing with optional search over the full hierarchy.
    pub async fn admin_schools(&self, search: Option<&str>) -> Result<Vec<School>, ApiError> {
        let mut builder = self.request(Method::GET, "api/v2/schools");
        if let Some(search) = search {
            builder = builder.query(&[("search", search)]);
        }
        self.execute(builder).await
    }

    pub async fn create_school(&self, school: &SchoolPayload) -> Result<School, ApiError> {
        let builder = self.request(Method::POST, "api/v2/schools/").json(school);
        self.execute(builder).await
    }

    pub async fn update_school(
        &self,
        school_code: &str,
        school: &SchoolPayload,
    ) -> Result<School, ApiError> {
        let builder = self
            .request(Method::PUT, &format!("api/v2/schools/{school_code}"))
            .json(school);
        self.execute(builder).await
    }

    pub async fn delete_school(&self, school_code: &str) -> Result<serde_json::Value, ApiError> {
        let builder = self.request(Method::DELETE, &format!("api/v2/schools/{school_code}"));
        self.execute(builder).await
    }

    pub async fn list_subject_combinations(
        &self,
    ) -> Result<Vec<SubjectCombinationSummary>, ApiError> {
        let builder = self.request(Method::GET, "api/v2/schools/subject-combinations");
        self.execute(builder).await
    }
}

/// The admission form's dependent data comes straight from the v1 endpoints.
#[async_trait]
impl<S: SessionStorage> ReferenceDataProvider for ApiClient<S> {
    async fn majors_for_school(&self, school_code: &str) -> Result<Vec<Major>, FetchError> {
        ApiClient::majors_for_school(self, school_code)
            .await
            .map_err(|err| FetchError::Unavailable(err.to_string()))
    }

    async fn subject_combination(&self, code: &str) -> Result<SubjectCombination, FetchError> {
        ApiClient::subject_combination(self, code)
            .await
            .map_err(|err| FetchError::Unavailable(err.to_string()))
    }
}
