//! Pre-submission validation and assembly of the wire payload.
//!
//! A draft collects what the candidate typed; the selections and scores come
//! from the form snapshot so the payload can only carry a school/major/
//! combination chain the cascade actually offered. Validation failures are
//! reported per field and never reach the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::SubjectCode;
use super::selection::FormSnapshot;

/// Wire format for the date of birth.
pub const DOB_FORMAT: &str = "%d/%m/%Y";
/// Gender options offered by the form.
pub const GENDERS: [&str; 3] = ["Nam", "Nữ", "Khác"];
/// Upper bound on supplementary documents.
pub const MAX_EXTRA_DOCUMENTS: usize = 5;

/// Supplementary document: a description plus base64-encoded files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraDocument {
    pub description: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// What the candidate fills in outside the cascading selectors. Documents
/// arrive already base64-encoded; the conversion itself happens at the UI
/// edge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub gender: String,
    /// DD/MM/YYYY, as the form's date picker emits it.
    #[serde(default)]
    pub dob: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub cccd_front: Option<String>,
    #[serde(default)]
    pub cccd_back: Option<String>,
    #[serde(default)]
    pub transcript: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub priority_proof: Option<String>,
    #[serde(default)]
    pub extra_documents: Vec<ExtraDocument>,
}

/// Validated application as the backend expects it: camelCase JSON with
/// base64 document strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physics_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chemistry_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biology_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geography_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub civic_education_score: Option<f64>,
    pub school: String,
    pub major: String,
    pub subject_group: String,
    pub total_score: f64,
    pub cccd_front: String,
    pub cccd_back: String,
    pub transcript: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_proof: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_documents: Vec<ExtraDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{0}' is required")]
    MissingField(&'static str),
    #[error("date of birth must use DD/MM/YYYY")]
    InvalidDob,
    #[error("gender must be one of Nam, Nữ, Khác")]
    InvalidGender,
    #[error("at most {MAX_EXTRA_DOCUMENTS} extra documents are allowed")]
    TooManyExtraDocuments,
    #[error("extra document {index} is missing its {what}")]
    IncompleteExtraDocument { index: usize, what: &'static str },
}

impl ApplicationDraft {
    /// Validate the draft against the current form state and assemble the
    /// payload. All failures are collected so the form can annotate every
    /// offending field at once.
    pub fn into_payload(
        self,
        form: &FormSnapshot,
    ) -> Result<ApplicationPayload, Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.fullname.trim().is_empty() {
            errors.push(ValidationError::MissingField("fullname"));
        }
        if self.gender.trim().is_empty() {
            errors.push(ValidationError::MissingField("gender"));
        } else if !GENDERS.contains(&self.gender.as_str()) {
            errors.push(ValidationError::InvalidGender);
        }
        if self.dob.trim().is_empty() {
            errors.push(ValidationError::MissingField("dob"));
        } else if NaiveDate::parse_from_str(self.dob.trim(), DOB_FORMAT).is_err() {
            errors.push(ValidationError::InvalidDob);
        }
        if self.id_number.trim().is_empty() {
            errors.push(ValidationError::MissingField("idNumber"));
        }

        if form.province.is_none() {
            errors.push(ValidationError::MissingField("province"));
        }
        if form.district.is_none() {
            errors.push(ValidationError::MissingField("district"));
        }
        if form.ward.is_none() {
            errors.push(ValidationError::MissingField("ward"));
        }
        if form.address_detail.trim().is_empty() {
            errors.push(ValidationError::MissingField("addressDetail"));
        }

        for subject in [
            SubjectCode::Math,
            SubjectCode::Literature,
            SubjectCode::English,
        ] {
            if form.scores.get(subject).is_none() {
                errors.push(ValidationError::MissingField(subject.payload_field()));
            }
        }

        if form.school.is_none() {
            errors.push(ValidationError::MissingField("school"));
        }
        if form.major.is_none() {
            errors.push(ValidationError::MissingField("major"));
        }
        if form.combination.is_none() {
            errors.push(ValidationError::MissingField("subjectGroup"));
        }

        if self.cccd_front.as_deref().unwrap_or("").is_empty() {
            errors.push(ValidationError::MissingField("cccdFront"));
        }
        if self.cccd_back.as_deref().unwrap_or("").is_empty() {
            errors.push(ValidationError::MissingField("cccdBack"));
        }
        if self.transcript.is_empty() {
            errors.push(ValidationError::MissingField("transcript"));
        }

        if self.extra_documents.len() > MAX_EXTRA_DOCUMENTS {
            errors.push(ValidationError::TooManyExtraDocuments);
        }
        for (index, document) in self.extra_documents.iter().enumerate() {
            if document.description.trim().is_empty() {
                errors.push(ValidationError::IncompleteExtraDocument {
                    index,
                    what: "description",
                });
            }
            if document.files.is_empty() {
                errors.push(ValidationError::IncompleteExtraDocument {
                    index,
                    what: "files",
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ApplicationPayload {
            fullname: self.fullname,
            gender: self.gender,
            dob: self.dob,
            id_number: self.id_number,
            province: form.province.clone().unwrap_or_default(),
            district: form.district.clone().unwrap_or_default(),
            ward: form.ward.clone().unwrap_or_default(),
            address_detail: form.address_detail.clone(),
            math_score: form.scores.math.unwrap_or(0.0),
            literature_score: form.scores.literature.unwrap_or(0.0),
            english_score: form.scores.english.unwrap_or(0.0),
            physics_score: form.scores.physics,
            chemistry_score: form.scores.chemistry,
            biology_score: form.scores.biology,
            history_score: form.scores.history,
            geography_score: form.scores.geography,
            civic_education_score: form.scores.civic_education,
            school: form.school.clone().unwrap_or_default(),
            major: form.major.clone().unwrap_or_default(),
            subject_group: form.combination.clone().unwrap_or_default(),
            total_score: form.total_score.unwrap_or(0.0),
            cccd_front: self.cccd_front.unwrap_or_default(),
            cccd_back: self.cccd_back.unwrap_or_default(),
            transcript: self.transcript,
            priority: self.priority,
            priority_proof: self.priority_proof,
            extra_documents: self.extra_documents,
        })
    }
}
