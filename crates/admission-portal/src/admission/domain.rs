//! Typed reference-data entities for the admission hierarchy: schools own
//! majors, majors reference subject combinations, and combinations name the
//! exam subjects that count toward a candidate's total.

use serde::{Deserialize, Serialize};

/// The nine exam subjects an admission combination may draw on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectCode {
    Math,
    Literature,
    English,
    Physics,
    Chemistry,
    Biology,
    History,
    Geography,
    CivicEducation,
}

impl SubjectCode {
    pub const ALL: [SubjectCode; 9] = [
        SubjectCode::Math,
        SubjectCode::Literature,
        SubjectCode::English,
        SubjectCode::Physics,
        SubjectCode::Chemistry,
        SubjectCode::Biology,
        SubjectCode::History,
        SubjectCode::Geography,
        SubjectCode::CivicEducation,
    ];

    /// Backend identifier, e.g. `MATH101`.
    pub const fn backend_code(self) -> &'static str {
        match self {
            SubjectCode::Math => "MATH101",
            SubjectCode::Literature => "LIT102",
            SubjectCode::English => "ENG103",
            SubjectCode::Physics => "PHY104",
            SubjectCode::Chemistry => "CHE105",
            SubjectCode::Biology => "BIO106",
            SubjectCode::History => "HIS107",
            SubjectCode::Geography => "GEO108",
            SubjectCode::CivicEducation => "CIV109",
        }
    }

    /// Field name carried in the application payload, e.g. `mathScore`.
    pub const fn payload_field(self) -> &'static str {
        match self {
            SubjectCode::Math => "mathScore",
            SubjectCode::Literature => "literatureScore",
            SubjectCode::English => "englishScore",
            SubjectCode::Physics => "physicsScore",
            SubjectCode::Chemistry => "chemistryScore",
            SubjectCode::Biology => "biologyScore",
            SubjectCode::History => "historyScore",
            SubjectCode::Geography => "geographyScore",
            SubjectCode::CivicEducation => "civicEducationScore",
        }
    }

    pub fn from_backend_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|subject| subject.backend_code() == code)
    }
}

/// One exam subject as described by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub code: String,
    pub name: String,
    pub display_name: String,
}

/// Named set of exam subjects whose scores sum to the admission total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCombination {
    pub code: String,
    pub name: String,
    pub subjects: Vec<Subject>,
}

/// A major offered by a school, referencing its eligible combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Major {
    pub code: String,
    pub name: String,
    #[serde(alias = "subjectGroupIds", default)]
    pub subject_group_ids: Vec<String>,
}

/// School entry as returned by the candidate-facing listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolSummary {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub code: String,
    pub name: String,
}

/// Full school record with its majors, used by the admin reference-data
/// screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub majors: Vec<Major>,
}

/// Review status of a submitted application. The backend speaks the
/// Vietnamese display strings on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "Chờ duyệt")]
    Pending,
    #[serde(rename = "Đã duyệt")]
    Approved,
    #[serde(rename = "Từ chối")]
    Rejected,
}

impl ApplicationStatus {
    pub const fn code(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Chờ duyệt",
            ApplicationStatus::Approved => "Đã duyệt",
            ApplicationStatus::Rejected => "Từ chối",
        }
    }
}

/// Province level of the geographic hierarchy. Field aliases match the
/// offline address dataset shipped with the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Districts", default)]
    pub districts: Vec<District>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Wards", default)]
    pub wards: Vec<Ward>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ward {
    #[serde(alias = "Id")]
    pub id: String,
    #[serde(alias = "Name")]
    pub name: String,
}
