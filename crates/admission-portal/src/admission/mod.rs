//! The admission form core: typed reference data, the cascading selection
//! controller, score aggregation, and pre-submission validation.

pub mod address;
pub mod domain;
pub mod draft;
pub mod scores;
pub mod selection;

pub use address::{AddressBook, AddressError};
pub use domain::{
    ApplicationStatus, District, Major, Province, School, SchoolSummary, Subject, SubjectCode,
    SubjectCombination, Ward,
};
pub use draft::{
    ApplicationDraft, ApplicationPayload, ExtraDocument, ValidationError, MAX_EXTRA_DOCUMENTS,
};
pub use scores::{display_total, total_score, ScoreError, ScoreSet, SCORE_MAX, SCORE_MIN};
pub use selection::{
    AdmissionForm, FetchError, FormSnapshot, ReferenceDataProvider, SelectionError,
};
