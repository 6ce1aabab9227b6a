//! Core logic for the university admissions portal front end.
//!
//! Candidates authenticate, fill the cascading application form, and submit
//! to an opaque REST backend; administrators review applications and manage
//! the reference data the form depends on. The crate owns the pieces with
//! real invariants — the session store, the role-gated access decision, the
//! cascading selection controller with its stale-response discipline, and
//! the debounced list queries — and exposes typed domain services over one
//! configured HTTP client.

pub mod admission;
pub mod api;
pub mod config;
pub mod gate;
pub mod query;
pub mod session;
pub mod telemetry;

pub use admission::{
    AdmissionForm, ApplicationDraft, ApplicationPayload, ApplicationStatus, FetchError,
    FormSnapshot, ReferenceDataProvider, ScoreSet, SelectionError, SubjectCode,
};
pub use api::{ApiClient, ApiError};
pub use gate::{AccessGate, RouteDecision};
pub use session::{AccessToken, Role, Session, SessionStore, UserInfo};
