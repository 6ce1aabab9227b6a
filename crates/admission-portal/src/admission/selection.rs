//! The application-form state machine: keeps dependent selections consistent
//! as upstream choices change and recomputes the derived total score.
//!
//! Two cascades are managed together. The geographic one
//! (province → district → ward) resolves against the offline address book;
//! the admission one (school → major → subject combination) fetches
//! dependent reference data through [`ReferenceDataProvider`]. Every
//! school/major change bumps a cascade generation so a late response from a
//! superseded fetch is discarded instead of repopulating the form.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::warn;

use super::address::AddressBook;
use super::domain::{District, Major, SubjectCode, SubjectCombination, Ward};
use super::scores::{self, ScoreError, ScoreSet};

/// Dependent reference data consulted as upstream selections change.
/// Implemented by the API client and by in-memory doubles in tests.
#[async_trait]
pub trait ReferenceDataProvider: Send + Sync {
    async fn majors_for_school(&self, school_code: &str) -> Result<Vec<Major>, FetchError>;
    async fn subject_combination(&self, code: &str) -> Result<SubjectCombination, FetchError>;
}

/// Failure of a dependent-data fetch. The form surfaces it to the caller for
/// a transient notification and leaves the downstream selector empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("reference data unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    /// The option is not currently offered by the selector — the code-level
    /// equivalent of a disabled or empty dropdown.
    #[error("'{value}' is not currently offered for {selector}")]
    NotOffered {
        selector: &'static str,
        value: String,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Score(#[from] ScoreError),
}

/// Read-only view of the form state handed to the rendering layer.
#[derive(Debug, Clone, Default)]
pub struct FormSnapshot {
    pub province: Option<String>,
    pub districts: Vec<District>,
    pub district: Option<String>,
    pub wards: Vec<Ward>,
    pub ward: Option<String>,
    pub address_detail: String,
    pub school: Option<String>,
    pub majors: Vec<Major>,
    pub major: Option<String>,
    pub combinations: Vec<SubjectCombination>,
    pub combination: Option<String>,
    pub scores: ScoreSet,
    pub total_score: Option<f64>,
}

#[derive(Default)]
struct FormState {
    province: Option<String>,
    districts: Vec<District>,
    district: Option<String>,
    wards: Vec<Ward>,
    ward: Option<String>,
    address_detail: String,
    school: Option<String>,
    majors: Vec<Major>,
    major: Option<String>,
    combinations: Vec<SubjectCombination>,
    combination: Option<String>,
    scores: ScoreSet,
    total: Option<f64>,
    // Bumped on every school/major change; fetch results are applied only if
    // the generation they were issued under is still current.
    cascade_generation: u64,
}

impl FormState {
    fn recompute_total(&mut self) {
        self.total = match &self.combination {
            Some(code) => self
                .combinations
                .iter()
                .find(|combination| &combination.code == code)
                .map(|combination| scores::total_score(combination, &self.scores)),
            None => None,
        };
    }
}

/// Cascading selection controller for one application form. Methods take
/// `&self`; the internal lock is never held across an await, so overlapping
/// fetches interleave the way suspended UI interactions do.
pub struct AdmissionForm<P> {
    provider: Arc<P>,
    addresses: AddressBook,
    state: Mutex<FormState>,
}

impl<P: ReferenceDataProvider> AdmissionForm<P> {
    pub fn new(provider: Arc<P>, addresses: AddressBook) -> Self {
        Self {
            provider,
            addresses,
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.lock();
        FormSnapshot {
            province: state.province.clone(),
            districts: state.districts.clone(),
            district: state.district.clone(),
            wards: state.wards.clone(),
            ward: state.ward.clone(),
            address_detail: state.address_detail.clone(),
            school: state.school.clone(),
            majors: state.majors.clone(),
            major: state.major.clone(),
            combinations: state.combinations.clone(),
            combination: state.combination.clone(),
            scores: state.scores,
            total_score: state.total,
        }
    }

    /// Choose a province. Districts repopulate from its children; district,
    /// ward, and the detail-address field are cleared.
    pub fn select_province(&self, id: Option<&str>) -> Result<(), SelectionError> {
        let mut state = self.lock();
        state.district = None;
        state.ward = None;
        state.wards.clear();
        state.address_detail.clear();
        match id {
            None => {
                state.province = None;
                state.districts.clear();
            }
            Some(id) => {
                let province =
                    self.addresses
                        .province(id)
                        .ok_or_else(|| SelectionError::NotOffered {
                            selector: "province",
                            value: id.to_string(),
                        })?;
                state.districts = province.districts.clone();
                state.province = Some(id.to_string());
            }
        }
        Ok(())
    }

    /// Choose a district among the current province's children. Wards
    /// repopulate; the ward selection is cleared.
    pub fn select_district(&self, id: Option<&str>) -> Result<(), SelectionError> {
        let mut state = self.lock();
        state.ward = None;
        match id {
            None => {
                state.district = None;
                state.wards.clear();
            }
            Some(id) => {
                let district = state
                    .districts
                    .iter()
                    .find(|district| district.id == id)
                    .ok_or_else(|| SelectionError::NotOffered {
                        selector: "district",
                        value: id.to_string(),
                    })?;
                state.wards = district.wards.clone();
                state.district = Some(id.to_string());
            }
        }
        Ok(())
    }

    pub fn select_ward(&self, id: Option<&str>) -> Result<(), SelectionError> {
        let mut state = self.lock();
        match id {
            None => state.ward = None,
            Some(id) => {
                if !state.wards.iter().any(|ward| ward.id == id) {
                    return Err(SelectionError::NotOffered {
                        selector: "ward",
                        value: id.to_string(),
                    });
                }
                state.ward = Some(id.to_string());
            }
        }
        Ok(())
    }

    pub fn set_address_detail(&self, detail: &str) {
        self.lock().address_detail = detail.to_string();
    }

    /// Choose (or clear) the school. Major and combination selections are
    /// cleared immediately and the total resets to unset; the major list is
    /// re-fetched for the new school code.
    pub async fn select_school(&self, code: Option<&str>) -> Result<(), SelectionError> {
        let generation = {
            let mut state = self.lock();
            state.cascade_generation += 1;
            state.school = code.map(str::to_string);
            state.majors.clear();
            state.major = None;
            state.combinations.clear();
            state.combination = None;
            state.total = None;
            state.cascade_generation
        };

        let Some(code) = code else {
            return Ok(());
        };

        match self.provider.majors_for_school(code).await {
            Ok(majors) => {
                let mut state = self.lock();
                if state.cascade_generation == generation {
                    state.majors = majors;
                }
                Ok(())
            }
            Err(err) => {
                let state = self.lock();
                if state.cascade_generation == generation {
                    warn!(school = code, error = %err, "failed to load majors");
                    Err(err.into())
                } else {
                    // A stale failure belongs to a superseded selection.
                    Ok(())
                }
            }
        }
    }

    /// Choose (or clear) the major. Combination details for every referenced
    /// subject-group id are fetched concurrently and applied only as a
    /// complete set.
    pub async fn select_major(&self, code: Option<&str>) -> Result<(), SelectionError> {
        let (generation, group_ids) = {
            let mut state = self.lock();
            state.cascade_generation += 1;
            state.combinations.clear();
            state.combination = None;
            state.total = None;
            let group_ids = match code {
                None => {
                    state.major = None;
                    Vec::new()
                }
                Some(code) => {
                    let major = state
                        .majors
                        .iter()
                        .find(|major| major.code == code)
                        .ok_or_else(|| SelectionError::NotOffered {
                            selector: "major",
                            value: code.to_string(),
                        })?;
                    let ids = major.subject_group_ids.clone();
                    state.major = Some(code.to_string());
                    ids
                }
            };
            (state.cascade_generation, group_ids)
        };

        if group_ids.is_empty() {
            return Ok(());
        }

        let fetches = group_ids
            .iter()
            .map(|id| self.provider.subject_combination(id));
        match try_join_all(fetches).await {
            Ok(combinations) => {
                let mut state = self.lock();
                if state.cascade_generation == generation {
                    state.combinations = combinations;
                }
                Ok(())
            }
            Err(err) => {
                let state = self.lock();
                if state.cascade_generation == generation {
                    warn!(major = ?code, error = %err, "failed to load subject combinations");
                    Err(err.into())
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Choose (or clear) the subject combination; the total recomputes or
    /// resets accordingly.
    pub fn select_combination(&self, code: Option<&str>) -> Result<(), SelectionError> {
        let mut state = self.lock();
        match code {
            None => state.combination = None,
            Some(code) => {
                if !state
                    .combinations
                    .iter()
                    .any(|combination| combination.code == code)
                {
                    return Err(SelectionError::NotOffered {
                        selector: "subject combination",
                        value: code.to_string(),
                    });
                }
                state.combination = Some(code.to_string());
            }
        }
        state.recompute_total();
        Ok(())
    }

    /// Edit one score field. While a combination is selected the total
    /// recomputes immediately.
    pub fn set_score(
        &self,
        subject: SubjectCode,
        value: Option<f64>,
    ) -> Result<(), SelectionError> {
        let mut state = self.lock();
        state.scores.set(subject, value)?;
        state.recompute_total();
        Ok(())
    }

    /// Edit one score field from raw text input; empty or unparseable input
    /// clears the field.
    pub fn set_score_raw(&self, subject: SubjectCode, raw: &str) -> Result<(), SelectionError> {
        let mut state = self.lock();
        state.scores.set_raw(subject, raw)?;
        state.recompute_total();
        Ok(())
    }

    /// Reset the whole form, as after a successful submission.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.cascade_generation + 1;
        *state = FormState {
            cascade_generation: generation,
            ..FormState::default()
        };
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FormState> {
        self.state.lock().expect("form state mutex poisoned")
    }
}
