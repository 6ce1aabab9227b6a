//! Integration scenarios for the cascading application form.
//!
//! Scenarios drive the form through its public surface only: selections go
//! in, snapshots come out, and dependent reference data is served by an
//! in-memory provider with controllable latency and failures.

mod common {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use admission_portal::admission::domain::{Major, Subject, SubjectCombination};
    use admission_portal::admission::AddressBook;
    use admission_portal::admission::{AdmissionForm, FetchError, ReferenceDataProvider};

    /// Reference-data double with per-key latency, failure switches, and a
    /// call log.
    #[derive(Default)]
    pub(super) struct StubProvider {
        majors: Mutex<HashMap<String, Vec<Major>>>,
        combinations: Mutex<HashMap<String, SubjectCombination>>,
        school_delays: Mutex<HashMap<String, Duration>>,
        combination_delays: Mutex<HashMap<String, Duration>>,
        failing_schools: Mutex<HashSet<String>>,
        failing_combinations: Mutex<HashSet<String>>,
        major_requests: Mutex<Vec<String>>,
    }

    impl StubProvider {
        pub(super) fn with_school(&self, code: &str, majors: Vec<Major>) -> &Self {
            self.majors
                .lock()
                .expect("lock")
                .insert(code.to_string(), majors);
            self
        }

        pub(super) fn with_combination(&self, combination: SubjectCombination) -> &Self {
            self.combinations
                .lock()
                .expect("lock")
                .insert(combination.code.clone(), combination);
            self
        }

        pub(super) fn delay_school(&self, code: &str, delay: Duration) -> &Self {
            self.school_delays
                .lock()
                .expect("lock")
                .insert(code.to_string(), delay);
            self
        }

        pub(super) fn delay_combination(&self, code: &str, delay: Duration) -> &Self {
            self.combination_delays
                .lock()
                .expect("lock")
                .insert(code.to_string(), delay);
            self
        }

        pub(super) fn fail_school(&self, code: &str) -> &Self {
            self.failing_schools
                .lock()
                .expect("lock")
                .insert(code.to_string());
            self
        }

        pub(super) fn fail_combination(&self, code: &str) -> &Self {
            self.failing_combinations
                .lock()
                .expect("lock")
                .insert(code.to_string());
            self
        }

        pub(super) fn recover_school(&self, code: &str) {
            self.failing_schools.lock().expect("lock").remove(code);
        }

        pub(super) fn major_requests(&self) -> Vec<String> {
            self.major_requests.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl ReferenceDataProvider for StubProvider {
        async fn majors_for_school(&self, school_code: &str) -> Result<Vec<Major>, FetchError> {
            self.major_requests
                .lock()
                .expect("lock")
                .push(school_code.to_string());
            let delay = self
                .school_delays
                .lock()
                .expect("lock")
                .get(school_code)
                .copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self
                .failing_schools
                .lock()
                .expect("lock")
                .contains(school_code)
            {
                return Err(FetchError::Unavailable(format!(
                    "majors for {school_code} unavailable"
                )));
            }
            self.majors
                .lock()
                .expect("lock")
                .get(school_code)
                .cloned()
                .ok_or_else(|| FetchError::Unavailable(format!("unknown school {school_code}")))
        }

        async fn subject_combination(&self, code: &str) -> Result<SubjectCombination, FetchError> {
            let delay = self
                .combination_delays
                .lock()
                .expect("lock")
                .get(code)
                .copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing_combinations.lock().expect("lock").contains(code) {
                return Err(FetchError::Unavailable(format!(
                    "combination {code} unavailable"
                )));
            }
            self.combinations
                .lock()
                .expect("lock")
                .get(code)
                .cloned()
                .ok_or_else(|| FetchError::Unavailable(format!("unknown combination {code}")))
        }
    }

    pub(super) fn major(code: &str, group_ids: &[&str]) -> Major {
        Major {
            code: code.to_string(),
            name: format!("Ngành {code}"),
            subject_group_ids: group_ids.iter().map(|id| id.to_string()).collect(),
        }
    }

    pub(super) fn combination(code: &str, subject_codes: &[&str]) -> SubjectCombination {
        SubjectCombination {
            code: code.to_string(),
            name: format!("Tổ hợp {code}"),
            subjects: subject_codes
                .iter()
                .map(|subject| Subject {
                    code: (*subject).to_string(),
                    name: (*subject).to_string(),
                    display_name: (*subject).to_string(),
                })
                .collect(),
        }
    }

    pub(super) fn address_book() -> AddressBook {
        AddressBook::from_json_str(
            r#"[
                {"Id":"01","Name":"Hà Nội","Districts":[
                    {"Id":"001","Name":"Ba Đình","Wards":[
                        {"Id":"00001","Name":"Phúc Xá"},
                        {"Id":"00004","Name":"Trúc Bạch"}
                    ]},
                    {"Id":"002","Name":"Hoàn Kiếm","Wards":[
                        {"Id":"00037","Name":"Hàng Bạc"}
                    ]}
                ]},
                {"Id":"79","Name":"Hồ Chí Minh","Districts":[
                    {"Id":"760","Name":"Quận 1","Wards":[
                        {"Id":"26734","Name":"Bến Nghé"}
                    ]}
                ]}
            ]"#,
        )
        .expect("address dataset parses")
    }

    pub(super) fn provider() -> Arc<StubProvider> {
        let provider = Arc::new(StubProvider::default());
        provider
            .with_school(
                "BKA",
                vec![major("CNTT", &["A00", "A01"]), major("DTVT", &["A00"])],
            )
            .with_school("NEU", vec![major("QTKD", &["D01"])])
            .with_combination(combination("A00", &["MATH101", "PHY104", "CHE105"]))
            .with_combination(combination("A01", &["MATH101", "PHY104", "ENG103"]))
            .with_combination(combination("D01", &["MATH101", "LIT102", "ENG103"]));
        provider
    }

    pub(super) fn form() -> AdmissionForm<StubProvider> {
        AdmissionForm::new(provider(), address_book())
    }

    pub(super) fn form_with(provider: Arc<StubProvider>) -> AdmissionForm<StubProvider> {
        AdmissionForm::new(provider, address_book())
    }
}

mod address_cascade {
    use super::common::*;
    use admission_portal::SelectionError;

    #[test]
    fn district_options_are_exactly_the_provinces_children() {
        let form = form();
        form.select_province(Some("01")).expect("province offered");
        let snapshot = form.snapshot();
        let ids: Vec<&str> = snapshot
            .districts
            .iter()
            .map(|district| district.id.as_str())
            .collect();
        assert_eq!(ids, ["001", "002"]);
    }

    #[test]
    fn foreign_district_is_not_selectable() {
        let form = form();
        form.select_province(Some("01")).expect("province offered");
        // District 760 belongs to province 79, not 01.
        let err = form.select_district(Some("760")).expect_err("not offered");
        assert!(matches!(err, SelectionError::NotOffered { .. }));
        assert_eq!(form.snapshot().district, None);
    }

    #[test]
    fn changing_province_clears_district_ward_and_detail() {
        let form = form();
        form.select_province(Some("01")).expect("province");
        form.select_district(Some("001")).expect("district");
        form.select_ward(Some("00001")).expect("ward");
        form.set_address_detail("Số 10, ngõ 20");

        form.select_province(Some("79")).expect("new province");
        let snapshot = form.snapshot();
        assert_eq!(snapshot.province.as_deref(), Some("79"));
        assert_eq!(snapshot.district, None);
        assert_eq!(snapshot.ward, None);
        assert!(snapshot.wards.is_empty());
        assert!(snapshot.address_detail.is_empty());
        assert_eq!(snapshot.districts.len(), 1);
    }

    #[test]
    fn changing_district_clears_ward() {
        let form = form();
        form.select_province(Some("01")).expect("province");
        form.select_district(Some("001")).expect("district");
        form.select_ward(Some("00004")).expect("ward");

        form.select_district(Some("002")).expect("new district");
        let snapshot = form.snapshot();
        assert_eq!(snapshot.ward, None);
        let ward_ids: Vec<&str> = snapshot.wards.iter().map(|ward| ward.id.as_str()).collect();
        assert_eq!(ward_ids, ["00037"]);
    }

    #[test]
    fn unknown_province_is_rejected() {
        let form = form();
        let err = form.select_province(Some("99")).expect_err("not offered");
        assert!(matches!(err, SelectionError::NotOffered { .. }));
    }
}

mod admission_cascade {
    use super::common::*;
    use admission_portal::SelectionError;

    #[tokio::test]
    async fn major_options_are_exactly_the_backend_majors() {
        let form = form();
        form.select_school(Some("BKA")).await.expect("school");
        let snapshot = form.snapshot();
        let codes: Vec<&str> = snapshot
            .majors
            .iter()
            .map(|major| major.code.as_str())
            .collect();
        assert_eq!(codes, ["CNTT", "DTVT"]);
    }

    #[tokio::test]
    async fn changing_school_clears_major_and_combination() {
        let form = form();
        form.select_school(Some("BKA")).await.expect("school");
        form.select_major(Some("CNTT")).await.expect("major");
        form.select_combination(Some("A00")).expect("combination");

        form.select_school(Some("NEU")).await.expect("new school");
        let snapshot = form.snapshot();
        assert_eq!(snapshot.major, None);
        assert_eq!(snapshot.combination, None);
        assert!(snapshot.combinations.is_empty());
        assert_eq!(snapshot.total_score, None);
        let codes: Vec<&str> = snapshot
            .majors
            .iter()
            .map(|major| major.code.as_str())
            .collect();
        assert_eq!(codes, ["QTKD"]);
    }

    #[tokio::test]
    async fn clearing_school_empties_the_cascade() {
        let form = form();
        form.select_school(Some("BKA")).await.expect("school");
        form.select_school(None).await.expect("cleared");
        let snapshot = form.snapshot();
        assert_eq!(snapshot.school, None);
        assert!(snapshot.majors.is_empty());
    }

    #[tokio::test]
    async fn major_outside_the_offered_list_is_rejected() {
        let form = form();
        form.select_school(Some("NEU")).await.expect("school");
        let err = form
            .select_major(Some("CNTT"))
            .await
            .expect_err("CNTT belongs to BKA");
        assert!(matches!(err, SelectionError::NotOffered { .. }));
    }

    #[tokio::test]
    async fn combination_details_are_applied_as_a_complete_set() {
        let form = form();
        form.select_school(Some("BKA")).await.expect("school");
        form.select_major(Some("CNTT")).await.expect("major");
        let snapshot = form.snapshot();
        let codes: Vec<&str> = snapshot
            .combinations
            .iter()
            .map(|combination| combination.code.as_str())
            .collect();
        assert_eq!(codes, ["A00", "A01"]);
    }

    #[tokio::test]
    async fn failed_major_fetch_leaves_dependents_cleared_until_retry() {
        let provider = provider();
        provider.fail_school("BKA");
        let form = form_with(provider.clone());

        let err = form.select_school(Some("BKA")).await.expect_err("fetch fails");
        assert!(matches!(err, SelectionError::Fetch(_)));
        let snapshot = form.snapshot();
        assert_eq!(snapshot.school.as_deref(), Some("BKA"));
        assert!(snapshot.majors.is_empty());
        assert_eq!(snapshot.major, None);

        // The next upstream change retries the fetch and recovers.
        provider.recover_school("BKA");
        form.select_school(Some("BKA")).await.expect("retry succeeds");
        assert_eq!(form.snapshot().majors.len(), 2);
    }

    #[tokio::test]
    async fn partial_combination_failure_applies_nothing() {
        let provider = provider();
        provider.fail_combination("A01");
        let form = form_with(provider);

        form.select_school(Some("BKA")).await.expect("school");
        let err = form
            .select_major(Some("CNTT"))
            .await
            .expect_err("one of two details fails");
        assert!(matches!(err, SelectionError::Fetch(_)));
        let snapshot = form.snapshot();
        assert_eq!(snapshot.major.as_deref(), Some("CNTT"));
        assert!(snapshot.combinations.is_empty());
        assert_eq!(snapshot.combination, None);
    }
}

mod scoring {
    use super::common::*;
    use admission_portal::SubjectCode;

    #[tokio::test]
    async fn total_is_the_sum_over_combination_subjects_with_missing_as_zero() {
        let form = form();
        form.select_school(Some("NEU")).await.expect("school");
        form.select_major(Some("QTKD")).await.expect("major");

        form.set_score(SubjectCode::Math, Some(8.5)).expect("math");
        form.set_score(SubjectCode::Literature, Some(7.0))
            .expect("literature");
        // English intentionally left missing; physics must not leak in.
        form.set_score(SubjectCode::Physics, Some(10.0)).expect("physics");

        form.select_combination(Some("D01")).expect("combination");
        assert_eq!(form.snapshot().total_score, Some(15.5));
    }

    #[tokio::test]
    async fn editing_a_score_recomputes_while_a_combination_is_selected() {
        let form = form();
        form.select_school(Some("NEU")).await.expect("school");
        form.select_major(Some("QTKD")).await.expect("major");
        form.select_combination(Some("D01")).expect("combination");
        assert_eq!(form.snapshot().total_score, Some(0.0));

        form.set_score(SubjectCode::Math, Some(9.0)).expect("math");
        assert_eq!(form.snapshot().total_score, Some(9.0));

        form.set_score_raw(SubjectCode::English, "8.25").expect("english");
        assert_eq!(form.snapshot().total_score, Some(17.25));

        // Unparseable input clears the field, contributing zero again.
        form.set_score_raw(SubjectCode::English, "").expect("cleared");
        assert_eq!(form.snapshot().total_score, Some(9.0));
    }

    #[tokio::test]
    async fn clearing_the_combination_unsets_the_total() {
        let form = form();
        form.select_school(Some("NEU")).await.expect("school");
        form.select_major(Some("QTKD")).await.expect("major");
        form.select_combination(Some("D01")).expect("combination");
        form.set_score(SubjectCode::Math, Some(6.0)).expect("math");
        assert_eq!(form.snapshot().total_score, Some(6.0));

        form.select_combination(None).expect("cleared");
        let snapshot = form.snapshot();
        assert_eq!(snapshot.total_score, None);
        // Scores themselves survive; only the derived value resets.
        assert_eq!(snapshot.scores.math, Some(6.0));
    }

    #[tokio::test]
    async fn reset_returns_the_form_to_its_initial_state() {
        let form = form();
        form.select_province(Some("01")).expect("province");
        form.select_school(Some("NEU")).await.expect("school");
        form.select_major(Some("QTKD")).await.expect("major");
        form.select_combination(Some("D01")).expect("combination");

        form.reset();
        let snapshot = form.snapshot();
        assert_eq!(snapshot.province, None);
        assert_eq!(snapshot.school, None);
        assert!(snapshot.majors.is_empty());
        assert_eq!(snapshot.total_score, None);
    }
}

mod stale_responses {
    use std::time::Duration;

    use super::common::*;

    #[tokio::test(start_paused = true)]
    async fn late_majors_for_a_superseded_school_are_discarded() {
        let provider = provider();
        provider
            .delay_school("BKA", Duration::from_millis(200))
            .delay_school("NEU", Duration::from_millis(20));
        let form = form_with(provider.clone());

        // BKA is selected first but answers slowly; NEU supersedes it and
        // answers fast. BKA's late reply must not repopulate the majors.
        let select_slow = form.select_school(Some("BKA"));
        let select_fast = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            form.select_school(Some("NEU")).await
        };
        let (slow, fast) = tokio::join!(select_slow, select_fast);
        slow.expect("stale outcome is silent");
        fast.expect("current selection applies");

        let snapshot = form.snapshot();
        assert_eq!(snapshot.school.as_deref(), Some("NEU"));
        let codes: Vec<&str> = snapshot
            .majors
            .iter()
            .map(|major| major.code.as_str())
            .collect();
        assert_eq!(codes, ["QTKD"]);
        assert_eq!(provider.major_requests(), ["BKA", "NEU"]);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_failures_are_discarded_silently() {
        let provider = provider();
        provider
            .delay_school("BKA", Duration::from_millis(200))
            .fail_school("BKA")
            .delay_school("NEU", Duration::from_millis(20));
        let form = form_with(provider);

        let select_slow = form.select_school(Some("BKA"));
        let select_fast = async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            form.select_school(Some("NEU")).await
        };
        let (slow, fast) = tokio::join!(select_slow, select_fast);
        // The failure belongs to a superseded selection: no error surfaces.
        slow.expect("stale failure is swallowed");
        fast.expect("current selection applies");
        assert_eq!(form.snapshot().majors.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn school_change_supersedes_pending_combination_fetches() {
        let provider = provider();
        provider
            .delay_combination("A00", Duration::from_millis(100))
            .delay_combination("A01", Duration::from_millis(100))
            .delay_school("NEU", Duration::from_millis(20));
        let form = form_with(provider.clone());

        form.select_school(Some("BKA")).await.expect("school");

        // Kick off the combination fetches for CNTT, then immediately switch
        // schools; the combination set must not land on the NEU form.
        let select_major = form.select_major(Some("CNTT"));
        let switch_school = async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            form.select_school(Some("NEU")).await
        };
        let (major_outcome, school_outcome) = tokio::join!(select_major, switch_school);
        major_outcome.expect("superseded major selection is silent");
        school_outcome.expect("school switch applies");

        let snapshot = form.snapshot();
        assert_eq!(snapshot.school.as_deref(), Some("NEU"));
        assert_eq!(snapshot.major, None);
        assert!(snapshot.combinations.is_empty());
    }
}
