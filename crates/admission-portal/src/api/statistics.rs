//! Overview statistics for the admin dashboard.

use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError};
use crate::session::SessionStorage;

/// Optional date-range filter, sent as `yyyy-MM-dd`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

/// One aggregate bucket, keyed by status/major/subject-group identifier.
#[derive(Debug, Clone, Deserialize)]
pub struct StatisticItem {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub count: u64,
}

/// Per-school bucket carries the school name alongside its code.
#[derive(Debug, Clone, Deserialize)]
pub struct SchoolStatisticItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStatistics {
    pub total_applications: u64,
    pub by_status: Vec<StatisticItem>,
    pub by_school: Vec<SchoolStatisticItem>,
    pub by_major: Vec<StatisticItem>,
    pub by_subject_group: Vec<StatisticItem>,
}

impl<S: SessionStorage> ApiClient<S> {
    pub async fn overview_statistics(
        &self,
        query: &StatisticsQuery,
    ) -> Result<OverviewStatistics, ApiError> {
        let builder = self
            .request(Method::GET, "api/v2/statistic/overview")
            .query(query);
        self.execute(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_payload_parses() {
        let raw = r#"{
            "totalApplications": 12,
            "byStatus": [{"_id": "Chờ duyệt", "count": 7}, {"_id": null, "count": 1}],
            "bySchool": [{"_id": "BKA", "name": "Đại học Bách khoa Hà Nội", "count": 5}],
            "byMajor": [{"_id": "CNTT", "count": 4}],
            "bySubjectGroup": [{"_id": "A00", "count": 3}]
        }"#;
        let overview: OverviewStatistics = serde_json::from_str(raw).expect("parse");
        assert_eq!(overview.total_applications, 12);
        assert_eq!(overview.by_status[0].id.as_deref(), Some("Chờ duyệt"));
        assert_eq!(overview.by_status[1].id, None);
        assert_eq!(overview.by_school[0].id, "BKA");
    }
}
