use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Aggregate issue statistics for the analytics and dashboard views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    #[serde(rename = "totalIssues")]
    pub total_issues: i64,
    #[serde(rename = "statusDistribution", default)]
    pub status_distribution: HashMap<String, i64>,
    #[serde(rename = "priorityDistribution", default)]
    pub priority_distribution: HashMap<String, i64>,
    #[serde(rename = "averageResolutionTimeHours")]
    pub average_resolution_time_hours: Option<f64>,
    #[serde(rename = "openIssues")]
    pub open_issues: i64,
    #[serde(rename = "inProgressIssues")]
    pub in_progress_issues: i64,
    #[serde(rename = "closedIssues")]
    pub closed_issues: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_analytics_response() {
        let json = r#"{
            "totalIssues": 12,
            "statusDistribution": {"OPEN": 5, "CLOSED": 7},
            "priorityDistribution": {"HIGH": 2, "MEDIUM": 10},
            "averageResolutionTimeHours": 18.5,
            "openIssues": 5,
            "inProgressIssues": 0,
            "closedIssues": 7
        }"#;

        let summary: AnalyticsSummary = serde_json::from_str(json).expect("Failed to parse analytics");
        assert_eq!(summary.total_issues, 12);
        assert_eq!(summary.status_distribution["OPEN"], 5);
        assert_eq!(summary.average_resolution_time_hours, Some(18.5));
    }

    #[test]
    fn parse_analytics_without_resolution_time() {
        let json = r#"{
            "totalIssues": 0,
            "averageResolutionTimeHours": null,
            "openIssues": 0,
            "inProgressIssues": 0,
            "closedIssues": 0
        }"#;

        let summary: AnalyticsSummary = serde_json::from_str(json).expect("Failed to parse analytics");
        assert!(summary.average_resolution_time_hours.is_none());
        assert!(summary.status_distribution.is_empty());
    }
}
