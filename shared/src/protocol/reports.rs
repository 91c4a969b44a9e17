use super::{ApiRequest, HttpMethod};
use crate::report::{AgentPerformance, Analytics, DashboardStats, ReportPeriod};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct GetDashboardStats;

impl ApiRequest for GetDashboardStats {
    type Response = DashboardStats;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/reports/dashboard".to_string()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct GetAnalytics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<ReportPeriod>,
}

impl ApiRequest for GetAnalytics {
    type Response = Analytics;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/reports/analytics".to_string()
    }

    fn query(&self) -> Option<String> {
        serde_urlencoded::to_string(self)
            .ok()
            .filter(|q| !q.is_empty())
    }
}

/// Per-agent performance rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetUserReport;

impl ApiRequest for GetUserReport {
    type Response = Vec<AgentPerformance>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/reports/users".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_period_query() {
        let req = GetAnalytics {
            period: Some(ReportPeriod::Week),
        };
        assert_eq!(req.query().as_deref(), Some("period=week"));
        assert_eq!(GetAnalytics::default().query(), None);
    }
}
