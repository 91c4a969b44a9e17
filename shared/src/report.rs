use crate::person::PersonRef;
use serde::{Deserialize, Serialize};

// =========================================================
// 报表 (Reports)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_clients: u64,
    #[serde(default)]
    pub active_agents: u64,
    #[serde(default)]
    pub pending_tasks: u64,
    #[serde(default, alias = "ftdCount")]
    pub ftd_this_month: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Year,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 3] = [ReportPeriod::Week, ReportPeriod::Month, ReportPeriod::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportPeriod::Week => "This Week",
            ReportPeriod::Month => "This Month",
            ReportPeriod::Year => "This Year",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(alias = "_id", alias = "name")]
    pub status: String,
    #[serde(default, alias = "value")]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountryShare {
    #[serde(alias = "_id", alias = "country")]
    pub name: String,
    #[serde(default, alias = "count")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyPoint {
    #[serde(alias = "_id")]
    pub month: String,
    #[serde(default, alias = "count")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    #[serde(default)]
    pub lead_status: Vec<StatusCount>,
    #[serde(default)]
    pub countries: Vec<CountryShare>,
    #[serde(default)]
    pub monthly: Vec<MonthlyPoint>,
    #[serde(default)]
    pub conversion_rate: f64,
}

impl Analytics {
    pub fn total_leads(&self) -> u64 {
        self.lead_status.iter().map(|s| s.count).sum()
    }

    /// 某个状态占全部线索的百分比（0..=100）
    pub fn share_of(&self, status: &str) -> f64 {
        let total = self.total_leads();
        if total == 0 {
            return 0.0;
        }
        let count = self
            .lead_status
            .iter()
            .filter(|s| s.status == status)
            .map(|s| s.count)
            .sum::<u64>();
        count as f64 * 100.0 / total as f64
    }
}

/// 当前用户（或某个坐席）的工作量统计
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_clients: u64,
    #[serde(default)]
    pub tasks_completed: u64,
    #[serde(default)]
    pub tasks_pending: u64,
    #[serde(default)]
    pub calls_made: u64,
    #[serde(default, alias = "ftdCount")]
    pub ftd: u64,
}

/// 按坐席汇总的业绩行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent: PersonRef,
    #[serde(flatten)]
    pub stats: UserStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_accepts_aggregation_keys() {
        let json = r#"{
            "leadStatus": [{"_id": "FTD", "count": 3}, {"_id": "New Lead", "count": 9}],
            "countries": [{"_id": "Germany", "count": 4}],
            "conversionRate": 25.0
        }"#;
        let a: Analytics = serde_json::from_str(json).unwrap();
        assert_eq!(a.total_leads(), 12);
        assert_eq!(a.share_of("FTD"), 25.0);
        assert_eq!(a.countries[0].name, "Germany");
        assert!(a.monthly.is_empty());
    }

    #[test]
    fn test_empty_analytics_share_is_zero() {
        assert_eq!(Analytics::default().share_of("FTD"), 0.0);
    }
}
