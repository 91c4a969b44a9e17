use super::CrmApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::session::KeyValueStore;
use crmdesk_shared::protocol::reports::{GetAnalytics, GetDashboardStats, GetUserReport};
use crmdesk_shared::report::AgentPerformance;
use crmdesk_shared::{Analytics, DashboardStats, ReportPeriod};

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.send(&GetDashboardStats).await
    }

    pub async fn analytics(&self, period: Option<ReportPeriod>) -> ApiResult<Analytics> {
        self.send(&GetAnalytics { period }).await
    }

    pub async fn agent_report(&self) -> ApiResult<Vec<AgentPerformance>> {
        self.send(&GetUserReport).await
    }
}
