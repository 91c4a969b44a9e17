//! 应用配置
//!
//! WASM 中没有运行期环境变量，覆盖项在编译期通过 `option_env!` 读取：
//! - `CRM_API_BASE`：API 前缀，默认 `/api`
//! - `CRM_REQUEST_TIMEOUT_MS`：单次请求超时，默认 10000
//! - `CRM_LOG_LEVEL`：日志级别，默认 `info`

use crmdesk_shared::{DEFAULT_API_BASE, FULL_LIST_LIMIT};
use std::time::Duration;
use tracing::Level;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// 令牌刷新时机
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// 在过期前多久刷新
    pub refresh_lead: Duration,
    /// 剩余有效期不足 `refresh_lead` 时的刷新延迟
    pub refresh_fallback: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_lead: Duration::from_secs(24 * 60 * 60),
            refresh_fallback: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base: String,
    pub request_timeout: Duration,
    pub log_level: Level,
    pub session: SessionConfig,
    /// 用于本地上一条/下一条导航的全量列表上限
    pub list_limit: u32,
    pub toast_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            log_level: Level::INFO,
            session: SessionConfig::default(),
            list_limit: FULL_LIST_LIMIT,
            toast_duration: Duration::from_secs(3),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_overrides(
            option_env!("CRM_API_BASE"),
            option_env!("CRM_REQUEST_TIMEOUT_MS"),
            option_env!("CRM_LOG_LEVEL"),
        )
    }

    /// 无法解析的覆盖值忽略并保留默认值
    pub fn from_overrides(api_base: Option<&str>, timeout_ms: Option<&str>, log_level: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(base) = api_base.map(str::trim).filter(|b| !b.is_empty()) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(ms) = timeout_ms.and_then(|v| v.trim().parse::<u64>().ok()).filter(|ms| *ms > 0) {
            config.request_timeout = Duration::from_millis(ms);
        }
        if let Some(level) = log_level.and_then(|v| v.trim().parse::<Level>().ok()) {
            config.log_level = level;
        }
        config
    }

    /// `fetch` 超时以毫秒传给 `setTimeout`
    pub fn request_timeout_ms(&self) -> u32 {
        u32::try_from(self.request_timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_overrides(None, None, None);
        assert_eq!(config.api_base, "/api");
        assert_eq!(config.request_timeout_ms(), 10_000);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.list_limit, 1000);
        assert_eq!(config.session.refresh_lead, Duration::from_secs(86_400));
        assert_eq!(config.session.refresh_fallback, Duration::from_secs(3_600));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_overrides(Some("https://crm.example.com/api/"), Some("2500"), Some("debug"));
        assert_eq!(config.api_base, "https://crm.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn test_bad_overrides_keep_defaults() {
        let config = AppConfig::from_overrides(Some("  "), Some("soon"), Some("chatty"));
        assert_eq!(config, AppConfig::default());
    }
}
