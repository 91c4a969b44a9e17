//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、属性以及守卫判定。

use crate::auth::SessionPhase;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面
    Login,
    /// 控制面板 (`/` 也指向这里)
    #[default]
    Dashboard,
    Clients,
    /// 客户详情，参数为客户 id
    ClientProfile(String),
    Tasks,
    Communications,
    Reports,
    Settings,
    Profile,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" | "/dashboard" => Self::Dashboard,
            "/login" => Self::Login,
            "/clients" => Self::Clients,
            "/tasks" => Self::Tasks,
            "/communications" => Self::Communications,
            "/reports" => Self::Reports,
            "/settings" => Self::Settings,
            "/profile" => Self::Profile,
            other => match other.strip_prefix("/clients/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Self::ClientProfile(id.to_string()),
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Clients => "/clients".to_string(),
            Self::ClientProfile(id) => format!("/clients/{id}"),
            Self::Tasks => "/tasks".to_string(),
            Self::Communications => "/communications".to_string(),
            Self::Reports => "/reports".to_string(),
            Self::Settings => "/settings".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 页头标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Dashboard => "Dashboard",
            Self::Clients => "Client Management",
            Self::ClientProfile(_) => "Client Profile",
            Self::Tasks => "Task Management",
            Self::Communications => "Communications Hub",
            Self::Reports => "Reports & Analytics",
            Self::Settings => "Settings",
            Self::Profile => "Profile",
            Self::NotFound => "Not Found",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::NotFound)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    /// 会话恢复中，显示加载状态
    Wait,
    Redirect(AppRoute),
}

/// 守卫判定只取决于目标路由和会话阶段
pub fn guard(route: &AppRoute, phase: SessionPhase) -> GuardDecision {
    match phase {
        SessionPhase::Authenticating if route.requires_auth() => GuardDecision::Wait,
        SessionPhase::Anonymous if route.requires_auth() => {
            GuardDecision::Redirect(AppRoute::auth_failure_redirect())
        }
        SessionPhase::Authenticated if route.should_redirect_when_authenticated() => {
            GuardDecision::Redirect(AppRoute::auth_success_redirect())
        }
        _ => GuardDecision::Render,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_resolve() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/dashboard/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(
            AppRoute::from_path("/clients/65f0a1"),
            AppRoute::ClientProfile("65f0a1".into())
        );
        assert_eq!(AppRoute::from_path("/clients/a/b"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/register"), AppRoute::NotFound);
    }

    #[test]
    fn test_paths_are_stable() {
        for route in [
            AppRoute::Login,
            AppRoute::Clients,
            AppRoute::ClientProfile("c9".into()),
            AppRoute::Tasks,
            AppRoute::Communications,
            AppRoute::Reports,
            AppRoute::Settings,
            AppRoute::Profile,
        ] {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn test_anonymous_is_sent_to_login() {
        assert_eq!(
            guard(&AppRoute::Tasks, SessionPhase::Anonymous),
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(guard(&AppRoute::Login, SessionPhase::Anonymous), GuardDecision::Render);
    }

    #[test]
    fn test_private_routes_wait_while_authenticating() {
        assert_eq!(
            guard(&AppRoute::ClientProfile("c1".into()), SessionPhase::Authenticating),
            GuardDecision::Wait
        );
        assert_eq!(guard(&AppRoute::Login, SessionPhase::Authenticating), GuardDecision::Render);
    }

    #[test]
    fn test_authenticated_skips_login() {
        assert_eq!(
            guard(&AppRoute::Login, SessionPhase::Authenticated),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(guard(&AppRoute::Reports, SessionPhase::Authenticated), GuardDecision::Render);
        assert_eq!(guard(&AppRoute::NotFound, SessionPhase::Anonymous), GuardDecision::Render);
    }
}
