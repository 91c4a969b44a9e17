//! CRM Desk 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `session` / `auth`: 令牌存储、会话续期与认证状态
//! - `api`: 类型化的 REST 客户端
//! - `logic`: 与 DOM 无关的页面状态
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod error;
mod logic;
mod request;
mod session;
mod telemetry;

mod components {
    pub mod client_management;
    pub mod client_profile;
    pub mod common;
    pub mod communications_hub;
    pub mod dashboard;
    pub mod icons;
    pub mod layout;
    pub mod login;
    pub mod profile;
    pub mod reports_analytics;
    pub mod settings;
    pub mod task_management;
    pub mod toast;
}

pub use config::AppConfig;
pub use telemetry::init_telemetry;

use crate::auth::provide_auth;
use crate::components::client_management::ClientManagementPage;
use crate::components::client_profile::ClientProfilePage;
use crate::components::communications_hub::CommunicationsHubPage;
use crate::components::dashboard::DashboardPage;
use crate::components::layout::AppShell;
use crate::components::login::LoginPage;
use crate::components::profile::ProfilePage;
use crate::components::reports_analytics::ReportsAnalyticsPage;
use crate::components::settings::SettingsPage;
use crate::components::task_management::TaskManagementPage;
use crate::components::toast::{ToastHost, provide_toasts};

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod download;
    mod http;
    pub mod route;
    pub mod router;
    mod runtime;
    mod storage;
    mod timer;
    mod upload;

    pub use download::{download_text, launch_url, open_url};
    pub use http::FetchClient;
    pub use runtime::{BrowserClock, BrowserRuntime};
    pub use storage::BrowserStorage;
    pub use upload::{read_data_url, selected_file};
}

use web::route::AppRoute;
use web::router::{Link, Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件，私有页面统一包进 `AppShell`。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <AppShell><DashboardPage /></AppShell> }.into_any(),
        AppRoute::Clients => view! { <AppShell><ClientManagementPage /></AppShell> }.into_any(),
        AppRoute::ClientProfile(id) => view! { <AppShell><ClientProfilePage id=id /></AppShell> }.into_any(),
        AppRoute::Tasks => view! { <AppShell><TaskManagementPage /></AppShell> }.into_any(),
        AppRoute::Communications => view! { <AppShell><CommunicationsHubPage /></AppShell> }.into_any(),
        AppRoute::Reports => view! { <AppShell><ReportsAnalyticsPage /></AppShell> }.into_any(),
        AppRoute::Settings => view! { <AppShell><SettingsPage /></AppShell> }.into_any(),
        AppRoute::Profile => view! { <AppShell><ProfilePage /></AppShell> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to="/dashboard" class="btn btn-primary mt-6">"Back to Dashboard"</Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置放入 Context，组件通过 use_config 读取
    let config = AppConfig::from_env();
    provide_context(config.clone());

    // 2. 创建认证上下文并恢复会话
    let auth = provide_auth(&config);
    provide_toasts(&config);

    // 3. 获取会话阶段信号，用于注入路由服务
    let phase = auth.phase_signal();

    view! {
        <ToastHost />
        // 4. 路由器组件：注入会话阶段实现守卫
        <Router phase=phase>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
