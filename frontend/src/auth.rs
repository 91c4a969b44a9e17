//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 路由服务只读取 `SessionPhase` 信号来决定守卫行为。
//!
//! - `state`: 纯状态与 reducer
//! - `service`: 登录 / 登出 / 启动恢复流程，与浏览器无关
//! - 本文件：Leptos 上下文绑定

mod service;
mod state;

pub use service::{AuthDispatch, AuthService};
pub use state::{AuthAction, AuthState, SessionPhase, reduce};

use crate::api::CrmApi;
use crate::config::AppConfig;
use crate::error::ApiResult;
use crate::session::{SessionManager, TokenStore};
use crate::web::{BrowserClock, BrowserRuntime, BrowserStorage, FetchClient};
use crmdesk_shared::{User, UserPatch};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::sync::Arc;

pub type BrowserApi = CrmApi<FetchClient, BrowserStorage>;
pub type BrowserAuthService = AuthService<AuthSignal, FetchClient, BrowserStorage, BrowserRuntime>;

/// 以 Leptos 信号作为状态写入端
#[derive(Clone, Copy)]
pub struct AuthSignal(RwSignal<AuthState>);

impl AuthDispatch for AuthSignal {
    fn dispatch(&self, action: AuthAction) {
        self.0.update(|state| *state = reduce(std::mem::take(state), action));
    }

    fn snapshot(&self) -> AuthState {
        self.0.get_untracked()
    }
}

/// 认证上下文
///
/// 通过 Context 在组件间共享，可以自由复制进闭包。
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    service: StoredValue<Arc<BrowserAuthService>>,
}

impl AuthContext {
    /// 组装浏览器端的会话与 API 客户端，初始状态来自已保存的令牌
    pub fn new(config: &AppConfig) -> Self {
        let tokens = TokenStore::new(BrowserStorage);
        let state = RwSignal::new(AuthState::restored(tokens.load()));

        let api = CrmApi::new(
            &config.api_base,
            FetchClient::new(config.request_timeout_ms()),
            tokens,
        );
        let session = Arc::new(SessionManager::new(
            api,
            BrowserRuntime::new(),
            Arc::new(BrowserClock),
            config.session,
        ));
        let service = Arc::new(AuthService::new(AuthSignal(state), session));
        service.install_expiry_hook();

        Self {
            state,
            service: StoredValue::new(service),
        }
    }

    fn service(&self) -> Arc<BrowserAuthService> {
        self.service.get_value()
    }

    /// 获取会话阶段信号（用于路由服务注入）
    pub fn phase_signal(&self) -> Signal<SessionPhase> {
        let state = self.state;
        Memo::new(move |_| state.with(AuthState::phase)).into()
    }

    pub fn user(&self) -> Signal<Option<User>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.user.clone()))
    }

    pub fn api(&self) -> BrowserApi {
        self.service.with_value(|s| s.api().clone())
    }

    /// 启动时恢复会话，只会真正执行一次
    pub fn bootstrap(&self) {
        let service = self.service();
        spawn_local(async move { service.bootstrap().await });
    }

    pub async fn login(&self, email: String, password: String) -> ApiResult<User> {
        self.service().login(&email, &password).await
    }

    /// 导航由路由服务监听状态变化自动处理
    pub async fn logout(&self) {
        self.service().logout().await;
    }

    pub fn update_user(&self, patch: UserPatch) {
        self.service.with_value(|s| s.update_user(patch));
    }
}

/// 创建并注入认证上下文
pub fn provide_auth(config: &AppConfig) -> AuthContext {
    let ctx = AuthContext::new(config);
    provide_context(ctx);
    ctx.bootstrap();
    ctx
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

#[cfg(test)]
mod tests;
