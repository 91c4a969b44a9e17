use super::state::{AuthAction, AuthState};
use crate::api::CrmApi;
use crate::error::{ApiError, ApiResult};
use crate::request::HttpClient;
use crate::session::{KeyValueStore, Session, SessionManager, SessionRuntime};
use crmdesk_shared::{User, UserPatch};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 认证状态的写入端
pub trait AuthDispatch {
    fn dispatch(&self, action: AuthAction);
    fn snapshot(&self) -> AuthState;
}

/// 登录、登出与启动恢复的流程编排
///
/// 令牌的读写全部交给 `SessionManager`，这里只负责把结果反映到状态上。
pub struct AuthService<D, H, S, R> {
    dispatch: D,
    session: Arc<SessionManager<H, S, R>>,
    bootstrapped: AtomicBool,
}

impl<D, H, S, R> AuthService<D, H, S, R>
where
    D: AuthDispatch,
    H: HttpClient + 'static,
    S: KeyValueStore + 'static,
    R: SessionRuntime + 'static,
{
    pub fn new(dispatch: D, session: Arc<SessionManager<H, S, R>>) -> Self {
        Self {
            dispatch,
            session,
            bootstrapped: AtomicBool::new(false),
        }
    }

    pub fn api(&self) -> &CrmApi<H, S> {
        self.session.api()
    }

    pub fn session(&self) -> &Arc<SessionManager<H, S, R>> {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.dispatch.snapshot()
    }

    /// 启动恢复：存在令牌时恰好加载一次当前用户。
    /// 任何失败都视为登出，不重试。
    pub async fn bootstrap(&self) {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            tracing::debug!("auth bootstrap already ran");
            return;
        }

        let Some(stored) = self.session.tokens().load() else {
            self.dispatch.dispatch(AuthAction::SetLoading(false));
            return;
        };

        match self.api().current_user().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, role = user.role.as_str(), "session restored");
                self.dispatch.dispatch(AuthAction::LoginSuccess {
                    user,
                    token: stored.access_token,
                    refresh_token: stored.refresh_token,
                });
                self.session.init();
            }
            Err(err) => {
                tracing::warn!(error = %err, code = err.error_code(), "stored session rejected, signing out");
                self.session.clear_session();
                self.dispatch.dispatch(AuthAction::Logout);
            }
        }
    }

    /// 失败时状态保持不变，错误原样返回给登录页。
    /// 会话无法建立（令牌过期时间不可读）时同样返回错误。
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<User> {
        let res = self.api().login(email, password).await?;
        let user = res.user();

        let started = self
            .session
            .start_session(&Session::new(res.token.clone(), res.refresh_token.clone()));
        if !started {
            tracing::error!(user_id = %user.id, "login returned a token whose expiry cannot be read");
            return Err(ApiError::SessionExpired);
        }
        self.dispatch.dispatch(AuthAction::LoginSuccess {
            user: user.clone(),
            token: res.token,
            refresh_token: res.refresh_token,
        });
        tracing::info!(user_id = %user.id, "signed in");
        Ok(user)
    }

    /// 不会失败：服务端注销失败也会清理本地状态
    pub async fn logout(&self) {
        self.session.logout().await;
        self.dispatch.dispatch(AuthAction::Logout);
        tracing::info!("signed out");
    }

    /// 仅本地合并，不请求服务端
    pub fn update_user(&self, patch: UserPatch) {
        self.dispatch.dispatch(AuthAction::UpdateUser(patch));
    }
}

impl<D, H, S, R> AuthService<D, H, S, R>
where
    D: AuthDispatch + Clone + Send + Sync + 'static,
    H: HttpClient + 'static,
    S: KeyValueStore + 'static,
    R: SessionRuntime + 'static,
{
    /// 会话被强制结束（刷新失败等）时同步登出状态
    pub fn install_expiry_hook(&self) {
        let dispatch = self.dispatch.clone();
        self.session.set_expiry_hook(move || {
            dispatch.dispatch(AuthAction::Logout);
        });
    }
}
