//! 会话生命周期
//!
//! 应用内只有一个实例，通过 `Arc` 共享。令牌对的唯一写入方。

use super::runtime::{Clock, SessionRuntime};
use super::store::{KeyValueStore, Session, TokenStore};
use super::token::RefreshPlan;
use crate::api::CrmApi;
use crate::config::SessionConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::HttpClient;
use crmdesk_shared::Timestamp;
use futures::channel::oneshot;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// 会话被强制结束时的回调（刷新失败、令牌无法解析）
pub type ExpiryHook = Box<dyn Fn() + Send + Sync>;

/// 单飞刷新：同一时间只有一个刷新请求，其余调用方排队等待结果
#[derive(Default)]
struct RefreshFlight {
    in_progress: bool,
    waiters: Vec<oneshot::Sender<ApiResult<String>>>,
}

pub struct SessionManager<H, S, R> {
    api: CrmApi<H, S>,
    runtime: R,
    clock: Arc<dyn Clock + Send + Sync>,
    config: SessionConfig,
    initialized: AtomicBool,
    listening: AtomicBool,
    /// 每次清理会话加一，进行中的刷新据此判断结果是否作废
    epoch: AtomicU64,
    flight: Mutex<RefreshFlight>,
    on_expired: Mutex<Option<ExpiryHook>>,
}

impl<H, S, R> SessionManager<H, S, R>
where
    H: HttpClient + 'static,
    S: KeyValueStore + 'static,
    R: SessionRuntime + 'static,
{
    pub fn new(
        api: CrmApi<H, S>,
        runtime: R,
        clock: Arc<dyn Clock + Send + Sync>,
        config: SessionConfig,
    ) -> Self {
        Self {
            api,
            runtime,
            clock,
            config,
            initialized: AtomicBool::new(false),
            listening: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            flight: Mutex::new(RefreshFlight::default()),
            on_expired: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &CrmApi<H, S> {
        &self.api
    }

    pub fn tokens(&self) -> &TokenStore<S> {
        self.api.tokens()
    }

    pub fn set_expiry_hook(&self, hook: impl Fn() + Send + Sync + 'static) {
        *lock(&self.on_expired) = Some(Box::new(hook));
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    // =========================================================
    // 生命周期
    // =========================================================

    /// 幂等初始化：没有完整令牌对时不做任何事。
    /// 返回本次调用是否真正完成了初始化。
    pub fn init(self: &Arc<Self>) -> bool {
        if self.is_initialized() {
            tracing::debug!("session manager already initialized");
            return false;
        }
        let has_pair = self
            .tokens()
            .load()
            .is_some_and(|s| s.refresh_token.is_some());
        if !has_pair {
            tracing::debug!("no token pair stored, session manager stays idle");
            return false;
        }
        if self.initialized.swap(true, Ordering::SeqCst) {
            return false;
        }

        tracing::info!("initializing session manager");
        self.schedule_refresh();
        self.watch_other_tabs();
        true
    }

    /// 登录成功后调用
    pub fn setup_session(self: &Arc<Self>) {
        if !self.init() && self.is_initialized() {
            self.schedule_refresh();
        }
    }

    /// 保存登录得到的令牌对并开始会话。
    /// 令牌无法安排刷新而被立即清理时返回 `false`。
    pub fn start_session(self: &Arc<Self>, session: &Session) -> bool {
        let epoch = self.epoch();
        self.tokens().save(session);
        self.setup_session();
        self.epoch() == epoch
    }

    fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// 存储监听只注册一次，之后的重新初始化复用它
    fn watch_other_tabs(self: &Arc<Self>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }
        let weak = Arc::downgrade(self);
        self.runtime.watch_tokens(Box::new(move || {
            if let Some(manager) = weak.upgrade() {
                tracing::debug!("tokens changed in another tab, rescheduling refresh");
                manager.schedule_refresh();
            }
        }));
    }

    /// 按当前访问令牌重新安排刷新，之前的安排作废
    pub fn schedule_refresh(self: &Arc<Self>) {
        self.runtime.cancel();
        let Some(token) = self.tokens().access_token() else {
            return;
        };

        match RefreshPlan::for_token(&token, self.clock.now(), &self.config) {
            RefreshPlan::Now => {
                tracing::info!("access token already expired, refreshing now");
                self.spawn_refresh(Duration::ZERO);
            }
            RefreshPlan::After(delay) => {
                tracing::info!(delay_secs = delay.as_secs(), "token refresh scheduled");
                self.spawn_refresh(delay);
            }
            RefreshPlan::Invalid => {
                tracing::error!("access token expiry is unreadable, ending session");
                self.expire(ApiError::SessionExpired);
            }
        }
    }

    fn spawn_refresh(self: &Arc<Self>, delay: Duration) {
        let weak = Arc::downgrade(self);
        self.runtime.schedule(
            delay,
            Box::pin(async move {
                if let Some(manager) = weak.upgrade() {
                    // 失败已在 refresh_token 内部处理
                    let _ = manager.refresh_token().await;
                }
            }),
        );
    }

    /// 用刷新令牌换取新的令牌对，返回新的访问令牌。
    ///
    /// 刷新进行中时再次调用会等待同一个结果，不会发出第二个请求。
    pub async fn refresh_token(self: &Arc<Self>) -> ApiResult<String> {
        let waiter = {
            let mut flight = lock(&self.flight);
            if flight.in_progress {
                let (tx, rx) = oneshot::channel();
                flight.waiters.push(tx);
                Some(rx)
            } else {
                flight.in_progress = true;
                None
            }
        };

        if let Some(rx) = waiter {
            tracing::debug!("refresh already in flight, waiting for its result");
            return rx.await.unwrap_or(Err(ApiError::SessionExpired));
        }

        tracing::info!("refreshing access token");
        let epoch = self.epoch();
        let Some(refresh) = self.tokens().refresh_token() else {
            tracing::error!("no refresh token stored");
            self.expire(ApiError::SessionExpired);
            return Err(ApiError::SessionExpired);
        };

        let result = self.api.refresh_session(&refresh).await;
        if self.epoch() != epoch {
            // 清理时已通知等待方，这里不能再动新的刷新
            tracing::info!("session cleared while refreshing, discarding result");
            return Err(ApiError::SessionExpired);
        }

        match result {
            Ok(pair) => {
                let access = pair.token.clone();
                self.tokens()
                    .save(&Session::new(pair.token, Some(pair.refresh_token)));
                self.settle(Ok(access.clone()));
                self.schedule_refresh();
                tracing::info!("access token refreshed");
                Ok(access)
            }
            Err(err) => {
                tracing::error!(error = %err, code = err.error_code(), "token refresh failed");
                self.expire(err.clone());
                Err(err)
            }
        }
    }

    fn settle(&self, result: ApiResult<String>) {
        let waiters = {
            let mut flight = lock(&self.flight);
            flight.in_progress = false;
            std::mem::take(&mut flight.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }

    /// 强制结束会话并通知订阅方
    fn expire(&self, reason: ApiError) {
        tracing::warn!(reason = %reason, "session expired");
        self.clear_session_with(reason);
        if let Some(hook) = lock(&self.on_expired).as_ref() {
            hook();
        }
    }

    /// 停止定时器并删除持久化的令牌
    pub fn clear_session(&self) {
        self.clear_session_with(ApiError::SessionExpired);
    }

    fn clear_session_with(&self, reason: ApiError) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.tokens().clear();
        self.runtime.cancel();
        self.settle(Err(reason));
        self.initialized.store(false, Ordering::SeqCst);
        tracing::info!("session cleared");
    }

    /// 尽力通知服务端注销，无论结果如何都清理本地会话
    pub async fn logout(&self) {
        if self.tokens().access_token().is_some() {
            if let Err(err) = self.api.logout().await {
                tracing::warn!(error = %err, "server-side logout failed, clearing local session anyway");
            }
        }
        self.clear_session();
    }

    pub fn token_expiration(&self) -> Option<Timestamp> {
        self.tokens().load().and_then(|s| s.expires_at)
    }

    /// 存在未过期的访问令牌
    pub fn is_authenticated(&self) -> bool {
        self.token_expiration()
            .is_some_and(|expires_at| expires_at > self.clock.now())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests;
