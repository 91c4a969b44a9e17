use super::*;
use crate::request::{HttpMethod, HttpRequest, HttpResponse, MockHttpClient, TransportError};
use crate::session::{ManualClock, ManualRuntime, MemoryStore, test_jwt};
use futures::channel::oneshot;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::AtomicUsize;

const NOW: i64 = 1_700_000_000;
const DAY: i64 = 24 * 60 * 60;
const REFRESH_URL: &str = "/api/auth/refresh";

type TestManager = SessionManager<Rc<MockHttpClient>, Rc<MemoryStore>, Rc<ManualRuntime>>;

struct Harness {
    manager: Arc<TestManager>,
    http: Rc<MockHttpClient>,
    store: Rc<MemoryStore>,
    runtime: Rc<ManualRuntime>,
    clock: Arc<ManualClock>,
    expired: Arc<AtomicUsize>,
}

fn harness(entries: &[(&str, &str)]) -> Harness {
    let http = Rc::new(MockHttpClient::new());
    let store = Rc::new(MemoryStore::with(entries));
    let runtime = Rc::new(ManualRuntime::new());
    let clock = Arc::new(ManualClock::at(Timestamp::from_secs(NOW)));
    let api = CrmApi::new("/api", http.clone(), TokenStore::new(store.clone()));
    let manager = Arc::new(SessionManager::new(
        api,
        runtime.clone(),
        clock.clone(),
        SessionConfig::default(),
    ));

    let expired = Arc::new(AtomicUsize::new(0));
    let counter = expired.clone();
    manager.set_expiry_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    Harness {
        manager,
        http,
        store,
        runtime,
        clock,
        expired,
    }
}

fn week_token() -> String {
    test_jwt(NOW + 7 * DAY)
}

#[test]
fn test_init_without_tokens_is_noop() {
    let h = harness(&[]);
    assert!(!h.manager.init());
    assert!(!h.manager.is_initialized());
    assert_eq!(h.runtime.pending_delay(), None);
    assert_eq!(h.runtime.watcher_count(), 0);
}

#[test]
fn test_init_requires_refresh_token() {
    let token = week_token();
    let h = harness(&[("token", token.as_str())]);
    assert!(!h.manager.init());
}

#[test]
fn test_init_is_idempotent_and_listens_once() {
    let token = week_token();
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);

    assert!(h.manager.init());
    assert!(!h.manager.init());
    assert_eq!(h.runtime.watcher_count(), 1);
    assert_eq!(
        h.runtime.pending_delay(),
        Some(Duration::from_secs((6 * DAY) as u64))
    );

    // 清理后重新初始化不会重复注册监听
    h.manager.clear_session();
    h.store.set("token", token.as_str());
    h.store.set("refreshToken", "r-2");
    assert!(h.manager.init());
    assert_eq!(h.runtime.watcher_count(), 1);
}

#[test]
fn test_setup_session_reschedules_when_already_running() {
    let token = week_token();
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.manager.setup_session();
    assert!(h.manager.is_initialized());

    h.store.set("token", &test_jwt(NOW + 2 * DAY));
    h.manager.setup_session();
    assert_eq!(
        h.runtime.pending_delay(),
        Some(Duration::from_secs(DAY as u64))
    );
}

#[tokio::test]
async fn test_scheduled_refresh_rotates_tokens() {
    let old = test_jwt(NOW + 2 * 60 * 60);
    let new = test_jwt(NOW + 30 * DAY);
    let h = harness(&[("token", old.as_str()), ("refreshToken", "r-old")]);
    h.http.mock_response(
        HttpMethod::Post,
        REFRESH_URL,
        200,
        json!({"token": new, "refreshToken": "r-new"}),
    );

    assert!(h.manager.init());
    assert_eq!(h.runtime.pending_delay(), Some(Duration::from_secs(60 * 60)));

    h.clock.advance(Duration::from_secs(60 * 60));
    assert!(h.runtime.fire().await);

    assert_eq!(h.store.get("token").as_deref(), Some(new.as_str()));
    assert_eq!(h.store.get("refreshToken").as_deref(), Some("r-new"));
    let sent = h.http.last_request().unwrap();
    assert_eq!(sent.body.as_deref(), Some(r#"{"refreshToken":"r-old"}"#));
    assert!(h.runtime.pending_delay().is_some());
    assert_eq!(h.expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_refreshes_immediately() {
    let h = harness(&[("token", test_jwt(NOW - 10).as_str()), ("refreshToken", "r")]);
    assert!(h.manager.init());
    assert_eq!(h.runtime.pending_delay(), Some(Duration::ZERO));
}

#[tokio::test]
async fn test_refresh_failure_forces_logout() {
    let token = week_token();
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.http.mock_response(
        HttpMethod::Post,
        REFRESH_URL,
        401,
        json!({"message": "Refresh token revoked"}),
    );
    h.manager.init();

    let err = h.manager.refresh_token().await.unwrap_err();
    assert_eq!(err.to_string(), "Refresh token revoked");
    assert!(h.store.is_empty());
    assert!(!h.manager.is_initialized());
    assert_eq!(h.runtime.pending_delay(), None);
    assert_eq!(h.expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unreadable_token_forces_logout() {
    let h = harness(&[("token", "opaque-token"), ("refreshToken", "r-1")]);
    h.manager.init();
    assert!(h.store.is_empty());
    assert_eq!(h.expired.load(Ordering::SeqCst), 1);
    assert_eq!(h.http.request_count(), 0);
}

/// 在收到放行信号前挂起的 HTTP 客户端，用于制造并发刷新
struct GatedHttp {
    inner: MockHttpClient,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

#[async_trait::async_trait(?Send)]
impl HttpClient for GatedHttp {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.inner.send(req).await
    }
}

#[tokio::test]
async fn test_concurrent_refreshes_share_one_request() {
    let new = test_jwt(NOW + 30 * DAY);
    let (open, gate) = oneshot::channel();
    let http = Rc::new(GatedHttp {
        inner: MockHttpClient::new(),
        gate: RefCell::new(Some(gate)),
    });
    http.inner.mock_response(
        HttpMethod::Post,
        REFRESH_URL,
        200,
        json!({"token": new, "refreshToken": "r-new"}),
    );
    let store = Rc::new(MemoryStore::with(&[("token", week_token().as_str()), ("refreshToken", "r-1")]));
    let manager = Arc::new(SessionManager::new(
        CrmApi::new("/api", http.clone(), TokenStore::new(store.clone())),
        Rc::new(ManualRuntime::new()),
        Arc::new(ManualClock::at(Timestamp::from_secs(NOW))),
        SessionConfig::default(),
    ));

    let (first, second, _) = futures::join!(manager.refresh_token(), manager.refresh_token(), async {
        let _ = open.send(());
    });

    assert_eq!(first.as_deref(), Ok(new.as_str()));
    assert_eq!(second.as_deref(), Ok(new.as_str()));
    assert_eq!(http.inner.count_for(HttpMethod::Post, REFRESH_URL), 1);
}

#[tokio::test]
async fn test_clear_during_refresh_discards_new_tokens() {
    let (open, gate) = oneshot::channel();
    let http = Rc::new(GatedHttp {
        inner: MockHttpClient::new(),
        gate: RefCell::new(Some(gate)),
    });
    http.inner.mock_response(
        HttpMethod::Post,
        REFRESH_URL,
        200,
        json!({"token": test_jwt(NOW + 30 * DAY), "refreshToken": "r-new"}),
    );
    let store = Rc::new(MemoryStore::with(&[("token", week_token().as_str()), ("refreshToken", "r-1")]));
    let runtime = Rc::new(ManualRuntime::new());
    let manager = Arc::new(SessionManager::new(
        CrmApi::new("/api", http.clone(), TokenStore::new(store.clone())),
        runtime.clone(),
        Arc::new(ManualClock::at(Timestamp::from_secs(NOW))),
        SessionConfig::default(),
    ));

    let (result, _) = futures::join!(manager.refresh_token(), async {
        manager.clear_session();
        let _ = open.send(());
    });

    assert_eq!(result, Err(ApiError::SessionExpired));
    assert!(store.is_empty());
    assert_eq!(runtime.pending_delay(), None);
    assert_eq!(http.inner.count_for(HttpMethod::Post, REFRESH_URL), 1);
}

#[tokio::test]
async fn test_logout_clears_even_when_server_fails() {
    let token = week_token();
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.http.mock_failure(
        HttpMethod::Post,
        "/api/auth/logout",
        TransportError::Network("offline".into()),
    );
    h.manager.init();
    let cancels = h.runtime.cancel_count();

    h.manager.logout().await;
    assert!(h.store.is_empty());
    assert_eq!(h.runtime.cancel_count(), cancels + 1);
    assert_eq!(h.runtime.pending_delay(), None);
    assert!(!h.manager.is_initialized());
    assert_eq!(h.http.count_for(HttpMethod::Post, "/api/auth/logout"), 1);
    // 主动登出不算过期
    assert_eq!(h.expired.load(Ordering::SeqCst), 0);
}

#[test]
fn test_other_tab_token_change_reschedules() {
    let token = week_token();
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.manager.init();

    h.store.set("token", &test_jwt(NOW + 3 * DAY));
    h.runtime.notify_token_change();
    assert_eq!(
        h.runtime.pending_delay(),
        Some(Duration::from_secs((2 * DAY) as u64))
    );
}

#[test]
fn test_expiration_and_authentication() {
    let token = test_jwt(NOW + 60);
    let h = harness(&[("token", token.as_str())]);
    assert_eq!(h.manager.token_expiration(), Some(Timestamp::from_secs(NOW + 60)));
    assert!(h.manager.is_authenticated());

    h.clock.advance(Duration::from_secs(61));
    assert!(!h.manager.is_authenticated());
}
