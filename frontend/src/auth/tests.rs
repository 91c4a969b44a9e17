use super::*;
use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::request::{HttpMethod, MockHttpClient, TransportError};
use crate::session::{KeyValueStore, ManualClock, ManualRuntime, MemoryStore, test_jwt};
use crmdesk_shared::Timestamp;
use serde_json::json;
use std::rc::Rc;
use std::sync::Mutex;

const NOW: i64 = 1_700_000_000;

/// 内存中的状态写入端，记录收到的所有动作
#[derive(Clone, Default)]
struct MemoryDispatch {
    state: Arc<Mutex<AuthState>>,
    actions: Arc<Mutex<Vec<AuthAction>>>,
}

impl MemoryDispatch {
    fn starting_from(state: AuthState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Default::default()
        }
    }

    fn action_count(&self) -> usize {
        self.actions.lock().unwrap().len()
    }
}

impl AuthDispatch for MemoryDispatch {
    fn dispatch(&self, action: AuthAction) {
        self.actions.lock().unwrap().push(action.clone());
        let mut state = self.state.lock().unwrap();
        *state = reduce(std::mem::take(&mut *state), action);
    }

    fn snapshot(&self) -> AuthState {
        self.state.lock().unwrap().clone()
    }
}

type TestService = AuthService<MemoryDispatch, Rc<MockHttpClient>, Rc<MemoryStore>, Rc<ManualRuntime>>;

struct Harness {
    service: TestService,
    dispatch: MemoryDispatch,
    http: Rc<MockHttpClient>,
    store: Rc<MemoryStore>,
    runtime: Rc<ManualRuntime>,
}

fn harness(entries: &[(&str, &str)]) -> Harness {
    let http = Rc::new(MockHttpClient::new());
    let store = Rc::new(MemoryStore::with(entries));
    let runtime = Rc::new(ManualRuntime::new());
    let tokens = TokenStore::new(store.clone());
    let dispatch = MemoryDispatch::starting_from(AuthState::restored(tokens.load()));
    let session = Arc::new(SessionManager::new(
        CrmApi::new("/api", http.clone(), tokens),
        runtime.clone(),
        Arc::new(ManualClock::at(Timestamp::from_secs(NOW))),
        SessionConfig::default(),
    ));
    let service = AuthService::new(dispatch.clone(), session);
    service.install_expiry_hook();

    Harness {
        service,
        dispatch,
        http,
        store,
        runtime,
    }
}

fn me_json() -> serde_json::Value {
    json!({"_id": "u1", "firstName": "Ana", "lastName": "Silva", "email": "ana@crm.io", "role": "admin"})
}

#[tokio::test]
async fn test_login_success_persists_both_tokens() {
    let h = harness(&[]);
    let token = test_jwt(NOW + 7 * 24 * 60 * 60);
    h.http.mock_response(
        HttpMethod::Post,
        "/api/auth/login",
        200,
        json!({"_id": "u1", "firstName": "Ana", "lastName": "Silva", "email": "ana@crm.io",
               "role": "agent", "token": token, "refreshToken": "r-1"}),
    );
    assert!(!h.service.state().is_authenticated);

    let user = h.service.login("ana@crm.io", "secret").await.unwrap();
    assert_eq!(user.full_name(), "Ana Silva");

    let state = h.service.state();
    assert!(state.is_authenticated);
    assert_eq!(state.phase(), SessionPhase::Authenticated);
    assert_eq!(h.store.get("token").as_deref(), Some(token.as_str()));
    assert_eq!(h.store.get("refreshToken").as_deref(), Some("r-1"));
    assert!(h.service.session().is_initialized());
    assert!(h.runtime.pending_delay().is_some());
}

#[tokio::test]
async fn test_login_with_unreadable_token_stays_signed_out() {
    let h = harness(&[]);
    h.http.mock_response(
        HttpMethod::Post,
        "/api/auth/login",
        200,
        json!({"_id": "u1", "firstName": "Ana", "lastName": "Silva", "email": "ana@crm.io",
               "role": "agent", "token": "opaque-session-token", "refreshToken": "r-1"}),
    );

    let err = h.service.login("ana@crm.io", "secret").await.unwrap_err();
    assert_eq!(err, ApiError::SessionExpired);

    let state = h.service.state();
    assert!(!state.is_authenticated);
    assert_eq!(state.phase(), SessionPhase::Anonymous);
    assert!(h.store.is_empty());
    assert!(!h.service.session().is_initialized());
    assert_eq!(h.runtime.pending_delay(), None);
}

#[tokio::test]
async fn test_invalid_login_surfaces_server_message() {
    let h = harness(&[]);
    h.http.mock_response(
        HttpMethod::Post,
        "/api/auth/login",
        401,
        json!({"message": "Invalid credentials"}),
    );

    let err = h.service.login("ana@crm.io", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!h.service.state().is_authenticated);
    assert!(h.store.is_empty());
    assert_eq!(h.dispatch.action_count(), 0);
}

#[tokio::test]
async fn test_login_without_server_message_uses_fallback() {
    let h = harness(&[]);
    h.http.mock_raw(HttpMethod::Post, "/api/auth/login", 500, "");
    let err = h.service.login("ana@crm.io", "pw").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn test_blank_login_fields_are_rejected_locally() {
    let h = harness(&[]);
    let err = h.service.login("  ", "").await.unwrap_err();
    assert_eq!(err.to_string(), "Please fill in all fields");
    assert_eq!(h.http.request_count(), 0);
}

#[tokio::test]
async fn test_boot_with_valid_token_restores_user() {
    let token = test_jwt(NOW + 3 * 24 * 60 * 60);
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    assert_eq!(h.service.state().phase(), SessionPhase::Authenticating);
    h.http.mock_response(HttpMethod::Get, "/api/auth/me", 200, me_json());

    h.service.bootstrap().await;

    let state = h.service.state();
    assert!(state.is_authenticated);
    assert!(!state.loading);
    assert_eq!(state.user.unwrap().id, "u1");
    assert!(h.service.session().is_initialized());
}

#[tokio::test]
async fn test_boot_with_rejected_token_signs_out() {
    let h = harness(&[("token", "stale"), ("refreshToken", "r-1")]);
    h.http.mock_response(
        HttpMethod::Get,
        "/api/auth/me",
        401,
        json!({"message": "Token is not valid"}),
    );

    h.service.bootstrap().await;

    let state = h.service.state();
    assert!(!state.is_authenticated);
    assert!(!state.loading);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_boot_network_failure_signs_out() {
    let h = harness(&[("token", "t"), ("refreshToken", "r")]);
    h.http.mock_failure(
        HttpMethod::Get,
        "/api/auth/me",
        TransportError::Network("offline".into()),
    );
    h.service.bootstrap().await;
    assert_eq!(h.service.state().phase(), SessionPhase::Anonymous);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_boot_without_token_only_stops_loading() {
    let h = harness(&[]);
    h.service.bootstrap().await;
    assert_eq!(h.service.state(), AuthState::default());
    assert_eq!(h.http.request_count(), 0);
}

#[tokio::test]
async fn test_bootstrap_loads_user_exactly_once() {
    let token = test_jwt(NOW + 3 * 24 * 60 * 60);
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.http.mock_response(HttpMethod::Get, "/api/auth/me", 200, me_json());

    h.service.bootstrap().await;
    h.service.bootstrap().await;
    assert_eq!(h.http.count_for(HttpMethod::Get, "/api/auth/me"), 1);
}

#[tokio::test]
async fn test_logout_clears_state_even_when_server_fails() {
    let token = test_jwt(NOW + 3 * 24 * 60 * 60);
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.http.mock_response(HttpMethod::Get, "/api/auth/me", 200, me_json());
    h.http.mock_raw(HttpMethod::Post, "/api/auth/logout", 500, "");
    h.service.bootstrap().await;
    assert!(h.service.state().is_authenticated);

    h.service.logout().await;

    let state = h.service.state();
    assert!(state.user.is_none());
    assert!(state.token.is_none());
    assert!(!state.is_authenticated);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_forced_expiry_signs_out() {
    let token = test_jwt(NOW + 3 * 24 * 60 * 60);
    let h = harness(&[("token", token.as_str()), ("refreshToken", "r-1")]);
    h.http.mock_response(HttpMethod::Get, "/api/auth/me", 200, me_json());
    h.http.mock_response(
        HttpMethod::Post,
        "/api/auth/refresh",
        401,
        json!({"message": "Refresh token expired"}),
    );
    h.service.bootstrap().await;

    assert!(h.runtime.fire().await);
    assert_eq!(h.service.state().phase(), SessionPhase::Anonymous);
    assert!(h.store.is_empty());
}

#[test]
fn test_update_user_is_local_only() {
    let h = harness(&[]);
    h.dispatch.dispatch(AuthAction::LoginSuccess {
        user: User {
            id: "u1".into(),
            first_name: "Ana".into(),
            ..Default::default()
        },
        token: "t".into(),
        refresh_token: None,
    });

    h.service.update_user(UserPatch {
        phone: Some("+351 900 000 000".into()),
        ..Default::default()
    });

    let user = h.service.state().user.unwrap();
    assert_eq!(user.phone.as_deref(), Some("+351 900 000 000"));
    assert_eq!(h.http.request_count(), 0);
}
