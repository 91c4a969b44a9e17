use super::*;
use crate::request::{MockHttpClient, TransportError};
use crate::session::MemoryStore;
use crmdesk_shared::protocol::clients::ExportClients;
use crmdesk_shared::{LeadStatus, ListQuery, NewTask, TaskPatch, TaskStatus};
use serde_json::json;
use std::rc::Rc;

type TestApi = CrmApi<Rc<MockHttpClient>, Rc<MemoryStore>>;

fn setup(token: Option<&str>) -> (TestApi, Rc<MockHttpClient>, Rc<MemoryStore>) {
    let http = Rc::new(MockHttpClient::new());
    let store = Rc::new(match token {
        Some(t) => MemoryStore::with(&[("token", t)]),
        None => MemoryStore::new(),
    });
    let api = CrmApi::new("/api/", http.clone(), TokenStore::new(store.clone()));
    (api, http, store)
}

fn client_json(id: &str) -> serde_json::Value {
    json!({"_id": id, "firstName": "Mia", "lastName": "Wong", "status": "New Lead"})
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let (api, http, _) = setup(Some("tok-1"));
    http.mock_response(HttpMethod::Get, "/api/clients/c1", 200, client_json("c1"));

    let client = api.get_client("c1").await.unwrap();
    assert_eq!(client.first_name, "Mia");

    let req = http.last_request().unwrap();
    assert_eq!(req.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn test_login_sends_no_authorization_without_token() {
    let (api, http, _) = setup(None);
    http.mock_response(
        HttpMethod::Post,
        "/api/auth/login",
        200,
        json!({"_id": "u1", "firstName": "A", "lastName": "B", "email": "a@b.io", "role": "agent", "token": "t", "refreshToken": "r"}),
    );

    let res = api.login(" a@b.io ", "pw").await.unwrap();
    assert_eq!(res.token, "t");

    let req = http.last_request().unwrap();
    assert!(req.header("Authorization").is_none());
    assert_eq!(req.body.as_deref(), Some(r#"{"email":"a@b.io","password":"pw"}"#));
}

#[tokio::test]
async fn test_private_call_without_token_fails_locally() {
    let (api, http, _) = setup(None);
    let err = api.dashboard_stats().await.unwrap_err();
    assert!(err.is_auth_failure());
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn test_server_message_is_surfaced() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_response(
        HttpMethod::Put,
        "/api/tasks/t1",
        409,
        json!({"message": "Task was modified by someone else"}),
    );

    let err = api
        .update_task("t1", TaskPatch::status(TaskStatus::Completed))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Task was modified by someone else");
    assert_eq!(err.status_code(), Some(409));
}

#[tokio::test]
async fn test_generic_message_when_server_is_silent() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_raw(HttpMethod::Delete, "/api/clients/c1", 500, "");
    let err = api.delete_client("c1").await.unwrap_err();
    assert_eq!(err.to_string(), "API request failed");
}

#[tokio::test]
async fn test_network_failure_is_generic() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_failure(
        HttpMethod::Get,
        "/api/reports/dashboard",
        TransportError::Timeout(10_000),
    );
    let err = api.dashboard_stats().await.unwrap_err();
    assert_eq!(err.to_string(), "Network error");
}

#[tokio::test]
async fn test_invalid_input_never_reaches_network() {
    let (api, http, _) = setup(Some("tok"));
    let err = api.create_task(&NewTask::default()).await.unwrap_err();
    assert_eq!(err, ApiError::Validation("Please enter a task title".into()));

    let err = api.add_note("c1", "   ").await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a note");
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn test_schema_violation_is_rejected() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_response(
        HttpMethod::Get,
        "/api/auth/me",
        200,
        json!({"_id": "", "firstName": "A", "lastName": "B", "email": "a@b.io", "role": "agent"}),
    );
    let err = api.current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));

    http.mock_response(HttpMethod::Get, "/api/auth/me", 200, json!({"unexpected": true}));
    let err = api.current_user().await.unwrap_err();
    assert_eq!(err.error_code(), "INVALID_RESPONSE");
}

#[tokio::test]
async fn test_list_query_and_envelope() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_response(
        HttpMethod::Get,
        "/api/clients?page=2&limit=10&status=FTD",
        200,
        json!({
            "clients": [client_json("c1"), client_json("c2")],
            "pagination": {"current": 2, "total": 3, "hasPrev": true, "hasNext": true}
        }),
    );

    let page = api
        .list_clients(ListQuery::page(2, 10).with_status(LeadStatus::Ftd.as_str()))
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.pagination.next_page(), Some(3));
}

#[tokio::test]
async fn test_empty_ack_body_is_accepted() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_raw(HttpMethod::Delete, "/api/tasks/t9", 204, "");
    let ack = api.delete_task("t9").await.unwrap();
    assert_eq!(ack.message, None);
}

#[tokio::test]
async fn test_export_is_fetched_as_text() {
    let (api, http, _) = setup(Some("tok"));
    http.mock_raw(
        HttpMethod::Get,
        "/api/clients/export?format=csv",
        200,
        "clientId,firstName\nC-1,Mia\n",
    );
    let csv = api.export_clients(ExportClients::default()).await.unwrap();
    assert!(csv.starts_with("clientId,"));
}
