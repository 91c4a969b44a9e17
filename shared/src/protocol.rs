//! Typed request protocol for the CRM REST API.
//!
//! Every endpoint is a type implementing [`ApiRequest`]; the frontend client
//! turns it into an HTTP call and decodes `Response`.

use crate::schema::Schema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use validator::ValidationErrors;

pub mod auth;
pub mod clients;
pub mod communications;
pub mod reports;
pub mod tasks;
pub mod users;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Fallback message for a non-2xx response without a `message` field.
pub const DEFAULT_FAILURE_MESSAGE: &str = "API request failed";

/// Defines the request-response relationship and metadata for an endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned + Schema;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Used when the server rejects the call without saying why.
    const FAILURE_MESSAGE: &'static str = DEFAULT_FAILURE_MESSAGE;
    /// Whether the endpoint needs a session. Calls to such endpoints fail
    /// locally when no access token is stored.
    const AUTHENTICATED: bool = true;

    /// Path relative to the API base, starting with `/`.
    fn path(&self) -> String;

    /// Encoded query string without the leading `?`.
    fn query(&self) -> Option<String> {
        None
    }

    /// JSON request body.
    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        Ok(None)
    }

    /// Client-side validation, run before any network call.
    fn check_input(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

/// Serializes `value` as the request body.
pub fn json_body<T: Serialize + ?Sized>(value: &T) -> Result<Option<String>, serde_json::Error> {
    serde_json::to_string(value).map(Some)
}

/// Generic `{ message }` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::ListQuery;
    use crate::protocol::auth::Login;
    use crate::protocol::clients::{ListClients, SearchClients, UpdateClient};
    use crate::protocol::tasks::ListTasks;
    use crate::{ClientPatch, LeadStatus, NewTask};

    #[test]
    fn test_login_metadata() {
        let req = Login {
            email: "a@b.io".into(),
            password: "pw".into(),
        };
        assert_eq!(req.path(), "/auth/login");
        assert_eq!(Login::METHOD, HttpMethod::Post);
        assert_eq!(Login::FAILURE_MESSAGE, "Login failed");
        assert!(!Login::AUTHENTICATED);
        assert_eq!(
            req.body().unwrap().as_deref(),
            Some(r#"{"email":"a@b.io","password":"pw"}"#)
        );
    }

    #[test]
    fn test_login_requires_both_fields() {
        let req = Login {
            email: "a@b.io".into(),
            password: "".into(),
        };
        let errors = req.check_input().unwrap_err();
        assert_eq!(crate::form::first_message(&errors), "Please fill in all fields");
    }

    #[test]
    fn test_list_requests_encode_query() {
        let clients = ListClients {
            query: ListQuery::page(1, 10).with_status(LeadStatus::Ftd.as_str()),
        };
        assert_eq!(clients.path(), "/clients");
        assert_eq!(clients.query().as_deref(), Some("page=1&limit=10&status=FTD"));

        let tasks = ListTasks {
            query: ListQuery::default(),
        };
        assert_eq!(tasks.query(), None);

        let search = SearchClients { q: "mia wong".into() };
        assert_eq!(search.path(), "/clients/search");
        assert_eq!(search.query().as_deref(), Some("q=mia+wong"));
    }

    #[test]
    fn test_update_uses_put_with_id_in_path() {
        let req = UpdateClient {
            id: "c42".into(),
            patch: ClientPatch::status(LeadStatus::CallAgain),
        };
        assert_eq!(UpdateClient::METHOD, HttpMethod::Put);
        assert_eq!(req.path(), "/clients/c42");
        assert_eq!(req.body().unwrap().as_deref(), Some(r#"{"status":"Call Again"}"#));
    }

    #[test]
    fn test_create_task_validates_before_sending() {
        let draft = NewTask::default();
        assert!(draft.check_input().is_err());
        assert_eq!(draft.path(), "/tasks");
    }
}
