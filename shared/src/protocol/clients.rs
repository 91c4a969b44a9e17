use super::{ApiRequest, HttpMethod, MessageResponse, json_body};
use crate::client::{Client, ClientPatch, NewClient, NewNote, Note};
use crate::page::{ListQuery, Paged};
use crate::user::User;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

// =========================================================
// Queries
// =========================================================

/// Filtered, paginated client list.
#[derive(Debug, Clone, Default)]
pub struct ListClients {
    pub query: ListQuery,
}

impl ApiRequest for ListClients {
    type Response = Paged<Client>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/clients".to_string()
    }

    fn query(&self) -> Option<String> {
        self.query.encode()
    }
}

#[derive(Debug, Clone)]
pub struct GetClient {
    pub id: String,
}

impl ApiRequest for GetClient {
    type Response = Client;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/clients/{}", self.id)
    }
}

/// Countries present in the client base, for the filter dropdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCountries;

impl ApiRequest for ListCountries {
    type Response = Vec<String>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/clients/countries".to_string()
    }
}

/// Agents that clients can be assigned to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAgents;

impl ApiRequest for ListAgents {
    type Response = Vec<User>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/clients/agents".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchClients {
    pub q: String,
}

impl ApiRequest for SearchClients {
    type Response = Vec<Client>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/clients/search".to_string()
    }

    fn query(&self) -> Option<String> {
        serde_urlencoded::to_string(self).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
        }
    }
}

/// Export is a file download, not JSON, so it is fetched as raw text and
/// does not implement [`ApiRequest`].
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExportClients {
    pub format: ExportFormat,
}

impl ExportClients {
    pub const PATH: &'static str = "/clients/export";

    pub fn query(&self) -> Option<String> {
        serde_urlencoded::to_string(self).ok()
    }

    pub fn file_name(&self) -> String {
        format!("clients.{}", self.format.extension())
    }
}

// =========================================================
// Mutations
// =========================================================

impl ApiRequest for NewClient {
    type Response = Client;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/clients".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateClient {
    pub id: String,
    pub patch: ClientPatch,
}

impl ApiRequest for UpdateClient {
    type Response = Client;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/clients/{}", self.id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.patch)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.patch.validate()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteClient {
    pub id: String,
}

impl ApiRequest for DeleteClient {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/clients/{}", self.id)
    }
}

/// Bulk-assign clients to an agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignClients {
    #[validate(length(min = 1, message = "Please select at least one client"))]
    pub client_ids: Vec<String>,
    #[validate(custom(function = "crate::form::not_blank", message = "Please select an agent"))]
    pub agent_id: String,
}

impl ApiRequest for AssignClients {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/clients/assign".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ImportClients {
    #[validate(length(min = 1, message = "Nothing to import"), nested)]
    pub clients: Vec<NewClient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    #[serde(default)]
    pub imported: u32,
    #[serde(default)]
    pub skipped: u32,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ApiRequest for ImportClients {
    type Response = ImportSummary;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/clients/import".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

// =========================================================
// Notes
// =========================================================

#[derive(Debug, Clone)]
pub struct AddNote {
    pub client_id: String,
    pub note: NewNote,
}

impl ApiRequest for AddNote {
    type Response = Note;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("/clients/{}/notes", self.client_id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.note)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.note.validate()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteNote {
    pub client_id: String,
    pub note_id: String,
}

impl ApiRequest for DeleteNote {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/clients/{}/notes/{}", self.client_id, self.note_id)
    }
}
