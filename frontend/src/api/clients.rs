use super::CrmApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::session::KeyValueStore;
use crmdesk_shared::protocol::MessageResponse;
use crmdesk_shared::protocol::clients::{
    AddNote, AssignClients, DeleteClient, DeleteNote, ExportClients, GetClient, ListAgents,
    ListClients, ListCountries, SearchClients, UpdateClient,
};
use crmdesk_shared::{Client, ClientPatch, ListQuery, NewClient, NewNote, Note, Paged, User};

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub async fn list_clients(&self, query: ListQuery) -> ApiResult<Paged<Client>> {
        self.send(&ListClients { query }).await
    }

    pub async fn get_client(&self, id: &str) -> ApiResult<Client> {
        self.send(&GetClient { id: id.to_string() }).await
    }

    pub async fn client_countries(&self) -> ApiResult<Vec<String>> {
        self.send(&ListCountries).await
    }

    pub async fn client_agents(&self) -> ApiResult<Vec<User>> {
        self.send(&ListAgents).await
    }

    pub async fn create_client(&self, client: &NewClient) -> ApiResult<Client> {
        self.send(client).await
    }

    pub async fn update_client(&self, id: &str, patch: ClientPatch) -> ApiResult<Client> {
        self.send(&UpdateClient {
            id: id.to_string(),
            patch,
        })
        .await
    }

    pub async fn delete_client(&self, id: &str) -> ApiResult<MessageResponse> {
        self.send(&DeleteClient { id: id.to_string() }).await
    }

    pub async fn assign_clients(&self, client_ids: Vec<String>, agent_id: &str) -> ApiResult<MessageResponse> {
        self.send(&AssignClients {
            client_ids,
            agent_id: agent_id.to_string(),
        })
        .await
    }

    pub async fn search_clients(&self, q: &str) -> ApiResult<Vec<Client>> {
        self.send(&SearchClients { q: q.trim().to_string() }).await
    }

    /// 导出文件的原始文本
    pub async fn export_clients(&self, export: ExportClients) -> ApiResult<String> {
        self.fetch_text(ExportClients::PATH, export.query().as_deref())
            .await
    }

    pub async fn add_note(&self, client_id: &str, content: &str) -> ApiResult<Note> {
        self.send(&AddNote {
            client_id: client_id.to_string(),
            note: NewNote {
                content: content.trim().to_string(),
            },
        })
        .await
    }

    pub async fn delete_note(&self, client_id: &str, note_id: &str) -> ApiResult<MessageResponse> {
        self.send(&DeleteNote {
            client_id: client_id.to_string(),
            note_id: note_id.to_string(),
        })
        .await
    }
}
