use super::CrmApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::session::KeyValueStore;
use crmdesk_shared::communication::{InitiateCall, SendEmail, SendMessage};
use crmdesk_shared::protocol::communications::{GetCommunicationStats, ListCommunications};
use crmdesk_shared::{CommunicationRecord, CommunicationStats, ListQuery, Paged};

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub async fn communication_stats(&self) -> ApiResult<CommunicationStats> {
        self.send(&GetCommunicationStats).await
    }

    pub async fn communication_history(&self, query: ListQuery) -> ApiResult<Paged<CommunicationRecord>> {
        self.send(&ListCommunications { query }).await
    }

    pub async fn initiate_call(&self, call: &InitiateCall) -> ApiResult<CommunicationRecord> {
        self.send(call).await
    }

    pub async fn send_message(&self, message: &SendMessage) -> ApiResult<CommunicationRecord> {
        self.send(message).await
    }

    pub async fn send_email(&self, email: &SendEmail) -> ApiResult<CommunicationRecord> {
        self.send(email).await
    }
}
