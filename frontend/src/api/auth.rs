use super::CrmApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::session::KeyValueStore;
use crmdesk_shared::User;
use crmdesk_shared::protocol::MessageResponse;
use crmdesk_shared::protocol::auth::{Login, LoginResponse, Logout, Me, RefreshToken, TokenPair};

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.send(&Login {
            email: email.trim().to_string(),
            password: password.to_string(),
        })
        .await
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        self.send(&Me).await
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> ApiResult<TokenPair> {
        self.send(&RefreshToken {
            refresh_token: refresh_token.to_string(),
        })
        .await
    }

    pub async fn logout(&self) -> ApiResult<MessageResponse> {
        self.send(&Logout).await
    }
}
