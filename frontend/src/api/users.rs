use super::CrmApi;
use crate::error::ApiResult;
use crate::request::HttpClient;
use crate::session::KeyValueStore;
use crmdesk_shared::protocol::MessageResponse;
use crmdesk_shared::protocol::users::{
    ChangePassword, DeleteUser, GetProfile, GetUserStats, ListUsers, NewUser, UpdateProfile,
    UpdateUser, UploadProfilePicture,
};
use crmdesk_shared::{User, UserPatch, UserStats};

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub async fn profile(&self) -> ApiResult<User> {
        self.send(&GetProfile).await
    }

    pub async fn update_profile(&self, patch: UserPatch) -> ApiResult<User> {
        self.send(&UpdateProfile { patch }).await
    }

    pub async fn user_stats(&self) -> ApiResult<UserStats> {
        self.send(&GetUserStats).await
    }

    pub async fn upload_profile_picture(&self, data_url: String) -> ApiResult<User> {
        self.send(&UploadProfilePicture {
            profile_picture: data_url,
        })
        .await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ApiResult<MessageResponse> {
        self.send(&ChangePassword {
            current_password: current.to_string(),
            new_password: new.to_string(),
        })
        .await
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.send(&ListUsers).await
    }

    pub async fn create_user(&self, user: &NewUser) -> ApiResult<User> {
        self.send(user).await
    }

    pub async fn update_user(&self, id: &str, patch: UserPatch) -> ApiResult<User> {
        self.send(&UpdateUser {
            id: id.to_string(),
            patch,
        })
        .await
    }

    pub async fn delete_user(&self, id: &str) -> ApiResult<MessageResponse> {
        self.send(&DeleteUser { id: id.to_string() }).await
    }
}
