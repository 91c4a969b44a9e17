use super::{ApiRequest, HttpMethod, MessageResponse, json_body};
use crate::user::{Role, User};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// Sign in with email and password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Login {
    #[validate(custom(function = "crate::form::not_blank", message = "Please fill in all fields"))]
    pub email: String,
    #[validate(custom(function = "crate::form::not_blank", message = "Please fill in all fields"))]
    pub password: String,
}

/// Login payload: the user fields plus the token pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl LoginResponse {
    pub fn user(&self) -> User {
        User {
            id: self.id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            role: self.role,
            phone: None,
            bio: None,
            profile_picture: None,
            created_at: None,
        }
    }
}

impl ApiRequest for Login {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const FAILURE_MESSAGE: &'static str = "Login failed";
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/auth/login".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

/// Load the signed-in user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Me;

impl ApiRequest for Me {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/auth/me".to_string()
    }
}

/// Exchange a refresh token for a new token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

impl ApiRequest for RefreshToken {
    type Response = TokenPair;
    const METHOD: HttpMethod = HttpMethod::Post;
    const FAILURE_MESSAGE: &'static str = "Token refresh failed";
    const AUTHENTICATED: bool = false;

    fn path(&self) -> String {
        "/auth/refresh".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }
}

/// Invalidate the session server-side.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logout;

impl ApiRequest for Logout {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/logout".to_string()
    }
}
