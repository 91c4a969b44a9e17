use super::{ApiRequest, HttpMethod, MessageResponse, json_body};
use crate::report::UserStats;
use crate::user::{Role, User, UserPatch};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

// =========================================================
// Own profile
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct GetProfile;

impl ApiRequest for GetProfile {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/users/profile".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub patch: UserPatch,
}

impl ApiRequest for UpdateProfile {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        "/users/profile".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.patch)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.patch.validate()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GetUserStats;

impl ApiRequest for GetUserStats {
    type Response = UserStats;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/users/stats".to_string()
    }
}

/// Profile picture as a data URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadProfilePicture {
    #[validate(custom(function = "crate::form::not_blank", message = "Please choose an image"))]
    pub profile_picture: String,
}

impl ApiRequest for UploadProfilePicture {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/users/profile-picture".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "passwords_differ", skip_on_field_errors = true))]
pub struct ChangePassword {
    #[validate(custom(function = "crate::form::not_blank", message = "Please enter your current password"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}

fn passwords_differ(req: &ChangePassword) -> Result<(), validator::ValidationError> {
    if req.current_password == req.new_password {
        let mut err = validator::ValidationError::new("unchanged");
        err.message = Some("New password must differ from the current one".into());
        return Err(err);
    }
    Ok(())
}

impl ApiRequest for ChangePassword {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        "/users/change-password".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

// =========================================================
// Team administration
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct ListUsers;

impl ApiRequest for ListUsers {
    type Response = Vec<User>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/users".to_string()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[validate(custom(function = "crate::form::not_blank", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "crate::form::not_blank", message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
}

impl ApiRequest for NewUser {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/users".to_string()
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(self)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.validate()
    }
}

#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub id: String,
    pub patch: UserPatch,
}

impl ApiRequest for UpdateUser {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("/users/{}", self.id)
    }

    fn body(&self) -> Result<Option<String>, serde_json::Error> {
        json_body(&self.patch)
    }

    fn check_input(&self) -> Result<(), ValidationErrors> {
        self.patch.validate()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteUser {
    pub id: String,
}

impl ApiRequest for DeleteUser {
    type Response = MessageResponse;
    const METHOD: HttpMethod = HttpMethod::Delete;

    fn path(&self) -> String {
        format!("/users/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::first_message;

    #[test]
    fn test_change_password_rules() {
        let short = ChangePassword {
            current_password: "old-secret".into(),
            new_password: "short".into(),
        };
        assert_eq!(
            first_message(&short.check_input().unwrap_err()),
            "New password must be at least 8 characters"
        );

        let same = ChangePassword {
            current_password: "same-secret".into(),
            new_password: "same-secret".into(),
        };
        assert_eq!(
            first_message(&same.check_input().unwrap_err()),
            "New password must differ from the current one"
        );
    }

    #[test]
    fn test_profile_update_body_is_partial() {
        let req = UpdateProfile {
            patch: UserPatch {
                bio: Some("Closer".into()),
                ..Default::default()
            },
        };
        assert_eq!(req.body().unwrap().as_deref(), Some(r#"{"bio":"Closer"}"#));
        assert!(req.check_input().is_ok());
    }
}
