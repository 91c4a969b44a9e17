use crate::person::{PersonRef, PersonSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// =========================================================
// 角色与用户 (Roles & Users)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    #[default]
    Agent,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Agent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Agent => "agent",
        }
    }

    /// 界面上展示的角色名
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Manager => "Manager",
            Role::Agent => "Agent",
        }
    }
}

/// 当前登录用户 / 团队成员
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn initials(&self) -> String {
        initials(&self.first_name, &self.last_name)
    }

    /// 作为客户的指派坐席等关联字段展示时使用
    pub fn person_ref(&self) -> PersonRef {
        PersonRef::Summary(PersonSummary {
            id: Some(self.id.clone()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: Some(self.email.clone()),
            ..Default::default()
        })
    }

    /// 合并局部更新，未提供的字段保持原值
    pub fn merge(&mut self, patch: UserPatch) {
        let UserPatch {
            first_name,
            last_name,
            email,
            phone,
            bio,
            profile_picture,
            role,
        } = patch;
        if let Some(v) = first_name {
            self.first_name = v;
        }
        if let Some(v) = last_name {
            self.last_name = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(v) = role {
            self.role = v;
        }
        if phone.is_some() {
            self.phone = phone;
        }
        if bio.is_some() {
            self.bio = bio;
        }
        if profile_picture.is_some() {
            self.profile_picture = profile_picture;
        }
    }
}

/// 用户资料的局部更新
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::form::not_blank", message = "First name is required"))]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::form::not_blank", message = "Last name is required"))]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        *self == UserPatch::default()
    }
}

pub(crate) fn initials(first: &str, last: &str) -> String {
    first
        .chars()
        .next()
        .into_iter()
        .chain(last.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

// =========================================================
// 权限判断 (Access)
// =========================================================

/// 基于角色的功能开关，未登录时一律为 false
pub mod access {
    use super::{Role, User};

    fn role(user: Option<&User>) -> Option<Role> {
        user.map(|u| u.role)
    }

    pub fn is_admin(user: Option<&User>) -> bool {
        role(user) == Some(Role::Admin)
    }

    /// 管理员同样具备坐席能力
    pub fn is_agent(user: Option<&User>) -> bool {
        matches!(role(user), Some(Role::Agent | Role::Admin))
    }

    pub fn can_view_phone_numbers(user: Option<&User>) -> bool {
        is_admin(user)
    }

    pub fn can_view_email_addresses(user: Option<&User>) -> bool {
        is_admin(user)
    }

    pub fn can_view_full_client_details(user: Option<&User>) -> bool {
        is_admin(user)
    }

    pub fn can_export_data(user: Option<&User>) -> bool {
        is_admin(user)
    }

    pub fn can_assign_clients(user: Option<&User>) -> bool {
        is_admin(user)
    }

    pub fn can_manage_users(user: Option<&User>) -> bool {
        is_admin(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            role,
            phone: None,
            bio: None,
            profile_picture: None,
            created_at: None,
        }
    }

    #[test]
    fn test_deserialize_mongo_style_id() {
        let json = r#"{"_id":"64f1","firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","role":"manager"}"#;
        let u: User = serde_json::from_str(json).unwrap();
        assert_eq!(u.id, "64f1");
        assert_eq!(u.role, Role::Manager);
        assert_eq!(u.initials(), "AL");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let json = r#"{"_id":"1","firstName":"A","lastName":"B","email":"a@b.c","role":"owner"}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }

    #[test]
    fn test_merge_keeps_missing_fields() {
        let mut u = user(Role::Agent);
        u.merge(UserPatch {
            first_name: Some("Grace".into()),
            bio: Some("Ops".into()),
            ..Default::default()
        });
        assert_eq!(u.first_name, "Grace");
        assert_eq!(u.last_name, "Lovelace");
        assert_eq!(u.bio.as_deref(), Some("Ops"));
        assert_eq!(u.role, Role::Agent);
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = UserPatch {
            phone: Some("+1 555".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"phone":"+1 555"}"#);
        assert!(UserPatch::default().is_empty());
    }

    #[test]
    fn test_person_ref_carries_id_and_name() {
        let r = user(Role::Agent).person_ref();
        assert_eq!(r.id(), Some("u1"));
        assert_eq!(r.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_access_rules() {
        let admin = user(Role::Admin);
        let manager = user(Role::Manager);
        let agent = user(Role::Agent);

        assert!(access::is_admin(Some(&admin)));
        assert!(access::is_agent(Some(&admin)));
        assert!(access::is_agent(Some(&agent)));
        assert!(!access::is_agent(Some(&manager)));
        assert!(access::can_export_data(Some(&admin)));
        assert!(!access::can_export_data(Some(&agent)));
        assert!(!access::can_assign_clients(Some(&manager)));
        assert!(access::can_view_full_client_details(Some(&admin)));
        assert!(!access::can_view_phone_numbers(Some(&manager)));
        assert!(!access::is_admin(None));
        assert!(!access::is_agent(None));
    }
}
