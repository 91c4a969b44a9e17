use crate::person::PersonRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

// =========================================================
// 线索状态与来源渠道 (Lead Status & Campaign)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeadStatus {
    #[default]
    #[serde(rename = "New Lead")]
    NewLead,
    #[serde(rename = "Call Again")]
    CallAgain,
    #[serde(rename = "No Answer")]
    NoAnswer,
    #[serde(rename = "Not Interested")]
    NotInterested,
    #[serde(rename = "FTD")]
    Ftd,
    #[serde(rename = "Callback")]
    Callback,
    #[serde(rename = "Wrong Number")]
    WrongNumber,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::NewLead,
        LeadStatus::CallAgain,
        LeadStatus::NoAnswer,
        LeadStatus::NotInterested,
        LeadStatus::Ftd,
        LeadStatus::Callback,
        LeadStatus::WrongNumber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::NewLead => "New Lead",
            LeadStatus::CallAgain => "Call Again",
            LeadStatus::NoAnswer => "No Answer",
            LeadStatus::NotInterested => "Not Interested",
            LeadStatus::Ftd => "FTD",
            LeadStatus::Callback => "Callback",
            LeadStatus::WrongNumber => "Wrong Number",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown lead status: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Campaign {
    Facebook,
    Google,
    Instagram,
    TikTok,
    Email,
    Referral,
    Organic,
}

impl Campaign {
    pub const ALL: [Campaign; 7] = [
        Campaign::Facebook,
        Campaign::Google,
        Campaign::Instagram,
        Campaign::TikTok,
        Campaign::Email,
        Campaign::Referral,
        Campaign::Organic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Campaign::Facebook => "Facebook",
            Campaign::Google => "Google",
            Campaign::Instagram => "Instagram",
            Campaign::TikTok => "TikTok",
            Campaign::Email => "Email",
            Campaign::Referral => "Referral",
            Campaign::Organic => "Organic",
        }
    }
}

impl FromStr for Campaign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Campaign::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown campaign: {s}"))
    }
}

// =========================================================
// 客户与备注 (Clients & Notes)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<PersonRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// 客户（线索）记录
///
/// 非管理员视角下后端会隐藏电话与邮箱，因此这两个字段允许缺省。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<PersonRef>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Client {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn initials(&self) -> String {
        crate::user::initials(&self.first_name, &self.last_name)
    }

    /// 表格中展示的编号，后端未生成业务编号时退回数据库 id
    pub fn display_id(&self) -> &str {
        if self.client_id.is_empty() {
            &self.id
        } else {
            &self.client_id
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(custom(function = "crate::form::not_blank", message = "First name is required"))]
    pub first_name: String,
    #[validate(custom(function = "crate::form::not_blank", message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(custom(function = "crate::form::not_blank", message = "Phone number is required"))]
    pub phone: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
    /// 指派坐席的用户 id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_agent: Option<String>,
}

impl ClientPatch {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// 本地应用更新（用于乐观更新或接口只返回确认消息时）
    pub fn apply_to(&self, client: &mut Client) {
        if let Some(v) = &self.first_name {
            client.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            client.last_name = v.clone();
        }
        if let Some(v) = &self.email {
            client.email = v.clone();
        }
        if let Some(v) = &self.phone {
            client.phone = v.clone();
        }
        if let Some(v) = &self.country {
            client.country = v.clone();
        }
        if let Some(v) = self.status {
            client.status = v;
        }
        if let Some(v) = self.campaign {
            client.campaign = Some(v);
        }
        if let Some(v) = &self.assigned_agent {
            client.assigned_agent = Some(PersonRef::Id(v.clone()));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
pub struct NewNote {
    #[validate(custom(function = "crate::form::not_blank", message = "Please enter a note"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::first_message;

    #[test]
    fn test_lead_status_wire_names() {
        assert_eq!(serde_json::to_string(&LeadStatus::NewLead).unwrap(), r#""New Lead""#);
        assert_eq!(serde_json::from_str::<LeadStatus>(r#""FTD""#).unwrap(), LeadStatus::Ftd);
        assert!(serde_json::from_str::<LeadStatus>(r#""Hot""#).is_err());
        assert_eq!("Call Again".parse::<LeadStatus>(), Ok(LeadStatus::CallAgain));
    }

    #[test]
    fn test_client_tolerates_hidden_contact_fields() {
        let json = r#"{"_id":"c1","firstName":"Mia","lastName":"Wong","status":"No Answer","assignedAgent":"u9"}"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.phone, "");
        assert_eq!(client.status, LeadStatus::NoAnswer);
        assert_eq!(client.assigned_agent.as_ref().and_then(PersonRef::id), Some("u9"));
        assert_eq!(client.display_id(), "c1");
    }

    #[test]
    fn test_new_note_requires_content() {
        let errors = NewNote { content: "  ".into() }.validate().unwrap_err();
        assert_eq!(first_message(&errors), "Please enter a note");
    }

    #[test]
    fn test_patch_applies_locally() {
        let json = r#"{"_id":"c1","firstName":"Mia","lastName":"Wong"}"#;
        let mut client: Client = serde_json::from_str(json).unwrap();
        ClientPatch::status(LeadStatus::Ftd).apply_to(&mut client);
        assert_eq!(client.status, LeadStatus::Ftd);
        assert_eq!(client.first_name, "Mia");
    }
}
