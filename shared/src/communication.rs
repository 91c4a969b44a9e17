use crate::person::PersonRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// =========================================================
// 沟通记录 (Communications)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationStats {
    #[serde(default)]
    pub total_calls: u64,
    #[serde(default)]
    pub total_messages: u64,
    #[serde(default)]
    pub total_emails: u64,
    #[serde(default)]
    pub active_agents: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationKind {
    Call,
    Message,
    Email,
}

impl CommunicationKind {
    pub fn label(&self) -> &'static str {
        match self {
            CommunicationKind::Call => "Call",
            CommunicationKind::Message => "Message",
            CommunicationKind::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: CommunicationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<PersonRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<PersonRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageChannel {
    #[default]
    #[serde(rename = "whatsapp")]
    WhatsApp,
    Sms,
    Telegram,
}

impl MessageChannel {
    pub const ALL: [MessageChannel; 3] = [
        MessageChannel::WhatsApp,
        MessageChannel::Sms,
        MessageChannel::Telegram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageChannel::WhatsApp => "whatsapp",
            MessageChannel::Sms => "sms",
            MessageChannel::Telegram => "telegram",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MessageChannel::WhatsApp => "WhatsApp",
            MessageChannel::Sms => "SMS",
            MessageChannel::Telegram => "Telegram",
        }
    }
}

// =========================================================
// 外呼 / 消息 / 邮件请求体
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitiateCall {
    #[validate(custom(function = "crate::form::not_blank", message = "Please select a client"))]
    pub client_id: String,
    #[validate(custom(function = "crate::form::not_blank", message = "Client phone number not found"))]
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    #[validate(custom(function = "crate::form::not_blank", message = "Please select a client"))]
    pub client_id: String,
    pub channel: MessageChannel,
    #[validate(custom(function = "crate::form::not_blank", message = "Please enter a message"))]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendEmail {
    #[validate(custom(function = "crate::form::not_blank", message = "Please select a client"))]
    pub client_id: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub to: String,
    #[validate(custom(function = "crate::form::not_blank", message = "Please enter a subject"))]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::first_message;

    #[test]
    fn test_record_uses_type_key() {
        let json = r#"{"_id":"r1","type":"call","client":"c1","summary":"Left voicemail"}"#;
        let record: CommunicationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, CommunicationKind::Call);
        assert_eq!(record.client.as_ref().and_then(PersonRef::id), Some("c1"));
    }

    #[test]
    fn test_send_message_validation() {
        let msg = SendMessage {
            client_id: "c1".into(),
            channel: MessageChannel::Sms,
            content: " ".into(),
        };
        assert_eq!(first_message(&msg.validate().unwrap_err()), "Please enter a message");
        assert_eq!(
            serde_json::to_value(MessageChannel::WhatsApp).unwrap(),
            serde_json::json!("whatsapp")
        );
    }
}
