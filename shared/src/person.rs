use serde::{Deserialize, Serialize};

/// 关联人员：后端有时只返回 id，有时返回展开后的摘要对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonRef {
    Summary(PersonSummary),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonSummary {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PersonRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            PersonRef::Summary(s) => s.id.as_deref(),
            PersonRef::Id(id) => Some(id),
        }
    }

    /// 展示名称；没有姓名时退回 id
    pub fn display_name(&self) -> String {
        match self {
            PersonRef::Summary(s) => {
                let name = format!("{} {}", s.first_name, s.last_name).trim().to_string();
                if name.is_empty() {
                    s.id.clone().unwrap_or_default()
                } else {
                    name
                }
            }
            PersonRef::Id(id) => id.clone(),
        }
    }

    pub fn initials(&self) -> String {
        match self {
            PersonRef::Summary(s) => crate::user::initials(&s.first_name, &s.last_name),
            PersonRef::Id(_) => String::new(),
        }
    }

    pub fn summary(&self) -> Option<&PersonSummary> {
        match self {
            PersonRef::Summary(s) => Some(s),
            PersonRef::Id(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_accepts_id_or_object() {
        let by_id: PersonRef = serde_json::from_str(r#""665a""#).unwrap();
        assert_eq!(by_id.id(), Some("665a"));
        assert_eq!(by_id.display_name(), "665a");

        let expanded: PersonRef =
            serde_json::from_str(r#"{"_id":"665a","firstName":"Jon","lastName":"Snow"}"#).unwrap();
        assert_eq!(expanded.id(), Some("665a"));
        assert_eq!(expanded.display_name(), "Jon Snow");
        assert_eq!(expanded.initials(), "JS");
    }
}
