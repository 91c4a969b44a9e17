//! 响应结构校验
//!
//! JSON 能解析并不代表数据可用。每个响应类型都实现 `Schema`，
//! 由 API 客户端在把数据交给页面之前统一检查。

use crate::client::{Client, Note};
use crate::communication::{CommunicationRecord, CommunicationStats};
use crate::page::{Paged, Pagination};
use crate::protocol::MessageResponse;
use crate::protocol::auth::{LoginResponse, TokenPair};
use crate::protocol::clients::ImportSummary;
use crate::report::{AgentPerformance, Analytics, DashboardStats, UserStats};
use crate::task::Task;
use crate::user::User;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("{entity} is missing `{field}`")]
    Missing {
        entity: &'static str,
        field: &'static str,
    },
    #[error("{entity} has invalid `{field}`: {reason}")]
    Invalid {
        entity: &'static str,
        field: &'static str,
        reason: String,
    },
}

pub trait Schema {
    fn check(&self) -> Result<(), SchemaError>;
}

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::Missing { entity, field });
    }
    Ok(())
}

fn require_email(entity: &'static str, value: &str) -> Result<(), SchemaError> {
    require(entity, "email", value)?;
    if !value.contains('@') {
        return Err(SchemaError::Invalid {
            entity,
            field: "email",
            reason: format!("`{value}` is not an email address"),
        });
    }
    Ok(())
}

// =========================================================
// 容器类型
// =========================================================

impl<T: Schema> Schema for Vec<T> {
    fn check(&self) -> Result<(), SchemaError> {
        self.iter().try_for_each(Schema::check)
    }
}

impl<T: Schema> Schema for Option<T> {
    fn check(&self) -> Result<(), SchemaError> {
        self.as_ref().map_or(Ok(()), Schema::check)
    }
}

impl Schema for Pagination {
    fn check(&self) -> Result<(), SchemaError> {
        if self.total > 0 && self.current > self.total {
            return Err(SchemaError::Invalid {
                entity: "pagination",
                field: "current",
                reason: format!("page {} of {}", self.current, self.total),
            });
        }
        Ok(())
    }
}

impl<T: Schema> Schema for Paged<T> {
    fn check(&self) -> Result<(), SchemaError> {
        self.pagination.check()?;
        self.items.check()
    }
}

/// 没有结构约束的响应
macro_rules! unconstrained {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn check(&self) -> Result<(), SchemaError> {
                    Ok(())
                }
            }
        )*
    };
}

unconstrained!(
    (),
    String,
    MessageResponse,
    DashboardStats,
    Analytics,
    UserStats,
    CommunicationStats,
    ImportSummary,
);

// =========================================================
// 领域实体
// =========================================================

impl Schema for User {
    fn check(&self) -> Result<(), SchemaError> {
        require("user", "_id", &self.id)?;
        require_email("user", &self.email)
    }
}

impl Schema for Client {
    fn check(&self) -> Result<(), SchemaError> {
        require("client", "_id", &self.id)?;
        self.notes.check()
    }
}

impl Schema for Note {
    fn check(&self) -> Result<(), SchemaError> {
        require("note", "_id", &self.id)
    }
}

impl Schema for Task {
    fn check(&self) -> Result<(), SchemaError> {
        require("task", "_id", &self.id)?;
        require("task", "title", &self.title)
    }
}

impl Schema for CommunicationRecord {
    fn check(&self) -> Result<(), SchemaError> {
        require("communication", "_id", &self.id)
    }
}

impl Schema for AgentPerformance {
    fn check(&self) -> Result<(), SchemaError> {
        match self.agent.id() {
            Some(id) => require("agent report", "agent", id),
            None => Err(SchemaError::Missing {
                entity: "agent report",
                field: "agent",
            }),
        }
    }
}

impl Schema for LoginResponse {
    fn check(&self) -> Result<(), SchemaError> {
        require("login response", "_id", &self.id)?;
        require_email("login response", &self.email)?;
        require("login response", "token", &self.token)
    }
}

impl Schema for TokenPair {
    fn check(&self) -> Result<(), SchemaError> {
        require("token refresh", "token", &self.token)?;
        require("token refresh", "refreshToken", &self.refresh_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_without_email_is_rejected() {
        let json = r#"{"_id":"u1","firstName":"A","lastName":"B","email":"nobody","role":"agent"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(matches!(
            user.check(),
            Err(SchemaError::Invalid { field: "email", .. })
        ));
    }

    #[test]
    fn test_paged_checks_every_item() {
        let json = r#"{"tasks":[{"_id":"t1","title":"ok"},{"_id":"","title":"bad"}]}"#;
        let page: Paged<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(
            page.check(),
            Err(SchemaError::Missing {
                entity: "task",
                field: "_id"
            })
        );
    }

    #[test]
    fn test_pagination_bounds() {
        let bad = Pagination {
            current: 5,
            total: 2,
            has_prev: true,
            has_next: false,
        };
        assert!(bad.check().is_err());
        assert!(Pagination::default().check().is_ok());
    }

    #[test]
    fn test_token_pair_requires_both_tokens() {
        let pair = TokenPair {
            token: "abc".into(),
            refresh_token: String::new(),
        };
        assert!(pair.check().is_err());
    }
}
