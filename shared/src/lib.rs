//! CRM Desk 前后端共享类型
//!
//! 领域模型、分页包装、接口协议与响应校验都定义在这里，
//! 前端只通过这些类型与 REST 后端交互。

pub mod client;
pub mod communication;
pub mod date;
pub mod form;
pub mod page;
pub mod person;
pub mod protocol;
pub mod report;
pub mod schema;
pub mod task;
pub mod user;

pub use client::{Campaign, Client, ClientPatch, LeadStatus, NewClient, NewNote, Note};
pub use communication::{CommunicationKind, CommunicationRecord, CommunicationStats, MessageChannel};
pub use date::Timestamp;
pub use page::{ListQuery, Paged, Pagination};
pub use person::{PersonRef, PersonSummary};
pub use report::{Analytics, DashboardStats, ReportPeriod, UserStats};
pub use schema::{Schema, SchemaError};
pub use task::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
pub use user::{Role, User, UserPatch};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 访问令牌在本地存储中的键名
pub const STORAGE_TOKEN_KEY: &str = "token";
/// 刷新令牌在本地存储中的键名
pub const STORAGE_REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const DEFAULT_API_BASE: &str = "/api";
/// "全量"列表请求使用的分页上限
pub const FULL_LIST_LIMIT: u32 = 1000;
