//! 分页包装与列表查询参数

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 当前页，从 1 开始
    #[serde(default)]
    pub current: u32,
    /// 总页数
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub has_prev: bool,
    #[serde(default)]
    pub has_next: bool,
}

impl Pagination {
    pub fn next_page(&self) -> Option<u32> {
        self.has_next.then(|| self.current + 1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        (self.has_prev && self.current > 1).then(|| self.current - 1)
    }
}

/// 分页列表响应
///
/// 后端不同资源使用不同的键名承载列表（`clients` / `tasks` / ...），统一收敛到 `items`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(
        alias = "clients",
        alias = "tasks",
        alias = "users",
        alias = "records",
        alias = "communications"
    )]
    pub items: Vec<T>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// 列表查询参数，未设置的字段不会出现在查询串中
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl ListQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
            ..Default::default()
        }
    }

    /// 一次取回全部记录（用于本地上一条/下一条导航）
    pub fn full_list() -> Self {
        Self {
            limit: Some(crate::FULL_LIST_LIMIT),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// 空白搜索词等同于不搜索
    pub fn with_search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    /// 编码为查询串（不含 `?`），没有任何参数时返回 `None`
    pub fn encode(&self) -> Option<String> {
        serde_urlencoded::to_string(self)
            .ok()
            .filter(|q| !q.is_empty())
    }
}
