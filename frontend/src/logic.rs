//! 页面视图模型
//!
//! 页面组件只负责渲染和发起请求，列表过滤、分页、乐观更新等状态变换都在这里，
//! 与浏览器无关，可以直接在本地测试。

mod clients;
mod contact;
mod fetch;
mod navigator;
mod search;
mod tasks;

pub use clients::ClientTable;
pub use contact::{ContactError, dial_link, email_compose_link, whatsapp_link};
pub use fetch::FetchState;
pub use navigator::RecordNavigator;
pub use search::HeaderSearch;
pub use tasks::{TaskBoard, TaskFilters};
