//! 会话管理
//!
//! - `store`: 令牌持久化（`token` / `refreshToken` 两个键）
//! - `token`: JWT 过期时间解析与刷新计划
//! - `runtime`: 定时器与跨标签页监听的抽象
//! - `manager`: 会话生命周期（初始化、定时刷新、清理、登出）

mod manager;
mod runtime;
mod store;
mod token;

pub use manager::{ExpiryHook, SessionManager};
pub use runtime::{Clock, LocalTask, SessionRuntime};
pub use store::{KeyValueStore, Session, TokenStore, is_token_key};
pub use token::{RefreshPlan, TokenError, decode_expiry};

#[cfg(test)]
pub use runtime::{ManualClock, ManualRuntime};
#[cfg(test)]
pub use store::MemoryStore;
#[cfg(test)]
pub use token::test_jwt;
