use crmdesk_shared::{STORAGE_REFRESH_TOKEN_KEY, STORAGE_TOKEN_KEY, Timestamp};
use std::rc::Rc;
use std::sync::Arc;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::HashMap;

use super::token::decode_expiry;

// =========================================================
// 键值存储抽象
// =========================================================

/// 字符串键值存储（浏览器中为 localStorage）
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    /// 写入成功返回 `true`
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> bool {
        (**self).delete(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> bool {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> bool {
        (**self).delete(key)
    }
}

// =========================================================
// 令牌存储
// =========================================================

/// 登录后建立的会话
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// 从访问令牌的 `exp` 解析，无法解析时为 `None`
    pub expires_at: Option<Timestamp>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        let access_token = access_token.into();
        let expires_at = decode_expiry(&access_token).ok();
        Self {
            access_token,
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            expires_at,
        }
    }
}

/// 持久化的令牌对，会话管理器是唯一的写入方
#[derive(Debug, Clone)]
pub struct TokenStore<S> {
    store: S,
}

impl<S: KeyValueStore> TokenStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(STORAGE_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store
            .get(STORAGE_REFRESH_TOKEN_KEY)
            .filter(|t| !t.is_empty())
    }

    pub fn load(&self) -> Option<Session> {
        let access = self.access_token()?;
        Some(Session::new(access, self.refresh_token()))
    }

    pub fn save(&self, session: &Session) {
        if !self.store.set(STORAGE_TOKEN_KEY, &session.access_token) {
            tracing::warn!("failed to persist access token");
        }
        match &session.refresh_token {
            Some(refresh) => {
                if !self.store.set(STORAGE_REFRESH_TOKEN_KEY, refresh) {
                    tracing::warn!("failed to persist refresh token");
                }
            }
            None => {
                self.store.delete(STORAGE_REFRESH_TOKEN_KEY);
            }
        }
    }

    pub fn clear(&self) {
        self.store.delete(STORAGE_TOKEN_KEY);
        self.store.delete(STORAGE_REFRESH_TOKEN_KEY);
    }
}

/// 变更的键是否属于令牌对（用于过滤跨标签页的 storage 事件）
pub fn is_token_key(key: &str) -> bool {
    key == STORAGE_TOKEN_KEY || key == STORAGE_REFRESH_TOKEN_KEY
}

// =========================================================
// 测试工具: MemoryStore
// =========================================================

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (k, v) in entries {
            store.set(k, v);
        }
        store
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.values.borrow_mut().remove(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::test_jwt;

    #[test]
    fn test_save_and_load_pair() {
        let tokens = TokenStore::new(MemoryStore::new());
        let access = test_jwt(2_000_000_000);
        tokens.save(&Session::new(access.clone(), Some("r-1".into())));

        let session = tokens.load().unwrap();
        assert_eq!(session.access_token, access);
        assert_eq!(session.refresh_token.as_deref(), Some("r-1"));
        assert_eq!(session.expires_at, Some(Timestamp::from_secs(2_000_000_000)));
    }

    #[test]
    fn test_save_without_refresh_drops_stale_one() {
        let tokens = TokenStore::new(MemoryStore::with(&[("refreshToken", "old")]));
        tokens.save(&Session::new("opaque", None));
        assert_eq!(tokens.refresh_token(), None);
        assert_eq!(tokens.load().unwrap().expires_at, None);
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let store = Rc::new(MemoryStore::with(&[("token", "a"), ("refreshToken", "b")]));
        let tokens = TokenStore::new(store.clone());
        tokens.clear();
        assert!(store.is_empty());
        assert!(tokens.load().is_none());
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let tokens = TokenStore::new(MemoryStore::with(&[("token", "")]));
        assert!(tokens.access_token().is_none());
        assert!(is_token_key("refreshToken"));
        assert!(!is_token_key("theme"));
    }
}
