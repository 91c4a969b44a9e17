//! 会话运行时的浏览器实现
//!
//! - 刷新任务：`setTimeout` + `spawn_local`
//! - 跨标签页同步：`storage` 事件（只在其他标签页修改时触发）

use super::timer::Timeout;
use crate::session::{Clock, LocalTask, SessionRuntime, is_token_key};
use crmdesk_shared::Timestamp;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

#[derive(Debug, Default)]
pub struct BrowserRuntime {
    pending: Mutex<Option<Timeout>>,
}

impl BrowserRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_pending(&self) -> Option<Timeout> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl SessionRuntime for BrowserRuntime {
    fn schedule(&self, delay: Duration, task: LocalTask) {
        if let Some(previous) = self.take_pending() {
            previous.cancel();
        }
        let timeout = Timeout::once(delay, move || spawn_local(task));
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = timeout;
    }

    fn cancel(&self) {
        if let Some(pending) = self.take_pending() {
            pending.cancel();
        }
    }

    fn watch_tokens(&self, on_change: Box<dyn Fn()>) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window, cross-tab token sync disabled");
            return;
        };

        let closure = Closure::<dyn Fn(web_sys::StorageEvent)>::new(move |ev: web_sys::StorageEvent| {
            // key 为空表示整个存储被清空
            let relevant = ev
                .key()
                .is_none_or(|key| is_token_key(&key));
            if relevant {
                on_change();
            }
        });

        if let Err(err) =
            window.add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref())
        {
            tracing::error!(error = ?err, "failed to listen for storage events");
        }

        // 泄漏闭包以保持监听器存活（整个页面生命周期只注册一次）
        closure.forget();
    }
}

/// `Date.now()`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(js_sys::Date::now() as i64)
    }
}
