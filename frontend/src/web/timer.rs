//! 定时器封装模块
//!
//! 使用 `web_sys` 的原生 `setTimeout` 替代 `gloo-timers`。

use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// `setTimeout` 能接受的最大延迟（约 24.8 天），超过会立即触发
const MAX_DELAY_MS: u128 = i32::MAX as u128;

/// 一次性定时器句柄
///
/// 只保存句柄，可以放进 `Mutex` 跨线程类型中。
/// 回调在触发后由 JS 侧释放；被取消的回调不会被回收。
#[derive(Debug)]
pub struct Timeout {
    handle: i32,
}

impl Timeout {
    /// 在 `delay` 之后执行一次 `callback`，延迟会被截断到浏览器上限
    pub fn once<F>(delay: Duration, callback: F) -> Option<Self>
    where
        F: FnOnce() + 'static,
    {
        let millis = delay.as_millis().min(MAX_DELAY_MS) as i32;
        let closure = Closure::once_into_js(callback);
        let window = web_sys::window()?;

        match window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), millis)
        {
            Ok(handle) => Some(Self { handle }),
            Err(err) => {
                tracing::error!(error = ?err, "setTimeout failed");
                None
            }
        }
    }

    /// 取消尚未触发的定时器
    pub fn cancel(self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}
