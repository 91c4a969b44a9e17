//! HTTP 请求封装模块
//!
//! 使用 `web_sys::fetch` 替代 `gloo-net`，实现 `HttpClient`。
//! 每个请求都带超时：到时通过 `AbortController` 中止。

use super::timer::Timeout;
use crate::request::{HttpClient, HttpRequest, HttpResponse, TransportError};
use std::time::Duration;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

/// 基于 `window.fetch` 的 HTTP 客户端
#[derive(Debug, Clone, Copy)]
pub struct FetchClient {
    timeout_ms: u32,
}

impl FetchClient {
    pub fn new(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }

    fn build(req: &HttpRequest, controller: &AbortController) -> Result<Request, TransportError> {
        let headers = Headers::new()
            .map_err(|e| TransportError::RequestBuild(format!("创建 Headers 失败: {:?}", e)))?;

        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| TransportError::RequestBuild(format!("设置 Header 失败: {:?}", e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));

        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| TransportError::RequestBuild(format!("{:?}", e)))
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller = AbortController::new()
            .map_err(|e| TransportError::RequestBuild(format!("{:?}", e)))?;
        let request = Self::build(&req, &controller)?;

        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("无法获取 window 对象".to_string()))?;

        let abort = controller.clone();
        let timer = Timeout::once(Duration::from_millis(self.timeout_ms.into()), move || {
            abort.abort();
        });

        let result = JsFuture::from(window.fetch_with_request(&request)).await;
        if let Some(timer) = timer {
            timer.cancel();
        }

        let resp_value = result.map_err(|e| {
            if controller.signal().aborted() {
                TransportError::Timeout(self.timeout_ms)
            } else {
                TransportError::Network(format!("{:?}", e))
            }
        })?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| TransportError::ResponseRead(format!("Response 类型转换失败: {:?}", e)))?;

        let status = response.status();
        let promise = response
            .text()
            .map_err(|e| TransportError::ResponseRead(format!("{:?}", e)))?;
        let body = JsFuture::from(promise)
            .await
            .map_err(|e| TransportError::ResponseRead(format!("{:?}", e)))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}
