//! CRM REST API 客户端
//!
//! 每个调用：
//! 1. 本地校验输入，失败时不发请求
//! 2. 存在访问令牌时附带 `Authorization: Bearer <token>`
//! 3. 非 2xx 转换为携带服务端 `message`（或通用文案）的错误
//! 4. 解析响应并做结构校验，不合格的数据不会交给页面
//!
//! 不做重试、缓存或请求合并。

mod auth;
mod clients;
mod communications;
mod reports;
mod tasks;
mod users;

use crate::error::{ApiError, ApiResult};
use crate::request::{HttpClient, HttpMethod, HttpRequest};
use crate::session::{KeyValueStore, TokenStore};
use crmdesk_shared::protocol::ApiRequest;
use crmdesk_shared::{HEADER_AUTHORIZATION, Schema};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct CrmApi<H, S> {
    base_url: String,
    http: H,
    tokens: TokenStore<S>,
}

impl<H: HttpClient, S: KeyValueStore> CrmApi<H, S> {
    pub fn new(base_url: &str, http: H, tokens: TokenStore<S>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenStore<S> {
        &self.tokens
    }

    fn url(&self, path: &str, query: Option<&str>) -> String {
        match query {
            Some(q) if !q.is_empty() => format!("{}{}?{}", self.base_url, path, q),
            _ => format!("{}{}", self.base_url, path),
        }
    }

    fn authorize(&self, req: HttpRequest) -> HttpRequest {
        match self.tokens.access_token() {
            Some(token) => req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {token}")),
            None => req,
        }
    }

    /// 发送一个类型化请求
    pub async fn send<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        req.check_input()
            .map_err(|errors| ApiError::from_validation(&errors))?;

        if R::AUTHENTICATED && self.tokens.access_token().is_none() {
            return Err(ApiError::not_authenticated());
        }

        let path = req.path();
        let mut http_req = HttpRequest::new(self.url(&path, req.query().as_deref()), R::METHOD)
            .with_header("Content-Type", "application/json");
        http_req = self.authorize(http_req);
        if let Some(body) = req
            .body()
            .map_err(|e| ApiError::Validation(format!("Could not encode request: {e}")))?
        {
            http_req = http_req.with_body(body);
        }

        let res = self.http.send(http_req).await.map_err(|err| {
            tracing::error!(method = R::METHOD.as_str(), %path, error = %err, "request did not reach the server");
            ApiError::from(err)
        })?;

        if !res.ok() {
            let err = ApiError::from_response(res.status, &res.body, R::FAILURE_MESSAGE);
            tracing::warn!(
                method = R::METHOD.as_str(),
                %path,
                status = res.status,
                code = err.error_code(),
                "request rejected: {err}"
            );
            return Err(err);
        }

        decode::<R::Response>(&res.body).inspect_err(|err| {
            tracing::error!(method = R::METHOD.as_str(), %path, error = ?err, "response failed validation");
        })
    }

    /// 以纯文本获取资源（文件导出）
    pub async fn fetch_text(&self, path: &str, query: Option<&str>) -> ApiResult<String> {
        if self.tokens.access_token().is_none() {
            return Err(ApiError::not_authenticated());
        }
        let req = self.authorize(HttpRequest::new(self.url(path, query), HttpMethod::Get));
        let res = self.http.send(req).await?;
        if !res.ok() {
            return Err(ApiError::from_response(
                res.status,
                &res.body,
                crmdesk_shared::protocol::DEFAULT_FAILURE_MESSAGE,
            ));
        }
        Ok(res.body)
    }
}

/// 空响应体按 `null` 解析；不接受 `null` 的确认类响应再按 `{}` 解析
fn decode<T: DeserializeOwned + Schema>(body: &str) -> ApiResult<T> {
    let value: T = if body.trim().is_empty() {
        serde_json::from_str("null")
            .or_else(|_| serde_json::from_str("{}"))
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?
    } else {
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?
    };
    value.check()?;
    Ok(value)
}

#[cfg(test)]
mod tests;
