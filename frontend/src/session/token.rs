//! JWT 过期时间与刷新计划
//!
//! 只读取未校验的 payload 中的 `exp`，签名由服务端负责。

use crate::config::SessionConfig;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use crmdesk_shared::Timestamp;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is not a three-part JWT")]
    Malformed,
    #[error("token payload is not valid base64url")]
    Encoding,
    #[error("token payload is not valid JSON")]
    Payload,
    #[error("token has no exp claim")]
    MissingExpiry,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

pub fn decode_expiry(token: &str) -> Result<Timestamp, TokenError> {
    let mut parts = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenError::Encoding)?;
    let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| TokenError::Payload)?;

    claims
        .exp
        .map(Timestamp::from_secs)
        .ok_or(TokenError::MissingExpiry)
}

/// 下一次刷新该在何时发生
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPlan {
    /// 已过期，立即刷新
    Now,
    After(Duration),
    /// 令牌无法解析，只能强制登出
    Invalid,
}

impl RefreshPlan {
    pub fn for_token(token: &str, now: Timestamp, config: &SessionConfig) -> Self {
        match decode_expiry(token) {
            Ok(expires_at) => Self::for_expiry(expires_at, now, config),
            Err(_) => RefreshPlan::Invalid,
        }
    }

    /// 过期前 `refresh_lead` 刷新；剩余时间不足时在 `refresh_fallback` 后刷新
    pub fn for_expiry(expires_at: Timestamp, now: Timestamp, config: &SessionConfig) -> Self {
        if expires_at <= now {
            return RefreshPlan::Now;
        }
        match (expires_at - now).checked_sub(config.refresh_lead) {
            Some(delay) if !delay.is_zero() => RefreshPlan::After(delay),
            _ => RefreshPlan::After(config.refresh_fallback),
        }
    }
}

/// 构造一个只带 `exp` 的未签名 JWT
#[cfg(test)]
pub fn test_jwt(exp_secs: i64) -> String {
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"u1","exp":{exp_secs}}}"#));
    format!("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.{payload}.c2lnbmF0dXJl")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 60 * 60;

    fn now() -> Timestamp {
        Timestamp::from_secs(1_700_000_000)
    }

    #[test]
    fn test_decode_expiry() {
        assert_eq!(decode_expiry(&test_jwt(1_700_000_123)), Ok(Timestamp::from_secs(1_700_000_123)));
        assert_eq!(decode_expiry("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(decode_expiry("a.%%%.c"), Err(TokenError::Encoding));

        let no_exp = format!("h.{}.s", URL_SAFE_NO_PAD.encode(r#"{"id":"u1"}"#));
        assert_eq!(decode_expiry(&no_exp), Err(TokenError::MissingExpiry));
    }

    #[test]
    fn test_padded_payload_is_accepted() {
        let padded = format!("h.{}==.s", URL_SAFE_NO_PAD.encode(r#"{"exp":5}"#));
        assert_eq!(decode_expiry(&padded), Ok(Timestamp::from_secs(5)));
    }

    #[test]
    fn test_refresh_a_day_before_expiry() {
        let config = SessionConfig::default();
        let token = test_jwt(now().as_secs() + 7 * 24 * 3600);
        assert_eq!(
            RefreshPlan::for_token(&token, now(), &config),
            RefreshPlan::After(Duration::from_secs(6 * 24 * HOUR))
        );
    }

    #[test]
    fn test_short_lived_token_uses_fallback() {
        let config = SessionConfig::default();
        let token = test_jwt(now().as_secs() + 2 * 3600);
        assert_eq!(
            RefreshPlan::for_token(&token, now(), &config),
            RefreshPlan::After(Duration::from_secs(HOUR))
        );
    }

    #[test]
    fn test_expired_and_invalid_tokens() {
        let config = SessionConfig::default();
        assert_eq!(
            RefreshPlan::for_token(&test_jwt(now().as_secs() - 1), now(), &config),
            RefreshPlan::Now
        );
        assert_eq!(
            RefreshPlan::for_token("garbage", now(), &config),
            RefreshPlan::Invalid
        );
    }
}
