//! 时间类型模块
//!
//! - `Timestamp`: 毫秒时间戳，用于令牌过期时间等计算
//! - `lenient_date`: 同时接受 `YYYY-MM-DD` 与 RFC 3339 的日期字段
//! - `relative_day_label`: 列表中的相对日期文案

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Duration;

// =========================================================
// Timestamp
// =========================================================

/// 毫秒时间戳
///
/// 内部存储为 `i64`，表示自 Unix 纪元以来的毫秒数
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    /// 由秒值构造（JWT 的 `exp` 以秒为单位）
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

/// 两个时间戳之差，结果为负时饱和到 0
impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        let diff = self.0.saturating_sub(rhs.0);
        Duration::from_millis(diff.max(0) as u64)
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        let ms = i64::try_from(rhs.as_millis()).unwrap_or(i64::MAX);
        Self(self.0.saturating_add(ms))
    }
}

// =========================================================
// 日期解析与展示
// =========================================================

/// 解析后端返回的日期字符串，支持纯日期与完整的 RFC 3339 时间
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// 相对日期文案：Today / Yesterday / N days ago，超过六天显示 `YYYY-MM-DD`
pub fn relative_day_label(date: NaiveDate, today: NaiveDate) -> String {
    let days = (today - date).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        _ => date.format("%Y-%m-%d").to_string(),
    }
}

/// `Option<NaiveDate>` 的宽松序列化
///
/// 空字符串与 `null` 都视为未设置。
pub mod lenient_date {
    use super::parse_date;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_date(text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {text}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_timestamp_sub_saturates() {
        let a = Timestamp::new(5_000);
        let b = Timestamp::new(2_000);
        assert_eq!(a - b, Duration::from_secs(3));
        assert_eq!(b - a, Duration::ZERO);
    }

    #[test]
    fn test_timestamp_from_secs() {
        assert_eq!(Timestamp::from_secs(1_700_000_000).as_millis(), 1_700_000_000_000);
        assert_eq!(Timestamp::from_secs(90).as_secs(), 90);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-03-09"), Some(day(2024, 3, 9)));
        assert_eq!(parse_date("2024-03-09T22:15:00.000Z"), Some(day(2024, 3, 9)));
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_relative_day_label() {
        let today = day(2024, 5, 20);
        assert_eq!(relative_day_label(today, today), "Today");
        assert_eq!(relative_day_label(day(2024, 5, 19), today), "Yesterday");
        assert_eq!(relative_day_label(day(2024, 5, 16), today), "4 days ago");
        assert_eq!(relative_day_label(day(2024, 4, 2), today), "2024-04-02");
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Holder {
        #[serde(default, with = "lenient_date")]
        due: Option<NaiveDate>,
    }

    #[test]
    fn test_lenient_date_accepts_blank_and_iso() {
        let blank: Holder = serde_json::from_str(r#"{"due":""}"#).unwrap();
        assert_eq!(blank.due, None);
        let missing: Holder = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.due, None);
        let iso: Holder = serde_json::from_str(r#"{"due":"2024-06-01T00:00:00Z"}"#).unwrap();
        assert_eq!(iso.due, Some(day(2024, 6, 1)));
        assert!(serde_json::from_str::<Holder>(r#"{"due":"soon"}"#).is_err());
        assert_eq!(
            serde_json::to_string(&iso).unwrap(),
            r#"{"due":"2024-06-01"}"#
        );
    }
}
