use crate::error::ApiResult;

/// 页面数据的三态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> FetchState<T> {
    pub fn from_result(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => FetchState::Ready(data),
            Err(err) => FetchState::Failed(err.to_string()),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// 就地修改已加载的数据；尚未加载时什么都不做，返回是否修改
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> bool {
        match self {
            FetchState::Ready(data) => {
                f(data);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_failure_keeps_user_message() {
        let state: FetchState<u32> = FetchState::from_result(Err(ApiError::Network {
            detail: "dns".into(),
        }));
        assert_eq!(state.error(), Some("Network error"));
        assert!(state.ready().is_none());
    }

    #[test]
    fn test_update_only_touches_loaded_data() {
        let mut loading: FetchState<Vec<u8>> = FetchState::Loading;
        assert!(!loading.update(|v| v.push(1)));
        assert!(loading.is_loading());

        let mut ready = FetchState::Ready(vec![1]);
        assert!(ready.update(|v| v.push(2)));
        assert_eq!(ready.ready(), Some(&vec![1, 2]));
    }
}
