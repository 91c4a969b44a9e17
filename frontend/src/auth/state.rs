use crate::session::Session;
use crmdesk_shared::{User, UserPatch};

/// 认证状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    /// 启动时加载当前用户期间为 true
    pub loading: bool,
}

/// 会话阶段，路由守卫只看这一项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
}

impl AuthState {
    /// 由持久化的令牌构造初始状态：有令牌时进入加载中，等待确认当前用户
    pub fn restored(session: Option<Session>) -> Self {
        match session {
            Some(session) => Self {
                user: None,
                token: Some(session.access_token),
                refresh_token: session.refresh_token,
                is_authenticated: false,
                loading: true,
            },
            None => Self::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    LoginSuccess {
        user: User,
        token: String,
        refresh_token: Option<String>,
    },
    UpdateUser(UserPatch),
    Logout,
    SetLoading(bool),
}

pub fn reduce(mut state: AuthState, action: AuthAction) -> AuthState {
    match action {
        AuthAction::LoginSuccess {
            user,
            token,
            refresh_token,
        } => AuthState {
            user: Some(user),
            token: Some(token),
            refresh_token,
            is_authenticated: true,
            loading: false,
        },
        AuthAction::UpdateUser(patch) => {
            // 未登录时没有可合并的对象
            if let Some(user) = state.user.as_mut() {
                user.merge(patch);
            }
            state
        }
        AuthAction::Logout => AuthState::default(),
        AuthAction::SetLoading(loading) => {
            state.loading = loading;
            state
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crmdesk_shared::Role;

    fn user() -> User {
        User {
            id: "u1".into(),
            first_name: "Ana".into(),
            last_name: "Silva".into(),
            email: "ana@crm.io".into(),
            role: Role::Agent,
            ..Default::default()
        }
    }

    fn logged_in() -> AuthState {
        reduce(
            AuthState::default(),
            AuthAction::LoginSuccess {
                user: user(),
                token: "t".into(),
                refresh_token: Some("r".into()),
            },
        )
    }

    #[test]
    fn test_restored_state_waits_for_user() {
        let state = AuthState::restored(Some(Session::new("t", Some("r".into()))));
        assert!(state.loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.phase(), SessionPhase::Authenticating);

        let empty = AuthState::restored(None);
        assert_eq!(empty.phase(), SessionPhase::Anonymous);
    }

    #[test]
    fn test_login_success_authenticates() {
        let state = logged_in();
        assert!(state.is_authenticated);
        assert!(!state.loading);
        assert_eq!(state.phase(), SessionPhase::Authenticated);
        assert_eq!(state.refresh_token.as_deref(), Some("r"));
    }

    #[test]
    fn test_update_user_merges_fields() {
        let patch = UserPatch {
            bio: Some("Top closer".into()),
            ..Default::default()
        };
        let state = reduce(logged_in(), AuthAction::UpdateUser(patch));
        let user = state.user.unwrap();
        assert_eq!(user.bio.as_deref(), Some("Top closer"));
        assert_eq!(user.first_name, "Ana");
    }

    #[test]
    fn test_update_user_without_user_is_ignored() {
        let patch = UserPatch {
            bio: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(reduce(AuthState::default(), AuthAction::UpdateUser(patch)), AuthState::default());
    }

    #[test]
    fn test_logout_resets_everything() {
        let state = reduce(logged_in(), AuthAction::Logout);
        assert_eq!(state, AuthState::default());
        assert!(state.user.is_none() && state.token.is_none());
    }
}
