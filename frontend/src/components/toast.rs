//! 全局通知提示

use crate::config::AppConfig;
use leptos::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Notice {
    message: String,
    is_error: bool,
    /// 每条通知的序号，过期的定时器不会清掉后来的通知
    seq: u64,
}

/// 通知上下文，可以自由复制进闭包
#[derive(Clone, Copy)]
pub struct Toasts {
    notice: RwSignal<Option<Notice>>,
    duration: Duration,
}

impl Toasts {
    fn new(duration: Duration) -> Self {
        Self {
            notice: RwSignal::new(None),
            duration,
        }
    }

    fn show(&self, message: String, is_error: bool) {
        let seq = self
            .notice
            .with_untracked(|n| n.as_ref().map_or(0, |n| n.seq + 1));
        self.notice.set(Some(Notice {
            message,
            is_error,
            seq,
        }));

        let notice = self.notice;
        set_timeout(
            move || {
                if notice.with_untracked(|n| n.as_ref().is_some_and(|n| n.seq == seq)) {
                    notice.set(None);
                }
            },
            self.duration,
        );
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), false);
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "error toast");
        self.show(message, true);
    }
}

pub fn provide_toasts(config: &AppConfig) -> Toasts {
    let toasts = Toasts::new(config.toast_duration);
    provide_context(toasts);
    toasts
}

pub fn use_toasts() -> Toasts {
    use_context::<Toasts>().expect("Toasts should be provided")
}

/// 通知提示框，放在应用根部
#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts = use_toasts();
    let notice = toasts.notice;

    view! {
        <Show when=move || notice.with(Option::is_some)>
            <div class="toast toast-top toast-end z-50">
                <div class=move || {
                    let is_err = notice.with(|n| n.as_ref().is_some_and(|n| n.is_error));
                    if is_err { "alert alert-error shadow-lg" } else { "alert alert-success shadow-lg" }
                }>
                    <span>{move || notice.with(|n| n.as_ref().map(|n| n.message.clone()).unwrap_or_default())}</span>
                </div>
            </div>
        </Show>
    }
}
