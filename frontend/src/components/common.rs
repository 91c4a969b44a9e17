//! 页面间共用的小组件与展示规则

use crate::components::icons::{AlertCircle, X};
use crate::config::AppConfig;
use chrono::{DateTime, NaiveDate, Utc};
use crmdesk_shared::date::relative_day_label;
use crmdesk_shared::{LeadStatus, ListQuery, TaskPriority};
use leptos::html::Dialog;
use leptos::prelude::*;

pub fn use_config() -> AppConfig {
    use_context::<AppConfig>().expect("AppConfig should be provided")
}

/// 详情页上一条 / 下一条所用的全量列表查询
pub fn full_list_query(config: &AppConfig) -> ListQuery {
    ListQuery::page(1, config.list_limit)
}

pub fn lead_status_badge(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::NewLead => "badge badge-info",
        LeadStatus::CallAgain | LeadStatus::Callback => "badge badge-warning",
        LeadStatus::NoAnswer => "badge badge-ghost",
        LeadStatus::NotInterested | LeadStatus::WrongNumber => "badge badge-error",
        LeadStatus::Ftd => "badge badge-success",
    }
}

pub fn priority_badge(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "badge badge-ghost",
        TaskPriority::Medium => "badge badge-warning badge-outline",
        TaskPriority::High => "badge badge-error badge-outline",
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn due_label(due: Option<NaiveDate>) -> String {
    match due {
        Some(d) if d == today() => "Today".to_string(),
        Some(d) => d.format("%Y-%m-%d").to_string(),
        None => "No due date".to_string(),
    }
}

/// 备注等记录的相对时间
pub fn relative_label(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| relative_day_label(t.date_naive(), today()))
        .unwrap_or_default()
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="flex justify-center p-12">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

#[component]
pub fn ErrorBanner(#[prop(into)] message: String) -> impl IntoView {
    view! {
        <div role="alert" class="alert alert-error">
            <AlertCircle attr:class="stroke-current shrink-0 h-6 w-6" />
            <span>{message}</span>
        </div>
    }
}

/// 统计卡片
#[component]
pub fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] value: Signal<String>,
    #[prop(into, optional)] description: String,
    #[prop(into, optional)] accent: String,
) -> impl IntoView {
    let value_class = if accent.is_empty() {
        "stat-value".to_string()
    } else {
        format!("stat-value {accent}")
    };

    view! {
        <div class="stats shadow bg-base-100">
            <div class="stat">
                <div class="stat-title">{title}</div>
                <div class=value_class>{value}</div>
                <div class="stat-desc">{description}</div>
            </div>
        </div>
    }
}

/// 模态框：`open` 为 true 时 `show_modal`，否则关闭
///
/// 按 Esc 或点击取消都会把 `open` 置回 false。
#[component]
pub fn Modal(
    open: RwSignal<bool>,
    #[prop(into)] title: String,
    children: Children,
) -> impl IntoView {
    let dialog_ref = NodeRef::<Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                let _ = dialog.show_modal();
            } else {
                dialog.close();
            }
        }
    });

    view! {
        <dialog node_ref=dialog_ref class="modal" on:close=move |_| open.set(false)>
            <div class="modal-box">
                <button
                    type="button"
                    class="btn btn-sm btn-circle btn-ghost absolute right-2 top-2"
                    on:click=move |_| open.set(false)
                >
                    <X attr:class="h-4 w-4" />
                </button>
                <h3 class="font-bold text-lg mb-4">{title}</h3>
                {children()}
            </div>
        </dialog>
    }
}

/// 删除等不可撤销操作的确认框
#[component]
pub fn ConfirmDialog(
    open: RwSignal<bool>,
    #[prop(into)] title: String,
    #[prop(into)] message: Signal<String>,
    #[prop(into, optional)] confirm_label: Option<String>,
    on_confirm: Callback<()>,
) -> impl IntoView {
    let label = confirm_label.unwrap_or_else(|| "Delete".to_string());

    view! {
        <Modal open=open title=title>
            <p class="py-2">{message}</p>
            <div class="modal-action">
                <button class="btn" on:click=move |_| open.set(false)>"Cancel"</button>
                <button
                    class="btn btn-error"
                    on:click=move |_| {
                        open.set(false);
                        on_confirm.run(());
                    }
                >
                    {label}
                </button>
            </div>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_label() {
        assert_eq!(due_label(None), "No due date");
        assert_eq!(due_label(Some(today())), "Today");
        let date = NaiveDate::from_ymd_opt(2030, 1, 2).unwrap();
        assert_eq!(due_label(Some(date)), "2030-01-02");
        assert_eq!(relative_label(Some(Utc::now())), "Today");
    }

    #[test]
    fn test_format_timestamp() {
        let at = DateTime::parse_from_rfc3339("2024-07-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_timestamp(Some(at)), "2024-07-01 09:30");
        assert_eq!(format_timestamp(None), "-");
    }
}
