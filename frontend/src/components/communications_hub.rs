use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::components::toast::use_toasts;
use crate::error::ApiError;
use crate::logic::FetchState;
use crmdesk_shared::communication::{InitiateCall, SendEmail, SendMessage};
use crmdesk_shared::form::first_message;
use crmdesk_shared::{
    Client, CommunicationKind, CommunicationRecord, CommunicationStats, ListQuery, MessageChannel, Paged,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use validator::Validate;

const HISTORY_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Composer {
    Call,
    Message,
    Email,
}

fn kind_badge(kind: CommunicationKind) -> &'static str {
    match kind {
        CommunicationKind::Call => "badge badge-success",
        CommunicationKind::Message => "badge badge-info",
        CommunicationKind::Email => "badge badge-secondary",
    }
}

#[component]
pub fn CommunicationsHubPage() -> impl IntoView {
    let auth = use_auth();
    let config = use_config();

    let stats = RwSignal::new(FetchState::<CommunicationStats>::Loading);
    let history = RwSignal::new(FetchState::<Paged<CommunicationRecord>>::Loading);
    let clients = RwSignal::new(Vec::<Client>::new());
    let page = RwSignal::new(1u32);

    let load_stats = move || {
        let api = auth.api();
        spawn_local(async move {
            stats.set(FetchState::from_result(api.communication_stats().await));
        });
    };

    let load_history = move |p: u32| {
        let api = auth.api();
        page.set(p);
        spawn_local(async move {
            history.set(FetchState::from_result(
                api.communication_history(ListQuery::page(p, HISTORY_PAGE_SIZE)).await,
            ));
        });
    };

    {
        let api = auth.api();
        let query = full_list_query(&config);
        spawn_local(async move {
            match api.list_clients(query).await {
                Ok(page) => clients.set(page.items),
                Err(err) => tracing::warn!(error = %err, "could not load clients for the composer"),
            }
        });
    }
    load_stats();
    load_history(1);

    // 新记录插到历史最前，统计重新拉取
    let on_sent = Callback::new(move |record: CommunicationRecord| {
        history.update(|h| {
            h.update(|h| h.items.insert(0, record));
        });
        load_stats();
    });

    let stat = move |pick: fn(&CommunicationStats) -> u64| {
        Signal::derive(move || stats.with(|s| s.ready().map(|s| pick(s).to_string()).unwrap_or_else(|| "-".into())))
    };
    let pagination = move || history.with(|h| h.ready().map(|h| h.pagination).unwrap_or_default());

    view! {
        <div class="grid grid-cols-2 lg:grid-cols-4 gap-4">
            <StatCard title="Total Calls" value=stat(|s| s.total_calls) />
            <StatCard title="Messages" value=stat(|s| s.total_messages) />
            <StatCard title="Emails" value=stat(|s| s.total_emails) />
            <StatCard title="Active Agents" value=stat(|s| s.active_agents) />
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <ComposerCard clients=clients on_sent=on_sent />

            <div class="card bg-base-100 shadow-xl lg:col-span-2">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h3 class="card-title">"Recent Communications"</h3>
                        <button class="btn btn-sm btn-ghost gap-2" on:click=move |_| load_history(page.get_untracked())>
                            <RefreshCw attr:class="h-4 w-4" />
                        </button>
                    </div>
                    {move || match history.get() {
                        FetchState::Loading => view! { <Loading /> }.into_any(),
                        FetchState::Failed(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
                        FetchState::Ready(list) if list.items.is_empty() => view! {
                            <p class="text-center py-8 text-base-content/60">"No communications yet"</p>
                        }
                        .into_any(),
                        FetchState::Ready(list) => view! {
                            <div class="overflow-x-auto">
                                <table class="table table-zebra">
                                    <thead>
                                        <tr>
                                            <th>"Type"</th>
                                            <th>"Client"</th>
                                            <th>"Agent"</th>
                                            <th>"Summary"</th>
                                            <th>"Date"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {list
                                            .items
                                            .into_iter()
                                            .map(|r| view! {
                                                <tr>
                                                    <td><span class=kind_badge(r.kind)>{r.kind.label()}</span></td>
                                                    <td>{r.client.as_ref().map(|c| c.display_name()).unwrap_or_default()}</td>
                                                    <td>{r.agent.as_ref().map(|a| a.display_name()).unwrap_or_default()}</td>
                                                    <td class="max-w-xs truncate">{r.summary.clone().or(r.status.clone()).unwrap_or_default()}</td>
                                                    <td class="whitespace-nowrap">{format_timestamp(r.created_at)}</td>
                                                </tr>
                                            })
                                            .collect_view()}
                                    </tbody>
                                </table>
                            </div>
                        }
                        .into_any(),
                    }}
                    <div class="flex justify-end">
                        <div class="join">
                            <button
                                class="join-item btn btn-sm"
                                disabled=move || pagination().prev_page().is_none()
                                on:click=move |_| {
                                    if let Some(p) = pagination().prev_page() {
                                        load_history(p);
                                    }
                                }
                            >
                                <ChevronLeft attr:class="h-4 w-4" />
                            </button>
                            <button class="join-item btn btn-sm no-animation">{move || format!("Page {}", page.get())}</button>
                            <button
                                class="join-item btn btn-sm"
                                disabled=move || pagination().next_page().is_none()
                                on:click=move |_| {
                                    if let Some(p) = pagination().next_page() {
                                        load_history(p);
                                    }
                                }
                            >
                                <ChevronRight attr:class="h-4 w-4" />
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}

/// 发起外呼 / 发送消息 / 发送邮件
#[component]
fn ComposerCard(clients: RwSignal<Vec<Client>>, on_sent: Callback<CommunicationRecord>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    let mode = RwSignal::new(Composer::Call);
    let client_id = RwSignal::new(String::new());
    let channel = RwSignal::new(MessageChannel::default());
    let content = RwSignal::new(String::new());
    let subject = RwSignal::new(String::new());
    let (sending, set_sending) = signal(false);

    let selected = move || {
        let id = client_id.get_untracked();
        clients.with_untracked(|list| list.iter().find(|c| c.id == id).cloned())
    };

    let finish = move |result: Result<CommunicationRecord, ApiError>, done: &'static str| {
        match result {
            Ok(record) => {
                on_sent.run(record);
                content.set(String::new());
                subject.set(String::new());
                toasts.success(done);
            }
            Err(err) => toasts.error(err.to_string()),
        }
        set_sending.set(false);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let client = selected().unwrap_or_default();
        let api = auth.api();

        match mode.get_untracked() {
            Composer::Call => {
                let call = InitiateCall {
                    client_id: client.id,
                    phone_number: client.phone,
                };
                if let Err(errors) = call.validate() {
                    toasts.error(first_message(&errors));
                    return;
                }
                set_sending.set(true);
                spawn_local(async move { finish(api.initiate_call(&call).await, "Call initiated") });
            }
            Composer::Message => {
                let message = SendMessage {
                    client_id: client.id,
                    channel: channel.get_untracked(),
                    content: content.get_untracked(),
                };
                if let Err(errors) = message.validate() {
                    toasts.error(first_message(&errors));
                    return;
                }
                set_sending.set(true);
                spawn_local(async move { finish(api.send_message(&message).await, "Message sent") });
            }
            Composer::Email => {
                let email = SendEmail {
                    client_id: client.id,
                    to: client.email,
                    subject: subject.get_untracked(),
                    body: content.get_untracked(),
                };
                if let Err(errors) = email.validate() {
                    toasts.error(first_message(&errors));
                    return;
                }
                set_sending.set(true);
                spawn_local(async move { finish(api.send_email(&email).await, "Email sent") });
            }
        }
    };

    let tab = move |m: Composer, label: &'static str| {
        view! {
            <a
                role="tab"
                class=move || if mode.get() == m { "tab tab-active" } else { "tab" }
                on:click=move |_| mode.set(m)
            >
                {label}
            </a>
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body gap-3" on:submit=on_submit>
                <h3 class="card-title">"New Communication"</h3>
                <div role="tablist" class="tabs tabs-boxed">
                    {tab(Composer::Call, "Call")}
                    {tab(Composer::Message, "Message")}
                    {tab(Composer::Email, "Email")}
                </div>

                <select
                    class="select select-bordered w-full"
                    on:change=move |ev| client_id.set(event_target_value(&ev))
                >
                    <option value="">"Select a client"</option>
                    <For
                        each=move || clients.get()
                        key=|c| c.id.clone()
                        children=|c| view! { <option value=c.id.clone()>{c.full_name()}</option> }
                    />
                </select>

                <Show when=move || mode.get() == Composer::Message>
                    <select
                        class="select select-bordered w-full"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            if let Some(c) = MessageChannel::ALL.into_iter().find(|c| c.as_str() == value) {
                                channel.set(c);
                            }
                        }
                    >
                        {MessageChannel::ALL
                            .into_iter()
                            .map(|c| view! { <option value=c.as_str()>{c.label()}</option> })
                            .collect_view()}
                    </select>
                </Show>

                <Show when=move || mode.get() == Composer::Email>
                    <input
                        type="text"
                        class="input input-bordered w-full"
                        placeholder="Subject"
                        prop:value=subject
                        on:input=move |ev| subject.set(event_target_value(&ev))
                    />
                </Show>

                <Show when=move || mode.get() != Composer::Call>
                    <textarea
                        class="textarea textarea-bordered w-full h-28"
                        placeholder="Write your message..."
                        prop:value=content
                        on:input=move |ev| content.set(event_target_value(&ev))
                    ></textarea>
                </Show>

                <button type="submit" class="btn btn-primary gap-2" disabled=move || sending.get()>
                    {move || match mode.get() {
                        Composer::Call => view! { <Phone attr:class="h-4 w-4" /> "Start Call" }.into_any(),
                        Composer::Message => view! { <MessageCircle attr:class="h-4 w-4" /> "Send Message" }.into_any(),
                        Composer::Email => view! { <Mail attr:class="h-4 w-4" /> "Send Email" }.into_any(),
                    }}
                </button>
            </form>
        </div>
    }
}
