use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::components::task_management::{AddTaskDialog, TaskTable};
use crate::components::toast::use_toasts;
use crate::logic::{
    ContactError, FetchState, RecordNavigator, TaskBoard, dial_link, email_compose_link, whatsapp_link,
};
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use crate::web::{launch_url, open_url};
use crmdesk_shared::user::access;
use crmdesk_shared::{Client, ClientPatch, LeadStatus, ListQuery, Note, Task};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Activity,
    Tasks,
    Details,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Activity, Tab::Tasks, Tab::Details];

    fn label(&self) -> &'static str {
        match self {
            Tab::Activity => "Activity",
            Tab::Tasks => "Tasks",
            Tab::Details => "Details",
        }
    }
}

#[component]
pub fn ClientProfilePage(id: String) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let router = use_router();
    let config = use_config();
    let user = auth.user();

    let client = RwSignal::new(FetchState::<Client>::Loading);
    let board = RwSignal::new(FetchState::<TaskBoard>::Loading);
    let navigator = RwSignal::new(Option::<RecordNavigator>::None);
    let tab = RwSignal::new(Tab::Activity);
    let adding_task = RwSignal::new(false);
    let adding_note = RwSignal::new(false);

    let client_id = StoredValue::new(id.clone());

    {
        let api = auth.api();
        let id = id.clone();
        let full_list = full_list_query(&config);
        let task_query = ListQuery::page(1, config.list_limit).with_client(id.clone());
        spawn_local(async move {
            client.set(FetchState::from_result(api.get_client(&id).await));
            board.set(FetchState::from_result(
                api.list_tasks(task_query).await.map(|page| TaskBoard::new(page.items)),
            ));
            // 上一条 / 下一条只是便利功能，列表加载失败时不显示
            match api.list_clients(full_list).await {
                Ok(page) => {
                    let ids = page.items.into_iter().map(|c| c.id).collect();
                    navigator.set(Some(RecordNavigator::new(ids, &id)));
                }
                Err(err) => tracing::warn!(error = %err, "could not load client list for navigation"),
            }
        });
    }

    let go_to = move |target: Option<String>| {
        if let Some(target) = target {
            router.go(AppRoute::ClientProfile(target));
        }
    };

    let contact = move |action: fn(&Client) -> Result<(), ContactError>| {
        client.with_untracked(|c| {
            if let Some(c) = c.ready()
                && let Err(err) = action(c)
            {
                toasts.error(err.to_string());
            }
        });
    };

    let on_call = move |_| contact(|c| dial_link(c).map(|url| launch_url(&url)));
    let on_whatsapp = move |_| contact(|c| whatsapp_link(c).map(|url| open_url(&url)));
    let on_email = move |_| {
        contact(|c| {
            let (provider, url) = email_compose_link(c)?;
            if provider.opens_new_tab() {
                open_url(&url);
            } else {
                launch_url(&url);
            }
            Ok(())
        })
    };

    let on_status = move |ev: leptos::ev::Event| {
        let Ok(status) = event_target_value(&ev).parse::<LeadStatus>() else {
            return;
        };
        let api = auth.api();
        let id = client_id.get_value();
        spawn_local(async move {
            match api.update_client(&id, ClientPatch::status(status)).await {
                Ok(updated) => {
                    // 服务端的副本可能不带备注，保留本地已加载的
                    client.update(|c| {
                        c.update(|c| {
                            let notes = std::mem::take(&mut c.notes);
                            *c = updated;
                            if c.notes.is_empty() {
                                c.notes = notes;
                            }
                        });
                    });
                    toasts.success("Client status updated");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    };

    let on_note_added = Callback::new(move |note: Note| {
        client.update(|c| {
            c.update(|c| c.notes.push(note));
        });
    });

    let delete_note = move |note_id: String| {
        let api = auth.api();
        let id = client_id.get_value();
        spawn_local(async move {
            match api.delete_note(&id, &note_id).await {
                Ok(_) => {
                    client.update(|c| {
                        c.update(|c| c.notes.retain(|n| n.id != note_id));
                    });
                    toasts.success("Note deleted");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    };

    let on_task_created = Callback::new(move |task: Task| {
        board.update(|b| {
            b.update(|b| b.insert(task));
        });
    });

    let can_see_phone = Memo::new(move |_| user.with(|u| access::can_view_phone_numbers(u.as_ref())));
    let can_see_email = Memo::new(move |_| user.with(|u| access::can_view_email_addresses(u.as_ref())));
    let can_see_details = Memo::new(move |_| user.with(|u| access::can_view_full_client_details(u.as_ref())));

    let client_text = move |f: fn(&Client) -> String| move || client.with(|c| c.ready().map(f).unwrap_or_default());
    let load_state = Memo::new(move |_| client.with(|c| (c.is_loading(), c.error().map(str::to_string))));

    view! {
        <div class="flex items-center justify-between">
            <button class="btn btn-ghost gap-2" on:click=move |_| router.go(AppRoute::Clients)>
                <ChevronLeft attr:class="h-4 w-4" />
                "Back to clients"
            </button>
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !navigator.with(|n| n.as_ref().is_some_and(RecordNavigator::has_prev))
                    on:click=move |_| go_to(navigator.with_untracked(|n| n.as_ref().and_then(|n| n.prev_id().map(str::to_string))))
                >
                    <ChevronLeft attr:class="h-4 w-4" />
                    "Previous"
                </button>
                <button class="join-item btn btn-sm no-animation">
                    {move || navigator.with(|n| n.as_ref().and_then(RecordNavigator::position_label).unwrap_or_default())}
                </button>
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !navigator.with(|n| n.as_ref().is_some_and(RecordNavigator::has_next))
                    on:click=move |_| go_to(navigator.with_untracked(|n| n.as_ref().and_then(|n| n.next_id().map(str::to_string))))
                >
                    "Next"
                    <ChevronRight attr:class="h-4 w-4" />
                </button>
            </div>
        </div>

        {move || match load_state.get() {
            (_, Some(msg)) => view! { <ErrorBanner message=msg /> }.into_any(),
            (true, None) => view! { <Loading /> }.into_any(),
            (false, None) => view! {
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body flex-col md:flex-row md:items-center justify-between gap-6">
                        <div class="flex items-center gap-4">
                            <div class="avatar placeholder">
                                <div class="bg-primary text-primary-content rounded-full w-16">
                                    <span class="text-xl">{client_text(Client::initials)}</span>
                                </div>
                            </div>
                            <div>
                                <h2 class="text-2xl font-bold">{client_text(Client::full_name)}</h2>
                                <p class="font-mono text-sm opacity-60">{client_text(|c| c.display_id().to_string())}</p>
                                <p class="text-sm opacity-70">{client_text(|c| c.country.clone())}</p>
                            </div>
                        </div>
                        <div class="flex flex-wrap items-center gap-2">
                            <select class="select select-bordered select-sm" on:change=on_status>
                                {LeadStatus::ALL
                                    .into_iter()
                                    .map(|s| view! {
                                        <option
                                            value=s.as_str()
                                            selected=move || client.with(|c| c.ready().is_some_and(|c| c.status == s))
                                        >
                                            {s.as_str()}
                                        </option>
                                    })
                                    .collect_view()}
                            </select>
                            <button class="btn btn-sm btn-success gap-2" on:click=on_call>
                                <Phone attr:class="h-4 w-4" /> "Call"
                            </button>
                            <button class="btn btn-sm btn-outline gap-2" on:click=on_whatsapp>
                                <MessageCircle attr:class="h-4 w-4" /> "WhatsApp"
                            </button>
                            <button class="btn btn-sm btn-outline gap-2" on:click=on_email>
                                <Mail attr:class="h-4 w-4" /> "Email"
                            </button>
                        </div>
                    </div>
                </div>

                <div role="tablist" class="tabs tabs-boxed w-fit">
                    {Tab::ALL
                        .into_iter()
                        .map(|t| view! {
                            <a
                                role="tab"
                                class=move || if tab.get() == t { "tab tab-active" } else { "tab" }
                                on:click=move |_| tab.set(t)
                            >
                                {t.label()}
                            </a>
                        })
                        .collect_view()}
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        {move || match tab.get() {
                            Tab::Activity => view! {
                                <div class="flex items-center justify-between">
                                    <h3 class="card-title">"Notes"</h3>
                                    <button class="btn btn-sm btn-primary gap-2" on:click=move |_| adding_note.set(true)>
                                        <Plus attr:class="h-4 w-4" /> "Add Note"
                                    </button>
                                </div>
                                <NoteList client=client on_delete=delete_note />
                            }
                            .into_any(),
                            Tab::Tasks => view! {
                                <div class="flex items-center justify-between">
                                    <h3 class="card-title">"Tasks"</h3>
                                    <button class="btn btn-sm btn-primary gap-2" on:click=move |_| adding_task.set(true)>
                                        <Plus attr:class="h-4 w-4" /> "Add Task"
                                    </button>
                                </div>
                                {move || match board.with(|b| b.error().map(str::to_string)) {
                                    Some(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
                                    None => view! { <TaskTable board=board hide_client=true /> }.into_any(),
                                }}
                            }
                            .into_any(),
                            Tab::Details => view! {
                                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                                    <Detail label="Email" value=Signal::derive(move || {
                                        if can_see_email.get() { client_text(|c| c.email.clone())() } else { "Hidden".to_string() }
                                    }) />
                                    <Detail label="Phone" value=Signal::derive(move || {
                                        if can_see_phone.get() { client_text(|c| c.phone.clone())() } else { "Hidden".to_string() }
                                    }) />
                                    <Detail label="Status" value=Signal::derive(client_text(|c| c.status.to_string())) />
                                    <Detail label="Country" value=Signal::derive(client_text(|c| c.country.clone())) />
                                    <Show when=move || can_see_details.get()>
                                        <Detail label="Campaign" value=Signal::derive(client_text(|c| {
                                            c.campaign.map(|camp| camp.as_str().to_string()).unwrap_or_else(|| "-".into())
                                        })) />
                                        <Detail label="Assigned agent" value=Signal::derive(client_text(|c| {
                                            c.assigned_agent.as_ref().map(|a| a.display_name()).unwrap_or_else(|| "Unassigned".into())
                                        })) />
                                        <Detail label="Created" value=Signal::derive(client_text(|c| format_timestamp(c.created_at))) />
                                    </Show>
                                </div>
                            }
                            .into_any(),
                        }}
                    </div>
                </div>
            }
            .into_any(),
        }}

        <AddNoteDialog open=adding_note client_id=id.clone() on_created=on_note_added />
        <AddTaskDialog open=adding_task client_id=Some(id) on_created=on_task_created />
    }
}

#[component]
fn Detail(#[prop(into)] label: String, value: Signal<String>) -> impl IntoView {
    view! {
        <div>
            <p class="text-sm opacity-60">{label}</p>
            <p class="font-medium">{value}</p>
        </div>
    }
}

#[component]
fn NoteList<F>(client: RwSignal<FetchState<Client>>, on_delete: F) -> impl IntoView
where
    F: Fn(String) + Copy + Send + Sync + 'static,
{
    let notes = move || client.with(|c| c.ready().map(|c| c.notes.clone()).unwrap_or_default());

    view! {
        <Show
            when=move || !notes().is_empty()
            fallback=|| view! { <p class="text-center py-8 text-base-content/60">"No notes yet"</p> }
        >
            <ul class="space-y-3">
                <For
                    each=notes
                    key=|n| n.id.clone()
                    children=move |note| {
                        let id = note.id.clone();
                        let author = note.created_by.as_ref().map(|p| p.display_name()).unwrap_or_default();
                        view! {
                            <li class="p-4 rounded-box bg-base-200 flex justify-between gap-4">
                                <div>
                                    <p class="whitespace-pre-line">{note.content.clone()}</p>
                                    <p class="text-xs opacity-60 mt-1">{author} " · " {relative_label(note.created_at)}</p>
                                </div>
                                <button class="btn btn-ghost btn-xs text-error" title="Delete" on:click=move |_| on_delete(id.clone())>
                                    <Trash2 attr:class="h-4 w-4" />
                                </button>
                            </li>
                        }
                    }
                />
            </ul>
        </Show>
    }
}

#[component]
fn AddNoteDialog(open: RwSignal<bool>, client_id: String, on_created: Callback<Note>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let content = RwSignal::new(String::new());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let client_id = StoredValue::new(client_id);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let text = content.get_untracked();
        if text.trim().is_empty() {
            set_error_msg.set(Some("Please enter a note".to_string()));
            return;
        }
        set_error_msg.set(None);
        let api = auth.api();
        let id = client_id.get_value();
        spawn_local(async move {
            match api.add_note(&id, &text).await {
                Ok(note) => {
                    on_created.run(note);
                    content.set(String::new());
                    open.set(false);
                    toasts.success("Note added successfully");
                }
                Err(err) => set_error_msg.set(Some(err.to_string())),
            }
        });
    };

    view! {
        <Modal open=open title="Add Note">
            <form class="space-y-2" on:submit=on_submit>
                {move || error_msg.get().map(|msg| view! { <ErrorBanner message=msg /> })}
                <textarea
                    class="textarea textarea-bordered w-full h-32"
                    placeholder="Write a note..."
                    prop:value=content
                    on:input=move |ev| content.set(event_target_value(&ev))
                ></textarea>
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| open.set(false)>"Cancel"</button>
                    <button type="submit" class="btn btn-primary">"Save Note"</button>
                </div>
            </form>
        </Modal>
    }
}
