use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::components::toast::use_toasts;
use crate::logic::{ClientTable, FetchState};
use crate::web::download_text;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use crmdesk_shared::form::first_message;
use crmdesk_shared::protocol::clients::ExportClients;
use crmdesk_shared::user::access;
use crmdesk_shared::{Client, ClientPatch, LeadStatus, NewClient, User};
use leptos::prelude::*;
use leptos::task::spawn_local;
use validator::Validate;

/// 已加载时从表格取出一段文案，加载中为空
fn table_text(
    table: RwSignal<FetchState<ClientTable>>,
    f: impl FnOnce(&ClientTable) -> String,
) -> String {
    table.with(|t| t.ready().map(f).unwrap_or_default())
}

#[component]
pub fn ClientManagementPage() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let router = use_router();
    let user = auth.user();

    let table = RwSignal::new(FetchState::<ClientTable>::Loading);
    let exporting = RwSignal::new(false);
    let adding = RwSignal::new(false);
    let confirm_open = RwSignal::new(false);
    let pending_delete = RwSignal::new(Option::<Client>::None);

    let can_see_phone = Memo::new(move |_| user.with(|u| access::can_view_phone_numbers(u.as_ref())));
    let can_see_email = Memo::new(move |_| user.with(|u| access::can_view_email_addresses(u.as_ref())));
    let can_export = Memo::new(move |_| user.with(|u| access::can_export_data(u.as_ref())));
    let can_assign = Memo::new(move |_| user.with(|u| access::can_assign_clients(u.as_ref())));
    let agents = RwSignal::new(Vec::<User>::new());

    Effect::new(move |_| {
        if !can_assign.get() {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.client_agents().await {
                Ok(list) => agents.set(list),
                Err(err) => tracing::warn!(error = %err, "could not load agents"),
            }
        });
    });

    // 只在加载状态变化时重建表格，翻页与过滤交给 <For>
    let status = Memo::new(move |_| table.with(|t| (t.is_loading(), t.error().map(str::to_string))));

    let config = use_config();
    let load = move || {
        let api = auth.api();
        let query = full_list_query(&config);
        table.set(FetchState::Loading);
        spawn_local(async move {
            let result = api.list_clients(query).await;
            table.set(FetchState::from_result(result.map(|page| ClientTable::new(page.items))));
        });
    };
    load();

    let on_search = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        table.update(|t| {
            t.update(|t| t.set_search(&value));
        });
    };

    let set_filter = move |status: Option<LeadStatus>| {
        table.update(|t| {
            t.update(|t| t.set_status_filter(status));
        });
    };
    let on_status = move |ev: leptos::ev::Event| set_filter(event_target_value(&ev).parse::<LeadStatus>().ok());
    let active_filter = Memo::new(move |_| table.with(|t| t.ready().and_then(ClientTable::status_filter)));
    let counts = Memo::new(move |_| {
        table.with(|t| {
            t.ready()
                .map(|t| (t.clients().len(), t.status_counts()))
                .unwrap_or_default()
        })
    });

    let change_status = move |id: String, status: LeadStatus| {
        let api = auth.api();
        spawn_local(async move {
            match api.update_client(&id, ClientPatch::status(status)).await {
                Ok(updated) => {
                    table.update(|t| {
                        t.update(|t| t.replace(updated));
                    });
                    toasts.success("Client status updated");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    };

    let assign = move |client: Client, agent_id: String| {
        let Some(agent) = agents.with_untracked(|list| list.iter().find(|a| a.id == agent_id).cloned()) else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            match api.assign_clients(vec![client.id.clone()], &agent.id).await {
                Ok(_) => {
                    let mut updated = client;
                    updated.assigned_agent = Some(agent.person_ref());
                    table.update(|t| {
                        t.update(|t| t.replace(updated));
                    });
                    toasts.success(format!("Assigned to {}", agent.full_name()));
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    };

    let ask_delete = move |client: Client| {
        pending_delete.set(Some(client));
        confirm_open.set(true);
    };

    let on_delete = Callback::new(move |()| {
        let Some(client) = pending_delete.get_untracked() else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            match api.delete_client(&client.id).await {
                Ok(_) => {
                    table.update(|t| {
                        t.update(|t| {
                            t.remove(&client.id);
                        });
                    });
                    toasts.success("Client deleted");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    });

    let on_export = move |_| {
        let api = auth.api();
        let export = ExportClients::default();
        exporting.set(true);
        spawn_local(async move {
            match api.export_clients(export).await {
                Ok(csv) => match download_text(&export.file_name(), export.format.mime_type(), &csv) {
                    Ok(()) => toasts.success("Export started"),
                    Err(err) => {
                        tracing::error!(error = %err, "could not save export");
                        toasts.error("Could not save the export file");
                    }
                },
                Err(err) => toasts.error(err.to_string()),
            }
            exporting.set(false);
        });
    };

    let on_created = Callback::new(move |client: Client| {
        table.update(|t| {
            t.update(|t| {
                t.insert(client);
            });
        });
    });

    let delete_message = Signal::derive(move || {
        pending_delete.with(|c| match c {
            Some(c) => format!("Delete {}? This cannot be undone.", c.full_name()),
            None => String::new(),
        })
    });

    view! {
        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div class="flex flex-wrap gap-2">
                <label class="input input-bordered flex items-center gap-2">
                    <Search attr:class="h-4 w-4 opacity-60" />
                    <input
                        type="text"
                        class="grow"
                        placeholder="Search by name, email, phone or ID"
                        prop:value=move || table_text(table, |t| t.search().to_string())
                        on:input=on_search
                    />
                </label>
                <select class="select select-bordered" on:change=on_status>
                    <option value="" selected=move || active_filter.get().is_none()>"All statuses"</option>
                    {LeadStatus::ALL
                        .into_iter()
                        .map(|s| view! {
                            <option value=s.as_str() selected=move || active_filter.get() == Some(s)>{s.as_str()}</option>
                        })
                        .collect_view()}
                </select>
            </div>
            <div class="flex gap-2">
                <Show when=move || can_export.get()>
                    <button class="btn btn-outline gap-2" disabled=move || exporting.get() on:click=on_export>
                        <Download attr:class="h-4 w-4" />
                        "Export"
                    </button>
                </Show>
                <button class="btn btn-primary gap-2" on:click=move |_| adding.set(true)>
                    <Plus attr:class="h-4 w-4" />
                    "Add Client"
                </button>
            </div>
        </div>

        // 各状态的客户数，点击即按该状态过滤
        <div class="flex flex-wrap gap-2">
            <button
                class=move || if active_filter.get().is_none() { "badge badge-lg badge-primary" } else { "badge badge-lg badge-outline" }
                on:click=move |_| set_filter(None)
            >
                {move || format!("All {}", counts.with(|(total, _)| *total))}
            </button>
            {move || {
                counts
                    .get()
                    .1
                    .into_iter()
                    .filter(|(_, n)| *n > 0)
                    .map(|(status, n)| view! {
                        <button
                            class=move || {
                                if active_filter.get() == Some(status) {
                                    "badge badge-lg badge-primary"
                                } else {
                                    lead_status_badge(status)
                                }
                            }
                            on:click=move |_| set_filter(Some(status))
                        >
                            {format!("{status} {n}")}
                        </button>
                    })
                    .collect_view()
            }}
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                {move || match status.get() {
                    (_, Some(msg)) => view! { <div class="p-4"><ErrorBanner message=msg /></div> }.into_any(),
                    (true, None) => view! { <Loading /> }.into_any(),
                    (false, None) => view! {
                        <div class="overflow-x-auto">
                            <table class="table table-zebra">
                                <thead>
                                    <tr>
                                        <th>"ID"</th>
                                        <th>"Name"</th>
                                        <Show when=move || can_see_email.get()><th>"Email"</th></Show>
                                        <Show when=move || can_see_phone.get()><th>"Phone"</th></Show>
                                        <th>"Country"</th>
                                        <th>"Status"</th>
                                        <th>"Agent"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=move || table.with(|t| t.ready().map(ClientTable::page_items).unwrap_or_default())
                                        key=|c| (c.id.clone(), c.status)
                                        children=move |client| {
                                            let id = client.id.clone();
                                            let status_id = client.id.clone();
                                            let email = client.email.clone();
                                            let phone = client.phone.clone();
                                            let agent = client
                                                .assigned_agent
                                                .as_ref()
                                                .map(|a| a.display_name())
                                                .unwrap_or_else(|| "Unassigned".to_string());
                                            let agent_id = client
                                                .assigned_agent
                                                .as_ref()
                                                .and_then(|a| a.id().map(str::to_string))
                                                .unwrap_or_default();
                                            let to_assign = client.clone();
                                            let current = client.status;
                                            let to_delete = client.clone();
                                            view! {
                                                <tr class="hover">
                                                    <td class="font-mono text-sm">{client.display_id().to_string()}</td>
                                                    <td>
                                                        <a
                                                            class="link link-hover font-medium"
                                                            on:click=move |_| router.go(AppRoute::ClientProfile(id.clone()))
                                                        >
                                                            {client.full_name()}
                                                        </a>
                                                    </td>
                                                    <Show when=move || can_see_email.get()><td>{email.clone()}</td></Show>
                                                    <Show when=move || can_see_phone.get()><td>{phone.clone()}</td></Show>
                                                    <td>{client.country.clone()}</td>
                                                    <td>
                                                        <select
                                                            class="select select-bordered select-sm"
                                                            on:change=move |ev| {
                                                                if let Ok(status) = event_target_value(&ev).parse::<LeadStatus>() {
                                                                    change_status(status_id.clone(), status);
                                                                }
                                                            }
                                                        >
                                                            {LeadStatus::ALL
                                                                .into_iter()
                                                                .map(|s| view! {
                                                                    <option value=s.as_str() selected={s == current}>{s.as_str()}</option>
                                                                })
                                                                .collect_view()}
                                                        </select>
                                                    </td>
                                                    <td>
                                                        <Show when=move || can_assign.get() fallback=move || agent.clone()>
                                                            <select
                                                                class="select select-bordered select-sm"
                                                                on:change={
                                                                    let to_assign = to_assign.clone();
                                                                    move |ev| assign(to_assign.clone(), event_target_value(&ev))
                                                                }
                                                            >
                                                                <option value="" disabled selected=agent_id.is_empty()>"Unassigned"</option>
                                                                {
                                                                    let agent_id = agent_id.clone();
                                                                    move || {
                                                                        agents
                                                                            .get()
                                                                            .into_iter()
                                                                            .map(|a| {
                                                                                let selected = a.id == agent_id;
                                                                                view! { <option value=a.id.clone() selected=selected>{a.full_name()}</option> }
                                                                            })
                                                                            .collect_view()
                                                                    }
                                                                }
                                                            </select>
                                                        </Show>
                                                    </td>
                                                    <td>
                                                        <button
                                                            class="btn btn-ghost btn-sm text-error"
                                                            title="Delete"
                                                            on:click=move |_| ask_delete(to_delete.clone())
                                                        >
                                                            <Trash2 attr:class="h-4 w-4" />
                                                        </button>
                                                    </td>
                                                </tr>
                                            }
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>
                    }
                    .into_any(),
                }}
            </div>
        </div>

        <div class="flex items-center justify-between">
            <span class="text-sm opacity-70">{move || table_text(table, ClientTable::summary)}</span>
            <div class="join">
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !table.with(|t| t.ready().is_some_and(ClientTable::has_prev_page))
                    on:click=move |_| table.update(|t| {
                        t.update(|t| t.set_page(t.page().saturating_sub(1)));
                    })
                >
                    <ChevronLeft attr:class="h-4 w-4" />
                </button>
                <button class="join-item btn btn-sm no-animation">
                    {move || table_text(table, |t| format!("Page {} of {}", t.page(), t.page_count()))}
                </button>
                <button
                    class="join-item btn btn-sm"
                    disabled=move || !table.with(|t| t.ready().is_some_and(ClientTable::has_next_page))
                    on:click=move |_| table.update(|t| {
                        t.update(|t| t.set_page(t.page() + 1));
                    })
                >
                    <ChevronRight attr:class="h-4 w-4" />
                </button>
            </div>
        </div>

        <ConfirmDialog open=confirm_open title="Delete client" message=delete_message on_confirm=on_delete />
        <AddClientDialog open=adding on_created=on_created />
    }
}

#[component]
fn AddClientDialog(open: RwSignal<bool>, on_created: Callback<Client>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let draft = RwSignal::new(NewClient::default());
    let (submitting, set_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let countries = RwSignal::new(Vec::<String>::new());

    {
        let api = auth.api();
        spawn_local(async move {
            match api.client_countries().await {
                Ok(list) => countries.set(list),
                Err(err) => tracing::debug!(error = %err, "country suggestions unavailable"),
            }
        });
    }

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let client = draft.get_untracked();
        if let Err(errors) = client.validate() {
            set_error_msg.set(Some(first_message(&errors)));
            return;
        }
        set_error_msg.set(None);
        set_submitting.set(true);
        let api = auth.api();
        spawn_local(async move {
            match api.create_client(&client).await {
                Ok(created) => {
                    on_created.run(created);
                    draft.set(NewClient::default());
                    open.set(false);
                    toasts.success("Client added");
                }
                Err(err) => set_error_msg.set(Some(err.to_string())),
            }
            set_submitting.set(false);
        });
    };

    let field = move |label: &'static str, kind: &'static str, get: fn(&NewClient) -> String, set: fn(&mut NewClient, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type=kind
                    class="input input-bordered"
                    prop:value=move || draft.with(get)
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        draft.update(|d| set(d, value));
                    }
                />
            </div>
        }
    };

    view! {
        <Modal open=open title="Add Client">
            <form class="space-y-2" on:submit=on_submit>
                {move || error_msg.get().map(|msg| view! { <ErrorBanner message=msg /> })}
                {field("First name", "text", |d| d.first_name.clone(), |d, v| d.first_name = v)}
                {field("Last name", "text", |d| d.last_name.clone(), |d, v| d.last_name = v)}
                {field("Email", "email", |d| d.email.clone(), |d, v| d.email = v)}
                {field("Phone", "tel", |d| d.phone.clone(), |d, v| d.phone = v)}
                <div class="form-control">
                    <label class="label"><span class="label-text">"Country"</span></label>
                    <input
                        type="text"
                        class="input input-bordered"
                        list="client-countries"
                        prop:value=move || draft.with(|d| d.country.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            draft.update(|d| d.country = value);
                        }
                    />
                    <datalist id="client-countries">
                        <For
                            each=move || countries.get()
                            key=|c| c.clone()
                            children=|c| view! { <option value=c></option> }
                        />
                    </datalist>
                </div>
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| open.set(false)>"Cancel"</button>
                    <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>"Save"</button>
                </div>
            </form>
        </Modal>
    }
}
