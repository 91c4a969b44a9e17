use crate::auth::{BrowserApi, use_auth};
use crate::components::common::*;
use crate::components::icons::*;
use crate::components::toast::{Toasts, use_toasts};
use crate::logic::{FetchState, TaskBoard, TaskFilters};
use crmdesk_shared::date::parse_date;
use crmdesk_shared::{NewTask, Task, TaskPatch, TaskPriority, TaskStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 乐观更新任务状态，请求失败时回滚并提示
pub fn change_task_status(
    api: BrowserApi,
    board: RwSignal<FetchState<TaskBoard>>,
    toasts: Toasts,
    id: String,
    status: TaskStatus,
) {
    let mut previous = None;
    board.update(|b| {
        b.update(|b| previous = b.set_status(&id, status));
    });
    let Some(previous) = previous else {
        return;
    };

    spawn_local(async move {
        match api.update_task(&id, TaskPatch::status(status)).await {
            Ok(task) => board.update(|b| {
                b.update(|b| b.reconcile(task));
            }),
            Err(err) => {
                tracing::warn!(task = %id, error = %err, "status update rejected, rolling back");
                board.update(|b| {
                    b.update(|b| {
                        b.set_status(&id, previous);
                    });
                });
                toasts.error(err.to_string());
            }
        }
    });
}

#[component]
pub fn TaskManagementPage() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let config = use_config();

    let board = RwSignal::new(FetchState::<TaskBoard>::Loading);
    let filters = RwSignal::new(TaskFilters::default());
    let adding = RwSignal::new(false);
    let confirm_open = RwSignal::new(false);
    let pending_delete = RwSignal::new(Option::<Task>::None);

    let status = Memo::new(move |_| board.with(|b| (b.is_loading(), b.error().map(str::to_string))));

    let limit = config.list_limit;
    let load = move || {
        let api = auth.api();
        let query = filters.with_untracked(|f| f.query(limit));
        spawn_local(async move {
            let result = api
                .list_tasks(query)
                .await
                .map(|page| TaskBoard::new(page.items).with_filters(filters.get_untracked()));
            board.set(FetchState::from_result(result));
        });
    };
    load();

    let apply_filters = move || {
        let current = filters.get_untracked();
        board.update(|b| {
            b.update(|b| b.set_filters(current));
        });
    };

    let on_status_filter = move |ev: leptos::ev::Event| {
        let status = event_target_value(&ev).parse::<TaskStatus>().ok();
        filters.update(|f| f.status = status);
        apply_filters();
        load();
    };

    let on_priority_filter = move |ev: leptos::ev::Event| {
        let priority = event_target_value(&ev).parse::<TaskPriority>().ok();
        filters.update(|f| f.priority = priority);
        apply_filters();
        load();
    };

    let on_delete = Callback::new(move |()| {
        let Some(task) = pending_delete.get_untracked() else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            match api.delete_task(&task.id).await {
                Ok(_) => {
                    board.update(|b| {
                        b.update(|b| {
                            b.remove(&task.id);
                        });
                    });
                    toasts.success("Task deleted");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    });

    let on_created = Callback::new(move |task: Task| {
        board.update(|b| {
            b.update(|b| b.insert(task));
        });
    });

    let delete_message = Signal::derive(move || {
        pending_delete.with(|t| match t {
            Some(t) => format!("Delete task \"{}\"?", t.title),
            None => String::new(),
        })
    });

    let count = move |s: TaskStatus| {
        Signal::derive(move || board.with(|b| b.ready().map(|b| b.count(s)).unwrap_or(0).to_string()))
    };

    view! {
        <div class="grid grid-cols-2 lg:grid-cols-4 gap-4">
            <StatCard title="Pending" value=count(TaskStatus::Pending) accent="text-warning" />
            <StatCard title="In Progress" value=count(TaskStatus::InProgress) accent="text-info" />
            <StatCard title="Completed" value=count(TaskStatus::Completed) accent="text-success" />
            <StatCard title="Overdue" value=count(TaskStatus::Overdue) accent="text-error" />
        </div>

        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div class="flex flex-wrap gap-2">
                <select class="select select-bordered" on:change=on_status_filter>
                    <option value="">"All statuses"</option>
                    {TaskStatus::ALL
                        .into_iter()
                        .map(|s| view! {
                            <option value=s.as_str() selected=move || filters.with(|f| f.status == Some(s))>{s.label()}</option>
                        })
                        .collect_view()}
                </select>
                <select class="select select-bordered" on:change=on_priority_filter>
                    <option value="">"All priorities"</option>
                    {TaskPriority::ALL
                        .into_iter()
                        .map(|p| view! {
                            <option value=p.as_str() selected=move || filters.with(|f| f.priority == Some(p))>{p.label()}</option>
                        })
                        .collect_view()}
                </select>
            </div>
            <div class="flex gap-2">
                <button class="btn btn-ghost gap-2" on:click=move |_| load()>
                    <RefreshCw attr:class="h-4 w-4" />
                    "Refresh"
                </button>
                <button class="btn btn-primary gap-2" on:click=move |_| adding.set(true)>
                    <Plus attr:class="h-4 w-4" />
                    "Add Task"
                </button>
            </div>
        </div>

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                {move || match status.get() {
                    (_, Some(msg)) => view! { <div class="p-4"><ErrorBanner message=msg /></div> }.into_any(),
                    (true, None) => view! { <Loading /> }.into_any(),
                    (false, None) => view! {
                        <TaskTable
                            board=board
                            on_delete=Callback::new(move |task: Task| {
                                pending_delete.set(Some(task));
                                confirm_open.set(true);
                            })
                        />
                    }
                    .into_any(),
                }}
            </div>
        </div>

        <ConfirmDialog open=confirm_open title="Delete task" message=delete_message on_confirm=on_delete />
        <AddTaskDialog open=adding client_id=None on_created=on_created />
    }
}

/// 任务表格，任务管理页与客户详情页共用
#[component]
pub fn TaskTable(
    board: RwSignal<FetchState<TaskBoard>>,
    #[prop(optional)] on_delete: Option<Callback<Task>>,
    #[prop(optional)] hide_client: bool,
) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let visible = move || board.with(|b| b.ready().map(TaskBoard::visible).unwrap_or_default());
    let is_empty = move || board.with(|b| b.ready().is_none_or(|b| b.visible().is_empty()));

    view! {
        <Show
            when=move || !is_empty()
            fallback=|| view! { <p class="text-center py-8 text-base-content/60">"No tasks found"</p> }
        >
            <div class="overflow-x-auto">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <th>"Task"</th>
                            <Show when=move || !hide_client><th>"Client"</th></Show>
                            <th>"Priority"</th>
                            <th>"Due"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <For
                            each=visible
                            key=|t| (t.id.clone(), t.status)
                            children=move |task| {
                                let id = task.id.clone();
                                let current = task.status;
                                let client = task.client.as_ref().map(|c| c.display_name()).unwrap_or_default();
                                let to_delete = task.clone();
                                view! {
                                    <tr class="hover">
                                        <td>
                                            <p class="font-medium">{task.title.clone()}</p>
                                            <p class="text-sm opacity-60">{task.description.clone().unwrap_or_default()}</p>
                                        </td>
                                        <Show when=move || !hide_client><td>{client.clone()}</td></Show>
                                        <td><span class=priority_badge(task.priority)>{task.priority.label()}</span></td>
                                        <td class="whitespace-nowrap">{due_label(task.due_date)}</td>
                                        <td>
                                            <select
                                                class="select select-bordered select-sm"
                                                on:change=move |ev| {
                                                    if let Ok(status) = event_target_value(&ev).parse::<TaskStatus>() {
                                                        change_task_status(auth.api(), board, toasts, id.clone(), status);
                                                    }
                                                }
                                            >
                                                {TaskStatus::ALL
                                                    .into_iter()
                                                    .map(|s| view! {
                                                        <option value=s.as_str() selected={s == current}>{s.label()}</option>
                                                    })
                                                    .collect_view()}
                                            </select>
                                        </td>
                                        <td>
                                            {on_delete.map(|cb| view! {
                                                <button
                                                    class="btn btn-ghost btn-sm text-error"
                                                    title="Delete"
                                                    on:click=move |_| cb.run(to_delete.clone())
                                                >
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            })}
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </Show>
    }
}

/// 新建任务模态框；`client_id` 存在时任务归属该客户
#[component]
pub fn AddTaskDialog(
    open: RwSignal<bool>,
    client_id: Option<String>,
    on_created: Callback<Task>,
) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();
    let fresh = move || match &client_id {
        Some(id) => NewTask::for_client(id.clone()),
        None => NewTask::default(),
    };
    let draft = RwSignal::new(fresh());
    let (submitting, set_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let reset = StoredValue::new(fresh());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let task = draft.get_untracked();
        // 标题为空时不发请求
        if let Err(msg) = TaskBoard::validate_draft(&task) {
            set_error_msg.set(Some(msg));
            return;
        }
        set_error_msg.set(None);
        set_submitting.set(true);
        let api = auth.api();
        spawn_local(async move {
            match api.create_task(&task).await {
                Ok(created) => {
                    on_created.run(created);
                    draft.set(reset.get_value());
                    open.set(false);
                    toasts.success("Task added successfully");
                }
                Err(err) => set_error_msg.set(Some(err.to_string())),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <Modal open=open title="Add Task">
            <form class="space-y-2" on:submit=on_submit>
                {move || error_msg.get().map(|msg| view! { <ErrorBanner message=msg /> })}
                <div class="form-control">
                    <label class="label"><span class="label-text">"Title"</span></label>
                    <input
                        type="text"
                        class="input input-bordered"
                        prop:value=move || draft.with(|d| d.title.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            draft.update(|d| d.title = value);
                        }
                    />
                </div>
                <div class="form-control">
                    <label class="label"><span class="label-text">"Description"</span></label>
                    <textarea
                        class="textarea textarea-bordered"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            draft.update(|d| d.description = value);
                        }
                    ></textarea>
                </div>
                <div class="grid grid-cols-2 gap-2">
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Priority"</span></label>
                        <select
                            class="select select-bordered"
                            on:change=move |ev| {
                                if let Ok(priority) = event_target_value(&ev).parse::<TaskPriority>() {
                                    draft.update(|d| d.priority = priority);
                                }
                            }
                        >
                            {TaskPriority::ALL
                                .into_iter()
                                .map(|p| view! {
                                    <option value=p.as_str() selected=move || draft.with(|d| d.priority == p)>{p.label()}</option>
                                })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Due date"</span></label>
                        <input
                            type="date"
                            class="input input-bordered"
                            prop:value=move || draft.with(|d| d.due_date.map(|d| d.to_string()).unwrap_or_default())
                            on:input=move |ev| {
                                let due = parse_date(&event_target_value(&ev));
                                draft.update(|d| d.due_date = due);
                            }
                        />
                    </div>
                </div>
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| open.set(false)>"Cancel"</button>
                    <button type="submit" class="btn btn-primary gap-2" disabled=move || submitting.get()>
                        <Calendar attr:class="h-4 w-4" />
                        "Create Task"
                    </button>
                </div>
            </form>
        </Modal>
    }
}
