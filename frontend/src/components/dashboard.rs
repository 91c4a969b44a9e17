use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::logic::FetchState;
use crate::web::router::Link;
use crmdesk_shared::{DashboardStats, ListQuery, Task, TaskStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

const RECENT_TASKS: u32 = 5;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let user = auth.user();

    let stats = RwSignal::new(FetchState::<DashboardStats>::Loading);
    let tasks = RwSignal::new(FetchState::<Vec<Task>>::Loading);

    let load = move || {
        let api = auth.api();
        stats.set(FetchState::Loading);
        tasks.set(FetchState::Loading);
        spawn_local(async move {
            stats.set(FetchState::from_result(api.dashboard_stats().await));
            let query = ListQuery::page(1, RECENT_TASKS).with_status(TaskStatus::Pending.as_str());
            tasks.set(FetchState::from_result(
                api.list_tasks(query).await.map(|page| page.items),
            ));
        });
    };
    load();

    let stat = move |pick: fn(&DashboardStats) -> u64| {
        Signal::derive(move || {
            stats.with(|s| s.ready().map(|s| pick(s).to_string()).unwrap_or_else(|| "-".into()))
        })
    };

    let greeting = move || {
        user.with(|u| match u {
            Some(u) => format!("Welcome back, {}", u.first_name),
            None => "Welcome back".to_string(),
        })
    };

    view! {
        <div class="flex flex-col md:flex-row md:items-center justify-between gap-4">
            <div>
                <h2 class="text-2xl font-bold">{greeting}</h2>
                <p class="text-base-content/70">"Here is what is happening with your clients today."</p>
            </div>
            <button class="btn btn-ghost gap-2" on:click=move |_| load()>
                <RefreshCw attr:class="h-4 w-4" />
                "Refresh"
            </button>
        </div>

        {move || stats.with(|s| s.error().map(|e| view! { <ErrorBanner message=e.to_string() /> }))}

        <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4">
            <StatCard title="Total Clients" value=stat(|s| s.total_clients) />
            <StatCard title="Active Agents" value=stat(|s| s.active_agents) />
            <StatCard title="Pending Tasks" value=stat(|s| s.pending_tasks) accent="text-warning" />
            <StatCard title="FTD This Month" value=stat(|s| s.ftd_this_month) accent="text-success" />
        </div>

        <div class="grid grid-cols-1 lg:grid-cols-3 gap-6">
            <div class="card bg-base-100 shadow-xl lg:col-span-2">
                <div class="card-body">
                    <div class="flex items-center justify-between">
                        <h3 class="card-title">"Pending Tasks"</h3>
                        <Link to="/tasks" class="btn btn-sm btn-ghost">"View all"</Link>
                    </div>
                    {move || match tasks.get() {
                        FetchState::Loading => view! { <Loading /> }.into_any(),
                        FetchState::Failed(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
                        FetchState::Ready(list) if list.is_empty() => view! {
                            <p class="text-center py-8 text-base-content/60">"No pending tasks"</p>
                        }
                        .into_any(),
                        FetchState::Ready(list) => view! {
                            <ul class="divide-y divide-base-200">
                                {list
                                    .into_iter()
                                    .map(|task| {
                                        let client = task.client.as_ref().map(|c| c.display_name()).unwrap_or_default();
                                        view! {
                                            <li class="py-3 flex items-center justify-between gap-4">
                                                <div>
                                                    <p class="font-medium">{task.title.clone()}</p>
                                                    <p class="text-sm opacity-60">{client}</p>
                                                </div>
                                                <div class="flex items-center gap-2">
                                                    <span class=priority_badge(task.priority)>{task.priority.label()}</span>
                                                    <span class="text-sm opacity-70 flex items-center gap-1">
                                                        <Calendar attr:class="h-4 w-4" />
                                                        {due_label(task.due_date)}
                                                    </span>
                                                </div>
                                            </li>
                                        }
                                    })
                                    .collect_view()}
                            </ul>
                        }
                        .into_any(),
                    }}
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body gap-3">
                    <h3 class="card-title">"Quick Actions"</h3>
                    <Link to="/clients" class="btn btn-outline justify-start gap-2">
                        <Users attr:class="h-4 w-4" /> "Manage clients"
                    </Link>
                    <Link to="/tasks" class="btn btn-outline justify-start gap-2">
                        <CheckSquare attr:class="h-4 w-4" /> "Review tasks"
                    </Link>
                    <Link to="/communications" class="btn btn-outline justify-start gap-2">
                        <MessageSquare attr:class="h-4 w-4" /> "Contact a client"
                    </Link>
                    <Link to="/reports" class="btn btn-outline justify-start gap-2">
                        <BarChart attr:class="h-4 w-4" /> "Open reports"
                    </Link>
                </div>
            </div>
        </div>
    }
}
