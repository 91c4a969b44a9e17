use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::logic::FetchState;
use crmdesk_shared::report::{AgentPerformance, MonthlyPoint};
use crmdesk_shared::user::access;
use crmdesk_shared::{Analytics, ReportPeriod};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 柱状图每根柱子的高度百分比
fn bar_heights(points: &[MonthlyPoint]) -> Vec<f64> {
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    points
        .iter()
        .map(|p| if max > 0.0 { p.value * 100.0 / max } else { 0.0 })
        .collect()
}

#[component]
pub fn ReportsAnalyticsPage() -> impl IntoView {
    let auth = use_auth();
    let user = auth.user();

    let period = RwSignal::new(ReportPeriod::default());
    let analytics = RwSignal::new(FetchState::<Analytics>::Loading);
    let agents = RwSignal::new(FetchState::<Vec<AgentPerformance>>::Loading);
    let is_admin = Memo::new(move |_| user.with(|u| access::is_admin(u.as_ref())));

    // 切换周期时重新拉取
    Effect::new(move |_| {
        let p = period.get();
        let api = auth.api();
        analytics.set(FetchState::Loading);
        spawn_local(async move {
            analytics.set(FetchState::from_result(api.analytics(Some(p)).await));
        });
    });

    Effect::new(move |_| {
        if !is_admin.get() {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            agents.set(FetchState::from_result(api.agent_report().await));
        });
    });

    let on_period = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        if let Some(p) = ReportPeriod::ALL.into_iter().find(|p| p.as_str() == value) {
            period.set(p);
        }
    };

    let conversion = Signal::derive(move || {
        analytics.with(|a| a.ready().map(|a| format!("{:.1}%", a.conversion_rate)).unwrap_or_else(|| "-".into()))
    });
    let total_leads = Signal::derive(move || {
        analytics.with(|a| a.ready().map(|a| a.total_leads().to_string()).unwrap_or_else(|| "-".into()))
    });

    view! {
        <div class="flex items-center justify-between">
            <h2 class="text-2xl font-bold flex items-center gap-2">
                <BarChart attr:class="h-6 w-6 text-primary" />
                "Performance Overview"
            </h2>
            <select class="select select-bordered" on:change=on_period>
                {ReportPeriod::ALL
                    .into_iter()
                    .map(|p| view! {
                        <option value=p.as_str() selected=move || period.get() == p>{p.label()}</option>
                    })
                    .collect_view()}
            </select>
        </div>

        <div class="grid grid-cols-1 sm:grid-cols-2 gap-4">
            <StatCard title="Total Leads" value=total_leads />
            <StatCard title="Conversion Rate" value=conversion accent="text-success" />
        </div>

        {move || match analytics.get() {
            FetchState::Loading => view! { <Loading /> }.into_any(),
            FetchState::Failed(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
            FetchState::Ready(data) => {
                let heights = bar_heights(&data.monthly);
                view! {
                    <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <h3 class="card-title">"Lead Status"</h3>
                                <ul class="space-y-3">
                                    {data
                                        .lead_status
                                        .iter()
                                        .map(|s| {
                                            let share = data.share_of(&s.status);
                                            view! {
                                                <li>
                                                    <div class="flex justify-between text-sm">
                                                        <span>{s.status.clone()}</span>
                                                        <span class="opacity-70">{format!("{} ({share:.0}%)", s.count)}</span>
                                                    </div>
                                                    <progress class="progress progress-primary w-full" value=share max="100"></progress>
                                                </li>
                                            }
                                        })
                                        .collect_view()}
                                </ul>
                            </div>
                        </div>

                        <div class="card bg-base-100 shadow-xl">
                            <div class="card-body">
                                <h3 class="card-title">"Top Countries"</h3>
                                <table class="table">
                                    <tbody>
                                        {data
                                            .countries
                                            .iter()
                                            .map(|c| view! {
                                                <tr>
                                                    <td>{c.name.clone()}</td>
                                                    <td class="text-right font-mono">{format!("{:.0}", c.value)}</td>
                                                </tr>
                                            })
                                            .collect_view()}
                                    </tbody>
                                </table>
                            </div>
                        </div>

                        <div class="card bg-base-100 shadow-xl lg:col-span-2">
                            <div class="card-body">
                                <h3 class="card-title">"Monthly Trend"</h3>
                                <div class="flex items-end gap-2 h-48">
                                    {data
                                        .monthly
                                        .iter()
                                        .zip(heights)
                                        .map(|(p, h)| view! {
                                            <div class="flex-1 flex flex-col items-center gap-1 h-full justify-end" title=format!("{:.0}", p.value)>
                                                <div class="w-full bg-primary rounded-t" style=format!("height: {h:.0}%")></div>
                                                <span class="text-xs opacity-70">{p.month.clone()}</span>
                                            </div>
                                        })
                                        .collect_view()}
                                </div>
                            </div>
                        </div>
                    </div>
                }
                .into_any()
            }
        }}

        <Show when=move || is_admin.get()>
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Agent Performance"</h3>
                    {move || match agents.get() {
                        FetchState::Loading => view! { <Loading /> }.into_any(),
                        FetchState::Failed(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
                        FetchState::Ready(rows) => view! {
                            <div class="overflow-x-auto">
                                <table class="table table-zebra">
                                    <thead>
                                        <tr>
                                            <th>"Agent"</th>
                                            <th>"Clients"</th>
                                            <th>"Calls"</th>
                                            <th>"Tasks done"</th>
                                            <th>"Pending"</th>
                                            <th>"FTD"</th>
                                        </tr>
                                    </thead>
                                    <tbody>
                                        {rows
                                            .into_iter()
                                            .map(|row| view! {
                                                <tr>
                                                    <td>{row.agent.display_name()}</td>
                                                    <td>{row.stats.total_clients}</td>
                                                    <td>{row.stats.calls_made}</td>
                                                    <td>{row.stats.tasks_completed}</td>
                                                    <td>{row.stats.tasks_pending}</td>
                                                    <td>{row.stats.ftd}</td>
                                                </tr>
                                            })
                                            .collect_view()}
                                    </tbody>
                                </table>
                            </div>
                        }
                        .into_any(),
                    }}
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(month: &str, value: f64) -> MonthlyPoint {
        MonthlyPoint {
            month: month.into(),
            value,
        }
    }

    #[test]
    fn test_bar_heights_scale_to_max() {
        let heights = bar_heights(&[point("Jan", 50.0), point("Feb", 200.0), point("Mar", 0.0)]);
        assert_eq!(heights, vec![25.0, 100.0, 0.0]);
        assert_eq!(bar_heights(&[point("Jan", 0.0)]), vec![0.0]);
        assert!(bar_heights(&[]).is_empty());
    }
}
