//! 私有页面外壳：侧边栏 + 页头（搜索、用户信息、退出确认）

use crate::auth::use_auth;
use crate::components::common::Modal;
use crate::components::icons::*;
use crate::logic::HeaderSearch;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Clone, Copy, PartialEq, Eq)]
enum NavIcon {
    Dashboard,
    Clients,
    Tasks,
    Communications,
    Reports,
    Settings,
}

const NAV_ITEMS: [(AppRoute, &str, NavIcon); 6] = [
    (AppRoute::Dashboard, "Dashboard", NavIcon::Dashboard),
    (AppRoute::Clients, "Clients", NavIcon::Clients),
    (AppRoute::Tasks, "Tasks", NavIcon::Tasks),
    (AppRoute::Communications, "Communications", NavIcon::Communications),
    (AppRoute::Reports, "Reports", NavIcon::Reports),
    (AppRoute::Settings, "Settings", NavIcon::Settings),
];

fn nav_icon(icon: NavIcon) -> AnyView {
    match icon {
        NavIcon::Dashboard => view! { <LayoutDashboard attr:class="h-5 w-5" /> }.into_any(),
        NavIcon::Clients => view! { <Users attr:class="h-5 w-5" /> }.into_any(),
        NavIcon::Tasks => view! { <CheckSquare attr:class="h-5 w-5" /> }.into_any(),
        NavIcon::Communications => view! { <MessageSquare attr:class="h-5 w-5" /> }.into_any(),
        NavIcon::Reports => view! { <BarChart attr:class="h-5 w-5" /> }.into_any(),
        NavIcon::Settings => view! { <Settings attr:class="h-5 w-5" /> }.into_any(),
    }
}

/// 客户详情页在侧边栏中归属于客户列表
fn is_active(current: &AppRoute, item: &AppRoute) -> bool {
    match (current, item) {
        (AppRoute::ClientProfile(_), AppRoute::Clients) => true,
        _ => current == item,
    }
}

#[component]
fn Sidebar() -> impl IntoView {
    let router = use_router();

    view! {
        <aside class="w-64 shrink-0 bg-base-100 shadow-xl hidden md:flex flex-col">
            <div class="p-6 flex items-center gap-2">
                <div class="p-2 bg-primary/10 rounded-xl text-primary">
                    <ShieldCheck attr:class="h-6 w-6" />
                </div>
                <span class="text-xl font-bold">"CRM Desk"</span>
            </div>
            <ul class="menu px-4 gap-1">
                {NAV_ITEMS
                    .into_iter()
                    .map(|(route, label, icon)| {
                        let path = route.to_path();
                        let target = route.clone();
                        let class = move || {
                            if is_active(&router.current_route().get(), &route) {
                                "flex gap-3 active"
                            } else {
                                "flex gap-3"
                            }
                        };
                        let on_click = move |ev: web_sys::MouseEvent| {
                            ev.prevent_default();
                            router.go(target.clone());
                        };
                        view! {
                            <li>
                                <a href=path class=class on:click=on_click>
                                    {nav_icon(icon)}
                                    {label}
                                </a>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </aside>
    }
}

#[component]
fn SearchBox() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let search = RwSignal::new(HeaderSearch::default());

    let on_input = move |ev: leptos::ev::Event| {
        let value = event_target_value(&ev);
        let Some((generation, query)) = search.try_update(|s| s.set_query(&value)).flatten() else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            let results = match api.search_clients(&query).await {
                Ok(results) => results,
                Err(err) => {
                    tracing::warn!(%query, error = %err, "header search failed");
                    Vec::new()
                }
            };
            search.update(|s| {
                s.finish(generation, results);
            });
        });
    };

    let open_client = move |id: String| {
        search.update(HeaderSearch::clear);
        router.go(AppRoute::ClientProfile(id));
    };

    view! {
        <div class="relative w-full max-w-md">
            <label class="input input-bordered flex items-center gap-2">
                <Search attr:class="h-4 w-4 opacity-60" />
                <input
                    type="text"
                    class="grow"
                    placeholder="Search clients..."
                    prop:value=move || search.with(|s| s.query().to_string())
                    on:input=on_input
                />
                <Show when=move || search.with(HeaderSearch::is_searching)>
                    <span class="loading loading-spinner loading-xs"></span>
                </Show>
            </label>
            <Show when=move || search.with(|s| !s.results().is_empty())>
                <ul class="menu bg-base-100 rounded-box shadow-xl absolute z-40 mt-2 w-full">
                    <For
                        each=move || search.with(|s| s.results().to_vec())
                        key=|client| client.id.clone()
                        children=move |client| {
                            let id = client.id.clone();
                            view! {
                                <li>
                                    <a on:click=move |_| open_client(id.clone())>
                                        <span class="font-medium">{client.full_name()}</span>
                                        <span class="text-xs opacity-60">{client.display_id().to_string()}</span>
                                    </a>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
}

#[component]
fn LogoutDialog(open: RwSignal<bool>) -> impl IntoView {
    let auth = use_auth();
    let (leaving, set_leaving) = signal(false);

    let on_confirm = move |_| {
        set_leaving.set(true);
        // 登出总会清空状态，随后路由守卫卸载整个外壳
        spawn_local(async move { auth.logout().await });
    };

    view! {
        <Modal open=open title="Sign out">
            <p class="py-2">"Are you sure you want to sign out?"</p>
            <div class="modal-action">
                <button class="btn" on:click=move |_| open.set(false)>"Cancel"</button>
                <button class="btn btn-error gap-2" disabled=move || leaving.get() on:click=on_confirm>
                    <LogOut attr:class="h-4 w-4" />
                    "Sign out"
                </button>
            </div>
        </Modal>
    }
}

/// 已登录页面的外壳
#[component]
pub fn AppShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let user = auth.user();
    let confirm_logout = RwSignal::new(false);

    let title = move || router.current_route().with(AppRoute::title);
    let initials = move || user.with(|u| u.as_ref().map(|u| u.initials()).unwrap_or_default());
    let name = move || user.with(|u| u.as_ref().map(|u| u.full_name()).unwrap_or_default());
    let role = move || user.with(|u| u.as_ref().map(|u| u.role.label()).unwrap_or_default());

    view! {
        <div class="min-h-screen flex bg-base-200 font-sans">
            <Sidebar />
            <div class="flex-1 flex flex-col min-w-0">
                <header class="navbar bg-base-100 shadow gap-4 px-6">
                    <h1 class="text-xl font-bold flex-none">{title}</h1>
                    <div class="flex-1 flex justify-center">
                        <SearchBox />
                    </div>
                    <div class="flex-none flex items-center gap-3">
                        <Link to="/profile" class="flex items-center gap-2 btn btn-ghost">
                            <div class="avatar placeholder">
                                <div class="bg-primary text-primary-content rounded-full w-9">
                                    <span>{initials}</span>
                                </div>
                            </div>
                            <div class="hidden lg:flex flex-col items-start leading-tight">
                                <span class="font-medium">{name}</span>
                                <span class="text-xs opacity-60">{role}</span>
                            </div>
                        </Link>
                        <button class="btn btn-ghost btn-square" title="Sign out" on:click=move |_| confirm_logout.set(true)>
                            <LogOut attr:class="h-5 w-5" />
                        </button>
                    </div>
                </header>
                <main class="p-4 md:p-8 space-y-6">{children()}</main>
            </div>
            <LogoutDialog open=confirm_logout />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_profile_highlights_clients() {
        let profile = AppRoute::ClientProfile("c1".into());
        assert!(is_active(&profile, &AppRoute::Clients));
        assert!(!is_active(&profile, &AppRoute::Dashboard));
        assert!(is_active(&AppRoute::Tasks, &AppRoute::Tasks));
    }
}
