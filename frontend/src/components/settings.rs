use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::components::toast::use_toasts;
use crate::logic::FetchState;
use crmdesk_shared::form::first_message;
use crmdesk_shared::protocol::users::NewUser;
use crmdesk_shared::user::access;
use crmdesk_shared::{Role, User, UserPatch};
use leptos::prelude::*;
use leptos::task::spawn_local;
use validator::Validate;

/// 两次输入的新密码是否一致
fn confirmation_error(new: &str, confirm: &str) -> Option<&'static str> {
    (new != confirm).then_some("New passwords do not match")
}

/// 当前角色可见范围的一行说明
fn visibility_rows(user: Option<&User>) -> Vec<(&'static str, bool)> {
    vec![
        ("Client phone numbers", access::can_view_phone_numbers(user)),
        ("Client email addresses", access::can_view_email_addresses(user)),
        ("Full client details", access::can_view_full_client_details(user)),
        ("Export client data", access::can_export_data(user)),
        ("Assign clients to agents", access::can_assign_clients(user)),
        ("Manage team members", access::can_manage_users(user)),
    ]
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let auth = use_auth();
    let user = auth.user();
    let can_manage = Memo::new(move |_| user.with(|u| access::can_manage_users(u.as_ref())));

    view! {
        <div class="grid grid-cols-1 lg:grid-cols-2 gap-6">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">
                        <ShieldCheck attr:class="h-5 w-5 text-primary" />
                        "Access & Visibility"
                    </h3>
                    <p class="text-sm text-base-content/70">
                        "Signed in as "
                        <span class="font-semibold">
                            {move || user.with(|u| u.as_ref().map(|u| u.role.label()).unwrap_or("Guest"))}
                        </span>
                        ". Contact details are hidden from agents and only shown to administrators."
                    </p>
                    <ul class="space-y-2 mt-2">
                        {move || {
                            user.with(|u| visibility_rows(u.as_ref()))
                                .into_iter()
                                .map(|(label, allowed)| view! {
                                    <li class="flex items-center justify-between">
                                        <span>{label}</span>
                                        {if allowed {
                                            view! { <span class="badge badge-success">"Allowed"</span> }.into_any()
                                        } else {
                                            view! { <span class="badge badge-ghost">"Restricted"</span> }.into_any()
                                        }}
                                    </li>
                                })
                                .collect_view()
                        }}
                    </ul>
                </div>
            </div>

            <ChangePasswordCard />
        </div>

        <Show when=move || can_manage.get()>
            <TeamCard />
        </Show>
    }
}

#[component]
fn ChangePasswordCard() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    let current = RwSignal::new(String::new());
    let new_password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let new = new_password.get_untracked();
        if let Some(msg) = confirmation_error(&new, &confirm.get_untracked()) {
            set_error_msg.set(Some(msg.to_string()));
            return;
        }
        set_error_msg.set(None);
        set_saving.set(true);

        let api = auth.api();
        let current_value = current.get_untracked();
        spawn_local(async move {
            match api.change_password(&current_value, &new).await {
                Ok(res) => {
                    current.set(String::new());
                    new_password.set(String::new());
                    confirm.set(String::new());
                    toasts.success(res.message.unwrap_or_else(|| "Password updated".to_string()));
                }
                Err(err) => set_error_msg.set(Some(err.to_string())),
            }
            set_saving.set(false);
        });
    };

    let field = move |label: &'static str, value: RwSignal<String>| {
        view! {
            <label class="form-control w-full">
                <div class="label">
                    <span class="label-text">{label}</span>
                </div>
                <input
                    type="password"
                    class="input input-bordered w-full"
                    prop:value=value
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">
                    <Settings attr:class="h-5 w-5 text-primary" />
                    "Change Password"
                </h3>
                {field("Current password", current)}
                {field("New password", new_password)}
                {field("Confirm new password", confirm)}
                {move || error_msg.get().map(|msg| view! { <ErrorBanner message=msg /> })}
                <div class="card-actions justify-end mt-2">
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                        {move || if saving.get() { "Saving..." } else { "Update Password" }}
                    </button>
                </div>
            </form>
        </div>
    }
}

// =========================================================
// 团队成员 (Team, admin only)
// =========================================================

#[component]
fn TeamCard() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    let users = RwSignal::new(FetchState::<Vec<User>>::Loading);
    let add_open = RwSignal::new(false);
    let confirm_open = RwSignal::new(false);
    let pending_delete = RwSignal::new(Option::<User>::None);

    let load = move || {
        let api = auth.api();
        users.set(FetchState::Loading);
        spawn_local(async move {
            users.set(FetchState::from_result(api.list_users().await));
        });
    };
    load();

    let on_delete = Callback::new(move |()| {
        let Some(target) = pending_delete.get_untracked() else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            match api.delete_user(&target.id).await {
                Ok(_) => {
                    users.update(|u| {
                        u.update(|list| list.retain(|x| x.id != target.id));
                    });
                    toasts.success("Team member removed");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    });

    let change_role = move |id: String, role: Role| {
        let api = auth.api();
        let patch = UserPatch {
            role: Some(role),
            ..Default::default()
        };
        spawn_local(async move {
            match api.update_user(&id, patch).await {
                Ok(updated) => {
                    users.update(|u| {
                        u.update(|list| {
                            if let Some(slot) = list.iter_mut().find(|x| x.id == updated.id) {
                                *slot = updated;
                            }
                        });
                    });
                    toasts.success("Role updated");
                }
                Err(err) => toasts.error(err.to_string()),
            }
        });
    };

    let on_created = Callback::new(move |user: User| {
        users.update(|u| {
            u.update(|list| list.push(user));
        });
    });

    let delete_message = Signal::derive(move || {
        pending_delete.with(|u| {
            u.as_ref()
                .map(|u| format!("Remove {} from the team?", u.full_name()))
                .unwrap_or_default()
        })
    });

    view! {
        <div class="card bg-base-100 shadow-xl">
            <div class="card-body">
                <div class="flex items-center justify-between">
                    <h3 class="card-title">
                        <Users attr:class="h-5 w-5 text-primary" />
                        "Team Members"
                    </h3>
                    <button class="btn btn-sm btn-primary gap-2" on:click=move |_| add_open.set(true)>
                        <Plus attr:class="h-4 w-4" />
                        "Add Member"
                    </button>
                </div>
                {move || match users.get() {
                    FetchState::Loading => view! { <Loading /> }.into_any(),
                    FetchState::Failed(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
                    FetchState::Ready(list) => view! {
                        <div class="overflow-x-auto">
                            <table class="table">
                                <thead>
                                    <tr>
                                        <th>"Name"</th>
                                        <th>"Email"</th>
                                        <th>"Role"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {list
                                        .into_iter()
                                        .map(|member| {
                                            let target = member.clone();
                                            let id = member.id.clone();
                                            let current = member.role;
                                            view! {
                                                <tr>
                                                    <td>{member.full_name()}</td>
                                                    <td>{member.email.clone()}</td>
                                                    <td>
                                                        <select
                                                            class="select select-bordered select-sm"
                                                            on:change=move |ev| {
                                                                let value = event_target_value(&ev);
                                                                if let Some(r) = Role::ALL.into_iter().find(|r| r.as_str() == value) {
                                                                    change_role(id.clone(), r);
                                                                }
                                                            }
                                                        >
                                                            {Role::ALL
                                                                .into_iter()
                                                                .map(|r| view! { <option value=r.as_str() selected={r == current}>{r.label()}</option> })
                                                                .collect_view()}
                                                        </select>
                                                    </td>
                                                    <td class="text-right">
                                                        <button
                                                            class="btn btn-ghost btn-xs text-error"
                                                            on:click=move |_| {
                                                                pending_delete.set(Some(target.clone()));
                                                                confirm_open.set(true);
                                                            }
                                                        >
                                                            <Trash2 attr:class="h-4 w-4" />
                                                        </button>
                                                    </td>
                                                </tr>
                                            }
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

        <AddMemberDialog open=add_open on_created=on_created />
        <ConfirmDialog
            open=confirm_open
            title="Remove Team Member"
            message=delete_message
            confirm_label="Remove"
            on_confirm=on_delete
        />
    }
}

#[component]
fn AddMemberDialog(open: RwSignal<bool>, on_created: Callback<User>) -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role = RwSignal::new(Role::default());
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = NewUser {
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
            role: role.get_untracked(),
        };
        if let Err(errors) = draft.validate() {
            set_error_msg.set(Some(first_message(&errors)));
            return;
        }
        set_error_msg.set(None);
        set_saving.set(true);

        let api = auth.api();
        spawn_local(async move {
            match api.create_user(&draft).await {
                Ok(user) => {
                    on_created.run(user);
                    first_name.set(String::new());
                    last_name.set(String::new());
                    email.set(String::new());
                    password.set(String::new());
                    role.set(Role::default());
                    open.set(false);
                    toasts.success("Team member added");
                }
                Err(err) => set_error_msg.set(Some(err.to_string())),
            }
            set_saving.set(false);
        });
    };

    let text = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <label class="form-control w-full">
                <div class="label">
                    <span class="label-text">{label}</span>
                </div>
                <input
                    type=kind
                    class="input input-bordered w-full"
                    prop:value=value
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
        }
    };

    view! {
        <Modal open=open title="Add Team Member">
            <form class="space-y-2" on:submit=on_submit>
                <div class="grid grid-cols-2 gap-3">
                    {text("First name", "text", first_name)}
                    {text("Last name", "text", last_name)}
                </div>
                {text("Email", "email", email)}
                {text("Password", "password", password)}
                <label class="form-control w-full">
                    <div class="label">
                        <span class="label-text">"Role"</span>
                    </div>
                    <select
                        class="select select-bordered w-full"
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            if let Some(r) = Role::ALL.into_iter().find(|r| r.as_str() == value) {
                                role.set(r);
                            }
                        }
                    >
                        {Role::ALL
                            .into_iter()
                            .map(|r| view! { <option value=r.as_str() selected=move || role.get() == r>{r.label()}</option> })
                            .collect_view()}
                    </select>
                </label>
                {move || error_msg.get().map(|msg| view! { <ErrorBanner message=msg /> })}
                <div class="modal-action">
                    <button type="button" class="btn" on:click=move |_| open.set(false)>"Cancel"</button>
                    <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                        {move || if saving.get() { "Saving..." } else { "Add Member" }}
                    </button>
                </div>
            </form>
        </Modal>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u1".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            role,
            ..Default::default()
        }
    }

    #[test]
    fn test_confirmation_error() {
        assert_eq!(confirmation_error("new-secret", "new-secret"), None);
        assert_eq!(
            confirmation_error("new-secret", "new-secreT"),
            Some("New passwords do not match")
        );
    }

    #[test]
    fn test_visibility_rows_follow_role() {
        let admin = user(Role::Admin);
        assert!(visibility_rows(Some(&admin)).iter().all(|(_, allowed)| *allowed));

        let agent = user(Role::Agent);
        assert!(visibility_rows(Some(&agent)).iter().all(|(_, allowed)| !*allowed));
        assert!(visibility_rows(None).iter().all(|(_, allowed)| !*allowed));
    }
}
