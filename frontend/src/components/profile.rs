use crate::auth::use_auth;
use crate::components::common::*;
use crate::components::icons::*;
use crate::components::toast::use_toasts;
use crate::logic::FetchState;
use crate::web::{read_data_url, selected_file};
use crmdesk_shared::form::first_message;
use crmdesk_shared::{User, UserPatch, UserStats};
use leptos::prelude::*;
use leptos::task::spawn_local;
use validator::Validate;

/// 头像文件大小上限
const MAX_PICTURE_BYTES: f64 = 2.0 * 1024.0 * 1024.0;

/// 上传前检查头像的类型与大小
fn check_picture(mime: &str, size: f64) -> Result<(), &'static str> {
    if !mime.starts_with("image/") {
        return Err("Please choose an image file");
    }
    if size > MAX_PICTURE_BYTES {
        return Err("Image must be smaller than 2 MB");
    }
    Ok(())
}

/// 资料编辑表单的草稿
#[derive(Debug, Clone, PartialEq, Default)]
struct ProfileDraft {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    bio: String,
}

impl ProfileDraft {
    fn from_user(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            bio: user.bio.clone().unwrap_or_default(),
        }
    }

    /// 只提交与当前资料不同的字段
    fn diff(&self, user: &User) -> UserPatch {
        fn changed(new: &str, old: &str) -> Option<String> {
            let new = new.trim();
            (new != old).then(|| new.to_string())
        }

        UserPatch {
            first_name: changed(&self.first_name, &user.first_name),
            last_name: changed(&self.last_name, &user.last_name),
            email: changed(&self.email, &user.email),
            phone: changed(&self.phone, user.phone.as_deref().unwrap_or_default()),
            bio: changed(&self.bio, user.bio.as_deref().unwrap_or_default()),
            ..Default::default()
        }
    }
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let toasts = use_toasts();

    let profile = RwSignal::new(FetchState::<User>::Loading);
    let stats = RwSignal::new(FetchState::<UserStats>::Loading);
    let draft = RwSignal::new(ProfileDraft::default());
    let editing = RwSignal::new(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let (saving, set_saving) = signal(false);

    {
        let api = auth.api();
        spawn_local(async move {
            let result = api.profile().await;
            if let Ok(user) = &result {
                draft.set(ProfileDraft::from_user(user));
            }
            profile.set(FetchState::from_result(result));
        });
    }
    {
        let api = auth.api();
        spawn_local(async move {
            stats.set(FetchState::from_result(api.user_stats().await));
        });
    }

    let cancel = move || {
        if let Some(user) = profile.with_untracked(|p| p.ready().cloned()) {
            draft.set(ProfileDraft::from_user(&user));
        }
        set_error_msg.set(None);
        editing.set(false);
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(current) = profile.with_untracked(|p| p.ready().cloned()) else {
            return;
        };
        let patch = draft.with_untracked(|d| d.diff(&current));
        if patch.is_empty() {
            editing.set(false);
            return;
        }
        if let Err(errors) = patch.validate() {
            set_error_msg.set(Some(first_message(&errors)));
            return;
        }
        set_error_msg.set(None);
        set_saving.set(true);

        let api = auth.api();
        spawn_local(async move {
            match api.update_profile(patch.clone()).await {
                Ok(user) => {
                    draft.set(ProfileDraft::from_user(&user));
                    profile.set(FetchState::Ready(user));
                    auth.update_user(patch);
                    editing.set(false);
                    toasts.success("Profile updated");
                }
                Err(err) => set_error_msg.set(Some(err.to_string())),
            }
            set_saving.set(false);
        });
    };

    let (uploading, set_uploading) = signal(false);
    let on_picture = move |ev: leptos::ev::Event| {
        let input = event_target::<leptos::web_sys::HtmlInputElement>(&ev);
        let Some(file) = selected_file(&input) else {
            return;
        };
        if let Err(msg) = check_picture(&file.type_(), file.size()) {
            toasts.error(msg);
            return;
        }

        let api = auth.api();
        set_uploading.set(true);
        let started = read_data_url(&file, move |data_url| {
            let Some(data_url) = data_url else {
                set_uploading.set(false);
                toasts.error("Could not read the selected file");
                return;
            };
            spawn_local(async move {
                match api.upload_profile_picture(data_url).await {
                    Ok(user) => {
                        auth.update_user(UserPatch {
                            profile_picture: user.profile_picture.clone(),
                            ..Default::default()
                        });
                        profile.set(FetchState::Ready(user));
                        toasts.success("Profile picture updated");
                    }
                    Err(err) => toasts.error(err.to_string()),
                }
                set_uploading.set(false);
            });
        });
        if let Err(err) = started {
            tracing::error!(error = %err, "could not start reading picture");
            set_uploading.set(false);
        }
        input.set_value("");
    };

    let stat = move |pick: fn(&UserStats) -> u64| {
        Signal::derive(move || stats.with(|s| s.ready().map(|s| pick(s).to_string()).unwrap_or_else(|| "-".into())))
    };

    let input = move |label: &'static str, kind: &'static str, get: fn(&ProfileDraft) -> String, set: fn(&mut ProfileDraft, String)| {
        view! {
            <label class="form-control w-full">
                <div class="label">
                    <span class="label-text">{label}</span>
                </div>
                <input
                    type=kind
                    class="input input-bordered w-full"
                    disabled=move || !editing.get()
                    prop:value=move || draft.with(get)
                    on:input=move |ev| draft.update(|d| set(d, event_target_value(&ev)))
                />
            </label>
        }
    };

    view! {
        {move || match profile.get() {
            FetchState::Loading => view! { <Loading /> }.into_any(),
            FetchState::Failed(msg) => view! { <ErrorBanner message=msg /> }.into_any(),
            FetchState::Ready(user) => view! {
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body flex-row items-center gap-6">
                        <div class="flex flex-col items-center gap-2">
                            {match user.profile_picture.clone() {
                                Some(src) => view! {
                                    <div class="avatar">
                                        <div class="rounded-full w-20">
                                            <img src=src alt="Profile picture" />
                                        </div>
                                    </div>
                                }
                                .into_any(),
                                None => view! {
                                    <div class="avatar placeholder">
                                        <div class="bg-neutral text-neutral-content rounded-full w-20">
                                            <span class="text-2xl">{user.initials()}</span>
                                        </div>
                                    </div>
                                }
                                .into_any(),
                            }}
                            <label class="btn btn-xs btn-ghost">
                                {move || if uploading.get() { "Uploading..." } else { "Change photo" }}
                                <input type="file" accept="image/*" class="hidden" on:change=on_picture />
                            </label>
                        </div>
                        <div>
                            <h2 class="text-2xl font-bold">{user.full_name()}</h2>
                            <p class="text-base-content/70">{user.role.label()}</p>
                            <p class="text-sm text-base-content/60">
                                {format!("Member since {}", user.created_at.map(|t| t.format("%B %Y").to_string()).unwrap_or_else(|| "recently".into()))}
                            </p>
                        </div>
                    </div>
                </div>
            }
            .into_any(),
        }}

        <div class="grid grid-cols-2 lg:grid-cols-5 gap-4">
            <StatCard title="Clients" value=stat(|s| s.total_clients) />
            <StatCard title="Calls Made" value=stat(|s| s.calls_made) />
            <StatCard title="Tasks Done" value=stat(|s| s.tasks_completed) accent="text-success" />
            <StatCard title="Tasks Pending" value=stat(|s| s.tasks_pending) accent="text-warning" />
            <StatCard title="FTD" value=stat(|s| s.ftd) />
        </div>

        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <div class="flex items-center justify-between">
                    <h3 class="card-title">
                        <UserIcon attr:class="h-5 w-5 text-primary" />
                        "Personal Information"
                    </h3>
                    <Show
                        when=move || editing.get()
                        fallback=move || view! {
                            <button type="button" class="btn btn-sm btn-ghost" on:click=move |_| editing.set(true)>"Edit"</button>
                        }
                    >
                        <button type="button" class="btn btn-sm btn-ghost" on:click=move |_| cancel()>"Cancel"</button>
                    </Show>
                </div>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    {input("First name", "text", |d| d.first_name.clone(), |d, v| d.first_name = v)}
                    {input("Last name", "text", |d| d.last_name.clone(), |d, v| d.last_name = v)}
                    {input("Email", "email", |d| d.email.clone(), |d, v| d.email = v)}
                    {input("Phone", "tel", |d| d.phone.clone(), |d, v| d.phone = v)}
                </div>
                <label class="form-control w-full">
                    <div class="label">
                        <span class="label-text">"Bio"</span>
                    </div>
                    <textarea
                        class="textarea textarea-bordered w-full h-24"
                        disabled=move || !editing.get()
                        prop:value=move || draft.with(|d| d.bio.clone())
                        on:input=move |ev| draft.update(|d| d.bio = event_target_value(&ev))
                    ></textarea>
                </label>
                {move || error_msg.get().map(|msg| view! { <ErrorBanner message=msg /> })}
                <Show when=move || editing.get()>
                    <div class="card-actions justify-end">
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get()>
                            {move || if saving.get() { "Saving..." } else { "Save Changes" }}
                        </button>
                    </div>
                </Show>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            phone: Some("+44 20 7946 0000".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_check_picture() {
        assert_eq!(check_picture("image/png", 1024.0), Ok(()));
        assert_eq!(check_picture("application/pdf", 1024.0), Err("Please choose an image file"));
        assert_eq!(
            check_picture("image/jpeg", 3.0 * 1024.0 * 1024.0),
            Err("Image must be smaller than 2 MB")
        );
    }

    #[test]
    fn test_unchanged_draft_gives_empty_patch() {
        let user = user();
        assert!(ProfileDraft::from_user(&user).diff(&user).is_empty());
    }

    #[test]
    fn test_diff_only_carries_changed_fields() {
        let user = user();
        let mut draft = ProfileDraft::from_user(&user);
        draft.last_name = " Byron ".into();
        draft.bio = "Analyst".into();

        let patch = draft.diff(&user);
        assert_eq!(patch.last_name.as_deref(), Some("Byron"));
        assert_eq!(patch.bio.as_deref(), Some("Analyst"));
        assert_eq!(patch.first_name, None);
        assert_eq!(patch.email, None);
        assert_eq!(patch.phone, None);
    }

    #[test]
    fn test_blank_name_fails_validation() {
        let user = user();
        let mut draft = ProfileDraft::from_user(&user);
        draft.first_name = "   ".into();
        let errors = draft.diff(&user).validate().unwrap_err();
        assert_eq!(first_message(&errors), "First name is required");
    }
}
