use rocket::request::FlashMessage;
use serde_json::{json, Value};

use crate::auth::AdminUser;
use crate::binding::Section;
use crate::context::AppContext;
use crate::modal::Modal;
use crate::models::preferences::Preferences;
use crate::toast::ToastQueue;

pub mod account;
pub mod api;
pub mod dashboard;
pub mod lists;
pub mod sections;

/// Where a section lives. Sections with their own page are not served by
/// the generic section route.
pub(crate) fn section_href(base: &str, section: Section) -> String {
    match section {
        Section::Dashboard => base.to_string(),
        Section::Branches => format!("{}/branches", base),
        Section::Social => format!("{}/social", base),
        Section::VisitsStats => format!("{}/stats", base),
        Section::Account => format!("{}/account", base),
        other => format!("{}/section/{}", base, other.slug()),
    }
}

/// Accept only redirect targets inside the admin panel.
pub(crate) fn safe_return(base: &str, target: Option<&str>) -> String {
    match target {
        Some(t) if t == base || t.starts_with(&format!("{}/", base)) => t.to_string(),
        _ => base.to_string(),
    }
}

/// Layout context shared by every admin page: navigation, counters, dirty
/// state, preferences, toasts and the (hidden) modal.
pub(crate) fn page_context(
    ctx: &AppContext,
    admin: &AdminUser,
    current: Section,
    flash: Option<FlashMessage<'_>>,
) -> Value {
    let base = ctx.admin_base();
    let ws = &ctx.workspace;

    let nav: Vec<Value> = Section::ALL
        .iter()
        .map(|s| {
            json!({
                "slug": s.slug(),
                "title": s.title(),
                "href": section_href(&base, *s),
                "active": *s == current,
            })
        })
        .collect();

    let mut toasts = ToastQueue::new();
    toasts.push_flash(flash.as_ref());

    json!({
        "admin_base": base,
        "page_title": current.title(),
        "section": current.slug(),
        "current_href": section_href(&base, current),
        "nav": nav,
        "prev_href": section_href(&base, current.prev()),
        "next_href": section_href(&base, current.next()),
        "dirty": ws.is_dirty(),
        "fallback": ws.is_fallback(),
        "last_saved": ws.last_saved().map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        "counters": ws.counters(),
        "prefs": Preferences::load(ctx.store()),
        "username": admin.username,
        "display_name": admin.display_name(),
        "toasts": toasts.render(),
        "modal": Modal::hidden().render(),
        "has_section_form": false,
    })
}

/// Set a key on a page context built by `page_context`.
pub(crate) fn with(mut context: Value, key: &str, value: Value) -> Value {
    if let Some(map) = context.as_object_mut() {
        map.insert(key.to_string(), value);
    }
    context
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::dashboard,
        dashboard::stats_page,
        dashboard::stats_refresh,
        sections::section_page,
        sections::section_save,
        sections::save_all,
        lists::branches_page,
        lists::branches_add,
        lists::branches_update,
        lists::branches_delete,
        lists::social_page,
        lists::social_add,
        lists::social_update,
        lists::social_delete,
        account::account_page,
        account::account_save,
        api::preferences_save,
        api::reload,
        api::export,
        api::counters,
    ]
}
