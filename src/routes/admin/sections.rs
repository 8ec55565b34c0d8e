use std::collections::HashMap;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::auth::AdminUser;
use crate::binding::Section;
use crate::context::AppContext;
use crate::toast::Toast;
use super::{page_context, safe_return, section_href, with};

pub const SAVE_IN_PROGRESS_MSG: &str = "جاري حفظ هذا القسم، يرجى الانتظار";

// ── Section pages ──────────────────────────────────────

#[get("/section/<name>")]
pub fn section_page(
    admin: AdminUser,
    ctx: &State<AppContext>,
    name: &str,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Redirect> {
    let base = ctx.admin_base();
    let section = match Section::from_slug(name) {
        Some(s) => s,
        None => return Err(Redirect::to(base)),
    };

    // Dashboard, lists, stats and account have pages of their own
    let href = section_href(&base, section);
    if href != format!("{}/section/{}", base, section.slug()) {
        return Err(Redirect::to(href));
    }

    let fields = ctx.workspace.section_fields(section).map_err(|e| {
        log::error!("Failed to read section {}: {}", section.slug(), e);
        Redirect::to(base.clone())
    })?;

    let context = page_context(ctx, &admin, section, flash);
    let context = with(context, "fields", json!(fields));
    let context = with(context, "save_action", json!(href));
    let context = with(context, "has_section_form", json!(true));
    Ok(Template::render("admin/section", &context))
}

/// Save one section. Only the section's own field ids are read from the
/// submitted form.
#[post("/section/<name>", data = "<form>")]
pub async fn section_save(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    name: &str,
    form: Form<HashMap<String, String>>,
) -> Flash<Redirect> {
    let base = ctx.admin_base();
    let section = match Section::from_slug(name).filter(Section::is_editable) {
        Some(s) => s,
        None => return Toast::error(format!("القسم غير قابل للحفظ: {}", name)).redirect(base),
    };
    let back = section_href(&base, section);

    let _ticket = match ctx.workspace.begin_save(section) {
        Some(t) => t,
        None => return Toast::warning(SAVE_IN_PROGRESS_MSG).redirect(back),
    };

    let delay = ctx.config.save_delay();
    if !delay.is_zero() {
        rocket::tokio::time::sleep(delay).await;
    }

    match ctx.workspace.save_section(section, &form, ctx.store()) {
        Ok(()) => Toast::success(section.saved_message()).redirect(back),
        Err(e) => {
            log::error!("Failed to save section {}: {}", section.slug(), e);
            Toast::error(format!("حدث خطأ أثناء الحفظ: {}", e)).redirect(back)
        }
    }
}

/// Global save. A page may post its own form here; a `return_to` field
/// picks the page to come back to.
#[post("/save-all", data = "<form>")]
pub async fn save_all(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    form: Form<HashMap<String, String>>,
) -> Flash<Redirect> {
    let base = ctx.admin_base();
    let back = safe_return(&base, form.get("return_to").map(String::as_str));

    let delay = ctx.config.save_delay();
    if !delay.is_zero() {
        rocket::tokio::time::sleep(delay).await;
    }

    match ctx.workspace.save_all(&form, ctx.store()) {
        Ok(()) => Toast::success("تم حفظ جميع التغييرات بنجاح!").redirect(back),
        Err(e) => {
            log::error!("Failed to save all changes: {}", e);
            Toast::error(format!("حدث خطأ أثناء الحفظ: {}", e)).redirect(back)
        }
    }
}
