use rocket::form::Form;
use rocket::http::Status;
use rocket::response::content::RawJson;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use rocket::State;

use crate::auth::AdminUser;
use crate::context::AppContext;
use crate::editor::Counters;
use crate::models::preferences::{Preferences, PreferencesForm};
use crate::store::DATA_KEY;
use crate::toast::Toast;
use super::safe_return;

#[post("/preferences", data = "<form>")]
pub fn preferences_save(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    form: Form<PreferencesForm>,
) -> Flash<Redirect> {
    let back = safe_return(&ctx.admin_base(), form.return_to.as_deref());
    let mut prefs = Preferences::load(ctx.store());
    prefs.merge(&form);
    match prefs.save(ctx.store()) {
        Ok(()) => Toast::success("تم حفظ التفضيلات").redirect(back),
        Err(e) => Toast::error(e).redirect(back),
    }
}

/// Drop the working copy and read the data source again.
#[post("/reload")]
pub async fn reload(_admin: AdminUser, ctx: &State<AppContext>) -> Flash<Redirect> {
    let base = ctx.admin_base();
    match ctx.reload().await {
        Ok(false) => Toast::success("تم إعادة تحميل البيانات").redirect(base),
        Ok(true) => Toast::warning("تعذر تحميل البيانات، تم استخدام البيانات الافتراضية").redirect(base),
        Err(e) => Toast::error(e).redirect(base),
    }
}

/// The persisted document, or the working copy when nothing was saved yet.
#[get("/api/export")]
pub fn export(_admin: AdminUser, ctx: &State<AppContext>) -> Result<RawJson<String>, Status> {
    if let Some(saved) = ctx.store().get(DATA_KEY) {
        return Ok(RawJson(saved));
    }
    ctx.workspace
        .snapshot()
        .and_then(|d| d.to_json())
        .map(RawJson)
        .map_err(|e| {
            log::error!("Export failed: {}", e);
            Status::InternalServerError
        })
}

#[get("/api/counters")]
pub fn counters(_admin: AdminUser, ctx: &State<AppContext>) -> Json<Counters> {
    Json(ctx.workspace.counters())
}
