use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;

use crate::auth::{self, AdminUser};
use crate::binding::Section;
use crate::context::AppContext;
use crate::editor::{self, AccountSaveError};
use crate::models::account::AccountForm;
use crate::toast::{Severity, Toast};
use super::{page_context, section_href};

// ── Account settings ───────────────────────────────────

#[get("/account")]
pub fn account_page(
    admin: AdminUser,
    ctx: &State<AppContext>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let context = page_context(ctx, &admin, Section::Account, flash);
    Template::render("admin/account", &context)
}

/// Rules are checked in order and the first failure is reported; nothing
/// is written unless all pass. A username change moves the session along.
#[post("/account", data = "<form>")]
pub fn account_save(
    _admin: AdminUser,
    ctx: &State<AppContext>,
    cookies: &CookieJar<'_>,
    form: Form<AccountForm>,
) -> Flash<Redirect> {
    let back = section_href(&ctx.admin_base(), Section::Account);
    match editor::save_account(&form, ctx.store()) {
        Ok(account) => {
            auth::set_session_cookie(cookies, &account.username);
            Toast::success(Section::Account.saved_message()).redirect(back)
        }
        Err(AccountSaveError::Invalid(rule)) => {
            Toast::new(Severity::parse(rule.severity()), rule.to_string()).redirect(back)
        }
        Err(AccountSaveError::Failed(e)) => {
            log::error!("Failed to save account: {}", e);
            Toast::error(format!("حدث خطأ أثناء الحفظ: {}", e)).redirect(back)
        }
    }
}
