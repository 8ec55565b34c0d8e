use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::State;
use rocket_dyn_templates::Template;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, AdminUser};
use crate::context::AppContext;
use crate::models::account::Account;
use crate::models::preferences::Preferences;

#[derive(Debug, FromForm, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn login_template(ctx: &AppContext, error: Option<&str>) -> Template {
    let prefs = Preferences::load(ctx.store());
    Template::render(
        "admin/login",
        json!({
            "admin_base": ctx.admin_base(),
            "theme": prefs.theme,
            "error": error,
        }),
    )
}

#[get("/login")]
pub fn login_page(admin: Option<AdminUser>, ctx: &State<AppContext>) -> Result<Template, Redirect> {
    if admin.is_some() {
        return Err(Redirect::to(ctx.admin_base()));
    }
    Ok(login_template(ctx, None))
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    ctx: &State<AppContext>,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, Template> {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Err(login_template(ctx, Some("يرجى إدخال اسم المستخدم وكلمة السر")));
    }

    match Account::load(ctx.store()) {
        Some(account) if account.verify(username, &form.password) => {
            auth::set_session_cookie(cookies, &account.username);
            log::info!("Admin '{}' logged in", account.username);
            Ok(Redirect::to(ctx.admin_base()))
        }
        Some(_) => {
            log::warn!("Failed login attempt for '{}'", username);
            Err(login_template(ctx, Some("اسم المستخدم أو كلمة السر غير صحيحة")))
        }
        None => {
            log::error!("No admin account in storage");
            Err(login_template(ctx, Some("الحساب غير موجود")))
        }
    }
}

/// Pending list edits are persisted before the session ends. Without a
/// session this only clears the cookie.
#[get("/logout")]
pub fn logout(admin: Option<AdminUser>, ctx: &State<AppContext>, cookies: &CookieJar<'_>) -> Redirect {
    if admin.is_some() && ctx.workspace.is_dirty() {
        if let Err(e) = ctx.workspace.persist(ctx.store()) {
            log::error!("Failed to persist working copy on logout: {}", e);
        }
    }
    auth::clear_session_cookie(cookies);
    Redirect::to(format!("{}/login", ctx.admin_base()))
}

/// Catch-all for any /<admin_slug>/* route that failed the AdminUser guard.
/// This fires when the guard returns Forward(Unauthorized).
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(_path: std::path::PathBuf, ctx: &State<AppContext>) -> Redirect {
    Redirect::to(format!("{}/login", ctx.admin_base()))
}

#[post("/<_path..>", rank = 99)]
pub fn admin_post_redirect_to_login(_path: std::path::PathBuf, ctx: &State<AppContext>) -> Redirect {
    Redirect::to(format!("{}/login", ctx.admin_base()))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        login_page,
        login_submit,
        logout,
        admin_redirect_to_login,
        admin_post_redirect_to_login,
    ]
}
