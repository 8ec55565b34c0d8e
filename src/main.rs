#[macro_use]
extern crate rocket;

use rocket::fairing::{AdHoc, Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

mod auth;
mod binding;
mod boot;
mod config;
mod context;
mod editor;
mod loader;
mod modal;
mod models;
mod render;
mod routes;
mod store;
mod toast;

#[cfg(test)]
mod tests;

use config::AppConfig;
use context::AppContext;

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let prefix = req.rocket().state::<AppContext>()
            .map(|c| c.admin_base())
            .unwrap_or_else(|| "/admin".to_string());
        if req.uri().path().starts_with(&*prefix) {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html lang='ar' dir='rtl'><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>الصفحة غير موجودة</p><a href='/'>العودة للرئيسية</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html lang='ar' dir='rtl'><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>خطأ في الخادم</p><a href='/'>العودة للرئيسية</a></body></html>".to_string())
}

/// Assemble the application from a configuration figment.
pub fn build(figment: Figment) -> Rocket<Build> {
    let config = AppConfig::from_figment(&figment);
    let admin_mount = config.admin_base();

    log::info!("Admin panel mounted at: {}", admin_mount);

    rocket::custom(figment)
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .attach(AdHoc::try_on_ignite("Site Data", |rocket| async move {
            let config = AppConfig::from_figment(rocket.figment());
            match AppContext::init(config).await {
                Ok(ctx) => Ok(rocket.manage(ctx)),
                Err(e) => {
                    log::error!("Failed to initialise application state: {}", e);
                    Err(rocket)
                }
            }
        }))
        .mount("/static", FileServer::from("website/static"))
        .mount("/", routes::public::routes())
        .mount(&admin_mount, routes::admin::routes())
        .mount(&admin_mount, routes::auth::routes())
        .register("/", catchers![not_found, server_error])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let figment = rocket::Config::figment();

    // Boot check: verify/create directories, validate critical files
    boot::run(&AppConfig::from_figment(&figment));

    build(figment)
}
