use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;

use crate::context::AppContext;
use crate::models::account::{display_name, Account};

const SESSION_COOKIE: &str = "fyfa_admin";

/// Guard that ensures the request carries a session for the current account
pub struct AdminUser {
    pub username: String,
}

impl AdminUser {
    pub fn display_name(&self) -> String {
        display_name(&self.username)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let ctx = match request.guard::<&State<AppContext>>().await {
            Outcome::Success(c) => c,
            _ => return Outcome::Forward(Status::Unauthorized),
        };

        let cookies = request.cookies();
        let username = match cookies.get_private(SESSION_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Outcome::Forward(Status::Unauthorized),
        };

        match Account::load(ctx.store()) {
            Some(account) if account.username == username => Outcome::Success(AdminUser { username }),
            _ => {
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Forward(Status::Unauthorized)
            }
        }
    }
}

pub fn set_session_cookie(cookies: &CookieJar<'_>, username: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, username.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}
