use rocket::http::Status;
use rocket::response::content::{RawHtml, RawJson};
use rocket::State;

use crate::context::AppContext;
use crate::loader;
use crate::render::{self, PageQuery};

// ── Homepage ───────────────────────────────────────────

/// `?branch=<id>` and `?department=<key>` choose the open accordion panels.
#[get("/?<branch>&<department>")]
pub async fn homepage(
    ctx: &State<AppContext>,
    branch: Option<&str>,
    department: Option<&str>,
) -> RawHtml<String> {
    let loaded = loader::load_public(&ctx.source).await;
    RawHtml(render::render_public_page(&loaded, PageQuery { branch, department }))
}

// ── Data ───────────────────────────────────────────────

/// The document as the public page sees it.
#[get("/data.json")]
pub async fn data_json(ctx: &State<AppContext>) -> Result<RawJson<String>, Status> {
    let doc = loader::load_public(&ctx.source)
        .await
        .map_err(|_| Status::ServiceUnavailable)?;
    doc.to_json().map(RawJson).map_err(|e| {
        log::error!("Failed to serialize document: {}", e);
        Status::InternalServerError
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![homepage, data_json]
}
