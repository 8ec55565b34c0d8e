use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::auth::AdminUser;
use crate::binding::Section;
use crate::context::AppContext;
use crate::models::stats::VisitsStats;
use crate::toast::Toast;
use super::{page_context, section_href, with};

// ── Dashboard ──────────────────────────────────────────

#[get("/")]
pub fn dashboard(
    admin: AdminUser,
    ctx: &State<AppContext>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let stats = ctx.workspace.stats();
    let company = ctx
        .workspace
        .snapshot()
        .map(|d| d.company_name().to_string())
        .unwrap_or_default();

    let context = page_context(ctx, &admin, Section::Dashboard, flash);
    let context = with(context, "stats", json!(stats));
    let context = with(context, "company_name", json!(company));

    Template::render("admin/dashboard", &context)
}

// ── Visits stats ───────────────────────────────────────

/// Bar heights as percentages of the busiest day.
fn chart_bars(stats: &VisitsStats) -> Vec<serde_json::Value> {
    let peak = u64::from(stats.peak().max(1));
    stats
        .daily_data
        .iter()
        .enumerate()
        .map(|(i, &v)| json!({ "day": i + 1, "value": v, "height": u64::from(v) * 100 / peak }))
        .collect()
}

#[get("/stats")]
pub fn stats_page(
    admin: AdminUser,
    ctx: &State<AppContext>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let stats = ctx.workspace.stats();
    let context = page_context(ctx, &admin, Section::VisitsStats, flash);
    let context = with(context, "bars", json!(chart_bars(&stats)));
    let context = with(context, "stats", json!(stats));
    Template::render("admin/stats", &context)
}

#[post("/stats/refresh")]
pub fn stats_refresh(_admin: AdminUser, ctx: &State<AppContext>) -> Flash<Redirect> {
    let back = section_href(&ctx.admin_base(), Section::VisitsStats);
    let stats = VisitsStats::generate(&mut rand::thread_rng());
    match ctx.workspace.refresh_stats(stats, ctx.store()) {
        Ok(()) => Toast::success("تم تحديث الإحصائيات").redirect(back),
        Err(e) => {
            log::error!("Failed to refresh stats: {}", e);
            Toast::error("فشل تحديث الإحصائيات").redirect(back)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_bars_scale_to_peak() {
        let stats = VisitsStats {
            daily_data: vec![50, 100, 25],
            ..Default::default()
        };
        let bars = chart_bars(&stats);
        assert_eq!(bars[1]["height"], 100);
        assert_eq!(bars[2]["height"], 25);
    }

    #[test]
    fn test_chart_bars_large_values() {
        let stats = VisitsStats {
            daily_data: vec![u32::MAX, u32::MAX / 2, 50_000_000],
            ..Default::default()
        };
        let bars = chart_bars(&stats);
        assert_eq!(bars[0]["height"], 100);
        assert_eq!(bars[1]["height"], 49);
        assert_eq!(bars[2]["height"], 1);
    }

    #[test]
    fn test_chart_bars_empty_series() {
        let stats = VisitsStats {
            daily_data: vec![],
            ..Default::default()
        };
        assert!(chart_bars(&stats).is_empty());
    }
}
