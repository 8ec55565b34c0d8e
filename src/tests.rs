#![cfg(test)]

use rocket::http::{ContentType, Status};
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::Value;

use crate::binding::Section;
use crate::context::AppContext;
use crate::models::account::Account;
use crate::render::{encode_uri_component, whatsapp_link, Accordion};
use crate::store::DATA_KEY;

const MISSING_DATA: &str = "/nonexistent/fyfa/data.json";

const SAMPLE: &str = r#"{
    "company": {"name": "عطارة فيفا", "description": "أعشاب وبهارات"},
    "branches": [
        {"id": "b-riyadh", "name": "فرع الرياض", "address": "الرياض", "phone": "+966500000001"},
        {"id": "b-jazan", "name": "فرع جازان", "address": "جازان", "phone": "+966500000002",
         "coordinates": {"lat": 16.88, "lng": 42.55}}
    ],
    "socialMedia": [{"id": "s-ig", "name": "Instagram", "url": "https://instagram.com/fyfa", "icon": "M0 0"}],
    "contact": {"phone": "+966501234567", "whatsapp": {"number": "+966501234567", "message": "hi"}},
    "content": {"company": {"contactTitle": "تواصل معنا"}}
}"#;

/// Write a data file into a fresh temp dir and return its path.
fn data_file(contents: &str) -> String {
    let dir = std::env::temp_dir().join(format!("fyfa-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("data.json");
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

/// A client over an in-memory store with no save latency.
fn test_client(data_source: &str) -> Client {
    let figment = rocket::Config::figment()
        .merge(("data_source", data_source))
        .merge(("storage_path", ""))
        .merge(("save_delay_ms", 0))
        .merge(("admin_slug", "admin"))
        .merge(("admin_username", "admin"))
        .merge(("admin_password", "fyfa2024"));
    Client::tracked(crate::build(figment)).expect("valid rocket instance")
}

fn ctx(client: &Client) -> &AppContext {
    client.rocket().state::<AppContext>().expect("app context")
}

fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, encode_uri_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn post<'c>(client: &'c Client, uri: &'c str, pairs: &[(&str, &str)]) -> LocalResponse<'c> {
    client
        .post(uri)
        .header(ContentType::Form)
        .body(form_body(pairs))
        .dispatch()
}

fn location(res: &LocalResponse<'_>) -> String {
    res.headers().get_one("Location").unwrap_or_default().to_string()
}

fn login(client: &Client) {
    let res = post(client, "/admin/login", &[("username", "admin"), ("password", "fyfa2024")]);
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(location(&res), "/admin");
}

fn export(client: &Client) -> Value {
    let res = client.get("/admin/api/export").dispatch();
    assert_eq!(res.status(), Status::Ok);
    serde_json::from_str(&res.into_string().unwrap()).unwrap()
}

fn counters(client: &Client) -> Value {
    let res = client.get("/admin/api/counters").dispatch();
    serde_json::from_str(&res.into_string().unwrap()).unwrap()
}

// ── Login gate ─────────────────────────────────────────

#[test]
fn test_admin_pages_redirect_to_login() {
    let client = test_client(MISSING_DATA);
    for uri in ["/admin/branches", "/admin/section/content", "/admin/stats"] {
        let res = client.get(uri).dispatch();
        assert_eq!(res.status(), Status::SeeOther, "{}", uri);
        assert_eq!(location(&res), "/admin/login");
    }
    let res = post(&client, "/admin/section/content", &[("company-name", "x")]);
    assert_eq!(location(&res), "/admin/login");
    assert!(!ctx(&client).store().contains(DATA_KEY));
}

#[test]
fn test_wrong_password_stays_on_login() {
    let client = test_client(MISSING_DATA);
    let res = post(&client, "/admin/login", &[("username", "admin"), ("password", "nope")]);
    assert_eq!(res.status(), Status::Ok);
    let body = res.into_string().unwrap();
    assert!(body.contains("login-error"));
    assert_eq!(client.get("/admin/branches").dispatch().status(), Status::SeeOther);
}

#[test]
fn test_login_opens_dashboard() {
    let client = test_client(data_file(SAMPLE).as_str());
    login(&client);
    let res = client.get("/admin").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert_eq!(res.headers().get_one("Cache-Control"), Some("no-store, no-cache, must-revalidate, max-age=0"));
    let body = res.into_string().unwrap();
    assert!(body.contains("المدير العام"));
    assert!(body.contains("id=\"dashboard-branches\">2<"));
}

// ── Loading ────────────────────────────────────────────

#[test]
fn test_missing_data_file_fills_admin_fields_from_defaults() {
    let client = test_client(MISSING_DATA);
    assert!(ctx(&client).workspace.is_fallback());
    login(&client);

    let res = client.get("/admin/section/content").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body = res.into_string().unwrap();
    assert!(body.contains("شركة عطارة فيفا التجارية"));
    assert!(body.contains("45+ سنة خبرة"));
    assert!(body.contains("notice-warning"));

    assert_eq!(counters(&client)["branches"], 0);
    assert_eq!(counters(&client)["social"], 0);
}

#[test]
fn test_public_page_shows_error_toast_on_failed_load() {
    let client = test_client(MISSING_DATA);
    let res = client.get("/").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body = res.into_string().unwrap();
    assert!(body.contains(crate::render::LOAD_ERROR_MSG));
    assert!(!body.contains("id=\"branches-container\""));
}

#[test]
fn test_numeric_phone_loads_for_admin_and_public() {
    let path = data_file(r#"{"branches":[{"name":"a","address":"b","phone":966500000001}]}"#);
    let client = test_client(path.as_str());
    assert!(!ctx(&client).workspace.is_fallback());

    let body = client.get("/").dispatch().into_string().unwrap();
    assert!(!body.contains(crate::render::LOAD_ERROR_MSG));
    assert!(body.contains("href=\"tel:966500000001\""));
}

// ── Public page ────────────────────────────────────────

#[test]
fn test_public_contact_links() {
    let client = test_client(data_file(SAMPLE).as_str());
    let body = client.get("/").dispatch().into_string().unwrap();
    assert!(body.contains("href=\"https://wa.me/966501234567?text=hi\""));
    assert!(body.contains("href=\"tel:+966501234567\""));
    assert!(body.contains("href=\"https://instagram.com/fyfa\""));
}

#[test]
fn test_public_branch_query_opens_one_panel() {
    let client = test_client(data_file(SAMPLE).as_str());
    let body = client.get("/?branch=b-jazan").dispatch().into_string().unwrap();
    assert!(body.contains(r#"<div class="accordion-item active" data-panel="b-jazan">"#));
    assert!(body.contains(r#"<div class="accordion-item" data-panel="b-riyadh">"#));
    assert!(body.contains("query=16.88,42.55"));
}

#[test]
fn test_branch_query_reopens_panel_without_stored_ids() {
    let path = data_file(
        r#"{"branches":[{"name":"أ","address":"x","phone":"1"},{"name":"ب","address":"y","phone":"2"}]}"#,
    );
    let client = test_client(path.as_str());

    let first: Value = serde_json::from_str(&client.get("/data.json").dispatch().into_string().unwrap()).unwrap();
    let second: Value = serde_json::from_str(&client.get("/data.json").dispatch().into_string().unwrap()).unwrap();
    assert_eq!(first, second);

    let id = first["branches"][1]["id"].as_str().unwrap().to_string();
    let uri = format!("/?branch={}", id);
    let body = client.get(uri.as_str()).dispatch().into_string().unwrap();
    assert!(body.contains(&format!(r#"<div class="accordion-item active" data-panel="{}">"#, id)));
}

#[test]
fn test_data_json_serves_document() {
    let client = test_client(data_file(SAMPLE).as_str());
    let res = client.get("/data.json").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let doc: Value = serde_json::from_str(&res.into_string().unwrap()).unwrap();
    assert_eq!(doc["branches"].as_array().unwrap().len(), 2);

    let client = test_client(MISSING_DATA);
    assert_eq!(client.get("/data.json").dispatch().status(), Status::ServiceUnavailable);
}

#[test]
fn test_whatsapp_link_strips_plus() {
    assert_eq!(
        whatsapp_link("+966501234567", "hi"),
        "https://wa.me/966501234567?text=hi"
    );
}

#[test]
fn test_accordion_toggle_sequence_keeps_one_open() {
    let ids = ["a", "b", "c", "d"];
    let mut acc = Accordion::new(ids);
    let sequence = ["a", "c", "c", "d", "b", "a", "a", "b"];
    for (step, id) in sequence.iter().enumerate() {
        let was_open = acc.is_open(id);
        acc.toggle(id);
        assert!(acc.open_count() <= 1, "step {}", step);
        assert_eq!(acc.is_open(id), !was_open, "step {}", step);
    }
}

// ── Section saves ──────────────────────────────────────

#[test]
fn test_shopping_save_ignores_other_sections_fields() {
    let client = test_client(data_file(SAMPLE).as_str());
    login(&client);

    let res = post(
        &client,
        "/admin/section/shopping",
        &[
            ("website-text", "متجرنا"),
            ("website-url", "https://fyfa.sa"),
            ("contact-title", "HACKED"),
            ("company-name", "HACKED"),
        ],
    );
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(location(&res), "/admin/section/shopping");

    let doc = export(&client);
    assert_eq!(doc["content"]["shopping"]["website"]["text"], "متجرنا");
    assert_eq!(doc["content"]["shopping"]["website"]["url"], "https://fyfa.sa");
    assert_eq!(doc["content"]["company"]["contactTitle"], "تواصل معنا");
    assert_eq!(doc["company"]["name"], "عطارة فيفا");
}

#[test]
fn test_section_save_refused_while_in_flight() {
    let client = test_client(MISSING_DATA);
    login(&client);

    let ticket = ctx(&client).workspace.begin_save(Section::Content);
    assert!(ticket.is_some());
    let res = post(&client, "/admin/section/content", &[("company-name", "x")]);
    assert_eq!(res.status(), Status::SeeOther);
    assert!(!ctx(&client).store().contains(DATA_KEY));

    drop(ticket);
    post(&client, "/admin/section/content", &[("company-name", "x")]);
    assert!(ctx(&client).store().contains(DATA_KEY));
}

#[test]
fn test_save_all_from_settings_form() {
    let client = test_client(data_file(SAMPLE).as_str());
    login(&client);
    let res = post(
        &client,
        "/admin/save-all",
        &[("main-phone", "+966555555555"), ("return_to", "/admin/section/settings")],
    );
    assert_eq!(location(&res), "/admin/section/settings");
    let doc = export(&client);
    assert_eq!(doc["contact"]["phone"], "+966555555555");
    assert_eq!(doc["contact"]["whatsapp"]["number"], "+966501234567");
}

// ── Lists ──────────────────────────────────────────────

fn add_branch(client: &Client, name: &str) {
    let res = post(
        client,
        "/admin/branches",
        &[("name", name), ("address", "عنوان"), ("phone", "0500000000")],
    );
    assert_eq!(res.status(), Status::SeeOther);
    assert_eq!(location(&res), "/admin/branches");
}

fn branch_ids(client: &Client) -> Vec<String> {
    let ws = &ctx(client).workspace;
    ws.items::<crate::models::document::Branch>()
        .into_iter()
        .map(|b| b.id)
        .collect()
}

#[test]
fn test_delete_shifts_branches_and_updates_counters() {
    let client = test_client(MISSING_DATA);
    login(&client);
    add_branch(&client, "أ");
    add_branch(&client, "ب");
    add_branch(&client, "ج");
    assert_eq!(counters(&client)["branches"], 3);

    let ids = branch_ids(&client);
    let uri = format!("/admin/branches/{}/delete", ids[0]);

    // no confirmation, nothing removed
    post(&client, &uri, &[]);
    assert_eq!(counters(&client)["branches"], 3);

    post(&client, &uri, &[("confirmed", "true")]);
    assert_eq!(counters(&client)["branches"], 2);
    assert_eq!(branch_ids(&client), vec![ids[1].clone(), ids[2].clone()]);

    let body = client.get("/admin/branches").dispatch().into_string().unwrap();
    assert!(body.contains("id=\"branches-counter\">2<"));
    assert!(!body.contains(ids[0].as_str()));
}

#[test]
fn test_branch_form_requires_fields() {
    let client = test_client(MISSING_DATA);
    login(&client);
    let res = post(&client, "/admin/branches", &[("name", "فرع"), ("address", "")]);
    assert_eq!(location(&res), "/admin/branches?modal=add");
    assert_eq!(counters(&client)["branches"], 0);
}

#[test]
fn test_non_finite_coordinates_rejected_and_saves_keep_working() {
    let client = test_client(MISSING_DATA);
    login(&client);
    let res = post(
        &client,
        "/admin/branches",
        &[("name", "فرع"), ("address", "عنوان"), ("phone", "1"), ("lat", "NaN"), ("lng", "1")],
    );
    assert_eq!(location(&res), "/admin/branches?modal=add");
    assert_eq!(counters(&client)["branches"], 0);

    let res = post(&client, "/admin/section/shopping", &[("website-text", "متجرنا")]);
    assert_eq!(location(&res), "/admin/section/shopping");
    assert_eq!(export(&client)["content"]["shopping"]["website"]["text"], "متجرنا");
}

#[test]
fn test_edit_modal_prefills_and_update_keeps_id() {
    let client = test_client(data_file(SAMPLE).as_str());
    login(&client);

    let body = client
        .get("/admin/branches?modal=edit&id=b-jazan")
        .dispatch()
        .into_string()
        .unwrap();
    assert!(body.contains("value=\"فرع جازان\""));
    assert!(body.contains("action=\"/admin/branches/b-jazan\""));

    post(
        &client,
        "/admin/branches/b-jazan",
        &[("name", "جازان الجديد"), ("address", "جازان"), ("phone", "1")],
    );
    assert_eq!(branch_ids(&client), vec!["b-riyadh".to_string(), "b-jazan".to_string()]);
    assert!(ctx(&client).workspace.is_dirty());

    let res = client.get("/admin/branches?modal=edit&id=nope").dispatch();
    assert_eq!(res.status(), Status::SeeOther);
}

#[test]
fn test_social_add_gets_default_icon() {
    let client = test_client(MISSING_DATA);
    login(&client);
    post(&client, "/admin/social", &[("name", "TikTok"), ("url", "https://tiktok.com/@fyfa")]);
    let links = ctx(&client)
        .workspace
        .items::<crate::models::document::SocialLink>();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].icon, crate::models::document::DEFAULT_SOCIAL_ICON);
}

#[test]
fn test_logout_persists_pending_edits() {
    let client = test_client(MISSING_DATA);
    login(&client);
    add_branch(&client, "أ");
    assert!(!ctx(&client).store().contains(DATA_KEY));

    let res = client.get("/admin/logout").dispatch();
    assert_eq!(location(&res), "/admin/login");
    let stored = ctx(&client).store().get(DATA_KEY).unwrap();
    assert!(stored.contains("\"name\":\"أ\""));
    assert_eq!(client.get("/admin/branches").dispatch().status(), Status::SeeOther);
}

#[test]
fn test_logout_without_session_does_not_persist() {
    let client = test_client(MISSING_DATA);
    ctx(&client)
        .workspace
        .add(crate::models::document::Branch {
            name: "أ".into(),
            address: "x".into(),
            phone: "1".into(),
            ..Default::default()
        })
        .unwrap();
    assert!(ctx(&client).workspace.is_dirty());

    let res = client.get("/admin/logout").dispatch();
    assert_eq!(location(&res), "/admin/login");
    assert!(!ctx(&client).store().contains(DATA_KEY));
    assert!(ctx(&client).workspace.is_dirty());
}

// ── Account ────────────────────────────────────────────

fn stored_account(client: &Client) -> Account {
    Account::load(ctx(client).store()).unwrap()
}

#[test]
fn test_account_rules_leave_account_untouched() {
    let client = test_client(MISSING_DATA);
    login(&client);
    let before = stored_account(&client);

    let cases: [&[(&str, &str)]; 3] = [
        &[("new_password", "abc12"), ("confirm_password", "abc12")],
        &[("new_password", "abcdef"), ("confirm_password", "xyz")],
        &[],
    ];
    for pairs in cases {
        let res = post(&client, "/admin/account", pairs);
        assert_eq!(res.status(), Status::SeeOther);
        assert_eq!(stored_account(&client), before);
    }
    assert!(stored_account(&client).verify("admin", "fyfa2024"));
}

#[test]
fn test_account_change_keeps_session() {
    let client = test_client(MISSING_DATA);
    login(&client);
    post(
        &client,
        "/admin/account",
        &[
            ("new_username", "manager"),
            ("new_password", "secret99"),
            ("confirm_password", "secret99"),
        ],
    );
    let account = stored_account(&client);
    assert!(account.verify("manager", "secret99"));

    let res = client.get("/admin").dispatch();
    assert_eq!(res.status(), Status::Ok);
    assert!(res.into_string().unwrap().contains("المدير"));
}

// ── Misc admin ─────────────────────────────────────────

#[test]
fn test_stats_refresh_stores_figures() {
    let client = test_client(MISSING_DATA);
    login(&client);
    let res = client.post("/admin/stats/refresh").dispatch();
    assert_eq!(location(&res), "/admin/stats");
    let doc = export(&client);
    assert_eq!(doc["visitsStats"]["dailyData"].as_array().unwrap().len(), 30);

    let body = client.get("/admin/stats").dispatch().into_string().unwrap();
    assert!(body.contains("chart-bar"));
}

#[test]
fn test_reload_discards_unsaved_edits() {
    let client = test_client(data_file(SAMPLE).as_str());
    login(&client);
    add_branch(&client, "مؤقت");
    assert_eq!(counters(&client)["branches"], 3);

    client.post("/admin/reload").dispatch();
    assert_eq!(counters(&client)["branches"], 2);
    assert!(!ctx(&client).workspace.is_dirty());
}

#[test]
fn test_preferences_toggle_theme() {
    let client = test_client(MISSING_DATA);
    login(&client);
    let res = post(
        &client,
        "/admin/preferences",
        &[("theme", "dark"), ("return_to", "https://evil.example")],
    );
    assert_eq!(location(&res), "/admin");
    let body = client.get("/admin").dispatch().into_string().unwrap();
    assert!(body.contains("data-theme=\"dark\""));
}
