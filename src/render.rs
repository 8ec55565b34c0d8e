use serde_json::Value;

use crate::binding::{self, BoundField, COMPANY_INFO_FIELDS, CONTENT_FIELDS, SHOPPING_FIELDS, BRANCHES_FIELDS};
use crate::models::document::{Branch, Contact, Document, LinkItem, SocialLink};
use crate::toast::{Toast, ToastQueue};

/// Shown when the data load fails.
pub const LOAD_ERROR_MSG: &str = "حدث خطأ في تحميل البيانات";

/// Department blocks under `content.company`, as (query key, field id prefix).
pub const DEPARTMENTS: [(&str, &str); 5] = [
    ("contact", "contact"),
    ("wholesale", "wholesale"),
    ("marketing", "marketing"),
    ("purchasing", "purchasing"),
    ("productOrder", "product-order"),
];

// ── Accordion ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct Panel {
    id: String,
    open: bool,
}

/// Panels of which at most one is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accordion {
    panels: Vec<Panel>,
}

impl Accordion {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Accordion {
            panels: ids
                .into_iter()
                .map(|id| Panel { id: id.into(), open: false })
                .collect(),
        }
    }

    /// Open `id` if given and known, otherwise leave everything closed.
    pub fn with_open(mut self, id: Option<&str>) -> Self {
        if let Some(id) = id {
            if self.panels.iter().any(|p| p.id == id) {
                self.toggle(id);
            }
        }
        self
    }

    /// Close every other open panel, then flip `id`.
    pub fn toggle(&mut self, id: &str) {
        for panel in self.panels.iter_mut() {
            if panel.id != id && panel.open {
                panel.open = false;
            }
        }
        if let Some(panel) = self.panels.iter_mut().find(|p| p.id == id) {
            panel.open = !panel.open;
        }
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.panels.iter().any(|p| p.id == id && p.open)
    }

    pub fn open_count(&self) -> usize {
        self.panels.iter().filter(|p| p.open).count()
    }
}

// ── Links ──────────────────────────────────────────────

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Percent-encode everything outside the `encodeURIComponent` unreserved
/// set, byte by byte over UTF-8.
pub fn encode_uri_component(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => result.push(b as char),
            _ => result.push_str(&format!("%{:02X}", b)),
        }
    }
    result
}

pub fn tel_uri(phone: &str) -> String {
    format!("tel:{}", phone)
}

pub fn whatsapp_link(number: &str, message: &str) -> String {
    let number = number.strip_prefix('+').unwrap_or(number);
    format!("https://wa.me/{}?text={}", number, encode_uri_component(message))
}

/// The branch's own maps URL, else a coordinate query, else a text search
/// for the company.
pub fn maps_url(branch: &Branch, company_name: &str) -> String {
    if let Some(url) = branch.google_maps.as_deref().filter(|u| !u.trim().is_empty()) {
        return url.to_string();
    }
    match branch.coordinates {
        Some(c) => format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            c.lat, c.lng
        ),
        None => format!(
            "https://www.google.com/maps/search/?api=1&query={}",
            encode_uri_component(company_name)
        ),
    }
}

fn svg_icon(path: &str, class: &str) -> String {
    if path.trim().is_empty() {
        return String::new();
    }
    format!(
        r#"<svg class="{}" viewBox="0 0 24 24" fill="currentColor" aria-hidden="true"><path d="{}"/></svg>"#,
        class,
        html_escape(path)
    )
}

// ── Sections ───────────────────────────────────────────

fn field_value<'a>(fields: &'a [BoundField], id: &str) -> &'a str {
    fields
        .iter()
        .find(|f| f.id == id)
        .map(|f| f.value.as_str())
        .unwrap_or("")
}

pub fn render_hero(doc: &Document) -> String {
    let description = doc
        .company
        .as_ref()
        .map(|c| c.description.as_str())
        .unwrap_or("");
    format!(
        r#"<header class="hero"><h1 id="company-name">{}</h1><p id="company-description">{}</p></header>"#,
        html_escape(doc.company_name()),
        html_escape(description)
    )
}

pub fn render_features(value: &Value) -> String {
    let fields = binding::load_fields(value, CONTENT_FIELDS);
    let mut html = String::from(r#"<section class="features">"#);
    for f in fields.iter().filter(|f| f.id.ends_with("-text")) {
        html.push_str(&format!(
            r#"<span class="feature-badge" id="{}">{}</span>"#,
            f.id,
            html_escape(&f.value)
        ));
    }
    html.push_str("</section>");
    html
}

/// Fixed storefront buttons (website, App Store, Google Play) from
/// `content.shopping`. A button with no URL renders without a link.
pub fn render_store_buttons(value: &Value) -> String {
    let fields = binding::load_fields(value, SHOPPING_FIELDS);
    let mut html = String::from(r#"<div class="store-buttons">"#);
    for key in ["website", "appstore", "googleplay"] {
        let text = field_value(&fields, &format!("{}-text", key));
        let url = field_value(&fields, &format!("{}-url", key));
        let icon = svg_icon(field_value(&fields, &format!("{}-icon", key)), "store-icon");
        if url.is_empty() {
            html.push_str(&format!(
                r#"<span class="store-btn store-{} disabled">{}<span>{}</span></span>"#,
                key,
                icon,
                html_escape(text)
            ));
        } else {
            html.push_str(&format!(
                r#"<a class="store-btn store-{}" href="{}" target="_blank" rel="noopener">{}<span>{}</span></a>"#,
                key,
                html_escape(url),
                icon,
                html_escape(text)
            ));
        }
    }
    html.push_str("</div>");
    html
}

pub fn render_social(links: &[SocialLink]) -> String {
    let items: Vec<String> = links
        .iter()
        .map(|l| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener" class="social-link" title="{}">{}</a>"#,
                html_escape(&l.url),
                html_escape(&l.name),
                svg_icon(&l.icon, "social-icon")
            )
        })
        .collect();
    format!(r#"<div id="social-links" class="social-links">{}</div>"#, items.join("\n"))
}

/// Shopping and app-store lists share one markup template.
pub fn render_link_items(container_id: &str, class: &str, items: &[LinkItem]) -> String {
    let items: Vec<String> = items
        .iter()
        .map(|i| {
            format!(
                r#"<a href="{}" target="_blank" rel="noopener" class="{}">{}<span>{}</span></a>"#,
                html_escape(&i.url),
                class,
                svg_icon(&i.icon, "link-icon"),
                html_escape(&i.name)
            )
        })
        .collect();
    format!(r#"<div id="{}" class="link-list">{}</div>"#, container_id, items.join("\n"))
}

pub fn render_branches(branches: &[Branch], accordion: &Accordion, value: &Value, company_name: &str) -> String {
    let copy = binding::load_fields(value, BRANCHES_FIELDS);
    let mut html = format!(
        r#"<section id="branches" class="branches"><p class="branches-description">{}</p><p class="branches-count">{}</p><div id="branches-container" class="accordion">"#,
        html_escape(field_value(&copy, "branches-description")),
        html_escape(field_value(&copy, "branches-count"))
    );
    for b in branches {
        let open = accordion.is_open(&b.id);
        html.push_str(&format!(
            r#"<div class="accordion-item{active}" data-panel="{id}">
<a class="accordion-header" href="?branch={qid}#branches" aria-expanded="{open}"><span>{name}</span><span class="accordion-arrow">{arrow}</span></a>
<div class="accordion-content{show}"><p class="branch-address">{address}</p>
<div class="branch-actions"><a class="branch-maps" href="{maps}" target="_blank" rel="noopener">الموقع على الخريطة</a>
<a class="branch-phone" href="{tel}">{phone}</a></div></div></div>"#,
            active = if open { " active" } else { "" },
            id = html_escape(&b.id),
            qid = encode_uri_component(&b.id),
            open = open,
            name = html_escape(&b.name),
            arrow = if open { "▲" } else { "▼" },
            show = if open { " show" } else { "" },
            address = html_escape(&b.address),
            maps = html_escape(&maps_url(b, company_name)),
            tel = html_escape(&tel_uri(&b.phone)),
            phone = html_escape(&b.phone),
        ));
    }
    html.push_str("</div></section>");
    html
}

pub fn render_departments(value: &Value, accordion: &Accordion) -> String {
    let fields = binding::load_fields(value, COMPANY_INFO_FIELDS);
    let mut html = format!(
        r#"<section id="departments" class="departments"><p class="company-info-description">{}</p><p class="company-registration">{}</p><div class="accordion">"#,
        html_escape(field_value(&fields, "company-info-description")),
        html_escape(field_value(&fields, "company-registration"))
    );
    for (key, prefix) in DEPARTMENTS {
        let get = |suffix: &str| field_value(&fields, &format!("{}-{}", prefix, suffix));
        let open = accordion.is_open(key);
        let phone = get("phone");
        html.push_str(&format!(
            r#"<div class="accordion-item{active}" data-panel="{key}">
<a class="accordion-header" href="?department={key}#departments" aria-expanded="{open}"><span>{title}</span></a>
<div class="accordion-content{show}">
<a class="dept-call" href="{tel}">{contact_text}</a>
<a class="dept-whatsapp" href="{wa}" target="_blank" rel="noopener">{wa_text}</a></div></div>"#,
            active = if open { " active" } else { "" },
            key = key,
            open = open,
            title = html_escape(get("title")),
            show = if open { " show" } else { "" },
            tel = html_escape(&tel_uri(phone)),
            contact_text = html_escape(get("contact-text")),
            wa = html_escape(get("whatsapp-link")),
            wa_text = html_escape(get("whatsapp-text")),
        ));
    }
    html.push_str("</div></section>");
    html
}

pub fn render_contact(contact: &Contact) -> String {
    format!(
        r#"<div id="contact" class="contact-buttons"><a id="call-button" class="contact-call" href="{}">اتصل بنا</a><a id="whatsapp-button" class="contact-whatsapp" href="{}" target="_blank" rel="noopener">واتساب</a></div>"#,
        html_escape(&tel_uri(&contact.phone)),
        html_escape(&whatsapp_link(&contact.whatsapp.number, &contact.whatsapp.message))
    )
}

// ── Page ───────────────────────────────────────────────

/// Which accordion panels the request asked to open.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageQuery<'a> {
    pub branch: Option<&'a str>,
    pub department: Option<&'a str>,
}

/// The full public page. On a failed load only the shell is rendered,
/// with an error toast.
pub fn render_public_page(loaded: &Result<Document, String>, query: PageQuery<'_>) -> String {
    let mut toasts = ToastQueue::new();
    let mut body = String::new();
    let title;

    match loaded {
        Ok(doc) => {
            title = doc.company_name().to_string();
            let value = doc.to_value().unwrap_or(Value::Null);

            body.push_str(&render_hero(doc));
            body.push_str(&render_features(&value));
            if let Some(links) = &doc.social_media {
                body.push_str(&render_social(links));
            }
            body.push_str(&render_store_buttons(&value));
            if let Some(items) = &doc.shopping {
                body.push_str(&render_link_items("shopping-links", "shopping-link", items));
            }
            if let Some(items) = &doc.apps {
                body.push_str(&render_link_items("app-links", "app-link", items));
            }
            if let Some(branches) = &doc.branches {
                let accordion = Accordion::new(branches.iter().map(|b| b.id.clone()))
                    .with_open(query.branch);
                body.push_str(&render_branches(branches, &accordion, &value, &title));
            }
            let departments = Accordion::new(DEPARTMENTS.iter().map(|(k, _)| *k))
                .with_open(query.department);
            body.push_str(&render_departments(&value, &departments));
            if let Some(contact) = &doc.contact {
                body.push_str(&render_contact(contact));
            }
        }
        Err(_) => {
            title = "عطارة فيفا".to_string();
            toasts.push(Toast::error(LOAD_ERROR_MSG));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/css/site.css">
</head>
<body>
<main class="container">
{body}
</main>
<footer class="footer"><p>&copy; {year} {title}</p></footer>
{toasts}
<script src="/static/js/site.js"></script>
</body>
</html>"#,
        title = html_escape(&title),
        body = body,
        year = chrono::Utc::now().format("%Y"),
        toasts = toasts.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Coordinates;

    #[test]
    fn test_accordion_single_open() {
        let mut acc = Accordion::new(["a", "b", "c"]);
        acc.toggle("a");
        acc.toggle("b");
        assert!(!acc.is_open("a"));
        assert!(acc.is_open("b"));
        assert_eq!(acc.open_count(), 1);
        acc.toggle("b");
        assert_eq!(acc.open_count(), 0);
    }

    #[test]
    fn test_accordion_initial_unknown_id() {
        let acc = Accordion::new(["a"]).with_open(Some("zzz"));
        assert_eq!(acc.open_count(), 0);
    }

    #[test]
    fn test_whatsapp_link() {
        assert_eq!(
            whatsapp_link("+966501234567", "hi"),
            "https://wa.me/966501234567?text=hi"
        );
        assert_eq!(
            whatsapp_link("966501234567", "a b&c"),
            "https://wa.me/966501234567?text=a%20b%26c"
        );
    }

    #[test]
    fn test_encode_matches_uri_component() {
        assert_eq!(encode_uri_component("it's (ok)!*~"), "it's%20(ok)!*~");
        assert_eq!(encode_uri_component("م"), "%D9%85");
    }

    #[test]
    fn test_maps_url_preference() {
        let mut b = Branch {
            google_maps: Some("https://maps.app.goo.gl/x".into()),
            coordinates: Some(Coordinates { lat: 17.5, lng: 43.25 }),
            ..Default::default()
        };
        assert_eq!(maps_url(&b, "فيفا"), "https://maps.app.goo.gl/x");
        b.google_maps = None;
        assert_eq!(
            maps_url(&b, "فيفا"),
            "https://www.google.com/maps/search/?api=1&query=17.5,43.25"
        );
        b.coordinates = None;
        assert!(maps_url(&b, "a b").ends_with("query=a%20b"));
    }

    #[test]
    fn test_absent_collections_render_nothing() {
        let doc = Document::from_json(r#"{"company":{"name":"x"}}"#).unwrap();
        let html = render_public_page(&Ok(doc), PageQuery::default());
        assert!(!html.contains("id=\"social-links\""));
        assert!(!html.contains("id=\"branches-container\""));
        assert!(!html.contains("id=\"whatsapp-button\""));
    }

    #[test]
    fn test_failed_load_shows_error_toast() {
        let html = render_public_page(&Err("boom".into()), PageQuery::default());
        assert!(html.contains(LOAD_ERROR_MSG));
        assert!(html.contains("bg-red-500"));
    }

    #[test]
    fn test_branch_query_opens_panel() {
        let doc = Document::from_json(
            r#"{"branches":[{"id":"b1","name":"<x>","address":"a","phone":"1"},{"id":"b2","name":"y","address":"a","phone":"2"}]}"#,
        )
        .unwrap();
        let html = render_public_page(
            &Ok(doc),
            PageQuery { branch: Some("b2"), department: None },
        );
        assert!(html.contains(r#"<div class="accordion-item active" data-panel="b2">"#));
        assert!(html.contains(r#"<div class="accordion-item" data-panel="b1">"#));
        assert!(html.contains("&lt;x&gt;"));
        assert!(html.contains("href=\"tel:2\""));
    }
}
