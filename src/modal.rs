use crate::editor::{BranchForm, SocialForm};
use crate::render::html_escape;

/// Overlay dialog. The body is replaced wholesale on every show; forms
/// inside post to fixed routes, so nothing needs rebinding.
#[derive(Debug, Clone, PartialEq)]
pub struct Modal {
    title: String,
    body: String,
    close_href: String,
    visible: bool,
}

impl Modal {
    pub fn show(title: impl Into<String>, body: impl Into<String>, close_href: impl Into<String>) -> Self {
        Modal {
            title: title.into(),
            body: body.into(),
            close_href: close_href.into(),
            visible: true,
        }
    }

    pub fn hidden() -> Self {
        Modal {
            title: String::new(),
            body: String::new(),
            close_href: String::new(),
            visible: false,
        }
    }

    pub fn render(&self) -> String {
        let hidden = if self.visible { "" } else { " hidden" };
        format!(
            r#"<div id="modal-overlay" class="modal-overlay{hidden}" data-close-href="{close}">
<div id="modal-content" class="modal-content" role="dialog" aria-modal="true">
<div class="modal-header"><h3>{title}</h3><a href="{close}" class="modal-close" aria-label="إغلاق">&times;</a></div>
{body}
</div></div>"#,
            hidden = hidden,
            close = html_escape(&self.close_href),
            title = html_escape(&self.title),
            body = self.body,
        )
    }
}

fn input(id: &str, name: &str, label: &str, kind: &str, value: &str, required: bool) -> String {
    format!(
        r#"<label for="{id}">{label}{star}</label><input type="{kind}" id="{id}" name="{name}" value="{value}"{req}>"#,
        id = id,
        name = name,
        label = label,
        star = if required { " *" } else { "" },
        kind = kind,
        value = html_escape(value),
        req = if required { " required" } else { "" },
    )
}

fn textarea(id: &str, name: &str, label: &str, value: &str, required: bool) -> String {
    format!(
        r#"<label for="{id}">{label}{star}</label><textarea id="{id}" name="{name}" rows="3"{req}>{value}</textarea>"#,
        id = id,
        name = name,
        label = label,
        star = if required { " *" } else { "" },
        value = html_escape(value),
        req = if required { " required" } else { "" },
    )
}

fn actions(close_href: &str, editing: bool) -> String {
    format!(
        r#"<div class="modal-actions"><a href="{}" class="btn btn-secondary">إلغاء</a><button type="submit" class="btn btn-primary" data-saving-label="جاري الحفظ...">{}</button></div>"#,
        html_escape(close_href),
        if editing { "تحديث" } else { "إضافة" }
    )
}

/// Add/edit form for a branch. `action` is the POST target.
pub fn branch_form(form: &BranchForm, action: &str, close_href: &str, editing: bool) -> String {
    let mut html = format!(
        r#"<form id="branch-form" method="post" action="{}" class="modal-form">"#,
        html_escape(action)
    );
    html.push_str(&input("branch-name", "name", "اسم الفرع", "text", &form.name, true));
    html.push_str(&textarea("branch-address", "address", "العنوان", &form.address, true));
    html.push_str(&input("branch-phone", "phone", "رقم الهاتف", "tel", &form.phone, true));
    html.push_str(&input("branch-google-maps", "google_maps", "رابط خرائط جوجل", "url", &form.google_maps, false));
    html.push_str(&input("branch-lat", "lat", "خط العرض", "text", &form.lat, false));
    html.push_str(&input("branch-lng", "lng", "خط الطول", "text", &form.lng, false));
    html.push_str(&actions(close_href, editing));
    html.push_str("</form>");
    html
}

pub fn social_form(form: &SocialForm, action: &str, close_href: &str, editing: bool) -> String {
    let mut html = format!(
        r#"<form id="social-form" method="post" action="{}" class="modal-form">"#,
        html_escape(action)
    );
    html.push_str(&input("social-name", "name", "اسم المنصة", "text", &form.name, true));
    html.push_str(&input("social-url", "url", "الرابط", "url", &form.url, true));
    html.push_str(&textarea("social-icon", "icon", "مسار أيقونة SVG", &form.icon, false));
    html.push_str(&actions(close_href, editing));
    html.push_str("</form>");
    html
}

/// Delete confirmation. Only a POST carrying `confirmed=true` deletes.
pub fn confirm_delete(prompt: &str, item_name: &str, action: &str, close_href: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" class="modal-form">
<p class="confirm-text">{prompt}</p><p class="confirm-item">{name}</p>
<input type="hidden" name="confirmed" value="true">
<div class="modal-actions"><a href="{close}" class="btn btn-secondary">إلغاء</a><button type="submit" class="btn btn-danger">حذف</button></div>
</form>"#,
        action = html_escape(action),
        prompt = html_escape(prompt),
        name = html_escape(item_name),
        close = html_escape(close_href),
    )
}
