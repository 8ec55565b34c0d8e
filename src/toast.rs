use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use serde::Serialize;

use crate::render::html_escape;

/// Toasts hide themselves after this long.
pub const DISMISS_AFTER_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Unknown kinds are shown as info.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "success" => Severity::Success,
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Info,
        }
    }

    fn css_class(&self) -> &'static str {
        match self {
            Severity::Success => "bg-green-500",
            Severity::Error => "bg-red-500",
            Severity::Warning => "bg-yellow-500",
            Severity::Info => "bg-blue-500",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Error => "✕",
            Severity::Warning => "!",
            Severity::Info => "i",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
}

impl Toast {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Toast {
            severity,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn from_flash(flash: &FlashMessage<'_>) -> Self {
        Self::new(Severity::parse(flash.kind()), flash.message())
    }

    /// Carry this toast across a redirect.
    pub fn redirect(self, to: String) -> Flash<Redirect> {
        Flash::new(Redirect::to(to), self.severity.as_str(), self.message)
    }

    pub fn render(&self) -> String {
        format!(
            "<div class=\"toast show {cls}\" role=\"status\" data-severity=\"{sev}\" data-dismiss-after=\"{ms}\">\
<span class=\"toast-icon\">{icon}</span><span class=\"toast-message\">{msg}</span>\
<button type=\"button\" class=\"toast-close\" aria-label=\"إغلاق\">&times;</button></div>",
            cls = self.severity.css_class(),
            sev = self.severity.as_str(),
            ms = DISMISS_AFTER_MS,
            icon = self.severity.icon(),
            msg = html_escape(&self.message),
        )
    }
}

/// Toasts collected while building one page. Rendered in order, stacked.
#[derive(Debug, Default, Clone)]
pub struct ToastQueue {
    toasts: Vec<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn push_flash(&mut self, flash: Option<&FlashMessage<'_>>) {
        if let Some(f) = flash {
            self.push(Toast::from_flash(f));
        }
    }

    pub fn render(&self) -> String {
        let mut html = String::from("<div id=\"toast-stack\" class=\"toast-stack\" aria-live=\"polite\">");
        for t in &self.toasts {
            html.push_str(&t.render());
        }
        html.push_str("</div>");
        html
    }
}
