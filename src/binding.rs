//! Declarative mapping between admin form fields and document paths.
//!
//! Each editable section is a table of `FieldBinding`s. One routine reads a
//! table against the document (`load_fields`) and one writes submitted
//! values back (`gather` + `apply`), so adding a field is a table entry.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Url,
    Tel,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldBinding {
    /// Form field name / element id.
    pub id: &'static str,
    /// Dotted path into the document, e.g. `content.features.quality`.
    pub path: &'static str,
    /// Shown when the path is absent or empty.
    pub default: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(
    id: &'static str,
    path: &'static str,
    default: &'static str,
    label: &'static str,
    kind: FieldKind,
) -> FieldBinding {
    FieldBinding { id, path, default, label, kind }
}

use FieldKind::{Tel, Text, Textarea, Url};

/// Admin sections in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Dashboard,
    Content,
    Shopping,
    Branches,
    Social,
    CompanyInfo,
    VisitsStats,
    Account,
    Settings,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Dashboard,
        Section::Content,
        Section::Shopping,
        Section::Branches,
        Section::Social,
        Section::CompanyInfo,
        Section::VisitsStats,
        Section::Account,
        Section::Settings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::Dashboard => "dashboard",
            Section::Content => "content",
            Section::Shopping => "shopping",
            Section::Branches => "branches",
            Section::Social => "social",
            Section::CompanyInfo => "company-info",
            Section::VisitsStats => "visits-stats",
            Section::Account => "company-settings",
            Section::Settings => "settings",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.slug() == slug)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "لوحة التحكم",
            Section::Content => "إدارة المحتوى",
            Section::Shopping => "روابط التسوق",
            Section::Branches => "إدارة الفروع",
            Section::Social => "وسائل التواصل",
            Section::CompanyInfo => "معلومات الشركة",
            Section::VisitsStats => "إحصائيات الزيارات",
            Section::Account => "إعدادات الحساب",
            Section::Settings => "الإعدادات",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Section {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Section {
        let len = Self::ALL.len();
        Self::ALL[(self.position() + len - 1) % len]
    }

    /// The bound fields saved by this section. Sections without a form
    /// (dashboard, stats, social, account) have none.
    pub fn fields(&self) -> &'static [FieldBinding] {
        match self {
            Section::Content => CONTENT_FIELDS,
            Section::Shopping => SHOPPING_FIELDS,
            Section::Branches => BRANCHES_FIELDS,
            Section::CompanyInfo => COMPANY_INFO_FIELDS,
            Section::Settings => SETTINGS_FIELDS,
            _ => &[],
        }
    }

    pub fn is_editable(&self) -> bool {
        !self.fields().is_empty()
    }

    pub fn saved_message(&self) -> &'static str {
        match self {
            Section::Content => "تم حفظ المحتوى بنجاح!",
            Section::Shopping => "تم حفظ إعدادات التسوق بنجاح!",
            Section::Branches => "تم حفظ إعدادات الفروع بنجاح!",
            Section::CompanyInfo => "تم حفظ إعدادات الشركة بنجاح!",
            Section::Account => "تم حفظ إعدادات الحساب بنجاح!",
            _ => "تم حفظ التغييرات بنجاح!",
        }
    }
}

const WA_LINK: &str = "https://wa.me/966501234567";
const PHONE: &str = "+966501234567";

pub static CONTENT_FIELDS: &[FieldBinding] = &[
    field("company-name", "company.name", "", "اسم الشركة", Text),
    field("company-description", "company.description", "", "وصف الشركة", Textarea),
    field("experience-text", "content.features.experience", "45+ سنة خبرة", "الخبرة", Text),
    field("quality-text", "content.features.quality", "جودة مضمونة", "الجودة", Text),
    field("satisfaction-text", "content.features.satisfaction", "رضا العملاء", "رضا العملاء", Text),
    field("payment-text", "content.features.payment", "دفع آمن", "الدفع", Text),
];

pub static SHOPPING_FIELDS: &[FieldBinding] = &[
    field("website-text", "content.shopping.website.text", "تسوق عبر متجرنا (ويب سايت)", "نص المتجر الإلكتروني", Text),
    field("website-url", "content.shopping.website.url", "", "رابط المتجر الإلكتروني", Url),
    field("website-icon", "content.shopping.website.icon", "", "أيقونة المتجر الإلكتروني", Textarea),
    field("appstore-text", "content.shopping.appstore.text", "تسوق عبر متجرنا تطبيقنا على App Store", "نص App Store", Text),
    field("appstore-url", "content.shopping.appstore.url", "", "رابط App Store", Url),
    field("appstore-icon", "content.shopping.appstore.icon", "", "أيقونة App Store", Textarea),
    field("googleplay-text", "content.shopping.googleplay.text", "تسوق عبر متجرنا تطبيقنا على Google Play", "نص Google Play", Text),
    field("googleplay-url", "content.shopping.googleplay.url", "", "رابط Google Play", Url),
    field("googleplay-icon", "content.shopping.googleplay.icon", "", "أيقونة Google Play", Textarea),
];

pub static BRANCHES_FIELDS: &[FieldBinding] = &[
    field(
        "branches-description",
        "content.branches.description",
        "وجهتك الأقرب لتجربة تسوّق غير عادية بانتظارك! نحن موجودون في جميع أنحاء المملكة لخدمتكم بأفضل المنتجات العشبية",
        "وصف الفروع",
        Textarea,
    ),
    field("branches-count", "content.branches.count", "9 فروع موزعة في جميع أنحاء المملكة", "عدد الفروع", Text),
];

pub static COMPANY_INFO_FIELDS: &[FieldBinding] = &[
    field("company-info-description", "content.company.description", "نحن هنا للإجابة على استفساراتكم وتقديم أفضل الخدمات", "نبذة", Textarea),
    field("company-registration", "content.company.registration", "شركة مسجلة ومعتمدة في المملكة العربية السعودية", "السجل", Text),
    field("contact-title", "content.company.contactTitle", "طرق التواصل", "عنوان التواصل", Text),
    field("contact-text", "content.company.contactText", "اتصال مباشر", "نص الاتصال", Text),
    field("contact-phone", "content.company.contactPhone", PHONE, "هاتف التواصل", Tel),
    field("contact-whatsapp-text", "content.company.contactWhatsappText", "واتساب", "نص واتساب", Text),
    field("contact-whatsapp-link", "content.company.contactWhatsappLink", WA_LINK, "رابط واتساب", Url),
    field("wholesale-title", "content.company.wholesaleTitle", "منتجات عطارة فيفا بالجملة", "عنوان الجملة", Text),
    field("wholesale-contact-text", "content.company.wholesaleContactText", "اتصال", "نص اتصال الجملة", Text),
    field("wholesale-phone", "content.company.wholesalePhone", PHONE, "هاتف الجملة", Tel),
    field("wholesale-whatsapp-text", "content.company.wholesaleWhatsappText", "واتساب", "نص واتساب الجملة", Text),
    field("wholesale-whatsapp-link", "content.company.wholesaleWhatsappLink", WA_LINK, "رابط واتساب الجملة", Url),
    field("marketing-title", "content.company.marketingTitle", "التسويق والعلاقات العامة", "عنوان التسويق", Text),
    field("marketing-contact-text", "content.company.marketingContactText", "اتصال", "نص اتصال التسويق", Text),
    field("marketing-phone", "content.company.marketingPhone", PHONE, "هاتف التسويق", Tel),
    field("marketing-whatsapp-text", "content.company.marketingWhatsappText", "واتساب", "نص واتساب التسويق", Text),
    field("marketing-whatsapp-link", "content.company.marketingWhatsappLink", WA_LINK, "رابط واتساب التسويق", Url),
    field("purchasing-title", "content.company.purchasingTitle", "لاستقبال عروض المنتجات", "عنوان المشتريات", Text),
    field("purchasing-contact-text", "content.company.purchasingContactText", "اتصال", "نص اتصال المشتريات", Text),
    field("purchasing-phone", "content.company.purchasingPhone", PHONE, "هاتف المشتريات", Tel),
    field("purchasing-whatsapp-text", "content.company.purchasingWhatsappText", "واتساب", "نص واتساب المشتريات", Text),
    field("purchasing-whatsapp-link", "content.company.purchasingWhatsappLink", WA_LINK, "رابط واتساب المشتريات", Url),
    field("product-order-title", "content.company.productOrderTitle", "طلب المنتجات", "عنوان طلب المنتجات", Text),
    field("product-order-contact-text", "content.company.productOrderContactText", "اتصال", "نص اتصال الطلبات", Text),
    field("product-order-phone", "content.company.productOrderPhone", PHONE, "هاتف الطلبات", Tel),
    field("product-order-whatsapp-text", "content.company.productOrderWhatsappText", "واتساب", "نص واتساب الطلبات", Text),
    field("product-order-whatsapp-link", "content.company.productOrderWhatsappLink", WA_LINK, "رابط واتساب الطلبات", Url),
];

pub static SETTINGS_FIELDS: &[FieldBinding] = &[
    field("main-phone", "contact.phone", "", "رقم الهاتف الرئيسي", Tel),
    field("whatsapp-number", "contact.whatsapp.number", "", "رقم واتساب", Tel),
    field("whatsapp-message", "contact.whatsapp.message", "", "رسالة واتساب الافتراضية", Textarea),
];

/// Fields gathered by the global save.
pub static SAVE_ALL_FIELDS: &[FieldBinding] = &[
    field("company-name", "company.name", "", "اسم الشركة", Text),
    field("company-description", "company.description", "", "وصف الشركة", Textarea),
    field("main-phone", "contact.phone", "", "رقم الهاتف الرئيسي", Tel),
    field("whatsapp-number", "contact.whatsapp.number", "", "رقم واتساب", Tel),
];

/// A field with its current value, ready for a template.
#[derive(Debug, Clone, Serialize)]
pub struct BoundField {
    pub id: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
}

/// Walk a dotted path.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |node, key| node.get(key))
}

/// Present and non-empty values are shown as-is; anything else shows the
/// binding's default.
fn display_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn load_fields(doc: &Value, table: &[FieldBinding]) -> Vec<BoundField> {
    table
        .iter()
        .map(|b| BoundField {
            id: b.id,
            label: b.label,
            kind: b.kind,
            value: display_value(lookup(doc, b.path)).unwrap_or_else(|| b.default.to_string()),
        })
        .collect()
}

/// Collect the table's fields from a submitted form. Only ids in the table
/// are read; a missing id gathers as an empty string.
pub fn gather(
    form: &HashMap<String, String>,
    table: &[FieldBinding],
) -> Vec<(&'static str, String)> {
    table
        .iter()
        .map(|b| (b.path, form.get(b.id).cloned().unwrap_or_default()))
        .collect()
}

/// Write `value` at `path`, creating intermediate objects. A non-object
/// found on the way is replaced by an object.
pub fn assign(doc: &mut Value, path: &str, value: Value) {
    let mut keys = path.split('.').peekable();
    let mut node = doc;
    while let Some(key) = keys.next() {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let map = match node.as_object_mut() {
            Some(m) => m,
            None => return,
        };
        if keys.peek().is_none() {
            map.insert(key.to_string(), value);
            return;
        }
        node = map
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

pub fn apply(doc: &mut Value, gathered: Vec<(&'static str, String)>) {
    for (path, value) in gathered {
        assign(doc, path, Value::String(value));
    }
}
