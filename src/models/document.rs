use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::stats::VisitsStats;

/// Icon used for a social link saved without one.
pub const DEFAULT_SOCIAL_ICON: &str = "M12 2.163c3.204 0 3.584.012 4.85.07 3.252.148 4.771 1.691 4.919 4.919.058 1.265.069 1.645.069 4.849 0 3.205-.012 3.584-.069 4.849-.149 3.225-1.664 4.771-4.919 4.919-1.266.058-1.644.07-4.85.07-3.204 0-3.584-.012-4.849-.07-3.26-.149-4.771-1.699-4.919-4.92-.058-1.265-.07-1.644-.07-4.849 0-3.204.013-3.583.07-4.849.149-3.227 1.664-4.771 4.919-4.919 1.266-.057 1.645-.069 4.849-.069zm0-2.163c-3.259 0-3.667.014-4.947.072-4.358.2-6.78 2.618-6.98 6.98-.059 1.281-.073 1.689-.073 4.948 0 3.259.014 3.668.072 4.948.2 4.358 2.618 6.78 6.98 6.98 1.281.058 1.689.072 4.948.072 3.259 0 3.668-.014 4.948-.072 4.354-.2 6.782-2.618 6.979-6.98.059-1.28.073-1.689.073-4.948 0-3.259-.014-3.667-.072-4.947-.196-4.354-2.617-6.78-6.979-6.98-1.281-.059-1.69-.073-4.949-.073zm0 5.838c-3.403 0-6.162 2.759-6.162 6.162s2.759 6.163 6.162 6.163 6.162-2.759 6.162-6.163c0-3.403-2.759-6.162-6.162-6.162zm0 10.162c-2.209 0-4-1.79-4-4 0-2.209 1.791-4 4-4s4 1.791 4 4c0 2.21-1.791 4-4 4zm6.406-11.845c-.796 0-1.441.645-1.441 1.44s.645 1.44 1.441 1.44c.795 0 1.439-.645 1.439-1.44s-.644-1.44-1.439-1.44z";

/// The whole site: company, branches, links, contact and free-form content
/// sections. Collections are optional so that an absent field can be told
/// apart from an empty one; the public page skips absent sections entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branches: Option<Vec<Branch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media: Option<Vec<SocialLink>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shopping: Option<Vec<LinkItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps: Option<Vec<LinkItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    /// Per-section copy (`features`, `shopping`, `branches`, `company`).
    /// Schema-free; read through the field-binding table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visits_stats: Option<VisitsStats>,
    /// Unknown top-level fields, kept so a save never drops them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Company {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub google_maps: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinates", skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lng: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SocialLink {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icon: String,
}

/// Shopping and app-store buttons share this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LinkItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient_struct")]
    pub whatsapp: WhatsApp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WhatsApp {
    #[serde(default, deserialize_with = "lenient_string")]
    pub number: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: String,
}

/// Coordinates show up both as JSON numbers and as quoted strings in
/// hand-edited data files.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("coordinate out of range")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid coordinate: {}", s))),
        other => Err(serde::de::Error::custom(format!(
            "invalid coordinate: {}",
            other
        ))),
    }
}

/// Hand-edited data files hold phone numbers as JSON numbers and leave
/// fields as null. Anything that is not a string or number reads as empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(lenient_string(deserializer)?).filter(|s| !s.is_empty()))
}

fn lenient_struct<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Unreadable coordinates drop to `None` instead of failing the document.
fn lenient_coordinates<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match serde_json::from_value::<Coordinates>(value) {
        Ok(c) if c.lat.is_finite() && c.lng.is_finite() => Ok(Some(c)),
        Ok(_) => Ok(None),
        Err(e) => {
            log::warn!("Ignoring branch coordinates: {}", e);
            Ok(None)
        }
    }
}

impl Document {
    /// The document used when the data file cannot be loaded.
    pub fn fallback() -> Self {
        Document {
            company: Some(Company {
                name: "شركة عطارة فيفا التجارية".to_string(),
                description: "عطارة فيفا - أكثر من 45 عامًا من الخبرة في تقديم أفضل الأعشاب، البهارات، والمنتجات الغذائية.".to_string(),
            }),
            branches: Some(Vec::new()),
            social_media: Some(Vec::new()),
            contact: Some(Contact {
                phone: "+966501234567".to_string(),
                whatsapp: WhatsApp {
                    number: "+966501234567".to_string(),
                    message: "مرحباً، أريد الاستفسار عن منتجات عطارة فيفا".to_string(),
                },
            }),
            ..Default::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self, String> {
        let mut doc: Document = serde_json::from_str(text).map_err(|e| e.to_string())?;
        doc.ensure_ids();
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }

    pub fn to_value(&self) -> Result<Value, String> {
        serde_json::to_value(self).map_err(|e| e.to_string())
    }

    pub fn from_value(value: Value) -> Result<Self, String> {
        let mut doc: Document = serde_json::from_value(value).map_err(|e| e.to_string())?;
        doc.ensure_ids();
        Ok(doc)
    }

    /// Give every branch and social link an id. Items that already carry
    /// one keep it; the rest get one derived from their position, so the
    /// same file yields the same ids on every load.
    pub fn ensure_ids(&mut self) {
        if let Some(branches) = self.branches.as_mut() {
            assign_positional_ids(branches.as_mut_slice(), "branch", |b: &mut Branch| &mut b.id);
        }
        if let Some(links) = self.social_media.as_mut() {
            assign_positional_ids(links.as_mut_slice(), "social", |l: &mut SocialLink| &mut l.id);
        }
    }

    pub fn company_name(&self) -> &str {
        self.company
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("عطارة فيفا")
    }

    pub fn branch_count(&self) -> usize {
        self.branches.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn social_count(&self) -> usize {
        self.social_media.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn app_count(&self) -> usize {
        self.apps.as_ref().map(Vec::len).unwrap_or(0)
    }
}

fn assign_positional_ids<T>(items: &mut [T], prefix: &str, id: impl Fn(&mut T) -> &mut String) {
    let mut taken: HashSet<String> = items
        .iter_mut()
        .map(|item| id(item).clone())
        .filter(|i| !i.is_empty())
        .collect();
    for (index, item) in items.iter_mut().enumerate() {
        let slot = id(item);
        if !slot.is_empty() {
            continue;
        }
        let base = format!("{}-{}", prefix, index + 1);
        let mut candidate = base.clone();
        let mut n = 2;
        while taken.contains(&candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        taken.insert(candidate.clone());
        *slot = candidate;
    }
}

/// Id for an item added from the admin panel.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_collections_stay_absent() {
        let doc = Document::from_json(r#"{"company":{"name":"x"}}"#).unwrap();
        assert!(doc.branches.is_none());
        assert!(doc.social_media.is_none());
        assert!(doc.contact.is_none());
    }

    #[test]
    fn test_ids_assigned_on_load_and_kept() {
        let doc = Document::from_json(
            r#"{"branches":[{"name":"a"},{"id":"keep-me","name":"b"}]}"#,
        )
        .unwrap();
        let branches = doc.branches.unwrap();
        assert_eq!(branches[0].id, "branch-1");
        assert_eq!(branches[1].id, "keep-me");
    }

    #[test]
    fn test_positional_ids_are_stable_and_unique() {
        let text = r#"{"branches":[{"name":"a"},{"id":"branch-3","name":"b"},{"name":"c"}],
            "socialMedia":[{"name":"ig"}]}"#;
        let first = Document::from_json(text).unwrap();
        let second = Document::from_json(text).unwrap();
        assert_eq!(first, second);
        let ids: Vec<String> = first.branches.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["branch-1", "branch-3", "branch-3-2"]);
        assert_eq!(first.social_media.unwrap()[0].id, "social-1");
    }

    #[test]
    fn test_numeric_and_null_scalars_are_tolerated() {
        let doc = Document::from_json(
            r#"{"branches":[{"name":"a","address":"b","phone":966500000001,"googleMaps":null,
                "coordinates":{"lat":null,"lng":1}}],
              "contact":{"phone":966501234567,"whatsapp":{"number":966501234567,"message":null}},
              "company":{"name":"x","description":null}}"#,
        )
        .unwrap();
        let branch = &doc.branches.as_ref().unwrap()[0];
        assert_eq!(branch.phone, "966500000001");
        assert!(branch.google_maps.is_none());
        assert!(branch.coordinates.is_none());
        let contact = doc.contact.unwrap();
        assert_eq!(contact.phone, "966501234567");
        assert_eq!(contact.whatsapp.number, "966501234567");
        assert_eq!(contact.whatsapp.message, "");
        assert_eq!(doc.company.unwrap().description, "");

        let doc = Document::from_json(r#"{"contact":{"phone":"1","whatsapp":null}}"#).unwrap();
        assert_eq!(doc.contact.unwrap().whatsapp, WhatsApp::default());
    }

    #[test]
    fn test_coordinates_accept_strings_and_numbers() {
        let doc = Document::from_json(
            r#"{"branches":[{"name":"a","coordinates":{"lat":"17.25","lng":43.1}}]}"#,
        )
        .unwrap();
        let c = doc.branches.unwrap()[0].coordinates.unwrap();
        assert_eq!(c.lat, 17.25);
        assert_eq!(c.lng, 43.1);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let doc = Document::from_json(r#"{"seo":{"title":"t"},"company":{"name":"x"}}"#).unwrap();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"seo\""));
    }

    #[test]
    fn test_fallback_has_contact_and_empty_lists() {
        let doc = Document::fallback();
        assert_eq!(doc.branch_count(), 0);
        assert_eq!(doc.social_count(), 0);
        assert_eq!(doc.contact.unwrap().whatsapp.number, "+966501234567");
    }
}
