use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::binding::{self, FieldBinding, Section};
use crate::models::account::{Account, AccountChange, AccountError, AccountForm};
use crate::models::document::{
    new_id, Branch, Coordinates, Document, SocialLink, DEFAULT_SOCIAL_ICON,
};
use crate::models::stats::VisitsStats;
use crate::store::{Store, DATA_KEY};

/// The admin's in-memory working copy of the document.
pub struct EditorState {
    pub document: Document,
    /// Set by list edits, cleared by any save.
    pub dirty: bool,
    /// True when the working copy came from the fallback document.
    pub fallback: bool,
    pub last_saved: Option<DateTime<Utc>>,
}

/// Aggregate counters shown on the dashboard and list pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub branches: usize,
    pub social: usize,
    pub apps: usize,
}

/// Shared editor. Lives in Rocket managed state; one per process.
pub struct Workspace {
    state: Mutex<EditorState>,
    saving: Mutex<HashSet<Section>>,
}

/// Held while a section save is in flight. A second save of the same
/// section is refused until this is dropped.
pub struct SaveTicket<'a> {
    workspace: &'a Workspace,
    section: Section,
}

impl Drop for SaveTicket<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.workspace.saving.lock() {
            set.remove(&self.section);
        }
    }
}

// ── List items ─────────────────────────────────────────

/// A list element editable through the shared modal form.
pub trait ListItem: Clone {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn list(doc: &Document) -> Option<&Vec<Self>>;
    fn list_mut(doc: &mut Document) -> &mut Vec<Self>;
}

impl ListItem for Branch {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn list(doc: &Document) -> Option<&Vec<Self>> {
        doc.branches.as_ref()
    }
    fn list_mut(doc: &mut Document) -> &mut Vec<Self> {
        doc.branches.get_or_insert_with(Vec::new)
    }
}

impl ListItem for SocialLink {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn list(doc: &Document) -> Option<&Vec<Self>> {
        doc.social_media.as_ref()
    }
    fn list_mut(doc: &mut Document) -> &mut Vec<Self> {
        doc.social_media.get_or_insert_with(Vec::new)
    }
}

#[derive(Debug, Default, FromForm)]
pub struct BranchForm {
    #[field(default = String::new())]
    pub name: String,
    #[field(default = String::new())]
    pub address: String,
    #[field(default = String::new())]
    pub phone: String,
    #[field(default = String::new())]
    pub google_maps: String,
    #[field(default = String::new())]
    pub lat: String,
    #[field(default = String::new())]
    pub lng: String,
}

#[derive(Debug, Default, FromForm)]
pub struct SocialForm {
    #[field(default = String::new())]
    pub name: String,
    #[field(default = String::new())]
    pub url: String,
    #[field(default = String::new())]
    pub icon: String,
}

pub const REQUIRED_FIELDS_MSG: &str = "يرجى ملء جميع الحقول المطلوبة";

pub const INVALID_COORDINATES_MSG: &str = "إحداثيات غير صالحة";

/// `f64::from_str` takes "NaN" and "inf", which serialize as null.
fn valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && lat.abs() <= 90.0 && lng.abs() <= 180.0
}

fn check_url(raw: &str) -> Result<(), String> {
    url::Url::parse(raw)
        .map(|_| ())
        .map_err(|_| format!("رابط غير صالح: {}", raw))
}

impl BranchForm {
    pub fn from_item(b: &Branch) -> Self {
        BranchForm {
            name: b.name.clone(),
            address: b.address.clone(),
            phone: b.phone.clone(),
            google_maps: b.google_maps.clone().unwrap_or_default(),
            lat: b.coordinates.map(|c| c.lat.to_string()).unwrap_or_default(),
            lng: b.coordinates.map(|c| c.lng.to_string()).unwrap_or_default(),
        }
    }

    pub fn into_item(self) -> Result<Branch, String> {
        let name = self.name.trim().to_string();
        let address = self.address.trim().to_string();
        let phone = self.phone.trim().to_string();
        if name.is_empty() || address.is_empty() || phone.is_empty() {
            return Err(REQUIRED_FIELDS_MSG.to_string());
        }

        let maps = self.google_maps.trim();
        let google_maps = if maps.is_empty() {
            None
        } else {
            check_url(maps)?;
            Some(maps.to_string())
        };

        let coordinates = match (self.lat.trim(), self.lng.trim()) {
            ("", "") => None,
            (lat, lng) => match (lat.parse::<f64>(), lng.parse::<f64>()) {
                (Ok(lat), Ok(lng)) if valid_coordinates(lat, lng) => Some(Coordinates { lat, lng }),
                _ => return Err(INVALID_COORDINATES_MSG.to_string()),
            },
        };

        Ok(Branch {
            id: String::new(),
            name,
            address,
            phone,
            google_maps,
            coordinates,
        })
    }
}

impl SocialForm {
    pub fn from_item(s: &SocialLink) -> Self {
        SocialForm {
            name: s.name.clone(),
            url: s.url.clone(),
            icon: s.icon.clone(),
        }
    }

    pub fn into_item(self) -> Result<SocialLink, String> {
        let name = self.name.trim().to_string();
        let url = self.url.trim().to_string();
        if name.is_empty() || url.is_empty() {
            return Err(REQUIRED_FIELDS_MSG.to_string());
        }
        check_url(&url)?;
        let icon = match self.icon.trim() {
            "" => DEFAULT_SOCIAL_ICON.to_string(),
            other => other.to_string(),
        };
        Ok(SocialLink {
            id: String::new(),
            name,
            url,
            icon,
        })
    }
}

// ── Workspace ──────────────────────────────────────────

impl Workspace {
    pub fn new(document: Document, fallback: bool) -> Self {
        Workspace {
            state: Mutex::new(EditorState {
                document,
                dirty: false,
                fallback,
                last_saved: None,
            }),
            saving: Mutex::new(HashSet::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EditorState>, String> {
        self.state.lock().map_err(|e| e.to_string())
    }

    pub fn snapshot(&self) -> Result<Document, String> {
        Ok(self.lock()?.document.clone())
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().map(|s| s.dirty).unwrap_or(false)
    }

    pub fn is_fallback(&self) -> bool {
        self.lock().map(|s| s.fallback).unwrap_or(false)
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.lock().ok().and_then(|s| s.last_saved)
    }

    /// Replace the working copy, discarding unsaved edits.
    pub fn replace(&self, document: Document, fallback: bool) -> Result<(), String> {
        let mut state = self.lock()?;
        state.document = document;
        state.fallback = fallback;
        state.dirty = false;
        Ok(())
    }

    pub fn counters(&self) -> Counters {
        match self.lock() {
            Ok(s) => Counters {
                branches: s.document.branch_count(),
                social: s.document.social_count(),
                apps: s.document.app_count(),
            },
            Err(_) => Counters {
                branches: 0,
                social: 0,
                apps: 0,
            },
        }
    }

    /// Bound fields of a section, read from the working copy.
    pub fn section_fields(&self, section: Section) -> Result<Vec<binding::BoundField>, String> {
        let doc = self.lock()?.document.to_value()?;
        Ok(binding::load_fields(&doc, section.fields()))
    }

    // ── List CRUD ──────────────────────────────────────

    pub fn items<T: ListItem>(&self) -> Vec<T> {
        self.lock()
            .ok()
            .and_then(|s| T::list(&s.document).cloned())
            .unwrap_or_default()
    }

    pub fn find<T: ListItem>(&self, id: &str) -> Option<T> {
        let state = self.lock().ok()?;
        T::list(&state.document)?.iter().find(|i| i.id() == id).cloned()
    }

    /// Append an item with a fresh id. Returns the id.
    pub fn add<T: ListItem>(&self, mut item: T) -> Result<String, String> {
        let mut state = self.lock()?;
        let id = new_id();
        item.set_id(id.clone());
        T::list_mut(&mut state.document).push(item);
        state.dirty = true;
        Ok(id)
    }

    /// Replace the item with this id, keeping its position and id.
    pub fn update<T: ListItem>(&self, id: &str, mut item: T) -> Result<(), String> {
        let mut state = self.lock()?;
        let list = T::list_mut(&mut state.document);
        let slot = list
            .iter_mut()
            .find(|i| i.id() == id)
            .ok_or_else(|| format!("العنصر غير موجود: {}", id))?;
        item.set_id(id.to_string());
        *slot = item;
        state.dirty = true;
        Ok(())
    }

    /// Remove the item with this id. Later items shift down by one.
    pub fn delete<T: ListItem>(&self, id: &str) -> Result<T, String> {
        let mut state = self.lock()?;
        let list = T::list_mut(&mut state.document);
        let pos = list
            .iter()
            .position(|i| i.id() == id)
            .ok_or_else(|| format!("العنصر غير موجود: {}", id))?;
        let removed = list.remove(pos);
        state.dirty = true;
        Ok(removed)
    }

    // ── Saves ──────────────────────────────────────────

    /// Claim the in-flight slot for a section.
    pub fn begin_save(&self, section: Section) -> Option<SaveTicket<'_>> {
        let mut set = self.saving.lock().ok()?;
        if !set.insert(section) {
            return None;
        }
        Some(SaveTicket {
            workspace: self,
            section,
        })
    }

    /// Assign gathered values into the working copy, then persist the whole
    /// document.
    fn apply_and_persist(
        &self,
        table: &[FieldBinding],
        form: &HashMap<String, String>,
        store: &dyn Store,
    ) -> Result<(), String> {
        let mut state = self.lock()?;
        let mut value = state.document.to_value()?;
        binding::apply(&mut value, binding::gather(form, table));
        state.document = Document::from_value(value)?;
        persist_locked(&mut state, store)
    }

    /// Save one section. Only that section's fields are read from the form.
    pub fn save_section(
        &self,
        section: Section,
        form: &HashMap<String, String>,
        store: &dyn Store,
    ) -> Result<(), String> {
        if !section.is_editable() {
            return Err(format!("القسم غير قابل للحفظ: {}", section.slug()));
        }
        self.apply_and_persist(section.fields(), form, store)?;
        info!("Saved section {}", section.slug());
        Ok(())
    }

    /// The global save: company name/description and contact numbers, for
    /// whichever of those the submitting page carried. The rest of the
    /// working copy is persisted as it is.
    pub fn save_all(&self, form: &HashMap<String, String>, store: &dyn Store) -> Result<(), String> {
        let present: Vec<FieldBinding> = binding::SAVE_ALL_FIELDS
            .iter()
            .filter(|b| form.contains_key(b.id))
            .copied()
            .collect();
        self.apply_and_persist(&present, form, store)?;
        info!("Saved all changes ({} fields)", present.len());
        Ok(())
    }

    /// Persist the working copy as it is.
    pub fn persist(&self, store: &dyn Store) -> Result<(), String> {
        let mut state = self.lock()?;
        persist_locked(&mut state, store)
    }

    pub fn refresh_stats(&self, stats: VisitsStats, store: &dyn Store) -> Result<(), String> {
        let mut state = self.lock()?;
        state.document.visits_stats = Some(stats);
        persist_locked(&mut state, store)
    }

    pub fn stats(&self) -> VisitsStats {
        self.lock()
            .ok()
            .and_then(|s| s.document.visits_stats.clone())
            .unwrap_or_default()
    }
}

fn persist_locked(state: &mut EditorState, store: &dyn Store) -> Result<(), String> {
    let json = state.document.to_json()?;
    store.set(DATA_KEY, &json)?;
    state.dirty = false;
    state.last_saved = Some(Utc::now());
    Ok(())
}

#[derive(Debug)]
pub enum AccountSaveError {
    /// A validation rule failed; nothing was written.
    Invalid(AccountError),
    Failed(String),
}

/// Validate and apply an account form. Nothing is written unless every
/// rule passes.
pub fn save_account(form: &AccountForm, store: &dyn Store) -> Result<Account, AccountSaveError> {
    let change: AccountChange = form.validate().map_err(|rule| {
        warn!("Account change rejected: {:?}", rule);
        AccountSaveError::Invalid(rule)
    })?;
    let mut account = Account::load(store)
        .ok_or_else(|| AccountSaveError::Failed("الحساب غير موجود".to_string()))?;
    account
        .apply(&change, store)
        .map_err(AccountSaveError::Failed)?;
    info!("Account settings updated for '{}'", account.username);
    Ok(account)
}
