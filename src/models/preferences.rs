use serde::{Deserialize, Serialize};

use crate::store::{self, Store, PREFERENCES_KEY};

/// Admin UI preferences. Missing or partial stored values fall back field by
/// field to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub sidebar_collapsed: bool,
    pub theme: String,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            sidebar_collapsed: false,
            theme: "light".to_string(),
            language: "ar".to_string(),
        }
    }
}

#[derive(Debug, FromForm)]
pub struct PreferencesForm {
    pub sidebar_collapsed: Option<bool>,
    pub theme: Option<String>,
    pub language: Option<String>,
    /// Admin page to go back to after saving.
    pub return_to: Option<String>,
}

impl Preferences {
    pub fn load(store: &dyn Store) -> Self {
        store::read_json(store, PREFERENCES_KEY).unwrap_or_default()
    }

    pub fn save(&self, store: &dyn Store) -> Result<(), String> {
        store::write_json(store, PREFERENCES_KEY, self)
    }

    /// Merge the submitted fields; unknown themes and languages are ignored.
    pub fn merge(&mut self, form: &PreferencesForm) {
        if let Some(collapsed) = form.sidebar_collapsed {
            self.sidebar_collapsed = collapsed;
        }
        if let Some(ref theme) = form.theme {
            if matches!(theme.as_str(), "light" | "dark") {
                self.theme = theme.clone();
            }
        }
        if let Some(ref lang) = form.language {
            if matches!(lang.as_str(), "ar" | "en") {
                self.language = lang.clone();
            }
        }
    }
}
