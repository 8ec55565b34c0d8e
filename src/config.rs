use std::time::Duration;

use rocket::figment::Figment;
use serde::Deserialize;

/// Application settings, read from `Rocket.toml` / `ROCKET_*` alongside
/// Rocket's own configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Path or `http(s)` URL of the site document.
    pub data_source: String,
    /// Storage file for admin edits. Empty keeps everything in memory.
    pub storage_path: String,
    pub admin_slug: String,
    /// Simulated latency applied to every section save.
    pub save_delay_ms: u64,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_source: "data.json".to_string(),
            storage_path: "website/storage/storage.json".to_string(),
            admin_slug: "admin".to_string(),
            save_delay_ms: 1500,
            admin_username: "admin".to_string(),
            admin_password: "fyfa2024".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Self {
        match figment.extract::<AppConfig>() {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Invalid application config, using defaults: {}", e);
                AppConfig::default()
            }
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    /// Admin mount point, e.g. `/admin`.
    pub fn admin_base(&self) -> String {
        format!("/{}", self.admin_slug.trim_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let figment = Figment::from(rocket::Config::default())
            .merge(("admin_slug", "panel"))
            .merge(("save_delay_ms", 0));
        let c = AppConfig::from_figment(&figment);
        assert_eq!(c.admin_slug, "panel");
        assert_eq!(c.save_delay_ms, 0);
        assert_eq!(c.data_source, "data.json");
        assert_eq!(c.admin_base(), "/panel");
    }
}
