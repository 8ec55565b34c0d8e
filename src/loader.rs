use log::{info, warn};

use crate::models::document::Document;

/// Where the site document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    File(String),
    Url(String),
}

impl DataSource {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            DataSource::Url(s.to_string())
        } else {
            DataSource::File(s.to_string())
        }
    }

    pub fn describe(&self) -> &str {
        match self {
            DataSource::File(p) => p,
            DataSource::Url(u) => u,
        }
    }
}

/// One read of the document. A non-success status, an I/O error or a parse
/// error all come back as `Err`. No retry, no cache.
pub async fn fetch(source: &DataSource) -> Result<Document, String> {
    let text = match source {
        DataSource::File(path) => rocket::tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("read {}: {}", path, e))?,
        DataSource::Url(url) => {
            let resp = reqwest::get(url.as_str())
                .await
                .map_err(|e| format!("fetch {}: {}", url, e))?;
            let status = resp.status();
            if !status.is_success() {
                return Err(format!("HTTP error! status: {}", status.as_u16()));
            }
            resp.text().await.map_err(|e| e.to_string())?
        }
    };
    Document::from_json(&text)
}

/// Public page variant: the failure goes back to the caller, which shows an
/// error toast and renders whatever it can.
pub async fn load_public(source: &DataSource) -> Result<Document, String> {
    fetch(source).await.map_err(|e| {
        warn!("Failed to load site data from {}: {}", source.describe(), e);
        e
    })
}

/// Admin variant: never fails. On any error the hardcoded default document
/// becomes the working copy. The flag reports whether the fallback was used.
pub async fn load_admin(source: &DataSource) -> (Document, bool) {
    match fetch(source).await {
        Ok(doc) => {
            info!("Loaded site data from {}", source.describe());
            (doc, false)
        }
        Err(e) => {
            warn!(
                "Failed to load site data from {} ({}), using default document",
                source.describe(),
                e
            );
            (Document::fallback(), true)
        }
    }
}
