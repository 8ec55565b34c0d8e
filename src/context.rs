use std::sync::Arc;

use log::info;

use crate::config::AppConfig;
use crate::editor::Workspace;
use crate::loader::{self, DataSource};
use crate::models::account::Account;
use crate::store::file::FileStore;
use crate::store::memory::MemoryStore;
use crate::store::Store;

/// Everything a handler needs, passed through Rocket managed state.
pub struct AppContext {
    pub config: AppConfig,
    pub source: DataSource,
    pub workspace: Workspace,
    store: Arc<dyn Store>,
}

impl AppContext {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, workspace: Workspace) -> Self {
        let source = DataSource::parse(&config.data_source);
        AppContext {
            config,
            source,
            workspace,
            store,
        }
    }

    /// Open the configured store, seed the account and load the working copy.
    pub async fn init(config: AppConfig) -> Result<Self, String> {
        let store = open_store(&config.storage_path)?;
        Account::seed(store.as_ref(), &config.admin_username, &config.admin_password)?;
        let source = DataSource::parse(&config.data_source);
        let (document, fallback) = loader::load_admin(&source).await;
        Ok(Self::new(config, store, Workspace::new(document, fallback)))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn admin_base(&self) -> String {
        self.config.admin_base()
    }

    /// Discard the working copy and load it again from the source.
    pub async fn reload(&self) -> Result<bool, String> {
        let (document, fallback) = loader::load_admin(&self.source).await;
        self.workspace.replace(document, fallback)?;
        info!("Working copy reloaded from {}", self.source.describe());
        Ok(fallback)
    }
}

/// An empty path keeps the store in memory.
pub fn open_store(path: &str) -> Result<Arc<dyn Store>, String> {
    if path.trim().is_empty() {
        info!("Using in-memory storage");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = FileStore::open(path)?;
    info!("Using storage file {}", store.path().display());
    Ok(Arc::new(store))
}
