use nutrisnap_core::{Clock, EntryStore, FileStore, GeminiGateway, PreferenceStore, SystemClock};
use std::sync::Arc;

use crate::config::Config;

/// Everything a command needs, opened once per invocation.
pub struct AppContext {
    pub config: Config,
    pub entries: Arc<EntryStore<FileStore>>,
    pub preferences: PreferenceStore<FileStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Opens the stores under the configured data directory.
    ///
    /// A corrupt entry history is logged and replaced by an empty one.
    pub fn open(config: Config) -> Self {
        let data_dir = config.data_dir.value.clone();
        tracing::debug!("Data directory: {}", data_dir.display());

        let entries = Arc::new(EntryStore::open(FileStore::new(data_dir.clone())));
        let preferences = PreferenceStore::new(FileStore::new(data_dir));

        Self {
            config,
            entries,
            preferences,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn gateway(&self) -> GeminiGateway {
        GeminiGateway::new(self.config.api_key.value.clone()).with_model(&self.config.model.value)
    }
}
