use config::{Config, ConfigError};
use resolve_path::PathResolveExt;
use serde::Deserialize;
use std::path::PathBuf;

use crate::gateway::{ChapterOrder, ProviderKind};
use crate::mapping::DatabaseLocation;

#[derive(Deserialize, Debug)]
pub struct Settings {
    /// Address the mapping service listens on.
    pub bind_address: String,
    /// SQLite file for mappings, or `:memory:`.
    pub database_path: String,
    /// Where the client reaches the mapping service.
    pub backend_url: String,
    /// Directory holding local history and bookmarks.
    pub state_directory: String,
    pub provider: ProviderSettings,
}

#[derive(Deserialize, Debug, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    /// Overrides the provider's default base URL.
    pub base_url: Option<String>,
    /// Proxy that receives the upstream URL in its `url` query parameter.
    pub proxy_url: Option<String>,
    /// `newest_first` unless the provider is known to list oldest first.
    #[serde(default)]
    pub chapter_order: ChapterOrder,
}

impl Settings {
    pub fn new(config_file: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("database_path", "~/.local/share/comic-reader/mappings.db")?
            .set_default("backend_url", "http://localhost:3000")?
            .set_default("state_directory", "~/.local/share/comic-reader")?
            .set_default("provider.kind", "komikcast")?
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(config::Environment::with_prefix("COMIC").separator("__"))
            .build()?;
        builder.try_deserialize()
    }

    pub fn database_location(&self) -> DatabaseLocation {
        if self.database_path == ":memory:" {
            DatabaseLocation::Memory
        } else {
            DatabaseLocation::File(self.database_path.resolve().into_owned())
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_directory.resolve().into_owned()
    }
}
