//! Configuration for the in-process store, loaded from multiple sources
//! with priority:
//! 1. Default values (hardcoded)
//! 2. Config file
//! 3. Environment variables (highest priority)

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;


/// Retention settings for [`MemoryStore`](crate::MemoryStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of revisions retained for point-in-time reads.
    /// Older revisions are pruned; reads against them fail with
    /// `StoreError::RevisionPruned`. Must be at least 2 so a watch baseline
    /// read one revision behind head stays servable.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    1024
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from an optional TOML file and `REVWATCH_*`
    /// environment variables, then validate.
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::with_name(path));
        }
        let config: StoreConfig = builder
            .add_source(Environment::with_prefix("REVWATCH").try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit < 2 {
            return Err(Error::Config(ConfigError::Message(
                "history_limit must be at least 2".into(),
            )));
        }
        Ok(())
    }
}
