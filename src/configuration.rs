//! Shell configuration read from `paraquery.toml` and `PARAQUERY_*` variables.
//!
//! ```toml
//! database = "/data/ppdb"
//! log = "info"
//!
//! [session]
//! limit = 25
//! order = "random"
//! same_pos = "on"
//! ```
//!
//! Session entries go through [`Settings::set`], so they accept exactly the
//! values the `set` command accepts.

use std::collections::BTreeMap;
use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::session::Settings;

pub const DEFAULT_CONFIG_FILE: &str = "paraquery.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShellConfig {
    /// Directory holding a `.paradb`, or the database file itself.
    pub database: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    pub log: Option<String>,
    #[serde(default)]
    pub session: BTreeMap<String, String>,
}

impl ShellConfig {
    /// Reads the given file (if present) overlaid with `PARAQUERY_*` variables.
    pub fn load(file: &str) -> Result<ShellConfig> {
        let config = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(Environment::with_prefix("PARAQUERY").separator("__"))
            .build()?;
        Ok(config.try_deserialize::<ShellConfig>()?)
    }

    /// Session settings with every configured entry applied; rejected entries are skipped.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        for (name, value) in &self.session {
            if let Err(e) = settings.set(name, value) {
                warn!(error = %e, "ignoring configured setting");
            }
        }
        settings
    }
}
