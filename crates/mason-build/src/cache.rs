//! Memoizing configuration cache
//!
//! Each manifest is read and parsed at most once per session and shared
//! read-only from then on. A file the host cannot read stays uncached so a
//! later retry is possible; a file that reads but fails to parse is reported
//! once and also left uncached.

use crate::diagnostics::{Diagnostic, Reporter};
use crate::host::BuildHost;
use mason_config::{ConfigPath, ProjectConfig};
use std::collections::HashMap;
use std::sync::Arc;

pub struct ConfigCache {
    configs: HashMap<ConfigPath, Arc<ProjectConfig>>,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
        }
    }

    /// Load the manifest at `path`, parsing on first request.
    ///
    /// Returns `None` when the file cannot be read or parsed; parse failures
    /// are reported through `reporter`.
    pub fn parse(
        &mut self,
        host: &dyn BuildHost,
        reporter: &dyn Reporter,
        path: &ConfigPath,
    ) -> Option<Arc<ProjectConfig>> {
        if let Some(config) = self.configs.get(path) {
            return Some(config.clone());
        }

        let text = host.read_file(path.as_path())?;
        match ProjectConfig::parse(path.clone(), &text) {
            Ok(config) => {
                let config = Arc::new(config);
                self.configs.insert(path.clone(), config.clone());
                Some(config)
            }
            Err(error) => {
                reporter.report(&Diagnostic::error(error.to_string()));
                None
            }
        }
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}
