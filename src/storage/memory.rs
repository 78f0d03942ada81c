//! In-memory config store.

use crate::domain::error::Result;
use crate::domain::LoginConfig;
use crate::storage::backend::ConfigStore;

/// Keeps the configuration for the lifetime of the process only.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    config: Option<LoginConfig>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn with_config(config: LoginConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Option<LoginConfig>> {
        Ok(self.config.clone())
    }

    fn save(&mut self, config: &LoginConfig) -> Result<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.config = None;
        Ok(())
    }
}
