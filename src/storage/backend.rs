//! Config storage abstraction.
//!
//! This module defines the [`ConfigStore`] trait that abstracts over where the
//! remembered login configuration lives. The backend persists it through a
//! store; tests and the offline mode swap in memory or temporary files.

use crate::domain::error::Result;
use crate::domain::LoginConfig;

/// Persistence for the single remembered [`LoginConfig`].
///
/// There is at most one configuration. Saving replaces it, clearing removes
/// it, and loading a store that was never written yields `None`.
///
/// # Implementations
///
/// - [`JsonConfigStore`](super::JsonConfigStore): JSON file with atomic writes (default)
/// - [`MemoryConfigStore`](super::MemoryConfigStore): process-local, for tests
///
/// # Examples
///
/// ```
/// use zentao_desk::domain::LoginConfig;
/// use zentao_desk::storage::{ConfigStore, MemoryConfigStore};
///
/// let mut store = MemoryConfigStore::default();
/// store.save(&LoginConfig::new("http://zentao.local", "admin", "123456"))?;
/// assert_eq!(store.load()?.map(|c| c.account), Some("admin".to_string()));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ConfigStore: Send {
    /// Returns the saved configuration, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store exists but cannot be read.
    fn load(&self) -> Result<Option<LoginConfig>>;

    /// Replaces the saved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    fn save(&mut self, config: &LoginConfig) -> Result<()>;

    /// Forgets the saved configuration. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored configuration cannot be removed.
    fn clear(&mut self) -> Result<()>;
}
