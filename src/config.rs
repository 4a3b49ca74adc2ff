//! Wrapper configuration.
//!
//! Callers hand over [`SafeLazyOptions`] with any subset of fields set; the
//! factory resolves them against the defaults in [`crate::consts`] once, up
//! front, and never reconfigures after that.

use serde::{Deserialize, Serialize};

use crate::consts;

/// Options accepted by [`SafeLazy::new`](crate::SafeLazy::new).
///
/// All fields are optional; `Default` means "retry never, reload once".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SafeLazyOptions {
    /// Extra immediate retries after the first failed load attempt.
    pub import_retries: Option<u32>,
    /// Reload-on-exhaustion behavior. `None` enables it with defaults.
    pub force_reload: Option<ForceReload>,
}

/// Whether exhausted load failures may force a full page reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ForceReload {
    /// Never reload; exhausted failures always propagate to the caller.
    Disabled,
    /// Reload with the given overrides, defaults filling the gaps.
    Enabled(ForceReloadOptions),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForceReloadOptions {
    /// Full page reloads allowed per loader identity.
    pub max_reloads: Option<u32>,
    /// Storage key the reload ledger lives under.
    pub storage_key: Option<String>,
}

/// Resolved configuration, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeLazyConfig {
    pub import_retries: u32,
    pub max_reloads: u32,
    pub storage_key: String,
}

impl SafeLazyConfig {
    /// Merge caller options with the crate defaults.
    ///
    /// `ForceReload::Disabled` resolves to a zero reload budget; the ledger
    /// is still constructed under the default key but stays inert.
    pub fn resolve(options: SafeLazyOptions) -> Self {
        let import_retries = options
            .import_retries
            .unwrap_or(consts::DEFAULT_IMPORT_RETRIES);

        let (max_reloads, storage_key) = match options.force_reload {
            Some(ForceReload::Disabled) => (0, None),
            Some(ForceReload::Enabled(reload)) => (
                reload.max_reloads.unwrap_or(consts::DEFAULT_MAX_RELOADS),
                reload.storage_key,
            ),
            None => (consts::DEFAULT_MAX_RELOADS, None),
        };

        Self {
            import_retries,
            max_reloads,
            storage_key: storage_key.unwrap_or_else(|| consts::DEFAULT_STORAGE_KEY.to_string()),
        }
    }
}

impl From<SafeLazyOptions> for SafeLazyConfig {
    fn from(options: SafeLazyOptions) -> Self {
        Self::resolve(options)
    }
}
