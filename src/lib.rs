//! safe-lazy - retry and reload-once recovery for lazily loaded modules
//!
//! Wraps the async loaders a suspense-style renderer drives so a failed chunk
//! load (stale deployment reference, flaky network) is retried in place and,
//! as a last resort, answered with one full page reload instead of an error
//! screen. A session-scoped ledger remembers which loaders already forced a
//! reload, so a genuinely broken chunk degrades to a normal rendering error
//! instead of a reload loop.
//!
//! Core modules:
//! - `config`: caller options and their resolution against crate defaults
//! - `store`: key-value persistence seam (SessionStorage on web, in-memory elsewhere)
//! - `ledger`: per-loader reload counts, durable across page reloads
//! - `load`: the `SafeLazy` factory and the wrapped `LazyLoader`
//! - `platform`: page reload and dynamic-import interop

pub mod config;
pub mod ledger;
pub mod load;
pub mod platform;
pub mod store;

pub use config::{ForceReload, ForceReloadOptions, SafeLazyConfig, SafeLazyOptions};
pub use ledger::ReloadLedger;
pub use load::{LazyLoader, Module, SafeLazy};
#[cfg(target_arch = "wasm32")]
pub use store::SessionStore;
pub use store::{MemoryStore, ReloadStore, StoreError};

/// Crate-wide defaults
pub mod consts {
    /// Extra immediate retries after the first failed load attempt
    pub const DEFAULT_IMPORT_RETRIES: u32 = 0;
    /// Full page reloads allowed per loader identity
    pub const DEFAULT_MAX_RELOADS: u32 = 1;
    /// Session storage key the reload ledger lives under
    pub const DEFAULT_STORAGE_KEY: &str = "safe_lazy_reload_ledger";
}
