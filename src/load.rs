//! Load wrapping: bounded retry, then reload-or-propagate.
//!
//! [`SafeLazy`] is built once from a configuration and wraps any number of
//! async loaders. Each wrapped [`LazyLoader`] retries the underlying load a
//! bounded number of times and, when retries run out, consults the reload
//! ledger: under budget it forces one full page reload, over budget it hands
//! the failure back to the caller's error boundary.

use std::any::type_name;
use std::fmt::Debug;
use std::future::Future;
use std::rc::Rc;

use crate::config::{SafeLazyConfig, SafeLazyOptions};
use crate::ledger::ReloadLedger;
use crate::platform;
use crate::store::ReloadStore;

/// The module shape a suspense-style renderer expects from a loader.
///
/// `T` is whatever the rendering layer treats as a component; this crate
/// never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module<T> {
    pub default: T,
}

impl<T> Module<T> {
    pub fn new(default: T) -> Self {
        Self { default }
    }
}

impl<T: Default> Module<T> {
    /// A component rendering nothing.
    ///
    /// Returned while a forced reload is tearing the page down: the reload is
    /// not synchronous, so the caller still needs a well-typed value even
    /// though nobody will meaningfully render it.
    pub fn placeholder() -> Self {
        Self {
            default: T::default(),
        }
    }
}

/// Factory producing reload-guarded lazy loaders from one configuration.
///
/// Owns its resolved configuration and one [`ReloadLedger`]. Independent
/// factories may point at the same storage key, in which case they share
/// logical history through the medium.
pub struct SafeLazy {
    config: SafeLazyConfig,
    ledger: ReloadLedger,
}

impl SafeLazy {
    /// Build a factory on the platform-default store: session storage in the
    /// browser, in-memory elsewhere.
    pub fn new(options: SafeLazyOptions) -> Self {
        Self::with_store(options, default_store())
    }

    /// Build a factory over a caller-chosen storage medium.
    pub fn with_store(options: SafeLazyOptions, store: Rc<dyn ReloadStore>) -> Self {
        let config = SafeLazyConfig::resolve(options);
        let ledger = ReloadLedger::new(store, config.storage_key.clone());
        Self { config, ledger }
    }

    /// The resolved configuration this factory runs with.
    pub fn config(&self) -> &SafeLazyConfig {
        &self.config
    }

    /// Wrap `loader`, deriving its ledger identity from the closure's type
    /// name.
    ///
    /// Function identity does not survive a page reload, but for an unchanged
    /// build the type name is stable, and closures defined in different
    /// scopes get distinct names. Sibling closures in one scope can share a
    /// name; that collision is accepted, and [`Self::wrap_keyed`] takes an
    /// explicit identity (e.g. a chunk content hash) when it matters.
    pub fn wrap<F>(&self, loader: F) -> LazyLoader<F> {
        self.wrap_keyed(type_name::<F>(), loader)
    }

    /// Wrap `loader` under an explicit ledger identity.
    pub fn wrap_keyed<F>(&self, key: impl Into<String>, loader: F) -> LazyLoader<F> {
        LazyLoader {
            loader,
            key: key.into(),
            import_retries: self.config.import_retries,
            max_reloads: self.config.max_reloads,
            ledger: self.ledger.clone(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn default_store() -> Rc<dyn ReloadStore> {
    Rc::new(crate::store::SessionStore::new())
}

#[cfg(not(target_arch = "wasm32"))]
fn default_store() -> Rc<dyn ReloadStore> {
    Rc::new(crate::store::MemoryStore::new())
}

/// A wrapped loader, shaped like the primitive it decorates: zero-argument,
/// async, resolving to a [`Module`].
pub struct LazyLoader<F> {
    loader: F,
    key: String,
    import_retries: u32,
    max_reloads: u32,
    ledger: ReloadLedger,
}

impl<F> LazyLoader<F> {
    /// Ledger identity this loader is tracked under.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<F, Fut, T, E> LazyLoader<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Module<T>, E>>,
    T: Default,
    E: Debug,
{
    /// Drive one load.
    ///
    /// On success the reload history for this loader is cleared (when reload
    /// is enabled) so a future unrelated failure starts fresh. On exhausted
    /// failure, the ledger decides: under budget, record the reload and force
    /// it, answering with a placeholder; at or over budget, re-throw the
    /// original failure unchanged.
    pub async fn load(&self) -> Result<Module<T>, E> {
        match self.load_with_retries().await {
            Ok(module) => {
                if self.max_reloads > 0 {
                    self.ledger.remove(&self.key);
                }
                Ok(module)
            }
            Err(err) => {
                let reloads = self.ledger.count(&self.key);
                if reloads < self.max_reloads {
                    log::warn!(
                        "lazy load '{}' exhausted retries; reloading page ({}/{})",
                        self.key,
                        reloads + 1,
                        self.max_reloads
                    );
                    self.ledger.increment(&self.key);
                    platform::reload_page();
                    Ok(Module::placeholder())
                } else {
                    log::error!(
                        "lazy load '{}' failed with reload budget spent ({}), giving up",
                        self.key,
                        reloads
                    );
                    Err(err)
                }
            }
        }
    }

    /// Sequential attempts, `import_retries + 1` invocations at most. Never
    /// recursive; the attempt counter lives in the loop.
    async fn load_with_retries(&self) -> Result<Module<T>, E> {
        let mut attempts = 0;
        loop {
            match (self.loader)().await {
                Ok(module) => return Ok(module),
                Err(err) => {
                    log::warn!(
                        "lazy load '{}' attempt {} failed: {err:?}",
                        self.key,
                        attempts + 1
                    );
                    if attempts >= self.import_retries {
                        return Err(err);
                    }
                    attempts += 1;
                }
            }
        }
    }
}
