//! Browser side effects and JS interop.
//!
//! Page reload, session storage access, dynamic-import adaptation. Native
//! builds get logged no-op stubs so the rest of the crate stays testable off
//! the web.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use crate::load::Module;

/// Session storage handle, if the browser grants one (WASM only).
#[cfg(target_arch = "wasm32")]
pub fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.session_storage().ok())
        .flatten()
}

/// Force a full reload of the current document (WASM only).
///
/// Tears down the running process; the reload ledger is what survives.
#[cfg(target_arch = "wasm32")]
pub fn reload_page() {
    if let Some(window) = web_sys::window() {
        log::info!("forcing full page reload");
        if let Err(err) = window.location().reload() {
            log::error!("page reload refused: {err:?}");
        }
    }
}

/// Native stub
#[cfg(not(target_arch = "wasm32"))]
pub fn reload_page() {
    log::info!("page reload requested (no-op outside the browser)");
}

/// Adapt a dynamic `import()` promise into the crate's module shape (WASM
/// only).
///
/// Awaits the promise and projects the module's `default` export, so the
/// `{ default }` contract crosses the JS boundary unchanged. Rejections come
/// back verbatim as the original `JsValue`.
#[cfg(target_arch = "wasm32")]
pub async fn module_from_promise(promise: js_sys::Promise) -> Result<Module<JsValue>, JsValue> {
    let module = wasm_bindgen_futures::JsFuture::from(promise).await?;
    let default = js_sys::Reflect::get(&module, &JsValue::from_str("default"))?;
    Ok(Module::new(default))
}
