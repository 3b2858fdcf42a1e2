//! Browser DOM layer for lazy tweet embeds.
//!
//! This crate implements the `tweet-embed-core` platform traits on top of
//! `web-sys` and exposes the entry points a Discourse plugin initializer
//! calls. It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `EmbedDom` over real elements
//! - `observer`: one `IntersectionObserver` per context
//! - `widgets`: `widgets.js` injection and `twttr.widgets.load`
//! - `spawn`: `LocalSpawn` over `wasm_bindgen_futures::spawn_local`
//! - `hook`: registration with the plugin API's cooked-content decorator
//!
//! # Usage from JS
//!
//! ```js
//! import init, { init as setup, registerDecorator } from "./tweet_embed_browser.js";
//!
//! await init();
//! setup({ rootMarginPx: 200 });
//! withPluginApi("0.8.31", (api) => registerDecorator(api));
//! ```

use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::Once;

use wasm_bindgen::prelude::*;

pub use tweet_embed_core;
pub use tweet_embed_core::*;

pub mod dom;
pub mod hook;
pub mod observer;
pub mod spawn;
pub mod widgets;

pub use dom::BrowserDom;
pub use observer::BrowserObserver;
pub use spawn::WasmSpawner;
pub use widgets::BrowserWidgets;

/// The context type used in the browser.
pub type BrowserContext = EmbedContext<BrowserDom, BrowserObserver, BrowserWidgets>;

thread_local! {
    static CONFIG: RefCell<EmbedConfig> = RefCell::new(EmbedConfig::default());
    static CONTEXT: OnceCell<Rc<BrowserContext>> = const { OnceCell::new() };
}

static LOGGING: Once = Once::new();

pub(crate) fn js_error(value: JsValue) -> PlatformError {
    match value.as_string() {
        Some(message) => PlatformError(message),
        None => PlatformError(format!("{value:?}")),
    }
}

/// Set up logging and store the embed configuration.
///
/// `config` is an optional object with camelCase `EmbedConfig` fields. The
/// configuration only takes effect if no content has been decorated yet.
#[wasm_bindgen]
pub fn init(config: JsValue) -> Result<(), JsError> {
    LOGGING.call_once(install_logging);

    let config: EmbedConfig = if config.is_undefined() || config.is_null() {
        EmbedConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid embed config: {}", e)))?
    };
    config
        .validate()
        .map_err(|e| JsError::new(&e.to_string()))?;

    if CONTEXT.with(|cell| cell.get().is_some()) {
        tracing::warn!("embed context already running; new configuration ignored");
    }
    CONFIG.with_borrow_mut(|current| *current = config);
    Ok(())
}

/// Decorate one cooked element. Returns the number of placeholders created.
#[wasm_bindgen(js_name = decorateElement)]
pub fn decorate_element(element: web_sys::Element) -> u32 {
    match context() {
        Ok(ctx) => {
            let report = ctx.decorate(&element);
            tracing::debug!(?report, "decorated cooked element");
            report.placeholders as u32
        }
        Err(err) => {
            tracing::warn!(%err, "embed context unavailable; leaving content as is");
            0
        }
    }
}

/// Register the decorator with a Discourse plugin API object.
#[wasm_bindgen(js_name = registerDecorator)]
pub fn register_decorator(api: JsValue) -> Result<(), JsError> {
    let id = CONFIG.with_borrow(|config| config.decorator_id.clone());
    hook::register(&api, &id).map_err(|e| JsError::new(&e.to_string()))
}

/// The page's embed context, created on first use.
pub fn context() -> Result<Rc<BrowserContext>, EmbedError> {
    if let Some(ctx) = CONTEXT.with(|cell| cell.get().cloned()) {
        return Ok(ctx);
    }
    let config = CONFIG.with_borrow(|config| config.clone());
    let ctx = build_context(config)?;
    CONTEXT.with(|cell| {
        let _ = cell.set(Rc::clone(&ctx));
    });
    Ok(ctx)
}

fn build_context(config: EmbedConfig) -> Result<Rc<BrowserContext>, EmbedError> {
    let dom = BrowserDom::new()?;
    let widgets = Rc::new(BrowserWidgets::new(dom.document().clone()));

    // The observer callback needs the context, which needs the observer.
    let slot: Rc<OnceCell<Weak<BrowserContext>>> = Rc::default();
    let observer = {
        let slot = Rc::clone(&slot);
        BrowserObserver::new(&config.root_margin(), move |target, intersecting| {
            let Some(ctx) = slot.get().and_then(Weak::upgrade) else {
                return;
            };
            if let Some(key) = ctx.key_of(&target) {
                ctx.handle_intersection(key, intersecting);
            }
        })?
    };

    let ctx = EmbedContext::new(config, dom, observer, widgets, Box::new(WasmSpawner))?;
    let _ = slot.set(Rc::downgrade(&ctx));
    tracing::debug!("embed context ready");
    Ok(ctx)
}

fn install_logging() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        // Another crate on the page may have installed a subscriber already.
        let _ = set_global_default(Registry::default().with(wasm_layer));
    }
}
