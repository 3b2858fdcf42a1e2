//! Viewport proximity via `IntersectionObserver`.

use tweet_embed_core::{PlatformError, ViewportObserver};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::js_error;

type EntryCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// One observer shared by every placeholder of a context.
pub struct BrowserObserver {
    observer: IntersectionObserver,
    // Dropping the closure would invalidate the JS callback.
    _callback: EntryCallback,
}

impl BrowserObserver {
    /// Create an observer with the given root margin (e.g. `"100px"`).
    ///
    /// `on_entry` receives each entry's target and whether it is intersecting.
    pub fn new(
        root_margin: &str,
        mut on_entry: impl FnMut(Element, bool) + 'static,
    ) -> Result<Self, PlatformError> {
        let callback: EntryCallback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                        continue;
                    };
                    on_entry(entry.target(), entry.is_intersecting());
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_root_margin(root_margin);
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
                .map_err(js_error)?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl ViewportObserver for BrowserObserver {
    type Node = Element;

    fn observe(&self, node: &Element) {
        self.observer.observe(node);
    }

    fn unobserve(&self, node: &Element) {
        self.observer.unobserve(node);
    }
}

impl Drop for BrowserObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
