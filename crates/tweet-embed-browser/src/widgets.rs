//! The Twitter widget script and its `twttr.widgets` global.

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use tweet_embed_core::{PlatformError, WidgetHost};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlScriptElement};

use crate::js_error;

#[derive(Clone)]
pub struct BrowserWidgets {
    document: Document,
}

impl BrowserWidgets {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// `window.twttr.widgets`, if the script has set it up.
    fn widgets_object() -> Option<JsValue> {
        let window = web_sys::window()?;
        let twttr = js_sys::Reflect::get(&window, &JsValue::from_str("twttr")).ok()?;
        if !twttr.is_object() {
            return None;
        }
        let widgets = js_sys::Reflect::get(&twttr, &JsValue::from_str("widgets")).ok()?;
        widgets.is_object().then_some(widgets)
    }
}

impl WidgetHost for BrowserWidgets {
    type Node = Element;

    fn widgets_available(&self) -> bool {
        Self::widgets_object().is_some()
    }

    fn inject_script(&self, src: &str) -> Result<LocalBoxFuture<'static, ()>, PlatformError> {
        let script = self
            .document
            .create_element("script")
            .map_err(js_error)?
            .dyn_into::<HtmlScriptElement>()
            .map_err(|_| PlatformError::from("created element is not a script"))?;
        script.set_src(src);
        script.set_async(true);

        // Only the load event resolves; a failed script leaves this pending.
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let onload = Closure::wrap(Box::new(move || {
                resolve.call0(&JsValue::NULL).ok();
            }) as Box<dyn FnMut()>);

            script.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();
        });

        let head = self
            .document
            .head()
            .ok_or_else(|| PlatformError::from("document has no head"))?;
        head.append_child(&script).map_err(js_error)?;

        Ok(async move {
            let _ = JsFuture::from(promise).await;
        }
        .boxed_local())
    }

    fn load_widgets(&self, node: &Element) -> bool {
        let Some(widgets) = Self::widgets_object() else {
            return false;
        };
        let load = match js_sys::Reflect::get(&widgets, &JsValue::from_str("load")) {
            Ok(load) => load,
            Err(_) => return false,
        };
        let Some(load) = load.dyn_ref::<js_sys::Function>() else {
            return false;
        };
        if let Err(err) = load.call1(&widgets, node) {
            tracing::warn!(error = ?err, "twttr.widgets.load threw");
        }
        true
    }
}
