//! Registration with the Discourse plugin API.
//!
//! Discourse calls cooked-content decorators with either a bare element or a
//! jQuery wrapper depending on the API version, so both are accepted.

use tweet_embed_core::PlatformError;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::js_error;

/// Decorator registration methods, most preferred first.
const DECORATE_METHODS: [&str; 2] = ["decorateCooked", "decorateCookedElement"];

/// Element behind a decorator argument, unwrapping jQuery objects.
pub fn cooked_element(value: &JsValue) -> Option<Element> {
    if let Some(element) = value.dyn_ref::<Element>() {
        return Some(element.clone());
    }
    if !value.is_object() {
        return None;
    }
    js_sys::Reflect::get_u32(value, 0)
        .ok()
        .and_then(|first| first.dyn_into::<Element>().ok())
}

/// Register `crate::decorate_element` on `api` under `id`.
pub fn register(api: &JsValue, id: &str) -> Result<(), PlatformError> {
    let (name, method) = DECORATE_METHODS
        .iter()
        .find_map(|name| {
            let method = js_sys::Reflect::get(api, &JsValue::from_str(name)).ok()?;
            method.dyn_into::<js_sys::Function>().ok().map(|f| (*name, f))
        })
        .ok_or_else(|| PlatformError::from("plugin API has no cooked-content decorator"))?;

    let options = js_sys::Object::new();
    js_sys::Reflect::set(&options, &"id".into(), &JsValue::from_str(id)).map_err(js_error)?;
    js_sys::Reflect::set(&options, &"onlyStream".into(), &JsValue::FALSE).map_err(js_error)?;
    js_sys::Reflect::set(&options, &"afterAdopt".into(), &JsValue::FALSE).map_err(js_error)?;

    let decorator = Closure::wrap(Box::new(move |cooked: JsValue, _helper: JsValue| {
        match cooked_element(&cooked) {
            Some(element) => {
                crate::decorate_element(element);
            }
            None => tracing::debug!("decorator called without an element"),
        }
    }) as Box<dyn FnMut(JsValue, JsValue)>);

    method
        .call2(api, decorator.as_ref(), &options)
        .map_err(js_error)?;
    // The host keeps the decorator for the page's lifetime.
    decorator.forget();

    tracing::debug!(method = name, id, "registered cooked decorator");
    Ok(())
}
