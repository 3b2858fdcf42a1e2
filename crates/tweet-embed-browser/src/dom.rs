//! `EmbedDom` over the browser document.

use gloo_events::EventListener;
use tweet_embed_core::{EmbedDom, NodeSpec, PlatformError};
use web_sys::{Document, Element, HtmlCollection};

use crate::js_error;

/// The live document.
#[derive(Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    /// Wrap the current window's document.
    pub fn new() -> Result<Self, PlatformError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| PlatformError::from("no document available"))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn build(&self, spec: &NodeSpec) -> Result<Element, PlatformError> {
        let element = self.document.create_element(&spec.tag).map_err(js_error)?;
        if !spec.classes.is_empty() {
            let classes: Vec<&str> = spec.classes.iter().map(|c| c.as_str()).collect();
            element.set_class_name(&classes.join(" "));
        }
        for (name, value) in &spec.attributes {
            element.set_attribute(name, value).map_err(js_error)?;
        }
        if let Some(style) = &spec.style {
            element.set_attribute("style", style).map_err(js_error)?;
        }
        if let Some(text) = &spec.text {
            element.set_text_content(Some(text));
        }
        for child in &spec.children {
            let child = self.build(child)?;
            element.append_child(&child).map_err(js_error)?;
        }
        Ok(element)
    }
}

fn collect(root: &Element, matches_root: bool, collection: HtmlCollection) -> Vec<Element> {
    let mut out = Vec::with_capacity(collection.length() as usize + 1);
    if matches_root {
        out.push(root.clone());
    }
    for i in 0..collection.length() {
        if let Some(element) = collection.item(i) {
            out.push(element);
        }
    }
    out
}

impl EmbedDom for BrowserDom {
    type Node = Element;

    fn links(&self, root: &Element) -> Vec<Element> {
        let is_link = root.tag_name().eq_ignore_ascii_case("a");
        collect(root, is_link, root.get_elements_by_tag_name("a"))
    }

    fn elements_with_class(&self, root: &Element, class: &str) -> Vec<Element> {
        collect(
            root,
            root.class_list().contains(class),
            root.get_elements_by_class_name(class),
        )
    }

    fn tag_name(&self, node: &Element) -> String {
        node.tag_name().to_ascii_lowercase()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), PlatformError> {
        node.set_attribute(name, value).map_err(js_error)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn has_parent(&self, node: &Element) -> bool {
        node.parent_node().is_some()
    }

    fn is_connected(&self, node: &Element) -> bool {
        node.is_connected()
    }

    fn closest_with_class(&self, node: &Element, class: &str) -> Option<Element> {
        let mut current = Some(node.clone());
        while let Some(element) = current {
            if element.class_list().contains(class) {
                return Some(element);
            }
            current = element.parent_element();
        }
        None
    }

    fn create(&self, spec: &NodeSpec) -> Result<Element, PlatformError> {
        self.build(spec)
    }

    fn replace(&self, old: &Element, new: &Element) -> Result<(), PlatformError> {
        let parent = old
            .parent_node()
            .ok_or_else(|| PlatformError::from("node to replace is detached"))?;
        parent.replace_child(new, old).map_err(js_error)?;
        Ok(())
    }

    fn on_click(&self, node: &Element, handler: Box<dyn Fn()>) -> Result<(), PlatformError> {
        // Stays registered for the element's lifetime.
        EventListener::new(node, "click", move |_| handler()).forget();
        Ok(())
    }
}
