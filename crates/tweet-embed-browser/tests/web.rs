#![cfg(target_arch = "wasm32")]

use tweet_embed_browser::hook::cooked_element;
use tweet_embed_browser::{BrowserDom, EmbedDom, NodeSpec, decorate_element};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(html: &str) -> Element {
    let root = document().create_element("div").unwrap();
    root.set_class_name("cooked");
    root.set_inner_html(html);
    document().body().unwrap().append_child(&root).unwrap();
    root
}

async fn tick() {
    for _ in 0..3 {
        JsFuture::from(js_sys::Promise::resolve(&JsValue::NULL))
            .await
            .unwrap();
    }
}

fn install_widgets_stub() {
    let window = web_sys::window().unwrap();
    let load = js_sys::Function::new_with_args(
        "node",
        "window.__embedRenders = (window.__embedRenders || 0) + 1;",
    );
    let widgets = js_sys::Object::new();
    js_sys::Reflect::set(&widgets, &"load".into(), &load).unwrap();
    let twttr = js_sys::Object::new();
    js_sys::Reflect::set(&twttr, &"widgets".into(), &widgets).unwrap();
    js_sys::Reflect::set(&window, &"twttr".into(), &twttr).unwrap();
}

fn render_count() -> f64 {
    let window = web_sys::window().unwrap();
    js_sys::Reflect::get(&window, &"__embedRenders".into())
        .unwrap()
        .as_f64()
        .unwrap_or(0.0)
}

#[wasm_bindgen_test]
fn test_create_and_replace() {
    let dom = BrowserDom::new().unwrap();
    let root = mount("<p>old</p>");
    let old = root.first_element_child().unwrap();

    let spec = NodeSpec::new("div")
        .class("card")
        .attr("data-tweet-id", "42")
        .style("color: red;")
        .child(NodeSpec::new("span").text("hi"));
    let new = dom.create(&spec).unwrap();
    dom.replace(&old, &new).unwrap();

    assert_eq!(
        root.inner_html(),
        r#"<div class="card" data-tweet-id="42" style="color: red;"><span>hi</span></div>"#
    );
    assert!(!dom.has_parent(&old));
    assert!(dom.has_parent(&new));
    assert!(dom.is_connected(&new));

    root.remove();
    assert!(!dom.is_connected(&new));
}

#[wasm_bindgen_test]
fn test_closest_with_class() {
    let dom = BrowserDom::new().unwrap();
    let root = mount(r#"<aside class="onebox"><header><a href="x">x</a></header></aside>"#);
    let link = dom.links(&root).pop().unwrap();

    let aside = dom.closest_with_class(&link, "onebox").unwrap();
    assert_eq!(dom.tag_name(&aside), "aside");
    assert!(dom.closest_with_class(&link, "missing").is_none());
}

#[wasm_bindgen_test]
fn test_cooked_element_unwraps_jquery() {
    let element = document().create_element("div").unwrap();

    assert!(cooked_element(&element.clone().into()).is_some());

    let wrapped = js_sys::Array::of1(&element);
    assert_eq!(cooked_element(&wrapped.into()), Some(element));

    assert!(cooked_element(&JsValue::from_str("div")).is_none());
    assert!(cooked_element(&JsValue::UNDEFINED).is_none());
}

#[wasm_bindgen_test]
async fn test_click_loads_embed() {
    install_widgets_stub();
    let root = mount(
        r#"<aside class="onebox"><header class="source"><a href="https://x.com/acme/status/42">x.com</a></header></aside>"#,
    );

    assert_eq!(decorate_element(root.clone()), 1);
    assert_eq!(decorate_element(root.clone()), 0);

    let placeholder = root
        .get_elements_by_class_name("twitter-embed-placeholder")
        .item(0)
        .unwrap();
    assert_eq!(placeholder.get_attribute("data-tweet-id").as_deref(), Some("42"));
    assert_eq!(
        placeholder.get_attribute("data-original-url").as_deref(),
        Some("https://twitter.com/acme/status/42")
    );

    let before = render_count();
    placeholder.dyn_ref::<HtmlElement>().unwrap().click();
    tick().await;

    let embed = root
        .get_elements_by_class_name("twitter-tweet")
        .item(0)
        .unwrap();
    assert_eq!(embed.tag_name(), "BLOCKQUOTE");
    assert!(placeholder.parent_node().is_none());
    assert_eq!(render_count(), before + 1.0);

    // A second click on the detached placeholder does nothing.
    placeholder.dyn_ref::<HtmlElement>().unwrap().click();
    tick().await;
    assert_eq!(render_count(), before + 1.0);
}
