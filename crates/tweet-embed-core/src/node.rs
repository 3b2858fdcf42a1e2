//! Declarative element descriptions.
//!
//! Placeholders and embeds are described as `NodeSpec` trees and handed to
//! the platform (`EmbedDom::create`) to become real nodes. Keeping the
//! description separate from the node keeps the factories pure.

use markdown_weaver_escape::escape_html;
use smol_str::SmolStr;

/// An element to be created by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeSpec {
    pub tag: SmolStr,
    pub classes: Vec<SmolStr>,
    /// Attributes other than `class` and `style`, in insertion order.
    pub attributes: Vec<(SmolStr, String)>,
    /// Inline `style` attribute.
    pub style: Option<String>,
    /// Text content, rendered before any children.
    pub text: Option<String>,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn class(mut self, class: impl Into<SmolStr>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        write_open_tag(
            out,
            &self.tag,
            &self.classes,
            &self.attributes,
            self.style.as_deref(),
        );
        if let Some(text) = &self.text {
            let _ = escape_html(&mut *out, text);
        }
        for child in &self.children {
            child.write_html(out);
        }
        write_close_tag(out, &self.tag);
    }
}

pub(crate) fn write_open_tag(
    out: &mut String,
    tag: &str,
    classes: &[SmolStr],
    attributes: &[(SmolStr, String)],
    style: Option<&str>,
) {
    out.push('<');
    out.push_str(tag);
    if !classes.is_empty() {
        out.push_str(" class=\"");
        for (i, class) in classes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = escape_html(&mut *out, class);
        }
        out.push('"');
    }
    for (name, value) in attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        let _ = escape_html(&mut *out, value);
        out.push('"');
    }
    if let Some(style) = style {
        out.push_str(" style=\"");
        let _ = escape_html(&mut *out, style);
        out.push('"');
    }
    out.push('>');
}

pub(crate) fn write_close_tag(out: &mut String, tag: &str) {
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}
