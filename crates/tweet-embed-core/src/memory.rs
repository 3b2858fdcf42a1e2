//! In-memory document implementing `EmbedDom`.
//!
//! Nodes live in an arena and are addressed by `NodeId`. Detached nodes stay
//! in the arena; nothing is ever freed, which is fine for the lifetime of a
//! decorated page or a test. The arena starts with a `body` node; a node is
//! connected when `body` is one of its ancestors.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use markdown_weaver_escape::escape_html;
use smol_str::SmolStr;

use crate::node::{NodeSpec, write_close_tag, write_open_tag};
use crate::platform::{EmbedDom, PlatformError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
struct NodeData {
    tag: SmolStr,
    classes: Vec<SmolStr>,
    attributes: Vec<(SmolStr, String)>,
    style: Option<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

pub struct MemoryDom {
    nodes: RefCell<Vec<NodeData>>,
    click_handlers: RefCell<HashMap<NodeId, Vec<Rc<dyn Fn()>>>>,
    body: NodeId,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDom")
            .field("nodes", &self.nodes.borrow().len())
            .finish_non_exhaustive()
    }
}

impl MemoryDom {
    pub fn new() -> Self {
        let dom = Self {
            nodes: RefCell::default(),
            click_handlers: RefCell::default(),
            body: NodeId(0),
        };
        dom.build(&NodeSpec::new("body"));
        dom
    }

    /// Root of the connected tree.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Number of nodes ever created, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Create a detached tree from `spec` and return its root.
    pub fn build(&self, spec: &NodeSpec) -> NodeId {
        let id = {
            let mut nodes = self.nodes.borrow_mut();
            let id = NodeId(nodes.len());
            nodes.push(NodeData {
                tag: SmolStr::new(spec.tag.to_ascii_lowercase()),
                classes: spec.classes.clone(),
                attributes: spec.attributes.clone(),
                style: spec.style.clone(),
                text: spec.text.clone(),
                parent: None,
                children: Vec::new(),
            });
            id
        };
        for child in &spec.children {
            let child = self.build(child);
            self.append(id, child);
        }
        id
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let mut nodes = self.nodes.borrow_mut();
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    /// Detach `node` from its parent, as a host re-render would.
    pub fn remove(&self, node: NodeId) {
        self.detach(node);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0].children.clone()
    }

    /// Whether `node` is `root` or sits somewhere below it.
    pub fn contains(&self, root: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == root {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `root` and all of its descendants, in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Fire click handlers registered on `node`. Returns how many ran.
    pub fn click(&self, node: NodeId) -> usize {
        // Handlers mutate the tree, so release the borrow before calling them.
        let handlers = self
            .click_handlers
            .borrow()
            .get(&node)
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Serialize `node` and its subtree to HTML.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let children = {
            let nodes = self.nodes.borrow();
            let data = &nodes[node.0];
            write_open_tag(
                out,
                &data.tag,
                &data.classes,
                &data.attributes,
                data.style.as_deref(),
            );
            if let Some(text) = &data.text {
                let _ = escape_html(&mut *out, text);
            }
            data.children.clone()
        };
        for child in children {
            self.write_html(child, out);
        }
        write_close_tag(out, &self.nodes.borrow()[node.0].tag);
    }

    fn detach(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(parent) = nodes[node.0].parent.take() {
            nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn descendants_where(&self, root: NodeId, pred: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        let matching: Vec<NodeId> = {
            let nodes = self.nodes.borrow();
            self.descendants(root)
                .into_iter()
                .filter(|id| pred(&nodes[id.0]))
                .collect()
        };
        matching
    }
}

impl EmbedDom for MemoryDom {
    type Node = NodeId;

    fn links(&self, root: &NodeId) -> Vec<NodeId> {
        self.descendants_where(*root, |data| data.tag == "a")
    }

    fn elements_with_class(&self, root: &NodeId, class: &str) -> Vec<NodeId> {
        self.descendants_where(*root, |data| data.classes.iter().any(|c| c == class))
    }

    fn tag_name(&self, node: &NodeId) -> String {
        self.nodes.borrow()[node.0].tag.to_string()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        let nodes = self.nodes.borrow();
        let data = &nodes[node.0];
        match name {
            "class" if !data.classes.is_empty() => Some(data.classes.join(" ")),
            "style" => data.style.clone(),
            _ => data
                .attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone()),
        }
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), PlatformError> {
        let mut nodes = self.nodes.borrow_mut();
        let data = nodes
            .get_mut(node.0)
            .ok_or_else(|| PlatformError::from("unknown node"))?;
        match name {
            "class" => data.classes = value.split_whitespace().map(SmolStr::new).collect(),
            "style" => data.style = Some(value.to_owned()),
            _ => match data.attributes.iter_mut().find(|(key, _)| key == name) {
                Some((_, existing)) => *existing = value.to_owned(),
                None => data.attributes.push((SmolStr::new(name), value.to_owned())),
            },
        }
        Ok(())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0].classes.iter().any(|c| c == class)
    }

    fn has_parent(&self, node: &NodeId) -> bool {
        self.parent(*node).is_some()
    }

    fn is_connected(&self, node: &NodeId) -> bool {
        self.contains(self.body, *node)
    }

    fn closest_with_class(&self, node: &NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(*node);
        while let Some(id) = current {
            if self.has_class(&id, class) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    fn create(&self, spec: &NodeSpec) -> Result<NodeId, PlatformError> {
        Ok(self.build(spec))
    }

    fn replace(&self, old: &NodeId, new: &NodeId) -> Result<(), PlatformError> {
        let parent = self
            .parent(*old)
            .ok_or_else(|| PlatformError::from("node to replace has no parent"))?;
        self.detach(*new);
        let mut nodes = self.nodes.borrow_mut();
        let index = nodes[parent.0]
            .children
            .iter()
            .position(|c| c == old)
            .ok_or_else(|| PlatformError::from("node missing from its parent"))?;
        nodes[parent.0].children[index] = *new;
        nodes[new.0].parent = Some(parent);
        nodes[old.0].parent = None;
        Ok(())
    }

    fn on_click(&self, node: &NodeId, handler: Box<dyn Fn()>) -> Result<(), PlatformError> {
        self.click_handlers
            .borrow_mut()
            .entry(*node)
            .or_default()
            .push(Rc::from(handler));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::platform::Marker;

    fn post(dom: &MemoryDom) -> NodeId {
        dom.build(
            &NodeSpec::new("div").class("cooked").child(
                NodeSpec::new("aside")
                    .class("onebox")
                    .child(NodeSpec::new("a").attr("href", "https://x.com/acme/status/42")),
            ),
        )
    }

    #[test]
    fn test_build_and_serialize() {
        let dom = MemoryDom::new();
        let root = post(&dom);
        assert_eq!(
            dom.to_html(root),
            "<div class=\"cooked\"><aside class=\"onebox\"><a href=\"https://x.com/acme/status/42\"></a></aside></div>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let dom = MemoryDom::new();
        let node = dom.build(&NodeSpec::new("p").text("<b>\"A & B\"</b>"));
        assert_eq!(
            dom.to_html(node),
            "<p>&lt;b&gt;&quot;A &amp; B&quot;&lt;/b&gt;</p>"
        );
    }

    #[test]
    fn test_closest_and_links() {
        let dom = MemoryDom::new();
        let root = post(&dom);
        let links = dom.links(&root);
        assert_eq!(links.len(), 1);

        let onebox = dom.closest_with_class(&links[0], "onebox").unwrap();
        assert!(dom.has_class(&onebox, "onebox"));
        assert_eq!(dom.closest_with_class(&links[0], "missing"), None);
        assert_eq!(dom.elements_with_class(&root, "onebox"), vec![onebox]);
    }

    #[test]
    fn test_replace_detaches_old() {
        let dom = MemoryDom::new();
        let root = post(&dom);
        let onebox = dom.elements_with_class(&root, "onebox")[0];
        let card = dom.build(&NodeSpec::new("div").class("card"));

        dom.replace(&onebox, &card).unwrap();
        assert_eq!(dom.children(root), vec![card]);
        assert_eq!(dom.parent(onebox), None);
        assert!(!dom.contains(root, onebox));
        assert!(dom.replace(&onebox, &card).is_err());
    }

    #[test]
    fn test_connected_only_under_body() {
        let dom = MemoryDom::new();
        let root = post(&dom);
        let onebox = dom.elements_with_class(&root, "onebox")[0];
        assert!(dom.has_parent(&onebox));
        assert!(!dom.is_connected(&onebox));

        dom.append(dom.body(), root);
        assert!(dom.is_connected(&onebox));
        assert!(dom.is_connected(&dom.body()));

        dom.remove(root);
        assert!(!dom.is_connected(&onebox));
        assert!(!dom.has_parent(&root));
        assert!(dom.has_parent(&onebox));
    }

    #[test]
    fn test_markers_and_clicks() {
        let dom = MemoryDom::new();
        let root = post(&dom);
        assert!(!dom.has_marker(&root, Marker::Processed));
        dom.mark(&root, Marker::Processed).unwrap();
        assert!(dom.has_marker(&root, Marker::Processed));
        assert_eq!(dom.attribute(&root, "data-processed").as_deref(), Some("true"));

        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        dom.on_click(&root, Box::new(move || counter.set(counter.get() + 1)))
            .unwrap();
        assert_eq!(dom.click(root), 1);
        assert_eq!(clicks.get(), 1);
    }
}
