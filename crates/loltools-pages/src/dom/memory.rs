//! In-memory document
//!
//! [`MemoryDom`] is an arena of nodes addressed by [`NodeId`]. It implements
//! [`Dom`] with attribute-backed state: a control's value is its `value`
//! attribute, disabled/checked/selected are boolean attributes, and
//! visibility follows `hidden` and inline `display: none`.
//!
//! Events are delivered synchronously through [`MemoryDom::dispatch`], which
//! only reaches handlers registered on the target node.
//!
//! ## Example
//!
//! ```
//! use loltools_pages::dom::{Dom, MemoryDom};
//!
//! let dom = MemoryDom::parse(r#"<div id="greeting">Hello</div>"#).unwrap();
//! let node = dom.element_by_id("greeting").unwrap();
//! assert_eq!(dom.text(&node), "Hello");
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::html::{self, HtmlNode};
use super::{Dom, EventHandler, EventKind, Selector};
use crate::error::DomError;

/// Handle to a node in a [`MemoryDom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
	Document,
	Element {
		tag: String,
		attrs: Vec<(String, String)>,
	},
	Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
	kind: NodeKind,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
}

#[derive(Default)]
struct Tree {
	nodes: Vec<NodeData>,
	listeners: HashMap<(NodeId, EventKind), Vec<EventHandler>>,
}

impl Tree {
	fn push(&mut self, kind: NodeKind) -> NodeId {
		let id = NodeId(self.nodes.len());
		self.nodes.push(NodeData {
			kind,
			parent: None,
			children: Vec::new(),
		});
		id
	}

	fn node(&self, id: NodeId) -> &NodeData {
		&self.nodes[id.0]
	}

	fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
		&mut self.nodes[id.0]
	}

	fn attrs(&self, id: NodeId) -> Option<&Vec<(String, String)>> {
		match &self.node(id).kind {
			NodeKind::Element { attrs, .. } => Some(attrs),
			_ => None,
		}
	}

	fn attr(&self, id: NodeId, name: &str) -> Option<String> {
		self.attrs(id)?
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.clone())
	}

	fn has_attr(&self, id: NodeId, name: &str) -> bool {
		self.attrs(id).is_some_and(|attrs| attrs.iter().any(|(key, _)| key == name))
	}

	fn tag(&self, id: NodeId) -> &str {
		match &self.node(id).kind {
			NodeKind::Element { tag, .. } => tag,
			NodeKind::Document => "#document",
			NodeKind::Text(_) => "#text",
		}
	}

	fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
		match &mut self.node_mut(id).kind {
			NodeKind::Element { attrs, .. } => {
				match attrs.iter_mut().find(|(key, _)| key == name) {
					Some((_, existing)) => *existing = value.to_string(),
					None => attrs.push((name.to_string(), value.to_string())),
				}
				Ok(())
			}
			_ => Err(DomError::NotFound(format!("element {:?}", id))),
		}
	}

	fn remove_attr(&mut self, id: NodeId, name: &str) {
		if let NodeKind::Element { attrs, .. } = &mut self.node_mut(id).kind {
			attrs.retain(|(key, _)| key != name);
		}
	}

	fn detach(&mut self, id: NodeId) {
		if let Some(parent) = self.node_mut(id).parent.take() {
			self.node_mut(parent).children.retain(|child| *child != id);
		}
	}

	fn descendants(&self, root: NodeId, out: &mut Vec<NodeId>) {
		for &child in &self.node(root).children {
			if matches!(self.node(child).kind, NodeKind::Element { .. }) {
				out.push(child);
				self.descendants(child, out);
			}
		}
	}

	fn text(&self, id: NodeId, out: &mut String) {
		match &self.node(id).kind {
			NodeKind::Text(text) => out.push_str(text),
			_ => {
				for &child in &self.node(id).children {
					self.text(child, out);
				}
			}
		}
	}

	fn insert_html(&mut self, parent: NodeId, node: HtmlNode) {
		let id = match node {
			HtmlNode::Text(text) => self.push(NodeKind::Text(text)),
			HtmlNode::Element {
				tag,
				attrs,
				children,
			} => {
				let id = self.push(NodeKind::Element { tag, attrs });
				for child in children {
					self.insert_html(id, child);
				}
				id
			}
		};
		self.node_mut(id).parent = Some(parent);
		self.node_mut(parent).children.push(id);
	}

	fn clone_subtree(&mut self, id: NodeId) -> NodeId {
		let kind = self.node(id).kind.clone();
		let children = self.node(id).children.clone();
		let copy = self.push(kind);
		for child in children {
			let child_copy = self.clone_subtree(child);
			self.node_mut(child_copy).parent = Some(copy);
			self.node_mut(copy).children.push(child_copy);
		}
		copy
	}

	fn write_html(&self, id: NodeId, out: &mut String) {
		match &self.node(id).kind {
			NodeKind::Text(text) => out.push_str(&html::escape_text(text)),
			NodeKind::Document => {
				for &child in &self.node(id).children {
					self.write_html(child, out);
				}
			}
			NodeKind::Element { tag, attrs } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attrs {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					out.push_str(&html::escape_attr(value));
					out.push('"');
				}
				out.push('>');
				if html::is_void_element(tag) {
					return;
				}
				for &child in &self.node(id).children {
					self.write_html(child, out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}
}

/// Removes `display` declarations from an inline style and optionally adds `display: none`.
fn rewrite_display(style: &str, hidden: bool) -> String {
	let mut decls: Vec<String> = style
		.split(';')
		.map(str::trim)
		.filter(|decl| !decl.is_empty())
		.filter(|decl| {
			decl.split_once(':')
				.is_none_or(|(prop, _)| !prop.trim().eq_ignore_ascii_case("display"))
		})
		.map(str::to_string)
		.collect();
	if hidden {
		decls.push("display: none".to_string());
	}
	decls.join("; ")
}

fn style_hides(style: &str) -> bool {
	style.split(';').any(|decl| {
		decl.split_once(':').is_some_and(|(prop, value)| {
			prop.trim().eq_ignore_ascii_case("display") && value.trim().eq_ignore_ascii_case("none")
		})
	})
}

/// Arena-backed document implementing [`Dom`].
///
/// Cloning a `MemoryDom` yields another handle to the same document.
#[derive(Clone)]
pub struct MemoryDom {
	tree: Rc<RefCell<Tree>>,
}

impl Default for MemoryDom {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for MemoryDom {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryDom")
			.field("nodes", &self.tree.borrow().nodes.len())
			.finish()
	}
}

impl MemoryDom {
	/// Creates an empty document.
	pub fn new() -> Self {
		let mut tree = Tree::default();
		tree.push(NodeKind::Document);
		Self {
			tree: Rc::new(RefCell::new(tree)),
		}
	}

	/// Creates a document whose body is the given fragment.
	pub fn parse(markup: &str) -> Result<Self, DomError> {
		let dom = Self::new();
		dom.append_html(&dom.document(), markup)?;
		Ok(dom)
	}

	/// The document root.
	pub fn document(&self) -> NodeId {
		NodeId(0)
	}

	/// Parses `markup` and appends the resulting nodes to `parent`.
	pub fn append_html(&self, parent: &NodeId, markup: &str) -> Result<(), DomError> {
		let nodes = html::parse_fragment(markup)?;
		let mut tree = self.tree.borrow_mut();
		for node in nodes {
			tree.insert_html(*parent, node);
		}
		Ok(())
	}

	/// Parent of the node, if attached.
	pub fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.tree.borrow().node(*node).parent
	}

	/// Element children of the node.
	pub fn children(&self, node: &NodeId) -> Vec<NodeId> {
		let tree = self.tree.borrow();
		tree.node(*node)
			.children
			.iter()
			.copied()
			.filter(|child| matches!(tree.node(*child).kind, NodeKind::Element { .. }))
			.collect()
	}

	/// Serializes the node and its subtree.
	pub fn outer_html(&self, node: &NodeId) -> String {
		let mut out = String::new();
		self.tree.borrow().write_html(*node, &mut out);
		out
	}

	/// Fires `kind` at `node`, returning how many handlers ran.
	///
	/// Clicks on disabled elements are swallowed, as in a browser.
	pub fn dispatch(&self, node: &NodeId, kind: EventKind) -> usize {
		if kind == EventKind::Click && self.is_disabled(node) {
			return 0;
		}
		// Handlers may mutate the tree, so release the borrow before calling them.
		let handlers = self
			.tree
			.borrow()
			.listeners
			.get(&(*node, kind))
			.cloned()
			.unwrap_or_default();
		for handler in &handlers {
			handler();
		}
		handlers.len()
	}

	/// Number of handlers registered for `kind` on `node`.
	pub fn listener_count(&self, node: &NodeId, kind: EventKind) -> usize {
		self.tree
			.borrow()
			.listeners
			.get(&(*node, kind))
			.map_or(0, Vec::len)
	}

	fn query_from(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
		let selector = Selector::parse(selector)?;
		let tree = self.tree.borrow();
		let mut candidates = Vec::new();
		tree.descendants(root, &mut candidates);
		Ok(candidates
			.into_iter()
			.filter(|id| selector.matches(tree.tag(*id), |name| tree.attr(*id, name)))
			.collect())
	}
}

impl Dom for MemoryDom {
	type Node = NodeId;

	fn element_by_id(&self, id: &str) -> Option<NodeId> {
		let tree = self.tree.borrow();
		let mut all = Vec::new();
		tree.descendants(self.document(), &mut all);
		all.into_iter()
			.find(|node| tree.attr(*node, "id").as_deref() == Some(id))
	}

	fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
		self.query_from(self.document(), selector)
	}

	fn query_all_within(&self, root: &NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
		self.query_from(*root, selector)
	}

	fn tag_name(&self, node: &NodeId) -> String {
		self.tree.borrow().tag(*node).to_string()
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		self.tree.borrow().attr(*node, name)
	}

	fn set_attribute(&self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
		self.tree.borrow_mut().set_attr(*node, name, value)
	}

	fn remove_attribute(&self, node: &NodeId, name: &str) -> Result<(), DomError> {
		self.tree.borrow_mut().remove_attr(*node, name);
		Ok(())
	}

	fn value(&self, node: &NodeId) -> String {
		let tag = self.tag_name(node);
		if tag == "select" {
			return self.selected_values(node).into_iter().next().unwrap_or_default();
		}

		let tree = self.tree.borrow();
		let text_of = |id: NodeId| {
			let mut text = String::new();
			tree.text(id, &mut text);
			text
		};
		match tag.as_str() {
			"textarea" => text_of(*node),
			"option" => tree
				.attr(*node, "value")
				.unwrap_or_else(|| text_of(*node).trim().to_string()),
			"input" => {
				let kind = tree.attr(*node, "type").unwrap_or_default().to_ascii_lowercase();
				match tree.attr(*node, "value") {
					Some(value) => value,
					None if kind == "checkbox" || kind == "radio" => "on".to_string(),
					None => String::new(),
				}
			}
			_ => tree.attr(*node, "value").unwrap_or_default(),
		}
	}

	fn set_value(&self, node: &NodeId, value: &str) -> Result<(), DomError> {
		if self.tag_name(node) == "textarea" {
			return self.set_text(node, value);
		}
		self.set_attribute(node, "value", value)
	}

	fn is_checked(&self, node: &NodeId) -> bool {
		self.tree.borrow().has_attr(*node, "checked")
	}

	fn selected_values(&self, node: &NodeId) -> Vec<String> {
		let options = match self.query_all_within(node, "option") {
			Ok(options) => options,
			Err(_) => return Vec::new(),
		};
		let multiple = self.tree.borrow().has_attr(*node, "multiple");
		let selected: Vec<NodeId> = {
			let tree = self.tree.borrow();
			options
				.iter()
				.copied()
				.filter(|option| tree.has_attr(*option, "selected"))
				.collect()
		};
		let chosen = match (selected.is_empty(), multiple) {
			(false, true) => selected,
			(false, false) => selected.into_iter().last().into_iter().collect(),
			(true, true) => Vec::new(),
			(true, false) => options.into_iter().take(1).collect(),
		};
		chosen.iter().map(|option| self.value(option)).collect()
	}

	fn is_disabled(&self, node: &NodeId) -> bool {
		self.tree.borrow().has_attr(*node, "disabled")
	}

	fn set_disabled(&self, node: &NodeId, disabled: bool) -> Result<(), DomError> {
		if disabled {
			self.set_attribute(node, "disabled", "")
		} else {
			self.remove_attribute(node, "disabled")
		}
	}

	fn text(&self, node: &NodeId) -> String {
		let mut out = String::new();
		self.tree.borrow().text(*node, &mut out);
		out
	}

	fn set_text(&self, node: &NodeId, text: &str) -> Result<(), DomError> {
		self.clear_children(node)?;
		if !text.is_empty() {
			let mut tree = self.tree.borrow_mut();
			let text_node = tree.push(NodeKind::Text(text.to_string()));
			tree.node_mut(text_node).parent = Some(*node);
			tree.node_mut(*node).children.push(text_node);
		}
		Ok(())
	}

	fn is_visible(&self, node: &NodeId) -> bool {
		let tree = self.tree.borrow();
		let mut current = Some(*node);
		while let Some(id) = current {
			if tree.has_attr(id, "hidden")
				|| tree.attr(id, "style").is_some_and(|style| style_hides(&style))
			{
				return false;
			}
			current = tree.node(id).parent;
		}
		true
	}

	fn set_visible(&self, node: &NodeId, visible: bool) -> Result<(), DomError> {
		let mut tree = self.tree.borrow_mut();
		if visible {
			tree.remove_attr(*node, "hidden");
		}
		let style = rewrite_display(&tree.attr(*node, "style").unwrap_or_default(), !visible);
		if style.is_empty() {
			tree.remove_attr(*node, "style");
			Ok(())
		} else {
			tree.set_attr(*node, "style", &style)
		}
	}

	fn create_element(&self, tag: &str) -> Result<NodeId, DomError> {
		Ok(self.tree.borrow_mut().push(NodeKind::Element {
			tag: tag.to_ascii_lowercase(),
			attrs: Vec::new(),
		}))
	}

	fn clone_deep(&self, node: &NodeId) -> Result<NodeId, DomError> {
		Ok(self.tree.borrow_mut().clone_subtree(*node))
	}

	fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), DomError> {
		let mut tree = self.tree.borrow_mut();
		tree.detach(*child);
		tree.node_mut(*child).parent = Some(*parent);
		tree.node_mut(*parent).children.push(*child);
		Ok(())
	}

	fn insert_before(&self, node: &NodeId, reference: &NodeId) -> Result<(), DomError> {
		let mut tree = self.tree.borrow_mut();
		let parent = tree.node(*reference).parent.ok_or(DomError::Detached)?;
		tree.detach(*node);
		let index = tree
			.node(parent)
			.children
			.iter()
			.position(|child| child == reference)
			.ok_or(DomError::Detached)?;
		tree.node_mut(parent).children.insert(index, *node);
		tree.node_mut(*node).parent = Some(parent);
		Ok(())
	}

	fn remove(&self, node: &NodeId) -> Result<(), DomError> {
		self.tree.borrow_mut().detach(*node);
		Ok(())
	}

	fn clear_children(&self, node: &NodeId) -> Result<(), DomError> {
		let mut tree = self.tree.borrow_mut();
		let children = std::mem::take(&mut tree.node_mut(*node).children);
		for child in children {
			tree.node_mut(child).parent = None;
		}
		Ok(())
	}

	fn listen(&self, node: &NodeId, kind: EventKind, handler: EventHandler) -> Result<(), DomError> {
		self.tree
			.borrow_mut()
			.listeners
			.entry((*node, kind))
			.or_default()
			.push(handler);
		Ok(())
	}
}
