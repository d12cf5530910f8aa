//! DOM abstraction layer
//!
//! Page behaviors in this crate are written against the [`Dom`] trait rather than
//! `web-sys` directly, so the same code drives the real browser document
//! ([`WebDom`], WASM only) and the in-memory document used by native tests
//! ([`MemoryDom`]).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────┐
//! │ FormSubmit-      │      │   Dom trait  │──▶ WebDom    (web_sys::Element)
//! │ Controller,      │─────▶│  Node handle │
//! │ widgets          │      │              │──▶ MemoryDom (NodeId arena)
//! └──────────────────┘      └──────────────┘
//! ```

pub mod html;
pub mod memory;
pub mod selector;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;
use std::rc::Rc;

use crate::error::DomError;

pub use memory::{MemoryDom, NodeId};
pub use selector::Selector;
#[cfg(target_arch = "wasm32")]
pub use web::WebDom;

/// Selector matching every element that can carry form data or be disabled.
pub const CONTROL_SELECTOR: &str = "input, select, button, textarea";

/// Events the page behaviors listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// A form's `submit` event.
	Submit,
	/// A `click` on any element.
	Click,
}

impl EventKind {
	/// Returns the DOM event name.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Submit => "submit",
			Self::Click => "click",
		}
	}
}

impl fmt::Display for EventKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Handler invoked when a listened-for event fires.
///
/// The backend has already prevented the event's default action when the
/// handler runs.
pub type EventHandler = Rc<dyn Fn()>;

/// Operations the page behaviors need from a document.
///
/// Node handles are cheap to clone and compare by identity.
pub trait Dom {
	/// Handle to an element in this document.
	type Node: Clone + PartialEq + fmt::Debug + 'static;

	/// Returns the first element whose `id` attribute equals `id`.
	fn element_by_id(&self, id: &str) -> Option<Self::Node>;

	/// Returns every element in the document matching `selector`, in tree order.
	fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, DomError>;

	/// Returns every descendant of `root` matching `selector`, in tree order.
	fn query_all_within(&self, root: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, DomError>;

	/// Lowercase tag name.
	fn tag_name(&self, node: &Self::Node) -> String;

	/// Reads an attribute.
	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

	/// Sets an attribute.
	fn set_attribute(&self, node: &Self::Node, name: &str, value: &str) -> Result<(), DomError>;

	/// Removes an attribute. Removing a missing attribute is not an error.
	fn remove_attribute(&self, node: &Self::Node, name: &str) -> Result<(), DomError>;

	/// Current value of a control.
	///
	/// Checkboxes and radios without a `value` attribute report `"on"`.
	fn value(&self, node: &Self::Node) -> String;

	/// Sets the current value of a control.
	fn set_value(&self, node: &Self::Node, value: &str) -> Result<(), DomError>;

	/// Whether a checkbox or radio is checked.
	fn is_checked(&self, node: &Self::Node) -> bool;

	/// Values of the selected options of a `<select>`.
	fn selected_values(&self, node: &Self::Node) -> Vec<String>;

	/// Whether a control is disabled.
	fn is_disabled(&self, node: &Self::Node) -> bool;

	/// Enables or disables a control.
	fn set_disabled(&self, node: &Self::Node, disabled: bool) -> Result<(), DomError>;

	/// Concatenated text of the node and its descendants.
	fn text(&self, node: &Self::Node) -> String;

	/// Replaces all children with a single text node.
	fn set_text(&self, node: &Self::Node, text: &str) -> Result<(), DomError>;

	/// Whether the element is rendered.
	fn is_visible(&self, node: &Self::Node) -> bool;

	/// Shows or hides the element.
	fn set_visible(&self, node: &Self::Node, visible: bool) -> Result<(), DomError>;

	/// Creates a detached element.
	fn create_element(&self, tag: &str) -> Result<Self::Node, DomError>;

	/// Deep-clones a node. The clone is detached and carries no listeners.
	fn clone_deep(&self, node: &Self::Node) -> Result<Self::Node, DomError>;

	/// Appends `child` as the last child of `parent`, moving it if attached elsewhere.
	fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> Result<(), DomError>;

	/// Inserts `node` immediately before `reference` in `reference`'s parent.
	fn insert_before(&self, node: &Self::Node, reference: &Self::Node) -> Result<(), DomError>;

	/// Detaches the node from its parent.
	fn remove(&self, node: &Self::Node) -> Result<(), DomError>;

	/// Removes every child of the node.
	fn clear_children(&self, node: &Self::Node) -> Result<(), DomError>;

	/// Installs an event listener for the lifetime of the page.
	fn listen(&self, node: &Self::Node, kind: EventKind, handler: EventHandler) -> Result<(), DomError>;

	/// Returns the first element matching `selector`.
	fn query_first(&self, selector: &str) -> Result<Option<Self::Node>, DomError> {
		Ok(self.query_all(selector)?.into_iter().next())
	}

	/// Returns the first descendant of `root` matching `selector`.
	fn query_first_within(&self, root: &Self::Node, selector: &str) -> Result<Option<Self::Node>, DomError> {
		Ok(self.query_all_within(root, selector)?.into_iter().next())
	}
}

/// Escapes a value for use inside a single-quoted attribute selector.
pub fn quote_attr_value(value: &str) -> String {
	let mut quoted = String::with_capacity(value.len() + 2);
	quoted.push('\'');
	for ch in value.chars() {
		if ch == '\'' || ch == '\\' {
			quoted.push('\\');
		}
		quoted.push(ch);
	}
	quoted.push('\'');
	quoted
}
