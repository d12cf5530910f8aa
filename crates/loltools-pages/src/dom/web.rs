//! Browser document backed by `web-sys` (WASM only).

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
	Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlOptionElement,
	HtmlSelectElement, HtmlTextAreaElement,
};

use super::{Dom, EventHandler, EventKind};
use crate::error::{DomError, Error};

fn js_error(err: JsValue) -> DomError {
	DomError::Js(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn collect_elements(list: web_sys::NodeList) -> Vec<Element> {
	(0..list.length())
		.filter_map(|index| list.get(index))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

/// The live browser document.
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}

impl WebDom {
	/// Wraps an existing document.
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	/// Uses `window.document`.
	pub fn from_window() -> Result<Self, Error> {
		let document = web_sys::window()
			.ok_or_else(|| Error::Environment("no window".to_string()))?
			.document()
			.ok_or_else(|| Error::Environment("no document".to_string()))?;
		Ok(Self::new(document))
	}

	/// The wrapped document.
	pub fn document(&self) -> &Document {
		&self.document
	}
}

impl Dom for WebDom {
	type Node = Element;

	fn element_by_id(&self, id: &str) -> Option<Element> {
		self.document.get_element_by_id(id)
	}

	fn query_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
		let list = self
			.document
			.query_selector_all(selector)
			.map_err(|_| DomError::InvalidSelector {
				selector: selector.to_string(),
				reason: "rejected by the browser".to_string(),
			})?;
		Ok(collect_elements(list))
	}

	fn query_all_within(&self, root: &Element, selector: &str) -> Result<Vec<Element>, DomError> {
		let list = root
			.query_selector_all(selector)
			.map_err(|_| DomError::InvalidSelector {
				selector: selector.to_string(),
				reason: "rejected by the browser".to_string(),
			})?;
		Ok(collect_elements(list))
	}

	fn tag_name(&self, node: &Element) -> String {
		node.tag_name().to_ascii_lowercase()
	}

	fn attribute(&self, node: &Element, name: &str) -> Option<String> {
		node.get_attribute(name)
	}

	fn set_attribute(&self, node: &Element, name: &str, value: &str) -> Result<(), DomError> {
		node.set_attribute(name, value).map_err(js_error)
	}

	fn remove_attribute(&self, node: &Element, name: &str) -> Result<(), DomError> {
		node.remove_attribute(name).map_err(js_error)
	}

	fn value(&self, node: &Element) -> String {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.value()
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.value()
		} else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
			textarea.value()
		} else if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
			button.value()
		} else if let Some(option) = node.dyn_ref::<HtmlOptionElement>() {
			option.value()
		} else {
			node.get_attribute("value").unwrap_or_default()
		}
	}

	fn set_value(&self, node: &Element, value: &str) -> Result<(), DomError> {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_value(value);
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.set_value(value);
		} else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
			textarea.set_value(value);
		} else if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
			button.set_value(value);
		} else {
			node.set_attribute("value", value).map_err(js_error)?;
		}
		Ok(())
	}

	fn is_checked(&self, node: &Element) -> bool {
		node.dyn_ref::<HtmlInputElement>()
			.is_some_and(HtmlInputElement::checked)
	}

	fn selected_values(&self, node: &Element) -> Vec<String> {
		let Some(select) = node.dyn_ref::<HtmlSelectElement>() else {
			return Vec::new();
		};
		let options = select.selected_options();
		(0..options.length())
			.filter_map(|index| options.item(index))
			.filter_map(|option| option.dyn_into::<HtmlOptionElement>().ok())
			.map(|option| option.value())
			.collect()
	}

	fn is_disabled(&self, node: &Element) -> bool {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.disabled()
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.disabled()
		} else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
			textarea.disabled()
		} else if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
			button.disabled()
		} else {
			node.has_attribute("disabled")
		}
	}

	fn set_disabled(&self, node: &Element, disabled: bool) -> Result<(), DomError> {
		if let Some(input) = node.dyn_ref::<HtmlInputElement>() {
			input.set_disabled(disabled);
		} else if let Some(select) = node.dyn_ref::<HtmlSelectElement>() {
			select.set_disabled(disabled);
		} else if let Some(textarea) = node.dyn_ref::<HtmlTextAreaElement>() {
			textarea.set_disabled(disabled);
		} else if let Some(button) = node.dyn_ref::<HtmlButtonElement>() {
			button.set_disabled(disabled);
		} else if disabled {
			node.set_attribute("disabled", "").map_err(js_error)?;
		} else {
			node.remove_attribute("disabled").map_err(js_error)?;
		}
		Ok(())
	}

	fn text(&self, node: &Element) -> String {
		node.text_content().unwrap_or_default()
	}

	fn set_text(&self, node: &Element, text: &str) -> Result<(), DomError> {
		node.set_text_content(Some(text));
		Ok(())
	}

	fn is_visible(&self, node: &Element) -> bool {
		// Same rule jQuery uses for `:visible`: the element generates layout boxes.
		match node.dyn_ref::<HtmlElement>() {
			Some(html) => {
				html.offset_width() > 0 || html.offset_height() > 0 || node.get_client_rects().length() > 0
			}
			None => node.get_client_rects().length() > 0,
		}
	}

	fn set_visible(&self, node: &Element, visible: bool) -> Result<(), DomError> {
		let html = node
			.dyn_ref::<HtmlElement>()
			.ok_or_else(|| DomError::Js("element has no style".to_string()))?;
		let style = html.style();
		if visible {
			html.set_hidden(false);
			style.remove_property("display").map_err(js_error)?;
			if !self.is_visible(node) {
				// Hidden by a stylesheet rule rather than inline style.
				style.set_property("display", "block").map_err(js_error)?;
			}
		} else {
			style.set_property("display", "none").map_err(js_error)?;
		}
		Ok(())
	}

	fn create_element(&self, tag: &str) -> Result<Element, DomError> {
		self.document.create_element(tag).map_err(js_error)
	}

	fn clone_deep(&self, node: &Element) -> Result<Element, DomError> {
		node.clone_node_with_deep(true)
			.map_err(js_error)?
			.dyn_into::<Element>()
			.map_err(|_| DomError::Js("clone is not an element".to_string()))
	}

	fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
		parent.append_child(child).map(|_| ()).map_err(js_error)
	}

	fn insert_before(&self, node: &Element, reference: &Element) -> Result<(), DomError> {
		let parent = reference.parent_node().ok_or(DomError::Detached)?;
		parent
			.insert_before(node, Some(reference))
			.map(|_| ())
			.map_err(js_error)
	}

	fn remove(&self, node: &Element) -> Result<(), DomError> {
		node.remove();
		Ok(())
	}

	fn clear_children(&self, node: &Element) -> Result<(), DomError> {
		while let Some(child) = node.first_child() {
			node.remove_child(&child).map_err(js_error)?;
		}
		Ok(())
	}

	fn listen(&self, node: &Element, kind: EventKind, handler: EventHandler) -> Result<(), DomError> {
		let closure = Closure::wrap(Box::new(move |event: web_sys::Event| {
			event.prevent_default();
			handler();
		}) as Box<dyn FnMut(_)>);

		node.add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
			.map_err(js_error)?;

		closure.forget(); // Keep closure alive for the page lifetime
		Ok(())
	}
}
