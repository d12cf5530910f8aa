//! Editor for the match pairings table.
//!
//! The table's first row is a header and its last row holds the add/delete
//! buttons. Data rows live in between, each with two copies of a hidden team
//! `<select>` template named for the home and away side:
//!
//! ```text
//! <table id="pairings">
//!   <tr><th>Home</th><th>Away</th></tr>
//!   <tr><td><select name="home-team">..</select></td><td><select name="away-team">..</select></td></tr>
//!   <tr><td><button id="add-row">+</button><button id="del-row">-</button></td></tr>
//! </table>
//! ```

use std::rc::Rc;

use crate::dom::{Dom, EventKind, quote_attr_value};
use crate::error::{DomError, Result};
use crate::{debug_log, error_log};

/// Header plus control row; the table never shrinks below this.
const MIN_ROWS: usize = 2;

/// Marks bound delete buttons with the id of the table they shrink.
pub const DELETE_ATTRIBUTE: &str = "data-pairings-delete";

/// Ids and names the editor works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingTable {
	/// Id of the `<table>`.
	pub table_id: String,
	/// Id of the hidden `<select>` cloned into new rows.
	pub template_id: String,
	/// `name` given to the first clone in a row.
	pub first_name: String,
	/// `name` given to the second clone in a row.
	pub second_name: String,
}

impl Default for PairingTable {
	fn default() -> Self {
		Self {
			table_id: "pairings".to_string(),
			template_id: "template-team-list".to_string(),
			first_name: "home-team".to_string(),
			second_name: "away-team".to_string(),
		}
	}
}

/// Adds and removes pairing rows.
pub struct PairingRowEditor<D: Dom> {
	dom: D,
	layout: PairingTable,
}

impl<D> PairingRowEditor<D>
where
	D: Dom + Clone + 'static,
{
	/// Creates an editor for `layout`. Nothing is looked up until first use.
	pub fn new(dom: &D, layout: PairingTable) -> Rc<Self> {
		Rc::new(Self {
			dom: dom.clone(),
			layout,
		})
	}

	/// The layout in use.
	pub fn layout(&self) -> &PairingTable {
		&self.layout
	}

	fn table(&self) -> Result<D::Node> {
		self.dom
			.element_by_id(&self.layout.table_id)
			.ok_or_else(|| DomError::NotFound(format!("#{}", self.layout.table_id)).into())
	}

	fn rows(&self) -> Result<Vec<D::Node>> {
		Ok(self.dom.query_all_within(&self.table()?, "tr")?)
	}

	/// Number of rows in the table, header and controls included.
	pub fn row_count(&self) -> Result<usize> {
		Ok(self.rows()?.len())
	}

	/// Inserts a new pairing row just above the control row.
	pub fn add_row(&self) -> Result<()> {
		let template = self
			.dom
			.element_by_id(&self.layout.template_id)
			.ok_or_else(|| DomError::NotFound(format!("#{}", self.layout.template_id)))?;
		let control_row = self
			.rows()?
			.pop()
			.ok_or_else(|| DomError::NotFound(format!("#{} tr", self.layout.table_id)))?;

		let row = self.dom.create_element("tr")?;
		for name in [&self.layout.first_name, &self.layout.second_name] {
			let picker = self.dom.clone_deep(&template)?;
			self.dom.remove_attribute(&picker, "id")?;
			self.dom.remove_attribute(&picker, "style")?;
			self.dom.set_attribute(&picker, "name", name)?;

			let cell = self.dom.create_element("td")?;
			self.dom.append_child(&cell, &picker)?;
			self.dom.append_child(&row, &cell)?;
		}
		self.dom.insert_before(&row, &control_row)?;

		self.refresh_delete_buttons()
	}

	/// Removes the last pairing row.
	///
	/// Returns `false` and leaves the table alone when only the header and
	/// control rows remain.
	pub fn delete_row(&self) -> Result<bool> {
		let rows = self.rows()?;
		if rows.len() <= MIN_ROWS {
			debug_log!("pairings: nothing to delete");
			return Ok(false);
		}
		self.dom.remove(&rows[rows.len() - 2])?;

		self.refresh_delete_buttons()?;
		Ok(true)
	}

	/// Makes every element matching `selector` add a row when clicked.
	/// Returns how many elements were bound.
	pub fn bind_add(self: &Rc<Self>, selector: &str) -> Result<usize> {
		let buttons = self.dom.query_all(selector)?;
		for button in &buttons {
			let editor = Rc::clone(self);
			self.dom.listen(
				button,
				EventKind::Click,
				Rc::new(move || {
					if let Err(err) = editor.add_row() {
						error_log!("pairings: add row failed: {}", err);
					}
				}),
			)?;
		}
		Ok(buttons.len())
	}

	/// Makes every element matching `selector` delete a row when clicked.
	///
	/// The bound elements are disabled whenever the table has no pairing
	/// rows left, whichever editor changed the table. Returns how many
	/// elements were bound.
	pub fn bind_delete(self: &Rc<Self>, selector: &str) -> Result<usize> {
		let buttons = self.dom.query_all(selector)?;
		for button in &buttons {
			self.dom
				.set_attribute(button, DELETE_ATTRIBUTE, &self.layout.table_id)?;
			let editor = Rc::clone(self);
			self.dom.listen(
				button,
				EventKind::Click,
				Rc::new(move || {
					if let Err(err) = editor.delete_row() {
						error_log!("pairings: delete row failed: {}", err);
					}
				}),
			)?;
		}
		self.refresh_delete_buttons()?;
		Ok(buttons.len())
	}

	/// Enables or disables every delete button bound to this table, looked up
	/// from the document so buttons bound through another editor follow too.
	pub fn refresh_delete_buttons(&self) -> Result<()> {
		let selector = format!(
			"[{}={}]",
			DELETE_ATTRIBUTE,
			quote_attr_value(&self.layout.table_id)
		);
		let buttons = self.dom.query_all(&selector)?;
		if buttons.is_empty() {
			return Ok(());
		}
		let at_floor = self.row_count()? <= MIN_ROWS;
		for button in &buttons {
			self.dom.set_disabled(button, at_floor)?;
		}
		Ok(())
	}
}

/// Binds `button_selector` to add rows to the default pairings table.
pub fn pairings_add_row<D>(dom: &D, button_selector: &str) -> Result<Rc<PairingRowEditor<D>>>
where
	D: Dom + Clone + 'static,
{
	let editor = PairingRowEditor::new(dom, PairingTable::default());
	editor.bind_add(button_selector)?;
	Ok(editor)
}

/// Binds `button_selector` to delete rows from the default pairings table.
pub fn pairings_del_row<D>(dom: &D, button_selector: &str) -> Result<Rc<PairingRowEditor<D>>>
where
	D: Dom + Clone + 'static,
{
	let editor = PairingRowEditor::new(dom, PairingTable::default());
	editor.bind_delete(button_selector)?;
	Ok(editor)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::MemoryDom;
	use rstest::rstest;

	fn page(data_rows: usize) -> MemoryDom {
		let rows = "<tr><td>C9</td><td>TSM</td></tr>".repeat(data_rows);
		MemoryDom::parse(&format!(
			r#"<select id="template-team-list" style="display: none"><option value="1">C9</option><option value="2">TSM</option></select>
			<table id="pairings"><tr><th>Home</th><th>Away</th></tr>{}<tr><td><button id="add">+</button><button id="del">-</button></td></tr></table>"#,
			rows
		))
		.unwrap()
	}

	#[rstest]
	fn test_default_layout() {
		let layout = PairingTable::default();

		assert_eq!(layout.table_id, "pairings");
		assert_eq!(layout.template_id, "template-team-list");
		assert_eq!(layout.first_name, "home-team");
		assert_eq!(layout.second_name, "away-team");
	}

	#[rstest]
	fn test_add_row_clones_template() {
		let dom = page(0);
		let editor = PairingRowEditor::new(&dom, PairingTable::default());

		editor.add_row().unwrap();

		let table = dom.element_by_id("pairings").unwrap();
		let rows = dom.query_all_within(&table, "tr").unwrap();
		assert_eq!(rows.len(), 3);

		let pickers = dom.query_all_within(&rows[1], "select").unwrap();
		assert_eq!(pickers.len(), 2);
		assert_eq!(dom.attribute(&pickers[0], "name").as_deref(), Some("home-team"));
		assert_eq!(dom.attribute(&pickers[1], "name").as_deref(), Some("away-team"));
		assert!(pickers.iter().all(|p| dom.attribute(p, "id").is_none()));
		assert!(pickers.iter().all(|p| dom.is_visible(p)));
		assert_ne!(pickers[0], pickers[1]);
	}

	#[rstest]
	fn test_add_row_without_template_fails() {
		let dom = MemoryDom::parse(r#"<table id="pairings"><tr><th>x</th></tr></table>"#).unwrap();
		let editor = PairingRowEditor::new(&dom, PairingTable::default());

		assert!(editor.add_row().is_err());
		assert_eq!(editor.row_count().unwrap(), 1);
	}

	#[rstest]
	#[case(0, false, 2)]
	#[case(1, true, 2)]
	#[case(3, true, 4)]
	fn test_delete_row_respects_floor(
		#[case] data_rows: usize,
		#[case] deleted: bool,
		#[case] remaining: usize,
	) {
		let dom = page(data_rows);
		let editor = PairingRowEditor::new(&dom, PairingTable::default());

		assert_eq!(editor.delete_row().unwrap(), deleted);
		assert_eq!(editor.row_count().unwrap(), remaining);
	}

	#[rstest]
	fn test_delete_button_disabled_at_floor() {
		let dom = page(1);
		let editor = PairingRowEditor::new(&dom, PairingTable::default());
		let del = dom.element_by_id("del").unwrap();

		assert_eq!(editor.bind_delete("#del").unwrap(), 1);
		assert!(!dom.is_disabled(&del));

		dom.dispatch(&del, EventKind::Click);
		assert!(dom.is_disabled(&del));

		editor.add_row().unwrap();
		assert!(!dom.is_disabled(&del));
	}

	#[rstest]
	fn test_separate_editors_share_delete_state() {
		let dom = page(0);
		let adder = pairings_add_row(&dom, "#add").unwrap();
		pairings_del_row(&dom, "#del").unwrap();
		let add = dom.element_by_id("add").unwrap();
		let del = dom.element_by_id("del").unwrap();
		assert!(dom.is_disabled(&del));

		dom.dispatch(&add, EventKind::Click);
		dom.dispatch(&add, EventKind::Click);

		assert!(!dom.is_disabled(&del));
		assert_eq!(dom.dispatch(&del, EventKind::Click), 1);
		assert_eq!(adder.row_count().unwrap(), 3);
	}
}
