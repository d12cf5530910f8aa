//! Browser DOM tests
//!
//! Exercises [`WebDom`] against a real document: serialization, form
//! submission with mock services, and the widgets.
//!
//! **Run with**: `wasm-pack test --headless --firefox crates/loltools-pages`

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use loltools_pages::dom::{CONTROL_SELECTOR, Dom, WebDom};
use loltools_pages::form::serialize::{encode_fields, serialize_fields};
use loltools_pages::form::{FormOptions, SubmitOutcome, register_form};
use loltools_pages::platform::HttpResponse;
use loltools_pages::testing::MockPlatform;
use loltools_pages::widgets::{PairingRowEditor, PairingTable, register_expando};
use web_sys::Element;

/// Mounts `markup` in a fresh container under `<body>`.
fn mount(markup: &str) -> (WebDom, Element) {
	let dom = WebDom::from_window().unwrap();
	let body = dom.document().body().unwrap();
	let container = dom.create_element("div").unwrap();
	container.set_inner_html(markup);
	body.append_child(&container).unwrap();
	(dom, container)
}

fn unmount(container: Element) {
	container.remove();
}

// ============================================================================
// Serialization
// ============================================================================

#[wasm_bindgen_test]
fn test_serialize_follows_browser_state() {
	let (dom, container) = mount(
		r#"<form id="wasm-serialize">
			<input name="name" value="Cloud9">
			<input type="checkbox" name="public" checked>
			<input type="radio" name="side" value="blue">
			<input type="radio" name="side" value="red" checked>
			<select name="tags" multiple><option value="a" selected>a</option><option value="b">b</option></select>
			<input name="locked" value="x" disabled>
		</form>"#,
	);
	let form = dom.element_by_id("wasm-serialize").unwrap();

	let controls = dom.query_all_within(&form, CONTROL_SELECTOR).unwrap();
	let body = encode_fields(&serialize_fields(&dom, &controls)).unwrap();

	assert_eq!(body, "name=Cloud9&public=on&side=red&tags=a");
	unmount(container);
}

// ============================================================================
// Form submission
// ============================================================================

#[wasm_bindgen_test]
async fn test_submit_with_mock_services() {
	let (dom, container) = mount(
		r#"<div id="errors"></div>
		<form id="wasm-submit">
			<input name="name" value="Fnatic">
			<button id="submit" type="submit">Save</button>
		</form>"#,
	);
	let mock = MockPlatform::new();
	mock.transport
		.enqueue(HttpResponse::new(400).with_body("bad field"));
	let controller = register_form(
		&dom,
		&mock.platform(),
		"wasm-submit",
		"/api/teams",
		FormOptions::default().with_busy_label("sending..."),
	)
	.unwrap();
	let button = dom.element_by_id("submit").unwrap();

	let task = controller.begin_submit().unwrap();
	assert!(dom.is_disabled(&button));
	assert_eq!(dom.text(&button), "sending...");

	let outcome = task.await;

	assert!(matches!(outcome, SubmitOutcome::Failed(_)));
	assert!(!dom.is_disabled(&button));
	assert_eq!(dom.text(&button), "Save");
	let errors = dom.element_by_id("errors").unwrap();
	assert_eq!(dom.text(&errors), "error: Bad Request: bad field");
	assert_eq!(mock.transport.requests()[0].body, "name=Fnatic");
	unmount(container);
}

// ============================================================================
// Widgets
// ============================================================================

#[wasm_bindgen_test]
fn test_pairings_rows_inside_tbody() {
	let (dom, container) = mount(
		r#"<select id="wasm-template" style="display: none"><option value="1">G2</option></select>
		<table id="wasm-pairings">
			<tr><th>Home</th><th>Away</th></tr>
			<tr><td><button>+</button></td></tr>
		</table>"#,
	);
	let editor = PairingRowEditor::new(
		&dom,
		PairingTable {
			table_id: "wasm-pairings".to_string(),
			template_id: "wasm-template".to_string(),
			..PairingTable::default()
		},
	);

	editor.add_row().unwrap();
	assert_eq!(editor.row_count().unwrap(), 3);
	let selects = container.query_selector_all("select[name]").unwrap();
	assert_eq!(selects.length(), 2);

	assert!(editor.delete_row().unwrap());
	assert!(!editor.delete_row().unwrap());
	assert_eq!(editor.row_count().unwrap(), 2);
	unmount(container);
}

#[wasm_bindgen_test]
async fn test_expando_round_trip() {
	let (dom, container) = mount(
		r#"<button id="wasm-expando">Show</button>
		<div id="wasm-content" hidden>Rules</div>"#,
	);
	let mock = MockPlatform::new();
	let toggle = register_expando(
		&dom,
		&mock.platform(),
		"#wasm-expando",
		"#wasm-content",
		"Show",
		"Hide",
	)
	.unwrap();
	let content = dom.element_by_id("wasm-content").unwrap();

	toggle.toggle().await.unwrap();
	assert!(dom.is_visible(&content));
	assert_eq!(dom.text(&toggle.buttons()[0]), "Hide");

	toggle.toggle().await.unwrap();
	assert!(!dom.is_visible(&content));
	assert_eq!(dom.text(&toggle.buttons()[0]), "Show");
	unmount(container);
}
