//! JavaScript API (WASM only)
//!
//! Thin wrappers binding against the current window's document. Failures are
//! thrown as strings.
//!
//! ```js
//! import init, { registerForm, registerExpando, pairingsAddRow, pairingsDelRow } from "./loltools_pages.js";
//!
//! await init();
//! registerForm("new-match", "/api/leagues/7/matches", { busyLabel: "sending..." });
//! registerExpando("#rules-toggle", "#rules", "Show rules", "Hide rules");
//! pairingsAddRow("#add-pairing");
//! pairingsDelRow("#del-pairing");
//! ```

use wasm_bindgen::prelude::*;

use crate::autobind;
use crate::dom::WebDom;
use crate::error::{Error, Result};
use crate::form::{FormOptions, register_form};
use crate::platform::Platform;
use crate::widgets::{pairings_add_row, pairings_del_row, register_expando};

/// Module initialization.
#[wasm_bindgen(start)]
pub fn start() {
	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();
}

fn to_js(err: Error) -> JsValue {
	JsValue::from_str(&err.to_string())
}

fn options_from_js(options: JsValue) -> Result<FormOptions> {
	if options.is_undefined() || options.is_null() {
		return Ok(FormOptions::default());
	}
	let json = js_sys::JSON::stringify(&options)
		.map_err(|err| Error::Environment(format!("options are not serializable: {:?}", err)))?;
	FormOptions::from_json(&String::from(json))
}

/// Binds the form with id `formId` to submit asynchronously to `submitUrl`.
///
/// `options` is an optional object with the camelCase fields of
/// [`FormOptions`].
#[wasm_bindgen(js_name = registerForm)]
pub fn register_form_js(form_id: &str, submit_url: &str, options: JsValue) -> std::result::Result<(), JsValue> {
	let run = || -> Result<()> {
		let dom = WebDom::from_window()?;
		let platform = Platform::browser()?;
		register_form(&dom, &platform, form_id, submit_url, options_from_js(options)?)?;
		Ok(())
	};
	run().map_err(to_js)
}

/// Binds `buttonSel` to expand and collapse `contentSel`.
#[wasm_bindgen(js_name = registerExpando)]
pub fn register_expando_js(
	button_sel: &str,
	content_sel: &str,
	open_text: &str,
	close_text: &str,
) -> std::result::Result<(), JsValue> {
	let run = || -> Result<()> {
		let dom = WebDom::from_window()?;
		let platform = Platform::browser()?;
		register_expando(&dom, &platform, button_sel, content_sel, open_text, close_text)?;
		Ok(())
	};
	run().map_err(to_js)
}

/// Binds `buttonSel` to add a row to `#pairings`.
#[wasm_bindgen(js_name = pairingsAddRow)]
pub fn pairings_add_row_js(button_sel: &str) -> std::result::Result<(), JsValue> {
	let run = || -> Result<()> {
		pairings_add_row(&WebDom::from_window()?, button_sel)?;
		Ok(())
	};
	run().map_err(to_js)
}

/// Binds `buttonSel` to delete the last row of `#pairings`.
#[wasm_bindgen(js_name = pairingsDelRow)]
pub fn pairings_del_row_js(button_sel: &str) -> std::result::Result<(), JsValue> {
	let run = || -> Result<()> {
		pairings_del_row(&WebDom::from_window()?, button_sel)?;
		Ok(())
	};
	run().map_err(to_js)
}

/// Binds every `form[data-submit-url]` and `[data-expando]` element.
///
/// Returns `{ forms, expandos }` counts.
#[wasm_bindgen(js_name = bindDocument)]
pub fn bind_document_js() -> std::result::Result<JsValue, JsValue> {
	let run = || -> Result<autobind::BindSummary> {
		let dom = WebDom::from_window()?;
		let platform = Platform::browser()?;
		autobind::bind_document(&dom, &platform)
	};
	let summary = run().map_err(to_js)?;

	let result = js_sys::Object::new();
	js_sys::Reflect::set(&result, &"forms".into(), &(summary.forms as u32).into())?;
	js_sys::Reflect::set(&result, &"expandos".into(), &(summary.expandos as u32).into())?;
	Ok(result.into())
}
