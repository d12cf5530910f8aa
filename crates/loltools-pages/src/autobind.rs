//! Markup-driven binding
//!
//! Pages can opt into behaviors with data attributes instead of script:
//!
//! ```html
//! <form id="new-team" data-submit-url="/api/teams"
//!       data-form-options='{"reloadDelayMs": 100, "reenableDelayMs": 200}'>...</form>
//!
//! <button data-expando="#details" data-open-text="Show" data-close-text="Hide">Show</button>
//! ```
//!
//! [`bind_document`] finds every such element and registers it.

use crate::dom::Dom;
use crate::error::{Error, Result};
use crate::form::{FormOptions, FormSubmitController};
use crate::info_log;
use crate::platform::Platform;
use crate::widgets::expando::{DEFAULT_DURATION, ExpandoToggle};

/// Attribute naming a form's submit URL.
pub const SUBMIT_URL_ATTRIBUTE: &str = "data-submit-url";
/// Attribute carrying a form's options as JSON.
pub const FORM_OPTIONS_ATTRIBUTE: &str = "data-form-options";
/// Attribute on an expando button holding the content selector.
pub const EXPANDO_ATTRIBUTE: &str = "data-expando";

/// How many elements [`bind_document`] bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindSummary {
	/// Forms bound to asynchronous submission.
	pub forms: usize,
	/// Expando buttons bound.
	pub expandos: usize,
}

/// Binds every annotated form and expando button in the document.
///
/// Forms need an `id`. Fails on the first element that cannot be bound;
/// elements bound before it stay bound.
pub fn bind_document<D>(dom: &D, platform: &Platform) -> Result<BindSummary>
where
	D: Dom + Clone + 'static,
{
	let mut summary = BindSummary::default();

	for form in dom.query_all(&format!("form[{}]", SUBMIT_URL_ATTRIBUTE))? {
		let id = dom
			.attribute(&form, "id")
			.filter(|id| !id.is_empty())
			.ok_or_else(|| Error::Environment(format!("form with {} has no id", SUBMIT_URL_ATTRIBUTE)))?;
		let url = dom.attribute(&form, SUBMIT_URL_ATTRIBUTE).unwrap_or_default();
		let options = match dom.attribute(&form, FORM_OPTIONS_ATTRIBUTE) {
			Some(json) => FormOptions::from_json(&json)?,
			None => FormOptions::default(),
		};
		FormSubmitController::register(dom, platform, &id, &url, options)?;
		summary.forms += 1;
	}

	for button in dom.query_all(&format!("[{}]", EXPANDO_ATTRIBUTE))? {
		let content = dom.attribute(&button, EXPANDO_ATTRIBUTE).unwrap_or_default();
		let open_text = dom
			.attribute(&button, "data-open-text")
			.unwrap_or_else(|| dom.text(&button));
		let close_text = dom
			.attribute(&button, "data-close-text")
			.unwrap_or_else(|| open_text.clone());
		ExpandoToggle::attach(
			dom,
			platform,
			vec![button],
			&content,
			&open_text,
			&close_text,
			DEFAULT_DURATION,
		)?;
		summary.expandos += 1;
	}

	info_log!(
		"bound {} forms and {} expandos",
		summary.forms,
		summary.expandos
	);
	Ok(summary)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::{EventKind, MemoryDom};
	use crate::testing::MockPlatform;
	use rstest::rstest;

	#[rstest]
	fn test_binds_annotated_elements() {
		let dom = MemoryDom::parse(
			r##"<form id="a" data-submit-url="/a"></form>
			<form id="b" data-submit-url="/b" data-form-options='{"resultMode": "inline-text"}'></form>
			<form id="plain"></form>
			<button data-expando="#more" data-open-text="Show" data-close-text="Hide">Show</button>
			<div id="more" hidden>details</div>"##,
		)
		.unwrap();
		let mock = MockPlatform::new();

		let summary = bind_document(&dom, &mock.platform()).unwrap();

		assert_eq!(summary, BindSummary { forms: 2, expandos: 1 });
		let plain = dom.element_by_id("plain").unwrap();
		assert_eq!(dom.listener_count(&plain, EventKind::Submit), 0);
	}

	#[rstest]
	#[case(r#"<form data-submit-url="/a"></form>"#)]
	#[case(r#"<form id="a" data-submit-url="/a" data-form-options="nope"></form>"#)]
	#[case(r#"<button data-expando="div > p">x</button>"#)]
	fn test_rejects_bad_annotations(#[case] markup: &str) {
		let dom = MemoryDom::parse(markup).unwrap();
		let mock = MockPlatform::new();

		assert!(bind_document(&dom, &mock.platform()).is_err());
	}
}
