//! Platform services: HTTP transport, navigation and timers
//!
//! Page behaviors reach the network, the window location and the clock only
//! through the traits in this module, bundled into a [`Platform`]. The browser
//! wiring lives in [`browser`] (WASM only); tests use the recorders from
//! [`crate::testing`].

#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod http;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, SubmitError};

pub use http::HttpTransport;

/// What the server answered to a form POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase ("Created", "Bad Request", ...).
	pub status_text: String,
	/// The `Location` header, if any.
	pub location: Option<String>,
	/// Response body as text.
	pub body: String,
}

impl HttpResponse {
	/// Creates an empty response with the canonical reason phrase for `status`.
	pub fn new(status: u16) -> Self {
		let status_text = reqwest::StatusCode::from_u16(status)
			.ok()
			.and_then(|code| code.canonical_reason())
			.unwrap_or_default()
			.to_string();
		Self {
			status,
			status_text,
			location: None,
			body: String::new(),
		}
	}

	/// Sets the `Location` header.
	pub fn with_location(mut self, location: impl Into<String>) -> Self {
		self.location = Some(location.into());
		self
	}

	/// Sets the body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();
		self
	}

	/// Whether the status is 2xx.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends URL-encoded form bodies.
#[async_trait(?Send)]
pub trait Transport {
	/// POSTs `body` (already `application/x-www-form-urlencoded`) to `url`.
	///
	/// Any HTTP response, whatever its status, is `Ok`; `Err` means no
	/// response was obtained.
	async fn post_form(&self, url: &str, body: String) -> Result<HttpResponse, SubmitError>;
}

/// Moves the window to another document.
pub trait Navigator {
	/// Navigates to `href`.
	fn assign(&self, href: &str) -> Result<(), Error>;

	/// Reloads the current document.
	fn reload(&self) -> Result<(), Error>;
}

/// Waits.
#[async_trait(?Send)]
pub trait Timer {
	/// Resolves after `duration`.
	async fn sleep(&self, duration: Duration);
}

/// The services a page behavior needs, shared between behaviors.
#[derive(Clone)]
pub struct Platform {
	transport: Rc<dyn Transport>,
	navigator: Rc<dyn Navigator>,
	timer: Rc<dyn Timer>,
}

impl fmt::Debug for Platform {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Platform").finish_non_exhaustive()
	}
}

impl Platform {
	/// Bundles the given services.
	pub fn new(
		transport: Rc<dyn Transport>,
		navigator: Rc<dyn Navigator>,
		timer: Rc<dyn Timer>,
	) -> Self {
		Self {
			transport,
			navigator,
			timer,
		}
	}

	/// Services backed by the current window: `fetch` through reqwest,
	/// `window.location` and `setTimeout`.
	#[cfg(target_arch = "wasm32")]
	pub fn browser() -> Result<Self, Error> {
		let transport = HttpTransport::for_window()?;
		Ok(Self::new(
			Rc::new(transport),
			Rc::new(browser::WindowNavigator),
			Rc::new(browser::BrowserTimer),
		))
	}

	/// The HTTP transport.
	pub fn transport(&self) -> Rc<dyn Transport> {
		Rc::clone(&self.transport)
	}

	/// The navigator.
	pub fn navigator(&self) -> Rc<dyn Navigator> {
		Rc::clone(&self.navigator)
	}

	/// The timer.
	pub fn timer(&self) -> Rc<dyn Timer> {
		Rc::clone(&self.timer)
	}
}

/// The browser's IANA time zone, e.g. `"America/Los_Angeles"`.
#[cfg(target_arch = "wasm32")]
pub fn resolved_time_zone() -> Option<String> {
	use wasm_bindgen::JsValue;

	let format = js_sys::Intl::DateTimeFormat::new(&js_sys::Array::new(), &js_sys::Object::new());
	let options = format.resolved_options();
	js_sys::Reflect::get(&options, &JsValue::from_str("timeZone"))
		.ok()?
		.as_string()
}

/// The browser's IANA time zone (non-WASM stub).
#[cfg(not(target_arch = "wasm32"))]
pub fn resolved_time_zone() -> Option<String> {
	None
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(201, "Created", true)]
	#[case(204, "No Content", true)]
	#[case(400, "Bad Request", false)]
	#[case(302, "Found", false)]
	#[case(599, "", false)]
	fn test_http_response_status(#[case] status: u16, #[case] text: &str, #[case] success: bool) {
		let response = HttpResponse::new(status);

		assert_eq!(response.status_text, text);
		assert_eq!(response.is_success(), success);
	}

	#[rstest]
	fn test_http_response_builders() {
		let response = HttpResponse::new(201).with_location("/widgets/42").with_body("ok");

		assert_eq!(response.location.as_deref(), Some("/widgets/42"));
		assert_eq!(response.body, "ok");
	}

	#[cfg(not(target_arch = "wasm32"))]
	#[rstest]
	fn test_resolved_time_zone_native_stub() {
		assert_eq!(resolved_time_zone(), None);
	}
}
