//! `reqwest`-backed [`Transport`].
//!
//! On WASM reqwest drives `fetch`; natively it uses its own connector. Relative
//! submit URLs (the common case in page markup) are resolved against a base
//! URL, which in the browser is the current window location.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, LOCATION};

use super::{HttpResponse, Transport};
use crate::error::{Error, SubmitError};

/// Content type of every form POST.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Header marking the request as script-initiated, as jQuery's `$.ajax` does.
pub const REQUESTED_WITH_HEADER: &str = "X-Requested-With";

/// HTTP transport for form submissions.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
	client: reqwest::Client,
	base_url: Option<Url>,
}

impl HttpTransport {
	/// Creates a transport that only accepts absolute URLs.
	pub fn new() -> Self {
		Self::default()
	}

	/// Resolves relative URLs against `base_url`.
	pub fn with_base_url(mut self, base_url: Url) -> Self {
		self.base_url = Some(base_url);
		self
	}

	/// Creates a transport resolving against `window.location.href`.
	#[cfg(target_arch = "wasm32")]
	pub fn for_window() -> Result<Self, Error> {
		let href = web_sys::window()
			.ok_or_else(|| Error::Environment("no window".to_string()))?
			.location()
			.href()
			.map_err(|err| Error::Environment(format!("location.href unavailable: {:?}", err)))?;
		Ok(Self::new().with_base_url(parse_url(&href)?))
	}

	/// The base URL, if any.
	pub fn base_url(&self) -> Option<&Url> {
		self.base_url.as_ref()
	}

	/// Resolves `url` against the base URL.
	pub fn resolve(&self, url: &str) -> Result<Url, Error> {
		match &self.base_url {
			Some(base) => base.join(url).map_err(|err| Error::Url {
				url: url.to_string(),
				reason: err.to_string(),
			}),
			None => parse_url(url),
		}
	}
}

fn parse_url(url: &str) -> Result<Url, Error> {
	Url::parse(url).map_err(|err| Error::Url {
		url: url.to_string(),
		reason: err.to_string(),
	})
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
	async fn post_form(&self, url: &str, body: String) -> Result<HttpResponse, SubmitError> {
		let target = self
			.resolve(url)
			.map_err(|err| SubmitError::transport(err.to_string()))?;

		let response = self
			.client
			.post(target)
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(REQUESTED_WITH_HEADER, "XMLHttpRequest")
			.body(body)
			.send()
			.await
			.map_err(|err| SubmitError::transport(err.to_string()))?;

		let status = response.status();
		let location = response
			.headers()
			.get(LOCATION)
			.and_then(|value| value.to_str().ok())
			.map(str::to_owned);
		let body = response
			.text()
			.await
			.map_err(|err| SubmitError::transport(err.to_string()))?;

		Ok(HttpResponse {
			status: status.as_u16(),
			status_text: status.canonical_reason().unwrap_or_default().to_string(),
			location,
			body,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/leagues/create", "https://loltools.example/leagues/", "https://loltools.example/leagues/create")]
	#[case("matches/create", "https://loltools.example/leagues/7/", "https://loltools.example/leagues/7/matches/create")]
	#[case("https://other.example/x", "https://loltools.example/", "https://other.example/x")]
	fn test_resolve_against_base(#[case] url: &str, #[case] base: &str, #[case] expected: &str) {
		let transport = HttpTransport::new().with_base_url(Url::parse(base).unwrap());

		assert_eq!(transport.resolve(url).unwrap().as_str(), expected);
	}

	#[rstest]
	fn test_relative_url_without_base_is_rejected() {
		let transport = HttpTransport::new();

		let err = transport.resolve("/leagues/create").unwrap_err();

		assert!(matches!(err, Error::Url { ref url, .. } if url == "/leagues/create"));
	}

	#[cfg(not(target_arch = "wasm32"))]
	#[rstest]
	#[tokio::test]
	async fn test_unresolvable_url_is_a_transport_failure() {
		let transport = HttpTransport::new();

		let result = transport.post_form("not a url", String::new()).await;

		assert!(matches!(result, Err(SubmitError::Transport { .. })));
	}
}
