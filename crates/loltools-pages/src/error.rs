//! Error types for loltools-pages
//!
//! Errors are split by the layer that produces them:
//!
//! - [`DomError`]: lookups, selector parsing and mutations against a [`Dom`](crate::dom::Dom)
//! - [`SubmitError`]: the outcome of a failed form submission (transport or HTTP status)
//! - [`Error`]: the crate-wide error returned by registration entry points

use thiserror::Error;

use crate::platform::HttpResponse;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by DOM backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
	/// No element matched the requested id or selector.
	#[error("element not found: {0}")]
	NotFound(String),

	/// The selector could not be parsed or uses unsupported syntax.
	#[error("invalid selector `{selector}`: {reason}")]
	InvalidSelector {
		/// The offending selector text.
		selector: String,
		/// Why it was rejected.
		reason: String,
	},

	/// Markup handed to the in-memory parser was not well formed.
	#[error("malformed markup at byte {offset}: {reason}")]
	Markup {
		/// Byte offset into the source.
		offset: usize,
		/// What went wrong.
		reason: String,
	},

	/// The operation needs a parent but the node is not attached.
	#[error("node is detached from the document")]
	Detached,

	/// A browser API call threw.
	#[error("browser API call failed: {0}")]
	Js(String),
}

/// Why a form submission failed.
///
/// A superseded submission is not an error and never produces one; see
/// [`SubmitOutcome::Superseded`](crate::form::SubmitOutcome::Superseded).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
	/// The request never produced an HTTP response.
	#[error("request failed: {message}")]
	Transport {
		/// Description of the network failure.
		message: String,
	},

	/// The server answered with a non-2xx status.
	#[error("server responded {status} {status_text}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Reason phrase for the status.
		status_text: String,
		/// Raw response body.
		body: String,
	},
}

impl SubmitError {
	/// Creates a transport failure.
	pub fn transport(message: impl Into<String>) -> Self {
		Self::Transport {
			message: message.into(),
		}
	}

	/// Converts a non-success response into a status failure.
	pub fn from_response(response: HttpResponse) -> Self {
		Self::Status {
			status: response.status,
			status_text: response.status_text,
			body: response.body,
		}
	}

	/// The short label shown before the body ("Bad Request", network message, ...).
	pub fn label(&self) -> &str {
		match self {
			Self::Transport { message } => message,
			Self::Status { status_text, .. } => status_text,
		}
	}

	/// The raw response body, empty for transport failures.
	pub fn body(&self) -> &str {
		match self {
			Self::Transport { .. } => "",
			Self::Status { body, .. } => body,
		}
	}

	/// Renders the user-facing message with the given prefix.
	pub fn display_text(&self, prefix: &str) -> String {
		format!("{}{}: {}", prefix, self.label(), self.body())
	}
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
	/// A DOM operation failed.
	#[error(transparent)]
	Dom(#[from] DomError),

	/// Form fields could not be URL-encoded.
	#[error("failed to encode form fields: {0}")]
	Encode(#[from] serde_urlencoded::ser::Error),

	/// Options JSON was invalid.
	#[error("invalid options: {0}")]
	Options(#[from] serde_json::Error),

	/// A URL could not be parsed or resolved.
	#[error("invalid url `{url}`: {reason}")]
	Url {
		/// The offending URL.
		url: String,
		/// Parser message.
		reason: String,
	},

	/// The browser environment is missing something we need (window, location, ...).
	#[error("browser environment unavailable: {0}")]
	Environment(String),

	/// Navigation through the platform failed.
	#[error("navigation failed: {0}")]
	Navigation(String),
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_status_error_display_text() {
		let err = SubmitError::Status {
			status: 400,
			status_text: "Bad Request".to_string(),
			body: "bad field".to_string(),
		};

		assert_eq!(err.label(), "Bad Request");
		assert_eq!(err.body(), "bad field");
		assert_eq!(err.display_text("error: "), "error: Bad Request: bad field");
	}

	#[rstest]
	fn test_transport_error_has_empty_body() {
		let err = SubmitError::transport("connection refused");

		assert_eq!(err.body(), "");
		assert_eq!(err.display_text(""), "connection refused: ");
		assert_eq!(err.to_string(), "request failed: connection refused");
	}

	#[rstest]
	fn test_from_response_keeps_status_and_body() {
		let response = HttpResponse::new(422).with_body("name is required");

		let err = SubmitError::from_response(response);

		assert_eq!(
			err,
			SubmitError::Status {
				status: 422,
				status_text: "Unprocessable Entity".to_string(),
				body: "name is required".to_string(),
			}
		);
	}

	#[rstest]
	fn test_dom_error_converts_into_crate_error() {
		let err: Error = DomError::NotFound("form#signup".to_string()).into();

		assert_eq!(err.to_string(), "element not found: form#signup");
	}
}
