//! Configuration for [`FormSubmitController`](super::FormSubmitController).
//!
//! Options can be built in Rust or read from JSON (camelCase keys), which is
//! how markup-driven binding and the JavaScript API pass them:
//!
//! ```
//! use loltools_pages::form::{FormOptions, ResultMode};
//!
//! let options = FormOptions::from_json(r#"{"resultMode": "inline-text", "reloadDelayMs": 100}"#).unwrap();
//! assert_eq!(options.result_mode, ResultMode::InlineText);
//! assert_eq!(options.reload_delay().as_millis(), 100);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Where submission feedback goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultMode {
	/// Failures accumulate as `<div>` entries in the document's errors region.
	#[default]
	List,
	/// A single status line inside the form is overwritten.
	InlineText,
}

/// Per-form behavior switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormOptions {
	/// Feedback style.
	pub result_mode: ResultMode,
	/// Label shown on submit buttons while a request is in flight.
	pub busy_label: Option<String>,
	/// Delay before reloading after `204 No Content`, in milliseconds.
	pub reload_delay_ms: u64,
	/// Delay before re-enabling controls once a request settles, in milliseconds.
	pub reenable_delay_ms: u64,
	/// Status line text while sending (inline mode).
	pub active_text: Option<String>,
	/// Status line text after a success that neither redirects nor reloads
	/// (inline mode). Falls back to the response's reason phrase.
	pub done_text: Option<String>,
	/// Prefix of failure messages.
	pub fail_prefix: String,
	/// Document-wide errors region (list mode).
	pub errors_selector: String,
	/// Status line inside the form (inline mode).
	pub result_selector: String,
	/// Submit buttons inside the form whose label changes while busy.
	pub submit_selector: String,
	/// Field inside the form pre-filled with the browser time zone.
	pub time_zone_selector: String,
	/// Time zone to pre-fill instead of the browser-resolved one.
	pub time_zone: Option<String>,
}

impl Default for FormOptions {
	fn default() -> Self {
		Self {
			result_mode: ResultMode::List,
			busy_label: None,
			reload_delay_ms: 0,
			reenable_delay_ms: 0,
			active_text: None,
			done_text: None,
			fail_prefix: "error: ".to_string(),
			errors_selector: "#errors".to_string(),
			result_selector: "#result".to_string(),
			submit_selector: "#submit".to_string(),
			time_zone_selector: "#tz".to_string(),
			time_zone: None,
		}
	}
}

impl FormOptions {
	/// Default list-mode options.
	pub fn new() -> Self {
		Self::default()
	}

	/// List mode with delays that give an eventually consistent datastore time
	/// to catch up: reload after 100 ms, re-enable after 200 ms.
	pub fn eventual_consistency() -> Self {
		Self::default()
			.with_reload_delay(Duration::from_millis(100))
			.with_reenable_delay(Duration::from_millis(200))
	}

	/// Inline status line: "Saving..." while sending, "Saved" on success,
	/// "Error saving: ..." on failure, and a "sending..." submit label.
	pub fn status_line() -> Self {
		Self {
			result_mode: ResultMode::InlineText,
			busy_label: Some("sending...".to_string()),
			active_text: Some("Saving...".to_string()),
			done_text: Some("Saved".to_string()),
			fail_prefix: "Error saving: ".to_string(),
			..Self::default()
		}
	}

	/// Parses camelCase JSON; missing keys take their defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Sets the feedback style.
	pub fn with_result_mode(mut self, mode: ResultMode) -> Self {
		self.result_mode = mode;
		self
	}

	/// Sets the busy label.
	pub fn with_busy_label(mut self, label: impl Into<String>) -> Self {
		self.busy_label = Some(label.into());
		self
	}

	/// Sets the reload delay.
	pub fn with_reload_delay(mut self, delay: Duration) -> Self {
		self.reload_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
		self
	}

	/// Sets the re-enable delay.
	pub fn with_reenable_delay(mut self, delay: Duration) -> Self {
		self.reenable_delay_ms = delay.as_millis().try_into().unwrap_or(u64::MAX);
		self
	}

	/// Sets the in-flight status text.
	pub fn with_active_text(mut self, text: impl Into<String>) -> Self {
		self.active_text = Some(text.into());
		self
	}

	/// Sets the success status text.
	pub fn with_done_text(mut self, text: impl Into<String>) -> Self {
		self.done_text = Some(text.into());
		self
	}

	/// Sets the failure prefix.
	pub fn with_fail_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.fail_prefix = prefix.into();
		self
	}

	/// Pins the pre-filled time zone.
	pub fn with_time_zone(mut self, zone: impl Into<String>) -> Self {
		self.time_zone = Some(zone.into());
		self
	}

	/// Reload delay as a [`Duration`].
	pub fn reload_delay(&self) -> Duration {
		Duration::from_millis(self.reload_delay_ms)
	}

	/// Re-enable delay as a [`Duration`].
	pub fn reenable_delay(&self) -> Duration {
		Duration::from_millis(self.reenable_delay_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let options = FormOptions::default();

		assert_eq!(options.result_mode, ResultMode::List);
		assert_eq!(options.reload_delay(), Duration::ZERO);
		assert_eq!(options.fail_prefix, "error: ");
		assert_eq!(options.errors_selector, "#errors");
		assert_eq!(options.time_zone_selector, "#tz");
	}

	#[rstest]
	fn test_eventual_consistency_preset() {
		let options = FormOptions::eventual_consistency();

		assert_eq!(options.reload_delay(), Duration::from_millis(100));
		assert_eq!(options.reenable_delay(), Duration::from_millis(200));
	}

	#[rstest]
	fn test_status_line_preset() {
		let options = FormOptions::status_line();

		assert_eq!(options.result_mode, ResultMode::InlineText);
		assert_eq!(options.active_text.as_deref(), Some("Saving..."));
		assert_eq!(options.done_text.as_deref(), Some("Saved"));
		assert_eq!(options.fail_prefix, "Error saving: ");
	}

	#[rstest]
	fn test_from_json_partial() {
		let options = FormOptions::from_json(
			r#"{"resultMode": "inline-text", "busyLabel": "sending...", "reenableDelayMs": 200}"#,
		)
		.unwrap();

		assert_eq!(
			options,
			FormOptions {
				result_mode: ResultMode::InlineText,
				busy_label: Some("sending...".to_string()),
				reenable_delay_ms: 200,
				..FormOptions::default()
			}
		);
	}

	#[rstest]
	#[case(r#"{"resultMode": "table"}"#)]
	#[case(r#"{"reloadDelayMs": -1}"#)]
	#[case("not json")]
	fn test_from_json_rejects_invalid(#[case] json: &str) {
		assert!(FormOptions::from_json(json).is_err());
	}
}
