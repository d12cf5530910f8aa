//! Form serialization following the HTML form-encoding rules.

use crate::dom::Dom;
use crate::error::Result;

const EXCLUDED_INPUT_TYPES: &[&str] = &["submit", "button", "image", "reset", "file"];

/// Collects the successful controls among `controls` as ordered name/value pairs.
///
/// A control contributes when it has a non-empty name, is enabled, and is not
/// a button-like input; checkboxes and radios contribute only when checked;
/// a `<select>` contributes one pair per selected option.
pub fn serialize_fields<D: Dom>(dom: &D, controls: &[D::Node]) -> Vec<(String, String)> {
	let mut fields = Vec::new();

	for control in controls {
		let Some(name) = dom.attribute(control, "name").filter(|name| !name.is_empty()) else {
			continue;
		};
		if dom.is_disabled(control) {
			continue;
		}

		match dom.tag_name(control).as_str() {
			"input" => {
				let kind = dom
					.attribute(control, "type")
					.unwrap_or_default()
					.to_ascii_lowercase();
				if EXCLUDED_INPUT_TYPES.contains(&kind.as_str()) {
					continue;
				}
				if (kind == "checkbox" || kind == "radio") && !dom.is_checked(control) {
					continue;
				}
				fields.push((name, normalize_newlines(&dom.value(control))));
			}
			"select" => {
				for value in dom.selected_values(control) {
					fields.push((name.clone(), normalize_newlines(&value)));
				}
			}
			"textarea" => fields.push((name, normalize_newlines(&dom.value(control)))),
			_ => {}
		}
	}

	fields
}

/// Encodes pairs as `application/x-www-form-urlencoded`.
pub fn encode_fields(fields: &[(String, String)]) -> Result<String> {
	Ok(serde_urlencoded::to_string(fields)?)
}

fn normalize_newlines(value: &str) -> String {
	value.replace("\r\n", "\n").replace('\n', "\r\n")
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::{CONTROL_SELECTOR, MemoryDom};
	use rstest::rstest;

	fn fields_of(markup: &str) -> Vec<(String, String)> {
		let dom = MemoryDom::parse(markup).unwrap();
		let controls = dom.query_all(CONTROL_SELECTOR).unwrap();
		serialize_fields(&dom, &controls)
	}

	fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
		expected
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[rstest]
	fn test_text_inputs_and_textarea() {
		let fields = fields_of(
			r#"<input name="name" value="Summoner's Rift"><textarea name="notes">best of 3</textarea>"#,
		);

		assert_eq!(
			fields,
			pairs(&[("name", "Summoner's Rift"), ("notes", "best of 3")])
		);
	}

	#[rstest]
	fn test_skips_unnamed_disabled_and_buttons() {
		let fields = fields_of(
			r#"<input value="x"><input name="" value="y"><input name="locked" value="z" disabled><input type="submit" name="go" value="Go"><input type="file" name="f"><button name="b" value="1">B</button><input name="kept" value="k">"#,
		);

		assert_eq!(fields, pairs(&[("kept", "k")]));
	}

	#[rstest]
	fn test_checkboxes_and_radios() {
		let fields = fields_of(
			r#"<input type="checkbox" name="public" checked><input type="checkbox" name="ranked" value="yes"><input type="radio" name="side" value="blue"><input type="radio" name="side" value="red" checked>"#,
		);

		assert_eq!(fields, pairs(&[("public", "on"), ("side", "red")]));
	}

	#[rstest]
	fn test_select_single_and_multiple() {
		let fields = fields_of(
			r#"<select name="home-team"><option value="1">C9</option><option value="2" selected>TSM</option></select><select name="tags" multiple><option value="a" selected>a</option><option value="b" selected>b</option></select>"#,
		);

		assert_eq!(
			fields,
			pairs(&[("home-team", "2"), ("tags", "a"), ("tags", "b")])
		);
	}

	#[rstest]
	fn test_textarea_newlines_become_crlf() {
		let fields = fields_of("<textarea name=\"n\">a\nb\r\nc</textarea>");

		assert_eq!(fields, pairs(&[("n", "a\r\nb\r\nc")]));
	}

	#[rstest]
	#[case(&[("name", "Team Liquid"), ("tz", "America/Los_Angeles")], "name=Team+Liquid&tz=America%2FLos_Angeles")]
	#[case(&[("q", "a&b=c")], "q=a%26b%3Dc")]
	#[case(&[], "")]
	fn test_encode_fields(#[case] input: &[(&str, &str)], #[case] expected: &str) {
		assert_eq!(encode_fields(&pairs(input)).unwrap(), expected);
	}
}
