//! CSS selector subset for the in-memory document.
//!
//! Supported: comma-separated groups of compound selectors built from an
//! optional type selector (or `*`), `#id`, `.class`, `[attr]` and
//! `[attr=value]` (value bare, single- or double-quoted). Combinators are
//! rejected.

use crate::error::DomError;

/// A parsed selector: matches when any group matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
	groups: Vec<Compound>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attrs: Vec<AttrCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
	name: String,
	value: Option<String>,
}

impl Selector {
	/// Parses selector text.
	pub fn parse(source: &str) -> Result<Self, DomError> {
		let groups = source
			.split(',')
			.map(|group| parse_compound(source, group.trim()))
			.collect::<Result<Vec<_>, _>>()?;
		Ok(Self { groups })
	}

	/// Tests an element given its tag name and an attribute lookup.
	pub fn matches<F>(&self, tag: &str, attribute: F) -> bool
	where
		F: Fn(&str) -> Option<String>,
	{
		self.groups.iter().any(|group| group.matches(tag, &attribute))
	}
}

impl Compound {
	fn matches<F>(&self, tag: &str, attribute: &F) -> bool
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(expected) = &self.tag
			&& !expected.eq_ignore_ascii_case(tag)
		{
			return false;
		}
		if let Some(id) = &self.id
			&& attribute("id").as_deref() != Some(id.as_str())
		{
			return false;
		}
		if !self.classes.is_empty() {
			let class_attr = attribute("class").unwrap_or_default();
			let present: Vec<&str> = class_attr.split_whitespace().collect();
			if !self.classes.iter().all(|class| present.contains(&class.as_str())) {
				return false;
			}
		}
		self.attrs.iter().all(|cond| match (&cond.value, attribute(&cond.name)) {
			(_, None) => false,
			(None, Some(_)) => true,
			(Some(expected), Some(actual)) => *expected == actual,
		})
	}
}

fn invalid(selector: &str, reason: impl Into<String>) -> DomError {
	DomError::InvalidSelector {
		selector: selector.to_string(),
		reason: reason.into(),
	}
}

fn is_ident_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

fn parse_compound(source: &str, group: &str) -> Result<Compound, DomError> {
	if group.is_empty() {
		return Err(invalid(source, "empty selector group"));
	}

	let chars: Vec<char> = group.chars().collect();
	let mut pos = 0;
	let mut compound = Compound::default();

	let read_ident = |pos: &mut usize| -> String {
		let start = *pos;
		while *pos < chars.len() && is_ident_char(chars[*pos]) {
			*pos += 1;
		}
		chars[start..*pos].iter().collect()
	};

	if chars[0] == '*' {
		pos = 1;
	} else if is_ident_char(chars[0]) {
		compound.tag = Some(read_ident(&mut pos).to_ascii_lowercase());
	}

	while pos < chars.len() {
		match chars[pos] {
			'#' => {
				pos += 1;
				let ident = read_ident(&mut pos);
				if ident.is_empty() {
					return Err(invalid(source, "expected id after `#`"));
				}
				compound.id = Some(ident);
			}
			'.' => {
				pos += 1;
				let ident = read_ident(&mut pos);
				if ident.is_empty() {
					return Err(invalid(source, "expected class after `.`"));
				}
				compound.classes.push(ident);
			}
			'[' => {
				pos += 1;
				let name = read_ident(&mut pos);
				if name.is_empty() {
					return Err(invalid(source, "expected attribute name after `[`"));
				}
				let value = match chars.get(pos) {
					Some(']') => None,
					Some('=') => {
						pos += 1;
						Some(read_attr_value(source, &chars, &mut pos)?)
					}
					_ => return Err(invalid(source, "unsupported attribute operator")),
				};
				if chars.get(pos) != Some(&']') {
					return Err(invalid(source, "unterminated attribute selector"));
				}
				pos += 1;
				compound.attrs.push(AttrCondition {
					name: name.to_ascii_lowercase(),
					value,
				});
			}
			ch if ch.is_whitespace() || ch == '>' || ch == '+' || ch == '~' => {
				return Err(invalid(source, "combinators are not supported"));
			}
			ch => return Err(invalid(source, format!("unexpected character `{}`", ch))),
		}
	}

	Ok(compound)
}

fn read_attr_value(source: &str, chars: &[char], pos: &mut usize) -> Result<String, DomError> {
	let mut value = String::new();
	match chars.get(*pos) {
		Some(&quote @ ('\'' | '"')) => {
			*pos += 1;
			loop {
				match chars.get(*pos) {
					None => return Err(invalid(source, "unterminated quoted value")),
					Some('\\') => {
						let escaped = chars
							.get(*pos + 1)
							.ok_or_else(|| invalid(source, "dangling escape"))?;
						value.push(*escaped);
						*pos += 2;
					}
					Some(&ch) if ch == quote => {
						*pos += 1;
						break;
					}
					Some(&ch) => {
						value.push(ch);
						*pos += 1;
					}
				}
			}
		}
		_ => {
			while let Some(&ch) = chars.get(*pos) {
				if !is_ident_char(ch) {
					break;
				}
				value.push(ch);
				*pos += 1;
			}
		}
	}
	Ok(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::collections::HashMap;

	fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[rstest]
	#[case("input", "input", &[], true)]
	#[case("input", "select", &[], false)]
	#[case("*", "td", &[], true)]
	#[case("#errors", "div", &[("id", "errors")], true)]
	#[case("form#signup", "form", &[("id", "signup")], true)]
	#[case("form#signup", "div", &[("id", "signup")], false)]
	#[case(".expando.open", "div", &[("class", "open expando")], true)]
	#[case(".expando.open", "div", &[("class", "expando")], false)]
	#[case("[data-submit-url]", "form", &[("data-submit-url", "/x")], true)]
	#[case("input[type='submit'][form='f']", "input", &[("type", "submit"), ("form", "f")], true)]
	#[case("input[type='submit'][form='f']", "input", &[("type", "text"), ("form", "f")], false)]
	#[case("input[form=\"f\"]", "input", &[("form", "f")], true)]
	#[case("input[form=f]", "input", &[("form", "f")], true)]
	fn test_selector_matching(
		#[case] selector: &str,
		#[case] tag: &str,
		#[case] pairs: &[(&str, &str)],
		#[case] expected: bool,
	) {
		let parsed = Selector::parse(selector).unwrap();
		assert_eq!(parsed.matches(tag, attrs(pairs)), expected);
	}

	#[rstest]
	fn test_selector_groups() {
		let parsed = Selector::parse("input, select ,textarea").unwrap();

		assert!(parsed.matches("select", attrs(&[])));
		assert!(parsed.matches("textarea", attrs(&[])));
		assert!(!parsed.matches("button", attrs(&[])));
	}

	#[rstest]
	fn test_escaped_quote_in_value() {
		let parsed = Selector::parse(r"input[form='it\'s']").unwrap();

		assert!(parsed.matches("input", attrs(&[("form", "it's")])));
	}

	#[rstest]
	#[case("#pairings tr")]
	#[case("ul > li")]
	#[case("input,")]
	#[case("[name")]
	#[case("[name~=x]")]
	#[case("div:visible")]
	fn test_invalid_selectors(#[case] selector: &str) {
		assert!(matches!(
			Selector::parse(selector),
			Err(DomError::InvalidSelector { .. })
		));
	}
}
