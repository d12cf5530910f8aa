//! Minimal HTML fragment parser for the in-memory document.
//!
//! Handles well-formed markup: elements with quoted, unquoted or boolean
//! attributes, void and self-closing elements, text, comments and doctype.
//! Whitespace-only text between tags is dropped. Entity decoding covers the
//! five XML entities and numeric references.

use crate::error::DomError;

/// A parsed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
	/// An element with its attributes (in source order) and children.
	Element {
		/// Lowercase tag name.
		tag: String,
		/// Attributes as `(name, value)` pairs.
		attrs: Vec<(String, String)>,
		/// Child nodes.
		children: Vec<HtmlNode>,
	},
	/// A text node.
	Text(String),
}

const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Returns true for elements that never have children.
pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

struct OpenElement {
	tag: String,
	attrs: Vec<(String, String)>,
	children: Vec<HtmlNode>,
}

/// Parses a fragment into top-level nodes.
pub fn parse_fragment(source: &str) -> Result<Vec<HtmlNode>, DomError> {
	let bytes = source.as_bytes();
	let mut pos = 0;
	let mut roots: Vec<HtmlNode> = Vec::new();
	let mut stack: Vec<OpenElement> = Vec::new();

	fn push_node(stack: &mut [OpenElement], roots: &mut Vec<HtmlNode>, node: HtmlNode) {
		match stack.last_mut() {
			Some(parent) => parent.children.push(node),
			None => roots.push(node),
		}
	}

	while pos < bytes.len() {
		if source[pos..].starts_with("<!--") {
			let end = source[pos..].find("-->").ok_or_else(|| markup(pos, "unterminated comment"))?;
			pos += end + 3;
		} else if source[pos..].starts_with("<!") {
			let end = source[pos..].find('>').ok_or_else(|| markup(pos, "unterminated declaration"))?;
			pos += end + 1;
		} else if source[pos..].starts_with("</") {
			let end = source[pos..].find('>').ok_or_else(|| markup(pos, "unterminated end tag"))?;
			let tag = source[pos + 2..pos + end].trim().to_ascii_lowercase();
			let open = stack
				.pop()
				.ok_or_else(|| markup(pos, format!("unexpected end tag </{}>", tag)))?;
			if open.tag != tag {
				return Err(markup(
					pos,
					format!("end tag </{}> does not close <{}>", tag, open.tag),
				));
			}
			let node = HtmlNode::Element {
				tag: open.tag,
				attrs: open.attrs,
				children: open.children,
			};
			push_node(&mut stack, &mut roots, node);
			pos += end + 1;
		} else if bytes[pos] == b'<' {
			let (tag, attrs, self_closing, next) = parse_start_tag(source, pos)?;
			pos = next;
			if self_closing || is_void_element(&tag) {
				let node = HtmlNode::Element {
					tag,
					attrs,
					children: Vec::new(),
				};
				push_node(&mut stack, &mut roots, node);
			} else {
				stack.push(OpenElement {
					tag,
					attrs,
					children: Vec::new(),
				});
			}
		} else {
			let end = source[pos..].find('<').map_or(source.len(), |i| pos + i);
			let raw = &source[pos..end];
			if !raw.trim().is_empty() {
				push_node(&mut stack, &mut roots, HtmlNode::Text(decode_entities(raw)));
			}
			pos = end;
		}
	}

	if let Some(open) = stack.last() {
		return Err(markup(source.len(), format!("unclosed element <{}>", open.tag)));
	}

	Ok(roots)
}

fn markup(offset: usize, reason: impl Into<String>) -> DomError {
	DomError::Markup {
		offset,
		reason: reason.into(),
	}
}

type StartTag = (String, Vec<(String, String)>, bool, usize);

fn parse_start_tag(source: &str, start: usize) -> Result<StartTag, DomError> {
	let bytes = source.as_bytes();
	let mut pos = start + 1;

	let name_start = pos;
	while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'-') {
		pos += 1;
	}
	if pos == name_start {
		return Err(markup(start, "expected tag name"));
	}
	let tag = source[name_start..pos].to_ascii_lowercase();

	let mut attrs = Vec::new();
	loop {
		while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
			pos += 1;
		}
		match bytes.get(pos) {
			None => return Err(markup(start, format!("unterminated start tag <{}>", tag))),
			Some(b'>') => return Ok((tag, attrs, false, pos + 1)),
			Some(b'/') if bytes.get(pos + 1) == Some(&b'>') => {
				return Ok((tag, attrs, true, pos + 2));
			}
			Some(_) => {}
		}

		let attr_start = pos;
		while pos < bytes.len()
			&& !bytes[pos].is_ascii_whitespace()
			&& !matches!(bytes[pos], b'=' | b'>' | b'/')
		{
			pos += 1;
		}
		if pos == attr_start {
			return Err(markup(pos, "expected attribute name"));
		}
		let name = source[attr_start..pos].to_ascii_lowercase();

		if bytes.get(pos) != Some(&b'=') {
			attrs.push((name, String::new()));
			continue;
		}
		pos += 1;

		let value = match bytes.get(pos) {
			Some(&quote @ (b'"' | b'\'')) => {
				let close = source[pos + 1..]
					.find(quote as char)
					.ok_or_else(|| markup(pos, "unterminated attribute value"))?;
				let value = &source[pos + 1..pos + 1 + close];
				pos += close + 2;
				value
			}
			_ => {
				let value_start = pos;
				while pos < bytes.len() && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'>' {
					pos += 1;
				}
				&source[value_start..pos]
			}
		};
		attrs.push((name, decode_entities(value)));
	}
}

/// Decodes character references in text or attribute values.
pub fn decode_entities(raw: &str) -> String {
	if !raw.contains('&') {
		return raw.to_string();
	}

	let mut out = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(amp) = rest.find('&') {
		out.push_str(&rest[..amp]);
		rest = &rest[amp..];
		let decoded = rest.find(';').and_then(|semi| {
			let entity = &rest[1..semi];
			let ch = match entity {
				"amp" => Some('&'),
				"lt" => Some('<'),
				"gt" => Some('>'),
				"quot" => Some('"'),
				"apos" | "#39" => Some('\''),
				_ => entity
					.strip_prefix("#x")
					.and_then(|hex| u32::from_str_radix(hex, 16).ok())
					.or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
					.and_then(char::from_u32),
			};
			ch.map(|ch| (ch, semi))
		});
		match decoded {
			Some((ch, semi)) => {
				out.push(ch);
				rest = &rest[semi + 1..];
			}
			None => {
				out.push('&');
				rest = &rest[1..];
			}
		}
	}
	out.push_str(rest);
	out
}

/// Escapes text for serialization.
pub fn escape_text(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

/// Escapes an attribute value for serialization inside double quotes.
pub fn escape_attr(value: &str) -> String {
	escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<HtmlNode>) -> HtmlNode {
		HtmlNode::Element {
			tag: tag.to_string(),
			attrs: attrs
				.iter()
				.map(|(k, v)| (k.to_string(), v.to_string()))
				.collect(),
			children,
		}
	}

	#[rstest]
	fn test_parse_nested_elements_and_attributes() {
		let nodes = parse_fragment(
			r#"<form id="f" class='x'><input name=a disabled><p>Hi &amp; bye</p></form>"#,
		)
		.unwrap();

		assert_eq!(
			nodes,
			vec![element(
				"form",
				&[("id", "f"), ("class", "x")],
				vec![
					element("input", &[("name", "a"), ("disabled", "")], vec![]),
					element("p", &[], vec![HtmlNode::Text("Hi & bye".to_string())]),
				],
			)]
		);
	}

	#[rstest]
	fn test_parse_skips_comments_doctype_and_blank_text() {
		let nodes = parse_fragment("<!DOCTYPE html>\n<!-- note -->\n  <br/>\n  <span>x</span>").unwrap();

		assert_eq!(
			nodes,
			vec![
				element("br", &[], vec![]),
				element("span", &[], vec![HtmlNode::Text("x".to_string())]),
			]
		);
	}

	#[rstest]
	#[case("<div>", "unclosed element <div>")]
	#[case("<div></span>", "end tag </span> does not close <div>")]
	#[case("</div>", "unexpected end tag </div>")]
	#[case("<div id=\"x>", "unterminated attribute value")]
	fn test_parse_rejects_malformed_markup(#[case] source: &str, #[case] reason: &str) {
		match parse_fragment(source) {
			Err(DomError::Markup { reason: actual, .. }) => assert_eq!(actual, reason),
			other => panic!("expected markup error, got {:?}", other),
		}
	}

	#[rstest]
	#[case("a &lt;b&gt; &quot;c&quot;", "a <b> \"c\"")]
	#[case("&#39;&#x41;&#66;", "'AB")]
	#[case("fish & chips", "fish & chips")]
	#[case("&unknown;", "&unknown;")]
	fn test_decode_entities(#[case] raw: &str, #[case] expected: &str) {
		assert_eq!(decode_entities(raw), expected);
	}

	#[rstest]
	fn test_escape_attr() {
		assert_eq!(escape_attr(r#"a "b" <c> & d"#), "a &quot;b&quot; &lt;c&gt; &amp; d");
	}
}
