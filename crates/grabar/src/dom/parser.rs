//! Forgiving HTML snapshot parser.
//!
//! Covers what page snapshots contain in practice: tags, attributes,
//! comments, doctype, void and raw-text elements, and character references.
//! Mis-nested markup is repaired the way browsers do for the common cases
//! (implicitly closed `<p>`, `<li>`, `<option>`, table cells); anything
//! more exotic is kept as written.

use std::collections::HashSet;

use super::{Document, NodeId};
use crate::result::{GrabarError, GrabarResult};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Contents kept verbatim, no markup inside
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Contents kept as text, character references decoded
const RCDATA_TAGS: &[&str] = &["textarea", "title"];

/// Parse an HTML snapshot into a [`Document`]
pub fn parse_html(html: &str) -> GrabarResult<Document> {
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            let end = find_subslice(bytes, i + 4, b"-->")
                .ok_or_else(|| GrabarError::html_parse("unclosed HTML comment"))?;
            let parent = current(&stack);
            doc.append_comment(parent, &html[i + 4..end]);
            i = end + 3;
            continue;
        }

        if starts_with_at(bytes, i, b"<!") || starts_with_at(bytes, i, b"<?") {
            // doctype and processing instructions
            let end = find_byte(bytes, i, b'>')
                .ok_or_else(|| GrabarError::html_parse("unclosed declaration"))?;
            i = end + 1;
            continue;
        }

        if bytes[i] == b'<' && starts_with_at(bytes, i, b"</") {
            let (tag, next) = parse_end_tag(html, i)?;
            i = next;
            close_element(&doc, &mut stack, &tag);
            continue;
        }

        if bytes[i] == b'<' && bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic) {
            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            close_implied(&doc, &mut stack, &tag);
            let parent = current(&stack);
            let node = doc.append_element(parent, &tag, attrs);

            if RAW_TEXT_TAGS.contains(&tag.as_str()) || RCDATA_TAGS.contains(&tag.as_str()) {
                let close = find_end_tag_ci(bytes, i, tag.as_bytes()).unwrap_or(bytes.len());
                let body = &html[i..close];
                if !body.is_empty() {
                    if RCDATA_TAGS.contains(&tag.as_str()) {
                        doc.append_text(node, decode_character_references(body));
                    } else {
                        doc.append_text(node, body);
                    }
                }
                i = close;
                if i < bytes.len() {
                    let (_, after) = parse_end_tag(html, i)?;
                    i = after;
                }
                continue;
            }

            if !self_closing && !VOID_TAGS.contains(&tag.as_str()) {
                stack.push(node);
            }
            continue;
        }

        // text up to the next tag opener; a lone '<' is text
        let start = i;
        i += 1;
        while i < bytes.len() && !is_markup_start(bytes, i) {
            i += 1;
        }
        let text = &html[start..i];
        if !text.is_empty() {
            let parent = current(&stack);
            doc.append_text(parent, decode_character_references(text));
        }
    }

    Ok(doc)
}

fn current(stack: &[NodeId]) -> NodeId {
    stack.last().copied().unwrap_or(NodeId(0))
}

fn is_markup_start(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'<'
        && bytes
            .get(i + 1)
            .is_some_and(|b| b.is_ascii_alphabetic() || matches!(*b, b'/' | b'!' | b'?'))
}

/// Pop up to and including the nearest open element with this tag.
/// End tags with no open counterpart are dropped.
fn close_element(doc: &Document, stack: &mut Vec<NodeId>, tag: &str) {
    let Some(pos) = stack
        .iter()
        .rposition(|node| doc.tag_name(*node) == Some(tag))
    else {
        return;
    };
    stack.truncate(pos.max(1));
}

fn close_implied(doc: &Document, stack: &mut Vec<NodeId>, opening: &str) {
    let closes: &[&str] = match opening {
        "li" => &["li"],
        "option" => &["option"],
        "dt" | "dd" => &["dt", "dd"],
        "tr" => &["tr", "td", "th"],
        "td" | "th" => &["td", "th"],
        "p" | "div" | "ul" | "ol" | "table" | "form" | "section" | "h1" | "h2" | "h3" | "h4"
        | "h5" | "h6" => &["p"],
        _ => return,
    };
    while stack.len() > 1 {
        let top = current(stack);
        match doc.tag_name(top) {
            Some(tag) if closes.contains(&tag) => {
                stack.pop();
            }
            _ => break,
        }
    }
}

fn parse_start_tag(
    html: &str,
    at: usize,
) -> GrabarResult<(String, Vec<(String, String)>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 1;

    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();

    let mut attrs: Vec<(String, String)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut self_closing = false;

    loop {
        skip_ws(bytes, &mut i);
        if i >= bytes.len() {
            return Err(GrabarError::html_parse(format!("unclosed <{tag}> tag")));
        }

        match bytes[i] {
            b'>' => {
                i += 1;
                break;
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                self_closing = true;
                i += 2;
                break;
            }
            b'/' => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len() && is_attr_name_char(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            // stray character such as a quote; skip it
            i += 1;
            continue;
        }
        let name = html[name_start..i].to_ascii_lowercase();

        skip_ws(bytes, &mut i);
        let value = if bytes.get(i) == Some(&b'=') {
            i += 1;
            skip_ws(bytes, &mut i);
            parse_attr_value(html, &mut i)?
        } else {
            String::new()
        };

        // first occurrence wins
        if seen.insert(name.clone()) {
            attrs.push((name, value));
        }
    }

    Ok((tag, attrs, self_closing, i))
}

fn parse_attr_value(html: &str, i: &mut usize) -> GrabarResult<String> {
    let bytes = html.as_bytes();
    match bytes.get(*i) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            *i += 1;
            let start = *i;
            let end = find_byte(bytes, start, quote)
                .ok_or_else(|| GrabarError::html_parse("unterminated attribute value"))?;
            *i = end + 1;
            Ok(decode_character_references(&html[start..end]))
        }
        Some(_) => {
            let start = *i;
            while *i < bytes.len() && !bytes[*i].is_ascii_whitespace() && bytes[*i] != b'>' {
                *i += 1;
            }
            Ok(decode_character_references(&html[start..*i]))
        }
        None => Err(GrabarError::html_parse("missing attribute value")),
    }
}

fn parse_end_tag(html: &str, at: usize) -> GrabarResult<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = at + 2;
    skip_ws(bytes, &mut i);
    let tag_start = i;
    while i < bytes.len() && is_tag_char(bytes[i]) {
        i += 1;
    }
    let tag = html[tag_start..i].to_ascii_lowercase();
    let end = find_byte(bytes, i, b'>')
        .ok_or_else(|| GrabarError::html_parse(format!("unclosed </{tag}> tag")))?;
    Ok((tag, end + 1))
}

/// Decode named and numeric character references.
/// Unknown references are left as written.
fn decode_character_references(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
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

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = if let Some(hex) = num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            u32::from_str_radix(hex, 16).ok()?
        } else {
            num.parse::<u32>().ok()?
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('\u{a9}'),
        _ => None,
    }
}

fn starts_with_at(bytes: &[u8], i: usize, needle: &[u8]) -> bool {
    bytes.get(i..i + needle.len()) == Some(needle)
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|p| from + p)
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn find_end_tag_ci(bytes: &[u8], from: usize, tag: &[u8]) -> Option<usize> {
    let mut i = from;
    while let Some(lt) = find_subslice(bytes, i, b"</") {
        let name = bytes.get(lt + 2..lt + 2 + tag.len())?;
        if name.eq_ignore_ascii_case(tag)
            && !bytes
                .get(lt + 2 + tag.len())
                .is_some_and(|b| is_tag_char(*b))
        {
            return Some(lt);
        }
        i = lt + 2;
    }
    None
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

const fn is_tag_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

const fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'"' | b'\'' | b'<')
}
