//! CSS selector subset used for locator uniqueness checks and re-resolution.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr=value]` (quoted or bare), descendant and child combinators, and
//! comma-separated groups. Identifiers may use CSS escapes (`\:`, `\31 `).

use super::{Document, NodeId};
use crate::result::{GrabarError, GrabarResult};

/// Attribute condition inside `[...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrCondition {
    /// `[name]`
    Exists(String),
    /// `[name="value"]`
    Equals(String, String),
}

/// One compound selector, e.g. `button.primary[type=submit]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Tag name, `None` for `*` or when omitted
    pub tag: Option<String>,
    /// `#id` parts
    pub ids: Vec<String>,
    /// `.class` parts
    pub classes: Vec<String>,
    /// `[...]` parts
    pub attrs: Vec<AttrCondition>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if element.tag_name() != tag {
                return false;
            }
        }
        if !self.ids.iter().all(|id| element.attribute("id") == Some(id)) {
            return false;
        }
        if !self
            .classes
            .iter()
            .all(|class| element.classes().any(|c| c == class))
        {
            return false;
        }
        self.attrs.iter().all(|cond| match cond {
            AttrCondition::Exists(name) => element.has_attribute(name),
            AttrCondition::Equals(name, value) => element.attribute(name) == Some(value.as_str()),
        })
    }
}

/// Relationship between a compound and the one to its left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
}

/// A chain of compounds, stored left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    parts: Vec<(Combinator, Compound)>,
}

impl ComplexSelector {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.matches_at(doc, node, self.parts.len() - 1)
    }

    fn matches_at(&self, doc: &Document, node: NodeId, index: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(doc, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => doc
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(doc, parent, index - 1)),
            Combinator::Descendant => doc
                .ancestors(node)
                .filter(|a| doc.is_element(*a))
                .any(|ancestor| self.matches_at(doc, ancestor, index - 1)),
        }
    }
}

/// Comma-separated selector groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    groups: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector string
    pub fn parse(selector: &str) -> GrabarResult<Self> {
        let mut groups = Vec::new();
        for group in split_groups(selector) {
            groups.push(parse_complex(group, selector)?);
        }
        if groups.is_empty() {
            return Err(GrabarError::unsupported_selector(selector));
        }
        Ok(Self { groups })
    }

    /// Whether the element matches any group
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.groups.iter().any(|g| g.matches(doc, node))
    }
}

/// Escape a string for use as a CSS identifier (`.class`, `#id`).
#[must_use]
pub fn escape_ident(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (i, c) in ident.chars().enumerate() {
        let leading_digit = c.is_ascii_digit()
            && (i == 0 || (i == 1 && ident.starts_with('-')));
        if leading_digit {
            out.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    out
}

/// Quote a string as a CSS attribute value
#[must_use]
pub fn quote_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Split on commas outside brackets and quotes
fn split_groups(selector: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;
    for (i, c) in selector.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (c, quote) {
            ('\\', _) => escaped = true,
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('[', None) => depth += 1,
            (']', None) => depth = depth.saturating_sub(1),
            (',', None) if depth == 0 => {
                groups.push(selector[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    groups.push(selector[start..].trim());
    groups.retain(|g| !g.is_empty());
    groups
}

fn parse_complex(group: &str, full: &str) -> GrabarResult<ComplexSelector> {
    let unsupported = || GrabarError::unsupported_selector(full);
    let chars: Vec<char> = group.chars().collect();
    let mut i = 0usize;
    let mut parts: Vec<(Combinator, Compound)> = Vec::new();
    let mut pending = Combinator::Descendant;

    loop {
        let had_ws = skip_ws(&chars, &mut i);
        if i >= chars.len() {
            break;
        }
        if chars[i] == '>' {
            if parts.is_empty() {
                return Err(unsupported());
            }
            pending = Combinator::Child;
            i += 1;
            continue;
        }
        if !parts.is_empty() && !had_ws && pending != Combinator::Child {
            return Err(unsupported());
        }

        let compound = parse_compound(&chars, &mut i).ok_or_else(unsupported)?;
        if compound.is_empty() && !matches!(chars.get(i.saturating_sub(1)), Some('*')) {
            return Err(unsupported());
        }
        parts.push((pending, compound));
        pending = Combinator::Descendant;
    }

    if parts.is_empty() || pending == Combinator::Child {
        return Err(unsupported());
    }
    Ok(ComplexSelector { parts })
}

fn parse_compound(chars: &[char], i: &mut usize) -> Option<Compound> {
    let mut compound = Compound::default();

    if chars.get(*i) == Some(&'*') {
        *i += 1;
    } else if chars.get(*i).is_some_and(|c| is_ident_start(*c)) {
        compound.tag = Some(parse_ident(chars, i)?.to_ascii_lowercase());
    }

    while let Some(&c) = chars.get(*i) {
        match c {
            '#' => {
                *i += 1;
                compound.ids.push(parse_ident(chars, i)?);
            }
            '.' => {
                *i += 1;
                compound.classes.push(parse_ident(chars, i)?);
            }
            '[' => {
                *i += 1;
                compound.attrs.push(parse_attr(chars, i)?);
            }
            c if c.is_whitespace() || c == '>' => break,
            _ => return None,
        }
    }
    Some(compound)
}

fn parse_attr(chars: &[char], i: &mut usize) -> Option<AttrCondition> {
    skip_ws(chars, i);
    let name = parse_ident(chars, i)?.to_ascii_lowercase();
    skip_ws(chars, i);
    match chars.get(*i)? {
        ']' => {
            *i += 1;
            Some(AttrCondition::Exists(name))
        }
        '=' => {
            *i += 1;
            skip_ws(chars, i);
            let value = match chars.get(*i)? {
                q @ ('"' | '\'') => parse_quoted(chars, i, *q)?,
                _ => parse_ident(chars, i)?,
            };
            skip_ws(chars, i);
            if chars.get(*i)? != &']' {
                return None;
            }
            *i += 1;
            Some(AttrCondition::Equals(name, value))
        }
        _ => None,
    }
}

fn parse_quoted(chars: &[char], i: &mut usize, quote: char) -> Option<String> {
    *i += 1;
    let mut out = String::new();
    while let Some(&c) = chars.get(*i) {
        *i += 1;
        if c == quote {
            return Some(out);
        }
        if c == '\\' {
            out.push(parse_escape(chars, i)?);
        } else {
            out.push(c);
        }
    }
    None
}

fn parse_ident(chars: &[char], i: &mut usize) -> Option<String> {
    let mut out = String::new();
    while let Some(&c) = chars.get(*i) {
        if c == '\\' {
            *i += 1;
            out.push(parse_escape(chars, i)?);
        } else if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
            *i += 1;
        } else {
            break;
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Decode the escape following a backslash (already consumed)
fn parse_escape(chars: &[char], i: &mut usize) -> Option<char> {
    let hex_len = chars[*i..]
        .iter()
        .take(6)
        .take_while(|c| c.is_ascii_hexdigit())
        .count();
    if hex_len == 0 {
        let c = *chars.get(*i)?;
        *i += 1;
        return Some(c);
    }
    let hex: String = chars[*i..*i + hex_len].iter().collect();
    *i += hex_len;
    if chars.get(*i).is_some_and(|c| c.is_whitespace()) {
        *i += 1;
    }
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '-' || c == '\\' || !c.is_ascii()
}

fn skip_ws(chars: &[char], i: &mut usize) -> bool {
    let start = *i;
    while chars.get(*i).is_some_and(|c| c.is_whitespace()) {
        *i += 1;
    }
    *i > start
}
