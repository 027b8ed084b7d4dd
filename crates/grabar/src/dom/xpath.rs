//! Absolute positional paths (`/html[1]/body[1]/div[2]`).
//!
//! Only the structural form produced by [`absolute_path`] is understood:
//! a leading `/`, then one `tag[index]` step per level, where the index is
//! 1-based among element siblings sharing that tag. `[1]` may be omitted.

use super::{Document, NodeId};
use crate::result::{GrabarError, GrabarResult};

/// Build the absolute path of an element from the document root
#[must_use]
pub fn absolute_path(doc: &Document, node: NodeId) -> String {
    let mut segments = Vec::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let Some(tag) = doc.tag_name(current) else {
            break;
        };
        segments.push(format!("/{tag}[{}]", same_tag_position(doc, current, tag)));
        cursor = doc.parent(current);
    }
    segments.reverse();
    segments.concat()
}

/// 1 + number of preceding element siblings with the same tag
fn same_tag_position(doc: &Document, node: NodeId, tag: &str) -> usize {
    let Some(parent) = doc.parent(node) else {
        return 1;
    };
    doc.element_children(parent)
        .take_while(|sibling| *sibling != node)
        .filter(|sibling| doc.tag_name(*sibling) == Some(tag))
        .count()
        + 1
}

/// Resolve an absolute path against the document
pub fn resolve(doc: &Document, path: &str) -> GrabarResult<Option<NodeId>> {
    let steps = parse(path)?;
    let mut current = doc.root();
    for (tag, index) in steps {
        let next = doc
            .element_children(current)
            .filter(|child| doc.tag_name(*child) == Some(tag.as_str()))
            .nth(index - 1);
        match next {
            Some(node) => current = node,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn parse(path: &str) -> GrabarResult<Vec<(String, usize)>> {
    let unsupported = || GrabarError::unsupported_selector(path);
    let rest = path.strip_prefix('/').ok_or_else(unsupported)?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(unsupported());
    }

    rest.split('/')
        .map(|step| {
            let (tag, index) = match step.split_once('[') {
                Some((tag, tail)) => {
                    let digits = tail.strip_suffix(']').ok_or_else(unsupported)?;
                    let index: usize = digits.parse().map_err(|_| unsupported())?;
                    (tag, index)
                }
                None => (step, 1),
            };
            let valid_tag = !tag.is_empty()
                && tag
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'));
            if !valid_tag || index == 0 {
                return Err(unsupported());
            }
            Ok((tag.to_ascii_lowercase(), index))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const PAGE: &str = "<html><body>\
        <div><p>a</p><span>s</span><p>b</p></div>\
        <div><p>c</p></div>\
        </body></html>";

    #[test]
    fn test_absolute_path_counts_same_tag_siblings_only() {
        let doc = Document::parse(PAGE).unwrap();
        let ps = doc.query_selector_all("p").unwrap();
        assert_eq!(absolute_path(&doc, ps[0]), "/html[1]/body[1]/div[1]/p[1]");
        assert_eq!(absolute_path(&doc, ps[1]), "/html[1]/body[1]/div[1]/p[2]");
        assert_eq!(absolute_path(&doc, ps[2]), "/html[1]/body[1]/div[2]/p[1]");
    }

    #[test]
    fn test_every_element_resolves_to_itself() {
        let doc = Document::parse(PAGE).unwrap();
        for node in doc.elements() {
            let path = absolute_path(&doc, node);
            assert_eq!(resolve(&doc, &path).unwrap(), Some(node), "{path}");
        }
    }

    #[test]
    fn test_index_one_may_be_omitted() {
        let doc = Document::parse(PAGE).unwrap();
        let span = doc.query_selector("span").unwrap();
        assert_eq!(resolve(&doc, "/html/body/div/span").unwrap(), span);
    }

    #[test]
    fn test_out_of_range_is_none() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(resolve(&doc, "/html/body/div[3]").unwrap(), None);
    }

    #[test]
    fn test_rejects_non_structural_forms() {
        let doc = Document::parse(PAGE).unwrap();
        for bad in ["html/body", "//div", "/div[0]", "/div[x]", "/div[@id='a']", "/", ""] {
            assert!(resolve(&doc, bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_fragment_without_html_root() {
        let doc = Document::parse("<div><button>a</button><button>b</button></div>").unwrap();
        let second = doc.query_selector_all("button").unwrap()[1];
        let path = absolute_path(&doc, second);
        assert_eq!(path, "/div[1]/button[2]");
        assert_eq!(resolve(&doc, &path).unwrap(), Some(second));
    }
}
