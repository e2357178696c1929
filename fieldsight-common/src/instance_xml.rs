//! XForm instance parsing
//!
//! Flattens a submitted instance document into `path -> value` pairs. Paths are
//! the element names from the first level below the root down to the leaf,
//! joined with `/`.
//!
//! Repeated sibling elements share a path, so only the last one survives in a
//! [`ParsedInstance`]. Data collected inside repeat groups is lost here; callers
//! that need repeats must read the raw XML.

use crate::{Error, Result};
use roxmltree::{Document, Node};
use serde::Serialize;
use std::collections::BTreeMap;

/// Reserved key holding the root element's `id` attribute
pub const XFORM_ID_STRING: &str = "_xform_id_string";

/// Reserved key holding the root element's tag name
pub const INSTANCE_DOC_NAME: &str = "_name";

/// Path of the OpenRosa instance identifier inside the `meta` block
pub const INSTANCE_ID_PATH: &str = "meta/instanceID";

const SLASH: &str = "/";

/// Flat view of a submitted instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedInstance {
    fields: BTreeMap<String, Option<String>>,
}

impl ParsedInstance {
    /// Value recorded for `path`; `Some(None)` means an empty leaf
    pub fn get(&self, path: &str) -> Option<&Option<String>> {
        self.fields.get(path)
    }

    /// Text value for `path`, treating empty leaves and unknown paths alike
    pub fn text(&self, path: &str) -> Option<&str> {
        self.fields.get(path).and_then(|v| v.as_deref())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    /// Form id string taken from the root `id` attribute
    pub fn id_string(&self) -> &str {
        self.text(XFORM_ID_STRING).unwrap_or_default()
    }

    /// Root element name of the instance document
    pub fn root_name(&self) -> &str {
        self.text(INSTANCE_DOC_NAME).unwrap_or_default()
    }

    /// OpenRosa instance uuid with the `uuid:` prefix removed
    pub fn instance_uuid(&self) -> Option<&str> {
        self.text(INSTANCE_ID_PATH)
            .map(|id| id.strip_prefix("uuid:").unwrap_or(id))
            .filter(|id| !id.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<String>)> {
        self.fields.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, Option<String>> {
        self.fields
    }
}

impl FromIterator<(String, Option<String>)> for ParsedInstance {
    /// Later pairs overwrite earlier pairs with the same path
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Parse an XForm instance document into a [`ParsedInstance`]
///
/// # Errors
/// - [`Error::MalformedXml`] when the text is not well-formed XML
/// - [`Error::Validation`] unless the document carries exactly one attribute,
///   the root element's `id`
pub fn parse_xform_instance(xml: &str) -> Result<ParsedInstance> {
    let document = Document::parse(xml)?;
    let root = document.root_element();

    let mut parsed: ParsedInstance = path_value_pairs(root).into_iter().collect();

    let attributes = all_attributes(root);
    if attributes.len() != 1 {
        return Err(Error::Validation(format!(
            "There should be exactly one attribute in this document, found {}",
            attributes.len()
        )));
    }
    let id_string = root.attribute("id").ok_or_else(|| {
        Error::Validation("The root element must carry the form id attribute".to_string())
    })?;

    parsed
        .fields
        .insert(XFORM_ID_STRING.to_string(), Some(id_string.to_string()));
    parsed.fields.insert(
        INSTANCE_DOC_NAME.to_string(),
        Some(root.tag_name().name().to_string()),
    );

    Ok(parsed)
}

/// Depth-first `(path, value)` pairs below `root`, in document order
///
/// The root itself is excluded from every path. A root without element
/// children yields a single pair with an empty path.
pub fn path_value_pairs(root: Node<'_, '_>) -> Vec<(String, Option<String>)> {
    pairs_at(root, "")
}

fn pairs_at(node: Node<'_, '_>, path: &str) -> Vec<(String, Option<String>)> {
    let mut elements = node.children().filter(Node::is_element).peekable();

    if elements.peek().is_none() {
        // Leaf: comments and processing instructions are skipped, text is joined
        let text: String = node
            .children()
            .filter(Node::is_text)
            .filter_map(|child| child.text())
            .collect();
        let value = if text.is_empty() { None } else { Some(text) };
        return vec![(path.to_string(), value)];
    }

    // Internal node: text between child elements is formatting, not data
    elements
        .flat_map(|child| pairs_at(child, &join_path(path, child.tag_name().name())))
        .collect()
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        [parent, name].join(SLASH)
    }
}

/// Every attribute in the document as `(name, value)`
///
/// Namespace declarations are not attributes and are not counted.
fn all_attributes<'a>(root: Node<'a, '_>) -> Vec<(&'a str, &'a str)> {
    root.descendants()
        .filter(Node::is_element)
        .flat_map(|node| node.attributes().map(|a| (a.name(), a.value())))
        .collect()
}
