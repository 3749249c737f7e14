//! Parsing and validation of the client's XML responses.
//!
//! Every response is a `<vault>` document with a `<result>` element that
//! carries the outcome. Vault 3 reports it as an attribute
//! (`<result success="yes"/>`), Vault 4 and later as a child element
//! (`<result><success>true</success></result>`).

use std::borrow::Cow;

use xmltree::{Element, EmitterConfig, XMLNode};

use crate::{CommandResult, VaultError};

#[derive(Clone, Debug, PartialEq)]
/// A response document whose success envelope has been validated.
pub struct VaultResponse {
    root: Element,
}

impl VaultResponse {
    /// Returns the `<vault>` root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Consumes the response and returns the root element.
    pub fn into_root(self) -> Element {
        self.root
    }

    /// Follows a `/`-separated child path from the root, e.g. `"history/item"`.
    pub fn element(&self, path: &str) -> Option<&Element> {
        find(&self.root, path)
    }

    /// Returns all elements at `path` whose last segment names the element,
    /// e.g. `"folder/file"` yields every `<file>` under the first `<folder>`.
    pub fn elements<'a>(&'a self, path: &str) -> Vec<&'a Element> {
        let (parent, name) = match path.rsplit_once('/') {
            Some((parent, name)) => (find(&self.root, parent), name),
            None => (Some(&self.root), path),
        };
        parent
            .map(|parent| child_elements(parent, name).collect())
            .unwrap_or_default()
    }

    /// Renders the document as indented XML without a declaration.
    pub fn to_indented_string(&self) -> Result<String, VaultError> {
        let mut buf = Vec::new();
        let config = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false);
        self.root
            .write_with_config(&mut buf, config)
            .map_err(|err| VaultError::UnexpectedResponse(format!("failed to render XML: {err}")))?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Renders the document and returns its non-empty lines.
    pub fn lines(&self) -> Result<Vec<String>, VaultError> {
        Ok(self
            .to_indented_string()?
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Validates captured client output and returns the parsed document.
///
/// - non-empty stderr: [`VaultError::Invocation`] with the stderr text;
/// - output that is not XML: [`VaultError::MalformedResponse`];
/// - no success indicator: [`VaultError::UnexpectedResponse`];
/// - `no`/`false` outcome: [`VaultError::Rejected`] with the `<error>` text.
pub fn parse_response(result: &CommandResult) -> Result<VaultResponse, VaultError> {
    if !result.stderr.trim().is_empty() {
        return Err(VaultError::Invocation(result.stderr.clone()));
    }

    let raw = result.stdout.as_str();
    let root = Element::parse(raw.as_bytes())
        .map_err(|_| VaultError::MalformedResponse(raw.to_string()))?;
    if root.name != "vault" {
        return Err(VaultError::UnexpectedResponse(raw.to_string()));
    }

    let outcome = match success_indicator(&root) {
        Some(value) if !value.trim().is_empty() => value,
        _ => return Err(VaultError::UnexpectedResponse(raw.to_string())),
    };
    if is_failure(&outcome) {
        let message = root
            .get_child("error")
            .map(|el| inner_text(el).trim().to_string())
            .unwrap_or_default();
        return Err(VaultError::Rejected(message));
    }

    Ok(VaultResponse { root })
}

/// `result/@success` if present, otherwise the text of `result/success`.
fn success_indicator(root: &Element) -> Option<Cow<'_, str>> {
    let result = root.get_child("result")?;
    if let Some(value) = result.attributes.get("success") {
        return Some(Cow::Borrowed(value.as_str()));
    }
    result.get_child("success").map(|el| Cow::Owned(inner_text(el)))
}

fn is_failure(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("no") || value.eq_ignore_ascii_case("false")
}

fn find<'a>(root: &'a Element, path: &str) -> Option<&'a Element> {
    path.split('/')
        .filter(|seg| !seg.is_empty())
        .try_fold(root, |el, seg| el.get_child(seg))
}

fn child_elements<'a, 'n>(
    parent: &'a Element,
    name: &'n str,
) -> impl Iterator<Item = &'a Element> + use<'a, 'n> {
    parent.children.iter().filter_map(move |node| match node {
        XMLNode::Element(el) if el.name == name => Some(el),
        _ => None,
    })
}

/// Concatenated text of an element and all of its descendants.
pub(crate) fn inner_text(el: &Element) -> String {
    let mut out = String::new();
    collect_text(el, &mut out);
    out
}

fn collect_text(el: &Element, out: &mut String) {
    for node in &el.children {
        match node {
            XMLNode::Text(text) | XMLNode::CData(text) => out.push_str(text),
            XMLNode::Element(child) => collect_text(child, out),
            _ => {}
        }
    }
}

/// Attribute `name` if present, otherwise the text of child element `name`.
pub(crate) fn attribute_or_child(el: &Element, name: &str) -> Option<String> {
    if let Some(value) = el.attributes.get(name) {
        return Some(value.clone());
    }
    el.get_child(name).map(inner_text)
}
