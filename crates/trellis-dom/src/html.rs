//! HTML fragment parsing and serialization.
//!
//! Parsing goes through html5ever, so implied tags, misnested markup and
//! table fix-ups come out as a browser would build them. The parsed tree is
//! copied into the arena. Serialization is deterministic: lowercase tags,
//! attributes in stored order, double quotes.

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, Namespace, ParseOpts, QualName, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::document::{Document, VOID_TAGS};
use crate::error::DomError;
use crate::node::{NodeId, NodeType};

impl Document {
    /// Serialized children of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    /// Serialized `id` including its own tag.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Replace the children of `id` with nodes parsed from `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<(), DomError> {
        if !matches!(self.node_type(id), NodeType::Element | NodeType::Fragment) {
            return Err(DomError::NotContainer(id));
        }
        self.move_children(id, None)?;
        parse_into(self, id, html);
        Ok(())
    }

    /// Parse `html` into a new detached fragment.
    pub fn parse_fragment(&mut self, html: &str) -> NodeId {
        let fragment = self.create_fragment();
        parse_into(self, fragment, html);
        fragment
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.node_type(id) {
            NodeType::Text => {
                out.push_str(&html_escape::encode_text(self.text(id).unwrap_or_default()));
            }
            NodeType::Comment => {
                out.push_str("<!--");
                out.push_str(self.text(id).unwrap_or_default());
                out.push_str("-->");
            }
            NodeType::Fragment => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            NodeType::Element => {
                let tag = self.tag(id).unwrap_or_default();
                out.push('<');
                out.push_str(tag);
                for (name, value) in self.attributes(id) {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&tag) && !self.has_children(id) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Parse `html` as the content of `parent` and append the resulting nodes.
///
/// Parsing follows the HTML fragment algorithm with `parent`'s tag as the
/// context element, so markup comes out the way a browser's `innerHTML`
/// setter would build it.
pub(crate) fn parse_into(dom: &mut Document, parent: NodeId, html: &str) {
    let context = dom.tag(parent).unwrap_or("div").to_owned();
    let parsed = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(context.as_str())),
        Vec::new(),
    )
    .one(html);

    // the fragment parser wraps its output in a synthetic <html> element
    let top: Vec<Handle> = parsed
        .document
        .children
        .borrow()
        .iter()
        .flat_map(|wrapper| wrapper.children.borrow().clone())
        .collect();
    let mut imported = 0;
    for handle in &top {
        imported += import_node(dom, parent, handle);
    }
    tracing::trace!(target: "trellis::html", context = %context, imported, "fragment parsed");
}

/// Copy `handle` and its subtree under `parent`. Returns the node count.
fn import_node(dom: &mut Document, parent: NodeId, handle: &Handle) -> usize {
    let node = match &handle.data {
        NodeData::Text { contents } => dom.create_text(contents.borrow().to_string()),
        NodeData::Comment { contents } => dom.create_comment(contents.to_string()),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let element = dom.create_element(&name.local);
            for attr in attrs.borrow().iter() {
                let key = match &attr.name.prefix {
                    Some(prefix) => format!("{}:{}", &**prefix, &*attr.name.local),
                    None => attr.name.local.to_string(),
                };
                dom.set_attribute(element, &key, attr.value.to_string());
            }
            dom.link(parent, element, None);
            let children = match template_contents.borrow().as_ref() {
                Some(contents) => contents.children.borrow().clone(),
                None => handle.children.borrow().clone(),
            };
            return 1 + children
                .iter()
                .map(|child| import_node(dom, element, child))
                .sum::<usize>();
        }
        NodeData::Document
        | NodeData::Doctype { .. }
        | NodeData::ProcessingInstruction { .. } => return 0,
    };
    dom.link(parent, node, None);
    1
}
