//! Arena-backed document tree.
//!
//! `Document` owns every node it creates. Structural methods mirror the
//! browser node API (append/insert-before/remove/replace, clone, split text)
//! and return `Result` where the browser would throw.

use std::cmp::Ordering;

use smol_str::SmolStr;

use crate::error::DomError;
use crate::node::{
    ElementData, NodeData, NodeId, NodeKind, NodeType, char_to_byte, parse_style, serialize_style,
};

/// Elements that never have children and serialize without a closing tag.
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Largest `colspan` honored, as in browsers.
pub const MAX_COL_SPAN: usize = 1000;

/// Largest `rowspan` honored, as in browsers.
pub const MAX_ROW_SPAN: usize = 65534;

/// An in-memory node tree.
#[derive(Clone, Debug, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document with a `contenteditable` root `<div>` holding `html`.
    ///
    /// Returns the document and the root element.
    pub fn from_html(html: &str) -> (Self, NodeId) {
        let mut dom = Self::new();
        let root = dom.create_element("div");
        dom.set_attribute(root, "contenteditable", "true");
        crate::html::parse_into(&mut dom, root, html);
        (dom, root)
    }

    /// Number of nodes ever allocated, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    // === Creation ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData::new(tag)))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    // === Node info ===

    pub fn node_type(&self, id: NodeId) -> NodeType {
        self.data(id).kind.node_type()
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Element(_))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Text(_))
    }

    /// Lowercase tag name, or `None` for non-elements.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Case-insensitive tag test.
    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.data(id).kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.data_mut(id).kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    // === Tree links ===

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.data(id).children
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.data(id).children.len()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.data(id).children.is_empty()
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child_at(parent, index + 1)
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child_at(parent, i))
    }

    /// Ancestors of `id`, nearest first. Does not include `id`.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            dom: self,
            next: self.parent(id),
        }
    }

    /// Descendants of `root` in pre-order. Does not include `root`.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: self.children(root).iter().rev().copied().collect(),
        }
    }

    /// Topmost ancestor of `id` (or `id` itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    // === Character data ===

    /// Data of a text or comment node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.data(id).kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Length in chars of a text or comment node, 0 otherwise.
    pub fn text_len(&self, id: NodeId) -> usize {
        self.text(id).map(|t| t.chars().count()).unwrap_or(0)
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        match &mut self.data_mut(id).kind {
            NodeKind::Text(t) | NodeKind::Comment(t) => {
                *t = text.into();
                Ok(())
            }
            _ => Err(DomError::NotCharacterData(id)),
        }
    }

    /// Concatenated text of all descendant text nodes, like `textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let NodeKind::Text(t) = &self.data(node).kind {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace all children with a single text node (elements), or set the
    /// data (text and comments).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let NodeKind::Text(t) | NodeKind::Comment(t) = &mut self.data_mut(id).kind {
            *t = text.to_string();
            return;
        }
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.link(id, node, None);
        }
    }

    // === Attributes and style ===

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Attributes in source order. Empty for non-elements.
    pub fn attributes(&self, id: NodeId) -> &[(SmolStr, String)] {
        self.element(id)
            .map(|e| e.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Set an attribute, keeping its position if it already exists.
    /// No-op on non-elements.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let Some(el) = self.element_mut(id) else {
            return;
        };
        let value = value.into();
        match el
            .attributes
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(index) => el.attributes[index].1 = value,
            None => el
                .attributes
                .push((SmolStr::new(name.to_ascii_lowercase()), value)),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        }
    }

    /// Value of one inline style property.
    pub fn style(&self, id: NodeId, property: &str) -> Option<String> {
        let style = self.attribute(id, "style")?;
        parse_style(style)
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
            .map(|(_, v)| v)
    }

    /// Set one inline style property. An empty value removes it.
    pub fn set_style(&mut self, id: NodeId, property: &str, value: &str) {
        if !self.is_element(id) {
            return;
        }
        let mut decls = self
            .attribute(id, "style")
            .map(parse_style)
            .unwrap_or_default();
        let value = value.trim();
        match decls
            .iter_mut()
            .position(|(k, _)| k.eq_ignore_ascii_case(property))
        {
            Some(index) if value.is_empty() => {
                decls.remove(index);
            }
            Some(index) => decls[index].1 = value.to_string(),
            None if value.is_empty() => {}
            None => decls.push((SmolStr::new(property.to_ascii_lowercase()), value.to_string())),
        }
        if decls.is_empty() {
            self.remove_attribute(id, "style");
        } else {
            self.set_attribute(id, "style", serialize_style(&decls));
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        self.set_style(id, property, "");
    }

    /// The `display` value: the inline style if present, else the tag default.
    ///
    /// Non-elements report `inline`.
    pub fn computed_display(&self, id: NodeId) -> SmolStr {
        let Some(tag) = self.tag(id) else {
            return SmolStr::new_static("inline");
        };
        match self.style(id, "display") {
            Some(display) => SmolStr::new(display.to_ascii_lowercase()),
            None => SmolStr::new_static(default_display(tag)),
        }
    }

    /// `colspan` attribute, defaulting to 1 and clamped to
    /// [`MAX_COL_SPAN`].
    pub fn col_span(&self, id: NodeId) -> usize {
        self.span_attribute(id, "colspan", MAX_COL_SPAN)
    }

    /// `rowspan` attribute, defaulting to 1 and clamped to
    /// [`MAX_ROW_SPAN`].
    pub fn row_span(&self, id: NodeId) -> usize {
        self.span_attribute(id, "rowspan", MAX_ROW_SPAN)
    }

    fn span_attribute(&self, id: NodeId, name: &str, max: usize) -> usize {
        self.attribute(id, name)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
            .map_or(1, |v| v.min(max))
    }

    // === Mutation ===

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`).
    ///
    /// A fragment is consumed: its children move, the fragment stays empty.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<NodeId, DomError> {
        if !matches!(
            self.node_type(parent),
            NodeType::Element | NodeType::Fragment
        ) || self.contains(child, parent)
        {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotFound {
                    parent,
                    node: reference,
                });
            }
            if reference == child {
                return Ok(child);
            }
        }
        if self.node_type(child) == NodeType::Fragment {
            for kid in self.children(child).to_vec() {
                self.link(parent, kid, reference);
            }
        } else {
            self.link(parent, child, reference);
        }
        Ok(child)
    }

    /// Insert `new_node` right after `node` under the same parent.
    pub fn insert_after(&mut self, node: NodeId, new_node: NodeId) -> Result<NodeId, DomError> {
        let parent = self.parent(node).ok_or(DomError::Detached(node))?;
        let next = self.next_sibling(node);
        self.insert_before(parent, new_node, next)
    }

    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let index = reference
            .and_then(|r| self.children(parent).iter().position(|&c| c == r))
            .unwrap_or(self.child_count(parent));
        self.data_mut(parent).children.insert(index, child);
        self.data_mut(child).parent = Some(parent);
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound {
                parent,
                node: child,
            });
        }
        self.detach(child);
        Ok(child)
    }

    /// Unlink `node` from its parent. No-op when already detached.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.data(node).parent {
            self.data_mut(parent).children.retain(|&c| c != node);
            self.data_mut(node).parent = None;
        }
    }

    /// Put `new_child` where `old_child` is and detach `old_child`.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<NodeId, DomError> {
        if self.parent(old_child) != Some(parent) {
            return Err(DomError::NotFound {
                parent,
                node: old_child,
            });
        }
        if new_child != old_child {
            self.insert_before(parent, new_child, Some(old_child))?;
            self.detach(old_child);
        }
        Ok(old_child)
    }

    /// Copy a node. Shallow copies keep attributes but not children.
    /// The copy is detached.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> NodeId {
        let kind = self.data(id).kind.clone();
        let copy = self.alloc(kind);
        if deep {
            for kid in self.children(id).to_vec() {
                let kid_copy = self.clone_node(kid, true);
                self.link(copy, kid_copy, None);
            }
        }
        copy
    }

    /// Split a text node at a char offset, like `Text.splitText`.
    ///
    /// `id` keeps the head; the returned node holds the tail and is placed
    /// right after `id` when it has a parent.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let NodeKind::Text(text) = &self.data(id).kind else {
            return Err(DomError::NotCharacterData(id));
        };
        if offset > text.chars().count() {
            return Err(DomError::IndexSize { node: id, offset });
        }
        let at = char_to_byte(text, offset);
        let tail = text[at..].to_string();
        if let NodeKind::Text(text) = &mut self.data_mut(id).kind {
            text.truncate(at);
        }
        let tail_node = self.create_text(tail);
        if let Some(parent) = self.parent(id) {
            let next = self.next_sibling(id);
            self.link(parent, tail_node, next);
        }
        Ok(tail_node)
    }

    /// Append the data of text node `right` to `left` and detach `right`.
    pub fn merge_text(&mut self, left: NodeId, right: NodeId) -> Result<(), DomError> {
        let NodeKind::Text(tail) = &self.data(right).kind else {
            return Err(DomError::NotCharacterData(right));
        };
        let tail = tail.clone();
        match &mut self.data_mut(left).kind {
            NodeKind::Text(head) => head.push_str(&tail),
            _ => return Err(DomError::NotCharacterData(left)),
        }
        self.detach(right);
        Ok(())
    }

    /// Move every child of `from` to the end of `to`, or detach them when
    /// `to` is `None`.
    pub fn move_children(&mut self, from: NodeId, to: Option<NodeId>) -> Result<(), DomError> {
        let kids = self.children(from).to_vec();
        match to {
            Some(to) => {
                for kid in kids {
                    self.append_child(to, kid)?;
                }
            }
            None => {
                for kid in kids {
                    self.detach(kid);
                }
            }
        }
        Ok(())
    }

    /// Wrap `node` in a new `tag` element placed where `node` was.
    pub fn wrap(&mut self, node: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let wrapper = self.create_element(tag);
        if let Some(parent) = self.parent(node) {
            self.insert_before(parent, wrapper, Some(node))?;
        }
        self.append_child(wrapper, node)?;
        Ok(wrapper)
    }

    // === Queries ===

    /// Inclusive containment, like `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Nearest node containing both `a` and `b`.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        std::iter::once(a)
            .chain(self.ancestors(a))
            .find(|&n| self.contains(n, b))
    }

    /// Pre-order comparison: an ancestor sorts before its descendants.
    ///
    /// Nodes in different trees compare by handle so the order stays total.
    pub fn compare_document_position(&self, a: NodeId, b: NodeId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let path_a = self.path_from_root(a);
        let path_b = self.path_from_root(b);
        if path_a[0] != path_b[0] {
            return a.cmp(&b);
        }
        let shared = path_a
            .iter()
            .zip(&path_b)
            .take_while(|(x, y)| x == y)
            .count();
        if shared == path_a.len() {
            return Ordering::Less;
        }
        if shared == path_b.len() {
            return Ordering::Greater;
        }
        let index_a = self.index_in_parent(path_a[shared]);
        let index_b = self.index_in_parent(path_b[shared]);
        index_a.cmp(&index_b)
    }

    fn path_from_root(&self, node: NodeId) -> Vec<NodeId> {
        let mut path: Vec<NodeId> = std::iter::once(node).chain(self.ancestors(node)).collect();
        path.reverse();
        path
    }

    /// First descendant of `root` with the given `id` attribute.
    pub fn element_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(root)
            .find(|&n| self.attribute(n, "id") == Some(id))
    }

    /// Descendants of `root` with the given tag, in document order.
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&n| self.has_tag(n, tag))
            .collect()
    }

    /// Nearest inclusive ancestor of `node` with one of `tags`, not leaving
    /// `root`.
    pub fn closest(&self, root: NodeId, node: NodeId, tags: &[&str]) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .take_while(|&n| n != root && self.contains(root, n))
            .find(|&n| tags.iter().any(|t| self.has_tag(n, t)))
    }
}

fn default_display(tag: &str) -> &'static str {
    match tag {
        "address" | "article" | "aside" | "blockquote" | "body" | "center" | "dd" | "details"
        | "dialog" | "dir" | "div" | "dl" | "dt" | "fieldset" | "figcaption" | "figure"
        | "footer" | "form" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hgroup"
        | "hr" | "html" | "main" | "menu" | "nav" | "ol" | "p" | "pre" | "section" | "summary"
        | "ul" => "block",
        "li" => "list-item",
        "table" => "table",
        "caption" => "table-caption",
        "colgroup" => "table-column-group",
        "col" => "table-column",
        "thead" => "table-header-group",
        "tbody" => "table-row-group",
        "tfoot" => "table-footer-group",
        "tr" => "table-row",
        "td" | "th" => "table-cell",
        "head" | "link" | "meta" | "script" | "style" | "template" | "title" => "none",
        _ => "inline",
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    dom: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.dom.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree, excluding its root.
pub struct Descendants<'a> {
    dom: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.dom.children(node).iter().rev().copied());
        Some(node)
    }
}
