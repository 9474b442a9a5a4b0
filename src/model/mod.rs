//! Box/zone document model
//!
//! The tree is an arena of boxes addressed by stable [`BoxId`]s. Parent and
//! child links are ids, never references, so a box can be re-homed between
//! zones without any ownership juggling. The page itself is not a box: it is
//! addressed as [`NodeRef::Page`] and owns only its style (size and padding)
//! and its ordered list of direct children.

pub mod style;

use std::collections::HashMap;
use std::fmt;

pub use style::{format_px, parse_px, Property, Style, StyleDelta, StyleValue, UnknownProperty};

/// Stable identifier of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxId(u32);

impl BoxId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BoxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the tree: the page root or a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Page,
    Box(BoxId),
}

impl NodeRef {
    pub fn as_box(&self) -> Option<BoxId> {
        match self {
            NodeRef::Page => None,
            NodeRef::Box(id) => Some(*id),
        }
    }
}

impl From<BoxId> for NodeRef {
    fn from(id: BoxId) -> Self {
        NodeRef::Box(id)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Page => f.write_str("page"),
            NodeRef::Box(id) => write!(f, "{}", id),
        }
    }
}

/// Part of a table structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TablePart {
    Table,
    RowGroup,
    Row,
    Cell,
}

/// What a box is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoxKind {
    Header,
    Footer,
    Section,
    Ordinary,
    TableStructure(TablePart),
}

impl BoxKind {
    /// Header, footer or section
    pub fn is_zone(&self) -> bool {
        matches!(self, BoxKind::Header | BoxKind::Footer | BoxKind::Section)
    }

    /// Header or footer: zones with their own coordinate frame
    pub fn is_edge_zone(&self) -> bool {
        matches!(self, BoxKind::Header | BoxKind::Footer)
    }

    pub fn is_table_cell(&self) -> bool {
        matches!(self, BoxKind::TableStructure(TablePart::Cell))
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoxKind::Header => "header",
            BoxKind::Footer => "footer",
            BoxKind::Section => "section",
            BoxKind::Ordinary => "box",
            BoxKind::TableStructure(TablePart::Table) => "table",
            BoxKind::TableStructure(TablePart::RowGroup) => "tbody",
            BoxKind::TableStructure(TablePart::Row) => "tr",
            BoxKind::TableStructure(TablePart::Cell) => "td",
        }
    }
}

/// CSS positioning scheme of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PositionMode {
    #[default]
    Static,
    Relative,
    Absolute,
}

impl PositionMode {
    /// Parse a CSS `position` keyword; `fixed` behaves as absolute here
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "static" => Some(PositionMode::Static),
            "relative" => Some(PositionMode::Relative),
            "absolute" | "fixed" => Some(PositionMode::Absolute),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PositionMode::Static => "static",
            PositionMode::Relative => "relative",
            PositionMode::Absolute => "absolute",
        }
    }
}

/// Natural size of an image, used for the resize aspect lock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub natural_width: f64,
    pub natural_height: f64,
}

impl ImageInfo {
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.natural_width > 0.0 && self.natural_height > 0.0 {
            Some(self.natural_width / self.natural_height)
        } else {
            None
        }
    }
}

/// A positioned rectangle in the document tree
#[derive(Debug, Clone)]
pub struct BoxNode {
    pub id: BoxId,
    pub kind: BoxKind,
    pub position: PositionMode,
    pub style: Style,
    pub name: Option<String>,
    pub image: Option<ImageInfo>,
    /// Number of repeat columns a section is split into (1 = no split)
    pub repeat_columns: u32,
    parent: NodeRef,
    children: Vec<BoxId>,
}

impl BoxNode {
    pub fn parent(&self) -> NodeRef {
        self.parent
    }

    pub fn children(&self) -> &[BoxId] {
        &self.children
    }

    /// Static box that carries explicit `left`/`top` offsets
    pub fn has_offsets(&self) -> bool {
        self.style.has(Property::Left) || self.style.has(Property::Top)
    }

    /// Label used in logs and tree dumps
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{}{} \"{}\"", self.kind.name(), self.id, name),
            None => format!("{}{}", self.kind.name(), self.id),
        }
    }
}

/// Everything needed to create a box
#[derive(Debug, Clone)]
pub struct BoxSpec {
    pub kind: BoxKind,
    pub position: PositionMode,
    pub style: Style,
    pub name: Option<String>,
    pub image: Option<ImageInfo>,
    pub repeat_columns: u32,
}

impl BoxSpec {
    pub fn new(kind: BoxKind) -> Self {
        let (position, style) = if kind.is_zone() {
            (
                PositionMode::Relative,
                Style::new().with(Property::Width, "100%"),
            )
        } else {
            (PositionMode::Static, Style::new())
        };
        Self {
            kind,
            position,
            style,
            name: None,
            image: None,
            repeat_columns: 1,
        }
    }

    pub fn header() -> Self {
        Self::new(BoxKind::Header)
    }

    pub fn footer() -> Self {
        Self::new(BoxKind::Footer)
    }

    pub fn section() -> Self {
        Self::new(BoxKind::Section)
    }

    pub fn ordinary() -> Self {
        Self::new(BoxKind::Ordinary)
    }

    pub fn table(part: TablePart) -> Self {
        Self::new(BoxKind::TableStructure(part))
    }

    /// Absolutely positioned ordinary box at `rect` (in its parent's frame)
    pub fn absolute(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self::ordinary()
            .with_position(PositionMode::Absolute)
            .with_px(Property::Left, left)
            .with_px(Property::Top, top)
            .with_px(Property::Width, width)
            .with_px(Property::Height, height)
    }

    pub fn with_position(mut self, position: PositionMode) -> Self {
        self.position = position;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_px(mut self, property: Property, value: f64) -> Self {
        self.style.set(property, format_px(value));
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_image(mut self, natural_width: f64, natural_height: f64) -> Self {
        self.image = Some(ImageInfo {
            natural_width,
            natural_height,
        });
        self
    }

    pub fn with_repeat_columns(mut self, columns: u32) -> Self {
        self.repeat_columns = columns.max(1);
        self
    }
}

/// The page and its box tree
#[derive(Debug, Clone)]
pub struct Document {
    page_style: Style,
    page_children: Vec<BoxId>,
    nodes: HashMap<BoxId, BoxNode>,
    next_id: u32,
}

impl Document {
    /// Create an empty page. The page style carries its size and padding.
    pub fn new(page_style: Style) -> Self {
        Self {
            page_style,
            page_children: Vec::new(),
            nodes: HashMap::new(),
            next_id: 1,
        }
    }

    /// Empty page of the given size with uniform padding
    pub fn with_page(width: f64, height: f64, padding: f64) -> Self {
        Self::new(
            Style::new()
                .with_px(Property::Width, width)
                .with_px(Property::Height, height)
                .with_px(Property::PaddingTop, padding)
                .with_px(Property::PaddingRight, padding)
                .with_px(Property::PaddingBottom, padding)
                .with_px(Property::PaddingLeft, padding),
        )
    }

    pub fn page_style(&self) -> &Style {
        &self.page_style
    }

    pub fn page_style_mut(&mut self) -> &mut Style {
        &mut self.page_style
    }

    pub fn get(&self, id: BoxId) -> Option<&BoxNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut BoxNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: BoxId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: BoxId) -> Option<BoxKind> {
        self.get(id).map(|n| n.kind)
    }

    /// Style of a node (the page style for [`NodeRef::Page`])
    pub fn style(&self, node: NodeRef) -> Option<&Style> {
        match node {
            NodeRef::Page => Some(&self.page_style),
            NodeRef::Box(id) => self.get(id).map(|n| &n.style),
        }
    }

    /// Ordered children of a node; empty for unknown boxes
    pub fn children(&self, node: NodeRef) -> &[BoxId] {
        match node {
            NodeRef::Page => &self.page_children,
            NodeRef::Box(id) => self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[]),
        }
    }

    pub fn parent(&self, id: BoxId) -> Option<NodeRef> {
        self.get(id).map(|n| n.parent)
    }

    /// Kind of a box's parent, `None` when the parent is the page
    pub fn parent_kind(&self, id: BoxId) -> Option<BoxKind> {
        self.parent(id)?.as_box().and_then(|p| self.kind(p))
    }

    pub fn index_in_parent(&self, id: BoxId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Append a new box under `parent`
    pub fn insert(&mut self, parent: NodeRef, spec: BoxSpec) -> Option<BoxId> {
        let at = self.children(parent).len();
        self.insert_at(parent, at, spec)
    }

    /// Insert a new box under `parent` at `index` (clamped to the child count)
    pub fn insert_at(&mut self, parent: NodeRef, index: usize, spec: BoxSpec) -> Option<BoxId> {
        if let NodeRef::Box(p) = parent {
            if !self.contains(p) {
                return None;
            }
        }
        let id = BoxId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            BoxNode {
                id,
                kind: spec.kind,
                position: spec.position,
                style: spec.style,
                name: spec.name,
                image: spec.image,
                repeat_columns: spec.repeat_columns.max(1),
                parent,
                children: Vec::new(),
            },
        );
        let list = self.children_mut(parent)?;
        let index = index.min(list.len());
        list.insert(index, id);
        Some(id)
    }

    /// Remove a box and its subtree. Returns every removed id.
    pub fn remove(&mut self, id: BoxId) -> Vec<BoxId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        if let Some(list) = self.children_mut(parent) {
            list.retain(|c| *c != id);
        }
        let removed = self.subtree(id);
        for r in &removed {
            self.nodes.remove(r);
        }
        removed
    }

    /// Re-home `id` under `parent`. `index` is a position in the destination
    /// list after `id` has been detached; `None` appends. Moving a box into
    /// its own subtree is refused.
    pub fn move_to(&mut self, id: BoxId, parent: NodeRef, index: Option<usize>) -> bool {
        if !self.contains(id) {
            return false;
        }
        if let NodeRef::Box(p) = parent {
            if !self.contains(p) || p == id || self.is_descendant_of(p, id) {
                return false;
            }
        }
        let Some(old_parent) = self.parent(id) else {
            return false;
        };
        if let Some(list) = self.children_mut(old_parent) {
            list.retain(|c| *c != id);
        }
        let Some(list) = self.children_mut(parent) else {
            return false;
        };
        let at = index.unwrap_or(list.len()).min(list.len());
        list.insert(at, id);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
        true
    }

    /// Replace the page's child order wholesale; the new order must be a
    /// permutation of the current one
    pub(crate) fn set_page_order(&mut self, order: Vec<BoxId>) {
        debug_assert_eq!(order.len(), self.page_children.len());
        self.page_children = order;
    }

    /// Apply a style delta to a box. A `position` keyword switches the box's
    /// position mode instead of landing in the style map.
    pub fn apply_delta(&mut self, id: BoxId, delta: &StyleDelta) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        node.style.apply(delta);
        if let Some(StyleValue::Keyword(keyword)) = delta.get(Property::Position) {
            if let Some(mode) = PositionMode::from_keyword(keyword) {
                node.position = mode;
            }
        }
        node.style.remove(Property::Position);
        true
    }

    /// The header zone, if present
    pub fn header(&self) -> Option<BoxId> {
        self.first_page_child(BoxKind::Header)
    }

    /// The footer zone, if present
    pub fn footer(&self) -> Option<BoxId> {
        self.first_page_child(BoxKind::Footer)
    }

    /// Sections in page order
    pub fn sections(&self) -> Vec<BoxId> {
        self.page_children
            .iter()
            .copied()
            .filter(|id| self.kind(*id) == Some(BoxKind::Section))
            .collect()
    }

    /// All zones (header, sections, footer) in page order
    pub fn zones(&self) -> Vec<BoxId> {
        self.page_children
            .iter()
            .copied()
            .filter(|id| self.kind(*id).map(|k| k.is_zone()).unwrap_or(false))
            .collect()
    }

    fn first_page_child(&self, kind: BoxKind) -> Option<BoxId> {
        self.page_children
            .iter()
            .copied()
            .find(|id| self.kind(*id) == Some(kind))
    }

    /// Ancestors of a box, nearest first, ending before the page
    pub fn ancestors(&self, id: BoxId) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(NodeRef::Box(p)) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    pub fn is_descendant_of(&self, id: BoxId, ancestor: BoxId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Nearest ancestor that is a zone root (header, footer or section)
    pub fn zone_root(&self, id: BoxId) -> Option<BoxId> {
        self.ancestors(id)
            .into_iter()
            .find(|a| self.kind(*a).map(|k| k.is_zone()).unwrap_or(false))
    }

    /// A box and all its descendants, preorder
    pub fn subtree(&self, id: BoxId) -> Vec<BoxId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                out.push(current);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every box in document order
    pub fn iter(&self) -> impl Iterator<Item = &BoxNode> + '_ {
        self.page_children
            .iter()
            .flat_map(move |id| self.subtree(*id))
            .filter_map(move |id| self.get(id))
    }

    /// Find a box by name
    pub fn find(&self, name: &str) -> Option<BoxId> {
        self.iter()
            .find(|n| n.name.as_deref() == Some(name))
            .map(|n| n.id)
    }

    fn children_mut(&mut self, node: NodeRef) -> Option<&mut Vec<BoxId>> {
        match node {
            NodeRef::Page => Some(&mut self.page_children),
            NodeRef::Box(id) => self.nodes.get_mut(&id).map(|n| &mut n.children),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_style(f: &mut fmt::Formatter<'_>, style: &Style) -> fmt::Result {
            let parts: Vec<String> = style.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            write!(f, "{{{}}}", parts.join(", "))
        }

        fn write_node(doc: &Document, f: &mut fmt::Formatter<'_>, id: BoxId, depth: usize) -> fmt::Result {
            let Some(node) = doc.get(id) else {
                return Ok(());
            };
            write!(f, "{}{} {} ", "  ".repeat(depth), node.label(), node.position.name())?;
            write_style(f, &node.style)?;
            writeln!(f)?;
            for child in &node.children {
                write_node(doc, f, *child, depth + 1)?;
            }
            Ok(())
        }

        write!(f, "page ")?;
        write_style(f, &self.page_style)?;
        writeln!(f)?;
        for id in &self.page_children {
            write_node(self, f, *id, 1)?;
        }
        Ok(())
    }
}
