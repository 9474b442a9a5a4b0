//! Geometry derived from the document's own styles
//!
//! A small block-layout model good enough to drive the engine without a
//! renderer: the page is a padding box of fixed size, zones stack top-down in
//! its content box with the footer pushed against the page bottom, flow
//! children stack inside their parent's content box, and absolute children
//! sit at `left`/`top` (or `right`/`bottom`) from their parent's origin.

use super::{BoxModel, GeometryProvider, Insets, Rect};
use crate::model::{BoxId, BoxKind, Document, NodeRef, PositionMode, Property, Style};

/// Geometry provider computing rectangles from styles alone
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleLayout;

impl StyleLayout {
    pub fn new() -> Self {
        Self
    }
}

impl GeometryProvider for StyleLayout {
    fn rect(&self, doc: &Document, node: NodeRef) -> Option<Rect> {
        match node {
            NodeRef::Page => {
                let style = doc.page_style();
                Some(Rect::new(
                    0.0,
                    0.0,
                    style.px_or_zero(Property::Width),
                    style.px_or_zero(Property::Height),
                ))
            }
            NodeRef::Box(id) => box_rect(doc, id),
        }
    }

    fn box_model(&self, doc: &Document, node: NodeRef) -> Option<BoxModel> {
        doc.style(node).map(box_model_of)
    }
}

fn padding_of(style: &Style) -> Insets {
    Insets::new(
        style.px_or_zero(Property::PaddingTop),
        style.px_or_zero(Property::PaddingRight),
        style.px_or_zero(Property::PaddingBottom),
        style.px_or_zero(Property::PaddingLeft),
    )
}

fn border_of(style: &Style) -> Insets {
    Insets::new(
        style.px_or_zero(Property::BorderTopWidth),
        style.px_or_zero(Property::BorderRightWidth),
        style.px_or_zero(Property::BorderBottomWidth),
        style.px_or_zero(Property::BorderLeftWidth),
    )
}

fn box_model_of(style: &Style) -> BoxModel {
    BoxModel {
        padding: padding_of(style),
        border: border_of(style),
        min_width: style.px_or_zero(Property::MinWidth),
        min_height: style.px_or_zero(Property::MinHeight),
    }
}

fn percent(style: &Style, property: Property) -> Option<f64> {
    let raw = style.get(property)?.trim();
    let number = raw.strip_suffix('%')?.trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_flow(position: PositionMode) -> bool {
    position != PositionMode::Absolute
}

/// Resolve a length against the container's extent. `None` means auto.
fn length(style: &Style, property: Property, extent: f64) -> Option<f64> {
    if let Some(p) = percent(style, property) {
        return Some(extent * p / 100.0);
    }
    style.px(property).filter(|_| !style.is_auto(property))
}

/// Border-box size of a box laid out inside `container` (a content box)
fn box_size(doc: &Document, id: BoxId, container: &Rect) -> Option<(f64, f64)> {
    let node = doc.get(id)?;
    let style = &node.style;
    let margins = style.px_or_zero(Property::MarginLeft) + style.px_or_zero(Property::MarginRight);

    let width = match length(style, Property::Width, container.width) {
        Some(w) => w,
        None if node.position == PositionMode::Absolute => 0.0,
        None => (container.width - margins).max(0.0),
    };
    let width = width.max(style.px_or_zero(Property::MinWidth));

    let height = match length(style, Property::Height, container.height) {
        Some(h) => h,
        None => {
            let model = box_model_of(style);
            let inner = Rect::new(
                0.0,
                0.0,
                (width - model.padding.horizontal() - model.border.horizontal()).max(0.0),
                0.0,
            );
            let content: f64 = node
                .children()
                .iter()
                .filter_map(|c| {
                    let child = doc.get(*c)?;
                    if !is_flow(child.position) {
                        return None;
                    }
                    let (_, h) = box_size(doc, *c, &inner)?;
                    Some(
                        child.style.px_or_zero(Property::MarginTop)
                            + h
                            + child.style.px_or_zero(Property::MarginBottom),
                    )
                })
                .sum();
            content + model.padding.vertical() + model.border.vertical()
        }
    };
    let height = height.max(style.px_or_zero(Property::MinHeight));

    Some((width, height))
}

fn box_rect(doc: &Document, id: BoxId) -> Option<Rect> {
    let node = doc.get(id)?;
    let parent = node.parent();
    let parent_rect = StyleLayout.rect(doc, parent)?;
    let parent_style = doc.style(parent)?;
    let content = parent_rect.inset(&padding_of(parent_style));
    let (width, height) = box_size(doc, id, &content)?;
    let style = &node.style;

    // Static position: stack after the preceding flow siblings
    let mut cursor = content.top;
    for sibling in doc.children(parent) {
        if *sibling == id {
            break;
        }
        let Some(s) = doc.get(*sibling) else { continue };
        if !is_flow(s.position) {
            continue;
        }
        let (_, h) = box_size(doc, *sibling, &content)?;
        cursor += s.style.px_or_zero(Property::MarginTop) + h + s.style.px_or_zero(Property::MarginBottom);
    }
    let flow_left = content.left + style.px_or_zero(Property::MarginLeft);
    let mut flow_top = cursor + style.px_or_zero(Property::MarginTop);

    if parent == NodeRef::Page && node.kind == BoxKind::Footer {
        let pinned = content.bottom() - height - style.px_or_zero(Property::MarginBottom);
        flow_top = flow_top.max(pinned);
    }

    let (left, top) = match node.position {
        PositionMode::Static => (flow_left, flow_top),
        PositionMode::Relative => (
            flow_left + style.px_or_zero(Property::Left),
            flow_top + style.px_or_zero(Property::Top),
        ),
        PositionMode::Absolute => {
            let left = if let Some(l) = style.px(Property::Left) {
                parent_rect.left + l
            } else if let Some(r) = style.px(Property::Right) {
                parent_rect.right() - r - width
            } else {
                flow_left
            };
            let top = if let Some(t) = style.px(Property::Top) {
                parent_rect.top + t
            } else if let Some(b) = style.px(Property::Bottom) {
                parent_rect.bottom() - b - height
            } else {
                flow_top
            };
            (left, top)
        }
    };

    Some(Rect::new(left, top, width, height))
}
