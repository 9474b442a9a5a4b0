//! Clamping boxes back inside their logical container
//!
//! Every function here is a pure request: it reads the document and the
//! rendered geometry and answers with the style delta that would bring the
//! box back in bounds, or `None` when nothing needs to change. The caller
//! applies the delta, so a clamp never observes its own mutation.

use crate::geometry::{GeometryProvider, Rect};
use crate::model::{BoxId, BoxKind, Document, NodeRef, PositionMode, Property, StyleDelta};

/// Outcome of a zone-relative clamp
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ZoneClamp {
    pub delta: Option<StyleDelta>,
    /// The bottom bound stopped the box (header only, without override)
    pub blocked: bool,
}

/// Where a box's legal area comes from
fn container_bounds(doc: &Document, geo: &impl GeometryProvider, id: BoxId) -> Option<Rect> {
    match doc.zone_root(id) {
        Some(zone) => geo.content_box(doc, zone.into()),
        None => geo.content_box(doc, NodeRef::Page),
    }
}

/// Differences below this are float noise from earlier corrections
const EPSILON: f64 = 1e-6;

fn moved(delta: f64) -> bool {
    delta.abs() > EPSILON
}

/// Clamp `value` into `[min, max]`, preferring `min` when the range is empty
fn clamp_range(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Keep a box inside its container's content box.
///
/// Zone roots are clamped horizontally against the page content box and
/// keep their height. Ordinary boxes are clamped against the content box of
/// their nearest zone root (or the page). Table structure and children of a
/// header or footer are left alone.
pub fn clamp(doc: &Document, geo: &impl GeometryProvider, id: BoxId) -> Option<StyleDelta> {
    let node = doc.get(id)?;
    if matches!(node.kind, BoxKind::TableStructure(_)) {
        return None;
    }
    if doc.parent_kind(id).map(|k| k.is_edge_zone()).unwrap_or(false) {
        return None;
    }

    let rect = geo.rect(doc, id.into())?;
    let mut delta = StyleDelta::new();

    if node.kind.is_zone() {
        let bounds = geo.content_box(doc, NodeRef::Page)?;
        let width = rect.width.min(bounds.width.max(0.0));
        if rect.width - width > EPSILON {
            delta.set_px(Property::Width, width);
        }
        let left = clamp_range(rect.left, bounds.left, bounds.right() - width);
        let dx = left - rect.left;
        if moved(dx) {
            let margin = node.style.px_or_zero(Property::MarginLeft);
            delta.set_px(Property::MarginLeft, margin + dx);
        }
        tracing::trace!(box_id = %id, delta = %delta, "zone clamp");
        return delta.non_empty();
    }

    let bounds = container_bounds(doc, geo, id)?;
    let width = rect.width.min(bounds.width.max(0.0));
    let height = rect.height.min(bounds.height.max(0.0));
    if rect.width - width > EPSILON {
        delta.set_px(Property::Width, width);
    }
    if rect.height - height > EPSILON {
        delta.set_px(Property::Height, height);
    }

    let left = clamp_range(rect.left, bounds.left, bounds.right() - width);
    let dx = left - rect.left;
    let fits_vertically = bounds.height >= 0.0;
    let top = if fits_vertically {
        clamp_range(rect.top, bounds.top, bounds.bottom() - height)
    } else {
        rect.top
    };
    let dy = top - rect.top;

    let positioned = node.position != PositionMode::Static || node.has_offsets();
    if positioned {
        // an absolute box anchored by right/bottom has no left/top yet
        let (style_left, style_top) = if node.position == PositionMode::Absolute {
            let offset = geo.rect_relative(doc, id.into(), node.parent())?;
            (
                style_offset(doc, id, Property::Left, offset.left),
                style_offset(doc, id, Property::Top, offset.top),
            )
        } else {
            (
                node.style.px_or_zero(Property::Left),
                node.style.px_or_zero(Property::Top),
            )
        };
        if moved(dx) {
            delta.set_px(Property::Left, style_left + dx);
            if node.style.has(Property::Right) {
                delta = delta.remove(Property::Right);
            }
        }
        let next_top = if fits_vertically {
            moved(dy).then_some(style_top + dy)
        } else {
            // No room at all: only keep the box from sliding above its parent
            (style_top < 0.0).then_some(0.0)
        };
        if let Some(top) = next_top {
            delta.set_px(Property::Top, top);
            if node.style.has(Property::Bottom) {
                delta = delta.remove(Property::Bottom);
            }
        }
    } else {
        if moved(dx) {
            delta.set_px(Property::MarginLeft, node.style.px_or_zero(Property::MarginLeft) + dx);
        }
        if moved(dy) {
            delta.set_px(Property::MarginTop, node.style.px_or_zero(Property::MarginTop) + dy);
        }
    }

    if !delta.is_empty() {
        tracing::debug!(box_id = %id, delta = %delta, "clamped into container");
    }
    delta.non_empty()
}

/// Style offset of a box in its parent, falling back to the rendered offset
fn style_offset(doc: &Document, id: BoxId, property: Property, rendered: f64) -> f64 {
    doc.get(id)
        .and_then(|n| n.style.px(property))
        .unwrap_or(rendered)
}

/// Clamp a header child in the header's top-left frame.
///
/// `left ∈ [0, zoneW − w]`, `top ≥ 0`, and unless `force_override` is held,
/// `top ≤ zoneH − paddingBottom − h` (floored at 0), reported as blocked.
pub fn clamp_in_header(
    doc: &Document,
    geo: &impl GeometryProvider,
    id: BoxId,
    header: BoxId,
    force_override: bool,
) -> ZoneClamp {
    let (Some(rect), Some(zone)) = (
        geo.rect_relative(doc, id.into(), header.into()),
        geo.rect(doc, header.into()),
    ) else {
        return ZoneClamp::default();
    };
    let padding_bottom = geo
        .box_model(doc, header.into())
        .map(|m| m.padding.bottom)
        .unwrap_or(0.0);

    let left = style_offset(doc, id, Property::Left, rect.left);
    let top = style_offset(doc, id, Property::Top, rect.top);
    let mut delta = StyleDelta::new();
    let mut blocked = false;

    let max_left = (zone.width - rect.width).max(0.0);
    let next_left = clamp_range(left, 0.0, max_left);
    if moved(next_left - left) {
        delta.set_px(Property::Left, next_left);
    }

    let mut next_top = top.max(0.0);
    if !force_override {
        let max_top = zone.height - padding_bottom - rect.height;
        if next_top > max_top {
            next_top = max_top.max(0.0);
            blocked = true;
        }
    }
    if moved(next_top - top) {
        delta.set_px(Property::Top, next_top);
    }

    if blocked {
        tracing::debug!(box_id = %id, "header bottom bound reached");
    }
    ZoneClamp {
        delta: delta.non_empty(),
        blocked,
    }
}

/// Clamp a footer child in the footer's bottom-left frame.
///
/// `left ∈ [0, zoneW − w]` and `bottom ≥ 0`. The top is free so the box can
/// be dragged out of the footer upward.
pub fn clamp_in_footer(
    doc: &Document,
    geo: &impl GeometryProvider,
    id: BoxId,
    footer: BoxId,
) -> ZoneClamp {
    let (Some(rect), Some(zone)) = (
        geo.rect_relative(doc, id.into(), footer.into()),
        geo.rect(doc, footer.into()),
    ) else {
        return ZoneClamp::default();
    };

    let left = style_offset(doc, id, Property::Left, rect.left);
    let bottom = style_offset(doc, id, Property::Bottom, zone.height - rect.bottom());
    let mut delta = StyleDelta::new();

    let max_left = (zone.width - rect.width).max(0.0);
    let next_left = clamp_range(left, 0.0, max_left);
    if moved(next_left - left) {
        delta.set_px(Property::Left, next_left);
    }
    if bottom < 0.0 {
        delta.set_px(Property::Bottom, 0.0);
    }

    ZoneClamp {
        delta: delta.non_empty(),
        blocked: false,
    }
}

/// Clamp a box against whichever zone frame it lives in: the header or
/// footer frame for their children, the container clamp otherwise
pub fn clamp_in_zone(
    doc: &Document,
    geo: &impl GeometryProvider,
    id: BoxId,
    force_override: bool,
) -> ZoneClamp {
    let parent = doc.parent(id).and_then(|p| p.as_box());
    match parent.and_then(|p| doc.kind(p).map(|k| (p, k))) {
        Some((header, BoxKind::Header)) => clamp_in_header(doc, geo, id, header, force_override),
        Some((footer, BoxKind::Footer)) => clamp_in_footer(doc, geo, id, footer),
        _ => ZoneClamp {
            delta: clamp(doc, geo, id),
            blocked: false,
        },
    }
}
