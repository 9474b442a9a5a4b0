//! Page child order: header first, footer last, sections in between

use crate::geometry::GeometryProvider;
use crate::model::{BoxId, BoxKind, Document, NodeRef};

/// What [`ensure_order`] changed
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderReport {
    pub reordered: bool,
    pub changes: Vec<String>,
}

fn rank(kind: Option<BoxKind>) -> u8 {
    match kind {
        Some(BoxKind::Header) => 0,
        Some(BoxKind::Footer) => 2,
        _ => 1,
    }
}

/// Move the header to index 0 and the footer to the last index, keeping
/// everything else in its relative order. Idempotent.
pub fn ensure_order(doc: &mut Document) -> OrderReport {
    let before: Vec<BoxId> = doc.children(NodeRef::Page).to_vec();
    let mut after = before.clone();
    // stable: sections keep their relative order
    after.sort_by_key(|id| rank(doc.kind(*id)));

    if after == before {
        return OrderReport::default();
    }

    let mut changes = Vec::new();
    for (new_index, id) in after.iter().enumerate() {
        let old_index = before.iter().position(|b| b == id).unwrap_or(new_index);
        let is_zone = doc.kind(*id).map(|k| k.is_zone()).unwrap_or(false);
        if old_index != new_index && is_zone && rank(doc.kind(*id)) != 1 {
            let label = doc.get(*id).map(|n| n.label()).unwrap_or_default();
            changes.push(format!("{} moved from {} to {}", label, old_index, new_index));
        }
    }
    tracing::debug!(changes = ?changes, "page order restored");
    doc.set_page_order(after);

    OrderReport {
        reordered: true,
        changes,
    }
}

struct ZoneSpan {
    index: usize,
    kind: BoxKind,
    top: f64,
    bottom: f64,
}

/// Index in the page's child list where a zone dropped at `cursor_y`
/// (page-relative) should be inserted. `ignore` skips the zone being moved;
/// the returned index still counts it.
pub fn insertion_index(
    doc: &Document,
    geo: &impl GeometryProvider,
    cursor_y: f64,
    ignore: Option<BoxId>,
) -> usize {
    let children = doc.children(NodeRef::Page);
    let page_top = geo.rect(doc, NodeRef::Page).map(|r| r.top).unwrap_or(0.0);

    let mut zones: Vec<ZoneSpan> = children
        .iter()
        .enumerate()
        .filter(|(_, id)| Some(**id) != ignore)
        .filter_map(|(index, id)| {
            let kind = doc.kind(*id).filter(|k| k.is_zone())?;
            let rect = geo.rect(doc, (*id).into())?;
            Some(ZoneSpan {
                index,
                kind,
                top: rect.top - page_top,
                bottom: rect.bottom() - page_top,
            })
        })
        .collect();
    if zones.is_empty() {
        return 0;
    }
    zones.sort_by(|a, b| a.top.total_cmp(&b.top));

    let footer_index = zones
        .iter()
        .find(|z| z.kind == BoxKind::Footer)
        .map(|z| z.index)
        .unwrap_or(children.len());

    for (i, current) in zones.iter().enumerate() {
        let next = zones.get(i + 1);

        if i == 0 && cursor_y < current.top {
            return match current.kind {
                BoxKind::Header => current.index + 1,
                _ => current.index,
            };
        }

        if cursor_y >= current.top && cursor_y <= current.bottom {
            return match current.kind {
                BoxKind::Footer => current.index,
                BoxKind::Header => current.index + 1,
                _ if cursor_y < (current.top + current.bottom) / 2.0 => current.index,
                _ => match next {
                    Some(n) if n.kind == BoxKind::Footer => n.index,
                    _ => current.index + 1,
                },
            };
        }

        if let Some(n) = next {
            if cursor_y > current.bottom && cursor_y < n.top {
                return n.index;
            }
        }
    }

    footer_index
}

/// Keep an insertion index after the header and not past the footer
pub fn validate_insertion_index(doc: &Document, proposed: usize) -> usize {
    let children = doc.children(NodeRef::Page);
    let position = |kind: BoxKind| children.iter().position(|id| doc.kind(*id) == Some(kind));

    if let Some(footer) = position(BoxKind::Footer) {
        if proposed > footer {
            return footer;
        }
    }
    if let Some(header) = position(BoxKind::Header) {
        if proposed <= header {
            return header + 1;
        }
    }
    proposed
}

/// Page-relative y of the insertion line drawn for `index`, `offset`
/// pixels outside the first or last zone, or mid-gap between neighbours
pub fn drop_indicator_y(doc: &Document, geo: &impl GeometryProvider, index: usize, offset: f64) -> Option<f64> {
    let children = doc.children(NodeRef::Page);
    let page = geo.rect(doc, NodeRef::Page)?;
    let rect_of = |id: &BoxId| geo.rect(doc, (*id).into()).map(|r| r.relative_to(page.origin()));

    if children.is_empty() {
        return geo.box_model(doc, NodeRef::Page).map(|m| m.padding.top);
    }
    if index == 0 {
        return children.first().and_then(rect_of).map(|r| r.top - offset);
    }
    if index >= children.len() {
        return children.last().and_then(rect_of).map(|r| r.bottom() + offset);
    }

    let prev = rect_of(&children[index - 1]);
    let next = rect_of(&children[index]);
    match (prev, next) {
        (Some(p), Some(n)) => Some(p.bottom() + (n.top - p.bottom()) / 2.0),
        (Some(p), None) => Some(p.bottom() + offset),
        (None, Some(n)) => Some(n.top - offset),
        (None, None) => None,
    }
}

/// Move a zone to the index computed by [`insertion_index`], which counts
/// the zone at its current position
pub fn move_zone_to(doc: &mut Document, id: BoxId, index: usize) -> bool {
    let Some(current) = doc.children(NodeRef::Page).iter().position(|c| *c == id) else {
        return doc.move_to(id, NodeRef::Page, Some(index));
    };
    let at = if current < index { index - 1 } else { index };
    if at == current {
        return false;
    }
    tracing::debug!(zone = %id, from = current, to = at, "zone moved");
    doc.move_to(id, NodeRef::Page, Some(at))
}
