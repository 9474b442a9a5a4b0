//! Gesture sessions
//!
//! A session is captured when a gesture starts and consumed when it ends.
//! Everything a later phase needs (start positions, the selection, the
//! last reported feedback) lives in the session, not in the engine.

use crate::constraint::{Handle, ResizeSession};
use crate::geometry::{GeometryProvider, Point};
use crate::model::{BoxId, BoxKind, Document, PositionMode, Property, StyleDelta, TablePart};

/// A box moved by the current drag and where it started, in its parent's
/// border-box frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMember {
    pub id: BoxId,
    pub start_left: f64,
    pub start_top: f64,
}

impl DragMember {
    fn capture(doc: &Document, geo: &impl GeometryProvider, id: BoxId) -> Option<Self> {
        let parent = doc.parent(id)?;
        let rect = geo.rect_relative(doc, id.into(), parent)?;
        Some(Self {
            id,
            start_left: rect.left,
            start_top: rect.top,
        })
    }

    /// Style placing the member `dx`/`dy` away from its start
    pub fn moved_by(&self, doc: &Document, dx: f64, dy: f64) -> StyleDelta {
        let mut delta = StyleDelta::new()
            .px(Property::Left, self.start_left + dx)
            .px(Property::Top, self.start_top + dy);
        if let Some(node) = doc.get(self.id) {
            if node.position != PositionMode::Absolute {
                delta = delta.keyword(Property::Position, "absolute");
            }
            for property in [Property::Right, Property::Bottom] {
                if node.style.has(property) {
                    delta = delta.remove(property);
                }
            }
        }
        delta
    }
}

/// What kind of box is being dragged
#[derive(Debug, Clone, PartialEq)]
pub enum DragKind {
    /// A header, footer or section being reordered on the page
    Zone { insertion: Option<usize> },
    /// Any other box, moved together with its selected companions
    Free {
        companions: Vec<DragMember>,
        hovered: Option<BoxId>,
    },
}

/// State of a drag from start to drop
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub id: BoxId,
    pub pointer_start: Point,
    pub member: DragMember,
    pub kind: DragKind,
}

impl DragSession {
    /// Capture a drag. Companions are the other selected boxes, minus zones
    /// and anything inside the dragged box. `None` when the box is missing
    /// or not rendered.
    pub fn begin(
        doc: &Document,
        geo: &impl GeometryProvider,
        id: BoxId,
        pointer: Point,
        selection: &[BoxId],
    ) -> Option<Self> {
        let node = doc.get(id)?;
        let member = DragMember::capture(doc, geo, id)?;
        let kind = if node.kind.is_zone() {
            DragKind::Zone { insertion: None }
        } else {
            let companions = selection
                .iter()
                .copied()
                .filter(|c| *c != id && !doc.is_descendant_of(*c, id))
                .filter(|c| doc.kind(*c).map(|k| !k.is_zone()).unwrap_or(false))
                .filter_map(|c| DragMember::capture(doc, geo, c))
                .collect();
            DragKind::Free {
                companions,
                hovered: None,
            }
        };
        tracing::debug!(box_id = %id, zone = node.kind.is_zone(), "drag started");
        Some(Self {
            id,
            pointer_start: pointer,
            member,
            kind,
        })
    }

    pub fn is_zone(&self) -> bool {
        matches!(self.kind, DragKind::Zone { .. })
    }

    /// Pointer travel since the drag started
    pub fn offset(&self, pointer: Point) -> (f64, f64) {
        (pointer.x - self.pointer_start.x, pointer.y - self.pointer_start.y)
    }

    /// Every box the drag moves: the dragged box first, then companions
    pub fn members(&self) -> Vec<DragMember> {
        let mut members = vec![self.member];
        if let DragKind::Free { companions, .. } = &self.kind {
            members.extend(companions.iter().copied());
        }
        members
    }

    pub fn ids(&self) -> Vec<BoxId> {
        self.members().iter().map(|m| m.id).collect()
    }

    /// Drop members that are no longer in the document. Returns false when
    /// the dragged box itself is gone.
    pub fn retain_live(&mut self, doc: &Document) -> bool {
        if let DragKind::Free { companions, hovered } = &mut self.kind {
            companions.retain(|c| doc.contains(c.id));
            if hovered.map(|h| !doc.contains(h)).unwrap_or(false) {
                *hovered = None;
            }
        }
        doc.contains(self.id)
    }
}

/// Resize in progress; the variant picks the constraint that applies
#[derive(Debug, Clone, PartialEq)]
pub enum ActiveResize {
    /// Zone height against its children (soft floor)
    Zone { id: BoxId, handle: Handle },
    /// Box inside a table cell, bounded by the cell
    TableCell { id: BoxId },
    /// Any other box, solved against its container
    Box(ResizeSession),
}

impl ActiveResize {
    pub fn id(&self) -> BoxId {
        match self {
            ActiveResize::Zone { id, .. } | ActiveResize::TableCell { id } => *id,
            ActiveResize::Box(session) => session.id,
        }
    }

    /// Pick the resize mode for a box. `None` when it cannot be resized:
    /// missing, table structure, not rendered, or a zone grabbed by a
    /// handle off its bottom edge.
    pub fn begin(doc: &Document, geo: &impl GeometryProvider, id: BoxId, handle: Handle) -> Option<Self> {
        let kind = doc.kind(id)?;
        if kind.is_zone() {
            // zones only grow or shrink from their bottom edge
            if !handle.affects_bottom() {
                return None;
            }
            geo.rect(doc, id.into())?;
            return Some(ActiveResize::Zone { id, handle });
        }
        if matches!(kind, BoxKind::TableStructure(part) if part != TablePart::Table) {
            return None;
        }
        if doc.parent_kind(id).map(|k| k.is_table_cell()).unwrap_or(false) {
            return Some(ActiveResize::TableCell { id });
        }
        ResizeSession::begin(doc, geo, id, handle).map(ActiveResize::Box)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StyleLayout;
    use crate::model::{BoxSpec, NodeRef};

    #[test]
    fn test_begin_collects_companions() {
        let mut doc = Document::with_page(600.0, 800.0, 0.0);
        let section = doc.insert(NodeRef::Page, BoxSpec::section()).unwrap();
        let a = doc
            .insert(section.into(), BoxSpec::absolute(10.0, 20.0, 50.0, 50.0))
            .unwrap();
        let inner = doc.insert(a.into(), BoxSpec::ordinary()).unwrap();
        let b = doc
            .insert(section.into(), BoxSpec::absolute(100.0, 20.0, 50.0, 50.0))
            .unwrap();

        let session = DragSession::begin(
            &doc,
            &StyleLayout,
            a,
            Point::new(30.0, 40.0),
            &[a, inner, b, section],
        )
        .unwrap();
        assert_eq!(session.ids(), vec![a, b]);
        assert_eq!(session.member.start_left, 10.0);
        assert_eq!(session.offset(Point::new(35.0, 30.0)), (5.0, -10.0));
    }

    #[test]
    fn test_moved_by_switches_flow_box_to_absolute() {
        let mut doc = Document::with_page(600.0, 800.0, 0.0);
        let section = doc.insert(NodeRef::Page, BoxSpec::section()).unwrap();
        let flow = doc
            .insert(section.into(), BoxSpec::ordinary().with_px(Property::Height, 30.0))
            .unwrap();
        let member = DragMember::capture(&doc, &StyleLayout, flow).unwrap();
        let delta = member.moved_by(&doc, 5.0, 5.0);
        assert_eq!(delta.get_px(Property::Left), Some(5.0));
        assert_eq!(delta.get_px(Property::Top), Some(5.0));
        assert!(delta.get(Property::Position).is_some());
    }

    #[test]
    fn test_resize_mode_selection() {
        let mut doc = Document::with_page(600.0, 800.0, 0.0);
        let section = doc.insert(NodeRef::Page, BoxSpec::section()).unwrap();
        let table = doc.insert(section.into(), BoxSpec::table(TablePart::Table)).unwrap();
        let row = doc.insert(table.into(), BoxSpec::table(TablePart::Row)).unwrap();
        let cell = doc.insert(row.into(), BoxSpec::table(TablePart::Cell)).unwrap();
        let image = doc.insert(cell.into(), BoxSpec::ordinary()).unwrap();
        let free = doc
            .insert(section.into(), BoxSpec::absolute(0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let geo = StyleLayout;

        assert!(matches!(
            ActiveResize::begin(&doc, &geo, section, Handle::BottomCenter),
            Some(ActiveResize::Zone { .. })
        ));
        assert_eq!(ActiveResize::begin(&doc, &geo, section, Handle::TopCenter), None);
        assert_eq!(ActiveResize::begin(&doc, &geo, section, Handle::CenterRight), None);
        assert_eq!(
            ActiveResize::begin(&doc, &geo, image, Handle::BottomRight),
            Some(ActiveResize::TableCell { id: image })
        );
        assert_eq!(ActiveResize::begin(&doc, &geo, cell, Handle::BottomRight), None);
        assert!(matches!(
            ActiveResize::begin(&doc, &geo, free, Handle::BottomRight),
            Some(ActiveResize::Box(_))
        ));
    }
}
