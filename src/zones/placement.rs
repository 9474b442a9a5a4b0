//! Zone membership and coordinate conversion on drop
//!
//! When a drag ends, the dropped box is reassigned to the zone under its
//! geometric center: header first, then footer, then the section containing
//! the center (or the first section). Header children are positioned from
//! the header's top-left corner, footer children from the footer's
//! bottom-left corner, section children from the section origin.

use crate::constraint::{clamp_in_footer, clamp_in_header, ZoneClamp};
use crate::geometry::{GeometryProvider, Point, Rect};
use crate::model::{BoxId, BoxKind, Document, NodeRef, Property, StyleDelta};

/// Which corner of a zone its children are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `left`/`top` from the top-left corner (header)
    TopLeft,
    /// `left`/`bottom` from the bottom-left corner (footer)
    BottomLeft,
}

/// Position of a box inside a zone frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPosition {
    pub left: f64,
    /// Distance from the anchored edge: `top` or `bottom`
    pub offset: f64,
}

/// A zone's coordinate frame, expressed against the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneFrame {
    /// Zone rectangle relative to the page origin
    pub zone: Rect,
    pub anchor: Anchor,
}

impl ZoneFrame {
    /// Frame of `zone` inside `page`; both rectangles in the same space
    pub fn new(page: &Rect, zone: &Rect, anchor: Anchor) -> Self {
        Self {
            zone: zone.relative_to(page.origin()),
            anchor,
        }
    }

    /// Frame of a header or footer box. `None` for other kinds or when the
    /// zone is not rendered.
    pub fn of(doc: &Document, geo: &impl GeometryProvider, zone: BoxId) -> Option<Self> {
        let anchor = match doc.kind(zone)? {
            BoxKind::Header => Anchor::TopLeft,
            BoxKind::Footer => Anchor::BottomLeft,
            _ => return None,
        };
        let page = geo.rect(doc, NodeRef::Page)?;
        let rect = geo.rect(doc, zone.into())?;
        Some(Self::new(&page, &rect, anchor))
    }

    /// Page-relative box rectangle to a position in this frame
    pub fn to_local(&self, rect: &Rect) -> LocalPosition {
        let left = rect.left - self.zone.left;
        let offset = match self.anchor {
            Anchor::TopLeft => rect.top - self.zone.top,
            Anchor::BottomLeft => self.zone.bottom() - rect.bottom(),
        };
        LocalPosition { left, offset }
    }

    /// Position in this frame back to a page-relative rectangle
    pub fn to_page(&self, local: LocalPosition, width: f64, height: f64) -> Rect {
        let top = match self.anchor {
            Anchor::TopLeft => self.zone.top + local.offset,
            Anchor::BottomLeft => self.zone.bottom() - local.offset - height,
        };
        Rect::new(self.zone.left + local.left, top, width, height)
    }

    /// Style placing a box at `local` in this frame, clearing the other
    /// vertical anchor and any margins
    pub fn style_for(&self, local: LocalPosition) -> StyleDelta {
        let delta = absolute_reset().px(Property::Left, local.left);
        match self.anchor {
            Anchor::TopLeft => delta.px(Property::Top, local.offset),
            Anchor::BottomLeft => delta.px(Property::Bottom, local.offset),
        }
    }
}

/// Clear offsets and margins and switch to absolute positioning
fn absolute_reset() -> StyleDelta {
    let mut delta = StyleDelta::new().keyword(Property::Position, "absolute");
    for p in Property::OFFSETS.into_iter().chain(Property::MARGINS) {
        delta = delta.remove(p);
    }
    delta
}

/// What a placement did to the box's zone membership
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// A zone was re-homed to the page and normalized
    Normalized,
    /// Stayed in its header or footer and was clamped there
    Stayed { zone: BoxId },
    /// Moved into a header or footer
    Entered { zone: BoxId },
    /// Assigned to a section, possibly after leaving a header or footer
    Assigned { section: BoxId, left: Option<BoxId> },
    /// Left a header or footer with no section to land in
    Detached { left: BoxId },
}

/// Plan produced by [`reclassify`]; see [`Document::apply_placement`]
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub id: BoxId,
    /// New parent
    pub target: NodeRef,
    pub delta: StyleDelta,
    pub transition: Transition,
    /// A zone bound stopped the box
    pub blocked: bool,
}

impl Placement {
    pub fn changes_parent(&self, doc: &Document) -> bool {
        doc.parent(self.id) != Some(self.target)
    }
}

/// Zone under a page-relative point, header winning over footer
pub fn zone_hover(doc: &Document, geo: &impl GeometryProvider, point: Point) -> Option<BoxId> {
    [doc.header(), doc.footer()]
        .into_iter()
        .flatten()
        .find(|zone| {
            geo.rect(doc, (*zone).into())
                .map(|r| r.contains(point))
                .unwrap_or(false)
        })
}

/// Style that makes a zone a full-width band of the page
pub fn zone_normalization() -> StyleDelta {
    StyleDelta::new()
        .keyword(Property::Position, "relative")
        .keyword(Property::Width, "100%")
        .px(Property::MarginLeft, 0.0)
        .px(Property::MarginRight, 0.0)
        .remove(Property::Left)
        .remove(Property::Top)
        .remove(Property::Right)
        .remove(Property::Bottom)
}

/// Clamp a box that stayed in the footer. A drag leaves it on `left`/`top`;
/// it goes back on `left`/`bottom` so it follows the page bottom.
fn clamp_to_footer_frame(
    doc: &Document,
    geo: &impl GeometryProvider,
    id: BoxId,
    footer: BoxId,
    rect: &Rect,
) -> Option<ZoneClamp> {
    let node = doc.get(id)?;
    if node.style.has(Property::Bottom) && !node.style.has(Property::Top) {
        return Some(clamp_in_footer(doc, geo, id, footer));
    }
    let frame = ZoneFrame::of(doc, geo, footer)?;
    let mut local = frame.to_local(rect);
    local.left = local.left.min((frame.zone.width - rect.width).max(0.0)).max(0.0);
    local.offset = local.offset.max(0.0);
    Some(ZoneClamp {
        delta: Some(frame.style_for(local)),
        blocked: false,
    })
}

/// Decide where a dropped box belongs and how its style must change.
///
/// Pure: nothing is mutated. `None` when the box or the geometry it needs
/// is missing, or when the box is table structure inside a table.
pub fn reclassify(
    doc: &Document,
    geo: &impl GeometryProvider,
    id: BoxId,
    force_override: bool,
) -> Option<Placement> {
    let node = doc.get(id)?;

    if node.kind.is_zone() {
        return Some(Placement {
            id,
            target: NodeRef::Page,
            delta: zone_normalization(),
            transition: Transition::Normalized,
            blocked: false,
        });
    }
    if matches!(node.kind, BoxKind::TableStructure(part) if part != crate::model::TablePart::Table) {
        return None;
    }

    let page = geo.rect(doc, NodeRef::Page)?;
    let rect = geo.rect(doc, id.into())?.relative_to(page.origin());
    let center = rect.center();

    let header = doc.header();
    let footer = doc.footer();
    let hovered = zone_hover(doc, geo, center);
    let current = doc.parent(id).and_then(|p| p.as_box());
    let current_edge_zone = current.filter(|p| Some(*p) == header || Some(*p) == footer);

    if let Some(zone) = hovered {
        let kind = doc.kind(zone)?;
        if current == Some(zone) {
            let clamp = match kind {
                BoxKind::Header => clamp_in_header(doc, geo, id, zone, force_override),
                _ => clamp_to_footer_frame(doc, geo, id, zone, &rect)?,
            };
            return Some(Placement {
                id,
                target: zone.into(),
                delta: clamp.delta.unwrap_or_default(),
                transition: Transition::Stayed { zone },
                blocked: clamp.blocked,
            });
        }
        let frame = ZoneFrame::of(doc, geo, zone)?;
        let local = frame.to_local(&rect);
        tracing::debug!(box_id = %id, zone = %zone, left = local.left, offset = local.offset, "entering zone");
        return Some(Placement {
            id,
            target: zone.into(),
            delta: frame.style_for(local),
            transition: Transition::Entered { zone },
            blocked: false,
        });
    }

    // Outside header and footer: land in the section under the center
    let sections = doc.sections();
    let section = sections
        .iter()
        .copied()
        .find(|s| {
            geo.rect(doc, (*s).into())
                .map(|r| r.relative_to(page.origin()).contains(center))
                .unwrap_or(false)
        })
        .or_else(|| sections.first().copied());

    match section {
        Some(section) => {
            let origin = geo.rect(doc, section.into())?.relative_to(page.origin()).origin();
            let local = rect.relative_to(origin);
            tracing::debug!(box_id = %id, section = %section, left = local.left, top = local.top, "assigned to section");
            Some(Placement {
                id,
                target: section.into(),
                delta: absolute_reset()
                    .px(Property::Left, local.left)
                    .px(Property::Top, local.top),
                transition: Transition::Assigned {
                    section,
                    left: current_edge_zone,
                },
                blocked: false,
            })
        }
        None => {
            let left = current_edge_zone?;
            tracing::debug!(box_id = %id, zone = %left, "left zone without a section to land in");
            Some(Placement {
                id,
                target: NodeRef::Page,
                delta: absolute_reset()
                    .px(Property::Left, rect.left)
                    .px(Property::Top, rect.top),
                transition: Transition::Detached { left },
                blocked: false,
            })
        }
    }
}

impl Document {
    /// Carry out a placement: re-home the box if needed, then apply its
    /// style. A zone already on the page keeps its index.
    pub fn apply_placement(&mut self, placement: &Placement) -> bool {
        if placement.changes_parent(self) && !self.move_to(placement.id, placement.target, None) {
            return false;
        }
        self.apply_delta(placement.id, &placement.delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StyleLayout;
    use crate::model::{BoxSpec, PositionMode};
    use pretty_assertions::assert_eq;

    fn three_zone_page() -> (Document, BoxId, BoxId, BoxId) {
        let mut doc = Document::with_page(600.0, 800.0, 0.0);
        let header = doc
            .insert(NodeRef::Page, BoxSpec::header().with_px(Property::Height, 100.0))
            .unwrap();
        let section = doc
            .insert(NodeRef::Page, BoxSpec::section().with_px(Property::Height, 400.0))
            .unwrap();
        let footer = doc
            .insert(NodeRef::Page, BoxSpec::footer().with_px(Property::Height, 100.0))
            .unwrap();
        (doc, header, section, footer)
    }

    #[test]
    fn test_frame_round_trip() {
        let page = Rect::new(0.0, 0.0, 600.0, 800.0);
        let footer = ZoneFrame::new(&page, &Rect::new(0.0, 700.0, 600.0, 100.0), Anchor::BottomLeft);
        let rect = Rect::new(40.0, 730.0, 50.0, 20.0);
        let local = footer.to_local(&rect);
        assert_eq!(local, LocalPosition { left: 40.0, offset: 50.0 });
        assert_eq!(footer.to_page(local, 50.0, 20.0), rect);
    }

    #[test]
    fn test_enter_header_converts_to_header_frame() {
        let (mut doc, header, section, _) = three_zone_page();
        // page-relative (30, 110), center inside the header after moving up
        let child = doc
            .insert(section.into(), BoxSpec::absolute(30.0, -60.0, 40.0, 20.0))
            .unwrap();
        let placement = reclassify(&doc, &StyleLayout, child, false).unwrap();
        assert_eq!(placement.transition, Transition::Entered { zone: header });
        assert_eq!(placement.delta.get_px(Property::Left), Some(30.0));
        assert_eq!(placement.delta.get_px(Property::Top), Some(40.0));

        assert!(doc.apply_placement(&placement));
        assert_eq!(doc.parent(child), Some(NodeRef::Box(header)));
        assert_eq!(
            StyleLayout.rect(&doc, child.into()),
            Some(Rect::new(30.0, 40.0, 40.0, 20.0))
        );
    }

    #[test]
    fn test_leave_footer_lands_in_section() {
        let (mut doc, _, section, footer) = three_zone_page();
        let child = doc
            .insert(
                footer.into(),
                BoxSpec::ordinary()
                    .with_position(PositionMode::Absolute)
                    .with_px(Property::Left, 10.0)
                    .with_px(Property::Bottom, 250.0)
                    .with_px(Property::Width, 40.0)
                    .with_px(Property::Height, 20.0),
            )
            .unwrap();
        // footer 700..800, so the box sits at top 530 on the page
        let placement = reclassify(&doc, &StyleLayout, child, false).unwrap();
        assert_eq!(
            placement.transition,
            Transition::Assigned {
                section,
                left: Some(footer)
            }
        );
        doc.apply_placement(&placement);
        let node = doc.get(child).unwrap();
        assert_eq!(node.style.get(Property::Bottom), None);
        assert_eq!(node.style.px(Property::Top), Some(430.0));
        assert_eq!(node.position, PositionMode::Absolute);
    }

    #[test]
    fn test_header_wins_when_zones_overlap() {
        let mut doc = Document::with_page(600.0, 150.0, 0.0);
        let header = doc
            .insert(NodeRef::Page, BoxSpec::header().with_px(Property::Height, 100.0))
            .unwrap();
        // pulled up over the header's lower half
        let footer = doc
            .insert(
                NodeRef::Page,
                BoxSpec::footer()
                    .with_px(Property::Height, 100.0)
                    .with_px(Property::Top, -50.0),
            )
            .unwrap();
        assert_eq!(zone_hover(&doc, &StyleLayout, Point::new(10.0, 75.0)), Some(header));
        assert_eq!(zone_hover(&doc, &StyleLayout, Point::new(10.0, 120.0)), Some(footer));
    }

    #[test]
    fn test_zone_drop_is_normalized() {
        let (mut doc, _, section, _) = three_zone_page();
        let nested = doc
            .insert(section.into(), BoxSpec::section().with_px(Property::Left, 40.0))
            .unwrap();
        let placement = reclassify(&doc, &StyleLayout, nested, false).unwrap();
        assert_eq!(placement.transition, Transition::Normalized);
        doc.apply_placement(&placement);
        assert_eq!(doc.parent(nested), Some(NodeRef::Page));
        let node = doc.get(nested).unwrap();
        assert_eq!(node.style.get(Property::Left), None);
        assert_eq!(node.style.get(Property::Width), Some("100%"));
        assert_eq!(node.position, PositionMode::Relative);
    }
}
