//! Zone height floors
//!
//! A zone may not be shrunk below the space its own children need: the
//! lowest child bottom (measured from the zone top) plus the zone's
//! `padding-bottom`. Holding the override modifier lets the user go below
//! that floor; the overflowing children are then only reported.

use crate::geometry::GeometryProvider;
use crate::model::{BoxId, Document};

/// A child that would be cut off at the requested height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowingBox {
    pub id: BoxId,
    /// How far the child (plus the safe margin) extends past the height
    pub amount: f64,
    /// Child bottom edge relative to the zone top
    pub bottom: f64,
}

/// Overflow state of a zone for a requested height
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverflowInfo {
    pub min_required_height: f64,
    pub overflowing: Vec<OverflowingBox>,
    pub would_overflow: bool,
}

impl OverflowInfo {
    pub fn count(&self) -> usize {
        self.overflowing.len()
    }

    /// The child closest to the cut, the one blocking the resize
    pub fn blocking(&self) -> Option<&OverflowingBox> {
        self.overflowing
            .iter()
            .max_by(|a, b| a.amount.total_cmp(&b.amount))
    }
}

/// Outcome of [`apply_soft_constraint`]
#[derive(Debug, Clone, PartialEq)]
pub struct SoftConstraint {
    pub final_height: f64,
    /// Snapped up to the floor
    pub was_constrained: bool,
    /// Below the floor because the override was held
    pub is_forced: bool,
    pub overflow: OverflowInfo,
}

/// Measure the direct children of `zone` against `target_height`.
/// A zone without rendered children needs no height.
pub fn detect_overflow(
    doc: &Document,
    geo: &impl GeometryProvider,
    zone: BoxId,
    target_height: f64,
) -> OverflowInfo {
    let Some(zone_rect) = geo.rect(doc, zone.into()) else {
        return OverflowInfo::default();
    };
    let bottoms: Vec<(BoxId, f64)> = doc
        .children(zone.into())
        .iter()
        .filter_map(|c| {
            let rect = geo.rect(doc, (*c).into())?;
            Some((*c, rect.bottom() - zone_rect.top))
        })
        .collect();
    if bottoms.is_empty() {
        return OverflowInfo::default();
    }

    let safe_margin = geo
        .box_model(doc, zone.into())
        .map(|m| m.padding.bottom)
        .unwrap_or(0.0);
    let max_bottom = bottoms.iter().map(|(_, b)| *b).fold(0.0, f64::max);
    let min_required_height = max_bottom + safe_margin;
    let would_overflow = target_height < min_required_height;

    let overflowing = if would_overflow {
        bottoms
            .iter()
            .filter(|(_, bottom)| bottom + safe_margin > target_height)
            .map(|(id, bottom)| OverflowingBox {
                id: *id,
                amount: bottom + safe_margin - target_height,
                bottom: *bottom,
            })
            .collect()
    } else {
        Vec::new()
    };

    OverflowInfo {
        min_required_height,
        overflowing,
        would_overflow,
    }
}

/// Decide the height a zone resize may apply: unchanged when it fits,
/// forced with the override held, otherwise snapped to the floor
pub fn apply_soft_constraint(
    doc: &Document,
    geo: &impl GeometryProvider,
    zone: BoxId,
    target_height: f64,
    force_override: bool,
) -> SoftConstraint {
    // a zone cannot be shorter than nothing
    let target_height = if target_height.is_finite() { target_height.max(0.0) } else { 0.0 };
    let overflow = detect_overflow(doc, geo, zone, target_height);

    if !overflow.would_overflow {
        return SoftConstraint {
            final_height: target_height,
            was_constrained: false,
            is_forced: false,
            overflow,
        };
    }

    if force_override {
        tracing::debug!(
            zone = %zone,
            target_height,
            overflowing = overflow.count(),
            "zone forced below its content"
        );
        return SoftConstraint {
            final_height: target_height,
            was_constrained: false,
            is_forced: true,
            overflow,
        };
    }

    tracing::debug!(
        zone = %zone,
        target_height,
        floor = overflow.min_required_height,
        "zone height snapped to floor"
    );
    SoftConstraint {
        final_height: overflow.min_required_height,
        was_constrained: true,
        is_forced: false,
        overflow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::StyleLayout;
    use crate::model::{BoxSpec, NodeRef, Property};

    fn zone_with_child(child_bottom: f64) -> (Document, BoxId, BoxId) {
        let mut doc = Document::with_page(600.0, 2000.0, 0.0);
        let zone = doc
            .insert(
                NodeRef::Page,
                BoxSpec::section()
                    .with_px(Property::Height, 300.0)
                    .with_px(Property::PaddingBottom, 20.0),
            )
            .unwrap();
        let child = doc
            .insert(zone.into(), BoxSpec::absolute(0.0, child_bottom - 30.0, 50.0, 30.0))
            .unwrap();
        (doc, zone, child)
    }

    #[test]
    fn test_floor_snaps_without_override() {
        let (doc, zone, child) = zone_with_child(180.0);
        let result = apply_soft_constraint(&doc, &StyleLayout, zone, 150.0, false);
        assert_eq!(result.final_height, 200.0);
        assert!(result.was_constrained);
        assert!(!result.is_forced);
        assert_eq!(result.overflow.blocking().map(|b| b.id), Some(child));
    }

    #[test]
    fn test_override_allows_and_reports() {
        let (doc, zone, child) = zone_with_child(180.0);
        let result = apply_soft_constraint(&doc, &StyleLayout, zone, 150.0, true);
        assert_eq!(result.final_height, 150.0);
        assert!(result.is_forced);
        assert_eq!(
            result.overflow.overflowing,
            vec![OverflowingBox {
                id: child,
                amount: 50.0,
                bottom: 180.0
            }]
        );
    }

    #[test]
    fn test_height_above_floor_is_unchanged() {
        let (doc, zone, _) = zone_with_child(180.0);
        let result = apply_soft_constraint(&doc, &StyleLayout, zone, 250.0, false);
        assert_eq!(result.final_height, 250.0);
        assert!(!result.was_constrained);
        assert!(result.overflow.overflowing.is_empty());
    }

    #[test]
    fn test_empty_zone_has_no_floor() {
        let mut doc = Document::with_page(600.0, 800.0, 0.0);
        let zone = doc.insert(NodeRef::Page, BoxSpec::header()).unwrap();
        let info = detect_overflow(&doc, &StyleLayout, zone, 0.0);
        assert_eq!(info.min_required_height, 0.0);
        assert!(!info.would_overflow);
    }

    #[test]
    fn test_height_never_goes_negative() {
        let mut doc = Document::with_page(600.0, 800.0, 0.0);
        let zone = doc
            .insert(NodeRef::Page, BoxSpec::section().with_px(Property::Height, 300.0))
            .unwrap();
        for target in [-50.0, f64::NAN, f64::NEG_INFINITY] {
            let result = apply_soft_constraint(&doc, &StyleLayout, zone, target, false);
            assert_eq!(result.final_height, 0.0);
            assert!(!result.was_constrained);
        }
        let forced = apply_soft_constraint(&doc, &StyleLayout, zone, -50.0, true);
        assert_eq!(forced.final_height, 0.0);
    }
}
