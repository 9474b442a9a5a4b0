//! Zone membership on drop: header and footer frames convert page
//! rectangles without drift, and dropped boxes keep their page position
//! when they change zone.

use page_zones::zones::{reclassify, Anchor, Transition, ZoneFrame};
use page_zones::{BoxId, BoxSpec, Document, GeometryProvider, NodeRef, PositionMode, Property, Rect, StyleLayout};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const TOLERANCE: f64 = 1.0;

/// 600x800 page: header 0..150, section 150..550, footer pinned at 700..800
fn three_zones() -> (Document, BoxId, BoxId, BoxId) {
    let mut doc = Document::with_page(600.0, 800.0, 0.0);
    let header = doc
        .insert(NodeRef::Page, BoxSpec::header().with_px(Property::Height, 150.0))
        .unwrap();
    let section = doc
        .insert(NodeRef::Page, BoxSpec::section().with_px(Property::Height, 400.0))
        .unwrap();
    let footer = doc
        .insert(NodeRef::Page, BoxSpec::footer().with_px(Property::Height, 100.0))
        .unwrap();
    (doc, header, section, footer)
}

fn page_rect(doc: &Document, id: BoxId) -> Rect {
    let geo = StyleLayout;
    let page = geo.rect(doc, NodeRef::Page).unwrap();
    geo.rect(doc, id.into()).unwrap().relative_to(page.origin())
}

fn assert_close(a: &Rect, b: &Rect) {
    assert!((a.left - b.left).abs() <= TOLERANCE, "{:?} vs {:?}", a, b);
    assert!((a.top - b.top).abs() <= TOLERANCE, "{:?} vs {:?}", a, b);
    assert!((a.width - b.width).abs() <= TOLERANCE, "{:?} vs {:?}", a, b);
    assert!((a.height - b.height).abs() <= TOLERANCE, "{:?} vs {:?}", a, b);
}

proptest! {
    #[test]
    fn frames_round_trip(
        zone_height in 10.0f64..300.0,
        left in -500.0f64..1000.0,
        top in -500.0f64..1500.0,
        width in 0.0f64..400.0,
        height in 0.0f64..400.0,
    ) {
        let page = Rect::new(0.0, 0.0, 600.0, 800.0);
        let rect = Rect::new(left, top, width, height);
        let frames = [
            ZoneFrame::new(&page, &Rect::new(0.0, 0.0, 600.0, zone_height), Anchor::TopLeft),
            ZoneFrame::new(&page, &Rect::new(0.0, 800.0 - zone_height, 600.0, zone_height), Anchor::BottomLeft),
        ];
        for frame in frames {
            let back = frame.to_page(frame.to_local(&rect), width, height);
            assert_close(&back, &rect);
        }
    }

    #[test]
    fn entering_header_keeps_page_position(
        left in 0.0f64..500.0,
        top in -155.0f64..-15.0,
    ) {
        let (mut doc, header, section, _) = three_zones();
        let id = doc
            .insert(section.into(), BoxSpec::absolute(left, top, 40.0, 20.0))
            .unwrap();
        let before = page_rect(&doc, id);

        let placement = reclassify(&doc, &StyleLayout, id, false).unwrap();
        prop_assert_eq!(placement.transition, Transition::Entered { zone: header });
        prop_assert!(doc.apply_placement(&placement));

        prop_assert_eq!(doc.parent(id), Some(NodeRef::Box(header)));
        assert_close(&page_rect(&doc, id), &before);
    }

    #[test]
    fn entering_footer_keeps_page_position(
        left in 0.0f64..500.0,
        top in 545.0f64..635.0,
    ) {
        let (mut doc, _, section, footer) = three_zones();
        let id = doc
            .insert(section.into(), BoxSpec::absolute(left, top, 40.0, 20.0))
            .unwrap();
        let before = page_rect(&doc, id);

        let placement = reclassify(&doc, &StyleLayout, id, false).unwrap();
        prop_assert_eq!(placement.transition, Transition::Entered { zone: footer });
        prop_assert!(doc.apply_placement(&placement));

        let node = doc.get(id).unwrap();
        prop_assert!(node.style.has(Property::Bottom));
        prop_assert!(!node.style.has(Property::Top));
        assert_close(&page_rect(&doc, id), &before);
    }
}

#[test]
fn test_leaving_header_lands_in_section_under_center() {
    let (mut doc, header, section, _) = three_zones();
    let id = doc
        .insert(header.into(), BoxSpec::absolute(20.0, 300.0, 40.0, 20.0))
        .unwrap();
    let before = page_rect(&doc, id);

    let placement = reclassify(&doc, &StyleLayout, id, false).unwrap();
    assert_eq!(
        placement.transition,
        Transition::Assigned {
            section,
            left: Some(header)
        }
    );
    doc.apply_placement(&placement);
    assert_eq!(doc.parent(id), Some(NodeRef::Box(section)));
    assert_eq!(doc.get(id).unwrap().style.px(Property::Top), Some(150.0));
    assert_close(&page_rect(&doc, id), &before);
}

#[test]
fn test_staying_in_header_clamps_inside_it() {
    let (mut doc, header, _, _) = three_zones();
    let id = doc
        .insert(header.into(), BoxSpec::absolute(580.0, 120.0, 40.0, 20.0))
        .unwrap();

    let placement = reclassify(&doc, &StyleLayout, id, false).unwrap();
    assert_eq!(placement.transition, Transition::Stayed { zone: header });
    assert_eq!(placement.delta.get_px(Property::Left), Some(560.0));
    assert!(!placement.blocked);
}

#[test]
fn test_staying_in_footer_restores_bottom_anchor() {
    let (mut doc, _, _, footer) = three_zones();
    // footer-relative top 50 after a drag wrote left/top
    let id = doc
        .insert(footer.into(), BoxSpec::absolute(-15.0, 50.0, 40.0, 20.0))
        .unwrap();
    let before = page_rect(&doc, id);

    let placement = reclassify(&doc, &StyleLayout, id, false).unwrap();
    assert_eq!(placement.transition, Transition::Stayed { zone: footer });
    doc.apply_placement(&placement);

    let style = &doc.get(id).unwrap().style;
    assert!(!style.has(Property::Top));
    assert_eq!(style.px(Property::Bottom), Some(30.0));
    assert_eq!(style.px(Property::Left), Some(0.0));
    assert_eq!(page_rect(&doc, id).top, before.top);
}

#[test]
fn test_header_bottom_blocks_without_override() {
    let mut doc = Document::with_page(600.0, 800.0, 0.0);
    let header = doc
        .insert(
            NodeRef::Page,
            BoxSpec::header()
                .with_px(Property::Height, 150.0)
                .with_px(Property::PaddingBottom, 10.0),
        )
        .unwrap();
    doc.insert(NodeRef::Page, BoxSpec::section().with_px(Property::Height, 400.0))
        .unwrap();
    let id = doc
        .insert(header.into(), BoxSpec::absolute(10.0, 125.0, 40.0, 20.0))
        .unwrap();

    let held = reclassify(&doc, &StyleLayout, id, false).unwrap();
    assert!(held.blocked);
    assert_eq!(held.delta.get_px(Property::Top), Some(120.0));

    let forced = reclassify(&doc, &StyleLayout, id, true).unwrap();
    assert!(!forced.blocked);
    assert_eq!(forced.delta.get(Property::Top), None);
}

#[test]
fn test_no_section_to_land_in_detaches_to_page() {
    let mut doc = Document::with_page(600.0, 800.0, 0.0);
    let header = doc
        .insert(NodeRef::Page, BoxSpec::header().with_px(Property::Height, 100.0))
        .unwrap();
    let id = doc
        .insert(header.into(), BoxSpec::absolute(10.0, 300.0, 40.0, 20.0))
        .unwrap();
    let placement = reclassify(&doc, &StyleLayout, id, false).unwrap();
    assert_eq!(placement.transition, Transition::Detached { left: header });
    doc.apply_placement(&placement);
    assert_eq!(doc.parent(id), Some(NodeRef::Page));
    assert_eq!(doc.get(id).unwrap().position, PositionMode::Absolute);
    assert_eq!(doc.get(id).unwrap().style.px(Property::Top), Some(300.0));
}
