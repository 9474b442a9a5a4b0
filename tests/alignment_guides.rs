//! Alignment guides between boxes in a section, found directly and through
//! the engine's frame loop.

use page_zones::guides::{alignment_candidates, find_alignments, AlignmentGuide, GuideDirection, GuideKind};
use page_zones::{
    BoxId, BoxSpec, Document, Effect, Engine, EngineConfig, Feedback, HostEvent, NodeRef, Point, Property,
    StyleLayout,
};
use pretty_assertions::assert_eq;

/// A spans x 100..200, B starts at `b_left`; they never overlap vertically
fn two_boxes(b_left: f64) -> (Document, BoxId, BoxId) {
    let mut doc = Document::with_page(600.0, 800.0, 0.0);
    let section = doc
        .insert(NodeRef::Page, BoxSpec::section().with_px(Property::Height, 400.0))
        .unwrap();
    let a = doc
        .insert(section.into(), BoxSpec::absolute(100.0, 50.0, 100.0, 40.0))
        .unwrap();
    let b = doc
        .insert(section.into(), BoxSpec::absolute(b_left, 300.0, 80.0, 40.0))
        .unwrap();
    (doc, a, b)
}

fn guides_for(doc: &Document, moving: BoxId, threshold: f64) -> Vec<AlignmentGuide> {
    let candidates = alignment_candidates(doc, moving);
    find_alignments(doc, &StyleLayout, moving, &candidates, None, threshold)
}

fn member_ids(guide: &AlignmentGuide) -> Vec<BoxId> {
    let mut ids: Vec<BoxId> = guide.members.iter().map(|m| m.id).collect();
    ids.sort();
    ids
}

#[test]
fn test_edge_guide_is_symmetric() {
    let (doc, a, b) = two_boxes(200.0);

    let from_a = guides_for(&doc, a, 1.0);
    let from_b = guides_for(&doc, b, 1.0);

    assert_eq!(from_a.len(), 1);
    assert_eq!(from_b.len(), 1);
    for guides in [&from_a, &from_b] {
        assert_eq!(guides[0].direction, GuideDirection::Vertical);
        assert_eq!(guides[0].position, 200.0);
        assert_eq!(guides[0].kind, GuideKind::Element);
    }
    assert_eq!(member_ids(&from_a[0]), member_ids(&from_b[0]));
    assert!(from_a[0].involves(a) && from_a[0].involves(b));
}

#[test]
fn test_threshold_decides_alignment() {
    let (doc, a, _) = two_boxes(201.6);

    assert!(guides_for(&doc, a, 1.0).is_empty());

    let loose = guides_for(&doc, a, 2.0);
    assert_eq!(loose.len(), 1);
    assert_eq!(loose[0].position, 202.0);
}

#[test]
fn test_guide_segments_cover_members_and_gap() {
    let (doc, a, _) = two_boxes(200.0);
    let guides = guides_for(&doc, a, 1.0);
    let page = page_zones::Rect::new(0.0, 0.0, 600.0, 800.0);

    let segments = guides[0].segments(&page);
    let spans: Vec<(f64, f64)> = segments.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(spans, vec![(50.0, 90.0), (300.0, 340.0), (90.0, 300.0)]);
}

#[test]
fn test_engine_reports_guides_on_frame() {
    let (mut doc, a, b) = two_boxes(200.0);
    let mut engine = Engine::default();
    let geo = StyleLayout;

    engine.handle(
        &mut doc,
        &geo,
        HostEvent::DragStart {
            id: a,
            pointer: Point::new(150.0, 70.0),
            selection: vec![a],
        },
    );
    // a 1px wobble keeps the edges within the default threshold
    engine.handle(&mut doc, &geo, HostEvent::Drag { id: a, pointer: Point::new(150.5, 70.0) });

    let effects = engine.handle(&mut doc, &geo, HostEvent::FrameTick);
    match effects.as_slice() {
        [Effect::Feedback(Feedback::Guides { id, guides })] => {
            assert_eq!(*id, a);
            assert_eq!(guides.len(), 1);
            assert!(guides[0].involves(b));
        }
        other => panic!("unexpected effects {:?}", other),
    }
}

#[test]
fn test_guides_can_be_disabled() {
    let (mut doc, a, _) = two_boxes(200.0);
    let mut engine = Engine::new(EngineConfig::new().with_alignment_guides(false));
    let geo = StyleLayout;

    engine.handle(
        &mut doc,
        &geo,
        HostEvent::DragStart {
            id: a,
            pointer: Point::new(150.0, 70.0),
            selection: vec![a],
        },
    );
    engine.handle(&mut doc, &geo, HostEvent::Drag { id: a, pointer: Point::new(151.0, 70.0) });

    assert!(engine.handle(&mut doc, &geo, HostEvent::FrameTick).is_empty());
}
