//! Page order of zones: header first, footer last, sections keeping their
//! relative order, and drop indexes that follow the cursor down the page.

use page_zones::zones::{ensure_order, insertion_index, validate_insertion_index, OrderReport};
use page_zones::{BoxId, BoxKind, BoxSpec, Document, NodeRef, Property, StyleLayout};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Header,
    Footer,
    Section,
}

fn spec(slot: Slot) -> BoxSpec {
    match slot {
        Slot::Header => BoxSpec::header(),
        Slot::Footer => BoxSpec::footer(),
        Slot::Section => BoxSpec::section(),
    }
}

/// Page children in some order: optional header and footer plus sections
fn shuffled_slots() -> impl Strategy<Value = Vec<Slot>> {
    (any::<bool>(), any::<bool>(), 0usize..6)
        .prop_map(|(header, footer, sections)| {
            let mut slots = vec![Slot::Section; sections];
            if header {
                slots.push(Slot::Header);
            }
            if footer {
                slots.push(Slot::Footer);
            }
            slots
        })
        .prop_shuffle()
}

/// Header 100px, the given sections, footer 100px on a 2000px page
fn stacked(section_heights: &[f64]) -> Document {
    let mut doc = Document::with_page(600.0, 2000.0, 0.0);
    doc.insert(NodeRef::Page, BoxSpec::header().with_px(Property::Height, 100.0))
        .unwrap();
    for height in section_heights {
        doc.insert(NodeRef::Page, BoxSpec::section().with_px(Property::Height, *height))
            .unwrap();
    }
    doc.insert(NodeRef::Page, BoxSpec::footer().with_px(Property::Height, 100.0))
        .unwrap();
    doc
}

proptest! {
    #[test]
    fn ensure_order_settles_in_one_pass(slots in shuffled_slots()) {
        let mut doc = Document::with_page(600.0, 1000.0, 0.0);
        let ids: Vec<BoxId> = slots
            .iter()
            .map(|slot| doc.insert(NodeRef::Page, spec(*slot)).unwrap())
            .collect();
        let sections_before: Vec<BoxId> = ids
            .iter()
            .copied()
            .filter(|id| doc.kind(*id) == Some(BoxKind::Section))
            .collect();

        ensure_order(&mut doc);

        let order = doc.children(NodeRef::Page).to_vec();
        prop_assert_eq!(order.len(), ids.len());
        if let Some(header) = doc.header() {
            prop_assert_eq!(order.first(), Some(&header));
        }
        if let Some(footer) = doc.footer() {
            prop_assert_eq!(order.last(), Some(&footer));
        }
        prop_assert_eq!(doc.sections(), sections_before);
        prop_assert_eq!(ensure_order(&mut doc), OrderReport::default());
    }

    #[test]
    fn insertion_index_follows_cursor(
        heights in prop::collection::vec(20.0f64..300.0, 1..5),
        a in -100.0f64..2100.0,
        b in -100.0f64..2100.0,
    ) {
        let doc = stacked(&heights);
        let (upper, lower) = if a <= b { (a, b) } else { (b, a) };

        let first = insertion_index(&doc, &StyleLayout, upper, None);
        let second = insertion_index(&doc, &StyleLayout, lower, None);
        prop_assert!(first <= second, "{} at {} but {} at {}", first, upper, second, lower);

        // between the header and the footer whatever the cursor does
        let footer = doc.children(NodeRef::Page).len() - 1;
        for index in [first, second] {
            let valid = validate_insertion_index(&doc, index);
            prop_assert!((1..=footer).contains(&valid));
        }
    }
}

#[test]
fn test_misplaced_header_and_footer_are_reported() {
    let mut doc = Document::with_page(600.0, 1000.0, 0.0);
    let s1 = doc.insert(NodeRef::Page, BoxSpec::section()).unwrap();
    let footer = doc.insert(NodeRef::Page, BoxSpec::footer().with_name("foot")).unwrap();
    let s2 = doc.insert(NodeRef::Page, BoxSpec::section()).unwrap();
    let header = doc.insert(NodeRef::Page, BoxSpec::header().with_name("head")).unwrap();

    let report = ensure_order(&mut doc);

    assert!(report.reordered);
    assert_eq!(doc.children(NodeRef::Page), &[header, s1, s2, footer]);
    assert_eq!(report.changes.len(), 2);
}

#[test]
fn test_sections_without_edge_zones_are_left_alone() {
    let mut doc = Document::with_page(600.0, 1000.0, 0.0);
    let ids: Vec<BoxId> = (0..3)
        .map(|_| doc.insert(NodeRef::Page, BoxSpec::section()).unwrap())
        .collect();
    assert_eq!(ensure_order(&mut doc), OrderReport::default());
    assert_eq!(doc.children(NodeRef::Page), ids.as_slice());
}

#[test]
fn test_drop_above_header_goes_after_it() {
    let doc = stacked(&[200.0, 200.0]);
    // header 0..100, sections 100..300 and 300..500, footer 1900..2000
    assert_eq!(insertion_index(&doc, &StyleLayout, -40.0, None), 1);
    assert_eq!(insertion_index(&doc, &StyleLayout, 290.0, None), 2);
    assert_eq!(insertion_index(&doc, &StyleLayout, 1950.0, None), 3);
}
