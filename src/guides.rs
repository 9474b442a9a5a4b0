//! Alignment guide detection
//!
//! Guides are feedback only: they report which edges and centers line up
//! with the moving box, and never move anything.

use std::collections::BTreeMap;

use crate::geometry::{GeometryProvider, Rect};
use crate::model::{BoxId, BoxKind, Document, NodeRef};

/// Orientation of a guide line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GuideDirection {
    /// A vertical line at an x position (left, right, mid-x)
    Vertical,
    /// A horizontal line at a y position (top, bottom, mid-y)
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuideKind {
    PageCenter,
    Element,
}

/// A box taking part in a guide, with its page-relative rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideMember {
    pub id: BoxId,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentGuide {
    pub direction: GuideDirection,
    /// Line position in page pixels, rounded
    pub position: f64,
    pub kind: GuideKind,
    pub members: Vec<GuideMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Along a member box
    Solid,
    /// Dashed connector between two members
    Gap,
}

/// Renderable piece of a guide along its axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideSegment {
    pub start: f64,
    pub end: f64,
    pub kind: SegmentKind,
}

impl AlignmentGuide {
    pub fn involves(&self, id: BoxId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// Split the guide into solid spans over members and gaps between them.
    /// Page-center guides span the whole page axis.
    pub fn segments(&self, page: &Rect) -> Vec<GuideSegment> {
        if self.kind == GuideKind::PageCenter {
            let end = match self.direction {
                GuideDirection::Vertical => page.height,
                GuideDirection::Horizontal => page.width,
            };
            return vec![GuideSegment {
                start: 0.0,
                end,
                kind: SegmentKind::Solid,
            }];
        }

        let mut spans: Vec<(f64, f64)> = self
            .members
            .iter()
            .map(|m| match self.direction {
                GuideDirection::Vertical => (m.rect.top, m.rect.bottom()),
                GuideDirection::Horizontal => (m.rect.left, m.rect.right()),
            })
            .collect();
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut segments: Vec<GuideSegment> = spans
            .iter()
            .map(|(start, end)| GuideSegment {
                start: *start,
                end: *end,
                kind: SegmentKind::Solid,
            })
            .collect();
        for pair in spans.windows(2) {
            let (current_end, next_start) = (pair[0].1, pair[1].0);
            if next_start > current_end {
                segments.push(GuideSegment {
                    start: current_end,
                    end: next_start,
                    kind: SegmentKind::Gap,
                });
            }
        }
        segments
    }
}

/// Center of the page content box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageCenter {
    pub x: f64,
    pub y: f64,
}

pub fn page_center_lines(doc: &Document, geo: &impl GeometryProvider) -> Option<PageCenter> {
    let page = geo.rect(doc, NodeRef::Page)?;
    let content = geo.content_box(doc, NodeRef::Page)?.relative_to(page.origin());
    Some(PageCenter {
        x: content.mid_x(),
        y: content.mid_y(),
    })
}

/// Boxes the moving box can align with: everything except header and
/// footer roots and the moving box's own subtree
pub fn alignment_candidates(doc: &Document, moving: BoxId) -> Vec<BoxId> {
    let own = doc.subtree(moving);
    doc.iter()
        .filter(|n| !matches!(n.kind, BoxKind::Header | BoxKind::Footer) || n.parent() != NodeRef::Page)
        .map(|n| n.id)
        .filter(|id| !own.contains(id))
        .collect()
}

fn x_values(r: &Rect) -> [f64; 3] {
    [r.left, r.right(), r.mid_x()]
}

fn y_values(r: &Rect) -> [f64; 3] {
    [r.top, r.bottom(), r.mid_y()]
}

#[derive(Default)]
struct Line {
    page_center: bool,
    members: Vec<GuideMember>,
}

impl Line {
    fn add(&mut self, member: GuideMember) {
        if !self.members.iter().any(|m| m.id == member.id) {
            self.members.push(member);
        }
    }
}

/// Find every guide line the moving box touches within `threshold` pixels
pub fn find_alignments(
    doc: &Document,
    geo: &impl GeometryProvider,
    moving: BoxId,
    candidates: &[BoxId],
    center: Option<PageCenter>,
    threshold: f64,
) -> Vec<AlignmentGuide> {
    let Some(page) = geo.rect(doc, NodeRef::Page) else {
        return Vec::new();
    };
    let Some(rect) = geo.rect(doc, moving.into()).map(|r| r.relative_to(page.origin())) else {
        return Vec::new();
    };
    let near = |a: f64, b: f64| (a - b).abs() <= threshold;
    let key = |v: f64| v.round() as i64;

    let mut lines: BTreeMap<(GuideDirection, i64), Line> = BTreeMap::new();

    if let Some(center) = center {
        if near(rect.mid_x(), center.x) {
            lines.entry((GuideDirection::Vertical, key(center.x))).or_default().page_center = true;
        }
        if near(rect.mid_y(), center.y) {
            lines.entry((GuideDirection::Horizontal, key(center.y))).or_default().page_center = true;
        }
    }

    let moving_x = x_values(&rect);
    let moving_y = y_values(&rect);
    for id in candidates.iter().copied().filter(|id| *id != moving) {
        let Some(other) = geo.rect(doc, id.into()).map(|r| r.relative_to(page.origin())) else {
            continue;
        };
        let member = GuideMember { id, rect: other };
        for value in x_values(&other) {
            if moving_x.iter().any(|m| near(*m, value)) {
                lines.entry((GuideDirection::Vertical, key(value))).or_default().add(member);
            }
        }
        for value in y_values(&other) {
            if moving_y.iter().any(|m| near(*m, value)) {
                lines.entry((GuideDirection::Horizontal, key(value))).or_default().add(member);
            }
        }
    }

    let guides: Vec<AlignmentGuide> = lines
        .into_iter()
        .map(|((direction, position), mut line)| {
            let kind = if line.page_center {
                GuideKind::PageCenter
            } else {
                line.add(GuideMember { id: moving, rect });
                GuideKind::Element
            };
            AlignmentGuide {
                direction,
                position: position as f64,
                kind,
                members: line.members,
            }
        })
        .collect();

    if !guides.is_empty() {
        tracing::trace!(box_id = %moving, guides = guides.len(), "alignment guides");
    }
    guides
}
