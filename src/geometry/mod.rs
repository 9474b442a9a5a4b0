//! Geometry primitives and the host-supplied geometry provider
//!
//! The engine never measures anything itself. Every rendered rectangle and
//! every computed box-model value comes through a [`GeometryProvider`], which
//! must reflect the *currently rendered* state of the tree, including style
//! mutations applied earlier in the same gesture.

mod style_layout;

pub use style_layout::StyleLayout;

use crate::model::{Document, NodeRef};

/// A 2D point in page pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle, `left`/`top` plus size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a zero-sized rectangle at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Horizontal center
    pub fn mid_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    /// Vertical center
    pub fn mid_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Geometric center
    pub fn center(&self) -> Point {
        Point::new(self.mid_x(), self.mid_y())
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Inclusive containment test (points on an edge count as inside)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Move by an offset, keeping the size
    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// Express this rectangle relative to `origin`
    pub fn relative_to(&self, origin: Point) -> Rect {
        self.translate(-origin.x, -origin.y)
    }

    /// Shrink by insets (padding box to content box)
    pub fn inset(&self, insets: &Insets) -> Rect {
        Rect::new(
            self.left + insets.left,
            self.top + insets.top,
            self.width - insets.left - insets.right,
            self.height - insets.top - insets.bottom,
        )
    }

    /// Compute the union of two rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Per-side lengths (padding, border widths)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Computed box-model properties of a rendered box
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxModel {
    pub padding: Insets,
    pub border: Insets,
    /// Explicit `min-width`, 0 when unset
    pub min_width: f64,
    /// Explicit `min-height`, 0 when unset
    pub min_height: f64,
}

/// Adapter giving the engine the rendered geometry of the tree.
///
/// Rectangles are page-relative: the page's own rectangle has its origin at
/// `(0, 0)`. A provider returns `None` for anything that is not mounted; the
/// engine treats that as "no change" on the current frame.
pub trait GeometryProvider {
    /// Rendered border-box rectangle of a node, page-relative
    fn rect(&self, doc: &Document, node: NodeRef) -> Option<Rect>;

    /// Computed padding/border of a node
    fn box_model(&self, doc: &Document, node: NodeRef) -> Option<BoxModel>;

    /// Rendered rectangle of `node` relative to the origin of `ancestor`
    fn rect_relative(&self, doc: &Document, node: NodeRef, ancestor: NodeRef) -> Option<Rect> {
        let rect = self.rect(doc, node)?;
        let origin = self.rect(doc, ancestor)?.origin();
        Some(rect.relative_to(origin))
    }

    /// Content box (border box minus padding) of a node, page-relative
    fn content_box(&self, doc: &Document, node: NodeRef) -> Option<Rect> {
        let rect = self.rect(doc, node)?;
        let model = self.box_model(doc, node)?;
        Some(rect.inset(&model.padding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(r.right(), 110.0);
        assert_eq!(r.bottom(), 70.0);
        assert_eq!(r.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(100.0, 100.0)));
        assert!(!r.contains(Point::new(-0.5, 50.0)));
        assert!(!r.contains(Point::new(50.0, 100.5)));
    }

    #[test]
    fn test_rect_relative_to() {
        let r = Rect::new(30.0, 40.0, 10.0, 10.0);
        let rel = r.relative_to(Point::new(10.0, 15.0));
        assert_eq!(rel, Rect::new(20.0, 25.0, 10.0, 10.0));
    }

    #[test]
    fn test_rect_inset() {
        let r = Rect::new(0.0, 0.0, 200.0, 100.0);
        let content = r.inset(&Insets::new(5.0, 10.0, 15.0, 20.0));
        assert_eq!(content, Rect::new(20.0, 5.0, 170.0, 80.0));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 150.0, 150.0));
    }
}
