//! Resize constraint solver
//!
//! A resize gesture starts with a [`ResizeSession`] capturing everything the
//! solver needs (start rectangle, bounds, minimum size, aspect ratio). Every
//! pointer update is then a pure call to [`solve`], which applies in order:
//!
//! 1. aspect ratio (corner handles only, driving dimension heuristic)
//! 2. minimum size floor
//! 3. opposite edge lock against `min_left`/`min_top`
//! 4. far edge against `max_right`/`max_bottom`
//! 5. a final pass against the full bounds
//!
//! Container bounds win over minimum size, minimum size over aspect ratio,
//! and aspect ratio over the edge lock.

use std::fmt;
use std::str::FromStr;

use crate::geometry::{GeometryProvider, Rect};
use crate::model::{BoxId, BoxKind, Document, NodeRef, PositionMode, Property, StyleDelta, TablePart};

/// One of the eight resize handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handle {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::TopLeft,
        Handle::TopCenter,
        Handle::TopRight,
        Handle::CenterLeft,
        Handle::CenterRight,
        Handle::BottomLeft,
        Handle::BottomCenter,
        Handle::BottomRight,
    ];

    pub fn affects_left(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::CenterLeft | Handle::BottomLeft)
    }

    pub fn affects_right(&self) -> bool {
        matches!(self, Handle::TopRight | Handle::CenterRight | Handle::BottomRight)
    }

    pub fn affects_top(&self) -> bool {
        matches!(self, Handle::TopLeft | Handle::TopCenter | Handle::TopRight)
    }

    pub fn affects_bottom(&self) -> bool {
        matches!(self, Handle::BottomLeft | Handle::BottomCenter | Handle::BottomRight)
    }

    pub fn is_corner(&self) -> bool {
        (self.affects_left() || self.affects_right()) && (self.affects_top() || self.affects_bottom())
    }

    /// Two-letter handle code (`tl`, `bc`, ...)
    pub fn code(&self) -> &'static str {
        match self {
            Handle::TopLeft => "tl",
            Handle::TopCenter => "tc",
            Handle::TopRight => "tr",
            Handle::CenterLeft => "cl",
            Handle::CenterRight => "cr",
            Handle::BottomLeft => "bl",
            Handle::BottomCenter => "bc",
            Handle::BottomRight => "br",
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resize handle '{0}' (expected tl, tc, tr, cl, cr, bl, bc or br)")]
pub struct UnknownHandle(pub String);

impl FromStr for Handle {
    type Err = UnknownHandle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Handle::ALL
            .iter()
            .copied()
            .find(|h| h.code() == code)
            .ok_or_else(|| UnknownHandle(s.to_string()))
    }
}

/// Legal area for a resized box, in its parent's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeBounds {
    pub min_left: f64,
    pub max_right: f64,
    pub min_top: f64,
    pub max_bottom: f64,
    pub max_width: f64,
    pub max_height: f64,
}

impl ResizeBounds {
    /// No limit beyond the frame origin
    pub fn unbounded() -> Self {
        Self {
            min_left: 0.0,
            max_right: f64::INFINITY,
            min_top: 0.0,
            max_bottom: f64::INFINITY,
            max_width: f64::INFINITY,
            max_height: f64::INFINITY,
        }
    }

    /// The whole `width × height` frame, as used inside header and footer
    pub fn frame(width: f64, height: f64) -> Self {
        Self {
            min_left: 0.0,
            max_right: width,
            min_top: 0.0,
            max_bottom: height,
            max_width: width,
            max_height: height,
        }
    }

    /// A padded container of `width × height`
    pub fn padded(width: f64, height: f64, padding: &crate::geometry::Insets) -> Self {
        Self {
            min_left: padding.left,
            max_right: width - padding.right,
            min_top: padding.top,
            max_bottom: height - padding.bottom,
            max_width: width - padding.horizontal(),
            max_height: height - padding.vertical(),
        }
    }
}

impl Default for ResizeBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Which edges stay fixed while the opposite one moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeLock {
    pub horizontal: bool,
    pub vertical: bool,
}

/// Inputs of [`solve`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeConstraints {
    pub bounds: ResizeBounds,
    /// Width / height to preserve (images only)
    pub aspect_ratio: Option<f64>,
    pub lock: EdgeLock,
    /// Box rectangle at resize start, in the parent's frame
    pub start: Rect,
    pub is_absolute: bool,
    pub start_margin_left: f64,
    pub start_margin_top: f64,
    pub min_width: f64,
    pub min_height: f64,
}

impl ResizeConstraints {
    /// Constraints for a free box at `start` with the given bounds
    pub fn new(start: Rect, bounds: ResizeBounds) -> Self {
        Self {
            bounds,
            aspect_ratio: None,
            lock: EdgeLock::default(),
            start,
            is_absolute: true,
            start_margin_left: 0.0,
            start_margin_top: 0.0,
            min_width: 0.0,
            min_height: 0.0,
        }
    }

    pub fn with_aspect_ratio(mut self, ratio: f64) -> Self {
        self.aspect_ratio = Some(ratio).filter(|r| r.is_finite() && *r > 0.0);
        self
    }

    /// Lock the edges opposite to the ones `handle` drags
    pub fn with_lock_for(mut self, handle: Handle) -> Self {
        self.lock = EdgeLock {
            horizontal: handle.affects_left(),
            vertical: handle.affects_top(),
        };
        self
    }

    pub fn with_min_size(mut self, min_width: f64, min_height: f64) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn with_flow_margins(mut self, margin_left: f64, margin_top: f64) -> Self {
        self.is_absolute = false;
        self.start_margin_left = margin_left;
        self.start_margin_top = margin_top;
        self
    }
}

/// Edges that hit a constraint during the last solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockedEdges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl BlockedEdges {
    pub fn any(&self) -> bool {
        self.left || self.right || self.top || self.bottom
    }
}

/// Result of [`solve`]
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome {
    pub rect: Rect,
    pub style: StyleDelta,
    pub blocked: BlockedEdges,
}

/// Working state of one solve
struct Solver<'a> {
    c: &'a ResizeConstraints,
    handle: Handle,
    /// Aspect ratio, only when the handle is a corner
    ratio: Option<f64>,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    blocked: BlockedEdges,
}

impl<'a> Solver<'a> {
    fn fixed_right(&self) -> f64 {
        self.c.start.right()
    }

    fn fixed_bottom(&self) -> f64 {
        self.c.start.bottom()
    }

    fn height_from_width(&mut self) {
        if let Some(r) = self.ratio {
            self.height = self.width / r;
        }
    }

    fn width_from_height(&mut self) {
        if let Some(r) = self.ratio {
            self.width = self.height * r;
        }
    }

    fn apply_aspect_ratio(&mut self) {
        if self.ratio.is_none() {
            return;
        }
        let dw = (self.width - self.c.start.width).abs();
        let dh = (self.height - self.c.start.height).abs();
        if dw > dh {
            self.height_from_width();
        } else {
            self.width_from_height();
        }
    }

    fn apply_min_size(&mut self) {
        let h = self.handle;
        if self.width < self.c.min_width {
            self.width = self.c.min_width;
            self.blocked.left = h.affects_left();
            self.blocked.right = h.affects_right();
            self.height_from_width();
        }
        if self.height < self.c.min_height {
            self.height = self.c.min_height;
            self.blocked.top = h.affects_top();
            self.blocked.bottom = h.affects_bottom();
            if self.ratio.is_some() {
                self.width_from_height();
                // Both floors win over the ratio
                if self.width < self.c.min_width {
                    self.width = self.c.min_width;
                }
            }
        }
    }

    /// After a vertical clip re-derived the width, keep the horizontal edges
    /// legal. `fixed_bottom` re-anchors the top when the bottom edge is locked.
    fn recheck_horizontal(&mut self, fixed_bottom: Option<f64>) {
        let Some(r) = self.ratio else { return };
        let b = &self.c.bounds;
        if self.handle.affects_left() {
            let fixed_right = self.fixed_right();
            let candidate = fixed_right - self.width;
            if candidate >= b.min_left {
                self.left = candidate;
                return;
            }
            self.blocked.left = true;
            self.width = fixed_right - b.min_left;
            self.height = self.width / r;
            self.left = b.min_left;
        } else if self.left + self.width > b.max_right {
            self.blocked.right = true;
            self.width = b.max_right - self.left;
            self.height = self.width / r;
        } else {
            return;
        }
        if let Some(bottom) = fixed_bottom {
            self.top = bottom - self.height;
        }
    }

    fn apply_horizontal_edges(&mut self, proposed: &Rect) {
        let b = self.c.bounds;
        if self.handle.affects_left() && self.c.lock.horizontal {
            let fixed_right = self.fixed_right();
            let candidate = fixed_right - self.width;
            if candidate < b.min_left {
                self.blocked.left = true;
                self.width = fixed_right - b.min_left;
                self.left = b.min_left;
                self.height_from_width();
            } else {
                // Also covers the min-size case: the right edge holds
                self.left = candidate;
            }
        } else if self.handle.affects_left() {
            self.left = proposed.left.max(b.min_left);
        }

        if self.handle.affects_right() && self.left + self.width > b.max_right {
            self.blocked.right = true;
            self.width = b.max_right - self.left;
            self.height_from_width();
        }
    }

    fn apply_vertical_edges(&mut self, proposed: &Rect) {
        let b = self.c.bounds;
        if self.handle.affects_top() && self.c.lock.vertical {
            let fixed_bottom = self.fixed_bottom();
            let candidate = fixed_bottom - self.height;
            if candidate < b.min_top {
                self.blocked.top = true;
                self.height = fixed_bottom - b.min_top;
                self.top = b.min_top;
                if self.ratio.is_some() {
                    self.width_from_height();
                    self.recheck_horizontal(Some(fixed_bottom));
                }
            } else {
                self.top = candidate;
            }
        } else if self.handle.affects_top() {
            self.top = proposed.top.max(b.min_top);
        }

        if self.handle.affects_bottom() && self.top + self.height > b.max_bottom {
            self.blocked.bottom = true;
            self.height = b.max_bottom - self.top;
            if self.ratio.is_some() {
                self.width_from_height();
                self.recheck_horizontal(None);
            }
        }
    }

    fn apply_final_bounds(&mut self) {
        let b = self.c.bounds;
        if self.width > b.max_width {
            self.width = b.max_width;
            self.height_from_width();
        }
        if self.height > b.max_height {
            self.height = b.max_height;
            self.width_from_height();
        }
        self.left = self.left.max(b.min_left);
        self.top = self.top.max(b.min_top);

        if self.left + self.width > b.max_right {
            if self.handle.affects_left() && self.c.lock.horizontal {
                self.width = b.max_right - self.left;
                self.height_from_width();
            } else {
                self.left = b.max_right - self.width;
            }
        }
        if self.top + self.height > b.max_bottom {
            if self.handle.affects_top() && self.c.lock.vertical {
                self.height = b.max_bottom - self.top;
                self.width_from_height();
            } else {
                self.top = b.max_bottom - self.height;
            }
        }
        self.width = self.width.max(0.0);
        self.height = self.height.max(0.0);
    }

    fn style(&self) -> StyleDelta {
        let style = StyleDelta::new()
            .px(Property::Width, self.width)
            .px(Property::Height, self.height);
        if self.c.is_absolute {
            style
                .px(Property::Left, self.left)
                .px(Property::Top, self.top)
        } else {
            style
                .px(
                    Property::MarginLeft,
                    self.left - self.c.start.left + self.c.start_margin_left,
                )
                .px(
                    Property::MarginTop,
                    self.top - self.c.start.top + self.c.start_margin_top,
                )
        }
    }
}

/// Apply every resize constraint to a proposed rectangle
pub fn solve(handle: Handle, proposed: &Rect, constraints: &ResizeConstraints) -> ResizeOutcome {
    let sane = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
    let mut s = Solver {
        c: constraints,
        handle,
        ratio: constraints
            .aspect_ratio
            .filter(|r| r.is_finite() && *r > 0.0 && handle.is_corner()),
        left: constraints.start.left,
        top: constraints.start.top,
        width: sane(proposed.width, constraints.start.width),
        height: sane(proposed.height, constraints.start.height),
        blocked: BlockedEdges::default(),
    };

    s.apply_aspect_ratio();
    s.apply_min_size();
    s.apply_horizontal_edges(proposed);
    s.apply_vertical_edges(proposed);
    s.apply_final_bounds();

    if s.blocked.any() {
        tracing::debug!(handle = %handle, blocked = ?s.blocked, "resize blocked");
    }

    ResizeOutcome {
        rect: Rect::new(s.left, s.top, s.width, s.height),
        style: s.style(),
        blocked: s.blocked,
    }
}

/// Minimum size of a box: explicit `min-*`, or what its padding and border
/// need. Tables have none.
pub fn minimum_size(doc: &Document, geo: &impl GeometryProvider, id: BoxId) -> (f64, f64) {
    if doc.kind(id) == Some(BoxKind::TableStructure(TablePart::Table)) {
        return (0.0, 0.0);
    }
    match geo.box_model(doc, id.into()) {
        Some(m) => (
            m.min_width.max(m.padding.horizontal() + m.border.horizontal()),
            m.min_height.max(m.padding.vertical() + m.border.vertical()),
        ),
        None => (0.0, 0.0),
    }
}

/// Bounds a box may be resized within, in its parent's frame.
///
/// Header and footer children get the whole zone frame. Children of any
/// other box get its padded area, limited to the first column when a
/// section repeats in columns. Page children get the page's padded area,
/// without a bottom limit for zones (they may run over several pages).
pub fn resize_bounds(doc: &Document, geo: &impl GeometryProvider, id: BoxId) -> ResizeBounds {
    let Some(parent) = doc.parent(id) else {
        return ResizeBounds::unbounded();
    };
    let (Some(rect), Some(model)) = (geo.rect(doc, parent), geo.box_model(doc, parent)) else {
        return ResizeBounds::unbounded();
    };

    match parent {
        NodeRef::Box(p) => match doc.get(p) {
            Some(node) if node.kind.is_edge_zone() => ResizeBounds::frame(rect.width, rect.height),
            Some(node) if node.repeat_columns > 1 => {
                let column = rect.width / f64::from(node.repeat_columns);
                ResizeBounds::padded(column, rect.height, &model.padding)
            }
            _ => ResizeBounds::padded(rect.width, rect.height, &model.padding),
        },
        NodeRef::Page => {
            let mut bounds = ResizeBounds::padded(rect.width, rect.height, &model.padding);
            if doc.kind(id).map(|k| k.is_zone()).unwrap_or(false) {
                bounds.max_bottom = f64::INFINITY;
                bounds.max_height = f64::INFINITY;
            }
            bounds
        }
    }
}

/// State captured at resize start, consumed by every update
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub id: BoxId,
    pub handle: Handle,
    pub constraints: ResizeConstraints,
}

impl ResizeSession {
    /// Capture a session. `None` when the box is not rendered.
    pub fn begin(doc: &Document, geo: &impl GeometryProvider, id: BoxId, handle: Handle) -> Option<Self> {
        let node = doc.get(id)?;
        let parent = node.parent();
        let start = geo.rect_relative(doc, id.into(), parent)?;
        let bounds = resize_bounds(doc, geo, id);
        let (min_width, min_height) = minimum_size(doc, geo, id);

        let mut constraints = ResizeConstraints::new(start, bounds)
            .with_lock_for(handle)
            .with_min_size(min_width, min_height);
        if let Some(image) = node.image {
            let rendered = if start.width > 0.0 && start.height > 0.0 {
                start.width / start.height
            } else {
                1.0
            };
            constraints = constraints.with_aspect_ratio(image.aspect_ratio().unwrap_or(rendered));
        }
        if node.position != PositionMode::Absolute {
            constraints = constraints.with_flow_margins(
                node.style.px_or_zero(Property::MarginLeft),
                node.style.px_or_zero(Property::MarginTop),
            );
        }

        tracing::debug!(box_id = %id, handle = %handle, start = ?start, "resize session started");
        Some(Self {
            id,
            handle,
            constraints,
        })
    }

    pub fn update(&self, proposed: &Rect) -> ResizeOutcome {
        solve(self.handle, proposed, &self.constraints)
    }
}

/// Resize of a box living in a table cell
#[derive(Debug, Clone, PartialEq)]
pub struct TableCellResize {
    pub child: StyleDelta,
    pub cell: BoxId,
    /// Current cell size, written back so the cell cannot grow
    pub cell_lock: StyleDelta,
}

/// Resize a table-cell child purely against the cell's current content box.
/// `None` when the parent is not a cell or is not rendered.
pub fn resize_in_table_cell(
    doc: &Document,
    geo: &impl GeometryProvider,
    id: BoxId,
    proposed: &Rect,
    min_size: f64,
) -> Option<TableCellResize> {
    let cell = doc.parent(id)?.as_box()?;
    if !doc.kind(cell)?.is_table_cell() {
        return None;
    }
    let rect = geo.rect(doc, cell.into())?;
    let model = geo.box_model(doc, cell.into())?;
    let max_width = rect.width - model.padding.horizontal();
    let max_height = rect.height - model.padding.vertical();

    let width = proposed.width.min(max_width).max(min_size);
    let height = proposed.height.min(max_height).max(min_size);

    Some(TableCellResize {
        child: StyleDelta::new()
            .px(Property::Width, width)
            .px(Property::Height, height),
        cell,
        cell_lock: StyleDelta::new()
            .px(Property::Width, rect.width)
            .px(Property::Height, rect.height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn page_bounds() -> ResizeBounds {
        ResizeBounds::frame(500.0, 500.0)
    }

    #[test]
    fn test_handle_codes() {
        assert_eq!("tl".parse::<Handle>(), Ok(Handle::TopLeft));
        assert_eq!("BR".parse::<Handle>(), Ok(Handle::BottomRight));
        assert!("xx".parse::<Handle>().is_err());
        assert!(Handle::TopRight.is_corner());
        assert!(!Handle::BottomCenter.is_corner());
    }

    #[test]
    fn test_left_handle_keeps_right_edge() {
        let start = Rect::new(100.0, 50.0, 50.0, 40.0);
        let c = ResizeConstraints::new(start, page_bounds()).with_lock_for(Handle::CenterLeft);
        let out = solve(Handle::CenterLeft, &Rect::new(80.0, 50.0, 70.0, 40.0), &c);
        assert_eq!(out.rect.left, 80.0);
        assert_eq!(out.rect.width, 70.0);
        assert_eq!(out.rect.right(), 150.0);
        assert_eq!(out.style.get_px(Property::Left), Some(80.0));
        assert!(!out.blocked.any());
    }

    #[test]
    fn test_left_handle_stops_at_min_left() {
        let start = Rect::new(30.0, 50.0, 50.0, 40.0);
        let c = ResizeConstraints::new(start, page_bounds()).with_lock_for(Handle::CenterLeft);
        let out = solve(Handle::CenterLeft, &Rect::new(-20.0, 50.0, 100.0, 40.0), &c);
        assert_eq!(out.rect.left, 0.0);
        assert_eq!(out.rect.width, 80.0);
        assert!(out.blocked.left);
    }

    #[test]
    fn test_right_handle_clips_at_max_right() {
        let start = Rect::new(400.0, 0.0, 50.0, 40.0);
        let c = ResizeConstraints::new(start, page_bounds()).with_lock_for(Handle::CenterRight);
        let out = solve(Handle::CenterRight, &Rect::new(400.0, 0.0, 200.0, 40.0), &c);
        assert_eq!(out.rect.width, 100.0);
        assert!(out.blocked.right);
    }

    #[test]
    fn test_min_size_floor_blocks_handle_edge() {
        let start = Rect::new(100.0, 100.0, 50.0, 50.0);
        let c = ResizeConstraints::new(start, page_bounds())
            .with_lock_for(Handle::TopLeft)
            .with_min_size(20.0, 20.0);
        let out = solve(Handle::TopLeft, &Rect::new(145.0, 145.0, 5.0, 5.0), &c);
        assert_eq!(out.rect, Rect::new(130.0, 130.0, 20.0, 20.0));
        assert!(out.blocked.left && out.blocked.top);
        assert!(!out.blocked.right && !out.blocked.bottom);
    }

    #[test]
    fn test_corner_keeps_aspect_ratio() {
        let start = Rect::new(10.0, 10.0, 100.0, 50.0);
        let c = ResizeConstraints::new(start, page_bounds())
            .with_lock_for(Handle::BottomRight)
            .with_aspect_ratio(2.0);
        let out = solve(Handle::BottomRight, &Rect::new(10.0, 10.0, 160.0, 55.0), &c);
        assert!((out.rect.width / out.rect.height - 2.0).abs() < EPS);
        assert_eq!(out.rect.width, 160.0);
    }

    #[test]
    fn test_edge_handle_ignores_aspect_ratio() {
        let start = Rect::new(10.0, 10.0, 100.0, 50.0);
        let c = ResizeConstraints::new(start, page_bounds())
            .with_lock_for(Handle::CenterRight)
            .with_aspect_ratio(2.0);
        let out = solve(Handle::CenterRight, &Rect::new(10.0, 10.0, 150.0, 50.0), &c);
        assert_eq!(out.rect.height, 50.0);
        assert_eq!(out.rect.width, 150.0);
    }

    #[test]
    fn test_aspect_cascade_on_top_clip() {
        // Top hits min_top, width is re-derived and the left edge follows
        let start = Rect::new(50.0, 10.0, 100.0, 100.0);
        let c = ResizeConstraints::new(start, page_bounds())
            .with_lock_for(Handle::TopLeft)
            .with_aspect_ratio(1.0);
        let out = solve(Handle::TopLeft, &Rect::new(10.0, -30.0, 140.0, 140.0), &c);
        assert_eq!(out.rect, Rect::new(40.0, 0.0, 110.0, 110.0));
        assert!(out.blocked.top);
        assert!(!out.blocked.left);
        assert_eq!(out.rect.right(), 150.0);
        assert_eq!(out.rect.bottom(), 110.0);
    }

    #[test]
    fn test_flow_box_emits_margins() {
        let start = Rect::new(100.0, 50.0, 50.0, 40.0);
        let c = ResizeConstraints::new(start, page_bounds())
            .with_lock_for(Handle::CenterLeft)
            .with_flow_margins(10.0, 5.0);
        let out = solve(Handle::CenterLeft, &Rect::new(80.0, 50.0, 70.0, 40.0), &c);
        assert_eq!(out.style.get_px(Property::MarginLeft), Some(-10.0));
        assert_eq!(out.style.get_px(Property::MarginTop), Some(5.0));
        assert_eq!(out.style.get_px(Property::Left), None);
    }

    #[test]
    fn test_bounds_win_over_min_size() {
        let start = Rect::new(0.0, 0.0, 50.0, 50.0);
        let bounds = ResizeBounds::frame(30.0, 30.0);
        let c = ResizeConstraints::new(start, bounds)
            .with_lock_for(Handle::BottomRight)
            .with_min_size(40.0, 40.0);
        let out = solve(Handle::BottomRight, &Rect::new(0.0, 0.0, 10.0, 10.0), &c);
        assert!(out.rect.right() <= 30.0 + EPS);
        assert!(out.rect.bottom() <= 30.0 + EPS);
    }
}
