//! Event-driven constraint engine
//!
//! The host feeds structural, drag and resize events into [`Engine::handle`].
//! The engine works out what each event implies, applies the resulting style
//! deltas and moves to the document it is handed, and returns every change as
//! an [`Effect`] so the host can mirror it into its own tree and render the
//! visual feedback. Deferred work waits in a [`FrameScheduler`] until the
//! host sends [`HostEvent::FrameTick`].

mod scheduler;
mod session;

use std::fmt;

pub use scheduler::{FrameScheduler, FrameTask};
pub use session::{ActiveResize, DragKind, DragMember, DragSession};

use crate::config::EngineConfig;
use crate::constraint::{
    apply_soft_constraint, clamp, resize_in_table_cell, BlockedEdges, Handle, OverflowInfo,
};
use crate::geometry::{GeometryProvider, Point, Rect};
use crate::guides::{alignment_candidates, find_alignments, page_center_lines, AlignmentGuide};
use crate::model::{BoxId, BoxKind, Document, NodeRef, Property, StyleDelta};
use crate::zones::{
    drop_indicator_y, ensure_order, insertion_index, move_zone_to, reclassify, validate_insertion_index,
    zone_hover, OrderReport, Placement, Transition,
};

/// Event delivered by the host.
///
/// Pointer positions and proposed rectangles are page-relative and in
/// pixels, except `ResizeUpdate::proposed`, which is in the resized box's
/// parent frame.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    BoxAdded { id: BoxId },
    /// The box (and its subtree) is gone; removed from the document if the
    /// host has not done so already
    BoxRemoved { id: BoxId },
    /// The host changed the box's style
    BoxUpdated { id: BoxId },
    DragStart { id: BoxId, pointer: Point, selection: Vec<BoxId> },
    Drag { id: BoxId, pointer: Point },
    DragEnd { id: BoxId, pointer: Point, force_override: bool },
    ResizeInit { id: BoxId, handle: Handle },
    ResizeUpdate { id: BoxId, proposed: Rect, force_override: bool },
    ResizeEnd { id: BoxId },
    FrameTick,
}

impl HostEvent {
    /// Box the event is about, if any
    pub fn target(&self) -> Option<BoxId> {
        match self {
            HostEvent::BoxAdded { id }
            | HostEvent::BoxRemoved { id }
            | HostEvent::BoxUpdated { id }
            | HostEvent::DragStart { id, .. }
            | HostEvent::Drag { id, .. }
            | HostEvent::DragEnd { id, .. }
            | HostEvent::ResizeInit { id, .. }
            | HostEvent::ResizeUpdate { id, .. }
            | HostEvent::ResizeEnd { id } => Some(*id),
            HostEvent::FrameTick => None,
        }
    }
}

/// Visual feedback for the host to render. Never changes the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Header or footer under the dragged box, `None` to clear
    ZoneHighlight(Option<BoxId>),
    /// Page-relative y of the zone insertion line, `None` to hide it
    DropIndicator(Option<f64>),
    Guides { id: BoxId, guides: Vec<AlignmentGuide> },
    ClearGuides,
    /// A bound stopped the box
    Blocked { id: BoxId, edges: BlockedEdges },
    Overflow { zone: BoxId, info: OverflowInfo, forced: bool },
    ClearOverflow,
}

/// A change produced while handling one event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Style delta applied to a box
    Style { id: BoxId, delta: StyleDelta },
    /// Box re-homed under `parent` at `index`
    Moved { id: BoxId, parent: NodeRef, index: usize },
    /// Page children reordered
    Reordered(OrderReport),
    Feedback(Feedback),
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Style { id, delta } => write!(f, "style {} {}", id, delta),
            Effect::Moved { id, parent, index } => write!(f, "move {} -> {}[{}]", id, parent, index),
            Effect::Reordered(report) => write!(f, "reorder [{}]", report.changes.join("; ")),
            Effect::Feedback(feedback) => match feedback {
                Feedback::ZoneHighlight(Some(zone)) => write!(f, "highlight {}", zone),
                Feedback::ZoneHighlight(None) => write!(f, "highlight off"),
                Feedback::DropIndicator(Some(y)) => write!(f, "drop line at {}", y),
                Feedback::DropIndicator(None) => write!(f, "drop line off"),
                Feedback::Guides { id, guides } => write!(f, "guides {} x{}", id, guides.len()),
                Feedback::ClearGuides => write!(f, "guides off"),
                Feedback::Blocked { id, edges } => write!(f, "blocked {} {:?}", id, edges),
                Feedback::Overflow { zone, info, forced } => write!(
                    f,
                    "overflow {} needs {} ({} boxes{})",
                    zone,
                    info.min_required_height,
                    info.count(),
                    if *forced { ", forced" } else { "" }
                ),
                Feedback::ClearOverflow => write!(f, "overflow off"),
            },
        }
    }
}

/// Constraint engine state: configuration, the active gesture sessions and
/// the frame table. The document itself is owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    drag: Option<DragSession>,
    resize: Option<ActiveResize>,
    scheduler: FrameScheduler,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn resize(&self) -> Option<&ActiveResize> {
        self.resize.as_ref()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Handle one host event, applying its consequences to `doc`
    pub fn handle(
        &mut self,
        doc: &mut Document,
        geo: &impl GeometryProvider,
        event: HostEvent,
    ) -> Vec<Effect> {
        tracing::trace!(event = ?event, "host event");
        let mut out = Effects::default();
        match event {
            HostEvent::BoxAdded { id } => self.box_added(doc, geo, id, &mut out),
            HostEvent::BoxRemoved { id } => self.box_removed(doc, id, &mut out),
            HostEvent::BoxUpdated { id } => self.box_updated(doc, id),
            HostEvent::DragStart { id, pointer, selection } => {
                self.drag_start(doc, geo, id, pointer, &selection)
            }
            HostEvent::Drag { id, pointer } => self.drag_move(doc, geo, id, pointer, &mut out),
            HostEvent::DragEnd {
                id,
                pointer,
                force_override,
            } => self.drag_end(doc, geo, id, pointer, force_override, &mut out),
            HostEvent::ResizeInit { id, handle } => self.resize_init(doc, geo, id, handle),
            HostEvent::ResizeUpdate {
                id,
                proposed,
                force_override,
            } => self.resize_update(doc, geo, id, &proposed, force_override, &mut out),
            HostEvent::ResizeEnd { id } => self.resize_end(id, &mut out),
            HostEvent::FrameTick => self.frame(doc, geo, &mut out),
        }
        out.0
    }

    fn box_added(&mut self, doc: &mut Document, geo: &impl GeometryProvider, id: BoxId, out: &mut Effects) {
        let Some(node) = doc.get(id) else {
            return;
        };
        let kind = node.kind;
        let parent = node.parent();

        if kind.is_zone() {
            if let Some(placement) = reclassify(doc, geo, id, false) {
                out.place(doc, &placement);
            }
            self.scheduler.schedule(NodeRef::Page, FrameTask::Order);
            return;
        }
        if matches!(kind, BoxKind::TableStructure(_)) {
            return;
        }
        if doc.parent_kind(id).map(|k| k.is_table_cell()).unwrap_or(false) {
            // cell content flows inside the cell
            let delta = StyleDelta::new()
                .keyword(Property::Position, "static")
                .remove(Property::Left)
                .remove(Property::Top)
                .remove(Property::Right)
                .remove(Property::Bottom);
            out.style(doc, id, delta);
            return;
        }
        if parent == NodeRef::Page {
            self.scheduler.schedule(id.into(), FrameTask::Placement);
        } else {
            self.schedule_clamp(doc, id);
        }
    }

    fn box_removed(&mut self, doc: &mut Document, id: BoxId, out: &mut Effects) {
        let removed = if doc.contains(id) { doc.remove(id) } else { vec![id] };
        self.scheduler.forget(&removed);
        self.scheduler.retain_live(doc);

        let drag_gone = match self.drag.as_mut() {
            Some(drag) => !drag.retain_live(doc),
            None => false,
        };
        if drag_gone {
            tracing::debug!(box_id = %id, "drag cancelled by removal");
            self.drag = None;
            out.feedback(Feedback::ZoneHighlight(None));
            out.feedback(Feedback::DropIndicator(None));
            out.feedback(Feedback::ClearGuides);
        }
        if self.resize.as_ref().map(|r| !doc.contains(r.id())).unwrap_or(false) {
            tracing::debug!(box_id = %id, "resize cancelled by removal");
            self.resize = None;
            out.feedback(Feedback::ClearOverflow);
            out.feedback(Feedback::ClearGuides);
        }
    }

    fn box_updated(&mut self, doc: &Document, id: BoxId) {
        if doc.contains(id) {
            self.schedule_clamp(doc, id);
        }
    }

    /// Queue a clamp for the next frame. Nothing is queued while a drag is
    /// active: the box may leave its container until it is dropped.
    fn schedule_clamp(&mut self, doc: &Document, id: BoxId) {
        if self.drag.is_some() {
            tracing::trace!(box_id = %id, "clamp suppressed during drag");
            return;
        }
        match doc.kind(id) {
            Some(BoxKind::TableStructure(_)) | None => {}
            Some(_) => {
                self.scheduler.schedule(id.into(), FrameTask::Clamp);
            }
        }
    }

    fn drag_start(
        &mut self,
        doc: &Document,
        geo: &impl GeometryProvider,
        id: BoxId,
        pointer: Point,
        selection: &[BoxId],
    ) {
        if self.drag.is_some() {
            tracing::debug!(box_id = %id, "drag start ignored, a drag is active");
            return;
        }
        self.drag = DragSession::begin(doc, geo, id, pointer, selection);
        if let Some(drag) = &self.drag {
            // clamps queued before the drag would pull the boxes back mid-gesture
            for member in drag.ids() {
                self.scheduler.cancel(member.into(), FrameTask::Clamp);
            }
        }
    }

    fn drag_move(
        &mut self,
        doc: &mut Document,
        geo: &impl GeometryProvider,
        id: BoxId,
        pointer: Point,
        out: &mut Effects,
    ) {
        let Some(mut drag) = self.drag.take() else {
            return;
        };
        if drag.id != id {
            self.drag = Some(drag);
            return;
        }

        if let DragKind::Zone { insertion } = &mut drag.kind {
            let index = validate_insertion_index(doc, insertion_index(doc, geo, pointer.y, Some(id)));
            if *insertion != Some(index) {
                *insertion = Some(index);
                let y = drop_indicator_y(doc, geo, index, self.config.drop_indicator_offset);
                out.feedback(Feedback::DropIndicator(y));
            }
            self.drag = Some(drag);
            return;
        }

        let (dx, dy) = drag.offset(pointer);
        for member in drag.members() {
            let delta = member.moved_by(doc, dx, dy);
            out.style(doc, member.id, delta);
        }

        let view: &Document = doc;
        let hover = geo.rect(view, NodeRef::Page).and_then(|page| {
            let center = geo.rect(view, id.into())?.relative_to(page.origin()).center();
            zone_hover(view, geo, center)
        });
        if let DragKind::Free { hovered, .. } = &mut drag.kind {
            if *hovered != hover {
                *hovered = hover;
                out.feedback(Feedback::ZoneHighlight(hover));
            }
        }

        if self.config.alignment_guides {
            self.scheduler.schedule(id.into(), FrameTask::Guides);
        }
        self.drag = Some(drag);
    }

    fn drag_end(
        &mut self,
        doc: &mut Document,
        geo: &impl GeometryProvider,
        id: BoxId,
        pointer: Point,
        force_override: bool,
        out: &mut Effects,
    ) {
        let drag = match self.drag.take() {
            Some(drag) if drag.id == id => drag,
            other => {
                self.drag = other;
                return;
            }
        };

        if drag.is_zone() {
            let index = validate_insertion_index(doc, insertion_index(doc, geo, pointer.y, Some(id)));
            if move_zone_to(doc, id, index) {
                out.moved(doc, id);
            }
            let report = ensure_order(doc);
            if report.reordered {
                out.push(Effect::Reordered(report));
            }
            if let Some(placement) = reclassify(doc, geo, id, false) {
                out.place(doc, &placement);
            }
            out.feedback(Feedback::DropIndicator(None));
            tracing::debug!(zone = %id, index, "zone dropped");
            return;
        }

        // last pointer position wins even without a final drag event
        let (dx, dy) = drag.offset(pointer);
        for member in drag.members() {
            let delta = member.moved_by(doc, dx, dy);
            out.style(doc, member.id, delta);
        }

        for member in drag.ids() {
            self.scheduler.cancel(member.into(), FrameTask::Guides);
            let Some(placement) = reclassify(doc, geo, member, force_override) else {
                continue;
            };
            tracing::debug!(box_id = %member, transition = ?placement.transition, "dropped");
            out.place(doc, &placement);
            if placement.blocked {
                out.feedback(Feedback::Blocked {
                    id: member,
                    edges: BlockedEdges {
                        bottom: true,
                        ..BlockedEdges::default()
                    },
                });
            }
            let in_edge_zone = matches!(
                placement.transition,
                Transition::Stayed { .. } | Transition::Entered { .. }
            );
            if self.config.clamp_on_drop && !in_edge_zone {
                self.scheduler.schedule(member.into(), FrameTask::Clamp);
            } else {
                self.scheduler.cancel(member.into(), FrameTask::Clamp);
            }
        }

        out.feedback(Feedback::ZoneHighlight(None));
        out.feedback(Feedback::ClearGuides);
    }

    fn resize_init(&mut self, doc: &Document, geo: &impl GeometryProvider, id: BoxId, handle: Handle) {
        self.resize = ActiveResize::begin(doc, geo, id, handle);
        if self.resize.is_none() {
            tracing::debug!(box_id = %id, "box cannot be resized");
        }
    }

    fn resize_update(
        &mut self,
        doc: &mut Document,
        geo: &impl GeometryProvider,
        id: BoxId,
        proposed: &Rect,
        force_override: bool,
        out: &mut Effects,
    ) {
        let Some(resize) = self.resize.clone().filter(|r| r.id() == id) else {
            return;
        };
        match resize {
            ActiveResize::Zone { id, .. } => {
                let soft = apply_soft_constraint(doc, geo, id, proposed.height, force_override);
                out.style(doc, id, StyleDelta::new().px(Property::Height, soft.final_height));
                if soft.was_constrained {
                    out.feedback(Feedback::Blocked {
                        id,
                        edges: BlockedEdges {
                            bottom: true,
                            ..BlockedEdges::default()
                        },
                    });
                }
                if soft.overflow.would_overflow {
                    out.feedback(Feedback::Overflow {
                        zone: id,
                        info: soft.overflow,
                        forced: soft.is_forced,
                    });
                } else {
                    out.feedback(Feedback::ClearOverflow);
                }
            }
            ActiveResize::TableCell { id } => {
                let Some(result) = resize_in_table_cell(doc, geo, id, proposed, self.config.table_cell_min_size)
                else {
                    return;
                };
                out.style(doc, result.cell, result.cell_lock);
                out.style(doc, id, result.child);
            }
            ActiveResize::Box(session) => {
                let outcome = session.update(proposed);
                out.style(doc, id, outcome.style);
                if outcome.blocked.any() {
                    out.feedback(Feedback::Blocked {
                        id,
                        edges: outcome.blocked,
                    });
                }
                if self.config.alignment_guides {
                    self.scheduler.schedule(id.into(), FrameTask::Guides);
                }
            }
        }
    }

    fn resize_end(&mut self, id: BoxId, out: &mut Effects) {
        let Some(resize) = self.resize.take() else {
            return;
        };
        if resize.id() != id {
            self.resize = Some(resize);
            return;
        }
        match resize {
            ActiveResize::Zone { .. } => out.feedback(Feedback::ClearOverflow),
            _ => {
                self.scheduler.cancel(id.into(), FrameTask::Guides);
                out.feedback(Feedback::ClearGuides);
            }
        }
        tracing::debug!(box_id = %id, "resize ended");
    }

    /// Run every task queued for this frame
    fn frame(&mut self, doc: &mut Document, geo: &impl GeometryProvider, out: &mut Effects) {
        self.scheduler.retain_live(doc);
        let tasks = self.scheduler.take();
        if !tasks.is_empty() {
            tracing::trace!(tasks = tasks.len(), "frame");
        }
        for (target, task) in tasks {
            match (target, task) {
                (NodeRef::Page, FrameTask::Order) => {
                    let report = ensure_order(doc);
                    if report.reordered {
                        out.push(Effect::Reordered(report));
                    }
                }
                (NodeRef::Page, _) => {}
                (NodeRef::Box(id), FrameTask::Clamp) => {
                    // a drag may have started since the clamp was queued
                    if self.drag.is_some() {
                        continue;
                    }
                    if let Some(delta) = clamp(doc, geo, id) {
                        tracing::debug!(box_id = %id, delta = %delta, "clamped");
                        out.style(doc, id, delta);
                    }
                }
                (NodeRef::Box(id), FrameTask::Guides) => {
                    let center = if self.config.page_center_guides {
                        page_center_lines(doc, geo)
                    } else {
                        None
                    };
                    let candidates = alignment_candidates(doc, id);
                    let guides = find_alignments(
                        doc,
                        geo,
                        id,
                        &candidates,
                        center,
                        self.config.alignment_threshold,
                    );
                    out.feedback(Feedback::Guides { id, guides });
                }
                (NodeRef::Box(id), FrameTask::Placement) => {
                    if doc.parent(id) != Some(NodeRef::Page) {
                        continue;
                    }
                    if let Some(placement) = reclassify(doc, geo, id, false) {
                        out.place(doc, &placement);
                    }
                    self.schedule_clamp(doc, id);
                }
                (NodeRef::Box(_), FrameTask::Order) => {}
            }
        }
    }
}

/// Collects effects while applying them to the document
#[derive(Default)]
struct Effects(Vec<Effect>);

impl Effects {
    fn push(&mut self, effect: Effect) {
        self.0.push(effect);
    }

    fn feedback(&mut self, feedback: Feedback) {
        self.0.push(Effect::Feedback(feedback));
    }

    fn style(&mut self, doc: &mut Document, id: BoxId, delta: StyleDelta) {
        if delta.is_empty() {
            return;
        }
        if doc.apply_delta(id, &delta) {
            self.0.push(Effect::Style { id, delta });
        }
    }

    fn moved(&mut self, doc: &Document, id: BoxId) {
        if let (Some(parent), Some(index)) = (doc.parent(id), doc.index_in_parent(id)) {
            self.0.push(Effect::Moved { id, parent, index });
        }
    }

    fn place(&mut self, doc: &mut Document, placement: &Placement) {
        let rehome = placement.changes_parent(doc);
        if !doc.apply_placement(placement) {
            return;
        }
        if rehome {
            self.moved(doc, placement.id);
        }
        if !placement.delta.is_empty() {
            self.0.push(Effect::Style {
                id: placement.id,
                delta: placement.delta.clone(),
            });
        }
    }
}
