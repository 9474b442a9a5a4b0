//! Per-box frame scheduling
//!
//! Work that should wait for the next frame (post-drop clamps, guide
//! recomputation, placement of freshly added boxes, page order passes) is
//! queued here instead of running inside the event that asked for it. A
//! target holds at most one pending task of each kind; scheduling the same
//! kind again replaces the unfired one and moves it to the back. Tasks of
//! different kinds never displace each other. The host drives the clock by
//! sending a frame tick.

use std::fmt;

use crate::model::{BoxId, Document, NodeRef};

/// Deferred piece of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    /// Clamp the box into its container
    Clamp,
    /// Recompute alignment guides for the box
    Guides,
    /// Find the zone a newly added page child belongs to
    Placement,
    /// Restore header-first, footer-last page order
    Order,
}

impl fmt::Display for FrameTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameTask::Clamp => "clamp",
            FrameTask::Guides => "guides",
            FrameTask::Placement => "placement",
            FrameTask::Order => "order",
        };
        write!(f, "{}", name)
    }
}

/// Pending tasks keyed by target, in scheduling order
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    pending: Vec<(NodeRef, FrameTask)>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for `target`. Returns true when an unfired task of the
    /// same kind was replaced.
    pub fn schedule(&mut self, target: NodeRef, task: FrameTask) -> bool {
        let replaced = self.cancel(target, task);
        if replaced {
            tracing::trace!(target_node = %target, task = %task, "frame replaced");
        }
        self.pending.push((target, task));
        replaced
    }

    /// Drop the pending `task` of `target`, if any
    pub fn cancel(&mut self, target: NodeRef, task: FrameTask) -> bool {
        match self.pending.iter().position(|entry| *entry == (target, task)) {
            Some(index) => {
                self.pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every pending task of `target`. Returns how many were dropped.
    pub fn cancel_all(&mut self, target: NodeRef) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(t, _)| *t != target);
        before - self.pending.len()
    }

    /// Pending tasks of `target`, in scheduling order
    pub fn pending(&self, target: NodeRef) -> Vec<FrameTask> {
        self.pending
            .iter()
            .filter(|(t, _)| *t == target)
            .map(|(_, task)| *task)
            .collect()
    }

    pub fn is_scheduled(&self, target: NodeRef, task: FrameTask) -> bool {
        self.pending.contains(&(target, task))
    }

    pub fn is_pending(&self, target: NodeRef) -> bool {
        self.pending.iter().any(|(t, _)| *t == target)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every task whose box is no longer in the document.
    /// Returns how many were dropped.
    pub fn retain_live(&mut self, doc: &Document) -> usize {
        let before = self.pending.len();
        self.pending.retain(|(target, task)| {
            let live = match target {
                NodeRef::Page => true,
                NodeRef::Box(id) => doc.contains(*id),
            };
            if !live {
                tracing::debug!(target_node = %target, task = %task, "pending frame dropped");
            }
            live
        });
        before - self.pending.len()
    }

    /// Drop the tasks of the given boxes
    pub fn forget(&mut self, ids: &[BoxId]) {
        self.pending.retain(|(target, _)| match target {
            NodeRef::Box(id) => !ids.contains(id),
            NodeRef::Page => true,
        });
    }

    /// Take every pending task for this frame, leaving the table empty
    pub fn take(&mut self) -> Vec<(NodeRef, FrameTask)> {
        std::mem::take(&mut self.pending)
    }
}
