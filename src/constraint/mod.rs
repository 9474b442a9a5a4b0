//! Spatial constraints on single boxes: clamping, resizing, zone height floors

pub mod clamp;
pub mod overflow;
pub mod resize;

pub use clamp::{clamp, clamp_in_footer, clamp_in_header, clamp_in_zone, ZoneClamp};
pub use overflow::{apply_soft_constraint, detect_overflow, OverflowInfo, OverflowingBox, SoftConstraint};
pub use resize::{
    minimum_size, resize_bounds, resize_in_table_cell, solve, BlockedEdges, EdgeLock, Handle,
    ResizeBounds, ResizeConstraints, ResizeOutcome, ResizeSession, TableCellResize, UnknownHandle,
};
