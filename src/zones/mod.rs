//! Zone-level operations: membership on drop and page ordering

pub mod ordering;
pub mod placement;

pub use ordering::{
    drop_indicator_y, ensure_order, insertion_index, move_zone_to, validate_insertion_index,
    OrderReport,
};
pub use placement::{
    reclassify, zone_hover, zone_normalization, Anchor, LocalPosition, Placement, Transition,
    ZoneFrame,
};
