//! Coordinate Space Geometry
//!
//! Pure value types for the bounded 2-D space the overlay partitions.
//!
//! ## Core Concepts
//! - **Zone**: a half-open axis-aligned rectangle owned by exactly one peer.
//! - **Adjacency**: two zones are neighbors along a direction when their facing
//!   edges coincide (within `EDGE_EPSILON`) and their spans on the other axis overlap.
//! - **Split**: a square zone is halved vertically, any other zone horizontally,
//!   which keeps aspect ratios bounded across repeated joins.
//! - **Routing distance**: containment, then distance to the rectangle, then
//!   distance to the centroid as the tie-break.
//! - **Keyword placement**: keywords map deterministically to a point in the space.

pub mod keyword;
pub mod zone;

pub use keyword::keyword_point;
pub use zone::{
    Adjacency, Direction, EDGE_EPSILON, HEIGHT_MAX, PointDistance, SplitKind, WIDTH_MAX, Zone,
};

#[cfg(test)]
mod tests;
