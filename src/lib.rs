//! # flatrtree - Flat, immutable R-tree
//!
//! A packed R-tree over axis-aligned bounding boxes, built once by bulk loading
//! and then queried any number of times.
//!
//! ## Features
//!
//! - **Flat layout**: nodes live in two parallel arrays (`boxes`, `refs`), children
//!   are addressed by contiguous index ranges instead of pointers
//! - **Two bulk loaders**: [`HilbertBuilder`] (Hilbert curve sort-and-pack) and
//!   [`OmtBuilder`] (Overlap Minimizing Top-down partitioning)
//! - **Lazy queries**: [`RTree::search`] and [`RTree::neighbors`] are iterators;
//!   stop pulling and the traversal stops
//! - **Pluggable distance**: planar or geodetic box distances, plus an optional
//!   exact per-item distance
//! - **Compact encoding**: [`serialize`] / [`deserialize`] with fixed-point coordinates
//!
//! ## Quick Start
//!
//! ```rust
//! use flatrtree::prelude::*;
//!
//! let mut builder = HilbertBuilder::new();
//!
//! // Add boxes with an opaque ref each (ref, min_x, min_y, max_x, max_y)
//! builder.add(0, 0.0, 0.0, 2.0, 2.0)?;    // large box
//! builder.add(1, 1.0, 1.0, 3.0, 3.0)?;    // overlapping box
//! builder.add(2, 5.0, 5.0, 6.0, 6.0)?;    // distant box
//! builder.add(3, 1.5, 1.5, 2.5, 2.5)?;    // small box inside others
//!
//! // Pack the index; the builder is consumed
//! let tree = builder.finish(DEFAULT_DEGREE)?;
//!
//! // Boxes intersecting a region
//! let mut found: Vec<i64> = tree.search(1.2, 1.2, 2.8, 2.8).collect();
//! found.sort();
//! assert_eq!(found, vec![0, 1, 3]);
//!
//! // Nearest boxes to a point, closest first
//! let (nearest, dist) = tree.neighbors(5.5, 7.0, planar_box_dist).next().unwrap();
//! assert_eq!((nearest, dist), (2, 1.0));
//! # Ok::<(), flatrtree::Error>(())
//! ```
//!
//! ## How It Works
//!
//! Leaves are stored first, in packing order, followed by parent nodes level by
//! level up to the root, which is always the last node. A parent's ref is the
//! offset of its first child's box; its children end where the next node's
//! children begin, with a trailing sentinel bounding the root.
//!
//! The index is read-only once built, so it can be shared between threads and
//! queried concurrently without locking.

pub mod box_dist;
pub mod builder;
pub mod error;
pub mod hilbert_builder;
mod layout;
pub mod omt_builder;
pub mod prelude;
pub mod queries;
pub mod rtree;
pub mod serialization;

pub use box_dist::{BoxDistance, ItemDistance, Metric, geodetic_box_dist, planar_box_dist};
pub use builder::{Builder, DEFAULT_DEGREE};
pub use error::{Error, Result};
pub use hilbert_builder::HilbertBuilder;
pub use omt_builder::OmtBuilder;
pub use queries::{Neighbors, NoItemDist, Search};
pub use rtree::RTree;
pub use serialization::{MAX_PRECISION, deserialize, serialize};

#[cfg(test)]
mod test_fixtures;
