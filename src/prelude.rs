//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the crate.
//! Users can import everything they need with:
//!
//! ```
//! use flatrtree::prelude::*;
//! ```

pub use crate::{
    Builder, DEFAULT_DEGREE, HilbertBuilder, Metric, OmtBuilder, RTree, deserialize, geodetic_box_dist,
    planar_box_dist, serialize,
};
