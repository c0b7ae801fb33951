//! Capability set shared by the bulk loaders.

use crate::error::{Error, Result};
use crate::layout::Item;
use crate::rtree::RTree;

/// Default branching factor
pub const DEFAULT_DEGREE: usize = 8;

/// Accumulates items and packs them into an [`RTree`] exactly once.
///
/// Implemented by [`HilbertBuilder`](crate::HilbertBuilder) and
/// [`OmtBuilder`](crate::OmtBuilder). `finish` consumes the builder, so it can
/// never be reused.
pub trait Builder {
    /// Adds an item with an opaque caller ref and its bounding box.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBox`] if `minx > maxx`, `miny > maxy`, or any
    /// coordinate is NaN. The item is not added.
    fn add(&mut self, item_ref: i64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<()>;

    /// Packs all added items into a tree where every parent has at most
    /// `degree` children.
    ///
    /// # Errors
    /// Returns [`Error::InvalidDegree`] if `degree < 2`, whatever was added.
    fn finish(self, degree: usize) -> Result<RTree>
    where
        Self: Sized;

    /// Number of items added so far
    fn len(&self) -> usize;

    /// Returns whether no items were added
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds an [`Item`] after checking its box
pub(crate) fn checked_item(item_ref: i64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<Item> {
    // Negated comparisons also reject NaN
    if !(minx <= maxx && miny <= maxy) {
        log::warn!("rejecting box for ref {item_ref}: ({minx}, {miny}, {maxx}, {maxy})");
        return Err(Error::InvalidBox { minx, miny, maxx, maxy });
    }
    Ok(Item { item_ref, bbox: [minx, miny, maxx, maxy] })
}

pub(crate) fn check_degree(degree: usize) -> Result<()> {
    if degree < 2 {
        return Err(Error::InvalidDegree(degree));
    }
    Ok(())
}
