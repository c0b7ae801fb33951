//! Overlap Minimizing Top-down (OMT) bulk loader.
//!
//! The tree height is fixed up front from the item count and degree. Each
//! group of items is then split top-down: sorted by center along its wider
//! axis, cut into roughly `sqrt(children)` slices, each slice sorted along the
//! other axis and cut into subtrees of exactly one child's capacity. Every
//! leaf ends up at the same depth, and sibling boxes overlap far less than with
//! sequential packing, at the price of sorting once per level.

use std::ops::Range;

use crate::builder::{Builder, check_degree, checked_item};
use crate::error::Result;
use crate::layout::{Item, LevelWriter};
use crate::rtree::RTree;

/// Bulk loader using Overlap Minimizing Top-down partitioning.
///
/// # Example
/// ```
/// use flatrtree::prelude::*;
/// let mut builder = OmtBuilder::new();
/// for i in 0..20 {
///     let f = f64::from(i);
///     builder.add(i64::from(i), f, f, f + 0.5, f + 0.5)?;
/// }
/// let tree = builder.finish(4)?;
/// assert_eq!(tree.search(0.0, 0.0, 2.0, 2.0).count(), 3);
/// # Ok::<(), flatrtree::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct OmtBuilder {
    items: Vec<Item>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn other(self) -> Self {
        match self {
            Self::X => Self::Y,
            Self::Y => Self::X,
        }
    }

    fn center(self, item: &Item) -> f64 {
        match self {
            Self::X => item.center_x(),
            Self::Y => item.center_y(),
        }
    }

    /// Axis along which the item centers spread the most; ties go to x
    fn widest(items: &[Item]) -> Self {
        let mut bounds = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for item in items {
            let (cx, cy) = (item.center_x(), item.center_y());
            bounds[0] = bounds[0].min(cx);
            bounds[1] = bounds[1].min(cy);
            bounds[2] = bounds[2].max(cx);
            bounds[3] = bounds[3].max(cy);
        }
        if bounds[3] - bounds[1] > bounds[2] - bounds[0] { Self::Y } else { Self::X }
    }

    /// Stable sort by center along this axis
    fn sort(self, items: &mut [Item]) {
        items.sort_by(|a, b| self.center(a).total_cmp(&self.center(b)));
    }
}

/// Output of the top-down partition, consumed bottom-up by the [`LevelWriter`]
struct Partition {
    degree: usize,
    /// Items in final leaf order
    leaves: Vec<Item>,
    /// `levels[k]` holds the child ranges of nodes at height `k + 1`,
    /// as positions within the level below
    levels: Vec<Vec<Range<usize>>>,
}

impl Partition {
    /// Emits the subtree of height `height` holding `items`, children first,
    /// then appends its own node to `levels[height - 1]`.
    fn build_subtree(&mut self, items: &mut [Item], height: usize) {
        if height == 1 {
            let start = self.leaves.len();
            self.leaves.extend_from_slice(items);
            self.levels[0].push(start..self.leaves.len());
            return;
        }

        let child_capacity = capacity(self.degree, height - 1);
        let num_children = items.len().div_ceil(child_capacity);
        let num_slices = ceil_sqrt(num_children);
        let slice_len = child_capacity * num_children.div_ceil(num_slices);

        let axis = Axis::widest(items);
        axis.sort(items);

        let first_child = self.levels[height - 2].len();
        for slice in items.chunks_mut(slice_len) {
            axis.other().sort(slice);
            for group in slice.chunks_mut(child_capacity) {
                self.build_subtree(group, height - 1);
            }
        }
        let last_child = self.levels[height - 2].len();
        self.levels[height - 1].push(first_child..last_child);
    }
}

impl OmtBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty builder with room for `capacity` items
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity) }
    }
}

impl Builder for OmtBuilder {
    fn add(&mut self, item_ref: i64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<()> {
        self.items.push(checked_item(item_ref, minx, miny, maxx, maxy)?);
        Ok(())
    }

    fn finish(mut self, degree: usize) -> Result<RTree> {
        check_degree(degree)?;
        let num_items = self.items.len();
        if num_items == 0 {
            return Ok(RTree::empty());
        }

        let height = tree_height(num_items, degree);
        let mut partition = Partition {
            degree,
            leaves: Vec::with_capacity(num_items),
            levels: vec![Vec::new(); height],
        };
        partition.build_subtree(&mut self.items, height);

        let parents: usize = partition.levels.iter().map(Vec::len).sum();
        let mut writer = LevelWriter::new(&partition.leaves, num_items + parents);
        for level in partition.levels {
            writer.push_level(level);
        }
        let (tree, written_height) = writer.finish();
        debug_assert_eq!(written_height, height + 1);

        log::debug!(
            "omt build: {} items, degree {}, {} nodes, height {}",
            num_items,
            degree,
            tree.node_count(),
            written_height
        );
        Ok(tree)
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Number of parent levels needed so that `degree^height >= num_items`
fn tree_height(num_items: usize, degree: usize) -> usize {
    let mut height = 1;
    let mut reach = degree;
    while reach < num_items {
        reach = reach.saturating_mul(degree);
        height += 1;
    }
    height
}

/// Items held by a subtree with `height` parent levels
fn capacity(degree: usize, height: usize) -> usize {
    (0..height).fold(1usize, |acc, _| acc.saturating_mul(degree))
}

fn ceil_sqrt(n: usize) -> usize {
    let mut root = 1;
    while root * root < n {
        root += 1;
    }
    root
}
