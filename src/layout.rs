//! Bottom-up flat layout shared by both bulk loaders.
//!
//! Leaves are written first in their final order. Every parent level is then
//! appended as a list of contiguous child ranges over the level below, so the
//! last level written holds exactly one node: the root.

use std::ops::Range;

use crate::rtree::RTree;

/// One item accumulated by a builder
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Item {
    pub(crate) item_ref: i64,
    pub(crate) bbox: [f64; 4],
}

impl Item {
    #[inline]
    pub(crate) fn center_x(&self) -> f64 {
        (self.bbox[0] + self.bbox[2]) / 2.0
    }

    #[inline]
    pub(crate) fn center_y(&self) -> f64 {
        (self.bbox[1] + self.bbox[3]) / 2.0
    }
}

/// Writes nodes into the flat `refs` / `boxes` arrays level by level.
#[derive(Debug)]
pub(crate) struct LevelWriter {
    count: usize,
    refs: Vec<i64>,
    boxes: Vec<f64>,
    /// First node of the most recently written level
    level_start: usize,
    /// End slot of the last parent's child range, becomes the sentinel
    child_end: i64,
    /// Number of levels written, leaves included
    height: usize,
}

impl LevelWriter {
    /// Writes the leaf level. `capacity` is the expected total node count.
    pub(crate) fn new(items: &[Item], capacity: usize) -> Self {
        let mut refs = Vec::with_capacity(capacity + 1);
        let mut boxes = Vec::with_capacity(capacity * 4);
        for item in items {
            refs.push(item.item_ref);
            boxes.extend_from_slice(&item.bbox);
        }
        Self {
            count: items.len(),
            refs,
            boxes,
            level_start: 0,
            child_end: 0,
            height: 1,
        }
    }

    /// Number of nodes in the most recently written level
    pub(crate) fn level_len(&self) -> usize {
        self.refs.len() - self.level_start
    }

    /// Appends one parent level. Each group is a range of positions within the
    /// previous level; groups must be contiguous and in order.
    pub(crate) fn push_level<G>(&mut self, groups: G)
    where
        G: IntoIterator<Item = Range<usize>>,
    {
        let below = self.level_start;
        self.level_start = self.refs.len();

        for group in groups {
            let (start, end) = (below + group.start, below + group.end);
            let mut node_box = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
            for child in start..end {
                let i = child * 4;
                node_box[0] = node_box[0].min(self.boxes[i]);
                node_box[1] = node_box[1].min(self.boxes[i + 1]);
                node_box[2] = node_box[2].max(self.boxes[i + 2]);
                node_box[3] = node_box[3].max(self.boxes[i + 3]);
            }
            self.refs.push((start as i64) << 2);
            self.boxes.extend_from_slice(&node_box);
            self.child_end = (end as i64) << 2;
        }

        self.height += 1;
        log::trace!(
            "packed level {} with {} nodes over {} children",
            self.height - 1,
            self.level_len(),
            self.level_start - below
        );
    }

    /// Appends the sentinel and returns the finished index.
    pub(crate) fn finish(mut self) -> (RTree, usize) {
        debug_assert_eq!(self.level_len(), 1, "last level must be the root");
        self.refs.push(self.child_end);
        let tree = RTree { count: self.count, refs: self.refs, boxes: self.boxes };
        (tree, self.height)
    }
}

/// Contiguous groups of up to `degree` over `len` positions
pub(crate) fn chunk_ranges(len: usize, degree: usize) -> impl Iterator<Item = Range<usize>> {
    (0..len).step_by(degree).map(move |start| start..(start + degree).min(len))
}

/// Total node count of a tree packed sequentially with the given degree
pub(crate) fn packed_node_count(num_items: usize, degree: usize) -> usize {
    let mut count = num_items;
    let mut total_nodes = num_items;
    loop {
        count = count.div_ceil(degree);
        total_nodes += count;
        if count <= 1 {
            break;
        }
    }
    total_nodes
}
