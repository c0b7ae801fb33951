//! Flat, immutable R-tree.
//!
//! All nodes live in two parallel arrays indexed by node position:
//! - `boxes`: `[minx, miny, maxx, maxy]` per node, flattened (4 `f64` per node)
//! - `refs`: one entry per node plus a trailing sentinel
//!
//! Leaf nodes occupy positions `[0, count)` and carry the caller's ref.
//! Parent nodes are appended after the leaves, level by level, so the root is
//! always the last node. A parent's `refs` entry is the slot offset
//! (node index << 2) of its first child in `boxes`; its children end where the
//! next node's children begin.

use crate::error::{Error, Result};

/// Immutable flat R-tree produced by [`HilbertBuilder`](crate::HilbertBuilder),
/// [`OmtBuilder`](crate::OmtBuilder) or [`deserialize`](crate::deserialize).
///
/// Queries are provided by [`RTree::search`] and [`RTree::neighbors`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RTree {
    /// Number of leaf items
    pub(crate) count: usize,
    /// Leaf refs, then parent child offsets, then the sentinel
    pub(crate) refs: Vec<i64>,
    /// Flattened node boxes
    pub(crate) boxes: Vec<f64>,
}

impl RTree {
    /// Creates an index holding no items. Every query on it yields nothing.
    ///
    /// # Example
    /// ```
    /// use flatrtree::RTree;
    /// let tree = RTree::empty();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.search(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY).count(), 0);
    /// ```
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rebuilds an index from its raw parts.
    ///
    /// `refs` must hold one entry per node plus the sentinel and `boxes` four
    /// coordinates per node. Parent entries must point at a non-empty run of
    /// children that come before the parent, so every traversal terminates.
    /// Every box must be ordered (`min <= max`, no NaN) and every parent box
    /// must be the exact union of its children's boxes.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLayout`] if the parts do not describe a flat index.
    pub fn from_parts(count: usize, refs: Vec<i64>, boxes: Vec<f64>) -> Result<Self> {
        validate_layout(count, &refs, &boxes)?;
        Ok(Self { count, refs, boxes })
    }

    /// Consumes the index and returns `(count, refs, boxes)`.
    #[must_use]
    pub fn into_parts(self) -> (usize, Vec<i64>, Vec<f64>) {
        (self.count, self.refs, self.boxes)
    }

    /// Returns the number of indexed items (the `count` wire field)
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns whether the index holds no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of nodes (leaves and parents)
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.boxes.len() / 4
    }

    /// Raw refs array: leaf refs, parent slot offsets, sentinel.
    #[must_use]
    pub fn refs(&self) -> &[i64] {
        &self.refs
    }

    /// Raw flattened boxes, four coordinates per node.
    #[must_use]
    pub fn boxes(&self) -> &[f64] {
        &self.boxes
    }

    /// Returns `(minx, miny, maxx, maxy)` of node `node`, if it exists.
    #[must_use]
    pub fn node_box(&self, node: usize) -> Option<(f64, f64, f64, f64)> {
        let b = self.boxes.get(node * 4..node * 4 + 4)?;
        Some((b[0], b[1], b[2], b[3]))
    }

    /// Returns whether `node` is a leaf
    #[inline]
    pub(crate) fn is_leaf(&self, node: usize) -> bool {
        node < self.count
    }

    /// Position of the root node, `None` when the index is empty
    #[inline]
    pub(crate) fn root(&self) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        self.refs.len().checked_sub(2)
    }

    /// Child node range of parent node `node`
    #[inline]
    pub(crate) fn children(&self, node: usize) -> std::ops::Range<usize> {
        (self.refs[node] >> 2) as usize..(self.refs[node + 1] >> 2) as usize
    }

    /// Box of node `node` as a fixed array
    #[inline]
    pub(crate) fn get_box(&self, node: usize) -> [f64; 4] {
        let i = node * 4;
        [self.boxes[i], self.boxes[i + 1], self.boxes[i + 2], self.boxes[i + 3]]
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RTree {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct RawParts {
            count: usize,
            refs: Vec<i64>,
            boxes: Vec<f64>,
        }

        let raw = <RawParts as serde::Deserialize<'de>>::deserialize(deserializer)?;
        Self::from_parts(raw.count, raw.refs, raw.boxes).map_err(serde::de::Error::custom)
    }
}

fn validate_layout(count: usize, refs: &[i64], boxes: &[f64]) -> Result<()> {
    if refs.is_empty() && boxes.is_empty() {
        if count != 0 {
            return Err(Error::InvalidLayout(format!(
                "count is {count} but the index has no nodes"
            )));
        }
        return Ok(());
    }

    if boxes.len() % 4 != 0 {
        return Err(Error::InvalidLayout(format!(
            "{} box coordinates is not a multiple of 4",
            boxes.len()
        )));
    }
    let node_count = boxes.len() / 4;
    if refs.len() != node_count + 1 {
        return Err(Error::InvalidLayout(format!(
            "{} refs for {node_count} nodes (expected {})",
            refs.len(),
            node_count + 1
        )));
    }
    if count == 0 || count >= node_count {
        return Err(Error::InvalidLayout(format!(
            "{count} leaves cannot form a tree of {node_count} nodes"
        )));
    }

    // Parent child ranges must be slot-aligned, non-empty and strictly below the parent.
    for node in count..node_count {
        let (start, end) = (refs[node], refs[node + 1]);
        if start < 0 || start % 4 != 0 || end % 4 != 0 || start >= end {
            return Err(Error::InvalidLayout(format!(
                "node {node} has malformed child range [{start}, {end})"
            )));
        }
        if (end >> 2) as usize > node {
            return Err(Error::InvalidLayout(format!(
                "node {node} references children past itself (end slot {end})"
            )));
        }
    }

    for (node, b) in boxes.chunks_exact(4).enumerate() {
        // Negated comparisons also reject NaN
        if !(b[0] <= b[2] && b[1] <= b[3]) {
            return Err(Error::InvalidLayout(format!("node {node} has an inverted box {b:?}")));
        }
        if node < count {
            continue;
        }
        let first = (refs[node] >> 2) as usize;
        let last = (refs[node + 1] >> 2) as usize;
        let union = boxes[first * 4..last * 4].chunks_exact(4).fold(
            [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
            |acc, c| [acc[0].min(c[0]), acc[1].min(c[1]), acc[2].max(c[2]), acc[3].max(c[3])],
        );
        if b != &union[..] {
            return Err(Error::InvalidLayout(format!(
                "node {node} box {b:?} is not the union of its children {union:?}"
            )));
        }
    }
    Ok(())
}
