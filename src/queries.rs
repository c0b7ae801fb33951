//! Lazy range and nearest-neighbor queries over [`RTree`].
//!
//! Both queries are pull-based iterators that keep their traversal state
//! (an explicit stack or a priority queue) inside the iterator. Dropping an
//! iterator early stops all work.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::ops::Range;

use crate::box_dist::{BoxDistance, ItemDistance};
use crate::rtree::RTree;

/// Item distance type used by [`RTree::neighbors`], where leaves are ranked by
/// their box distance.
pub type NoItemDist = fn(f64, f64, i64) -> f64;

impl RTree {
    /// Returns refs of all items whose box intersects the query rectangle.
    ///
    /// Boxes that only touch the query boundary are included. Results come in
    /// no particular order.
    ///
    /// # Example
    /// ```
    /// use flatrtree::prelude::*;
    /// let mut builder = HilbertBuilder::new();
    /// builder.add(10, 0.0, 0.0, 2.0, 2.0)?;
    /// builder.add(11, 5.0, 5.0, 6.0, 6.0)?;
    /// let tree = builder.finish(DEFAULT_DEGREE)?;
    ///
    /// let found: Vec<i64> = tree.search(1.0, 1.0, 3.0, 3.0).collect();
    /// assert_eq!(found, vec![10]);
    /// # Ok::<(), flatrtree::Error>(())
    /// ```
    pub fn search(&self, minx: f64, miny: f64, maxx: f64, maxy: f64) -> Search<'_> {
        let cursor = match self.root() {
            Some(root) => self.children(root),
            None => 0..0,
        };
        Search {
            tree: self,
            query: [minx, miny, maxx, maxy],
            cursor,
            stack: Vec::new(),
        }
    }

    /// Returns items in order of increasing distance from `(x, y)`.
    ///
    /// `box_dist` must be a lower bound of the distance to anything inside a
    /// box. It ranks both parent nodes and leaves. Yields `(ref, distance)`.
    ///
    /// # Example
    /// ```
    /// use flatrtree::prelude::*;
    /// let mut builder = OmtBuilder::new();
    /// builder.add(0, 0.0, 0.0, 1.0, 1.0)?;
    /// builder.add(1, 4.0, 0.0, 5.0, 1.0)?;
    /// builder.add(2, 2.0, 0.0, 3.0, 1.0)?;
    /// let tree = builder.finish(DEFAULT_DEGREE)?;
    ///
    /// let nearest: Vec<(i64, f64)> = tree.neighbors(6.0, 0.5, planar_box_dist).take(2).collect();
    /// assert_eq!(nearest, vec![(1, 1.0), (2, 3.0)]);
    /// # Ok::<(), flatrtree::Error>(())
    /// ```
    pub fn neighbors<B: BoxDistance>(&self, x: f64, y: f64, box_dist: B) -> Neighbors<'_, B, NoItemDist> {
        Neighbors::new(self, x, y, box_dist, None)
    }

    /// Like [`RTree::neighbors`], but leaves are ranked by `item_dist`, the
    /// exact distance to the geometry behind each ref. Parent nodes are still
    /// ranked by `box_dist`.
    pub fn neighbors_with_item_dist<B: BoxDistance, I: ItemDistance>(
        &self,
        x: f64,
        y: f64,
        box_dist: B,
        item_dist: I,
    ) -> Neighbors<'_, B, I> {
        Neighbors::new(self, x, y, box_dist, Some(item_dist))
    }
}

/// Iterator returned by [`RTree::search`].
#[derive(Clone, Debug)]
pub struct Search<'a> {
    tree: &'a RTree,
    query: [f64; 4],
    /// Remaining children of the node being scanned
    cursor: Range<usize>,
    /// Parent nodes waiting to be scanned
    stack: Vec<usize>,
}

impl Iterator for Search<'_> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let [min_x, min_y, max_x, max_y] = self.query;
        loop {
            while let Some(pos) = self.cursor.next() {
                let node_box = self.tree.get_box(pos);
                if max_x < node_box[0] || max_y < node_box[1] || min_x > node_box[2] || min_y > node_box[3] {
                    continue;
                }
                if self.tree.is_leaf(pos) {
                    return Some(self.tree.refs[pos]);
                }
                self.stack.push(pos);
            }
            let node = self.stack.pop()?;
            self.cursor = self.tree.children(node);
        }
    }
}

impl std::iter::FusedIterator for Search<'_> {}

/// Priority queue entry, ordered so that `BinaryHeap` pops the smallest
/// distance first. Equal distances pop the lower node index first.
#[derive(Clone, Copy, Debug)]
struct QueueEntry {
    dist: f64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior
        other.dist.total_cmp(&self.dist).then_with(|| other.node.cmp(&self.node))
    }
}

/// Iterator returned by [`RTree::neighbors`] and
/// [`RTree::neighbors_with_item_dist`].
pub struct Neighbors<'a, B, I> {
    tree: &'a RTree,
    x: f64,
    y: f64,
    box_dist: B,
    item_dist: Option<I>,
    queue: BinaryHeap<QueueEntry>,
}

impl<'a, B: BoxDistance, I: ItemDistance> Neighbors<'a, B, I> {
    fn new(tree: &'a RTree, x: f64, y: f64, box_dist: B, item_dist: Option<I>) -> Self {
        let mut queue = BinaryHeap::new();
        if let Some(root) = tree.root() {
            queue.push(QueueEntry { dist: 0.0, node: root });
        }
        Self { tree, x, y, box_dist, item_dist, queue }
    }

    /// Pushes every child of parent node `node` with its distance
    fn expand(&mut self, node: usize) {
        for child in self.tree.children(node) {
            let dist = match &self.item_dist {
                Some(item_dist) if self.tree.is_leaf(child) => {
                    item_dist.item_dist(self.x, self.y, self.tree.refs[child])
                }
                _ => {
                    let [min_x, min_y, max_x, max_y] = self.tree.get_box(child);
                    self.box_dist.box_dist(self.x, self.y, min_x, min_y, max_x, max_y)
                }
            };
            self.queue.push(QueueEntry { dist, node: child });
        }
    }
}

impl<B: BoxDistance, I: ItemDistance> Iterator for Neighbors<'_, B, I> {
    type Item = (i64, f64);

    fn next(&mut self) -> Option<(i64, f64)> {
        // A leaf at the head is closer than anything still unexplored.
        while let Some(entry) = self.queue.pop() {
            if self.tree.is_leaf(entry.node) {
                return Some((self.tree.refs[entry.node], entry.dist));
            }
            self.expand(entry.node);
        }
        None
    }
}

impl<B: BoxDistance, I: ItemDistance> std::iter::FusedIterator for Neighbors<'_, B, I> {}

impl<B, I> fmt::Debug for Neighbors<'_, B, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighbors")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("item_dist", &self.item_dist.is_some())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}
