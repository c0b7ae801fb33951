//! Hilbert sort-and-pack bulk loader, following the flatbush algorithm.
//!
//! Items are ordered by the Hilbert curve index of their box centers, then
//! packed sequentially into parents of up to `degree` children, level by level,
//! until a single root remains. Building is O(n log n), dominated by the sort.

use crate::builder::{Builder, check_degree, checked_item};
use crate::error::Result;
use crate::layout::{Item, LevelWriter, chunk_ranges, packed_node_count};
use crate::rtree::RTree;

const MAX_HILBERT: u32 = u16::MAX as u32;

/// Bulk loader that sorts items along a Hilbert curve and packs them sequentially.
///
/// Fast to build; internal nodes may overlap more than with
/// [`OmtBuilder`](crate::OmtBuilder).
///
/// # Example
/// ```
/// use flatrtree::prelude::*;
/// let mut builder = HilbertBuilder::with_capacity(3);
/// builder.add(0, 0.0, 0.0, 2.0, 2.0)?;
/// builder.add(1, 1.0, 1.0, 3.0, 3.0)?;
/// builder.add(2, 5.0, 5.0, 6.0, 6.0)?;
/// let tree = builder.finish(4)?;
/// assert_eq!(tree.len(), 3);
/// # Ok::<(), flatrtree::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct HilbertBuilder {
    items: Vec<Item>,
    /// Extent of all box centers: min x, min y, max x, max y
    center_bounds: [f64; 4],
}

impl HilbertBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty builder with room for `capacity` items
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            center_bounds: [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    /// Hilbert index of every item, normalized by the center extent
    fn hilbert_values(&self) -> Vec<u32> {
        let [min_x, min_y, max_x, max_y] = self.center_bounds;
        let hilbert_width = scale(max_x - min_x);
        let hilbert_height = scale(max_y - min_y);
        let max_cell = f64::from(MAX_HILBERT);

        self.items
            .iter()
            .map(|item| {
                let hx = ((item.center_x() - min_x) * hilbert_width).clamp(0.0, max_cell) as u32;
                let hy = ((item.center_y() - min_y) * hilbert_height).clamp(0.0, max_cell) as u32;
                hilbert_xy_to_index(hx, hy)
            })
            .collect()
    }
}

impl Default for HilbertBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder for HilbertBuilder {
    fn add(&mut self, item_ref: i64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> Result<()> {
        let item = checked_item(item_ref, minx, miny, maxx, maxy)?;
        let (cx, cy) = (item.center_x(), item.center_y());
        self.center_bounds[0] = self.center_bounds[0].min(cx);
        self.center_bounds[1] = self.center_bounds[1].min(cy);
        self.center_bounds[2] = self.center_bounds[2].max(cx);
        self.center_bounds[3] = self.center_bounds[3].max(cy);
        self.items.push(item);
        Ok(())
    }

    fn finish(self, degree: usize) -> Result<RTree> {
        check_degree(degree)?;
        let num_items = self.items.len();
        if num_items == 0 {
            return Ok(RTree::empty());
        }

        // Stable sort keeps insertion order among equal Hilbert values
        let hilbert_values = self.hilbert_values();
        let mut order: Vec<usize> = (0..num_items).collect();
        order.sort_by_key(|&i| hilbert_values[i]);
        let sorted: Vec<Item> = order.iter().map(|&i| self.items[i]).collect();

        let mut writer = LevelWriter::new(&sorted, packed_node_count(num_items, degree));
        loop {
            let level_len = writer.level_len();
            writer.push_level(chunk_ranges(level_len, degree));
            if writer.level_len() <= 1 {
                break;
            }
        }
        let (tree, height) = writer.finish();

        log::debug!(
            "hilbert build: {} items, degree {}, {} nodes, height {}",
            num_items,
            degree,
            tree.node_count(),
            height
        );
        Ok(tree)
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Grid cells per unit along an axis of the given extent
fn scale(extent: f64) -> f64 {
    if extent > 0.0 { f64::from(MAX_HILBERT) / extent } else { 0.0 }
}

/// Hilbert curve index computation
/// From https://github.com/rawrunprotected/hilbert_curves (public domain)
fn interleave(mut x: u32) -> u32 {
    x = (x | (x << 8)) & 0x00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333;
    x = (x | (x << 1)) & 0x5555_5555;
    x
}

#[expect(non_snake_case, reason = "mirrors the reference algorithm's prefix-scan names")]
fn hilbert_xy_to_index(x: u32, y: u32) -> u32 {
    // Initial prefix scan round, prime with x and y
    let mut a = x ^ y;
    let mut b = 0xFFFF ^ a;
    let mut c = 0xFFFF ^ (x | y);
    let mut d = x & (y ^ 0xFFFF);
    let mut A = a | (b >> 1);
    let mut B = (a >> 1) ^ a;
    let mut C = ((c >> 1) ^ (b & (d >> 1))) ^ c;
    let mut D = ((a & (c >> 1)) ^ (d >> 1)) ^ d;

    for shift in [2, 4] {
        a = A;
        b = B;
        c = C;
        d = D;
        A = (a & (a >> shift)) ^ (b & (b >> shift));
        B = (a & (b >> shift)) ^ (b & ((a ^ b) >> shift));
        C ^= (a & (c >> shift)) ^ (b & (d >> shift));
        D ^= (b & (c >> shift)) ^ ((a ^ b) & (d >> shift));
    }

    // Final round and projection
    a = A;
    b = B;
    c = C;
    d = D;
    C ^= (a & (c >> 8)) ^ (b & (d >> 8));
    D ^= (b & (c >> 8)) ^ ((a ^ b) & (d >> 8));

    // Undo transformation prefix scan
    a = C ^ (C >> 1);
    b = D ^ (D >> 1);

    // Recover index bits
    let i0 = x ^ y;
    let i1 = b | (0xFFFF ^ (i0 | a));

    (interleave(i1) << 1) | interleave(i0)
}
