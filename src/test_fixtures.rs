//! Shared fixtures for the test modules.

use crate::{Builder, DEFAULT_DEGREE, HilbertBuilder, OmtBuilder, RTree};

/// Branching factors exercised by every fixture sweep
pub(crate) const TEST_DEGREES: [usize; 5] = [2, 4, DEFAULT_DEGREE, 16, 32];

/// Which bulk loader produced a fixture tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BuilderKind {
    Hilbert,
    Omt,
}

impl BuilderKind {
    pub(crate) const ALL: [Self; 2] = [Self::Hilbert, Self::Omt];

    /// Builds a tree from `boxes`, using each box's position as its ref
    pub(crate) fn build(self, boxes: &[[f64; 4]], degree: usize) -> RTree {
        let built = match self {
            Self::Hilbert => fill(HilbertBuilder::with_capacity(boxes.len()), boxes).finish(degree),
            Self::Omt => fill(OmtBuilder::with_capacity(boxes.len()), boxes).finish(degree),
        };
        built.expect("fixture degree is valid")
    }
}

fn fill<B: Builder>(mut builder: B, boxes: &[[f64; 4]]) -> B {
    for (i, b) in boxes.iter().enumerate() {
        builder.add(i as i64, b[0], b[1], b[2], b[3]).expect("fixture box is valid");
    }
    builder
}

/// One built tree plus the boxes it was built from
#[derive(Debug)]
pub(crate) struct TestCase {
    pub(crate) name: String,
    pub(crate) index: RTree,
    pub(crate) items: Vec<[f64; 4]>,
}

/// Every builder x degree x count combination: counts are 0, 1, degree and 100
pub(crate) fn create_test_cases() -> Vec<TestCase> {
    let mut cases = Vec::new();
    for kind in BuilderKind::ALL {
        for degree in TEST_DEGREES {
            for count in [0, 1, degree, 100] {
                let items = FIXTURE_BOXES[..count].to_vec();
                cases.push(TestCase {
                    name: format!("{kind:?}/degree={degree}/count={count}"),
                    index: kind.build(&items, degree),
                    items,
                });
            }
        }
    }
    cases
}

/// Routes `log` output to the test harness
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Refs of every box intersecting the query, by linear scan, sorted
pub(crate) fn brute_force_search(items: &[[f64; 4]], query: [f64; 4]) -> Vec<i64> {
    let [min_x, min_y, max_x, max_y] = query;
    items
        .iter()
        .enumerate()
        .filter(|(_, b)| !(max_x < b[0] || max_y < b[1] || min_x > b[2] || min_y > b[3]))
        .map(|(i, _)| i as i64)
        .collect()
}

/// Checks the flat-index invariants: box validity, leaf boxes, tight parent
/// boxes, fan-out and child ordering. Panics with `name` on the first breach.
pub(crate) fn assert_tree_structure(name: &str, tree: &RTree, items: &[[f64; 4]], degree: usize) {
    assert_eq!(tree.len(), items.len(), "{name}: count");
    if items.is_empty() {
        assert!(tree.refs().is_empty() && tree.boxes().is_empty(), "{name}: empty tree has nodes");
        return;
    }
    assert_eq!(tree.boxes().len(), tree.node_count() * 4, "{name}: boxes length");
    assert_eq!(tree.refs().len(), tree.node_count() + 1, "{name}: refs length");

    for node in 0..tree.node_count() {
        let (minx, miny, maxx, maxy) = tree.node_box(node).expect("node exists");
        assert!(minx <= maxx && miny <= maxy, "{name}: node {node} box is inverted");

        if node < tree.len() {
            let item_ref = tree.refs()[node];
            let b = items[item_ref as usize];
            assert_eq!([minx, miny, maxx, maxy], b, "{name}: leaf {node} box differs from item {item_ref}");
            continue;
        }

        let children = tree.children(node);
        assert!(
            (1..=degree).contains(&children.len()),
            "{name}: node {node} has {} children",
            children.len()
        );
        assert!(children.end <= node, "{name}: node {node} has children after itself");

        let mut union = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for child in children {
            let (cminx, cminy, cmaxx, cmaxy) = tree.node_box(child).expect("child exists");
            union = [union[0].min(cminx), union[1].min(cminy), union[2].max(cmaxx), union[3].max(cmaxy)];
        }
        assert_eq!([minx, miny, maxx, maxy], union, "{name}: node {node} box is not tight");
    }

    let mut leaf_refs: Vec<i64> = tree.refs()[..tree.len()].to_vec();
    leaf_refs.sort_unstable();
    assert_eq!(leaf_refs, (0..items.len() as i64).collect::<Vec<i64>>(), "{name}: leaves are not a permutation");
}

/// Boxes shared by the fixture sweeps, 100 entries of (minx, miny, maxx, maxy)
pub(crate) const FIXTURE_BOXES: [[f64; 4]; 100] = [
    [8.0, 62.0, 11.0, 66.0], [57.0, 17.0, 57.0, 19.0], [76.0, 26.0, 79.0, 29.0], [36.0, 56.0, 38.0, 56.0],
    [92.0, 77.0, 96.0, 80.0], [87.0, 70.0, 90.0, 74.0], [43.0, 41.0, 47.0, 43.0], [0.0, 58.0, 2.0, 62.0],
    [76.0, 86.0, 80.0, 89.0], [27.0, 13.0, 27.0, 15.0], [71.0, 63.0, 75.0, 67.0], [25.0, 2.0, 27.0, 2.0],
    [87.0, 6.0, 88.0, 6.0], [22.0, 90.0, 23.0, 93.0], [22.0, 89.0, 22.0, 93.0], [57.0, 11.0, 61.0, 13.0],
    [61.0, 55.0, 63.0, 56.0], [17.0, 85.0, 21.0, 87.0], [33.0, 43.0, 37.0, 43.0], [6.0, 1.0, 7.0, 3.0],
    [80.0, 87.0, 80.0, 87.0], [23.0, 50.0, 26.0, 52.0], [58.0, 89.0, 58.0, 89.0], [12.0, 30.0, 15.0, 34.0],
    [32.0, 58.0, 36.0, 61.0], [41.0, 84.0, 44.0, 87.0], [44.0, 18.0, 44.0, 19.0], [13.0, 63.0, 15.0, 67.0],
    [52.0, 70.0, 54.0, 74.0], [57.0, 59.0, 58.0, 59.0], [17.0, 90.0, 20.0, 92.0], [48.0, 53.0, 52.0, 56.0],
    [92.0, 68.0, 92.0, 72.0], [26.0, 52.0, 30.0, 52.0], [56.0, 23.0, 57.0, 26.0], [88.0, 48.0, 88.0, 48.0],
    [66.0, 13.0, 67.0, 15.0], [7.0, 82.0, 8.0, 86.0], [46.0, 68.0, 50.0, 68.0], [37.0, 33.0, 38.0, 36.0],
    [6.0, 15.0, 8.0, 18.0], [85.0, 36.0, 89.0, 38.0], [82.0, 45.0, 84.0, 48.0], [12.0, 2.0, 16.0, 3.0],
    [26.0, 15.0, 26.0, 16.0], [55.0, 23.0, 59.0, 26.0], [76.0, 37.0, 79.0, 39.0], [86.0, 74.0, 90.0, 77.0],
    [16.0, 75.0, 18.0, 78.0], [44.0, 18.0, 45.0, 21.0], [52.0, 67.0, 54.0, 71.0], [59.0, 78.0, 62.0, 78.0],
    [24.0, 5.0, 24.0, 8.0], [64.0, 80.0, 64.0, 83.0], [66.0, 55.0, 70.0, 55.0], [0.0, 17.0, 2.0, 19.0],
    [15.0, 71.0, 18.0, 74.0], [87.0, 57.0, 87.0, 59.0], [6.0, 34.0, 7.0, 37.0], [34.0, 30.0, 37.0, 32.0],
    [51.0, 19.0, 53.0, 19.0], [72.0, 51.0, 73.0, 55.0], [29.0, 45.0, 30.0, 45.0], [94.0, 94.0, 96.0, 95.0],
    [7.0, 22.0, 11.0, 24.0], [86.0, 45.0, 87.0, 48.0], [33.0, 62.0, 34.0, 65.0], [18.0, 10.0, 21.0, 14.0],
    [64.0, 66.0, 67.0, 67.0], [64.0, 25.0, 65.0, 28.0], [27.0, 4.0, 31.0, 6.0], [84.0, 4.0, 85.0, 5.0],
    [48.0, 80.0, 50.0, 81.0], [1.0, 61.0, 3.0, 61.0], [71.0, 89.0, 74.0, 92.0], [40.0, 42.0, 43.0, 43.0],
    [27.0, 64.0, 28.0, 66.0], [46.0, 26.0, 50.0, 26.0], [53.0, 83.0, 57.0, 87.0], [14.0, 75.0, 15.0, 79.0],
    [31.0, 45.0, 34.0, 45.0], [89.0, 84.0, 92.0, 88.0], [84.0, 51.0, 85.0, 53.0], [67.0, 87.0, 67.0, 89.0],
    [39.0, 26.0, 43.0, 27.0], [47.0, 61.0, 47.0, 63.0], [23.0, 49.0, 25.0, 53.0], [12.0, 3.0, 14.0, 5.0],
    [16.0, 50.0, 19.0, 53.0], [63.0, 80.0, 64.0, 84.0], [22.0, 63.0, 22.0, 64.0], [26.0, 66.0, 29.0, 66.0],
    [2.0, 15.0, 3.0, 15.0], [74.0, 77.0, 77.0, 79.0], [64.0, 11.0, 68.0, 11.0], [38.0, 4.0, 39.0, 8.0],
    [83.0, 73.0, 87.0, 77.0], [85.0, 52.0, 89.0, 56.0], [74.0, 60.0, 76.0, 63.0], [62.0, 66.0, 65.0, 67.0],
];
