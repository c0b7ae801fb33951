//! Find boxes that intersect a query rectangle.
use flatrtree::prelude::*;

fn main() -> flatrtree::Result<()> {
    let mut builder = HilbertBuilder::with_capacity(3);
    builder.add(10, 0.0, 0.0, 1.0, 1.0)?; // Box 10
    builder.add(20, 2.0, 2.0, 3.0, 3.0)?; // Box 20 (outside query)
    builder.add(30, 0.5, 0.5, 1.5, 1.5)?; // Box 30
    let tree = builder.finish(DEFAULT_DEGREE)?;

    let mut results: Vec<i64> = tree.search(0.7, 0.7, 1.3, 1.3).collect();
    results.sort_unstable();
    println!("Intersecting: {results:?}");

    // Query rectangle (0.7, 0.7, 1.3, 1.3) intersects boxes 10 and 30, but not box 20
    assert_eq!(results, vec![10, 30], "Expected boxes 10 and 30");

    // Only the first hit is computed
    let first = tree.search(0.0, 0.0, 3.0, 3.0).next();
    println!("First hit: {first:?}");
    assert!(first.is_some(), "Full query should hit something");
    Ok(())
}
