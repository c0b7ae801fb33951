//! Encode a tree to bytes and restore it.
use flatrtree::prelude::*;

fn main() -> flatrtree::Result<()> {
    let mut builder = HilbertBuilder::with_capacity(3);
    builder.add(0, 10.0, 10.0, 15.0, 15.0)?; // Box 0
    builder.add(1, 20.0, 20.0, 25.0, 25.0)?; // Box 1
    builder.add(2, 30.0, 10.0, 35.0, 15.0)?; // Box 2
    let tree = builder.finish(DEFAULT_DEGREE)?;

    let bytes = serialize(&tree, 6)?;
    println!("Encoded {} items into {} bytes", tree.len(), bytes.len());

    let loaded = deserialize(&bytes)?;
    let mut before: Vec<i64> = tree.search(15.0, 15.0, 25.0, 25.0).collect();
    let mut after: Vec<i64> = loaded.search(15.0, 15.0, 25.0, 25.0).collect();
    before.sort_unstable();
    after.sort_unstable();
    println!("Before: {before:?}, after: {after:?}");
    assert_eq!(before, after, "Restored tree must answer the same");

    // Corrupted input is rejected, not trusted
    match deserialize(&bytes[..bytes.len() - 1]) {
        Ok(_) => println!("Truncated input was accepted"),
        Err(e) => println!("Rejected truncated input: {e}"),
    }

    // Precision beyond MAX_PRECISION is an error
    match serialize(&tree, 17) {
        Ok(_) => println!("Precision 17 was accepted"),
        Err(e) => println!("Rejected precision 17: {e}"),
    }
    Ok(())
}
