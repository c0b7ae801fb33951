//! Find the nearest boxes to a point, in the plane and on the globe.
use flatrtree::prelude::*;

fn main() -> flatrtree::Result<()> {
    let mut builder = OmtBuilder::with_capacity(4);
    builder.add(0, 0.0, 0.0, 1.0, 1.0)?; // Box 0
    builder.add(1, 4.0, 0.0, 5.0, 1.0)?; // Box 1
    builder.add(2, 2.0, 0.0, 3.0, 1.0)?; // Box 2
    builder.add(3, 9.0, 9.0, 10.0, 10.0)?; // Box 3
    let tree = builder.finish(DEFAULT_DEGREE)?;

    let nearest: Vec<(i64, f64)> = tree.neighbors(6.0, 0.5, planar_box_dist).take(2).collect();
    println!("Nearest 2: {nearest:?}");
    assert_eq!(nearest, vec![(1, 1.0), (2, 3.0)]);

    // Cities as lon/lat points
    let mut builder = HilbertBuilder::new();
    builder.add(100, 2.3522, 48.8566, 2.3522, 48.8566)?; // Paris
    builder.add(200, 13.4050, 52.5200, 13.4050, 52.5200)?; // Berlin
    builder.add(300, -3.7038, 40.4168, -3.7038, 40.4168)?; // Madrid
    let cities = builder.finish(DEFAULT_DEGREE)?;

    // From London
    for (city, meters) in cities.neighbors(-0.1276, 51.5072, Metric::Geodetic) {
        println!("city {city}: {:.0} km", meters / 1000.0);
    }
    let closest = cities.neighbors(-0.1276, 51.5072, geodetic_box_dist).next().map(|(city, _)| city);
    assert_eq!(closest, Some(100), "Paris is closest to London");
    Ok(())
}
