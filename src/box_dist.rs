//! Distance strategies for nearest-neighbor queries.
//!
//! A box distance must never exceed the true distance from the query point to
//! any point inside the box, otherwise [`RTree::neighbors`](crate::RTree::neighbors)
//! can yield results out of order.
//!
//! Two strategies ship with the crate:
//! - [`planar_box_dist`]: Euclidean distance in the plane
//! - [`geodetic_box_dist`]: haversine distance in meters for lon/lat boxes
//!
//! ## Geodetic conventions
//!
//! - Boxes never cross the antimeridian: a box spans `[minx, maxx]` in plain
//!   degrees with `minx <= maxx`.
//! - Longitude differences wrap around the globe, so a query at `179.9` is
//!   close to a box touching `-180.0`.
//! - When the nearest box edge is 90 degrees of longitude or more away, the
//!   closest point on that edge is clamped to the pole on the query's side.
//! - Query points are expected within `[-180, 180] x [-90, 90]`.

use geo::{Distance, Haversine, Point};

/// Lower-bound distance from a point to a box.
///
/// Implemented for every `Fn(x, y, minx, miny, maxx, maxy) -> f64`, so plain
/// functions such as [`planar_box_dist`] can be passed directly.
pub trait BoxDistance {
    /// Distance from `(x, y)` to the nearest point of the box
    fn box_dist(&self, x: f64, y: f64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> f64;
}

impl<F> BoxDistance for F
where
    F: Fn(f64, f64, f64, f64, f64, f64) -> f64,
{
    #[inline]
    fn box_dist(&self, x: f64, y: f64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> f64 {
        self(x, y, minx, miny, maxx, maxy)
    }
}

/// Exact distance from a point to the geometry behind a leaf ref.
///
/// Used in place of the leaf's box distance. It need not be a lower bound.
pub trait ItemDistance {
    /// Distance from `(x, y)` to item `item_ref`
    fn item_dist(&self, x: f64, y: f64, item_ref: i64) -> f64;
}

impl<F> ItemDistance for F
where
    F: Fn(f64, f64, i64) -> f64,
{
    #[inline]
    fn item_dist(&self, x: f64, y: f64, item_ref: i64) -> f64 {
        self(x, y, item_ref)
    }
}

/// Runtime-selectable box distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Metric {
    /// Euclidean distance, see [`planar_box_dist`]
    #[default]
    Planar,
    /// Haversine distance in meters, see [`geodetic_box_dist`]
    Geodetic,
}

impl BoxDistance for Metric {
    #[inline]
    fn box_dist(&self, x: f64, y: f64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> f64 {
        match self {
            Self::Planar => planar_box_dist(x, y, minx, miny, maxx, maxy),
            Self::Geodetic => geodetic_box_dist(x, y, minx, miny, maxx, maxy),
        }
    }
}

/// Get distance along an axis
#[inline]
fn axis_distance(coordinate: f64, min: f64, max: f64) -> f64 {
    if coordinate < min {
        min - coordinate
    } else if coordinate > max {
        coordinate - max
    } else {
        0.0
    }
}

/// Euclidean distance from `(x, y)` to the nearest point of the box.
///
/// Zero when the point lies inside the box or on its boundary.
///
/// # Example
/// ```
/// use flatrtree::planar_box_dist;
/// assert_eq!(planar_box_dist(0.0, 0.0, 3.0, 4.0, 5.0, 6.0), 5.0);
/// assert_eq!(planar_box_dist(1.0, 1.0, 0.0, 0.0, 2.0, 2.0), 0.0);
/// ```
#[must_use]
pub fn planar_box_dist(x: f64, y: f64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> f64 {
    let dx = axis_distance(x, minx, maxx);
    let dy = axis_distance(y, miny, maxy);
    dx.hypot(dy)
}

/// Great-circle distance in meters from `(lon, lat)` to the nearest point of a
/// lon/lat box, using the haversine formula on a spherical earth.
///
/// See the module docs for antimeridian and pole conventions.
///
/// # Example
/// ```
/// use flatrtree::geodetic_box_dist;
/// // Inside the box
/// assert_eq!(geodetic_box_dist(10.0, 10.0, 0.0, 0.0, 20.0, 20.0), 0.0);
/// // One degree of latitude south of the box, about 111 km
/// let d = geodetic_box_dist(10.0, -1.0, 0.0, 0.0, 20.0, 20.0);
/// assert!((d - 111_195.0).abs() < 10.0);
/// ```
#[must_use]
pub fn geodetic_box_dist(lon: f64, lat: f64, minx: f64, miny: f64, maxx: f64, maxy: f64) -> f64 {
    let query = Point::new(lon, lat);

    // Between the box meridians: the nearest point shares the query's longitude.
    if lon >= minx && lon <= maxx {
        if lat < miny {
            return Haversine.distance(query, Point::new(lon, miny));
        }
        if lat > maxy {
            return Haversine.distance(query, Point::new(lon, maxy));
        }
        return 0.0;
    }

    // West or east of the box: measure to the closer edge meridian, wrapping
    // around the antimeridian.
    let hav_west = haversine_term(lon - minx);
    let hav_east = haversine_term(lon - maxx);
    let (edge_lon, hav_dlon) = if hav_west <= hav_east { (minx, hav_west) } else { (maxx, hav_east) };

    // The great circle through the query point and perpendicular to the edge
    // meridian reaches the meridian at this latitude.
    let extremum = vertex_lat(lat, hav_dlon);
    if extremum > miny && extremum < maxy {
        return Haversine.distance(query, Point::new(edge_lon, extremum));
    }

    let to_min = Haversine.distance(query, Point::new(edge_lon, miny));
    let to_max = Haversine.distance(query, Point::new(edge_lon, maxy));
    to_min.min(to_max)
}

/// `sin²(θ/2)` for an angle in degrees
#[inline]
fn haversine_term(degrees: f64) -> f64 {
    let s = (degrees.to_radians() / 2.0).sin();
    s * s
}

/// Latitude in degrees of the point on a meridian closest to `lat`, given the
/// haversine term of the longitude gap.
fn vertex_lat(lat: f64, hav_dlon: f64) -> f64 {
    let cos_dlon = 1.0 - 2.0 * hav_dlon;
    if cos_dlon <= 0.0 {
        return if lat > 0.0 { 90.0 } else { -90.0 };
    }
    (lat.to_radians().tan() / cos_dlon).atan().to_degrees()
}
