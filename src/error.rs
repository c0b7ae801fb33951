//! Error type shared by the builders, the flat index and the wire codec.

use thiserror::Error;

/// Errors returned by index construction and (de)serialization.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    /// `finish` was called with a branching factor below 2.
    #[error("invalid argument: degree < 2 (got {0})")]
    InvalidDegree(usize),

    /// A box with inverted or NaN bounds was passed to `add`.
    #[error("invalid box: ({minx}, {miny}, {maxx}, {maxy})")]
    InvalidBox {
        /// Left edge
        minx: f64,
        /// Bottom edge
        miny: f64,
        /// Right edge
        maxx: f64,
        /// Top edge
        maxy: f64,
    },

    /// The requested number of decimal digits cannot be represented.
    #[error("invalid precision: {0} (must be at most {max})", max = crate::serialization::MAX_PRECISION)]
    InvalidPrecision(u32),

    /// A coordinate whose scaled value does not fit the fixed-point encoding.
    #[error("coordinate {value} cannot be encoded with precision {precision}")]
    CoordinateOutOfRange {
        /// Offending coordinate
        value: f64,
        /// Requested decimal digits
        precision: u32,
    },

    /// Malformed bytes passed to `deserialize`.
    #[error("decode error: {0}")]
    Decode(String),

    /// Raw parts that do not describe a valid flat index.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
