use thiserror::Error;

/// Error type shared by every fallible operation of the crate.
///
/// All variants describe malformed inputs (unknown labels, mismatched array
/// shapes). Numerically degenerate but well-formed situations, such as masked
/// data points or an iterative conversion hitting its iteration cap, are
/// reported through the output values instead, so that batch processing is
/// never aborted by a single bad point.
#[derive(Error, Debug, PartialEq)]
pub enum PerthError {
    #[error("Invalid rotation axis: {0} (expected x, y or z)")]
    InvalidRotationAxis(String),

    #[error("Invalid nodal correction convention: {0} (expected OTIS, ATLAS, netcdf, GOT or FES)")]
    InvalidConvention(String),

    #[error("Invalid geodetic conversion method: {0} (expected moritz, bowring or zhu)")]
    InvalidConversionMethod(String),

    #[error("Unsupported tidal constituent: {0}")]
    UnsupportedConstituent(String),

    #[error("Shape mismatch for {what}: expected {expected} elements, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Date parsing error: {0}")]
    TimeParse(String),
}
