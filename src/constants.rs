//! # Constants and type definitions for Perth
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `Perth` library.
//!
//! ## Overview
//!
//! - Temporal constants (tide-model epoch, J2000, length of day)
//! - Unit conversions (degrees ↔ radians, days ↔ seconds)
//! - Core type aliases used across the crate
//!
//! These definitions are used by all main modules, including the astronomical arguments,
//! nodal corrections, tide prediction and the geodetic transforms.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00 TT)
pub const T2000: f64 = 51544.5;

/// MJD epoch of the tide-model time origin (1992-01-01 00:00:00 UTC).
///
/// Harmonic tide models distribute their Greenwich phases relative to this
/// date; every time series handled by the prediction routines counts days
/// from here.
pub const TIDE_EPOCH_MJD: MJD = 48622.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Hours → degrees of Earth rotation (15°/h)
pub const DEGH: f64 = 15.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;

/// Modified Julian Date (days)
pub type MJD = f64;

/// Days elapsed since [`TIDE_EPOCH_MJD`]
pub type TideDays = f64;
