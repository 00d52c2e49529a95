//! # Tidal constituent parameters and harmonic constants
//!
//! ## Overview
//!
//! This module carries the physical description of the tidal spectrum used by
//! the prediction routines:
//!
//! * [`Parameters`] — angular frequency, Greenwich phase at the 1992 tide
//!   epoch, equilibrium amplitude, body-tide correction and spherical
//!   harmonic species for the 29 constituents solved by the OTIS family of
//!   models,
//! * [`HarmonicConstants`] — complex amplitudes of a set of constituents at a
//!   set of points, with an optional validity mask, as interpolated from a
//!   model grid.

use nalgebra::{Complex, DMatrix};

use crate::constants::RADEG;
use crate::perth_errors::PerthError;

/// Physical parameters of a single tidal constituent.
///
/// Frequencies and phases are the ones the OTIS/ATLAS solution files were
/// computed with, so predictions reconstruct the model fields exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    /// Amplitude of the equilibrium tide \[m\] (zero for shallow-water terms)
    pub amplitude: f64,
    /// Greenwich phase at 1992-01-01T00:00:00 \[rad\]
    pub phase: f64,
    /// Angular frequency \[rad/s\]
    pub omega: f64,
    /// Body-tide loading and self-attraction correction
    pub alpha: f64,
    /// Spherical harmonic dependence of the generating potential
    /// (0 long-period, 1 diurnal, 2 semi-diurnal)
    pub species: u8,
}

/// Parameters of the 29 constituents in the OTIS solution order.
const PARAMETERS: [(&str, Parameters); 29] = [
    ("m2", Parameters { amplitude: 0.2441, phase: 1.731557546, omega: 1.405189e-04, alpha: 0.693, species: 2 }),
    ("s2", Parameters { amplitude: 0.112743, phase: 0.000000000, omega: 1.454441e-04, alpha: 0.693, species: 2 }),
    ("k1", Parameters { amplitude: 0.141565, phase: 0.173003674, omega: 7.292117e-05, alpha: 0.736, species: 1 }),
    ("o1", Parameters { amplitude: 0.100661, phase: 1.558553872, omega: 6.759774e-05, alpha: 0.695, species: 1 }),
    ("n2", Parameters { amplitude: 0.046397, phase: 6.050721243, omega: 1.378797e-04, alpha: 0.693, species: 2 }),
    ("p1", Parameters { amplitude: 0.046848, phase: 6.110181633, omega: 7.252295e-05, alpha: 0.706, species: 1 }),
    ("k2", Parameters { amplitude: 0.030684, phase: 3.487600001, omega: 1.458423e-04, alpha: 0.693, species: 2 }),
    ("q1", Parameters { amplitude: 0.019273, phase: 5.877717569, omega: 6.495854e-05, alpha: 0.695, species: 1 }),
    ("2n2", Parameters { amplitude: 0.006141, phase: 4.086699633, omega: 1.352405e-04, alpha: 0.693, species: 2 }),
    ("mu2", Parameters { amplitude: 0.007408, phase: 3.463115091, omega: 1.355937e-04, alpha: 0.693, species: 2 }),
    ("nu2", Parameters { amplitude: 0.008811, phase: 5.427136701, omega: 1.382329e-04, alpha: 0.693, species: 2 }),
    ("l2", Parameters { amplitude: 0.006931, phase: 0.553986502, omega: 1.431581e-04, alpha: 0.693, species: 2 }),
    ("t2", Parameters { amplitude: 0.006608, phase: 0.052841931, omega: 1.452450e-04, alpha: 0.693, species: 2 }),
    ("j1", Parameters { amplitude: 0.007915, phase: 2.137025284, omega: 7.556036e-05, alpha: 0.695, species: 1 }),
    ("m1", Parameters { amplitude: 0.007915, phase: 2.436575100, omega: 7.028195e-05, alpha: 0.695, species: 1 }),
    ("oo1", Parameters { amplitude: 0.004338, phase: 1.929046130, omega: 7.824458e-05, alpha: 0.695, species: 1 }),
    ("rho1", Parameters { amplitude: 0.003661, phase: 5.254133027, omega: 6.531174e-05, alpha: 0.695, species: 1 }),
    ("mf", Parameters { amplitude: 0.042041, phase: 1.756042456, omega: 0.053234e-04, alpha: 0.693, species: 0 }),
    ("mm", Parameters { amplitude: 0.022191, phase: 1.964021610, omega: 0.026392e-04, alpha: 0.693, species: 0 }),
    ("ssa", Parameters { amplitude: 0.019567, phase: 3.487600001, omega: 0.003982e-04, alpha: 0.693, species: 0 }),
    ("m4", Parameters { amplitude: 0.0, phase: 3.463115091, omega: 2.810377e-04, alpha: 0.693, species: 0 }),
    ("ms4", Parameters { amplitude: 0.0, phase: 1.731557546, omega: 2.859630e-04, alpha: 0.693, species: 0 }),
    ("mn4", Parameters { amplitude: 0.0, phase: 1.499093481, omega: 2.783984e-04, alpha: 0.693, species: 0 }),
    ("m6", Parameters { amplitude: 0.0, phase: 5.194672637, omega: 4.215566e-04, alpha: 0.693, species: 0 }),
    ("m8", Parameters { amplitude: 0.0, phase: 6.926230184, omega: 5.620755e-04, alpha: 0.693, species: 0 }),
    ("mk3", Parameters { amplitude: 0.0, phase: 1.904561220, omega: 2.134402e-04, alpha: 0.693, species: 0 }),
    ("s6", Parameters { amplitude: 0.0, phase: 0.000000000, omega: 4.363323e-04, alpha: 0.693, species: 0 }),
    ("2sm2", Parameters { amplitude: 0.0, phase: 4.551627762, omega: 1.503693e-04, alpha: 0.693, species: 0 }),
    ("2mk3", Parameters { amplitude: 0.0, phase: 3.809122439, omega: 2.081166e-04, alpha: 0.693, species: 0 }),
];

/// Look up the [`Parameters`] of a constituent by name.
///
/// Matching is case-insensitive. Returns `None` for constituents outside the
/// 29-entry OTIS table; callers reconstructing a tide treat those as having
/// zero frequency and phase.
pub fn parameters(name: &str) -> Option<Parameters> {
    PARAMETERS
        .iter()
        .find(|(cons, _)| cons.eq_ignore_ascii_case(name))
        .map(|(_, params)| *params)
}

/// Complex harmonic constants of `n_constituents` tidal constituents at
/// `n_points` locations.
///
/// The value at point `i` for constituent `k` is `amp * exp(-i * phase)`, the
/// convention in which a tide series is rebuilt as the real part of
/// `hc * exp(i * (arg + u))`. The mask flags points that fell outside the
/// model domain during interpolation; masked points propagate into the
/// predictions rather than being silently zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicConstants {
    /// Constituent names, one per column of `values`
    pub constituents: Vec<String>,
    /// Complex amplitudes, one row per point and one column per constituent
    pub values: DMatrix<Complex<f64>>,
    /// Invalid-data flags, same shape as `values`
    pub mask: DMatrix<bool>,
}

impl HarmonicConstants {
    /// Build harmonic constants with every point valid.
    ///
    /// Arguments
    /// ---------
    /// * `constituents`: constituent names, one per column of `values`.
    /// * `values`: complex amplitudes, `n_points` rows by `n_constituents`
    ///   columns.
    ///
    /// Returns
    /// --------
    /// * The harmonic constants, or [`PerthError::ShapeMismatch`] when the
    ///   number of columns differs from the number of names.
    pub fn new(
        constituents: Vec<String>,
        values: DMatrix<Complex<f64>>,
    ) -> Result<Self, PerthError> {
        let mask = DMatrix::from_element(values.nrows(), values.ncols(), false);
        Self::with_mask(constituents, values, mask)
    }

    /// Build harmonic constants with an explicit validity mask.
    pub fn with_mask(
        constituents: Vec<String>,
        values: DMatrix<Complex<f64>>,
        mask: DMatrix<bool>,
    ) -> Result<Self, PerthError> {
        if values.ncols() != constituents.len() {
            return Err(PerthError::ShapeMismatch {
                what: "harmonic constant columns",
                expected: constituents.len(),
                found: values.ncols(),
            });
        }
        if mask.shape() != values.shape() {
            return Err(PerthError::ShapeMismatch {
                what: "harmonic constant mask rows",
                expected: values.nrows(),
                found: mask.nrows(),
            });
        }
        Ok(HarmonicConstants {
            constituents,
            values,
            mask,
        })
    }

    /// Build harmonic constants from amplitude and phase fields.
    ///
    /// Arguments
    /// ---------
    /// * `constituents`: constituent names, one per column.
    /// * `amplitude`: tidal amplitudes \[m\], `n_points` by `n_constituents`.
    /// * `phase`: Greenwich phase lags \[degrees\], same shape.
    pub fn from_amplitude_phase(
        constituents: Vec<String>,
        amplitude: &DMatrix<f64>,
        phase: &DMatrix<f64>,
    ) -> Result<Self, PerthError> {
        if phase.shape() != amplitude.shape() {
            return Err(PerthError::ShapeMismatch {
                what: "phase rows",
                expected: amplitude.nrows(),
                found: phase.nrows(),
            });
        }
        let values = DMatrix::from_fn(amplitude.nrows(), amplitude.ncols(), |i, k| {
            Complex::from_polar(amplitude[(i, k)], -phase[(i, k)] * RADEG)
        });
        Self::new(constituents, values)
    }

    /// Number of locations.
    pub fn n_points(&self) -> usize {
        self.values.nrows()
    }

    /// Number of constituents.
    pub fn n_constituents(&self) -> usize {
        self.values.ncols()
    }

    /// Column index of a constituent, matched case-insensitively.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.constituents
            .iter()
            .position(|cons| cons.eq_ignore_ascii_case(name))
    }
}
