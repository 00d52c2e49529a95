//! # Tidal elevation prediction
//!
//! ## Overview
//!
//! Reconstruction of tidal elevations from complex harmonic constants. Each
//! constituent contributes the real part of `hc * f * exp(i*(argument + u))`
//! where `f` and `u` are its nodal corrections and the argument advances
//! either along the tabulated angular speed (OTIS family) or along the
//! equilibrium argument (GOT and FES families).
//!
//! Four drivers cover the shapes that occur in practice:
//!
//! * [`drift`] — one time per point, as along a satellite ground track,
//! * [`map`] — a single epoch over many points,
//! * [`time_series`] — a single point over many epochs,
//! * [`grid`] — the full point by time matrix.
//!
//! Points flagged in the harmonic-constant mask stay flagged in the output
//! instead of contributing a silent zero.

use nalgebra::{DMatrix, DVector};
use std::ops::AddAssign;

use crate::arguments::{nodal_corrections, Convention, NodalCorrections};
use crate::constants::{MJD, SECONDS_PER_DAY, TIDE_EPOCH_MJD, TideDays};
use crate::constituents::{parameters, HarmonicConstants};
use crate::perth_errors::PerthError;

/// Elevation vector with a parallel validity mask.
///
/// Invalid entries keep a zero in `data`; use [`MaskedVector::filled`] to
/// export them as a fill value.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedVector {
    /// Elevations \[m\]
    pub data: DVector<f64>,
    /// Per-entry invalid flags
    pub mask: DVector<bool>,
}

impl MaskedVector {
    /// A valid zero vector of length `n`.
    pub fn zeros(n: usize) -> Self {
        MaskedVector {
            data: DVector::zeros(n),
            mask: DVector::from_element(n, false),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the vector has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Export the data with masked entries replaced by `fill`.
    pub fn filled(&self, fill: f64) -> DVector<f64> {
        DVector::from_fn(self.data.len(), |i, _| {
            if self.mask[i] {
                fill
            } else {
                self.data[i]
            }
        })
    }
}

/// Entry-wise sum; an entry masked on either side stays masked.
///
/// Panics
/// -------
/// When the two vectors differ in length.
impl AddAssign<&MaskedVector> for MaskedVector {
    fn add_assign(&mut self, other: &MaskedVector) {
        assert_eq!(self.len(), other.len(), "masked vector lengths differ");
        self.data += &other.data;
        for i in 0..self.mask.len() {
            self.mask[i] |= other.mask[i];
        }
    }
}

/// Elevation matrix (points by times) with a parallel validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedMatrix {
    /// Elevations \[m\], one row per point and one column per epoch
    pub data: DMatrix<f64>,
    /// Per-entry invalid flags
    pub mask: DMatrix<bool>,
}

impl MaskedMatrix {
    /// Export the data with masked entries replaced by `fill`.
    pub fn filled(&self, fill: f64) -> DMatrix<f64> {
        DMatrix::from_fn(self.data.nrows(), self.data.ncols(), |i, j| {
            if self.mask[(i, j)] {
                fill
            } else {
                self.data[(i, j)]
            }
        })
    }
}

/// Angular speed [rad/s] and reference phase [rad] of each constituent for
/// the OTIS argument; waves outside the parameter table advance at zero
/// speed so they only carry their nodal phase.
fn otis_speeds(constituents: &[String]) -> (Vec<f64>, Vec<f64>) {
    let speeds = constituents
        .iter()
        .map(|name| parameters(name).map_or(0.0, |p| p.omega))
        .collect();
    let phases = constituents
        .iter()
        .map(|name| parameters(name).map_or(0.0, |p| p.phase))
        .collect();
    (speeds, phases)
}

/// Phase of constituent `k` at time step `ti` \[rad\].
fn theta(
    t: TideDays,
    nodal: &NodalCorrections,
    speeds: &[f64],
    phases: &[f64],
    convention: Convention,
    ti: usize,
    k: usize,
) -> f64 {
    match convention {
        Convention::Otis => {
            speeds[k] * t * SECONDS_PER_DAY + phases[k] + nodal.u[(ti, k)]
        }
        Convention::Got | Convention::Fes => {
            nodal.arg[(ti, k)].to_radians() + nodal.u[(ti, k)]
        }
    }
}

/// Broadcast length of a point dimension against a time dimension.
///
/// A single point paired with many times runs as a time series; a single
/// time against many points as a map; equal lengths pair off one to one.
pub(crate) fn series_length(npts: usize, nt: usize) -> Result<usize, PerthError> {
    if npts == nt || nt == 1 {
        Ok(npts)
    } else if npts == 1 {
        Ok(nt)
    } else {
        Err(PerthError::ShapeMismatch {
            what: "time values",
            expected: npts,
            found: nt,
        })
    }
}

/// Shared reconstruction kernel over the broadcast of points and times.
fn reconstruct(
    t: &DVector<TideDays>,
    hc: &HarmonicConstants,
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<MaskedVector, PerthError> {
    let npts = hc.n_points();
    let nt = t.len();
    let n = series_length(npts, nt)?;

    let mjd: DVector<MJD> = t.map(|days| days + TIDE_EPOCH_MJD);
    let nodal = nodal_corrections(&mjd, &hc.constituents, deltat, convention)?;
    let (speeds, phases) = otis_speeds(&hc.constituents);

    let mut tide = MaskedVector::zeros(n);
    for i in 0..n {
        let ti = if nt > 1 { i } else { 0 };
        let pi = if npts > 1 { i } else { 0 };
        for k in 0..hc.n_constituents() {
            if hc.mask[(pi, k)] {
                tide.mask[i] = true;
                tide.data[i] = 0.0;
                break;
            }
            let th = theta(t[ti], &nodal, &speeds, &phases, convention, ti, k);
            let hc_k = hc.values[(pi, k)];
            tide.data[i] += nodal.f[(ti, k)] * (hc_k.re * th.cos() - hc_k.im * th.sin());
        }
    }
    Ok(tide)
}

/// Predict tides along a trajectory, one epoch per point.
///
/// Arguments
/// ---------
/// * `t`: time of each point \[days since 1992-01-01\].
/// * `hc`: harmonic constants, one row per point.
/// * `deltat`: `TT - UT1` \[days\] aligned with `t` (zeros for OTIS-family
///   models).
/// * `convention`: nodal correction flavor of the model.
///
/// Returns
/// --------
/// * Elevations \[m\] with the point mask carried through, or an error when
///   the shapes disagree or a constituent is unknown.
///
/// # See also
/// * [`map`] for a single epoch over many points.
/// * [`time_series`] for a single point over many epochs.
pub fn drift(
    t: &DVector<TideDays>,
    hc: &HarmonicConstants,
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<MaskedVector, PerthError> {
    if t.len() != hc.n_points() {
        return Err(PerthError::ShapeMismatch {
            what: "trajectory times",
            expected: hc.n_points(),
            found: t.len(),
        });
    }
    reconstruct(t, hc, deltat, convention)
}

/// Predict the tide field over many points at a single epoch.
///
/// Arguments
/// ---------
/// * `t`: the epoch \[days since 1992-01-01\].
/// * `hc`: harmonic constants, one row per point.
/// * `deltat`: `TT - UT1` \[days\] at the epoch.
/// * `convention`: nodal correction flavor of the model.
pub fn map(
    t: TideDays,
    hc: &HarmonicConstants,
    deltat: f64,
    convention: Convention,
) -> Result<MaskedVector, PerthError> {
    let times = DVector::from_element(1, t);
    let deltat = DVector::from_element(1, deltat);
    reconstruct(&times, hc, &deltat, convention)
}

/// Predict a tide series at a single point.
///
/// Arguments
/// ---------
/// * `t`: epochs \[days since 1992-01-01\].
/// * `hc`: harmonic constants restricted to one point (a single row).
/// * `deltat`: `TT - UT1` \[days\] aligned with `t`.
/// * `convention`: nodal correction flavor of the model.
pub fn time_series(
    t: &DVector<TideDays>,
    hc: &HarmonicConstants,
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<MaskedVector, PerthError> {
    if hc.n_points() != 1 {
        return Err(PerthError::ShapeMismatch {
            what: "time series points",
            expected: 1,
            found: hc.n_points(),
        });
    }
    reconstruct(t, hc, deltat, convention)
}

/// Predict the full point-by-time elevation matrix.
///
/// A point with any masked constituent is masked across every epoch.
///
/// Arguments
/// ---------
/// * `t`: epochs \[days since 1992-01-01\].
/// * `hc`: harmonic constants, one row per point.
/// * `deltat`: `TT - UT1` \[days\] aligned with `t`.
/// * `convention`: nodal correction flavor of the model.
pub fn grid(
    t: &DVector<TideDays>,
    hc: &HarmonicConstants,
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<MaskedMatrix, PerthError> {
    let npts = hc.n_points();
    let nt = t.len();
    let mjd: DVector<MJD> = t.map(|days| days + TIDE_EPOCH_MJD);
    let nodal = nodal_corrections(&mjd, &hc.constituents, deltat, convention)?;
    let (speeds, phases) = otis_speeds(&hc.constituents);

    let mut data = DMatrix::zeros(npts, nt);
    let mut mask = DMatrix::from_element(npts, nt, false);
    for i in 0..npts {
        let invalid = (0..hc.n_constituents()).any(|k| hc.mask[(i, k)]);
        if invalid {
            for j in 0..nt {
                mask[(i, j)] = true;
            }
            continue;
        }
        for j in 0..nt {
            for k in 0..hc.n_constituents() {
                let th = theta(t[j], &nodal, &speeds, &phases, convention, j, k);
                let hc_k = hc.values[(i, k)];
                data[(i, j)] += nodal.f[(j, k)] * (hc_k.re * th.cos() - hc_k.im * th.sin());
            }
        }
    }
    Ok(MaskedMatrix { data, mask })
}
