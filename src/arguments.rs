//! # Equilibrium arguments and nodal corrections
//!
//! ## Overview
//!
//! The phase of every tidal constituent advances along a combination of six
//! astronomical angles. This module evaluates, for a set of dates:
//!
//! * the equilibrium argument `G` of each of the 60 constituents carried by
//!   the supported models (degrees, Greenwich epoch),
//! * the 18.6-year nodal modulation of amplitude (`f`) and phase (`u`),
//!   in the flavor expected by each model family ([`Convention`]).
//!
//! The OTIS family applies the full Schureman-style corrections to all 60
//! waves, the GOT family only corrects the eight constituents it distributes
//! (plus M4), and FES evaluates the corrections from the obliquity of the
//! lunar orbit directly.
//!
//! ## Example
//!
//! ```rust, no_run
//! use nalgebra::DVector;
//! use perth::arguments::{nodal_corrections, Convention};
//!
//! let mjd = DVector::from_vec(vec![48622.0, 48622.5]);
//! let deltat = DVector::zeros(2);
//! let constituents = vec!["m2".to_string(), "k1".to_string()];
//! let nodal = nodal_corrections(&mjd, &constituents, &deltat, Convention::Otis)?;
//! assert_eq!(nodal.f.shape(), (2, 2));
//! # Ok::<(), perth::perth_errors::PerthError>(())
//! ```

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use itertools::izip;
use nalgebra::{DMatrix, DVector};

use crate::astro::{mean_longitudes, LongitudeMethod};
use crate::constants::{Degree, Radian, DEGH, MJD, RADEG};
use crate::perth_errors::PerthError;

/// Names of the 60 constituents with tabulated arguments, in column order.
pub const ALL_CONSTITUENTS: [&str; 60] = [
    "sa", "ssa", "mm", "msf", "mf", "mt", "alpha1", "2q1", "sigma1", "q1",
    "rho1", "o1", "tau1", "m1", "chi1", "pi1", "p1", "s1", "k1", "psi1",
    "phi1", "theta1", "j1", "oo1", "2n2", "mu2", "n2", "nu2", "m2a", "m2",
    "m2b", "lambda2", "l2", "t2", "s2", "r2", "k2", "eta2", "mns2", "2sm2",
    "m3", "mk3", "s3", "mn4", "m4", "ms4", "mk4", "s4", "s5", "m6", "s6",
    "s7", "s8", "m8", "mks2", "msqm", "mtm", "n4", "eps2", "z0",
];

/// Column index of a constituent in the 60-wave tables.
pub fn index_of(name: &str) -> Option<usize> {
    ALL_CONSTITUENTS
        .iter()
        .position(|cons| cons.eq_ignore_ascii_case(name))
}

/// Nodal correction flavor of a tidal model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// OTIS, ATLAS and netCDF-packaged TPXO solutions
    Otis,
    /// NASA Goddard Ocean Tide models
    Got,
    /// Finite Element Solution models
    Fes,
}

impl Convention {
    /// Mean-longitude polynomials matching the model family.
    pub fn longitude_method(self) -> LongitudeMethod {
        match self {
            Convention::Otis => LongitudeMethod::Cartwright,
            Convention::Got | Convention::Fes => LongitudeMethod::Astro5,
        }
    }
}

impl FromStr for Convention {
    type Err = PerthError;

    /// Parse a model-format label into its correction [`Convention`].
    ///
    /// The OTIS solutions circulate in three packagings (`OTIS`, `ATLAS`,
    /// `netcdf`) that all share the same corrections.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "otis" | "atlas" | "netcdf" => Ok(Convention::Otis),
            "got" => Ok(Convention::Got),
            "fes" => Ok(Convention::Fes),
            other => Err(PerthError::InvalidConvention(other.to_string())),
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Convention::Otis => write!(f, "OTIS"),
            Convention::Got => write!(f, "GOT"),
            Convention::Fes => write!(f, "FES"),
        }
    }
}

/// Nodal corrections and equilibrium arguments for a set of constituents.
///
/// Every matrix has one row per date and one column per requested
/// constituent, in the caller's order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodalCorrections {
    /// Amplitude modulation factors
    pub f: DMatrix<f64>,
    /// Phase corrections \[rad\]
    pub u: DMatrix<Radian>,
    /// Equilibrium arguments `G` \[degrees\]
    pub arg: DMatrix<Degree>,
}

/// Compute the equilibrium argument of all 60 constituents at each date.
///
/// Arguments
/// ---------
/// * `mjd`: dates as Modified Julian Dates in universal time.
/// * `deltat`: `TT - UT1` \[days\] at each date, applied to the slow
///   astronomical angles only. Pass zeros when the model family solved its
///   constants in universal time.
/// * `convention`: selects the mean-longitude polynomials.
///
/// Returns
/// --------
/// * Arguments in degrees, `mjd.len()` rows by 60 columns in
///   [`ALL_CONSTITUENTS`] order.
pub fn equilibrium_arguments(
    mjd: &DVector<MJD>,
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<DMatrix<Degree>, PerthError> {
    if deltat.len() != mjd.len() {
        return Err(PerthError::ShapeMismatch {
            what: "delta time values",
            expected: mjd.len(),
            found: deltat.len(),
        });
    }
    let ephemeris = mjd + deltat;
    let lon = mean_longitudes(&ephemeris, convention.longitude_method());
    let mut arg = DMatrix::zeros(mjd.len(), 60);
    let angles = izip!(mjd.iter(), lon.s.iter(), lon.h.iter(), lon.p.iter(), lon.pp.iter());
    for (t, (date, &s, &h, &p, &pp)) in angles.enumerate() {
        let hour = date.rem_euclid(1.0) * 24.0;
        let row = doodson_row(hour, s, h, p, pp);
        for (k, value) in row.iter().enumerate() {
            arg[(t, k)] = *value;
        }
    }
    Ok(arg)
}

/// Doodson-style argument of each constituent from the hour angle and the
/// mean longitudes, degrees.
fn doodson_row(hour: f64, s: Degree, h: Degree, p: Degree, pp: Degree) -> [Degree; 60] {
    // mean solar and half-daily hour angles
    let t1 = DEGH * hour;
    let t2 = 2.0 * DEGH * hour;
    let mut arg = [0.0; 60];
    arg[0] = h - pp; // Sa
    arg[1] = 2.0 * h; // Ssa
    arg[2] = s - p; // Mm
    arg[3] = 2.0 * s - 2.0 * h; // MSf
    arg[4] = 2.0 * s; // Mf
    arg[5] = 3.0 * s - p; // Mt
    arg[6] = t1 - 5.0 * s + 3.0 * h + p - 90.0; // alpha1
    arg[7] = t1 - 4.0 * s + h + 2.0 * p - 90.0; // 2Q1
    arg[8] = t1 - 4.0 * s + 3.0 * h - 90.0; // sigma1
    arg[9] = t1 - 3.0 * s + h + p - 90.0; // Q1
    arg[10] = t1 - 3.0 * s + 3.0 * h - p - 90.0; // rho1
    arg[11] = t1 - 2.0 * s + h - 90.0; // O1
    arg[12] = t1 - 2.0 * s + 3.0 * h + 90.0; // tau1
    arg[13] = t1 - s + h + 90.0; // M1
    arg[14] = t1 - s + 3.0 * h - p + 90.0; // chi1
    arg[15] = t1 - 2.0 * h + pp - 90.0; // pi1
    arg[16] = t1 - h - 90.0; // P1
    arg[17] = t1 + 90.0; // S1
    arg[18] = t1 + h + 90.0; // K1
    arg[19] = t1 + 2.0 * h - pp + 90.0; // psi1
    arg[20] = t1 + 3.0 * h + 90.0; // phi1
    arg[21] = t1 + s - h + p + 90.0; // theta1
    arg[22] = t1 + s + h - p + 90.0; // J1
    arg[23] = t1 + 2.0 * s + h + 90.0; // OO1
    arg[24] = t2 - 4.0 * s + 2.0 * h + 2.0 * p; // 2N2
    arg[25] = t2 - 4.0 * s + 4.0 * h; // mu2
    arg[26] = t2 - 3.0 * s + 2.0 * h + p; // N2
    arg[27] = t2 - 3.0 * s + 4.0 * h - p; // nu2
    arg[28] = t2 - 2.0 * s + h + pp; // M2a
    arg[29] = t2 - 2.0 * s + 2.0 * h; // M2
    arg[30] = t2 - 2.0 * s + 3.0 * h - pp; // M2b
    arg[31] = t2 - s + p + 180.0; // lambda2
    arg[32] = t2 - s + 2.0 * h - p + 180.0; // L2
    arg[33] = t2 - h + pp; // T2
    arg[34] = t2; // S2
    arg[35] = t2 + h - pp + 180.0; // R2
    arg[36] = t2 + 2.0 * h; // K2
    arg[37] = t2 + s + 2.0 * h - pp; // eta2
    arg[38] = t2 - 5.0 * s + 4.0 * h + p; // MNS2
    arg[39] = t2 + 2.0 * s - 2.0 * h; // 2SM2
    arg[40] = 1.5 * arg[29]; // M3
    arg[41] = arg[18] + arg[29]; // MK3
    arg[42] = 3.0 * t1; // S3
    arg[43] = arg[26] + arg[29]; // MN4
    arg[44] = 2.0 * arg[29]; // M4
    arg[45] = arg[29] + arg[34]; // MS4
    arg[46] = arg[29] + arg[36]; // MK4
    arg[47] = 4.0 * t1; // S4
    arg[48] = 5.0 * t1; // S5
    arg[49] = 3.0 * arg[29]; // M6
    arg[50] = 3.0 * t2; // S6
    arg[51] = 7.0 * t1; // S7
    arg[52] = 4.0 * t2; // S8
    arg[53] = 4.0 * arg[29]; // M8
    arg[54] = arg[29] + arg[36] - arg[34]; // MKS2
    arg[55] = 4.0 * s - 2.0 * h; // MSqm
    arg[56] = 3.0 * s - h; // Mtm
    arg[57] = 2.0 * arg[26]; // N4
    arg[58] = t2 - 5.0 * s + 4.0 * h + p; // eps2
    arg[59] = 0.0; // Z0
    arg
}

/// Compute nodal corrections and equilibrium arguments for a set of
/// constituents.
///
/// Arguments
/// ---------
/// * `mjd`: dates as Modified Julian Dates in universal time.
/// * `constituents`: names of the waves to correct, matched
///   case-insensitively against [`ALL_CONSTITUENTS`].
/// * `deltat`: `TT - UT1` \[days\] at each date (zeros for models solved in
///   universal time).
/// * `convention`: correction flavor of the model family.
///
/// Returns
/// --------
/// * The [`NodalCorrections`] for the requested constituents, or an error if
///   a name is outside the tabulated spectrum or the input shapes disagree.
pub fn nodal_corrections(
    mjd: &DVector<MJD>,
    constituents: &[String],
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<NodalCorrections, PerthError> {
    let columns = constituents
        .iter()
        .map(|name| {
            index_of(name).ok_or_else(|| PerthError::UnsupportedConstituent(name.clone()))
        })
        .collect::<Result<Vec<usize>, PerthError>>()?;

    let arg_table = equilibrium_arguments(mjd, deltat, convention)?;
    let ephemeris = mjd + deltat;
    let lon = mean_longitudes(&ephemeris, convention.longitude_method());

    let nt = mjd.len();
    let ncons = constituents.len();
    let mut f = DMatrix::zeros(nt, ncons);
    let mut u = DMatrix::zeros(nt, ncons);
    let mut arg = DMatrix::zeros(nt, ncons);
    for (t, (&p, &n)) in izip!(lon.p.iter(), lon.n.iter()).enumerate() {
        let (f_row, u_row) = match convention {
            Convention::Otis => otis_row(p, n),
            Convention::Got => got_row(n),
            Convention::Fes => fes_row(p, n),
        };
        for (i, &k) in columns.iter().enumerate() {
            f[(t, i)] = f_row[k];
            u[(t, i)] = u_row[k] * RADEG;
            arg[(t, i)] = arg_table[(t, k)];
        }
    }
    Ok(NodalCorrections { f, u, arg })
}

/// Schureman-style nodal factors for the OTIS family, applied to all 60
/// waves. Returns amplitude factors and phase corrections in degrees.
fn otis_row(p: Degree, n: Degree) -> ([f64; 60], [Degree; 60]) {
    let sinn = (n * RADEG).sin();
    let cosn = (n * RADEG).cos();
    let sin2n = (2.0 * n * RADEG).sin();
    let cos2n = (2.0 * n * RADEG).cos();
    let sin3n = (3.0 * n * RADEG).sin();
    // M1 is modulated by the perigee as well as the node
    let m1_cos = 2.0 * (p * RADEG).cos() + 0.4 * ((p - n) * RADEG).cos();
    let m1_sin = (p * RADEG).sin() + 0.2 * ((p - n) * RADEG).sin();
    // L2 terms from Schureman table 14
    let l2_cos = 1.0
        - 0.25 * (2.0 * p * RADEG).cos()
        - 0.11 * ((2.0 * p - n) * RADEG).cos()
        - 0.04 * cosn;
    let l2_sin = 0.25 * (2.0 * p * RADEG).sin()
        + 0.11 * ((2.0 * p - n) * RADEG).sin()
        + 0.04 * sinn;

    let mut f = [1.0; 60];
    f[2] = 1.0 - 0.130 * cosn; // Mm
    f[4] = 1.043 + 0.414 * cosn; // Mf
    f[5] = ((1.0 + 0.203 * cosn + 0.040 * cos2n).powi(2)
        + (0.203 * sinn + 0.040 * sin2n).powi(2))
    .sqrt(); // Mt
    f[7] = ((1.0 + 0.188 * cosn).powi(2) + (0.188 * sinn).powi(2)).sqrt(); // 2Q1
    f[8] = f[7]; // sigma1
    f[9] = f[7]; // Q1
    f[10] = f[7]; // rho1
    f[11] = ((1.0 + 0.189 * cosn - 0.0058 * cos2n).powi(2)
        + (0.189 * sinn - 0.0058 * sin2n).powi(2))
    .sqrt(); // O1
    f[13] = (m1_cos.powi(2) + m1_sin.powi(2)).sqrt(); // M1
    f[14] = ((1.0 + 0.221 * cosn).powi(2) + (0.221 * sinn).powi(2)).sqrt(); // chi1
    f[18] = ((1.0 + 0.1158 * cosn - 0.0029 * cos2n).powi(2)
        + (0.1554 * sinn - 0.0029 * sin2n).powi(2))
    .sqrt(); // K1
    f[22] = ((1.0 + 0.169 * cosn).powi(2) + (0.227 * sinn).powi(2)).sqrt(); // J1
    f[23] = ((1.0 + 0.640 * cosn + 0.134 * cos2n).powi(2)
        + (0.640 * sinn + 0.134 * sin2n).powi(2))
    .sqrt(); // OO1
    f[24] = ((1.0 - 0.03731 * cosn + 0.00052 * cos2n).powi(2)
        + (0.03731 * sinn - 0.00052 * sin2n).powi(2))
    .sqrt(); // 2N2
    f[25] = f[24]; // mu2
    f[26] = f[24]; // N2
    f[27] = f[24]; // nu2
    f[29] = f[24]; // M2
    f[32] = (l2_cos.powi(2) + l2_sin.powi(2)).sqrt(); // L2
    f[36] = ((1.0 + 0.2852 * cosn + 0.0324 * cos2n).powi(2)
        + (0.3108 * sinn + 0.0324 * sin2n).powi(2))
    .sqrt(); // K2
    f[37] = ((1.0 + 0.436 * cosn).powi(2) + (0.436 * sinn).powi(2)).sqrt(); // eta2
    f[38] = f[29].powi(2); // MNS2
    f[39] = f[29]; // 2SM2
    f[40] = f[29].powf(1.5); // M3
    f[41] = f[29] * f[18]; // MK3
    f[43] = f[29].powi(2); // MN4
    f[44] = f[29].powi(2); // M4
    f[45] = f[29]; // MS4
    f[46] = f[29] * f[36]; // MK4
    f[49] = f[29].powi(3); // M6
    f[53] = f[29].powi(4); // M8
    f[54] = f[29] * f[36]; // MKS2
    f[55] = f[4]; // MSqm
    f[56] = f[4]; // Mtm
    f[57] = f[29].powi(2); // N4
    f[58] = f[29]; // eps2

    let mut u = [0.0; 60];
    u[4] = -23.7 * sinn + 2.7 * sin2n - 0.4 * sin3n; // Mf
    u[5] = (-(0.203 * sinn + 0.040 * sin2n) / (1.0 + 0.203 * cosn + 0.040 * cos2n)).atan()
        / RADEG; // Mt
    u[7] = (0.189 * sinn / (1.0 + 0.189 * cosn)).atan() / RADEG; // 2Q1
    u[8] = u[7]; // sigma1
    u[9] = u[7]; // Q1
    u[10] = u[7]; // rho1
    u[11] = 10.8 * sinn - 1.3 * sin2n + 0.2 * sin3n; // O1
    u[13] = m1_sin.atan2(m1_cos) / RADEG; // M1
    u[14] = (-0.221 * sinn / (1.0 + 0.221 * cosn)).atan() / RADEG; // chi1
    u[18] = ((-0.1554 * sinn + 0.0029 * sin2n) / (1.0 + 0.1158 * cosn - 0.0029 * cos2n))
        .atan()
        / RADEG; // K1
    u[22] = (-0.227 * sinn / (1.0 + 0.169 * cosn)).atan() / RADEG; // J1
    u[23] = (-(0.640 * sinn + 0.134 * sin2n) / (1.0 + 0.640 * cosn + 0.134 * cos2n)).atan()
        / RADEG; // OO1
    u[24] = ((-0.03731 * sinn + 0.00052 * sin2n)
        / (1.0 - 0.03731 * cosn + 0.00052 * cos2n))
        .atan()
        / RADEG; // 2N2
    u[25] = u[24]; // mu2
    u[26] = u[24]; // N2
    u[27] = u[24]; // nu2
    u[29] = u[24]; // M2
    u[32] = (-l2_sin / l2_cos).atan() / RADEG; // L2
    u[36] = (-(0.3108 * sinn + 0.0324 * sin2n) / (1.0 + 0.2852 * cosn + 0.0324 * cos2n))
        .atan()
        / RADEG; // K2
    u[37] = (-0.436 * sinn / (1.0 + 0.436 * cosn)).atan() / RADEG; // eta2
    u[38] = 2.0 * u[29]; // MNS2
    u[39] = u[29]; // 2SM2
    u[40] = 1.5 * u[29]; // M3
    u[41] = u[29] + u[18]; // MK3
    u[43] = 2.0 * u[29]; // MN4
    u[44] = 2.0 * u[29]; // M4
    u[45] = u[29]; // MS4
    u[46] = u[29] + u[36]; // MK4
    u[49] = 3.0 * u[29]; // M6
    u[53] = 4.0 * u[29]; // M8
    u[54] = u[29] + u[36]; // MKS2
    u[55] = u[4]; // MSqm
    u[56] = u[4]; // Mtm
    u[57] = 2.0 * u[29]; // N4
    u[58] = u[29]; // eps2
    (f, u)
}

/// Nodal factors for the GOT family. Only the constituents distributed with
/// those solutions are modulated; every other column stays zero, so a GOT
/// prediction ignores waves the family never solved.
fn got_row(n: Degree) -> ([f64; 60], [Degree; 60]) {
    let sinn = (n * RADEG).sin();
    let cosn = (n * RADEG).cos();
    let sin2n = (2.0 * n * RADEG).sin();
    let cos2n = (2.0 * n * RADEG).cos();

    let mut f = [0.0; 60];
    f[9] = 1.009 + 0.187 * cosn - 0.015 * cos2n; // Q1
    f[11] = f[9]; // O1
    f[16] = 1.0; // P1
    f[18] = 1.006 + 0.115 * cosn - 0.009 * cos2n; // K1
    f[26] = 1.0 - 0.037 * cosn; // N2
    f[29] = f[26]; // M2
    f[34] = 1.0; // S2
    f[36] = 1.024 + 0.286 * cosn + 0.008 * cos2n; // K2
    f[44] = f[29].powi(2); // M4

    let mut u = [0.0; 60];
    u[9] = 10.8 * sinn - 1.3 * sin2n; // Q1
    u[11] = u[9]; // O1
    u[18] = -8.9 * sinn + 0.7 * sin2n; // K1
    u[26] = -2.1 * sinn; // N2
    u[29] = u[26]; // M2
    u[36] = -17.7 * sinn + 0.7 * sin2n; // K2
    u[44] = 2.0 * u[29]; // M4
    (f, u)
}

/// Angles of the lunar orbit used by the FES corrections.
///
/// `ii` is the obliquity of the orbit with respect to the equator, `xi` and
/// `nu` the longitude and right ascension of the intersection point, and
/// `nu_prime`/`nu_second` the corresponding terms for K1 and K2
/// (Schureman formulae 224 and 232).
pub(crate) struct Obliquity {
    pub ii: Radian,
    pub xi: Radian,
    pub nu: Radian,
    pub ra1: f64,
    pub r: Radian,
    pub nu_prime: Radian,
    pub nu_second: Radian,
}

/// Evaluate the Schureman obliquity angles from the mean longitudes of the
/// lunar perigee and ascending node (degrees).
pub(crate) fn schureman_angles(p: Degree, n: Degree) -> Obliquity {
    let n_rad = n * RADEG;
    let p_rad = p * RADEG;
    let ii = (0.913694997 - 0.035692561 * n_rad.cos()).acos();
    let at1 = (1.01883 * (n_rad / 2.0).tan()).atan();
    let at2 = (0.64412 * (n_rad / 2.0).tan()).atan();
    let mut xi = -at1 - at2 + n_rad;
    if xi > PI {
        xi -= 2.0 * PI;
    }
    let nu = at1 - at2;
    // L2 terms, Schureman formulae 213 and 204
    let i2 = (ii / 2.0).tan();
    let ra1 = (1.0 - 12.0 * i2.powi(2) * (2.0 * (p_rad - xi)).cos() + 36.0 * i2.powi(4)).sqrt();
    let p2 = (2.0 * (p_rad - xi)).sin();
    let q2 = 1.0 / (6.0 * i2.powi(2)) - (2.0 * (p_rad - xi)).cos();
    let r = (p2 / q2).atan();
    let nu_prime = ((2.0 * ii).sin() * nu.sin())
        .atan2((2.0 * ii).sin() * nu.cos() + 0.3347);
    let nu_second = 0.5
        * (ii.sin().powi(2) * (2.0 * nu).sin())
            .atan2(ii.sin().powi(2) * (2.0 * nu).cos() + 0.0727);
    Obliquity {
        ii,
        xi,
        nu,
        ra1,
        r,
        nu_prime,
        nu_second,
    }
}

/// Nodal factors for the FES family, evaluated from the obliquity of the
/// lunar orbit. The few waves outside the FES line-up (alpha1, tau1, Mt)
/// keep a zero factor. Returns amplitude factors and phase corrections in
/// degrees.
fn fes_row(p: Degree, n: Degree) -> ([f64; 60], [Degree; 60]) {
    let ob = schureman_angles(p, n);
    let (ii, xi, nu) = (ob.ii, ob.xi, ob.nu);
    let half = ii / 2.0;

    let mut f = [0.0; 60];
    f[0] = 1.0; // Sa
    f[1] = 1.0; // Ssa
    f[2] = (2.0 / 3.0 - ii.sin().powi(2)) / 0.5021; // Mm
    f[3] = 1.0; // MSf
    f[4] = ii.sin().powi(2) / 0.1578; // Mf
    f[7] = ii.sin() * half.cos().powi(2) / 0.38; // 2Q1
    f[8] = f[7]; // sigma1
    f[9] = f[7]; // Q1
    f[10] = f[7]; // rho1
    f[11] = f[7]; // O1
    f[13] = (2.0 * ii).sin() / 0.7214; // M1
    f[14] = f[13]; // chi1
    f[15] = 1.0; // pi1
    f[16] = 1.0; // P1
    f[17] = 1.0; // S1
    f[18] = (0.8965 * (2.0 * ii).sin().powi(2)
        + 0.6001 * (2.0 * ii).sin() * nu.cos()
        + 0.1006)
        .sqrt(); // K1
    f[19] = 1.0; // psi1
    f[20] = 1.0; // phi1
    f[21] = f[13]; // theta1
    f[22] = f[13]; // J1
    f[23] = ii.sin() * half.sin().powi(2) / 0.01640; // OO1
    f[24] = half.cos().powi(4) / 0.9154; // 2N2
    f[25] = f[24]; // mu2
    f[26] = f[24]; // N2
    f[27] = f[24]; // nu2
    f[28] = 1.0; // M2a
    f[29] = f[24]; // M2
    f[30] = 1.0; // M2b
    f[31] = f[24]; // lambda2
    f[32] = f[24] * ob.ra1; // L2
    f[33] = 1.0; // T2
    f[34] = 1.0; // S2
    f[35] = 1.0; // R2
    f[36] = (19.0444 * ii.sin().powi(4)
        + 2.7702 * ii.sin().powi(2) * (2.0 * nu).cos()
        + 0.0981)
        .sqrt(); // K2
    f[37] = ii.sin().powi(2) / 0.1565; // eta2
    f[38] = f[29].powi(2); // MNS2
    f[39] = f[29]; // 2SM2
    f[40] = half.cos().powi(6) / 0.8758; // M3
    f[41] = f[18] * f[29]; // MK3
    f[42] = 1.0; // S3
    f[43] = f[29].powi(2); // MN4
    f[44] = f[29].powi(2); // M4
    f[45] = f[29]; // MS4
    f[46] = f[29] * f[36]; // MK4
    f[47] = 1.0; // S4
    f[48] = 1.0; // S5
    f[49] = f[29].powi(3); // M6
    f[50] = 1.0; // S6
    f[51] = 1.0; // S7
    f[52] = 1.0; // S8
    f[53] = f[29].powi(4); // M8
    f[54] = f[29] * f[36]; // MKS2
    f[55] = f[4]; // MSqm
    f[56] = f[4]; // Mtm
    f[57] = f[29].powi(2); // N4
    f[58] = f[29]; // eps2
    f[59] = 1.0; // Z0

    let mut u = [0.0; 60];
    u[3] = (2.0 * xi - 2.0 * nu) / RADEG; // MSf
    u[4] = -2.0 * xi / RADEG; // Mf
    u[7] = (2.0 * xi - nu) / RADEG; // 2Q1
    u[8] = u[7]; // sigma1
    u[9] = u[7]; // Q1
    u[10] = u[7]; // rho1
    u[11] = u[7]; // O1
    u[13] = -nu / RADEG; // M1
    u[14] = u[13]; // chi1
    u[18] = -ob.nu_prime / RADEG; // K1
    u[21] = u[13]; // theta1
    u[22] = u[13]; // J1
    u[23] = (-2.0 * xi - nu) / RADEG; // OO1
    u[24] = (2.0 * xi - 2.0 * nu) / RADEG; // 2N2
    u[25] = u[24]; // mu2
    u[26] = u[24]; // N2
    u[27] = u[24]; // nu2
    u[29] = u[24]; // M2
    u[31] = u[24]; // lambda2
    u[32] = (2.0 * xi - 2.0 * nu - ob.r) / RADEG; // L2
    u[36] = -2.0 * ob.nu_second / RADEG; // K2
    u[37] = -2.0 * nu / RADEG; // eta2
    u[38] = (4.0 * xi - 4.0 * nu) / RADEG; // MNS2
    u[39] = (2.0 * xi - 2.0 * nu) / RADEG; // 2SM2
    u[40] = (3.0 * xi - 3.0 * nu) / RADEG; // M3
    u[41] = (2.0 * xi - 2.0 * nu - ob.nu_prime) / RADEG; // MK3
    u[43] = (4.0 * xi - 4.0 * nu) / RADEG; // MN4
    u[44] = (4.0 * xi - 4.0 * nu) / RADEG; // M4
    u[45] = (2.0 * xi - 2.0 * nu) / RADEG; // MS4
    u[46] = (2.0 * xi - 2.0 * nu - 2.0 * ob.nu_second) / RADEG; // MK4
    u[49] = (6.0 * xi - 6.0 * nu) / RADEG; // M6
    u[53] = (8.0 * xi - 8.0 * nu) / RADEG; // M8
    u[54] = (2.0 * xi - 2.0 * nu - 2.0 * ob.nu_second) / RADEG; // MKS2
    u[55] = u[4]; // MSqm
    u[56] = u[4]; // Mtm
    u[57] = (4.0 * xi - 4.0 * nu) / RADEG; // N4
    u[58] = u[29]; // eps2
    (f, u)
}

#[cfg(test)]
mod arguments_test {
    use super::*;
    use approx::assert_relative_eq;
    use crate::constants::TIDE_EPOCH_MJD;
    use crate::math::normalize_angle;

    #[test]
    fn test_convention_from_str() {
        assert_eq!("otis".parse::<Convention>(), Ok(Convention::Otis));
        assert_eq!("OTIS".parse::<Convention>(), Ok(Convention::Otis));
        assert_eq!("ATLAS".parse::<Convention>(), Ok(Convention::Otis));
        assert_eq!("netcdf".parse::<Convention>(), Ok(Convention::Otis));
        assert_eq!("GOT".parse::<Convention>(), Ok(Convention::Got));
        assert_eq!("fes".parse::<Convention>(), Ok(Convention::Fes));
        assert_eq!(
            "tpxo9".parse::<Convention>(),
            Err(PerthError::InvalidConvention("tpxo9".to_string()))
        );
    }

    #[test]
    fn test_constituent_index() {
        assert_eq!(index_of("sa"), Some(0));
        assert_eq!(index_of("M2"), Some(29));
        assert_eq!(index_of("s2"), Some(34));
        assert_eq!(index_of("z0"), Some(59));
        assert_eq!(index_of("unknown"), None);
    }

    #[test]
    fn test_equilibrium_argument_identities() {
        let mjd = DVector::from_vec(vec![TIDE_EPOCH_MJD + 0.25, TIDE_EPOCH_MJD + 1250.6]);
        let deltat = DVector::zeros(2);
        let arg = equilibrium_arguments(&mjd, &deltat, Convention::Otis).unwrap();
        assert_eq!(arg.shape(), (2, 60));
        for t in 0..2 {
            // S2 argument is twice the solar hour angle
            let hour = mjd[t].rem_euclid(1.0) * 24.0;
            assert_relative_eq!(
                normalize_angle(arg[(t, 34)], 360.0),
                normalize_angle(30.0 * hour, 360.0),
                epsilon = 1e-9
            );
            // overtides are exact multiples of the M2 argument
            assert_relative_eq!(arg[(t, 44)], 2.0 * arg[(t, 29)], epsilon = 1e-9);
            assert_relative_eq!(arg[(t, 49)], 3.0 * arg[(t, 29)], epsilon = 1e-9);
            // Z0 carries no argument
            assert_eq!(arg[(t, 59)], 0.0);
        }
    }

    #[test]
    fn test_equilibrium_argument_at_epoch() {
        // the OTIS solution phases are the Greenwich arguments at the tide
        // epoch, stored in radians in the constituent table
        let mjd = DVector::from_vec(vec![TIDE_EPOCH_MJD]);
        let deltat = DVector::zeros(1);
        let arg = equilibrium_arguments(&mjd, &deltat, Convention::Otis).unwrap();
        for name in ["m2", "s2", "k1", "o1", "q1", "n2"] {
            let k = index_of(name).unwrap();
            let table = crate::constituents::parameters(name).unwrap().phase / RADEG;
            assert_relative_eq!(
                normalize_angle(arg[(0, k)], 360.0),
                normalize_angle(table, 360.0),
                epsilon = 0.01
            );
        }
    }

    #[test]
    fn test_solar_waves_unmodulated() {
        let mjd = DVector::from_vec(vec![48622.0, 51544.5, 55000.25]);
        let deltat = DVector::zeros(3);
        let constituents = vec!["s2".to_string(), "p1".to_string()];
        for convention in [Convention::Otis, Convention::Fes] {
            let nodal = nodal_corrections(&mjd, &constituents, &deltat, convention).unwrap();
            for t in 0..3 {
                assert_relative_eq!(nodal.f[(t, 0)], 1.0, epsilon = 1e-12);
                assert_relative_eq!(nodal.u[(t, 0)], 0.0, epsilon = 1e-12);
                assert_relative_eq!(nodal.f[(t, 1)], 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_otis_modulation_envelope() {
        // M2 nodal factor swings by about 3.7 percent over the 18.6 year
        // cycle, staying within the Schureman envelope
        let mjd = DVector::from_iterator(80, (0..80).map(|k| 48622.0 + 85.0 * k as f64));
        let deltat = DVector::zeros(80);
        let constituents = vec!["m2".to_string(), "k1".to_string()];
        let nodal = nodal_corrections(&mjd, &constituents, &deltat, Convention::Otis).unwrap();
        for t in 0..80 {
            assert!(nodal.f[(t, 0)] > 0.962 && nodal.f[(t, 0)] < 1.039);
            assert!(nodal.f[(t, 1)] > 0.88 && nodal.f[(t, 1)] < 1.12);
            // phase corrections stay within a few degrees
            assert!(nodal.u[(t, 0)].abs() < 3.0 * RADEG);
            assert!(nodal.u[(t, 1)].abs() < 10.0 * RADEG);
        }
    }

    #[test]
    fn test_families_agree_on_lunar_waves() {
        // OTIS and GOT linearize the same modulation, FES evaluates it in
        // closed form; the published diurnal fits drift apart by up to
        // 0.65 percent near the nodal-cycle extremes
        let mjd = DVector::from_iterator(40, (0..40).map(|k| 48622.0 + 170.0 * k as f64));
        let deltat = DVector::zeros(40);
        let constituents = vec!["m2".to_string(), "o1".to_string(), "q1".to_string()];
        let otis = nodal_corrections(&mjd, &constituents, &deltat, Convention::Otis).unwrap();
        let got = nodal_corrections(&mjd, &constituents, &deltat, Convention::Got).unwrap();
        let fes = nodal_corrections(&mjd, &constituents, &deltat, Convention::Fes).unwrap();
        for t in 0..40 {
            for i in 0..3 {
                assert_relative_eq!(otis.f[(t, i)], got.f[(t, i)], epsilon = 8e-3);
                assert_relative_eq!(otis.f[(t, i)], fes.f[(t, i)], epsilon = 6e-3);
                assert_relative_eq!(otis.u[(t, i)], fes.u[(t, i)], epsilon = 8e-3);
            }
        }
    }

    #[test]
    fn test_fes_k1_matches_linearized_extreme() {
        // with the node at the vernal point the K1 factor peaks; the closed
        // form and the Schureman linearization give the same value
        let (f, _) = fes_row(83.35, 0.0);
        assert_relative_eq!(f[18], 1.0 + 0.1158 - 0.0029, epsilon = 1e-3);
        let (f, _) = fes_row(83.35, 180.0);
        assert_relative_eq!(f[18], 1.0 - 0.1158 - 0.0029, epsilon = 2e-3);
    }

    #[test]
    fn test_got_untouched_waves_zeroed() {
        let mjd = DVector::from_vec(vec![48700.0]);
        let deltat = DVector::zeros(1);
        let constituents = vec!["m2".to_string(), "mf".to_string()];
        let nodal = nodal_corrections(&mjd, &constituents, &deltat, Convention::Got).unwrap();
        assert!(nodal.f[(0, 0)] > 0.9);
        // Mf is not part of the GOT line-up and contributes nothing
        assert_eq!(nodal.f[(0, 1)], 0.0);
        assert_eq!(nodal.u[(0, 1)], 0.0);
    }

    #[test]
    fn test_unsupported_constituent() {
        let mjd = DVector::from_vec(vec![48622.0]);
        let deltat = DVector::zeros(1);
        let constituents = vec!["m2".to_string(), "m16".to_string()];
        let result = nodal_corrections(&mjd, &constituents, &deltat, Convention::Otis);
        assert_eq!(
            result,
            Err(PerthError::UnsupportedConstituent("m16".to_string()))
        );
    }

    #[test]
    fn test_deltat_shape_mismatch() {
        let mjd = DVector::from_vec(vec![48622.0, 48623.0]);
        let deltat = DVector::zeros(1);
        let result = equilibrium_arguments(&mjd, &deltat, Convention::Got);
        assert!(matches!(result, Err(PerthError::ShapeMismatch { .. })));
    }
}
