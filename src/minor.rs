//! # Minor constituent inference
//!
//! ## Overview
//!
//! Tide models solve a handful of major constituents; the weaker lines in
//! between are recovered by admittance. Because the ocean response is smooth
//! in frequency, the complex amplitude of a minor constituent can be
//! interpolated linearly from the resolved neighbors in its species band.
//! [`infer_minor`] applies the fixed admittance relations of the classic
//! OTIS solver to estimate up to twenty minor constituents from the eight
//! majors `q1, o1, p1, k1, n2, m2, s2, k2`, with FES-specific spline
//! coefficients (and the extra `eps2`/`eta2` lines from `2n2`) under
//! [`Convention::Fes`].
//!
//! Minors already present in the model are skipped so nothing is counted
//! twice, and a missing major simply removes its share of the estimate.

use nalgebra::{Complex, DVector};

use crate::arguments::{schureman_angles, Convention};
use crate::astro::mean_longitudes;
use crate::constants::{Degree, DEGH, MJD, RADEG, TIDE_EPOCH_MJD, TideDays};
use crate::constituents::HarmonicConstants;
use crate::perth_errors::PerthError;
use crate::predict::{series_length, MaskedVector};

/// Minor constituents in admittance-table order. M1 and L2 each split into
/// two lines with separate arguments.
const MINOR_CONSTITUENTS: [&str; 20] = [
    "2q1", "sigma1", "rho1", "m12", "m11", "chi1", "pi1", "phi1", "theta1",
    "j1", "oo1", "2n2", "mu2", "nu2", "lambda2", "l2", "l2", "t2", "eps2",
    "eta2",
];

/// Major constituents referenced by the admittance relations, in the index
/// order of the `z` vector.
const MAJOR_CONSTITUENTS: [&str; 9] =
    ["q1", "o1", "p1", "k1", "n2", "m2", "s2", "k2", "2n2"];

/// Infer the elevation contribution of minor tidal constituents.
///
/// Arguments
/// ---------
/// * `t`: times \[days since 1992-01-01\], one per point (drift) or many for
///   a single point (time series).
/// * `hc`: harmonic constants of the model constituents; the eight majors
///   are looked up by name and any other column is ignored.
/// * `deltat`: `TT - UT1` \[days\] aligned with `t`.
/// * `convention`: nodal correction flavor of the model.
///
/// Returns
/// --------
/// * The additive minor-constituent correction \[m\] aligned with the
///   prediction of the majors. Points with a masked major are masked.
///   Majors absent from `hc` contribute zero to every relation that
///   references them; this degrades the estimate but is never an error.
///
/// # See also
/// * [`crate::predict::drift`] for the major-constituent reconstruction this
///   correction is added to.
pub fn infer_minor(
    t: &DVector<TideDays>,
    hc: &HarmonicConstants,
    deltat: &DVector<f64>,
    convention: Convention,
) -> Result<MaskedVector, PerthError> {
    let npts = hc.n_points();
    let nt = t.len();
    let n = series_length(npts, nt)?;
    if deltat.len() != nt {
        return Err(PerthError::ShapeMismatch {
            what: "delta time values",
            expected: nt,
            found: deltat.len(),
        });
    }

    // columns of the major constituents actually present
    let majors: Vec<Option<usize>> = MAJOR_CONSTITUENTS
        .iter()
        .map(|name| hc.find(name))
        .collect();
    // minors not already resolved by the model
    let inferred: Vec<usize> = (0..MINOR_CONSTITUENTS.len())
        .filter(|&k| hc.find(MINOR_CONSTITUENTS[k]).is_none())
        .collect();

    let mjd: DVector<MJD> = t.map(|days| days + TIDE_EPOCH_MJD);
    let ephemeris = &mjd + deltat;
    let lon = mean_longitudes(&ephemeris, convention.longitude_method());

    // per-time argument and nodal rows
    let mut rows = Vec::with_capacity(nt);
    for ti in 0..nt {
        let hour = t[ti].rem_euclid(1.0) * 24.0;
        let arg = minor_args(hour, lon.s[ti], lon.h[ti], lon.p[ti], lon.pp[ti]);
        let (f, u) = match convention {
            Convention::Otis | Convention::Got => minor_factors(lon.n[ti]),
            Convention::Fes => minor_factors_fes(lon.p[ti], lon.n[ti]),
        };
        rows.push((arg, f, u));
    }

    let mut dh = MaskedVector::zeros(n);
    for i in 0..n {
        let ti = if nt > 1 { i } else { 0 };
        let pi = if npts > 1 { i } else { 0 };
        if majors
            .iter()
            .flatten()
            .any(|&col| hc.mask[(pi, col)])
        {
            dh.mask[i] = true;
            continue;
        }
        let mut z = [Complex::new(0.0, 0.0); 9];
        for (j, col) in majors.iter().enumerate() {
            if let Some(col) = col {
                z[j] = hc.values[(pi, *col)];
            }
        }
        let zmin = admittance(&z, convention);
        let (arg, f, u) = &rows[ti];
        for &k in &inferred {
            let th = (arg[k] + u[k]) * RADEG;
            dh.data[i] += zmin[k].re * f[k] * th.cos() - zmin[k].im * f[k] * th.sin();
        }
    }
    Ok(dh)
}

/// Linear admittance estimates of the twenty minor constituents from the
/// major vector `z` (ordered as [`MAJOR_CONSTITUENTS`]).
fn admittance(z: &[Complex<f64>; 9], convention: Convention) -> [Complex<f64>; 20] {
    let mut zmin = [Complex::new(0.0, 0.0); 20];
    zmin[0] = 0.263 * z[0] - 0.0252 * z[1]; // 2Q1
    zmin[1] = 0.297 * z[0] - 0.0264 * z[1]; // sigma1
    zmin[2] = 0.164 * z[0] + 0.0048 * z[1]; // rho1
    zmin[3] = 0.0140 * z[1] + 0.0101 * z[3]; // M12
    zmin[4] = 0.0389 * z[1] + 0.0282 * z[3]; // M11
    zmin[5] = 0.0064 * z[1] + 0.0060 * z[3]; // chi1
    zmin[6] = 0.0030 * z[1] + 0.0171 * z[3]; // pi1
    zmin[7] = -0.0015 * z[1] + 0.0152 * z[3]; // phi1
    zmin[8] = -0.0065 * z[1] + 0.0155 * z[3]; // theta1
    zmin[9] = -0.0389 * z[1] + 0.0836 * z[3]; // J1
    zmin[10] = -0.0431 * z[1] + 0.0613 * z[3]; // OO1
    zmin[11] = 0.264 * z[4] - 0.0253 * z[5]; // 2N2
    zmin[12] = 0.298 * z[4] - 0.0264 * z[5]; // mu2
    zmin[13] = 0.165 * z[4] + 0.00487 * z[5]; // nu2
    zmin[14] = 0.0040 * z[5] + 0.0074 * z[6]; // lambda2
    zmin[15] = 0.0131 * z[5] + 0.0326 * z[6]; // L2
    zmin[16] = 0.0033 * z[5] + 0.0082 * z[6]; // L2
    zmin[17] = 0.0585 * z[6]; // t2
    if convention == Convention::Fes {
        // spline admittances through N2, M2 and K2
        const MU2: [f64; 3] = [0.069439968323, 0.351535557706, -0.046278307672];
        const NU2: [f64; 3] = [-0.006104695053, 0.156878802427, 0.006755704028];
        const LAMBDA2: [f64; 3] = [0.016503557465, -0.013307812292, 0.007753383202];
        const L2: [f64; 3] = [0.077137765667, -0.051653455134, 0.027869916824];
        const T2: [f64; 3] = [0.180480173707, -0.020101177502, 0.008331518844];
        zmin[12] = MU2[0] * z[7] + MU2[1] * z[4] + MU2[2] * z[5]; // mu2
        zmin[13] = NU2[0] * z[7] + NU2[1] * z[4] + NU2[2] * z[5]; // nu2
        zmin[14] = LAMBDA2[0] * z[7] + LAMBDA2[1] * z[4] + LAMBDA2[2] * z[5]; // lambda2
        zmin[16] = L2[0] * z[7] + L2[1] * z[4] + L2[2] * z[5]; // L2
        zmin[17] = T2[0] * z[7] + T2[1] * z[4] + T2[2] * z[5]; // t2
        zmin[18] = 0.53285 * z[8] - 0.03304 * z[4]; // eps2
        zmin[19] = -0.0034925 * z[5] + 0.0831707 * z[6]; // eta2
    }
    zmin
}

/// Equilibrium argument of each minor constituent, degrees.
fn minor_args(hour: f64, s: Degree, h: Degree, p: Degree, pp: Degree) -> [Degree; 20] {
    let t1 = DEGH * hour;
    let t2 = 2.0 * DEGH * hour;
    let mut arg = [0.0; 20];
    arg[0] = t1 - 4.0 * s + h + 2.0 * p - 90.0; // 2Q1
    arg[1] = t1 - 4.0 * s + 3.0 * h - 90.0; // sigma1
    arg[2] = t1 - 3.0 * s + 3.0 * h - p - 90.0; // rho1
    arg[3] = t1 - s + h - p + 90.0; // M12
    arg[4] = t1 - s + h + p + 90.0; // M11
    arg[5] = t1 - s + 3.0 * h - p + 90.0; // chi1
    arg[6] = t1 - 2.0 * h + pp - 90.0; // pi1
    arg[7] = t1 + 3.0 * h + 90.0; // phi1
    arg[8] = t1 + s - h + p + 90.0; // theta1
    arg[9] = t1 + s + h - p + 90.0; // J1
    arg[10] = t1 + 2.0 * s + h + 90.0; // OO1
    arg[11] = t2 - 4.0 * s + 2.0 * h + 2.0 * p; // 2N2
    arg[12] = t2 - 4.0 * s + 4.0 * h; // mu2
    arg[13] = t2 - 3.0 * s + 4.0 * h - p; // nu2
    arg[14] = t2 - s + p + 180.0; // lambda2
    arg[15] = t2 - s + 2.0 * h - p + 180.0; // L2
    arg[16] = t2 - s + 2.0 * h + p; // L2
    arg[17] = t2 - h + pp; // t2
    arg[18] = t2 - 5.0 * s + 4.0 * h + p; // eps2
    arg[19] = t2 + s + 2.0 * h - pp; // eta2
    arg
}

/// Schureman-style nodal factors of the minor constituents (OTIS and GOT
/// families). Returns amplitude factors and phase corrections in degrees.
fn minor_factors(n: Degree) -> ([f64; 20], [Degree; 20]) {
    let sinn = (n * RADEG).sin();
    let cosn = (n * RADEG).cos();
    let sin2n = (2.0 * n * RADEG).sin();
    let cos2n = (2.0 * n * RADEG).cos();

    let mut f = [1.0; 20];
    f[0] = ((1.0 + 0.189 * cosn - 0.0058 * cos2n).powi(2)
        + (0.189 * sinn - 0.0058 * sin2n).powi(2))
    .sqrt(); // 2Q1
    f[1] = f[0]; // sigma1
    f[2] = f[0]; // rho1
    f[3] = ((1.0 + 0.185 * cosn).powi(2) + (0.185 * sinn).powi(2)).sqrt(); // M12
    f[4] = ((1.0 + 0.201 * cosn).powi(2) + (0.201 * sinn).powi(2)).sqrt(); // M11
    f[5] = ((1.0 + 0.221 * cosn).powi(2) + (0.221 * sinn).powi(2)).sqrt(); // chi1
    f[9] = ((1.0 + 0.198 * cosn).powi(2) + (0.198 * sinn).powi(2)).sqrt(); // J1
    f[10] = ((1.0 + 0.640 * cosn + 0.134 * cos2n).powi(2)
        + (0.640 * sinn + 0.134 * sin2n).powi(2))
    .sqrt(); // OO1
    f[11] = ((1.0 - 0.0373 * cosn).powi(2) + (0.0373 * sinn).powi(2)).sqrt(); // 2N2
    f[12] = f[11]; // mu2
    f[13] = f[11]; // nu2
    f[15] = f[11]; // L2
    f[16] = ((1.0 + 0.441 * cosn).powi(2) + (0.441 * sinn).powi(2)).sqrt(); // L2

    let mut u = [0.0; 20];
    u[0] = (0.189 * sinn - 0.0058 * sin2n)
        .atan2(1.0 + 0.189 * cosn - 0.0058 * cos2n)
        / RADEG; // 2Q1
    u[1] = u[0]; // sigma1
    u[2] = u[0]; // rho1
    u[3] = (0.185 * sinn).atan2(1.0 + 0.185 * cosn) / RADEG; // M12
    u[4] = (-0.201 * sinn).atan2(1.0 + 0.201 * cosn) / RADEG; // M11
    u[5] = (-0.221 * sinn).atan2(1.0 + 0.221 * cosn) / RADEG; // chi1
    u[9] = (-0.198 * sinn).atan2(1.0 + 0.198 * cosn) / RADEG; // J1
    u[10] = (-0.640 * sinn - 0.134 * sin2n)
        .atan2(1.0 + 0.640 * cosn + 0.134 * cos2n)
        / RADEG; // OO1
    u[11] = (-0.0373 * sinn).atan2(1.0 - 0.0373 * cosn) / RADEG; // 2N2
    u[12] = u[11]; // mu2
    u[13] = u[11]; // nu2
    u[15] = u[11]; // L2
    u[16] = (-0.441 * sinn).atan2(1.0 + 0.441 * cosn) / RADEG; // L2
    (f, u)
}

/// Nodal factors of the minor constituents for the FES family, from the
/// obliquity of the lunar orbit. Lines the obliquity formulation does not
/// cover keep the factors of [`minor_factors`].
fn minor_factors_fes(p: Degree, n: Degree) -> ([f64; 20], [Degree; 20]) {
    let (mut f, mut u) = minor_factors(n);
    let ob = schureman_angles(p, n);
    let (ii, xi, nu) = (ob.ii, ob.xi, ob.nu);
    let half = ii / 2.0;

    f[0] = ii.sin() * half.cos().powi(2) / 0.38; // 2Q1
    f[1] = f[0]; // sigma1
    f[2] = f[0]; // rho1
    f[3] = f[0]; // M12
    f[4] = (2.0 * ii).sin() / 0.7214; // M11
    f[5] = f[4]; // chi1
    f[9] = f[4]; // J1
    f[10] = ii.sin() * half.sin().powi(2) / 0.01640; // OO1
    f[11] = half.cos().powi(4) / 0.9154; // 2N2
    f[12] = f[11]; // mu2
    f[13] = f[11]; // nu2
    f[14] = f[11]; // lambda2
    f[15] = f[11] * ob.ra1; // L2
    f[18] = f[11]; // eps2
    f[19] = ii.sin().powi(2) / 0.1565; // eta2

    u[0] = (2.0 * xi - nu) / RADEG; // 2Q1
    u[1] = u[0]; // sigma1
    u[2] = u[0]; // rho1
    u[3] = u[0]; // M12
    u[4] = -nu / RADEG; // M11
    u[5] = u[4]; // chi1
    u[9] = u[4]; // J1
    u[10] = (-2.0 * xi - nu) / RADEG; // OO1
    u[11] = (2.0 * xi - 2.0 * nu) / RADEG; // 2N2
    u[12] = u[11]; // mu2
    u[13] = u[11]; // nu2
    u[14] = (2.0 * xi - 2.0 * nu) / RADEG; // lambda2
    u[15] = (2.0 * xi - 2.0 * nu - ob.r) / RADEG; // L2
    u[18] = u[12]; // eps2
    u[19] = -2.0 * nu / RADEG; // eta2
    (f, u)
}
