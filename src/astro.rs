//! # Astronomical mean longitudes
//!
//! Mean longitudes of the moon, sun, lunar perigee, ascending lunar node and
//! solar perigee — the five slow fundamental angles from which every tidal
//! constituent's equilibrium argument is assembled (the sixth, the mean lunar
//! time angle, comes straight from the fraction of the day).
//!
//! Three coefficient sets are provided. The linear Cartwright fit is the one
//! the OTIS/ATLAS family of models was solved with; the Meeus and ASTRO5
//! polynomials follow the *Astronomical Algorithms* expansions and are used
//! by the GOT and FES families.

use nalgebra::DVector;

use crate::constants::{Degree, MJD, T2000};
use crate::math::{normalize_angle, polynomial_sum};

/// Coefficient set used to evaluate the mean longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongitudeMethod {
    /// Linear fit for 1990–2010 derived by David Cartwright.
    Cartwright,
    /// Polynomials in days from J2000 (Meeus, *Astronomical Algorithms*).
    Meeus,
    /// Polynomials in Julian centuries from J2000, as in the PERTH5 solver.
    Astro5,
}

/// Mean longitudes [degrees] for each requested date.
///
/// All angles except the solar perigee are normalized to [0, 360).
#[derive(Debug, Clone, PartialEq)]
pub struct MeanLongitudes {
    /// Mean longitude of the moon
    pub s: DVector<Degree>,
    /// Mean longitude of the sun
    pub h: DVector<Degree>,
    /// Mean longitude of the lunar perigee
    pub p: DVector<Degree>,
    /// Mean longitude of the ascending lunar node (decreasing with time)
    pub n: DVector<Degree>,
    /// Mean longitude of the solar perigee
    pub pp: DVector<Degree>,
}

/// Compute the astronomical mean longitudes at each date.
///
/// Arguments
/// ---------
/// * `mjd`: Modified Julian Dates (UT1, or UT1 + ΔT for conventions that
///   evaluate the arguments on the dynamical timescale).
/// * `method`: coefficient set to use.
///
/// Returns
/// --------
/// * The five [`MeanLongitudes`] vectors, degrees, aligned with `mjd`.
pub fn mean_longitudes(mjd: &DVector<MJD>, method: LongitudeMethod) -> MeanLongitudes {
    match method {
        LongitudeMethod::Cartwright => cartwright(mjd),
        LongitudeMethod::Meeus => meeus(mjd),
        LongitudeMethod::Astro5 => astro5(mjd),
    }
}

/// Linear formulae for 1990–2010 derived by David Cartwright.
fn cartwright(mjd: &DVector<MJD>) -> MeanLongitudes {
    // days relative to J2000 with the 1990s UT1-ish offset of the original fit
    let t: DVector<f64> = mjd.map(|d| d - 51544.4993);
    MeanLongitudes {
        s: t.map(|t| normalize_angle(218.3164 + 13.17639648 * t, 360.0)),
        h: t.map(|t| normalize_angle(280.4661 + 0.98564736 * t, 360.0)),
        p: t.map(|t| normalize_angle(83.3535 + 0.11140353 * t, 360.0)),
        n: t.map(|t| normalize_angle(125.0445 - 0.05295377 * t, 360.0)),
        pp: DVector::from_element(mjd.len(), 282.8),
    }
}

/// Meeus polynomials evaluated in days from J2000.
fn meeus(mjd: &DVector<MJD>) -> MeanLongitudes {
    // mean longitude of the moon (p. 338)
    const LUNAR_LONGITUDE: [f64; 5] = [
        218.3164591,
        13.17639647754579,
        -9.9454632e-13,
        3.8086292e-20,
        -8.6184958e-27,
    ];
    // mean longitude of the sun (p. 338)
    const SOLAR_LONGITUDE: [f64; 3] = [280.46645, 0.985647360164271, 2.2727347e-13];
    // mean longitude of the lunar perigee (p. 343)
    const LUNAR_PERIGEE: [f64; 5] = [
        83.3532430,
        0.11140352391786447,
        -7.7385418e-12,
        -2.5636086e-19,
        2.95738836e-26,
    ];
    // mean longitude of the ascending lunar node (p. 144)
    const LUNAR_NODE: [f64; 5] = [
        125.0445550,
        -0.052953762762491446,
        1.55628359e-12,
        4.390675353e-20,
        -9.26940435e-27,
    ];
    let t: DVector<f64> = mjd.map(|d| d - T2000);
    MeanLongitudes {
        s: t.map(|t| normalize_angle(polynomial_sum(&LUNAR_LONGITUDE, t), 360.0)),
        h: t.map(|t| normalize_angle(polynomial_sum(&SOLAR_LONGITUDE, t), 360.0)),
        p: t.map(|t| normalize_angle(polynomial_sum(&LUNAR_PERIGEE, t), 360.0)),
        n: t.map(|t| normalize_angle(polynomial_sum(&LUNAR_NODE, t), 360.0)),
        pp: DVector::from_element(mjd.len(), 282.8),
    }
}

/// Meeus polynomials evaluated in Julian centuries from J2000 (PERTH5 form).
fn astro5(mjd: &DVector<MJD>) -> MeanLongitudes {
    // mean longitude of the moon (p. 338)
    const LUNAR_LONGITUDE: [f64; 5] = [
        218.3164477,
        481267.88123421,
        -1.5786e-3,
        1.855835e-6,
        -1.53388e-8,
    ];
    // mean longitude of the sun (p. 338)
    const SOLAR_LONGITUDE: [f64; 3] = [280.46645, 36000.7697489, 3.0368e-4];
    // mean longitude of the lunar perigee (p. 343)
    const LUNAR_PERIGEE: [f64; 5] = [
        83.3532465,
        4069.0137287,
        -1.032e-2,
        -1.249172e-5,
        5.263e-8,
    ];
    // mean longitude of the ascending lunar node (p. 144)
    const LUNAR_NODE: [f64; 4] = [125.04452, -1934.136261, 2.0708e-3, 2.22e-6];
    let t: DVector<f64> = mjd.map(|d| (d - T2000) / 36525.0);
    MeanLongitudes {
        s: t.map(|t| normalize_angle(polynomial_sum(&LUNAR_LONGITUDE, t), 360.0)),
        h: t.map(|t| normalize_angle(polynomial_sum(&SOLAR_LONGITUDE, t), 360.0)),
        p: t.map(|t| normalize_angle(polynomial_sum(&LUNAR_PERIGEE, t), 360.0)),
        n: t.map(|t| normalize_angle(polynomial_sum(&LUNAR_NODE, t), 360.0)),
        // mean longitude of the solar perigee (Simon et al., 1994)
        pp: t.map(|t| 282.94 + 1.7192 * t),
    }
}
