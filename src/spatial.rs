//! # Spatial coordinate transformations
//!
//! Conversions between geodetic, Cartesian (ECEF) and local tangent-plane
//! coordinates on a reference ellipsoid, together with the ellipsoid-to-
//! ellipsoid latitude/height transfer needed when mixing data referenced to
//! WGS84 with tide models solved on the TOPEX/POSEIDON ellipsoid.
//!
//! ## Overview
//!
//! * [`to_cartesian`] / [`to_geodetic`]: geodetic ↔ ECEF, with three
//!   interchangeable geodetic solvers ([`Method`]).
//! * [`convert_ellipsoid`]: move latitude/height between two ellipsoids.
//! * [`to_enu`] / [`from_enu`]: ECEF ↔ local east/north/up frame.
//! * [`to_horizontal`] / [`to_zenith`]: topocentric look angles from ENU.
//! * [`wrap_longitudes`], [`to_dms`] / [`from_dms`]: angle housekeeping.
//!
//! ## Example
//!
//! ```rust
//! use nalgebra::dvector;
//! use perth::spatial::{self, Ellipsoid, GeodeticOptions, Method};
//!
//! let lon = dvector![-77.0669];
//! let lat = dvector![38.9215];
//! let height = dvector![92.0];
//! let (x, y, z) = spatial::to_cartesian(&lon, &lat, &height, Ellipsoid::WGS84)?;
//! let geo = spatial::to_geodetic(
//!     &x,
//!     &y,
//!     &z,
//!     Ellipsoid::WGS84,
//!     Method::Bowring,
//!     GeodeticOptions::default(),
//! )?;
//! assert!(geo.converged);
//! assert!((geo.latitude[0] - lat[0]).abs() < 1e-9);
//! # Ok::<(), perth::perth_errors::PerthError>(())
//! ```

use std::str::FromStr;

use log::warn;
use nalgebra::{DVector, Matrix3, Vector3};

use crate::constants::{Degree, Meter, RADEG};
use crate::perth_errors::PerthError;

/// Reference ellipsoid, stored as its semimajor axis and flattening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semimajor (equatorial) axis [m]
    pub a_axis: Meter,
    /// Flattening `(a - b) / a`
    pub flat: f64,
}

impl Ellipsoid {
    /// World Geodetic System 1984
    pub const WGS84: Ellipsoid = Ellipsoid {
        a_axis: 6378137.0,
        flat: 1.0 / 298.257223563,
    };

    /// TOPEX/POSEIDON ellipsoid, on which most ocean tide solutions are given
    pub const TOPEX: Ellipsoid = Ellipsoid {
        a_axis: 6378136.3,
        flat: 1.0 / 298.257,
    };

    /// Geodetic Reference System 1980
    pub const GRS80: Ellipsoid = Ellipsoid {
        a_axis: 6378137.0,
        flat: 1.0 / 298.257222101,
    };

    /// World Geodetic System 1972
    pub const WGS72: Ellipsoid = Ellipsoid {
        a_axis: 6378135.0,
        flat: 1.0 / 298.26,
    };

    /// Semiminor (polar) axis [m]
    pub fn b_axis(&self) -> Meter {
        (1.0 - self.flat) * self.a_axis
    }

    /// First eccentricity `sqrt(2f - f²)`
    pub fn ecc1(&self) -> f64 {
        (2.0 * self.flat - self.flat * self.flat).sqrt()
    }

    /// Second eccentricity `sqrt(a² - b²) / b`
    pub fn ecc2(&self) -> f64 {
        let b = self.b_axis();
        (self.a_axis * self.a_axis - b * b).sqrt() / b
    }
}

/// Algorithm used to recover geodetic coordinates from Cartesian ones.
///
/// The two iterative schemes refine the latitude until the update falls below
/// [`GeodeticOptions::eps`]; the closed form needs no iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Hofmann-Wellenhof and Moritz fixed-point iteration on the latitude
    Moritz,
    /// Bowring iteration on the parametric latitude
    Bowring,
    /// Zhu closed-form solution
    Zhu,
}

impl FromStr for Method {
    type Err = PerthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "moritz" => Ok(Method::Moritz),
            "bowring" => Ok(Method::Bowring),
            "zhu" => Ok(Method::Zhu),
            other => Err(PerthError::InvalidConversionMethod(other.to_string())),
        }
    }
}

/// Convergence controls shared by the iterative spatial solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticOptions {
    /// Convergence threshold on the latitude update [rad]
    pub eps: f64,
    /// Maximum number of solver passes per point
    pub itmax: usize,
}

impl GeodeticOptions {
    /// Threshold for [`convert_ellipsoid`], where the Newton step cannot be
    /// driven all the way to machine epsilon within `itmax` passes.
    pub const ELLIPSOID_TRANSFER: GeodeticOptions = GeodeticOptions {
        eps: 1e-12,
        itmax: 10,
    };
}

impl Default for GeodeticOptions {
    fn default() -> Self {
        GeodeticOptions {
            eps: f64::EPSILON,
            itmax: 10,
        }
    }
}

/// Geodetic coordinates recovered from Cartesian positions.
///
/// Longitudes are returned in (-180, 180]. The convergence status of the
/// iteration that produced the coordinates travels with them instead of
/// aborting the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Geodetic {
    /// Geodetic longitude [degrees]
    pub longitude: DVector<Degree>,
    /// Geodetic latitude [degrees]
    pub latitude: DVector<Degree>,
    /// Height above the ellipsoid [m]
    pub height: DVector<Meter>,
    /// `false` if any point hit the iteration cap before its latitude update
    /// fell below `eps`
    pub converged: bool,
    /// Solver passes used by the slowest point (0 for the closed form)
    pub iterations: usize,
}

/// Convert geodetic coordinates to Earth-centred Earth-fixed Cartesian ones.
///
/// Arguments
/// ---------
/// * `lon`: geodetic longitudes [degrees]
/// * `lat`: geodetic latitudes [degrees]
/// * `height`: heights above the ellipsoid [m]
/// * `ell`: reference [`Ellipsoid`]
///
/// Returns
/// --------
/// * `(x, y, z)` coordinates [m], aligned with the inputs
///
/// # See also
/// * [`to_geodetic`] – the inverse transformation
pub fn to_cartesian(
    lon: &DVector<Degree>,
    lat: &DVector<Degree>,
    height: &DVector<Meter>,
    ell: Ellipsoid,
) -> Result<(DVector<Meter>, DVector<Meter>, DVector<Meter>), PerthError> {
    let npts = lon.len();
    if lat.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "latitude values",
            expected: npts,
            found: lat.len(),
        });
    }
    if height.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "height values",
            expected: npts,
            found: height.len(),
        });
    }

    let e2 = ell.ecc1().powi(2);
    let mut x = DVector::zeros(npts);
    let mut y = DVector::zeros(npts);
    let mut z = DVector::zeros(npts);
    for i in 0..npts {
        let lambda = lon[i] * RADEG;
        let phi = lat[i] * RADEG;
        // radius of curvature in the prime vertical
        let nrad = ell.a_axis / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        x[i] = (nrad + height[i]) * phi.cos() * lambda.cos();
        y[i] = (nrad + height[i]) * phi.cos() * lambda.sin();
        z[i] = (nrad * (1.0 - e2) + height[i]) * phi.sin();
    }
    Ok((x, y, z))
}

/// Convert Earth-centred Earth-fixed Cartesian coordinates to geodetic ones.
///
/// Arguments
/// ---------
/// * `x`, `y`, `z`: ECEF coordinates [m]
/// * `ell`: reference [`Ellipsoid`]
/// * `method`: geodetic solver to use
/// * `options`: convergence controls for the iterative solvers
///
/// Returns
/// --------
/// * [`Geodetic`] coordinates with the solver's convergence status. A point
///   that exhausts `options.itmax` keeps its last iterate and lowers the
///   `converged` flag; a warning is logged but no error is raised.
///
/// # See also
/// * [`to_cartesian`] – the inverse transformation
pub fn to_geodetic(
    x: &DVector<Meter>,
    y: &DVector<Meter>,
    z: &DVector<Meter>,
    ell: Ellipsoid,
    method: Method,
    options: GeodeticOptions,
) -> Result<Geodetic, PerthError> {
    let npts = x.len();
    if y.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "y coordinates",
            expected: npts,
            found: y.len(),
        });
    }
    if z.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "z coordinates",
            expected: npts,
            found: z.len(),
        });
    }

    let geo = match method {
        Method::Moritz => moritz_iterative(x, y, z, ell, options),
        Method::Bowring => bowring_iterative(x, y, z, ell, options),
        Method::Zhu => zhu_closed_form(x, y, z, ell),
    };
    if !geo.converged {
        warn!(
            "geodetic conversion ({method:?}) stopped at the iteration cap ({})",
            options.itmax
        );
    }
    Ok(geo)
}

/// Fixed-point iteration on the geodetic latitude (Hofmann-Wellenhof and
/// Moritz, *Physical Geodesy*).
fn moritz_iterative(
    x: &DVector<Meter>,
    y: &DVector<Meter>,
    z: &DVector<Meter>,
    ell: Ellipsoid,
    options: GeodeticOptions,
) -> Geodetic {
    let npts = x.len();
    let e2 = ell.ecc1().powi(2);
    let mut longitude = DVector::zeros(npts);
    let mut latitude = DVector::zeros(npts);
    let mut height = DVector::zeros(npts);
    let mut converged = true;
    let mut iterations = 0;

    for i in 0..npts {
        longitude[i] = y[i].atan2(x[i]) / RADEG;
        let p = x[i].hypot(y[i]);
        let mut phi1 = (z[i] / (p * (1.0 - e2))).atan();
        let mut h = 0.0;
        let mut ok = false;
        for it in 0..=options.itmax {
            let phi = phi1;
            let nrad = ell.a_axis / (1.0 - e2 * phi.sin().powi(2)).sqrt();
            h = p / phi.cos() - nrad;
            phi1 = (z[i] / (p * (1.0 - e2 * nrad / (nrad + h)))).atan();
            if (phi1 - phi).abs() <= options.eps {
                ok = true;
                iterations = iterations.max(it + 1);
                break;
            }
        }
        latitude[i] = phi1 / RADEG;
        height[i] = h;
        if !ok {
            converged = false;
            iterations = options.itmax + 1;
        }
    }

    Geodetic {
        longitude,
        latitude,
        height,
        converged,
        iterations,
    }
}

/// Bowring's iteration on the parametric latitude.
fn bowring_iterative(
    x: &DVector<Meter>,
    y: &DVector<Meter>,
    z: &DVector<Meter>,
    ell: Ellipsoid,
    options: GeodeticOptions,
) -> Geodetic {
    let npts = x.len();
    let a = ell.a_axis;
    let b = ell.b_axis();
    let e12 = ell.ecc1().powi(2);
    let e22 = ell.ecc2().powi(2);
    let mut longitude = DVector::zeros(npts);
    let mut latitude = DVector::zeros(npts);
    let mut height = DVector::zeros(npts);
    let mut converged = true;
    let mut iterations = 0;

    for i in 0..npts {
        longitude[i] = y[i].atan2(x[i]) / RADEG;
        let p = x[i].hypot(y[i]);
        // parametric latitude of the starting point
        let u = (a * z[i] / (b * p)).atan();
        let mut phi1 =
            ((z[i] + e22 * b * u.sin().powi(3)) / (p - e12 * a * u.cos().powi(3))).atan();
        let mut ok = false;
        for it in 0..=options.itmax {
            let phi = phi1;
            let u = (b * phi.tan() / a).atan();
            phi1 = ((z[i] + e22 * b * u.sin().powi(3)) / (p - e12 * a * u.cos().powi(3))).atan();
            if (phi1 - phi).abs() <= options.eps {
                ok = true;
                iterations = iterations.max(it + 1);
                break;
            }
        }
        latitude[i] = phi1 / RADEG;
        let nrad = a / (1.0 - e12 * phi1.sin().powi(2)).sqrt();
        height[i] = p / phi1.cos() - nrad;
        if !ok {
            converged = false;
            iterations = options.itmax + 1;
        }
    }

    Geodetic {
        longitude,
        latitude,
        height,
        converged,
        iterations,
    }
}

/// Zhu's closed-form solution of the quartic in the normal-intersection
/// parameter. Exact up to roundoff, so no convergence bookkeeping is needed.
fn zhu_closed_form(
    x: &DVector<Meter>,
    y: &DVector<Meter>,
    z: &DVector<Meter>,
    ell: Ellipsoid,
) -> Geodetic {
    let npts = x.len();
    let a = ell.a_axis;
    let b = ell.b_axis();
    let e2 = ell.ecc1().powi(2);
    let mut longitude = DVector::zeros(npts);
    let mut latitude = DVector::zeros(npts);
    let mut height = DVector::zeros(npts);

    for i in 0..npts {
        longitude[i] = y[i].atan2(x[i]) / RADEG;
        let w = x[i].hypot(y[i]);
        if w == 0.0 {
            // exact polar solution
            latitude[i] = 90.0_f64.copysign(z[i]);
            height[i] = z[i].abs() - b;
            continue;
        }
        let l = e2 / 2.0;
        let m = (w / a).powi(2);
        let n = ((1.0 - e2) * z[i] / b).powi(2);
        let icf = -(2.0 * l * l + m + n) / 2.0;
        let k = l * l * (l * l - m - n);
        let q = (m + n - 4.0 * l * l).powi(3) / 216.0 + m * n * l * l;
        let d = ((2.0 * q - m * n * l * l) * m * n * l * l).sqrt();
        let beta = icf / 3.0 - (q + d).cbrt() - (q - d).cbrt();
        let t = ((beta * beta - k).sqrt() - (beta + icf) / 2.0).sqrt()
            - (m - n).signum() * ((beta - icf).abs() / 2.0).sqrt();
        let w1 = w / (t + l);
        let z1 = (1.0 - e2) * z[i] / (t - l);
        latitude[i] = z1.atan2((1.0 - e2) * w1) / RADEG;
        height[i] = (t - 1.0 + l).signum() * ((w - w1).powi(2) + (z[i] - z1).powi(2)).sqrt();
    }

    Geodetic {
        longitude,
        latitude,
        height,
        converged: true,
        iterations: 0,
    }
}

/// Transfer geodetic latitudes and heights from one ellipsoid to another.
///
/// The point is held fixed in space while its coordinates are re-expressed on
/// the target ellipsoid, via a Newton-Raphson solution for the target
/// parametric latitude. Longitudes are unaffected by the transfer.
///
/// Arguments
/// ---------
/// * `lat`: geodetic latitudes on the source ellipsoid [degrees]
/// * `height`: heights above the source ellipsoid [m]
/// * `from`: source [`Ellipsoid`]
/// * `to`: target [`Ellipsoid`]
/// * `options`: Newton controls, normally
///   [`GeodeticOptions::ELLIPSOID_TRANSFER`]
///
/// Returns
/// --------
/// * `(latitude, height)` on the target ellipsoid. Points whose Newton
///   update never falls below `options.eps` keep their last iterate and are
///   reported through a logged warning.
///
/// Edge cases
/// ----------
/// * Latitudes beyond ±90° are clamped to the pole.
/// * At the equator and at the poles the latitude is congruent between the
///   two ellipsoids and the height shifts by the change of the corresponding
///   axis, so no iteration is run there.
pub fn convert_ellipsoid(
    lat: &DVector<Degree>,
    height: &DVector<Meter>,
    from: Ellipsoid,
    to: Ellipsoid,
    options: GeodeticOptions,
) -> Result<(DVector<Degree>, DVector<Meter>), PerthError> {
    let npts = lat.len();
    if height.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "height values",
            expected: npts,
            found: height.len(),
        });
    }

    let a1 = from.a_axis;
    let b1 = from.b_axis();
    let a2 = to.a_axis;
    let b2 = to.b_axis();
    let mut lat2 = DVector::zeros(npts);
    let mut h2 = DVector::zeros(npts);
    let mut stalled = 0usize;

    for i in 0..npts {
        let phi1 = lat[i].clamp(-90.0, 90.0);
        if phi1.abs() < options.eps {
            // equator: congruent latitudes, heights differ by the equatorial
            // axis change
            lat2[i] = phi1;
            h2[i] = height[i] + a1 - a2;
        } else if (90.0 - phi1.abs()) < options.eps {
            // pole: congruent latitudes, heights differ by the polar axis
            // change
            lat2[i] = phi1;
            h2[i] = height[i] + b1 - b2;
        } else {
            let phi1r = phi1 * RADEG;
            let sinphi1 = phi1r.sin();
            let cosphi1 = phi1r.cos().max(options.eps);
            let u1 = (b1 / a1 * (sinphi1 / cosphi1)).atan();
            let hpr1sin = b1 * u1.sin() + height[i] * sinphi1;
            let hpr1cos = a1 * u1.cos() + height[i] * cosphi1;
            let mut u2 = u1;
            let mut ok = false;
            if phi1.abs() <= 45.0 {
                // cos(u2) stays away from zero on this side
                let k0 = b2 * b2 - a2 * a2;
                let k1 = a2 * hpr1cos;
                let k2 = b2 * hpr1sin;
                for _ in 0..=options.itmax {
                    let (sinu2, cosu2) = u2.sin_cos();
                    let fu2 = k0 * sinu2 * cosu2 + k1 * sinu2 - k2 * cosu2;
                    let fu2p = k0 * (cosu2 * cosu2 - sinu2 * sinu2) + k1 * cosu2 + k2 * sinu2;
                    if fu2p.abs() < options.eps {
                        break;
                    }
                    let delta = fu2 / fu2p;
                    u2 -= delta;
                    if delta.abs() < options.eps {
                        ok = true;
                        break;
                    }
                }
                let phi2r = (a2 / b2 * u2.tan()).atan();
                lat2[i] = phi2r / RADEG;
                h2[i] = (hpr1cos - a2 * u2.cos()) / phi2r.cos();
            } else {
                // sin(u2) stays away from zero on the polar side
                let k0 = a2 * a2 - b2 * b2;
                let k1 = b2 * hpr1sin;
                let k2 = a2 * hpr1cos;
                for _ in 0..=options.itmax {
                    let (sinu2, cosu2) = u2.sin_cos();
                    let fu2 = k0 * sinu2 * cosu2 + k1 * cosu2 - k2 * sinu2;
                    let fu2p = k0 * (cosu2 * cosu2 - sinu2 * sinu2) - k1 * sinu2 - k2 * cosu2;
                    if fu2p.abs() < options.eps {
                        break;
                    }
                    let delta = fu2 / fu2p;
                    u2 -= delta;
                    if delta.abs() < options.eps {
                        ok = true;
                        break;
                    }
                }
                let phi2r = (a2 / b2 * u2.tan()).atan();
                lat2[i] = phi2r / RADEG;
                h2[i] = (hpr1sin - b2 * u2.sin()) / phi2r.sin();
            }
            stalled += usize::from(!ok);
        }
    }
    if stalled > 0 {
        warn!("ellipsoid transfer stopped at the iteration cap for {stalled} point(s)");
    }
    Ok((lat2, h2))
}

/// Rotation from ECEF axes to the local east/north/up axes at a site.
fn enu_rotation(lon0: Degree, lat0: Degree) -> Matrix3<f64> {
    let lambda = lon0 * RADEG;
    let phi = lat0 * RADEG;
    Matrix3::new(
        -lambda.sin(),
        lambda.cos(),
        0.0,
        -phi.sin() * lambda.cos(),
        -phi.sin() * lambda.sin(),
        phi.cos(),
        phi.cos() * lambda.cos(),
        phi.cos() * lambda.sin(),
        phi.sin(),
    )
}

/// ECEF coordinates of an observer given in geodetic coordinates.
fn observer_ecef(
    lon0: Degree,
    lat0: Degree,
    h0: Meter,
    ell: Ellipsoid,
) -> Result<Vector3<f64>, PerthError> {
    let (x0, y0, z0) = to_cartesian(
        &DVector::from_element(1, lon0),
        &DVector::from_element(1, lat0),
        &DVector::from_element(1, h0),
        ell,
    )?;
    Ok(Vector3::new(x0[0], y0[0], z0[0]))
}

/// Convert ECEF coordinates to east/north/up offsets from an observer.
///
/// Arguments
/// ---------
/// * `x`, `y`, `z`: ECEF coordinates of the targets [m]
/// * `lon0`, `lat0`, `h0`: geodetic coordinates of the observer
/// * `ell`: reference [`Ellipsoid`] for the observer
///
/// Returns
/// --------
/// * `(east, north, up)` offsets [m], aligned with the inputs
///
/// # See also
/// * [`from_enu`] – the inverse transformation
/// * [`to_horizontal`] – look angles from the returned offsets
pub fn to_enu(
    x: &DVector<Meter>,
    y: &DVector<Meter>,
    z: &DVector<Meter>,
    lon0: Degree,
    lat0: Degree,
    h0: Meter,
    ell: Ellipsoid,
) -> Result<(DVector<Meter>, DVector<Meter>, DVector<Meter>), PerthError> {
    let npts = x.len();
    if y.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "y coordinates",
            expected: npts,
            found: y.len(),
        });
    }
    if z.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "z coordinates",
            expected: npts,
            found: z.len(),
        });
    }

    let origin = observer_ecef(lon0, lat0, h0, ell)?;
    let rot = enu_rotation(lon0, lat0);
    let mut east = DVector::zeros(npts);
    let mut north = DVector::zeros(npts);
    let mut up = DVector::zeros(npts);
    for i in 0..npts {
        let enu = rot * (Vector3::new(x[i], y[i], z[i]) - origin);
        east[i] = enu[0];
        north[i] = enu[1];
        up[i] = enu[2];
    }
    Ok((east, north, up))
}

/// Convert east/north/up offsets from an observer back to ECEF coordinates.
///
/// The rotation is orthonormal, so the inverse frame change is its transpose.
///
/// # See also
/// * [`to_enu`] – the forward transformation
pub fn from_enu(
    east: &DVector<Meter>,
    north: &DVector<Meter>,
    up: &DVector<Meter>,
    lon0: Degree,
    lat0: Degree,
    h0: Meter,
    ell: Ellipsoid,
) -> Result<(DVector<Meter>, DVector<Meter>, DVector<Meter>), PerthError> {
    let npts = east.len();
    if north.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "north offsets",
            expected: npts,
            found: north.len(),
        });
    }
    if up.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "up offsets",
            expected: npts,
            found: up.len(),
        });
    }

    let origin = observer_ecef(lon0, lat0, h0, ell)?;
    let rot = enu_rotation(lon0, lat0).transpose();
    let mut x = DVector::zeros(npts);
    let mut y = DVector::zeros(npts);
    let mut z = DVector::zeros(npts);
    for i in 0..npts {
        let ecef = rot * Vector3::new(east[i], north[i], up[i]) + origin;
        x[i] = ecef[0];
        y[i] = ecef[1];
        z[i] = ecef[2];
    }
    Ok((x, y, z))
}

/// Convert east/north/up offsets to topocentric horizontal coordinates.
///
/// Arguments
/// ---------
/// * `east`, `north`, `up`: offsets from the observer [m]
///
/// Returns
/// --------
/// * `(altitude, azimuth, distance)`: elevation above the horizon [degrees],
///   azimuth clockwise from north in [0, 360) [degrees], and slant range [m]
pub fn to_horizontal(
    east: &DVector<Meter>,
    north: &DVector<Meter>,
    up: &DVector<Meter>,
) -> Result<(DVector<Degree>, DVector<Degree>, DVector<Meter>), PerthError> {
    let npts = east.len();
    if north.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "north offsets",
            expected: npts,
            found: north.len(),
        });
    }
    if up.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "up offsets",
            expected: npts,
            found: up.len(),
        });
    }

    let mut altitude = DVector::zeros(npts);
    let mut azimuth = DVector::zeros(npts);
    let mut distance = DVector::zeros(npts);
    for i in 0..npts {
        altitude[i] = (up[i] / east[i].hypot(north[i])).atan() / RADEG;
        azimuth[i] = (east[i].atan2(north[i]) / RADEG).rem_euclid(360.0);
        distance[i] = (east[i].powi(2) + north[i].powi(2) + up[i].powi(2)).sqrt();
    }
    Ok((altitude, azimuth, distance))
}

/// Zenith angles of targets given as east/north/up offsets.
pub fn to_zenith(
    east: &DVector<Meter>,
    north: &DVector<Meter>,
    up: &DVector<Meter>,
) -> Result<DVector<Degree>, PerthError> {
    let (altitude, _, _) = to_horizontal(east, north, up)?;
    Ok(altitude.map(|alt| 90.0 - alt))
}

/// Wrap longitudes into (-180, 180].
pub fn wrap_longitudes(lon: &DVector<Degree>) -> DVector<Degree> {
    lon.map(|l| {
        let phi = l * RADEG;
        phi.sin().atan2(phi.cos()) / RADEG
    })
}

/// Split decimal degrees into degrees, minutes and seconds.
///
/// The sign travels on the degrees component. Values are quantized to
/// integer nanoarcseconds before splitting, which keeps exact sexagesimal
/// inputs exact on the way out.
pub fn to_dms(angle: &DVector<Degree>) -> (DVector<f64>, DVector<f64>, DVector<f64>) {
    let npts = angle.len();
    let mut degree = DVector::zeros(npts);
    let mut minute = DVector::zeros(npts);
    let mut second = DVector::zeros(npts);
    for i in 0..npts {
        let total = (angle[i].abs() * 3600.0e9).round() / 1.0e9;
        let d = (total / 3600.0).floor();
        let m = ((total - 3600.0 * d) / 60.0).floor();
        degree[i] = angle[i].signum() * d;
        minute[i] = m;
        second[i] = total - 3600.0 * d - 60.0 * m;
    }
    (degree, minute, second)
}

/// Combine degrees, minutes and seconds into decimal degrees.
///
/// The sign of the degrees component (including a signed zero) is applied to
/// the whole angle.
pub fn from_dms(
    degree: &DVector<f64>,
    minute: &DVector<f64>,
    second: &DVector<f64>,
) -> Result<DVector<Degree>, PerthError> {
    let npts = degree.len();
    if minute.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "minute values",
            expected: npts,
            found: minute.len(),
        });
    }
    if second.len() != npts {
        return Err(PerthError::ShapeMismatch {
            what: "second values",
            expected: npts,
            found: second.len(),
        });
    }

    let mut angle = DVector::zeros(npts);
    for i in 0..npts {
        angle[i] = degree[i].signum() * (degree[i].abs() + minute[i] / 60.0 + second[i] / 3600.0);
    }
    Ok(angle)
}

#[cfg(test)]
mod spatial_test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    #[test]
    fn test_ellipsoid_derived_quantities() {
        // published WGS84 values
        assert_relative_eq!(
            Ellipsoid::WGS84.b_axis(),
            6356752.314245179,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            Ellipsoid::WGS84.ecc1(),
            0.08181919084262149,
            epsilon = 1e-12
        );
        for ell in [
            Ellipsoid::WGS84,
            Ellipsoid::TOPEX,
            Ellipsoid::GRS80,
            Ellipsoid::WGS72,
        ] {
            // defining relation of the flattening
            assert_relative_eq!(
                (ell.a_axis - ell.b_axis()) / ell.a_axis,
                ell.flat,
                epsilon = 1e-15
            );
            // second eccentricity scales the first by a/b
            assert_relative_eq!(
                ell.ecc2(),
                ell.ecc1() / (1.0 - ell.flat),
                epsilon = 1e-14
            );
        }
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("moritz".parse::<Method>(), Ok(Method::Moritz));
        assert_eq!("BOWRING".parse::<Method>(), Ok(Method::Bowring));
        assert_eq!("Zhu".parse::<Method>(), Ok(Method::Zhu));
        assert_eq!(
            "newton".parse::<Method>(),
            Err(PerthError::InvalidConversionMethod("newton".into()))
        );
    }

    #[test]
    fn test_cartesian_round_trip_all_methods() {
        let lon = dvector![0.0, 90.0, -77.0669, 179.0, 12.4539];
        let lat = dvector![0.0, 45.0, 38.9215, -35.39867, 89.9];
        let height = dvector![0.0, 1000.0, 92.0, -30.0, 250.0];
        let (x, y, z) = to_cartesian(&lon, &lat, &height, Ellipsoid::WGS84).unwrap();

        for method in [Method::Moritz, Method::Bowring, Method::Zhu] {
            let geo = to_geodetic(
                &x,
                &y,
                &z,
                Ellipsoid::WGS84,
                method,
                GeodeticOptions::default(),
            )
            .unwrap();
            for i in 0..lon.len() {
                assert_relative_eq!(geo.longitude[i], lon[i], epsilon = 1e-8);
                assert_relative_eq!(geo.latitude[i], lat[i], epsilon = 1e-8);
                assert_relative_eq!(geo.height[i], height[i], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_zhu_polar_axis() {
        let b = Ellipsoid::WGS84.b_axis();
        let x = dvector![0.0, 0.0];
        let y = dvector![0.0, 0.0];
        let z = dvector![b + 100.0, -(b + 2500.0)];
        let geo = to_geodetic(
            &x,
            &y,
            &z,
            Ellipsoid::WGS84,
            Method::Zhu,
            GeodeticOptions::default(),
        )
        .unwrap();
        assert_eq!(geo.latitude[0], 90.0);
        assert_eq!(geo.latitude[1], -90.0);
        assert_relative_eq!(geo.height[0], 100.0, epsilon = 1e-9);
        assert_relative_eq!(geo.height[1], 2500.0, epsilon = 1e-9);
        assert!(geo.converged);
        assert_eq!(geo.iterations, 0);
    }

    #[test]
    fn test_convert_ellipsoid_identity() {
        let lat = dvector![-67.5, -12.0, 0.0, 33.3, 52.0, 90.0];
        let height = dvector![0.0, 150.0, -40.0, 12.5, 3000.0, 8.0];
        let (lat2, h2) = convert_ellipsoid(
            &lat,
            &height,
            Ellipsoid::WGS84,
            Ellipsoid::WGS84,
            GeodeticOptions::ELLIPSOID_TRANSFER,
        )
        .unwrap();
        for i in 0..lat.len() {
            assert_relative_eq!(lat2[i], lat[i], epsilon = 1e-9);
            assert_relative_eq!(h2[i], height[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_convert_ellipsoid_degenerate_latitudes() {
        let from = Ellipsoid::WGS84;
        let to = Ellipsoid::TOPEX;
        let lat = dvector![0.0, 90.0, -90.0];
        let height = dvector![10.0, 10.0, 10.0];
        let (lat2, h2) =
            convert_ellipsoid(&lat, &height, from, to, GeodeticOptions::ELLIPSOID_TRANSFER)
                .unwrap();
        // congruent latitudes, heights shift by the axis change
        assert_eq!(lat2, lat);
        assert_relative_eq!(h2[0], 10.0 + from.a_axis - to.a_axis, epsilon = 1e-9);
        assert_relative_eq!(h2[1], 10.0 + from.b_axis() - to.b_axis(), epsilon = 1e-9);
        assert_relative_eq!(h2[2], 10.0 + from.b_axis() - to.b_axis(), epsilon = 1e-9);
    }

    #[test]
    fn test_enu_round_trip() {
        let lon = dvector![1.0, 3.5, -0.4];
        let lat = dvector![52.1, 53.8, 52.9];
        let height = dvector![0.0, 120.0, -15.0];
        let (x, y, z) = to_cartesian(&lon, &lat, &height, Ellipsoid::WGS84).unwrap();

        let (east, north, up) = to_enu(&x, &y, &z, 2.0, 53.0, 10.0, Ellipsoid::WGS84).unwrap();
        let (xr, yr, zr) =
            from_enu(&east, &north, &up, 2.0, 53.0, 10.0, Ellipsoid::WGS84).unwrap();
        for i in 0..lon.len() {
            assert_relative_eq!(xr[i], x[i], epsilon = 1e-6);
            assert_relative_eq!(yr[i], y[i], epsilon = 1e-6);
            assert_relative_eq!(zr[i], z[i], epsilon = 1e-6);
        }
    }

    #[test]
    fn test_horizontal_angles() {
        let east = dvector![1000.0, 0.0];
        let north = dvector![1000.0, -500.0];
        let up = dvector![1000.0, 500.0];
        let (altitude, azimuth, distance) = to_horizontal(&east, &north, &up).unwrap();
        // equal E/N/U components look 45 degrees east of north
        assert_relative_eq!(azimuth[0], 45.0, epsilon = 1e-12);
        assert_relative_eq!(
            altitude[0],
            (1.0_f64 / 2.0_f64.sqrt()).atan() / RADEG,
            epsilon = 1e-12
        );
        assert_relative_eq!(distance[0], 1000.0 * 3.0_f64.sqrt(), epsilon = 1e-9);
        // due south, 45 degrees up
        assert_relative_eq!(azimuth[1], 180.0, epsilon = 1e-12);
        assert_relative_eq!(altitude[1], 45.0, epsilon = 1e-12);

        let zenith = to_zenith(&east, &north, &up).unwrap();
        for i in 0..east.len() {
            assert_relative_eq!(zenith[i] + altitude[i], 90.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_wrap_longitudes() {
        let lon = dvector![0.0, 45.0, 180.0, 190.0, -190.0, 360.0];
        let wrapped = wrap_longitudes(&lon);
        let expected = [0.0, 45.0, 180.0, -170.0, 170.0, 0.0];
        for i in 0..lon.len() {
            assert_relative_eq!(wrapped[i], expected[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_dms_split_and_combine() {
        let angle = dvector![180.0, -180.0, 180.75, -180.75, 180.755, -180.755];
        let (degree, minute, second) = to_dms(&angle);
        assert_eq!(degree, dvector![180.0, -180.0, 180.0, -180.0, 180.0, -180.0]);
        assert_eq!(minute, dvector![0.0, 0.0, 45.0, 45.0, 45.0, 45.0]);
        assert_eq!(second, dvector![0.0, 0.0, 0.0, 0.0, 18.0, 18.0]);

        let back = from_dms(&degree, &minute, &second).unwrap();
        for i in 0..angle.len() {
            assert_relative_eq!(back[i], angle[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dms_subdegree_sign() {
        // below one degree the sign rides on a signed zero in the degree slot
        let angle = dvector![0.5, -0.5, -0.25, -0.999];
        let (degree, minute, second) = to_dms(&angle);
        assert!(degree[0].is_sign_positive());
        assert!(degree[1] == 0.0 && degree[1].is_sign_negative());
        assert_eq!(minute[1], 30.0);
        assert_eq!(minute[2], 15.0);
        let back = from_dms(&degree, &minute, &second).unwrap();
        for i in 0..angle.len() {
            assert_relative_eq!(back[i], angle[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let lon = dvector![0.0, 1.0];
        let lat = dvector![0.0];
        let height = dvector![0.0, 0.0];
        assert_eq!(
            to_cartesian(&lon, &lat, &height, Ellipsoid::WGS84),
            Err(PerthError::ShapeMismatch {
                what: "latitude values",
                expected: 2,
                found: 1,
            })
        );
    }
}
