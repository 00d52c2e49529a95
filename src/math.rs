//! # Special functions
//!
//! Scalar and vector special functions shared by the tidal and geodetic
//! routines: polynomial evaluation, angle normalization, elementary rotation
//! matrices, aliasing frequencies, associated Legendre functions and
//! spherical harmonics.

use std::str::FromStr;

use nalgebra::{Complex, DVector, Matrix3};

use crate::constants::Radian;
use crate::perth_errors::PerthError;

/// Evaluate the polynomial Σ cᵢ·tⁱ at a single point (Horner form).
///
/// Arguments
/// ---------
/// * `coefficients`: polynomial coefficients, lowest order first.
/// * `t`: evaluation point.
///
/// Returns
/// --------
/// * The value of the polynomial at `t`.
pub fn polynomial_sum(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |sum, &c| sum * t + c)
}

/// Evaluate the polynomial Σ cᵢ·tⁱ at every element of `t`.
///
/// Returns a vector with the same length as `t`.
///
/// # See also
/// * [`polynomial_sum`] – scalar variant
pub fn polynomial_sum_vec(coefficients: &[f64], t: &DVector<f64>) -> DVector<f64> {
    t.map(|ti| polynomial_sum(coefficients, ti))
}

/// Normalize an angle to the interval [0, `circle`).
///
/// `circle` is the full turn in the caller's unit (360 for degrees,
/// 2π for radians).
pub fn normalize_angle(theta: f64, circle: f64) -> f64 {
    theta.rem_euclid(circle)
}

/// Normalize every element of `theta` to the interval [0, `circle`).
///
/// # See also
/// * [`normalize_angle`] – scalar variant
pub fn normalize_angle_vec(theta: &DVector<f64>, circle: f64) -> DVector<f64> {
    theta.map(|t| t.rem_euclid(circle))
}

/// Cartesian rotation axis.
///
/// Parsed case-insensitively from the single-letter labels used by the
/// calling layers; any other label is an
/// [`InvalidRotationAxis`](PerthError::InvalidRotationAxis) error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl FromStr for Axis {
    type Err = PerthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(PerthError::InvalidRotationAxis(s.to_string())),
        }
    }
}

/// Build the 3×3 matrix rotating the coordinate frame by `theta` about `axis`.
///
/// The returned matrix expresses a **frame** rotation: applying it to a
/// vector gives that vector's components in axes rotated by `theta`. Its
/// transpose rotates the vector itself; the two compose to the identity.
///
/// Arguments
/// ---------
/// * `theta`: rotation angle in radians.
/// * `axis`: rotation axis.
///
/// Returns
/// --------
/// * The orthogonal rotation matrix.
///
/// # See also
/// * [`rotate_stack`] – one matrix per element of an angle vector
pub fn rotate(theta: Radian, axis: Axis) -> Matrix3<f64> {
    let (s, c) = theta.sin_cos();
    match axis {
        Axis::X => Matrix3::new(
            1.0, 0.0, 0.0, //
            0.0, c, s, //
            0.0, -s, c,
        ),
        Axis::Y => Matrix3::new(
            c, 0.0, -s, //
            0.0, 1.0, 0.0, //
            s, 0.0, c,
        ),
        Axis::Z => Matrix3::new(
            c, s, 0.0, //
            -s, c, 0.0, //
            0.0, 0.0, 1.0,
        ),
    }
}

/// Build one rotation matrix per angle in `theta`.
///
/// # See also
/// * [`rotate`] – scalar variant
pub fn rotate_stack(theta: &DVector<f64>, axis: Axis) -> Vec<Matrix3<f64>> {
    theta.iter().map(|&t| rotate(t, axis)).collect()
}

/// Fold the frequency `f` into the Nyquist band of the sampling frequency `fs`.
///
/// Returns `|f − fs·round(f/fs)|`, which always lies in [0, fs/2].
pub fn aliasing(f: f64, fs: f64) -> f64 {
    (f - fs * (f / fs).round()).abs()
}

/// Associated Legendre function of low degree, Condon–Shortley phase.
///
/// Degrees 0 through 3 cover every harmonic used by the tidal potential, so
/// the functions are hard coded rather than built from a recursion relation.
/// `x` is typically the cosine of colatitude.
///
/// Arguments
/// ---------
/// * `l`: degree, 0..=3.
/// * `m`: order, 0..=l.
/// * `x`: evaluation point in [-1, 1].
///
/// Returns
/// --------
/// * Pₗₘ(x) with the Condon–Shortley factor (−1)ᵐ applied.
///
/// Panics
/// -------
/// * If `l` is greater than 3 or `m` greater than `l`.
///
/// # See also
/// * [`assoc_legendre`] – fully normalized values for arbitrary degree
pub fn legendre(l: usize, m: usize, x: f64) -> f64 {
    assert!(l <= 3, "Degree must be between 0 and 3");
    assert!(m <= l, "Order must be between 0 and l");
    let u = (1.0 - x * x).sqrt();
    let plm = match (l, m) {
        (0, 0) => 1.0,
        (1, 0) => x,
        (1, 1) => u,
        (2, 0) => 0.5 * (3.0 * x * x - 1.0),
        (2, 1) => 3.0 * x * u,
        (2, 2) => 3.0 * u * u,
        (3, 0) => 0.5 * (5.0 * x * x * x - 3.0 * x),
        (3, 1) => 1.5 * (5.0 * x * x - 1.0) * u,
        (3, 2) => 15.0 * x * u * u,
        (3, 3) => 15.0 * u * u * u,
        _ => unreachable!(),
    };
    if m % 2 == 1 {
        -plm
    } else {
        plm
    }
}

/// Associated Legendre function of low degree at every element of `x`.
///
/// # See also
/// * [`legendre`] – scalar variant, argument and panic contract
pub fn legendre_vec(l: usize, m: usize, x: &DVector<f64>) -> DVector<f64> {
    x.map(|xi| legendre(l, m, xi))
}

/// Table of fully normalized associated Legendre functions.
///
/// Dense (lmax+1) × (lmax+1) × n storage indexed by `(degree, order, sample)`,
/// read-only once built by [`assoc_legendre`]. Entries with order greater
/// than degree are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    degrees: usize,
    samples: usize,
    data: Vec<f64>,
}

impl LegendreTable {
    fn zeros(lmax: usize, samples: usize) -> Self {
        let degrees = lmax + 1;
        LegendreTable {
            degrees,
            samples,
            data: vec![0.0; degrees * degrees * samples],
        }
    }

    #[inline]
    fn offset(&self, l: usize, m: usize, i: usize) -> usize {
        assert!(l < self.degrees, "degree out of range");
        assert!(m <= l, "order out of range");
        assert!(i < self.samples, "sample out of range");
        (l * self.degrees + m) * self.samples + i
    }

    // P(l-2, m) does not exist when m == l-1; the recursion treats it as zero.
    #[inline]
    fn get_or_zero(&self, l: usize, m: usize, i: usize) -> f64 {
        if m > l {
            0.0
        } else {
            self[(l, m, i)]
        }
    }

    #[inline]
    fn set(&mut self, l: usize, m: usize, i: usize, value: f64) {
        let n = self.offset(l, m, i);
        self.data[n] = value;
    }

    /// Maximum degree of the table.
    pub fn lmax(&self) -> usize {
        self.degrees - 1
    }

    /// Number of evaluation samples.
    pub fn samples(&self) -> usize {
        self.samples
    }
}

impl std::ops::Index<(usize, usize, usize)> for LegendreTable {
    type Output = f64;

    /// Read the value for `(degree, order, sample)`.
    ///
    /// Panics
    /// -------
    /// * If the degree, order or sample index falls outside the table.
    fn index(&self, (l, m, i): (usize, usize, usize)) -> &f64 {
        &self.data[self.offset(l, m, i)]
    }
}

/// Compute fully (4π-)normalized associated Legendre functions up to `lmax`.
///
/// Uses the standard forward-column recursion: zonal and tesseral terms from
/// the two-term vertical recursion
///
/// ```text
/// P(l,m) = a(l,m)·√(2l+1)·x·P(l-1,m) − b(l,m)·√(2l+1)·P(l-2,m)
/// a(l,m) = √((2l−1) / ((l−m)(l+m)))
/// b(l,m) = √((l+m−1)(l−m−1) / ((l−m)(l+m)(2l−3)))
/// ```
///
/// and sectorial terms seeded from the previous sectorial term,
/// `P(l,l) = u·√((2l+1)/(2l))·P(l-1,l-1)`, starting from P(0,0) = 1,
/// P(1,0) = √3·x and P(1,1) = √3·u with u = √(1−x²).
///
/// Arguments
/// ---------
/// * `lmax`: maximum degree.
/// * `x`: evaluation points in [-1, 1] (cosine of colatitude).
///
/// Returns
/// --------
/// * The full [`LegendreTable`] for degrees 0..=lmax at each sample.
pub fn assoc_legendre(lmax: usize, x: &DVector<f64>) -> LegendreTable {
    let nx = x.len();
    let mut plm = LegendreTable::zeros(lmax, nx);
    for (i, &xi) in x.iter().enumerate() {
        let u = (1.0 - xi * xi).sqrt();
        plm.set(0, 0, i, 1.0);
        if lmax == 0 {
            continue;
        }
        plm.set(1, 0, i, 3.0_f64.sqrt() * xi);
        plm.set(1, 1, i, 3.0_f64.sqrt() * u);
        for l in 2..=lmax {
            let lf = l as f64;
            let norm = (2.0 * lf + 1.0).sqrt();
            for m in 0..l {
                let mf = m as f64;
                let a = ((2.0 * lf - 1.0) / ((lf - mf) * (lf + mf))).sqrt();
                let b = ((lf + mf - 1.0) * (lf - mf - 1.0)
                    / ((lf - mf) * (lf + mf) * (2.0 * lf - 3.0)))
                    .sqrt();
                let value = a * norm * xi * plm[(l - 1, m, i)]
                    - b * norm * plm.get_or_zero(l - 2, m, i);
                plm.set(l, m, i, value);
            }
            // sectorial term, seed for the next degree
            let value = u * (norm / (2.0 * lf).sqrt()) * plm[(l - 1, l - 1, i)];
            plm.set(l, l, i, value);
        }
    }
    plm
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|k| k as f64).product()
}

/// Complex spherical harmonic of degree `l` and order `m`.
///
/// Uses the Munk–Cartwright normalization `√((l−m)!/(l+m)!)` on the
/// low-degree [`legendre`] function, scaled by `√((2l+1)/4π)` and by
/// `sin(theta)·exp(i·m·phi)`.
///
/// Arguments
/// ---------
/// * `l`: degree, 0..=3.
/// * `m`: order, 0..=l.
/// * `theta`: colatitudes in radians.
/// * `phi`: longitudes in radians, same length as `theta`.
///
/// Returns
/// --------
/// * Complex Yₗₘ at every (theta, phi) pair, or a
///   [`ShapeMismatch`](PerthError::ShapeMismatch) error when the coordinate
///   vectors disagree in length.
///
/// Panics
/// -------
/// * If `l` is greater than 3 or `m` greater than `l` (see [`legendre`]).
pub fn sph_harm(
    l: usize,
    m: usize,
    theta: &DVector<f64>,
    phi: &DVector<f64>,
) -> Result<DVector<Complex<f64>>, PerthError> {
    assert!(l <= 3, "Degree must be between 0 and 3");
    assert!(m <= l, "Order must be between 0 and l");
    if theta.len() != phi.len() {
        return Err(PerthError::ShapeMismatch {
            what: "spherical harmonic coordinates",
            expected: theta.len(),
            found: phi.len(),
        });
    }
    let norm = (factorial(l - m) / factorial(l + m)).sqrt();
    let dfactor = ((2.0 * l as f64 + 1.0) / (4.0 * std::f64::consts::PI)).sqrt();
    let ylm = theta.iter().zip(phi.iter()).map(|(&th, &ph)| {
        let plm = norm * legendre(l, m, th.cos());
        Complex::from_polar(1.0, m as f64 * ph).scale(dfactor * plm * th.sin())
    });
    Ok(DVector::from_iterator(theta.len(), ylm))
}
