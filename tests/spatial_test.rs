use approx::assert_relative_eq;
use nalgebra::{dvector, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use perth::spatial::{self, Ellipsoid, GeodeticOptions, Method};

mod common;

/// Transfer a latitude scan from WGS84 to the TOPEX/POSEIDON ellipsoid and
/// back. Expected extrema follow the NSIDC IDL ellipsoid-conversion test
/// case: one-way latitude shifts of ±1.23e-7 degrees peaking at mid
/// latitudes, elevation shifts growing from the equatorial to the polar axis
/// difference, and a round trip that recovers the inputs to roundoff.
#[test]
fn test_convert_ellipsoid_topex() {
    let lat_wgs84: DVector<f64> = DVector::from_fn(181, |i, _| 90.0 - i as f64);
    let elev_wgs84: DVector<f64> = DVector::from_element(181, 3000.0);

    let (lat_tpx, elev_tpx) = spatial::convert_ellipsoid(
        &lat_wgs84,
        &elev_wgs84,
        Ellipsoid::WGS84,
        Ellipsoid::TOPEX,
        GeodeticOptions::ELLIPSOID_TRANSFER,
    )
    .unwrap();

    let mut min_dlat = f64::INFINITY;
    let mut max_dlat = f64::NEG_INFINITY;
    let mut min_delev = f64::INFINITY;
    let mut max_delev = f64::NEG_INFINITY;
    for i in 0..lat_wgs84.len() {
        min_dlat = min_dlat.min(lat_tpx[i] - lat_wgs84[i]);
        max_dlat = max_dlat.max(lat_tpx[i] - lat_wgs84[i]);
        // centimetres
        min_delev = min_delev.min(100.0 * (elev_tpx[i] - elev_wgs84[i]));
        max_delev = max_delev.max(100.0 * (elev_tpx[i] - elev_wgs84[i]));
    }
    assert_relative_eq!(min_dlat, -1.2305653e-7, epsilon = 1e-8);
    assert_relative_eq!(max_dlat, 1.2305653e-7, epsilon = 1e-8);
    assert_relative_eq!(min_delev, 70.0, epsilon = 1e-3);
    assert_relative_eq!(max_delev, 71.3682, epsilon = 1e-3);

    let (lat_back, elev_back) = spatial::convert_ellipsoid(
        &lat_tpx,
        &elev_tpx,
        Ellipsoid::TOPEX,
        Ellipsoid::WGS84,
        GeodeticOptions::ELLIPSOID_TRANSFER,
    )
    .unwrap();
    for i in 0..lat_wgs84.len() {
        assert!((lat_back[i] - lat_wgs84[i]).abs() < 1e-12);
        assert!((elev_back[i] - elev_wgs84[i]).abs() < 1e-7);
    }
}

/// Every geodetic solver must invert `to_cartesian` over random locations.
#[test]
fn test_geodetic_round_trip() {
    let mut rng = StdRng::seed_from_u64(886);
    let longitude: DVector<f64> = DVector::from_fn(100, |_, _| -180.0 + 360.0 * rng.random::<f64>());
    let latitude: DVector<f64> = DVector::from_fn(100, |_, _| -89.95 + 179.9 * rng.random::<f64>());
    let height: DVector<f64> = DVector::from_fn(100, |_, _| 10000.0 * rng.random::<f64>());

    let (x, y, z) =
        spatial::to_cartesian(&longitude, &latitude, &height, Ellipsoid::WGS84).unwrap();

    for method in [Method::Moritz, Method::Bowring, Method::Zhu] {
        let geo = spatial::to_geodetic(
            &x,
            &y,
            &z,
            Ellipsoid::WGS84,
            method,
            GeodeticOptions::default(),
        )
        .unwrap();
        assert!(geo.converged);
        for i in 0..longitude.len() {
            assert!(
                (geo.longitude[i] - longitude[i]).abs() < 1e-6,
                "{method:?} longitude at point {i}"
            );
            assert!(
                (geo.latitude[i] - latitude[i]).abs() < 1e-6,
                "{method:?} latitude at point {i}"
            );
            assert!(
                (geo.height[i] - height[i]).abs() < 1e-4,
                "{method:?} height at point {i}"
            );
        }
    }
}

/// Regression values for the ENU frame change at an Ordnance Survey site.
#[test]
fn test_ecef_to_enu() {
    let x = dvector![3771793.968];
    let y = dvector![140253.342];
    let z = dvector![5124304.349];
    let (east, north, up) =
        spatial::to_enu(&x, &y, &z, 2.0, 53.0, 0.0, Ellipsoid::WGS84).unwrap();
    assert_relative_eq!(east[0], 8534.192304843, epsilon = 1e-6);
    assert_relative_eq!(north[0], 90086.3793375129, epsilon = 1e-6);
    assert_relative_eq!(up[0], -569.0841634049, epsilon = 1e-6);

    let (xr, yr, zr) =
        spatial::from_enu(&east, &north, &up, 2.0, 53.0, 0.0, Ellipsoid::WGS84).unwrap();
    common::assert_dvector_close(&xr, &x, 1e-6);
    common::assert_dvector_close(&yr, &y, 1e-6);
    common::assert_dvector_close(&zr, &z, 1e-6);
}

/// Solar and lunar look angles from the US Naval Observatory, against the
/// published almanac values for J2000.
#[test]
fn test_ecef_to_horizontal() {
    let lon0 = -77.0669;
    let lat0 = 38.9215;
    let h0 = 92.0;

    // solar ephemerides at J2000
    let sx = dvector![1.353631936e11];
    let sy = dvector![1.938584775e9];
    let sz = dvector![-5.755477511e10];
    // lunar ephemerides at J2000
    let lx = dvector![2.09322658e8];
    let ly = dvector![-3.35161630e8];
    let lz = dvector![-7.60803221e7];

    let (se, sn, su) = spatial::to_enu(&sx, &sy, &sz, lon0, lat0, h0, Ellipsoid::WGS84).unwrap();
    let (le, ln, lu) = spatial::to_enu(&lx, &ly, &lz, lon0, lat0, h0, Ellipsoid::WGS84).unwrap();

    let (salt, saz, _) = spatial::to_horizontal(&se, &sn, &su).unwrap();
    assert_relative_eq!(salt[0], -5.486, epsilon = 1e-3);
    assert_relative_eq!(saz[0], 115.320, epsilon = 1e-3);

    let (lalt, laz, _) = spatial::to_horizontal(&le, &ln, &lu).unwrap();
    assert_relative_eq!(lalt[0], 36.381, epsilon = 1e-3);
    assert_relative_eq!(laz[0], 156.297, epsilon = 1e-3);

    let solar_zenith = spatial::to_zenith(&se, &sn, &su).unwrap();
    assert_relative_eq!(solar_zenith[0], 95.486, epsilon = 1e-3);
    assert_eq!(solar_zenith[0], 90.0 - salt[0]);

    let lunar_zenith = spatial::to_zenith(&le, &ln, &lu).unwrap();
    assert_relative_eq!(lunar_zenith[0], 53.619, epsilon = 1e-3);
    assert_eq!(lunar_zenith[0], 90.0 - lalt[0]);
}
