//! # Tide-time helpers
//!
//! Conversions between calendar dates, Modified Julian Dates and the tide
//! time used by the prediction drivers, which counts days since
//! 1992-01-01T00:00:00 UTC (MJD 48622). A small ΔT approximation is included
//! for the conventions that evaluate their astronomical arguments on the
//! dynamical timescale.

use hifitime::Epoch;
use std::str::FromStr;

use nalgebra::DVector;

use crate::constants::{MJD, TIDE_EPOCH_MJD, TideDays};
use crate::perth_errors::PerthError;

/// The tide-time origin, 1992-01-01T00:00:00 UTC.
pub fn tide_epoch() -> Epoch {
    Epoch::from_mjd_utc(TIDE_EPOCH_MJD)
}

/// Days elapsed between the tide-time origin and `epoch`.
pub fn to_tide_days(epoch: Epoch) -> TideDays {
    epoch.to_mjd_utc_days() - TIDE_EPOCH_MJD
}

/// The epoch lying `days` tide days after the tide-time origin.
pub fn from_tide_days(days: TideDays) -> Epoch {
    Epoch::from_mjd_utc(TIDE_EPOCH_MJD + days)
}

/// Parse ISO-8601 dates (`YYYY-MM-ddTHH:mm:ss`, UTC) into tide days.
///
/// Arguments
/// ---------
/// * `dates`: date strings, one per requested time
///
/// Returns
/// --------
/// * `DVector<TideDays>` aligned with the input, or a
///   [`PerthError::TimeParse`] naming the offending string
pub fn date_to_tide_days(dates: &[&str]) -> Result<DVector<TideDays>, PerthError> {
    let days = dates
        .iter()
        .map(|date| {
            Epoch::from_str(date)
                .map(to_tide_days)
                .map_err(|e| PerthError::TimeParse(format!("{date}: {e}")))
        })
        .collect::<Result<Vec<TideDays>, PerthError>>()?;
    Ok(DVector::from_vec(days))
}

/// Parse ISO-8601 dates (`YYYY-MM-ddTHH:mm:ss`, UTC) into Modified Julian
/// Dates.
pub fn date_to_mjd(dates: &[&str]) -> Result<DVector<MJD>, PerthError> {
    let mjd = dates
        .iter()
        .map(|date| {
            Epoch::from_str(date)
                .map(|e| e.to_mjd_utc_days())
                .map_err(|e| PerthError::TimeParse(format!("{date}: {e}")))
        })
        .collect::<Result<Vec<MJD>, PerthError>>()?;
    Ok(DVector::from_vec(mjd))
}

/// TT−UTC [days] at `epoch`, from the leap-second table and the fixed
/// TT−TAI offset of 32.184 s.
///
/// This approximates TT−UT1 to better than a second, which shifts the slow
/// astronomical arguments by well under a millidegree. Callers holding IERS
/// Earth-orientation tables can supply their exact ΔT to the prediction
/// drivers instead.
pub fn tt_minus_utc_days(epoch: Epoch) -> f64 {
    epoch.to_mjd_tt_days() - epoch.to_mjd_utc_days()
}

/// ΔT vector aligned with a tide-day series, for the dynamical-time
/// argument conventions.
///
/// # See also
/// * [`tt_minus_utc_days`] – the per-epoch scalar form
pub fn delta_times(t: &DVector<TideDays>) -> DVector<f64> {
    t.map(|days| tt_minus_utc_days(from_tide_days(days)))
}

#[cfg(test)]
mod time_test {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dvector;

    #[test]
    fn test_tide_epoch() {
        assert_eq!(tide_epoch().to_mjd_utc_days(), 48622.0);
        assert_eq!(to_tide_days(tide_epoch()), 0.0);
        assert_eq!(from_tide_days(9497.0).to_mjd_utc_days(), 58119.0);
    }

    #[test]
    fn test_date_to_tide_days() {
        let t = date_to_tide_days(&[
            "1992-01-01T00:00:00",
            "1992-01-02T00:00:00",
            "1998-06-15T12:00:00",
        ])
        .unwrap();
        assert_eq!(t, dvector![0.0, 1.0, 2357.5]);
    }

    #[test]
    fn test_date_to_mjd() {
        let mjd = date_to_mjd(&["2021-01-01T00:00:00", "2021-01-02T00:00:00"]).unwrap();
        assert_eq!(mjd, dvector![59215.0, 59216.0]);
    }

    #[test]
    fn test_parse_error() {
        let result = date_to_tide_days(&["2021-01-01T00:00:00", "not-a-date"]);
        assert!(matches!(result, Err(PerthError::TimeParse(_))));
    }

    #[test]
    fn test_tt_minus_utc() {
        // 26 leap seconds at the tide epoch, 37 since 2017
        let dt = tt_minus_utc_days(tide_epoch());
        assert_relative_eq!(dt, 58.184 / 86400.0, epsilon = 1e-9);
        let dt = tt_minus_utc_days(Epoch::from_mjd_utc(59215.0));
        assert_relative_eq!(dt, 69.184 / 86400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_delta_times() {
        let dt = delta_times(&dvector![0.0, 9497.0]);
        assert_relative_eq!(dt[0], 58.184 / 86400.0, epsilon = 1e-9);
        assert_relative_eq!(dt[1], 69.184 / 86400.0, epsilon = 1e-9);
    }
}
