use approx::assert_relative_eq;
use nalgebra::DVector;

/// Assert two vectors agree elementwise within `epsilon`.
pub fn assert_dvector_close(actual: &DVector<f64>, expected: &DVector<f64>, epsilon: f64) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "vector lengths differ: {} vs {}",
        actual.len(),
        expected.len()
    );
    for i in 0..actual.len() {
        assert_relative_eq!(actual[i], expected[i], epsilon = epsilon);
    }
}
