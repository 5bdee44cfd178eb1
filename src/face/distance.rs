//! Face descriptor comparison.

use serde::{Deserialize, Serialize};

/// Distance reported when two descriptors have different lengths.
///
/// Infinite, so it fails every threshold.
pub const DISTANCE_MISMATCH: f64 = f64::INFINITY;

/// Default maximum distance accepted as the same face.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// The result of comparing a captured descriptor with an enrolled one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    /// Euclidean distance between the descriptors.
    pub distance: f64,
    /// Threshold the distance was compared against.
    pub threshold: f64,
    /// Whether `distance <= threshold`.
    pub matched: bool,
}

/// Euclidean distance between two descriptors.
///
/// Accumulates in `f64`. Descriptors of different lengths yield
/// [`DISTANCE_MISMATCH`].
///
/// # Examples
///
/// ```
/// use hris::face::{euclidean_distance, DISTANCE_MISMATCH};
///
/// assert_eq!(euclidean_distance(&[0.0, 3.0], &[4.0, 0.0]), 5.0);
/// assert_eq!(euclidean_distance(&[1.0], &[1.0, 2.0]), DISTANCE_MISMATCH);
/// ```
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return DISTANCE_MISMATCH;
    }
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = f64::from(*x) - f64::from(*y);
            diff * diff
        })
        .sum::<f64>()
        .sqrt()
}

/// Compares a captured descriptor against an enrolled descriptor.
pub fn match_descriptor(captured: &[f32], enrolled: &[f32], threshold: f64) -> FaceMatch {
    let distance = euclidean_distance(captured, enrolled);
    FaceMatch {
        distance,
        threshold,
        matched: distance <= threshold,
    }
}
