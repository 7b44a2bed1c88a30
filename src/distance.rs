//! Distance metrics between feature vectors.
//!
//! Every metric is a plain function `(&[F], &[F]) -> Result<f64>`. Learners take the
//! metric as a generic parameter bounded by [`DistanceMetric`], so a free function,
//! a closure or a [`KnnDistance`] value can be passed without boxing.

use num_traits::{AsPrimitive, Float};

use crate::error::{MlError, Result};

/// Anything that can measure the distance between two feature vectors.
pub trait DistanceMetric<F> {
    fn distance(&self, a: &[F], b: &[F]) -> Result<f64>;
}

impl<F, M> DistanceMetric<F> for M
where
    M: Fn(&[F], &[F]) -> Result<f64>,
{
    fn distance(&self, a: &[F], b: &[F]) -> Result<f64> {
        self(a, b)
    }
}

/// Named metrics, handy when the metric is chosen at runtime (CLI flag, Python).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KnnDistance {
    Euclidean,
    Manhattan,
    Chebyshev,
    Hamming { threshold: f64 },
    Minkowski { p: u32 }, // p is the order for Minkowski distance
    Cosine,
}

impl Default for KnnDistance {
    fn default() -> Self {
        KnnDistance::Manhattan
    }
}

impl<F> DistanceMetric<F> for KnnDistance
where
    F: Float + AsPrimitive<f64>,
{
    fn distance(&self, a: &[F], b: &[F]) -> Result<f64> {
        match *self {
            KnnDistance::Euclidean => euclidean_distance(a, b),
            KnnDistance::Manhattan => manhattan_distance(a, b),
            KnnDistance::Chebyshev => chebyshev_distance(a, b),
            KnnDistance::Hamming { threshold } => hamming_distance(a, b, threshold),
            KnnDistance::Minkowski { p } => minkowski_distance(a, b, p),
            KnnDistance::Cosine => cosine_distance(a, b),
        }
    }
}

fn check_dimensions<F>(a: &[F], b: &[F]) -> Result<()> {
    if a.len() != b.len() {
        return Err(MlError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Sum of absolute coordinate differences.
pub fn manhattan_distance<F>(a: &[F], b: &[F]) -> Result<f64>
where
    F: Float + AsPrimitive<f64>,
{
    check_dimensions(a, b)?;
    Ok(a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs().as_()).sum())
}

pub fn euclidean_distance<F>(a: &[F], b: &[F]) -> Result<f64>
where
    F: Float + AsPrimitive<f64>,
{
    check_dimensions(a, b)?;
    let sum_sq_diff: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff: f64 = (x - y).as_();
            diff * diff
        })
        .sum();
    Ok(sum_sq_diff.sqrt())
}

/// Largest absolute coordinate difference (L∞).
pub fn chebyshev_distance<F>(a: &[F], b: &[F]) -> Result<f64>
where
    F: Float + AsPrimitive<f64>,
{
    check_dimensions(a, b)?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y).abs().as_())
        .fold(0.0, f64::max))
}

/// Minkowski distance of order `p`. `p = 1` is Manhattan, `p = 2` is Euclidean.
pub fn minkowski_distance<F>(a: &[F], b: &[F], p: u32) -> Result<f64>
where
    F: Float + AsPrimitive<f64>,
{
    if p == 0 {
        return Err(MlError::InvalidParameter(
            "Minkowski order p must be at least 1".to_string(),
        ));
    }
    if p == 1 {
        return manhattan_distance(a, b);
    }
    check_dimensions(a, b)?;
    let sum_of_powers: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let diff: f64 = (x - y).abs().as_();
            diff.powi(p as i32)
        })
        .sum();
    Ok(sum_of_powers.powf(1.0 / p as f64))
}

/// Number of coordinates whose absolute difference exceeds `threshold`.
pub fn hamming_distance<F>(a: &[F], b: &[F], threshold: f64) -> Result<f64>
where
    F: Float + AsPrimitive<f64>,
{
    check_dimensions(a, b)?;
    let differing = a
        .iter()
        .zip(b.iter())
        .filter(|&(&x, &y)| (x - y).abs().as_() > threshold)
        .count();
    Ok(differing as f64)
}

/// Cosine distance = 1 - cosine similarity.
///
/// Two zero vectors are at distance 0; a zero vector and a non-zero vector are at 1.
pub fn cosine_distance<F>(a: &[F], b: &[F]) -> Result<f64>
where
    F: Float + AsPrimitive<f64>,
{
    check_dimensions(a, b)?;
    if a.is_empty() {
        return Ok(0.0);
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(&x, &y)| (x * y).as_()).sum();
    let mag_a = a.iter().map(|&x| (x * x).as_()).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|&x| (x * x).as_()).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        if mag_a == mag_b {
            return Ok(0.0);
        }
        return Ok(1.0);
    }
    // Clamp to guard against rounding pushing similarity outside [-1, 1]
    let similarity = (dot / (mag_a * mag_b)).clamp(-1.0, 1.0);
    Ok(1.0 - similarity)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_manhattan_distance() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 6.0, 3.5];
        // |1-4| + |2-6| + |3-3.5| = 3 + 4 + 0.5
        let dist = manhattan_distance(&a, &b).unwrap();
        assert!((dist - 7.5).abs() < EPSILON, "Expected 7.5, got {}", dist);
    }

    #[test]
    fn test_manhattan_symmetry_and_reflexivity() {
        let vectors = vec![
            vec![0.0, 0.0],
            vec![-1.5, 2.25],
            vec![10.0, -3.0],
            vec![0.1, 0.2],
        ];
        for a in vectors.iter() {
            assert_eq!(manhattan_distance(a, a).unwrap(), 0.0);
            for b in vectors.iter() {
                let ab = manhattan_distance(a, b).unwrap();
                let ba = manhattan_distance(b, a).unwrap();
                assert_eq!(ab, ba);
                assert!(ab >= 0.0);
            }
        }
    }

    #[test]
    fn test_dimension_mismatch_is_an_error() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        match manhattan_distance(&a, &b) {
            Err(MlError::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("Expected DimensionMismatch, got {:?}", other),
        }
        assert!(euclidean_distance(&a, &b).is_err());
        assert!(cosine_distance(&a, &b).is_err());
        assert!(KnnDistance::Chebyshev.distance(&a, &b).is_err());
    }

    #[test]
    fn test_minkowski_distance() {
        let vec_a = vec![1.0, 2.0, 3.0];
        let vec_b = vec![4.0, 5.0, 6.0];

        // p = 1: 3 + 3 + 3
        let dist1 = minkowski_distance(&vec_a, &vec_b, 1).unwrap();
        assert!((dist1 - 9.0).abs() < EPSILON, "Minkowski p=1 failed, got {}", dist1);

        // p = 2: sqrt(27)
        let dist2 = minkowski_distance(&vec_a, &vec_b, 2).unwrap();
        assert!((dist2 - 27.0_f64.sqrt()).abs() < EPSILON, "Minkowski p=2 failed, got {}", dist2);

        // p = 3: cbrt(81)
        let dist3 = minkowski_distance(&vec_a, &vec_b, 3).unwrap();
        assert!((dist3 - 81.0_f64.cbrt()).abs() < EPSILON, "Minkowski p=3 failed, got {}", dist3);

        let empty: Vec<f64> = vec![];
        assert_eq!(minkowski_distance(&empty, &empty, 2).unwrap(), 0.0);

        assert!(matches!(
            minkowski_distance(&vec_a, &vec_b, 0),
            Err(MlError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_chebyshev_and_hamming() {
        let a = vec![1.0_f32, 5.0, 2.0];
        let b = vec![2.0_f32, 1.0, 2.05];
        assert!((chebyshev_distance(&a, &b).unwrap() - 4.0).abs() < 1e-6);
        assert_eq!(hamming_distance(&a, &b, 0.1).unwrap(), 2.0);
    }

    #[test]
    fn test_cosine_distance() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!((cosine_distance(&a, &b).unwrap() - 1.0).abs() < EPSILON);
        assert!(cosine_distance(&a, &a).unwrap().abs() < EPSILON);

        let zero = vec![0.0, 0.0];
        assert_eq!(cosine_distance(&zero, &zero).unwrap(), 0.0);
        assert_eq!(cosine_distance(&zero, &a).unwrap(), 1.0);
    }

    #[test]
    fn test_enum_and_closure_metrics_are_interchangeable() {
        fn measure<M: DistanceMetric<f64>>(metric: M) -> f64 {
            metric.distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap()
        }
        assert_eq!(measure(KnnDistance::Manhattan), 7.0);
        assert_eq!(measure(KnnDistance::Euclidean), 5.0);
        assert_eq!(measure(manhattan_distance::<f64>), 7.0);
        let scaled = |a: &[f64], b: &[f64]| -> Result<f64> { Ok(2.0 * manhattan_distance(a, b)?) };
        assert_eq!(measure(scaled), 14.0);
    }
}
