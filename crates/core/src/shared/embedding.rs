/// Fixed-length face descriptor produced by an embedding model.
///
/// Visually similar faces have a small Euclidean distance between their
/// embeddings. Scoped to a single request; never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Euclidean distance, accumulated in `f64`.
    ///
    /// Returns `None` when the dimensionalities differ.
    pub fn euclidean_distance(&self, other: &Embedding) -> Option<f64> {
        if self.dim() != other.dim() {
            return None;
        }
        let sum: f64 = self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = *a as f64 - *b as f64;
                d * d
            })
            .sum();
        Some(sum.sqrt())
    }

    /// Scales to unit length in place. A zero vector is left untouched.
    pub fn l2_normalize(&mut self) {
        let norm: f32 = self.0.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in self.0.iter_mut() {
                *x /= norm;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_to_self_is_zero() {
        let e = Embedding::new(vec![0.1, -0.4, 0.9]);
        assert_relative_eq!(e.euclidean_distance(&e).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_three_four_five() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert_relative_eq!(a.euclidean_distance(&b).unwrap(), 5.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Embedding::new(vec![0.2, 0.7, -0.1]);
        let b = Embedding::new(vec![-0.3, 0.1, 0.4]);
        assert_relative_eq!(
            a.euclidean_distance(&b).unwrap(),
            b.euclidean_distance(&a).unwrap()
        );
    }

    #[test]
    fn test_distance_dimension_mismatch() {
        let a = Embedding::new(vec![0.0; 128]);
        let b = Embedding::new(vec![0.0; 512]);
        assert!(a.euclidean_distance(&b).is_none());
    }

    #[test]
    fn test_l2_normalize_unit_vector() {
        let mut e = Embedding::new(vec![3.0, 4.0]);
        e.l2_normalize();
        assert_relative_eq!(e.as_slice()[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(e.as_slice()[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut e = Embedding::new(vec![0.0, 0.0, 0.0]);
        e.l2_normalize();
        assert_eq!(e.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_is_finite() {
        assert!(Embedding::new(vec![1.0, 2.0]).is_finite());
        assert!(!Embedding::new(vec![1.0, f32::NAN]).is_finite());
        assert!(!Embedding::new(vec![f32::INFINITY]).is_finite());
    }
}
