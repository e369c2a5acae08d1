//! Vector type with multi-backend support

use crate::activation::{apply, Activation};
use crate::{Backend, Result};

/// Owned `f32` buffer bound to an execution backend
///
/// # Examples
///
/// ```
/// use chispa::Vector;
///
/// let v = Vector::from_slice(&[-2.0, 0.0, 3.0]);
/// let result = v.relu().unwrap();
///
/// assert_eq!(result.as_slice(), &[0.0, 0.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vector<T> {
    data: Vec<T>,
    backend: Backend,
}

impl<T> Vector<T>
where
    T: Clone,
{
    /// Create vector from slice using auto-selected optimal backend
    ///
    /// # Examples
    ///
    /// ```
    /// use chispa::Vector;
    ///
    /// let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);
    /// assert_eq!(v.len(), 4);
    /// ```
    pub fn from_slice(data: &[T]) -> Self {
        Self {
            data: data.to_vec(),
            backend: crate::select_best_available_backend(),
        }
    }

    /// Create vector with specific backend (for benchmarking or testing)
    ///
    /// # Examples
    ///
    /// ```
    /// use chispa::{Vector, Backend};
    ///
    /// let v = Vector::from_slice_with_backend(&[1.0, 2.0], Backend::Scalar);
    /// assert_eq!(v.len(), 2);
    /// assert_eq!(v.backend(), Backend::Scalar);
    /// ```
    pub fn from_slice_with_backend(data: &[T], backend: Backend) -> Self {
        Self {
            data: data.to_vec(),
            backend: backend.resolve(),
        }
    }

    /// Get underlying data as slice
    ///
    /// # Examples
    ///
    /// ```
    /// use chispa::Vector;
    ///
    /// let v = Vector::from_slice(&[1.0, 2.0, 3.0]);
    /// assert_eq!(v.as_slice(), &[1.0, 2.0, 3.0]);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Get vector length
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if vector is empty
    ///
    /// # Examples
    ///
    /// ```
    /// use chispa::Vector;
    ///
    /// let v1: Vector<f32> = Vector::from_slice(&[]);
    /// assert!(v1.is_empty());
    ///
    /// let v2 = Vector::from_slice(&[1.0]);
    /// assert!(!v2.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the backend being used
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl Vector<f32> {
    /// Apply `activation` elementwise on this vector's backend
    ///
    /// The result keeps the same backend.
    ///
    /// # Examples
    ///
    /// ```
    /// use chispa::{Activation, Vector};
    ///
    /// let v = Vector::from_slice(&[-4.0, 9.0]);
    /// let result = v.apply(Activation::MaskedSqrt).unwrap();
    /// assert_eq!(result.as_slice(), &[-4.0, 3.0]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChispaError::UnsupportedBackend`] if the vector was
    /// bound to a backend this CPU lacks, or
    /// [`crate::ChispaError::InvalidInput`] for an invalid slope.
    pub fn apply(&self, activation: Activation) -> Result<Self> {
        let mut result = vec![0.0; self.len()];
        apply(self.backend, activation, &self.data, &mut result)?;

        Ok(Self {
            data: result,
            backend: self.backend,
        })
    }

    /// ReLU: `max(x, 0)`
    pub fn relu(&self) -> Result<Self> {
        self.apply(Activation::Relu)
    }

    /// Leaky ReLU (compare + merge); any finite slope
    ///
    /// # Examples
    ///
    /// ```
    /// use chispa::Vector;
    ///
    /// let v = Vector::from_slice(&[-10.0, 5.0]);
    /// assert_eq!(v.leaky_relu(0.1).unwrap().as_slice(), &[-1.0, 5.0]);
    /// ```
    pub fn leaky_relu(&self, slope: f32) -> Result<Self> {
        self.apply(Activation::LeakyRelu { slope })
    }

    /// Leaky ReLU as `max(x, slope * x)`
    ///
    /// # Errors
    ///
    /// Returns [`crate::ChispaError::InvalidInput`] unless `0 <= slope <= 1`.
    pub fn leaky_relu_max(&self, slope: f32) -> Result<Self> {
        self.apply(Activation::LeakyReluMax { slope })
    }

    /// Swish / SiLU: `x * σ(x)`
    pub fn swish(&self) -> Result<Self> {
        self.apply(Activation::Swish)
    }

    /// Exact GELU: `x * Φ(x)`
    pub fn gelu(&self) -> Result<Self> {
        self.apply(Activation::Gelu)
    }

    /// Tanh GELU approximation
    pub fn gelu_tanh(&self) -> Result<Self> {
        self.apply(Activation::GeluTanh)
    }

    /// Cook tanh GELU approximation
    pub fn gelu_tanh_cook(&self) -> Result<Self> {
        self.apply(Activation::GeluTanhCook)
    }

    /// Logistic GELU approximation
    pub fn gelu_logistic(&self) -> Result<Self> {
        self.apply(Activation::GeluLogistic)
    }

    /// Dish: `0.5x(1 + x / sqrt(1 + x²))`
    pub fn dish(&self) -> Result<Self> {
        self.apply(Activation::Dish)
    }

    /// ELiSH
    pub fn elish(&self) -> Result<Self> {
        self.apply(Activation::Elish)
    }

    /// Masked square root: `sqrt(x)` where `x > 0`, `x` elsewhere
    pub fn masked_sqrt(&self) -> Result<Self> {
        self.apply(Activation::MaskedSqrt)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Property test: Vector and scalar results agree within tolerance
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_vector_matches_scalar_reference(
            data in prop::collection::vec(-20.0f32..20.0, 0..300)
        ) {
            let fast = Vector::from_slice(&data);
            let reference = Vector::from_slice_with_backend(&data, Backend::Scalar);

            for activation in Activation::ALL {
                let a = fast.apply(activation).unwrap();
                let e = reference.apply(activation).unwrap();
                let tolerance = activation.tolerance();
                for (&ai, &ei) in a.as_slice().iter().zip(e.as_slice()) {
                    prop_assert!(tolerance.approx_eq(ai, ei), "{}: {} vs {}", activation, ai, ei);
                }
            }
        }
    }

    // Property test: ReLU is idempotent
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_relu_idempotent(
            data in prop::collection::vec(-1000.0f32..1000.0, 1..100)
        ) {
            let v = Vector::from_slice(&data);
            let once = v.relu().unwrap();
            let twice = once.relu().unwrap();
            prop_assert_eq!(once.as_slice(), twice.as_slice());
        }
    }

    // Property test: output length matches input length
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_length_preserved(
            data in prop::collection::vec(-100.0f32..100.0, 0..100)
        ) {
            let v = Vector::from_slice(&data);
            prop_assert_eq!(v.elish().unwrap().len(), data.len());
            prop_assert_eq!(v.masked_sqrt().unwrap().len(), data.len());
        }
    }
}
