//! Agreement checks between vector backends and the scalar reference
//!
//! The comparison follows the usual approximate-equality convention: a value
//! matches when it is within an absolute `margin` of the expected value or
//! within `epsilon` times the expected magnitude.

use crate::activation::{apply, Activation};
use crate::{Backend, ChispaError, Result};

/// Numeric agreement bound
///
/// # Examples
///
/// ```
/// use chispa::Tolerance;
///
/// let tol = Tolerance::relative(0.01);
/// assert!(tol.approx_eq(100.5, 100.0));
/// assert!(!tol.approx_eq(102.0, 100.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Relative bound, scaled by `|expected|`
    pub epsilon: f32,
    /// Absolute bound
    pub margin: f32,
}

impl Tolerance {
    /// Relative tolerance only
    pub const fn relative(epsilon: f32) -> Self {
        Self {
            epsilon,
            margin: 0.0,
        }
    }

    /// Absolute tolerance only
    pub const fn absolute(margin: f32) -> Self {
        Self {
            epsilon: 0.0,
            margin,
        }
    }

    /// Bit-for-bit agreement (up to `0.0 == -0.0`)
    pub const fn exact() -> Self {
        Self {
            epsilon: 0.0,
            margin: 0.0,
        }
    }

    /// Whether `actual` agrees with `expected`
    ///
    /// NaN agrees only with NaN. Infinities agree only with themselves.
    pub fn approx_eq(&self, actual: f32, expected: f32) -> bool {
        if actual == expected || (actual.is_nan() && expected.is_nan()) {
            return true;
        }
        let diff = (actual - expected).abs();
        diff <= self.margin || diff <= self.epsilon * expected.abs()
    }
}

/// First element where `actual` leaves `tolerance` around `expected`
pub fn find_divergence(
    x: &[f32],
    expected: &[f32],
    actual: &[f32],
    tolerance: Tolerance,
) -> Option<ChispaError> {
    x.iter()
        .zip(expected.iter().zip(actual))
        .position(|(_, (&e, &a))| !tolerance.approx_eq(a, e))
        .map(|index| ChispaError::Divergence {
            index,
            input: x[index],
            expected: expected[index],
            actual: actual[index],
        })
}

/// Run `activation` on `backend` and on the scalar reference and compare
/// with the activation's default tolerance
///
/// # Examples
///
/// ```
/// use chispa::{verify_against_scalar, Activation, Backend};
///
/// let x: Vec<f32> = (-40..=40).map(|i| i as f32 * 0.25).collect();
/// verify_against_scalar(Activation::Dish, Backend::Auto, &x).unwrap();
/// ```
///
/// # Errors
///
/// Returns [`ChispaError::Divergence`] for the first disagreeing element, or
/// any error [`apply`] reports for `backend`.
pub fn verify_against_scalar(activation: Activation, backend: Backend, x: &[f32]) -> Result<()> {
    verify_with_tolerance(activation, backend, x, activation.tolerance())
}

/// [`verify_against_scalar`] with an explicit tolerance
///
/// # Errors
///
/// Same as [`verify_against_scalar`].
pub fn verify_with_tolerance(
    activation: Activation,
    backend: Backend,
    x: &[f32],
    tolerance: Tolerance,
) -> Result<()> {
    let mut expected = vec![0.0; x.len()];
    apply(Backend::Scalar, activation, x, &mut expected)?;

    let mut actual = vec![0.0; x.len()];
    apply(backend, activation, x, &mut actual)?;

    match find_divergence(x, &expected, &actual, tolerance) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
