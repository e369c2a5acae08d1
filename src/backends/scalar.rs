//! Scalar (non-SIMD) backend implementation
//!
//! The reference strategy: every element goes through the closed forms in
//! [`crate::scalar`] via [`elementwise_loop_scalar`]. Vector backends are
//! validated against this backend.
//!
//! # Performance
//!
//! Correctness reference only. `exp`, `tanh` and `erf` are libm calls per
//! element, so expect the vector backends to be several times faster.

use super::ActivationBackend;
use crate::driver::elementwise_loop_scalar;
use crate::scalar;

/// Scalar backend (reference, no SIMD)
pub struct ScalarBackend;

// SAFETY: These functions are safe because:
// 1. All slice accesses are bounds-checked by Rust iterator/indexing
// 2. No raw pointer arithmetic is performed
// 3. Marked unsafe only to match ActivationBackend trait interface
impl ActivationBackend for ScalarBackend {
    unsafe fn relu(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::relu, x, out);
    }

    unsafe fn leaky_relu(x: &[f32], slope: f32, out: &mut [f32]) {
        elementwise_loop_scalar(|v| scalar::leaky_relu(v, slope), x, out);
    }

    // The branch form is exact for every slope, so both strategies share it
    unsafe fn leaky_relu_max(x: &[f32], slope: f32, out: &mut [f32]) {
        elementwise_loop_scalar(|v| scalar::leaky_relu(v, slope), x, out);
    }

    unsafe fn swish(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::swish, x, out);
    }

    unsafe fn gelu(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::gelu, x, out);
    }

    unsafe fn gelu_tanh(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::gelu_tanh, x, out);
    }

    unsafe fn gelu_tanh_cook(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::gelu_tanh_cook, x, out);
    }

    unsafe fn gelu_logistic(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::gelu_logistic, x, out);
    }

    unsafe fn dish(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::dish, x, out);
    }

    unsafe fn elish(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::elish, x, out);
    }

    unsafe fn masked_sqrt(x: &[f32], out: &mut [f32]) {
        elementwise_loop_scalar(scalar::masked_sqrt, x, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_relu() {
        let x = [-2.0, -0.5, 0.0, 0.5, 2.0];
        let mut out = [0.0; 5];
        // SAFETY: Test code calling backend trait methods marked unsafe
        unsafe {
            ScalarBackend::relu(&x, &mut out);
        }
        assert_eq!(out, [0.0, 0.0, 0.0, 0.5, 2.0]);
    }

    #[test]
    fn test_scalar_leaky_relu() {
        let x = [-10.0, 0.0, 10.0];
        let mut out = [0.0; 3];
        // SAFETY: Test code calling backend trait methods marked unsafe
        unsafe {
            ScalarBackend::leaky_relu(&x, 0.5, &mut out);
        }
        assert_eq!(out, [-5.0, 0.0, 10.0]);
    }

    #[test]
    fn test_scalar_masked_sqrt() {
        let x = [9.0, -9.0, 0.0, 0.25];
        let mut out = [0.0; 4];
        // SAFETY: Test code calling backend trait methods marked unsafe
        unsafe {
            ScalarBackend::masked_sqrt(&x, &mut out);
        }
        assert_eq!(out, [3.0, -9.0, 0.0, 0.5]);
    }

    #[test]
    fn test_scalar_writes_only_input_length() {
        let x = [1.0, 2.0];
        let mut out = [7.0; 4];
        // SAFETY: Test code calling backend trait methods marked unsafe
        unsafe {
            ScalarBackend::swish(&x, &mut out);
        }
        assert_eq!(&out[2..], &[7.0, 7.0]);
        assert!((out[0] - crate::scalar::swish(1.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn test_scalar_empty_input() {
        let mut out: [f32; 0] = [];
        // SAFETY: Test code calling backend trait methods marked unsafe
        unsafe {
            ScalarBackend::gelu(&[], &mut out);
            ScalarBackend::dish(&[], &mut out);
        }
    }
}
