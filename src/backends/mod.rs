//! Backend implementations for different SIMD instruction sets
//!
//! Every backend implements the same slice-level [`ActivationBackend`]
//! interface. Vector backends differ only in the [`LaneGroup`] they feed
//! through [`crate::driver::elementwise_loop_vector`]; the kernels in
//! [`crate::kernels`] are shared.
//!
//! # Safety
//!
//! All `unsafe` code is isolated within backend implementations. The public API
//! remains 100% safe.
//!
//! # Backends
//!
//! - `scalar`: Reference implementation (no SIMD)
//! - `portable`: 8-lane arrays, every target
//! - `sse2`: x86_64 baseline SIMD (128-bit)
//! - `avx2`: x86_64 advanced SIMD (256-bit with FMA)
//! - `neon`: ARM SIMD (128-bit)
//! - `wasm`: WebAssembly SIMD128
//!
//! [`LaneGroup`]: crate::lanes::LaneGroup

/// Implement [`ActivationBackend`] for a vector backend by running every
/// kernel over the given lane group, optionally under `#[target_feature]`.
macro_rules! impl_vector_backend {
    ($backend:ty, $lanes:ty $(, $feature:literal)?) => {
        impl $crate::backends::ActivationBackend for $backend {
            $(#[target_feature(enable = $feature)])?
            unsafe fn relu(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::relu(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn leaky_relu(x: &[f32], slope: f32, out: &mut [f32]) {
                let slope = <$lanes as $crate::lanes::LaneGroup>::splat(slope);
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::leaky_relu_masked(v, slope) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn leaky_relu_max(x: &[f32], slope: f32, out: &mut [f32]) {
                let slope = <$lanes as $crate::lanes::LaneGroup>::splat(slope);
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::leaky_relu_max(v, slope) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn swish(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::swish(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn gelu(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::gelu(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn gelu_tanh(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::gelu_tanh(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn gelu_tanh_cook(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::gelu_tanh_cook(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn gelu_logistic(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::gelu_logistic(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn dish(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::dish(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn elish(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::elish(v) },
                    x,
                    out,
                );
            }

            $(#[target_feature(enable = $feature)])?
            unsafe fn masked_sqrt(x: &[f32], out: &mut [f32]) {
                $crate::driver::elementwise_loop_vector(
                    |v: $lanes| unsafe { $crate::kernels::masked_sqrt(v) },
                    x,
                    out,
                );
            }
        }
    };
}

pub(crate) use impl_vector_backend;

pub mod portable;
pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

#[cfg(target_arch = "aarch64")]
pub mod neon;

#[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
pub mod wasm;

/// Backend trait defining the activation operations
///
/// All backend implementations must implement this trait to ensure
/// consistent behavior across different SIMD instruction sets. Each method
/// writes `out[i] = f(x[i])` for `i in 0..x.len()` and leaves the rest of
/// `out` untouched.
///
/// # Safety
///
/// Implementations may use unsafe SIMD intrinsics. Callers must ensure:
/// - The backend's instruction set is available on the running CPU
/// - `out` has length >= `x.len()`
pub trait ActivationBackend {
    /// ReLU: `max(x, 0)`
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn relu(x: &[f32], out: &mut [f32]);

    /// Leaky ReLU, compare + merge strategy; any slope
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn leaky_relu(x: &[f32], slope: f32, out: &mut [f32]);

    /// Leaky ReLU, `max(x, slope * x)` strategy
    ///
    /// Only agrees with [`ActivationBackend::leaky_relu`] for
    /// `0 <= slope <= 1`; callers are responsible for the range.
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn leaky_relu_max(x: &[f32], slope: f32, out: &mut [f32]);

    /// Swish / SiLU: `x * σ(x)`
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn swish(x: &[f32], out: &mut [f32]);

    /// Exact GELU: `x * Φ(x)`
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn gelu(x: &[f32], out: &mut [f32]);

    /// Tanh GELU approximation
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn gelu_tanh(x: &[f32], out: &mut [f32]);

    /// Cook tanh GELU approximation: `0.5x(1 + tanh(0.8x))`
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn gelu_tanh_cook(x: &[f32], out: &mut [f32]);

    /// Logistic GELU approximation: `x * σ(1.702x)`
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn gelu_logistic(x: &[f32], out: &mut [f32]);

    /// Dish: `0.5x(1 + x / sqrt(1 + x²))`
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn dish(x: &[f32], out: &mut [f32]);

    /// ELiSH
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn elish(x: &[f32], out: &mut [f32]);

    /// Masked square root: `sqrt(x)` where `x > 0`, `x` elsewhere
    ///
    /// # Safety
    ///
    /// See the trait-level contract.
    unsafe fn masked_sqrt(x: &[f32], out: &mut [f32]);
}
