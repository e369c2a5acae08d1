//! Scalar reference activations
//!
//! Closed-form `f32 -> f32` implementations built on the standard
//! transcendental functions. These are the ground truth every vectorized
//! kernel is validated against.
//!
//! Extreme inputs saturate instead of failing: `exp(-x)` overflowing to
//! infinity drives [`logistic_cdf`] to zero, and NaN propagates.

use std::f32::consts::FRAC_1_SQRT_2;

/// `sqrt(2 / pi)`
pub const SQRT_2_INV_PI: f32 = 0.797_884_6;

/// Cubic coefficient of the tanh GELU approximation
pub const GELU_TANH_COEFF: f32 = 0.044_715;

/// Slope inside the Cook tanh GELU approximation
pub const GELU_COOK_SCALE: f32 = 0.8;

/// Input scale of the logistic GELU approximation (Hendrycks & Gimpel, 2016)
pub const GELU_LOGISTIC_SCALE: f32 = 1.702;

/// Negative-domain slope used when a leaky ReLU is requested without one
pub const DEFAULT_LEAKY_SLOPE: f32 = 0.01;

/// Standard normal CDF: `0.5 * (1 + erf(x / sqrt(2)))`
#[inline]
pub fn normal_cdf(x: f32) -> f32 {
    0.5 * (1.0 + libm::erff(x * FRAC_1_SQRT_2))
}

/// Exact GELU: `x * Φ(x)`
#[inline]
pub fn gelu(x: f32) -> f32 {
    x * normal_cdf(x)
}

/// Logistic CDF (sigmoid): `1 / (1 + e^-x)`
#[inline]
pub fn logistic_cdf(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Swish / SiLU: `x * σ(x)`
#[inline]
pub fn swish(x: f32) -> f32 {
    x * logistic_cdf(x)
}

/// Dish: `0.5 * x * (1 + x / sqrt(1 + x²))`
///
/// A smooth gate built from a square root instead of an exponential.
/// See <https://danieldk.eu/Dish-Activation>.
///
/// `s = sqrt(1 + x²)` comes from [`f32::hypot`] so it never overflows.
/// Negative inputs use the equivalent `0.5(x/s) / (s - x)`, which keeps
/// relative precision where `1 + x/s` would cancel to zero.
#[inline]
pub fn dish(x: f32) -> f32 {
    let s = x.hypot(1.0);
    if x >= 0.0 {
        0.5 * x * (1.0 + x / s)
    } else {
        0.5 * (x / s) / (s - x)
    }
}

/// Tanh GELU approximation: `0.5x(1 + tanh(sqrt(2/π)(x + 0.044715x³)))`
#[inline]
pub fn gelu_tanh(x: f32) -> f32 {
    0.5 * x * (1.0 + (SQRT_2_INV_PI * (x + GELU_TANH_COEFF * x * x * x)).tanh())
}

/// Cook's cheaper tanh GELU approximation: `0.5x(1 + tanh(0.8x))`
#[inline]
pub fn gelu_tanh_cook(x: f32) -> f32 {
    0.5 * x * (1.0 + (GELU_COOK_SCALE * x).tanh())
}

/// Logistic GELU approximation: `x * σ(1.702x)`
#[inline]
pub fn gelu_logistic(x: f32) -> f32 {
    x * logistic_cdf(GELU_LOGISTIC_SCALE * x)
}

/// ReLU: `max(0, x)`. NaN passes through.
#[inline]
pub fn relu(x: f32) -> f32 {
    if x < 0.0 {
        0.0
    } else {
        x
    }
}

/// Leaky ReLU: `x` for `x > 0`, `slope * x` otherwise
#[inline]
pub fn leaky_relu(x: f32, slope: f32) -> f32 {
    if x > 0.0 {
        x
    } else {
        slope * x
    }
}

/// ELiSH: swish for `x >= 0`, `(e^x - 1) * σ(x)` for `x < 0`
#[inline]
pub fn elish(x: f32) -> f32 {
    if x >= 0.0 {
        x * logistic_cdf(x)
    } else {
        (x.exp() - 1.0) * logistic_cdf(x)
    }
}

/// Masked square root: `sqrt(x)` where `x > 0`, `x` unchanged elsewhere.
///
/// Not a total function on purpose. Only this operation passes non-positive
/// inputs through; the other activations define their own negative domain.
#[inline]
pub fn masked_sqrt(x: f32) -> f32 {
    if x > 0.0 {
        x.sqrt()
    } else {
        x
    }
}
