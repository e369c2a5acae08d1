//! Vectorized activation kernels
//!
//! Each kernel transforms one [`LaneGroup`] and is composed from two
//! numeric primitives plus native multiply-add, compare and select:
//!
//! - [`exp`]: exponent-field bit trick with a degree-2 polynomial for the
//!   fractional power of two. No transcendental vector instruction needed.
//! - [`rsqrt`]: hardware reciprocal square root estimate refined by one
//!   Newton-Raphson step, or the `0x5f3759df` magic-constant seed refined by
//!   two steps on lane groups that lack the estimate instruction.
//!
//! Kernels are stateless. Lanes beyond the chunk's vector length are zero
//! padding supplied by the driver, so no kernel can touch caller memory
//! outside its live lanes.
//!
//! # Safety
//!
//! Every kernel is `unsafe` for the same reason the [`LaneGroup`] primitives
//! are: the instruction set behind `V` must be available.

use std::f32::consts::FRAC_1_SQRT_2;

use crate::lanes::LaneGroup;
use crate::scalar::{GELU_COOK_SCALE, GELU_LOGISTIC_SCALE, GELU_TANH_COEFF, SQRT_2_INV_PI};

/// `log2(e)`
#[allow(clippy::excessive_precision)]
pub const LOG2_E: f32 = 1.442_695_041;

/// Quadratic coefficient of the `2^f` polynomial on `[0, 1)`
#[allow(clippy::excessive_precision)]
pub const EXP_POLY_C2: f32 = 0.337_189_434_6;
/// Linear coefficient of the `2^f` polynomial
#[allow(clippy::excessive_precision)]
pub const EXP_POLY_C1: f32 = 0.657_636_276;
/// Constant term of the `2^f` polynomial
#[allow(clippy::excessive_precision)]
pub const EXP_POLY_C0: f32 = 1.001_724_76;

/// Lowest `exp` input whose result keeps a normal exponent field
pub const EXP_INPUT_MIN: f32 = -87.0;
/// Smallest `f32` whose exponential overflows to infinity
#[allow(clippy::excessive_precision)]
pub const EXP_OVERFLOW_INPUT: f32 = 88.722_839;
/// Largest `f32` below 128, the cap on `x * log2(e)`
#[allow(clippy::excessive_precision)]
const EXP_LOG2_MAX: f32 = 127.999_992;

/// Magnitude past which `tanh` and `σ` round to their limits in `f32`
pub const SATURATION_INPUT: f32 = 20.0;

/// Magnitude past which `1 + x²` rounds to `x²` (`2^32`)
pub const DISH_LARGE_INPUT: f32 = 4_294_967_296.0;

/// Explicit mantissa bits of an IEEE-754 single (implicit bit removed)
pub const FLOAT_MANTISSA_BITS: i32 = (f32::MANTISSA_DIGITS - 1) as i32;

/// Fast inverse square root magic constant
pub const RSQRT_MAGIC: i32 = 0x5f37_59df;

// Abramowitz & Stegun 7.1.26
#[allow(clippy::excessive_precision)]
const ERFC_P: f32 = 0.327_591_1;
#[allow(clippy::excessive_precision)]
const ERFC_A1: f32 = 0.254_829_592;
#[allow(clippy::excessive_precision)]
const ERFC_A2: f32 = -0.284_496_736;
#[allow(clippy::excessive_precision)]
const ERFC_A3: f32 = 1.421_413_741;
#[allow(clippy::excessive_precision)]
const ERFC_A4: f32 = -1.453_152_027;
#[allow(clippy::excessive_precision)]
const ERFC_A5: f32 = 1.061_405_429;

/// Approximate `e^x`
///
/// `t = x * log2(e)` is split into `floor(t)` and a fraction `f` in `[0, 1)`.
/// `2^f` comes from `(C2 f + C1) f + C0`, which lies in `[1, 2)` and therefore
/// has a biased exponent of exactly 127. Adding `floor(t) << 23` to its bit
/// pattern scales it by `2^floor(t)`.
///
/// Inputs below `EXP_INPUT_MIN` are clamped so the exponent field stays
/// normal. From `EXP_OVERFLOW_INPUT` up the result is `+inf`, as with
/// [`f32::exp`], and `t` is capped below 128 so the field never reaches the
/// infinity pattern on its own. NaN lanes stay NaN. Relative error is
/// bounded by the polynomial, about 0.18%.
#[inline(always)]
pub unsafe fn exp<V: LaneGroup>(x: V) -> V {
    let overflow = x.ge(V::splat(EXP_OVERFLOW_INPUT));
    let x = x.max(V::splat(EXP_INPUT_MIN));
    let t = x.mul(V::splat(LOG2_E)).min(V::splat(EXP_LOG2_MAX));

    let i = t.floor_to_int();
    let f = t.sub(V::int_to_float(i));

    let p = f.mul_add(V::splat(EXP_POLY_C2), V::splat(EXP_POLY_C1));
    let p = p.mul_add(f, V::splat(EXP_POLY_C0));

    let j = V::shl_bits::<FLOAT_MANTISSA_BITS>(i);
    let y = V::from_bits(V::add_bits(j, p.to_bits()));
    V::select(overflow, V::splat(f32::INFINITY), y)
}

/// One Newton-Raphson step for `1/sqrt(a)`: `y' = y(1.5 - 0.5 a y²)`
#[inline(always)]
pub unsafe fn rsqrt_newton_raphson<V: LaneGroup>(y: V, a: V) -> V {
    let tmp = a.mul(y.mul(y)).mul(V::splat(0.5));
    y.mul(V::splat(1.5).sub(tmp))
}

/// Magic-constant seed for `1/sqrt(a)`: `0x5f3759df - (bits(a) >> 1)`
///
/// Relative error of the seed alone is up to about 3.4%.
#[inline(always)]
pub unsafe fn rsqrt_magic_seed<V: LaneGroup>(a: V) -> V {
    let half_bits = V::shr_bits::<1>(a.to_bits());
    V::from_bits(V::sub_bits(V::splat_bits(RSQRT_MAGIC), half_bits))
}

/// Inverse square root without a hardware estimate
///
/// Two refinement steps are required. After one step the error is about
/// 1.5e-3, which the direct form `1 + x/sqrt(1 + x²)` amplifies past
/// tolerance near `x = -10`, where it cancels to 0.005.
#[inline(always)]
pub unsafe fn fast_rsqrt<V: LaneGroup>(a: V) -> V {
    let y = rsqrt_magic_seed(a);
    let y = rsqrt_newton_raphson(y, a);
    rsqrt_newton_raphson(y, a)
}

/// Inverse square root, picking the path the lane group supports
#[inline(always)]
pub unsafe fn rsqrt<V: LaneGroup>(a: V) -> V {
    if V::HAS_RSQRT_ESTIMATE {
        rsqrt_newton_raphson(a.rsqrt_estimate(), a)
    } else {
        fast_rsqrt(a)
    }
}

/// Logistic CDF: `1 / (1 + e^-x)`
#[inline(always)]
pub unsafe fn logistic_cdf<V: LaneGroup>(x: V) -> V {
    let one = V::splat(1.0);
    one.div(exp(x.neg()).add(one))
}

/// `tanh(x) = (e^x - e^-x) / (e^x + e^-x)`
///
/// The input is clamped to `±SATURATION_INPUT`, where the quotient is
/// already exactly `±1`, so neither exponential reaches infinity.
#[inline(always)]
pub unsafe fn tanh<V: LaneGroup>(x: V) -> V {
    let x = x
        .max(V::splat(-SATURATION_INPUT))
        .min(V::splat(SATURATION_INPUT));
    let a = exp(x);
    let b = exp(x.neg());
    a.sub(b).div(a.add(b))
}

/// Swish: `x * σ(x)`
#[inline(always)]
pub unsafe fn swish<V: LaneGroup>(x: V) -> V {
    x.mul(logistic_cdf(x))
}

/// Exact GELU: `x * Φ(x)`
///
/// `Φ(-|x|) = erfc(|x|/√2) / 2` is evaluated directly so the negative tail
/// keeps relative precision instead of cancelling against 1.
#[inline(always)]
pub unsafe fn gelu<V: LaneGroup>(x: V) -> V {
    let one = V::splat(1.0);
    let half = V::splat(0.5);

    let z = x.abs().mul(V::splat(FRAC_1_SQRT_2));
    let t = one.div(z.mul_add(V::splat(ERFC_P), one));

    let poly = t.mul_add(V::splat(ERFC_A5), V::splat(ERFC_A4));
    let poly = poly.mul_add(t, V::splat(ERFC_A3));
    let poly = poly.mul_add(t, V::splat(ERFC_A2));
    let poly = poly.mul_add(t, V::splat(ERFC_A1));
    let erfc = poly.mul(t).mul(exp(z.mul(z).neg()));

    let lower = half.mul(erfc);
    let upper = one.sub(lower);
    let cdf = V::select(x.ge(V::splat(0.0)), upper, lower);
    x.mul(cdf)
}

/// Tanh GELU: `0.5x(1 + tanh(sqrt(2/π)(x + 0.044715x³)))`
#[inline(always)]
pub unsafe fn gelu_tanh<V: LaneGroup>(x: V) -> V {
    let x3 = x.mul(x).mul(x);
    let inner = x3
        .mul_add(V::splat(GELU_TANH_COEFF), x)
        .mul(V::splat(SQRT_2_INV_PI));
    let r = tanh(inner).add(V::splat(1.0));
    r.mul(x).mul(V::splat(0.5))
}

/// Cook GELU: `0.5x(1 + tanh(0.8x))`
#[inline(always)]
pub unsafe fn gelu_tanh_cook<V: LaneGroup>(x: V) -> V {
    let r = x.mul(V::splat(GELU_COOK_SCALE));
    let r = tanh(r).add(V::splat(1.0));
    r.mul(x).mul(V::splat(0.5))
}

/// Logistic GELU: `x * σ(1.702x)`
#[inline(always)]
pub unsafe fn gelu_logistic<V: LaneGroup>(x: V) -> V {
    let scaled = x.mul(V::splat(GELU_LOGISTIC_SCALE));
    x.mul(logistic_cdf(scaled))
}

/// Dish: `0.5x(1 + x/s)` with `s = sqrt(1 + x²)`
///
/// Negative lanes use `0.5(x/s) / (s - x)`, the same value without the
/// cancellation of `1 + x/s`. Lanes past `DISH_LARGE_INPUT` take `s = |x|`
/// so `1 + x²` never overflows.
#[inline(always)]
pub unsafe fn dish<V: LaneGroup>(x: V) -> V {
    let one = V::splat(1.0);
    let half = V::splat(0.5);
    let magnitude = x.abs();

    let q = x.mul_add(x, one);
    let r = rsqrt(q);
    let large = magnitude.ge(V::splat(DISH_LARGE_INPUT));
    let s = V::select(large, magnitude, q.mul(r));
    let ratio = V::select(large, x.div(magnitude), x.mul(r));

    let positive = x.mul(half).mul(ratio.add(one));
    let negative = ratio.mul(half).div(s.add(magnitude));
    V::select(x.ge(V::splat(0.0)), positive, negative)
}

/// ReLU: `max(x, 0)`
#[inline(always)]
pub unsafe fn relu<V: LaneGroup>(x: V) -> V {
    x.max(V::splat(0.0))
}

/// Leaky ReLU as `max(x, slope * x)`
///
/// Matches the branch form only for `0 <= slope <= 1`. With a slope above
/// one the max picks `slope * x` for positive inputs, and with a negative
/// slope it picks `slope * x` for negative ones.
#[inline(always)]
pub unsafe fn leaky_relu_max<V: LaneGroup>(x: V, slope: V) -> V {
    x.max(x.mul(slope))
}

/// Leaky ReLU as compare `x > 0` + merge; valid for any slope
#[inline(always)]
pub unsafe fn leaky_relu_masked<V: LaneGroup>(x: V, slope: V) -> V {
    V::select(x.gt(V::splat(0.0)), x, x.mul(slope))
}

/// ELiSH: `x * σ(x)` for `x >= 0`, `(e^x - 1) * σ(x)` for `x < 0`
///
/// Shares a single exponential: `σ(x) = e^x / (1 + e^x)`. The exponent is
/// capped at `SATURATION_INPUT`, past which `σ` is already 1.
#[inline(always)]
pub unsafe fn elish<V: LaneGroup>(x: V) -> V {
    let one = V::splat(1.0);
    let e = exp(x.min(V::splat(SATURATION_INPUT)));
    let sigma = e.div(e.add(one));
    let positive = x.mul(sigma);
    let negative = e.sub(one).mul(sigma);
    V::select(x.ge(V::splat(0.0)), positive, negative)
}

/// Masked square root: `sqrt(x)` where `x > 0`, `x` elsewhere
#[inline(always)]
pub unsafe fn masked_sqrt<V: LaneGroup>(x: V) -> V {
    V::select(x.gt(V::splat(0.0)), x.sqrt(), x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::portable::F32x8;

    fn lanes(values: [f32; 8]) -> F32x8 {
        F32x8(values)
    }

    fn max_relative_error(f: impl Fn(F32x8) -> F32x8, reference: impl Fn(f64) -> f64) -> f64 {
        let mut worst = 0.0f64;
        for chunk in 0..200 {
            let mut values = [0.0f32; 8];
            for (k, v) in values.iter_mut().enumerate() {
                *v = 1.0 + (chunk * 8 + k) as f32 * 0.0625;
            }
            let out = f(lanes(values));
            for (x, y) in values.iter().zip(out.0.iter()) {
                let expected = reference(*x as f64);
                worst = worst.max(((*y as f64) - expected).abs() / expected.abs());
            }
        }
        worst
    }

    #[test]
    fn test_exp_relative_error_bound() {
        for chunk in 0..80 {
            let mut values = [0.0f32; 8];
            for (k, v) in values.iter_mut().enumerate() {
                *v = -80.0 + (chunk * 8 + k) as f32 * 0.25;
            }
            let out = unsafe { exp(lanes(values)) };
            for (x, y) in values.iter().zip(out.0.iter()) {
                let expected = (*x as f64).exp();
                let rel = ((*y as f64) - expected).abs() / expected;
                assert!(rel < 3e-3, "exp({x}) = {y}, expected {expected}, rel {rel}");
            }
        }
    }

    #[test]
    fn test_exp_saturates_like_std() {
        let out = unsafe {
            exp(lanes([
                -1000.0,
                -87.0,
                1000.0,
                EXP_OVERFLOW_INPUT,
                f32::NEG_INFINITY,
                f32::INFINITY,
                88.5,
                88.722_83,
            ]))
        };
        // Low side clamps to a normal value
        assert!(out.0[0] > 0.0 && out.0[0].is_normal());
        assert_eq!(out.0[0], out.0[1]);
        assert_eq!(out.0[4], out.0[1]);
        // High side overflows exactly where f32::exp does
        assert_eq!(out.0[2], f32::INFINITY);
        assert_eq!(out.0[3], f32::INFINITY);
        assert_eq!(out.0[5], f32::INFINITY);
        assert_eq!(EXP_OVERFLOW_INPUT.exp(), f32::INFINITY);
        for k in [6, 7] {
            let x = [88.5f32, 88.722_83][k - 6];
            let expected = x.exp();
            assert!(expected.is_finite());
            assert!(((out.0[k] - expected) / expected).abs() < 3e-3, "exp({x}) = {}", out.0[k]);
        }
    }

    #[test]
    fn test_logistic_cdf_reaches_zero_on_overflow() {
        let x = lanes([-88.5, -88.722_83, -89.0, -100.0, -1e30, 0.0, 100.0, 1e30]);
        let out = unsafe { logistic_cdf(x) };
        for (xi, yi) in x.0.iter().zip(out.0.iter()) {
            let expected = crate::scalar::logistic_cdf(*xi);
            if expected == 0.0 {
                assert_eq!(*yi, 0.0, "σ({xi})");
            } else {
                assert!(((yi - expected) / expected).abs() < 3e-3, "σ({xi}) = {yi}");
            }
        }
    }

    #[test]
    fn test_exp_propagates_nan() {
        let out = unsafe { exp(F32x8::splat(f32::NAN)) };
        assert!(out.0.iter().all(|y| y.is_nan()));
    }

    #[test]
    fn test_rsqrt_magic_seed_is_rough() {
        let err = max_relative_error(|a| unsafe { rsqrt_magic_seed(a) }, |a| 1.0 / a.sqrt());
        assert!(err < 3.5e-2, "seed error {err}");
    }

    #[test]
    fn test_single_newton_step_is_insufficient() {
        let one_step = max_relative_error(
            |a| unsafe { rsqrt_newton_raphson(rsqrt_magic_seed(a), a) },
            |a| 1.0 / a.sqrt(),
        );
        let two_steps = max_relative_error(|a| unsafe { fast_rsqrt(a) }, |a| 1.0 / a.sqrt());
        assert!(one_step > 1e-4, "one step unexpectedly accurate: {one_step}");
        assert!(two_steps < 2e-5, "two steps too coarse: {two_steps}");
    }

    #[test]
    fn test_single_newton_step_breaks_dish_at_minus_ten() {
        // Dish with a one-step rsqrt, to document why fast_rsqrt uses two
        let x = -10.0f32;
        let s = unsafe { F32x8::splat(1.0 + x * x) };
        let one_step = unsafe { rsqrt_newton_raphson(rsqrt_magic_seed(s), s) }.0[0];
        let two_steps = unsafe { fast_rsqrt(s) }.0[0];
        let dish_with = |r: f32| 0.5 * x * (1.0 + x * r);
        let reference = crate::scalar::dish(x);
        let rel = |v: f32| ((v - reference) / reference).abs();
        assert!(rel(dish_with(one_step)) > 0.01);
        assert!(rel(dish_with(two_steps)) < 0.01);
    }

    #[test]
    fn test_tanh_tracks_std() {
        let mut values = [0.0f32; 8];
        for step in 0..40 {
            for (k, v) in values.iter_mut().enumerate() {
                *v = -10.0 + (step * 8 + k) as f32 * 0.0625;
            }
            let out = unsafe { tanh(lanes(values)) };
            for (x, y) in values.iter().zip(out.0.iter()) {
                assert!((y - x.tanh()).abs() < 5e-3, "tanh({x}) = {y}");
            }
        }
    }

    #[test]
    fn test_tanh_and_elish_saturate_without_nan() {
        let x = lanes([100.0, -100.0, 1e30, -1e30, 88.9, -88.9, 20.0, -20.0]);
        let t = unsafe { tanh(x) };
        assert_eq!(t.0, [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);

        let e = unsafe { elish(x) };
        assert_eq!(e.0[0], 100.0);
        assert_eq!(e.0[2], 1e30);
        assert_eq!(e.0[4], 88.9);
        for y in e.0 {
            assert!(!y.is_nan());
        }
    }

    #[test]
    fn test_dish_tracks_scalar_across_range() {
        let values = [-3e38, -1e30, -2e19, -1e4, -300.0, 300.0, 2e19, 1e30];
        let out = unsafe { dish(lanes(values)) };
        for (x, y) in values.iter().zip(out.0.iter()) {
            let expected = crate::scalar::dish(*x);
            if expected == 0.0 {
                assert_eq!(*y, 0.0, "dish({x})");
            } else {
                assert!(((y - expected) / expected).abs() < 1e-4, "dish({x}) = {y}, expected {expected}");
            }
        }
    }

    #[test]
    fn test_masked_sqrt_select() {
        let out = unsafe {
            masked_sqrt(lanes([4.0, -4.0, 0.0, 9.0, -0.5, 1.0, 16.0, -16.0]))
        };
        assert_eq!(out.0, [2.0, -4.0, 0.0, 3.0, -0.5, 1.0, 4.0, -16.0]);
    }

    #[test]
    fn test_leaky_relu_strategies_agree_for_unit_interval_slope() {
        let x = lanes([-3.0, -1.0, -0.25, 0.0, 0.25, 1.0, 3.0, -7.5]);
        let slope = unsafe { F32x8::splat(0.1) };
        let (max_based, masked) =
            unsafe { (leaky_relu_max(x, slope), leaky_relu_masked(x, slope)) };
        assert_eq!(max_based.0, masked.0);
    }

    #[test]
    fn test_leaky_relu_max_diverges_outside_unit_interval() {
        let x = lanes([-2.0, 2.0, -1.0, 1.0, 0.0, 3.0, -3.0, 0.5]);
        let slope = unsafe { F32x8::splat(1.5) };
        let (max_based, masked) =
            unsafe { (leaky_relu_max(x, slope), leaky_relu_masked(x, slope)) };
        // For positive lanes max(x, 1.5x) picks 1.5x, the branch keeps x
        assert_eq!(max_based.0[1], 3.0);
        assert_eq!(masked.0[1], 2.0);
    }

    #[test]
    fn test_relu_keeps_nan() {
        let out = unsafe { relu(lanes([f32::NAN, -1.0, 1.0, 0.0, -0.0, 2.0, -2.0, 5.0])) };
        assert!(out.0[0].is_nan());
        assert_eq!(&out.0[1..4], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_gelu_symmetry() {
        // gelu(x) - gelu(-x) = x
        let x = lanes([0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 6.0]);
        let (pos, neg) = unsafe { (gelu(x), gelu(x.neg())) };
        for k in 0..8 {
            assert!((pos.0[k] - neg.0[k] - x.0[k]).abs() < 1e-2);
        }
    }
}
