//! ARM NEON backend implementation (AArch64 128-bit SIMD)
//!
//! This backend uses ARM NEON intrinsics for 128-bit SIMD operations.
//! AArch64 NEON adds what the kernels need over ARMv7: vector divide,
//! `vcvtmq` (convert rounding toward minus infinity) and fused `vfmaq`.
//!
//! # Performance
//!
//! Four lanes per register, similar to SSE2 on x86_64 but with FMA.
//!
//! # Safety
//!
//! All NEON intrinsics are marked `unsafe` by Rust. This module carefully isolates
//! all unsafe code and verifies correctness through comprehensive testing.

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

use crate::lanes::LaneGroup;

impl LaneGroup for float32x4_t {
    type Bits = int32x4_t;
    type Mask = uint32x4_t;

    const LANES: usize = 4;
    const HAS_RSQRT_ESTIMATE: bool = true;

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn load(src: *const f32) -> Self {
        vld1q_f32(src)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn store(self, dst: *mut f32) {
        vst1q_f32(dst, self);
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn splat(value: f32) -> Self {
        vdupq_n_f32(value)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn add(self, rhs: Self) -> Self {
        vaddq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn sub(self, rhs: Self) -> Self {
        vsubq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn mul(self, rhs: Self) -> Self {
        vmulq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn div(self, rhs: Self) -> Self {
        vdivq_f32(self, rhs)
    }

    // vfmaq_f32(acc, a, b) = acc + a * b
    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        vfmaq_f32(b, self, a)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn neg(self) -> Self {
        vnegq_f32(self)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn abs(self) -> Self {
        vabsq_f32(self)
    }

    // fmax propagates NaN from either operand
    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn max(self, rhs: Self) -> Self {
        vmaxq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn min(self, rhs: Self) -> Self {
        vminq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn sqrt(self) -> Self {
        vsqrtq_f32(self)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn rsqrt_estimate(self) -> Self {
        vrsqrteq_f32(self)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn floor_to_int(self) -> Self::Bits {
        vcvtmq_s32_f32(self)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn int_to_float(bits: Self::Bits) -> Self {
        vcvtq_f32_s32(bits)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn to_bits(self) -> Self::Bits {
        vreinterpretq_s32_f32(self)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn from_bits(bits: Self::Bits) -> Self {
        vreinterpretq_f32_s32(bits)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn splat_bits(value: i32) -> Self::Bits {
        vdupq_n_s32(value)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn add_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        vaddq_s32(a, b)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn sub_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        vsubq_s32(a, b)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn shl_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        vshlq_n_s32::<N>(bits)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn shr_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        vreinterpretq_s32_u32(vshrq_n_u32::<N>(vreinterpretq_u32_s32(bits)))
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn gt(self, rhs: Self) -> Self::Mask {
        vcgtq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn ge(self, rhs: Self) -> Self::Mask {
        vcgeq_f32(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "neon")]
    unsafe fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self {
        vbslq_f32(mask, if_true, if_false)
    }
}

/// ARM NEON backend (128-bit SIMD)
pub struct NeonBackend;

super::impl_vector_backend!(NeonBackend, float32x4_t, "neon");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::assert_backend_matches_scalar;
    use crate::backends::ActivationBackend;

    fn has_neon() -> bool {
        if !std::arch::is_aarch64_feature_detected!("neon") {
            eprintln!("Skipping NEON test: CPU does not support NEON");
            return false;
        }
        true
    }

    #[test]
    fn test_neon_matches_scalar() {
        if !has_neon() {
            return;
        }
        assert_backend_matches_scalar::<NeonBackend>();
    }

    #[test]
    fn test_neon_floor_rounds_toward_negative_infinity() {
        if !has_neon() {
            return;
        }
        let x = [-1.5f32, -0.5, 0.5, 1.5];
        let mut floored = [0i32; 4];
        unsafe {
            let v = float32x4_t::load(x.as_ptr());
            vst1q_s32(floored.as_mut_ptr(), v.floor_to_int());
        }
        assert_eq!(floored, [-2, -1, 0, 1]);
    }

    #[test]
    fn test_neon_swish_tail() {
        if !has_neon() {
            return;
        }
        let x = [-4.0f32, -1.0, 0.0, 1.0, 4.0, 7.0, -7.0];
        let mut out = [0.0; 7];
        unsafe { NeonBackend::swish(&x, &mut out) };
        for (&xi, &yi) in x.iter().zip(&out) {
            let expected = crate::scalar::swish(xi);
            assert!((yi - expected).abs() <= 0.01 * expected.abs() + 1e-6);
        }
    }
}
