//! SSE2 backend implementation (x86_64 baseline SIMD)
//!
//! This backend uses SSE2 intrinsics for 128-bit SIMD operations.
//! SSE2 is available on all x86_64 CPUs.
//!
//! SSE2 has no fused multiply-add and no floor instruction (that arrived
//! with SSE4.1), so `mul_add` is a multiply followed by an add and
//! `floor_to_int` truncates then corrects lanes that rounded up.
//!
//! # Safety
//!
//! All SSE2 intrinsics are marked `unsafe` by Rust. This module carefully isolates
//! all unsafe code and verifies correctness through comprehensive testing.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::lanes::LaneGroup;

impl LaneGroup for __m128 {
    type Bits = __m128i;
    type Mask = __m128;

    const LANES: usize = 4;
    const HAS_RSQRT_ESTIMATE: bool = true;

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn load(src: *const f32) -> Self {
        _mm_loadu_ps(src)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn store(self, dst: *mut f32) {
        _mm_storeu_ps(dst, self);
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn splat(value: f32) -> Self {
        _mm_set1_ps(value)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn add(self, rhs: Self) -> Self {
        _mm_add_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn sub(self, rhs: Self) -> Self {
        _mm_sub_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn mul(self, rhs: Self) -> Self {
        _mm_mul_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn div(self, rhs: Self) -> Self {
        _mm_div_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        _mm_add_ps(_mm_mul_ps(self, a), b)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn neg(self) -> Self {
        _mm_xor_ps(self, _mm_set1_ps(-0.0))
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn abs(self) -> Self {
        _mm_andnot_ps(_mm_set1_ps(-0.0), self)
    }

    // maxps returns its second operand when either is NaN
    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn max(self, rhs: Self) -> Self {
        _mm_max_ps(rhs, self)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn min(self, rhs: Self) -> Self {
        _mm_min_ps(rhs, self)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn sqrt(self) -> Self {
        _mm_sqrt_ps(self)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn rsqrt_estimate(self) -> Self {
        _mm_rsqrt_ps(self)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn floor_to_int(self) -> Self::Bits {
        let truncated = _mm_cvttps_epi32(self);
        // Truncation rounds negative fractions up; the all-ones mask is -1
        let rounded_up = _mm_cmpgt_ps(_mm_cvtepi32_ps(truncated), self);
        _mm_add_epi32(truncated, _mm_castps_si128(rounded_up))
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn int_to_float(bits: Self::Bits) -> Self {
        _mm_cvtepi32_ps(bits)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn to_bits(self) -> Self::Bits {
        _mm_castps_si128(self)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn from_bits(bits: Self::Bits) -> Self {
        _mm_castsi128_ps(bits)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn splat_bits(value: i32) -> Self::Bits {
        _mm_set1_epi32(value)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn add_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        _mm_add_epi32(a, b)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn sub_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        _mm_sub_epi32(a, b)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn shl_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        _mm_slli_epi32::<N>(bits)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn shr_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        _mm_srli_epi32::<N>(bits)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn gt(self, rhs: Self) -> Self::Mask {
        _mm_cmpgt_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn ge(self, rhs: Self) -> Self::Mask {
        _mm_cmpge_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "sse2")]
    unsafe fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self {
        _mm_or_ps(_mm_and_ps(mask, if_true), _mm_andnot_ps(mask, if_false))
    }
}

/// SSE2 backend (128-bit SIMD for x86_64)
pub struct Sse2Backend;

super::impl_vector_backend!(Sse2Backend, __m128, "sse2");
