//! AVX2 backend implementation (x86_64 advanced SIMD)
//!
//! This backend uses AVX2 intrinsics for 256-bit SIMD operations with FMA.
//! AVX2 is available on Intel Haswell (2013+) and AMD Excavator (2015+) CPUs.
//!
//! # Performance
//!
//! Eight lanes per register; polynomial steps lower to `vfmadd` and the
//! exponent split uses the native `vroundps` floor.
//!
//! # Safety
//!
//! All AVX2 intrinsics are marked `unsafe` by Rust. This module carefully isolates
//! all unsafe code and verifies correctness through comprehensive testing.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::lanes::LaneGroup;

impl LaneGroup for __m256 {
    type Bits = __m256i;
    type Mask = __m256;

    const LANES: usize = 8;
    const HAS_RSQRT_ESTIMATE: bool = true;

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn load(src: *const f32) -> Self {
        _mm256_loadu_ps(src)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn store(self, dst: *mut f32) {
        _mm256_storeu_ps(dst, self);
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn splat(value: f32) -> Self {
        _mm256_set1_ps(value)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn add(self, rhs: Self) -> Self {
        _mm256_add_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn sub(self, rhs: Self) -> Self {
        _mm256_sub_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn mul(self, rhs: Self) -> Self {
        _mm256_mul_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn div(self, rhs: Self) -> Self {
        _mm256_div_ps(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        _mm256_fmadd_ps(self, a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn neg(self) -> Self {
        _mm256_xor_ps(self, _mm256_set1_ps(-0.0))
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn abs(self) -> Self {
        _mm256_andnot_ps(_mm256_set1_ps(-0.0), self)
    }

    // vmaxps returns its second operand when either is NaN
    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn max(self, rhs: Self) -> Self {
        _mm256_max_ps(rhs, self)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn min(self, rhs: Self) -> Self {
        _mm256_min_ps(rhs, self)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn sqrt(self) -> Self {
        _mm256_sqrt_ps(self)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn rsqrt_estimate(self) -> Self {
        _mm256_rsqrt_ps(self)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn floor_to_int(self) -> Self::Bits {
        _mm256_cvtps_epi32(_mm256_floor_ps(self))
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn int_to_float(bits: Self::Bits) -> Self {
        _mm256_cvtepi32_ps(bits)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn to_bits(self) -> Self::Bits {
        _mm256_castps_si256(self)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn from_bits(bits: Self::Bits) -> Self {
        _mm256_castsi256_ps(bits)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn splat_bits(value: i32) -> Self::Bits {
        _mm256_set1_epi32(value)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn add_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        _mm256_add_epi32(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn sub_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        _mm256_sub_epi32(a, b)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn shl_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        _mm256_slli_epi32::<N>(bits)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn shr_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        _mm256_srli_epi32::<N>(bits)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn gt(self, rhs: Self) -> Self::Mask {
        _mm256_cmp_ps::<_CMP_GT_OQ>(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn ge(self, rhs: Self) -> Self::Mask {
        _mm256_cmp_ps::<_CMP_GE_OQ>(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "avx2,fma")]
    unsafe fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self {
        _mm256_blendv_ps(if_false, if_true, mask)
    }
}

/// AVX2 backend (256-bit SIMD for x86_64)
pub struct Avx2Backend;

super::impl_vector_backend!(Avx2Backend, __m256, "avx2,fma");
