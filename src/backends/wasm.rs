//! WebAssembly SIMD128 backend implementation
//!
//! This backend uses WebAssembly SIMD128 intrinsics for 128-bit SIMD operations.
//! SIMD128 is supported in modern browsers and wasm runtimes.
//!
//! SIMD128 has neither FMA nor a reciprocal square root estimate, so
//! `mul_add` is unfused and [`crate::kernels::rsqrt`] takes the
//! magic-constant path with two Newton-Raphson steps. Float and integer
//! lanes share the `v128` type, which makes bit reinterpretation free.
//!
//! # Safety
//!
//! All WASM SIMD intrinsics are marked `unsafe` by Rust. This module carefully isolates
//! all unsafe code and verifies correctness through comprehensive testing.

#[cfg(target_arch = "wasm32")]
use std::arch::wasm32::*;

use crate::lanes::LaneGroup;

impl LaneGroup for v128 {
    type Bits = v128;
    type Mask = v128;

    const LANES: usize = 4;
    const HAS_RSQRT_ESTIMATE: bool = false;

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn load(src: *const f32) -> Self {
        v128_load(src as *const v128)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn store(self, dst: *mut f32) {
        v128_store(dst as *mut v128, self);
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn splat(value: f32) -> Self {
        f32x4_splat(value)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn add(self, rhs: Self) -> Self {
        f32x4_add(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn sub(self, rhs: Self) -> Self {
        f32x4_sub(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn mul(self, rhs: Self) -> Self {
        f32x4_mul(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn div(self, rhs: Self) -> Self {
        f32x4_div(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        f32x4_add(f32x4_mul(self, a), b)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn neg(self) -> Self {
        f32x4_neg(self)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn abs(self) -> Self {
        f32x4_abs(self)
    }

    // pmax(a, b) = a < b ? b : a
    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn max(self, rhs: Self) -> Self {
        f32x4_pmax(self, rhs)
    }

    // pmin(a, b) = b < a ? b : a
    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn min(self, rhs: Self) -> Self {
        f32x4_pmin(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn sqrt(self) -> Self {
        f32x4_sqrt(self)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn rsqrt_estimate(self) -> Self {
        crate::kernels::rsqrt_magic_seed(self)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn floor_to_int(self) -> Self::Bits {
        i32x4_trunc_sat_f32x4(f32x4_floor(self))
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn int_to_float(bits: Self::Bits) -> Self {
        f32x4_convert_i32x4(bits)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn to_bits(self) -> Self::Bits {
        self
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn from_bits(bits: Self::Bits) -> Self {
        bits
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn splat_bits(value: i32) -> Self::Bits {
        i32x4_splat(value)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn add_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        i32x4_add(a, b)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn sub_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        i32x4_sub(a, b)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn shl_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        i32x4_shl(bits, N as u32)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn shr_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        u32x4_shr(bits, N as u32)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn gt(self, rhs: Self) -> Self::Mask {
        f32x4_gt(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn ge(self, rhs: Self) -> Self::Mask {
        f32x4_ge(self, rhs)
    }

    #[inline]
    #[target_feature(enable = "simd128")]
    unsafe fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self {
        v128_bitselect(if_true, if_false, mask)
    }
}

/// WebAssembly SIMD128 backend (128-bit SIMD)
pub struct WasmBackend;

super::impl_vector_backend!(WasmBackend, v128, "simd128");
