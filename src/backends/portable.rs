//! Portable vector backend (every target)
//!
//! `F32x8` is a plain 8-lane array that runs the same kernels as the
//! hardware backends. It has no native reciprocal square root estimate, so
//! [`crate::kernels::rsqrt`] takes the magic-constant path with two
//! Newton-Raphson steps. The optimizer typically auto-vectorizes the lane
//! loops.

use crate::lanes::LaneGroup;

/// Eight `f32` lanes in an array
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F32x8(pub [f32; 8]);

#[inline(always)]
fn map(a: F32x8, f: impl Fn(f32) -> f32) -> F32x8 {
    F32x8(a.0.map(f))
}

#[inline(always)]
fn zip(a: F32x8, b: F32x8, f: impl Fn(f32, f32) -> f32) -> F32x8 {
    F32x8(std::array::from_fn(|i| f(a.0[i], b.0[i])))
}

#[inline(always)]
fn zip_bits(a: [i32; 8], b: [i32; 8], f: impl Fn(i32, i32) -> i32) -> [i32; 8] {
    std::array::from_fn(|i| f(a[i], b[i]))
}

#[inline(always)]
fn compare(a: F32x8, b: F32x8, f: impl Fn(f32, f32) -> bool) -> [bool; 8] {
    std::array::from_fn(|i| f(a.0[i], b.0[i]))
}

impl LaneGroup for F32x8 {
    type Bits = [i32; 8];
    type Mask = [bool; 8];

    const LANES: usize = 8;
    const HAS_RSQRT_ESTIMATE: bool = false;

    #[inline(always)]
    unsafe fn load(src: *const f32) -> Self {
        F32x8(std::ptr::read_unaligned(src as *const [f32; 8]))
    }

    #[inline(always)]
    unsafe fn store(self, dst: *mut f32) {
        std::ptr::write_unaligned(dst as *mut [f32; 8], self.0);
    }

    #[inline(always)]
    unsafe fn splat(value: f32) -> Self {
        F32x8([value; 8])
    }

    #[inline(always)]
    unsafe fn add(self, rhs: Self) -> Self {
        zip(self, rhs, |a, b| a + b)
    }

    #[inline(always)]
    unsafe fn sub(self, rhs: Self) -> Self {
        zip(self, rhs, |a, b| a - b)
    }

    #[inline(always)]
    unsafe fn mul(self, rhs: Self) -> Self {
        zip(self, rhs, |a, b| a * b)
    }

    #[inline(always)]
    unsafe fn div(self, rhs: Self) -> Self {
        zip(self, rhs, |a, b| a / b)
    }

    // Unfused: f32::mul_add falls back to a libm call without hardware FMA
    #[inline(always)]
    unsafe fn mul_add(self, a: Self, b: Self) -> Self {
        F32x8(std::array::from_fn(|i| self.0[i] * a.0[i] + b.0[i]))
    }

    #[inline(always)]
    unsafe fn neg(self) -> Self {
        map(self, |v| -v)
    }

    #[inline(always)]
    unsafe fn abs(self) -> Self {
        map(self, f32::abs)
    }

    #[inline(always)]
    unsafe fn max(self, rhs: Self) -> Self {
        zip(self, rhs, |a, b| if b > a { b } else { a })
    }

    #[inline(always)]
    unsafe fn min(self, rhs: Self) -> Self {
        zip(self, rhs, |a, b| if b < a { b } else { a })
    }

    #[inline(always)]
    unsafe fn sqrt(self) -> Self {
        map(self, f32::sqrt)
    }

    #[inline(always)]
    unsafe fn rsqrt_estimate(self) -> Self {
        crate::kernels::rsqrt_magic_seed(self)
    }

    #[inline(always)]
    unsafe fn floor_to_int(self) -> Self::Bits {
        self.0.map(|v| v.floor() as i32)
    }

    #[inline(always)]
    unsafe fn int_to_float(bits: Self::Bits) -> Self {
        F32x8(bits.map(|b| b as f32))
    }

    #[inline(always)]
    unsafe fn to_bits(self) -> Self::Bits {
        self.0.map(|v| v.to_bits() as i32)
    }

    #[inline(always)]
    unsafe fn from_bits(bits: Self::Bits) -> Self {
        F32x8(bits.map(|b| f32::from_bits(b as u32)))
    }

    #[inline(always)]
    unsafe fn splat_bits(value: i32) -> Self::Bits {
        [value; 8]
    }

    #[inline(always)]
    unsafe fn add_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        zip_bits(a, b, i32::wrapping_add)
    }

    #[inline(always)]
    unsafe fn sub_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits {
        zip_bits(a, b, i32::wrapping_sub)
    }

    #[inline(always)]
    unsafe fn shl_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        bits.map(|b| ((b as u32) << N) as i32)
    }

    #[inline(always)]
    unsafe fn shr_bits<const N: i32>(bits: Self::Bits) -> Self::Bits {
        bits.map(|b| ((b as u32) >> N) as i32)
    }

    #[inline(always)]
    unsafe fn gt(self, rhs: Self) -> Self::Mask {
        compare(self, rhs, |a, b| a > b)
    }

    #[inline(always)]
    unsafe fn ge(self, rhs: Self) -> Self::Mask {
        compare(self, rhs, |a, b| a >= b)
    }

    #[inline(always)]
    unsafe fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self {
        F32x8(std::array::from_fn(|i| {
            if mask[i] {
                if_true.0[i]
            } else {
                if_false.0[i]
            }
        }))
    }
}

/// Portable backend: [`F32x8`] lane groups through the vector driver
pub struct PortableBackend;

super::impl_vector_backend!(PortableBackend, F32x8);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::test_support::assert_backend_matches_scalar;
    use crate::backends::ActivationBackend;

    #[test]
    fn test_portable_matches_scalar() {
        assert_backend_matches_scalar::<PortableBackend>();
    }

    #[test]
    fn test_portable_floor_rounds_toward_negative_infinity() {
        let v = F32x8([-1.5, -0.5, 0.0, 0.5, 1.5, -2.0, 2.0, -0.0]);
        let floored = unsafe { v.floor_to_int() };
        assert_eq!(floored, [-2, -1, 0, 0, 1, -2, 2, 0]);
    }

    #[test]
    fn test_portable_shr_is_logical() {
        let shifted = unsafe { F32x8::shr_bits::<1>([-2; 8]) };
        assert_eq!(shifted[0], 0x7fff_ffff);
    }

    #[test]
    fn test_portable_max_keeps_nan_in_self() {
        let v = F32x8([f32::NAN; 8]);
        let out = unsafe { v.max(F32x8::splat(0.0)) };
        assert!(out.0.iter().all(|x| x.is_nan()));
        // NaN on the right is dropped
        let out = unsafe { F32x8::splat(1.0).max(v) };
        assert_eq!(out.0, [1.0; 8]);
    }

    #[test]
    fn test_portable_relu_tail() {
        let x = [-1.0, 2.0, -3.0, 4.0, -5.0];
        let mut out = [0.0; 5];
        unsafe { PortableBackend::relu(&x, &mut out) };
        assert_eq!(out, [0.0, 2.0, 0.0, 4.0, 0.0]);
    }
}
