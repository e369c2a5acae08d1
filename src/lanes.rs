//! Lane groups: one vector register's worth of `f32` lanes
//!
//! Every vectorized kernel in [`crate::kernels`] is written once against the
//! [`LaneGroup`] primitive set and instantiated per instruction set by the
//! backends. A lane group exposes exactly what the kernels need: arithmetic
//! (with fused multiply-add where the hardware has it), float/int bit
//! reinterpretation for the exponent-field tricks, and compare + select for
//! branchless masking.
//!
//! # Safety
//!
//! All primitives are `unsafe` because they lower to ISA intrinsics. Callers
//! must only use a lane group whose instruction set is available on the
//! running CPU.

/// One vector register group of `f32` lanes
pub trait LaneGroup: Copy {
    /// 32-bit signed integer lanes sharing the register layout
    type Bits: Copy;
    /// Per-lane comparison result consumed by [`LaneGroup::select`]
    type Mask: Copy;

    /// Hardware width of the group in `f32` lanes
    const LANES: usize;

    /// Whether [`LaneGroup::rsqrt_estimate`] lowers to a native reciprocal
    /// square root estimate. When `false` the estimate is the magic-constant
    /// bit trick and needs two Newton-Raphson steps instead of one.
    const HAS_RSQRT_ESTIMATE: bool;

    /// Vector length for the next chunk: `min(LANES, remaining)`
    #[inline(always)]
    fn set_vl(remaining: usize) -> usize {
        remaining.min(Self::LANES)
    }

    /// Unaligned load of `LANES` floats
    unsafe fn load(src: *const f32) -> Self;
    /// Unaligned store of `LANES` floats
    unsafe fn store(self, dst: *mut f32);
    /// Broadcast `value` to every lane
    unsafe fn splat(value: f32) -> Self;

    unsafe fn add(self, rhs: Self) -> Self;
    unsafe fn sub(self, rhs: Self) -> Self;
    unsafe fn mul(self, rhs: Self) -> Self;
    unsafe fn div(self, rhs: Self) -> Self;
    /// `self * a + b`, fused when the ISA has FMA
    unsafe fn mul_add(self, a: Self, b: Self) -> Self;
    unsafe fn neg(self) -> Self;
    unsafe fn abs(self) -> Self;
    /// Lane-wise maximum; a NaN in `self` is returned unchanged
    unsafe fn max(self, rhs: Self) -> Self;
    /// Lane-wise minimum; a NaN in `self` is returned unchanged
    unsafe fn min(self, rhs: Self) -> Self;
    unsafe fn sqrt(self) -> Self;
    /// Reciprocal square root seed for Newton-Raphson refinement
    unsafe fn rsqrt_estimate(self) -> Self;

    /// Round toward negative infinity and convert to integer lanes
    unsafe fn floor_to_int(self) -> Self::Bits;
    unsafe fn int_to_float(bits: Self::Bits) -> Self;
    /// Reinterpret the IEEE-754 bit pattern as integer lanes
    unsafe fn to_bits(self) -> Self::Bits;
    /// Reinterpret integer lanes as IEEE-754 floats
    unsafe fn from_bits(bits: Self::Bits) -> Self;
    unsafe fn splat_bits(value: i32) -> Self::Bits;
    /// Wrapping integer addition
    unsafe fn add_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits;
    /// Wrapping integer subtraction
    unsafe fn sub_bits(a: Self::Bits, b: Self::Bits) -> Self::Bits;
    unsafe fn shl_bits<const N: i32>(bits: Self::Bits) -> Self::Bits;
    /// Logical (zero-filling) right shift
    unsafe fn shr_bits<const N: i32>(bits: Self::Bits) -> Self::Bits;

    /// Ordered `self > rhs`; false for NaN lanes
    unsafe fn gt(self, rhs: Self) -> Self::Mask;
    /// Ordered `self >= rhs`; false for NaN lanes
    unsafe fn ge(self, rhs: Self) -> Self::Mask;
    /// Per-lane `if mask { if_true } else { if_false }`
    unsafe fn select(mask: Self::Mask, if_true: Self, if_false: Self) -> Self;
}
