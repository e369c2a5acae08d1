//! Elementwise loop drivers
//!
//! Both drivers walk an input buffer of arbitrary length and write one output
//! element per input element. The vector driver re-queries the vector length
//! for every chunk, so a buffer whose length is not a multiple of the
//! hardware width finishes with a narrower chunk that still runs through the
//! vector kernel.

use crate::lanes::LaneGroup;

/// Widest lane group any backend uses (`__m256` and `F32x8`, 8 lanes)
pub const MAX_LANES: usize = 8;

/// Apply `f` to every element: `out[i] = f(x[i])`
///
/// # Panics
///
/// Panics if `out` is shorter than `x`.
#[inline(always)]
pub fn elementwise_loop_scalar<F>(f: F, x: &[f32], out: &mut [f32])
where
    F: Fn(f32) -> f32,
{
    let out = &mut out[..x.len()];
    for (o, &v) in out.iter_mut().zip(x) {
        *o = f(v);
    }
}

/// Apply the lane-group transform `f` across `x`, `vl` lanes at a time
///
/// Full chunks are loaded and stored in place. The final partial chunk is
/// staged through a zero-padded stack group so that neither buffer is read
/// or written past its last element; the padding lanes are discarded.
///
/// # Safety
///
/// The instruction set behind `V` must be available on the running CPU.
///
/// # Panics
///
/// Panics if `out` is shorter than `x`.
#[inline(always)]
pub unsafe fn elementwise_loop_vector<V, F>(f: F, x: &[f32], out: &mut [f32])
where
    V: LaneGroup,
    F: Fn(V) -> V,
{
    debug_assert!(V::LANES <= MAX_LANES);
    let out = &mut out[..x.len()];

    let mut offset = 0;
    let mut remaining = x.len();
    while remaining > 0 {
        let vl = V::set_vl(remaining);
        if vl == V::LANES {
            let v = V::load(x.as_ptr().add(offset));
            f(v).store(out.as_mut_ptr().add(offset));
        } else {
            let mut tail = [0.0f32; MAX_LANES];
            tail[..vl].copy_from_slice(&x[offset..offset + vl]);
            let v = V::load(tail.as_ptr());
            f(v).store(tail.as_mut_ptr());
            out[offset..offset + vl].copy_from_slice(&tail[..vl]);
        }
        offset += vl;
        remaining -= vl;
    }
}
