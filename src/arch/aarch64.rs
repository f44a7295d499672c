//! aarch64 kernel variants using NEON.
//!
//! NEON is always available on aarch64, so no runtime detection is needed.
//! `vld1q`/`vld2`/`vst1q`/`vst2q` carry no alignment requirement, so each
//! kernel has a single entry point serving both the aligned and unaligned
//! rows of the dispatch table.

use std::arch::aarch64::*;

use crate::MAX_INDEX_POINTS;
use num_complex::Complex;

/// NEON argmax. Lane group of 4.
///
/// Tracks per-lane maxima and a synchronized per-lane `u32` index vector,
/// then reduces both with the smallest-index-on-tie rule of the scalar
/// reference.
///
/// # Safety
///
/// NEON is always available on aarch64, but we use `target_feature` for
/// consistency with the x86_64 variants. `samples` must be non-empty.
#[target_feature(enable = "neon")]
pub unsafe fn index_max_neon(samples: &[f32]) -> u16 {
    let n = samples.len().min(MAX_INDEX_POINTS);
    let quarter_points = n / 4;
    let ptr = samples.as_ptr();

    let first_indexes: [u32; 4] = [0, 1, 2, 3];
    let mut current_indexes = vld1q_u32(first_indexes.as_ptr());
    let index_increment = vdupq_n_u32(4);

    let mut max = samples[0];
    let mut index = 0_usize;
    let mut max_values = vdupq_n_f32(max);
    let mut max_indexes = vdupq_n_u32(0);

    for group in 0..quarter_points {
        let current = vld1q_f32(ptr.add(group * 4));

        // Strict greater-than keeps the earliest per-lane occurrence.
        let gt = vcgtq_f32(current, max_values);
        max_indexes = vbslq_u32(gt, current_indexes, max_indexes);
        max_values = vbslq_f32(gt, current, max_values);

        current_indexes = vaddq_u32(current_indexes, index_increment);
    }

    // Reduce the per-lane maxima; smallest index wins on exact equality.
    let mut values = [0.0_f32; 4];
    let mut indexes = [0_u32; 4];
    vst1q_f32(values.as_mut_ptr(), max_values);
    vst1q_u32(indexes.as_mut_ptr(), max_indexes);
    for lane in 0..4 {
        let lane_index = indexes[lane] as usize;
        if values[lane] > max || (values[lane] == max && lane_index < index) {
            max = values[lane];
            index = lane_index;
        }
    }

    for i in (quarter_points * 4)..n {
        let s = *samples.get_unchecked(i);
        if s > max {
            max = s;
            index = i;
        }
    }
    index as u16
}

/// NEON deinterleave-and-scale. Lane group of 8.
///
/// `vld2_s8` performs the I/Q separation as part of the load; the
/// components are then widened 8 -> 16 -> 32 bits, converted to `f32` and
/// scaled by the reciprocal.
///
/// # Safety
///
/// NEON is always available on aarch64; see [`index_max_neon`].
#[target_feature(enable = "neon")]
pub unsafe fn deinterleave_scale_neon(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    let n = input.len().min(i_out.len()).min(q_out.len());
    let eighth_points = n / 8;

    let inv_scalar = 1.0 / scalar;
    let mut in_ptr = input.as_ptr() as *const i8;
    let mut i_ptr = i_out.as_mut_ptr();
    let mut q_ptr = q_out.as_mut_ptr();

    for _ in 0..eighth_points {
        // Deinterleaving load: .0 holds eight I bytes, .1 eight Q bytes.
        let pairs = vld2_s8(in_ptr);
        in_ptr = in_ptr.add(16);

        let i16x8 = vmovl_s8(pairs.0);
        let q16x8 = vmovl_s8(pairs.1);

        let i_lo = vcvtq_f32_s32(vmovl_s16(vget_low_s16(i16x8)));
        vst1q_f32(i_ptr, vmulq_n_f32(i_lo, inv_scalar));
        i_ptr = i_ptr.add(4);
        let i_hi = vcvtq_f32_s32(vmovl_s16(vget_high_s16(i16x8)));
        vst1q_f32(i_ptr, vmulq_n_f32(i_hi, inv_scalar));
        i_ptr = i_ptr.add(4);

        let q_lo = vcvtq_f32_s32(vmovl_s16(vget_low_s16(q16x8)));
        vst1q_f32(q_ptr, vmulq_n_f32(q_lo, inv_scalar));
        q_ptr = q_ptr.add(4);
        let q_hi = vcvtq_f32_s32(vmovl_s16(vget_high_s16(q16x8)));
        vst1q_f32(q_ptr, vmulq_n_f32(q_hi, inv_scalar));
        q_ptr = q_ptr.add(4);
    }

    // Scalar remainder with direct division.
    for k in (eighth_points * 8)..n {
        let s = *input.get_unchecked(k);
        *i_out.get_unchecked_mut(k) = f32::from(s.re) / scalar;
        *q_out.get_unchecked_mut(k) = f32::from(s.im) / scalar;
    }
}

/// NEON multiply-conjugate-and-scale. Lane group of 8.
///
/// Products are formed with `vmull_s8` (8x8 -> 16-bit) and accumulated with
/// widening 16 -> 32-bit adds, so the worst case (-128 * -128) * 2 cannot
/// overflow. `vst2q_f32` re-interleaves the component streams on the way
/// out.
///
/// # Safety
///
/// NEON is always available on aarch64; see [`index_max_neon`].
#[target_feature(enable = "neon")]
pub unsafe fn multiply_conjugate_scale_neon(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    let n = out.len().min(a.len()).min(b.len());
    let eighth_points = n / 8;

    let inv_scalar = 1.0 / scalar;
    let mut a_ptr = a.as_ptr() as *const i8;
    let mut b_ptr = b.as_ptr() as *const i8;
    let mut c_ptr = out.as_mut_ptr() as *mut f32;

    for _ in 0..eighth_points {
        let av = vld2_s8(a_ptr);
        let bv = vld2_s8(b_ptr);
        a_ptr = a_ptr.add(16);
        b_ptr = b_ptr.add(16);

        // real = ar*br + ai*bi, imag = ai*br - ar*bi, accumulated in 32-bit.
        let rr = vmull_s8(av.0, bv.0);
        let ii = vmull_s8(av.1, bv.1);
        let ir = vmull_s8(av.1, bv.0);
        let ri = vmull_s8(av.0, bv.1);

        let real_lo = vaddl_s16(vget_low_s16(rr), vget_low_s16(ii));
        let real_hi = vaddl_s16(vget_high_s16(rr), vget_high_s16(ii));
        let imag_lo = vsubl_s16(vget_low_s16(ir), vget_low_s16(ri));
        let imag_hi = vsubl_s16(vget_high_s16(ir), vget_high_s16(ri));

        let lo = float32x4x2_t(
            vmulq_n_f32(vcvtq_f32_s32(real_lo), inv_scalar),
            vmulq_n_f32(vcvtq_f32_s32(imag_lo), inv_scalar),
        );
        vst2q_f32(c_ptr, lo);
        c_ptr = c_ptr.add(8);

        let hi = float32x4x2_t(
            vmulq_n_f32(vcvtq_f32_s32(real_hi), inv_scalar),
            vmulq_n_f32(vcvtq_f32_s32(imag_hi), inv_scalar),
        );
        vst2q_f32(c_ptr, hi);
        c_ptr = c_ptr.add(8);
    }

    // Scalar remainder with direct division.
    for k in (eighth_points * 8)..n {
        let xv = *a.get_unchecked(k);
        let yv = *b.get_unchecked(k);
        let x = Complex::new(f32::from(xv.re), f32::from(xv.im));
        let y = Complex::new(f32::from(yv.re), -f32::from(yv.im));
        let t = x * y;
        *out.get_unchecked_mut(k) = Complex::new(t.re / scalar, t.im / scalar);
    }
}
