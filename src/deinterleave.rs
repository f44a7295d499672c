//! Interleaved 8-bit IQ to planar `f32` conversion with normalization.
//!
//! Splits an interleaved `Complex<i8>` stream into separate I and Q `f32`
//! streams, dividing every component by `scalar`. The division is realized
//! as multiplication by the precomputed reciprocal on both the scalar
//! reference and the vector bodies; only the vector tails divide directly.
//! The resulting discrepancy is at most a couple of ULP and is covered by
//! the crate-wide 1e-5 relative tolerance.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::arch;
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::MIN_POINTS_SIMD;
use num_complex::Complex;

/// Deinterleave 8-bit IQ samples into planar `f32` streams, scaled by `1/scalar`.
///
/// `i_out[k] = input[k].re as f32 / scalar` and
/// `q_out[k] = input[k].im as f32 / scalar` for every `k` up to the common
/// length of the three buffers. Empty input is a no-op.
///
/// # SIMD Acceleration
///
/// Dispatches to AVX2 or SSE4.1 on x86_64 (runtime detection) and NEON on
/// aarch64, falling back to the portable scalar kernel for short buffers.
/// When input and both outputs start on the vector width's natural boundary
/// the aligned load/store variant is selected.
///
/// # Debug Assertions
///
/// In debug builds, panics if the buffer lengths differ. In release builds,
/// mismatched lengths silently use the shortest length.
///
/// # Example
///
/// ```rust
/// use iqkern::deinterleave_scale;
/// use num_complex::Complex;
///
/// let iq = [Complex::new(10i8, -20), Complex::new(30, -40)];
/// let mut i = [0.0_f32; 2];
/// let mut q = [0.0_f32; 2];
/// deinterleave_scale(&mut i, &mut q, &iq, 10.0);
/// assert_eq!(i, [1.0, 3.0]);
/// assert_eq!(q, [-2.0, -4.0]);
/// ```
#[inline]
pub fn deinterleave_scale(i_out: &mut [f32], q_out: &mut [f32], input: &[Complex<i8>], scalar: f32) {
    debug_assert_eq!(i_out.len(), input.len(), "deinterleave_scale: length mismatch");
    debug_assert_eq!(q_out.len(), input.len(), "deinterleave_scale: length mismatch");

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    let n = input.len().min(i_out.len()).min(q_out.len());

    #[cfg(target_arch = "x86_64")]
    {
        if n >= MIN_POINTS_SIMD && is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 verified via runtime detection; alignment checked.
            return unsafe {
                if arch::is_aligned_to(input.as_ptr(), 32)
                    && arch::is_aligned_to(i_out.as_ptr(), 32)
                    && arch::is_aligned_to(q_out.as_ptr(), 32)
                {
                    arch::x86_64::deinterleave_scale_avx2_aligned(i_out, q_out, input, scalar)
                } else {
                    arch::x86_64::deinterleave_scale_avx2_unaligned(i_out, q_out, input, scalar)
                }
            };
        }
        if n >= MIN_POINTS_SIMD && is_x86_feature_detected!("sse4.1") {
            // SAFETY: SSE4.1 verified via runtime detection; alignment checked.
            return unsafe {
                if arch::is_aligned_to(input.as_ptr(), 16)
                    && arch::is_aligned_to(i_out.as_ptr(), 16)
                    && arch::is_aligned_to(q_out.as_ptr(), 16)
                {
                    arch::x86_64::deinterleave_scale_sse4_1_aligned(i_out, q_out, input, scalar)
                } else {
                    arch::x86_64::deinterleave_scale_sse4_1_unaligned(i_out, q_out, input, scalar)
                }
            };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if n >= MIN_POINTS_SIMD {
            // SAFETY: NEON is always available on aarch64.
            return unsafe { arch::aarch64::deinterleave_scale_neon(i_out, q_out, input, scalar) };
        }
    }

    #[allow(unreachable_code)]
    deinterleave_scale_scalar(i_out, q_out, input, scalar)
}

/// Portable scalar deinterleave. The correctness reference for all variants.
///
/// Scales by the precomputed reciprocal of `scalar`, matching the vector
/// bodies.
#[inline]
pub fn deinterleave_scale_scalar(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    let inv_scalar = 1.0 / scalar;
    for ((i, q), sample) in i_out.iter_mut().zip(q_out.iter_mut()).zip(input.iter()) {
        *i = f32::from(sample.re) * inv_scalar;
        *q = f32::from(sample.im) * inv_scalar;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_scalar_is_plain_conversion() {
        let iq: Vec<Complex<i8>> = (0..20)
            .map(|k| Complex::new(k as i8 - 10, 10 - k as i8))
            .collect();
        let mut i = vec![0.0_f32; 20];
        let mut q = vec![0.0_f32; 20];
        deinterleave_scale(&mut i, &mut q, &iq, 1.0);
        for k in 0..20 {
            assert_eq!(i[k], f32::from(iq[k].re));
            assert_eq!(q[k], f32::from(iq[k].im));
        }
    }

    #[test]
    fn test_extreme_components() {
        let iq = [Complex::new(i8::MIN, i8::MAX); 17];
        let mut i = [0.0_f32; 17];
        let mut q = [0.0_f32; 17];
        deinterleave_scale(&mut i, &mut q, &iq, 2.0);
        for k in 0..17 {
            assert!((i[k] - (-64.0)).abs() < 1e-4);
            assert!((q[k] - 63.5).abs() < 1e-4);
        }
    }

    #[test]
    fn test_outputs_fully_overwritten() {
        let iq = [Complex::new(1i8, 1); 9];
        let mut i = [f32::NAN; 9];
        let mut q = [f32::NAN; 9];
        deinterleave_scale(&mut i, &mut q, &iq, 1.0);
        assert!(i.iter().chain(q.iter()).all(|v| *v == 1.0));
    }
}
