//! Complex multiply-by-conjugate with normalization.
//!
//! Computes `a[k] * conj(b[k]) / scalar` over two interleaved 8-bit IQ
//! buffers, producing interleaved `Complex<f32>` output. This is the inner
//! step of a cross-correlation against a reference signal.
//!
//! The vector bodies do the complex arithmetic on the widened integer
//! lanes: a pairwise multiply-accumulate of `(ar, ai)` against `(br, bi)`
//! yields the real part `ar*br + ai*bi` directly, and the same primitive
//! against the sign-flipped, pair-swapped operand `(-bi, br)` yields the
//! imaginary part `ai*br - ar*bi`. With 8-bit inputs widened to 16-bit
//! lanes the products accumulate into 32 bits, so no input can overflow.

#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::arch;
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::MIN_POINTS_SIMD;
use num_complex::Complex;

/// Multiply `a` by the conjugate of `b`, elementwise, scaled by `1/scalar`.
///
/// `out[k] = Complex::new(a.re*b.re + a.im*b.im, a.im*b.re - a.re*b.im) / scalar`
/// (all components converted to `f32` first) for every `k` up to the common
/// length of the three buffers. Empty input is a no-op.
///
/// # SIMD Acceleration
///
/// Dispatches to AVX2 or SSE4.1 on x86_64 (runtime detection) and NEON on
/// aarch64, falling back to the portable scalar kernel for short buffers.
/// When all buffers start on the vector width's natural boundary the
/// aligned load/store variant is selected.
///
/// # Debug Assertions
///
/// In debug builds, panics if the buffer lengths differ. In release builds,
/// mismatched lengths silently use the shortest length.
///
/// # Example
///
/// ```rust
/// use iqkern::multiply_conjugate_scale;
/// use num_complex::Complex;
///
/// let a = [Complex::new(1i8, 2)];
/// let b = [Complex::new(3i8, 4)];
/// let mut out = [Complex::new(0.0_f32, 0.0)];
/// multiply_conjugate_scale(&mut out, &a, &b, 1.0);
/// assert_eq!(out[0], Complex::new(11.0, 2.0));
/// ```
#[inline]
pub fn multiply_conjugate_scale(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    debug_assert_eq!(a.len(), b.len(), "multiply_conjugate_scale: length mismatch");
    debug_assert_eq!(out.len(), a.len(), "multiply_conjugate_scale: length mismatch");

    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    let n = out.len().min(a.len()).min(b.len());

    #[cfg(target_arch = "x86_64")]
    {
        if n >= MIN_POINTS_SIMD && is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 verified via runtime detection; alignment checked.
            return unsafe {
                if arch::is_aligned_to(out.as_ptr(), 32)
                    && arch::is_aligned_to(a.as_ptr(), 16)
                    && arch::is_aligned_to(b.as_ptr(), 16)
                {
                    arch::x86_64::multiply_conjugate_scale_avx2_aligned(out, a, b, scalar)
                } else {
                    arch::x86_64::multiply_conjugate_scale_avx2_unaligned(out, a, b, scalar)
                }
            };
        }
        if n >= MIN_POINTS_SIMD && is_x86_feature_detected!("sse4.1") {
            // SAFETY: SSE4.1 verified via runtime detection; alignment checked.
            return unsafe {
                if arch::is_aligned_to(out.as_ptr(), 16) {
                    arch::x86_64::multiply_conjugate_scale_sse4_1_aligned(out, a, b, scalar)
                } else {
                    arch::x86_64::multiply_conjugate_scale_sse4_1_unaligned(out, a, b, scalar)
                }
            };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if n >= MIN_POINTS_SIMD {
            // SAFETY: NEON is always available on aarch64.
            return unsafe { arch::aarch64::multiply_conjugate_scale_neon(out, a, b, scalar) };
        }
    }

    #[allow(unreachable_code)]
    multiply_conjugate_scale_scalar(out, a, b, scalar)
}

/// Portable scalar multiply-conjugate. The correctness reference for all
/// variants.
///
/// Scales by the precomputed reciprocal of `scalar`, matching the vector
/// bodies.
#[inline]
pub fn multiply_conjugate_scale_scalar(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    let inv_scalar = 1.0 / scalar;
    for (c, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        let xv = Complex::new(f32::from(x.re), f32::from(x.im));
        let yv = Complex::new(f32::from(y.re), -f32::from(y.im));
        *c = xv * yv * inv_scalar;
    }
}
