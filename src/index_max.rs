//! Argmax search over real sample buffers.
//!
//! Returns the index of the *first* occurrence of the maximum value, the
//! way a left-to-right scalar scan would find it. The vectorized variants
//! track a per-lane running maximum alongside a synchronized per-lane index
//! vector and reduce both at the end with the same smallest-index-on-tie
//! rule, so every variant reports the identical index.

// arch is only used on architectures with SIMD dispatch
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::arch;
use crate::MAX_INDEX_POINTS;

// MIN_POINTS_SIMD is only used on architectures with SIMD dispatch
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
use crate::MIN_POINTS_SIMD;

/// Index of the first maximum value in `samples`.
///
/// Inputs longer than [`MAX_INDEX_POINTS`](crate::MAX_INDEX_POINTS) are
/// silently capped: only the first `u16::MAX` samples are scanned, since a
/// later index could not be represented in the result type anyway.
///
/// Ties are broken toward the **lowest** index, matching a scalar
/// left-to-right scan, on every SIMD variant.
///
/// # SIMD Acceleration
///
/// Dispatches to (in order of preference):
/// - AVX on x86_64 (runtime detection, n >= 16)
/// - SSE4.1 on x86_64 (runtime detection, n >= 16)
/// - NEON on aarch64 (always available, n >= 16)
/// - Portable scalar otherwise
///
/// When the buffer happens to start on the vector width's natural boundary
/// the aligned load variant is selected.
///
/// # Panics
///
/// Panics if `samples` is empty: the scan is seeded from the first element,
/// so a zero-length buffer has no defined result.
///
/// # Example
///
/// ```rust
/// use iqkern::index_max;
///
/// let v = [0.0_f32, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0];
/// assert_eq!(index_max(&v), 4);
/// ```
#[inline]
#[must_use]
pub fn index_max(samples: &[f32]) -> u16 {
    #[cfg(target_arch = "x86_64")]
    {
        let n = samples.len().min(MAX_INDEX_POINTS);
        if n >= MIN_POINTS_SIMD && is_x86_feature_detected!("avx") {
            // SAFETY: AVX verified via runtime detection; alignment checked.
            return unsafe {
                if arch::is_aligned_to(samples.as_ptr(), 32) {
                    arch::x86_64::index_max_avx_aligned(samples)
                } else {
                    arch::x86_64::index_max_avx_unaligned(samples)
                }
            };
        }
        if n >= MIN_POINTS_SIMD && is_x86_feature_detected!("sse4.1") {
            // SAFETY: SSE4.1 verified via runtime detection; alignment checked.
            return unsafe {
                if arch::is_aligned_to(samples.as_ptr(), 16) {
                    arch::x86_64::index_max_sse4_1_aligned(samples)
                } else {
                    arch::x86_64::index_max_sse4_1_unaligned(samples)
                }
            };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if samples.len().min(MAX_INDEX_POINTS) >= MIN_POINTS_SIMD {
            // SAFETY: NEON is always available on aarch64.
            return unsafe { arch::aarch64::index_max_neon(samples) };
        }
    }

    #[allow(unreachable_code)]
    index_max_scalar(samples)
}

/// Portable scalar argmax. The correctness reference for all variants.
///
/// # Panics
///
/// Panics if `samples` is empty.
#[inline]
#[must_use]
pub fn index_max_scalar(samples: &[f32]) -> u16 {
    let n = samples.len().min(MAX_INDEX_POINTS);

    let mut max = samples[0];
    let mut index: u16 = 0;

    for (i, &s) in samples[1..n].iter().enumerate() {
        if s > max {
            max = s;
            index = (i + 1) as u16;
        }
    }
    index
}
