//! x86_64 kernel variants using SSE4.1, AVX and AVX2.
//!
//! Every variant is an aligned/unaligned pair sharing one vectorized core;
//! the pair members differ only in which load/store forms the core is
//! instantiated with. The `_aligned` entry points require every buffer to
//! start on the vector width's natural boundary (16 bytes for SSE, 32 bytes
//! for AVX) and are undefined behavior otherwise — the safe public API
//! checks addresses before selecting them.
//!
//! All functions here are unsafe and require runtime feature detection
//! before calling.

use std::arch::x86_64::*;

use crate::MAX_INDEX_POINTS;
use num_complex::Complex;

/// Load/store policy shared by the aligned and unaligned entry points of
/// one core. `Aligned` uses the aligned instruction forms and inherits
/// their alignment requirements; `Unaligned` tolerates any address.
trait Mem {
    unsafe fn load_ps(p: *const f32) -> __m128;
    unsafe fn store_ps(p: *mut f32, v: __m128);
    unsafe fn load256_ps(p: *const f32) -> __m256;
    unsafe fn store256_ps(p: *mut f32, v: __m256);
    unsafe fn load_si128(p: *const __m128i) -> __m128i;
    unsafe fn load256_si256(p: *const __m256i) -> __m256i;
}

enum Aligned {}
enum Unaligned {}

impl Mem for Aligned {
    #[inline(always)]
    unsafe fn load_ps(p: *const f32) -> __m128 {
        _mm_load_ps(p)
    }
    #[inline(always)]
    unsafe fn store_ps(p: *mut f32, v: __m128) {
        _mm_store_ps(p, v)
    }
    #[inline(always)]
    unsafe fn load256_ps(p: *const f32) -> __m256 {
        _mm256_load_ps(p)
    }
    #[inline(always)]
    unsafe fn store256_ps(p: *mut f32, v: __m256) {
        _mm256_store_ps(p, v)
    }
    #[inline(always)]
    unsafe fn load_si128(p: *const __m128i) -> __m128i {
        _mm_load_si128(p)
    }
    #[inline(always)]
    unsafe fn load256_si256(p: *const __m256i) -> __m256i {
        _mm256_load_si256(p)
    }
}

impl Mem for Unaligned {
    #[inline(always)]
    unsafe fn load_ps(p: *const f32) -> __m128 {
        _mm_loadu_ps(p)
    }
    #[inline(always)]
    unsafe fn store_ps(p: *mut f32, v: __m128) {
        _mm_storeu_ps(p, v)
    }
    #[inline(always)]
    unsafe fn load256_ps(p: *const f32) -> __m256 {
        _mm256_loadu_ps(p)
    }
    #[inline(always)]
    unsafe fn store256_ps(p: *mut f32, v: __m256) {
        _mm256_storeu_ps(p, v)
    }
    #[inline(always)]
    unsafe fn load_si128(p: *const __m128i) -> __m128i {
        _mm_loadu_si128(p)
    }
    #[inline(always)]
    unsafe fn load256_si256(p: *const __m256i) -> __m256i {
        _mm256_loadu_si256(p)
    }
}

// ---------------------------------------------------------------------------
// Argmax
// ---------------------------------------------------------------------------

#[inline(always)]
unsafe fn index_max_m256<M: Mem>(samples: &[f32]) -> u16 {
    let n = samples.len().min(MAX_INDEX_POINTS);
    let eighth_points = n / 8;
    let ptr = samples.as_ptr();

    let index_increment = _mm256_set1_ps(8.0);
    // Becomes [0.0 .. 7.0] on the first increment. Indices are tracked as
    // f32, exact for every value up to the u16 cap.
    let mut current_indexes = _mm256_set_ps(-1.0, -2.0, -3.0, -4.0, -5.0, -6.0, -7.0, -8.0);

    let mut max = samples[0];
    let mut index = 0_usize;
    let mut max_values = _mm256_set1_ps(max);
    let mut max_indexes = _mm256_setzero_ps();

    for group in 0..eighth_points {
        let current = M::load256_ps(ptr.add(group * 8));
        current_indexes = _mm256_add_ps(current_indexes, index_increment);

        // Strict greater-than keeps the earliest per-lane occurrence.
        let gt = _mm256_cmp_ps::<_CMP_GT_OS>(current, max_values);
        max_indexes = _mm256_blendv_ps(max_indexes, current_indexes, gt);
        max_values = _mm256_blendv_ps(max_values, current, gt);
    }

    // Reduce the per-lane maxima; smallest index wins on exact equality.
    let mut values = [0.0_f32; 8];
    let mut indexes = [0.0_f32; 8];
    _mm256_storeu_ps(values.as_mut_ptr(), max_values);
    _mm256_storeu_ps(indexes.as_mut_ptr(), max_indexes);
    for lane in 0..8 {
        let lane_index = indexes[lane] as usize;
        if values[lane] > max || (values[lane] == max && lane_index < index) {
            max = values[lane];
            index = lane_index;
        }
    }

    for i in (eighth_points * 8)..n {
        let s = *samples.get_unchecked(i);
        if s > max {
            max = s;
            index = i;
        }
    }
    index as u16
}

#[inline(always)]
unsafe fn index_max_m128<M: Mem>(samples: &[f32]) -> u16 {
    let n = samples.len().min(MAX_INDEX_POINTS);
    let quarter_points = n / 4;
    let ptr = samples.as_ptr();

    let index_increment = _mm_set1_ps(4.0);
    let mut current_indexes = _mm_set_ps(-1.0, -2.0, -3.0, -4.0);

    let mut max = samples[0];
    let mut index = 0_usize;
    let mut max_values = _mm_set1_ps(max);
    let mut max_indexes = _mm_setzero_ps();

    for group in 0..quarter_points {
        let current = M::load_ps(ptr.add(group * 4));
        current_indexes = _mm_add_ps(current_indexes, index_increment);

        let gt = _mm_cmpgt_ps(current, max_values);
        max_indexes = _mm_blendv_ps(max_indexes, current_indexes, gt);
        max_values = _mm_blendv_ps(max_values, current, gt);
    }

    let mut values = [0.0_f32; 4];
    let mut indexes = [0.0_f32; 4];
    _mm_storeu_ps(values.as_mut_ptr(), max_values);
    _mm_storeu_ps(indexes.as_mut_ptr(), max_indexes);
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

/// AVX argmax, aligned loads. Lane group of 8.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx")` and that
/// `samples.as_ptr()` is 32-byte aligned. `samples` must be non-empty.
#[target_feature(enable = "avx")]
pub unsafe fn index_max_avx_aligned(samples: &[f32]) -> u16 {
    debug_assert!(super::is_aligned_to(samples.as_ptr(), 32));
    index_max_m256::<Aligned>(samples)
}

/// AVX argmax, unaligned loads. Lane group of 8.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx")`. `samples` must be
/// non-empty.
#[target_feature(enable = "avx")]
pub unsafe fn index_max_avx_unaligned(samples: &[f32]) -> u16 {
    index_max_m256::<Unaligned>(samples)
}

/// SSE4.1 argmax, aligned loads. Lane group of 4.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("sse4.1")` and that
/// `samples.as_ptr()` is 16-byte aligned. `samples` must be non-empty.
#[target_feature(enable = "sse4.1")]
pub unsafe fn index_max_sse4_1_aligned(samples: &[f32]) -> u16 {
    debug_assert!(super::is_aligned_to(samples.as_ptr(), 16));
    index_max_m128::<Aligned>(samples)
}

/// SSE4.1 argmax, unaligned loads. Lane group of 4.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("sse4.1")`. `samples` must
/// be non-empty.
#[target_feature(enable = "sse4.1")]
pub unsafe fn index_max_sse4_1_unaligned(samples: &[f32]) -> u16 {
    index_max_m128::<Unaligned>(samples)
}

// ---------------------------------------------------------------------------
// Deinterleave and scale
// ---------------------------------------------------------------------------

#[inline(always)]
unsafe fn deinterleave_scale_m256<M: Mem>(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    let n = input.len().min(i_out.len()).min(q_out.len());
    let sixteenth_points = n / 16;

    let inv_scalar = _mm256_set1_ps(1.0 / scalar);
    let mut in_ptr = input.as_ptr() as *const i8;
    let mut i_ptr = i_out.as_mut_ptr();
    let mut q_ptr = q_out.as_mut_ptr();

    // Per 128-bit lane: even bytes (I) into the low half, odd bytes (Q)
    // into the high half.
    #[rustfmt::skip]
    let move_mask = _mm256_setr_epi8(
        0, 2, 4, 6, 8, 10, 12, 14, 1, 3, 5, 7, 9, 11, 13, 15,
        0, 2, 4, 6, 8, 10, 12, 14, 1, 3, 5, 7, 9, 11, 13, 15,
    );

    for _ in 0..sixteenth_points {
        let mut packed = M::load256_si256(in_ptr as *const __m256i);
        in_ptr = in_ptr.add(32);

        packed = _mm256_shuffle_epi8(packed, move_mask);
        // Gather the I halves into lane 0 and the Q halves into lane 1:
        // [i0..i15 | q0..q15] as four 64-bit groups reordered 0,2,1,3.
        packed = _mm256_permute4x64_epi64::<0b11011000>(packed);

        let i_bytes = _mm256_extractf128_si256::<0>(packed);
        let q_bytes = _mm256_extractf128_si256::<1>(packed);

        let i_f = _mm256_cvtepi32_ps(_mm256_cvtepi8_epi32(i_bytes));
        M::store256_ps(i_ptr, _mm256_mul_ps(i_f, inv_scalar));
        i_ptr = i_ptr.add(8);

        let q_f = _mm256_cvtepi32_ps(_mm256_cvtepi8_epi32(q_bytes));
        M::store256_ps(q_ptr, _mm256_mul_ps(q_f, inv_scalar));
        q_ptr = q_ptr.add(8);

        let shifted = _mm256_srli_si256::<8>(packed);
        let i_bytes = _mm256_extractf128_si256::<0>(shifted);
        let q_bytes = _mm256_extractf128_si256::<1>(shifted);

        let i_f = _mm256_cvtepi32_ps(_mm256_cvtepi8_epi32(i_bytes));
        M::store256_ps(i_ptr, _mm256_mul_ps(i_f, inv_scalar));
        i_ptr = i_ptr.add(8);

        let q_f = _mm256_cvtepi32_ps(_mm256_cvtepi8_epi32(q_bytes));
        M::store256_ps(q_ptr, _mm256_mul_ps(q_f, inv_scalar));
        q_ptr = q_ptr.add(8);
    }

    // Scalar remainder with direct division.
    for k in (sixteenth_points * 16)..n {
        let s = *input.get_unchecked(k);
        *i_out.get_unchecked_mut(k) = f32::from(s.re) / scalar;
        *q_out.get_unchecked_mut(k) = f32::from(s.im) / scalar;
    }
}

#[inline(always)]
unsafe fn deinterleave_scale_m128<M: Mem>(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    let n = input.len().min(i_out.len()).min(q_out.len());
    let eighth_points = n / 8;

    let inv_scalar = _mm_set1_ps(1.0 / scalar);
    let mut in_ptr = input.as_ptr() as *const i8;
    let mut i_ptr = i_out.as_mut_ptr();
    let mut q_ptr = q_out.as_mut_ptr();

    // -1 has the shuffle high bit set, zeroing the upper eight bytes.
    let i_mask = _mm_setr_epi8(0, 2, 4, 6, 8, 10, 12, 14, -1, -1, -1, -1, -1, -1, -1, -1);
    let q_mask = _mm_setr_epi8(1, 3, 5, 7, 9, 11, 13, 15, -1, -1, -1, -1, -1, -1, -1, -1);

    for _ in 0..eighth_points {
        let packed = M::load_si128(in_ptr as *const __m128i);
        in_ptr = in_ptr.add(16);

        let i_bytes = _mm_shuffle_epi8(packed, i_mask);
        let q_bytes = _mm_shuffle_epi8(packed, q_mask);

        let i_f = _mm_cvtepi32_ps(_mm_cvtepi8_epi32(i_bytes));
        M::store_ps(i_ptr, _mm_mul_ps(i_f, inv_scalar));
        i_ptr = i_ptr.add(4);

        let i_f = _mm_cvtepi32_ps(_mm_cvtepi8_epi32(_mm_srli_si128::<4>(i_bytes)));
        M::store_ps(i_ptr, _mm_mul_ps(i_f, inv_scalar));
        i_ptr = i_ptr.add(4);

        let q_f = _mm_cvtepi32_ps(_mm_cvtepi8_epi32(q_bytes));
        M::store_ps(q_ptr, _mm_mul_ps(q_f, inv_scalar));
        q_ptr = q_ptr.add(4);

        let q_f = _mm_cvtepi32_ps(_mm_cvtepi8_epi32(_mm_srli_si128::<4>(q_bytes)));
        M::store_ps(q_ptr, _mm_mul_ps(q_f, inv_scalar));
        q_ptr = q_ptr.add(4);
    }

    for k in (eighth_points * 8)..n {
        let s = *input.get_unchecked(k);
        *i_out.get_unchecked_mut(k) = f32::from(s.re) / scalar;
        *q_out.get_unchecked_mut(k) = f32::from(s.im) / scalar;
    }
}

/// AVX2 deinterleave-and-scale, aligned loads and stores. Lane group of 16.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx2")` and that `input`,
/// `i_out` and `q_out` all start 32-byte aligned.
#[target_feature(enable = "avx2")]
pub unsafe fn deinterleave_scale_avx2_aligned(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    debug_assert!(super::is_aligned_to(input.as_ptr(), 32));
    debug_assert!(super::is_aligned_to(i_out.as_ptr(), 32));
    debug_assert!(super::is_aligned_to(q_out.as_ptr(), 32));
    deinterleave_scale_m256::<Aligned>(i_out, q_out, input, scalar)
}

/// AVX2 deinterleave-and-scale, unaligned loads and stores. Lane group of 16.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx2")`.
#[target_feature(enable = "avx2")]
pub unsafe fn deinterleave_scale_avx2_unaligned(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    deinterleave_scale_m256::<Unaligned>(i_out, q_out, input, scalar)
}

/// SSE4.1 deinterleave-and-scale, aligned loads and stores. Lane group of 8.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("sse4.1")` and that `input`,
/// `i_out` and `q_out` all start 16-byte aligned.
#[target_feature(enable = "sse4.1")]
pub unsafe fn deinterleave_scale_sse4_1_aligned(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    debug_assert!(super::is_aligned_to(input.as_ptr(), 16));
    debug_assert!(super::is_aligned_to(i_out.as_ptr(), 16));
    debug_assert!(super::is_aligned_to(q_out.as_ptr(), 16));
    deinterleave_scale_m128::<Aligned>(i_out, q_out, input, scalar)
}

/// SSE4.1 deinterleave-and-scale, unaligned loads and stores. Lane group of 8.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("sse4.1")`.
#[target_feature(enable = "sse4.1")]
pub unsafe fn deinterleave_scale_sse4_1_unaligned(
    i_out: &mut [f32],
    q_out: &mut [f32],
    input: &[Complex<i8>],
    scalar: f32,
) {
    deinterleave_scale_m128::<Unaligned>(i_out, q_out, input, scalar)
}

// ---------------------------------------------------------------------------
// Multiply by conjugate and scale
// ---------------------------------------------------------------------------

#[inline(always)]
unsafe fn multiply_conjugate_scale_m256<M: Mem>(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    let n = out.len().min(a.len()).min(b.len());
    let eighth_points = n / 8;

    let inv_scalar = _mm256_set1_ps(1.0 / scalar);
    // Per complex pair: keep the real component, negate the imaginary one.
    let conjugate_sign = _mm256_setr_epi16(1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1, 1, -1);

    let mut a_ptr = a.as_ptr() as *const __m128i;
    let mut b_ptr = b.as_ptr() as *const __m128i;
    let mut c_ptr = out.as_mut_ptr() as *mut f32;

    for _ in 0..eighth_points {
        // Widen the 8-bit components to 16-bit lanes.
        let x = _mm256_cvtepi8_epi16(M::load_si128(a_ptr));
        let y = _mm256_cvtepi8_epi16(M::load_si128(b_ptr));
        a_ptr = a_ptr.add(1);
        b_ptr = b_ptr.add(1);

        // ar*br + ai*bi: the real part of a*conj(b), in 32-bit lanes.
        let real = _mm256_madd_epi16(x, y);

        // (br, bi) -> (-bi, br), then ar*(-bi) + ai*br: the imaginary part.
        let y = _mm256_sign_epi16(y, conjugate_sign);
        let y = _mm256_shufflehi_epi16::<0b1011_0001>(_mm256_shufflelo_epi16::<0b1011_0001>(y));
        let imag = _mm256_madd_epi16(x, y);

        // Interleave real/imaginary, convert to float, normalize.
        let lo = _mm256_mul_ps(_mm256_cvtepi32_ps(_mm256_unpacklo_epi32(real, imag)), inv_scalar);
        let hi = _mm256_mul_ps(_mm256_cvtepi32_ps(_mm256_unpackhi_epi32(real, imag)), inv_scalar);

        M::store256_ps(c_ptr, _mm256_permute2f128_ps::<0b0010_0000>(lo, hi));
        c_ptr = c_ptr.add(8);
        M::store256_ps(c_ptr, _mm256_permute2f128_ps::<0b0011_0001>(lo, hi));
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

#[inline(always)]
unsafe fn multiply_conjugate_scale_m128<M: Mem>(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    let n = out.len().min(a.len()).min(b.len());
    let quarter_points = n / 4;

    let inv_scalar = _mm_set1_ps(1.0 / scalar);
    let conjugate_sign = _mm_setr_epi16(1, -1, 1, -1, 1, -1, 1, -1);

    let mut a_ptr = a.as_ptr() as *const i8;
    let mut b_ptr = b.as_ptr() as *const i8;
    let mut c_ptr = out.as_mut_ptr() as *mut f32;

    for _ in 0..quarter_points {
        // 64-bit loads have no alignment-qualified form; only the stores
        // differ between the aligned and unaligned entry points.
        let x = _mm_cvtepi8_epi16(_mm_loadl_epi64(a_ptr as *const __m128i));
        let y = _mm_cvtepi8_epi16(_mm_loadl_epi64(b_ptr as *const __m128i));
        a_ptr = a_ptr.add(8);
        b_ptr = b_ptr.add(8);

        let real = _mm_madd_epi16(x, y);

        let y = _mm_sign_epi16(y, conjugate_sign);
        let y = _mm_shufflehi_epi16::<0b1011_0001>(_mm_shufflelo_epi16::<0b1011_0001>(y));
        let imag = _mm_madd_epi16(x, y);

        let lo = _mm_mul_ps(_mm_cvtepi32_ps(_mm_unpacklo_epi32(real, imag)), inv_scalar);
        M::store_ps(c_ptr, lo);
        c_ptr = c_ptr.add(4);

        let hi = _mm_mul_ps(_mm_cvtepi32_ps(_mm_unpackhi_epi32(real, imag)), inv_scalar);
        M::store_ps(c_ptr, hi);
        c_ptr = c_ptr.add(4);
    }

    for k in (quarter_points * 4)..n {
        let xv = *a.get_unchecked(k);
        let yv = *b.get_unchecked(k);
        let x = Complex::new(f32::from(xv.re), f32::from(xv.im));
        let y = Complex::new(f32::from(yv.re), -f32::from(yv.im));
        let t = x * y;
        *out.get_unchecked_mut(k) = Complex::new(t.re / scalar, t.im / scalar);
    }
}

/// AVX2 multiply-conjugate-and-scale, aligned loads and stores. Lane group
/// of 8.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx2")`, that `a` and `b`
/// start 16-byte aligned, and that `out` starts 32-byte aligned.
#[target_feature(enable = "avx2")]
pub unsafe fn multiply_conjugate_scale_avx2_aligned(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    debug_assert!(super::is_aligned_to(a.as_ptr(), 16));
    debug_assert!(super::is_aligned_to(b.as_ptr(), 16));
    debug_assert!(super::is_aligned_to(out.as_ptr(), 32));
    multiply_conjugate_scale_m256::<Aligned>(out, a, b, scalar)
}

/// AVX2 multiply-conjugate-and-scale, unaligned loads and stores. Lane
/// group of 8.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("avx2")`.
#[target_feature(enable = "avx2")]
pub unsafe fn multiply_conjugate_scale_avx2_unaligned(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    multiply_conjugate_scale_m256::<Unaligned>(out, a, b, scalar)
}

/// SSE4.1 multiply-conjugate-and-scale, aligned stores. Lane group of 4.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("sse4.1")` and that `out`
/// starts 16-byte aligned. The 8-bit inputs are read with 64-bit loads,
/// which carry no alignment requirement.
#[target_feature(enable = "sse4.1")]
pub unsafe fn multiply_conjugate_scale_sse4_1_aligned(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    debug_assert!(super::is_aligned_to(out.as_ptr(), 16));
    multiply_conjugate_scale_m128::<Aligned>(out, a, b, scalar)
}

/// SSE4.1 multiply-conjugate-and-scale, unaligned stores. Lane group of 4.
///
/// # Safety
///
/// Caller must verify `is_x86_feature_detected!("sse4.1")`.
#[target_feature(enable = "sse4.1")]
pub unsafe fn multiply_conjugate_scale_sse4_1_unaligned(
    out: &mut [Complex<f32>],
    a: &[Complex<i8>],
    b: &[Complex<i8>],
    scalar: f32,
) {
    multiply_conjugate_scale_m128::<Unaligned>(out, a, b, scalar)
}
