//! Property-based tests for cross-variant kernel equivalence.
//!
//! The dispatched entry points (which pick whatever SIMD variant the host
//! CPU supports) must agree with the portable scalar references for any
//! valid input: exactly for the argmax index, within the documented 1e-5
//! relative tolerance for the float kernels.

use iqkern::{
    deinterleave_scale, deinterleave_scale_scalar, index_max, index_max_scalar,
    multiply_conjugate_scale, multiply_conjugate_scale_scalar,
};
use num_complex::Complex;
use proptest::prelude::*;

/// Real sample buffers with lengths straddling the lane-group boundaries.
fn arb_samples() -> impl Strategy<Value = Vec<f32>> {
    (1usize..200).prop_flat_map(|len| proptest::collection::vec(-1000.0f32..1000.0, len))
}

/// Interleaved 8-bit IQ buffers over the full component range.
fn arb_iq(len: usize) -> impl Strategy<Value = Vec<Complex<i8>>> {
    proptest::collection::vec((any::<i8>(), any::<i8>()), len)
        .prop_map(|v| v.into_iter().map(|(re, im)| Complex::new(re, im)).collect())
}

/// A pair of equal-length IQ buffers.
fn arb_iq_pair() -> impl Strategy<Value = (Vec<Complex<i8>>, Vec<Complex<i8>>)> {
    (0usize..200).prop_flat_map(|len| (arb_iq(len), arb_iq(len)))
}

/// Normalization scalars away from zero.
fn arb_scalar() -> impl Strategy<Value = f32> {
    prop_oneof![0.001f32..1000.0, -1000.0f32..-0.001]
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= a.abs().max(b.abs()) * 1e-5 + 1e-4
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 500,
        ..ProptestConfig::default()
    })]

    /// The dispatched argmax matches the scalar reference exactly.
    #[test]
    fn index_max_matches_scalar(v in arb_samples()) {
        prop_assert_eq!(index_max(&v), index_max_scalar(&v));
    }

    /// Planting a duplicate of the maximum after its first occurrence never
    /// changes the result.
    #[test]
    fn index_max_first_occurrence_wins(v in arb_samples(), extra in 0usize..200) {
        let first = index_max(&v) as usize;
        let mut dup = v.clone();
        let max = dup[first];
        let pos = first + 1 + extra % (dup.len() - first).max(1);
        if pos < dup.len() {
            dup[pos] = max;
            prop_assert_eq!(index_max(&dup) as usize, first);
        }
    }

    /// Dispatched deinterleave matches the scalar reference within tolerance.
    #[test]
    fn deinterleave_matches_scalar(
        (iq, scalar) in (0usize..200).prop_flat_map(|len| (arb_iq(len), arb_scalar()))
    ) {
        let n = iq.len();
        let mut i_ref = vec![0.0_f32; n];
        let mut q_ref = vec![0.0_f32; n];
        deinterleave_scale_scalar(&mut i_ref, &mut q_ref, &iq, scalar);

        let mut i_out = vec![0.0_f32; n];
        let mut q_out = vec![0.0_f32; n];
        deinterleave_scale(&mut i_out, &mut q_out, &iq, scalar);

        for k in 0..n {
            prop_assert!(
                approx_eq(i_out[k], i_ref[k]),
                "I k={}: {} vs {}", k, i_out[k], i_ref[k]
            );
            prop_assert!(
                approx_eq(q_out[k], q_ref[k]),
                "Q k={}: {} vs {}", k, q_out[k], q_ref[k]
            );
        }
    }

    /// Dispatched multiply-conjugate matches the scalar reference within
    /// tolerance, including the +/-128 integer corners.
    #[test]
    fn multiply_conjugate_matches_scalar(
        ((a, b), scalar) in (arb_iq_pair(), arb_scalar())
    ) {
        let n = a.len();
        let mut expected = vec![Complex::new(0.0_f32, 0.0); n];
        multiply_conjugate_scale_scalar(&mut expected, &a, &b, scalar);

        let mut out = vec![Complex::new(0.0_f32, 0.0); n];
        multiply_conjugate_scale(&mut out, &a, &b, scalar);

        for k in 0..n {
            prop_assert!(
                approx_eq(out[k].re, expected[k].re) && approx_eq(out[k].im, expected[k].im),
                "k={}: {} vs {}", k, out[k], expected[k]
            );
        }
    }

    /// Prefix consistency: shortening the buffer only drops tail elements,
    /// it never changes the shared prefix (remainder handling is invisible).
    #[test]
    fn deinterleave_prefix_consistency(
        (iq, scalar, cut) in (1usize..200).prop_flat_map(|len| {
            (arb_iq(len), arb_scalar(), 0usize..len)
        })
    ) {
        let n = iq.len();
        let mut i_full = vec![0.0_f32; n];
        let mut q_full = vec![0.0_f32; n];
        deinterleave_scale(&mut i_full, &mut q_full, &iq, scalar);

        let mut i_cut = vec![0.0_f32; cut];
        let mut q_cut = vec![0.0_f32; cut];
        deinterleave_scale(&mut i_cut, &mut q_cut, &iq[..cut], scalar);

        for k in 0..cut {
            prop_assert!(approx_eq(i_cut[k], i_full[k]), "I k={}", k);
            prop_assert!(approx_eq(q_cut[k], q_full[k]), "Q k={}", k);
        }
    }
}
