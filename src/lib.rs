//! SIMD-accelerated DSP kernels for IQ sample streams.
//!
//! `iqkern` provides the hot inner loops of a software radio receive chain:
//!
//! - **Peak search**: [`index_max`] — index of the first maximum in a real
//!   sample buffer (e.g. locating a correlation peak).
//! - **Format conversion**: [`deinterleave_scale`] — interleaved 8-bit IQ
//!   samples to planar `f32` streams, normalized by a scalar.
//! - **Cross-correlation step**: [`multiply_conjugate_scale`] —
//!   `a[i] * conj(b[i]) / scalar` over two interleaved 8-bit IQ buffers.
//!
//! # SIMD Dispatch
//!
//! Every kernel has one portable scalar reference implementation and several
//! instruction-set variants. The safe entry points dispatch automatically:
//!
//! | Architecture | Instructions | Detection |
//! |--------------|--------------|-----------|
//! | x86_64 | AVX2 / AVX / SSE4.1 | Runtime |
//! | aarch64 | NEON | Always available |
//! | Other | Portable scalar | LLVM auto-vectorizes |
//!
//! All variants of one kernel are observably equivalent: index results match
//! the scalar reference exactly, float results match within a 1e-5 relative
//! tolerance (the vector paths scale by a precomputed reciprocal instead of
//! dividing, which costs at most a couple of ULP).
//!
//! The per-ISA entry points in [`arch`] are public so that callers with their
//! own dispatch layer (or guaranteed-aligned buffers) can select a variant
//! directly. Each x86 variant comes as an `_aligned` / `_unaligned` pair;
//! the aligned forms require every buffer to sit on the vector width's
//! natural boundary and are undefined behavior otherwise.
//!
//! # Example
//!
//! ```rust
//! use iqkern::{index_max, deinterleave_scale};
//! use num_complex::Complex;
//!
//! let power = [0.0_f32, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0, 1.0, 0.0];
//! assert_eq!(index_max(&power), 4);
//!
//! let iq = [Complex::new(10i8, -20), Complex::new(30, -40)];
//! let mut i = [0.0_f32; 2];
//! let mut q = [0.0_f32; 2];
//! deinterleave_scale(&mut i, &mut q, &iq, 10.0);
//! assert_eq!(i, [1.0, 3.0]);
//! assert_eq!(q, [-2.0, -4.0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arch;
mod deinterleave;
mod index_max;
mod multiply_conjugate;

pub use deinterleave::{deinterleave_scale, deinterleave_scale_scalar};
pub use index_max::{index_max, index_max_scalar};
pub use multiply_conjugate::{multiply_conjugate_scale, multiply_conjugate_scale_scalar};

/// Minimum point count for SIMD to be worthwhile.
///
/// Below this threshold, dispatch and reduction overhead outweighs the
/// vectorized inner loop and the scalar reference is used instead.
pub const MIN_POINTS_SIMD: usize = 16;

/// Maximum point count [`index_max`] will process.
///
/// The result index is a `u16`, so inputs longer than this are silently
/// capped before the scan: elements past the cap can never be reported and
/// are never read. This is a saturation policy, not an error.
pub const MAX_INDEX_POINTS: usize = u16::MAX as usize;
