//! Architecture-specific kernel variants.
//!
//! Each variant is an `unsafe fn` with a documented `# Safety` contract:
//! the required CPU features, and for the `_aligned` forms the required
//! buffer alignment. The safe entry points at the crate root perform the
//! feature detection and alignment checks; callers with their own dispatch
//! layer can select a variant here directly.

#[cfg(target_arch = "aarch64")]
pub mod aarch64;

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

/// Whether `ptr` sits on an `align`-byte boundary.
///
/// The `_aligned` kernel variants require this to hold for every buffer,
/// at the instruction set's natural vector width (16 bytes for 128-bit
/// lanes, 32 bytes for 256-bit lanes). Since every vector load and store
/// advances by a whole lane group, a buffer that starts aligned stays
/// aligned for the entire pass.
#[inline]
#[must_use]
pub fn is_aligned_to<T>(ptr: *const T, align: usize) -> bool {
    ptr as usize % align == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_predicate() {
        let v = [0.0_f32; 16];
        let p = v.as_ptr();
        assert!(is_aligned_to(p, 4));
        assert!(!is_aligned_to(unsafe { (p as *const u8).add(1) }, 4));
    }
}
