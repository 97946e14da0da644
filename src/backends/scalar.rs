//! Scalar (non-SIMD) backend implementation
//!
//! This is the portable baseline implementation that works on all platforms.
//! It uses simple loops without any SIMD instructions.
//!
//! # Performance
//!
//! This backend provides correctness reference but no SIMD acceleration.
//! Expected to be 4-8x slower than SIMD backends on vectors with 1K+ elements.

use super::KernelBackend;

/// Scalar backend (portable, no SIMD)
pub struct ScalarBackend;

impl KernelBackend for ScalarBackend {
    // SAFETY: This function is safe because:
    // 1. All slice accesses are bounds-checked by Rust iterator/indexing
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match KernelBackend trait interface
    unsafe fn sub(a: &[f32], b: &[f32], result: &mut [f32]) {
        for i in 0..a.len() {
            result[i] = a[i] - b[i];
        }
    }

    // SAFETY: This function is safe because:
    // 1. All slice accesses are bounds-checked by Rust iterator/indexing
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match KernelBackend trait interface
    unsafe fn scale(a: &[f32], scalar: f32, result: &mut [f32]) {
        for i in 0..a.len() {
            result[i] = a[i] * scalar;
        }
    }

    // SAFETY: This function is safe because:
    // 1. All slice accesses are bounds-checked by Rust iterator/indexing
    // 2. No raw pointer arithmetic is performed
    // 3. Marked unsafe only to match KernelBackend trait interface
    unsafe fn dot(a: &[f32], b: &[f32]) -> f32 {
        let mut sum = 0.0;
        for i in 0..a.len() {
            sum += a[i] * b[i];
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub() {
        let a = [5.0, 7.0, 9.0, 11.0, 13.0];
        let b = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut result = [0.0; 5];
        unsafe { ScalarBackend::sub(&a, &b, &mut result) };
        assert_eq!(result, [4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_scale() {
        let a = [1.0, -2.0, 3.0];
        let mut result = [0.0; 3];
        unsafe { ScalarBackend::scale(&a, -0.5, &mut result) };
        assert_eq!(result, [-0.5, 1.0, -1.5]);
    }

    #[test]
    fn test_dot() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let dot = unsafe { ScalarBackend::dot(&a, &b) };
        assert_eq!(dot, 32.0); // 1*4 + 2*5 + 3*6
    }

    #[test]
    fn test_dot_empty() {
        let dot = unsafe { ScalarBackend::dot(&[], &[]) };
        assert_eq!(dot, 0.0);
    }
}
