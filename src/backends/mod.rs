//! Backend implementations for different SIMD instruction sets
//!
//! This module contains the actual SIMD implementations for each backend.
//! All backends implement the same trait-based interface to ensure API consistency.
//!
//! # Safety
//!
//! All `unsafe` code is isolated within backend implementations. The public API
//! remains 100% safe.
//!
//! # Backends
//!
//! - `scalar`: Portable baseline implementation (no SIMD)
//! - `sse2`: x86_64 baseline SIMD (128-bit)
//! - `avx2`: x86_64 advanced SIMD (256-bit with FMA)

pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub mod sse2;

#[cfg(target_arch = "x86_64")]
pub mod avx2;

/// Backend trait defining the kernels the loss engine needs
///
/// All backend implementations must implement this trait to ensure
/// consistent behavior across different SIMD instruction sets. Every
/// implementation must be numerically equivalent to the scalar backend
/// within floating-point tolerance.
///
/// # Safety
///
/// Implementations may use unsafe SIMD intrinsics. Callers must ensure:
/// - Input slices are valid
/// - Result slice has sufficient capacity
/// - Slices `a` and `b` have the same length
pub trait KernelBackend {
    /// Element-wise subtraction: a[i] - b[i]
    ///
    /// # Safety
    ///
    /// - `a` and `b` must have the same length
    /// - `result` must have length >= `a.len()`
    unsafe fn sub(a: &[f32], b: &[f32], result: &mut [f32]);

    /// Scalar multiplication: a[i] * scalar
    ///
    /// # Safety
    ///
    /// - `result` must have length >= `a.len()`
    unsafe fn scale(a: &[f32], scalar: f32, result: &mut [f32]);

    /// Dot product: sum(a[i] * b[i])
    ///
    /// # Safety
    ///
    /// - `a` and `b` must have the same length
    unsafe fn dot(a: &[f32], b: &[f32]) -> f32;
}
