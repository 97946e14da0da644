//! Margen: Margin-Based Triplet Ranking Loss Kernels
//!
//! **Margen** (Spanish: "margin") computes the triplet ranking loss used to
//! train embedding models, with runtime-dispatched CPU SIMD kernels:
//!
//! 1. **Forward** - per-example squared distances, margin hinge, scalar loss
//! 2. **Backward** - per-input gradients with inactive-row gating
//!
//! # Design Principles
//!
//! - **Write once, optimize everywhere**: Single algorithm, multiple backends
//! - **Runtime dispatch**: Auto-select best implementation based on CPU features
//! - **Zero unsafe in public API**: Safety via type system, `unsafe` isolated in backends
//! - **Explicit data flow**: `forward()` returns an immutable [`ForwardPass`]
//!   context that `backward()` consumes, so the forward→backward dependency
//!   is visible in the interface rather than hidden in instance state
//!
//! # Quick Start
//!
//! ```rust
//! use margen::{Batch, TripletLoss};
//!
//! let anchor = Batch::from_vec(1, 2, vec![0.0, 0.0]).unwrap();
//! let positive = Batch::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
//! let negative = Batch::from_vec(1, 2, vec![0.0, 1.0]).unwrap();
//!
//! let loss = TripletLoss::new(0.5);
//! let (value, pass) = loss.forward(&anchor, &positive, &negative).unwrap();
//! assert!((value - 0.25).abs() < 1e-6);
//!
//! let grads = loss.backward(&pass, 1.0).unwrap();
//! assert_eq!(grads.anchor.as_slice(), &[-1.0, 1.0]);
//! ```

pub mod backends;
pub mod batch;
pub mod error;
pub mod triplet;

pub use batch::Batch;
pub use error::{MargenError, Result};
pub use triplet::{ForwardPass, TripletGradients, TripletLoss};

/// Backend execution target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Scalar fallback (no SIMD)
    Scalar,
    /// SSE2 (x86_64 baseline, 128-bit)
    SSE2,
    /// AVX2 (256-bit with FMA)
    AVX2,
    /// Auto-select best available
    Auto,
}

impl Backend {
    /// Select the best available backend for the current platform
    ///
    /// This is a convenience wrapper around `select_best_available_backend()`
    pub fn select_best() -> Self {
        select_best_available_backend()
    }
}

/// Detect best SIMD backend for x86/x86_64 platforms
#[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
fn detect_x86_backend() -> Backend {
    if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
        return Backend::AVX2;
    }
    if is_x86_feature_detected!("sse2") {
        return Backend::SSE2;
    }
    Backend::Scalar
}

/// Select the best available backend for the current platform
///
/// This function performs runtime CPU feature detection and selects the most
/// optimized backend available. The selection follows this priority:
///
/// **x86/x86_64**:
/// 1. AVX2 (if `avx2` and `fma` features detected)
/// 2. SSE2 (baseline for x86_64)
/// 3. Scalar (fallback)
///
/// **Other platforms**: Scalar
///
/// # Examples
///
/// ```
/// use margen::select_best_available_backend;
///
/// let backend = select_best_available_backend();
/// println!("Selected backend: {backend:?}");
/// ```
pub fn select_best_available_backend() -> Backend {
    #[cfg(any(target_arch = "x86_64", target_arch = "x86"))]
    {
        detect_x86_backend()
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "x86")))]
    {
        Backend::Scalar
    }
}
