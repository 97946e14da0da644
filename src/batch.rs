//! Batch storage for triplet inputs and derived buffers
//!
//! A [`Batch`] holds N examples of D scalars each in row-major `f32` storage,
//! with an attached execution backend selected at creation time. All numeric
//! operations dispatch to the backend kernels; `Auto` resolves to the best
//! detected backend when the batch is constructed.
//!
//! # Example
//!
//! ```
//! use margen::Batch;
//!
//! let b = Batch::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
//! assert_eq!(b.shape(), (2, 3));
//! assert_eq!(b.row(1), &[4.0, 5.0, 6.0]);
//! ```

#[cfg(target_arch = "x86_64")]
use crate::backends::avx2::Avx2Backend;
use crate::backends::scalar::ScalarBackend;
#[cfg(target_arch = "x86_64")]
use crate::backends::sse2::Sse2Backend;
use crate::backends::KernelBackend;
use crate::{Backend, MargenError, Result};

/// A batch of N fixed-length vectors with row-major storage
///
/// Data is stored in row-major format (C-style), where consecutive elements
/// in memory belong to the same example. For a 2x3 batch:
///
/// ```text
/// [[a, b, c],
///  [d, e, f]]
/// ```
/// Data is stored as: [a, b, c, d, e, f]
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
    backend: Backend,
}

/// Allocate a zeroed buffer, surfacing allocator failure instead of aborting
fn alloc_zeroed(count: usize) -> Result<Vec<f32>> {
    let mut data = Vec::new();
    data.try_reserve_exact(count)
        .map_err(|e| MargenError::AllocationFailure(e.to_string()))?;
    data.resize(count, 0.0);
    Ok(data)
}

fn element_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or_else(|| {
        MargenError::AllocationFailure(format!("element count overflow: {rows}x{cols}"))
    })
}

impl Batch {
    /// Creates a zero-filled batch using the auto-selected optimal backend
    ///
    /// # Errors
    ///
    /// Returns [`MargenError::AllocationFailure`] if the buffer cannot be
    /// allocated or `rows * cols` overflows.
    ///
    /// # Example
    ///
    /// ```
    /// use margen::Batch;
    ///
    /// let b = Batch::zeros(4, 16).unwrap();
    /// assert_eq!(b.shape(), (4, 16));
    /// assert!(b.as_slice().iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(rows: usize, cols: usize) -> Result<Self> {
        Self::zeros_with_backend(rows, cols, Backend::select_best())
    }

    /// Creates a zero-filled batch with a specific backend
    pub fn zeros_with_backend(rows: usize, cols: usize, backend: Backend) -> Result<Self> {
        let count = element_count(rows, cols)?;
        Ok(Batch {
            rows,
            cols,
            data: alloc_zeroed(count)?,
            backend: resolve(backend),
        })
    }

    /// Creates a batch from a vector of data in row-major order
    ///
    /// # Errors
    ///
    /// Returns [`MargenError::InvalidInput`] if `data.len() != rows * cols`.
    ///
    /// # Example
    ///
    /// ```
    /// use margen::Batch;
    ///
    /// let b = Batch::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(b.row(0), &[1.0, 2.0]);
    /// assert_eq!(b.row(1), &[3.0, 4.0]);
    /// ```
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        let count = element_count(rows, cols)?;
        if data.len() != count {
            return Err(MargenError::InvalidInput(format!(
                "Data length {} does not match batch dimensions {}x{} (expected {})",
                data.len(),
                rows,
                cols,
                count
            )));
        }
        Ok(Batch {
            rows,
            cols,
            data,
            backend: Backend::select_best(),
        })
    }

    /// Creates a batch from a slice by copying the data
    pub fn from_slice(rows: usize, cols: usize, data: &[f32]) -> Result<Self> {
        Self::from_vec(rows, cols, data.to_vec())
    }

    /// Returns the batch with a specific backend (for benchmarking or testing)
    ///
    /// `Auto` resolves to the best detected backend.
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = resolve(backend);
        self
    }

    /// Number of examples (N)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Per-example vector size (D)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// The backend this batch dispatches to
    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Underlying data as a row-major slice
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Row `i` as a slice of length `cols`
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[f32] {
        assert!(i < self.rows, "row index {} out of range {}", i, self.rows);
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub(crate) fn row_mut(&mut self, i: usize) -> &mut [f32] {
        debug_assert!(i < self.rows);
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Element-wise subtraction: `self[i] - other[i]`
    ///
    /// # Errors
    ///
    /// Returns [`MargenError::ShapeMismatch`] if shapes differ,
    /// [`MargenError::AllocationFailure`] if the output cannot be allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use margen::Batch;
    ///
    /// let a = Batch::from_vec(1, 3, vec![5.0, 7.0, 9.0]).unwrap();
    /// let b = Batch::from_vec(1, 3, vec![1.0, 2.0, 3.0]).unwrap();
    /// let c = a.sub(&b).unwrap();
    /// assert_eq!(c.as_slice(), &[4.0, 5.0, 6.0]);
    /// ```
    pub fn sub(&self, other: &Batch) -> Result<Batch> {
        if self.shape() != other.shape() {
            return Err(MargenError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }

        let mut result = alloc_zeroed(self.data.len())?;

        // Dispatch to appropriate backend
        unsafe {
            match self.backend {
                Backend::Scalar => {
                    ScalarBackend::sub(&self.data, &other.data, &mut result);
                }
                #[cfg(target_arch = "x86_64")]
                Backend::SSE2 => {
                    Sse2Backend::sub(&self.data, &other.data, &mut result);
                }
                #[cfg(target_arch = "x86_64")]
                Backend::AVX2 => {
                    Avx2Backend::sub(&self.data, &other.data, &mut result);
                }
                #[cfg(not(target_arch = "x86_64"))]
                Backend::SSE2 | Backend::AVX2 => {
                    // Fallback to scalar on non-x86_64
                    ScalarBackend::sub(&self.data, &other.data, &mut result);
                }
                Backend::Auto => {
                    // Auto is resolved at construction; conservative fallback
                    ScalarBackend::sub(&self.data, &other.data, &mut result);
                }
            }
        }

        Ok(Batch {
            rows: self.rows,
            cols: self.cols,
            data: result,
            backend: self.backend,
        })
    }

    /// Scalar multiplication: `self[i] * scalar`
    ///
    /// # Errors
    ///
    /// Returns [`MargenError::AllocationFailure`] if the output cannot be
    /// allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use margen::Batch;
    ///
    /// let a = Batch::from_vec(1, 3, vec![1.0, -2.0, 3.0]).unwrap();
    /// let b = a.scaled(2.0).unwrap();
    /// assert_eq!(b.as_slice(), &[2.0, -4.0, 6.0]);
    /// ```
    pub fn scaled(&self, scalar: f32) -> Result<Batch> {
        let mut result = alloc_zeroed(self.data.len())?;

        // Dispatch to appropriate backend
        unsafe {
            match self.backend {
                Backend::Scalar => {
                    ScalarBackend::scale(&self.data, scalar, &mut result);
                }
                #[cfg(target_arch = "x86_64")]
                Backend::SSE2 => {
                    Sse2Backend::scale(&self.data, scalar, &mut result);
                }
                #[cfg(target_arch = "x86_64")]
                Backend::AVX2 => {
                    Avx2Backend::scale(&self.data, scalar, &mut result);
                }
                #[cfg(not(target_arch = "x86_64"))]
                Backend::SSE2 | Backend::AVX2 => {
                    ScalarBackend::scale(&self.data, scalar, &mut result);
                }
                Backend::Auto => {
                    ScalarBackend::scale(&self.data, scalar, &mut result);
                }
            }
        }

        Ok(Batch {
            rows: self.rows,
            cols: self.cols,
            data: result,
            backend: self.backend,
        })
    }

    /// Squared L2 norm of row `i`: the self dot-product of the row
    ///
    /// # Panics
    ///
    /// Panics if `i >= rows`.
    ///
    /// # Example
    ///
    /// ```
    /// use margen::Batch;
    ///
    /// let b = Batch::from_vec(2, 2, vec![3.0, 4.0, 1.0, 0.0]).unwrap();
    /// assert_eq!(b.squared_norm(0), 25.0);
    /// assert_eq!(b.squared_norm(1), 1.0);
    /// ```
    pub fn squared_norm(&self, i: usize) -> f32 {
        let row = self.row(i);

        // Dispatch to appropriate backend
        unsafe {
            match self.backend {
                Backend::Scalar => ScalarBackend::dot(row, row),
                #[cfg(target_arch = "x86_64")]
                Backend::SSE2 => Sse2Backend::dot(row, row),
                #[cfg(target_arch = "x86_64")]
                Backend::AVX2 => Avx2Backend::dot(row, row),
                #[cfg(not(target_arch = "x86_64"))]
                Backend::SSE2 | Backend::AVX2 => ScalarBackend::dot(row, row),
                Backend::Auto => ScalarBackend::dot(row, row),
            }
        }
    }
}

fn resolve(backend: Backend) -> Backend {
    match backend {
        Backend::Auto => Backend::select_best(),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_rejects_length_mismatch() {
        let err = Batch::from_vec(2, 2, vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, MargenError::InvalidInput(_)));
    }

    #[test]
    fn test_zeros_shape_and_content() {
        let b = Batch::zeros(3, 5).unwrap();
        assert_eq!(b.shape(), (3, 5));
        assert_eq!(b.as_slice().len(), 15);
        assert!(b.as_slice().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_sub_shape_mismatch() {
        let a = Batch::zeros(2, 3).unwrap();
        let b = Batch::zeros(2, 4).unwrap();
        let err = a.sub(&b).unwrap_err();
        assert_eq!(
            err,
            MargenError::ShapeMismatch {
                left: (2, 3),
                right: (2, 4),
            }
        );
    }

    #[test]
    fn test_sub_and_scale_roundtrip() {
        let a = Batch::from_vec(2, 2, vec![4.0, 6.0, 8.0, 10.0]).unwrap();
        let b = Batch::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let diff = a.sub(&b).unwrap();
        assert_eq!(diff.as_slice(), &[3.0, 4.0, 5.0, 6.0]);
        let scaled = diff.scaled(-1.0).unwrap();
        assert_eq!(scaled.as_slice(), &[-3.0, -4.0, -5.0, -6.0]);
    }

    #[test]
    fn test_squared_norm_per_row() {
        let b = Batch::from_vec(2, 3, vec![1.0, 2.0, 2.0, 0.0, -3.0, 4.0]).unwrap();
        assert_eq!(b.squared_norm(0), 9.0);
        assert_eq!(b.squared_norm(1), 25.0);
    }

    #[test]
    fn test_with_backend_resolves_auto() {
        let b = Batch::zeros(1, 1).unwrap().with_backend(Backend::Auto);
        assert_ne!(b.backend(), Backend::Auto);
    }

    #[test]
    fn test_forced_scalar_matches_auto_backend() {
        let data: Vec<f32> = (0..64).map(|i| (i as f32) * 0.25 - 8.0).collect();
        let auto = Batch::from_vec(4, 16, data.clone()).unwrap();
        let scalar = Batch::from_vec(4, 16, data).unwrap().with_backend(Backend::Scalar);

        for i in 0..4 {
            let a = auto.squared_norm(i);
            let s = scalar.squared_norm(i);
            assert!((a - s).abs() < 1e-3, "row {i}: {a} vs {s}");
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_row_out_of_range_panics() {
        let b = Batch::zeros(2, 2).unwrap();
        let _ = b.row(2);
    }
}
