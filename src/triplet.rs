//! Triplet ranking loss: forward and backward passes
//!
//! Given three batches of identical shape (N, D) - anchor, positive,
//! negative - the forward pass computes
//!
//! ```text
//! d1_i  = ||anchor_i - positive_i||^2
//! d2_i  = ||anchor_i - negative_i||^2
//! loss  = weight * mean_i(max(alpha + d1_i - d2_i, 0)) / 2
//! ```
//!
//! and the backward pass distributes gradients to all three inputs, zeroing
//! rows whose hinge value was clipped (the triplet already satisfies the
//! margin, so it contributes no gradient).
//!
//! The boundary case matters: a row whose hinge value lands exactly at zero
//! is treated as inactive. Changing this to `>=` changes which borderline
//! rows receive gradient, so it is preserved as-is.
//!
//! # Example
//!
//! ```
//! use margen::{Batch, TripletLoss};
//!
//! let anchor = Batch::from_vec(1, 2, vec![0.0, 0.0]).unwrap();
//! let positive = Batch::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
//! let negative = Batch::from_vec(1, 2, vec![0.0, 1.0]).unwrap();
//!
//! let loss = TripletLoss::new(0.5);
//! let (value, pass) = loss.forward(&anchor, &positive, &negative).unwrap();
//! assert!((value - 0.25).abs() < 1e-6);
//! assert_eq!(pass.active(), &[true]);
//! ```

use crate::{Batch, MargenError, Result};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Margin-based triplet ranking loss engine
///
/// Carries the two configuration-time scalars: the margin `alpha` and the
/// external loss weight. Both are opaque; negative margins are legal and
/// simply make the hinge easier to satisfy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripletLoss {
    margin: f32,
    weight: f32,
}

/// Immutable context produced by [`TripletLoss::forward`]
///
/// Holds the cached difference batches, the per-example activity mask, and
/// the per-example clipped hinge values. [`TripletLoss::backward`] consumes
/// it by reference; the value stays valid until dropped, so the
/// forward→backward data dependency is explicit in the interface.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    pos_diff: Batch,
    neg_diff: Batch,
    active: Vec<bool>,
    clipped: Vec<f32>,
}

/// Gradients for the three triplet inputs, shaped like the inputs
#[derive(Debug, Clone)]
pub struct TripletGradients {
    /// d(loss)/d(anchor)
    pub anchor: Batch,
    /// d(loss)/d(positive)
    pub positive: Batch,
    /// d(loss)/d(negative)
    pub negative: Batch,
}

impl ForwardPass {
    /// Cached anchor - positive difference batch
    pub fn pos_diff(&self) -> &Batch {
        &self.pos_diff
    }

    /// Cached anchor - negative difference batch
    pub fn neg_diff(&self) -> &Batch {
        &self.neg_diff
    }

    /// Per-example activity mask: true iff the example contributes gradient
    pub fn active(&self) -> &[bool] {
        &self.active
    }

    /// Per-example clipped hinge values (useful for monitoring which
    /// triplets are still violating the margin)
    pub fn clipped(&self) -> &[f32] {
        &self.clipped
    }

    /// Shape (N, D) of the inputs this pass was computed from
    pub fn shape(&self) -> (usize, usize) {
        self.pos_diff.shape()
    }
}

/// Verifies the three input batches are conformant and non-degenerate
///
/// Returns the common (rows, cols) shape on success. No side effects; called
/// before any output buffer is written, so a failed call leaves nothing
/// partially updated.
///
/// # Errors
///
/// - [`MargenError::ShapeMismatch`] if any pair of batches differs in shape
/// - [`MargenError::DegenerateBatch`] if N = 0 or D = 0
pub fn validate(anchor: &Batch, positive: &Batch, negative: &Batch) -> Result<(usize, usize)> {
    if anchor.shape() != positive.shape() {
        return Err(MargenError::ShapeMismatch {
            left: anchor.shape(),
            right: positive.shape(),
        });
    }
    if positive.shape() != negative.shape() {
        return Err(MargenError::ShapeMismatch {
            left: positive.shape(),
            right: negative.shape(),
        });
    }
    let (rows, cols) = anchor.shape();
    if rows == 0 || cols == 0 {
        return Err(MargenError::DegenerateBatch { rows, cols });
    }
    Ok((rows, cols))
}

impl TripletLoss {
    /// Creates an engine with the given margin and weight 1.0
    pub fn new(margin: f32) -> Self {
        Self {
            margin,
            weight: 1.0,
        }
    }

    /// Creates an engine with the given margin and external loss weight
    ///
    /// The weight scales the scalar loss and the backward scale factor. The
    /// loss is linear in it: `with_weight(m, w)` produces exactly `w` times
    /// the loss of `with_weight(m, 1.0)`.
    pub fn with_weight(margin: f32, weight: f32) -> Self {
        Self { margin, weight }
    }

    /// The configured margin (alpha)
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// The configured external loss weight
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Forward pass: scalar loss plus the context the backward pass needs
    ///
    /// For each example i, with `d1 = ||anchor_i - positive_i||^2` and
    /// `d2 = ||anchor_i - negative_i||^2`:
    ///
    /// - `hinge_i = alpha + d1 - d2`, `clipped_i = max(hinge_i, 0)`
    /// - `active[i]` is true iff `clipped_i` is strictly positive; a hinge
    ///   value of exactly zero is inactive
    /// - `loss = weight * (sum_i clipped_i / N) / 2`
    ///
    /// # Errors
    ///
    /// Shape and degeneracy failures are raised before any buffer is
    /// written; [`MargenError::AllocationFailure`] if an output buffer
    /// cannot be allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use margen::{Batch, TripletLoss};
    ///
    /// let a = Batch::from_vec(1, 2, vec![1.0, 1.0]).unwrap();
    /// // All three inputs identical: loss = max(alpha, 0) / 2
    /// let (value, _) = TripletLoss::new(0.8).forward(&a, &a, &a).unwrap();
    /// assert!((value - 0.4).abs() < 1e-6);
    /// ```
    #[cfg_attr(
        feature = "tracing",
        instrument(
            skip(self, anchor, positive, negative),
            fields(rows = anchor.rows(), cols = anchor.cols())
        )
    )]
    pub fn forward(
        &self,
        anchor: &Batch,
        positive: &Batch,
        negative: &Batch,
    ) -> Result<(f32, ForwardPass)> {
        let (rows, _cols) = validate(anchor, positive, negative)?;

        let pos_diff = anchor.sub(positive)?;
        let neg_diff = anchor.sub(negative)?;

        let mut active = Vec::new();
        active
            .try_reserve_exact(rows)
            .map_err(|e| MargenError::AllocationFailure(e.to_string()))?;
        let mut clipped = Vec::new();
        clipped
            .try_reserve_exact(rows)
            .map_err(|e| MargenError::AllocationFailure(e.to_string()))?;

        let mut total = 0.0f32;
        for i in 0..rows {
            let d1 = pos_diff.squared_norm(i);
            let d2 = neg_diff.squared_norm(i);
            let hinge = self.margin + d1 - d2;
            let value = if hinge > 0.0 { hinge } else { 0.0 };
            active.push(hinge > 0.0);
            clipped.push(value);
            total += value;
        }

        let loss = self.weight * (total / rows as f32) / 2.0;
        Ok((
            loss,
            ForwardPass {
                pos_diff,
                neg_diff,
                active,
                clipped,
            },
        ))
    }

    /// Backward pass: gradients for anchor, positive, and negative
    ///
    /// With `scale = weight * upstream / N`:
    ///
    /// - `grad_anchor_i   =  scale * (pos_diff_i - neg_diff_i)`
    /// - `grad_positive_i = -scale * pos_diff_i`
    /// - `grad_negative_i =  scale * neg_diff_i`
    ///
    /// Rows whose example was inactive in the forward pass are overwritten
    /// with zeros in all three outputs. `upstream` is the gradient flowing
    /// into the scalar loss; pass 1.0 when the loss is used standalone.
    ///
    /// # Errors
    ///
    /// [`MargenError::AllocationFailure`] if a gradient buffer cannot be
    /// allocated.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            skip(self, pass),
            fields(rows = pass.shape().0, cols = pass.shape().1)
        )
    )]
    pub fn backward(&self, pass: &ForwardPass, upstream: f32) -> Result<TripletGradients> {
        let (rows, _cols) = pass.shape();
        let scale = self.weight * upstream / rows as f32;

        let mut anchor = pass.pos_diff.sub(&pass.neg_diff)?.scaled(scale)?;
        let mut positive = pass.pos_diff.scaled(-scale)?;
        let mut negative = pass.neg_diff.scaled(scale)?;

        for i in 0..rows {
            if !pass.active[i] {
                anchor.row_mut(i).fill(0.0);
                positive.row_mut(i).fill(0.0);
                negative.row_mut(i).fill(0.0);
            }
        }

        Ok(TripletGradients {
            anchor,
            positive,
            negative,
        })
    }
}
