use ndarray::{Array2, ArrayView2, Axis};

/// Row-wise normalized exponential.
///
/// Each row of the input is treated as the logits of one sample. The
/// maximum of the row is subtracted before exponentiating so large logits
/// do not overflow.
pub struct Softmax;

impl Softmax {
    pub fn apply_batch(inputs: &mut Array2<f32>) {
        for mut row in inputs.axis_iter_mut(Axis(0)) {
            let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
    }

    /// Vector-Jacobian product of the softmax.
    ///
    /// Given the softmax outputs `p` and the upstream gradient `g` (both
    /// `[batch, classes]`), returns `p ⊙ (g − Σ_j g_j p_j)` per row, the
    /// gradient with respect to the logits.
    pub fn backward_batch(probs: ArrayView2<f32>, output_grad: ArrayView2<f32>) -> Array2<f32> {
        let dot = (&probs * &output_grad).sum_axis(Axis(1)).insert_axis(Axis(1));
        &probs * &(&output_grad - &dot)
    }
}
