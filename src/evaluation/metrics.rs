//! Difference metrics between signal matrices.

use crate::common::error::ShapeMismatch;
use crate::matrix::domain::Matrix;

/// Unnormalised L2 difference: `sqrt(sum((truth - test)^2))` over all
/// elements. Shapes must match exactly.
///
/// The sum is kept as `scale^2 * ssq` so large finite inputs cannot overflow
/// to infinity. A norm beyond `f64::MAX` saturates to `f64::MAX`.
pub fn evaluate_l2(truth: &Matrix, test: &Matrix) -> Result<f64, ShapeMismatch> {
    if truth.shape() != test.shape() {
        return Err(ShapeMismatch {
            truth: truth.shape(),
            test: test.shape(),
        });
    }

    let mut scale = 0.0_f64;
    let mut ssq = 1.0_f64;
    for (a, b) in truth.values().iter().zip(test.values()) {
        // Halved operands keep the difference finite for any finite pair.
        let d = (a * 0.5 - b * 0.5).abs();
        if d == 0.0 {
            continue;
        }
        if scale < d {
            let r = scale / d;
            ssq = 1.0 + ssq * r * r;
            scale = d;
        } else {
            let r = d / scale;
            ssq += r * r;
        }
    }
    if scale == 0.0 {
        return Ok(0.0);
    }
    Ok((2.0 * scale * ssq.sqrt()).min(f64::MAX))
}
