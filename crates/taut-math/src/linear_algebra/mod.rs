//! Linear algebra utilities.
//!
//! Dense solves used by segment calibration. Calibrating one spline
//! segment means solving a small square system (one row per continuity or
//! constraint condition), or a constrained least-squares system when the
//! segment carries a best-fit weighting on top of its hard conditions.
//!
//! All solves are deterministic and report [`MathError::SingularMatrix`]
//! instead of returning NaN.

use crate::error::{MathError, MathResult};
use nalgebra::{DMatrix, DVector};

/// Pivot magnitude below which a system is treated as singular.
const PIVOT_TOLERANCE: f64 = 1e-15;

/// Performs LU decomposition of a square matrix.
///
/// Returns matrices L and U such that A = L * U, where L is unit lower
/// triangular and U is upper triangular.
pub fn lu_decomposition(matrix: &DMatrix<f64>) -> MathResult<(DMatrix<f64>, DMatrix<f64>)> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(MathError::invalid_input(
            "Matrix must be square for LU decomposition",
        ));
    }

    let mut l = DMatrix::identity(n, n);
    let mut u = matrix.clone();

    for k in 0..n {
        if u[(k, k)].abs() < PIVOT_TOLERANCE {
            return Err(MathError::SingularMatrix);
        }

        for i in k + 1..n {
            let factor = u[(i, k)] / u[(k, k)];
            l[(i, k)] = factor;

            for j in k..n {
                u[(i, j)] -= factor * u[(k, j)];
            }
        }
    }

    Ok((l, u))
}

/// Solves a square linear system Ax = b.
///
/// Uses Gaussian elimination with partial pivoting, so row ordering of the
/// assembled calibration conditions does not affect solvability.
///
/// # Errors
///
/// Returns [`MathError::SingularMatrix`] when a pivot collapses below
/// tolerance, and [`MathError::DimensionMismatch`] when `b` does not match.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(MathError::invalid_input("Matrix must be square"));
    }
    if n != b.len() {
        return Err(MathError::DimensionMismatch {
            rows1: n,
            cols1: n,
            rows2: b.len(),
            cols2: 1,
        });
    }

    // Augmented matrix [A | b]
    let mut aug = DMatrix::zeros(n, n + 1);
    aug.view_mut((0, 0), (n, n)).copy_from(a);
    aug.view_mut((0, n), (n, 1)).copy_from(b);

    // Forward elimination with partial pivoting
    for k in 0..n {
        let mut max_row = k;
        for i in k + 1..n {
            if aug[(i, k)].abs() > aug[(max_row, k)].abs() {
                max_row = i;
            }
        }
        if max_row != k {
            aug.swap_rows(k, max_row);
        }

        if aug[(k, k)].abs() < PIVOT_TOLERANCE {
            log::debug!("pivot {k} collapsed to {:.2e}; system is singular", aug[(k, k)]);
            return Err(MathError::SingularMatrix);
        }

        for i in k + 1..n {
            let factor = aug[(i, k)] / aug[(k, k)];
            for j in k..=n {
                aug[(i, j)] -= factor * aug[(k, j)];
            }
        }
    }

    // Back substitution
    let mut x = DVector::zeros(n);
    for i in (0..n).rev() {
        let mut sum = aug[(i, n)];
        for j in i + 1..n {
            sum -= aug[(i, j)] * x[j];
        }
        x[i] = sum / aug[(i, i)];
    }

    Ok(x)
}

/// Solves a weighted least-squares problem subject to hard equality
/// constraints.
///
/// Minimizes `||W^(1/2) (A x - y)||^2` subject to `C x = d`, where `W` is
/// the diagonal of `weights`. The solution is obtained from the bordered
/// (KKT) system
///
/// ```text
/// | 2 A^T W A   C^T | | x |   | 2 A^T W y |
/// |     C        0  | | λ | = |     d     |
/// ```
///
/// which stays square for any mix of hard conditions and residual rows.
/// This is the solve behind best-fit segment calibration: continuity
/// conditions inherited from the previous segment enter as hard rows in
/// `C`, observed responses enter as weighted residual rows in `A`.
///
/// # Errors
///
/// Returns [`MathError::DimensionMismatch`] on inconsistent shapes,
/// [`MathError::InvalidInput`] on non-positive weights, and
/// [`MathError::SingularMatrix`] when the combined system is
/// under-determined or inconsistent.
pub fn solve_constrained_least_squares(
    a: &DMatrix<f64>,
    y: &DVector<f64>,
    weights: &[f64],
    c: &DMatrix<f64>,
    d: &DVector<f64>,
) -> MathResult<DVector<f64>> {
    let n = a.ncols();
    let m = a.nrows();
    let k = c.nrows();

    if m != y.len() || m != weights.len() {
        return Err(MathError::DimensionMismatch {
            rows1: m,
            cols1: n,
            rows2: y.len(),
            cols2: 1,
        });
    }
    if c.ncols() != n || k != d.len() {
        return Err(MathError::DimensionMismatch {
            rows1: k,
            cols1: c.ncols(),
            rows2: d.len(),
            cols2: 1,
        });
    }
    if m == 0 && k == 0 {
        return Err(MathError::insufficient_data(1, 0));
    }
    if weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
        return Err(MathError::invalid_input(
            "Least-squares weights must be finite and positive",
        ));
    }

    // Normal-equation blocks: 2 A^T W A and 2 A^T W y
    let mut ata = DMatrix::zeros(n, n);
    let mut aty = DVector::zeros(n);
    for row in 0..m {
        let w2 = 2.0 * weights[row];
        for i in 0..n {
            aty[i] += w2 * a[(row, i)] * y[row];
            for j in 0..n {
                ata[(i, j)] += w2 * a[(row, i)] * a[(row, j)];
            }
        }
    }

    // Bordered system over (x, λ)
    let dim = n + k;
    let mut kkt = DMatrix::zeros(dim, dim);
    let mut rhs = DVector::zeros(dim);
    kkt.view_mut((0, 0), (n, n)).copy_from(&ata);
    kkt.view_mut((0, n), (n, k)).copy_from(&c.transpose());
    kkt.view_mut((n, 0), (k, n)).copy_from(c);
    rhs.rows_mut(0, n).copy_from(&aty);
    rhs.rows_mut(n, k).copy_from(d);

    let solution = solve_linear_system(&kkt, &rhs)?;
    Ok(solution.rows(0, n).into_owned())
}
