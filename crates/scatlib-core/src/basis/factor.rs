//! Generalized-SVD biorthogonalization of two Gram matrices.
//!
//! Given the Gram matrices \( G_x \) and \( G_y \) of the incident and
//! scattered field families, this computes coefficient matrices \( \Psi \)
//! and \( \Phi \) such that the combinations
//! \( \hat{x}_k = \sum_j \Psi_{jk} x_j \) and
//! \( \hat{y}_k = \sum_j \Phi_{jk} y_j \) are orthonormal within each family:
//! \( \Psi^H G_x \Psi = I \) and \( \Phi^H G_y \Phi = I \).
//!
//! The construction whitens \( G_x = U S V^H \) with
//! \( W = (\sqrt{S})^+ \), forms the coupling matrix
//! \( R = W_L V^H G_y U W_R = U_r S_r V_r^H \), and sets
//! \( \Psi = U W_R U_r \), \( \Phi = \Psi (\sqrt{S_r})^{-1} \). Truncation to
//! `f_count` modes keeps the leading rows/columns of the whitening matrix.

use faer::complex_native::c64;
use faer::Mat;
use ndarray::Array2;
use num_complex::Complex64;

pub(crate) struct Biorthogonal {
    /// Incident-side coefficients, `n x f_count`.
    pub psi: Array2<Complex64>,
    /// Scattered-side coefficients, `n x f_count`.
    pub phi: Array2<Complex64>,
    /// `sqrt` of the coupling singular values, `f_count` entries.
    pub singular: Vec<Complex64>,
}

pub(crate) fn to_faer(a: &Array2<Complex64>) -> Mat<c64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| {
        let v = a[(i, j)];
        c64::new(v.re, v.im)
    })
}

pub(crate) fn to_ndarray(m: &Mat<c64>) -> Array2<Complex64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| {
        let v = m[(i, j)];
        Complex64::new(v.re, v.im)
    })
}

/// Pseudo-inverted square roots of the singular values: `1 / sqrt(s_i)`,
/// with entries below the rank tolerance zeroed.
fn whitening_weights(singular: &[f64]) -> Vec<f64> {
    let n = singular.len();
    let leading = singular.first().copied().unwrap_or(0.0).sqrt();
    let tol = leading * n as f64 * f64::EPSILON;
    singular
        .iter()
        .map(|&s| {
            let root = s.sqrt();
            if root > tol {
                1.0 / root
            } else {
                0.0
            }
        })
        .collect()
}

/// Biorthogonalize the two families, keeping `f_count <= n` modes.
pub(crate) fn biorthogonalize(
    gxx: &Array2<Complex64>,
    gyy: &Array2<Complex64>,
    f_count: usize,
) -> Biorthogonal {
    let n = gxx.nrows();
    debug_assert!(f_count > 0 && f_count <= n);
    debug_assert_eq!(gyy.nrows(), n);

    let gx = to_faer(gxx);
    let gy = to_faer(gyy);

    let svd_x = gx.svd();
    let u = svd_x.u().to_owned();
    let vh = svd_x.v().adjoint().to_owned();
    let s_x = svd_x.s_diagonal();
    let weights = whitening_weights(&(0..n).map(|i| s_x[i].re).collect::<Vec<_>>());

    // Truncated whitening factors: rows for the left, columns for the right.
    let w_left = Mat::from_fn(f_count, n, |i, j| {
        if i == j {
            c64::new(weights[i], 0.0)
        } else {
            c64::new(0.0, 0.0)
        }
    });
    let w_right = Mat::from_fn(n, f_count, |i, j| {
        if i == j {
            c64::new(weights[j], 0.0)
        } else {
            c64::new(0.0, 0.0)
        }
    });

    let coupled = &vh * &(&gy * &u);
    let r = &w_left * &(&coupled * &w_right);

    let svd_r = r.svd();
    let u_r = svd_r.u().to_owned();
    let s_r = svd_r.s_diagonal();
    let roots: Vec<f64> = (0..f_count).map(|i| s_r[i].re.sqrt()).collect();

    let psi = &(&u * &w_right) * &u_r;
    let phi = Mat::from_fn(n, f_count, |i, j| {
        psi[(i, j)] * c64::new(1.0 / roots[j], 0.0)
    });

    Biorthogonal {
        psi: to_ndarray(&psi),
        phi: to_ndarray(&phi),
        singular: roots.iter().map(|&r| Complex64::new(r, 0.0)).collect(),
    }
}
