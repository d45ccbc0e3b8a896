//! Gram matrices of field families.

use ndarray::Array2;
use num_complex::Complex64;
use scatlib_compute::CpuPool;

use crate::error::ScatError;
use crate::field::NearField;
use crate::types::Roi;

/// Hermitian Gram matrix `G[i][j] = <fields[i], fields[j]>` over the full
/// grid. The lower triangle is computed row-parallel; the upper triangle is
/// filled by conjugation.
pub fn gram_matrix(fields: &[NearField]) -> Result<Array2<Complex64>, ScatError> {
    let m = fields.len();
    log::debug!("computing {m}x{m} Gram matrix");
    let pool = CpuPool::new();
    let rows: Vec<Vec<Complex64>> = pool.try_map_indexed(m, |i| {
        (0..=i)
            .map(|j| fields[i].dot(&fields[j]))
            .collect::<Result<Vec<_>, _>>()
    })?;
    Ok(assemble_hermitian(m, &rows))
}

/// Gram matrix restricted to a region of interest. The ROI matrices in the
/// wavefront-shaping loop are small, so this stays sequential.
pub fn gram_matrix_roi(fields: &[NearField], roi: &Roi) -> Result<Array2<Complex64>, ScatError> {
    let m = fields.len();
    let mut rows = Vec::with_capacity(m);
    for i in 0..m {
        let mut row = Vec::with_capacity(i + 1);
        for j in 0..=i {
            row.push(fields[i].dot_roi(&fields[j], roi)?);
        }
        rows.push(row);
    }
    Ok(assemble_hermitian(m, &rows))
}

fn assemble_hermitian(m: usize, rows: &[Vec<Complex64>]) -> Array2<Complex64> {
    let mut gram = Array2::zeros((m, m));
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            gram[(i, j)] = *value;
            if i != j {
                gram[(j, i)] = value.conj();
            }
        }
    }
    gram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::test_support::*;
    use approx::assert_relative_eq;

    #[test]
    fn gram_is_hermitian_with_real_diagonal() {
        let geometry = small_geometry(7, 7);
        let fields = vec![
            ramp_field(&geometry, 0.1),
            ramp_field(&geometry, 1.2),
            ramp_field(&geometry, 2.7),
        ];
        let gram = gram_matrix(&fields).unwrap();
        assert_eq!(gram.dim(), (3, 3));
        for i in 0..3 {
            assert_relative_eq!(gram[(i, i)].im, 0.0, epsilon = 1e-12);
            assert!(gram[(i, i)].re > 0.0);
            for j in 0..3 {
                let a = gram[(i, j)];
                let b = gram[(j, i)];
                assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
                assert_relative_eq!(a.im, -b.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn diagonal_holds_the_computed_overlap_verbatim() {
        let geometry = small_geometry(7, 7);
        let fields = vec![ramp_field(&geometry, 0.4), ramp_field(&geometry, 1.6)];
        let gram = gram_matrix(&fields).unwrap();
        // The diagonal is written once, not mirrored through conjugation,
        // so it matches the direct overlap bit for bit.
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(gram[(i, i)], field.dot(field).unwrap());
        }
    }

    #[test]
    fn roi_gram_over_full_grid_matches_plain_gram() {
        let geometry = small_geometry(5, 5);
        let fields = vec![ramp_field(&geometry, 0.4), ramp_field(&geometry, 1.6)];
        let full = gram_matrix(&fields).unwrap();
        let roi = Roi::new(0, 0, 5, 5);
        let windowed = gram_matrix_roi(&fields, &roi).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                assert_relative_eq!(full[(i, j)].re, windowed[(i, j)].re, epsilon = 1e-12);
                assert_relative_eq!(full[(i, j)].im, windowed[(i, j)].im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn incompatible_family_fails() {
        let fields = vec![
            ramp_field(&small_geometry(5, 5), 0.0),
            ramp_field(&small_geometry(7, 5), 0.0),
        ];
        assert!(matches!(
            gram_matrix(&fields).unwrap_err(),
            ScatError::IncompatibleFields
        ));
    }

    #[test]
    fn empty_family_gives_empty_matrix() {
        let gram = gram_matrix(&[]).unwrap();
        assert_eq!(gram.dim(), (0, 0));
    }
}
