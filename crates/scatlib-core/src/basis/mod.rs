//! Biorthogonal field bases built from paired incident/scattered captures.
//!
//! Each input pair couples an illumination `x_fields[i]` to the response
//! `y_fields[i]` it produced. [`Basis::build`] turns `n` such pairs into `n`
//! basis pairs, orthonormal within each family under the Simpson inner
//! product, ordered by descending coupling strength. A basis can be
//! truncated at build time ([`Basis::build_truncated`]) or afterwards
//! ([`Basis::set_used_fields`]) to keep only the strongest modes.

use ndarray::{s, Array1, Array2};
use num_complex::Complex64;
use scatlib_compute::CpuPool;

use crate::error::ScatError;
use crate::field::NearField;
use crate::gram::{gram_matrix, gram_matrix_roi};
use crate::types::{FieldKind, Roi};

mod factor;
mod io;

/// A biorthogonal basis over an incident and a scattered field family.
#[derive(Debug, Clone)]
pub struct Basis {
    basis_size: usize,
    used_fields: usize,
    x_basis: Vec<NearField>,
    y_basis: Vec<NearField>,
    singular: Vec<Complex64>,
    /// Original-to-basis conversion coefficients, one row per input pair.
    conv_incident: Array2<Complex64>,
    conv_scattered: Array2<Complex64>,
}

impl Basis {
    /// Build a full basis from `n` incident/scattered field pairs.
    pub fn build(x_fields: &[NearField], y_fields: &[NearField]) -> Result<Self, ScatError> {
        Self::build_truncated(x_fields, y_fields, x_fields.len())
    }

    /// Build a basis keeping only the `f_count` strongest coupling modes.
    pub fn build_truncated(
        x_fields: &[NearField],
        y_fields: &[NearField],
        f_count: usize,
    ) -> Result<Self, ScatError> {
        let n = x_fields.len();
        if n != y_fields.len() {
            return Err(ScatError::PairCountMismatch {
                incident: n,
                scattered: y_fields.len(),
            });
        }
        if n == 0 {
            return Err(ScatError::NoInputFields);
        }
        if f_count == 0 || f_count > n {
            return Err(ScatError::ModeCount {
                requested: f_count,
                available: n,
            });
        }
        // Both families must share one grid, including across families.
        for field in x_fields.iter().chain(y_fields) {
            if !field.compatible(&x_fields[0]) {
                return Err(ScatError::IncompatibleFields);
            }
        }

        log::debug!("building basis: {n} pairs, {f_count} modes kept");
        let gxx = gram_matrix(x_fields)?;
        let gyy = gram_matrix(y_fields)?;
        let factors = factor::biorthogonalize(&gxx, &gyy, f_count);

        let geometry = x_fields[0].geometry();
        let pool = CpuPool::new();
        let pairs: Vec<(NearField, NearField)> =
            pool.try_map_indexed(f_count, |k| -> Result<_, ScatError> {
                let mut xb = NearField::zeros(&geometry);
                let mut yb = NearField::zeros(&geometry);
                for j in 0..n {
                    xb.add_scaled(&x_fields[j], factors.psi[(j, k)])?;
                    yb.add_scaled(&y_fields[j], factors.phi[(j, k)])?;
                }
                Ok((xb, yb))
            })?;
        let (x_basis, y_basis) = pairs.into_iter().unzip();

        Ok(Self {
            basis_size: f_count,
            used_fields: f_count,
            x_basis,
            y_basis,
            singular: factors.singular,
            conv_incident: factors.psi,
            conv_scattered: factors.phi,
        })
    }

    pub fn basis_size(&self) -> usize {
        self.basis_size
    }

    pub fn used_fields(&self) -> usize {
        self.used_fields
    }

    /// Truncate the basis to its `count` strongest modes. Values of zero or
    /// above the basis size silently reset to the full basis.
    pub fn set_used_fields(&mut self, count: usize) {
        if count > 0 && count <= self.basis_size {
            self.used_fields = count;
        } else {
            self.used_fields = self.basis_size;
        }
    }

    /// Square roots of the coupling singular values, strongest first.
    pub fn singular_values(&self) -> &[Complex64] {
        &self.singular
    }

    /// Coefficients expressing each basis field in the original captures:
    /// one row per input pair, one column per basis mode.
    pub fn conversion_coefficients(&self, kind: FieldKind) -> &Array2<Complex64> {
        match kind {
            FieldKind::Incident => &self.conv_incident,
            FieldKind::Scattered => &self.conv_scattered,
        }
    }

    /// The basis fields of one family, all `basis_size` of them.
    pub fn basis_fields(&self, kind: FieldKind) -> &[NearField] {
        match kind {
            FieldKind::Incident => &self.x_basis,
            FieldKind::Scattered => &self.y_basis,
        }
    }

    fn active_fields(&self, kind: FieldKind) -> &[NearField] {
        &self.basis_fields(kind)[..self.used_fields]
    }

    /// Project a field onto the active basis modes of one family.
    pub fn decompose(
        &self,
        field: &NearField,
        kind: FieldKind,
    ) -> Result<Vec<Complex64>, ScatError> {
        self.active_fields(kind)
            .iter()
            .map(|basis_field| basis_field.dot(field))
            .collect()
    }

    /// Reassemble a field from basis-mode coefficients.
    pub fn compose(&self, coefs: &[Complex64], kind: FieldKind) -> Result<NearField, ScatError> {
        if coefs.len() != self.used_fields {
            return Err(ScatError::CoefficientCount {
                given: coefs.len(),
                expected: self.used_fields,
                basis_size: self.basis_size,
            });
        }
        let fields = self.active_fields(kind);
        let mut result = NearField::zeros(&fields[0].geometry());
        for (field, &c) in fields.iter().zip(coefs) {
            result.add_scaled(field, c)?;
        }
        Ok(result)
    }

    /// Reassemble a field directly from the original captures, bypassing the
    /// stored basis fields: the mode coefficients are first converted to
    /// per-capture weights through the conversion matrix.
    pub fn compose_from_originals(
        &self,
        coefs: &[Complex64],
        kind: FieldKind,
        originals: &[NearField],
    ) -> Result<NearField, ScatError> {
        if coefs.len() != self.used_fields {
            return Err(ScatError::CoefficientCount {
                given: coefs.len(),
                expected: self.used_fields,
                basis_size: self.basis_size,
            });
        }
        if originals.len() < self.used_fields {
            return Err(ScatError::OriginalFieldCount {
                given: originals.len(),
                expected: self.used_fields,
            });
        }
        let conv = self.conversion_coefficients(kind);
        let active = conv.slice(s![.., ..self.used_fields]);
        let weights = active.dot(&Array1::from(coefs.to_vec()));

        let mut result = NearField::zeros(&originals[0].geometry());
        for i in 0..self.used_fields {
            result.add_scaled(&originals[i], weights[i])?;
        }
        Ok(result)
    }

    /// Gram matrix of the active basis fields of one family over a region
    /// of interest.
    pub fn roi_gram(&self, roi: &Roi, kind: FieldKind) -> Result<Array2<Complex64>, ScatError> {
        gram_matrix_roi(self.active_fields(kind), roi)
    }
}
