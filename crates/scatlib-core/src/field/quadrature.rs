//! Inner products between fields via 2D composite Simpson quadrature.
//!
//! The quadrature consumes intervals in pairs, so with an even interval count
//! along an axis the final interval does not contribute to the integral. Grids
//! meant for quantitative energies should therefore use odd node counts per
//! axis; the basis and shaping pipelines only ever compare integrals computed
//! on the same grid, where the truncation cancels.

use num_complex::Complex64;

use crate::error::ScatError;
use crate::field::NearField;
use crate::types::Roi;

impl NearField {
    /// Pointwise integrand of the inner product: `Σ_c conj(self_c) * other_c`.
    #[inline]
    fn conj_dot_at(&self, other: &Self, x: usize, y: usize) -> Complex64 {
        let idx = self.node_index(x, y);
        let plane = self.plane_len();
        self.data[idx].conj() * other.data[idx]
            + self.data[plane + idx].conj() * other.data[plane + idx]
            + self.data[2 * plane + idx].conj() * other.data[2 * plane + idx]
    }

    /// Inner product `<self, other> = ∫∫ conj(self) · other dx dy` over the
    /// full grid. Conjugate-linear in `self`, linear in `other`.
    pub fn dot(&self, other: &Self) -> Result<Complex64, ScatError> {
        if !self.compatible(other) {
            return Err(ScatError::IncompatibleFields);
        }
        let roi = Roi::new(0, 0, self.nodes_x, self.nodes_y);
        Ok(self.simpson(other, &roi))
    }

    /// Inner product restricted to a region of interest.
    pub fn dot_roi(&self, other: &Self, roi: &Roi) -> Result<Complex64, ScatError> {
        if !self.compatible(other) {
            return Err(ScatError::IncompatibleFields);
        }
        roi.check_within(self.nodes_x, self.nodes_y)?;
        Ok(self.simpson(other, roi))
    }

    fn simpson(&self, other: &Self, roi: &Roi) -> Complex64 {
        let mut rows = vec![Complex64::new(0.0, 0.0); roi.height];
        for (ry, row) in rows.iter_mut().enumerate() {
            let y = roi.y0 + ry;
            let mut acc = Complex64::new(0.0, 0.0);
            for rx in (1..roi.width.saturating_sub(1)).step_by(2) {
                let x = roi.x0 + rx;
                acc += self.conj_dot_at(other, x - 1, y)
                    + 4.0 * self.conj_dot_at(other, x, y)
                    + self.conj_dot_at(other, x + 1, y);
            }
            *row = acc * (self.step_x / 3.0);
        }

        let mut total = Complex64::new(0.0, 0.0);
        for ry in (1..roi.height.saturating_sub(1)).step_by(2) {
            total += rows[ry - 1] + 4.0 * rows[ry] + rows[ry + 1];
        }
        total * (self.step_y / 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::test_support::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn constant_field_energy_matches_domain_area() {
        let geometry = small_geometry(5, 5);
        let mut field = NearField::zeros(&geometry);
        for y in 0..5 {
            for x in 0..5 {
                field.set_value(
                    x,
                    y,
                    [
                        Complex64::new(1.0, 0.0),
                        Complex64::new(0.0, 0.0),
                        Complex64::new(0.0, 0.0),
                    ],
                );
            }
        }
        // 2x2 physical domain, unit intensity.
        assert_relative_eq!(field.energy(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn dot_is_conjugate_symmetric() {
        let geometry = small_geometry(7, 5);
        let a = ramp_field(&geometry, 0.4);
        let b = ramp_field(&geometry, 1.9);
        let ab = a.dot(&b).unwrap();
        let ba = b.dot(&a).unwrap();
        assert_relative_eq!(ab.re, ba.re, epsilon = 1e-12);
        assert_relative_eq!(ab.im, -ba.im, epsilon = 1e-12);
    }

    #[test]
    fn self_dot_is_real_and_non_negative() {
        let field = ramp_field(&small_geometry(7, 7), 2.3);
        let e = field.dot(&field).unwrap();
        assert_relative_eq!(e.im, 0.0, epsilon = 1e-12);
        assert!(e.re >= 0.0);
    }

    #[test]
    fn full_grid_roi_matches_plain_dot() {
        let geometry = small_geometry(5, 7);
        let a = ramp_field(&geometry, 0.8);
        let b = ramp_field(&geometry, 1.1);
        let full = Roi::new(0, 0, 5, 7);
        let plain = a.dot(&b).unwrap();
        let windowed = a.dot_roi(&b, &full).unwrap();
        assert_relative_eq!(plain.re, windowed.re, epsilon = 1e-12);
        assert_relative_eq!(plain.im, windowed.im, epsilon = 1e-12);
    }

    #[test]
    fn out_of_bounds_roi_is_rejected() {
        let geometry = small_geometry(5, 5);
        let a = ramp_field(&geometry, 0.0);
        let err = a.dot_roi(&a, &Roi::new(3, 0, 3, 3)).unwrap_err();
        assert!(matches!(err, ScatError::RoiOutOfBounds { .. }));
    }

    #[test]
    fn incompatible_fields_are_rejected() {
        let a = ramp_field(&small_geometry(5, 5), 0.0);
        let b = ramp_field(&small_geometry(7, 5), 0.0);
        assert!(matches!(
            a.dot(&b).unwrap_err(),
            ScatError::IncompatibleFields
        ));
    }
}
