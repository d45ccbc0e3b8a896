//! Complex vector fields sampled on a regular 2D grid.
//!
//! A [`NearField`] stores the three Cartesian components of a monochromatic
//! electromagnetic field, sampled at `nodes_x * nodes_y` grid points. The
//! buffer is plane-major: each component occupies a contiguous row-major
//! `nodes_y * nodes_x` block.

use std::ops::{Div, Mul};

use num_complex::Complex64;

use crate::error::ScatError;
use crate::types::{GridGeometry, Roi};

mod analysis;
mod io;
mod quadrature;

/// Number of vector components per grid node.
pub const DIM: usize = 3;

/// A complex three-component field on a regular rectangular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct NearField {
    nodes_x: usize,
    nodes_y: usize,
    step_x: f64,
    step_y: f64,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    wavelength: f64,
    data: Vec<Complex64>,
}

impl NearField {
    /// Zero-valued field over the given grid.
    ///
    /// The domain maxima are derived from the geometry:
    /// `max = min + (nodes - 1) * step`.
    pub fn zeros(geometry: &GridGeometry) -> Self {
        let GridGeometry {
            nodes_x,
            nodes_y,
            step_x,
            step_y,
            min_x,
            min_y,
            wavelength,
        } = *geometry;
        Self {
            nodes_x,
            nodes_y,
            step_x,
            step_y,
            min_x,
            max_x: min_x + nodes_x.saturating_sub(1) as f64 * step_x,
            min_y,
            max_y: min_y + nodes_y.saturating_sub(1) as f64 * step_y,
            wavelength,
            data: vec![Complex64::new(0.0, 0.0); DIM * nodes_x * nodes_y],
        }
    }

    /// Build a field from an existing component buffer.
    ///
    /// The buffer must hold `3 * nodes_x * nodes_y` values, one contiguous
    /// row-major plane per component.
    pub fn from_components(
        geometry: &GridGeometry,
        data: Vec<Complex64>,
    ) -> Result<Self, ScatError> {
        let expected = DIM * geometry.nodes_x * geometry.nodes_y;
        if data.len() != expected {
            return Err(ScatError::BufferLength {
                got: data.len(),
                nodes_x: geometry.nodes_x,
                nodes_y: geometry.nodes_y,
            });
        }
        let mut field = Self::zeros(geometry);
        field.data = data;
        Ok(field)
    }

    /// Gaussian beam with unit amplitude in one component and zero in the
    /// other two: `E(x, y) = exp(-((x - cx)^2 + (y - cy)^2) / w^2)`.
    pub fn gaussian_beam(
        geometry: &GridGeometry,
        centre_x: f64,
        centre_y: f64,
        width: f64,
        component: usize,
    ) -> Self {
        debug_assert!(component < DIM);
        let mut field = Self::zeros(geometry);
        let plane = component * field.plane_len();
        for y in 0..field.nodes_y {
            let dy = field.min_y + y as f64 * field.step_y - centre_y;
            for x in 0..field.nodes_x {
                let dx = field.min_x + x as f64 * field.step_x - centre_x;
                let amp = (-(dx * dx + dy * dy) / (width * width)).exp();
                field.data[plane + y * field.nodes_x + x] = Complex64::new(amp, 0.0);
            }
        }
        field
    }

    pub fn nodes_x(&self) -> usize {
        self.nodes_x
    }

    pub fn nodes_y(&self) -> usize {
        self.nodes_y
    }

    pub fn step_x(&self) -> f64 {
        self.step_x
    }

    pub fn step_y(&self) -> f64 {
        self.step_y
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    /// Free-space wavenumber `k = 2π / λ`.
    pub fn wavenumber(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.wavelength
    }

    /// The grid geometry this field was built over.
    pub fn geometry(&self) -> GridGeometry {
        GridGeometry {
            nodes_x: self.nodes_x,
            nodes_y: self.nodes_y,
            step_x: self.step_x,
            step_y: self.step_y,
            min_x: self.min_x,
            min_y: self.min_y,
            wavelength: self.wavelength,
        }
    }

    /// Two fields are compatible when every grid attribute matches exactly.
    pub fn compatible(&self, other: &Self) -> bool {
        self.nodes_x == other.nodes_x
            && self.nodes_y == other.nodes_y
            && self.step_x == other.step_x
            && self.step_y == other.step_y
            && self.min_x == other.min_x
            && self.max_x == other.max_x
            && self.min_y == other.min_y
            && self.max_y == other.max_y
            && self.wavelength == other.wavelength
    }

    #[inline]
    fn plane_len(&self) -> usize {
        self.nodes_x * self.nodes_y
    }

    #[inline]
    fn node_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.nodes_x && y < self.nodes_y);
        y * self.nodes_x + x
    }

    /// The three field components at node `(x, y)`.
    #[inline]
    pub fn value(&self, x: usize, y: usize) -> [Complex64; DIM] {
        let idx = self.node_index(x, y);
        let plane = self.plane_len();
        [
            self.data[idx],
            self.data[plane + idx],
            self.data[2 * plane + idx],
        ]
    }

    #[inline]
    pub fn set_value(&mut self, x: usize, y: usize, value: [Complex64; DIM]) {
        let idx = self.node_index(x, y);
        let plane = self.plane_len();
        self.data[idx] = value[0];
        self.data[plane + idx] = value[1];
        self.data[2 * plane + idx] = value[2];
    }

    /// Intensity at node `(x, y)`: the squared norm over all components.
    #[inline]
    pub fn intensity(&self, x: usize, y: usize) -> f64 {
        let idx = self.node_index(x, y);
        let plane = self.plane_len();
        self.data[idx].norm_sqr()
            + self.data[plane + idx].norm_sqr()
            + self.data[2 * plane + idx].norm_sqr()
    }

    /// Raw component buffer, plane-major.
    pub fn components(&self) -> &[Complex64] {
        &self.data
    }

    /// Component-wise complex conjugate.
    pub fn conjugate(&self) -> Self {
        let mut out = self.clone();
        for v in &mut out.data {
            *v = v.conj();
        }
        out
    }

    pub fn try_add(&self, other: &Self) -> Result<Self, ScatError> {
        if !self.compatible(other) {
            return Err(ScatError::IncompatibleFields);
        }
        let mut out = self.clone();
        for (a, b) in out.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(out)
    }

    pub fn try_sub(&self, other: &Self) -> Result<Self, ScatError> {
        if !self.compatible(other) {
            return Err(ScatError::IncompatibleFields);
        }
        let mut out = self.clone();
        for (a, b) in out.data.iter_mut().zip(&other.data) {
            *a -= b;
        }
        Ok(out)
    }

    /// In-place fused update `self += weight * other`.
    pub fn add_scaled(&mut self, other: &Self, weight: Complex64) -> Result<(), ScatError> {
        if !self.compatible(other) {
            return Err(ScatError::IncompatibleFields);
        }
        for (a, b) in self.data.iter_mut().zip(&other.data) {
            *a += weight * b;
        }
        Ok(())
    }

    /// Field energy: the Simpson-quadrature integral of the intensity over
    /// the whole grid.
    pub fn energy(&self) -> f64 {
        // Self inner product is real up to rounding.
        self.dot(self).map(|v| v.re).unwrap_or(0.0)
    }

    /// Field energy restricted to a region of interest.
    pub fn energy_in(&self, roi: &Roi) -> Result<f64, ScatError> {
        Ok(self.dot_roi(self, roi)?.re)
    }

    /// Relative reconstruction error `‖reference - reconstructed‖² / ‖reference‖²`.
    pub fn energy_difference_ratio(
        reference: &Self,
        reconstructed: &Self,
    ) -> Result<f64, ScatError> {
        let diff = reference.try_sub(reconstructed)?;
        Ok(diff.energy() / reference.energy())
    }
}

impl Mul<Complex64> for NearField {
    type Output = NearField;

    fn mul(mut self, rhs: Complex64) -> NearField {
        for v in &mut self.data {
            *v *= rhs;
        }
        self
    }
}

impl Mul<f64> for NearField {
    type Output = NearField;

    fn mul(self, rhs: f64) -> NearField {
        self * Complex64::new(rhs, 0.0)
    }
}

impl Div<Complex64> for NearField {
    type Output = NearField;

    fn div(mut self, rhs: Complex64) -> NearField {
        for v in &mut self.data {
            *v /= rhs;
        }
        self
    }
}
