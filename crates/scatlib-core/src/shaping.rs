//! Wavefront shaping: focusing scattered light into a region of interest.
//!
//! [`focus`] searches for scattered-basis coefficients \( C \) maximizing the
//! energy fraction
//! \( F(C) = \mathrm{Re}(C^H M C) / \mathrm{Re}(C^H C) \),
//! where \( M \) is the ROI Gram matrix of the active scattered basis fields.
//! Because the basis is orthonormal over the full grid, the denominator is
//! the total energy of the composed field and \( F \) is the fraction of it
//! landing inside the region.
//!
//! The search runs two rounds of backtracking gradient ascent: a phase-only
//! round followed by a magnitude-only round, with coordinate-wise central
//! finite differences in polar form. Each round stops when the gradient norm
//! drops below the configured threshold or the iteration cap is reached; a
//! capped round is reported in the log but is not an error.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::basis::Basis;
use crate::error::ScatError;
use crate::field::NearField;
use crate::types::{FieldKind, Roi};

/// Finite-difference step for the polar-form gradients.
const GRADIENT_STEP: f64 = 0.001;

/// Tuning knobs for [`focus`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Initial ascent step length per round.
    pub t0: f64,
    /// Iteration cap per round.
    pub iter_max: usize,
    /// Gradient L2-norm convergence threshold.
    pub l2norm_stop: f64,
    /// Armijo sufficient-increase slope.
    pub armijo: f64,
    /// Step shrink factor while backtracking.
    pub backtrack: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            t0: 100.0,
            iter_max: 10_000,
            l2norm_stop: 1.0e-6,
            armijo: 0.4,
            backtrack: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Perturbation {
    Phase,
    Magnitude,
}

impl Perturbation {
    /// Nudge a coefficient along this polar coordinate.
    fn apply(self, value: Complex64, delta: f64) -> Complex64 {
        let rho = value.norm();
        let phi = value.arg();
        match self {
            Perturbation::Phase => Complex64::from_polar(rho, phi + delta),
            Perturbation::Magnitude => Complex64::from_polar(rho + delta, phi),
        }
    }
}

/// Fraction of the composed field's energy inside the ROI.
fn energy_fraction(roi_gram: &Array2<Complex64>, coefs: &Array1<Complex64>) -> f64 {
    let mc = roi_gram.dot(coefs);
    let numerator: f64 = coefs
        .iter()
        .zip(mc.iter())
        .map(|(c, m)| (c.conj() * m).re)
        .sum();
    let denominator: f64 = coefs.iter().map(|c| c.norm_sqr()).sum();
    numerator / denominator
}

/// Coordinate-wise central-difference gradient of the energy fraction in the
/// chosen polar coordinate. Returns the gradient and its L2 norm.
fn gradient(
    roi_gram: &Array2<Complex64>,
    coefs: &mut Array1<Complex64>,
    pert: Perturbation,
) -> (Array1<f64>, f64) {
    let mut grad = Array1::zeros(coefs.len());
    for i in 0..coefs.len() {
        let saved = coefs[i];
        coefs[i] = pert.apply(saved, GRADIENT_STEP);
        let plus = energy_fraction(roi_gram, coefs);
        coefs[i] = pert.apply(saved, -GRADIENT_STEP);
        let minus = energy_fraction(roi_gram, coefs);
        coefs[i] = saved;
        grad[i] = (plus - minus) / (2.0 * GRADIENT_STEP);
    }
    let l2norm = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
    (grad, l2norm)
}

fn step(coefs: &Array1<Complex64>, grad: &Array1<f64>, t: f64, pert: Perturbation) -> Array1<Complex64> {
    Array1::from_shape_fn(coefs.len(), |i| pert.apply(coefs[i], t * grad[i]))
}

/// One ascent round over a single polar coordinate. Returns true when the
/// gradient threshold was reached within the iteration cap.
fn run_stage(
    roi_gram: &Array2<Complex64>,
    coefs: &mut Array1<Complex64>,
    pert: Perturbation,
    config: &FocusConfig,
) -> bool {
    let mut counter = 0usize;
    loop {
        let (grad, l2norm) = gradient(roi_gram, coefs, pert);
        if l2norm <= config.l2norm_stop {
            log::debug!("{pert:?} round converged after {counter} iterations");
            return true;
        }
        counter += 1;
        if counter > config.iter_max {
            log::debug!(
                "{pert:?} round hit the iteration cap ({}), gradient norm {l2norm:.3e}",
                config.iter_max
            );
            return false;
        }

        let slope = grad.iter().map(|g| g * g).sum::<f64>();
        let f0 = energy_fraction(roi_gram, coefs);
        let mut t = config.t0;
        let mut trial = step(coefs, &grad, t, pert);
        let mut f1 = energy_fraction(roi_gram, &trial);
        // Backtrack until the Armijo increase holds; once t underflows the
        // trial coincides with the current point and the loop exits.
        while f1 < f0 + config.armijo * t * slope {
            t *= config.backtrack;
            trial = step(coefs, &grad, t, pert);
            f1 = energy_fraction(roi_gram, &trial);
        }
        *coefs = trial;
    }
}

/// Find the scattered field, expressible in the active basis modes, that
/// concentrates the largest energy fraction inside `roi`. The search starts
/// from uniform unit coefficients.
pub fn focus(basis: &Basis, roi: &Roi, config: &FocusConfig) -> Result<NearField, ScatError> {
    let roi_gram = basis.roi_gram(roi, FieldKind::Scattered)?;
    let mut coefs = Array1::from_elem(basis.used_fields(), Complex64::new(1.0, 0.0));

    run_stage(&roi_gram, &mut coefs, Perturbation::Phase, config);
    run_stage(&roi_gram, &mut coefs, Perturbation::Magnitude, config);
    log::debug!(
        "focus finished, energy fraction {:.6}",
        energy_fraction(&roi_gram, &coefs)
    );

    basis.compose(&coefs.to_vec(), FieldKind::Scattered)
}
