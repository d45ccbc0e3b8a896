//! End-to-end wavefront-shaping checks on small Gaussian bases.

use num_complex::Complex64;
use scatlib_core::{focus, Basis, FieldKind, FocusConfig, GridGeometry, NearField, Roi, ScatError};

fn grid() -> GridGeometry {
    GridGeometry {
        nodes_x: 11,
        nodes_y: 11,
        step_x: 0.2,
        step_y: 0.2,
        min_x: -1.0,
        min_y: -1.0,
        wavelength: 0.6328,
    }
}

fn gaussian_basis() -> Basis {
    let g = grid();
    let x = vec![
        NearField::gaussian_beam(&g, -0.4, 0.0, 0.5, 0),
        NearField::gaussian_beam(&g, 0.0, 0.3, 0.5, 0),
        NearField::gaussian_beam(&g, 0.4, -0.2, 0.5, 1),
    ];
    let y = vec![
        NearField::gaussian_beam(&g, -0.5, -0.5, 0.4, 0),
        NearField::gaussian_beam(&g, 0.5, 0.5, 0.4, 0),
        NearField::gaussian_beam(&g, 0.0, 0.0, 0.4, 1),
    ];
    Basis::build(&x, &y).unwrap()
}

fn roi_energy_fraction(field: &NearField, roi: &Roi) -> f64 {
    field.energy_in(roi).unwrap() / field.energy()
}

#[test]
fn full_grid_roi_is_already_optimal() {
    let basis = gaussian_basis();
    let roi = Roi::new(0, 0, 11, 11);
    let focused = focus(&basis, &roi, &FocusConfig::default()).unwrap();
    // Everything lands inside a region covering the whole grid, so the
    // optimizer has nothing to improve and must converge immediately.
    assert!(roi_energy_fraction(&focused, &roi) > 1.0 - 1e-6);

    // With a flat landscape the start point is returned unchanged.
    let ones = vec![Complex64::new(1.0, 0.0); basis.used_fields()];
    let start = basis.compose(&ones, FieldKind::Scattered).unwrap();
    let ratio = NearField::energy_difference_ratio(&start, &focused).unwrap();
    assert!(ratio < 1e-9);
}

#[test]
fn focusing_improves_the_roi_energy_fraction() {
    let basis = gaussian_basis();
    // A corner window overlapping the first scattered spot.
    let roi = Roi::new(0, 0, 4, 4);

    let ones = vec![Complex64::new(1.0, 0.0); basis.used_fields()];
    let start = basis.compose(&ones, FieldKind::Scattered).unwrap();
    let before = roi_energy_fraction(&start, &roi);

    let config = FocusConfig {
        iter_max: 500,
        ..FocusConfig::default()
    };
    let focused = focus(&basis, &roi, &config).unwrap();
    let after = roi_energy_fraction(&focused, &roi);

    assert!(
        after >= before - 1e-9,
        "energy fraction fell from {before} to {after}"
    );
    assert!(after > before, "optimizer made no progress");
}

#[test]
fn focusing_respects_the_active_truncation() {
    let mut basis = gaussian_basis();
    basis.set_used_fields(2);
    let roi = Roi::new(0, 0, 4, 4);
    let focused = focus(&basis, &roi, &FocusConfig::default()).unwrap();
    // The composed result lives on the same grid as the basis fields.
    assert_eq!(focused.nodes_x(), 11);
    assert_eq!(focused.nodes_y(), 11);
    assert!(focused.energy() > 0.0);
}

#[test]
fn out_of_bounds_roi_is_rejected() {
    let basis = gaussian_basis();
    let roi = Roi::new(8, 8, 5, 5);
    assert!(matches!(
        focus(&basis, &roi, &FocusConfig::default()).unwrap_err(),
        ScatError::RoiOutOfBounds { .. }
    ));
}

#[test]
fn focused_spot_concentrates_near_the_window() {
    let basis = gaussian_basis();
    let roi = Roi::new(0, 0, 4, 4);
    let config = FocusConfig {
        iter_max: 500,
        ..FocusConfig::default()
    };
    let focused = focus(&basis, &roi, &config).unwrap();
    let fwhm = focused.fwhm();
    assert!(fwhm.area > 0.0);
    assert!(fwhm.peak_intensity > 0.0);
}
