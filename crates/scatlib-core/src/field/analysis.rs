//! Intensity statistics: peak search and half-maximum region extraction.

use std::collections::VecDeque;

use crate::field::NearField;
use crate::types::Fwhm;

impl NearField {
    /// Largest node intensity on the grid.
    pub fn max_intensity(&self) -> f64 {
        self.max_intensity_at().0
    }

    /// Largest node intensity and the node where it occurs. Ties resolve to
    /// the first node in row-major order; an empty grid reports zero at (0, 0).
    pub fn max_intensity_at(&self) -> (f64, usize, usize) {
        let mut best = (0.0f64, 0usize, 0usize);
        for y in 0..self.nodes_y {
            for x in 0..self.nodes_x {
                let i = self.intensity(x, y);
                if i > best.0 {
                    best = (i, x, y);
                }
            }
        }
        best
    }

    /// Half-maximum region around the global intensity peak.
    pub fn fwhm(&self) -> Fwhm {
        let (peak, px, py) = self.max_intensity_at();
        self.fwhm_from(px, py, peak / 2.0)
    }

    /// Region of nodes with intensity at or above `threshold`, connected to
    /// the seed node `(px, py)` through 4-neighbour adjacency.
    ///
    /// The flood fill walks whole horizontal runs at a time. If the seed
    /// itself falls below the threshold the region is empty: the bounding box
    /// collapses onto the seed and the area is zero.
    pub fn fwhm_from(&self, px: usize, py: usize, threshold: f64) -> Fwhm {
        let peak_x = self.min_x + px as f64 * self.step_x;
        let peak_y = self.min_y + py as f64 * self.step_y;
        let peak_intensity = self.intensity(px, py);

        let mut visited = vec![false; self.nodes_x * self.nodes_y];
        let mut queue = VecDeque::new();
        if peak_intensity >= threshold {
            queue.push_back((px, py));
        }

        let mut count = 0usize;
        let mut x_lo = px;
        let mut x_hi = px;
        let mut y_lo = py;
        let mut y_hi = py;

        while let Some((cx, cy)) = queue.pop_front() {
            let row = cy * self.nodes_x;
            if visited[row + cx] || self.intensity(cx, cy) < threshold {
                continue;
            }
            // Expand the run to the full above-threshold horizontal span.
            let mut w = cx;
            while w > 0 && !visited[row + w - 1] && self.intensity(w - 1, cy) >= threshold {
                w -= 1;
            }
            let mut e = cx;
            while e + 1 < self.nodes_x
                && !visited[row + e + 1]
                && self.intensity(e + 1, cy) >= threshold
            {
                e += 1;
            }

            for x in w..=e {
                visited[row + x] = true;
                count += 1;
                if cy > 0 && self.intensity(x, cy - 1) >= threshold {
                    queue.push_back((x, cy - 1));
                }
                if cy + 1 < self.nodes_y && self.intensity(x, cy + 1) >= threshold {
                    queue.push_back((x, cy + 1));
                }
            }

            x_lo = x_lo.min(w);
            x_hi = x_hi.max(e);
            y_lo = y_lo.min(cy);
            y_hi = y_hi.max(cy);
        }

        Fwhm {
            peak_x,
            peak_y,
            x_min: self.min_x + x_lo as f64 * self.step_x,
            x_max: self.min_x + x_hi as f64 * self.step_x,
            y_min: self.min_y + y_lo as f64 * self.step_y,
            y_max: self.min_y + y_hi as f64 * self.step_y,
            area: count as f64 * self.step_x * self.step_y,
            peak_intensity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::test_support::*;
    use crate::types::GridGeometry;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn spot_field(geometry: &GridGeometry, cx: usize, cy: usize) -> NearField {
        let mut field = NearField::zeros(geometry);
        for y in 0..geometry.nodes_y {
            for x in 0..geometry.nodes_x {
                let dx = x as f64 - cx as f64;
                let dy = y as f64 - cy as f64;
                // Wide enough that the half-maximum region covers a 3x3
                // node block around the centre.
                let amp = (-(dx * dx + dy * dy) / 8.0).exp();
                field.set_value(
                    x,
                    y,
                    [
                        Complex64::new(amp, 0.0),
                        Complex64::default(),
                        Complex64::default(),
                    ],
                );
            }
        }
        field
    }

    #[test]
    fn peak_is_found_at_the_spot_centre() {
        let field = spot_field(&small_geometry(9, 9), 6, 3);
        let (peak, x, y) = field.max_intensity_at();
        assert_eq!((x, y), (6, 3));
        assert_relative_eq!(peak, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn fwhm_bounding_box_contains_the_peak() {
        let field = spot_field(&small_geometry(11, 11), 5, 5);
        let fwhm = field.fwhm();
        assert!(fwhm.x_min <= fwhm.peak_x && fwhm.peak_x <= fwhm.x_max);
        assert!(fwhm.y_min <= fwhm.peak_y && fwhm.peak_y <= fwhm.y_max);
        assert!(fwhm.area > 0.0);
        assert_relative_eq!(fwhm.peak_intensity, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn fwhm_of_symmetric_spot_is_square() {
        let field = spot_field(&small_geometry(15, 15), 7, 7);
        let fwhm = field.fwhm();
        assert_relative_eq!(fwhm.horizontal(), fwhm.vertical(), epsilon = 1e-12);
        assert_relative_eq!(fwhm.aspect_ratio(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn seed_below_threshold_gives_empty_region() {
        let field = spot_field(&small_geometry(9, 9), 4, 4);
        let fwhm = field.fwhm_from(0, 0, 0.5);
        assert_eq!(fwhm.area, 0.0);
        assert_eq!(fwhm.x_min, fwhm.x_max);
        assert_eq!(fwhm.y_min, fwhm.y_max);
    }

    #[test]
    fn disconnected_lobe_is_not_flooded() {
        let geometry = small_geometry(9, 3);
        let mut field = NearField::zeros(&geometry);
        // Two bright runs separated by a dark column.
        for x in [0usize, 1, 2, 6, 7, 8] {
            field.set_value(
                x,
                1,
                [
                    Complex64::new(1.0, 0.0),
                    Complex64::default(),
                    Complex64::default(),
                ],
            );
        }
        let fwhm = field.fwhm_from(1, 1, 0.5);
        // Only the left run of three nodes is connected to the seed.
        assert_relative_eq!(fwhm.area, 3.0 * 0.5 * 0.5, epsilon = 1e-12);
        assert_relative_eq!(fwhm.x_max, field.min_x() + 2.0 * 0.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_field_reports_zero_everywhere() {
        let field = NearField::zeros(&small_geometry(2, 2));
        assert_eq!(field.max_intensity(), 0.0);
        assert_eq!(field.energy(), 0.0);
    }
}
