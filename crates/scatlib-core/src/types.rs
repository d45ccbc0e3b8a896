//! Plain data types shared across the crate.

use serde::{Deserialize, Serialize};

use crate::error::ScatError;

/// Grid geometry used to construct a [`NearField`](crate::NearField).
///
/// The domain maxima are intentionally absent: `max = min + (nodes - 1) * step`
/// is recomputed at construction and never independently settable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Number of grid nodes along x.
    pub nodes_x: usize,
    /// Number of grid nodes along y.
    pub nodes_y: usize,
    /// Sample spacing along x.
    pub step_x: f64,
    /// Sample spacing along y.
    pub step_y: f64,
    /// Physical coordinate of node column 0.
    pub min_x: f64,
    /// Physical coordinate of node row 0.
    pub min_y: f64,
    /// Wavelength of the light, λ > 0.
    pub wavelength: f64,
}

/// Rectangular region of interest, in grid-node coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    /// Leftmost node column inside the region.
    pub x0: usize,
    /// Topmost node row inside the region.
    pub y0: usize,
    /// Region width in nodes.
    pub width: usize,
    /// Region height in nodes.
    pub height: usize,
}

impl Roi {
    pub fn new(x0: usize, y0: usize, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Check that the region lies inside a `nodes_x` x `nodes_y` grid.
    pub(crate) fn check_within(&self, nodes_x: usize, nodes_y: usize) -> Result<(), ScatError> {
        if self.x0 + self.width > nodes_x || self.y0 + self.height > nodes_y {
            return Err(ScatError::RoiOutOfBounds {
                x0: self.x0,
                y0: self.y0,
                width: self.width,
                height: self.height,
                nodes_x,
                nodes_y,
            });
        }
        Ok(())
    }
}

/// Which family of a basis a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// The illumination side (x family).
    Incident,
    /// The response side (y family).
    Scattered,
}

/// Half-maximum region around an intensity peak, in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fwhm {
    /// Physical x coordinate of the seed peak.
    pub peak_x: f64,
    /// Physical y coordinate of the seed peak.
    pub peak_y: f64,
    /// Left edge of the bounding box.
    pub x_min: f64,
    /// Right edge of the bounding box.
    pub x_max: f64,
    /// Bottom edge of the bounding box.
    pub y_min: f64,
    /// Top edge of the bounding box.
    pub y_max: f64,
    /// Enclosed area: flooded node count times the node cell area.
    pub area: f64,
    /// Intensity at the seed peak.
    pub peak_intensity: f64,
}

impl Fwhm {
    /// Horizontal extent of the bounding box.
    pub fn horizontal(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Vertical extent of the bounding box.
    pub fn vertical(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Width-to-height ratio of the bounding box.
    pub fn aspect_ratio(&self) -> f64 {
        self.horizontal() / self.vertical()
    }
}
