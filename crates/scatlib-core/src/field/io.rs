//! Binary persistence for near fields.
//!
//! Layout, after the 11-byte `NFB` signature: seven `f64` grid parameters
//! (`step_x`, `step_y`, `min_x`, `max_x`, `min_y`, `max_y`, `wavelength`),
//! three `i32` shape parameters (`nodes_x`, `nodes_y`, component count),
//! then the raw plane-major complex buffer. All values little-endian.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::codec;
use crate::error::ScatError;
use crate::field::{NearField, DIM};

const FIELD_TAG: &[u8; 3] = b"NFB";

impl NearField {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScatError> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_to(&mut w)?;
        w.flush()?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScatError> {
        let mut r = BufReader::new(File::open(path)?);
        Self::read_from(&mut r)
    }

    pub(crate) fn write_to<W: Write>(&self, w: &mut W) -> Result<(), ScatError> {
        codec::write_signature(w, FIELD_TAG)?;
        codec::write_f64(w, self.step_x)?;
        codec::write_f64(w, self.step_y)?;
        codec::write_f64(w, self.min_x)?;
        codec::write_f64(w, self.max_x)?;
        codec::write_f64(w, self.min_y)?;
        codec::write_f64(w, self.max_y)?;
        codec::write_f64(w, self.wavelength)?;
        codec::write_i32(w, self.nodes_x as i32)?;
        codec::write_i32(w, self.nodes_y as i32)?;
        codec::write_i32(w, DIM as i32)?;
        for value in &self.data {
            codec::write_complex(w, *value)?;
        }
        Ok(())
    }

    /// Read a field from a stream. The stored domain maxima are taken
    /// verbatim rather than re-derived from the grid step.
    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, ScatError> {
        codec::expect_signature(r, FIELD_TAG, "near-field")?;
        let step_x = codec::read_f64(r)?;
        let step_y = codec::read_f64(r)?;
        let min_x = codec::read_f64(r)?;
        let max_x = codec::read_f64(r)?;
        let min_y = codec::read_f64(r)?;
        let max_y = codec::read_f64(r)?;
        let wavelength = codec::read_f64(r)?;
        let nodes_x = codec::read_count(r, "x node count")?;
        let nodes_y = codec::read_count(r, "y node count")?;
        let dim = codec::read_count(r, "component count")?;
        if dim != DIM {
            return Err(ScatError::MalformedFile(format!(
                "unsupported component count {dim}, expected {DIM}"
            )));
        }
        let len = DIM * nodes_x * nodes_y;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len {
            data.push(codec::read_complex(r)?);
        }
        Ok(Self {
            nodes_x,
            nodes_y,
            step_x,
            step_y,
            min_x,
            max_x,
            min_y,
            max_y,
            wavelength,
            data,
        })
    }
}
