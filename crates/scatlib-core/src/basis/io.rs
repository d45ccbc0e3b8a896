//! Binary persistence for a basis and its companion field files.
//!
//! The index file holds, after the 11-byte `BSB` signature: the basis size,
//! the byte lengths of the incident then scattered mode file names, the
//! UTF-16LE file names themselves, the singular values, and the conversion
//! coefficient matrices prefixed by their shared dimensions. The basis fields
//! live next to the index file in `IN_FIELDS/` and `OUT_FIELDS/`
//! subdirectories, one near-field file per mode.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ndarray::Array2;
use num_complex::Complex64;

use crate::basis::Basis;
use crate::codec;
use crate::error::ScatError;
use crate::field::NearField;

const BASIS_TAG: &[u8; 3] = b"BSB";
const IN_FIELDS: &str = "IN_FIELDS";
const OUT_FIELDS: &str = "OUT_FIELDS";

fn mode_filename(prefix: &str, index: usize) -> String {
    format!("{prefix}_basis_{index:03}.bin")
}

impl Basis {
    /// Save the basis index file at `path` and the mode fields in
    /// `IN_FIELDS/` and `OUT_FIELDS/` next to it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ScatError> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let in_names: Vec<String> = (0..self.basis_size)
            .map(|i| mode_filename("in", i))
            .collect();
        let out_names: Vec<String> = (0..self.basis_size)
            .map(|i| mode_filename("out", i))
            .collect();

        let mut w = BufWriter::new(File::create(path)?);
        codec::write_signature(&mut w, BASIS_TAG)?;
        codec::write_i32(&mut w, self.basis_size as i32)?;
        for name in &in_names {
            codec::write_i32(&mut w, codec::utf16_byte_len(name) as i32)?;
        }
        for name in &out_names {
            codec::write_i32(&mut w, codec::utf16_byte_len(name) as i32)?;
        }
        for name in &in_names {
            codec::write_utf16(&mut w, name)?;
        }
        for name in &out_names {
            codec::write_utf16(&mut w, name)?;
        }
        for value in &self.singular {
            codec::write_complex(&mut w, *value)?;
        }
        write_conversion(&mut w, &self.conv_incident, &self.conv_scattered)?;
        w.flush()?;

        let in_dir = dir.join(IN_FIELDS);
        let out_dir = dir.join(OUT_FIELDS);
        fs::create_dir_all(&in_dir)?;
        fs::create_dir_all(&out_dir)?;
        for (field, name) in self.x_basis.iter().zip(&in_names) {
            field.save(in_dir.join(name))?;
        }
        for (field, name) in self.y_basis.iter().zip(&out_names) {
            field.save(out_dir.join(name))?;
        }
        Ok(())
    }

    /// Load a basis saved by [`Basis::save`]. The loaded basis is fully
    /// active: `used_fields` resets to the basis size.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScatError> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut r = BufReader::new(File::open(path)?);

        codec::expect_signature(&mut r, BASIS_TAG, "basis")?;
        let basis_size = codec::read_count(&mut r, "basis size")?;
        // A basis always holds at least one mode; an empty one would make
        // every later operation index out of range.
        if basis_size == 0 {
            return Err(ScatError::MalformedFile("empty basis (size 0)".into()));
        }
        let mut in_lens = Vec::with_capacity(basis_size);
        for _ in 0..basis_size {
            in_lens.push(codec::read_count(&mut r, "file name length")?);
        }
        let mut out_lens = Vec::with_capacity(basis_size);
        for _ in 0..basis_size {
            out_lens.push(codec::read_count(&mut r, "file name length")?);
        }
        let mut in_names = Vec::with_capacity(basis_size);
        for &len in &in_lens {
            in_names.push(codec::read_utf16(&mut r, len)?);
        }
        let mut out_names = Vec::with_capacity(basis_size);
        for &len in &out_lens {
            out_names.push(codec::read_utf16(&mut r, len)?);
        }
        let mut singular = Vec::with_capacity(basis_size);
        for _ in 0..basis_size {
            singular.push(codec::read_complex(&mut r)?);
        }
        let (conv_incident, conv_scattered) = read_conversion(&mut r)?;

        let in_dir = dir.join(IN_FIELDS);
        let out_dir = dir.join(OUT_FIELDS);
        let mut x_basis = Vec::with_capacity(basis_size);
        for name in &in_names {
            x_basis.push(NearField::load(in_dir.join(name))?);
        }
        let mut y_basis = Vec::with_capacity(basis_size);
        for name in &out_names {
            y_basis.push(NearField::load(out_dir.join(name))?);
        }

        Ok(Self {
            basis_size,
            used_fields: basis_size,
            x_basis,
            y_basis,
            singular,
            conv_incident,
            conv_scattered,
        })
    }
}

fn write_conversion<W: Write>(
    w: &mut W,
    incident: &Array2<Complex64>,
    scattered: &Array2<Complex64>,
) -> Result<(), ScatError> {
    codec::write_i32(w, incident.nrows() as i32)?;
    codec::write_i32(w, incident.ncols() as i32)?;
    for value in incident.iter() {
        codec::write_complex(w, *value)?;
    }
    for value in scattered.iter() {
        codec::write_complex(w, *value)?;
    }
    Ok(())
}

fn read_conversion<R: Read>(
    r: &mut R,
) -> Result<(Array2<Complex64>, Array2<Complex64>), ScatError> {
    let rows = codec::read_count(r, "conversion row count")?;
    let cols = codec::read_count(r, "conversion column count")?;
    let read_matrix = |r: &mut R| -> Result<Array2<Complex64>, ScatError> {
        let mut values = Vec::with_capacity(rows * cols);
        for _ in 0..rows * cols {
            values.push(codec::read_complex(r)?);
        }
        Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| ScatError::MalformedFile(e.to_string()))
    };
    let incident = read_matrix(r)?;
    let scattered = read_matrix(r)?;
    Ok((incident, scattered))
}
