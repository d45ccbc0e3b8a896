//! Little-endian binary primitives shared by the field and basis file formats.
//!
//! Every on-disk file starts with an 11-byte signature: a 3-byte ASCII tag
//! followed by two `i32` format version numbers. All multi-byte values are
//! little-endian; complex numbers are stored as a real/imaginary `f64` pair.

use std::io::{Read, Write};

use num_complex::Complex64;

use crate::error::ScatError;

/// Major version written into every file signature.
pub const FORMAT_MAJOR: i32 = 1;
/// Minor version written into every file signature.
pub const FORMAT_MINOR: i32 = 0;

pub(crate) fn write_signature<W: Write>(w: &mut W, tag: &[u8; 3]) -> Result<(), ScatError> {
    w.write_all(tag)?;
    write_i32(w, FORMAT_MAJOR)?;
    write_i32(w, FORMAT_MINOR)?;
    Ok(())
}

/// Read and validate an 11-byte signature. A short or mismatched header is
/// reported as [`ScatError::BadSignature`] naming the expected format.
pub(crate) fn expect_signature<R: Read>(
    r: &mut R,
    tag: &[u8; 3],
    name: &'static str,
) -> Result<(), ScatError> {
    let mut header = [0u8; 11];
    r.read_exact(&mut header).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ScatError::BadSignature { expected: name }
        } else {
            ScatError::Io(e)
        }
    })?;
    let major = i32::from_le_bytes([header[3], header[4], header[5], header[6]]);
    let minor = i32::from_le_bytes([header[7], header[8], header[9], header[10]]);
    if &header[..3] != tag || major != FORMAT_MAJOR || minor != FORMAT_MINOR {
        return Err(ScatError::BadSignature { expected: name });
    }
    Ok(())
}

pub(crate) fn write_i32<W: Write>(w: &mut W, value: i32) -> Result<(), ScatError> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_i32<R: Read>(r: &mut R) -> Result<i32, ScatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read an `i32` used as an element count, rejecting negative values.
pub(crate) fn read_count<R: Read>(r: &mut R, what: &str) -> Result<usize, ScatError> {
    let value = read_i32(r)?;
    usize::try_from(value)
        .map_err(|_| ScatError::MalformedFile(format!("negative {what}: {value}")))
}

pub(crate) fn write_f64<W: Write>(w: &mut W, value: f64) -> Result<(), ScatError> {
    w.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn read_f64<R: Read>(r: &mut R) -> Result<f64, ScatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

pub(crate) fn write_complex<W: Write>(w: &mut W, value: Complex64) -> Result<(), ScatError> {
    write_f64(w, value.re)?;
    write_f64(w, value.im)?;
    Ok(())
}

pub(crate) fn read_complex<R: Read>(r: &mut R) -> Result<Complex64, ScatError> {
    let re = read_f64(r)?;
    let im = read_f64(r)?;
    Ok(Complex64::new(re, im))
}

/// Number of bytes [`write_utf16`] emits for `s`.
pub(crate) fn utf16_byte_len(s: &str) -> usize {
    s.encode_utf16().count() * 2
}

/// Write a string as UTF-16LE code units, without terminator or length prefix.
pub(crate) fn write_utf16<W: Write>(w: &mut W, s: &str) -> Result<(), ScatError> {
    for unit in s.encode_utf16() {
        w.write_all(&unit.to_le_bytes())?;
    }
    Ok(())
}

/// Read `byte_len` bytes and decode them as UTF-16LE.
pub(crate) fn read_utf16<R: Read>(r: &mut R, byte_len: usize) -> Result<String, ScatError> {
    if byte_len % 2 != 0 {
        return Err(ScatError::MalformedFile(format!(
            "odd UTF-16 byte length: {byte_len}"
        )));
    }
    let mut raw = vec![0u8; byte_len];
    r.read_exact(&mut raw)?;
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| ScatError::MalformedFile("invalid UTF-16 string".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn signature_round_trip() {
        let mut buf = Vec::new();
        write_signature(&mut buf, b"NFB").unwrap();
        assert_eq!(buf.len(), 11);
        expect_signature(&mut Cursor::new(&buf), b"NFB", "near-field").unwrap();
    }

    #[test]
    fn signature_mismatch_is_rejected() {
        let mut buf = Vec::new();
        write_signature(&mut buf, b"NFB").unwrap();
        let err = expect_signature(&mut Cursor::new(&buf), b"BSB", "basis").unwrap_err();
        assert!(matches!(err, ScatError::BadSignature { expected: "basis" }));
    }

    #[test]
    fn truncated_signature_is_rejected() {
        let err = expect_signature(&mut Cursor::new(b"NF"), b"NFB", "near-field").unwrap_err();
        assert!(matches!(err, ScatError::BadSignature { .. }));
    }

    #[test]
    fn scalar_round_trips() {
        let mut buf = Vec::new();
        write_i32(&mut buf, -17).unwrap();
        write_f64(&mut buf, 2.5e-7).unwrap();
        write_complex(&mut buf, Complex64::new(1.5, -0.25)).unwrap();
        let mut cur = Cursor::new(&buf);
        assert_eq!(read_i32(&mut cur).unwrap(), -17);
        assert_eq!(read_f64(&mut cur).unwrap(), 2.5e-7);
        assert_eq!(read_complex(&mut cur).unwrap(), Complex64::new(1.5, -0.25));
    }

    #[test]
    fn negative_count_is_rejected() {
        let mut buf = Vec::new();
        write_i32(&mut buf, -1).unwrap();
        let err = read_count(&mut Cursor::new(&buf), "mode count").unwrap_err();
        assert!(matches!(err, ScatError::MalformedFile(_)));
    }

    #[test]
    fn utf16_round_trip() {
        let s = "field_π_007.bin";
        let mut buf = Vec::new();
        write_utf16(&mut buf, s).unwrap();
        assert_eq!(buf.len(), utf16_byte_len(s));
        let back = read_utf16(&mut Cursor::new(&buf), buf.len()).unwrap();
        assert_eq!(back, s);
    }
}
