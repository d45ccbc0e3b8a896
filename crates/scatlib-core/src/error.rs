//! Error taxonomy for the scatlib core.
//!
//! Three families: format errors (bad file signatures, malformed records,
//! incompatible field geometry), range errors (out-of-bounds regions,
//! coefficient-count mismatches), and propagated I/O errors. Everything is
//! raised synchronously to the immediate caller; nothing is retried.

use thiserror::Error;

/// Errors raised by field, basis, and shaping operations.
#[derive(Debug, Error)]
pub enum ScatError {
    /// The file does not start with the expected signature, or is too short
    /// to contain one.
    #[error("Bad or truncated file signature (expected \"{expected}\" v1.0)")]
    BadSignature { expected: &'static str },

    /// The signature matched but a later record is inconsistent.
    #[error("Malformed file: {0}")]
    MalformedFile(String),

    /// Two fields with different grid geometry were combined.
    #[error("Fields have different properties")]
    IncompatibleFields,

    /// A region of interest extends past the grid.
    #[error(
        "Region ({x0},{y0}) {width}x{height} goes beyond the borders of the {nodes_x}x{nodes_y} field"
    )]
    RoiOutOfBounds {
        x0: usize,
        y0: usize,
        width: usize,
        height: usize,
        nodes_x: usize,
        nodes_y: usize,
    },

    /// A raw component buffer does not match the grid it was paired with.
    #[error("Buffer holds {got} values, expected 3 * {nodes_x} * {nodes_y}")]
    BufferLength {
        got: usize,
        nodes_x: usize,
        nodes_y: usize,
    },

    /// The incident and scattered capture arrays differ in length.
    #[error("Input field arrays have different sizes ({incident} incident, {scattered} scattered)")]
    PairCountMismatch { incident: usize, scattered: usize },

    /// Basis construction was given no captures at all.
    #[error("No input field pairs provided")]
    NoInputFields,

    /// Requested more basis modes than there are input pairs.
    #[error("Requested {requested} basis modes from {available} input pairs")]
    ModeCount { requested: usize, available: usize },

    /// A coefficient vector does not match the active basis truncation.
    #[error(
        "The coefficient count ({given}) is not equal to the used basis field count ({expected} of {basis_size})"
    )]
    CoefficientCount {
        given: usize,
        expected: usize,
        basis_size: usize,
    },

    /// `compose_from_originals` was handed fewer original fields than the
    /// active truncation needs.
    #[error("Not enough original fields ({given}) for {expected} used basis modes")]
    OriginalFieldCount { given: usize, expected: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
