//! # scatlib-core
//!
//! Numerical core for sampled electromagnetic near fields: a complex
//! 3-component vector field on a regular 2D grid, a reduced biorthogonal
//! basis that links an incident field family to its scattered counterpart,
//! and a wavefront-shaping optimizer that concentrates scattered energy
//! inside a rectangular region of interest.
//!
//! ## Architecture
//!
//! [`NearField`] is the leaf data type: arithmetic, Simpson-rule overlap
//! integrals, peak/half-maximum analysis, and `.bin` persistence.
//! [`Basis`] builds on the field numerics via pairwise Gram matrices and a
//! generalized SVD, and persists to a binary index file with companion
//! `IN_FIELDS/` / `OUT_FIELDS/` directories. [`focus`] consumes a basis and
//! a [`Roi`] to produce a focused field.
//!
//! ## Modules
//!
//! - [`types`] — plain data types (grid geometry, ROI, FWHM report).
//! - [`field`] — the near-field data type and its numerics.
//! - [`codec`] — shared little-endian binary record primitives.
//! - [`gram`] — pairwise overlap-integral matrices.
//! - [`basis`] — biorthogonal basis construction, queries, persistence.
//! - [`shaping`] — the two-stage focusing optimizer.

pub mod basis;
pub mod codec;
pub mod error;
pub mod field;
pub mod gram;
pub mod shaping;
pub mod types;

pub use basis::Basis;
pub use error::ScatError;
pub use field::NearField;
pub use shaping::{focus, FocusConfig};
pub use types::{FieldKind, Fwhm, GridGeometry, Roi};
