//! KLV/BER framing primitives shared by the rest of the mxf-* workspace.
//!
//! This crate provides the low-level building blocks for MXF parsing:
//!
//! - [`ber`] - BER length codec (short/long form)
//! - [`klv`] - KLV key+length framing over a seekable stream
//! - [`Ul`] - 16-byte Universal Label identifier
//! - [`Error`] / [`Result`] - the error type shared across the workspace
//!
//! # Example
//!
//! ```
//! use mxf_core::ber;
//!
//! let encoded = ber::encode(256, None, true).unwrap();
//! assert_eq!(encoded, vec![0x82, 0x01, 0x00]);
//! ```

pub mod ber;
mod error;
pub mod klv;
mod ul;

pub use error::{Error, Result};
pub use klv::KlvHeader;
pub use ul::Ul;
