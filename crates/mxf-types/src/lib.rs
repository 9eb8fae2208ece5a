//! RP 210 type codecs.
//!
//! Every MXF/AAF local-set field is typed by an RP 210 type name (e.g.
//! `"UInt32"`, `"StrongReference"`, `"16 bit Unicode String"`) rather than
//! carrying its type on the wire. [`registry::read`]/[`registry::write`]
//! dispatch a type name to the codec that owns it and decode/encode the
//! raw bytes into an [`RpValue`].
//!
//! # Example
//!
//! ```
//! use mxf_types::{registry, RpValue};
//!
//! let value = RpValue::Integer { width: 4, value: 42 };
//! let bytes = registry::write("UInt32", &value).unwrap();
//! assert_eq!(registry::read("UInt32", &bytes).unwrap(), value);
//! ```

pub mod codec;
pub mod registry;
mod value;

pub use value::{AvidEscapeKind, ReferenceKind, RpValue, StringValue, Timestamp};
