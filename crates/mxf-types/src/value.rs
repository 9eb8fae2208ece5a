//! The decoded-value sum type every RP 210 codec reads into and writes from.

/// Which flavor of reference a `Reference`-family RP 210 type carries.
///
/// Only `StrongReference` is singled out because graph traversal needs to
/// tell strong edges apart from everything else (weak references, UMIDs,
/// UUIDs, package IDs, ...); the rest keep their matched RP 210 spelling so
/// diagnostics can still show what the field actually claimed to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    StrongReference,
    WeakReference,
    Other(String),
}

/// An Avid-specific escape smuggled through the `String` type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvidEscapeKind {
    /// A UTF-16LE string prefixed with the Avid "16-bit attribute list" key.
    Utf16Le,
    /// A 32-bit integer, byte-reversed, prefixed with the Avid int32 key.
    Int32,
}

/// The decoded form of an RP 210 `String`-family value.
///
/// RP 210 strings are nominally UTF-16BE, but Avid writes two escape forms
/// through the same field (a UTF-16LE attribute-list blob and a
/// byte-reversed 32-bit duration) that don't survive a UTF-16BE decode.
/// Modeling them as a closed enum instead of sniffing a string prefix at
/// every call site keeps the write path total: only `Unencodable` ever
/// refuses to re-serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringValue {
    Unicode(String),
    AvidEscaped { kind: AvidEscapeKind, payload: String },
    /// A value whose leading 17 bytes didn't match either known Avid escape
    /// and whose bytes also aren't valid UTF-16BE. Diagnostic-only: it
    /// carries the original bytes for display but cannot be re-encoded.
    Unencodable { avid_type_hex: String, raw: Vec<u8> },
}

/// A decoded MXF/AAF timestamp, or `None` for the all-zero "unknown" value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: i16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    /// Microseconds, quantized to multiples of 400,000 by the wire format
    /// (see [`crate::codec::compound`] for the read/write formula).
    pub microsecond: u32,
}

/// A decoded RP 210 field value.
#[derive(Debug, Clone, PartialEq)]
pub enum RpValue {
    Reference {
        bytes: [u8; 16],
        kind: ReferenceKind,
    },
    /// `ProductVersion` (5 components) or `VersionType` (2 components),
    /// widened to `u32` regardless of their per-field wire width.
    Version(Vec<u32>),
    Integer {
        width: u8,
        value: u64,
    },
    Boolean(bool),
    TimeStamp(Option<Timestamp>),
    String(StringValue),
    Rational {
        numerator: u32,
        denominator: u32,
    },
    Length(i64),
    XID(u32),
    Array {
        subtype: String,
        items: Vec<RpValue>,
    },
    VariableArray {
        subtype: String,
        items: Vec<RpValue>,
    },
    AvidOffset(u64),
    /// `major, minor, tertiary, patch_level, kind` (5 components).
    AvidVersion(Vec<u32>),
    /// Passthrough bytes for a field whose type could not be resolved (an
    /// unknown UL, or a local tag missing from the primer). Stored verbatim
    /// so the value round-trips byte-for-byte even though its meaning is
    /// unknown.
    Raw(Vec<u8>),
}
