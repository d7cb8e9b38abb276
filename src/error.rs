//! Error types for trapsink.
//!
//! This module provides:
//!
//! - [`Error`] - The main error type for all library operations
//! - [`DecodeErrorKind`] / [`EncodeErrorKind`] - detailed BER codec failures
//! - [`OidErrorKind`] - OID construction/validation failures
//!
//! # Error Handling
//!
//! Every error is terminal for the datagram it belongs to: the receiver
//! surfaces it once to the handler and moves on. There is no global error
//! state and no retry anywhere in the library.
//!
//! ```rust
//! use trapsink::{Error, Result};
//!
//! fn classify(result: Result<()>) {
//!     match result {
//!         Ok(()) => println!("ok"),
//!         Err(Error::Decode { offset, kind }) => {
//!             println!("malformed PDU at offset {}: {}", offset, kind);
//!         }
//!         Err(Error::OversizedDatagram { size, capacity }) => {
//!             println!("datagram of {} bytes filled the {} byte buffer", size, capacity);
//!         }
//!         Err(e) => println!("error: {}", e),
//!     }
//! }
//! ```

use std::net::SocketAddr;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Invalid BER length encoding.
    InvalidLength,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Integer value overflow.
    IntegerOverflow,
    /// Integer64 too long.
    Integer64TooLong { length: usize },
    /// NULL with non-zero length.
    InvalidNull,
    /// Invalid IP address length.
    InvalidIpAddressLength { length: usize },
    /// Constructed OCTET STRING not supported.
    ConstructedOctetString,
    /// OID has too many arcs.
    OidTooLong { count: usize, max: usize },
    /// Unknown SNMP version.
    UnknownVersion(i32),
    /// PDU tag matched none of the recognized notification shapes.
    UnknownPduType(u8),
    /// Insufficient data for read.
    InsufficientData { needed: usize, available: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::InvalidLength => write!(f, "invalid length encoding"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::Integer64TooLong { length } => {
                write!(f, "integer64 too long: {} bytes", length)
            }
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::InvalidIpAddressLength { length } => {
                write!(f, "IP address must be 4 bytes, got {}", length)
            }
            Self::ConstructedOctetString => {
                write!(f, "constructed OCTET STRING (0x24) not supported")
            }
            Self::OidTooLong { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unrecognized PDU type: 0x{:02X}", t),
            Self::InsufficientData { needed, available } => {
                write!(f, "need {} bytes but only {} remaining", needed, available)
            }
        }
    }
}

/// BER encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// Encoded Response message would exceed the transport capacity bound.
    ///
    /// A Response echoes the fields of an inform that fit the receive
    /// buffer, so this indicates an internal invariant violation rather
    /// than a condition well-formed traffic can produce.
    ResponseTooLarge { size: usize, max: usize },
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResponseTooLarge { size, max } => {
                write!(
                    f,
                    "encoded response is {} bytes, exceeds maximum {}",
                    size, max
                )
            }
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Invalid arc value.
    InvalidArc,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// The main error type for all trapsink operations.
///
/// Each variant maps to one failure class of the receive pipeline. All
/// variants are per-datagram except [`Error::Io`] with `target: None`,
/// which reports a failed socket read, and [`Error::Config`], which is
/// only produced at construction time.
///
/// # Checking Error Type
///
/// ```
/// use trapsink::Error;
///
/// fn is_wire_error(error: &Error) -> bool {
///     matches!(error, Error::Decode { .. } | Error::OversizedDatagram { .. })
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error at the socket layer (bind, read, or response write).
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// Datagram filled the receive buffer and was treated as truncated.
    ///
    /// Size-equals-capacity is the truncation heuristic: the buffer is
    /// sized to exceed any valid PDU, so an exact fill means bytes were
    /// lost and the datagram is not decodable.
    #[error("datagram of {size} bytes filled the {capacity} byte receive buffer")]
    OversizedDatagram { size: usize, capacity: usize },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// BER encoding error while building an inform Response.
    #[error("encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },

    /// Configuration error.
    ///
    /// Returned when receiver configuration is invalid (e.g., an
    /// unparseable bind address).
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an encode error.
    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Get the remote address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Io { target, .. } => *target,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_size_budget() {
        // Error is passed by value through handler callbacks; keep it small.
        assert!(
            std::mem::size_of::<Error>() <= 64,
            "Error size {} exceeds 64-byte budget",
            std::mem::size_of::<Error>()
        );
    }

    #[test]
    fn decode_error_display() {
        let err = Error::decode(
            7,
            DecodeErrorKind::UnexpectedTag {
                expected: 0xA6,
                actual: 0xA0,
            },
        );
        assert_eq!(
            err.to_string(),
            "decode error at offset 7: expected tag 0xA6, got 0xA0"
        );
    }

    #[test]
    fn oversized_error_display() {
        let err = Error::OversizedDatagram {
            size: 65536,
            capacity: 65536,
        };
        assert!(err.to_string().contains("65536"));
    }
}
