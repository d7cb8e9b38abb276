//! ASN.1 BER codec.
//!
//! SNMP messages are BER-encoded (X.690). This module provides the
//! [`Decoder`] for zero-copy reads over [`bytes::Bytes`], the reverse-order
//! [`EncodeBuf`] writer, and the tag constants used by the wire shapes this
//! crate recognizes.

mod decode;
mod encode;
mod length;

pub use decode::Decoder;
pub use encode::EncodeBuf;
pub use length::{MAX_LENGTH, decode_length, encode_length};

/// BER tag constants.
pub mod tag {
    /// Universal class tags (X.690).
    pub mod universal {
        pub const INTEGER: u8 = 0x02;
        pub const OCTET_STRING: u8 = 0x04;
        pub const NULL: u8 = 0x05;
        pub const OBJECT_IDENTIFIER: u8 = 0x06;
        pub const SEQUENCE: u8 = 0x30;
        /// Constructed OCTET STRING; documented by net-snmp but not parsed.
        pub const OCTET_STRING_CONSTRUCTED: u8 = 0x24;
    }

    /// SNMP application class tags (RFC 2578).
    pub mod application {
        pub const IP_ADDRESS: u8 = 0x40;
        pub const COUNTER32: u8 = 0x41;
        pub const GAUGE32: u8 = 0x42;
        pub const TIMETICKS: u8 = 0x43;
        pub const OPAQUE: u8 = 0x44;
        pub const COUNTER64: u8 = 0x46;
    }

    /// Context class tags for v2c exception values (RFC 3416).
    pub mod context {
        pub const NO_SUCH_OBJECT: u8 = 0x80;
        pub const NO_SUCH_INSTANCE: u8 = 0x81;
        pub const END_OF_MIB_VIEW: u8 = 0x82;
    }

    /// PDU tags: context-class constructed encodings of the RFC 1157 /
    /// RFC 1905 application tags (Response=2, Trap=4, Inform=6, Trap-v2=7).
    pub mod pdu {
        pub const RESPONSE: u8 = 0xA2;
        pub const TRAP_V1: u8 = 0xA4;
        pub const INFORM_REQUEST: u8 = 0xA6;
        pub const TRAP_V2: u8 = 0xA7;
    }
}
