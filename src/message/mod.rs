//! Community-based SNMP message format (v1/v2c).
//!
//! V1 and v2c messages share the same outer structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The only difference is the version number (0 for v1, 1 for v2c).

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::{Pdu, PduType, TrapV1Pdu};
use crate::version::Version;
use bytes::Bytes;

/// Community-based SNMP message carrying a v2c-structured PDU.
#[derive(Debug, Clone)]
pub struct CommunityMessage {
    /// SNMP version (V1 or V2c)
    pub version: Version,
    /// Community string; carried but not used for authentication
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: Pdu,
}

impl CommunityMessage {
    /// Create a new community message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Encode to BER.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();

        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });

        buf.finish()
    }

    /// Attempt to decode a message whose PDU has the expected type.
    ///
    /// This is one trial of the shape-disambiguation policy: the header is
    /// parsed, then the PDU tag is required to match `expected`. Any
    /// mismatch or structural error is reported as an `Err` so the caller
    /// can try the next shape on the same bytes.
    pub fn decode_expecting(data: Bytes, expected: PduType) -> Result<Self> {
        let mut decoder = Decoder::new(data);
        let mut seq = decoder.read_sequence()?;

        let version = read_version(&mut seq)?;
        let community = seq.read_octet_string()?;
        let pdu = Pdu::decode_expecting(&mut seq, expected)?;

        Ok(CommunityMessage {
            version,
            community,
            pdu,
        })
    }
}

/// Read and validate the version field of a message header.
fn read_version(seq: &mut Decoder) -> Result<Version> {
    let offset = seq.offset();
    let version_num = seq.read_integer()?;
    Version::from_i32(version_num)
        .ok_or_else(|| Error::decode(offset, DecodeErrorKind::UnknownVersion(version_num)))
}

/// Attempt to decode a legacy SNMPv1 Trap message (PDU tag 0xA4).
///
/// The v1 Trap-PDU does not fit [`Pdu`]'s request-id layout, so it gets
/// its own trial function. Returns the header fields alongside the trap.
pub(crate) fn decode_trap_v1(data: Bytes) -> Result<(Version, Bytes, TrapV1Pdu)> {
    let mut decoder = Decoder::new(data);
    let mut seq = decoder.read_sequence()?;

    let version = read_version(&mut seq)?;
    let community = seq.read_octet_string()?;
    let trap = TrapV1Pdu::decode(&mut seq)?;

    Ok((version, community, trap))
}

/// Parse a message header and return the PDU tag byte (with its offset)
/// without decoding the PDU body.
///
/// Used for error reporting once every recognized shape has been tried
/// and rejected.
pub(crate) fn peek_pdu_tag(data: Bytes) -> Result<(usize, u8)> {
    let mut decoder = Decoder::new(data);
    let mut seq = decoder.read_sequence()?;

    read_version(&mut seq)?;
    seq.read_octet_string()?;

    let offset = seq.offset();
    let tag = seq
        .peek_tag()
        .ok_or_else(|| Error::decode(offset, DecodeErrorKind::TruncatedData))?;
    Ok((offset, tag))
}
