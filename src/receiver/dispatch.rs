//! Wire shape disambiguation and inform acknowledgment synthesis.
//!
//! A datagram can hold one of three shapes: Inform-Request (0xA6),
//! SNMPv2c Trap (0xA7), or SNMPv1 Trap (0xA4). The shapes are tried in
//! that fixed priority order; tag-based decoding could spuriously succeed
//! on a structurally compatible but semantically wrong shape if attempted
//! out of order, so the order is part of the contract, not an
//! implementation detail.
//!
//! Decoding is stateless: each datagram is handled in isolation, with no
//! buffering across datagrams and no retries.

use bytes::Bytes;

use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};
use crate::message::{self, CommunityMessage};
use crate::pdu::PduType;

use super::Notification;

/// Outcome of decoding one datagram.
#[derive(Debug)]
pub(super) struct Dispatch {
    /// The canonical record to hand to the handler.
    pub notification: Notification,
    /// Encoded Response bytes to write back; informs only.
    pub ack: Option<Bytes>,
    /// Failure while building the ack. The notification is still
    /// delivered; the acknowledgment is skipped.
    pub ack_error: Option<Error>,
}

/// Disambiguate a datagram and build its acknowledgment when required.
///
/// `max_ack_size` bounds the encoded Response; a response echoing a
/// datagram that fit the receive buffer stays within it, so exceeding the
/// bound is an internal invariant violation surfaced as an encode error.
pub(super) fn dispatch_datagram(data: Bytes, max_ack_size: usize) -> Result<Dispatch> {
    // 1. Inform-Request: confirmed notification, response required.
    if let Ok(msg) = CommunityMessage::decode_expecting(data.clone(), PduType::InformRequest) {
        let (ack, ack_error) = match encode_ack(&msg, max_ack_size) {
            Ok(bytes) => (Some(bytes), None),
            Err(e) => (None, Some(e)),
        };
        return Ok(Dispatch {
            notification: v2_notification(msg),
            ack,
            ack_error,
        });
    }

    // 2. SNMPv2c Trap: fire-and-forget, no response.
    if let Ok(msg) = CommunityMessage::decode_expecting(data.clone(), PduType::TrapV2) {
        return Ok(Dispatch {
            notification: v2_notification(msg),
            ack: None,
            ack_error: None,
        });
    }

    // 3. Legacy SNMPv1 Trap: distinct PDU layout, no response.
    if let Ok((_version, community, trap)) = message::decode_trap_v1(data.clone()) {
        return Ok(Dispatch {
            notification: Notification::TrapV1 { community, trap },
            ack: None,
            ack_error: None,
        });
    }

    // 4. No shape matched. If the header itself parses, report which PDU
    // tag was carried; otherwise propagate the header parse error.
    let (offset, tag) = message::peek_pdu_tag(data)?;
    Err(Error::decode(offset, DecodeErrorKind::UnknownPduType(tag)))
}

/// Build the canonical v2c record from a decoded trap or inform message.
///
/// An acknowledged inform and a v2c trap normalize to the same record:
/// an inform is a trap that expected an ack.
fn v2_notification(msg: CommunityMessage) -> Notification {
    Notification::TrapV2 {
        community: msg.community,
        request_id: msg.pdu.request_id,
        error_status: msg.pdu.error_status,
        error_index: msg.pdu.error_index,
        varbinds: msg.pdu.varbinds,
    }
}

/// Encode the Response message acknowledging an inform.
///
/// Echoes the inform's version, community, request-id, and varbinds with
/// error-status and error-index zero, per RFC 1905.
fn encode_ack(msg: &CommunityMessage, max_ack_size: usize) -> Result<Bytes> {
    let response = CommunityMessage::new(msg.version, msg.community.clone(), msg.pdu.to_response());
    let bytes = response.encode();

    if bytes.len() > max_ack_size {
        return Err(Error::encode(EncodeErrorKind::ResponseTooLarge {
            size: bytes.len(),
            max: max_ack_size,
        }));
    }

    Ok(bytes)
}
