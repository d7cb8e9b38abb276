//! SNMP Protocol Data Units (PDUs).
//!
//! Only the notification shapes and the Response sent for informs are
//! modeled: the v2c-style PDU (`SEQUENCE { request-id, error-status,
//! error-index, varbinds }` under tags 0xA2/0xA6/0xA7) and the legacy
//! SNMPv1 Trap-PDU with its distinct field layout (tag 0xA4).

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::Result;
use crate::oid::Oid;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
///
/// The wire tags are the context-class constructed encodings of the
/// application tags defined by RFC 1157 (Trap=4) and RFC 1905
/// (Response=2, Inform=6, SNMPv2-Trap=7). No other PDU types are
/// recognized by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PduType {
    Response = tag::pdu::RESPONSE,
    TrapV1 = tag::pdu::TRAP_V1,
    InformRequest = tag::pdu::INFORM_REQUEST,
    TrapV2 = tag::pdu::TRAP_V2,
}

impl PduType {
    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response => write!(f, "Response"),
            Self::TrapV1 => write!(f, "TrapV1"),
            Self::InformRequest => write!(f, "InformRequest"),
            Self::TrapV2 => write!(f, "TrapV2"),
        }
    }
}

/// A v2c-structured PDU: SNMPv2-Trap, InformRequest, or Response.
#[derive(Debug, Clone)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID; correlates an inform with its response
    pub request_id: i32,
    /// Error status (always 0 in the messages this crate produces)
    pub error_status: i32,
    /// Error index (1-based index of problematic varbind)
    pub error_index: i32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl Pdu {
    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_integer(self.error_index);
            buf.push_integer(self.error_status);
            buf.push_integer(self.request_id);
        });
    }

    /// Attempt to decode a PDU of a specific expected type.
    ///
    /// The tag is checked first, so trying the wrong shape fails cheaply
    /// without touching the PDU body. Never panics on malformed input.
    pub fn decode_expecting(decoder: &mut Decoder, expected: PduType) -> Result<Self> {
        let mut body = decoder.read_constructed(expected.tag())?;

        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let error_index = body.read_integer()?;
        let varbinds = decode_varbind_list(&mut body)?;

        Ok(Pdu {
            pdu_type: expected,
            request_id,
            error_status,
            error_index,
            varbinds,
        })
    }

    /// Create the Response-PDU acknowledging this inform.
    ///
    /// RFC 1905 Section 4.2.7: the response carries the same request-id
    /// and the unmodified variable bindings, with error-status and
    /// error-index zero.
    pub fn to_response(&self) -> Self {
        Self {
            pdu_type: PduType::Response,
            request_id: self.request_id,
            error_status: 0,
            error_index: 0,
            varbinds: self.varbinds.clone(),
        }
    }
}

/// SNMPv1 generic trap types (RFC 1157 Section 4.1.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum GenericTrap {
    /// coldStart(0) - agent is reinitializing, config may change
    ColdStart = 0,
    /// warmStart(1) - agent is reinitializing, config unchanged
    WarmStart = 1,
    /// linkDown(2) - communication link failure
    LinkDown = 2,
    /// linkUp(3) - communication link came up
    LinkUp = 3,
    /// authenticationFailure(4) - improperly authenticated message received
    AuthenticationFailure = 4,
    /// egpNeighborLoss(5) - EGP peer marked down
    EgpNeighborLoss = 5,
    /// enterpriseSpecific(6) - vendor-specific trap, see specific_trap field
    EnterpriseSpecific = 6,
}

impl GenericTrap {
    /// Create from integer value.
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(Self::ColdStart),
            1 => Some(Self::WarmStart),
            2 => Some(Self::LinkDown),
            3 => Some(Self::LinkUp),
            4 => Some(Self::AuthenticationFailure),
            5 => Some(Self::EgpNeighborLoss),
            6 => Some(Self::EnterpriseSpecific),
            _ => None,
        }
    }

    /// Get the integer value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// SNMPv1 Trap PDU (RFC 1157 Section 4.1.6).
///
/// This PDU has a completely different structure from the v2c shapes:
/// `SEQUENCE { enterprise, agent-addr, generic-trap, specific-trap,
/// time-stamp, varbinds }`.
#[derive(Debug, Clone)]
pub struct TrapV1Pdu {
    /// Enterprise OID (sysObjectID of the entity generating the trap)
    pub enterprise: Oid,
    /// Agent address (IP address of the agent generating the trap)
    pub agent_addr: [u8; 4],
    /// Generic trap type (0-6)
    pub generic_trap: i32,
    /// Specific trap code (meaningful when generic_trap is enterpriseSpecific)
    pub specific_trap: i32,
    /// Time since the agent was last (re)initialized, in hundredths of seconds
    pub time_stamp: u32,
    /// Variable bindings
    pub varbinds: Vec<VarBind>,
}

impl TrapV1Pdu {
    /// Create a new SNMPv1 Trap PDU.
    pub fn new(
        enterprise: Oid,
        agent_addr: [u8; 4],
        generic_trap: GenericTrap,
        specific_trap: i32,
        time_stamp: u32,
        varbinds: Vec<VarBind>,
    ) -> Self {
        Self {
            enterprise,
            agent_addr,
            generic_trap: generic_trap.as_i32(),
            specific_trap,
            time_stamp,
            varbinds,
        }
    }

    /// Get the generic trap type as an enum.
    pub fn generic_trap_enum(&self) -> Option<GenericTrap> {
        GenericTrap::from_i32(self.generic_trap)
    }

    /// Check if this is an enterprise-specific trap.
    pub fn is_enterprise_specific(&self) -> bool {
        self.generic_trap == GenericTrap::EnterpriseSpecific as i32
    }

    /// Translate to the SNMPv2 snmpTrapOID.0 value (RFC 3584 Section 3).
    ///
    /// - Generic traps 0-5 map to `snmpTraps.{generic_trap + 1}`
    ///   (1.3.6.1.6.3.1.1.5.{1-6})
    /// - Enterprise-specific traps map to `enterprise.0.specific_trap`
    ///
    /// # Example
    ///
    /// ```rust
    /// use trapsink::pdu::{TrapV1Pdu, GenericTrap};
    /// use trapsink::oid;
    ///
    /// let trap = TrapV1Pdu::new(
    ///     oid!(1, 3, 6, 1, 4, 1, 9999),
    ///     [192, 168, 1, 1],
    ///     GenericTrap::LinkDown,
    ///     0,
    ///     12345,
    ///     vec![],
    /// );
    /// assert_eq!(trap.v2_trap_oid(), oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3));
    /// ```
    pub fn v2_trap_oid(&self) -> Oid {
        if self.is_enterprise_specific() {
            let mut arcs: Vec<u32> = self.enterprise.arcs().to_vec();
            arcs.push(0);
            arcs.push(self.specific_trap as u32);
            Oid::new(arcs)
        } else {
            // snmpTraps = 1.3.6.1.6.3.1.1.5
            let trap_num = self.generic_trap + 1;
            crate::oid!(1, 3, 6, 1, 6, 3, 1, 1, 5).child(trap_num as u32)
        }
    }

    /// Encode to BER.
    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(tag::pdu::TRAP_V1, |buf| {
            encode_varbind_list(buf, &self.varbinds);
            buf.push_unsigned32(tag::application::TIMETICKS, self.time_stamp);
            buf.push_integer(self.specific_trap);
            buf.push_integer(self.generic_trap);
            // agent-addr is NetworkAddress: APPLICATION 0 IMPLICIT
            // IpAddress, an OCTET STRING of exactly 4 bytes
            buf.push_ip_address(self.agent_addr);
            buf.push_oid(&self.enterprise);
        });
    }

    /// Attempt to decode a Trap-PDU (tag 0xA4).
    ///
    /// Like [`Pdu::decode_expecting`], a tag mismatch fails before the
    /// body is parsed.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut body = decoder.read_constructed(tag::pdu::TRAP_V1)?;

        let enterprise = body.read_oid()?;
        let agent_addr = body.read_ip_address()?;
        let generic_trap = body.read_integer()?;
        let specific_trap = body.read_integer()?;
        let time_stamp = body.read_unsigned32(tag::application::TIMETICKS)?;
        let varbinds = decode_varbind_list(&mut body)?;

        Ok(TrapV1Pdu {
            enterprise,
            agent_addr,
            generic_trap,
            specific_trap,
            time_stamp,
            varbinds,
        })
    }
}
