//! Property-based tests for the wire codec.
//!
//! These validate the BER round-trip laws in isolation, without sockets:
//! anything the encoder produces must decode back to the same structure,
//! and the inform-response law must hold for every request-id and binding
//! list, including the empty list.

use bytes::Bytes;
use proptest::prelude::*;

use trapsink::ber::{Decoder, EncodeBuf};
use trapsink::oid::Oid;
use trapsink::pdu::{GenericTrap, Pdu, PduType, TrapV1Pdu};
use trapsink::value::Value;
use trapsink::varbind::VarBind;
use trapsink::version::Version;
use trapsink::CommunityMessage;

/// Strategy for generating valid OIDs that can round-trip through BER.
///
/// Arc constraints per X.690 Section 8.19: arc1 in 0..3, arc2 below 40
/// (the first subidentifier folds both together).
fn arb_oid() -> impl Strategy<Value = Oid> {
    (0u32..3, 0u32..40, prop::collection::vec(0u32..100_000, 0..10)).prop_map(
        |(arc1, arc2, rest)| {
            let mut arcs = vec![arc1, arc2];
            arcs.extend(rest);
            Oid::from_slice(&arcs)
        },
    )
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(Value::Integer),
        prop::collection::vec(any::<u8>(), 0..256)
            .prop_map(|v| Value::OctetString(Bytes::from(v))),
        Just(Value::Null),
        arb_oid().prop_map(Value::ObjectIdentifier),
        any::<[u8; 4]>().prop_map(Value::IpAddress),
        any::<u32>().prop_map(Value::Counter32),
        any::<u32>().prop_map(Value::Gauge32),
        any::<u32>().prop_map(Value::TimeTicks),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(|v| Value::Opaque(Bytes::from(v))),
        any::<u64>().prop_map(Value::Counter64),
        Just(Value::NoSuchObject),
        Just(Value::NoSuchInstance),
        Just(Value::EndOfMibView),
    ]
}

fn arb_varbind() -> impl Strategy<Value = VarBind> {
    (arb_oid(), arb_value()).prop_map(|(oid, value)| VarBind::new(oid, value))
}

fn arb_varbinds() -> impl Strategy<Value = Vec<VarBind>> {
    prop::collection::vec(arb_varbind(), 0..8)
}

proptest! {
    #[test]
    fn oid_ber_roundtrip(oid in arb_oid()) {
        let decoded = Oid::from_ber(&oid.to_ber()).unwrap();
        prop_assert_eq!(decoded, oid);
    }

    #[test]
    fn value_ber_roundtrip(value in arb_value()) {
        let mut buf = EncodeBuf::new();
        value.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        let decoded = Value::decode(&mut decoder).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn varbind_ber_roundtrip(varbind in arb_varbind()) {
        let mut buf = EncodeBuf::new();
        varbind.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        let decoded = VarBind::decode(&mut decoder).unwrap();
        prop_assert_eq!(decoded, varbind);
    }

    /// decode(encode_response(id, bindings)) == (id, 0, 0, bindings),
    /// for every request-id and every binding list.
    #[test]
    fn response_roundtrip_law(
        request_id in any::<i32>(),
        varbinds in arb_varbinds(),
        community in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let inform = Pdu {
            pdu_type: PduType::InformRequest,
            request_id,
            error_status: 0,
            error_index: 0,
            varbinds: varbinds.clone(),
        };

        let encoded =
            CommunityMessage::new(Version::V2c, community.clone(), inform.to_response())
                .encode();

        let decoded =
            CommunityMessage::decode_expecting(encoded, PduType::Response).unwrap();

        prop_assert_eq!(decoded.pdu.request_id, request_id);
        prop_assert_eq!(decoded.pdu.error_status, 0);
        prop_assert_eq!(decoded.pdu.error_index, 0);
        prop_assert_eq!(decoded.pdu.varbinds, varbinds);
        prop_assert_eq!(decoded.community.as_ref(), community.as_slice());
    }

    /// Every v2c message shape round-trips with its fields intact.
    #[test]
    fn v2_message_roundtrip(
        request_id in any::<i32>(),
        varbinds in arb_varbinds(),
        is_inform in any::<bool>(),
    ) {
        let pdu_type = if is_inform {
            PduType::InformRequest
        } else {
            PduType::TrapV2
        };

        let msg = CommunityMessage::new(
            Version::V2c,
            b"public".as_slice(),
            Pdu {
                pdu_type,
                request_id,
                error_status: 0,
                error_index: 0,
                varbinds: varbinds.clone(),
            },
        );

        let decoded = CommunityMessage::decode_expecting(msg.encode(), pdu_type).unwrap();
        prop_assert_eq!(decoded.pdu.request_id, request_id);
        prop_assert_eq!(decoded.pdu.varbinds, varbinds);
    }

    /// v1 Trap-PDUs round-trip with all six fields intact.
    #[test]
    fn trap_v1_roundtrip(
        enterprise in arb_oid(),
        agent_addr in any::<[u8; 4]>(),
        generic in 0i32..7,
        specific in any::<i32>(),
        time_stamp in any::<u32>(),
        varbinds in arb_varbinds(),
    ) {
        let trap = TrapV1Pdu::new(
            enterprise.clone(),
            agent_addr,
            GenericTrap::from_i32(generic).unwrap(),
            specific,
            time_stamp,
            varbinds.clone(),
        );

        let mut buf = EncodeBuf::new();
        trap.encode(&mut buf);
        let mut decoder = Decoder::new(buf.finish());
        let decoded = TrapV1Pdu::decode(&mut decoder).unwrap();

        prop_assert_eq!(decoded.enterprise, enterprise);
        prop_assert_eq!(decoded.agent_addr, agent_addr);
        prop_assert_eq!(decoded.generic_trap, generic);
        prop_assert_eq!(decoded.specific_trap, specific);
        prop_assert_eq!(decoded.time_stamp, time_stamp);
        prop_assert_eq!(decoded.varbinds, varbinds);
    }

    /// Arbitrary bytes never panic the decoder: the trial decode either
    /// succeeds or reports an error.
    #[test]
    fn decoder_never_panics_on_garbage(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = CommunityMessage::decode_expecting(
            Bytes::from(data.clone()),
            PduType::InformRequest,
        );
        let mut decoder = Decoder::new(Bytes::from(data));
        let _ = TrapV1Pdu::decode(&mut decoder);
    }
}
