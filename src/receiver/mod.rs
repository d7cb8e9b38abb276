//! SNMP notification receiver.
//!
//! [`TrapReceiver`] listens for SNMPv1 Traps, SNMPv2c Traps, and
//! Inform-Requests on a UDP socket. Informs are acknowledged with a
//! Response-PDU automatically; both shapes of v2c notification are
//! delivered to the handler as the same [`Notification::TrapV2`] record.
//!
//! # Example
//!
//! ```rust,no_run
//! use trapsink::{Notification, TrapHandler, TrapReceiver};
//! use std::net::SocketAddr;
//!
//! struct Printer;
//!
//! impl TrapHandler for Printer {
//!     fn on_notification(&self, notification: Notification, source: SocketAddr) {
//!         println!("notification from {}: {:?}", source, notification);
//!     }
//!
//!     fn on_error(&self, error: trapsink::Error, source: Option<SocketAddr>) {
//!         eprintln!("error from {:?}: {}", source, error);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trapsink::Error> {
//!     // Port 162 requires root on most systems; use 1162 for testing
//!     let receiver = TrapReceiver::bind("0.0.0.0:1162").await?;
//!     receiver.run(Printer).await;
//!     Ok(())
//! }
//! ```
//!
//! # Shutdown
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), trapsink::Error> {
//! use trapsink::TrapReceiver;
//!
//! let receiver = TrapReceiver::bind("0.0.0.0:1162").await?;
//! let handle = {
//!     let receiver = receiver.clone();
//!     tokio::spawn(async move { receiver.run(MyHandler).await })
//! };
//!
//! // ... later, from any clone:
//! receiver.shutdown();
//! handle.await.unwrap();
//! # Ok(())
//! # }
//! # struct MyHandler;
//! # impl trapsink::TrapHandler for MyHandler {
//! #     fn on_notification(&self, _: trapsink::Notification, _: std::net::SocketAddr) {}
//! #     fn on_error(&self, _: trapsink::Error, _: Option<std::net::SocketAddr>) {}
//! # }
//! ```

mod dispatch;

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::pdu::TrapV1Pdu;
use crate::util::bind_udp_socket;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

use dispatch::dispatch_datagram;

/// Default bind address: wildcard IPv4, standard SNMP trap port.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:162";

/// Default receive buffer capacity.
///
/// Must exceed any valid PDU for this protocol: a datagram that exactly
/// fills the buffer is treated as truncated and rejected.
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 65536;

/// Well-known OIDs for notification varbinds.
pub mod oids {
    use crate::oid;

    /// sysUpTime.0 - first varbind in v2c notifications
    pub fn sys_uptime() -> crate::Oid {
        oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
    }

    /// snmpTrapOID.0 - second varbind in v2c notifications (trap type)
    pub fn snmp_trap_oid() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0)
    }

    /// snmpTrapEnterprise.0 - optional enterprise OID varbind
    pub fn snmp_trap_enterprise() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 3, 0)
    }

    /// Standard trap OID prefix (snmpTraps)
    pub fn snmp_traps() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5)
    }

    /// coldStart trap OID (snmpTraps.1)
    pub fn cold_start() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1)
    }

    /// warmStart trap OID (snmpTraps.2)
    pub fn warm_start() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 2)
    }

    /// linkDown trap OID (snmpTraps.3)
    pub fn link_down() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3)
    }

    /// linkUp trap OID (snmpTraps.4)
    pub fn link_up() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 4)
    }

    /// authenticationFailure trap OID (snmpTraps.5)
    pub fn auth_failure() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 5)
    }

    /// egpNeighborLoss trap OID (snmpTraps.6)
    pub fn egp_neighbor_loss() -> crate::Oid {
        oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 6)
    }
}

/// A received SNMP notification, normalized from its wire shape.
///
/// Exactly one record is produced per successfully decoded datagram.
#[derive(Debug, Clone)]
pub enum Notification {
    /// SNMPv1 Trap with its legacy PDU structure.
    TrapV1 {
        /// Community string carried by the message
        community: Bytes,
        /// The trap PDU
        trap: TrapV1Pdu,
    },

    /// SNMPv2c Trap or acknowledged Inform-Request.
    ///
    /// The two are indistinguishable to the handler by design: an inform
    /// is a trap that expected an acknowledgment, and the acknowledgment
    /// has already been sent by the time this record is delivered.
    TrapV2 {
        /// Community string carried by the message
        community: Bytes,
        /// Request ID from the PDU
        request_id: i32,
        /// Error status (0 for well-formed notifications)
        error_status: i32,
        /// Error index (0 for well-formed notifications)
        error_index: i32,
        /// Variable bindings, in source order; may be empty
        varbinds: Vec<VarBind>,
    },
}

impl Notification {
    /// Get the SNMP version of this notification.
    pub fn version(&self) -> Version {
        match self {
            Notification::TrapV1 { .. } => Version::V1,
            Notification::TrapV2 { .. } => Version::V2c,
        }
    }

    /// Get the community string.
    pub fn community(&self) -> &Bytes {
        match self {
            Notification::TrapV1 { community, .. } => community,
            Notification::TrapV2 { community, .. } => community,
        }
    }

    /// Get the variable bindings.
    pub fn varbinds(&self) -> &[VarBind] {
        match self {
            Notification::TrapV1 { trap, .. } => &trap.varbinds,
            Notification::TrapV2 { varbinds, .. } => varbinds,
        }
    }

    /// Get the uptime value, if present.
    ///
    /// For v1 this is the trap's time-stamp field. For v2c it is the
    /// sysUpTime.0 TimeTicks value RFC 3416 places in the first varbind;
    /// `None` if the sender omitted it.
    pub fn uptime(&self) -> Option<u32> {
        match self {
            Notification::TrapV1 { trap, .. } => Some(trap.time_stamp),
            Notification::TrapV2 { varbinds, .. } => match varbinds.first() {
                Some(VarBind {
                    value: Value::TimeTicks(t),
                    ..
                }) => Some(*t),
                _ => None,
            },
        }
    }

    /// Get the trap type OID, if present.
    ///
    /// For v1 this is the RFC 3584 translation of enterprise and
    /// generic/specific trap. For v2c it is the snmpTrapOID.0 value
    /// RFC 3416 places in the second varbind; `None` if absent.
    pub fn trap_oid(&self) -> Option<Oid> {
        match self {
            Notification::TrapV1 { trap, .. } => Some(trap.v2_trap_oid()),
            Notification::TrapV2 { varbinds, .. } => match varbinds.get(1) {
                Some(VarBind {
                    value: Value::ObjectIdentifier(oid),
                    ..
                }) => Some(oid.clone()),
                _ => None,
            },
        }
    }
}

/// Per-datagram delivery callback.
///
/// Exactly one of the two methods is invoked for each datagram (with one
/// exception: an inform whose acknowledgment could not be built or sent
/// surfaces that error *and* still delivers the notification).
///
/// Datagrams are processed as independent concurrent units, so both
/// methods may be invoked from many tasks at once: implementations must
/// be safe under concurrent invocation or serialize internally (an
/// `std::sync::Mutex` or an mpsc sender both work). A slow handler delays
/// only the delivery of its own result, never the receive loop.
pub trait TrapHandler: Send + Sync + 'static {
    /// Called with the normalized notification and the sender's address.
    fn on_notification(&self, notification: Notification, source: SocketAddr);

    /// Called when a datagram could not be processed.
    ///
    /// `source` is `None` for socket read failures, where the peer that
    /// caused the failure may be unknown.
    fn on_error(&self, error: Error, source: Option<SocketAddr>);
}

/// Builder for [`TrapReceiver`].
pub struct TrapReceiverBuilder {
    bind_addr: String,
    community: Option<Bytes>,
    recv_buffer_size: usize,
}

impl TrapReceiverBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Bind address: `0.0.0.0:162` (UDP, standard SNMP trap port)
    /// - No expected community string
    /// - 64 KiB receive buffer
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            community: None,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }

    /// Set the UDP bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the expected community string.
    ///
    /// The value is stored and exposed via [`TrapReceiver::community`],
    /// but incoming notifications are *not* filtered against it: the
    /// decoded community is carried on every [`Notification`] and the
    /// policy decision is left to the handler.
    pub fn community(mut self, community: impl Into<Bytes>) -> Self {
        self.community = Some(community.into());
        self
    }

    /// Set the receive buffer capacity.
    ///
    /// The capacity must exceed any valid PDU: a datagram that exactly
    /// fills the buffer is reported as [`Error::OversizedDatagram`] and
    /// never decoded. The default of 64 KiB is larger than any UDP
    /// payload; smaller values are mainly useful in tests.
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.recv_buffer_size = size;
        self
    }

    /// Bind the socket and build the receiver.
    pub async fn build(self) -> Result<TrapReceiver> {
        let bind_addr: SocketAddr = self
            .bind_addr
            .parse()
            .map_err(|_| Error::Config(format!("invalid bind address: {}", self.bind_addr)))?;

        let socket = bind_udp_socket(bind_addr).await.map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;

        let local_addr = socket.local_addr().map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;

        tracing::info!(
            target: "trapsink::receiver",
            local_addr = %local_addr,
            "listening for notifications"
        );

        Ok(TrapReceiver {
            inner: Arc::new(ReceiverInner {
                socket,
                local_addr,
                community: self.community,
                recv_buffer_size: self.recv_buffer_size,
                cancel: CancellationToken::new(),
            }),
        })
    }
}

impl Default for TrapReceiverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// SNMP notification receiver.
///
/// Owns one bound UDP socket. The receive loop reads datagrams
/// sequentially and dispatches each as an independent concurrent unit of
/// work, so one slow or malformed datagram never delays the next. The
/// number of in-flight units is unbounded; callers needing backpressure
/// under trap storms should wrap their handler accordingly.
///
/// Cloning is cheap (the socket is shared); [`shutdown`](Self::shutdown)
/// may be called from any clone.
pub struct TrapReceiver {
    inner: Arc<ReceiverInner>,
}

struct ReceiverInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    /// Configured community; carried for handler policy, never enforced
    community: Option<Bytes>,
    recv_buffer_size: usize,
    cancel: CancellationToken,
}

impl TrapReceiver {
    /// Create a builder for configuring the receiver.
    pub fn builder() -> TrapReceiverBuilder {
        TrapReceiverBuilder::new()
    }

    /// Bind to a local address with default settings.
    ///
    /// The standard SNMP notification port is 162.
    pub async fn bind(addr: impl Into<String>) -> Result<Self> {
        TrapReceiverBuilder::new().bind(addr).build().await
    }

    /// Get the local address this receiver is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Get the configured community string, if any.
    pub fn community(&self) -> Option<&Bytes> {
        self.inner.community.as_ref()
    }

    /// Request shutdown.
    ///
    /// Idempotent: safe to call more than once, from any clone. The
    /// receive loop terminates once its pending read unblocks; units
    /// already dispatched run to completion.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    /// Run the receive loop until [`shutdown`](Self::shutdown) is called.
    ///
    /// Each datagram is decoded, acknowledged if it is an inform, and
    /// delivered to `handler` in its own task. Shutdown-induced read
    /// failures are swallowed; all other per-datagram failures are
    /// surfaced once through [`TrapHandler::on_error`].
    pub async fn run<H: TrapHandler>(&self, handler: H) {
        let handler = Arc::new(handler);
        let mut buf = vec![0u8; self.inner.recv_buffer_size];

        loop {
            let (len, source) = tokio::select! {
                result = self.inner.socket.recv_from(&mut buf) => match result {
                    Ok(received) => received,
                    Err(e) => {
                        if self.inner.cancel.is_cancelled() {
                            return;
                        }
                        let handler = Arc::clone(&handler);
                        tokio::spawn(async move {
                            handler.on_error(Error::Io { target: None, source: e }, None);
                        });
                        continue;
                    }
                },
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(
                        target: "trapsink::receiver",
                        local_addr = %self.inner.local_addr,
                        "receiver shut down"
                    );
                    return;
                }
            };

            // Exact fill means the datagram may have been truncated: the
            // buffer is sized to exceed any valid PDU.
            if len == buf.len() {
                let error = Error::OversizedDatagram {
                    size: len,
                    capacity: buf.len(),
                };
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    handler.on_error(error, Some(source));
                });
                continue;
            }

            let data = Bytes::copy_from_slice(&buf[..len]);
            let inner = Arc::clone(&self.inner);
            let handler = Arc::clone(&handler);

            // Independent unit of work per datagram: decode, ack, deliver.
            // The loop never blocks on any of it.
            tokio::spawn(process_datagram(inner, data, source, handler));
        }
    }
}

impl Clone for TrapReceiver {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Decode one datagram, send the inform acknowledgment when applicable,
/// and deliver the result to the handler.
async fn process_datagram<H: TrapHandler>(
    inner: Arc<ReceiverInner>,
    data: Bytes,
    source: SocketAddr,
    handler: Arc<H>,
) {
    let dispatch = match dispatch_datagram(data, inner.recv_buffer_size) {
        Ok(dispatch) => dispatch,
        Err(e) => {
            tracing::debug!(
                target: "trapsink::receiver",
                source = %source,
                error = %e,
                "failed to decode notification"
            );
            handler.on_error(e, Some(source));
            return;
        }
    };

    if let Some(e) = dispatch.ack_error {
        tracing::warn!(
            target: "trapsink::receiver",
            source = %source,
            error = %e,
            "failed to build inform response"
        );
        handler.on_error(e, Some(source));
    }

    if let Some(ack) = dispatch.ack {
        // Best-effort, exactly one attempt. A failed write is surfaced
        // but never aborts delivery of the notification itself.
        match inner.socket.send_to(&ack, source).await {
            Ok(_) => {
                tracing::debug!(
                    target: "trapsink::receiver",
                    source = %source,
                    "sent inform response"
                );
            }
            Err(e) => {
                handler.on_error(
                    Error::Io {
                        target: Some(source),
                        source: e,
                    },
                    Some(source),
                );
            }
        }
    }

    handler.on_notification(dispatch.notification, source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::pdu::GenericTrap;

    #[test]
    fn test_builder_defaults() {
        let builder = TrapReceiverBuilder::new();
        assert_eq!(builder.bind_addr, DEFAULT_BIND_ADDR);
        assert!(builder.community.is_none());
        assert_eq!(builder.recv_buffer_size, DEFAULT_RECV_BUFFER_SIZE);
    }

    #[test]
    fn test_builder_settings() {
        let builder = TrapReceiverBuilder::new()
            .bind("127.0.0.1:1162")
            .community(b"private".as_slice())
            .recv_buffer_size(4096);
        assert_eq!(builder.bind_addr, "127.0.0.1:1162");
        assert_eq!(builder.community.as_deref(), Some(b"private".as_slice()));
        assert_eq!(builder.recv_buffer_size, 4096);
    }

    #[tokio::test]
    async fn test_build_rejects_bad_address() {
        let result = TrapReceiverBuilder::new().bind("not an address").build().await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let receiver = TrapReceiver::bind("127.0.0.1:0").await.unwrap();
        receiver.shutdown();
        receiver.shutdown();
        receiver.clone().shutdown();
    }

    #[test]
    fn test_notification_trap_v1_accessors() {
        let trap = TrapV1Pdu::new(
            oid!(1, 3, 6, 1, 4, 1, 9999),
            [192, 168, 1, 1],
            GenericTrap::LinkDown,
            0,
            12345,
            vec![],
        );

        let notification = Notification::TrapV1 {
            community: Bytes::from_static(b"public"),
            trap,
        };

        assert_eq!(notification.version(), Version::V1);
        assert_eq!(notification.community().as_ref(), b"public");
        assert_eq!(notification.uptime(), Some(12345));
        assert_eq!(notification.trap_oid(), Some(oids::link_down()));
        assert!(notification.varbinds().is_empty());
    }

    #[test]
    fn test_notification_trap_v2_accessors() {
        let notification = Notification::TrapV2 {
            community: Bytes::from_static(b"public"),
            request_id: 42,
            error_status: 0,
            error_index: 0,
            varbinds: vec![
                VarBind::new(oids::sys_uptime(), Value::TimeTicks(54321)),
                VarBind::new(
                    oids::snmp_trap_oid(),
                    Value::ObjectIdentifier(oids::link_up()),
                ),
                VarBind::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 1), Value::Integer(1)),
            ],
        };

        assert_eq!(notification.version(), Version::V2c);
        assert_eq!(notification.uptime(), Some(54321));
        assert_eq!(notification.trap_oid(), Some(oids::link_up()));
        assert_eq!(notification.varbinds().len(), 3);
    }

    #[test]
    fn test_notification_trap_v2_missing_standard_varbinds() {
        // RFC 3416 prescribes sysUpTime.0 and snmpTrapOID.0, but decoding
        // never fails on their absence; the accessors just return None.
        let notification = Notification::TrapV2 {
            community: Bytes::from_static(b"public"),
            request_id: 1,
            error_status: 0,
            error_index: 0,
            varbinds: vec![],
        };

        assert_eq!(notification.uptime(), None);
        assert_eq!(notification.trap_oid(), None);
    }
}
