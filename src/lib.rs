//! # trapsink
//!
//! Async SNMP notification receiver for Rust.
//!
//! ## Features
//!
//! - Receives SNMPv1 Traps, SNMPv2c Traps, and Inform-Requests over UDP
//! - Automatic Response-PDU acknowledgment for informs (RFC 1905)
//! - Zero-copy BER decoding over [`bytes::Bytes`]
//! - Concurrent per-datagram dispatch built on Tokio: one slow datagram
//!   never delays the next
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trapsink::{Notification, TrapHandler, TrapReceiver};
//! use std::net::SocketAddr;
//!
//! struct LogHandler;
//!
//! impl TrapHandler for LogHandler {
//!     fn on_notification(&self, notification: Notification, source: SocketAddr) {
//!         println!(
//!             "{} {} trap_oid={:?}",
//!             source,
//!             notification.version(),
//!             notification.trap_oid()
//!         );
//!     }
//!
//!     fn on_error(&self, error: trapsink::Error, source: Option<SocketAddr>) {
//!         eprintln!("{:?}: {}", source, error);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), trapsink::Error> {
//!     let receiver = TrapReceiver::builder()
//!         .bind("0.0.0.0:1162")
//!         .community("public")
//!         .build()
//!         .await?;
//!
//!     receiver.run(LogHandler).await;
//!     Ok(())
//! }
//! ```
//!
//! ## Wire shapes
//!
//! A datagram is tried against the three recognized shapes in fixed
//! priority order - Inform-Request (0xA6), then SNMPv2c Trap (0xA7), then
//! SNMPv1 Trap (0xA4) - and normalized into a [`Notification`]. Informs
//! and v2c traps produce the same record: an inform is a trap that
//! expected an acknowledgment, and the acknowledgment has already been
//! written by the time the handler sees it.

pub mod ber;
pub mod error;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod receiver;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

// Re-exports for convenience
pub use error::{DecodeErrorKind, EncodeErrorKind, Error, OidErrorKind, Result};
pub use message::CommunityMessage;
pub use oid::Oid;
pub use pdu::{GenericTrap, Pdu, PduType, TrapV1Pdu};
pub use receiver::{
    DEFAULT_BIND_ADDR, DEFAULT_RECV_BUFFER_SIZE, Notification, TrapHandler, TrapReceiver,
    TrapReceiverBuilder, oids,
};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
