//! meshdump decoder
//!
//! Turns raw packet envelopes delivered by a mesh radio transport into
//! strongly typed [`NormalizedPacket`] records.
//!
//! # Pipeline
//!
//! - **Address resolution**: node numbers map to published node ids, with a
//!   deterministic `!xxxxxxxx` fallback for unknown nodes
//! - **Payload decoding**: one decoder per application port (telemetry,
//!   position, text, routing, traceroute, node info)
//! - **Normalization**: filtering, metadata copy, derived hop count and
//!   payload dispatch
//! - **Receive sink**: the per-envelope callback forwarding records downstream
//!
//! A malformed payload never aborts processing: it degrades the record's
//! `decoded` field to `None` and everything else is still emitted.
//!
//! # Example
//!
//! ```
//! use meshdump_decoder::{normalize, DecodedData, NodeRecord, RawEnvelope};
//! use std::collections::HashMap;
//!
//! let mut nodes = HashMap::new();
//! nodes.insert(1, NodeRecord::new(1, "!base0001"));
//!
//! let envelope = RawEnvelope {
//!     from: 1,
//!     to: 2,
//!     id: 42,
//!     decoded: Some(DecodedData::new("TEXT_MESSAGE_APP", b"hello".to_vec())),
//!     ..Default::default()
//! };
//!
//! let packet = normalize(&envelope, Some("!00000002"), false, &nodes).unwrap();
//! assert_eq!(packet.from_id, "!base0001");
//! assert_eq!(packet.to_id, "!00000002");
//! ```

#![warn(missing_docs)]

pub mod envelope;
pub mod error;
pub mod node;
pub mod normalizer;
pub mod packet;
pub mod payload;
pub mod resolver;
pub mod sink;

pub use envelope::{DecodedData, RawEnvelope, RoutingFields};
pub use error::{DecodeError, DecodeResult};
pub use node::{ChannelInfo, NodeDb, NodeLookup, NodeRecord, NodeSnapshot};
pub use normalizer::{normalize, normalize_at};
pub use packet::{
    DecodedPayload, DeviceMetrics, EnvironmentMetrics, LocalStats, Message, NodeInfo,
    NormalizedPacket, PortTag, Position, RawPayload, RoutingAck, Traceroute,
};
pub use resolver::{fallback_node_id, resolve};
pub use sink::{PacketHandler, ReceiveSink, SinkStats};
