//! Per-port payload decoders.
//!
//! Every decoder returns `Ok(None)` when the payload is valid but carries
//! nothing worth recording, and an error when the bytes are malformed. The
//! normalizer treats both the same way: no decoded payload.

pub mod nodeinfo;
pub mod position;
pub mod routing;
pub mod telemetry;
pub mod text;
pub mod traceroute;

use crate::envelope::{DecodedData, RawEnvelope};
use crate::error::{DecodeError, DecodeResult};
use crate::node::NodeLookup;
use crate::packet::{DecodedPayload, PortTag};
use meshtastic::protobufs::PortNum;
use meshtastic::Message;

/// Everything a decoder may consult besides the payload bytes.
pub struct DecodeContext<'a> {
    /// The envelope being normalized.
    pub envelope: &'a RawEnvelope,
    /// Its decrypted application data.
    pub data: &'a DecodedData,
    /// Node table snapshot for address resolution.
    pub nodes: &'a dyn NodeLookup,
}

impl<'a> DecodeContext<'a> {
    /// Payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        &self.data.payload
    }
}

/// Decode the payload of a decrypted packet according to its port.
pub fn decode_payload(port: &PortTag, ctx: &DecodeContext<'_>) -> DecodeResult<Option<DecodedPayload>> {
    match port {
        PortTag::App(PortNum::TelemetryApp) => telemetry::decode(ctx.payload()),
        PortTag::App(PortNum::PositionApp) => {
            position::decode(ctx.payload()).map(|p| Some(DecodedPayload::Position(p)))
        }
        PortTag::App(PortNum::TextMessageApp) => text::decode(ctx.payload()),
        PortTag::App(PortNum::RoutingApp) => {
            routing::decode(ctx).map(|ack| Some(DecodedPayload::RoutingAck(ack)))
        }
        PortTag::App(PortNum::TracerouteApp) => {
            traceroute::decode(ctx).map(|route| Some(DecodedPayload::Traceroute(route)))
        }
        PortTag::App(PortNum::NodeinfoApp) => {
            nodeinfo::decode(ctx.payload()).map(|info| Some(DecodedPayload::NodeInfo(info)))
        }
        PortTag::Unrecognized(name) if name.is_empty() => Err(DecodeError::MissingField("portnum")),
        PortTag::App(_) | PortTag::Unrecognized(_) => {
            Err(DecodeError::UnsupportedPort(port.to_string()))
        }
        PortTag::Encrypted => Ok(None),
    }
}

/// Decode `bytes` as schema message `M`.
pub(crate) fn decode_message<M: Message + Default>(bytes: &[u8]) -> DecodeResult<M> {
    M::decode(bytes).map_err(|e| DecodeError::Protobuf(e.to_string()))
}

/// Name of an enumeration value, or its number when the schema does not
/// know it.
pub(crate) fn enum_name<E: TryFrom<i32>>(value: i32, name: impl Fn(E) -> &'static str) -> String {
    E::try_from(value)
        .map(|v| name(v).to_string())
        .unwrap_or_else(|_| value.to_string())
}

/// Round to `places` decimal places, half away from zero.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
