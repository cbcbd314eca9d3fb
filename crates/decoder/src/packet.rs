//! Normalized packet records handed to the formatting/export pipeline.

use chrono::{DateTime, Local};
use meshtastic::protobufs::PortNum;
use serde::{Serialize, Serializer};
use std::fmt;

/// Port tag value used for packets the device could not decrypt.
pub const ENCRYPTED_TAG: &str = "ENCRYPTED";

/// Date layout used when a record is rendered as text.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Application port of a packet, as classified by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortTag {
    /// A port known to the schema.
    App(PortNum),
    /// A port name this build does not know.
    Unrecognized(String),
    /// The packet carried no decrypted data.
    Encrypted,
}

impl PortTag {
    /// Classify a transport port name.
    pub fn from_name(name: &str) -> Self {
        match PortNum::from_str_name(name) {
            Some(port) => Self::App(port),
            None => Self::Unrecognized(name.to_string()),
        }
    }

    /// Whether the packet is encrypted.
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted)
    }
}

impl fmt::Display for PortTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(port) => f.write_str(port.as_str_name()),
            Self::Unrecognized(name) => f.write_str(name),
            Self::Encrypted => f.write_str(ENCRYPTED_TAG),
        }
    }
}

impl Serialize for PortTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Undecoded payload carried alongside the normalized fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawPayload {
    /// Plaintext payload bytes.
    Plain(Vec<u8>),
    /// Placeholder for packets the device could not decrypt.
    Encrypted,
}

impl Serialize for RawPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        match self {
            Self::Plain(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            Self::Encrypted => serializer.serialize_str("encrypted"),
        }
    }
}

/// A packet after address resolution and payload decoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPacket {
    /// Time the envelope was received.
    pub date: DateTime<Local>,
    /// Packet identifier.
    pub pid: u32,
    /// Long display name of the originating node.
    pub long_name: Option<String>,
    /// Short display name of the originating node.
    pub short_name: Option<String>,
    /// Resolved originating node id.
    pub from_id: String,
    /// Resolved destination node id.
    pub to_id: String,
    /// Channel index; unset for encrypted packets.
    pub channel_index: Option<u32>,
    /// Application port.
    pub port_num: PortTag,
    /// Undecoded payload.
    pub payload: RawPayload,
    /// Receive signal-to-noise ratio.
    pub snr: Option<f32>,
    /// Receive signal strength.
    pub rssi: Option<i32>,
    /// Remaining hops when received.
    pub hop_limit: Option<u32>,
    /// Hop limit at transmission.
    pub hop_start: Option<u32>,
    /// `hop_start - hop_limit`, when both are known.
    pub hops_away: Option<i64>,
    /// Relaying node, lowercase hex.
    pub relay_node: Option<String>,
    /// Next hop chosen by the sender.
    pub next_hop: Option<u32>,
    /// Transmit priority.
    pub priority: Option<String>,
    /// Typed payload, when one could be decoded.
    pub decoded: Option<DecodedPayload>,
}

impl NormalizedPacket {
    /// Receipt time rendered with [`TIME_FORMAT`].
    pub fn date_string(&self) -> String {
        self.date.format(TIME_FORMAT).to_string()
    }
}

/// Payload decoded from one of the supported ports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum DecodedPayload {
    /// Telemetry: device health.
    DeviceMetrics(DeviceMetrics),
    /// Telemetry: radio statistics.
    LocalStats(LocalStats),
    /// Telemetry: environment sensors.
    EnvironmentMetrics(EnvironmentMetrics),
    /// Position report.
    Position(Position),
    /// Node identity.
    NodeInfo(NodeInfo),
    /// Text message.
    Message(Message),
    /// Routing ack or nak.
    RoutingAck(RoutingAck),
    /// Discovered route.
    Traceroute(Traceroute),
}

impl DecodedPayload {
    /// Variant name, used as the rendering prefix.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DeviceMetrics(_) => "DeviceMetrics",
            Self::LocalStats(_) => "LocalStats",
            Self::EnvironmentMetrics(_) => "EnvironmentMetrics",
            Self::Position(_) => "Position",
            Self::NodeInfo(_) => "NodeInfo",
            Self::Message(_) => "Message",
            Self::RoutingAck(_) => "RoutingAck",
            Self::Traceroute(_) => "Traceroute",
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::DeviceMetrics(m) => vec![
                ("txairutil", opt(&m.tx_air_util)),
                ("battery_level", opt(&m.battery_level)),
                ("channel_utilization", opt(&m.channel_utilization)),
                ("voltage", opt(&m.voltage)),
                ("uptime", opt(&m.uptime)),
            ],
            Self::LocalStats(s) => vec![
                ("num_packets_tx", s.num_packets_tx.to_string()),
                ("num_tx_relay", s.num_tx_relay.to_string()),
                ("num_tx_relay_canceled", s.num_tx_relay_canceled.to_string()),
            ],
            Self::EnvironmentMetrics(e) => vec![
                ("temperature", opt(&e.temperature)),
                ("relative_humidity", opt(&e.relative_humidity)),
                ("barometric_pressure", opt(&e.barometric_pressure)),
            ],
            Self::Position(p) => vec![
                ("lat", opt(&p.latitude)),
                ("lon", opt(&p.longitude)),
                ("altitude", opt(&p.altitude)),
            ],
            Self::NodeInfo(n) => vec![
                ("long_name", n.long_name.clone()),
                ("short_name", n.short_name.clone()),
                ("hardware", n.hardware.clone()),
                ("role", n.role.clone()),
                ("public_key", n.public_key.clone()),
            ],
            Self::Message(m) => vec![("content", m.content.clone())],
            Self::RoutingAck(r) => vec![
                ("ack_by", r.ack_by.clone()),
                ("ack_label", opt(&r.ack_label)),
                ("message_id_acked", opt(&r.message_id_acked)),
            ],
            Self::Traceroute(t) => vec![("route", t.route.join(" > "))],
        }
    }
}

fn opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

impl fmt::Display for DecodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        write!(f, "{}({})", self.kind(), fields.join(" - "))
    }
}

/// Device health metrics. Floats are rounded to two decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceMetrics {
    /// Airtime used by the node's own transmissions, percent.
    pub tx_air_util: Option<f64>,
    /// Battery level, percent (above 100 when externally powered).
    pub battery_level: Option<u32>,
    /// Channel utilization, percent.
    pub channel_utilization: Option<f64>,
    /// Battery voltage.
    pub voltage: Option<f64>,
    /// Seconds since boot.
    pub uptime: Option<u32>,
}

/// Radio statistics of the reporting node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalStats {
    /// Packets transmitted.
    pub num_packets_tx: u32,
    /// Packets relayed.
    pub num_tx_relay: u32,
    /// Relays cancelled.
    pub num_tx_relay_canceled: u32,
}

/// Environment sensor readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnvironmentMetrics {
    /// Degrees Celsius.
    pub temperature: Option<f32>,
    /// Relative humidity, percent.
    pub relative_humidity: Option<f32>,
    /// Barometric pressure, hPa.
    pub barometric_pressure: Option<f32>,
}

/// Position in degrees. Empty when the sender reported no fix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Position {
    /// Latitude, 7 decimal places.
    pub latitude: Option<f64>,
    /// Longitude, 7 decimal places.
    pub longitude: Option<f64>,
    /// Altitude, meters.
    pub altitude: Option<i32>,
}

impl Position {
    /// Whether any coordinate is populated.
    pub fn is_populated(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some() || self.altitude.is_some()
    }
}

/// Node identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// Full display name.
    pub long_name: String,
    /// Short display name.
    pub short_name: String,
    /// Hardware model name.
    pub hardware: String,
    /// Device role name.
    pub role: String,
    /// Public key, base64.
    pub public_key: String,
}

/// Text message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Trimmed message text.
    pub content: String,
}

/// Routing acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingAck {
    /// Error reason name, `NONE` for a successful delivery.
    pub ack_label: Option<String>,
    /// Identifier of the acknowledged packet.
    pub message_id_acked: Option<u32>,
    /// Node that sent the acknowledgement.
    pub ack_by: String,
}

/// Discovered route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Traceroute {
    /// Node ids, destination first and source last.
    pub route: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_tag_classifies_names() {
        assert_eq!(
            PortTag::from_name("POSITION_APP"),
            PortTag::App(PortNum::PositionApp)
        );
        assert_eq!(
            PortTag::from_name("FUTURE_APP"),
            PortTag::Unrecognized("FUTURE_APP".into())
        );
        assert_eq!(PortTag::Encrypted.to_string(), "ENCRYPTED");
        assert_eq!(PortTag::App(PortNum::RoutingApp).to_string(), "ROUTING_APP");
    }

    #[test]
    fn payload_display_lists_fields() {
        let payload = DecodedPayload::Position(Position {
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            altitude: None,
        });
        assert_eq!(
            payload.to_string(),
            "Position(lat=48.8566 - lon=2.3522 - altitude=None)"
        );

        let route = DecodedPayload::Traceroute(Traceroute {
            route: vec!["!00000009".into(), "!00000001".into()],
        });
        assert_eq!(route.to_string(), "Traceroute(route=!00000009 > !00000001)");
    }

    #[test]
    fn payload_serializes_with_kind_tag() {
        let payload = DecodedPayload::Message(Message {
            content: "hi".into(),
        });
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"kind":"Message","content":"hi"}"#
        );
    }
}
