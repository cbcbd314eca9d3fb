//! Raw packet envelopes as delivered by the transport.
//!
//! The field names follow the transport's camelCase packet dictionary so a
//! recorded packet deserializes directly. Payload bytes travel as base64.

use serde::{Deserialize, Serialize};

/// One packet delivery event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEnvelope {
    /// Originating node number.
    pub from: u32,
    /// Destination node number (`0xffffffff` for broadcast).
    pub to: u32,
    /// Packet identifier.
    #[serde(default)]
    pub id: u32,
    /// Channel index the packet was received on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<u32>,
    /// Decrypted application data; `None` when the packet could not be
    /// decrypted by the device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedData>,
    /// Receive signal-to-noise ratio in dB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_snr: Option<f32>,
    /// Receive signal strength in dBm.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_rssi: Option<i32>,
    /// Remaining hops.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_limit: Option<u32>,
    /// Hop limit the packet was sent with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hop_start: Option<u32>,
    /// Last byte of the node that relayed the packet to us.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relay_node: Option<u32>,
    /// Last byte of the next hop chosen by the sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hop: Option<u32>,
    /// Transmit priority name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// Application data of a decrypted packet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedData {
    /// Port name, e.g. `TEXT_MESSAGE_APP`.
    pub portnum: String,
    /// Payload bytes in the port's schema.
    #[serde(default, with = "base64_bytes")]
    pub payload: Vec<u8>,
    /// Identifier of the packet this one answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u32>,
    /// Routing fields already decoded by the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<RoutingFields>,
}

impl DecodedData {
    /// Data for `portnum` carrying `payload`.
    pub fn new(portnum: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            portnum: portnum.into(),
            payload,
            request_id: None,
            routing: None,
        }
    }
}

/// Routing message fields as pre-decoded by the transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingFields {
    /// Error reason name, `NONE` for a plain ack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_packet_deserializes() {
        let json = r#"{
            "from": 2882343476,
            "to": 4294967295,
            "id": 1505067290,
            "channel": 1,
            "rxSnr": 6.25,
            "rxRssi": -87,
            "hopLimit": 2,
            "hopStart": 3,
            "relayNode": 52,
            "priority": "BACKGROUND",
            "fromId": "!abcd1234",
            "decoded": {"portnum": "TEXT_MESSAGE_APP", "payload": "aGVsbG8=", "bitfield": 1}
        }"#;

        let envelope: RawEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.from, 0xabcd1234);
        assert_eq!(envelope.to, u32::MAX);
        assert_eq!(envelope.channel, Some(1));
        assert_eq!(envelope.rx_snr, Some(6.25));
        assert_eq!(envelope.hop_limit, Some(2));
        assert_eq!(envelope.next_hop, None);
        let decoded = envelope.decoded.unwrap();
        assert_eq!(decoded.portnum, "TEXT_MESSAGE_APP");
        assert_eq!(decoded.payload, b"hello");
    }

    #[test]
    fn missing_decoded_means_encrypted() {
        let envelope: RawEnvelope =
            serde_json::from_str(r#"{"from": 1, "to": 2, "id": 3, "encrypted": "AAEC"}"#).unwrap();
        assert!(envelope.decoded.is_none());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result: Result<RawEnvelope, _> = serde_json::from_str(
            r#"{"from": 1, "to": 2, "decoded": {"portnum": "TEXT_MESSAGE_APP", "payload": "***"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn pre_decoded_routing_fields_deserialize() {
        let json = r#"{"portnum": "ROUTING_APP", "payload": "GAA=", "requestId": 99,
                       "routing": {"errorReason": "NONE"}}"#;
        let decoded: DecodedData = serde_json::from_str(json).unwrap();
        assert_eq!(decoded.request_id, Some(99));
        assert_eq!(
            decoded.routing.and_then(|r| r.error_reason).as_deref(),
            Some("NONE")
        );
    }
}
