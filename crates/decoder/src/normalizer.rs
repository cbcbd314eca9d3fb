//! Packet normalizer.
//!
//! Converts one [`RawEnvelope`] into a [`NormalizedPacket`]:
//!
//! 1. drop packets sent by the local node unless asked to keep them
//! 2. classify the envelope as encrypted when it carries no decoded data
//! 3. copy metadata and resolve addresses
//! 4. derive the hop count
//! 5. dispatch the payload to its port decoder
//! 6. attach the sender's display names
//!
//! Only step 1 suppresses a record. Every other failure degrades a single
//! field and is logged.

use crate::envelope::RawEnvelope;
use crate::error::DecodeError;
use crate::node::NodeLookup;
use crate::packet::{NormalizedPacket, PortTag, RawPayload};
use crate::payload::{decode_payload, DecodeContext};
use crate::resolver::resolve;
use chrono::{DateTime, Local};
use tracing::{debug, trace, warn};

/// Normalize an envelope received now.
///
/// Returns `None` only when the envelope originates from `local_node_id`
/// and `include_local` is false.
pub fn normalize(
    envelope: &RawEnvelope,
    local_node_id: Option<&str>,
    include_local: bool,
    nodes: &dyn NodeLookup,
) -> Option<NormalizedPacket> {
    normalize_at(envelope, Local::now(), local_node_id, include_local, nodes)
}

/// Normalize an envelope received at `received_at`.
pub fn normalize_at(
    envelope: &RawEnvelope,
    received_at: DateTime<Local>,
    local_node_id: Option<&str>,
    include_local: bool,
    nodes: &dyn NodeLookup,
) -> Option<NormalizedPacket> {
    let from_id = resolve(envelope.from, nodes);
    if !include_local && local_node_id == Some(from_id.as_str()) {
        trace!(pid = envelope.id, from = %from_id, "Dropping packet from local node");
        return None;
    }

    let (port_num, payload, channel_index, decoded) = match &envelope.decoded {
        None => (PortTag::Encrypted, RawPayload::Encrypted, None, None),
        Some(data) => {
            let port = PortTag::from_name(&data.portnum);
            let ctx = DecodeContext {
                envelope,
                data,
                nodes,
            };
            let decoded = match decode_payload(&port, &ctx) {
                Ok(decoded) => decoded,
                Err(DecodeError::UnsupportedPort(name)) => {
                    debug!(pid = envelope.id, port = %name, "No decoder for port");
                    None
                }
                Err(err @ DecodeError::InvalidText(_)) => {
                    warn!(
                        pid = envelope.id,
                        payload = %hex::encode(&data.payload),
                        error = %err,
                        "Failed to decode text message"
                    );
                    None
                }
                Err(err) => {
                    warn!(
                        pid = envelope.id,
                        port = %port,
                        error = %err,
                        "Failed to decode payload"
                    );
                    None
                }
            };
            (
                port,
                RawPayload::Plain(data.payload.clone()),
                Some(envelope.channel.unwrap_or(0)),
                decoded,
            )
        }
    };

    let (long_name, short_name) = match nodes.lookup(envelope.from) {
        Some(record) => (record.long_name.clone(), record.short_name.clone()),
        None => (None, None),
    };

    Some(NormalizedPacket {
        date: received_at,
        pid: envelope.id,
        long_name,
        short_name,
        from_id,
        to_id: resolve(envelope.to, nodes),
        channel_index,
        port_num,
        payload,
        snr: envelope.rx_snr,
        rssi: envelope.rx_rssi,
        hop_limit: envelope.hop_limit,
        hop_start: envelope.hop_start,
        hops_away: hops_away(envelope.hop_start, envelope.hop_limit),
        relay_node: envelope.relay_node.map(|relay| format!("{relay:x}")),
        next_hop: envelope.next_hop,
        priority: envelope.priority.clone(),
        decoded,
    })
}

/// Hops travelled, defined only when both counters are known. A hop limit
/// above the hop start is reported as a negative count rather than guessed.
pub fn hops_away(hop_start: Option<u32>, hop_limit: Option<u32>) -> Option<i64> {
    match (hop_start, hop_limit) {
        (Some(start), Some(limit)) => Some(i64::from(start) - i64::from(limit)),
        _ => None,
    }
}
