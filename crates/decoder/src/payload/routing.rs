//! `ROUTING_APP` decoder.
//!
//! The transport pre-decodes routing messages and exposes the error reason
//! and the acknowledged request id on the envelope; those fields are used as
//! delivered. When the error reason was not pre-decoded the payload bytes
//! are decoded with the routing schema instead.

use super::{decode_message, enum_name, DecodeContext};
use crate::error::DecodeResult;
use crate::packet::RoutingAck;
use crate::resolver::resolve;
use meshtastic::protobufs::routing::{Error as RoutingError, Variant};
use meshtastic::protobufs::Routing;

/// Decode an acknowledgement, attributing it to the packet's sender.
pub fn decode(ctx: &DecodeContext<'_>) -> DecodeResult<RoutingAck> {
    let ack_label = match ctx.data.routing.as_ref().and_then(|r| r.error_reason.clone()) {
        Some(label) => Some(label),
        None => error_reason_from_payload(ctx.payload())?,
    };

    Ok(RoutingAck {
        ack_label,
        message_id_acked: ctx.data.request_id,
        ack_by: resolve(ctx.envelope.from, ctx.nodes),
    })
}

fn error_reason_from_payload(bytes: &[u8]) -> DecodeResult<Option<String>> {
    let routing: Routing = decode_message(bytes)?;
    Ok(match routing.variant {
        Some(Variant::ErrorReason(code)) => {
            Some(enum_name::<RoutingError>(code, |e| e.as_str_name()))
        }
        Some(_) | None => None,
    })
}
