//! `NODEINFO_APP` decoder.

use super::{decode_message, enum_name};
use crate::error::DecodeResult;
use crate::packet::NodeInfo;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use meshtastic::protobufs::config::device_config::Role;
use meshtastic::protobufs::{HardwareModel, User};

/// Decode a node identity broadcast.
pub fn decode(bytes: &[u8]) -> DecodeResult<NodeInfo> {
    let user: User = decode_message(bytes)?;

    Ok(NodeInfo {
        hardware: enum_name::<HardwareModel>(user.hw_model, |m| m.as_str_name()),
        role: enum_name::<Role>(user.role, |r| r.as_str_name()),
        public_key: STANDARD.encode(&user.public_key),
        long_name: user.long_name,
        short_name: user.short_name,
    })
}
