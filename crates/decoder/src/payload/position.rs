//! `POSITION_APP` decoder.

use super::{decode_message, round_to};
use crate::error::DecodeResult;
use crate::packet::Position;

const DEGREES_PER_UNIT: f64 = 1e-7;

/// Decode a position report. A report whose latitude or longitude is zero
/// (or missing) carries no fix and yields an empty [`Position`].
pub fn decode(bytes: &[u8]) -> DecodeResult<Position> {
    let position: meshtastic::protobufs::Position = decode_message(bytes)?;

    let latitude_i = position.latitude_i.unwrap_or_default();
    let longitude_i = position.longitude_i.unwrap_or_default();
    if latitude_i == 0 || longitude_i == 0 {
        return Ok(Position::default());
    }

    Ok(Position {
        latitude: Some(to_degrees(latitude_i)),
        longitude: Some(to_degrees(longitude_i)),
        altitude: position.altitude,
    })
}

fn to_degrees(raw: i32) -> f64 {
    round_to(f64::from(raw) * DEGREES_PER_UNIT, 7)
}
