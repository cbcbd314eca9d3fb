//! `TELEMETRY_APP` decoder.

use super::{decode_message, round_to};
use crate::error::DecodeResult;
use crate::packet::{DecodedPayload, DeviceMetrics, EnvironmentMetrics, LocalStats};
use meshtastic::protobufs::telemetry::Variant;
use meshtastic::protobufs::Telemetry;

/// Decode a telemetry report into whichever metrics family it carries.
/// Families without a record type (air quality, power, host ...) yield
/// `None`.
pub fn decode(bytes: &[u8]) -> DecodeResult<Option<DecodedPayload>> {
    let telemetry: Telemetry = decode_message(bytes)?;

    let payload = match telemetry.variant {
        Some(Variant::DeviceMetrics(m)) => Some(DecodedPayload::DeviceMetrics(DeviceMetrics {
            tx_air_util: m.air_util_tx.map(|v| round_to(f64::from(v), 2)),
            battery_level: m.battery_level,
            channel_utilization: m.channel_utilization.map(|v| round_to(f64::from(v), 2)),
            voltage: m.voltage.map(|v| round_to(f64::from(v), 2)),
            uptime: m.uptime_seconds,
        })),
        Some(Variant::LocalStats(s)) => Some(DecodedPayload::LocalStats(LocalStats {
            num_packets_tx: s.num_packets_tx,
            num_tx_relay: s.num_tx_relay,
            num_tx_relay_canceled: s.num_tx_relay_canceled,
        })),
        Some(Variant::EnvironmentMetrics(e)) => {
            Some(DecodedPayload::EnvironmentMetrics(EnvironmentMetrics {
                temperature: e.temperature,
                relative_humidity: e.relative_humidity,
                barometric_pressure: e.barometric_pressure,
            }))
        }
        Some(_) | None => None,
    };

    Ok(payload)
}
