//! Text renderings of a normalized packet.

use crate::error::{ExportError, ExportResult};
use meshdump_core::FormatterKind;
use meshdump_decoder::NormalizedPacket;

/// Column names, in record field order.
pub const CSV_HEADER: &str = "date,pid,long_name,short_name,from_id,to_id,channel_index,\
port_num,snr,rssi,hops_away,relay_node,next_hop,decoded";

const RAW_SEPARATOR: &str = " | ";
const RAW_ABSENT: &str = "None";

/// Renders packets as lines of text.
#[derive(Debug)]
pub struct Formatter {
    kind: FormatterKind,
    header_written: bool,
}

impl Formatter {
    pub fn new(kind: FormatterKind) -> Self {
        Self {
            kind,
            header_written: false,
        }
    }

    /// Formatter for a configuration name (`raw` or `csv`).
    pub fn from_name(name: &str) -> ExportResult<Self> {
        name.parse::<FormatterKind>()
            .map(Self::new)
            .map_err(|e| ExportError::InvalidKind(e.to_string()))
    }

    /// Treat the CSV header as already present, for output appended to an
    /// existing file.
    pub fn without_header(mut self) -> Self {
        self.header_written = true;
        self
    }

    pub fn kind(&self) -> FormatterKind {
        self.kind
    }

    /// Render one packet. The first CSV line is preceded by the header row.
    pub fn format(&mut self, packet: &NormalizedPacket) -> String {
        match self.kind {
            FormatterKind::Raw => format_raw(packet),
            FormatterKind::Csv => {
                let row = format_csv_row(packet);
                if self.header_written {
                    row
                } else {
                    self.header_written = true;
                    format!("{CSV_HEADER}\n{row}")
                }
            }
        }
    }
}

fn columns(packet: &NormalizedPacket) -> [Option<String>; 14] {
    fn opt<T: ToString>(value: &Option<T>) -> Option<String> {
        value.as_ref().map(ToString::to_string)
    }

    [
        Some(packet.date_string()),
        Some(packet.pid.to_string()),
        packet.long_name.clone(),
        packet.short_name.clone(),
        Some(packet.from_id.clone()),
        Some(packet.to_id.clone()),
        opt(&packet.channel_index),
        Some(packet.port_num.to_string()),
        opt(&packet.snr),
        opt(&packet.rssi),
        opt(&packet.hops_away),
        packet.relay_node.clone(),
        opt(&packet.next_hop),
        opt(&packet.decoded),
    ]
}

fn format_raw(packet: &NormalizedPacket) -> String {
    columns(packet)
        .iter()
        .map(|c| c.as_deref().unwrap_or(RAW_ABSENT))
        .collect::<Vec<_>>()
        .join(RAW_SEPARATOR)
}

fn format_csv_row(packet: &NormalizedPacket) -> String {
    columns(packet)
        .iter()
        .map(|c| csv_field(c.as_deref().unwrap_or("")))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use meshdump_decoder::{DecodedPayload, Message, PortTag, RawPayload};

    fn packet() -> NormalizedPacket {
        NormalizedPacket {
            date: Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap(),
            pid: 42,
            long_name: Some("Base Camp".into()),
            short_name: None,
            from_id: "!00000001".into(),
            to_id: "!ffffffff".into(),
            channel_index: Some(0),
            port_num: PortTag::from_name("TEXT_MESSAGE_APP"),
            payload: RawPayload::Plain(b"hi, \"all\"".to_vec()),
            snr: Some(6.25),
            rssi: Some(-87),
            hop_limit: Some(2),
            hop_start: Some(3),
            hops_away: Some(1),
            relay_node: Some("34".into()),
            next_hop: None,
            priority: None,
            decoded: Some(DecodedPayload::Message(Message {
                content: "hi, \"all\"".into(),
            })),
        }
    }

    #[test]
    fn raw_line_follows_record_order() {
        let line = Formatter::new(FormatterKind::Raw).format(&packet());
        assert_eq!(
            line,
            "2024-05-01 12:30:15.000000 | 42 | Base Camp | None | !00000001 | !ffffffff | 0 \
             | TEXT_MESSAGE_APP | 6.25 | -87 | 1 | 34 | None | Message(content=hi, \"all\")"
        );
    }

    #[test]
    fn csv_header_is_written_once() {
        let mut formatter = Formatter::new(FormatterKind::Csv);
        let first = formatter.format(&packet());
        let second = formatter.format(&packet());

        let mut lines = first.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some(second.as_str()));
        assert!(!second.starts_with("date,"));
    }

    #[test]
    fn csv_without_header_emits_rows_only() {
        let mut formatter = Formatter::new(FormatterKind::Csv).without_header();
        let row = formatter.format(&packet());

        assert_eq!(row.lines().count(), 1);
        assert!(row.starts_with("2024-05-01 12:30:15.000000,42,"));
    }

    #[test]
    fn csv_quotes_and_leaves_absent_empty() {
        let row = Formatter::new(FormatterKind::Csv)
            .format(&packet())
            .lines()
            .nth(1)
            .unwrap()
            .to_string();
        assert_eq!(
            row,
            "2024-05-01 12:30:15.000000,42,Base Camp,,!00000001,!ffffffff,0,\
             TEXT_MESSAGE_APP,6.25,-87,1,34,,\"Message(content=hi, \"\"all\"\")\""
        );
        assert_eq!(CSV_HEADER.split(',').count(), 14);
    }

    #[test]
    fn encrypted_packet_renders_placeholders() {
        let mut packet = packet();
        packet.port_num = PortTag::Encrypted;
        packet.payload = RawPayload::Encrypted;
        packet.channel_index = None;
        packet.decoded = None;

        let line = Formatter::new(FormatterKind::Raw).format(&packet);
        assert!(line.contains(" | None | ENCRYPTED | "));
        assert!(line.ends_with(" | None | None"));
    }

    #[test]
    fn unknown_formatter_name_is_rejected() {
        assert!(matches!(
            Formatter::from_name("xml"),
            Err(ExportError::InvalidKind(_))
        ));
        assert_eq!(Formatter::from_name("csv").unwrap().kind(), FormatterKind::Csv);
    }
}
