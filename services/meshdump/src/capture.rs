//! Replay of recorded transport events.
//!
//! A capture is a JSON-lines file; each line is one event tagged by `kind`:
//!
//! ```text
//! {"kind":"my_info","id":"!a1b2c3d4"}
//! {"kind":"node","num":2712847316,"user":{"id":"!a1b2c3d4","longName":"Base","shortName":"BS"}}
//! {"kind":"channel","index":0,"role":"PRIMARY","settings":{"name":"","psk":"AQ=="}}
//! {"kind":"packet","from":2712847316,"to":4294967295,"id":7,"decoded":{"portnum":"TEXT_MESSAGE_APP","payload":"aGk="}}
//! ```
//!
//! Node, identity and channel events update the node table the way a live
//! transport would. Packet events go through the receive sink.

use anyhow::{Context, Result};
use meshdump_decoder::{ChannelInfo, NodeDb, NodeRecord, PacketHandler, RawEnvelope, ReceiveSink};
use serde::Deserialize;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Path that selects standard input.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaptureRecord {
    MyInfo {
        id: String,
    },
    Node {
        num: u32,
        user: CaptureUser,
    },
    Channel {
        index: u32,
        role: String,
        #[serde(default)]
        settings: ChannelSettings,
    },
    Packet(RawEnvelope),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureUser {
    pub id: String,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChannelSettings {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub psk: String,
}

impl CaptureRecord {
    /// Feed the event to the node table or the sink.
    pub fn apply<H: PacketHandler>(self, nodes: &NodeDb, sink: &ReceiveSink<H>) {
        match self {
            Self::MyInfo { id } => nodes.set_local_id(id),
            Self::Node { num, user } => nodes.upsert(NodeRecord {
                num,
                id: user.id,
                long_name: user.long_name,
                short_name: user.short_name,
            }),
            Self::Channel {
                index,
                role,
                settings,
            } => {
                nodes.add_channel(ChannelInfo {
                    index,
                    role,
                    name: settings.name,
                    psk: settings.psk,
                });
            }
            Self::Packet(envelope) => sink.on_receive(&envelope),
        }
    }
}

/// Line counters for one replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub lines: u64,
    pub skipped: u64,
}

/// Open a capture file, or standard input for [`STDIN_PATH`].
pub async fn open(path: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open capture {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Replay every event of `reader` in order. Lines that do not parse are
/// logged and skipped.
pub async fn replay<R, H>(reader: R, nodes: &NodeDb, sink: &ReceiveSink<H>) -> Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
    H: PacketHandler,
{
    let mut lines = reader.lines();
    let mut stats = ReplayStats::default();

    while let Some(line) = lines.next_line().await.context("failed to read capture")? {
        stats.lines += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<CaptureRecord>(line) {
            Ok(record) => record.apply(nodes, sink),
            Err(e) => {
                stats.skipped += 1;
                warn!(line = stats.lines, error = %e, "Skipping unreadable capture line");
            }
        }
    }

    debug!(lines = stats.lines, skipped = stats.skipped, "Capture replay finished");
    Ok(stats)
}
