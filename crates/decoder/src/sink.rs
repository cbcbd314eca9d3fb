//! Receive callback sink.
//!
//! [`ReceiveSink::on_receive`] is the single entry point the transport calls
//! for every envelope. It normalizes the envelope against one snapshot of
//! the node table and forwards the record to a [`PacketHandler`] without
//! blocking.

use crate::envelope::RawEnvelope;
use crate::node::NodeDb;
use crate::normalizer::normalize;
use crate::packet::NormalizedPacket;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Downstream consumer of normalized packets.
///
/// Implementations run on the transport's delivery path and must not block.
pub trait PacketHandler: Send + Sync {
    /// Take ownership of one record.
    fn handle(&self, packet: NormalizedPacket);
}

impl PacketHandler for UnboundedSender<NormalizedPacket> {
    fn handle(&self, packet: NormalizedPacket) {
        if let Err(err) = self.send(packet) {
            warn!(pid = err.0.pid, "Export queue closed, dropping packet");
        }
    }
}

/// Envelope counters.
#[derive(Debug, Default)]
pub struct SinkStats {
    received: AtomicU64,
    emitted: AtomicU64,
    filtered: AtomicU64,
}

impl SinkStats {
    /// Envelopes delivered by the transport.
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Records handed downstream.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Envelopes dropped by the local-node filter.
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }
}

/// Per-envelope callback wiring the normalizer to a downstream handler.
pub struct ReceiveSink<H> {
    nodes: Arc<NodeDb>,
    include_local: bool,
    local_override: Option<String>,
    handler: H,
    stats: SinkStats,
}

impl<H: PacketHandler> ReceiveSink<H> {
    /// Create a sink reading `nodes` and forwarding to `handler`.
    pub fn new(nodes: Arc<NodeDb>, include_local: bool, handler: H) -> Self {
        Self {
            nodes,
            include_local,
            local_override: None,
            handler,
            stats: SinkStats::default(),
        }
    }

    /// Use `local_id` for self-packet filtering instead of the id the
    /// transport announces.
    pub fn with_local_id(mut self, local_id: impl Into<String>) -> Self {
        self.local_override = Some(local_id.into());
        self
    }

    /// Handle one envelope from the transport.
    pub fn on_receive(&self, envelope: &RawEnvelope) {
        self.stats.received.fetch_add(1, Ordering::Relaxed);

        let packet = {
            let snapshot = self.nodes.snapshot();
            let local_id = self.local_override.as_deref().or(snapshot.local_id());
            normalize(envelope, local_id, self.include_local, &snapshot)
        };

        match packet {
            Some(packet) => {
                self.stats.emitted.fetch_add(1, Ordering::Relaxed);
                self.handler.handle(packet);
            }
            None => {
                self.stats.filtered.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::DecodedData;
    use crate::node::NodeRecord;
    use tokio::sync::mpsc;

    fn envelope(from: u32) -> RawEnvelope {
        RawEnvelope {
            from,
            to: u32::MAX,
            id: from * 10,
            decoded: Some(DecodedData::new("TEXT_MESSAGE_APP", b"ping".to_vec())),
            ..Default::default()
        }
    }

    #[test]
    fn records_are_forwarded_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ReceiveSink::new(Arc::new(NodeDb::new()), false, tx);

        sink.on_receive(&envelope(1));
        sink.on_receive(&envelope(2));

        assert_eq!(rx.try_recv().unwrap().pid, 10);
        assert_eq!(rx.try_recv().unwrap().pid, 20);
        assert!(rx.try_recv().is_err());
        assert_eq!(sink.stats().received(), 2);
        assert_eq!(sink.stats().emitted(), 2);
    }

    #[test]
    fn announced_local_id_filters_own_packets() {
        let nodes = Arc::new(NodeDb::new());
        nodes.upsert(NodeRecord::new(9, "!local009"));
        nodes.set_local_id("!local009");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ReceiveSink::new(nodes, false, tx);
        sink.on_receive(&envelope(9));
        sink.on_receive(&envelope(3));

        assert_eq!(rx.try_recv().unwrap().pid, 30);
        assert!(rx.try_recv().is_err());
        assert_eq!(sink.stats().filtered(), 1);
        assert_eq!(sink.stats().emitted(), 1);
    }

    #[test]
    fn override_takes_precedence_over_announced_id() {
        let nodes = Arc::new(NodeDb::new());
        nodes.set_local_id("!00000009");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ReceiveSink::new(nodes, false, tx).with_local_id("!00000003");
        sink.on_receive(&envelope(9));
        sink.on_receive(&envelope(3));

        assert_eq!(rx.try_recv().unwrap().pid, 90);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_queue_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sink = ReceiveSink::new(Arc::new(NodeDb::new()), true, tx);
        sink.on_receive(&envelope(1));
        assert_eq!(sink.stats().emitted(), 1);
    }
}
