//! Listener lifecycle: capture source, receive sink and export task.

use crate::capture;
use anyhow::{Context, Result};
use meshdump_core::Config;
use meshdump_decoder::{NodeDb, NormalizedPacket, ReceiveSink};
use meshdump_export::{open_exporter, Exporter, Formatter};
use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Replay the configured capture until it ends or Ctrl-C is received, then
/// drain the export queue. A replay failure is returned only after the
/// records already received have been exported.
pub async fn run(config: Config) -> Result<()> {
    let capture_path = config
        .listener
        .capture
        .clone()
        .context("no capture source configured, pass --capture <path|->")?;

    let exporter = open_exporter(config.output.output_file.as_deref())
        .context("failed to open exporter")?;
    let mut formatter = Formatter::new(config.output.formatter);
    if exporter.resumes_existing() {
        formatter = formatter.without_header();
    }
    let reader = capture::open(&capture_path).await?;

    let nodes = Arc::new(NodeDb::new());
    let (tx, rx) = mpsc::unbounded_channel();
    let mut sink = ReceiveSink::new(nodes.clone(), config.listener.include_local, tx);
    if let Some(local_id) = &config.listener.local_id {
        sink = sink.with_local_id(local_id.clone());
    }

    let export_task = spawn_export(rx, formatter, exporter);
    info!(
        capture = %capture_path.display(),
        formatter = %config.output.formatter,
        include_local = config.listener.include_local,
        "Listener started"
    );

    let replayed = tokio::select! {
        result = capture::replay(reader, &nodes, &sink) => result.map(|stats| {
            info!(lines = stats.lines, skipped = stats.skipped, "Capture exhausted");
        }),
        _ = interrupted(tokio::signal::ctrl_c()) => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    };

    let stats = sink.stats();
    info!(
        received = stats.received(),
        emitted = stats.emitted(),
        filtered = stats.filtered(),
        nodes = nodes.len(),
        "Receive statistics"
    );
    drop(sink);

    let exported = export_task.await.context("export task panicked")??;
    info!(exported, "Export finished");
    replayed
}

/// Resolves once `signal` reports an interrupt. If the handler cannot be
/// installed the error is logged and the future never resolves.
async fn interrupted<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "Failed to listen for Ctrl-C, replaying to the end");
        std::future::pending::<()>().await;
    }
}

/// Format and export records on a blocking thread until every sender is
/// gone, then quit the exporter.
fn spawn_export(
    mut rx: UnboundedReceiver<NormalizedPacket>,
    mut formatter: Formatter,
    mut exporter: Box<dyn Exporter>,
) -> JoinHandle<Result<u64>> {
    tokio::task::spawn_blocking(move || {
        let mut exported = 0u64;
        while let Some(packet) = rx.blocking_recv() {
            let line = formatter.format(&packet);
            match exporter.export(&line) {
                Ok(()) => exported += 1,
                Err(e) => error!(pid = packet.pid, error = %e, "Failed to export packet"),
            }
        }
        exporter.quit().context("failed to flush exporter")?;
        Ok(exported)
    })
}
