//! Formatting and export of normalized packets.
//!
//! A [`Formatter`] renders one [`NormalizedPacket`](meshdump_decoder::NormalizedPacket)
//! per line, either as ` | `-separated text or as CSV. An [`Exporter`]
//! writes the lines to standard output or to a size-rotated file.

pub mod error;
pub mod exporter;
pub mod formatter;

pub use error::{ExportError, ExportResult};
pub use exporter::{open_exporter, Exporter, FileExporter, StdoutExporter};
pub use formatter::{Formatter, CSV_HEADER};
