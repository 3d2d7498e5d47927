/// Byte-stream source handling and the decode-then-aggregate pipeline
use log::{debug, info, warn};
use std::io;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::aggregator::Aggregator;
use crate::models::Summary;
use crate::sensor::frame::{decode_frame, FrameError};
use crate::utils::format_datetime;

/// Size of each chunk pulled from the serial line
pub const CHUNK_LEN: usize = 32;

/// Counters describing what the pipeline did with the chunks it read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub accepted: u64,
    pub invalid_length: u64,
    pub invalid_header: u64,
    pub truncated: u64,
    pub checksum_mismatch: u64,
    pub summaries_published: u64,
}

impl PipelineStats {
    fn record_rejection(&mut self, error: &FrameError) {
        match error {
            FrameError::InvalidLength { .. } => self.invalid_length += 1,
            FrameError::InvalidHeader { .. } => self.invalid_header += 1,
            FrameError::TruncatedFrame { .. } => self.truncated += 1,
            FrameError::ChecksumMismatch { .. } => self.checksum_mismatch += 1,
        }
    }

    pub fn rejected(&self) -> u64 {
        self.invalid_length + self.invalid_header + self.truncated + self.checksum_mismatch
    }
}

/// Open the sensor's serial device for reading
///
/// Line settings are expected to be configured already; the device is read as
/// a plain character stream. The tty must be in raw mode at the sensor's 9600
/// baud, e.g. `stty -F /dev/ttyS0 raw 9600`. In canonical mode the line
/// discipline treats 0x04 as end-of-file, which ends the pipeline.
pub async fn open_device(path: impl AsRef<Path>) -> io::Result<File> {
    OpenOptions::new().read(true).open(path).await
}

/// Feed fixed-size chunks from `source` through the decoder into `aggregator`
///
/// Rejected chunks are logged and counted, then skipped; they never reach the
/// aggregator. The loop ends when the source is exhausted, discarding any
/// partial trailing chunk.
///
/// # Arguments
/// * `source` - Byte stream delivering sensor frames
/// * `aggregator` - Window owner that receives every accepted reading
///
/// # Returns
/// Counters for the whole run, or the I/O error that stopped the source
pub async fn run_pipeline<R>(
    mut source: R,
    aggregator: &mut Aggregator,
) -> io::Result<PipelineStats>
where
    R: AsyncRead + Unpin,
{
    let mut stats = PipelineStats::default();
    let mut chunk = [0u8; CHUNK_LEN];

    loop {
        match source.read_exact(&mut chunk).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                info!("Sensor stream ended");
                return Ok(stats);
            }
            Err(e) => return Err(e),
        }

        let reading = match decode_frame(&chunk) {
            Ok(reading) => reading,
            Err(e) => {
                stats.record_rejection(&e);
                match e {
                    FrameError::ChecksumMismatch { .. } => warn!("Skipping reading: {}", e),
                    _ => debug!("Skipping chunk: {}", e),
                }
                continue;
            }
        };

        stats.accepted += 1;
        debug!(
            "Reading: PM1.0={} PM2.5={} PM10={} µg/m³",
            reading.pm10_standard, reading.pm25_standard, reading.pm100_standard
        );

        if let Some(summary) = aggregator.ingest(reading) {
            stats.summaries_published += 1;
            log_summary(&summary, &stats);
        }
    }
}

fn log_summary(summary: &Summary, stats: &PipelineStats) {
    let refreshed = summary
        .updated_at
        .as_ref()
        .map(format_datetime)
        .unwrap_or_default();

    info!("Summary refreshed at {}:", refreshed);
    info!(
        "  PM1.0 / PM2.5 / PM10 (standard): {} / {} / {} µg/m³",
        summary.pm10_standard, summary.pm25_standard, summary.pm100_standard
    );
    info!(
        "  PM1.0 / PM2.5 / PM10 (environmental): {} / {} / {} µg/m³",
        summary.pm10_env, summary.pm25_env, summary.pm100_env
    );
    info!(
        "  Particles >0.3 >0.5 >1.0 >2.5 >5.0 >10 µm per 0.1 L: {} {} {} {} {} {}",
        summary.particles_3um,
        summary.particles_5um,
        summary.particles_10um,
        summary.particles_25um,
        summary.particles_50um,
        summary.particles_100um
    );
    info!(
        "  Based on {} samples ({} accepted, {} rejected so far)",
        summary.samples,
        stats.accepted,
        stats.rejected()
    );
}
