use crate::normalize::Normalizer;
use crate::traits::{NetworkRecord, ScanSource};
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Polling parameters for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Keep only records on this channel.
    pub channel_filter: Option<u32>,
}

/// Normalized result of one poll, handed to the view that owns the collection.
#[derive(Debug, Clone)]
pub struct ScanBatch {
    pub observed_at: DateTime<Local>,
    pub records: Vec<NetworkRecord>,
    /// Raw observations returned by the source, before parsing and filtering.
    pub raw_count: usize,
}

/// Runs one scan and normalizes it. Never fails: an empty batch means the
/// source had nothing this cycle.
pub async fn poll_once(
    source: &dyn ScanSource,
    normalizer: &Normalizer,
    channel_filter: Option<u32>,
) -> ScanBatch {
    let observed_at = Local::now();
    let raw = source.scan().await;
    let mut records = normalizer.normalize_batch(&raw, observed_at);
    if let Some(channel) = channel_filter {
        records.retain(|r| r.channel == channel);
    }
    ScanBatch {
        observed_at,
        raw_count: raw.len(),
        records,
    }
}

/// Spawns the background poller.
///
/// The token is checked at the top of each iteration, so a scan that is
/// already running when cancellation is requested still completes and its
/// batch is still delivered. The task also exits once `tx` is closed.
pub fn spawn_poller(
    source: Arc<dyn ScanSource>,
    normalizer: Normalizer,
    config: PollConfig,
    tx: mpsc::Sender<ScanBatch>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(source = source.name(), interval = ?config.interval, "Scan worker started");
        let mut iteration: u64 = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }
            iteration += 1;

            let batch = poll_once(source.as_ref(), &normalizer, config.channel_filter).await;
            tracing::debug!(
                iteration,
                raw = batch.raw_count,
                parsed = batch.records.len(),
                "Poll complete"
            );
            if tx.send(batch).await.is_err() {
                tracing::debug!("Batch receiver dropped, stopping worker");
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(config.interval) => {}
            }
        }

        tracing::info!(iterations = iteration, "Scan worker stopped");
    })
}
