//! The scan view: the single owner of a display collection.
//!
//! One task holds the `NetworkCollection` and is its only writer. Workers
//! queue `ScanBatch`es to it over a channel; callers talk to it through a
//! cloneable `ScanViewHandle`. Snapshots are published on a `watch` channel
//! after every change so readers never touch the collection itself.

use crate::collection::{MergeSummary, NetworkCollection};
use crate::export;
use crate::normalize::{Normalizer, canonical_address};
use crate::traits::{NetworkRecord, ScanSource};
use crate::worker::{PollConfig, ScanBatch, spawn_poller};
use crate::{Error, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const COMMAND_CAPACITY: usize = 32;
const BATCH_CAPACITY: usize = 16;

/// Everything a view needs to run scans.
pub struct ViewSettings {
    pub source: Arc<dyn ScanSource>,
    pub normalizer: Normalizer,
    pub poll: PollConfig,
    /// Upper bound on how long `stop` waits for the worker to exit.
    pub stop_grace: Duration,
    pub interface: String,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewStatus {
    pub scanning: bool,
    pub network_count: usize,
    pub interface: String,
    pub source: String,
    pub polls: u64,
    pub last_poll: Option<DateTime<Local>>,
}

enum ViewCommand {
    Start { clear: bool, reply: oneshot::Sender<bool> },
    Stop { reply: oneshot::Sender<bool> },
    Clear { reply: oneshot::Sender<()> },
    Export { path: Option<PathBuf>, reply: oneshot::Sender<Result<PathBuf>> },
    Status { reply: oneshot::Sender<ViewStatus> },
    Shutdown { reply: oneshot::Sender<()> },
}

struct ActiveWorker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct ScanView {
    settings: ViewSettings,
    collection: NetworkCollection,
    worker: Option<ActiveWorker>,
    batch_tx: mpsc::Sender<ScanBatch>,
    snapshot_tx: watch::Sender<Arc<Vec<NetworkRecord>>>,
    polls: u64,
    last_poll: Option<DateTime<Local>>,
}

/// Cloneable handle to a running view.
#[derive(Clone)]
pub struct ScanViewHandle {
    commands: mpsc::Sender<ViewCommand>,
    snapshot: watch::Receiver<Arc<Vec<NetworkRecord>>>,
}

/// Spawns the view task. Scanning does not start until `start` is called.
pub fn spawn_view(settings: ViewSettings) -> ScanViewHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (batch_tx, batch_rx) = mpsc::channel(BATCH_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Vec::new()));

    let view = ScanView {
        settings,
        collection: NetworkCollection::new(),
        worker: None,
        batch_tx,
        snapshot_tx,
        polls: 0,
        last_poll: None,
    };
    tokio::spawn(view.run(cmd_rx, batch_rx));

    ScanViewHandle {
        commands: cmd_tx,
        snapshot: snapshot_rx,
    }
}

impl ScanView {
    async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<ViewCommand>,
        mut batch_rx: mpsc::Receiver<ScanBatch>,
    ) {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if !self.handle(cmd).await {
                            break;
                        }
                    }
                    // 所有句柄均已释放
                    None => {
                        self.stop_worker().await;
                        break;
                    }
                },
                Some(batch) = batch_rx.recv() => self.apply(batch),
            }
        }
        tracing::debug!("Scan view exited");
    }

    /// Returns `false` when the view should exit.
    async fn handle(&mut self, cmd: ViewCommand) -> bool {
        match cmd {
            ViewCommand::Start { clear, reply } => {
                let started = self.start_worker(clear);
                let _ = reply.send(started);
            }
            ViewCommand::Stop { reply } => {
                let stopped = self.stop_worker().await;
                let _ = reply.send(stopped);
            }
            ViewCommand::Clear { reply } => {
                self.collection.clear();
                self.publish();
                tracing::info!("Results cleared");
                let _ = reply.send(());
            }
            ViewCommand::Export { path, reply } => {
                let _ = reply.send(self.export(path).await);
            }
            ViewCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
            ViewCommand::Shutdown { reply } => {
                self.stop_worker().await;
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn is_scanning(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.handle.is_finished())
    }

    /// Starting while a worker is active is a no-op.
    fn start_worker(&mut self, clear: bool) -> bool {
        if self.is_scanning() {
            tracing::debug!("Scan already running, start ignored");
            return false;
        }
        if clear {
            self.collection.clear();
            self.publish();
        }

        let cancel = CancellationToken::new();
        let handle = spawn_poller(
            self.settings.source.clone(),
            self.settings.normalizer.clone(),
            self.settings.poll,
            self.batch_tx.clone(),
            cancel.clone(),
        );
        self.worker = Some(ActiveWorker { cancel, handle });
        tracing::info!(interface = %self.settings.interface, "Network scan started");
        true
    }

    /// Requests cancellation and waits up to `stop_grace` for the worker.
    /// The worker is never aborted; if it overruns it finishes detached.
    async fn stop_worker(&mut self) -> bool {
        let Some(worker) = self.worker.take() else {
            return false;
        };
        worker.cancel.cancel();
        match tokio::time::timeout(self.settings.stop_grace, worker.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "Scan worker panicked"),
            Err(_) => tracing::warn!(
                grace = ?self.settings.stop_grace,
                "Scan worker still running after grace period; it will exit after its current scan"
            ),
        }
        tracing::info!("Network scan stopped");
        true
    }

    fn apply(&mut self, batch: ScanBatch) {
        self.polls += 1;
        self.last_poll = Some(batch.observed_at);
        let summary: MergeSummary = self.collection.merge(batch.records);
        tracing::debug!(
            inserted = summary.inserted,
            updated = summary.updated,
            total = self.collection.len(),
            "Merged scan batch"
        );
        if summary.inserted > 0 {
            tracing::info!("Found {} networks", self.collection.len());
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Arc::new(self.collection.snapshot()));
    }

    async fn export(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        let generated_at = Local::now();
        let path = path.unwrap_or_else(|| {
            self.settings.export_dir.join(export::default_file_name(generated_at))
        });
        let records = self.collection.snapshot();
        match export::write_report(&path, &records, &self.settings.interface, generated_at).await {
            Ok(()) => Ok(path),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to export scan results");
                Err(e)
            }
        }
    }

    fn status(&self) -> ViewStatus {
        ViewStatus {
            scanning: self.is_scanning(),
            network_count: self.collection.len(),
            interface: self.settings.interface.clone(),
            source: self.settings.source.name().to_string(),
            polls: self.polls,
            last_poll: self.last_poll,
        }
    }
}

impl ScanViewHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> ViewCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| Error::ViewClosed)?;
        rx.await.map_err(|_| Error::ViewClosed)
    }

    /// Starts polling. Returns `false` if a worker was already active.
    pub async fn start(&self, clear: bool) -> Result<bool> {
        self.request(|reply| ViewCommand::Start { clear, reply }).await
    }

    /// Stops polling. Returns `false` if nothing was running.
    pub async fn stop(&self) -> Result<bool> {
        self.request(|reply| ViewCommand::Stop { reply }).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.request(|reply| ViewCommand::Clear { reply }).await
    }

    /// Exports the collection; `None` writes a timestamped file into the
    /// configured export directory. Returns the path written.
    pub async fn export(&self, path: Option<PathBuf>) -> Result<PathBuf> {
        self.request(|reply| ViewCommand::Export { path, reply }).await?
    }

    pub async fn status(&self) -> Result<ViewStatus> {
        self.request(|reply| ViewCommand::Status { reply }).await
    }

    /// Stops any worker and ends the view task.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| ViewCommand::Shutdown { reply }).await
    }

    /// Latest published snapshot, in first-seen order.
    pub fn snapshot(&self) -> Arc<Vec<NetworkRecord>> {
        self.snapshot.borrow().clone()
    }

    /// Looks up a record; `hardware_address` may be in any case and unpadded.
    pub fn get(&self, hardware_address: &str) -> Option<NetworkRecord> {
        let wanted = canonical_address(hardware_address);
        self.snapshot
            .borrow()
            .iter()
            .find(|r| r.hardware_address == wanted)
            .cloned()
    }

    /// Receiver that is notified whenever the collection changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<NetworkRecord>>> {
        self.snapshot.clone()
    }
}
