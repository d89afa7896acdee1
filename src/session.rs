//! Live session runtime
//!
//! The provider only ever holds a [`SampleSink`]; samples travel over a
//! channel to a single task that owns the [`GazeProcessor`] and also runs the
//! fixed-period tick. No pipeline state is shared between tasks.

use crate::error::GazeError;
use crate::pipeline::GazeProcessor;
use crate::types::{AttentionSnapshot, LogEvent, RawSample};
use log::{debug, info, warn};
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Producer side of the sample channel handed to a provider
#[derive(Debug, Clone)]
pub struct SampleSink {
    tx: mpsc::UnboundedSender<RawSample>,
}

impl SampleSink {
    /// Deliver one prediction. Pushing after the session stopped is a no-op.
    pub fn push(&self, x: f64, y: f64, t: f64) {
        let _ = self.tx.send(RawSample::new(x, y, t));
    }

    pub fn push_sample(&self, sample: RawSample) {
        let _ = self.tx.send(sample);
    }
}

/// External gaze-prediction source
pub trait GazeProvider: Send + 'static {
    /// Start emitting predictions into `sink`. An error leaves tracking disabled.
    fn begin(&mut self, sink: SampleSink) -> impl Future<Output = Result<(), GazeError>> + Send;

    /// Stop emitting. Called at most once per session.
    fn stop(&mut self);
}

/// Handle to a running session
pub struct GazeSession<P: GazeProvider> {
    provider: Option<P>,
    cancel_token: Option<CancellationToken>,
    handle: Option<JoinHandle<GazeProcessor>>,
    snapshots: watch::Receiver<AttentionSnapshot>,
    log_rx: Option<mpsc::Receiver<LogEvent>>,
}

impl<P: GazeProvider> GazeSession<P> {
    /// Start the provider and the tick loop.
    ///
    /// A provider that fails to start does not fail the session: tracking is
    /// disabled and the loop keeps ticking with no hits.
    pub async fn start(mut provider: P, mut processor: GazeProcessor) -> Self {
        let (sample_tx, sample_rx) = mpsc::unbounded_channel();
        let sink = SampleSink { tx: sample_tx };

        match provider.begin(sink).await {
            Ok(()) => {
                info!("gaze provider started");
                processor.set_tracking_enabled(true);
            }
            Err(err) => {
                warn!("gaze provider failed to start, tracking disabled: {err}");
                processor.set_tracking_enabled(false);
            }
        }

        let (snapshot_tx, snapshots) = watch::channel(processor.snapshot());
        let (log_tx, log_rx) = mpsc::channel(processor.config().log_channel_capacity);
        let cancel_token = CancellationToken::new();

        let handle = tokio::spawn(session_loop(
            processor,
            sample_rx,
            snapshot_tx,
            log_tx,
            cancel_token.clone(),
        ));

        Self {
            provider: Some(provider),
            cancel_token: Some(cancel_token),
            handle: Some(handle),
            snapshots,
            log_rx: Some(log_rx),
        }
    }

    /// Receiver for the snapshot published after every tick
    pub fn snapshots(&self) -> watch::Receiver<AttentionSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn latest(&self) -> AttentionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Log events in arrival order. Available once.
    ///
    /// The channel holds at most `log_channel_capacity` unread events; later
    /// events are dropped from the stream until the subscriber catches up. The
    /// processor's own log returned by [`GazeSession::stop`] is always complete.
    pub fn take_log_receiver(&mut self) -> Option<mpsc::Receiver<LogEvent>> {
        self.log_rx.take()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the tick loop and detach the provider.
    ///
    /// Returns the final processor on the first call and `Ok(None)` on every
    /// later call.
    pub async fn stop(&mut self) -> Result<Option<GazeProcessor>, GazeError> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(mut provider) = self.provider.take() {
            provider.stop();
        }

        match self.handle.take() {
            Some(handle) => {
                let processor = handle.await.map_err(|e| {
                    GazeError::SessionFailed(format!("session loop failed to join: {e}"))
                })?;
                info!("gaze session stopped after {} ticks", processor.ticks());
                Ok(Some(processor))
            }
            None => Ok(None),
        }
    }
}

impl<P: GazeProvider> Drop for GazeSession<P> {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let Some(mut provider) = self.provider.take() {
            provider.stop();
        }
    }
}

async fn session_loop(
    mut processor: GazeProcessor,
    mut samples: mpsc::UnboundedReceiver<RawSample>,
    snapshot_tx: watch::Sender<AttentionSnapshot>,
    log_tx: mpsc::Sender<LogEvent>,
    cancel_token: CancellationToken,
) -> GazeProcessor {
    let period = Duration::from_millis(processor.config().tick_interval_ms);
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut samples_open = true;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("gaze session loop shutting down");
                break;
            }
            sample = samples.recv(), if samples_open => {
                match sample {
                    Some(sample) => {
                        processor.on_sample(sample);
                    }
                    None => samples_open = false,
                }
            }
            _ = ticker.tick() => {
                let report = processor.tick();
                for event in report.log_events {
                    if let Err(mpsc::error::TrySendError::Full(event)) = log_tx.try_send(event) {
                        debug!("log stream full, dropped event {}", event.seq);
                    }
                }
                let _ = snapshot_tx.send(report.snapshot);
            }
        }
    }

    processor
}
