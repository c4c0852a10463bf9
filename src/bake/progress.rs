use std::sync::mpsc;

/// Phase of a bake pass a progress event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BakeStage {
    /// Dense per-frame compositing.
    Composite,
    /// Keyframe reduction.
    Compress,
    /// Writing curves to the host store.
    Write,
}

/// `completed` of `total` object-units of one stage are done.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Stage the counts refer to.
    pub stage: BakeStage,
    /// Units finished so far.
    pub completed: usize,
    /// Units in the stage.
    pub total: usize,
}

/// Best-effort progress observer.
///
/// Called from worker threads, periodically rather than for every unit. Implementations must not
/// block; dropping events is allowed and never affects the bake result.
pub trait ProgressSink: Sync {
    /// Observe one progress event.
    fn report(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Sync,
{
    fn report(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Progress sink that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events over a bounded channel, dropping them when the receiver lags or is gone.
#[derive(Debug)]
pub struct ChannelProgress {
    tx: mpsc::SyncSender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create a sink and the receiver that drains it.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn report(&self, event: ProgressEvent) {
        let _ = self.tx.try_send(event);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/progress.rs"]
mod tests;
