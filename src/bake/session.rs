use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::animation::source::ObjectColorSource;
use crate::bake::progress::{BakeStage, ProgressEvent, ProgressSink};
use crate::bake::store::{CurveSink, SourceStore, WriteMode};
use crate::composite::compositor::{DenseSample, composite_object};
use crate::composite::layers::LayerStack;
use crate::compress::channel::{ChannelCurves, compress_sample};
use crate::foundation::core::{FrameRange, ObjectId};
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::Quantize;

/// Default compression tolerance, about 5/255 of full scale.
pub const DEFAULT_TOLERANCE: f64 = 0.02;

/// Longest frame range a session accepts, about ten hours at 30 fps.
pub const MAX_BAKE_FRAMES: usize = 1 << 20;

/// Baked curves keyed by object. Iteration order is by object id, independent of scheduling.
pub type BakeResult = BTreeMap<ObjectId, ChannelCurves>;

/// Options for one bake pass.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BakeOpts {
    /// Maximum vertical error allowed inside a critical-point segment. `0` disables compression.
    pub tolerance: f64,
    /// Quantization applied to composite samples before compression.
    pub quantize: Quantize,
    /// Process objects on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the worker count. `None` uses the available hardware parallelism.
    pub threads: Option<usize>,
    /// Report progress every this many finished objects (and at the end of each stage).
    pub progress_every: usize,
    /// How baked curves replace existing ones in the sink.
    pub write_mode: WriteMode,
}

impl Default for BakeOpts {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            quantize: Quantize::None,
            parallel: true,
            threads: None,
            progress_every: 10,
            write_mode: WriteMode::FullOverwrite,
        }
    }
}

impl BakeOpts {
    /// Reject option combinations that cannot run.
    pub fn validate(&self) -> SwarmResult<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SwarmError::validation(format!(
                "tolerance must be a finite value >= 0, got {}",
                self.tolerance
            )));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(SwarmError::validation(
                "bake 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// Cooperative, coarse-grained cancellation shared between a caller and a running pass.
///
/// Workers check the flag between object-units; an object already in flight completes.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New, not-cancelled flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Where in the pass an object was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Its source data could not be read.
    Snapshot,
    /// The sink rejected its curves.
    Write,
}

/// One object omitted from the result, and why.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObjectFailure {
    /// Omitted object.
    pub object: ObjectId,
    /// Stage that failed.
    pub stage: FailureStage,
    /// Human-readable reason.
    pub reason: String,
}

/// Pass counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BakeStats {
    /// Objects the store offered.
    pub objects_total: usize,
    /// Objects whose curves made it into the result (and the sink, when one was used).
    pub objects_baked: usize,
    /// Objects listed in [`BakeReport::failures`].
    pub objects_failed: usize,
    /// Objects left unprocessed because the pass was cancelled.
    pub objects_skipped: usize,
    /// Dense samples fed to compression, over all channels.
    pub samples_in: usize,
    /// Keyframes produced, over all channels.
    pub keys_out: usize,
}

/// Outcome of one bake pass.
#[derive(Clone, Debug, Default)]
pub struct BakeReport {
    /// Baked curves of every successful object.
    pub result: BakeResult,
    /// Objects omitted because of per-object errors.
    pub failures: Vec<ObjectFailure>,
    /// Counters.
    pub stats: BakeStats,
    /// The pass stopped early; `result` may be incomplete.
    pub cancelled: bool,
}

impl BakeReport {
    /// Return `true` when every offered object was baked.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failures.is_empty()
    }
}

/// A validated bake configuration: layer snapshot, frame range and options.
///
/// Holds its own layer snapshot; later edits to the caller's stack do not affect a pass.
#[derive(Clone, Debug)]
pub struct BakeSession {
    layers: LayerStack,
    range: FrameRange,
    opts: BakeOpts,
}

impl BakeSession {
    /// Validate the configuration. Nothing is evaluated yet.
    pub fn new(layers: LayerStack, range: FrameRange, opts: BakeOpts) -> SwarmResult<Self> {
        layers.validate()?;
        range.validate()?;
        if range.len_frames() > MAX_BAKE_FRAMES {
            return Err(SwarmError::validation(format!(
                "frame range {}..={} spans more than {MAX_BAKE_FRAMES} frames",
                range.start.0, range.end.0
            )));
        }
        opts.validate()?;
        Ok(Self {
            layers,
            range,
            opts,
        })
    }

    /// Layer snapshot used by this session.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Frame range baked by this session.
    pub fn range(&self) -> FrameRange {
        self.range
    }

    /// Options of this session.
    pub fn opts(&self) -> &BakeOpts {
        &self.opts
    }

    /// Run a full pass: snapshot every object of `store`, composite, compress, then write each
    /// object's curves to `sink`.
    ///
    /// Ids listed more than once by the store are baked once.
    ///
    /// Configuration problems (including an empty object set) fail the whole call before any work.
    /// Per-object snapshot or write errors are reported in [`BakeReport::failures`] while the other
    /// objects complete. Objects written before a cancellation stay written.
    #[tracing::instrument(skip_all, fields(frames = self.range.len_frames()))]
    pub fn run(
        &self,
        store: &dyn SourceStore,
        sink: &mut dyn CurveSink,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> SwarmResult<BakeReport> {
        let listed = store.object_ids();
        let listed_len = listed.len();
        let ids: BTreeSet<ObjectId> = listed.into_iter().collect();
        if ids.len() < listed_len {
            tracing::debug!(
                duplicates = listed_len - ids.len(),
                "store listed duplicate object ids"
            );
        }
        if ids.is_empty() {
            return Err(SwarmError::validation("bake pass has no objects"));
        }

        let mut failures = Vec::new();
        let mut sources = Vec::with_capacity(ids.len());
        for id in &ids {
            match store.snapshot(id, self.layers.len()) {
                Ok(src) => sources.push((id.clone(), src)),
                Err(e) => {
                    tracing::warn!(object = %id, error = %e, "skipping object with unreadable source");
                    failures.push(ObjectFailure {
                        object: id.clone(),
                        stage: FailureStage::Snapshot,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mut report = self.bake_sources(&sources, progress, cancel)?;
        report.stats.objects_total = ids.len();
        report.stats.objects_failed += failures.len();
        failures.append(&mut report.failures);
        report.failures = failures;

        self.write_result(&mut report, sink, progress, cancel);

        tracing::info!(
            baked = report.stats.objects_baked,
            failed = report.stats.objects_failed,
            skipped = report.stats.objects_skipped,
            samples_in = report.stats.samples_in,
            keys_out = report.stats.keys_out,
            cancelled = report.cancelled,
            "bake pass finished"
        );
        Ok(report)
    }

    /// Composite and compress already-captured sources without touching any store.
    ///
    /// Every id must appear once; a repeated id is a validation error.
    pub fn bake_sources(
        &self,
        sources: &[(ObjectId, ObjectColorSource)],
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> SwarmResult<BakeReport> {
        let mut seen = BTreeSet::new();
        if let Some((dup, _)) = sources.iter().find(|(id, _)| !seen.insert(id)) {
            return Err(SwarmError::validation(format!(
                "object '{dup}' listed more than once"
            )));
        }

        let pool = if self.opts.parallel && sources.len() > 1 {
            Some(build_thread_pool(self.opts.threads, sources.len())?)
        } else {
            None
        };

        let dense = self.composite_stage(sources, pool.as_ref(), progress, cancel);
        let compressed = self.compress_stage(&dense, pool.as_ref(), progress, cancel);

        let mut report = BakeReport {
            stats: BakeStats {
                objects_total: sources.len(),
                ..BakeStats::default()
            },
            ..BakeReport::default()
        };
        for ((id, sample), curves) in sources
            .iter()
            .map(|(id, _)| id)
            .zip(&dense)
            .zip(compressed)
        {
            match (sample, curves) {
                (Some(sample), Some(curves)) => {
                    report.stats.samples_in += sample.len() * 3;
                    report.stats.keys_out += curves.key_count();
                    report.stats.objects_baked += 1;
                    report.result.insert(id.clone(), curves);
                }
                _ => report.stats.objects_skipped += 1,
            }
        }
        report.cancelled = report.stats.objects_skipped > 0 || cancel.is_cancelled();
        if report.cancelled {
            tracing::debug!(
                skipped = report.stats.objects_skipped,
                "bake pass cancelled"
            );
        }
        Ok(report)
    }

    fn composite_stage(
        &self,
        sources: &[(ObjectId, ObjectColorSource)],
        pool: Option<&rayon::ThreadPool>,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Vec<Option<DenseSample>> {
        let enabled = self.layers.enabled();
        let ticker = Ticker::new(BakeStage::Composite, sources.len(), &self.opts, progress);
        run_units(sources, pool, cancel, |(_, src)| {
            let sample = composite_object(&self.layers, &enabled, src, self.range, self.opts.quantize);
            ticker.tick();
            sample
        })
    }

    fn compress_stage(
        &self,
        dense: &[Option<DenseSample>],
        pool: Option<&rayon::ThreadPool>,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) -> Vec<Option<ChannelCurves>> {
        let todo = dense.iter().filter(|d| d.is_some()).count();
        let ticker = Ticker::new(BakeStage::Compress, todo, &self.opts, progress);
        let out = run_units(dense, pool, cancel, |sample| {
            sample.as_ref().map(|s| {
                let curves = compress_sample(s, self.opts.tolerance);
                ticker.tick();
                curves
            })
        });
        out.into_iter().map(Option::flatten).collect()
    }

    fn write_result(
        &self,
        report: &mut BakeReport,
        sink: &mut dyn CurveSink,
        progress: &dyn ProgressSink,
        cancel: &CancelFlag,
    ) {
        tracing::debug!(
            objects = report.result.len(),
            tolerance = self.opts.tolerance,
            "writing baked curves"
        );
        let ticker = Ticker::new(BakeStage::Write, report.result.len(), &self.opts, progress);
        let mut unwritten = Vec::new();
        let mut dropped = Vec::new();
        for (id, curves) in &report.result {
            if cancel.is_cancelled() {
                unwritten.push(id.clone());
                continue;
            }
            if let Err(e) = sink.write_curves(id, curves, self.range, self.opts.write_mode) {
                tracing::warn!(object = %id, error = %e, "failed to write baked curves");
                report.failures.push(ObjectFailure {
                    object: id.clone(),
                    stage: FailureStage::Write,
                    reason: e.to_string(),
                });
                dropped.push(id.clone());
            }
            ticker.tick();
        }

        for id in dropped.iter().chain(&unwritten) {
            if let Some(curves) = report.result.remove(id) {
                report.stats.keys_out -= curves.key_count();
                report.stats.samples_in -= self.range.len_frames() * 3;
            }
        }
        report.stats.objects_baked -= dropped.len() + unwritten.len();
        report.stats.objects_failed += dropped.len();
        report.stats.objects_skipped += unwritten.len();
        if !unwritten.is_empty() {
            report.cancelled = true;
        }
    }
}

/// Map `f` over `items`, on `pool` when given. Items reached after cancellation yield `None`.
///
/// Output order matches input order regardless of completion order.
fn run_units<T, R, F>(
    items: &[T],
    pool: Option<&rayon::ThreadPool>,
    cancel: &CancelFlag,
    f: F,
) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let unit = |item: &T| {
        if cancel.is_cancelled() {
            None
        } else {
            Some(f(item))
        }
    };
    match pool {
        Some(pool) => pool.install(|| items.par_iter().map(unit).collect()),
        None => items.iter().map(unit).collect(),
    }
}

struct Ticker<'a> {
    stage: BakeStage,
    total: usize,
    every: usize,
    done: AtomicUsize,
    sink: &'a dyn ProgressSink,
}

impl<'a> Ticker<'a> {
    fn new(stage: BakeStage, total: usize, opts: &BakeOpts, sink: &'a dyn ProgressSink) -> Self {
        Self {
            stage,
            total,
            every: opts.progress_every.max(1),
            done: AtomicUsize::new(0),
            sink,
        }
    }

    fn tick(&self) {
        let completed = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if completed % self.every == 0 || completed == self.total {
            self.sink.report(ProgressEvent {
                stage: self.stage,
                completed,
                total: self.total,
            });
        }
    }
}

fn build_thread_pool(threads: Option<usize>, units: usize) -> SwarmResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(SwarmError::validation(
            "bake 'threads' must be >= 1 when set",
        ));
    }

    let hw = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let n = threads.unwrap_or(hw).min(units).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build()
        .map_err(|e| SwarmError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/bake/session.rs"]
mod tests;
