use std::collections::BTreeMap;

use crate::animation::source::ObjectColorSource;
use crate::compress::channel::ChannelCurves;
use crate::foundation::core::{Channel, FrameRange, ObjectId};
use crate::foundation::error::SwarmResult;

/// How baked curves replace what the host already stores for an object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Drop any existing curve and store the baked one.
    #[default]
    FullOverwrite,
    /// Keep existing keys strictly outside the baked range and splice the baked keys in.
    RangeOverwrite,
}

/// Read side of the host animation store.
///
/// Snapshots are taken once per bake pass, before any worker starts, so implementations do not
/// need to be thread-safe.
pub trait SourceStore {
    /// Every tracked object that should take part in a bake pass.
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Capture the color sources of `id` for layers `0..layer_count`.
    ///
    /// Missing layers or channels must fall back to constants rather than fail; an error means the
    /// object's data is unreadable and only that object is dropped from the pass.
    fn snapshot(&self, id: &ObjectId, layer_count: usize) -> SwarmResult<ObjectColorSource>;
}

/// Write side of the host animation store.
///
/// Ordering contract: objects are written one at a time in ascending [`ObjectId`] order.
pub trait CurveSink {
    /// Persist the baked curves of one object.
    fn write_curves(
        &mut self,
        id: &ObjectId,
        curves: &ChannelCurves,
        range: FrameRange,
        mode: WriteMode,
    ) -> SwarmResult<()>;
}

/// Apply a baked write onto the curves currently stored for an object.
pub fn apply_write(
    existing: &mut ChannelCurves,
    baked: &ChannelCurves,
    range: FrameRange,
    mode: WriteMode,
) {
    match mode {
        WriteMode::FullOverwrite => *existing = baked.clone(),
        WriteMode::RangeOverwrite => {
            for c in Channel::ALL {
                existing.get_mut(c).splice_range(baked.get(c), range);
            }
        }
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryCurveSink {
    curves: BTreeMap<ObjectId, ChannelCurves>,
    writes: Vec<ObjectId>,
}

impl InMemoryCurveSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object's stored curves, e.g. to exercise [`WriteMode::RangeOverwrite`].
    pub fn with_existing(mut self, id: ObjectId, curves: ChannelCurves) -> Self {
        self.curves.insert(id, curves);
        self
    }

    /// Stored curves keyed by object.
    pub fn curves(&self) -> &BTreeMap<ObjectId, ChannelCurves> {
        &self.curves
    }

    /// Objects in the order they were written.
    pub fn write_order(&self) -> &[ObjectId] {
        &self.writes
    }
}

impl CurveSink for InMemoryCurveSink {
    fn write_curves(
        &mut self,
        id: &ObjectId,
        curves: &ChannelCurves,
        range: FrameRange,
        mode: WriteMode,
    ) -> SwarmResult<()> {
        let slot = self.curves.entry(id.clone()).or_default();
        apply_write(slot, curves, range, mode);
        self.writes.push(id.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/store.rs"]
mod tests;
