//! Swarmlight bakes layered drone-swarm light animation into sparse keyframe curves.
//!
//! Every tracked object (drone) carries one color per layer of a shared [`LayerStack`]. A bake pass
//! composites the enabled layers frame by frame into a dense RGB sequence, then reduces each
//! channel to a small set of linear keyframes:
//!
//! - Build a [`BakeSession`] from a layer stack, a [`FrameRange`] and [`BakeOpts`]
//! - Run it against a [`SourceStore`] (read side) and a [`CurveSink`] (write side)
//! - Inspect the [`BakeReport`] for per-object failures and statistics
//!
//! Compression keeps every direction change of a channel exactly and simplifies the runs in
//! between with a vertical-error Ramer–Douglas–Peucker pass, so no sample moves by more than the
//! tolerance inside a run.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod bake;
pub(crate) mod composite;
pub(crate) mod compress;
pub(crate) mod export;
pub(crate) mod scene;

pub use crate::foundation::core::{Channel, FrameIndex, FrameRange, ObjectId, Rgb};
pub use crate::foundation::error::{SwarmError, SwarmResult};
pub use crate::foundation::math::Quantize;

pub use crate::animation::curve::{Keyframe, KeyframeCurve};
pub use crate::animation::source::{CurveSource, HostCurve, LayerChannels, ObjectColorSource};
pub use crate::bake::progress::{BakeStage, ChannelProgress, NoProgress, ProgressEvent, ProgressSink};
pub use crate::bake::session::{
    BakeOpts, BakeReport, BakeResult, BakeSession, BakeStats, CancelFlag, DEFAULT_TOLERANCE,
    FailureStage, ObjectFailure,
};
pub use crate::bake::store::{CurveSink, InMemoryCurveSink, SourceStore, WriteMode, apply_write};
pub use crate::composite::blend::{BlendMode, blend};
pub use crate::composite::compositor::{
    DenseSample, OPACITY_EPSILON, composite_frame, composite_object,
};
pub use crate::composite::layers::{Layer, LayerStack, Opacity, effective_enabled};
pub use crate::compress::channel::{ChannelCurves, compress_channel, compress_sample};
pub use crate::compress::critical::critical_indices;
pub use crate::compress::rdp::rdp;
pub use crate::export::transfer::{ColorTransfer, FrameColors, color_transfer};
pub use crate::scene::edit::{EditLog, key_current, set_color, set_color_keyed};
pub use crate::scene::effect::{
    OffsetMode, OffsetOpts, SparkleOpts, SparkleStage, TemporalSparkleOpts, offset_keys, sparkle,
    temporal_sparkle,
};
pub use crate::scene::model::{LayerValue, Scene, SceneObject};
