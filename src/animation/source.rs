use std::sync::Arc;

use crate::animation::curve::KeyframeCurve;
use crate::foundation::core::{Channel, FrameIndex, Rgb};

/// Host-provided per-frame evaluator for one channel.
#[derive(Clone)]
pub struct HostCurve(Arc<dyn Fn(i64) -> f64 + Send + Sync>);

impl HostCurve {
    /// Wrap an evaluator closure.
    pub fn new(f: impl Fn(i64) -> f64 + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    fn eval(&self, frame: i64) -> f64 {
        (self.0)(frame)
    }
}

impl std::fmt::Debug for HostCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HostCurve(..)")
    }
}

/// Per-frame value source for one (object, layer, channel).
#[derive(Clone, Debug)]
pub enum CurveSource {
    /// Animated curve sampled at the frame.
    Curve(KeyframeCurve),
    /// Evaluator supplied by the host animation store.
    Host(HostCurve),
    /// Constant fallback when no animation exists.
    Constant(f64),
}

impl CurveSource {
    /// Value at `frame`. An empty curve evaluates to `0.0`.
    pub fn sample(&self, frame: FrameIndex) -> f64 {
        match self {
            Self::Curve(c) => c.sample(frame.as_f64()).unwrap_or(0.0),
            Self::Host(h) => h.eval(frame.0),
            Self::Constant(v) => *v,
        }
    }
}

impl Default for CurveSource {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

/// The R, G and B sources of one layer.
pub type LayerChannels = [CurveSource; 3];

/// Immutable snapshot of every layer's color sources for one tracked object.
///
/// Indexed by layer position (0 = base). Layers past the end of the snapshot evaluate to black.
#[derive(Clone, Debug, Default)]
pub struct ObjectColorSource {
    layers: Vec<LayerChannels>,
}

impl ObjectColorSource {
    /// Snapshot from explicit per-layer channel sources.
    pub fn new(layers: Vec<LayerChannels>) -> Self {
        Self { layers }
    }

    /// Snapshot where every layer is a constant color.
    pub fn constant(colors: &[Rgb]) -> Self {
        Self {
            layers: colors
                .iter()
                .map(|c| c.map(CurveSource::Constant))
                .collect(),
        }
    }

    /// Number of layers captured.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Replace the source of one channel, growing the snapshot with black layers if needed.
    pub fn set(&mut self, layer: usize, channel: Channel, source: CurveSource) {
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, Default::default);
        }
        self.layers[layer][channel.index()] = source;
    }

    /// Color of `layer` at `frame`.
    pub fn sample(&self, layer: usize, frame: FrameIndex) -> Rgb {
        match self.layers.get(layer) {
            Some(channels) => [
                channels[0].sample(frame),
                channels[1].sample(frame),
                channels[2].sample(frame),
            ],
            None => [0.0; 3],
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/source.rs"]
mod tests;
