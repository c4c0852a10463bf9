use crate::animation::source::ObjectColorSource;
use crate::composite::blend::blend;
use crate::composite::layers::{Layer, LayerStack};
use crate::foundation::core::{Channel, FrameIndex, FrameRange, Rgb};
use crate::foundation::math::{Quantize, to_u8_round};

/// Opacities at or below this are treated as fully transparent and the layer is skipped.
pub const OPACITY_EPSILON: f64 = 1e-4;

/// Dense per-frame composite of one object: one value per channel per frame of a range.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseSample {
    /// Frame of the first sample; later samples follow at a step of one frame.
    pub start: FrameIndex,
    /// R, G and B sample sequences, all of equal length.
    pub channels: [Vec<f64>; 3],
}

impl DenseSample {
    /// Empty sample sequence starting at `start`, with room for `len` frames.
    pub fn with_capacity(start: FrameIndex, len: usize) -> Self {
        Self {
            start,
            channels: [
                Vec::with_capacity(len),
                Vec::with_capacity(len),
                Vec::with_capacity(len),
            ],
        }
    }

    /// Number of frames sampled.
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    /// Return `true` when no frame was sampled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one composite color.
    pub fn push(&mut self, color: Rgb) {
        for (ch, v) in self.channels.iter_mut().zip(color) {
            ch.push(v);
        }
    }

    /// Sample sequence of one channel.
    pub fn channel(&self, channel: Channel) -> &[f64] {
        &self.channels[channel.index()]
    }

    /// Frame numbers of every sample, as curve-space abscissae.
    pub fn frames(&self) -> Vec<f64> {
        (0..self.len())
            .map(|i| (self.start.0 + i as i64) as f64)
            .collect()
    }

    /// Composite color of sample `i`.
    pub fn color_at(&self, i: usize) -> Option<Rgb> {
        Some([
            *self.channels[0].get(i)?,
            *self.channels[1].get(i)?,
            *self.channels[2].get(i)?,
        ])
    }

    /// 8-bit `round(v * 255)` triples, one per frame, as used by legacy exports.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        (0..self.len())
            .filter_map(|i| self.color_at(i))
            .map(|c| c.map(to_u8_round))
            .collect()
    }
}

/// Composite every enabled layer of `source` at one frame.
///
/// `enabled` must come from [`crate::effective_enabled`] for the same `layers`. The base layer is
/// taken as-is (its blend mode and opacity are ignored); each later enabled layer is blended on top
/// in index order, skipping layers whose opacity is at or below [`OPACITY_EPSILON`].
pub fn composite_frame(
    layers: &[Layer],
    enabled: &[bool],
    source: &ObjectColorSource,
    frame: FrameIndex,
) -> Rgb {
    let is_enabled = |i: usize| enabled.get(i).copied().unwrap_or(false);

    let mut base = if !layers.is_empty() && is_enabled(0) {
        source.sample(0, frame)
    } else {
        [0.0; 3]
    };

    for (i, layer) in layers.iter().enumerate().skip(1) {
        if !is_enabled(i) {
            continue;
        }
        let fac = layer.opacity.sample(frame);
        if fac <= OPACITY_EPSILON {
            continue;
        }
        let top = source.sample(i, frame);
        base = blend(base, top, layer.blend_mode, fac);
    }
    base
}

/// Composite one object over every frame of `range`.
#[tracing::instrument(level = "trace", skip(layers, enabled, source))]
pub fn composite_object(
    layers: &LayerStack,
    enabled: &[bool],
    source: &ObjectColorSource,
    range: FrameRange,
    quantize: Quantize,
) -> DenseSample {
    let mut out = DenseSample::with_capacity(range.start, range.len_frames());
    for f in range.frames() {
        let color = composite_frame(layers.layers(), enabled, source, f);
        out.push(color.map(|v| quantize.apply(v)));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
