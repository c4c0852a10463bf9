use crate::animation::curve::{Keyframe, KeyframeCurve};
use crate::composite::compositor::DenseSample;
use crate::compress::critical::critical_indices;
use crate::compress::rdp::rdp;
use crate::foundation::core::Channel;

/// Compressed R, G and B curves of one object.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChannelCurves(pub [KeyframeCurve; 3]);

impl ChannelCurves {
    /// Curve of one channel.
    pub fn get(&self, channel: Channel) -> &KeyframeCurve {
        &self.0[channel.index()]
    }

    /// Mutable curve of one channel.
    pub fn get_mut(&mut self, channel: Channel) -> &mut KeyframeCurve {
        &mut self.0[channel.index()]
    }

    /// Total key count across all channels.
    pub fn key_count(&self) -> usize {
        self.0.iter().map(KeyframeCurve::len).sum()
    }
}

/// Reduce one dense channel to a sparse keyframe curve.
///
/// A tolerance of zero (or below) keeps every sample. Otherwise the sequence is cut at its
/// critical indices, each segment between adjacent critical indices is simplified with
/// [`rdp`] at `tolerance`, and the segments are joined without duplicating the shared endpoints.
/// Critical samples always survive, and inside each segment every dropped sample is reproduced
/// within `tolerance` by linear interpolation.
pub fn compress_channel(frames: &[f64], values: &[f64], tolerance: f64) -> KeyframeCurve {
    let n = frames.len().min(values.len());
    let (frames, values) = (&frames[..n], &values[..n]);

    if tolerance <= 0.0 {
        return KeyframeCurve::from_keys_unchecked(
            frames
                .iter()
                .zip(values)
                .map(|(&f, &v)| Keyframe::new(f, v))
                .collect(),
        );
    }

    let critical = critical_indices(values);
    let mut keys = Vec::with_capacity(critical.len() * 2);
    if let [only] = critical.as_slice() {
        keys.push(Keyframe::new(frames[*only], values[*only]));
    }
    for (k, w) in critical.windows(2).enumerate() {
        let (a, b) = (w[0], w[1]);
        let segment = rdp(&frames[a..=b], &values[a..=b], tolerance);
        let skip = usize::from(k > 0);
        keys.extend(
            segment
                .into_iter()
                .skip(skip)
                .map(|(f, v)| Keyframe::new(f, v)),
        );
    }
    KeyframeCurve::from_keys_unchecked(keys)
}

/// Compress all three channels of a dense composite.
#[tracing::instrument(level = "trace", skip(sample), fields(frames = sample.len()))]
pub fn compress_sample(sample: &DenseSample, tolerance: f64) -> ChannelCurves {
    let frames = sample.frames();
    ChannelCurves(Channel::ALL.map(|c| compress_channel(&frames, sample.channel(c), tolerance)))
}

#[cfg(test)]
#[path = "../../tests/unit/compress/channel.rs"]
mod tests;
