use crate::foundation::core::FrameRange;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::lerp;

/// One `(frame, value)` control point of a [`KeyframeCurve`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Curve-space frame (may be fractional).
    pub frame: f64,
    /// Channel value at `frame`.
    pub value: f64,
}

impl Keyframe {
    /// Create a keyframe.
    pub fn new(frame: f64, value: f64) -> Self {
        Self { frame, value }
    }
}

/// Piecewise-linear curve over strictly increasing keyframes.
///
/// Between keys the value is linearly interpolated; before the first key and after the last one
/// the nearest key value is held.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>, // strictly increasing frames
}

impl KeyframeCurve {
    /// Empty curve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from keys, validating that frames are finite and strictly increasing.
    pub fn from_keys(keys: Vec<Keyframe>) -> SwarmResult<Self> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    /// Build a curve from `(frame, value)` pairs.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> SwarmResult<Self> {
        Self::from_keys(
            points
                .into_iter()
                .map(|(frame, value)| Keyframe { frame, value })
                .collect(),
        )
    }

    /// Build without validation. Callers guarantee strictly increasing frames.
    pub(crate) fn from_keys_unchecked(keys: Vec<Keyframe>) -> Self {
        Self { keys }
    }

    /// Check the strictly-increasing-frames invariant.
    pub fn validate(&self) -> SwarmResult<()> {
        if self
            .keys
            .iter()
            .any(|k| !k.frame.is_finite() || !k.value.is_finite())
        {
            return Err(SwarmError::validation(
                "keyframe frames and values must be finite",
            ));
        }
        if !self.keys.windows(2).all(|w| w[0].frame < w[1].frame) {
            return Err(SwarmError::validation(
                "keyframe frames must be strictly increasing",
            ));
        }
        Ok(())
    }

    /// Borrow the keys in frame order.
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Return `true` when the curve has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sample the curve at `frame`. Returns `None` only for an empty curve.
    pub fn sample(&self, frame: f64) -> Option<f64> {
        let first = self.keys.first()?;
        let idx = self.keys.partition_point(|k| k.frame <= frame);

        if idx == 0 {
            return Some(first.value);
        }
        if idx >= self.keys.len() {
            return Some(self.keys[self.keys.len() - 1].value);
        }

        let a = self.keys[idx - 1];
        let b = self.keys[idx];
        let denom = b.frame - a.frame;
        if denom <= 0.0 {
            return Some(a.value);
        }
        let t = (frame - a.frame) / denom;
        Some(lerp(a.value, b.value, t))
    }

    /// Insert a key, replacing any existing key at exactly the same frame.
    pub fn insert(&mut self, key: Keyframe) {
        let idx = self.keys.partition_point(|k| k.frame < key.frame);
        match self.keys.get(idx) {
            Some(existing) if existing.frame == key.frame => self.keys[idx] = key,
            _ => self.keys.insert(idx, key),
        }
    }

    /// Remove the key at exactly `frame`, returning it when present.
    pub fn remove_at(&mut self, frame: f64) -> Option<Keyframe> {
        let idx = self.keys.iter().position(|k| k.frame == frame)?;
        Some(self.keys.remove(idx))
    }

    /// Move every key by `dt` frames. Non-finite offsets are ignored.
    pub fn shift(&mut self, dt: f64) {
        if !dt.is_finite() {
            return;
        }
        for k in &mut self.keys {
            k.frame += dt;
        }
    }

    /// Replace every key inside `range` with the keys of `replacement`.
    ///
    /// Keys strictly before `range.start` or strictly after `range.end` are kept. Replacement keys
    /// outside `range` are dropped so the result stays strictly increasing.
    pub fn splice_range(&mut self, replacement: &KeyframeCurve, range: FrameRange) {
        let lo = range.start.as_f64();
        let hi = range.end.as_f64();

        let mut keys = Vec::with_capacity(self.keys.len() + replacement.keys.len());
        keys.extend(self.keys.iter().copied().filter(|k| k.frame < lo));
        keys.extend(
            replacement
                .keys
                .iter()
                .copied()
                .filter(|k| lo <= k.frame && k.frame <= hi),
        );
        keys.extend(self.keys.iter().copied().filter(|k| k.frame > hi));
        self.keys = keys;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/curve.rs"]
mod tests;
