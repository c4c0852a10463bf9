use crate::foundation::error::{SwarmError, SwarmResult};

/// Linear RGB triple with components nominally in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Absolute frame number in host timeline space.
///
/// Host scenes may start before frame 0, so the index is signed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub i64);

impl FrameIndex {
    /// Frame number as a curve-space abscissa.
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

/// Inclusive frame range `[start, end]` with a step of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// First frame of the range.
    pub start: FrameIndex,
    /// Last frame of the range (inclusive).
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> SwarmResult<Self> {
        let range = Self { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Re-check the `start <= end` invariant, e.g. after deserializing.
    pub fn validate(self) -> SwarmResult<()> {
        if self.start.0 > self.end.0 {
            return Err(SwarmError::validation(format!(
                "frame range start {} must be <= end {}",
                self.start.0, self.end.0
            )));
        }
        Ok(())
    }

    /// Number of frames in the range. A single-frame range has length 1.
    pub fn len_frames(self) -> usize {
        self.end
            .0
            .saturating_sub(self.start.0)
            .saturating_add(1)
            .max(0) as usize
    }

    /// Return `true` when `f` lies inside `[start, end]`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 <= self.end.0
    }

    /// Iterate every frame of the range in order.
    pub fn frames(self) -> impl Iterator<Item = FrameIndex> {
        (self.start.0..=self.end.0).map(FrameIndex)
    }
}

/// Color channel selector.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Channel {
    /// Red.
    R,
    /// Green.
    G,
    /// Blue.
    B,
}

impl Channel {
    /// All channels in storage order.
    pub const ALL: [Channel; 3] = [Channel::R, Channel::G, Channel::B];

    /// Index of this channel inside an [`Rgb`] triple.
    pub fn index(self) -> usize {
        match self {
            Self::R => 0,
            Self::G => 1,
            Self::B => 2,
        }
    }
}

/// Stable identity of one tracked object (drone) in the host scene.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ObjectId(pub String);

impl ObjectId {
    /// Create an id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
