/// Exact at `t == 0` and whenever `a == b`, which curve sampling relies on at key frames.
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

/// Optional 8-bit quantization applied to composite samples before compression.
///
/// Legacy exports stored colors as 8-bit integers; quantizing first keeps the compressed curve
/// bit-compatible with those exports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantize {
    /// Keep full `f64` precision.
    #[default]
    None,
    /// Snap to the nearest `n / 255` level.
    Rgb8,
    /// Snap down to `floor(v * 255) / 255`, as the oldest exporter did.
    Rgb8Truncate,
}

impl Quantize {
    /// Quantize one channel value. Values are clamped to `[0, 1]` first when quantizing.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::None => v,
            Self::Rgb8 => f64::from(to_u8_round(v)) / 255.0,
            Self::Rgb8Truncate => f64::from(to_u8_floor(v)) / 255.0,
        }
    }
}

pub(crate) fn to_u8_round(v: f64) -> u8 {
    (clamp01(v) * 255.0).round() as u8
}

pub(crate) fn to_u8_floor(v: f64) -> u8 {
    (clamp01(v) * 255.0).floor() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
