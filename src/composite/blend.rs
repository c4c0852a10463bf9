use crate::foundation::core::Rgb;

/// Per-channel operator used when compositing a layer onto the accumulated color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Take the top color.
    #[default]
    Replace,
    /// Same operator as `Replace`; kept distinct to round-trip host scenes.
    Mix,
    /// `min(1, base + top)`.
    Add,
    /// `max(0, base - top)`.
    Subtract,
    /// `base * top`.
    Multiply,
    /// `max(base, top)`.
    Lighten,
    /// `min(base, top)`.
    Darken,
    /// `1 - (1 - base) * (1 - top)`.
    Screen,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 8] = [
        BlendMode::Replace,
        BlendMode::Mix,
        BlendMode::Add,
        BlendMode::Subtract,
        BlendMode::Multiply,
        BlendMode::Lighten,
        BlendMode::Darken,
        BlendMode::Screen,
    ];

    fn apply(self, base: f64, top: f64) -> f64 {
        match self {
            Self::Replace | Self::Mix => top,
            Self::Add => (base + top).min(1.0),
            Self::Subtract => (base - top).max(0.0),
            Self::Multiply => base * top,
            Self::Lighten => base.max(top),
            Self::Darken => base.min(top),
            Self::Screen => 1.0 - (1.0 - base) * (1.0 - top),
        }
    }
}

/// Blend `top` onto `base` with `mode`, weighted by `factor`.
///
/// Each channel is `base * (1 - factor) + f(base, top) * factor`. A non-positive factor returns
/// `base` untouched.
pub fn blend(base: Rgb, top: Rgb, mode: BlendMode, factor: f64) -> Rgb {
    if factor <= 0.0 {
        return base;
    }

    let mut out = [0.0; 3];
    for i in 0..3 {
        let f = mode.apply(base[i], top[i]);
        out[i] = base[i] * (1.0 - factor) + f * factor;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/composite/blend.rs"]
mod tests;
