use crate::animation::curve::KeyframeCurve;
use crate::composite::blend::BlendMode;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::clamp01;

/// Layer opacity over time, sampled per frame and clamped to `[0, 1]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Opacity {
    /// Fixed opacity.
    Constant(f64),
    /// Animated opacity.
    Curve(KeyframeCurve),
}

impl Opacity {
    /// Opacity at `frame`. An empty curve is fully opaque.
    pub fn sample(&self, frame: FrameIndex) -> f64 {
        let v = match self {
            Self::Constant(v) => *v,
            Self::Curve(c) => c.sample(frame.as_f64()).unwrap_or(1.0),
        };
        clamp01(v)
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Self::Constant(1.0)
    }
}

fn default_layer_name() -> String {
    "Layer".to_string()
}

/// One blendable color layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    /// Display name.
    #[serde(default = "default_layer_name")]
    pub name: String,
    /// Operator used to composite this layer onto the layers below it.
    #[serde(default)]
    pub blend_mode: BlendMode,
    /// Mix factor over time.
    #[serde(default)]
    pub opacity: Opacity,
    /// Force the layer off.
    #[serde(default)]
    pub mute: bool,
    /// Suppress every non-solo layer while any layer is soloed.
    #[serde(default)]
    pub solo: bool,
}

impl Layer {
    /// Fully opaque `Replace` layer.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blend_mode: BlendMode::Replace,
            opacity: Opacity::default(),
            mute: false,
            solo: false,
        }
    }

    /// Builder-style blend mode setter.
    pub fn with_blend(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Builder-style opacity setter.
    pub fn with_opacity(mut self, opacity: Opacity) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Which layers take part in compositing, given the current mute/solo flags.
///
/// A layer is enabled iff it is not muted and either it is soloed or no layer is soloed.
pub fn effective_enabled(layers: &[Layer]) -> Vec<bool> {
    let any_solo = layers.iter().any(|l| l.solo);
    layers
        .iter()
        .map(|l| !l.mute && (l.solo || !any_solo))
        .collect()
}

/// Ordered layer configuration. Index 0 is the base layer.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Wrap an ordered list of layers.
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Borrow the layers in compositing order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Return `true` when the stack has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Append a layer on top of the stack.
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Flip the mute flag of layer `index`. Out-of-range indices are ignored.
    pub fn toggle_mute(&mut self, index: usize) {
        if let Some(l) = self.layers.get_mut(index) {
            l.mute = !l.mute;
        }
    }

    /// Flip the solo flag of layer `index`. Out-of-range indices are ignored.
    pub fn toggle_solo(&mut self, index: usize) {
        if let Some(l) = self.layers.get_mut(index) {
            l.solo = !l.solo;
        }
    }

    /// Current enabled state of every layer; see [`effective_enabled`].
    pub fn enabled(&self) -> Vec<bool> {
        effective_enabled(&self.layers)
    }

    /// Reject stacks that cannot be baked.
    pub fn validate(&self) -> SwarmResult<()> {
        if self.layers.is_empty() {
            return Err(SwarmError::validation("layer stack must not be empty"));
        }
        for (i, layer) in self.layers.iter().enumerate() {
            match &layer.opacity {
                Opacity::Constant(v) if !v.is_finite() => {
                    return Err(SwarmError::validation(format!(
                        "layer {i} ('{}') opacity must be finite",
                        layer.name
                    )));
                }
                Opacity::Curve(c) => c.validate().map_err(|e| {
                    SwarmError::validation(format!("layer {i} ('{}') opacity: {e}", layer.name))
                })?,
                Opacity::Constant(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/layers.rs"]
mod tests;
