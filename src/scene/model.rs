use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::curve::KeyframeCurve;
use crate::animation::source::{CurveSource, ObjectColorSource};
use crate::bake::store::{CurveSink, SourceStore, WriteMode, apply_write};
use crate::composite::layers::LayerStack;
use crate::compress::channel::ChannelCurves;
use crate::foundation::core::{Channel, FrameRange, ObjectId, Rgb};
use crate::foundation::error::{SwarmError, SwarmResult};

/// One object's value for one layer: a constant color plus optional per-channel animation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerValue {
    /// Fallback color for channels without a (non-empty) curve.
    ///
    /// Accepts a scalar (broadcast to all channels) or a list; short lists are padded with `0.0`
    /// and extra components (e.g. alpha) are ignored.
    #[serde(default, deserialize_with = "deserialize_rgb")]
    pub color: Rgb,
    /// Animated R, G and B curves.
    #[serde(default)]
    pub curves: [Option<KeyframeCurve>; 3],
}

impl LayerValue {
    /// Unanimated layer value.
    pub fn constant(color: Rgb) -> Self {
        Self {
            color,
            curves: Default::default(),
        }
    }

    /// Current color at `frame`: each channel's curve when present, else the constant.
    pub fn color_at(&self, frame: f64) -> Rgb {
        let mut out = self.color;
        for c in Channel::ALL {
            if let Some(curve) = &self.curves[c.index()]
                && let Some(v) = curve.sample(frame)
            {
                out[c.index()] = v;
            }
        }
        out
    }

    fn channel_source(&self, channel: Channel) -> SwarmResult<CurveSource> {
        let i = channel.index();
        match &self.curves[i] {
            Some(curve) if !curve.is_empty() => {
                curve.validate()?;
                Ok(CurveSource::Curve(curve.clone()))
            }
            _ => Ok(CurveSource::Constant(self.color[i])),
        }
    }
}

fn deserialize_rgb<'de, D>(deserializer: D) -> Result<Rgb, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Scalar(f64),
        List(Vec<f64>),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Scalar(v) => Ok([v; 3]),
        Repr::List(v) => {
            let mut out = [0.0; 3];
            for (dst, src) in out.iter_mut().zip(v) {
                *dst = src;
            }
            Ok(out)
        }
    }
}

/// One tracked object in a scene document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Per-layer values indexed like the scene's layer stack. `null` or missing entries are black.
    #[serde(default)]
    pub layers: Vec<Option<LayerValue>>,
    /// Baked output color curves, written by a bake pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<ChannelCurves>,
    /// World-space position, used by spatial effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 3]>,
}

impl SceneObject {
    /// Object with one constant color per layer.
    pub fn constant(colors: &[Rgb]) -> Self {
        Self {
            layers: colors
                .iter()
                .map(|c| Some(LayerValue::constant(*c)))
                .collect(),
            color: None,
            position: None,
        }
    }

    /// Builder-style position setter.
    pub fn at(mut self, position: [f64; 3]) -> Self {
        self.position = Some(position);
        self
    }

    /// Value of `layer`, when the object has one.
    pub fn layer(&self, layer: usize) -> Option<&LayerValue> {
        self.layers.get(layer).and_then(Option::as_ref)
    }

    /// Mutable value of `layer`, when the object has one.
    pub fn layer_mut(&mut self, layer: usize) -> Option<&mut LayerValue> {
        self.layers.get_mut(layer).and_then(Option::as_mut)
    }
}

/// In-memory host scene: a shared layer stack and the tracked objects' layer values.
///
/// Serves as the reference [`SourceStore`] / [`CurveSink`] for the CLI and tests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Layer stack shared by every object.
    pub layers: LayerStack,
    /// Tracked objects.
    #[serde(default)]
    pub objects: BTreeMap<ObjectId, SceneObject>,
}

impl Scene {
    /// Parse a scene from a JSON reader.
    pub fn from_reader(r: impl Read) -> SwarmResult<Self> {
        serde_json::from_reader(r).map_err(|e| SwarmError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON string.
    pub fn from_json(s: &str) -> SwarmResult<Self> {
        serde_json::from_str(s).map_err(|e| SwarmError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SwarmResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SwarmError::source(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> SwarmResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SwarmError::serde(format!("encode scene JSON: {e}")))
    }

    /// Write the scene as pretty-printed JSON.
    pub fn write_path(&self, path: impl AsRef<Path>) -> SwarmResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            SwarmError::store(format!("create scene JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self)
            .map_err(|e| SwarmError::serde(format!("write scene JSON '{}': {e}", path.display())))?;
        w.flush()
            .map_err(|e| SwarmError::store(format!("flush scene JSON '{}': {e}", path.display())))
    }

    /// Baked curves of every object that has them.
    pub fn baked(&self) -> BTreeMap<ObjectId, ChannelCurves> {
        self.objects
            .iter()
            .filter_map(|(id, o)| Some((id.clone(), o.color.clone()?)))
            .collect()
    }
}

impl SourceStore for Scene {
    fn object_ids(&self) -> Vec<ObjectId> {
        self.objects.keys().cloned().collect()
    }

    fn snapshot(&self, id: &ObjectId, layer_count: usize) -> SwarmResult<ObjectColorSource> {
        let obj = self
            .objects
            .get(id)
            .ok_or_else(|| SwarmError::source(format!("object '{id}' not found")))?;

        let mut src = ObjectColorSource::default();
        for layer in 0..layer_count {
            let Some(value) = obj.layer(layer) else {
                continue;
            };
            for c in Channel::ALL {
                let s = value.channel_source(c).map_err(|e| {
                    SwarmError::source(format!("object '{id}' layer {layer} channel {c:?}: {e}"))
                })?;
                src.set(layer, c, s);
            }
        }
        Ok(src)
    }
}

impl CurveSink for Scene {
    fn write_curves(
        &mut self,
        id: &ObjectId,
        curves: &ChannelCurves,
        range: FrameRange,
        mode: WriteMode,
    ) -> SwarmResult<()> {
        let obj = self
            .objects
            .get_mut(id)
            .ok_or_else(|| SwarmError::store(format!("object '{id}' not found")))?;
        let slot = obj.color.get_or_insert_with(ChannelCurves::default);
        apply_write(slot, curves, range, mode);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
