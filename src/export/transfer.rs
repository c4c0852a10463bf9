use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::compress::channel::ChannelCurves;
use crate::foundation::core::{Channel, ObjectId};
use crate::foundation::error::{SwarmError, SwarmResult};

/// Per-frame RGBA samples of one object, keyed by integer frame.
pub type FrameColors = BTreeMap<i64, [f64; 4]>;

/// Baked colors in transfer form: `{ "<object>": { "<frame>": [r, g, b, 1.0] } }`.
///
/// Only frames that carry a key on at least one channel are listed; consumers interpolate
/// linearly in between.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ColorTransfer(pub BTreeMap<ObjectId, FrameColors>);

impl ColorTransfer {
    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> SwarmResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SwarmError::serde(format!("encode color transfer JSON: {e}")))
    }

    /// Write the transfer document as pretty-printed JSON.
    pub fn write_path(&self, path: impl AsRef<Path>) -> SwarmResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            SwarmError::store(format!("create color transfer '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, self).map_err(|e| {
            SwarmError::serde(format!("write color transfer '{}': {e}", path.display()))
        })?;
        w.flush().map_err(|e| {
            SwarmError::store(format!("flush color transfer '{}': {e}", path.display()))
        })
    }
}

/// Sample every object's curves at the union of its key frames.
///
/// Key frames are truncated to whole frames. A channel without keys reads as `0.0`.
pub fn color_transfer<'a>(
    curves: impl IntoIterator<Item = (&'a ObjectId, &'a ChannelCurves)>,
) -> ColorTransfer {
    let mut out = BTreeMap::new();
    for (id, c) in curves {
        let frames: BTreeSet<i64> = c
            .0
            .iter()
            .flat_map(|curve| curve.keys())
            .map(|k| k.frame as i64)
            .collect();

        let colors: FrameColors = frames
            .into_iter()
            .map(|f| {
                let at = |ch: Channel| c.get(ch).sample(f as f64).unwrap_or(0.0);
                (f, [at(Channel::R), at(Channel::G), at(Channel::B), 1.0])
            })
            .collect();
        out.insert(id.clone(), colors);
    }
    ColorTransfer(out)
}

#[cfg(test)]
#[path = "../../tests/unit/export/transfer.rs"]
mod tests;
