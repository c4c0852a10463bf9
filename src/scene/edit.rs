use crate::animation::curve::{Keyframe, KeyframeCurve};
use crate::foundation::core::{Channel, ObjectId, Rgb};
use crate::scene::model::{LayerValue, Scene};

#[derive(Clone, Debug, PartialEq)]
struct EditEntry {
    object: ObjectId,
    layer: usize,
    before: LayerValue,
}

/// Prior layer values of one batch edit, sufficient to restore them exactly.
///
/// Returned by [`set_color`], [`set_color_keyed`], [`key_current`] and the effect generators.
/// Objects that were skipped (unknown id, or no value for the layer) are not recorded.
#[derive(Clone, Debug, Default, PartialEq)]
#[must_use = "dropping the log makes the edit irreversible"]
pub struct EditLog {
    entries: Vec<EditEntry>,
}

impl EditLog {
    /// Number of edited (object, layer) values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when the edit touched nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Edited objects, in edit order.
    pub fn objects(&self) -> impl Iterator<Item = &ObjectId> {
        self.entries.iter().map(|e| &e.object)
    }

    /// Log the value of (`object`, `layer`) before its first change in this edit.
    pub(crate) fn record_first(&mut self, object: &ObjectId, layer: usize, before: &LayerValue) {
        if self
            .entries
            .iter()
            .any(|e| e.layer == layer && e.object == *object)
        {
            return;
        }
        self.entries.push(EditEntry {
            object: object.clone(),
            layer,
            before: before.clone(),
        });
    }

    /// Restore every logged value. Returns how many values were restored.
    ///
    /// Objects removed from the scene since the edit are skipped.
    pub fn undo(self, scene: &mut Scene) -> usize {
        let mut restored = 0;
        for entry in self.entries.into_iter().rev() {
            if let Some(slot) = scene
                .objects
                .get_mut(&entry.object)
                .and_then(|o| o.layer_mut(entry.layer))
            {
                *slot = entry.before;
                restored += 1;
            }
        }
        tracing::debug!(restored, "undid batch color edit");
        restored
    }
}

fn edit_each(
    scene: &mut Scene,
    ids: &[ObjectId],
    layer: usize,
    mut f: impl FnMut(&mut LayerValue),
) -> EditLog {
    let mut log = EditLog::default();
    for id in ids {
        let Some(value) = scene.objects.get_mut(id).and_then(|o| o.layer_mut(layer)) else {
            tracing::debug!(object = %id, layer, "object has no value for layer; skipped");
            continue;
        };
        log.entries.push(EditEntry {
            object: id.clone(),
            layer,
            before: value.clone(),
        });
        f(value);
    }
    log
}

pub(crate) fn key_color(value: &mut LayerValue, rgb: Rgb, frame: f64) {
    for c in Channel::ALL {
        value.curves[c.index()]
            .get_or_insert_with(KeyframeCurve::new)
            .insert(Keyframe::new(frame, rgb[c.index()]));
    }
}

/// Set the constant color of `layer` on every listed object.
pub fn set_color(scene: &mut Scene, ids: &[ObjectId], layer: usize, rgb: Rgb) -> EditLog {
    edit_each(scene, ids, layer, |v| v.color = rgb)
}

/// Set the constant color of `layer` and key it at `frame` on all three channel curves.
///
/// An existing key at exactly `frame` is replaced.
pub fn set_color_keyed(
    scene: &mut Scene,
    ids: &[ObjectId],
    layer: usize,
    rgb: Rgb,
    frame: f64,
) -> EditLog {
    edit_each(scene, ids, layer, |v| {
        v.color = rgb;
        key_color(v, rgb, frame);
    })
}

/// Key the current color of `layer` at `frame`, leaving the curve shape unchanged there.
pub fn key_current(scene: &mut Scene, ids: &[ObjectId], layer: usize, frame: f64) -> EditLog {
    edit_each(scene, ids, layer, |v| {
        let rgb = v.color_at(frame);
        key_color(v, rgb, frame);
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/edit.rs"]
mod tests;
