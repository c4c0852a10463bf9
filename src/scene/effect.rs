use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::foundation::core::{FrameRange, ObjectId, Rgb};
use crate::foundation::error::{SwarmError, SwarmResult};
use crate::foundation::math::lerp;
use crate::scene::edit::{EditLog, key_color};
use crate::scene::model::Scene;

/// Random flashes from the layer color to a palette color and back.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparkleOpts {
    /// Frames on which a flash may start.
    pub range: FrameRange,
    /// Frames from base to flash color, and again from flash color back to base.
    pub transition: u32,
    /// Share of objects lit per flash length; `1.0` keeps every object busy on average.
    pub influence: f64,
    /// Flash colors, picked uniformly.
    pub palette: Vec<Rgb>,
    /// Seed of the random picks; equal seeds give equal edits.
    #[serde(default)]
    pub seed: u64,
}

/// One keyframed stage of a [`temporal_sparkle`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SparkleStage {
    /// Flash transition length in frames; fractional values truncate per frame.
    pub transition: f64,
    /// Share of objects lit per flash length.
    pub influence: f64,
    /// Flash colors of this stage.
    pub palette: Vec<Rgb>,
}

/// Sparkle whose timing, density and palette drift through a list of stages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemporalSparkleOpts {
    /// Frames on which a flash may start.
    pub range: FrameRange,
    /// At least two stages, spread over `range` with smoothstep easing.
    pub stages: Vec<SparkleStage>,
    /// Seed of the random picks.
    #[serde(default)]
    pub seed: u64,
}

/// How an object's position maps to an offset along the stagger axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMode {
    /// Projection onto the axis, `0` at `origin` and `1` at `target`.
    #[default]
    Linear,
    /// Distance from `origin`, relative to the axis length.
    Spherical,
}

/// Staggers existing layer keys in time by object position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OffsetOpts {
    /// Axis start; objects here are not moved.
    pub origin: [f64; 3],
    /// Axis end; objects here (or past it) move by the full `duration`.
    pub target: [f64; 3],
    /// Position-to-offset mapping.
    #[serde(default)]
    pub mode: OffsetMode,
    /// Largest offset in frames.
    pub duration: f64,
}

fn validate_influence(influence: f64) -> SwarmResult<()> {
    if !influence.is_finite() || influence < 0.0 {
        return Err(SwarmError::validation(format!(
            "influence must be a finite value >= 0, got {influence}"
        )));
    }
    Ok(())
}

/// Listed objects that have a value for `layer`, first occurrence only.
fn candidates(scene: &Scene, ids: &[ObjectId], layer: usize) -> Vec<ObjectId> {
    let mut out: Vec<ObjectId> = Vec::with_capacity(ids.len());
    for id in ids {
        let has_layer = scene
            .objects
            .get(id)
            .is_some_and(|o| o.layer(layer).is_some());
        if has_layer && !out.contains(id) {
            out.push(id.clone());
        }
    }
    out
}

fn flash_count(total: usize, influence: f64, transition: i64) -> usize {
    let span = (transition * 2).max(1) as f64;
    ((total as f64 * influence / span).round() as usize).max(1)
}

/// Key base, flash and base at `f`, `f + transition` and `f + 2 * transition`.
fn flash(
    scene: &mut Scene,
    log: &mut EditLog,
    id: &ObjectId,
    layer: usize,
    f: i64,
    transition: i64,
    color: Rgb,
) {
    let Some(value) = scene.objects.get_mut(id).and_then(|o| o.layer_mut(layer)) else {
        return;
    };
    log.record_first(id, layer, value);
    let base = value.color_at(f as f64);
    key_color(value, base, f as f64);
    key_color(value, color, (f + transition) as f64);
    key_color(value, base, (f + 2 * transition) as f64);
}

/// Scatter random flashes over `range` on `layer` of the listed objects.
///
/// Each frame lights up to `max(1, round(n * influence / (2 * transition)))` objects that are
/// not still flashing; a lit object is ineligible until one frame after its flash ends.
pub fn sparkle(
    scene: &mut Scene,
    ids: &[ObjectId],
    layer: usize,
    opts: &SparkleOpts,
) -> SwarmResult<EditLog> {
    opts.range.validate()?;
    validate_influence(opts.influence)?;
    if opts.transition == 0 {
        return Err(SwarmError::validation("sparkle transition must be >= 1 frame"));
    }
    if opts.palette.is_empty() {
        return Err(SwarmError::validation("sparkle palette is empty"));
    }

    let objects = candidates(scene, ids, layer);
    let trans = i64::from(opts.transition);
    let count = flash_count(objects.len(), opts.influence, trans);
    let mut ready = vec![opts.range.start.0; objects.len()];
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut log = EditLog::default();

    for f in opts.range.frames().map(|f| f.0) {
        let eligible: Vec<usize> = (0..objects.len()).filter(|&i| f >= ready[i]).collect();
        let lit: Vec<usize> = eligible.choose_multiple(&mut rng, count).copied().collect();
        for i in lit {
            let Some(&color) = opts.palette.choose(&mut rng) else {
                continue;
            };
            flash(scene, &mut log, &objects[i], layer, f, trans, color);
            ready[i] = f + 2 * trans + 1;
        }
    }
    tracing::debug!(objects = log.len(), "sparkle keyed");
    Ok(log)
}

fn smoothstep(x: f64) -> f64 {
    x * x * (3.0 - 2.0 * x)
}

/// Stage mix at `progress` in `[0, 1]`: index of the lower stage and the blend toward the next.
fn stage_at(progress: f64, stages: usize) -> (usize, f64) {
    let scaled = progress * (stages - 1) as f64;
    let idx = (scaled as usize).min(stages - 2);
    (idx, scaled - idx as f64)
}

/// Palette of the blend between two stages: matching entries are interpolated, and a side with no
/// entries defers to the other stage's colors.
fn blend_palette(a: &[Rgb], b: &[Rgb], alpha: f64) -> Vec<Rgb> {
    let pool: Vec<Rgb> = a
        .iter()
        .zip(b)
        .map(|(x, y)| [0, 1, 2].map(|j| lerp(x[j], y[j], alpha)))
        .collect();
    if !pool.is_empty() {
        return pool;
    }
    if a.is_empty() { b.to_vec() } else { a.to_vec() }
}

/// [`sparkle`] driven by stages: transition, influence and palette are interpolated between the
/// two stages around the eased progress through `range`.
pub fn temporal_sparkle(
    scene: &mut Scene,
    ids: &[ObjectId],
    layer: usize,
    opts: &TemporalSparkleOpts,
) -> SwarmResult<EditLog> {
    opts.range.validate()?;
    if opts.stages.len() < 2 {
        return Err(SwarmError::validation(
            "temporal sparkle needs at least 2 stages",
        ));
    }
    for (i, st) in opts.stages.iter().enumerate() {
        if !st.transition.is_finite() || st.transition < 0.0 {
            return Err(SwarmError::validation(format!(
                "stage {i} transition must be a finite value >= 0"
            )));
        }
        validate_influence(st.influence)?;
    }

    let objects = candidates(scene, ids, layer);
    let (start, end) = (opts.range.start.0, opts.range.end.0);
    let span = (end - start).max(1) as f64;
    let mut ready = vec![start; objects.len()];
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut log = EditLog::default();

    for f in start..=end {
        let progress = smoothstep((f - start) as f64 / span);
        let (idx, alpha) = stage_at(progress, opts.stages.len());
        let (s0, s1) = (&opts.stages[idx], &opts.stages[idx + 1]);

        let pool = blend_palette(&s0.palette, &s1.palette, alpha);
        if pool.is_empty() {
            continue;
        }
        let trans = lerp(s0.transition, s1.transition, alpha) as i64;
        let influence = lerp(s0.influence, s1.influence, alpha);
        let count = flash_count(objects.len(), influence, trans);

        let eligible: Vec<usize> = (0..objects.len()).filter(|&i| f >= ready[i]).collect();
        let lit: Vec<usize> = eligible.choose_multiple(&mut rng, count).copied().collect();
        for i in lit {
            let Some(&color) = pool.choose(&mut rng) else {
                continue;
            };
            flash(scene, &mut log, &objects[i], layer, f, trans, color);
            ready[i] = f + 2 * trans + 1;
        }
    }
    tracing::debug!(objects = log.len(), "temporal sparkle keyed");
    Ok(log)
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Axis parameter of `pos` in `[0, 1]`.
fn axis_t(opts: &OffsetOpts, pos: [f64; 3]) -> f64 {
    let axis = sub(opts.target, opts.origin);
    let rel = sub(pos, opts.origin);
    let t = match opts.mode {
        OffsetMode::Linear => {
            let denom = dot(axis, axis);
            let denom = if denom == 0.0 { 1.0 } else { denom };
            dot(rel, axis) / denom
        }
        OffsetMode::Spherical => {
            let len = dot(axis, axis).sqrt();
            let len = if len == 0.0 { 1.0 } else { len };
            dot(rel, rel).sqrt() / len
        }
    };
    t.clamp(0.0, 1.0)
}

/// Shift every key of `layer` on the listed objects by `t * duration` frames, where `t` is the
/// object's clamped position along the axis.
///
/// Objects without a position or without any curve on the layer are skipped.
pub fn offset_keys(
    scene: &mut Scene,
    ids: &[ObjectId],
    layer: usize,
    opts: &OffsetOpts,
) -> SwarmResult<EditLog> {
    if !opts.duration.is_finite() {
        return Err(SwarmError::validation("offset duration must be finite"));
    }
    let finite = |p: &[f64; 3]| p.iter().all(|v| v.is_finite());
    if !finite(&opts.origin) || !finite(&opts.target) {
        return Err(SwarmError::validation("offset axis must be finite"));
    }

    let mut log = EditLog::default();
    for id in candidates(scene, ids, layer) {
        let Some(obj) = scene.objects.get_mut(&id) else {
            continue;
        };
        let Some(pos) = obj.position else {
            tracing::debug!(object = %id, "object has no position; not offset");
            continue;
        };
        let Some(value) = obj.layer_mut(layer) else {
            continue;
        };
        if value.curves.iter().all(Option::is_none) {
            continue;
        }

        let dt = axis_t(opts, pos) * opts.duration;
        log.record_first(&id, layer, value);
        for curve in value.curves.iter_mut().flatten() {
            curve.shift(dt);
        }
    }
    Ok(log)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/effect.rs"]
mod tests;
