/// Ramer–Douglas–Peucker simplification using vertical (value-axis) error.
///
/// Returns the subset of `(frame, value)` points whose piecewise-linear interpolation stays within
/// `epsilon` of every dropped point, measured along the value axis only. The first and last
/// points are always kept. Inputs with fewer than three points are returned unchanged; when the
/// slices differ in length the extra tail is ignored.
///
/// Splitting uses an explicit work stack, so pathological inputs cannot exhaust the call stack.
/// The kept set is identical to the classic recursive formulation.
pub fn rdp(frames: &[f64], values: &[f64], epsilon: f64) -> Vec<(f64, f64)> {
    let n = frames.len().min(values.len());
    if n < 3 {
        return (0..n).map(|i| (frames[i], values[i])).collect();
    }

    let mut keep = vec![false; n];
    keep[0] = true;
    keep[n - 1] = true;

    let mut work = vec![(0usize, n - 1)];
    while let Some((lo, hi)) = work.pop() {
        if hi - lo < 2 {
            continue;
        }
        let (idx, dmax) = max_vertical_deviation(frames, values, lo, hi);
        if dmax > epsilon {
            keep[idx] = true;
            work.push((idx, hi));
            work.push((lo, idx));
        }
    }

    (0..n)
        .filter(|&i| keep[i])
        .map(|i| (frames[i], values[i]))
        .collect()
}

/// Interior point of `lo..=hi` farthest (vertically) from the chord `lo -> hi`.
///
/// Ties resolve to the earliest index. A chord with zero frame extent has zero error everywhere.
fn max_vertical_deviation(frames: &[f64], values: &[f64], lo: usize, hi: usize) -> (usize, f64) {
    let (x0, y0) = (frames[lo], values[lo]);
    let (x1, y1) = (frames[hi], values[hi]);

    let dx = x1 - x0;
    if dx == 0.0 {
        return (lo + 1, 0.0);
    }

    let m = (y1 - y0) / dx;
    let c = y0 - m * x0;

    let mut best = (lo + 1, 0.0);
    for i in lo + 1..hi {
        let d = (values[i] - (m * frames[i] + c)).abs();
        if d > best.1 {
            best = (i, d);
        }
    }
    best
}

#[cfg(test)]
#[path = "../../tests/unit/compress/rdp.rs"]
mod tests;
