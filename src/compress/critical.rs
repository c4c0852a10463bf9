/// Indices where the direction of a value sequence changes, plus both endpoints.
///
/// The slope sign of each step is one of `-1`, `0` or `1`; index `i` is a turning point when the
/// step into it and the step out of it have different signs. Plateaus therefore contribute their
/// first and last sample. Sequences shorter than three samples keep every index.
///
/// The result is strictly increasing and free of duplicates.
pub fn critical_indices(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    if n < 3 {
        return (0..n).collect();
    }

    let mut out = Vec::with_capacity(8);
    out.push(0);

    let mut prev = slope_sign(values[0], values[1]);
    for i in 1..n - 1 {
        let next = slope_sign(values[i], values[i + 1]);
        if next != prev {
            out.push(i);
        }
        prev = next;
    }

    out.push(n - 1);
    out
}

fn slope_sign(a: f64, b: f64) -> i8 {
    let d = b - a;
    if d > 0.0 {
        1
    } else if d < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compress/critical.rs"]
mod tests;
