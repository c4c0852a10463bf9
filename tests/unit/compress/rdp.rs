use super::*;

fn frames(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

fn interp(points: &[(f64, f64)], x: f64) -> f64 {
    let i = points.partition_point(|p| p.0 <= x);
    if i == 0 {
        return points[0].1;
    }
    if i >= points.len() {
        return points[points.len() - 1].1;
    }
    let (x0, y0) = points[i - 1];
    let (x1, y1) = points[i];
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

#[test]
fn fewer_than_three_points_are_returned_as_is() {
    assert_eq!(rdp(&[], &[], 0.1), vec![]);
    assert_eq!(rdp(&[1.0], &[0.5], 0.1), vec![(1.0, 0.5)]);
    assert_eq!(rdp(&[1.0, 2.0], &[0.5, 0.7], 0.1), vec![(1.0, 0.5), (2.0, 0.7)]);
}

#[test]
fn straight_line_collapses_to_endpoints() {
    let f = frames(50);
    let v: Vec<f64> = f.iter().map(|x| 0.01 * x).collect();
    assert_eq!(rdp(&f, &v, 0.001), vec![(0.0, 0.0), (49.0, v[49])]);
}

#[test]
fn deviation_equal_to_epsilon_is_dropped() {
    let out = rdp(&[0.0, 1.0, 2.0], &[0.0, 0.5, 0.0], 0.5);
    assert_eq!(out, vec![(0.0, 0.0), (2.0, 0.0)]);
}

#[test]
fn deviation_above_epsilon_is_kept() {
    let out = rdp(&[0.0, 1.0, 2.0], &[0.0, 0.5, 0.0], 0.25);
    assert_eq!(out, vec![(0.0, 0.0), (1.0, 0.5), (2.0, 0.0)]);
}

#[test]
fn zero_width_chord_is_zero_error() {
    let out = rdp(&[3.0, 3.0, 3.0], &[0.0, 1.0, 0.0], 0.01);
    assert_eq!(out, vec![(3.0, 0.0), (3.0, 0.0)]);
}

#[test]
fn error_is_vertical_not_perpendicular() {
    // Perpendicular distance to the steep chord would be far below epsilon.
    let f = [0.0, 1.0, 2.0];
    let v = [0.0, 90.0, 100.0];
    let out = rdp(&f, &v, 30.0);
    assert_eq!(out.len(), 3);
}

#[test]
fn result_reconstructs_every_sample_within_epsilon() {
    let f = frames(300);
    let v: Vec<f64> = f
        .iter()
        .map(|x| 0.5 + 0.4 * (x * 0.05).sin() * (x * 0.011).cos())
        .collect();
    let eps = 0.01;
    let out = rdp(&f, &v, eps);
    assert!(out.len() < f.len());
    assert_eq!(out.first(), Some(&(0.0, v[0])));
    assert_eq!(out.last(), Some(&(299.0, v[299])));
    assert!(out.windows(2).all(|w| w[0].0 < w[1].0));
    for (x, y) in f.iter().zip(&v) {
        assert!((interp(&out, *x) - y).abs() <= eps + 1e-12, "frame {x}");
    }
}

#[test]
fn long_staircase_does_not_overflow_stack() {
    let f = frames(5_000);
    let v: Vec<f64> = f.iter().map(|x| (x / 2.0).floor()).collect();
    let out = rdp(&f, &v, 0.1);
    assert_eq!(out.first(), Some(&(0.0, 0.0)));
    assert_eq!(out.last().map(|p| p.0), Some(4_999.0));
}
