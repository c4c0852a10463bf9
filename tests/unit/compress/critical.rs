use super::*;

#[test]
fn short_sequences_keep_everything() {
    assert_eq!(critical_indices(&[]), Vec::<usize>::new());
    assert_eq!(critical_indices(&[0.4]), vec![0]);
    assert_eq!(critical_indices(&[0.4, 0.9]), vec![0, 1]);
}

#[test]
fn monotonic_ramp_has_only_endpoints() {
    let ramp: Vec<f64> = (0..20).map(|i| i as f64 / 19.0).collect();
    assert_eq!(critical_indices(&ramp), vec![0, 19]);
}

#[test]
fn constant_has_only_endpoints() {
    assert_eq!(critical_indices(&[0.5; 6]), vec![0, 5]);
}

#[test]
fn single_spike_marks_plateau_edges_and_peak() {
    let v = [0.5, 0.5, 0.5, 0.5, 1.0, 0.5, 0.5, 0.5, 0.5, 0.5];
    assert_eq!(critical_indices(&v), vec![0, 3, 4, 5, 9]);
}

#[test]
fn zigzag_marks_every_interior_point() {
    let v = [0.0, 1.0, 0.0, 1.0, 0.0];
    assert_eq!(critical_indices(&v), vec![0, 1, 2, 3, 4]);
}

#[test]
fn turning_point_at_last_interior_index() {
    let v = [0.0, 0.1, 0.2, 0.1];
    assert_eq!(critical_indices(&v), vec![0, 2, 3]);
}

#[test]
fn output_is_strictly_increasing() {
    let v: Vec<f64> = (0..200).map(|i| ((i as f64) * 0.37).sin()).collect();
    let idx = critical_indices(&v);
    assert!(idx.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(idx.first(), Some(&0));
    assert_eq!(idx.last(), Some(&199));
}
