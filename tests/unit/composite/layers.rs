use super::*;

fn flags(pairs: &[(bool, bool)]) -> Vec<Layer> {
    pairs.iter()
        .enumerate()
        .map(|(i, &(mute, solo))| Layer {
            mute,
            solo,
            ..Layer::new(format!("L{i}"))
        })
        .collect()
}

#[test]
fn all_enabled_without_flags() {
    assert_eq!(
        effective_enabled(&flags(&[(false, false), (false, false)])),
        vec![true, true]
    );
}

#[test]
fn mute_disables_only_that_layer() {
    assert_eq!(
        effective_enabled(&flags(&[(false, false), (true, false), (false, false)])),
        vec![true, false, true]
    );
}

#[test]
fn solo_suppresses_non_solo_layers() {
    assert_eq!(
        effective_enabled(&flags(&[(false, true), (false, false), (false, true)])),
        vec![true, false, true]
    );
}

#[test]
fn mute_wins_over_solo() {
    assert_eq!(
        effective_enabled(&flags(&[(true, true), (false, false)])),
        vec![false, false]
    );
}

#[test]
fn toggles_are_reflected_immediately() {
    let mut stack = LayerStack::new(flags(&[(false, false), (false, false)]));
    stack.toggle_solo(1);
    assert_eq!(stack.enabled(), vec![false, true]);
    stack.toggle_mute(1);
    assert_eq!(stack.enabled(), vec![false, false]);
    stack.toggle_solo(1);
    assert_eq!(stack.enabled(), vec![true, false]);
    stack.toggle_mute(9);
    assert_eq!(stack.len(), 2);
}

#[test]
fn opacity_curve_is_clamped() {
    let curve = KeyframeCurve::from_points([(0.0, -1.0), (10.0, 2.0)]).unwrap();
    let op = Opacity::Curve(curve);
    assert_eq!(op.sample(FrameIndex(0)), 0.0);
    assert_eq!(op.sample(FrameIndex(10)), 1.0);
    assert_eq!(op.sample(FrameIndex(5)), 0.5);
    assert_eq!(Opacity::Constant(0.3).sample(FrameIndex(99)), 0.3);
}

#[test]
fn empty_stack_is_rejected() {
    assert!(LayerStack::default().validate().is_err());
    assert!(
        LayerStack::new(vec![Layer::new("base")])
            .validate()
            .is_ok()
    );
}

#[test]
fn nan_opacity_is_rejected() {
    let stack = LayerStack::new(vec![
        Layer::new("base"),
        Layer::new("top").with_opacity(Opacity::Constant(f64::NAN)),
    ]);
    let err = stack.validate().unwrap_err();
    assert!(err.to_string().contains("layer 1"));
}

#[test]
fn layer_json_accepts_constant_or_curve_opacity() {
    let json = r#"[
        {"name": "base"},
        {"name": "fade", "blend_mode": "add", "opacity": [{"frame": 0.0, "value": 0.0}, {"frame": 10.0, "value": 1.0}], "mute": true}
    ]"#;
    let stack: LayerStack = serde_json::from_str(json).unwrap();
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.layers()[0].opacity, Opacity::Constant(1.0));
    assert_eq!(stack.layers()[1].blend_mode, BlendMode::Add);
    assert!(matches!(stack.layers()[1].opacity, Opacity::Curve(_)));
    assert!(stack.layers()[1].mute);
}
