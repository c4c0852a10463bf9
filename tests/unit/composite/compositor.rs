use super::*;
use crate::animation::curve::KeyframeCurve;
use crate::composite::blend::BlendMode;
use crate::composite::layers::{Opacity, effective_enabled};

fn range(a: i64, b: i64) -> FrameRange {
    FrameRange::new(FrameIndex(a), FrameIndex(b)).unwrap()
}

fn two_layer_stack() -> LayerStack {
    let fade = KeyframeCurve::from_points([(1.0, 0.0), (10.0, 1.0)]).unwrap();
    LayerStack::new(vec![
        Layer::new("base"),
        Layer::new("top")
            .with_blend(BlendMode::Add)
            .with_opacity(Opacity::Curve(fade)),
    ])
}

#[test]
fn base_only_passes_color_through() {
    let stack = LayerStack::new(vec![Layer::new("base")]);
    let src = ObjectColorSource::constant(&[[0.1, 0.2, 0.3]]);
    let out = composite_object(&stack, &stack.enabled(), &src, range(1, 3), Quantize::None);
    assert_eq!(out.len(), 3);
    assert_eq!(out.channel(Channel::G), &[0.2, 0.2, 0.2]);
    assert_eq!(out.frames(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn muted_top_layer_matches_base_alone() {
    let mut stack = two_layer_stack();
    stack.toggle_mute(1);
    let src = ObjectColorSource::constant(&[[0.2, 0.4, 0.6], [0.5, 0.5, 0.5]]);
    let base_only = LayerStack::new(vec![Layer::new("base")]);

    let a = composite_object(&stack, &stack.enabled(), &src, range(1, 10), Quantize::None);
    let b = composite_object(
        &base_only,
        &base_only.enabled(),
        &src,
        range(1, 10),
        Quantize::None,
    );
    assert_eq!(a, b);
}

#[test]
fn soloed_base_matches_base_alone() {
    let mut stack = two_layer_stack();
    stack.toggle_solo(0);
    let src = ObjectColorSource::constant(&[[0.2, 0.4, 0.6], [0.5, 0.5, 0.5]]);
    let out = composite_object(&stack, &stack.enabled(), &src, range(1, 10), Quantize::None);
    for i in 0..out.len() {
        assert_eq!(out.color_at(i), Some([0.2, 0.4, 0.6]));
    }
}

#[test]
fn disabled_base_starts_from_black() {
    let mut stack = two_layer_stack();
    stack.toggle_mute(0);
    let src = ObjectColorSource::constant(&[[0.9, 0.9, 0.9], [0.5, 0.25, 0.0]]);
    let c = composite_frame(stack.layers(), &stack.enabled(), &src, FrameIndex(10));
    assert_eq!(c, [0.5, 0.25, 0.0]);
}

#[test]
fn base_layer_blend_and_opacity_are_ignored() {
    let stack = LayerStack::new(vec![
        Layer::new("base")
            .with_blend(BlendMode::Multiply)
            .with_opacity(Opacity::Constant(0.0)),
    ]);
    let src = ObjectColorSource::constant(&[[0.7, 0.7, 0.7]]);
    let c = composite_frame(stack.layers(), &stack.enabled(), &src, FrameIndex(0));
    assert_eq!(c, [0.7, 0.7, 0.7]);
}

#[test]
fn negligible_opacity_skips_layer() {
    let stack = LayerStack::new(vec![
        Layer::new("base"),
        Layer::new("ghost").with_opacity(Opacity::Constant(OPACITY_EPSILON / 2.0)),
    ]);
    let src = ObjectColorSource::constant(&[[0.3, 0.3, 0.3], [1.0, 1.0, 1.0]]);
    let c = composite_frame(stack.layers(), &stack.enabled(), &src, FrameIndex(0));
    assert_eq!(c, [0.3, 0.3, 0.3]);
}

#[test]
fn layers_fold_in_index_order() {
    let layers = vec![
        Layer::new("base"),
        Layer::new("mul").with_blend(BlendMode::Multiply),
        Layer::new("add").with_blend(BlendMode::Add),
    ];
    let src = ObjectColorSource::constant(&[[0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.25, 0.25, 0.25]]);
    let enabled = effective_enabled(&layers);
    // (0.5 * 0.5) + 0.25 = 0.5, whereas (0.5 + 0.25) * 0.5 would be 0.375.
    let c = composite_frame(&layers, &enabled, &src, FrameIndex(0));
    assert_eq!(c, [0.5, 0.5, 0.5]);
}

#[test]
fn animated_opacity_fades_layer_in() {
    let stack = two_layer_stack();
    let src = ObjectColorSource::constant(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
    let out = composite_object(&stack, &stack.enabled(), &src, range(1, 10), Quantize::None);
    assert_eq!(out.channel(Channel::R)[0], 0.0);
    assert_eq!(out.channel(Channel::R)[9], 1.0);
    assert!(out.channel(Channel::R).windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn rgb8_quantization_snaps_samples() {
    let stack = LayerStack::new(vec![Layer::new("base")]);
    let src = ObjectColorSource::constant(&[[0.5, 0.0, 1.0]]);
    let out = composite_object(&stack, &stack.enabled(), &src, range(0, 0), Quantize::Rgb8);
    assert_eq!(out.color_at(0), Some([128.0 / 255.0, 0.0, 1.0]));
    assert_eq!(out.to_rgb8(), vec![[128, 0, 255]]);
}
