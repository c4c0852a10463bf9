use super::*;

const BASES: [Rgb; 3] = [[0.0, 0.0, 0.0], [0.3, 0.6, 0.9], [1.0, 1.0, 1.0]];
const TOPS: [Rgb; 3] = [[0.0, 0.5, 1.0], [0.25, 0.25, 0.25], [1.0, 0.0, 0.7]];

#[test]
fn zero_factor_returns_base_for_every_mode() {
    for mode in BlendMode::ALL {
        for base in BASES {
            for top in TOPS {
                assert_eq!(blend(base, top, mode, 0.0), base, "{mode:?}");
                assert_eq!(blend(base, top, mode, -0.5), base, "{mode:?}");
            }
        }
    }
}

#[test]
fn replace_at_full_factor_is_top() {
    for base in BASES {
        for top in TOPS {
            assert_eq!(blend(base, top, BlendMode::Replace, 1.0), top);
            assert_eq!(blend(base, top, BlendMode::Mix, 1.0), top);
        }
    }
}

#[test]
fn multiply_white_by_color() {
    let out = blend([1.0, 1.0, 1.0], [0.5, 0.2, 0.0], BlendMode::Multiply, 1.0);
    assert_eq!(out, [0.5, 0.2, 0.0]);
}

#[test]
fn add_and_subtract_clamp() {
    assert_eq!(
        blend([0.8, 0.5, 0.0], [0.5, 0.5, 0.25], BlendMode::Add, 1.0),
        [1.0, 1.0, 0.25]
    );
    assert_eq!(
        blend([0.2, 0.5, 1.0], [0.5, 0.5, 0.25], BlendMode::Subtract, 1.0),
        [0.0, 0.0, 0.75]
    );
}

#[test]
fn lighten_darken_screen() {
    let base = [0.2, 0.8, 0.5];
    let top = [0.6, 0.4, 0.5];
    assert_eq!(blend(base, top, BlendMode::Lighten, 1.0), [0.6, 0.8, 0.5]);
    assert_eq!(blend(base, top, BlendMode::Darken, 1.0), [0.2, 0.4, 0.5]);
    assert_eq!(
        blend([0.0, 1.0, 0.5], [0.0, 0.3, 0.5], BlendMode::Screen, 1.0),
        [0.0, 1.0, 0.75]
    );
}

#[test]
fn partial_factor_lerps_toward_operator_result() {
    let out = blend([0.0, 0.0, 0.0], [1.0, 0.5, 0.2], BlendMode::Replace, 0.5);
    assert_eq!(out, [0.5, 0.25, 0.1]);
}

#[test]
fn outputs_stay_in_unit_range() {
    for mode in BlendMode::ALL {
        for base in BASES {
            for top in TOPS {
                for factor in [0.1, 0.5, 0.9, 1.0] {
                    let out = blend(base, top, mode, factor);
                    assert!(
                        out.iter().all(|c| (-1e-12..=1.0 + 1e-12).contains(c)),
                        "{mode:?}"
                    );
                }
            }
        }
    }
}

#[test]
fn serde_uses_snake_case_names() {
    assert_eq!(
        serde_json::to_string(&BlendMode::Multiply).unwrap(),
        "\"multiply\""
    );
    let m: BlendMode = serde_json::from_str("\"screen\"").unwrap();
    assert_eq!(m, BlendMode::Screen);
}
