use super::*;
use crate::scene::model::SceneObject;
use crate::composite::layers::{Layer, LayerStack};

fn scene() -> Scene {
    let mut scene = Scene {
        layers: LayerStack::new(vec![Layer::new("base"), Layer::new("top")]),
        ..Scene::default()
    };
    scene.objects.insert(
        ObjectId::from("a"),
        SceneObject::constant(&[[0.1, 0.1, 0.1], [0.2, 0.2, 0.2]]),
    );
    scene
        .objects
        .insert(ObjectId::from("b"), SceneObject::constant(&[[0.3, 0.3, 0.3]]));
    scene
}

fn ids(names: &[&str]) -> Vec<ObjectId> {
    names.iter().map(|n| ObjectId::from(*n)).collect()
}

#[test]
fn set_color_skips_objects_without_layer() {
    let mut s = scene();
    let log = set_color(&mut s, &ids(&["a", "b", "zz"]), 1, [1.0, 0.0, 0.0]);
    assert_eq!(log.len(), 1);
    assert_eq!(log.objects().collect::<Vec<_>>(), vec![&ObjectId::from("a")]);
    assert_eq!(
        s.objects[&ObjectId::from("a")].layer(1).unwrap().color,
        [1.0, 0.0, 0.0]
    );
}

#[test]
fn undo_restores_exactly() {
    let original = scene();
    let mut s = original.clone();
    let log = set_color_keyed(&mut s, &ids(&["a", "b"]), 0, [0.9, 0.8, 0.7], 12.0);
    assert_eq!(log.len(), 2);
    assert_ne!(s, original);
    assert_eq!(log.undo(&mut s), 2);
    assert_eq!(s, original);
}

#[test]
fn undo_with_repeated_ids_restores_first_value() {
    let original = scene();
    let mut s = original.clone();
    let log = set_color(&mut s, &ids(&["b", "b"]), 0, [0.0, 1.0, 0.0]);
    assert_eq!(log.len(), 2);
    log.undo(&mut s);
    assert_eq!(s, original);
}

#[test]
fn set_color_keyed_replaces_key_at_frame() {
    let mut s = scene();
    let _ = set_color_keyed(&mut s, &ids(&["a"]), 0, [0.5, 0.5, 0.5], 5.0);
    let _ = set_color_keyed(&mut s, &ids(&["a"]), 0, [1.0, 0.0, 0.25], 5.0);
    let value = s.objects[&ObjectId::from("a")].layer(0).unwrap();
    for c in Channel::ALL {
        assert_eq!(value.curves[c.index()].as_ref().unwrap().len(), 1);
    }
    assert_eq!(value.color_at(5.0), [1.0, 0.0, 0.25]);
}

#[test]
fn key_current_preserves_shape() {
    let mut s = scene();
    let _ = set_color_keyed(&mut s, &ids(&["a"]), 0, [0.0, 0.0, 0.0], 0.0);
    let _ = set_color_keyed(&mut s, &ids(&["a"]), 0, [1.0, 1.0, 1.0], 10.0);
    let log = key_current(&mut s, &ids(&["a", "b"]), 0, 5.0);
    assert_eq!(log.len(), 2);

    let a = s.objects[&ObjectId::from("a")].layer(0).unwrap();
    assert_eq!(a.curves[0].as_ref().unwrap().len(), 3);
    assert_eq!(a.color_at(5.0), [0.5, 0.5, 0.5]);

    let b = s.objects[&ObjectId::from("b")].layer(0).unwrap();
    assert_eq!(b.color_at(99.0), [0.3, 0.3, 0.3]);
}
