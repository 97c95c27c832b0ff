//! Integration tests: view updates driving the control tree.
//!
//! Each test builds a view tree, updates it with a new description, and checks
//! that control order, control lifetimes, and focus follow the views.

use weft_core::geometry::{Point, Size};
use weft_render::Color;
use weft_view::{
    Alignment, Background, ControlId, Direction, ForEach, Group, Overlay, ReconcileError,
    Reconciler, Selectable, Text, View,
};

fn labels(items: &[&'static str]) -> ForEach<&'static str> {
    ForEach::new(items.iter().copied(), |s: &&'static str| Text::new(*s))
}

fn overlay_children(rec: &Reconciler) -> Vec<ControlId> {
    let root = rec.root().unwrap();
    let control = rec.control(root).unwrap();
    rec.controls().children(control).to_vec()
}

fn row(rec: &mut Reconciler) -> String {
    rec.controls_mut().layout_root();
    let width = rec.controls().screen_size().width;
    (0..width)
        .map(|x| rec.controls().compose(Point::new(x, 0)).map_or('.', |c| c.ch))
        .collect()
}

#[test]
fn for_each_growth_inserts_before_later_siblings() {
    let mut rec = Reconciler::headless(Size::new(10, 1));
    let view = |items: &[&'static str]| {
        Overlay::new(Alignment::TOP_LEADING)
            .child(labels(items))
            .child(Text::new("end"))
            .into_any()
    };
    let root = rec.set_root(view(&["a"]));
    let before = overlay_children(&rec);
    assert_eq!(before.len(), 2);

    rec.update(root, view(&["a", "b", "c"])).unwrap();
    let after = overlay_children(&rec);
    assert_eq!(after.len(), 4);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[3], before[1], "trailing sibling keeps its control");

    rec.update(root, view(&[])).unwrap();
    assert_eq!(overlay_children(&rec), vec![before[1]]);
    assert_eq!(rec.controls().len(), 3);
}

#[test]
fn top_level_controls_track_nested_composites() {
    let mut rec = Reconciler::headless(Size::new(10, 1));
    let view = |items: &[&'static str]| {
        Group::new()
            .child(Text::new("<"))
            .child(labels(items))
            .child(Text::new(">"))
            .into_any()
    };
    let root = rec.set_root(view(&["x"]));
    rec.update(root, view(&["x", "y"])).unwrap();

    let top = rec.controls().root();
    let children = rec.controls().children(top).to_vec();
    assert_eq!(children.len(), 4);
    for (index, control) in children.iter().enumerate() {
        assert_eq!(rec.control_at(root, index), Some(*control));
    }
}

#[test]
fn text_updates_reach_the_screen() {
    let mut rec = Reconciler::headless(Size::new(5, 1));
    let root = rec.set_root(Text::new("one").into_any());
    assert_eq!(row(&mut rec), "one..");

    rec.update(root, Text::new("three").into_any()).unwrap();
    assert_eq!(row(&mut rec), "three");

    rec.update(root, Text::new("2").into_any()).unwrap();
    assert_eq!(row(&mut rec), "2....");
}

#[test]
fn structural_mismatch_leaves_tree_untouched() {
    let mut rec = Reconciler::headless(Size::new(10, 1));
    let root = rec.set_root(Overlay::new(Alignment::CENTER).child(Text::new("hi")).into_any());
    let controls = rec.controls().len();

    let err = rec.update(root, Text::new("hi").into_any()).unwrap_err();
    match err {
        ReconcileError::StructuralMismatch { expected, found } => {
            assert!(expected.ends_with("Overlay"));
            assert!(found.ends_with("Text"));
        }
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(rec.controls().len(), controls);
    assert_eq!(rec.root(), Some(root));

    let rebuilt = rec.set_root(Text::new("hi").into_any());
    assert_eq!(rec.controls().len(), 2);
    assert_eq!(rec.len(), 1);
    assert!(rec.control(rebuilt).is_some());
}

#[test]
fn removed_items_destroy_their_wrappers() {
    let mut rec = Reconciler::headless(Size::new(10, 2));
    let view = |items: Vec<&'static str>| {
        Overlay::new(Alignment::TOP_LEADING)
            .child(ForEach::new(items, |s: &&'static str| {
                Background::new(Color::BLUE, Text::new(*s))
            }))
            .into_any()
    };
    let root = rec.set_root(view(vec!["a", "b"]));
    // root, overlay, and a text plus its fill per item
    assert_eq!(rec.controls().len(), 6);

    rec.update(root, view(vec!["a"])).unwrap();
    assert_eq!(rec.controls().len(), 4);
    assert_eq!(overlay_children(&rec).len(), 1);

    rec.update(root, view(vec!["a", "b", "c"])).unwrap();
    assert_eq!(rec.controls().len(), 8);
    let fill = overlay_children(&rec)[2];
    assert_eq!(rec.controls().children(fill).len(), 1);
}

#[test]
fn replacing_child_type_swaps_its_controls_in_place() {
    let mut rec = Reconciler::headless(Size::new(10, 1));
    let root = rec.set_root(
        Overlay::new(Alignment::TOP_LEADING)
            .child(Text::new("a"))
            .child(Text::new("b"))
            .into_any(),
    );
    let before = overlay_children(&rec);

    rec.update(
        root,
        Overlay::new(Alignment::TOP_LEADING)
            .child(Background::new(Color::RED, Text::new("A")))
            .child(Text::new("b"))
            .into_any(),
    )
    .unwrap();
    let after = overlay_children(&rec);
    assert_eq!(after.len(), 2);
    assert_ne!(after[0], before[0]);
    assert_eq!(after[1], before[1]);
    let wrapped = rec.controls().children(after[0]).to_vec();
    assert_eq!(wrapped.len(), 1);
    assert_eq!(rec.controls().parent(wrapped[0]), Some(after[0]));
}

#[test]
fn focus_moves_through_items_and_drops_with_them() {
    let mut rec = Reconciler::headless(Size::new(10, 3));
    let view = |n: usize| {
        Overlay::new(Alignment::TOP_LEADING)
            .child(ForEach::new(0..n, |i: &usize| Selectable::new(format!("item {i}"))))
            .into_any()
    };
    let root = rec.set_root(view(3));
    let items = overlay_children(&rec);

    assert_eq!(rec.controls_mut().move_focus(Direction::Down), Some(items[0]));
    assert_eq!(rec.controls_mut().move_focus(Direction::Down), Some(items[1]));
    assert_eq!(rec.controls_mut().move_focus(Direction::Down), Some(items[2]));
    assert_eq!(rec.controls().focused(), Some(items[2]));

    rec.update(root, view(2)).unwrap();
    assert_eq!(rec.controls().focused(), None);
    assert_eq!(rec.controls_mut().move_focus(Direction::Up), Some(items[0]));
}
