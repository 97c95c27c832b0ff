//! End-to-end tests: views through reconciling, layout, and compositing to
//! the bytes a scene writes.

use weft::prelude::*;
use weft::{RendererConfig, Scene};

fn output(scene: &Scene<Vec<u8>>) -> String {
    String::from_utf8_lossy(scene.renderer().get_ref()).into_owned()
}

fn since(scene: &Scene<Vec<u8>>, mark: usize) -> String {
    String::from_utf8_lossy(&scene.renderer().get_ref()[mark..]).into_owned()
}

#[test]
fn first_tick_draws_the_whole_screen() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(8, 1)));
    scene.update(Text::new("hi"));
    assert!(scene.needs_redraw());

    let stats = scene.tick().unwrap().unwrap();
    assert_eq!(stats.cells_visited, 8);
    assert_eq!(stats.cells_changed, 8);
    assert_eq!(output(&scene), "\x1b[1;1H\x1b[0mhi      ");

    assert!(!scene.needs_redraw());
    assert!(scene.tick().unwrap().is_none());
}

#[test]
fn unchanged_update_writes_nothing() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(8, 2)));
    scene.update(Text::new("same"));
    scene.tick().unwrap();
    let mark = scene.renderer().get_ref().len();

    scene.update(Text::new("same"));
    let stats = scene.tick().unwrap().unwrap();
    assert_eq!(stats.cells_changed, 0);
    assert_eq!(stats.bytes_emitted, 0);
    assert!(since(&scene, mark).is_empty());
}

#[test]
fn shorter_text_clears_its_old_tail() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(5, 1)));
    scene.update(Text::new("abc"));
    scene.tick().unwrap();

    scene.update(Text::new("a"));
    let stats = scene.tick().unwrap().unwrap();
    assert_eq!(stats.cells_visited, 3);
    assert_eq!(stats.cells_changed, 2);
}

#[test]
fn narrow_text_after_wide_text_repaints_every_column() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(4, 1)));
    scene.update(Text::new("ab"));
    scene.tick().unwrap();

    scene.update(Text::new("中"));
    let mark = scene.renderer().get_ref().len();
    scene.tick().unwrap();
    assert_eq!(since(&scene, mark), "\x1b[1;1H中");

    scene.update(Text::new("ab"));
    let mark = scene.renderer().get_ref().len();
    let stats = scene.tick().unwrap().unwrap();
    assert_eq!(stats.cells_changed, 2);
    assert_eq!(since(&scene, mark), "\x1b[1;1Hab");
}

#[test]
fn wide_text_clamped_to_one_column_draws_a_blank() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(1, 1)));
    scene.update(Text::new("中"));
    scene.tick().unwrap();

    let out = output(&scene);
    assert!(!out.contains('中'));
    assert_eq!(out, "\x1b[1;1H\x1b[0m ");
}

#[test]
fn focus_shows_as_inverted_video() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(3, 1)));
    scene.update(Selectable::new("one"));
    scene.tick().unwrap();
    let mark = scene.renderer().get_ref().len();

    assert!(scene.move_focus(Direction::Down).is_some());
    scene.tick().unwrap();
    assert_eq!(since(&scene, mark), "\x1b[1;1H\x1b[7mone");

    assert_eq!(scene.move_focus(Direction::Down), None);
    assert!(scene.tick().unwrap().is_none());
}

#[test]
fn background_shows_behind_overlay_content() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(4, 1)));
    scene.update(
        Overlay::new(Alignment::TOP_LEADING)
            .child(Background::new(Color::BLUE, Text::new("    ")))
            .child(Text::new("ok").fg(Color::RED)),
    );
    scene.tick().unwrap();

    let cell = scene.controls().compose(Point::new(1, 0)).unwrap();
    assert_eq!(cell.ch, 'k');
    assert_eq!(cell.fg, Color::RED);
    assert_eq!(cell.bg, Some(Color::BLUE));
    assert_eq!(
        output(&scene),
        "\x1b[1;1H\x1b[0m\x1b[31m\x1b[44mok\x1b[39m  "
    );
}

#[test]
fn session_is_bracketed() {
    let config = SceneConfig::default()
        .with_size(Size::new(2, 1))
        .with_renderer(RendererConfig::default());
    let mut scene = Scene::new(Vec::new(), config);
    scene.update(Text::new("x"));
    scene.start().unwrap();
    scene.tick().unwrap();
    scene.stop().unwrap();

    let out = output(&scene);
    assert!(out.starts_with("\x1b[?1049h\x1b[0m\x1b[2J\x1b[1;1H\x1b[?25l"));
    assert!(out.ends_with("\x1b[0m\x1b[?25h\x1b[?1049l"));
    assert!(out.contains('x'));
}

#[test]
fn node_update_with_wrong_type_is_an_error() {
    let mut scene = Scene::new(Vec::new(), SceneConfig::headless(Size::new(4, 1)));
    let root = scene.update(Text::new("t"));
    let err = scene
        .update_node(root, Group::new().into_any())
        .unwrap_err();
    assert!(matches!(err, Error::Reconcile(_)));
    assert!(scene.update_node(root, Text::new("u").into_any()).is_ok());
}
