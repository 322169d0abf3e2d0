//! Integration tests for label decoding and coordinate mapping across
//! realistic multi-display layouts.

use gridclick_core::keymap::{macos_cg, windows_vk};
use gridclick_core::{
    display_at_point, nudge, DisplayBounds, GridCell, GridError, GridGeometry, Key, Letter,
    NudgeDirection, Point,
};

fn layout() -> Vec<DisplayBounds> {
    vec![
        DisplayBounds::new(0.0, 0.0, 2560.0, 1440.0),
        DisplayBounds::new(2560.0, 0.0, 1920.0, 1080.0),
        DisplayBounds::new(-1080.0, -400.0, 1080.0, 1920.0),
    ]
}

#[test]
fn test_every_label_on_every_display_resolves_inside_its_display() {
    let grid = GridGeometry::default();
    for display in layout() {
        for first in 0..26u8 {
            for second in 0..26u8 {
                let (a, b) = (Letter::from_index(first).unwrap(), Letter::from_index(second).unwrap());
                let cell = grid.decode_label(a, b).unwrap();
                let point = grid.cell_to_point(cell, &display);
                assert!(display.contains(point), "{a}{b} escaped {display:?}");
                assert_eq!(display_at_point(&layout(), point), Some(display));
                assert_eq!(grid.cell_at(point, &display), Some(cell));
            }
        }
    }
}

#[test]
fn test_label_typed_on_macos_keys_matches_label_typed_on_windows_keys() {
    // Arrange: "G" then "K" as each platform reports them.
    let mac = (macos_cg::cgkeycode_to_key(0x05), macos_cg::cgkeycode_to_key(0x28));
    let win = (windows_vk::vk_to_key(b'G', false), windows_vk::vk_to_key(b'K', false));

    // Act
    let grid = GridGeometry::default();
    let decode = |(f, s): (Key, Key)| grid.decode_label(f.letter().unwrap(), s.letter().unwrap());

    // Assert
    assert_eq!(decode(mac), Ok(GridCell::new(6, 10)));
    assert_eq!(decode(win), Ok(GridCell::new(6, 10)));
}

#[test]
fn test_reduced_grid_rejects_letters_past_its_edge() {
    let grid = GridGeometry::new(10, 12).unwrap();
    let k = Letter::from_char('K').unwrap(); // index 10
    let m = Letter::from_char('M').unwrap(); // index 12
    assert!(grid.decode_label(Letter::from_char('A').unwrap(), k).is_ok());
    assert!(matches!(grid.decode_label(k, k), Err(GridError::OutOfRange { row: 10, .. })));
    assert!(matches!(grid.decode_label(Letter::from_char('A').unwrap(), m), Err(GridError::OutOfRange { col: 12, .. })));
}

#[test]
fn test_nudges_walk_off_the_display_edge() {
    let grid = GridGeometry::default();
    let display = layout()[0];
    let mut p = grid.cell_to_point(GridCell::new(0, 0), &display);
    for _ in 0..10 {
        let (dx, dy) = NudgeDirection::Up.offset(15.0);
        p = nudge(p, dx, dy);
    }
    assert!(p.y < 0.0);
    assert_eq!(display_at_point(&layout(), p), None);
    assert_eq!(p.x, Point::new(2560.0 / 52.0, 0.0).x);
}
