//! Tests for frame pane geometry

use super::*;
use crate::constants::panes::MIN_ROWS;

fn fixture(rows: usize) -> (Frame, HashMap<PaneId, Pane>) {
    let mut frame = Frame::new(1, rows, 80);
    let mut panes = HashMap::new();
    let pane = Pane::new(10, 1, 1, frame.pane_budget());
    frame.panes.push(10);
    frame.current = 10;
    panes.insert(10, pane);
    frame.renumber(&mut panes);
    (frame, panes)
}

#[test]
fn row_chars_reserves_overflow_and_scrollbar() {
    let frame = Frame::new(1, 24, 80);
    assert_eq!(frame.row_chars(), 78);
}

#[test]
fn split_halves_and_inherits_view() {
    let (mut frame, mut panes) = fixture(24);
    {
        let pane = panes.get_mut(&10).unwrap();
        pane.cursor = 42;
        pane.viewport = 40;
    }
    frame.split(&mut panes, 10, 11).unwrap();

    assert_eq!(frame.panes, vec![10, 11]);
    let upper = &panes[&10];
    let lower = &panes[&11];
    assert_eq!(upper.rows + lower.rows, 23);
    assert!(upper.rows >= MIN_ROWS && lower.rows >= MIN_ROWS);
    assert_eq!(lower.cursor, 42);
    assert_eq!(lower.viewport, 40);
    // Upper pane now carries the mode line; the lowest never does
    assert!(upper.mode_line);
    assert!(!lower.mode_line);
    assert_eq!(lower.top_row, upper.rows);
}

#[test]
fn split_refuses_short_pane() {
    let (mut frame, mut panes) = fixture(2 * MIN_ROWS);
    // Budget is 2*MIN_ROWS - 1, one short of splittable
    assert!(frame.split(&mut panes, 10, 11).is_err());
}

#[test]
fn pane_row_sums_stay_exact() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    frame.split(&mut panes, 11, 12).unwrap();
    let total: usize = frame.panes.iter().map(|id| panes[id].rows).sum();
    assert_eq!(total, frame.pane_budget());
}

#[test]
fn kill_pane_gives_rows_to_neighbor() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    let before: usize = frame.panes.iter().map(|id| panes[id].rows).sum();
    frame.kill_pane(&mut panes, 11).unwrap();
    assert_eq!(frame.panes, vec![10]);
    assert_eq!(panes[&10].rows, before);
    assert!(!panes[&10].mode_line);
}

#[test]
fn kill_only_pane_refused() {
    let (mut frame, mut panes) = fixture(24);
    assert!(frame.kill_pane(&mut panes, 10).is_err());
}

#[test]
fn kill_current_moves_focus_to_heir() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    frame.current = 11;
    frame.kill_pane(&mut panes, 11).unwrap();
    assert_eq!(frame.current, 10);
}

#[test]
fn resize_boundary_moves_rows_between_neighbors() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    let upper_before = panes[&10].rows;
    frame.resize_boundary(&mut panes, 10, 2, MIN_ROWS).unwrap();
    assert_eq!(panes[&10].rows, upper_before + 2);
    let total: usize = frame.panes.iter().map(|id| panes[id].rows).sum();
    assert_eq!(total, frame.pane_budget());
}

#[test]
fn resize_refuses_below_minimum() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    let lower = panes[&11].rows as isize;
    assert!(frame
        .resize_boundary(&mut panes, 10, lower - MIN_ROWS as isize + 1, MIN_ROWS)
        .is_err());
}

#[test]
fn lowest_pane_has_no_boundary() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    assert!(frame.resize_boundary(&mut panes, 11, 1, MIN_ROWS).is_err());
}

#[test]
fn height_growth_preserves_proportions() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    frame.rows = 48;
    frame.apply_height(&mut panes, MIN_ROWS);
    let total: usize = frame.panes.iter().map(|id| panes[id].rows).sum();
    assert_eq!(total, frame.pane_budget());
    // The even split stays roughly even
    let diff = panes[&10].rows.abs_diff(panes[&11].rows);
    assert!(diff <= 1, "rows {} vs {}", panes[&10].rows, panes[&11].rows);
}

#[test]
fn height_shrink_clamps_at_minimum() {
    let (mut frame, mut panes) = fixture(40);
    frame.split(&mut panes, 10, 11).unwrap();
    frame.split(&mut panes, 11, 12).unwrap();
    // Skew one pane small so shrinking pushes it to the minimum
    frame.resize_boundary(&mut panes, 10, -6, MIN_ROWS).ok();

    frame.rows = 3 * MIN_ROWS + 3;
    frame.apply_height(&mut panes, MIN_ROWS);
    let total: usize = frame.panes.iter().map(|id| panes[id].rows).sum();
    assert_eq!(total, frame.pane_budget());
    for id in &frame.panes {
        assert!(panes[id].rows >= MIN_ROWS, "pane {} too short", id);
    }
}

#[test]
fn grow_after_shrink_restores_ratios() {
    let (mut frame, mut panes) = fixture(30);
    frame.split(&mut panes, 10, 11).unwrap();
    frame.resize_boundary(&mut panes, 10, 5, MIN_ROWS).unwrap();
    let big = panes[&10].rows as f64;
    let small = panes[&11].rows as f64;

    frame.rows = 15;
    frame.apply_height(&mut panes, MIN_ROWS);
    frame.rows = 30;
    frame.apply_height(&mut panes, MIN_ROWS);

    let ratio_before = big / small;
    let ratio_after = panes[&10].rows as f64 / panes[&11].rows as f64;
    assert!(
        (ratio_before - ratio_after).abs() < 0.6,
        "{} vs {}",
        ratio_before,
        ratio_after
    );
}

#[test]
fn pane_at_row_honors_boundaries() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    let upper_rows = panes[&10].rows;
    assert_eq!(frame.pane_at_row(&panes, 0), Some(10));
    assert_eq!(frame.pane_at_row(&panes, upper_rows - 1), Some(10));
    assert_eq!(frame.pane_at_row(&panes, upper_rows), Some(11));
    assert_eq!(frame.pane_at_row(&panes, frame.pane_budget()), None);
}

#[test]
fn next_pane_wraps() {
    let (mut frame, mut panes) = fixture(24);
    frame.split(&mut panes, 10, 11).unwrap();
    assert_eq!(frame.next_pane(10), 11);
    assert_eq!(frame.next_pane(11), 10);
}
