use super::*;

fn at(line: usize, progress: f64) -> LinePosition {
    LinePosition { line, progress }
}

#[test]
fn position_fade_in_top_band() {
    assert_eq!(position_opacity(-1.0), 0.0);
    assert_eq!(position_opacity(0.0), 0.0);
    assert_eq!(position_opacity(75.0), 0.5);
    assert_eq!(position_opacity(150.0), 1.0);
    assert_eq!(position_opacity(900.0), 1.0);
}

#[test]
fn current_and_lower_lines_stay_opaque_regardless_of_progress() {
    for progress in [0.0, 0.3, 0.99, 1.0] {
        for line in 4..10 {
            assert_eq!(line_opacity(line, Some(at(4, progress)), 500.0), 1.0);
        }
        assert_eq!(line_opacity(3, Some(at(4, progress)), 500.0), 1.0);
    }
}

#[test]
fn two_above_fades_with_progress() {
    assert_eq!(line_distance_opacity(2, at(4, 0.0)), 1.0);
    assert!((line_distance_opacity(2, at(4, 0.25)) - 0.75).abs() < 1e-12);
    assert_eq!(line_distance_opacity(2, at(4, 1.0)), 0.0);
}

#[test]
fn far_above_is_hidden() {
    assert_eq!(line_distance_opacity(0, at(3, 0.0)), 0.0);
    assert_eq!(line_opacity(0, Some(at(10, 0.5)), 800.0), 0.0);
}

#[test]
fn combined_takes_minimum() {
    // Position fade 0.5, distance fade 0.75.
    let o = line_opacity(2, Some(at(4, 0.25)), 75.0);
    assert!((o - 0.5).abs() < 1e-12);
    // Position fade 0.9, distance fade 0.25.
    let o = line_opacity(2, Some(at(4, 0.75)), 135.0);
    assert!((o - 0.25).abs() < 1e-12);
}

#[test]
fn no_current_line_uses_position_only() {
    assert_eq!(line_opacity(7, None, 30.0), 0.2);
    assert_eq!(line_opacity(0, None, 300.0), 1.0);
}
