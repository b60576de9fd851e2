use super::*;
use std::cell::Cell;

#[test]
fn progress_fraction_is_frame_over_duration_times_fps() {
    let p = RenderProgress::new(15, 60, 2.0, 30.0, 0.5);
    assert_eq!(p.fraction, 0.25);
    assert_eq!(p.total_frames, 60);
    assert_eq!(p.time_secs, 0.5);

    assert_eq!(RenderProgress::new(90, 60, 2.0, 30.0, 3.0).fraction, 1.0);
    assert_eq!(RenderProgress::new(1, 1, 0.0, 30.0, 0.0).fraction, 0.0);
}

#[test]
fn empty_control_never_cancels() {
    let mut c = RenderControl::new();
    assert!(!c.is_cancelled());
    c.report(&RenderProgress::new(0, 1, 1.0, 30.0, 0.0));
}

#[test]
fn hooks_see_shared_state() {
    let seen = Cell::new(0u64);
    let mut c = RenderControl::new()
        .with_progress(|p| seen.set(p.frame + 1))
        .with_cancel(|| seen.get() >= 2);

    assert!(!c.is_cancelled());
    c.report(&RenderProgress::new(0, 10, 1.0, 10.0, 0.0));
    assert!(!c.is_cancelled());
    c.report(&RenderProgress::new(1, 10, 1.0, 10.0, 0.1));
    assert!(c.is_cancelled());
    assert_eq!(format!("{c:?}"), "RenderControl { progress: true, cancel: true }");
}
