use super::*;
use crate::layout::lines::layout_lines;

const SPACING: f64 = 120.0;
const HEIGHT: f64 = 1080.0;

fn calc(store: &TimingStore) -> ScrollCalculator {
    let lines = layout_lines(store, 10_000.0, &mut |s: &str| s.len() as f32);
    let timings = line_timings(&lines, store);
    ScrollCalculator::new(timings, &TimingIndex::build(store), SPACING, HEIGHT)
}

fn song() -> TimingStore {
    TimingStore::builder()
        .word("one", Some(4.0))
        .word("two", Some(5.0))
        .line_break()
        .word("three", Some(8.0))
        .word("four", Some(9.0))
        .line_break()
        .line_break()
        .word("five", Some(12.0))
        .word("six", Some(14.0))
        .build()
}

#[test]
fn line_timings_take_min_start_and_last_end() {
    let store = TimingStore::builder()
        .word("a", Some(3.0))
        .word("b", Some(2.0))
        .word("c", None)
        .line_break()
        .word("d", None)
        .build();
    let lines = layout_lines(&store, 1000.0, &mut |s: &str| s.len() as f32);
    let t = line_timings(&lines, &store);
    assert_eq!(
        t[0],
        LineTiming {
            start: Some(2.0),
            end: Some(2.0)
        }
    );
    assert_eq!(t[1], LineTiming::default());
}

#[test]
fn untimed_lyrics_never_scroll() {
    let c = calc(&TimingStore::from_lyrics_text("a b\nc d"));
    for t in [0.0, 1.0, 50.0, 1e6] {
        assert_eq!(c.offset(t), 0.0);
    }
    assert!(c.current_line(10.0).is_none());
}

#[test]
fn intro_slides_up_from_below() {
    let c = calc(&song());
    assert_eq!(c.offset(0.0), -HEIGHT);
    assert_eq!(c.offset(2.0), -HEIGHT / 2.0);
    assert_eq!(c.offset(4.0), 0.0);
}

#[test]
fn zero_first_time_has_no_intro() {
    let store = TimingStore::builder().word("a", Some(0.0)).build();
    let c = calc(&store);
    assert_eq!(c.current_line(0.0).unwrap().line, 0);
}

#[test]
fn progress_runs_toward_next_timed_line() {
    let c = calc(&song());
    let p = c.current_line(6.0).unwrap();
    assert_eq!(p.line, 0);
    assert!((p.progress - 0.5).abs() < 1e-12);
    assert!((c.offset(6.0) - 0.5 * SPACING).abs() < 1e-9);

    // Line 2 is the spacer; line 1 progresses toward line 3 at t=12.
    let p = c.current_line(10.0).unwrap();
    assert_eq!(p.line, 1);
    assert!((p.progress - 0.5).abs() < 1e-12);
}

#[test]
fn last_line_uses_its_own_word_times() {
    let c = calc(&song());
    // start 12, end 14: progress = (t - 12) / max(1, 14 - 12 + 1).
    let p = c.current_line(13.5).unwrap();
    assert_eq!(p.line, 3);
    assert!((p.progress - 0.5).abs() < 1e-12);
    assert_eq!(c.current_line(100.0).unwrap().progress, 1.0);
}

#[test]
fn single_timed_word_last_line_defaults_to_half() {
    let store = TimingStore::builder()
        .word("a", Some(1.0))
        .line_break()
        .word("b", Some(3.0))
        .word("c", None)
        .build();
    let c = calc(&store);
    assert_eq!(c.current_line(50.0).unwrap().progress, 0.5);
    assert_eq!(c.offset(50.0), 1.5 * SPACING);
}

#[test]
fn steady_state_scroll_is_monotonic() {
    let c = calc(&song());
    let mut prev = c.offset(4.0);
    let mut t = 4.0;
    while t < 30.0 {
        t += 1.0 / 30.0;
        let cur = c.offset(t);
        assert!(cur >= prev - 1e-9, "offset went back at t={t}: {prev} -> {cur}");
        prev = cur;
    }
}
