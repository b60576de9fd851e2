use super::*;

#[test]
fn empty_or_untimed_store_has_no_times() {
    let store = TimingStore::from_lyrics_text("a b\nc");
    let idx = TimingIndex::build(&store);
    assert_eq!(idx.first_word_time, None);
    assert_eq!(idx.last_word_time, None);
    assert!(idx.gaps.is_empty());
    assert_eq!(idx.intro_progress(0.0), None);
}

#[test]
fn first_last_and_gaps_use_sorted_times() {
    let store = TimingStore::builder()
        .word("a", Some(12.0))
        .word("b", Some(2.0))
        .line_break()
        .word("c", Some(4.0))
        .word("d", None)
        .word("e", Some(30.0))
        .build();
    let idx = TimingIndex::build(&store);
    assert_eq!(idx.first_word_time, Some(2.0));
    assert_eq!(idx.last_word_time, Some(30.0));
    assert_eq!(
        idx.gaps,
        vec![
            Gap {
                start: 4.0,
                end: 12.0
            },
            Gap {
                start: 12.0,
                end: 30.0
            },
        ]
    );
    assert_eq!(idx.gaps[0].duration(), 8.0);
}

#[test]
fn gap_threshold_is_strict() {
    let store = TimingStore::builder()
        .word("a", Some(1.0))
        .word("b", Some(6.0))
        .build();
    assert!(TimingIndex::build(&store).gaps.is_empty());
    assert_eq!(TimingIndex::build_with_threshold(&store, 4.0).gaps.len(), 1);
}

#[test]
fn intro_progress_only_before_positive_first_time() {
    let store = TimingStore::builder().word("a", Some(4.0)).build();
    let idx = TimingIndex::build(&store);
    assert_eq!(idx.intro_progress(0.0), Some(0.0));
    assert_eq!(idx.intro_progress(1.0), Some(0.25));
    assert_eq!(idx.intro_progress(4.0), None);

    let zero = TimingStore::builder().word("a", Some(0.0)).build();
    assert_eq!(TimingIndex::build(&zero).intro_progress(0.0), None);
}
