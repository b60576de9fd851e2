use super::*;

fn texts(store: &TimingStore) -> Vec<String> {
    store
        .tokens()
        .iter()
        .map(|t| match t {
            Token::Word(w) => w.text.clone(),
            Token::Break => "|".to_string(),
        })
        .collect()
}

#[test]
fn lyrics_text_splits_words_lines_and_blank_lines() {
    let store = TimingStore::from_lyrics_text("hello  world\nsecond line\n\nverse two\n\n");
    assert_eq!(
        texts(&store),
        vec!["hello", "world", "|", "second", "line", "|", "|", "verse", "two"]
    );
    let indices: Vec<usize> = store.words().map(|w| w.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(store.timed_count(), 0);
    assert!(!store.is_complete());
}

#[test]
fn json_round_trip_preserves_words_breaks_and_times() {
    let store = TimingStore::builder()
        .word("a", Some(1.0))
        .word("b", None)
        .line_break()
        .word("c", Some(2.5))
        .build();
    let json = store.to_json_string().unwrap();
    assert!(json.contains("\"\\n\""));
    let back = TimingStore::from_json_str(&json).unwrap();
    assert_eq!(back.tokens(), store.tokens());
}

#[test]
fn json_reads_interchange_records() {
    let json = r#"{"words":[
        {"word":"one","start_time":0.5,"index":0},
        {"word":"\n","start_time":null,"index":1},
        {"word":"two","start_time":null,"index":2}
    ]}"#;
    let store = TimingStore::from_json_str(json).unwrap();
    assert_eq!(texts(&store), vec!["one", "|", "two"]);
    assert_eq!(store.word_time(0), Some(0.5));
    assert_eq!(store.word_time(2), None);
    assert_eq!(store.word_time(99), None);
}

#[test]
fn json_rejects_negative_times_and_garbage() {
    let bad = r#"{"words":[{"word":"x","start_time":-1.0,"index":0}]}"#;
    assert!(matches!(
        TimingStore::from_json_str(bad),
        Err(KaraokeError::Validation(_))
    ));
    assert!(matches!(
        TimingStore::from_json_str("not json"),
        Err(KaraokeError::Serde(_))
    ));
}

#[test]
fn first_and_last_timed_follow_sequence_order() {
    let store = TimingStore::builder()
        .word("a", None)
        .word("b", Some(3.0))
        .word("c", Some(1.0))
        .word("d", None)
        .build();
    assert_eq!(store.first_timed_word().map(|w| w.index), Some(1));
    assert_eq!(store.last_timed_word().map(|w| w.index), Some(2));
    assert_eq!(store.timed_count(), 2);
    assert_eq!(store.total_words(), 4);
}

#[test]
fn word_at_time_reports_progress_toward_next_word() {
    let store = TimingStore::builder()
        .word("a", Some(1.0))
        .word("b", Some(3.0))
        .line_break()
        .word("c", Some(3.0))
        .build();

    assert!(store.word_at_time(0.5).is_none());

    let (w, p) = store.word_at_time(2.0).unwrap();
    assert_eq!(w.text, "a");
    assert!((p - 0.5).abs() < 1e-9);

    // "c" shares b's timestamp, so it is current and is the last word.
    let (w, p) = store.word_at_time(3.25).unwrap();
    assert_eq!(w.text, "c");
    assert!((p - 0.25).abs() < 1e-9);

    let (_, p) = store.word_at_time(10.0).unwrap();
    assert_eq!(p, 1.0);
}

#[test]
fn word_at_time_prefers_latest_word_sharing_a_start() {
    let store = TimingStore::builder()
        .word("a", Some(2.0))
        .word("b", Some(2.0))
        .word("c", Some(4.0))
        .build();
    let (w, p) = store.word_at_time(2.0).unwrap();
    assert_eq!(w.text, "b");
    assert_eq!(p, 0.0);
}

#[test]
fn break_records_do_not_shift_word_indices() {
    let store = TimingStore::from_lyrics_text("a b\nc");
    let store = TimingStore::new(
        store
            .tokens()
            .iter()
            .cloned()
            .map(|t| match t {
                Token::Word(mut w) if w.index == 2 => {
                    w.start_time = Some(3.0);
                    Token::Word(w)
                }
                other => other,
            })
            .collect(),
    );

    let json = store.to_json_string().unwrap();
    let file: TimingFile = serde_json::from_str(&json).unwrap();
    let indices: Vec<(String, usize)> = file.words.into_iter().map(|r| (r.word, r.index)).collect();
    assert_eq!(
        indices,
        vec![
            ("a".to_string(), 0),
            ("b".to_string(), 1),
            (BREAK_MARKER.to_string(), 2),
            ("c".to_string(), 2),
        ]
    );

    let back = TimingStore::from_json_str(&json).unwrap();
    assert_eq!(back.tokens(), store.tokens());
    assert_eq!(back.word_time(2), Some(3.0));
    assert_eq!(back.words().map(|w| w.index).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn position_indexed_files_keep_break_slots_on_save() {
    let json = r#"{"words":[
        {"word":"a","start_time":0.5,"index":0},
        {"word":"\n","start_time":null,"index":1},
        {"word":"b","start_time":1.0,"index":2}
    ]}"#;
    let store = TimingStore::from_json_str(json).unwrap();
    let file: TimingFile = serde_json::from_str(&store.to_json_string().unwrap()).unwrap();
    let indices: Vec<usize> = file.words.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
}
