use super::*;

#[test]
fn fallback_measures_by_character_count() {
    let mut s = TextShaper::new(None, 20.0);
    assert!(!s.can_draw());
    assert_eq!(s.measure(""), 0.0);
    assert_eq!(s.measure("abcd"), 4.0 * 20.0 * FALLBACK_ADVANCE_EM);
    assert!(s.measure("ab ") > s.measure("ab"));
}

#[test]
fn fallback_draw_is_a_no_op() {
    let mut s = TextShaper::new(None, 20.0);
    let mut ctx = vello_cpu::RenderContext::new(8, 8);
    s.draw(&mut ctx, "hello", 0.0, 0.0, Rgba8::rgb(255, 255, 255));
}

#[test]
fn real_font_measures_consistently() {
    let Some(font) = crate::text::font::resolve_font(&crate::text::font::default_font_candidates())
    else {
        return;
    };
    let mut s = TextShaper::new(Some(&font), 32.0);
    if !s.can_draw() {
        return;
    }
    let a = s.measure("karaoke");
    let b = s.measure("karaoke");
    assert_eq!(a, b);
    assert!(a > 0.0);
    assert!(s.measure("karaoke night") > a);
}

fn system_font() -> Option<LoadedFont> {
    crate::text::font::resolve_font(&crate::text::font::default_font_candidates())
}

#[test]
fn shaped_runs_use_the_drawn_face() {
    let Some(font) = system_font() else {
        return;
    };
    let mut s = TextShaper::new(Some(&font), 32.0);
    let Some(drawn_index) = s.face.as_ref().map(|f| f.font.index) else {
        return;
    };
    assert_eq!(drawn_index, font.index);

    let layout = s.layout("Karaoke night").unwrap();
    let mut runs = 0;
    for line in layout.lines() {
        for item in line.items() {
            if let parley::layout::PositionedLayoutItem::GlyphRun(run) = item {
                assert_eq!(run.run().font().index, drawn_index);
                runs += 1;
            }
        }
    }
    assert!(runs > 0);
}

#[test]
fn missing_collection_face_falls_back_to_metrics() {
    let Some(font) = system_font() else {
        return;
    };
    let absent = LoadedFont {
        index: font.index + 1000,
        ..font
    };
    let mut s = TextShaper::new(Some(&absent), 20.0);
    assert!(!s.can_draw());
    assert_eq!(s.measure("abcd"), 4.0 * 20.0 * FALLBACK_ADVANCE_EM);
}
