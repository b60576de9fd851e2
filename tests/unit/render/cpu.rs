use super::*;
use crate::foundation::core::Canvas;
use crate::render::style::RenderStyle;
use crate::timing::store::TimingStore;

const BG: [u8; 3] = [18, 18, 18];

fn renderer(store: TimingStore) -> FrameRenderer {
    // Height 108 scales every style metric by 0.1: bar at y 4..14, padding 10.
    let style = RenderStyle::for_canvas(Canvas::new(216, 108).unwrap());
    let scene = Scene::build(store, style, &mut |s: &str| s.chars().count() as f32 * 4.0);
    FrameRenderer::new(Arc::new(scene), None, None, Fps::default()).unwrap()
}

fn near(px: [u8; 3], want: [u8; 3], tol: u8) -> bool {
    px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= tol)
}

#[test]
fn frame_has_canvas_size_and_packed_rgb() {
    let mut r = renderer(TimingStore::from_lyrics_text("la la"));
    let frame = r.render(0.0);
    assert_eq!((frame.width, frame.height), (216, 108));
    assert_eq!(frame.data.len(), 216 * 108 * 3);
    assert_eq!(frame.pixel(0, 0), Some(BG));
    assert_eq!(frame.pixel(216, 0), None);
    assert_eq!(frame.pixel(0, 108), None);
}

#[test]
fn loading_bar_fills_with_intro_progress() {
    let mut r = renderer(TimingStore::builder().word("a", Some(10.0)).build());

    let frame = r.render(5.0);
    // Fill spans x 10..108, the track continues to x 206.
    assert_eq!(frame.pixel(20, 8), Some([255, 200, 50]));
    let track = frame.pixel(150, 8).unwrap();
    assert!(near(track, [64, 64, 64], 4), "track {track:?}");
    assert_eq!(frame.pixel(5, 8), Some(BG));
    assert_eq!(frame.pixel(20, 30), Some(BG));

    let after = r.render(10.0);
    assert_eq!(after.pixel(20, 8), Some(BG));
    assert_eq!(after.pixel(150, 8), Some(BG));
}

#[test]
fn untimed_frames_never_draw_a_bar() {
    let mut r = renderer(TimingStore::from_lyrics_text("no timing here"));
    for t in [0.0, 1.0, 30.0] {
        assert_eq!(r.render(t).pixel(20, 8), Some(BG));
    }
}

#[test]
fn render_matches_rasterized_plan() {
    let store = TimingStore::builder()
        .word("one", Some(1.0))
        .line_break()
        .word("two", Some(2.0))
        .build();
    let mut r = renderer(store);
    for t in [0.0, 0.5, 1.5, 3.0] {
        let plan = r.scene.plan_frame(t);
        let planned = r.rasterize(&plan);
        assert_eq!(r.render(t), planned);
    }
}
