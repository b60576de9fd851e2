use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn clamp01_handles_nan_and_bounds() {
    assert_eq!(clamp01(f64::NAN), 0.0);
    assert_eq!(clamp01(-0.5), 0.0);
    assert_eq!(clamp01(1.5), 1.0);
    assert_eq!(clamp01(0.25), 0.25);
}

#[test]
fn premultiply_leaves_opaque_pixels() {
    let mut buf = vec![10u8, 20, 30, 255];
    premultiply_rgba8_in_place(&mut buf);
    assert_eq!(buf, vec![10, 20, 30, 255]);
}

#[test]
fn premultiply_scales_color_by_alpha() {
    let mut buf = vec![255u8, 100, 0, 0, 255, 255, 255, 128];
    premultiply_rgba8_in_place(&mut buf);
    assert_eq!(&buf[..4], &[0, 0, 0, 0]);
    assert_eq!(&buf[4..], &[128, 128, 128, 128]);
}

#[test]
fn rgba_to_rgb_drops_alpha() {
    let mut out = Vec::new();
    rgba_to_rgb(&[1, 2, 3, 255, 4, 5, 6, 255], &mut out);
    assert_eq!(out, vec![1, 2, 3, 4, 5, 6]);
}
