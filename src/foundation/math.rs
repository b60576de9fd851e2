pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

/// Clamp into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp01(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Convert straight-alpha RGBA8 into premultiplied RGBA8.
pub(crate) fn premultiply_rgba8_in_place(buf: &mut [u8]) {
    for px in buf.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = mul_div255_u8(u16::from(*c), a);
        }
    }
}

/// Drop alpha from an opaque premultiplied RGBA8 buffer into packed RGB8.
pub(crate) fn rgba_to_rgb(src: &[u8], dst: &mut Vec<u8>) {
    dst.clear();
    dst.reserve(src.len() / 4 * 3);
    for px in src.chunks_exact(4) {
        dst.extend_from_slice(&px[..3]);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
