//! Decoding generated ducks into RGBA buffers egui can upload.

use image::GenericImageView;

/// Largest edge shown in the window; bigger images are scaled down before upload.
pub const MAX_DISPLAY_DIMENSION: u32 = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDuck {
    pub size: [usize; 2],
    pub rgba: Vec<u8>,
}

pub fn decode_duck_image(bytes: &[u8]) -> Result<DecodedDuck, String> {
    let decoded = image::load_from_memory(bytes).map_err(|e| format!("decode failed: {e}"))?;

    let (orig_w, orig_h) = decoded.dimensions();
    let scale = (MAX_DISPLAY_DIMENSION as f32 / (orig_w.max(orig_h) as f32)).min(1.0);
    let resized = if scale < 1.0 {
        decoded.resize(
            (orig_w as f32 * scale).max(1.0) as u32,
            (orig_h as f32 * scale).max(1.0) as u32,
            image::imageops::FilterType::Triangle,
        )
    } else {
        decoded
    };

    let rgba = resized.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(DecodedDuck {
        size,
        rgba: rgba.into_raw(),
    })
}
