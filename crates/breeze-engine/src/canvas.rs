//! In-memory pixel oracle.
//!
//! [`SoftwareCanvas`] keeps textures as packed RGBA8888 words (red in the high
//! byte, alpha in the low byte) and answers [`PixelOracle`] queries by
//! decoding them. It backs headless runs and tests; a GPU presentation layer
//! would implement the same trait with a framebuffer read-back.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use crate::components::{ScreenRect, TextureHandle};
use crate::oracle::{AlphaRegion, OracleError, PixelOracle, TextureSize};

// ---------------------------------------------------------------------------
// RGBA8888
// ---------------------------------------------------------------------------

/// A decoded color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    /// Construct a color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque-white pixel with the given alpha.
    pub const fn with_alpha(a: u8) -> Self {
        Self::new(255, 255, 255, a)
    }
}

/// Pack a color into an RGBA8888 word.
#[inline]
pub fn encode_rgba8888(color: Rgba) -> u32 {
    u32::from_be_bytes([color.r, color.g, color.b, color.a])
}

/// Unpack an RGBA8888 word.
#[inline]
pub fn decode_rgba8888(pixel: u32) -> Rgba {
    let [r, g, b, a] = pixel.to_be_bytes();
    Rgba { r, g, b, a }
}

// ---------------------------------------------------------------------------
// SoftwareCanvas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Texture {
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

/// Texture store that doubles as a [`PixelOracle`].
#[derive(Debug, Default)]
pub struct SoftwareCanvas {
    textures: HashMap<TextureHandle, Texture>,
    released: HashSet<TextureHandle>,
    next_handle: u32,
    region_reads: Cell<u64>,
}

impl SoftwareCanvas {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `width` x `height` texture filled with `fill`.
    pub fn create_texture(&mut self, width: u32, height: u32, fill: Rgba) -> TextureHandle {
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.textures.insert(
            handle,
            Texture {
                width,
                height,
                pixels: vec![encode_rgba8888(fill); width as usize * height as usize],
            },
        );
        handle
    }

    /// Create a texture from row-major alpha values on white.
    ///
    /// Rows shorter than `width` are padded with transparent pixels.
    pub fn create_from_alpha(&mut self, width: u32, height: u32, alpha: &[u8]) -> TextureHandle {
        let handle = self.create_texture(width, height, Rgba::TRANSPARENT);
        if let Some(texture) = self.textures.get_mut(&handle) {
            for (pixel, &a) in texture.pixels.iter_mut().zip(alpha) {
                *pixel = encode_rgba8888(Rgba::with_alpha(a));
            }
        }
        handle
    }

    /// Overwrite one pixel.
    pub fn set_pixel(
        &mut self,
        handle: TextureHandle,
        x: i32,
        y: i32,
        color: Rgba,
    ) -> Result<(), OracleError> {
        let texture = self.texture_mut(handle)?;
        let idx = texture
            .index(x, y)
            .ok_or(OracleError::OutOfBounds { x, y })?;
        texture.pixels[idx] = encode_rgba8888(color);
        Ok(())
    }

    /// Fill a texture-local rectangle, clipped to the texture.
    pub fn fill_rect(
        &mut self,
        handle: TextureHandle,
        rect: ScreenRect,
        color: Rgba,
    ) -> Result<(), OracleError> {
        let texture = self.texture_mut(handle)?;
        let packed = encode_rgba8888(color);
        for y in rect.y..rect.y.saturating_add(rect.height) {
            for x in rect.x..rect.x.saturating_add(rect.width) {
                if let Some(idx) = texture.index(x, y) {
                    texture.pixels[idx] = packed;
                }
            }
        }
        Ok(())
    }

    /// Release a texture. Later queries answer
    /// [`OracleError::TextureReleased`].
    pub fn release(&mut self, handle: TextureHandle) -> bool {
        if self.textures.remove(&handle).is_some() {
            self.released.insert(handle);
            true
        } else {
            false
        }
    }

    /// Number of region reads served so far.
    pub fn region_reads(&self) -> u64 {
        self.region_reads.get()
    }

    fn texture(&self, handle: TextureHandle) -> Result<&Texture, OracleError> {
        self.textures.get(&handle).ok_or_else(|| self.missing(handle))
    }

    fn texture_mut(&mut self, handle: TextureHandle) -> Result<&mut Texture, OracleError> {
        let missing = self.missing(handle);
        self.textures.get_mut(&handle).ok_or(missing)
    }

    fn missing(&self, handle: TextureHandle) -> OracleError {
        if self.released.contains(&handle) {
            OracleError::TextureReleased(handle)
        } else {
            OracleError::UnknownTexture(handle)
        }
    }
}

impl PixelOracle for SoftwareCanvas {
    fn texture_size(&self, texture: TextureHandle) -> Result<TextureSize, OracleError> {
        let t = self.texture(texture)?;
        Ok(TextureSize {
            width: t.width,
            height: t.height,
        })
    }

    fn sample_alpha(&self, texture: TextureHandle, x: i32, y: i32) -> Result<u8, OracleError> {
        let t = self.texture(texture)?;
        let idx = t.index(x, y).ok_or(OracleError::OutOfBounds { x, y })?;
        Ok(decode_rgba8888(t.pixels[idx]).a)
    }

    fn read_alpha(
        &self,
        texture: TextureHandle,
        region: ScreenRect,
    ) -> Result<AlphaRegion, OracleError> {
        if region.is_empty() {
            return Err(OracleError::DegenerateRegion(region));
        }
        let t = self.texture(texture)?;
        self.region_reads.set(self.region_reads.get() + 1);

        let mut alpha = Vec::with_capacity(region.width as usize * region.height as usize);
        for dy in 0..region.height {
            for dx in 0..region.width {
                let a = region
                    .x
                    .checked_add(dx)
                    .zip(region.y.checked_add(dy))
                    .and_then(|(x, y)| t.index(x, y))
                    .map(|idx| decode_rgba8888(t.pixels[idx]).a)
                    .unwrap_or(0);
                alpha.push(a);
            }
        }
        Ok(AlphaRegion::new(
            region.width as usize,
            region.height as usize,
            alpha,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8888_layout() {
        let packed = encode_rgba8888(Rgba::new(0x11, 0x22, 0x33, 0x44));
        assert_eq!(packed, 0x1122_3344);
        assert_eq!(decode_rgba8888(0xAABB_CCDD), Rgba::new(0xAA, 0xBB, 0xCC, 0xDD));
        assert_eq!(decode_rgba8888(0x0000_00E7).a, 231);
    }

    #[test]
    fn sample_reads_alpha_channel() {
        let mut canvas = SoftwareCanvas::new();
        let tex = canvas.create_texture(2, 2, Rgba::new(255, 0, 0, 100));
        canvas.set_pixel(tex, 1, 1, Rgba::new(0, 0, 0, 240)).unwrap();
        assert_eq!(canvas.sample_alpha(tex, 0, 0), Ok(100));
        assert_eq!(canvas.sample_alpha(tex, 1, 1), Ok(240));
    }

    #[test]
    fn out_of_range_sample_errors() {
        let mut canvas = SoftwareCanvas::new();
        let tex = canvas.create_texture(2, 2, Rgba::WHITE);
        assert_eq!(
            canvas.sample_alpha(tex, 2, 0),
            Err(OracleError::OutOfBounds { x: 2, y: 0 })
        );
        assert!(canvas.sample_alpha(tex, -1, 0).is_err());
    }

    #[test]
    fn released_texture_is_reported() {
        let mut canvas = SoftwareCanvas::new();
        let tex = canvas.create_texture(1, 1, Rgba::WHITE);
        assert!(canvas.release(tex));
        assert!(!canvas.release(tex));
        assert_eq!(
            canvas.texture_size(tex),
            Err(OracleError::TextureReleased(tex))
        );
        assert_eq!(
            canvas.texture_size(TextureHandle(99)),
            Err(OracleError::UnknownTexture(TextureHandle(99)))
        );
    }

    #[test]
    fn alpha_mask_texture() {
        let mut canvas = SoftwareCanvas::new();
        let tex = canvas.create_from_alpha(3, 1, &[0, 231, 255]);
        assert_eq!(canvas.sample_alpha(tex, 1, 0), Ok(231));
        assert_eq!(
            canvas.texture_size(tex),
            Ok(TextureSize {
                width: 3,
                height: 1
            })
        );
    }

    #[test]
    fn region_read_clips_and_counts() {
        let mut canvas = SoftwareCanvas::new();
        let tex = canvas.create_texture(4, 4, Rgba::TRANSPARENT);
        canvas
            .fill_rect(tex, ScreenRect::new(2, 2, 10, 10), Rgba::WHITE)
            .unwrap();

        let region = canvas.read_alpha(tex, ScreenRect::new(1, 1, 4, 4)).unwrap();
        assert_eq!(region.get(0, 0), 0);
        assert_eq!(region.get(1, 1), 255);
        assert_eq!(region.get(2, 2), 255);
        assert_eq!(region.get(3, 3), 0, "outside the texture reads transparent");
        assert_eq!(canvas.region_reads(), 1);
    }

    #[test]
    fn region_read_near_coordinate_limit_is_transparent() {
        let mut canvas = SoftwareCanvas::new();
        let tex = canvas.create_texture(2, 2, Rgba::WHITE);
        let region = canvas
            .read_alpha(tex, ScreenRect::new(i32::MAX - 1, i32::MAX - 1, 4, 3))
            .unwrap();
        for y in 0..3 {
            for x in 0..4 {
                assert_eq!(region.get(x, y), 0);
            }
        }
    }
}
