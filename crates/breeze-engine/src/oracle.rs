//! Collaborator interfaces the core samples but does not own.
//!
//! The presentation layer answers pixel questions through [`PixelOracle`] and
//! the window answers play-field size through [`Viewport`]. Both are passed
//! into each update explicitly.

use crate::components::{ScreenRect, TextureHandle};

/// Alpha values strictly above this are solid.
pub const SOLID_ALPHA_THRESHOLD: u8 = 230;

/// Whether a decoded alpha sample counts as part of the sprite silhouette.
#[inline]
pub fn is_solid(alpha: u8) -> bool {
    alpha > SOLID_ALPHA_THRESHOLD
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a pixel oracle could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    /// The texture was released by the presentation layer.
    #[error("texture {0:?} has been released")]
    TextureReleased(TextureHandle),
    /// The handle was never issued.
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),
    /// A sample outside the texture.
    #[error("sample ({x}, {y}) lies outside the texture")]
    OutOfBounds {
        /// Texture-local column.
        x: i32,
        /// Texture-local row.
        y: i32,
    },
    /// A region read with zero or negative area.
    #[error("region {0:?} covers no pixels")]
    DegenerateRegion(ScreenRect),
}

// ---------------------------------------------------------------------------
// TextureSize / AlphaRegion
// ---------------------------------------------------------------------------

/// Native pixel dimensions of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureSize {
    /// Columns.
    pub width: u32,
    /// Rows.
    pub height: u32,
}

impl TextureSize {
    /// A texture with no pixels.
    pub const ZERO: TextureSize = TextureSize {
        width: 0,
        height: 0,
    };
}

/// Alpha samples of a rectangular texture region, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaRegion {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaRegion {
    /// Wrap row-major samples. Missing trailing samples read as transparent.
    pub fn new(width: usize, height: usize, alpha: Vec<u8>) -> Self {
        Self {
            width,
            height,
            alpha,
        }
    }

    /// Alpha at region-local `(x, y)`, `0` outside the region.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha.get(y * self.width + x).copied().unwrap_or(0)
    }

    /// Columns in the region.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows in the region.
    pub fn height(&self) -> usize {
        self.height
    }
}

// ---------------------------------------------------------------------------
// PixelOracle
// ---------------------------------------------------------------------------

/// Read access to rendered sprite pixels.
///
/// Implementations must not change presentation state when answering.
pub trait PixelOracle {
    /// Native pixel dimensions of `texture`.
    fn texture_size(&self, texture: TextureHandle) -> Result<TextureSize, OracleError>;

    /// Decoded alpha (0-255) at texture-local `(x, y)`.
    fn sample_alpha(&self, texture: TextureHandle, x: i32, y: i32) -> Result<u8, OracleError>;

    /// Alpha of every pixel in the texture-local `region`, in one read.
    ///
    /// The default walks [`sample_alpha`](Self::sample_alpha); samples that
    /// fail read as `0`. Backends with a bulk read-back should override it.
    fn read_alpha(
        &self,
        texture: TextureHandle,
        region: ScreenRect,
    ) -> Result<AlphaRegion, OracleError> {
        if region.is_empty() {
            return Err(OracleError::DegenerateRegion(region));
        }
        let mut alpha = Vec::with_capacity(region.width as usize * region.height as usize);
        for dy in 0..region.height {
            for dx in 0..region.width {
                let a = region
                    .x
                    .checked_add(dx)
                    .zip(region.y.checked_add(dy))
                    .and_then(|(x, y)| self.sample_alpha(texture, x, y).ok())
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

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Current play-field extent, in the coordinate space of positions.
pub trait Viewport {
    /// `(width, height)` of the play field.
    fn viewport_size(&self) -> (u32, u32);
}

/// A viewport of constant size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedViewport {
    /// Play-field width.
    pub width: u32,
    /// Play-field height.
    pub height: u32,
}

impl FixedViewport {
    /// Construct a fixed viewport.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Viewport for FixedViewport {
    fn viewport_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
