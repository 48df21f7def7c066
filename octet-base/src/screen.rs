use std::{
    fmt::{self, Debug, Display, Write},
    str::FromStr,
};

use thiserror::Error;

/// The monochrome framebuffer of the CHIP-8.
///
/// Every cell is stored as a byte that is either `0` (off) or `1` (on).
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct Screen {
    pixels: [u8; Self::WIDTH * Self::HEIGHT],
}

impl Screen {
    /// Screen width in pixels.
    pub const WIDTH: usize = 64;
    /// Screen height in pixels.
    pub const HEIGHT: usize = 32;
    /// Width of a sprite in pixels, one bit per pixel of a sprite byte.
    pub const SPRITE_WIDTH: usize = u8::BITS as usize;

    /// All cells in row-major order.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The cells of each row, from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(Self::WIDTH)
    }

    /// Whether the pixel at `x`, `y` is on, or `None` if the position is offscreen.
    pub fn pixel(&self, x: usize, y: usize) -> Option<bool> {
        if x >= Self::WIDTH || y >= Self::HEIGHT {
            return None;
        }
        Some(self.pixels[y * Self::WIDTH + x] == 1)
    }

    /// XOR the `sprite` onto the screen with its top left corner at `x`, `y`.
    ///
    /// Each byte of `sprite` is one row, the most significant bit being the leftmost pixel.
    /// Coordinates are taken modulo the screen size, parts of the sprite crossing
    /// the right or bottom edge are handled as given by `partial_offscreen_drawing`.
    ///
    /// Returns `true` if a set pixel has been unset, `false` otherwise.
    pub fn draw_sprite(
        &mut self,
        x: u8,
        y: u8,
        sprite: &[u8],
        partial_offscreen_drawing: PartialOffscreenDrawing,
    ) -> bool {
        let origin_x = x as usize % Self::WIDTH;
        let origin_y = y as usize % Self::HEIGHT;
        let mut set_pixel_unset = false;

        for (row, sprite_byte) in sprite.iter().copied().enumerate() {
            let y = origin_y + row;
            // Rows only get further offscreen, so we're done for the entire sprite.
            if y >= Self::HEIGHT && !partial_offscreen_drawing.should_wrap_y() {
                break;
            }
            let y = y % Self::HEIGHT;

            for column in 0..Self::SPRITE_WIDTH {
                if sprite_byte & (0x80 >> column) == 0 {
                    continue;
                }
                let x = origin_x + column;
                if x >= Self::WIDTH && !partial_offscreen_drawing.should_wrap_x() {
                    break;
                }
                let cell = &mut self.pixels[y * Self::WIDTH + x % Self::WIDTH];
                set_pixel_unset |= *cell == 1;
                *cell ^= 1;
            }
        }

        set_pixel_unset
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            pixels: [0; Self::WIDTH * Self::HEIGHT],
        }
    }
}

impl Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Screen(")?;
            for row in self.rows() {
                for &cell in row {
                    f.write_char(if cell == 1 { '#' } else { '_' })?;
                }
                f.write_char('\n')?;
            }
            write!(f, ")")
        } else {
            f.debug_tuple("Screen").field(&self.pixels).finish()
        }
    }
}

/// Drawing behavior for sprites that are partially offscreen.
///
/// Sprites that are drawn at coordinates fully offscreen will *always*
/// have the modulo of the screen size applied to their coordinates.
/// The partial offscreen drawing behavior will be applied after this.
/// See also [`Instruction::DrawSprite`](crate::instruction::Instruction::DrawSprite).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialOffscreenDrawing {
    /// Clip offscreen parts of sprites in both X and Y.
    ClipXY,
    /// Clip offscreen parts of sprites in X, wrap in Y.
    ClipXWrapY,
    /// Wrap offscreen parts of sprites in X, clip in Y.
    WrapXClipY,
    /// Wrap offscreen parts of sprites in both X and Y.
    WrapXY,
}

impl Default for PartialOffscreenDrawing {
    fn default() -> Self {
        Self::ClipXY
    }
}

impl PartialOffscreenDrawing {
    pub fn should_wrap_x(self) -> bool {
        matches!(self, Self::WrapXY | Self::WrapXClipY)
    }

    pub fn should_wrap_y(self) -> bool {
        matches!(self, Self::WrapXY | Self::ClipXWrapY)
    }

    fn name(self) -> &'static str {
        match self {
            Self::ClipXY => "clip-xy",
            Self::ClipXWrapY => "clip-x-wrap-y",
            Self::WrapXClipY => "wrap-x-clip-y",
            Self::WrapXY => "wrap-xy",
        }
    }
}

impl Display for PartialOffscreenDrawing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("unknown partial offscreen drawing behavior `{0}`, expected one of clip-xy, clip-x-wrap-y, wrap-x-clip-y, wrap-xy")]
pub struct ParsePartialOffscreenDrawingError(String);

impl FromStr for PartialOffscreenDrawing {
    type Err = ParsePartialOffscreenDrawingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::ClipXY,
            Self::ClipXWrapY,
            Self::WrapXClipY,
            Self::WrapXY,
        ]
        .iter()
        .copied()
        .find(|behavior| behavior.name() == s)
        .ok_or_else(|| ParsePartialOffscreenDrawingError(s.to_owned()))
    }
}
