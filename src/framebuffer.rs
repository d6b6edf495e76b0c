//! The 64x32 monochrome screen as the machine sees it: one byte per pixel,
//! 0 for off and 1 for on, row-major.

pub const CHIP8_SCREEN_WIDTH: usize = 64;
pub const CHIP8_SCREEN_HEIGHT: usize = 32;
pub const CHIP8_SCREEN_PIXELS: usize = CHIP8_SCREEN_WIDTH * CHIP8_SCREEN_HEIGHT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[u8; CHIP8_SCREEN_PIXELS]>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: Box::new([0; CHIP8_SCREEN_PIXELS]),
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// XOR a sprite onto the screen with its top-left corner at (x0, y0).
    /// Each row byte is 8 pixels wide, MSB leftmost. Pixels that land off the
    /// right or bottom edge are clipped; nothing wraps. Returns true if any lit
    /// pixel was toggled, i.e. a collision.
    pub fn draw(&mut self, x0: usize, y0: usize, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, byte) in rows.iter().enumerate() {
            let y = y0 + row;
            if y >= CHIP8_SCREEN_HEIGHT {
                break;
            }
            for col in 0..8 {
                let x = x0 + col;
                // clip per axis; a flat y*64+x bound would spill onto the next row
                if x >= CHIP8_SCREEN_WIDTH {
                    break;
                }
                if (byte >> (7 - col)) & 1 == 1 {
                    let pixel = &mut self.pixels[y * CHIP8_SCREEN_WIDTH + x];
                    if *pixel == 1 {
                        collision = true;
                    }
                    *pixel ^= 1;
                }
            }
        }
        collision
    }

    /// pixel at (x, y), or None if that's off screen
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x < CHIP8_SCREEN_WIDTH && y < CHIP8_SCREEN_HEIGHT {
            Some(self.pixels[y * CHIP8_SCREEN_WIDTH + x])
        } else {
            None
        }
    }

    /// read-only view for whatever renders the screen
    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| **p == 1).count()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
