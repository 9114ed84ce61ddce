//! The seam between renderers and output surfaces: a cached buffer size and
//! the pixel-buffer trait every render stage draws through. Pixels are
//! single-byte palette indices; palette expansion happens at display time.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferSize {
    width_usize: usize,
    height_usize: usize,
    width: i32,
    height: i32,
}

impl BufferSize {
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width_usize: width,
            height_usize: height,
            width: width as i32,
            height: height as i32,
        }
    }

    pub const fn width(&self) -> i32 {
        self.width
    }

    pub const fn height(&self) -> i32 {
        self.height
    }

    pub const fn half_width(&self) -> i32 {
        self.width / 2
    }

    pub const fn half_height(&self) -> i32 {
        self.height / 2
    }

    pub const fn width_usize(&self) -> usize {
        self.width_usize
    }

    pub const fn height_usize(&self) -> usize {
        self.height_usize
    }
}

/// A writable grid of palette-index pixels.
pub trait PixelBuffer {
    fn size(&self) -> &BufferSize;
    fn clear_with(&mut self, colour: u8);
    fn set_pixel(&mut self, x: i32, y: i32, colour: u8);
    fn read_pixel(&self, x: i32, y: i32) -> u8;
    fn buf(&self) -> &[u8];
    fn buf_mut(&mut self) -> &mut [u8];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_caches_match() {
        let s = BufferSize::new(320, 200);
        assert_eq!(s.width(), 320);
        assert_eq!(s.height_usize(), 200);
        assert_eq!(s.half_width(), 160);
        assert_eq!(s.half_height(), 100);
    }
}
