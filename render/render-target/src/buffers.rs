use render_trait::{BufferSize, PixelBuffer};

/// One byte per pixel, row major. Writes outside the buffer are dropped so
/// render stages never need their own bounds checks on the hot path.
pub struct FrameBuffer {
    size: BufferSize,
    buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            size: BufferSize::new(width, height),
            buffer: vec![0; width * height],
        }
    }
}

impl PixelBuffer for FrameBuffer {
    #[inline(always)]
    fn size(&self) -> &BufferSize {
        &self.size
    }

    #[inline(always)]
    fn clear_with(&mut self, colour: u8) {
        self.buffer.fill(colour);
    }

    #[inline(always)]
    fn set_pixel(&mut self, x: i32, y: i32, colour: u8) {
        if x < 0 || y < 0 || x >= self.size.width() || y >= self.size.height() {
            return;
        }
        let pos = y as usize * self.size.width_usize() + x as usize;
        self.buffer[pos] = colour;
    }

    #[inline]
    fn read_pixel(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.size.width() || y >= self.size.height() {
            return 0;
        }
        self.buffer[y as usize * self.size.width_usize() + x as usize]
    }

    fn buf(&self) -> &[u8] {
        &self.buffer
    }

    fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}
