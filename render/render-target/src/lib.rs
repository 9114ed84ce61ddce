//! An in-memory framebuffer implementing [`PixelBuffer`]. The viewer blits
//! it out however it likes; the renderers only ever see the trait.

pub mod buffers;

pub use buffers::FrameBuffer;
