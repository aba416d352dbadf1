//! Wire-level primitives for the clipboard transfer protocol: framing,
//! protocol tags, and DIB/BMP conversion (§4.1, §4.2, §4.8).

pub mod codec;
pub mod image;
pub mod tags;

pub use image::dib_to_bmp;
