//! DIB → BMP conversion (§3 "BMP conversion", §4.8).
//!
//! A Device-Independent Bitmap as stored on the clipboard is a
//! BITMAPINFOHEADER followed by an optional color table and the pixel data,
//! but lacks the BITMAPFILEHEADER a standalone `.bmp` file needs. This module
//! only ever prepends that header; it never touches pixel data.

use bytes::{BufMut, BytesMut};
use pc_core::error::{ClipError, ClipResult};

const BITMAPFILEHEADER_LEN: usize = 14;
const BITMAPINFOHEADER_LEN: usize = 40;
const BI_BITFIELDS: u32 = 3;

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// Converts a raw DIB buffer into a standalone BMP file's bytes.
///
/// Fails with `InvalidDIB` if the buffer is shorter than a BITMAPINFOHEADER
/// or if `biSize != 40` — a DIB begins with a fixed-size header in this
/// protocol subset; other BITMAPINFOHEADER variants (v4/v5) are not accepted.
pub fn dib_to_bmp(dib: &[u8]) -> ClipResult<Vec<u8>> {
    if dib.len() < BITMAPINFOHEADER_LEN {
        return Err(ClipError::InvalidDib(
            "buffer shorter than BITMAPINFOHEADER".to_string(),
        ));
    }

    let bi_size = read_u32_le(dib, 0);
    if bi_size != BITMAPINFOHEADER_LEN as u32 {
        return Err(ClipError::InvalidDib(format!(
            "deserialize BITMAPINFO: expected biSize=40, got {bi_size}"
        )));
    }

    let bi_bit_count = read_u16_le(dib, 14);
    let bi_compression = read_u32_le(dib, 16);
    let bi_clr_used = read_u32_le(dib, 32);

    let palette_bytes: u32 = if bi_clr_used != 0 {
        bi_clr_used * 4
    } else if bi_bit_count <= 8 {
        (1u32 << bi_bit_count) * 4
    } else {
        0
    };

    let masks_bytes: u32 = if bi_compression == BI_BITFIELDS { 12 } else { 0 };

    let bf_off_bits = BITMAPFILEHEADER_LEN as u32 + BITMAPINFOHEADER_LEN as u32 + palette_bytes + masks_bytes;
    let bf_size = BITMAPFILEHEADER_LEN as u32 + dib.len() as u32;

    let mut out = BytesMut::with_capacity(BITMAPFILEHEADER_LEN + dib.len());
    out.put_slice(b"BM");
    out.put_u32_le(bf_size);
    out.put_u16_le(0); // bfReserved1
    out.put_u16_le(0); // bfReserved2
    out.put_u32_le(bf_off_bits);
    out.put_slice(dib);

    Ok(out.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_dib(width: i32, height: i32, bit_count: u16) -> Vec<u8> {
        let row_bytes = ((width as usize * bit_count as usize + 31) / 32) * 4;
        let pixel_len = row_bytes * height as usize;
        let mut dib = BytesMut::with_capacity(BITMAPINFOHEADER_LEN + pixel_len);
        dib.put_u32_le(40); // biSize
        dib.put_i32_le(width);
        dib.put_i32_le(height);
        dib.put_u16_le(1); // biPlanes
        dib.put_u16_le(bit_count);
        dib.put_u32_le(0); // biCompression = BI_RGB
        dib.put_u32_le(pixel_len as u32); // biSizeImage
        dib.put_i32_le(2835); // biXPelsPerMeter
        dib.put_i32_le(2835); // biYPelsPerMeter
        dib.put_u32_le(0); // biClrUsed
        dib.put_u32_le(0); // biClrImportant
        dib.resize(BITMAPINFOHEADER_LEN + pixel_len, 0);
        dib.to_vec()
    }

    #[test]
    fn well_formed_32x32_produces_valid_bmp() {
        let dib = well_formed_dib(32, 32, 24);
        let bmp = dib_to_bmp(&dib).unwrap();
        assert_eq!(&bmp[0..2], b"BM");
        assert!(bmp.len() > 14);
        let bf_size = read_u32_le(&bmp, 2);
        assert!(bf_size as usize <= bmp.len());
        assert!(bf_size > 14);
    }

    #[test]
    fn truncated_header_is_invalid_dib() {
        let dib = well_formed_dib(32, 32, 24);
        let err = dib_to_bmp(&dib[1..]).unwrap_err();
        assert!(matches!(err, ClipError::InvalidDib(_)));
    }

    #[test]
    fn corrupted_bi_size_is_invalid_dib() {
        let mut dib = well_formed_dib(32, 32, 24);
        dib[0] = dib[0].wrapping_sub(1);
        let err = dib_to_bmp(&dib).unwrap_err();
        assert!(matches!(err, ClipError::InvalidDib(_)));
    }

    #[test]
    fn palette_is_included_for_low_bit_count() {
        let dib = well_formed_dib(8, 8, 4);
        let bmp = dib_to_bmp(&dib).unwrap();
        let bf_off_bits = read_u32_le(&bmp, 10);
        // 14 header + 40 DIB header + (1<<4)*4 palette bytes
        assert_eq!(bf_off_bits, 14 + 40 + 16 * 4);
    }
}
