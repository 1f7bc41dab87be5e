//! Pixel color packing and formatting.
//!
//! Colors use the strip driver format `0xWWRRGGBB`: white in the top byte,
//! then red, green and blue. `0x00000000` doubles as the transparent value
//! skipped by masked copies and blits.

/// Transparent sentinel for masked drawing. Opaque black is indistinguishable.
pub const TRANSPARENT: u32 = 0x0000_0000;

/// Pack individual components into `0xWWRRGGBB`.
pub fn pack_wrgb(r: u8, g: u8, b: u8, w: u8) -> u32 {
    u32::from_be_bytes([w, r, g, b])
}

/// Decode one blit pixel. Payload bytes arrive as `[W, R, G, B]`.
pub fn from_wrgb_bytes(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Format a color the way `get_pixel` replies: `0x` + 8 lowercase hex digits.
pub fn format_color(color: u32) -> String {
    format!("0x{color:08x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_red() {
        assert_eq!(pack_wrgb(255, 0, 0, 0), 0x00FF_0000);
    }

    #[test]
    fn pack_white_channel_is_top_byte() {
        assert_eq!(pack_wrgb(0, 0, 0, 0x80), 0x8000_0000);
    }

    #[test]
    fn pack_all_components() {
        assert_eq!(pack_wrgb(0x12, 0x34, 0x56, 0x78), 0x7812_3456);
    }

    #[test]
    fn blit_bytes_are_white_first() {
        assert_eq!(from_wrgb_bytes([0x01, 0x02, 0x03, 0x04]), 0x0102_0304);
        assert_eq!(from_wrgb_bytes([0, 0, 0, 0]), TRANSPARENT);
    }

    #[test]
    fn format_is_zero_padded_lowercase() {
        assert_eq!(format_color(0x00FF_0000), "0x00ff0000");
        assert_eq!(format_color(0), "0x00000000");
        assert_eq!(format_color(0xABCD_EF01), "0xabcdef01");
    }
}
