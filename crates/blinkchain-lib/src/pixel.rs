//! Pixel engine — drawing through the topology into the driver's buffers.
//!
//! Every operation validates its whole rectangle before touching a single
//! LED, so a rejected call leaves the channel buffers exactly as they were.
//! Drawing on unmapped cells is silently discarded.

use crate::driver::StripDriver;
use crate::error::{BlinkchainError, Result};
use crate::led::{TRANSPARENT, from_wrgb_bytes};
use crate::topology::{Rect, Slot, Topology};

/// Bytes per pixel in a blit payload (`W, R, G, B`).
pub const BLIT_BYTES_PER_PIXEL: usize = 4;

/// Color of the LED behind `(x, y)`, or [`TRANSPARENT`] when unmapped.
///
/// An offset past the end of its channel buffer also reads as transparent.
pub fn read(topology: &Topology, driver: &impl StripDriver, x: u16, y: u16) -> u32 {
    match topology.lookup(x, y) {
        Slot::Unmapped => TRANSPARENT,
        Slot::Mapped { channel, offset } => driver
            .channel(channel)
            .leds
            .get(usize::from(offset))
            .copied()
            .unwrap_or(TRANSPARENT),
    }
}

/// Store `color` in the LED behind `(x, y)`. No-op when unmapped.
pub fn write(topology: &Topology, driver: &mut impl StripDriver, x: u16, y: u16, color: u32) {
    if let Slot::Mapped { channel, offset } = topology.lookup(x, y) {
        match driver.channel_mut(channel).leds.get_mut(usize::from(offset)) {
            Some(led) => *led = color,
            None => log::trace!("  dropped write past end of channel {channel} at {offset}"),
        }
    }
}

/// Paint every cell of `rect` with `color`.
pub fn fill(
    topology: &Topology,
    driver: &mut impl StripDriver,
    rect: &Rect,
    color: u32,
) -> Result<()> {
    topology.check_rect(rect)?;
    for (x, y) in rect.cells() {
        write(topology, driver, x, y, color);
    }
    Ok(())
}

/// Copy `src` so its top-left lands on `(dst_x, dst_y)`.
///
/// The source is snapshotted before anything is written, so overlapping
/// rectangles copy as if all at once. With `include_transparent == false`
/// transparent source pixels leave the destination untouched.
pub fn copy(
    topology: &Topology,
    driver: &mut impl StripDriver,
    src: &Rect,
    dst_x: u16,
    dst_y: u16,
    include_transparent: bool,
) -> Result<()> {
    let dst = Rect::new(dst_x, dst_y, src.width, src.height);
    topology.check_rect(src)?;
    topology.check_rect(&dst)?;

    let snapshot: Vec<u32> = src
        .cells()
        .map(|(x, y)| read(topology, driver, x, y))
        .collect();
    for ((x, y), color) in dst.cells().zip(snapshot) {
        if include_transparent || color != TRANSPARENT {
            write(topology, driver, x, y, color);
        }
    }
    Ok(())
}

/// Draw a row-major `W, R, G, B` pixel payload into `rect`, skipping
/// transparent pixels.
pub fn blit(
    topology: &Topology,
    driver: &mut impl StripDriver,
    rect: &Rect,
    pixels: &[u8],
) -> Result<()> {
    if pixels.len() != rect.area() * BLIT_BYTES_PER_PIXEL {
        return Err(BlinkchainError::Size(
            "Size of binary data didn't match the width and height".into(),
        ));
    }
    topology.check_rect(rect)?;

    for ((x, y), px) in rect.cells().zip(pixels.chunks_exact(BLIT_BYTES_PER_PIXEL)) {
        let color = from_wrgb_bytes([px[0], px[1], px[2], px[3]]);
        if color != TRANSPARENT {
            write(topology, driver, x, y, color);
        }
    }
    Ok(())
}
