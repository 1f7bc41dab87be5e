//! Session — the canvas and strip driver a dispatcher operates on.
//!
//! All state a command can touch lives here, so tests can drive a session
//! directly without any stream plumbing.

use crate::driver::{ChannelId, GAMMA_TABLE_SIZE, StripDriver};
use crate::error::{BlinkchainError, Result};
use crate::led::format_color;
use crate::pixel;
use crate::protocol::{Command, Reply};
use crate::topology::{MAX_CANVAS_CELLS, Run, Topology, canvas_too_large};

pub struct Session<D: StripDriver> {
    topology: Topology,
    driver: D,
    max_canvas_cells: usize,
}

fn channel_id(channel: u8) -> Result<ChannelId> {
    ChannelId::new(channel).ok_or_else(|| BlinkchainError::Range("Channel must be 0 or 1".into()))
}

impl<D: StripDriver> Session<D> {
    /// Start with an empty 0×0 canvas. The driver should already be initialised.
    pub fn new(driver: D) -> Self {
        Self::with_canvas_limit(driver, MAX_CANVAS_CELLS)
    }

    /// Like [`new`](Self::new), but `init_canvas` refuses canvases with
    /// more than `max_canvas_cells` cells.
    pub fn with_canvas_limit(driver: D, max_canvas_cells: usize) -> Self {
        Session {
            topology: Topology::default(),
            driver,
            max_canvas_cells,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// Validate and apply one command.
    ///
    /// Command-local errors are returned before anything is mutated. A
    /// render failure comes back as a fatal [`BlinkchainError::Driver`].
    pub fn execute(&mut self, cmd: Command) -> Result<Reply> {
        match cmd {
            Command::InitCanvas { width, height } => {
                log::debug!("Called init_canvas(width: {width}, height: {height})");
                if usize::from(width) * usize::from(height) > self.max_canvas_cells {
                    return Err(canvas_too_large(width, height));
                }
                // The previous table stays in place if allocation fails.
                self.topology = Topology::try_new(width, height)?;
            }
            Command::InitPixels {
                channel,
                offset,
                x,
                y,
                count,
                dx,
                dy,
            } => {
                log::debug!(
                    "Called init_pixels(channel: {channel}, offset: {offset}, x: {x}, y: {y}, \
                     count: {count}, dx: {dx}, dy: {dy})"
                );
                let run = Run {
                    channel: channel_id(channel)?,
                    offset,
                    x,
                    y,
                    count,
                    dx,
                    dy,
                };
                self.topology.map_run(&run)?;
            }
            Command::SetInvert { channel, invert } => {
                log::debug!("Called set_invert(channel: {channel}, invert: {invert})");
                let id = channel_id(channel)?;
                if invert > 1 {
                    return Err(BlinkchainError::Range("Invert must be 0 or 1".into()));
                }
                self.driver.channel_mut(id).invert = invert == 1;
            }
            Command::SetBrightness {
                channel,
                brightness,
            } => {
                log::debug!("Called set_brightness(channel: {channel}, brightness: {brightness})");
                self.driver.channel_mut(channel_id(channel)?).brightness = brightness;
            }
            Command::SetGamma { channel, table } => {
                if table.len() != GAMMA_TABLE_SIZE {
                    return Err(BlinkchainError::Size(
                        "Size of gamma table must be 4 * 256 bytes".into(),
                    ));
                }
                let id = channel_id(channel)?;
                log::debug!("Called set_gamma(channel: {channel}, gamma: <binary>)");
                self.driver.channel_mut(id).gamma = Some(table);
            }
            Command::SetPixel { x, y, color } => {
                log::debug!("Called set_pixel(x: {x}, y: {y}, color: {})", format_color(color));
                if !self.topology.contains(x, y) {
                    return Err(BlinkchainError::Range(
                        "Cannot draw outside canvas dimensions".into(),
                    ));
                }
                pixel::write(&self.topology, &mut self.driver, x, y, color);
            }
            Command::GetPixel { x, y } => {
                log::debug!("Called get_pixel(x: {x}, y: {y})");
                if !self.topology.contains(x, y) {
                    return Err(BlinkchainError::Range(
                        "Cannot read from outside canvas dimensions".into(),
                    ));
                }
                let color = pixel::read(&self.topology, &self.driver, x, y);
                return Ok(Reply::OkPayload(format_color(color)));
            }
            Command::Fill { rect, color } => {
                log::debug!("Called fill({rect:?}, color: {})", format_color(color));
                pixel::fill(&self.topology, &mut self.driver, &rect, color)?;
            }
            Command::Copy {
                src,
                dst_x,
                dst_y,
                include_transparent,
            } => {
                log::debug!(
                    "Called copy{}({src:?}, xd: {dst_x}, yd: {dst_y})",
                    if include_transparent { "" } else { "_blit" }
                );
                pixel::copy(
                    &self.topology,
                    &mut self.driver,
                    &src,
                    dst_x,
                    dst_y,
                    include_transparent,
                )?;
            }
            Command::Blit { rect, pixels } => {
                log::debug!("Called blit({rect:?}, data: {} bytes)", pixels.len());
                pixel::blit(&self.topology, &mut self.driver, &rect, &pixels)?;
            }
            Command::Render => {
                self.driver.render()?;
            }
            Command::PrintTopology => {
                log::debug!(
                    "Called print_topology() ({} of {} cells mapped)",
                    self.topology.mapped_count(),
                    usize::from(self.topology.width()) * usize::from(self.topology.height())
                );
                for line in self.topology.dump() {
                    log::debug!("{line}");
                }
            }
        }
        Ok(Reply::Ok)
    }
}
