//! Hardware-free strip driver.
//!
//! Keeps both channel buffers in memory and dumps every rendered frame to
//! the log at debug level. Lets the command server run on machines without
//! a PWM/DMA LED interface.

use super::{ChannelId, ChannelState, DriverWiring, Result, StripDriver};

pub struct HeadlessDriver {
    dma_channel: u8,
    channels: [ChannelState; super::CHANNEL_COUNT],
    frames: u64,
}

impl HeadlessDriver {
    pub fn new(wiring: &DriverWiring) -> Self {
        HeadlessDriver {
            dma_channel: wiring.dma_channel,
            channels: [
                ChannelState::new(&wiring.channels[0]),
                ChannelState::new(&wiring.channels[1]),
            ],
            frames: 0,
        }
    }

    /// Number of frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl StripDriver for HeadlessDriver {
    fn init(&mut self) -> Result<()> {
        for (ch, state) in self.channels.iter_mut().enumerate() {
            state.allocate();
            log::debug!(
                "[driver] channel {ch}: gpio {} | {} LEDs | {}",
                state.gpio_pin,
                state.count,
                state.strip_type
            );
        }
        log::info!("[driver] headless driver ready (dma {})", self.dma_channel);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.frames += 1;
        log::debug!("Called render(), frame {}", self.frames);
        for (ch, state) in self.channels.iter().enumerate() {
            for (offset, color) in state.leds.iter().enumerate() {
                log::debug!("  [{ch}][{offset}]: 0x{color:08x}");
            }
        }
        Ok(())
    }

    fn finalize(&mut self) {
        for state in &mut self.channels {
            state.leds = Vec::new();
        }
        log::debug!("[driver] finalized after {} frames", self.frames);
    }

    fn channel(&self, id: ChannelId) -> &ChannelState {
        &self.channels[id.index()]
    }

    fn channel_mut(&mut self, id: ChannelId) -> &mut ChannelState {
        &mut self.channels[id.index()]
    }
}
