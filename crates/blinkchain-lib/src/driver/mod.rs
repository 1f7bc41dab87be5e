//! Strip driver seam — per-channel LED buffers, settings, and rendering.
//!
//! The driver owns the channel buffers and their sizing. The canvas code
//! only ever indexes into them through [`StripDriver::channel_mut`].

mod headless;

use std::fmt;

use crate::led::StripType;

pub use headless::HeadlessDriver;

/// Number of hardware outputs a driver exposes.
pub const CHANNEL_COUNT: usize = 2;

/// Size in bytes of a gamma table (256 entries × 4 bytes).
pub const GAMMA_TABLE_SIZE: usize = 256 * 4;

/// Default brightness applied to both channels at startup.
pub const DEFAULT_BRIGHTNESS: u8 = 255;

// ── Error type ──

/// Strip driver errors. Both variants are fatal to the command server.
#[derive(Debug)]
pub enum DriverError {
    InitFailed(String),
    RenderFailed(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InitFailed(e) => write!(f, "Strip driver init failed: {e}"),
            DriverError::RenderFailed(e) => write!(f, "Strip driver render failed: {e}"),
        }
    }
}

impl std::error::Error for DriverError {}

pub type Result<T> = std::result::Result<T, DriverError>;

// ── Channel identity and state ──

/// One of the two hardware outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u8);

impl ChannelId {
    pub const ZERO: ChannelId = ChannelId(0);
    pub const ONE: ChannelId = ChannelId(1);

    /// Returns `None` for anything but 0 or 1.
    pub fn new(n: u8) -> Option<Self> {
        (usize::from(n) < CHANNEL_COUNT).then_some(ChannelId(n))
    }

    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wiring for one channel, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelWiring {
    pub gpio_pin: u8,
    pub count: usize,
    pub strip_type: StripType,
}

impl ChannelWiring {
    /// Wiring for an unused second channel.
    pub fn disabled() -> Self {
        ChannelWiring {
            gpio_pin: 0,
            count: 0,
            strip_type: StripType::Gbr,
        }
    }
}

/// Driver-wide wiring: DMA channel plus both outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverWiring {
    pub dma_channel: u8,
    pub channels: [ChannelWiring; CHANNEL_COUNT],
}

/// Live state of one channel.
#[derive(Debug, Clone)]
pub struct ChannelState {
    pub gpio_pin: u8,
    pub count: usize,
    pub strip_type: StripType,
    pub brightness: u8,
    pub invert: bool,
    /// Opaque gamma table handed to the strip hardware, if one was set.
    pub gamma: Option<Vec<u8>>,
    /// Colors indexed by strip offset. Empty until the driver is initialised.
    pub leds: Vec<u32>,
}

impl ChannelState {
    pub fn new(wiring: &ChannelWiring) -> Self {
        ChannelState {
            gpio_pin: wiring.gpio_pin,
            count: wiring.count,
            strip_type: wiring.strip_type,
            brightness: DEFAULT_BRIGHTNESS,
            invert: false,
            gamma: None,
            leds: Vec::new(),
        }
    }

    /// Allocate a zeroed buffer of `count` LEDs.
    pub fn allocate(&mut self) {
        self.leds = vec![0; self.count];
    }
}

// ── Trait ──

pub trait StripDriver {
    /// Allocate channel buffers and bring up the output hardware.
    fn init(&mut self) -> Result<()>;
    /// Push every channel buffer out to its strip. Blocks until done.
    fn render(&mut self) -> Result<()>;
    /// Release hardware resources. The driver is unusable afterwards.
    fn finalize(&mut self);
    fn channel(&self, id: ChannelId) -> &ChannelState;
    fn channel_mut(&mut self, id: ChannelId) -> &mut ChannelState;
}

// ── Mock driver for testing ──

/// In-memory mock driver for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;

    /// Records renders and lets tests inject init/render failures.
    pub struct MockDriver {
        channels: [ChannelState; CHANNEL_COUNT],
        /// Number of successful `render()` calls.
        pub renders: usize,
        /// Snapshot of both buffers taken at each successful render.
        pub frames: Vec<[Vec<u32>; CHANNEL_COUNT]>,
        /// Set by `finalize()`.
        pub finalized: bool,
        /// If true, `init()` returns an error.
        pub fail_init: bool,
        /// If true, `render()` returns an error.
        pub fail_render: bool,
    }

    impl MockDriver {
        /// Mock with already-allocated buffers of the given lengths.
        pub fn new(count0: usize, count1: usize) -> Self {
            let wiring = |count| ChannelWiring {
                gpio_pin: 18,
                count,
                strip_type: StripType::Grb,
            };
            let mut channels = [
                ChannelState::new(&wiring(count0)),
                ChannelState::new(&wiring(count1)),
            ];
            for ch in &mut channels {
                ch.allocate();
            }
            MockDriver {
                channels,
                renders: 0,
                frames: Vec::new(),
                finalized: false,
                fail_init: false,
                fail_render: false,
            }
        }

        /// Direct buffer access for assertions.
        pub fn leds(&self, id: ChannelId) -> &[u32] {
            &self.channels[id.index()].leds
        }
    }

    impl StripDriver for MockDriver {
        fn init(&mut self) -> Result<()> {
            if self.fail_init {
                return Err(DriverError::InitFailed("mock: init failure injected".into()));
            }
            for ch in &mut self.channels {
                ch.allocate();
            }
            Ok(())
        }

        fn render(&mut self) -> Result<()> {
            if self.fail_render {
                return Err(DriverError::RenderFailed(
                    "mock: render failure injected".into(),
                ));
            }
            self.renders += 1;
            self.frames.push([
                self.channels[0].leds.clone(),
                self.channels[1].leds.clone(),
            ]);
            Ok(())
        }

        fn finalize(&mut self) {
            self.finalized = true;
        }

        fn channel(&self, id: ChannelId) -> &ChannelState {
            &self.channels[id.index()]
        }

        fn channel_mut(&mut self, id: ChannelId) -> &mut ChannelState {
            &mut self.channels[id.index()]
        }
    }
}
