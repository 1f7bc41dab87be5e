//! Canvas topology — which strip LED sits under each (x, y) cell.
//!
//! A canvas is a `width × height` grid of [`Slot`]s. Every slot starts out
//! unmapped; runs of consecutive strip offsets are then walked across the
//! grid with [`Topology::map_run`], so a serpentine panel is described by one
//! run per row with alternating `dx`.
//!
//! Bounds use an exclusive upper edge everywhere: a cell is inside when
//! `x < width && y < height`, a rectangle when `x + w <= width && y + h <= height`.

use crate::driver::ChannelId;
use crate::error::{BlinkchainError, Result};

/// Exclusive upper limit for strip offsets. The top bit of a packed slot
/// carries the channel, and `0xFFFF` is reserved for unmapped.
pub const MAX_OFFSET: u16 = 32767;

/// Packed encoding of [`Slot::Unmapped`].
pub const UNMAPPED_PACKED: u16 = 0xFFFF;

/// Largest canvas the protocol can describe, in cells.
pub const MAX_CANVAS_CELLS: usize = u16::MAX as usize * u16::MAX as usize;

const CHANNEL_BIT: u16 = 1 << 15;

/// What a canvas cell is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slot {
    /// No LED behind this cell; drawing here is discarded.
    #[default]
    Unmapped,
    Mapped { channel: ChannelId, offset: u16 },
}

impl Slot {
    /// Pack into 16 bits: MSB = channel, low 15 bits = offset.
    pub fn pack(self) -> u16 {
        match self {
            Slot::Unmapped => UNMAPPED_PACKED,
            Slot::Mapped { channel, offset } => {
                let ch = if channel == ChannelId::ONE { CHANNEL_BIT } else { 0 };
                ch | (offset & !CHANNEL_BIT)
            }
        }
    }

    /// Inverse of [`pack`](Self::pack). Returns `None` for an offset of 32767,
    /// which can never be mapped.
    pub fn unpack(raw: u16) -> Option<Slot> {
        if raw == UNMAPPED_PACKED {
            return Some(Slot::Unmapped);
        }
        let offset = raw & !CHANNEL_BIT;
        if offset >= MAX_OFFSET {
            return None;
        }
        let channel = if raw & CHANNEL_BIT != 0 {
            ChannelId::ONE
        } else {
            ChannelId::ZERO
        };
        Some(Slot::Mapped { channel, offset })
    }
}

/// Axis-aligned rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Cells in row-major order. Only meaningful for rectangles that passed
    /// [`Topology::check_rect`].
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |col| (self.x + col, self.y + row))
        })
    }
}

/// A straight line of consecutive strip offsets laid across the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub channel: ChannelId,
    /// Strip offset of the first LED.
    pub offset: u16,
    /// Cell of the first LED.
    pub x: u16,
    pub y: u16,
    pub count: u16,
    /// Step between consecutive LEDs.
    pub dx: i8,
    pub dy: i8,
}

/// The canvas grid and its slot table, stored packed (two bytes per cell).
#[derive(Debug, Clone, Default)]
pub struct Topology {
    width: u16,
    height: u16,
    slots: Vec<u16>,
}

impl Topology {
    /// A fresh canvas with every slot unmapped.
    ///
    /// Fails with a range error instead of aborting when the table cannot
    /// be allocated.
    pub fn try_new(width: u16, height: u16) -> Result<Self> {
        let cells = usize::from(width) * usize::from(height);
        let mut slots = Vec::new();
        slots.try_reserve_exact(cells).map_err(|e| {
            log::warn!("canvas {width}x{height} not allocated: {e}");
            canvas_too_large(width, height)
        })?;
        slots.resize(cells, UNMAPPED_PACKED);
        Ok(Topology {
            width,
            height,
            slots,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Reject a rectangle that sticks out past either canvas edge.
    pub fn check_rect(&self, rect: &Rect) -> Result<()> {
        let right = u32::from(rect.x) + u32::from(rect.width);
        let bottom = u32::from(rect.y) + u32::from(rect.height);
        if right > u32::from(self.width) || bottom > u32::from(self.height) {
            return Err(BlinkchainError::Range(
                "Cannot draw outside canvas dimensions".into(),
            ));
        }
        Ok(())
    }

    /// Slot behind a cell. Cells outside the canvas read as unmapped.
    pub fn lookup(&self, x: u16, y: u16) -> Slot {
        if !self.contains(x, y) {
            return Slot::Unmapped;
        }
        Slot::unpack(self.slots[self.index(x, y)]).unwrap_or_default()
    }

    /// Assign `run.count` consecutive offsets to the cells visited from
    /// `(run.x, run.y)` stepping by `(run.dx, run.dy)`.
    ///
    /// The whole run is validated before any slot is written; slots the run
    /// does not visit keep their previous mapping.
    pub fn map_run(&mut self, run: &Run) -> Result<()> {
        if run.count == 0 {
            return Ok(());
        }
        let steps = i32::from(run.count) - 1;
        let last_offset = i32::from(run.offset) + steps;
        if last_offset >= i32::from(MAX_OFFSET) {
            return Err(BlinkchainError::Range(format!(
                "The offset of the last pixel in each channel must be less than {MAX_OFFSET}."
            )));
        }

        let end_x = i32::from(run.x) + steps * i32::from(run.dx);
        let end_y = i32::from(run.y) + steps * i32::from(run.dy);
        let in_x = |v: i32| (0..i32::from(self.width)).contains(&v);
        let in_y = |v: i32| (0..i32::from(self.height)).contains(&v);
        if !(in_x(i32::from(run.x)) && in_x(end_x) && in_y(i32::from(run.y)) && in_y(end_y)) {
            return Err(BlinkchainError::Range(
                "Pixels must all be within the bounds of the canvas".into(),
            ));
        }

        let (mut x, mut y) = (i32::from(run.x), i32::from(run.y));
        for i in 0..run.count {
            // Endpoints are in bounds and the walk is a straight line.
            let idx = self.index(x as u16, y as u16);
            self.slots[idx] = Slot::Mapped {
                channel: run.channel,
                offset: run.offset + i,
            }
            .pack();
            x += i32::from(run.dx);
            y += i32::from(run.dy);
        }
        Ok(())
    }

    /// Number of cells wired to an LED.
    pub fn mapped_count(&self) -> usize {
        self.slots.iter().filter(|&&s| s != UNMAPPED_PACKED).count()
    }

    /// One diagnostic line per cell, row-major.
    pub fn dump(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.slots.len());
        for y in 0..self.height {
            for x in 0..self.width {
                match self.lookup(x, y) {
                    Slot::Unmapped => lines.push(format!("  [{x}][{y}]: [  -  ]")),
                    Slot::Mapped { channel, offset } => {
                        lines.push(format!("  [{x}][{y}]: [{channel}:{offset:5}]"))
                    }
                }
            }
        }
        lines
    }

    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

pub(crate) fn canvas_too_large(width: u16, height: u16) -> BlinkchainError {
    BlinkchainError::Range(format!("Canvas too large: {width}x{height}"))
}
