//! # Register Model
//!
//! A host-side stand-in for the MMSP2 I/O block, enough to run the display
//! driver off-device. Registers are plain storage, except:
//!
//! - `GPIOBPINLVL` reads come from a script of pin levels when one is queued,
//!   so sync waits can be driven edge by edge.
//! - `MLC_STL_PALLT_A`/`PALLT_D` drive a model of the palette RAM.
//! - Every write is logged, in order.
//!
//! The palette port takes two half-words per entry (G8B8, then R8). Writing
//! `PALLT_A` sets the anchor entry; each completed entry is shifted in at the
//! anchor and pushes the entries already written in the same burst up by one
//! slot. A back-to-front upload therefore reads front-to-back.

use heapless::{Deque, Vec};
use log::warn;

use crate::{
    delay::Delay,
    regs::{GPIOBPINLVL, GpioB, MLC_STL_PALLT_A, MLC_STL_PALLT_D, RegisterBus},
};

const REG_COUNT: usize = 0x3000 / 2;
const WRITE_LOG: usize = 1024;
const LEVEL_SCRIPT: usize = 64;

/// One logged register write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Write {
    pub offset: u16,
    pub value: u16,
}

#[derive(Clone)]
pub struct Mmsp2Sim {
    regs: [u16; REG_COUNT],
    palette: [u32; 256],
    palette_anchor: u8,
    palette_burst: usize,
    palette_gb: Option<u16>,
    levels: Deque<u16, LEVEL_SCRIPT>,
    pin_reads: usize,
    writes: Vec<Write, WRITE_LOG>,
}

impl Default for Mmsp2Sim {
    fn default() -> Self {
        Self::new()
    }
}

impl Mmsp2Sim {
    /// All registers and palette entries zero, as after reset.
    pub fn new() -> Self {
        Self {
            regs: [0; REG_COUNT],
            palette: [0; 256],
            palette_anchor: 0,
            palette_burst: 0,
            palette_gb: None,
            levels: Deque::new(),
            pin_reads: 0,
            writes: Vec::new(),
        }
    }

    /// Current register value, without side effects.
    pub fn reg(&self, offset: u16) -> u16 {
        self.regs.get(offset as usize / 2).copied().unwrap_or(0)
    }

    /// Preload a register without logging a write.
    pub fn set_reg(&mut self, offset: u16, value: u16) {
        if let Some(slot) = self.regs.get_mut(offset as usize / 2) {
            *slot = value;
        }
    }

    /// Palette RAM, `0xRRGGBB00` per entry.
    pub fn palette(&self) -> &[u32; 256] {
        &self.palette
    }

    /// Writes in the order they happened. Writes past the log capacity are
    /// applied but not logged.
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Same register file and palette; the write log is not compared.
    pub fn registers_eq(&self, other: &Mmsp2Sim) -> bool {
        self.regs == other.regs && self.palette == other.palette
    }

    /// Queue vsync levels for the next `GPIOBPINLVL` reads.
    pub fn script_vsync(&mut self, levels: &[bool]) {
        self.script(GpioB::VSYNC, levels);
    }

    /// Queue hsync levels for the next `GPIOBPINLVL` reads.
    pub fn script_hsync(&mut self, levels: &[bool]) {
        self.script(GpioB::HSYNC, levels);
    }

    fn script(&mut self, pin: GpioB, levels: &[bool]) {
        for &high in levels {
            let value = if high { pin.bits() } else { 0 };
            if self.levels.push_back(value).is_err() {
                warn!("sim: pin level script full, dropping levels");
                break;
            }
        }
    }

    /// Scripted levels not yet read.
    pub fn pending_levels(&self) -> usize {
        self.levels.len()
    }

    /// Number of `GPIOBPINLVL` reads so far.
    pub fn pin_reads(&self) -> usize {
        self.pin_reads
    }

    fn palette_write(&mut self, offset: u16, value: u16) {
        match offset {
            MLC_STL_PALLT_A => {
                self.palette_anchor = (value / 2) as u8;
                self.palette_burst = 0;
                self.palette_gb = None;
            }
            _ => match self.palette_gb.take() {
                None => self.palette_gb = Some(value),
                Some(gb) => {
                    let entry = ((value as u32 & 0xFF) << 24) | ((gb as u32) << 8);
                    let anchor = self.palette_anchor as usize;
                    let burst = self.palette_burst.min(255);
                    for k in (1..=burst).rev() {
                        self.palette[(anchor + k) % 256] = self.palette[(anchor + k - 1) % 256];
                    }
                    self.palette[anchor] = entry;
                    self.palette_burst += 1;
                }
            },
        }
    }
}

impl RegisterBus for Mmsp2Sim {
    fn read16(&mut self, offset: u16) -> u16 {
        if offset == GPIOBPINLVL {
            self.pin_reads += 1;
            if let Some(level) = self.levels.pop_front() {
                return level;
            }
        }
        if offset as usize / 2 >= REG_COUNT {
            warn!("sim: read outside the display block at ${:04X}", offset);
        }
        self.reg(offset)
    }

    fn write16(&mut self, offset: u16, value: u16) {
        if offset as usize / 2 >= REG_COUNT {
            warn!("sim: write outside the display block at ${:04X}", offset);
            return;
        }

        let _ = self.writes.push(Write { offset, value });
        self.regs[offset as usize / 2] = value;

        if offset == MLC_STL_PALLT_A || offset == MLC_STL_PALLT_D {
            self.palette_write(offset, value);
        }
    }
}

/// A [`Delay`] that returns immediately and remembers what it was asked for.
#[derive(Debug, Default, Clone)]
pub struct RecordingDelay {
    calls: Vec<u32, 16>,
}

impl RecordingDelay {
    pub fn calls(&self) -> &[u32] {
        &self.calls
    }
}

impl Delay for RecordingDelay {
    fn delay(&mut self, loops: u32) {
        let _ = self.calls.push(loops);
    }
}
