//! # Register Access
//!
//! Everything the display code touches is a 16-bit register in the MMSP2
//! I/O block at `0xC000_0000`. Registers are named by their byte offset from
//! that base, and all access goes through [`RegisterBus`] so the same driver
//! code runs against the real hardware ([`Mmsp2Io`]) or a host-side model.
//!
//! | Block | Range | Contents |
//! |-------|-------|----------|
//! | Clock | `$0924` | display clock source/divider |
//! | GPIO  | `$1060-$1182` | panel reset, backlight, sync pin levels |
//! | DPC   | `$2800-$2848` | panel timing |
//! | MLC   | `$2880-$295A` | RGB layer compositor |
//!
//! The packed registers get typed accessors below. Field positions are fixed
//! by the hardware.

use bit_field::BitField;
use bitfield::bitfield;
use volatile_register::RW;

use crate::mlc::{BlendMode, Region};

/// Physical base of the MMSP2 I/O register block.
pub const IO_BASE: usize = 0xC000_0000;

// Clock
pub const DISPCSETREG: u16 = 0x0924;

// GPIO outputs and pin levels
pub const GPIOBOUT: u16 = 0x1062;
pub const GPIOFOUT: u16 = 0x106A;
pub const GPIOLOUT: u16 = 0x1076;
pub const GPIOBPINLVL: u16 = 0x1182;

// Display Pixel Controller
pub const DPC_CNTL: u16 = 0x2800;
pub const DPC_FPIPOL1: u16 = 0x2804;
pub const DPC_FPIPOL2: u16 = 0x2806;
pub const DPC_FPIPOL3: u16 = 0x2808;
pub const DPC_FPIATV1: u16 = 0x280A;
pub const DPC_FPIATV2: u16 = 0x280C;
pub const DPC_FPIATV3: u16 = 0x280E;
pub const DPC_X_MAX: u16 = 0x2816;
pub const DPC_Y_MAX: u16 = 0x2818;
pub const DPC_HS_WIDTH: u16 = 0x281A;
pub const DPC_HS_STR: u16 = 0x281C;
pub const DPC_HS_END: u16 = 0x281E;
pub const DPC_V_SYNC: u16 = 0x2820;
pub const DPC_V_END: u16 = 0x2822;
pub const DPC_DE: u16 = 0x2826;
pub const DPC_CLKCNTL: u16 = 0x2848;

// Mixed Layer Controller, RGB layer
pub const MLC_OVLAY_CNTR: u16 = 0x2880;
pub const MLC_STL_CNTL: u16 = 0x28DA;
pub const MLC_STL_MIXMUX: u16 = 0x28DC;
pub const MLC_STL_ALPHAL: u16 = 0x28DE;
pub const MLC_STL_ALPHAH: u16 = 0x28E0;
/// First of four half-words (STX, ENDX, STY, ENDY) per movable region,
/// 8 bytes apart. Region 5 has none.
pub const MLC_STL1_STX: u16 = 0x28E2;
pub const MLC_STL_CKEY_GR: u16 = 0x2902;
pub const MLC_STL_CKEY_B: u16 = 0x2904;
pub const MLC_STL_HSC: u16 = 0x2906;
pub const MLC_STL_VSCL: u16 = 0x2908;
pub const MLC_STL_VSCH: u16 = 0x290A;
pub const MLC_STL_HW: u16 = 0x290C;
pub const MLC_STL_OADRL: u16 = 0x290E;
pub const MLC_STL_OADRH: u16 = 0x2910;
pub const MLC_STL_EADRL: u16 = 0x2912;
pub const MLC_STL_EADRH: u16 = 0x2914;
pub const MLC_STL_PALLT_A: u16 = 0x2958;
pub const MLC_STL_PALLT_D: u16 = 0x295A;

/// 16-bit access to the I/O block, addressed by byte offset.
pub trait RegisterBus {
    fn read16(&mut self, offset: u16) -> u16;

    fn write16(&mut self, offset: u16, value: u16);

    /// Read-modify-write.
    #[inline(always)]
    fn modify16<F: FnOnce(u16) -> u16>(&mut self, offset: u16, f: F) {
        let value = self.read16(offset);
        self.write16(offset, f(value));
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    #[inline(always)]
    fn read16(&mut self, offset: u16) -> u16 {
        (**self).read16(offset)
    }

    #[inline(always)]
    fn write16(&mut self, offset: u16, value: u16) {
        (**self).write16(offset, value)
    }
}

/// The real register block, accessed with volatile loads and stores.
pub struct Mmsp2Io {
    base: usize,
}

impl Mmsp2Io {
    /// # Safety
    ///
    /// The MMSP2 I/O block must be mapped at [`IO_BASE`] and nothing else may
    /// be programming the display registers.
    pub unsafe fn new() -> Self {
        Self { base: IO_BASE }
    }

    #[inline(always)]
    fn reg(&self, offset: u16) -> &'static RW<u16> {
        unsafe { &*((self.base + offset as usize) as *const RW<u16>) }
    }
}

impl RegisterBus for Mmsp2Io {
    #[inline(always)]
    fn read16(&mut self, offset: u16) -> u16 {
        self.reg(offset).read()
    }

    #[inline(always)]
    fn write16(&mut self, offset: u16, value: u16) {
        unsafe { self.reg(offset).write(value) }
    }
}

bitfield! {
    /// `DPC_CNTL`: display pixel controller mode.
    ///
    /// The remaining mode bits (PAL, HDTV, INTERLACE, ...) stay zero for the
    /// GP2X LCD.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct DpcControl(u16);
    impl Debug;
    /// Output pipe enable.
    pub enb, set_enb: 0;
    /// Data output format.
    pub u8, dof, set_dof: 2, 1;
}

bitfield! {
    /// `MLC_STL_CNTL`: RGB layer control.
    ///
    /// Region enables sit at even bits `(region-1)*2`. The odd bits in
    /// [`StlControl::ACTIVATE`] are always written set.
    #[derive(Copy, Clone, PartialEq, Eq)]
    pub struct StlControl(u16);
    impl Debug;
    /// Pixel format, see [`PixelFormat`](crate::PixelFormat).
    pub u8, bpp, set_bpp: 10, 9;
}

impl StlControl {
    pub const ACTIVATE: u16 = 0x00AA;

    #[inline]
    pub fn region_enabled(&self, region: Region) -> bool {
        self.0.get_bit(region.enable_bit())
    }

    #[inline]
    pub fn set_region_enabled(&mut self, region: Region, on: bool) {
        self.0.set_bit(region.enable_bit(), on);
        self.0 |= Self::ACTIVATE;
    }
}

/// `MLC_STL_MIXMUX`: a 2-bit blend selector per region at `(region-1)*2`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MixControl(pub u16);

impl MixControl {
    #[inline]
    pub fn mode(&self, region: Region) -> u8 {
        let shift = region.mix_shift();
        self.0.get_bits(shift..shift + 2) as u8
    }

    #[inline]
    pub fn set_mode(&mut self, region: Region, mode: BlendMode) {
        let shift = region.mix_shift();
        self.0.set_bits(shift..shift + 2, mode as u16);
    }
}

/// One of the two alpha registers. Each region owns a 4-bit nibble, see
/// [`Region::alpha_field`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlphaControl(pub u16);

impl AlphaControl {
    #[inline]
    pub fn nibble(&self, shift: usize) -> u8 {
        self.0.get_bits(shift..shift + 4) as u8
    }

    #[inline]
    pub fn set_nibble(&mut self, shift: usize, alpha: u8) {
        self.0.set_bits(shift..shift + 4, (alpha & 0xF) as u16);
    }
}

bitflags::bitflags! {
    /// `MLC_OVLAY_CNTR`: overlay enables. RGB regions 1-5 use bits 2-6.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct OverlayControl: u16 {
        const STL1_ENABLE = 1 << 2;
        const STL2_ENABLE = 1 << 3;
        const STL3_ENABLE = 1 << 4;
        const STL4_ENABLE = 1 << 5;
        const STL5_ENABLE = 1 << 6;

        const _ = !0;
    }

    /// GPIO port B: panel reset output and the sync inputs.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct GpioB: u16 {
        const VSYNC     = 1 << 4;
        const HSYNC     = 1 << 5;
        const LCD_RESET = 1 << 11;

        const _ = !0;
    }

    /// GPIO port F: panel power rails (F200).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct GpioF: u16 {
        const PANEL_POWER = 0b1100;

        const _ = !0;
    }

    /// GPIO port L: backlight (F200).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct GpioL: u16 {
        const BACKLIGHT = 1 << 11;

        const _ = !0;
    }
}

impl OverlayControl {
    #[inline]
    pub fn for_region(region: Region) -> Self {
        Self::from_bits_retain(1 << region.overlay_bit())
    }
}
