//! # RGB Layer Compositor
//!
//! The MLC RGB layer has five regions. Each region has its own enable,
//! blend mode, alpha and (except region 5) position. The pixel format, the
//! scale factors, the framebuffer address, the colour key and the palette are
//! shared by all of them.
//!
//! [`Display`] owns the register bus and the one piece of state software has
//! to remember: the current pixel format, which the scale computation needs.
//! Everything else lives in the hardware registers.
//!
//! ## Ordering
//!
//! [`Display::set_pixel_format`] reprograms the scale registers for a full
//! 320×240 source. Select the format first, then any custom scale:
//!
//! ```ignore
//! display.set_pixel_format(PixelFormat::P8bpp);
//! display.set_scale(160, 120); // 2x upscale
//! ```
//!
//! ## Blending
//!
//! | Call | Effect |
//! |------|--------|
//! | [`set_no_blend`](Display::set_no_blend) | region is opaque |
//! | [`set_alpha_blend`](Display::set_alpha_blend) | 4-bit alpha, 0-15 |
//! | [`set_color_key_blend`](Display::set_color_key_blend) | pixels matching the global key are transparent |
//!
//! There is one colour key for the whole layer, see
//! [`set_global_color_key`](Display::set_global_color_key).

use bit_field::BitField;
use log::{debug, trace};

use crate::{
    delay::Delay,
    error::{Error, Result},
    regs::*,
    sync,
    timing::{self, HardwareRevision, PanelTiming},
};

/// Pixel format of the RGB layer. The discriminant is the BPP field value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    /// 4-bit palettized.
    P4bpp = 0,
    /// 8-bit palettized.
    P8bpp = 1,
    Rgb565 = 2,
    Rgb888 = 3,
}

impl PixelFormat {
    /// Line width in the units the `MLC_STL_HW` register expects.
    #[inline]
    pub const fn stride(self, src_width: u16) -> u16 {
        match self {
            PixelFormat::P4bpp => src_width / 2,
            PixelFormat::P8bpp => src_width,
            PixelFormat::Rgb565 => src_width.wrapping_mul(2),
            PixelFormat::Rgb888 => src_width.wrapping_mul(3),
        }
    }
}

impl TryFrom<u8> for PixelFormat {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(PixelFormat::P4bpp),
            1 => Ok(PixelFormat::P8bpp),
            2 => Ok(PixelFormat::Rgb565),
            3 => Ok(PixelFormat::Rgb888),
            _ => Err(Error::InvalidPixelFormat(value)),
        }
    }
}

/// How a region's pixels combine with the layers beneath it.
/// The discriminant is the `MLC_STL_MIXMUX` field value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum BlendMode {
    NoBlending = 0,
    ColorKey = 1,
    Alpha = 2,
}

impl TryFrom<u8> for BlendMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(BlendMode::NoBlending),
            1 => Ok(BlendMode::ColorKey),
            2 => Ok(BlendMode::Alpha),
            _ => Err(Error::InvalidBlendMode(value)),
        }
    }
}

/// An RGB layer region, 1 through 5.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Region(u8);

impl Region {
    pub const R1: Region = Region(1);
    pub const R2: Region = Region(2);
    pub const R3: Region = Region(3);
    pub const R4: Region = Region(4);
    pub const R5: Region = Region(5);

    /// Region 5 covers the whole panel and has no position registers.
    pub const FIXED: Region = Region::R5;

    pub const COUNT: u8 = 5;

    pub const fn new(index: u8) -> Result<Self> {
        if index >= 1 && index <= Self::COUNT {
            Ok(Region(index))
        } else {
            Err(Error::InvalidRegion(index))
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Region> {
        (1..=Self::COUNT).map(Region)
    }

    #[inline]
    pub(crate) const fn enable_bit(self) -> usize {
        (self.0 as usize - 1) * 2
    }

    #[inline]
    pub(crate) const fn overlay_bit(self) -> usize {
        (self.0 as usize - 1) + 2
    }

    #[inline]
    pub(crate) const fn mix_shift(self) -> usize {
        (self.0 as usize - 1) * 2
    }

    /// Alpha register and nibble shift. Regions 1-3 live in `ALPHAL` at
    /// `region*4`, regions 4-5 in `ALPHAH` at `(region-3)*4`.
    #[inline]
    pub const fn alpha_field(self) -> (u16, usize) {
        if self.0 <= 3 {
            (MLC_STL_ALPHAL, self.0 as usize * 4)
        } else {
            (MLC_STL_ALPHAH, (self.0 as usize - 3) * 4)
        }
    }

    /// Offset of the region's STX register, `None` for the fixed region.
    #[inline]
    pub const fn geometry_base(self) -> Option<u16> {
        if self.0 == Self::FIXED.0 {
            None
        } else {
            Some(MLC_STL1_STX + (self.0 as u16 - 1) * 8)
        }
    }
}

impl TryFrom<u8> for Region {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Region::new(value)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Scale register values derived from a source size and pixel format.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct ScaleFactors {
    /// `MLC_STL_HSC`, 1024 = 1:1.
    pub horizontal: u16,
    /// `MLC_STL_VSCL`/`VSCH`.
    pub vertical: u32,
    /// `MLC_STL_HW`.
    pub stride: u16,
}

impl ScaleFactors {
    /// A zero source width or height turns scaling off on that axis.
    ///
    /// The vertical factor is computed from the horizontal stride, not the
    /// source height alone. That is what the hardware expects.
    pub fn compute(format: PixelFormat, src_width: u16, src_height: u16) -> Self {
        let stride = format.stride(src_width);

        let horizontal = if src_width == 0 {
            0
        } else {
            (src_width as u32 * 1024 / PanelTiming::GP2X.width as u32) as u16
        };

        let vertical = if src_height == 0 {
            0
        } else {
            src_height as u32 * stride as u32 / PanelTiming::GP2X.height as u32
        };

        Self {
            horizontal,
            vertical,
            stride,
        }
    }
}

/// The display pipeline: panel timing, the RGB layer and the sync pins.
///
/// # Example
///
/// ```ignore
/// let mut display = Display::new(unsafe { Mmsp2Io::new() });
/// display.configure(&mut SpinDelay, HardwareRevision::F100);
/// display.set_pixel_format(PixelFormat::Rgb565);
/// display.set_framebuffer(0x0100_0000);
/// display.set_region_enabled(Region::R1, true);
/// ```
pub struct Display<B: RegisterBus> {
    bus: B,
    format: PixelFormat,
    scale: ScaleFactors,
}

impl<B: RegisterBus> Display<B> {
    /// Wrap a bus. Nothing is written until the first operation.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            format: PixelFormat::P4bpp,
            scale: ScaleFactors::default(),
        }
    }

    /// Bring up the panel. Call once after power-on, before touching any
    /// region.
    pub fn configure<D: Delay>(&mut self, delay: &mut D, revision: HardwareRevision) {
        timing::configure_display(&mut self.bus, delay, revision);
    }

    #[inline]
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Scale factors last written by [`set_scale`](Self::set_scale) or
    /// [`set_pixel_format`](Self::set_pixel_format).
    #[inline]
    pub fn scale_factors(&self) -> ScaleFactors {
        self.scale
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Select the RGB layer pixel format.
    ///
    /// Also reprograms the scale registers for a 320×240 source, discarding
    /// any custom scale.
    pub fn set_pixel_format(&mut self, format: PixelFormat) {
        debug!("mlc: pixel format {:?}", format);
        self.format = format;

        let mut cntl = StlControl(self.bus.read16(MLC_STL_CNTL));
        cntl.set_bpp(0);
        self.bus.write16(MLC_STL_CNTL, cntl.0);
        cntl.set_bpp(format as u8);
        self.bus.write16(MLC_STL_CNTL, cntl.0);

        let panel = PanelTiming::GP2X;
        self.set_scale(panel.width, panel.height);
    }

    /// Turn a region on or off. The layer enable and the overlay enable are
    /// always written together.
    pub fn set_region_enabled(&mut self, region: Region, on: bool) {
        debug!("mlc: region {} {}", region.index(), if on { "on" } else { "off" });

        let mut cntl = StlControl(self.bus.read16(MLC_STL_CNTL));
        cntl.set_region_enabled(region, on);

        let mut overlay = OverlayControl::from_bits_retain(self.bus.read16(MLC_OVLAY_CNTR));
        overlay.set(OverlayControl::for_region(region), on);

        self.bus.write16(MLC_STL_CNTL, cntl.0);
        self.bus.write16(MLC_OVLAY_CNTR, overlay.bits());
    }

    /// Whether both enable bits of `region` are set.
    pub fn is_region_enabled(&mut self, region: Region) -> bool {
        let cntl = StlControl(self.bus.read16(MLC_STL_CNTL));
        let overlay = OverlayControl::from_bits_retain(self.bus.read16(MLC_OVLAY_CNTR));
        cntl.region_enabled(region) && overlay.contains(OverlayControl::for_region(region))
    }

    /// Select which blend mechanism is active. Alpha and colour key values
    /// are left as they are.
    pub fn set_blend_mode(&mut self, region: Region, mode: BlendMode) {
        trace!("mlc: region {} blend {:?}", region.index(), mode);
        let mut mix = MixControl(self.bus.read16(MLC_STL_MIXMUX));
        mix.set_mode(region, mode);
        self.bus.write16(MLC_STL_MIXMUX, mix.0);
    }

    /// Write a region's 4-bit alpha. Values above 15 are masked, not
    /// rejected.
    pub fn set_alpha(&mut self, region: Region, alpha: u8) {
        let (offset, shift) = region.alpha_field();
        let mut reg = AlphaControl(self.bus.read16(offset));
        reg.set_nibble(shift, alpha);
        self.bus.write16(offset, reg.0);
    }

    pub fn set_alpha_blend(&mut self, region: Region, alpha: u8) {
        self.set_blend_mode(region, BlendMode::Alpha);
        self.set_alpha(region, alpha);
    }

    /// Alpha goes to 15 before the mode switch; some revisions latch a stale
    /// alpha otherwise.
    pub fn set_color_key_blend(&mut self, region: Region) {
        self.set_alpha(region, 15);
        self.set_blend_mode(region, BlendMode::ColorKey);
    }

    pub fn set_no_blend(&mut self, region: Region) {
        self.set_blend_mode(region, BlendMode::NoBlending);
    }

    /// The one colour key shared by every colour-key-blended region.
    pub fn set_global_color_key(&mut self, key: Rgb) {
        let mut gr = 0u16;
        gr.set_bits(0..8, key.r as u16);
        gr.set_bits(8..16, key.g as u16);
        self.bus.write16(MLC_STL_CKEY_GR, gr);
        self.bus.write16(MLC_STL_CKEY_B, key.b as u16);
    }

    /// Position a region on the panel. End coordinates are inclusive.
    ///
    /// Region 5 cannot be moved; the call is ignored for it.
    pub fn set_region_geometry(&mut self, region: Region, x: u16, y: u16, width: u16, height: u16) {
        let Some(base) = region.geometry_base() else {
            debug!("mlc: region {} is fixed, geometry ignored", region.index());
            return;
        };

        self.bus.write16(base, x);
        self.bus.write16(base + 2, x.wrapping_add(width).wrapping_sub(1));
        self.bus.write16(base + 4, y);
        self.bus.write16(base + 6, y.wrapping_add(height).wrapping_sub(1));
    }

    /// Scale a `src_width`×`src_height` source to the panel. Zero on an axis
    /// disables scaling on that axis.
    pub fn set_scale(&mut self, src_width: u16, src_height: u16) -> ScaleFactors {
        let scale = ScaleFactors::compute(self.format, src_width, src_height);
        debug!(
            "mlc: scale {}x{} -> hsc {} vsc {} hw {}",
            src_width, src_height, scale.horizontal, scale.vertical, scale.stride
        );

        self.bus.write16(MLC_STL_HSC, scale.horizontal);
        self.bus.write16(MLC_STL_VSCL, scale.vertical.get_bits(0..16) as u16);
        self.bus.write16(MLC_STL_VSCH, scale.vertical.get_bits(16..32) as u16);
        self.bus.write16(MLC_STL_HW, scale.stride);

        self.scale = scale;
        scale
    }

    /// Point the layer at a framebuffer. Odd and even field addresses are set
    /// to the same buffer.
    pub fn set_framebuffer(&mut self, address: u32) {
        trace!("mlc: framebuffer {:#010x}", address);
        let lo = address.get_bits(0..16) as u16;
        let hi = address.get_bits(16..32) as u16;
        self.bus.write16(MLC_STL_OADRL, lo);
        self.bus.write16(MLC_STL_OADRH, hi);
        self.bus.write16(MLC_STL_EADRL, lo);
        self.bus.write16(MLC_STL_EADRH, hi);
    }

    /// Upload `colours` (`0xRRGGBB__`) so that palette entry
    /// `start_index + i` ends up as `colours[i]`.
    pub fn set_palette(&mut self, colours: &[u32], start_index: u8) {
        debug!("mlc: palette {} entries at {}", colours.len(), start_index);
        self.bus.write16(MLC_STL_PALLT_A, start_index as u16 * 2);

        // The data port auto-increments and each finished entry is shifted in
        // at the write pointer, so the last colour goes first. Uploading front
        // to back would leave the palette reversed.
        for &colour in colours.iter().rev() {
            self.bus.write16(MLC_STL_PALLT_D, colour.get_bits(8..24) as u16); // G8B8
            self.bus.write16(MLC_STL_PALLT_D, colour.get_bits(24..32) as u16); // R8
        }
    }

    /// [`set_palette`](Self::set_palette) with an explicit entry count,
    /// clamped to the slice length.
    pub fn set_palette_count(&mut self, colours: &[u32], count: usize, start_index: u8) {
        let count = count.min(colours.len());
        self.set_palette(&colours[..count], start_index);
    }

    #[inline]
    pub fn is_vsync_active(&mut self) -> bool {
        sync::is_vsync_active(&mut self.bus)
    }

    #[inline]
    pub fn is_hsync_active(&mut self) -> bool {
        sync::is_hsync_active(&mut self.bus)
    }

    pub fn wait_for_next_vsync(&mut self) {
        sync::wait_for_next_vsync(&mut self.bus)
    }

    pub fn wait_for_next_hsync(&mut self) {
        sync::wait_for_next_hsync(&mut self.bus)
    }

    /// Wait for the next vsync edge, then bind `address`.
    pub fn present(&mut self, address: u32) {
        self.wait_for_next_vsync();
        self.set_framebuffer(address);
    }
}
