//! # GP2X display HAL
//!
//! Register-level driver for the display pipeline of the GP2X handheld
//! (MMSP2 SoC): the Display Pixel Controller that drives the 320×240 panel,
//! and the Mixed Layer Controller (MLC) RGB layer, which composites up to five
//! regions onto the output frame.
//!
//! ## Quick Start
//!
//! ```ignore
//! use gp2x::{Display, HardwareRevision, PixelFormat, Region, delay::SpinDelay, regs::Mmsp2Io};
//!
//! let mut display = Display::new(unsafe { Mmsp2Io::new() });
//! display.configure(&mut SpinDelay, HardwareRevision::from_is_f200(is_f200));
//!
//! // Format first: it resets the scale registers.
//! display.set_pixel_format(PixelFormat::Rgb565);
//! display.set_framebuffer(FRAMEBUFFER_ADDR);
//! display.set_region_enabled(Region::R1, true);
//!
//! loop {
//!     draw_next_frame();
//!     display.present(FRAMEBUFFER_ADDR); // waits for vsync, then binds
//! }
//! ```
//!
//! ## Hardware Overview
//!
//! | Feature | Value |
//! |---------|-------|
//! | Panel | 320×240 |
//! | RGB regions | 5 (region 5 is fixed full-screen) |
//! | Pixel formats | 4bpp / 8bpp palettized, RGB565, RGB888 |
//! | Blending | none, 4-bit alpha, one global colour key |
//! | Sync | vsync/hsync polled on GPIOB pins 4 and 5 |
//!
//! Nothing here is synchronized internally. Every operation takes
//! `&mut Display`; if the display has to be shared between threads, put the
//! whole `Display` behind one lock.

#![cfg_attr(not(test), no_std)]

pub mod delay;
pub mod error;
pub mod mlc;
pub mod regs;
pub mod sync;
pub mod timing;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use error::{Error, Result};
pub use mlc::{BlendMode, Display, PixelFormat, Region, Rgb, ScaleFactors};
pub use timing::{HardwareRevision, PanelTiming};
