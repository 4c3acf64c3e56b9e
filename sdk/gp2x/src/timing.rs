//! # Display Timing
//!
//! One-shot bring-up of the Display Pixel Controller for the 320×240 LCD.
//!
//! The timing words were captured from a running F100 and are used as-is on
//! both revisions. The F200 additionally needs its panel powered, reset and
//! its backlight switched on.
//!
//! Run [`configure_display`] once from a clean power state. Running it again
//! is not harmful to the registers but may glitch the panel.

use log::{debug, info};

use crate::{
    delay::Delay,
    regs::*,
};

/// Which GP2X the code is running on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HardwareRevision {
    F100,
    F200,
}

impl HardwareRevision {
    pub const fn from_is_f200(is_f200: bool) -> Self {
        if is_f200 { Self::F200 } else { Self::F100 }
    }

    pub const fn is_f200(self) -> bool {
        matches!(self, Self::F200)
    }
}

/// Panel size and the DPC timing words.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PanelTiming {
    pub width: u16,
    pub height: u16,
    /// `DISPCSETREG`: clock source and divider.
    pub clock_set: u16,
    /// `DPC_CLKCNTL`.
    pub clock_control: u16,
    /// `DPC_CNTL` data output format.
    pub output_format: u8,
    pub hsync_width: u16,
    pub hsync_start: u16,
    pub hsync_end: u16,
    pub data_enable: u16,
    pub vsync: u16,
    pub vsync_end: u16,
    pub polarity: [u16; 3],
    pub active: [u16; 3],
}

impl PanelTiming {
    pub const GP2X: PanelTiming = PanelTiming {
        width: 320,
        height: 240,
        clock_set: 0x5E00,
        clock_control: 0x0010,
        output_format: 2,
        hsync_width: 0x041D,
        hsync_start: 0x0009,
        hsync_end: 0x0009,
        data_enable: 0x0250,
        vsync: 0x0403,
        vsync_end: 0x0816,
        polarity: [0x0010, 0xFFFF, 0x00FF],
        active: [0xFFFF, 0xFFFF, 0xFFFF],
    };
}

/// Program the panel timing with [`PanelTiming::GP2X`] and enable output.
/// On the F200 this also runs the panel reset and turns on the backlight.
pub fn configure_display<B: RegisterBus, D: Delay>(bus: &mut B, delay: &mut D, revision: HardwareRevision) {
    configure_panel(bus, delay, revision, &PanelTiming::GP2X);
}

pub fn configure_panel<B: RegisterBus, D: Delay>(
    bus: &mut B,
    delay: &mut D,
    revision: HardwareRevision,
    timing: &PanelTiming,
) {
    info!("display: configuring {}x{} panel ({:?})", timing.width, timing.height, revision);

    bus.write16(DISPCSETREG, timing.clock_set);

    let mut cntl = DpcControl(0);
    cntl.set_dof(timing.output_format);
    bus.write16(DPC_CNTL, cntl.0);
    bus.write16(DPC_CLKCNTL, timing.clock_control);

    // inclusive maxima
    bus.write16(DPC_X_MAX, timing.width - 1);
    bus.write16(DPC_Y_MAX, timing.height - 1);

    bus.write16(DPC_HS_WIDTH, timing.hsync_width);
    bus.write16(DPC_HS_END, timing.hsync_end);
    bus.write16(DPC_HS_STR, timing.hsync_start);
    bus.write16(DPC_DE, timing.data_enable);
    bus.write16(DPC_V_SYNC, timing.vsync);
    bus.write16(DPC_V_END, timing.vsync_end);

    for (offset, value) in [DPC_FPIPOL1, DPC_FPIPOL2, DPC_FPIPOL3].into_iter().zip(timing.polarity) {
        bus.write16(offset, value);
    }
    for (offset, value) in [DPC_FPIATV1, DPC_FPIATV2, DPC_FPIATV3].into_iter().zip(timing.active) {
        bus.write16(offset, value);
    }

    // Output enable must come after every timing register.
    bus.modify16(DPC_CNTL, |v| {
        let mut cntl = DpcControl(v);
        cntl.set_enb(true);
        cntl.0
    });
    debug!("display: output enabled");

    if revision.is_f200() {
        reset_f200_panel(bus, delay);
    }
}

fn reset_f200_panel<B: RegisterBus, D: Delay>(bus: &mut B, delay: &mut D) {
    debug!("display: F200 panel reset");
    bus.modify16(GPIOFOUT, |v| (GpioF::from_bits_retain(v) | GpioF::PANEL_POWER).bits());

    delay.delay(20);
    bus.modify16(GPIOBOUT, |v| (GpioB::from_bits_retain(v) | GpioB::LCD_RESET).bits());
    delay.delay(50);
    bus.modify16(GPIOBOUT, |v| (GpioB::from_bits_retain(v) - GpioB::LCD_RESET).bits());
    delay.delay(50);
    bus.modify16(GPIOBOUT, |v| (GpioB::from_bits_retain(v) | GpioB::LCD_RESET).bits());

    bus.modify16(GPIOLOUT, |v| (GpioL::from_bits_retain(v) | GpioL::BACKLIGHT).bits());
    debug!("display: backlight on");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Mmsp2Sim, RecordingDelay};

    const TIMING_WRITES: [(u16, u16); 18] = [
        (DISPCSETREG, 0x5E00),
        (DPC_CNTL, 0x0004),
        (DPC_CLKCNTL, 0x0010),
        (DPC_X_MAX, 319),
        (DPC_Y_MAX, 239),
        (DPC_HS_WIDTH, 0x041D),
        (DPC_HS_END, 0x0009),
        (DPC_HS_STR, 0x0009),
        (DPC_DE, 0x0250),
        (DPC_V_SYNC, 0x0403),
        (DPC_V_END, 0x0816),
        (DPC_FPIPOL1, 0x0010),
        (DPC_FPIPOL2, 0xFFFF),
        (DPC_FPIPOL3, 0x00FF),
        (DPC_FPIATV1, 0xFFFF),
        (DPC_FPIATV2, 0xFFFF),
        (DPC_FPIATV3, 0xFFFF),
        (DPC_CNTL, 0x0005),
    ];

    fn writes(sim: &Mmsp2Sim) -> Vec<(u16, u16)> {
        sim.writes().iter().map(|w| (w.offset, w.value)).collect()
    }

    #[test]
    fn f100_writes_timing_then_enables_output() {
        let mut sim = Mmsp2Sim::new();
        let mut delay = RecordingDelay::default();
        configure_display(&mut sim, &mut delay, HardwareRevision::F100);

        assert_eq!(writes(&sim), TIMING_WRITES);
        assert!(delay.calls().is_empty());
        assert_eq!(sim.reg(GPIOLOUT), 0);
    }

    #[test]
    fn f200_pulses_reset_after_enable() {
        let mut sim = Mmsp2Sim::new();
        sim.set_reg(GPIOBOUT, 0x0001);
        let mut delay = RecordingDelay::default();
        configure_display(&mut sim, &mut delay, HardwareRevision::from_is_f200(true));

        let all = writes(&sim);
        assert_eq!(all[..18], TIMING_WRITES);
        assert_eq!(
            all[18..],
            [
                (GPIOFOUT, 0x000C),
                (GPIOBOUT, 0x0801),
                (GPIOBOUT, 0x0001),
                (GPIOBOUT, 0x0801),
                (GPIOLOUT, 0x0800),
            ]
        );
        assert_eq!(delay.calls(), [20, 50, 50]);
    }
}
