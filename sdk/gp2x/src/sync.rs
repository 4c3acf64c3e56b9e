//! # Sync Primitives
//!
//! The panel's vsync and hsync lines are wired to GPIOB pins 4 and 5. There
//! is no interrupt; callers poll.
//!
//! The `wait_for_next_*` helpers always cross a full inactive→active edge.
//! Called in the middle of a pulse, they first wait for it to end, so the
//! caller never resumes inside the pulse it started in.
//!
//! ```ignore
//! loop {
//!     draw(back_buffer);
//!     display.wait_for_next_vsync();
//!     display.set_framebuffer(back_buffer);
//!     core::mem::swap(&mut front_buffer, &mut back_buffer);
//! }
//! ```
//!
//! There is no timeout. If the panel is not running these never return.

use log::trace;

use crate::regs::{GPIOBPINLVL, GpioB, RegisterBus};

#[inline(always)]
fn pin_active<B: RegisterBus>(bus: &mut B, pin: GpioB) -> bool {
    GpioB::from_bits_retain(bus.read16(GPIOBPINLVL)).intersects(pin)
}

fn wait_for_next_edge<B: RegisterBus>(bus: &mut B, pin: GpioB) {
    while pin_active(bus, pin) {
        core::hint::spin_loop();
    }
    while !pin_active(bus, pin) {
        core::hint::spin_loop();
    }
    trace!("sync: edge on {:?}", pin);
}

#[inline]
pub fn is_vsync_active<B: RegisterBus>(bus: &mut B) -> bool {
    pin_active(bus, GpioB::VSYNC)
}

#[inline]
pub fn is_hsync_active<B: RegisterBus>(bus: &mut B) -> bool {
    pin_active(bus, GpioB::HSYNC)
}

pub fn wait_for_next_vsync<B: RegisterBus>(bus: &mut B) {
    wait_for_next_edge(bus, GpioB::VSYNC)
}

pub fn wait_for_next_hsync<B: RegisterBus>(bus: &mut B) {
    wait_for_next_edge(bus, GpioB::HSYNC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Mmsp2Sim;

    #[test]
    fn poll_reads_the_right_pin() {
        let mut sim = Mmsp2Sim::new();
        sim.set_reg(GPIOBPINLVL, GpioB::VSYNC.bits());
        assert!(is_vsync_active(&mut sim));
        assert!(!is_hsync_active(&mut sim));

        sim.set_reg(GPIOBPINLVL, GpioB::HSYNC.bits());
        assert!(!is_vsync_active(&mut sim));
        assert!(is_hsync_active(&mut sim));
    }

    #[test]
    fn wait_while_already_active_crosses_a_full_pulse() {
        let mut sim = Mmsp2Sim::new();
        // high at call time, then low, then the next rising edge
        sim.script_vsync(&[true, true, true, false, false, true, true]);
        wait_for_next_vsync(&mut sim);

        // stops on the first high after the low run
        assert_eq!(sim.pending_levels(), 1);
        assert_eq!(sim.pin_reads(), 6);
    }

    #[test]
    fn wait_from_inactive_returns_on_first_rise() {
        let mut sim = Mmsp2Sim::new();
        sim.script_hsync(&[false, false, true]);
        wait_for_next_hsync(&mut sim);
        assert_eq!(sim.pending_levels(), 0);
        assert_eq!(sim.pin_reads(), 3);
    }
}
