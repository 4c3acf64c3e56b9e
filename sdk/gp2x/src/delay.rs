/// A busy-wait of roughly `loops` timing units.
///
/// Only the F200 panel reset sequence needs one.
pub trait Delay {
    fn delay(&mut self, loops: u32);
}

/// Spins the CPU. Each loop is a handful of cycles; the reset sequence only
/// needs a lower bound.
#[derive(Debug, Default, Copy, Clone)]
pub struct SpinDelay;

impl Delay for SpinDelay {
    #[inline(never)]
    fn delay(&mut self, loops: u32) {
        for _ in 0..loops {
            core::hint::spin_loop();
        }
    }
}

impl<D: Delay + ?Sized> Delay for &mut D {
    #[inline(always)]
    fn delay(&mut self, loops: u32) {
        (**self).delay(loops)
    }
}
