use gp2x::{
    BlendMode, Display, Error, HardwareRevision, PixelFormat, Region, Rgb,
    regs::{self, MixControl, RegisterBus, StlControl},
    sim::{Mmsp2Sim, RecordingDelay},
};

fn configured(revision: HardwareRevision) -> Display<Mmsp2Sim> {
    let mut display = Display::new(Mmsp2Sim::new());
    display.configure(&mut RecordingDelay::default(), revision);
    display.bus_mut().clear_writes();
    display
}

#[test]
fn bring_up_then_layer_setup() {
    let mut display = configured(HardwareRevision::F100);
    assert_eq!(display.bus().reg(regs::DPC_CNTL) & 1, 1);

    display.set_pixel_format(PixelFormat::P8bpp);
    display.set_scale(160, 120);
    display.set_palette(&[0x0000_0000, 0xFFFF_FF00, 0xFF00_0000], 0);
    display.set_framebuffer(0x0300_0000);

    display.set_region_geometry(Region::R1, 0, 0, 320, 240);
    display.set_region_enabled(Region::R1, true);

    display.set_region_geometry(Region::R2, 8, 8, 64, 32);
    display.set_alpha_blend(Region::R2, 8);
    display.set_region_enabled(Region::R2, true);

    display.set_global_color_key(Rgb::new(0xFF, 0x00, 0xFF));
    display.set_color_key_blend(Region::R3);

    let sim = display.bus();
    let cntl = StlControl(sim.reg(regs::MLC_STL_CNTL));
    assert_eq!(cntl.bpp(), PixelFormat::P8bpp as u8);
    assert!(cntl.region_enabled(Region::R1));
    assert!(cntl.region_enabled(Region::R2));
    assert!(!cntl.region_enabled(Region::R3));

    assert_eq!(sim.reg(regs::MLC_STL_HSC), 512);
    assert_eq!(sim.reg(regs::MLC_STL_HW), 160);
    assert_eq!(sim.reg(regs::MLC_STL_VSCL), 80);

    let mix = MixControl(sim.reg(regs::MLC_STL_MIXMUX));
    assert_eq!(mix.mode(Region::R1), BlendMode::NoBlending as u8);
    assert_eq!(mix.mode(Region::R2), BlendMode::Alpha as u8);
    assert_eq!(mix.mode(Region::R3), BlendMode::ColorKey as u8);
    assert_eq!(sim.reg(regs::MLC_STL_ALPHAL), 0xF800);

    assert_eq!(&sim.palette()[..3], &[0x0000_0000, 0xFFFF_FF00, 0xFF00_0000]);
    assert_eq!(sim.reg(regs::MLC_STL1_STX + 8 + 2), 71);
}

#[test]
fn custom_scale_is_lost_on_format_change() {
    let mut display = configured(HardwareRevision::F200);
    display.set_pixel_format(PixelFormat::Rgb565);
    display.set_scale(160, 120);
    assert_eq!(display.bus().reg(regs::MLC_STL_HSC), 512);

    display.set_pixel_format(PixelFormat::Rgb565);
    assert_eq!(display.bus().reg(regs::MLC_STL_HSC), 1024);
    assert_eq!(display.bus().reg(regs::MLC_STL_HW), 640);
}

#[test]
fn raw_indices_are_checked_at_the_boundary() {
    let raw = [1u8, 5, 0, 9];
    let regions: Vec<_> = raw.iter().map(|&r| Region::new(r)).collect();
    assert_eq!(
        regions,
        [Ok(Region::R1), Ok(Region::R5), Err(Error::InvalidRegion(0)), Err(Error::InvalidRegion(9))]
    );

    let err = PixelFormat::try_from(7).unwrap_err();
    assert_eq!(err.to_string(), "pixel format 7 is not a valid 2-bit BPP value");
}

#[test]
fn frame_loop_swaps_on_vsync() {
    let mut display = configured(HardwareRevision::F100);
    let buffers = [0x0100_0000u32, 0x0101_2C00];

    for (frame, &buffer) in buffers.iter().cycle().take(4).enumerate() {
        // mid-pulse at the start of odd frames
        let high_first = frame % 2 == 1;
        display.bus_mut().script_vsync(&[high_first, false, true]);
        display.present(buffer);

        let sim = display.bus_mut();
        assert_eq!(sim.read16(regs::MLC_STL_OADRL), buffer as u16);
        assert_eq!(sim.read16(regs::MLC_STL_EADRH), (buffer >> 16) as u16);
    }
}
