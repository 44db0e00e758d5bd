use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals;
use embassy_rp::spi::{self, Spi};
use embassy_time::Delay;
use rp_samples::Error;
use ssd1306_spi_async::hw::{CsHw, DcHw, DelayHw, ErrorHw, ResetHw, SpiHw};

use crate::DisplayP;

/// Defines the hardware to use for connecting to the display.
pub struct DisplayHw<'a> {
    cs: Output<'a>,
    dc: Output<'a>,
    reset: Output<'a>,
    delay: Delay,
}

impl DisplayHw<'_> {
    pub fn new(p: DisplayP) -> Self {
        // CS is active low, so start deselected. Reset is released until connect pulses it.
        let cs = Output::new(p.cs, Level::High);
        let dc = Output::new(p.dc, Level::Low);
        let reset = Output::new(p.reset, Level::High);

        Self {
            cs,
            dc,
            reset,
            delay: Delay,
        }
    }
}

impl ErrorHw for DisplayHw<'_> {
    type Error = Error;
}

impl<'a> SpiHw for DisplayHw<'a> {
    type Spi = Spi<'a, peripherals::SPI0, spi::Async>;
}

impl<'a> CsHw for DisplayHw<'a> {
    type Cs = Output<'a>;

    fn cs(&mut self) -> &mut Self::Cs {
        &mut self.cs
    }
}

impl<'a> DcHw for DisplayHw<'a> {
    type Dc = Output<'a>;

    fn dc(&mut self) -> &mut Self::Dc {
        &mut self.dc
    }
}

impl<'a> ResetHw for DisplayHw<'a> {
    type Reset = Output<'a>;

    fn reset(&mut self) -> &mut Self::Reset {
        &mut self.reset
    }
}

impl DelayHw for DisplayHw<'_> {
    type Delay = Delay;

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }
}
