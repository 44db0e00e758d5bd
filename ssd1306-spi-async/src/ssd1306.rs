use embedded_graphics::prelude::Size;
use embedded_hal::{
    digital::{ErrorType as PinErrorType, OutputPin as _},
    spi::{ErrorType as SpiErrorType, Phase, Polarity},
};
use embedded_hal_async::delay::DelayNs as _;

use crate::{
    dirty::PageRegion,
    hw::{CsHw, DcHw, DelayHw, ErrorHw, ResetHw, SpiHw},
    log::debug,
    transfer::Transfer,
    Connect, Display,
};

/// The controller datasheet allows a 100ns clock cycle; this leaves some margin.
pub const RECOMMENDED_SPI_HZ: u32 = 8_000_000; // 8 MHz
/// Use this phase in conjunction with [RECOMMENDED_SPI_POLARITY] (SPI mode 0) so that the
/// controller can capture data on the rising edge.
pub const RECOMMENDED_SPI_PHASE: Phase = Phase::CaptureOnFirstTransition;
/// Use this polarity in conjunction with [RECOMMENDED_SPI_PHASE] (SPI mode 0) so that the
/// controller can capture data on the rising edge.
pub const RECOMMENDED_SPI_POLARITY: Polarity = Polarity::IdleLow;
/// How long reset is held high before the pulse starts.
pub const RESET_SETTLE_MS: u32 = 1;
/// How long reset is held low. The datasheet asks for at least 3us; this is generous.
pub const RESET_HOLD_MS: u32 = 10;

/// The length of a framebuffer for [Geometry::Size128x64].
pub const BUFFER_LENGTH_128X64: usize = Geometry::Size128x64.buffer_length();
/// The length of a framebuffer for [Geometry::Size128x32].
pub const BUFFER_LENGTH_128X32: usize = Geometry::Size128x32.buffer_length();

/// Supported panel sizes. Both have a whole number of 8 pixel pages.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// 128 columns, 8 pages.
    Size128x64,
    /// 128 columns, 4 pages.
    Size128x32,
}

impl Geometry {
    pub const fn width(&self) -> u32 {
        128
    }

    pub const fn height(&self) -> u32 {
        match self {
            Geometry::Size128x64 => 64,
            Geometry::Size128x32 => 32,
        }
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Number of columns, i.e. bytes per page.
    pub const fn columns(&self) -> usize {
        self.width() as usize
    }

    /// Number of 8 pixel pages.
    pub const fn pages(&self) -> usize {
        self.height() as usize / 8
    }

    pub const fn last_column(&self) -> u8 {
        (self.columns() - 1) as u8
    }

    pub const fn last_page(&self) -> u8 {
        match self {
            Geometry::Size128x64 => 7,
            Geometry::Size128x32 => 3,
        }
    }

    /// The framebuffer length in bytes.
    pub const fn buffer_length(&self) -> usize {
        self.columns() * self.pages()
    }
}

/// Controller commands used by this driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Sets the start and end column (inclusive) for horizontal addressing. Followed by two
    /// command bytes: start, end.
    ColumnAddress = 0x21,
    /// Sets the start and end page (inclusive) for horizontal addressing. Followed by two command
    /// bytes: start, end.
    PageAddress = 0x22,
}

impl Command {
    /// Returns the register address for this command.
    pub(crate) fn register(&self) -> u8 {
        *self as u8
    }
}

/// Drives an SSD1306 OLED controller over 4-wire SPI (with a separate reset line).
///
/// * [datasheet](https://cdn-shop.adafruit.com/datasheets/SSD1306.pdf)
///
/// `T` decides how framebuffers are sent, see [crate::transfer]. The display must be connected
/// with [crate::Connect::connect] before anything can be displayed.
pub struct Ssd1306Spi<HW, T, STATE> {
    hw: HW,
    geometry: Geometry,
    transfer: T,
    state: STATE,
}

trait StateInternal {}
#[allow(private_bounds)]
pub trait State: StateInternal {}

macro_rules! impl_base_state {
    ($state:ident) => {
        impl StateInternal for $state {}
        impl State for $state {}
    };
}

/// The lines and controller are in an unknown state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateUninitialized();
impl_base_state!(StateUninitialized);

/// The controller has been reset and the lines are idle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateConnected();
impl_base_state!(StateConnected);

impl<HW, T> Ssd1306Spi<HW, T, StateUninitialized>
where
    HW: CsHw + DcHw + ResetHw + DelayHw + SpiHw + ErrorHw,
    T: Transfer,
{
    /// Creates a driver for a display of the given `geometry`, sending frames with `transfer`.
    ///
    /// ```
    /// # fn check<HW: ssd1306_spi_async::hw::CsHw + ssd1306_spi_async::hw::DcHw
    /// #     + ssd1306_spi_async::hw::ResetHw + ssd1306_spi_async::hw::DelayHw
    /// #     + ssd1306_spi_async::hw::SpiHw + ssd1306_spi_async::hw::ErrorHw>(hw: HW) {
    /// use ssd1306_spi_async::ssd1306::{Geometry, Ssd1306Spi, BUFFER_LENGTH_128X64};
    /// use ssd1306_spi_async::transfer::ChangeTracked;
    ///
    /// let display = Ssd1306Spi::new(
    ///     hw,
    ///     Geometry::Size128x64,
    ///     ChangeTracked::<BUFFER_LENGTH_128X64>::new(),
    /// );
    /// # }
    /// ```
    pub fn new(hw: HW, geometry: Geometry, transfer: T) -> Self {
        Ssd1306Spi {
            hw,
            geometry,
            transfer,
            state: StateUninitialized(),
        }
    }
}

impl<HW, T, STATE> Ssd1306Spi<HW, T, STATE>
where
    STATE: State,
{
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Borrows the transfer strategy, e.g. to inspect a shadow buffer.
    pub fn transfer(&self) -> &T {
        &self.transfer
    }

    /// Consumes the driver and returns the hardware and transfer strategy.
    pub fn release(self) -> (HW, T) {
        (self.hw, self.transfer)
    }
}

async fn reset_impl<HW>(hw: &mut HW) -> Result<(), HW::Error>
where
    HW: CsHw + DcHw + ResetHw + DelayHw + ErrorHw,
    HW::Error: From<<HW::Cs as PinErrorType>::Error>
        + From<<HW::Dc as PinErrorType>::Error>
        + From<<HW::Reset as PinErrorType>::Error>,
{
    debug!("Resetting SSD1306");
    // Idle lines: deselected, command mode.
    hw.cs().set_high()?;
    hw.dc().set_low()?;

    hw.reset().set_high()?;
    hw.delay().delay_ms(RESET_SETTLE_MS).await;
    hw.reset().set_low()?;
    hw.delay().delay_ms(RESET_HOLD_MS).await;
    hw.reset().set_high()?;
    Ok(())
}

impl<HW, T, STATE> Connect<HW::Error> for Ssd1306Spi<HW, T, STATE>
where
    HW: CsHw + DcHw + ResetHw + DelayHw + ErrorHw,
    HW::Error: From<<HW::Cs as PinErrorType>::Error>
        + From<<HW::Dc as PinErrorType>::Error>
        + From<<HW::Reset as PinErrorType>::Error>,
    T: Transfer,
    STATE: State,
{
    type DisplayOut = Ssd1306Spi<HW, T, StateConnected>;

    async fn connect(mut self) -> Result<Self::DisplayOut, HW::Error> {
        reset_impl(&mut self.hw).await?;
        // Whatever was in the controller's RAM before the reset can't be trusted.
        self.transfer.invalidate();
        Ok(Ssd1306Spi {
            hw: self.hw,
            geometry: self.geometry,
            transfer: self.transfer,
            state: StateConnected(),
        })
    }
}

impl<HW, T> Ssd1306Spi<HW, T, StateConnected>
where
    T: Transfer,
{
    /// Makes the next [Display::display] send the whole frame, e.g. after the display was
    /// power-cycled behind the driver's back.
    pub fn invalidate(&mut self) {
        self.transfer.invalidate();
    }
}

impl<HW, T> Display<HW::Spi, HW::Error> for Ssd1306Spi<HW, T, StateConnected>
where
    HW: CsHw + DcHw + SpiHw + ErrorHw,
    HW::Error: From<<HW::Spi as SpiErrorType>::Error>
        + From<<HW::Cs as PinErrorType>::Error>
        + From<<HW::Dc as PinErrorType>::Error>,
    T: Transfer,
{
    async fn display(
        &mut self,
        spi: &mut HW::Spi,
        framebuffer: &[u8],
    ) -> Result<Option<PageRegion>, HW::Error> {
        self.transfer
            .transfer(&mut self.hw, spi, self.geometry, framebuffer)
            .await
    }
}
