use embedded_hal::{
    digital::{ErrorType as PinErrorType, OutputPin},
    spi::ErrorType as SpiErrorType,
};
use embedded_hal_async::{delay::DelayNs, spi::SpiBus};

use crate::log::trace;

/// Provides access to a shared error type.
///
/// Drivers rely on this trait to provide a single Error type that supports [From] conversions
/// from all the hardware-specific error types.
pub trait ErrorHw {
    type Error;
}

/// Describes the SPI bus used to talk to the display.
///
/// This is a raw bus rather than an `SpiDevice`, because the driver toggles chip-select itself
/// around every command byte.
pub trait SpiHw {
    type Spi: SpiBus;
}

/// Provides access to the Chip Select pin (active low).
pub trait CsHw {
    type Cs: OutputPin;

    fn cs(&mut self) -> &mut Self::Cs;
}

/// Provides access to the Data/Command pin (low for commands, high for data).
pub trait DcHw {
    type Dc: OutputPin;

    fn dc(&mut self) -> &mut Self::Dc;
}

/// Provides access to the Reset pin (active low).
pub trait ResetHw {
    type Reset: OutputPin;

    fn reset(&mut self) -> &mut Self::Reset;
}

/// Provides access to delay functionality for the reset pulse.
pub trait DelayHw {
    type Delay: DelayNs;

    fn delay(&mut self) -> &mut Self::Delay;
}

/// Holds chip-select low for as long as it lives.
///
/// Call [Selected::release] on the success path so a failure to deselect is reported. Any other
/// exit (an early `?`, or a dropped future) deselects in [Drop] and ignores the pin result.
pub(crate) struct Selected<'a, CS: OutputPin> {
    cs: &'a mut CS,
    released: bool,
}

impl<'a, CS: OutputPin> Selected<'a, CS> {
    pub(crate) fn select(cs: &'a mut CS) -> Result<Self, CS::Error> {
        cs.set_low()?;
        Ok(Self {
            cs,
            released: false,
        })
    }

    pub(crate) fn release(mut self) -> Result<(), CS::Error> {
        self.released = true;
        self.cs.set_high()
    }
}

impl<CS: OutputPin> Drop for Selected<'_, CS> {
    fn drop(&mut self) {
        if !self.released {
            let _ = self.cs.set_high();
        }
    }
}

/// Provides the chip-select bracketed command byte.
pub(crate) trait CommandSend: SpiHw + ErrorHw {
    /// Sends a single command byte: deselect, command mode, select, transfer, deselect.
    async fn send_command(&mut self, spi: &mut Self::Spi, command: u8) -> Result<(), Self::Error>;

    /// Sends each byte with its own bracket. Nothing is batched under one selection.
    async fn send_commands(
        &mut self,
        spi: &mut Self::Spi,
        commands: &[u8],
    ) -> Result<(), Self::Error> {
        for &command in commands {
            self.send_command(spi, command).await?;
        }
        Ok(())
    }
}

/// Switches the lines into data mode and selects the display.
pub(crate) trait DataSelect: CsHw + ErrorHw {
    /// The display stays selected, in data mode, until the returned guard is released or dropped.
    fn select_data(&mut self) -> Result<Selected<'_, Self::Cs>, Self::Error>;
}

impl<HW> CommandSend for HW
where
    HW: CsHw + DcHw + SpiHw + ErrorHw,
    HW::Error: From<<HW::Spi as SpiErrorType>::Error>
        + From<<HW::Cs as PinErrorType>::Error>
        + From<<HW::Dc as PinErrorType>::Error>,
{
    async fn send_command(&mut self, spi: &mut Self::Spi, command: u8) -> Result<(), Self::Error> {
        trace!("Sending SSD1306 command byte: {:#x}", command);
        self.cs().set_high()?;
        self.dc().set_low()?;

        let selected = Selected::select(self.cs())?;
        spi.write(&[command]).await?;
        spi.flush().await?;
        selected.release()?;

        Ok(())
    }
}

impl<HW> DataSelect for HW
where
    HW: CsHw + DcHw + ErrorHw,
    HW::Error: From<<HW::Cs as PinErrorType>::Error> + From<<HW::Dc as PinErrorType>::Error>,
{
    fn select_data(&mut self) -> Result<Selected<'_, Self::Cs>, Self::Error> {
        self.cs().set_high()?;
        self.dc().set_high()?;
        Ok(Selected::select(self.cs())?)
    }
}
