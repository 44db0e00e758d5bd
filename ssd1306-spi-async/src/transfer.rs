//! Strategies for moving a framebuffer into the controller's RAM.
//!
//! [ChangeTracked] keeps a shadow copy of what was last sent and only writes the bounding box of
//! the bytes that changed. [FullFrame] needs no extra memory and rewrites the whole display on
//! every call.

use embassy_futures::yield_now;
use embedded_hal::{digital::ErrorType as PinErrorType, spi::ErrorType as SpiErrorType};
use embedded_hal_async::spi::SpiBus as _;

use crate::{
    dirty::{DirtyRect, PageRegion},
    hw::{CommandSend as _, CsHw, DataSelect as _, DcHw, ErrorHw, SpiHw},
    log::{debug_assert, trace, warn_log},
    ssd1306::{Command, Geometry},
};

/// Writes a framebuffer to the display.
#[allow(async_fn_in_trait)]
pub trait Transfer {
    /// Sends whatever part of `framebuffer` needs sending.
    ///
    /// Returns the region that was addressed, or `None` if nothing was sent.
    async fn transfer<HW>(
        &mut self,
        hw: &mut HW,
        spi: &mut HW::Spi,
        geometry: Geometry,
        framebuffer: &[u8],
    ) -> Result<Option<PageRegion>, HW::Error>
    where
        HW: CsHw + DcHw + SpiHw + ErrorHw,
        HW::Error: From<<HW::Spi as SpiErrorType>::Error>
            + From<<HW::Cs as PinErrorType>::Error>
            + From<<HW::Dc as PinErrorType>::Error>;

    /// Forgets what the controller is showing, so the next transfer sends the whole frame.
    fn invalidate(&mut self) {}
}

/// Sends only the bounding box of the bytes that changed since the previous transfer.
///
/// `L` must equal the framebuffer length for the display's [Geometry].
pub struct ChangeTracked<const L: usize> {
    shadow: [u8; L],
    stale: bool,
}

impl<const L: usize> ChangeTracked<L> {
    /// The first transfer always sends the full frame.
    pub const fn new() -> Self {
        Self {
            shadow: [0; L],
            stale: true,
        }
    }

    /// The bytes most recently copied from the framebuffer.
    pub fn shadow(&self) -> &[u8] {
        &self.shadow
    }

    /// Compares `framebuffer` against the shadow, copying every byte across as it goes.
    ///
    /// Leaves the shadow stale. It only matches the controller again once the region has been
    /// written, so a transfer that fails or is dropped part way resends the full frame next time.
    async fn scan(&mut self, geometry: Geometry, framebuffer: &[u8]) -> DirtyRect {
        let mut dirty = if self.stale {
            DirtyRect::covering(geometry)
        } else {
            DirtyRect::new()
        };
        self.stale = true;

        let width = geometry.columns();
        for page in 0..geometry.pages() {
            let row = page * width..(page + 1) * width;
            let new_row = &framebuffer[row.clone()];
            let old_row = &mut self.shadow[row];
            for (column, (new, old)) in new_row.iter().zip(old_row.iter_mut()).enumerate() {
                if *new != *old {
                    dirty.include(page as u8, column as u8);
                }
                *old = *new;
            }
            yield_now().await;
        }
        dirty
    }
}

impl<const L: usize> Default for ChangeTracked<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const L: usize> Transfer for ChangeTracked<L> {
    async fn transfer<HW>(
        &mut self,
        hw: &mut HW,
        spi: &mut HW::Spi,
        geometry: Geometry,
        framebuffer: &[u8],
    ) -> Result<Option<PageRegion>, HW::Error>
    where
        HW: CsHw + DcHw + SpiHw + ErrorHw,
        HW::Error: From<<HW::Spi as SpiErrorType>::Error>
            + From<<HW::Cs as PinErrorType>::Error>
            + From<<HW::Dc as PinErrorType>::Error>,
    {
        let matches = framebuffer.len() == L && geometry.buffer_length() == L;
        debug_assert!(matches, "framebuffer and shadow must both match the geometry");
        if !matches {
            warn_log!("Framebuffer length does not match the geometry, nothing sent");
            return Ok(None);
        }

        let Some(region) = self.scan(geometry, framebuffer).await.bounds() else {
            trace!("Framebuffer unchanged, nothing to send");
            self.stale = false;
            return Ok(None);
        };

        if let Err(e) = write_region(hw, spi, geometry, framebuffer, region).await {
            warn_log!("Transfer failed, next transfer will resend the full frame");
            return Err(e);
        }
        self.stale = false;
        Ok(Some(region))
    }

    fn invalidate(&mut self) {
        self.stale = true;
    }
}

/// Rewrites the whole display on every transfer.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullFrame;

impl Transfer for FullFrame {
    async fn transfer<HW>(
        &mut self,
        hw: &mut HW,
        spi: &mut HW::Spi,
        geometry: Geometry,
        framebuffer: &[u8],
    ) -> Result<Option<PageRegion>, HW::Error>
    where
        HW: CsHw + DcHw + SpiHw + ErrorHw,
        HW::Error: From<<HW::Spi as SpiErrorType>::Error>
            + From<<HW::Cs as PinErrorType>::Error>
            + From<<HW::Dc as PinErrorType>::Error>,
    {
        let matches = framebuffer.len() == geometry.buffer_length();
        debug_assert!(matches, "framebuffer must match the geometry");
        if !matches {
            warn_log!("Framebuffer length does not match the geometry, nothing sent");
            return Ok(None);
        }

        let region = PageRegion::full(geometry);
        write_region(hw, spi, geometry, framebuffer, region).await?;
        Ok(Some(region))
    }
}

/// Sends the address window for `region`, then the framebuffer bytes inside it, one page row per
/// write.
async fn write_region<HW>(
    hw: &mut HW,
    spi: &mut HW::Spi,
    geometry: Geometry,
    framebuffer: &[u8],
    region: PageRegion,
) -> Result<(), HW::Error>
where
    HW: CsHw + DcHw + SpiHw + ErrorHw,
    HW::Error: From<<HW::Spi as SpiErrorType>::Error>
        + From<<HW::Cs as PinErrorType>::Error>
        + From<<HW::Dc as PinErrorType>::Error>,
{
    trace!(
        "Writing pages {}..={}, columns {}..={}",
        region.first_page,
        region.last_page,
        region.first_column,
        region.last_column
    );
    hw.send_commands(
        spi,
        &[
            Command::ColumnAddress.register(),
            region.first_column,
            region.last_column,
            Command::PageAddress.register(),
            region.first_page,
            region.last_page,
        ],
    )
    .await?;

    let width = geometry.columns();
    let selected = hw.select_data()?;
    for page in region.first_page as usize..=region.last_page as usize {
        let start = page * width + region.first_column as usize;
        let end = page * width + region.last_column as usize;
        spi.write(&framebuffer[start..=end]).await?;
        yield_now().await;
    }
    spi.flush().await?;
    selected.release()?;

    Ok(())
}
