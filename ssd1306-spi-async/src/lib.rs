//! This crate provides an `async`/`await` SPI driver for SSD1306 OLED display controllers.
//!
//! It is built on top of `embedded-hal-async` and `embedded-graphics`, making it compatible with a
//! wide range of embedded platforms.
//!
//! ## Core traits
//!
//! - [`Connect`] and [`Display`]: the two operations the driver exposes. [`Connect`] resets the
//!   controller and moves the driver into its connected state; [`Display`] sends a framebuffer.
//!
//! - [`transfer::Transfer`]: decides which part of a framebuffer gets sent. Pick
//!   [`transfer::ChangeTracked`] to keep a shadow copy and only send the bounding box of what
//!   changed, or [`transfer::FullFrame`] to save the memory and always send everything.
//!
//! - The `hw` traits ([`hw::SpiHw`], [`hw::CsHw`], [`hw::DcHw`], [`hw::ResetHw`],
//!   [`hw::DelayHw`] and [`hw::ErrorHw`]): these abstract over the SPI bus, the three control
//!   lines and a delay timer. You implement them for one struct holding your peripherals. This
//!   trades off some set up code for simple type signatures with only one hardware parameter.
//!
//! Additionally, the crate provides:
//!
//! - `buffer` module: a page-packed framebuffer that implements `embedded-graphics::DrawTarget`.
//! - `dirty` module: the dirty rectangle used to decide what to send.
//!
//! ```rust,ignore
//! use core::convert::Infallible;
//!
//! use embassy_rp::gpio::Output;
//! use embassy_rp::spi::{self, Spi};
//! use embassy_time::Delay;
//! use ssd1306_spi_async::hw::{CsHw, DcHw, DelayHw, ErrorHw, ResetHw, SpiHw};
//! use thiserror::Error as ThisError;
//!
//! #[derive(Debug, ThisError)]
//! enum Error {
//!     #[error("SPI error: {0:?}")]
//!     SpiError(spi::Error),
//! }
//!
//! impl From<Infallible> for Error {
//!     fn from(_: Infallible) -> Self {
//!         unreachable!()
//!     }
//! }
//!
//! impl From<spi::Error> for Error {
//!     fn from(e: spi::Error) -> Self {
//!         Error::SpiError(e)
//!     }
//! }
//!
//! struct OledHw<'a> {
//!     cs: Output<'a>,
//!     dc: Output<'a>,
//!     reset: Output<'a>,
//!     delay: Delay,
//! }
//!
//! impl ErrorHw for OledHw<'_> {
//!     type Error = Error;
//! }
//!
//! impl<'a> SpiHw for OledHw<'a> {
//!     type Spi = Spi<'a, embassy_rp::peripherals::SPI0, spi::Async>;
//! }
//!
//! impl<'a> CsHw for OledHw<'a> {
//!     type Cs = Output<'a>;
//!
//!     fn cs(&mut self) -> &mut Self::Cs {
//!         &mut self.cs
//!     }
//! }
//!
//! // DcHw, ResetHw and DelayHw follow the same pattern.
//! ```
#![no_std]

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod dirty;
pub mod hw;
pub mod ssd1306;
pub mod transfer;

mod log;
#[cfg(test)]
mod testing;

use dirty::PageRegion;

/// Resets the display controller and returns the connected driver.
#[allow(async_fn_in_trait)]
pub trait Connect<ERROR> {
    type DisplayOut;

    /// Puts the control lines into their idle state and pulses reset.
    ///
    /// No attempt is made to verify that a display answered; only pin errors are reported.
    async fn connect(self) -> Result<Self::DisplayOut, ERROR>;
}

/// Sends framebuffers to a connected display.
#[allow(async_fn_in_trait)]
pub trait Display<SPI, ERROR> {
    /// Writes the framebuffer to the display's RAM. The framebuffer must use the page layout
    /// described in [buffer::PageBuffer].
    ///
    /// Returns the region that was written, or `None` if nothing needed sending.
    async fn display(
        &mut self,
        spi: &mut SPI,
        framebuffer: &[u8],
    ) -> Result<Option<PageRegion>, ERROR>;
}
