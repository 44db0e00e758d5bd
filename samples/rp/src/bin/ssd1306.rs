//! Draws on a 128x64 SSD1306 OLED using a Raspberry Pi Pico board, then animates a small square
//! to show how little is sent when only part of the frame changes.

#![no_std]
#![no_main]

mod hw;

use defmt::{expect, info};
use embassy_executor::Spawner;
use embassy_rp::spi::{self, Spi};
use embassy_time::{Instant, Timer};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle};
use ssd1306_spi_async::{
    buffer::PageBuffer,
    ssd1306::{self, Geometry, Ssd1306Spi, BUFFER_LENGTH_128X64},
    transfer::ChangeTracked,
    Connect, Display,
};
use {defmt_rtt as _, panic_probe as _};

use crate::hw::DisplayHw;

assign_resources::assign_resources! {
    spi_hw: SpiP {
        spi: SPI0,
        clk: PIN_2,
        tx: PIN_3,
        dma_tx: DMA_CH1,
    },
    oled_hw: DisplayP {
        cs: PIN_5,
        dc: PIN_6,
        reset: PIN_7,
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let resources = split_resources!(p);
    let mut config = spi::Config::default();
    config.frequency = ssd1306::RECOMMENDED_SPI_HZ;
    // embassy-rp uses its own phase and polarity enums, so we have to map these.
    config.phase = match ssd1306::RECOMMENDED_SPI_PHASE {
        embedded_hal::spi::Phase::CaptureOnFirstTransition => {
            spi::Phase::CaptureOnFirstTransition
        }
        embedded_hal::spi::Phase::CaptureOnSecondTransition => {
            spi::Phase::CaptureOnSecondTransition
        }
    };
    config.polarity = match ssd1306::RECOMMENDED_SPI_POLARITY {
        embedded_hal::spi::Polarity::IdleHigh => spi::Polarity::IdleHigh,
        embedded_hal::spi::Polarity::IdleLow => spi::Polarity::IdleLow,
    };

    let mut spi = Spi::new_txonly(
        resources.spi_hw.spi,
        resources.spi_hw.clk,
        resources.spi_hw.tx,
        resources.spi_hw.dma_tx,
        config,
    );
    let display = Ssd1306Spi::new(
        DisplayHw::new(resources.oled_hw),
        Geometry::Size128x64,
        ChangeTracked::<BUFFER_LENGTH_128X64>::new(),
    );

    info!("Connecting display");
    let mut display = expect!(display.connect().await, "Failed to connect display");

    let mut buffer = PageBuffer::<BUFFER_LENGTH_128X64>::new(Geometry::Size128x64);
    let mut style = TextStyle::default();
    style.alignment = Alignment::Left;
    style.baseline = Baseline::Top;
    let character_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let text = Text::with_text_style("Hello, OLED!", Point::new(10, 10), character_style, style);
    text.draw(&mut buffer).unwrap();

    info!("Displaying text");
    let region = expect!(
        display.display(&mut spi, buffer.data()).await,
        "Failed to display text"
    );
    info!("Sent {:?}", region);

    info!("Re-displaying unchanged buffer");
    let region = expect!(
        display.display(&mut spi, buffer.data()).await,
        "Failed to re-display"
    );
    info!("Sent {:?}", region);

    let mut square = Rectangle::new(Point::new(0, 40), Size::new(8, 8));
    loop {
        buffer.fill_solid(&square, BinaryColor::Off).unwrap();
        square.top_left.x = (square.top_left.x + 4) % 120;
        buffer.fill_solid(&square, BinaryColor::On).unwrap();

        let before = Instant::now();
        let region = expect!(
            display.display(&mut spi, buffer.data()).await,
            "Failed to display square"
        );
        info!(
            "Sent {:?} in {} us",
            region,
            (Instant::now() - before).as_micros()
        );
        Timer::after_millis(100).await;
    }
}
