use core::{
    cmp::{max, min},
    convert::Infallible,
};

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::{Dimensions, DrawTarget, OriginDimensions, Point, Size},
    primitives::Rectangle,
    Pixel,
};

use crate::ssd1306::Geometry;

/// A framebuffer in the SSD1306 page layout.
///
/// The display is split into horizontal pages, 8 pixels tall. Each page is `width` bytes, one per
/// column, and each byte holds 8 vertically stacked pixels with bit 0 on top. So pixel `(x, y)`
/// lives in byte `x + (y / 8) * width`, bit `y % 8`.
///
/// `BinaryColor::On` lights the pixel.
pub struct PageBuffer<const L: usize> {
    geometry: Geometry,
    data: [u8; L],
}

/// Computes the correct length for a page buffer with the given dimensions.
pub const fn page_buffer_length(size: Size) -> usize {
    size.width as usize * (size.height as usize / 8)
}

impl<const L: usize> PageBuffer<L> {
    /// Creates a new [PageBuffer] with all pixels off.
    ///
    /// The geometry must match the buffer length `L`.
    ///
    /// ```
    /// use ssd1306_spi_async::buffer::PageBuffer;
    /// use ssd1306_spi_async::ssd1306::{Geometry, BUFFER_LENGTH_128X32};
    ///
    /// let buffer = PageBuffer::<BUFFER_LENGTH_128X32>::new(Geometry::Size128x32);
    /// assert_eq!(buffer.data().len(), 512);
    /// ```
    pub fn new(geometry: Geometry) -> Self {
        debug_assert_eq!(
            page_buffer_length(geometry.size()),
            L,
            "Size must match given geometry"
        );
        Self {
            geometry,
            data: [0; L],
        }
    }

    /// Access the packed buffer data, ready to pass to [crate::Display::display].
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: BinaryColor) {
        let index = x + (y / 8) * self.geometry.columns();
        let mask = 1 << (y % 8);
        if color.is_on() {
            self.data[index] |= mask;
        } else {
            self.data[index] &= !mask;
        }
    }
}

impl<const L: usize> OriginDimensions for PageBuffer<L> {
    fn size(&self) -> Size {
        self.geometry.size()
    }
}

impl<const L: usize> DrawTarget for PageBuffer<L> {
    type Color = BinaryColor;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels.into_iter() {
            if !bounds.contains(point) {
                continue;
            }
            self.set_pixel(point.x as usize, point.y as usize, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let drawable_area = self.bounding_box().intersection(area);
        if drawable_area.size.width == 0 || drawable_area.size.height == 0 {
            return Ok(()); // Nothing to fill
        }

        let x_start = drawable_area.top_left.x as usize;
        let x_end = x_start + drawable_area.size.width as usize;
        let y_start = drawable_area.top_left.y as usize;
        let y_end = y_start + drawable_area.size.height as usize;
        let width = self.geometry.columns();

        // One mask per page covers every row of the area within that page.
        for page in y_start / 8..=(y_end - 1) / 8 {
            let top = max(y_start, page * 8) - page * 8;
            let bottom = min(y_end, page * 8 + 8) - page * 8;
            let mask = (0xFFu16 >> (8 - (bottom - top)) << top) as u8;

            let row = &mut self.data[page * width + x_start..page * width + x_end];
            for byte in row {
                if color.is_on() {
                    *byte |= mask;
                } else {
                    *byte &= !mask;
                }
            }
        }

        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.data.fill(if color.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

impl<const L: usize> PageBuffer<L> {
    /// The pixel at `point`, or `None` if it's out of bounds.
    pub fn pixel(&self, point: Point) -> Option<BinaryColor> {
        if !self.bounding_box().contains(point) {
            return None;
        }
        let index = point.x as usize + (point.y as usize / 8) * self.geometry.columns();
        Some(BinaryColor::from(self.data[index] & (1 << (point.y % 8)) != 0))
    }
}
