use core::cmp::{max, min};

use crate::ssd1306::Geometry;

/// An inclusive block of pages and columns in the controller's RAM.
///
/// This is the window sent with the column and page address commands before a data burst.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRegion {
    pub first_page: u8,
    pub last_page: u8,
    pub first_column: u8,
    pub last_column: u8,
}

impl PageRegion {
    /// The region covering the whole display.
    pub fn full(geometry: Geometry) -> Self {
        Self {
            first_page: 0,
            last_page: geometry.last_page(),
            first_column: 0,
            last_column: geometry.last_column(),
        }
    }

    /// Number of pages in the region.
    pub fn page_count(&self) -> usize {
        (self.last_page - self.first_page) as usize + 1
    }

    /// Number of columns (bytes per page) in the region.
    pub fn column_count(&self) -> usize {
        (self.last_column - self.first_column) as usize + 1
    }

    /// Number of data bytes needed to fill the region.
    pub fn byte_count(&self) -> usize {
        self.page_count() * self.column_count()
    }
}

/// Running bounding box of the cells that differ between the framebuffer and the shadow buffer.
///
/// Starts out empty (min above max) and grows with each [DirtyRect::include].
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    min_page: u8,
    max_page: u8,
    min_column: u8,
    max_column: u8,
}

impl DirtyRect {
    /// A rectangle containing nothing.
    pub const fn new() -> Self {
        Self {
            min_page: u8::MAX,
            max_page: 0,
            min_column: u8::MAX,
            max_column: 0,
        }
    }

    /// A rectangle already covering the whole display.
    pub fn covering(geometry: Geometry) -> Self {
        let full = PageRegion::full(geometry);
        Self {
            min_page: full.first_page,
            max_page: full.last_page,
            min_column: full.first_column,
            max_column: full.last_column,
        }
    }

    /// Grows the rectangle to contain the given cell.
    pub fn include(&mut self, page: u8, column: u8) {
        self.min_page = min(self.min_page, page);
        self.max_page = max(self.max_page, page);
        self.min_column = min(self.min_column, column);
        self.max_column = max(self.max_column, column);
    }

    pub fn is_empty(&self) -> bool {
        self.min_page > self.max_page
    }

    /// The bounds as a region, or `None` if nothing was included.
    pub fn bounds(&self) -> Option<PageRegion> {
        if self.is_empty() {
            return None;
        }
        Some(PageRegion {
            first_page: self.min_page,
            last_page: self.max_page,
            first_column: self.min_column,
            last_column: self.max_column,
        })
    }
}

impl Default for DirtyRect {
    fn default() -> Self {
        Self::new()
    }
}
