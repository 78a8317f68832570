//! Page geometry and page-label placement

/// Width of a digit in Helvetica, in 1/1000ths of the font size
const HELVETICA_DIGIT_WIDTH: f32 = 556.0;

/// Width of any other character, used for non-digit labels
const HELVETICA_AVERAGE_WIDTH: f32 = 500.0;

/// A page's visible rectangle in PDF points (origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub left: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// US Letter size (8.5" × 11"), used when a page has no MediaBox
    pub fn letter() -> Self {
        Self { left: 0.0, bottom: 0.0, width: 612.0, height: 792.0 }
    }

    /// A4 size (210mm × 297mm)
    #[cfg(test)]
    pub fn a4() -> Self {
        Self { left: 0.0, bottom: 0.0, width: 595.0, height: 842.0 }
    }

    /// Build from the four numbers of a MediaBox `[llx lly urx ury]`
    ///
    /// Corners may be given in any order. Degenerate boxes return `None`.
    pub fn from_corners(llx: f32, lly: f32, urx: f32, ury: f32) -> Option<Self> {
        let width = (urx - llx).abs();
        let height = (ury - lly).abs();
        if width < 1.0 || height < 1.0 {
            return None;
        }

        Some(Self {
            left: llx.min(urx),
            bottom: lly.min(ury),
            width,
            height,
        })
    }

    /// Horizontal center of the page
    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }
}

/// Estimate the rendered width of a label set in Helvetica
pub fn label_width(label: &str, font_size: f32) -> f32 {
    let units: f32 = label
        .chars()
        .map(|c| if c.is_ascii_digit() { HELVETICA_DIGIT_WIDTH } else { HELVETICA_AVERAGE_WIDTH })
        .sum();
    units * font_size / 1000.0
}

/// Starting point `(x, y)` of a label centered horizontally at `baseline`
/// points above the bottom of the page
pub fn label_origin(page: &PageBox, label: &str, font_size: f32, baseline: f32) -> (f32, f32) {
    let x = page.center_x() - label_width(label, font_size) / 2.0;
    let y = page.bottom + baseline;
    (x, y)
}
