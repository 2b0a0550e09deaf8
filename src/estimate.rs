//! Height estimation for table cells.

use crate::fonts::FontData;
use crate::style::TextStyle;
use crate::wrap;
use crate::Mm;

/// The way the number of lines of a cell is determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightStrategy {
    /// Wrap the content with the font metrics and count the resulting lines.
    Measured,
    /// Count the explicit line breaks only, ignoring soft wraps.
    LineCount,
}

impl Default for HeightStrategy {
    fn default() -> HeightStrategy {
        HeightStrategy::Measured
    }
}

/// Predicts the height of a box that holds wrapped text.
#[derive(Clone, Copy, Debug)]
pub struct HeightEstimator<'f> {
    font: &'f FontData,
    style: TextStyle,
    min_height: Mm,
    strategy: HeightStrategy,
}

impl<'f> HeightEstimator<'f> {
    /// Creates a new estimator.
    pub fn new(
        font: &'f FontData,
        style: TextStyle,
        min_height: Mm,
        strategy: HeightStrategy,
    ) -> HeightEstimator<'f> {
        HeightEstimator {
            font,
            style,
            min_height,
            strategy,
        }
    }

    /// Returns the text style used for the estimation.
    pub fn style(&self) -> TextStyle {
        self.style
    }

    /// Returns the number of lines the content takes in a box of the given width.
    pub fn line_count(&self, content: &str, width: Mm) -> usize {
        match self.strategy {
            HeightStrategy::Measured => wrap::wrap(
                content,
                width - self.style.padding() * 2.0,
                self.font,
                self.style.font_size(),
            )
            .len(),
            HeightStrategy::LineCount => content.matches('\n').count() + 1,
        }
    }

    /// Returns the height of the given number of lines including the padding.
    pub fn height_for_lines(&self, lines: usize) -> Mm {
        self.style.line_height() * lines as f32 + self.style.padding() * 2.0
    }

    /// Estimates the height of a box of the given width that holds the content.
    ///
    /// The result is never less than the minimum height of the estimator.
    pub fn estimate_height(&self, content: &str, width: Mm) -> Mm {
        let lines = self.line_count(content, width);
        self.height_for_lines(lines).max(self.min_height)
    }
}
