//! Text and line styles.

use crate::error::{Error, ErrorKind};
use crate::Mm;

/// A color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Color {
    /// A greyscale color with a value between 0 (black) and 1 (white).
    Greyscale(f32),
    /// An RGB color with values between 0 and 1.
    Rgb(f32, f32, f32),
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color::Greyscale(0.0);
    /// The light grey used for the label column of the table.
    pub const LIGHT_GREY: Color = Color::Greyscale(0.827);
}

impl Default for Color {
    fn default() -> Color {
        Color::BLACK
    }
}

/// The style of a ruled line or a box border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    thickness: Mm,
    color: Color,
}

impl LineStyle {
    /// Creates a black line with the given thickness in points.
    pub fn new(thickness_pt: f32) -> LineStyle {
        LineStyle {
            thickness: printpdf::Pt(thickness_pt).into(),
            color: Color::BLACK,
        }
    }

    /// Sets the color of the line.
    pub fn with_color(mut self, color: Color) -> LineStyle {
        self.color = color;
        self
    }

    /// Returns the thickness of the line.
    pub fn thickness(&self) -> Mm {
        self.thickness
    }

    /// Returns the color of the line.
    pub fn color(&self) -> Color {
        self.color
    }
}

impl Default for LineStyle {
    fn default() -> LineStyle {
        LineStyle::new(1.0)
    }
}

/// The style of a text block: font size, line spacing and the padding around the block.
///
/// The line height (leading) is `font_size * line_spacing` points, independent of the font.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    font_size: u8,
    line_spacing: f32,
    padding: Mm,
}

impl TextStyle {
    /// Creates a text style.
    ///
    /// The font size must not be zero, the line spacing must be a positive number and the
    /// padding must not be negative.
    pub fn new(font_size: u8, line_spacing: f32, padding: Mm) -> Result<TextStyle, Error> {
        if font_size == 0 {
            return Err(Error::new("The font size must not be zero", ErrorKind::InvalidData));
        }
        if !line_spacing.is_finite() || line_spacing <= 0.0 {
            return Err(Error::new(
                format!("Invalid line spacing {}", line_spacing),
                ErrorKind::InvalidData,
            ));
        }
        if !padding.0.is_finite() || padding < Mm(0.0) {
            return Err(Error::new(
                format!("Invalid padding {:?}", padding),
                ErrorKind::InvalidData,
            ));
        }
        Ok(TextStyle {
            font_size,
            line_spacing,
            padding,
        })
    }

    /// Creates a text style, falling back to the default style if the values are invalid.
    pub fn or_default(font_size: u8, line_spacing: f32, padding: Mm) -> TextStyle {
        TextStyle::new(font_size, line_spacing, padding).unwrap_or_else(|err| {
            log::warn!("{}, using the default text style", err);
            TextStyle::default()
        })
    }

    /// Returns the font size in points.
    pub fn font_size(&self) -> u8 {
        self.font_size
    }

    /// Returns the line spacing factor.
    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Returns the padding between the text and the border of its box.
    pub fn padding(&self) -> Mm {
        self.padding
    }

    /// Returns the distance between two baselines.
    pub fn line_height(&self) -> Mm {
        printpdf::Pt(f32::from(self.font_size) * self.line_spacing).into()
    }
}

impl Default for TextStyle {
    /// 10 pt text with 14 pt leading and 6 pt padding.
    fn default() -> TextStyle {
        TextStyle {
            font_size: 10,
            line_spacing: 1.4,
            padding: printpdf::Pt(6.0).into(),
        }
    }
}
