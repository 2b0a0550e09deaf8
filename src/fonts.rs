//! Font data and glyph metrics.
//!
//! A report is always drawn with exactly one type-face, described by a [`FontData`][] instance.
//! There are two kinds of font data:
//!
//! - Embedded fonts are loaded from a TrueType file ([`FontData::load`][], [`FontData::new`][]).
//!   Their glyph metrics are read with [`rusttype`][] and the font program is subsetted and
//!   embedded into the PDF file when the page is rendered.
//! - Built-in fonts ([`Builtin`][]) are not embedded.  PDF viewers are expected to provide them.
//!   Their metrics come from static width tables, so they can be used without any font file.
//!
//! Use the [`resolve`][] module to select the font data for a report instead of loading it
//! manually.
//!
//! [`resolve`]: ../resolve/index.html
//! [`Builtin`]: enum.Builtin.html
//! [`FontData`]: struct.FontData.html
//! [`FontData::new`]: struct.FontData.html#method.new
//! [`FontData::load`]: struct.FontData.html#method.load
//! [`rusttype`]: https://docs.rs/rusttype

use std::collections::HashSet;
use std::fs;
use std::path;
use std::sync::Arc;

use crate::error::{Context as _, Error, ErrorKind};
use crate::Mm;

/// A font that PDF viewers provide without embedding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// The Japanese composite font `HeiseiKakuGo-W5` with the `UniJIS-UCS2-H` encoding.
    ///
    /// This font covers Japanese text without a font file, but it is only shown correctly if the
    /// PDF viewer has the Adobe Japanese font pack.
    HeiseiKakuGo,
    /// The standard Helvetica font with the Windows-1252 encoding.
    ///
    /// Characters that are not supported by Windows-1252 are drawn as `?`.
    Helvetica,
}

impl Builtin {
    /// Returns the PostScript name of this font.
    pub fn base_font(&self) -> &'static str {
        match self {
            Builtin::HeiseiKakuGo => "HeiseiKakuGo-W5",
            Builtin::Helvetica => printpdf::BuiltinFont::Helvetica.into(),
        }
    }

    /// Returns whether this font can only draw Latin text.
    pub fn is_latin_only(&self) -> bool {
        *self == Builtin::Helvetica
    }

    fn ascent(&self) -> f32 {
        match self {
            Builtin::HeiseiKakuGo => 0.752,
            Builtin::Helvetica => 0.718,
        }
    }

    fn descent(&self) -> f32 {
        match self {
            Builtin::HeiseiKakuGo => -0.221,
            Builtin::Helvetica => -0.207,
        }
    }

    fn has_glyph(&self, c: char) -> bool {
        match self {
            Builtin::HeiseiKakuGo => u32::from(c) <= 0xFFFF && !c.is_control(),
            Builtin::Helvetica => winansi_byte(c).is_some(),
        }
    }

    /// Returns the advance width of the given character in em.
    fn advance_width(&self, c: char) -> f32 {
        match self {
            Builtin::HeiseiKakuGo => {
                if is_half_width(c) {
                    0.5
                } else {
                    1.0
                }
            }
            Builtin::Helvetica => helvetica_advance_width(c),
        }
    }
}

/// Returns whether the given character has half width in the built-in Japanese font.
pub(crate) fn is_half_width(c: char) -> bool {
    matches!(u32::from(c), 0x20..=0x7E | 0xFF61..=0xFF9F)
}

/// Maps the given character to its Windows-1252 code, if there is one.
pub(crate) fn winansi_byte(c: char) -> Option<u8> {
    let code = u32::from(c);
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            _ => None,
        },
    }
}

/// Standard Helvetica widths from the Adobe Font Metrics, in em.
fn helvetica_advance_width(c: char) -> f32 {
    match c {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'f' | 't' => 0.278,
        '"' => 0.355,
        '\'' => 0.191,
        '(' | ')' | '-' | '`' | 'r' => 0.333,
        '*' => 0.389,
        '+' | '<' | '=' | '>' | '~' => 0.584,
        '%' => 0.889,
        '&' => 0.667,
        '@' => 1.015,
        '^' => 0.469,
        '{' | '}' => 0.334,
        '|' => 0.260,
        'I' => 0.278,
        'J' => 0.500,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 0.667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 0.722,
        'F' | 'T' | 'Z' => 0.611,
        'G' | 'O' | 'Q' => 0.778,
        'L' => 0.556,
        'M' | 'm' => 0.833,
        'W' => 0.944,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 0.500,
        'i' | 'j' | 'l' => 0.222,
        _ => 0.556,
    }
}

#[derive(Clone, Debug)]
enum RawFontData {
    Builtin(Builtin),
    Embedded(Arc<[u8]>),
}

/// The data and metrics of the type-face used to draw a report.
#[derive(Clone, Debug)]
pub struct FontData {
    raw_data: RawFontData,
    rt_font: Option<rusttype::Font<'static>>,
    scale: rusttype::Scale,
    ascent: f32,
    descent: f32,
}

impl FontData {
    /// Loads a TrueType font from the given data.
    ///
    /// The data must be readable by [`rusttype`][] and contain a scalable font with TrueType
    /// (`glyf`) outlines.  Fonts with PostScript (CFF) outlines are rejected because they cannot
    /// be embedded as `FontFile2`.  For font collections (`.ttc`), the first face is used.
    ///
    /// [`rusttype`]: https://docs.rs/rusttype
    pub fn new(data: Vec<u8>) -> Result<FontData, Error> {
        check_outlines(&data)?;
        let shared: Arc<[u8]> = Arc::from(data);
        let rt_font = rusttype::FontCollection::from_bytes(shared.clone())
            .and_then(|collection| collection.font_at(0))
            .context("Failed to read rusttype font")?;
        let units_per_em = rt_font.units_per_em();
        if units_per_em == 0 {
            return Err(Error::new(
                "The font is not scalable",
                ErrorKind::InvalidFont,
            ));
        }

        let units_per_em = f32::from(units_per_em);
        let v_metrics = rt_font.v_metrics_unscaled();
        let glyph_height = (v_metrics.ascent - v_metrics.descent) / units_per_em;
        Ok(FontData {
            raw_data: RawFontData::Embedded(shared),
            rt_font: Some(rt_font),
            // rusttype scales glyphs so that ascent - descent equals the scale, so this scale
            // yields metrics in em.
            scale: rusttype::Scale::uniform(glyph_height),
            ascent: v_metrics.ascent / units_per_em,
            descent: v_metrics.descent / units_per_em,
        })
    }

    /// Loads the TrueType font at the given path.
    pub fn load(path: impl AsRef<path::Path>) -> Result<FontData, Error> {
        let data = fs::read(path.as_ref())
            .with_context(|| format!("Failed to open font file {}", path.as_ref().display()))?;
        FontData::new(data)
    }

    /// Creates font data for a built-in font.
    pub fn builtin(builtin: Builtin) -> FontData {
        FontData {
            raw_data: RawFontData::Builtin(builtin),
            rt_font: None,
            scale: rusttype::Scale::uniform(1.0),
            ascent: builtin.ascent(),
            descent: builtin.descent(),
        }
    }

    /// Returns the built-in font, if this is not an embedded font.
    pub fn builtin_font(&self) -> Option<Builtin> {
        match &self.raw_data {
            RawFontData::Builtin(builtin) => Some(*builtin),
            RawFontData::Embedded(_) => None,
        }
    }

    /// Returns whether this is a built-in font.
    pub fn is_builtin(&self) -> bool {
        self.builtin_font().is_some()
    }

    /// Returns whether the font data is a font collection with a `ttcf` header.
    pub fn is_collection(&self) -> bool {
        match &self.raw_data {
            RawFontData::Embedded(data) => data.starts_with(b"ttcf"),
            RawFontData::Builtin(_) => false,
        }
    }

    /// Gets the raw font data bytes (for embedded fonts only).
    pub fn get_data(&self) -> Result<&[u8], Error> {
        match &self.raw_data {
            RawFontData::Embedded(data) => Ok(data.as_ref()),
            RawFontData::Builtin(_) => Err(Error::new(
                "Cannot get raw data from built-in font",
                ErrorKind::InvalidFont,
            )),
        }
    }

    /// Checks if this font has a glyph for the given character.
    pub fn has_glyph(&self, c: char) -> bool {
        match (&self.rt_font, &self.raw_data) {
            // glyph ID 0 is the .notdef glyph
            (Some(rt_font), _) => rt_font.glyph(c).id().0 != 0,
            (None, RawFontData::Builtin(builtin)) => builtin.has_glyph(c),
            (None, RawFontData::Embedded(_)) => false,
        }
    }

    /// Analyzes glyph coverage for the given text.
    pub fn check_coverage(&self, text: &str) -> GlyphCoverage {
        let unique_chars: HashSet<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut missing_chars: Vec<char> = unique_chars
            .iter()
            .copied()
            .filter(|c| !self.has_glyph(*c))
            .collect();
        missing_chars.sort_unstable();

        GlyphCoverage {
            total_unique: unique_chars.len(),
            covered: unique_chars.len() - missing_chars.len(),
            missing_chars,
        }
    }

    /// Returns the glyph ID for the given character, or 0 for built-in fonts.
    pub fn glyph_id(&self, c: char) -> u16 {
        self.rt_font
            .as_ref()
            .map(|rt_font| rt_font.glyph(c).id().0 as u16)
            .unwrap_or(0)
    }

    /// Returns the advance width of the given character in em.
    pub fn advance_width(&self, c: char) -> f32 {
        match (&self.rt_font, &self.raw_data) {
            (Some(rt_font), _) => rt_font.glyph(c).scaled(self.scale).h_metrics().advance_width,
            (None, RawFontData::Builtin(builtin)) => builtin.advance_width(c),
            (None, RawFontData::Embedded(_)) => 0.0,
        }
    }

    /// Returns the width of a character with this font and the given font size.
    pub fn char_width(&self, c: char, font_size: u8) -> Mm {
        em_to_mm(self.advance_width(c), font_size)
    }

    /// Returns the width of a string with this font and the given font size.
    pub fn str_width(&self, s: &str, font_size: u8) -> Mm {
        let em: f32 = s.chars().map(|c| self.advance_width(c)).sum();
        em_to_mm(em, font_size)
    }

    /// Returns the ascent for text with this font and the given font size.
    pub fn ascent(&self, font_size: u8) -> Mm {
        em_to_mm(self.ascent, font_size)
    }

    /// Returns the descent for text with this font and the given font size.
    pub fn descent(&self, font_size: u8) -> Mm {
        em_to_mm(self.descent, font_size)
    }

    /// Returns the ascent in em, as used in PDF font descriptors.
    pub(crate) fn ascent_em(&self) -> f32 {
        self.ascent
    }

    /// Returns the descent in em, as used in PDF font descriptors.
    pub(crate) fn descent_em(&self) -> f32 {
        self.descent
    }
}

/// Checks that the first face of the sfnt data has TrueType outlines.
fn check_outlines(data: &[u8]) -> Result<(), Error> {
    let face = if data.starts_with(b"ttcf") {
        read_u32(data, 12).map(|offset| offset as usize)
    } else {
        Some(0)
    };
    let (face, tags) = face
        .and_then(|face| table_tags(data, face).map(|tags| (face, tags)))
        .ok_or_else(|| Error::new("The font has no sfnt table directory", ErrorKind::InvalidFont))?;

    let is_cff = data.get(face..face + 4) == Some(&b"OTTO"[..])
        || tags.iter().any(|&tag| tag == b"CFF " || tag == b"CFF2");
    if is_cff {
        Err(Error::new(
            "The font has PostScript (CFF) outlines, which cannot be embedded",
            ErrorKind::InvalidFont,
        ))
    } else if !tags.iter().any(|&tag| tag == b"glyf") {
        Err(Error::new("The font has no TrueType outlines", ErrorKind::InvalidFont))
    } else {
        Ok(())
    }
}

fn table_tags(data: &[u8], face: usize) -> Option<Vec<&[u8]>> {
    let count = usize::from(read_u16(data, face.checked_add(4)?)?);
    (0..count)
        .map(|i| {
            let pos = face.checked_add(12 + i * 16)?;
            data.get(pos..pos.checked_add(4)?)
        })
        .collect()
}

fn read_u16(data: &[u8], pos: usize) -> Option<u16> {
    let bytes = data.get(pos..pos.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], pos: usize) -> Option<u32> {
    let bytes = data.get(pos..pos.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn em_to_mm(em: f32, font_size: u8) -> Mm {
    Mm::from(printpdf::Pt(em * f32::from(font_size)))
}

/// Statistics about glyph coverage for a given text.
///
/// Whitespace is not taken into account.
#[derive(Clone, Debug)]
pub struct GlyphCoverage {
    total_unique: usize,
    covered: usize,
    missing_chars: Vec<char>,
}

impl GlyphCoverage {
    /// Returns the percentage of characters covered by the font (0-100).
    pub fn coverage_percent(&self) -> f32 {
        if self.total_unique == 0 {
            100.0
        } else {
            (self.covered as f32 / self.total_unique as f32) * 100.0
        }
    }

    /// Returns true if all characters are covered.
    pub fn is_complete(&self) -> bool {
        self.missing_chars.is_empty()
    }

    /// Returns the sorted list of missing characters.
    pub fn missing_chars(&self) -> &[char] {
        &self.missing_chars
    }
}
